use ratatui::style::{Color, Modifier, Style};

// ── Background colors ──
pub const BG: Color = Color::Rgb(12, 12, 12);
pub const PANEL: Color = Color::Rgb(26, 26, 26);
pub const BORDER: Color = Color::Rgb(42, 42, 42);
pub const CODE_BG: Color = Color::Rgb(20, 24, 32);

// ── Text colors ──
pub const TEXT: Color = Color::Rgb(200, 200, 200);
pub const DIM: Color = Color::Rgb(102, 102, 102);
pub const MUTED: Color = Color::Rgb(136, 136, 136);
pub const BRIGHT: Color = Color::Rgb(232, 232, 232);

// ── Accent colors ──
pub const BLUE: Color = Color::Rgb(96, 165, 250);
pub const CYAN: Color = Color::Rgb(34, 211, 238);
pub const GREEN: Color = Color::Rgb(74, 222, 128);
pub const YELLOW: Color = Color::Rgb(250, 204, 21);
pub const RED: Color = Color::Rgb(248, 113, 113);
pub const PURPLE: Color = Color::Rgb(167, 139, 250);

// ── Composed styles ──

pub fn default_style() -> Style {
    Style::default().fg(TEXT).bg(BG)
}

pub fn key_hint_style() -> Style {
    Style::default().fg(MUTED).add_modifier(Modifier::BOLD)
}

pub fn badge_style(bg: Color) -> Style {
    Style::default().fg(BG).bg(bg).add_modifier(Modifier::BOLD)
}

pub fn error_style() -> Style {
    Style::default().fg(RED).add_modifier(Modifier::BOLD)
}

// ── Markdown ──

pub fn heading_style(level: u8) -> Style {
    let base = Style::default().add_modifier(Modifier::BOLD);
    match level {
        1 => base.fg(PURPLE).add_modifier(Modifier::UNDERLINED),
        2 => base.fg(CYAN),
        3 => base.fg(BLUE),
        _ => base.fg(BRIGHT),
    }
}

pub fn inline_code_style() -> Style {
    Style::default().fg(YELLOW).bg(CODE_BG)
}

pub fn link_style() -> Style {
    Style::default().fg(BLUE).add_modifier(Modifier::UNDERLINED)
}

pub fn quote_style() -> Style {
    Style::default().fg(MUTED).add_modifier(Modifier::ITALIC)
}
