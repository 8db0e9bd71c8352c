use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

use crate::app::{App, InputMode};
use crate::review::{Panel, ReviewView, ViewMode};
use super::styles;

/// Compute the display width of a list of spans
fn spans_width(spans: &[Span]) -> usize {
    spans.iter().map(|s| s.content.chars().count()).sum()
}

/// Render the top status bar
///
///   Row 1: ghr  1 REPOSITORY  2 USER                  RENDERED
///   Row 2: server URL
pub fn render_top_bar(f: &mut Frame, area: Rect, app: &App) {
    let active = app.active_tab();
    let bar_width = area.width as usize;
    let panel_bg = Style::default().bg(styles::PANEL);

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(1), Constraint::Length(1)])
        .split(area);

    let tab_style = |tab: Panel| {
        if tab == active {
            styles::badge_style(styles::BLUE)
        } else {
            Style::default().fg(styles::MUTED)
        }
    };

    let mut left: Vec<Span> = vec![
        Span::styled(" ghr ", styles::badge_style(styles::PURPLE)),
        Span::raw(" "),
    ];
    for (i, tab) in Panel::ALL.iter().enumerate() {
        left.push(Span::styled(format!(" {} ", i + 1), tab_style(*tab)));
        left.push(Span::styled(
            format!(" {} ", tab.label().to_uppercase()),
            tab_style(*tab),
        ));
        left.push(Span::raw(" "));
    }

    let mode = app.view().view_mode(active);
    let mode_bg = match mode {
        ViewMode::Rendered => styles::GREEN,
        ViewMode::Raw => styles::YELLOW,
    };
    let right = vec![
        Span::styled(format!(" {} ", mode.label()), styles::badge_style(mode_bg)),
        Span::raw(" "),
    ];

    let gap = bar_width.saturating_sub(spans_width(&left) + spans_width(&right));
    left.push(Span::raw(" ".repeat(gap)));
    left.extend(right);
    f.render_widget(Paragraph::new(Line::from(left)).style(panel_bg), rows[0]);

    let info = Line::from(vec![
        Span::styled(" server", Style::default().fg(styles::DIM)),
        Span::styled(" · ", Style::default().fg(styles::BORDER)),
        Span::styled(app.server_url.clone(), Style::default().fg(styles::CYAN)),
    ]);
    f.render_widget(Paragraph::new(info).style(panel_bg), rows[1]);
}

/// A key-label hint pair, e.g. ("f", " fetch ")
struct Hint {
    key: &'static str,
    label: &'static str,
}

impl Hint {
    fn new(key: &'static str, label: &'static str) -> Self {
        Self { key, label }
    }
}

fn build_hints(app: &App) -> Vec<Hint> {
    match app.input_mode {
        InputMode::Editing => vec![
            Hint::new("Tab", " next field "),
            Hint::new("Enter", " fetch "),
            Hint::new("^u", " clear "),
            Hint::new("Esc", " done "),
        ],
        InputMode::Normal => vec![
            Hint::new("1/2", " tabs "),
            Hint::new("i", " edit "),
            Hint::new("f", " fetch "),
            Hint::new("v", " view "),
            Hint::new("c", " copy "),
            Hint::new("d", " download "),
            Hint::new("j/k", " scroll "),
            Hint::new("q", " quit "),
        ],
    }
}

/// Render the bottom keybinding hints bar
pub fn render_bottom_bar(f: &mut Frame, area: Rect, app: &App) {
    let mut spans: Vec<Span> = vec![Span::raw(" ")];
    if app.input_mode == InputMode::Editing {
        spans.push(Span::styled(" EDIT ", styles::badge_style(styles::CYAN)));
        spans.push(Span::raw(" "));
    }
    for hint in build_hints(app) {
        spans.push(Span::styled(hint.key, styles::key_hint_style()));
        spans.push(Span::styled(hint.label, Style::default().fg(styles::DIM)));
    }
    let bar = Paragraph::new(Line::from(spans)).style(Style::default().bg(styles::PANEL));
    f.render_widget(bar, area);
}

/// Render a transient notification in the top-right corner
pub fn render_notification(f: &mut Frame, area: Rect, message: &str) {
    let notif_width = message.chars().count() as u16 + 4;
    let notif_x = area.x + area.width.saturating_sub(notif_width + 2);
    let notif_y = area.y + 2;

    let notif_area = Rect {
        x: notif_x,
        y: notif_y.min(area.bottom().saturating_sub(1)),
        width: notif_width.min(area.width),
        height: 1,
    };

    let dot = if message.starts_with("Failed") || message.starts_with("Nothing") {
        styles::RED
    } else {
        styles::GREEN
    };
    let notif = Paragraph::new(Line::from(vec![
        Span::styled(" ● ", Style::default().fg(dot)),
        Span::styled(message, Style::default().fg(styles::TEXT).add_modifier(Modifier::BOLD)),
        Span::raw(" "),
    ]))
    .style(Style::default().bg(styles::PANEL).fg(styles::TEXT));

    f.render_widget(notif, notif_area);
}
