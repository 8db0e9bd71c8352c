use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use crate::app::{App, InputField, InputMode};
use super::styles;

/// Render the request inputs for the active tab: owner + repo, or username
pub fn render(f: &mut Frame, area: Rect, app: &App) {
    let editing = app.input_mode == InputMode::Editing;
    let mut spans: Vec<Span> = Vec::new();

    for field in InputField::for_tab(app.active_tab()) {
        let focused = editing && *field == app.focus;
        let label_style = if focused {
            Style::default().fg(styles::CYAN).add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(styles::MUTED)
        };
        let value = app.input(*field);
        spans.push(Span::styled(format!(" {}: ", field.label()), label_style));
        if value.is_empty() && !focused {
            spans.push(Span::styled("…", Style::default().fg(styles::DIM)));
        } else {
            spans.push(Span::styled(
                value.to_string(),
                Style::default().fg(styles::BRIGHT),
            ));
        }
        if focused {
            spans.push(Span::styled("█", Style::default().fg(styles::CYAN)));
        }
        spans.push(Span::raw("   "));
    }

    let border = if editing { styles::CYAN } else { styles::BORDER };
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border))
        .style(Style::default().bg(styles::BG));
    f.render_widget(Paragraph::new(Line::from(spans)).block(block), area);
}
