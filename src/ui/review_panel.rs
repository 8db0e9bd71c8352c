use ratatui::{
    layout::{Alignment, Rect},
    style::{Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Padding, Paragraph, Wrap},
    Frame,
};

use crate::app::App;
use crate::review::{PanelOutput, ReviewView, PLACEHOLDER_TEXT};
use super::markdown::MarkdownCache;
use super::styles;

const SPINNER: [&str; 10] = ["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];

/// Render the active tab's review output
pub fn render(f: &mut Frame, area: Rect, app: &App, md: &mut MarkdownCache) {
    let tab = app.active_tab();
    let view = app.view();
    let mode = view.view_mode(tab);

    let title = Line::from(vec![
        Span::styled(
            format!(" {} review ", tab.label()),
            Style::default().fg(styles::BRIGHT).add_modifier(Modifier::BOLD),
        ),
        Span::styled(format!("[{}] ", mode.label().to_lowercase()), Style::default().fg(styles::DIM)),
    ]);
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(styles::BORDER))
        .title(title)
        .padding(Padding::horizontal(1))
        .style(styles::default_style());

    let (text, centered) = match view.output(tab) {
        PanelOutput::Placeholder => (
            Text::from(Line::from(Span::styled(
                PLACEHOLDER_TEXT,
                Style::default().fg(styles::MUTED),
            ))),
            true,
        ),
        PanelOutput::Loading { subject } => {
            let frame = SPINNER[(app.ticks as usize) % SPINNER.len()];
            (
                Text::from(Line::from(vec![
                    Span::styled(format!("{} ", frame), Style::default().fg(styles::CYAN)),
                    Span::styled(
                        format!("Generating AI review for {}...", subject),
                        Style::default().fg(styles::TEXT),
                    ),
                ])),
                true,
            )
        }
        PanelOutput::Error { message } => (
            Text::from(vec![
                Line::from(Span::styled(message.clone(), styles::error_style())),
                Line::from(""),
                Line::from(Span::styled(
                    "press f to retry",
                    Style::default().fg(styles::DIM),
                )),
            ]),
            true,
        ),
        PanelOutput::Raw { text } => (Text::raw(text.clone()), false),
        PanelOutput::Rendered { markdown, .. } => (Text::from(md.lines(markdown).to_vec()), false),
    };

    let mut paragraph = Paragraph::new(text).block(block);
    if centered {
        paragraph = paragraph.alignment(Alignment::Center);
    } else {
        paragraph = paragraph.scroll((view.scroll(tab), 0));
    }
    if app.wrap_lines || centered {
        paragraph = paragraph.wrap(Wrap { trim: false });
    }
    f.render_widget(paragraph, area);
}
