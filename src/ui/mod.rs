mod highlight;
pub mod markdown;
mod input_bar;
mod review_panel;
mod status_bar;
mod styles;

use crate::app::App;
use markdown::MarkdownCache;
use ratatui::Frame;
use ratatui::layout::{Constraint, Direction, Layout};

/// Render the entire UI
pub fn draw(f: &mut Frame, app: &App, md: &mut MarkdownCache) {
    let outer = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(2), // top bar: tabs + server
            Constraint::Length(3), // request inputs
            Constraint::Min(1),    // review panel
            Constraint::Length(1), // key hints
        ])
        .split(f.area());

    status_bar::render_top_bar(f, outer[0], app);
    input_bar::render(f, outer[1], app);
    review_panel::render(f, outer[2], app, md);
    status_bar::render_bottom_bar(f, outer[3], app);

    if let Some(ref msg) = app.view().notice {
        status_bar::render_notification(f, f.area(), msg);
    }
}
