mod controller;
pub mod render;

pub use controller::{FetchOutcome, ReviewController};

use anyhow::Result;
use std::path::PathBuf;
use thiserror::Error;

// ── Panels ──

/// One of the two independent review areas. Each panel is also a tab.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Panel {
    Repo,
    User,
}

impl Panel {
    pub const ALL: [Panel; 2] = [Panel::Repo, Panel::User];

    /// Stable identifier used by `--tab` and `open_tab`
    pub fn id(self) -> &'static str {
        match self {
            Panel::Repo => "repo",
            Panel::User => "user",
        }
    }

    pub fn from_id(id: &str) -> Option<Panel> {
        Panel::ALL.into_iter().find(|p| p.id() == id.trim())
    }

    pub fn label(self) -> &'static str {
        match self {
            Panel::Repo => "Repository",
            Panel::User => "User",
        }
    }

    /// Filename stem for downloads (`repo-review.md`, `user-review.html`, ...)
    pub fn file_stem(self) -> &'static str {
        match self {
            Panel::Repo => "repo-review",
            Panel::User => "user-review",
        }
    }

    pub(crate) fn index(self) -> usize {
        match self {
            Panel::Repo => 0,
            Panel::User => 1,
        }
    }

    pub fn next(self) -> Panel {
        match self {
            Panel::Repo => Panel::User,
            Panel::User => Panel::Repo,
        }
    }
}

// ── View mode ──

/// Per-panel toggle: raw Markdown text or rendered HTML
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewMode {
    Raw,
    Rendered,
}

impl ViewMode {
    pub fn toggled(self) -> ViewMode {
        match self {
            ViewMode::Raw => ViewMode::Rendered,
            ViewMode::Rendered => ViewMode::Raw,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ViewMode::Raw => "MARKDOWN",
            ViewMode::Rendered => "RENDERED",
        }
    }

    pub fn extension(self) -> &'static str {
        match self {
            ViewMode::Raw => "md",
            ViewMode::Rendered => "html",
        }
    }

    pub fn mime_type(self) -> &'static str {
        match self {
            ViewMode::Raw => "text/markdown",
            ViewMode::Rendered => "text/html",
        }
    }
}

// ── Panel output ──

/// What a panel is currently showing
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PanelOutput {
    Placeholder,
    Loading { subject: String },
    Error { message: String },
    /// Literal Markdown source, never interpreted as markup
    Raw { text: String },
    /// Sanitized HTML plus the Markdown it came from (the TUI draws the latter)
    Rendered { markdown: String, html: String },
}

impl Default for PanelOutput {
    fn default() -> Self {
        PanelOutput::Placeholder
    }
}

pub const PLACEHOLDER_TEXT: &str = "Your AI-powered review will appear here.";

// ── Errors ──

/// Missing required input. Shown in place; no request is made.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Please enter both owner and repo.")]
    MissingRepo,
    #[error("Please enter a username.")]
    MissingUsername,
}

// ── Capabilities ──

/// Display surface the controller drives. The TUI implements this; tests use
/// an in-memory double.
pub trait ReviewView {
    /// Replace the content of `panel`
    fn show(&mut self, panel: Panel, output: PanelOutput);

    fn view_mode(&self, panel: Panel) -> ViewMode;

    fn set_view_mode(&mut self, panel: Panel, mode: ViewMode);

    /// Make `tab` the only visible panel and mark its selector active
    fn show_tab(&mut self, tab: Panel);

    /// Transient user-visible message (copy/download results, empty-state notices)
    fn notify(&mut self, message: &str);
}

/// System clipboard write capability
pub trait Clipboard {
    fn write_text(&mut self, text: &str) -> Result<()>;
}

/// File-save capability. Returns where the file ended up.
pub trait FileSink {
    fn save(&mut self, filename: &str, mime_type: &str, content: &[u8]) -> Result<PathBuf>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn panel_ids_round_trip_and_reject_unknown() {
        assert_eq!(Panel::from_id("repo"), Some(Panel::Repo));
        assert_eq!(Panel::from_id(" user "), Some(Panel::User));
        assert_eq!(Panel::from_id("settings"), None);
        assert_eq!(Panel::from_id(""), None);
    }

    #[test]
    fn panel_next_alternates() {
        assert_eq!(Panel::Repo.next(), Panel::User);
        assert_eq!(Panel::User.next(), Panel::Repo);
    }

    #[test]
    fn view_mode_controls_export_format() {
        assert_eq!(ViewMode::Raw.extension(), "md");
        assert_eq!(ViewMode::Raw.mime_type(), "text/markdown");
        assert_eq!(ViewMode::Rendered.extension(), "html");
        assert_eq!(ViewMode::Rendered.mime_type(), "text/html");
        assert_eq!(ViewMode::Raw.toggled(), ViewMode::Rendered);
        assert_eq!(ViewMode::Rendered.toggled(), ViewMode::Raw);
    }

    #[test]
    fn validation_messages_match_prompts() {
        assert_eq!(
            ValidationError::MissingRepo.to_string(),
            "Please enter both owner and repo."
        );
        assert_eq!(
            ValidationError::MissingUsername.to_string(),
            "Please enter a username."
        );
    }
}
