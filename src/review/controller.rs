use std::sync::mpsc;
use std::sync::Arc;

use crate::api::{RequestError, ReviewApi, ReviewTarget};

use super::render;
use super::{Clipboard, FileSink, Panel, PanelOutput, ReviewView, ValidationError, ViewMode};

/// Result of one fetch, sent from the worker thread back to the UI thread
#[derive(Debug)]
pub struct FetchOutcome {
    pub panel: Panel,
    /// Sequence number issued when the fetch started
    pub seq: u64,
    pub subject: String,
    pub result: Result<String, RequestError>,
}

/// Owns the per-panel review state and drives the view.
///
/// Fetches run on worker threads and report back through the channel returned
/// by [`ReviewController::new`]; the owner feeds each outcome to
/// [`ReviewController::apply`] on the UI thread. Every other operation is
/// synchronous and never fails outward: errors end up in the view.
pub struct ReviewController<V: ReviewView> {
    view: V,
    api: Arc<dyn ReviewApi>,
    clipboard: Box<dyn Clipboard>,
    sink: Box<dyn FileSink>,
    outcomes: mpsc::Sender<FetchOutcome>,

    repo_markdown: String,
    user_markdown: String,

    /// Latest sequence number issued per panel. Outcomes carrying an older
    /// number are dropped.
    latest_seq: [u64; 2],

    /// Wrap rendered downloads in a full HTML document
    standalone_html: bool,
}

impl<V: ReviewView> ReviewController<V> {
    pub fn new(
        view: V,
        api: Arc<dyn ReviewApi>,
        clipboard: Box<dyn Clipboard>,
        sink: Box<dyn FileSink>,
    ) -> (Self, mpsc::Receiver<FetchOutcome>) {
        let (tx, rx) = mpsc::channel();
        let controller = Self {
            view,
            api,
            clipboard,
            sink,
            outcomes: tx,
            repo_markdown: String::new(),
            user_markdown: String::new(),
            latest_seq: [0; 2],
            standalone_html: false,
        };
        (controller, rx)
    }

    pub fn set_standalone_html(&mut self, standalone: bool) {
        self.standalone_html = standalone;
    }

    pub fn view(&self) -> &V {
        &self.view
    }

    pub fn view_mut(&mut self) -> &mut V {
        &mut self.view
    }

    /// Stored Markdown for `panel` (empty until a fetch succeeds)
    pub fn markdown(&self, panel: Panel) -> &str {
        match panel {
            Panel::Repo => &self.repo_markdown,
            Panel::User => &self.user_markdown,
        }
    }

    fn slot_mut(&mut self, panel: Panel) -> &mut String {
        match panel {
            Panel::Repo => &mut self.repo_markdown,
            Panel::User => &mut self.user_markdown,
        }
    }

    // ── Fetching ──

    /// Request a review of `owner/repo`. Returns the fetch's sequence number.
    pub fn fetch_repo_review(&mut self, owner: &str, repo: &str) -> Result<u64, ValidationError> {
        let (owner, repo) = (owner.trim(), repo.trim());
        if owner.is_empty() || repo.is_empty() {
            return Err(self.reject(Panel::Repo, ValidationError::MissingRepo));
        }
        Ok(self.dispatch(ReviewTarget::Repo {
            owner: owner.to_string(),
            repo: repo.to_string(),
        }))
    }

    /// Request a review of a user's activity. Returns the fetch's sequence number.
    pub fn fetch_user_review(&mut self, username: &str) -> Result<u64, ValidationError> {
        let username = username.trim();
        if username.is_empty() {
            return Err(self.reject(Panel::User, ValidationError::MissingUsername));
        }
        Ok(self.dispatch(ReviewTarget::User {
            username: username.to_string(),
        }))
    }

    fn reject(&mut self, panel: Panel, err: ValidationError) -> ValidationError {
        tracing::debug!(panel = panel.id(), "rejected fetch: {}", err);
        self.view.show(
            panel,
            PanelOutput::Error {
                message: err.to_string(),
            },
        );
        err
    }

    fn dispatch(&mut self, target: ReviewTarget) -> u64 {
        let panel = target.panel();
        let subject = target.subject();
        let seq = {
            let latest = &mut self.latest_seq[panel.index()];
            *latest += 1;
            *latest
        };

        tracing::info!(panel = panel.id(), seq, %subject, "fetching review");
        self.view.show(
            panel,
            PanelOutput::Loading {
                subject: subject.clone(),
            },
        );

        let api = Arc::clone(&self.api);
        let tx = self.outcomes.clone();
        std::thread::spawn(move || {
            let result = api.fetch_review(&target);
            // Receiver gone means the app is shutting down
            let _ = tx.send(FetchOutcome {
                panel,
                seq,
                subject,
                result,
            });
        });

        seq
    }

    /// Apply a finished fetch. Outcomes superseded by a newer fetch for the
    /// same panel are discarded without touching state or view.
    pub fn apply(&mut self, outcome: FetchOutcome) {
        let FetchOutcome {
            panel,
            seq,
            subject,
            result,
        } = outcome;

        let latest = self.latest_seq[panel.index()];
        if seq != latest {
            tracing::debug!(panel = panel.id(), seq, latest, "discarding superseded review");
            return;
        }

        match result {
            Ok(markdown) => {
                tracing::info!(panel = panel.id(), %subject, bytes = markdown.len(), "review received");
                *self.slot_mut(panel) = markdown;
                self.render(panel);
            }
            Err(err) => {
                tracing::warn!(panel = panel.id(), %subject, "review request failed: {}", err);
                self.view.show(
                    panel,
                    PanelOutput::Error {
                        message: format!("Error fetching review: {}", err),
                    },
                );
            }
        }
    }

    // ── Rendering ──

    /// Redraw `panel` from its state slot and current toggle. No network access.
    pub fn render(&mut self, panel: Panel) {
        let markdown = self.markdown(panel);
        let output = if markdown.is_empty() {
            PanelOutput::Placeholder
        } else {
            match self.view.view_mode(panel) {
                ViewMode::Rendered => PanelOutput::Rendered {
                    markdown: markdown.to_string(),
                    html: render::to_html(markdown),
                },
                ViewMode::Raw => PanelOutput::Raw {
                    text: markdown.to_string(),
                },
            }
        };
        self.view.show(panel, output);
    }

    pub fn set_view_mode(&mut self, panel: Panel, mode: ViewMode) {
        self.view.set_view_mode(panel, mode);
        self.render(panel);
    }

    pub fn toggle_view_mode(&mut self, panel: Panel) -> ViewMode {
        let mode = self.view.view_mode(panel).toggled();
        self.set_view_mode(panel, mode);
        mode
    }

    // ── Export ──

    /// Copy the panel's Markdown source (never the HTML) to the clipboard
    pub fn copy(&mut self, panel: Panel) {
        if self.markdown(panel).is_empty() {
            self.view.notify("Nothing to copy!");
            return;
        }

        let text = self.markdown(panel).to_string();
        match self.clipboard.write_text(&text) {
            Ok(()) => {
                tracing::info!(panel = panel.id(), "copied review to clipboard");
                self.view.notify("Markdown copied to clipboard!");
            }
            Err(err) => {
                tracing::warn!(panel = panel.id(), "clipboard write failed: {:#}", err);
                self.view.notify(&format!("Failed to copy: {:#}", err));
            }
        }
    }

    /// Save the panel as `.md` (raw mode) or `.html` (rendered mode)
    pub fn download(&mut self, panel: Panel) {
        if self.markdown(panel).is_empty() {
            self.view.notify("Nothing to download!");
            return;
        }

        let markdown = self.markdown(panel);
        let mode = self.view.view_mode(panel);
        let content = match mode {
            ViewMode::Raw => markdown.to_string(),
            ViewMode::Rendered => {
                let html = render::to_html(markdown);
                if self.standalone_html {
                    render::standalone_document(&format!("{} review", panel.label()), &html)
                } else {
                    html
                }
            }
        };
        let filename = format!("{}.{}", panel.file_stem(), mode.extension());

        match self.sink.save(&filename, mode.mime_type(), content.as_bytes()) {
            Ok(path) => {
                tracing::info!(panel = panel.id(), path = %path.display(), "saved review");
                self.view.notify(&format!("Saved {}", path.display()));
            }
            Err(err) => {
                tracing::warn!(panel = panel.id(), %filename, "save failed: {:#}", err);
                self.view.notify(&format!("Failed to save: {:#}", err));
            }
        }
    }

    // ── Tabs ──

    pub fn select_tab(&mut self, tab: Panel) {
        self.view.show_tab(tab);
    }

    /// Select a tab by identifier. Unknown identifiers are logged and leave
    /// the visible tab unchanged.
    pub fn open_tab(&mut self, id: &str) -> bool {
        match Panel::from_id(id) {
            Some(tab) => {
                self.select_tab(tab);
                true
            }
            None => {
                tracing::warn!(id, "tab not found");
                false
            }
        }
    }
}
