use std::sync::mpsc;
use std::sync::Arc;

use crate::api::{parse_repo_spec, ReviewApi};
use crate::review::{Clipboard, FetchOutcome, FileSink, Panel, ReviewController, ReviewView, ViewMode};

use super::TuiView;

// ── Enums ──

/// Whether we're navigating or typing into an input field
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputMode {
    Normal,
    Editing,
}

/// Text inputs. The repo tab has owner + repo, the user tab has username.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputField {
    Owner,
    Repo,
    Username,
}

impl InputField {
    pub fn label(&self) -> &'static str {
        match self {
            InputField::Owner => "Owner",
            InputField::Repo => "Repo",
            InputField::Username => "Username",
        }
    }

    /// Fields shown on a tab, in focus order
    pub fn for_tab(tab: Panel) -> &'static [InputField] {
        match tab {
            Panel::Repo => &[InputField::Owner, InputField::Repo],
            Panel::User => &[InputField::Username],
        }
    }
}

// ── Main App State ──

pub struct App {
    pub controller: ReviewController<TuiView>,

    /// Fetch results from worker threads
    outcomes: mpsc::Receiver<FetchOutcome>,

    pub input_mode: InputMode,

    /// Field receiving keystrokes in editing mode
    pub focus: InputField,

    pub owner_input: String,
    pub repo_input: String,
    pub username_input: String,

    /// Review service URL (shown in the top bar)
    pub server_url: String,

    /// Wrap long lines in the panel body
    pub wrap_lines: bool,

    /// Should the app quit?
    pub should_quit: bool,

    /// Event loop iterations; drives the loading spinner
    pub ticks: u64,
}

impl App {
    pub fn new(
        api: Arc<dyn ReviewApi>,
        clipboard: Box<dyn Clipboard>,
        sink: Box<dyn FileSink>,
        initial_mode: ViewMode,
    ) -> Self {
        let (controller, outcomes) =
            ReviewController::new(TuiView::new(initial_mode), api, clipboard, sink);
        App {
            controller,
            outcomes,
            input_mode: InputMode::Normal,
            focus: InputField::Owner,
            owner_input: String::new(),
            repo_input: String::new(),
            username_input: String::new(),
            server_url: String::new(),
            wrap_lines: true,
            should_quit: false,
            ticks: 0,
        }
    }

    // ── Accessors ──

    pub fn view(&self) -> &TuiView {
        self.controller.view()
    }

    pub fn active_tab(&self) -> Panel {
        self.view().active_tab()
    }

    pub fn input(&self, field: InputField) -> &str {
        match field {
            InputField::Owner => &self.owner_input,
            InputField::Repo => &self.repo_input,
            InputField::Username => &self.username_input,
        }
    }

    fn input_mut(&mut self, field: InputField) -> &mut String {
        match field {
            InputField::Owner => &mut self.owner_input,
            InputField::Repo => &mut self.repo_input,
            InputField::Username => &mut self.username_input,
        }
    }

    // ── Tabs ──

    pub fn select_tab(&mut self, tab: Panel) {
        self.controller.select_tab(tab);
        self.focus = InputField::for_tab(tab)[0];
    }

    pub fn next_tab(&mut self) {
        self.select_tab(self.active_tab().next());
    }

    /// Select a tab by identifier; unknown ids leave the current tab in place
    pub fn open_tab(&mut self, id: &str) {
        if self.controller.open_tab(id) {
            self.focus = InputField::for_tab(self.active_tab())[0];
        }
    }

    // ── Prefill (CLI) ──

    /// Fill owner/repo from `OWNER/REPO`. Returns false if it is malformed.
    pub fn prefill_repo(&mut self, spec: &str) -> bool {
        match parse_repo_spec(spec) {
            Some((owner, repo)) => {
                self.owner_input = owner;
                self.repo_input = repo;
                true
            }
            None => false,
        }
    }

    pub fn prefill_user(&mut self, username: &str) {
        self.username_input = username.trim().to_string();
    }

    // ── Input editing ──

    pub fn start_editing(&mut self) {
        self.input_mode = InputMode::Editing;
        let fields = InputField::for_tab(self.active_tab());
        if !fields.contains(&self.focus) {
            self.focus = fields[0];
        }
    }

    pub fn stop_editing(&mut self) {
        self.input_mode = InputMode::Normal;
    }

    /// Move focus to the next field on the active tab (circular)
    pub fn focus_next_field(&mut self) {
        let fields = InputField::for_tab(self.active_tab());
        let idx = fields.iter().position(|f| *f == self.focus).unwrap_or(0);
        self.focus = fields[(idx + 1) % fields.len()];
    }

    pub fn input_push(&mut self, c: char) {
        let field = self.focus;
        self.input_mut(field).push(c);
    }

    pub fn input_backspace(&mut self) {
        let field = self.focus;
        self.input_mut(field).pop();
    }

    pub fn input_clear(&mut self) {
        let field = self.focus;
        self.input_mut(field).clear();
    }

    // ── Review actions (always target the active tab) ──

    /// Start a fetch for the active tab from the current inputs.
    /// Validation failures are already displayed in the panel.
    pub fn fetch_active(&mut self) {
        self.stop_editing();
        let started = match self.active_tab() {
            Panel::Repo => {
                let (owner, repo) = (self.owner_input.clone(), self.repo_input.clone());
                self.controller.fetch_repo_review(&owner, &repo)
            }
            Panel::User => {
                let username = self.username_input.clone();
                self.controller.fetch_user_review(&username)
            }
        };
        if let Err(err) = started {
            tracing::debug!(tab = self.active_tab().id(), "fetch not started: {}", err);
        }
    }

    pub fn toggle_view_mode(&mut self) {
        let tab = self.active_tab();
        let mode = self.controller.toggle_view_mode(tab);
        self.notify(&format!("View: {}", mode.label().to_lowercase()));
    }

    pub fn copy_active(&mut self) {
        let tab = self.active_tab();
        self.controller.copy(tab);
    }

    pub fn download_active(&mut self) {
        let tab = self.active_tab();
        self.controller.download(tab);
    }

    pub fn scroll_down(&mut self, n: u16) {
        let tab = self.active_tab();
        self.controller.view_mut().scroll_down(tab, n);
    }

    pub fn scroll_up(&mut self, n: u16) {
        let tab = self.active_tab();
        self.controller.view_mut().scroll_up(tab, n);
    }

    pub fn scroll_to_top(&mut self) {
        let tab = self.active_tab();
        self.controller.view_mut().scroll_to_top(tab);
    }

    // ── Event loop hooks ──

    /// Apply every fetch result that has arrived. Returns how many were applied.
    pub fn poll_outcomes(&mut self) -> usize {
        let mut applied = 0;
        while let Ok(outcome) = self.outcomes.try_recv() {
            self.controller.apply(outcome);
            applied += 1;
        }
        applied
    }

    // ── Notifications ──

    pub fn notify(&mut self, msg: &str) {
        self.controller.view_mut().notify(msg);
    }

    /// Called on every event loop iteration; drives the spinner and notification auto-clear
    pub fn tick(&mut self) {
        self.ticks = self.ticks.wrapping_add(1);
        self.controller.view_mut().tick();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{RequestError, ReviewTarget};
    use crate::review::PanelOutput;
    use anyhow::Result;
    use std::path::PathBuf;
    use std::time::{Duration, Instant};

    struct EchoApi;

    impl ReviewApi for EchoApi {
        fn fetch_review(&self, target: &ReviewTarget) -> Result<String, RequestError> {
            Ok(format!("# {}", target.subject()))
        }
    }

    struct NoClipboard;

    impl Clipboard for NoClipboard {
        fn write_text(&mut self, _text: &str) -> Result<()> {
            Ok(())
        }
    }

    struct NoSink;

    impl FileSink for NoSink {
        fn save(&mut self, filename: &str, _mime_type: &str, _content: &[u8]) -> Result<PathBuf> {
            Ok(PathBuf::from(filename))
        }
    }

    fn make_app() -> App {
        App::new(
            Arc::new(EchoApi),
            Box::new(NoClipboard),
            Box::new(NoSink),
            ViewMode::Raw,
        )
    }

    /// Poll until a fetch result lands (worker threads are fast but not instant)
    fn wait_for_outcome(app: &mut App) {
        let deadline = Instant::now() + Duration::from_secs(5);
        while app.poll_outcomes() == 0 {
            assert!(Instant::now() < deadline, "fetch never completed");
            std::thread::sleep(Duration::from_millis(5));
        }
    }

    #[test]
    fn typing_fills_focused_field() {
        let mut app = make_app();
        app.start_editing();
        assert_eq!(app.input_mode, InputMode::Editing);
        assert_eq!(app.focus, InputField::Owner);

        for c in "pallets".chars() {
            app.input_push(c);
        }
        app.focus_next_field();
        for c in "flaskx".chars() {
            app.input_push(c);
        }
        app.input_backspace();

        assert_eq!(app.owner_input, "pallets");
        assert_eq!(app.repo_input, "flask");

        app.focus_next_field();
        assert_eq!(app.focus, InputField::Owner);
    }

    #[test]
    fn switching_tabs_moves_focus() {
        let mut app = make_app();
        app.next_tab();
        assert_eq!(app.active_tab(), Panel::User);
        assert_eq!(app.focus, InputField::Username);

        app.focus_next_field();
        assert_eq!(app.focus, InputField::Username);

        app.open_tab("nonexistent");
        assert_eq!(app.active_tab(), Panel::User);

        app.open_tab("repo");
        assert_eq!(app.active_tab(), Panel::Repo);
        assert_eq!(app.focus, InputField::Owner);
    }

    #[test]
    fn fetch_active_uses_inputs_of_visible_tab() {
        let mut app = make_app();
        assert!(app.prefill_repo("pallets/flask"));
        app.fetch_active();
        wait_for_outcome(&mut app);

        assert_eq!(app.controller.markdown(Panel::Repo), "# pallets/flask");
        assert_eq!(app.controller.markdown(Panel::User), "");
        assert_eq!(
            app.view().output(Panel::Repo),
            &PanelOutput::Raw {
                text: "# pallets/flask".to_string()
            }
        );
    }

    #[test]
    fn fetch_with_empty_username_shows_validation() {
        let mut app = make_app();
        app.select_tab(Panel::User);
        app.fetch_active();

        assert_eq!(app.poll_outcomes(), 0);
        assert_eq!(
            app.view().output(Panel::User),
            &PanelOutput::Error {
                message: "Please enter a username.".to_string()
            }
        );
    }

    #[test]
    fn toggle_notifies_new_mode() {
        let mut app = make_app();
        app.prefill_user("octocat");
        app.select_tab(Panel::User);
        app.fetch_active();
        wait_for_outcome(&mut app);

        app.toggle_view_mode();
        assert!(matches!(
            app.view().output(Panel::User),
            PanelOutput::Rendered { .. }
        ));
        assert_eq!(app.view().notice.as_deref(), Some("View: rendered"));
    }

    #[test]
    fn prefill_repo_rejects_malformed_spec() {
        let mut app = make_app();
        assert!(!app.prefill_repo("flask"));
        assert_eq!(app.owner_input, "");
        assert_eq!(app.repo_input, "");
    }
}
