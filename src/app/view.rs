use crate::review::{Panel, PanelOutput, ReviewView, ViewMode};

/// Ticks a notification stays on screen (~2s at the 100ms poll interval)
const NOTICE_TICKS: u8 = 20;

/// Terminal-side view state: what each panel shows, its toggle and scroll
/// offset, the visible tab, and the current notification.
#[derive(Debug, Clone)]
pub struct TuiView {
    outputs: [PanelOutput; 2],
    modes: [ViewMode; 2],
    scroll: [u16; 2],
    active_tab: Panel,

    /// Last notification message
    pub notice: Option<String>,

    /// Ticks since the notification appeared (for auto-clearing)
    pub notice_ticks: u8,
}

impl TuiView {
    pub fn new(initial_mode: ViewMode) -> Self {
        Self {
            outputs: [PanelOutput::Placeholder, PanelOutput::Placeholder],
            modes: [initial_mode; 2],
            scroll: [0; 2],
            active_tab: Panel::Repo,
            notice: None,
            notice_ticks: 0,
        }
    }

    pub fn output(&self, panel: Panel) -> &PanelOutput {
        &self.outputs[panel.index()]
    }

    pub fn active_tab(&self) -> Panel {
        self.active_tab
    }

    pub fn scroll(&self, panel: Panel) -> u16 {
        self.scroll[panel.index()]
    }

    pub fn scroll_down(&mut self, panel: Panel, n: u16) {
        let s = &mut self.scroll[panel.index()];
        *s = s.saturating_add(n);
    }

    pub fn scroll_up(&mut self, panel: Panel, n: u16) {
        let s = &mut self.scroll[panel.index()];
        *s = s.saturating_sub(n);
    }

    pub fn scroll_to_top(&mut self, panel: Panel) {
        self.scroll[panel.index()] = 0;
    }

    /// Advance the notification timer; clears it after [`NOTICE_TICKS`]
    pub fn tick(&mut self) {
        if self.notice.is_some() {
            self.notice_ticks += 1;
            if self.notice_ticks > NOTICE_TICKS {
                self.notice = None;
                self.notice_ticks = 0;
            }
        }
    }
}

impl ReviewView for TuiView {
    fn show(&mut self, panel: Panel, output: PanelOutput) {
        // A re-render of the same content keeps the reader's position
        if self.outputs[panel.index()] != output {
            self.scroll[panel.index()] = 0;
        }
        self.outputs[panel.index()] = output;
    }

    fn view_mode(&self, panel: Panel) -> ViewMode {
        self.modes[panel.index()]
    }

    fn set_view_mode(&mut self, panel: Panel, mode: ViewMode) {
        self.modes[panel.index()] = mode;
    }

    fn show_tab(&mut self, tab: Panel) {
        self.active_tab = tab;
    }

    fn notify(&mut self, message: &str) {
        self.notice = Some(message.to_string());
        self.notice_ticks = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_on_repo_tab_with_placeholders() {
        let view = TuiView::new(ViewMode::Rendered);
        assert_eq!(view.active_tab(), Panel::Repo);
        assert_eq!(view.output(Panel::Repo), &PanelOutput::Placeholder);
        assert_eq!(view.output(Panel::User), &PanelOutput::Placeholder);
        assert_eq!(view.view_mode(Panel::User), ViewMode::Rendered);
    }

    #[test]
    fn show_tab_is_exclusive() {
        let mut view = TuiView::new(ViewMode::Raw);
        view.show_tab(Panel::User);
        assert_eq!(view.active_tab(), Panel::User);
        view.show_tab(Panel::Repo);
        assert_eq!(view.active_tab(), Panel::Repo);
    }

    #[test]
    fn new_content_resets_scroll_but_rerender_keeps_it() {
        let mut view = TuiView::new(ViewMode::Raw);
        let text = PanelOutput::Raw {
            text: "a\nb\nc".to_string(),
        };
        view.show(Panel::Repo, text.clone());
        view.scroll_down(Panel::Repo, 5);

        view.show(Panel::Repo, text);
        assert_eq!(view.scroll(Panel::Repo), 5);

        view.show(Panel::Repo, PanelOutput::Placeholder);
        assert_eq!(view.scroll(Panel::Repo), 0);
    }

    #[test]
    fn scroll_saturates_at_top() {
        let mut view = TuiView::new(ViewMode::Raw);
        view.scroll_down(Panel::User, 3);
        view.scroll_up(Panel::User, 10);
        assert_eq!(view.scroll(Panel::User), 0);
        assert_eq!(view.scroll(Panel::Repo), 0);
    }

    #[test]
    fn notice_clears_after_timeout() {
        let mut view = TuiView::new(ViewMode::Raw);
        view.notify("Saved");
        for _ in 0..NOTICE_TICKS {
            view.tick();
        }
        assert_eq!(view.notice.as_deref(), Some("Saved"));
        view.tick();
        assert_eq!(view.notice, None);
    }
}
