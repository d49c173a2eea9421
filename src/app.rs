//! Application state and navigation logic.

use std::path::Path;
use std::time::{Duration, Instant};

use anyhow::Result;

use crate::dashboard::Dashboard;
use crate::notify::{Notice, NoticeBoard};
use crate::ui::Theme;

/// How long a status message stays visible.
const STATUS_TTL: Duration = Duration::from_secs(3);

/// The current view/tab in the TUI.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    /// Temperature and vibration bar charts.
    Charts,
    /// Alert cards, newest first.
    Alerts,
    /// Record cards, newest first.
    Records,
}

impl View {
    pub const ALL: [View; 3] = [View::Charts, View::Alerts, View::Records];

    /// Cycle to the next view.
    pub fn next(self) -> Self {
        match self {
            View::Charts => View::Alerts,
            View::Alerts => View::Records,
            View::Records => View::Charts,
        }
    }

    /// Cycle to the previous view.
    pub fn prev(self) -> Self {
        match self {
            View::Charts => View::Records,
            View::Alerts => View::Charts,
            View::Records => View::Alerts,
        }
    }

    /// Returns the display label for this view.
    pub fn label(&self) -> &'static str {
        match self {
            View::Charts => "Charts",
            View::Alerts => "Alerts",
            View::Records => "Records",
        }
    }

    /// Position of this view in the tab bar.
    pub fn index(&self) -> usize {
        match self {
            View::Charts => 0,
            View::Alerts => 1,
            View::Records => 2,
        }
    }
}

/// Main application state.
pub struct App {
    pub running: bool,
    pub current_view: View,
    pub show_help: bool,

    dashboard: Dashboard,
    notices: NoticeBoard,

    // Card list positions
    pub alert_index: usize,
    pub record_index: usize,

    pub theme: Theme,

    // Status message (temporary feedback)
    pub status_message: Option<(String, Instant)>,
}

impl App {
    /// Create an App around an activated (or about to be activated) dashboard.
    ///
    /// `notices` must be the board of the [`ModalNotifier`](crate::ModalNotifier)
    /// the dashboard was built with.
    pub fn new(dashboard: Dashboard, notices: NoticeBoard) -> Self {
        Self::with_theme(dashboard, notices, Theme::auto_detect())
    }

    pub fn with_theme(dashboard: Dashboard, notices: NoticeBoard, theme: Theme) -> Self {
        Self {
            running: true,
            current_view: View::Charts,
            show_help: false,
            dashboard,
            notices,
            alert_index: 0,
            record_index: 0,
            theme,
            status_message: None,
        }
    }

    pub fn dashboard(&self) -> &Dashboard {
        &self.dashboard
    }

    pub fn dashboard_mut(&mut self) -> &mut Dashboard {
        &mut self.dashboard
    }

    /// Apply queued dashboard inputs, at most `budget` of them.
    ///
    /// Stops as soon as a notice is raised: nothing else is processed until
    /// the user has acknowledged it. Returns the number of inputs applied.
    pub fn pump(&mut self, budget: usize) -> usize {
        let mut applied = 0;
        while applied < budget && !self.notices.is_blocking() && self.dashboard.step() {
            applied += 1;
        }
        if applied > 0 {
            self.clamp_selection();
        }
        applied
    }

    /// The notice awaiting acknowledgement, if any.
    pub fn current_notice(&self) -> Option<Notice> {
        self.notices.current()
    }

    /// Number of notices waiting, including the one shown.
    pub fn pending_notices(&self) -> usize {
        self.notices.len()
    }

    /// Acknowledge the notice currently shown.
    pub fn dismiss_notice(&mut self) {
        self.notices.dismiss();
    }

    /// Re-issue both bulk reads.
    pub fn refresh(&mut self) {
        self.dashboard.refresh();
        self.set_status_message("Refreshing...".to_string());
    }

    /// Set a temporary status message that will be shown for a few seconds.
    pub fn set_status_message(&mut self, message: String) {
        self.status_message = Some((message, Instant::now()));
    }

    /// Get the current status message if it hasn't expired.
    pub fn get_status_message(&self) -> Option<&str> {
        match &self.status_message {
            Some((msg, time)) if time.elapsed() < STATUS_TTL => Some(msg),
            _ => None,
        }
    }

    /// Switch to the next view (cycles through Charts → Alerts → Records).
    pub fn next_view(&mut self) {
        self.current_view = self.current_view.next();
    }

    /// Switch to the previous view.
    pub fn prev_view(&mut self) {
        self.current_view = self.current_view.prev();
    }

    /// Switch to a specific view.
    pub fn set_view(&mut self, view: View) {
        self.current_view = view;
    }

    /// Move selection down by one card.
    pub fn select_next(&mut self) {
        self.select_next_n(1);
    }

    /// Move selection up by one card.
    pub fn select_prev(&mut self) {
        self.select_prev_n(1);
    }

    /// Move selection down by n cards.
    pub fn select_next_n(&mut self, n: usize) {
        let max = self.card_count().saturating_sub(1);
        if let Some(index) = self.selection_mut() {
            *index = (*index + n).min(max);
        }
    }

    /// Move selection up by n cards.
    pub fn select_prev_n(&mut self, n: usize) {
        if let Some(index) = self.selection_mut() {
            *index = index.saturating_sub(n);
        }
    }

    /// Jump to the newest card.
    pub fn select_first(&mut self) {
        if let Some(index) = self.selection_mut() {
            *index = 0;
        }
    }

    /// Jump to the oldest card.
    pub fn select_last(&mut self) {
        let last = self.card_count().saturating_sub(1);
        if let Some(index) = self.selection_mut() {
            *index = last;
        }
    }

    fn card_count(&self) -> usize {
        match self.current_view {
            View::Charts => 0,
            View::Alerts => self.dashboard.alerts().len(),
            View::Records => self.dashboard.records().len(),
        }
    }

    fn selection_mut(&mut self) -> Option<&mut usize> {
        match self.current_view {
            View::Charts => None,
            View::Alerts => Some(&mut self.alert_index),
            View::Records => Some(&mut self.record_index),
        }
    }

    fn clamp_selection(&mut self) {
        let alerts = self.dashboard.alerts().len();
        let records = self.dashboard.records().len();
        self.alert_index = self.alert_index.min(alerts.saturating_sub(1));
        self.record_index = self.record_index.min(records.saturating_sub(1));
    }

    /// Toggle the help overlay.
    pub fn toggle_help(&mut self) {
        self.show_help = !self.show_help;
    }

    /// Signal the application to quit and release the push channel.
    pub fn quit(&mut self) {
        self.running = false;
        self.dashboard.deactivate();
    }

    /// Export current state to a file.
    pub fn export_state(&self, path: &Path) -> Result<()> {
        self.dashboard.snapshot().write_json(path)
    }
}
