//! Application state and navigation logic.

use std::path::Path;
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use tokio::sync::watch;

use crate::data::{CountryScore, DashboardView, EventView};
use crate::poller::PollReport;
use crate::ui::Theme;

/// How long a status message stays in the status bar.
const STATUS_MESSAGE_TTL: Duration = Duration::from_secs(3);

/// The current tab.
///
/// Event detail is an overlay (`App::show_event_detail`), not a tab.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    /// Headline metrics and the index chart.
    Overview,
    /// Countries ranked by score.
    Countries,
    /// Top events by priority.
    Stream,
    /// Scoring weights and formula.
    Methodology,
}

impl View {
    pub const ALL: [View; 4] = [View::Overview, View::Countries, View::Stream, View::Methodology];

    pub fn next(self) -> Self {
        match self {
            View::Overview => View::Countries,
            View::Countries => View::Stream,
            View::Stream => View::Methodology,
            View::Methodology => View::Overview,
        }
    }

    pub fn prev(self) -> Self {
        match self {
            View::Overview => View::Methodology,
            View::Countries => View::Overview,
            View::Stream => View::Countries,
            View::Methodology => View::Stream,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            View::Overview => "Overview",
            View::Countries => "Countries",
            View::Stream => "Stream",
            View::Methodology => "Methodology",
        }
    }

    pub fn index(&self) -> usize {
        match self {
            View::Overview => 0,
            View::Countries => 1,
            View::Stream => 2,
            View::Methodology => 3,
        }
    }
}

/// Main application state.
///
/// The app never derives anything itself: it reads the latest published
/// [`DashboardView`] and the clock from watch channels once per frame.
pub struct App {
    pub running: bool,
    pub current_view: View,
    pub show_help: bool,
    pub show_event_detail: bool,

    source_description: String,
    views: watch::Receiver<Option<Arc<DashboardView>>>,
    clock: watch::Receiver<DateTime<Utc>>,
    reports: watch::Receiver<Option<PollReport>>,

    pub dashboard: Option<Arc<DashboardView>>,
    pub now: DateTime<Utc>,
    pub last_report: Option<PollReport>,

    pub selected_country_index: usize,
    pub selected_event_index: usize,

    pub filter_text: String,
    pub filter_active: bool,

    pub theme: Theme,

    status_message: Option<(String, Instant)>,
}

impl App {
    pub fn new(
        source_description: &str,
        mut views: watch::Receiver<Option<Arc<DashboardView>>>,
        mut clock: watch::Receiver<DateTime<Utc>>,
        mut reports: watch::Receiver<Option<PollReport>>,
        theme: Theme,
    ) -> Self {
        let dashboard = views.borrow_and_update().clone();
        let now = *clock.borrow_and_update();
        let last_report = reports.borrow_and_update().clone();
        Self {
            running: true,
            current_view: View::Overview,
            show_help: false,
            show_event_detail: false,
            source_description: source_description.to_string(),
            dashboard,
            now,
            last_report,
            views,
            clock,
            reports,
            selected_country_index: 0,
            selected_event_index: 0,
            filter_text: String::new(),
            filter_active: false,
            theme,
            status_message: None,
        }
    }

    pub fn source_description(&self) -> &str {
        &self.source_description
    }

    /// Pick up whatever the background tasks published since the last frame.
    ///
    /// Returns `true` when a new dashboard view arrived.
    pub fn refresh(&mut self) -> bool {
        if self.clock.has_changed().unwrap_or(false) {
            self.now = *self.clock.borrow_and_update();
        }
        if self.reports.has_changed().unwrap_or(false) {
            self.last_report = self.reports.borrow_and_update().clone();
        }
        if !self.views.has_changed().unwrap_or(false) {
            return false;
        }

        self.dashboard = self.views.borrow_and_update().clone();
        self.clamp_selection();
        true
    }

    pub fn set_status_message(&mut self, message: String) {
        self.status_message = Some((message, Instant::now()));
    }

    pub fn status_message(&self) -> Option<&str> {
        match &self.status_message {
            Some((msg, at)) if at.elapsed() < STATUS_MESSAGE_TTL => Some(msg),
            _ => None,
        }
    }

    pub fn next_view(&mut self) {
        self.set_view(self.current_view.next());
    }

    pub fn prev_view(&mut self) {
        self.set_view(self.current_view.prev());
    }

    pub fn set_view(&mut self, view: View) {
        self.current_view = view;
        self.show_event_detail = false;
    }

    /// Countries matching the current filter, in ranking order.
    pub fn visible_countries(&self) -> Vec<&CountryScore> {
        let Some(dashboard) = &self.dashboard else {
            return Vec::new();
        };
        dashboard
            .countries
            .iter()
            .filter(|c| self.matches_filter(&c.name))
            .collect()
    }

    /// Events matching the current filter, in priority order.
    pub fn visible_events(&self) -> Vec<&EventView> {
        let Some(dashboard) = &self.dashboard else {
            return Vec::new();
        };
        dashboard
            .events
            .iter()
            .filter(|e| {
                self.matches_filter(&e.country)
                    || self.matches_filter(&e.title)
                    || self.matches_filter(&e.category_label)
            })
            .collect()
    }

    pub fn selected_event(&self) -> Option<&EventView> {
        self.visible_events().get(self.selected_event_index).copied()
    }

    fn list_len(&self) -> Option<usize> {
        match self.current_view {
            View::Countries => Some(self.visible_countries().len()),
            View::Stream => Some(self.visible_events().len()),
            View::Overview | View::Methodology => None,
        }
    }

    fn selection_mut(&mut self) -> Option<&mut usize> {
        match self.current_view {
            View::Countries => Some(&mut self.selected_country_index),
            View::Stream => Some(&mut self.selected_event_index),
            View::Overview | View::Methodology => None,
        }
    }

    pub fn select_next(&mut self) {
        self.select_next_n(1);
    }

    pub fn select_prev(&mut self) {
        self.select_prev_n(1);
    }

    pub fn select_next_n(&mut self, n: usize) {
        let Some(len) = self.list_len() else {
            return;
        };
        if let Some(index) = self.selection_mut() {
            *index = (*index + n).min(len.saturating_sub(1));
        }
    }

    pub fn select_prev_n(&mut self, n: usize) {
        if let Some(index) = self.selection_mut() {
            *index = index.saturating_sub(n);
        }
    }

    pub fn select_first(&mut self) {
        if let Some(index) = self.selection_mut() {
            *index = 0;
        }
    }

    pub fn select_last(&mut self) {
        let Some(len) = self.list_len() else {
            return;
        };
        if let Some(index) = self.selection_mut() {
            *index = len.saturating_sub(1);
        }
    }

    /// Select a row by its visual position, ignoring clicks past the end.
    pub fn select_row(&mut self, row: usize) {
        let Some(len) = self.list_len() else {
            return;
        };
        if row < len {
            if let Some(index) = self.selection_mut() {
                *index = row;
            }
        }
    }

    fn clamp_selection(&mut self) {
        let countries = self.visible_countries().len();
        let events = self.visible_events().len();
        self.selected_country_index = self.selected_country_index.min(countries.saturating_sub(1));
        self.selected_event_index = self.selected_event_index.min(events.saturating_sub(1));
    }

    /// Open the event detail overlay (Stream tab only).
    pub fn enter_detail(&mut self) {
        if self.current_view == View::Stream && self.selected_event().is_some() {
            self.show_event_detail = true;
        }
    }

    /// Close the overlay, or return to the overview.
    pub fn go_back(&mut self) {
        if self.show_event_detail {
            self.show_event_detail = false;
            return;
        }
        self.current_view = View::Overview;
    }

    pub fn close_overlay(&mut self) {
        self.show_event_detail = false;
    }

    pub fn toggle_help(&mut self) {
        self.show_help = !self.show_help;
    }

    pub fn start_filter(&mut self) {
        self.filter_active = true;
    }

    pub fn cancel_filter(&mut self) {
        self.filter_active = false;
    }

    pub fn clear_filter(&mut self) {
        self.filter_text.clear();
        self.filter_active = false;
        self.clamp_selection();
    }

    pub fn filter_push(&mut self, c: char) {
        self.filter_text.push(c);
        self.clamp_selection();
    }

    pub fn filter_pop(&mut self) {
        self.filter_text.pop();
        self.clamp_selection();
    }

    /// Case-insensitive substring match against the filter.
    pub fn matches_filter(&self, text: &str) -> bool {
        if self.filter_text.is_empty() {
            return true;
        }
        text.to_lowercase().contains(&self.filter_text.to_lowercase())
    }

    pub fn quit(&mut self) {
        self.running = false;
    }

    /// Write the current dashboard view to `path` as pretty JSON.
    pub fn export_state(&self, path: &Path) -> Result<()> {
        let Some(dashboard) = &self.dashboard else {
            anyhow::bail!("No data to export");
        };
        write_export(dashboard, path)
    }
}

/// Serialize a dashboard view to a pretty JSON file.
pub fn write_export(dashboard: &DashboardView, path: &Path) -> Result<()> {
    let json = serde_json::to_string_pretty(dashboard)?;
    std::fs::write(path, json).with_context(|| format!("Failed to write {}", path.display()))
}
