//! Terminal UI rendering using ratatui.
//!
//! Each tab is implemented in its own submodule with a `render` function.
//! Rendering only reads the [`App`]; nothing here derives data.
//!
//! ## Submodules
//!
//! - [`overview`]: Headline metrics, index chart and hotspots
//! - [`countries`]: Country ranking table
//! - [`stream`]: Top events table and the event detail overlay
//! - [`methodology`]: Scoring formula and weights
//! - [`common`]: Shared components (header, tabs, status bar, help overlay)
//! - [`theme`]: Light/dark theme support with terminal auto-detection
//!
//! ## Layout
//!
//! ```text
//! ┌──────────────────────────────────────┐
//! │ Header (common::render_header)       │
//! ├──────────────────────────────────────┤
//! │ Tabs (common::render_tabs)           │
//! ├──────────────────────────────────────┤
//! │                                      │
//! │ Tab content                          │
//! │                                      │
//! ├──────────────────────────────────────┤
//! │ Status Bar (common::render_status)   │
//! └──────────────────────────────────────┘
//!         ↑
//!    Overlays rendered on top:
//!    - stream::render_overlay
//!    - common::render_help
//! ```

pub mod common;
pub mod countries;
pub mod methodology;
pub mod overview;
pub mod stream;
pub mod theme;

pub use theme::Theme;

use ratatui::{
    layout::{Alignment, Constraint, Layout, Rect},
    style::{Color, Style},
    widgets::Paragraph,
    Frame,
};

use crate::app::{App, View};

/// Minimum terminal size for a usable display.
pub const MIN_WIDTH: u16 = 60;
pub const MIN_HEIGHT: u16 = 12;

/// Row where tab content begins (after header and tabs).
pub const CONTENT_START_ROW: u16 = 2;

/// Draw one frame.
pub fn render(frame: &mut Frame, app: &App) {
    let area = frame.area();

    if area.width < MIN_WIDTH || area.height < MIN_HEIGHT {
        let msg = format!(
            "Terminal too small: {}x{}\nMinimum: {}x{}\n\nResize to continue",
            area.width, area.height, MIN_WIDTH, MIN_HEIGHT
        );
        let paragraph = Paragraph::new(msg)
            .alignment(Alignment::Center)
            .style(Style::default().fg(Color::Yellow));
        let top = (area.height / 2).saturating_sub(2);
        frame.render_widget(paragraph, Rect::new(0, top, area.width, 5u16.min(area.height)));
        return;
    }

    let chunks = Layout::vertical([
        Constraint::Length(1), // Header bar
        Constraint::Length(1), // Tabs
        Constraint::Min(8),    // Content
        Constraint::Length(1), // Status bar
    ])
    .split(area);

    common::render_header(frame, app, chunks[0]);
    common::render_tabs(frame, app, chunks[1]);

    match app.current_view {
        View::Overview => overview::render(frame, app, chunks[2]),
        View::Countries => countries::render(frame, app, chunks[2]),
        View::Stream => stream::render(frame, app, chunks[2]),
        View::Methodology => methodology::render(frame, app, chunks[2]),
    }

    common::render_status_bar(frame, app, chunks[3]);

    if app.show_event_detail {
        stream::render_overlay(frame, app, area);
    }
    if app.show_help {
        common::render_help(frame, app, area);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::tests::{app_with, sample_dashboard};
    use ratatui::backend::TestBackend;
    use ratatui::Terminal;

    fn draw(app: &App, width: u16, height: u16) -> String {
        let mut terminal = Terminal::new(TestBackend::new(width, height)).unwrap();
        terminal.draw(|frame| render(frame, app)).unwrap();
        let buffer = terminal.backend().buffer();
        buffer
            .content
            .chunks(width as usize)
            .map(|row| row.iter().map(|cell| cell.symbol()).collect::<String>())
            .collect::<Vec<_>>()
            .join("\n")
    }

    #[test]
    fn test_render_every_tab() {
        let (mut app, _tx) = app_with(Some(sample_dashboard()));

        let screen = draw(&app, 120, 30);
        assert!(screen.contains("ELEVATED"));
        assert!(screen.contains("6.40"));
        assert!(screen.contains("Syria"));

        app.set_view(View::Countries);
        assert!(draw(&app, 120, 30).contains("Greece"));

        app.set_view(View::Stream);
        assert!(draw(&app, 120, 30).contains("Border clash"));

        app.set_view(View::Methodology);
        assert!(draw(&app, 120, 30).contains("MILITARY CONFLICT"));
    }

    #[test]
    fn test_render_overlays() {
        let (mut app, _tx) = app_with(Some(sample_dashboard()));
        app.set_view(View::Stream);
        app.enter_detail();
        let screen = draw(&app, 120, 30);
        assert!(screen.contains("translate.google.com"));

        app.close_overlay();
        app.toggle_help();
        assert!(draw(&app, 120, 30).contains("Keyboard Shortcuts"));
    }

    #[test]
    fn test_render_without_data() {
        let (mut app, _tx) = app_with(None);
        for view in View::ALL {
            app.set_view(view);
            let screen = draw(&app, 80, 20);
            assert!(screen.contains("THREATWATCH"));
        }
    }

    #[test]
    fn test_render_too_small() {
        let (app, _tx) = app_with(Some(sample_dashboard()));
        assert!(draw(&app, 40, 8).contains("Terminal too small"));
    }
}
