//! Common UI components shared across views.
//!
//! This module contains the header bar, tab bar, status bar, and help overlay.

use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Tabs},
    Frame,
};

use crate::app::{App, View};
use crate::data::time::format_clock;
use crate::poller::PollOutcome;

/// Render the header bar: status pill, headline index, trend and clock.
pub fn render_header(frame: &mut Frame, app: &App, area: Rect) {
    let clock = Span::styled(format!(" {} ", format_clock(&app.now)), app.theme.muted_style());

    let Some(ref dashboard) = app.dashboard else {
        let line = Line::from(vec![
            Span::styled(" THREATWATCH ", Style::default().add_modifier(Modifier::BOLD)),
            Span::raw("| Waiting for first snapshot... "),
            clock,
        ]);
        frame.render_widget(Paragraph::new(line), area);
        return;
    };

    let header = &dashboard.header;
    let metrics = &dashboard.metrics;

    let line = Line::from(vec![
        Span::styled(format!(" {} ", header.status_label), app.theme.pill_style(header.status_tier)),
        Span::styled(" THREATWATCH ", Style::default().add_modifier(Modifier::BOLD)),
        Span::raw("│ Index "),
        Span::styled(metrics.index_text.clone(), app.theme.tier_style(metrics.tier)),
        Span::raw(" "),
        Span::raw(metrics.trend_label.clone()),
        Span::raw(" │ "),
        Span::raw(format!("{} signals", metrics.signal_count)),
        Span::raw(" │"),
        clock,
    ]);

    frame.render_widget(Paragraph::new(line), area);
}

/// Render the tab bar showing available views.
pub fn render_tabs(frame: &mut Frame, app: &App, area: Rect) {
    let titles: Vec<Line> = View::ALL
        .iter()
        .map(|view| Line::from(format!(" {}:{} ", view.index() + 1, view.label())))
        .collect();

    let tabs = Tabs::new(titles)
        .select(app.current_view.index())
        .style(app.theme.tab_inactive)
        .highlight_style(app.theme.tab_active)
        .divider("|");

    frame.render_widget(tabs, area);
}

/// Render the status bar at the bottom.
///
/// Shows the source, the last poll result and context-sensitive controls.
/// Temporary status messages take precedence.
pub fn render_status_bar(frame: &mut Frame, app: &App, area: Rect) {
    if let Some(msg) = app.status_message() {
        let paragraph =
            Paragraph::new(format!(" {} ", msg)).style(Style::default().fg(app.theme.accent));
        frame.render_widget(paragraph, area);
        return;
    }

    let poll = match &app.last_report {
        Some(report) => match &report.outcome {
            PollOutcome::Failed(err) => format!("Poll failed {}: {}", report.at.format("%H:%M:%S"), err),
            outcome => format!("Poll {} {}", outcome.label(), report.at.format("%H:%M:%S")),
        },
        None => "Awaiting first poll".to_string(),
    };

    let controls = match app.current_view {
        View::Countries | View::Stream if app.filter_active => "Type to search | Enter:apply Esc:cancel",
        View::Stream => "/:search Enter:detail Tab:switch ?:help q:quit",
        View::Countries => "/:search Tab:switch ?:help q:quit",
        View::Overview | View::Methodology => "Tab:switch e:export ?:help q:quit",
    };

    let status = format!(" {} | {} | {}", app.source_description(), poll, controls);
    let paragraph = Paragraph::new(status).style(Style::default().add_modifier(Modifier::DIM));

    frame.render_widget(paragraph, area);
}

/// Centre a `width` x `height` rectangle inside `area`, shrinking to fit.
pub fn centered_rect(area: Rect, width: u16, height: u16) -> Rect {
    let width = width.min(area.width.saturating_sub(4));
    let height = height.min(area.height.saturating_sub(2));
    let x = area.x + (area.width.saturating_sub(width)) / 2;
    let y = area.y + (area.height.saturating_sub(height)) / 2;
    Rect::new(x, y, width, height)
}

/// Render the help overlay with keyboard shortcuts.
pub fn render_help(frame: &mut Frame, app: &App, area: Rect) {
    let section = |title: &'static str| {
        Line::from(vec![Span::styled(title, Style::default().add_modifier(Modifier::BOLD))])
    };

    let help_text = vec![
        Line::from(vec![Span::styled("Keyboard Shortcuts", app.theme.header)]),
        Line::from(""),
        section(" Navigation"),
        Line::from("  ←/→ h/l     Switch tabs"),
        Line::from("  1-4         Jump to tab"),
        Line::from("  ↑/↓ j/k     Navigate list"),
        Line::from("  PgUp/PgDn   Jump 10 items"),
        Line::from("  Home/End    Jump to first/last"),
        Line::from("  Enter       Event detail"),
        Line::from("  Esc         Go back"),
        Line::from(""),
        section(" Countries & Stream"),
        Line::from("  /         Start filter/search"),
        Line::from("  c         Clear filter"),
        Line::from(""),
        section(" General"),
        Line::from("  m         Methodology"),
        Line::from("  e         Export to JSON"),
        Line::from("  q         Quit"),
        Line::from(""),
        Line::from(vec![Span::styled(
            "Press any key to close",
            Style::default().add_modifier(Modifier::DIM),
        )]),
    ];

    let block = Block::default()
        .title(" Help ")
        .borders(Borders::ALL)
        .border_type(app.theme.border_type)
        .border_style(Style::default().fg(app.theme.accent));

    let help_area = centered_rect(area, 42, 24);
    frame.render_widget(Clear, help_area);
    frame.render_widget(Paragraph::new(help_text).block(block), help_area);
}
