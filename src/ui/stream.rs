//! Stream tab: the highest-priority events, and the event detail overlay.

use ratatui::{
    layout::{Constraint, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Clear, Paragraph, Row, Table, TableState, Wrap},
    Frame,
};

use crate::app::App;
use crate::data::EVENT_DISPLAY_LIMIT;

use super::common::centered_rect;

/// Minimum size needed to draw the detail overlay.
const MIN_OVERLAY_WIDTH: u16 = 50;
const MIN_OVERLAY_HEIGHT: u16 = 14;

pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let events = app.visible_events();

    let header = Row::new(vec!["Time", "Country", "Category", "Badge", "Conf", "Lang", "Title"])
        .height(1)
        .style(app.theme.header);

    let rows: Vec<Row> = events
        .iter()
        .map(|event| {
            Row::new(vec![
                Cell::from(event.time_label.clone()).style(app.theme.muted_style()),
                Cell::from(event.country_label.clone()),
                Cell::from(event.category_label.clone()),
                Cell::from(format!(" {} ", event.badge.label())).style(app.theme.pill_style(event.badge)),
                Cell::from(format!("{}%", event.confidence_percent)),
                Cell::from(event.language.clone()),
                Cell::from(event.title.clone()),
            ])
        })
        .collect();

    let widths = [
        Constraint::Length(5),
        Constraint::Fill(1),
        Constraint::Fill(1),
        Constraint::Length(10),
        Constraint::Length(5),
        Constraint::Length(5),
        Constraint::Fill(4),
    ];

    let filter_info = if app.filter_active {
        format!(" /{}_", app.filter_text)
    } else if !app.filter_text.is_empty() {
        format!(" /{}/ [c:clear]", app.filter_text)
    } else {
        String::new()
    };

    let title = format!(" Top {} events ({}){} ", EVENT_DISPLAY_LIMIT, events.len(), filter_info);

    let table = Table::new(rows, widths)
        .header(header)
        .column_spacing(1)
        .block(
            Block::default()
                .title(title)
                .borders(Borders::ALL)
                .border_type(app.theme.border_type)
                .border_style(Style::default().fg(app.theme.border)),
        )
        .row_highlight_style(app.theme.selected)
        .highlight_symbol("▶ ");

    let mut state = TableState::default();
    if !events.is_empty() {
        state.select(Some(app.selected_event_index.min(events.len() - 1)));
    }

    frame.render_stateful_widget(table, area, &mut state);
}

/// Render the selected event as a modal overlay.
pub fn render_overlay(frame: &mut Frame, app: &App, area: Rect) {
    if area.width < MIN_OVERLAY_WIDTH || area.height < MIN_OVERLAY_HEIGHT {
        return;
    }
    let Some(event) = app.selected_event() else {
        return;
    };

    let bold = Style::default().add_modifier(Modifier::BOLD);
    let label = |text: &'static str| Span::styled(text, app.theme.muted_style());

    let mut lines = vec![
        Line::from(Span::styled(event.title.clone(), bold)),
        Line::from(""),
        Line::from(vec![
            Span::styled(format!(" {} ", event.badge.label()), app.theme.pill_style(event.badge)),
            Span::raw(" "),
            Span::raw(event.category_label.clone()),
        ]),
        Line::from(vec![label(" Country     "), Span::raw(event.country_label.clone())]),
        Line::from(vec![label(" Time (UTC)  "), Span::raw(event.time_label.clone())]),
        Line::from(vec![
            label(" Confidence  "),
            Span::raw(format!("{}%", event.confidence_percent)),
        ]),
        Line::from(vec![label(" Language    "), Span::raw(event.language.clone())]),
    ];

    if let Some(original) = &event.original_title {
        lines.push(Line::from(vec![label(" Original    "), Span::raw(original.clone())]));
    }
    if let Some(link) = &event.link {
        lines.push(Line::from(vec![label(" Source      "), Span::raw(link.clone())]));
    }
    if let Some(link) = &event.translate_link {
        lines.push(Line::from(vec![label(" Translate   "), Span::raw(link.clone())]));
    }
    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        "Esc:close ↑↓:previous/next event",
        Style::default().add_modifier(Modifier::DIM),
    )));

    let block = Block::default()
        .title(" Event ")
        .borders(Borders::ALL)
        .border_type(app.theme.border_type)
        .border_style(Style::default().fg(app.theme.accent));

    let width = (area.width * 90 / 100).clamp(MIN_OVERLAY_WIDTH, 110);
    let height = (lines.len() as u16 + 2).max(MIN_OVERLAY_HEIGHT);
    let overlay_area = centered_rect(area, width, height);

    frame.render_widget(Clear, overlay_area);
    frame.render_widget(
        Paragraph::new(lines).block(block).wrap(Wrap { trim: false }),
        overlay_area,
    );
}
