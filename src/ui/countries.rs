//! Countries tab: every country ranked by score.

use ratatui::{
    layout::{Constraint, Rect},
    style::Style,
    widgets::{Block, Borders, Cell, Row, Table, TableState},
    Frame,
};

use crate::app::App;

pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let countries = app.visible_countries();
    let total = app.dashboard.as_ref().map(|d| d.countries.len()).unwrap_or(0);

    let header = Row::new(vec!["#", "Country", "Score", "Tier", "Signals"])
        .height(1)
        .style(app.theme.header);

    let rows: Vec<Row> = countries
        .iter()
        .enumerate()
        .map(|(rank, country)| {
            let style = app.theme.tier_style(country.tier);
            Row::new(vec![
                Cell::from((rank + 1).to_string()),
                Cell::from(country.name.clone()),
                Cell::from(country.score_text.clone()).style(style),
                Cell::from(country.tier.label()).style(style),
                Cell::from(country.signal_count.to_string()),
            ])
        })
        .collect();

    let widths = [
        Constraint::Length(4),
        Constraint::Fill(3),
        Constraint::Fill(1),
        Constraint::Fill(1),
        Constraint::Min(7),
    ];

    let selected = app.selected_country_index.min(countries.len().saturating_sub(1));

    let filter_info = if app.filter_active {
        format!(" /{}_", app.filter_text)
    } else if !app.filter_text.is_empty() {
        format!(" /{}/ [c:clear]", app.filter_text)
    } else {
        String::new()
    };

    let title = format!(" Countries ({}/{}){} ", countries.len(), total, filter_info);

    let table = Table::new(rows, widths)
        .header(header)
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
    if !countries.is_empty() {
        state.select(Some(selected));
    }

    frame.render_stateful_widget(table, area, &mut state);
}
