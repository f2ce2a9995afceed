//! Methodology tab: the scoring formula and category weights.

use ratatui::{
    layout::{Constraint, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table, Wrap},
    Frame,
};

use crate::app::App;

pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let block = |title: &'static str| {
        Block::default()
            .title(title)
            .borders(Borders::ALL)
            .border_type(app.theme.border_type)
            .border_style(Style::default().fg(app.theme.border))
    };

    let Some(ref dashboard) = app.dashboard else {
        frame.render_widget(Paragraph::new(" Loading...").block(block(" Methodology ")), area);
        return;
    };

    let chunks = Layout::vertical([Constraint::Length(7), Constraint::Min(4)]).split(area);
    let methodology = &dashboard.methodology;

    let mut text = vec![Line::from(Span::styled(
        methodology.name.clone().unwrap_or_else(|| "Methodology".to_string()),
        Style::default().add_modifier(Modifier::BOLD),
    ))];
    if let Some(description) = &methodology.description {
        text.push(Line::from(description.clone()));
    }
    if let Some(formula) = &methodology.formula {
        text.push(Line::from(vec![
            Span::styled("Formula: ", app.theme.muted_style()),
            Span::raw(formula.clone()),
        ]));
    }
    frame.render_widget(
        Paragraph::new(text).block(block(" Methodology ")).wrap(Wrap { trim: true }),
        chunks[0],
    );

    let rows: Vec<Row> = dashboard
        .weights
        .iter()
        .map(|weight| {
            Row::new(vec![
                Cell::from(weight.label.clone()),
                Cell::from(weight.value_text.clone()).style(app.theme.polarity_style(weight.polarity)),
            ])
        })
        .collect();

    let table = Table::new(rows, [Constraint::Fill(3), Constraint::Length(8)])
        .header(Row::new(vec!["Category", "Weight"]).style(app.theme.header))
        .block(block(" Weights "));

    frame.render_widget(table, chunks[1]);
}
