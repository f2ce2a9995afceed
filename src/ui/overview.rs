//! Overview tab: headline metrics, the index chart and the top countries.

use ratatui::{
    layout::{Constraint, Layout, Rect},
    style::{Modifier, Style},
    symbols,
    text::{Line, Span},
    widgets::{Axis, Block, Borders, Chart, Dataset, GraphType, Paragraph},
    Frame,
};

use crate::app::App;
use crate::data::{ChartSeries, DashboardView, SeriesView};

/// Countries listed beside the chart.
const TOP_COUNTRIES: usize = 8;

pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let Some(ref dashboard) = app.dashboard else {
        let block = bordered(app, " Overview ");
        frame.render_widget(Paragraph::new(" Loading...").block(block), area);
        return;
    };

    let rows = Layout::vertical([Constraint::Length(4), Constraint::Min(8)]).split(area);
    render_metrics(frame, app, dashboard, rows[0]);

    let columns = Layout::horizontal([Constraint::Fill(3), Constraint::Fill(1)]).split(rows[1]);
    render_chart(frame, app, &dashboard.series, columns[0]);
    render_top_countries(frame, app, dashboard, columns[1]);
}

fn bordered<'a>(app: &App, title: &'a str) -> Block<'a> {
    Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_type(app.theme.border_type)
        .border_style(Style::default().fg(app.theme.border))
}

fn render_metrics(frame: &mut Frame, app: &App, dashboard: &DashboardView, area: Rect) {
    let cells = Layout::horizontal([
        Constraint::Fill(1),
        Constraint::Fill(1),
        Constraint::Fill(1),
        Constraint::Fill(2),
    ])
    .split(area);

    let metrics = &dashboard.metrics;
    let header = &dashboard.header;
    let bold = Style::default().add_modifier(Modifier::BOLD);

    let index = Paragraph::new(vec![Line::from(vec![
        Span::styled(metrics.index_text.clone(), app.theme.tier_style(metrics.tier).add_modifier(Modifier::BOLD)),
        Span::raw(" "),
        Span::styled(metrics.tier.label(), app.theme.tier_style(metrics.tier)),
    ])])
    .block(bordered(app, " Threat Index "));
    frame.render_widget(index, cells[0]);

    let trend = Paragraph::new(Line::from(Span::styled(metrics.trend_label.clone(), bold)))
        .block(bordered(app, " Trend "));
    frame.render_widget(trend, cells[1]);

    let signals = Paragraph::new(Line::from(Span::styled(metrics.signal_count.to_string(), bold)))
        .block(bordered(app, " Signals "));
    frame.render_widget(signals, cells[2]);

    let version = header
        .version
        .as_deref()
        .map(|v| format!(" v{}", v))
        .unwrap_or_default();
    let updated = Paragraph::new(vec![
        Line::from(vec![
            Span::styled("Generated ", app.theme.muted_style()),
            Span::raw(header.generated_at.clone()),
            Span::styled(version, app.theme.muted_style()),
        ]),
        Line::from(vec![
            Span::styled("Next      ", app.theme.muted_style()),
            Span::raw(header.next_update.clone()),
        ]),
    ])
    .block(bordered(app, " Updated (UTC) "));
    frame.render_widget(updated, cells[3]);
}

fn render_chart(frame: &mut Frame, app: &App, series: &SeriesView, area: Rect) {
    let Some(chart) = series.chart() else {
        let empty = Paragraph::new(" No history yet").block(bordered(app, " Index "));
        frame.render_widget(empty, area);
        return;
    };

    let history = chart.history_points();
    let forecast = chart.forecast_points();

    let datasets = vec![
        Dataset::default()
            .name("history")
            .marker(symbols::Marker::Braille)
            .graph_type(GraphType::Line)
            .style(Style::default().fg(app.theme.history_line))
            .data(&history),
        Dataset::default()
            .name("forecast")
            .marker(symbols::Marker::Dot)
            .graph_type(GraphType::Line)
            .style(Style::default().fg(app.theme.forecast_line))
            .data(&forecast),
    ];

    let x_max = chart.point_count().saturating_sub(1).max(1) as f64;
    let y_mid = (chart.y_min + chart.y_max) / 2.0;

    let widget = Chart::new(datasets)
        .block(bordered(app, " Index "))
        .x_axis(
            Axis::default()
                .style(app.theme.muted_style())
                .bounds([0.0, x_max])
                .labels(axis_labels(chart)),
        )
        .y_axis(
            Axis::default()
                .style(app.theme.muted_style())
                .bounds([chart.y_min, chart.y_max])
                .labels([
                    format!("{:.0}", chart.y_min),
                    format!("{:.1}", y_mid),
                    format!("{:.0}", chart.y_max),
                ]),
        );

    frame.render_widget(widget, area);
}

/// First, junction and last labels of the time axis.
fn axis_labels(chart: &ChartSeries) -> Vec<String> {
    let mut positions = vec![0, chart.junction, chart.point_count().saturating_sub(1)];
    positions.dedup();
    positions
        .into_iter()
        .filter_map(|i| chart.labels.get(i).cloned())
        .collect()
}

fn render_top_countries(frame: &mut Frame, app: &App, dashboard: &DashboardView, area: Rect) {
    let lines: Vec<Line> = dashboard
        .countries
        .iter()
        .take(TOP_COUNTRIES)
        .map(|country| {
            Line::from(vec![
                Span::styled(format!("{:>5} ", country.score_text), app.theme.tier_style(country.tier)),
                Span::raw(country.name.clone()),
            ])
        })
        .collect();

    frame.render_widget(Paragraph::new(lines).block(bordered(app, " Hotspots ")), area);
}
