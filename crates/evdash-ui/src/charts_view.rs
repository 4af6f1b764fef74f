//! Chart dashboard for the EV registrations TUI.
//!
//! Renders the registrations-per-year line chart, the top-makes bar chart
//! and the battery-capacity distribution with its legend.

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    symbols,
    text::{Line, Span, Text},
    widgets::{Axis, Bar, BarChart, BarGroup, Block, Borders, Chart, Dataset, GraphType, Paragraph},
    Frame,
};

use evdash_core::formatting::{format_count, format_percent, percentage};
use evdash_core::models::{CapacityHistogram, DashboardViews, MakeCount, YearCount};

use crate::themes::Theme;

// ── Data helpers ──────────────────────────────────────────────────────────────

/// `(year, count)` pairs ready for the line chart.
pub fn yearly_points(series: &[YearCount]) -> Vec<(f64, f64)> {
    series
        .iter()
        .map(|yc| (f64::from(yc.year), yc.count as f64))
        .collect()
}

/// X and Y bounds for the line chart.
///
/// A single year is padded by one year on each side; the Y axis always
/// starts at zero and gets 10 % headroom.
pub fn yearly_bounds(series: &[YearCount]) -> ([f64; 2], [f64; 2]) {
    let (first, last) = match (series.first(), series.last()) {
        (Some(first), Some(last)) => (f64::from(first.year), f64::from(last.year)),
        _ => return ([0.0, 1.0], [0.0, 1.0]),
    };
    let x = if first == last {
        [first - 1.0, last + 1.0]
    } else {
        [first, last]
    };
    let max = series.iter().map(|yc| yc.count).max().unwrap_or(0) as f64;
    (x, [0.0, (max * 1.1).max(1.0)])
}

/// One legend row per capacity bucket: `(label, count, share %)`.
pub fn capacity_legend(histogram: &CapacityHistogram) -> Vec<(&'static str, u64, f64)> {
    let total = histogram.total() as f64;
    histogram
        .buckets
        .iter()
        .map(|b| (b.bucket.label(), b.count, percentage(b.count as f64, total, 1)))
        .collect()
}

// ── Main render ───────────────────────────────────────────────────────────────

/// Render the chart dashboard into `area`.
///
/// Layout: the yearly trend across the top half, top makes and capacity
/// distribution side by side underneath.
pub fn render_dashboard_view(frame: &mut Frame, area: Rect, views: &DashboardViews, theme: &Theme) {
    let rows = Layout::vertical([Constraint::Percentage(50), Constraint::Percentage(50)]).split(area);
    let bottom = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(55), Constraint::Percentage(45)])
        .split(rows[1]);

    render_yearly_chart(frame, rows[0], &views.yearly, theme);
    render_top_makes(frame, bottom[0], &views.top_makes, theme);
    render_capacity(frame, bottom[1], &views.capacity, theme);
}

/// Registrations per model year as a line chart.
pub fn render_yearly_chart(frame: &mut Frame, area: Rect, series: &[YearCount], theme: &Theme) {
    let block = titled_block(" EV Registrations by Year ", theme);
    if series.is_empty() {
        render_empty(frame, area, block, theme);
        return;
    }

    let points = yearly_points(series);
    let (x_bounds, y_bounds) = yearly_bounds(series);

    let x_labels: Vec<Span> = [x_bounds[0], x_bounds[1]]
        .iter()
        .map(|year| Span::styled(format!("{year:.0}"), theme.label))
        .collect();
    let y_labels: Vec<Span> = [0.0, y_bounds[1] / 2.0, y_bounds[1]]
        .iter()
        .map(|count| Span::styled(format_count(count.round() as u64), theme.label))
        .collect();

    let dataset = Dataset::default()
        .name("Registrations")
        .marker(symbols::Marker::Braille)
        .graph_type(GraphType::Line)
        .style(theme.chart_line)
        .data(&points);

    let chart = Chart::new(vec![dataset])
        .block(block)
        .x_axis(
            Axis::default()
                .title(Span::styled("Model year", theme.label))
                .style(theme.chart_axis)
                .bounds(x_bounds)
                .labels(x_labels),
        )
        .y_axis(
            Axis::default()
                .style(theme.chart_axis)
                .bounds(y_bounds)
                .labels(y_labels),
        );

    frame.render_widget(chart, area);
}

/// Top manufacturers as a horizontal bar chart.
pub fn render_top_makes(frame: &mut Frame, area: Rect, top_makes: &[MakeCount], theme: &Theme) {
    let block = titled_block(" Top Manufacturers ", theme);
    if top_makes.is_empty() {
        render_empty(frame, area, block, theme);
        return;
    }

    let bars: Vec<Bar> = top_makes
        .iter()
        .enumerate()
        .map(|(i, m)| {
            Bar::default()
                .value(m.count)
                .label(Line::from(m.make.clone()))
                .text_value(format_count(m.count))
                .style(Style::default().fg(theme.series_color(i)))
                .value_style(theme.value.add_modifier(Modifier::REVERSED))
        })
        .collect();

    let max = top_makes.iter().map(|m| m.count).max().unwrap_or(0).max(1);

    let chart = BarChart::default()
        .block(block)
        .direction(Direction::Horizontal)
        .data(BarGroup::default().bars(&bars))
        .max(max)
        .bar_width(1)
        .bar_gap(1);

    frame.render_widget(chart, area);
}

/// Battery-capacity buckets as a bar chart with a percentage legend.
pub fn render_capacity(
    frame: &mut Frame,
    area: Rect,
    histogram: &CapacityHistogram,
    theme: &Theme,
) {
    let block = titled_block(" Battery Capacity ", theme);
    if histogram.total() == 0 {
        render_empty(frame, area, block, theme);
        return;
    }

    let inner = block.inner(area);
    frame.render_widget(block, area);

    let parts = Layout::horizontal([Constraint::Min(20), Constraint::Length(26)]).split(inner);

    let bars: Vec<Bar> = histogram
        .buckets
        .iter()
        .enumerate()
        .map(|(i, b)| {
            Bar::default()
                .value(b.count)
                .label(Line::from(b.bucket.label().trim_end_matches(" kWh")))
                .style(Style::default().fg(theme.series_color(i)))
                .value_style(theme.value.add_modifier(Modifier::REVERSED))
        })
        .collect();

    let max = histogram.buckets.iter().map(|b| b.count).max().unwrap_or(0).max(1);

    let chart = BarChart::default()
        .data(BarGroup::default().bars(&bars))
        .max(max)
        .bar_width(6)
        .bar_gap(1);
    frame.render_widget(chart, parts[0]);

    let mut legend = vec![Line::from(Span::styled("Legend", theme.label)), Line::from("")];
    for (i, (label, count, pct)) in capacity_legend(histogram).into_iter().enumerate() {
        legend.push(Line::from(vec![
            Span::styled("■ ", Style::default().fg(theme.series_color(i))),
            Span::styled(format!("{label:<10}"), theme.text),
            Span::styled(format!("{:>7}", format_percent(pct)), theme.value),
            Span::styled(format!(" ({})", format_count(count)), theme.dim),
        ]));
    }
    frame.render_widget(Paragraph::new(Text::from(legend)), parts[1]);
}

// ── Private helpers ───────────────────────────────────────────────────────────

fn titled_block<'a>(title: &'a str, theme: &Theme) -> Block<'a> {
    Block::default()
        .borders(Borders::ALL)
        .border_style(theme.separator)
        .title(Span::styled(title, theme.header))
}

fn render_empty(frame: &mut Frame, area: Rect, block: Block, theme: &Theme) {
    let text = vec![
        Line::from(""),
        Line::from(Span::styled(
            "No registrations match the current filter",
            theme.dim,
        )),
    ];
    frame.render_widget(Paragraph::new(Text::from(text)).block(block), area);
}

// ── Tests ─────────────────────────────────────────────────────────────────────
