//! Hotspot table view for the EV registrations TUI.
//!
//! Renders a bordered [`ratatui::widgets::Table`] with one row per geo point,
//! scrolled to the caller's offset, plus a highlighted totals row at the
//! bottom.

use ratatui::{
    layout::{Constraint, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table},
    Frame,
};

use evdash_core::formatting;
use evdash_core::models::GeoPoint;

use crate::themes::Theme;

/// Rows taken by the border, header and totals row.
const CHROME_ROWS: u16 = 4;

/// Number of data rows that fit into an area `height` rows tall.
pub fn visible_rows(height: u16) -> usize {
    usize::from(height.saturating_sub(CHROME_ROWS))
}

/// Largest useful scroll offset: the last page starts here.
pub fn max_scroll(total_rows: usize, height: u16) -> usize {
    total_rows.saturating_sub(visible_rows(height).max(1))
}

/// Render the points table into `area`, starting at row `scroll`.
pub fn render_table_view(
    frame: &mut Frame,
    area: Rect,
    points: &[GeoPoint],
    scroll: usize,
    theme: &Theme,
) {
    let header_cells = ["#", "City", "State", "Count"]
        .iter()
        .map(|h| Cell::from(*h).style(theme.table_header));
    let header = Row::new(header_cells).height(1);

    let start = scroll.min(max_scroll(points.len(), area.height));
    let data_rows: Vec<Row> = points
        .iter()
        .enumerate()
        .skip(start)
        .take(visible_rows(area.height))
        .map(|(i, point)| {
            let style = if i % 2 == 0 {
                theme.table_row
            } else {
                theme.table_row_alt
            };
            Row::new(vec![
                Cell::from((point.id + 1).to_string()),
                Cell::from(display_or_dash(&point.city)),
                Cell::from(display_or_dash(&point.state)),
                Cell::from(formatting::format_count(point.count)),
            ])
            .style(style)
        })
        .collect();

    let total: u64 = points.iter().map(|p| p.count).sum();
    let total_row = Row::new(vec![
        Cell::from("TOTAL").style(theme.table_total),
        Cell::from(format!("{} points", formatting::format_count(points.len() as u64))),
        Cell::from(""),
        Cell::from(formatting::format_count(total)),
    ])
    .style(theme.table_total);

    let mut all_rows = data_rows;
    all_rows.push(total_row);

    let widths = [
        Constraint::Length(8),
        Constraint::Min(20),
        Constraint::Min(16),
        Constraint::Length(10),
    ];

    let title = if points.is_empty() {
        " Registrations ".to_string()
    } else {
        format!(
            " Registrations {}–{} of {} ",
            start + 1,
            (start + visible_rows(area.height)).min(points.len()),
            points.len()
        )
    };

    let table = Table::new(all_rows, widths)
        .header(header)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(theme.table_border)
                .title(title),
        )
        .style(theme.text);

    frame.render_widget(table, area);
}

/// Render a "no data" placeholder when the dataset is empty.
pub fn render_no_data(frame: &mut Frame, area: Rect, theme: &Theme) {
    let text = vec![
        Line::from(""),
        Line::from(Span::styled("No registration data found", theme.warning)),
        Line::from(""),
        Line::from(Span::styled(
            "Point --data at a .json, .jsonl or .csv dataset.",
            theme.dim,
        )),
        Line::from(Span::styled("Press 'q' or Ctrl+C to exit", theme.dim)),
    ];
    frame.render_widget(
        Paragraph::new(ratatui::text::Text::from(text)).block(
            Block::default()
                .borders(Borders::ALL)
                .title(" EV Dashboard "),
        ),
        area,
    );
}

fn display_or_dash(value: &str) -> String {
    if value.is_empty() {
        "–".to_string()
    } else {
        value.to_string()
    }
}

// ── Tests ──────────────────────────────────────────────────────────────────────
