use evdash_core::formatting::{format_count, format_growth, format_percent};
use evdash_core::models::SummaryStats;
use ratatui::{
    layout::{Constraint, Layout, Rect},
    style::Style,
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use crate::themes::Theme;

/// Placeholder shown when a figure does not exist for the current filter.
pub const NO_VALUE: &str = "–";

/// One headline figure with a short caption.
#[derive(Debug, Clone, PartialEq)]
pub struct KpiCard {
    pub title: &'static str,
    pub value: String,
    pub detail: String,
    pub value_style: Style,
}

impl KpiCard {
    /// The two content lines: value, then caption.
    pub fn to_lines<'a>(&self, theme: &Theme) -> Vec<Line<'a>> {
        vec![
            Line::from(Span::styled(self.value.clone(), self.value_style)),
            Line::from(Span::styled(self.detail.clone(), theme.dim)),
        ]
    }
}

/// Build the four cards shown above every view:
/// Total EVs, Latest Year, YoY Growth and Top Make.
pub fn kpi_cards(summary: &SummaryStats, theme: &Theme) -> [KpiCard; 4] {
    let latest_year = if summary.latest_year == 0 {
        NO_VALUE.to_string()
    } else {
        summary.latest_year.to_string()
    };

    let top_make = summary
        .top_make
        .clone()
        .unwrap_or_else(|| NO_VALUE.to_string());

    [
        KpiCard {
            title: "Total EVs",
            value: format_count(summary.total_count),
            detail: "registrations".to_string(),
            value_style: theme.kpi_value,
        },
        KpiCard {
            title: "Latest Year",
            value: latest_year,
            detail: format!("{} regs", format_count(summary.latest_year_count)),
            value_style: theme.kpi_value,
        },
        KpiCard {
            title: "YoY Growth",
            value: format_growth(summary.yoy_growth_pct),
            detail: "vs previous year".to_string(),
            value_style: theme.growth_style(summary.yoy_growth_pct),
        },
        KpiCard {
            title: "Top Make",
            value: top_make,
            detail: format!("{} share", format_percent(summary.top_make_share_pct)),
            value_style: theme.kpi_value,
        },
    ]
}

/// Render the KPI cards side by side into `area` (needs 4 rows).
pub fn render_kpi_row(frame: &mut Frame, area: Rect, summary: &SummaryStats, theme: &Theme) {
    let columns = Layout::horizontal([Constraint::Ratio(1, 4); 4]).split(area);

    for (card, column) in kpi_cards(summary, theme).iter().zip(columns.iter()) {
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(theme.kpi_border)
            .title(Span::styled(format!(" {} ", card.title), theme.kpi_title));
        frame.render_widget(Paragraph::new(card.to_lines(theme)).block(block), *column);
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
