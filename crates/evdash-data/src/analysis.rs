//! Analysis pipeline for the dashboard.
//!
//! Applies a filter to the loaded records and derives every view in one pass,
//! returning an [`AnalysisResult`] ready for the UI layer or JSON output.

use chrono::Utc;
use evdash_core::models::{DashboardViews, FilterState, Record};
use serde::Serialize;

use crate::aggregator::Aggregator;

// ── Public types ──────────────────────────────────────────────────────────────

/// Metadata produced alongside the analysis result.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalysisMetadata {
    /// RFC 3339 timestamp when this result was generated.
    pub generated_at: String,
    /// Records available before filtering.
    pub records_loaded: usize,
    /// Records accepted by the filter.
    pub records_matched: usize,
    /// Wall-clock seconds spent filtering and aggregating.
    pub compute_time_seconds: f64,
}

/// The complete output of [`analyze`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalysisResult {
    /// Filter the views were computed for.
    pub filter: FilterState,
    pub views: DashboardViews,
    pub metadata: AnalysisMetadata,
}

/// Values the filter controls can offer for a dataset.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FilterOptions {
    /// Distinct makes, most registered first; equal counts sorted by name.
    pub makes: Vec<String>,
    /// Smallest and largest model year present, `None` when no record has one.
    pub year_bounds: Option<(i32, i32)>,
}

impl FilterOptions {
    pub fn from_records(records: &[Record]) -> Self {
        let mut counts = Aggregator::count_by_make(records);
        counts.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.make.cmp(&b.make)));

        let year_bounds = records
            .iter()
            .filter_map(|r| r.model_year)
            .fold(None, |bounds: Option<(i32, i32)>, year| match bounds {
                None => Some((year, year)),
                Some((lo, hi)) => Some((lo.min(year), hi.max(year))),
            });

        Self {
            makes: counts.into_iter().map(|m| m.make).collect(),
            year_bounds,
        }
    }
}

// ── Public function ───────────────────────────────────────────────────────────

/// Run the full analysis pipeline.
///
/// 1. Keep the records accepted by `filter`.
/// 2. Compute every dashboard view over them.
/// 3. Return an [`AnalysisResult`] with timing metadata.
pub fn analyze(records: &[Record], filter: &FilterState) -> AnalysisResult {
    let start = std::time::Instant::now();

    let filtered = Aggregator::filter(records, filter);
    let views = Aggregator::compute_views(&filtered);

    let metadata = AnalysisMetadata {
        generated_at: Utc::now().to_rfc3339(),
        records_loaded: records.len(),
        records_matched: filtered.len(),
        compute_time_seconds: start.elapsed().as_secs_f64(),
    };

    tracing::debug!(
        "Analysed {} of {} records for make={} years={}-{} in {:.3}s",
        metadata.records_matched,
        metadata.records_loaded,
        filter.make_label(),
        filter.year_range.min(),
        filter.year_range.max(),
        metadata.compute_time_seconds,
    );

    AnalysisResult {
        filter: filter.clone(),
        views,
        metadata,
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
