//! Memoising data manager for the dashboard runtime.
//!
//! Owns the records loaded at startup and wraps [`analyze`] with a
//! single-slot cache keyed by the filter state: asking twice for the same
//! filter returns the cached [`AnalysisResult`], a different filter
//! recomputes and replaces it.

use std::path::Path;
use std::time::{Duration, Instant};

use evdash_core::models::{FilterState, Record};
use evdash_data::analysis::{analyze, AnalysisResult, FilterOptions};
use evdash_data::reader::{load_records, LoadReport};

// ── DataManager ───────────────────────────────────────────────────────────────

/// Memoised wrapper around the analysis pipeline.
///
/// # Example
/// ```no_run
/// use evdash_core::models::FilterState;
/// use evdash_runtime::data_manager::DataManager;
///
/// let mut mgr = DataManager::load("data/processed_ev_data.json".as_ref());
/// let result = mgr.get_data(&FilterState::default());
/// println!("total EVs: {}", result.views.summary.total_count);
/// ```
pub struct DataManager {
    /// Records loaded once at startup; never mutated.
    records: Vec<Record>,
    /// Makes and year bounds offered by the filter controls.
    options: FilterOptions,
    /// Load statistics (`records` is left empty).
    load_report: LoadReport,
    /// Result for the most recently requested filter.
    cache: Option<AnalysisResult>,
    /// When the cache was last populated.
    cache_timestamp: Option<Instant>,
    cache_hits: u64,
    recomputations: u64,
}

impl DataManager {
    /// Create a manager over records that are already in memory.
    pub fn new(records: Vec<Record>) -> Self {
        let options = FilterOptions::from_records(&records);
        Self {
            records,
            options,
            load_report: LoadReport::default(),
            cache: None,
            cache_timestamp: None,
            cache_hits: 0,
            recomputations: 0,
        }
    }

    /// Load every dataset file under `path` and manage the result.
    ///
    /// Loading never fails; an unreadable dataset yields an empty manager.
    pub fn load(path: &Path) -> Self {
        let mut report = load_records(path);
        let records = std::mem::take(&mut report.records);
        let mut manager = Self::new(records);
        manager.load_report = report;
        manager
    }

    // ── Public API ────────────────────────────────────────────────────────

    /// Return the analysis for `filter`, recomputing only when it differs
    /// from the filter of the cached result.
    pub fn get_data(&mut self, filter: &FilterState) -> &AnalysisResult {
        let hit = self
            .cache
            .as_ref()
            .is_some_and(|cached| cached.filter == *filter);

        if hit {
            self.cache_hits += 1;
            tracing::debug!("returning cached analysis result");
        } else {
            self.cache = None;
            self.cache_timestamp = Some(Instant::now());
            self.recomputations += 1;
        }

        let records = &self.records;
        let result = self.cache.get_or_insert_with(|| analyze(records, filter));
        if !hit {
            tracing::debug!(
                matched = result.metadata.records_matched,
                "analysis cache updated"
            );
        }
        result
    }

    /// Discard the current cache, forcing the next [`get_data`](Self::get_data)
    /// call to recompute.
    pub fn invalidate_cache(&mut self) {
        self.cache = None;
        self.cache_timestamp = None;
        tracing::debug!("cache invalidated");
    }

    /// Age of the current cache entry, or `None` if nothing is cached.
    pub fn cache_age(&self) -> Option<Duration> {
        self.cache_timestamp.map(|ts| ts.elapsed())
    }

    pub fn cache_hits(&self) -> u64 {
        self.cache_hits
    }

    pub fn recomputations(&self) -> u64 {
        self.recomputations
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn filter_options(&self) -> &FilterOptions {
        &self.options
    }

    pub fn load_report(&self) -> &LoadReport {
        &self.load_report
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
