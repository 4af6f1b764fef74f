//! Async dashboard orchestrator.
//!
//! Loads the dataset on a blocking thread, then serves filter changes in a
//! tokio task, sending [`DashboardSnapshot`]s through an `mpsc` channel so the
//! TUI event loop can consume them without any shared mutable state.
//!
//! Filter requests travel over a `watch` channel: it holds only the newest
//! filter, so a burst of key presses collapses into one recompute and the
//! last request is never dropped.

use std::path::PathBuf;

use evdash_core::models::FilterState;
use evdash_data::analysis::{AnalysisResult, FilterOptions};
use evdash_data::reader::LoadReport;
use tokio::sync::{mpsc, watch};

use crate::data_manager::DataManager;

// ── Public types ──────────────────────────────────────────────────────────────

/// Everything the presentation layer needs for one filter state.
#[derive(Debug, Clone)]
pub struct DashboardSnapshot {
    /// Views and metadata for `analysis.filter`.
    pub analysis: AnalysisResult,
    /// Choices for the filter controls.
    pub options: FilterOptions,
    /// Dataset load statistics (without the records).
    pub load_report: LoadReport,
}

// ── DashboardOrchestrator ─────────────────────────────────────────────────────

/// Background coordinator between the data layer and the UI.
///
/// Call [`DashboardOrchestrator::start`] to spin up the loop in a dedicated
/// tokio task.
pub struct DashboardOrchestrator {
    /// Dataset file or directory.
    data_path: PathBuf,
    /// Filter of the first snapshot.
    initial_filter: FilterState,
}

impl DashboardOrchestrator {
    pub fn new(data_path: PathBuf, initial_filter: FilterState) -> Self {
        Self {
            data_path,
            initial_filter,
        }
    }

    /// Start the dashboard loop.
    ///
    /// Returns the snapshot receiver and a [`DashboardHandle`] used to request
    /// new filters and to abort the loop.
    pub fn start(self) -> (mpsc::Receiver<DashboardSnapshot>, DashboardHandle) {
        let (snapshot_tx, snapshot_rx) = mpsc::channel(16);
        // The initial value counts as seen; only `request` wakes the loop.
        let (filter_tx, filter_rx) = watch::channel(self.initial_filter.clone());

        let handle = tokio::spawn(async move {
            self.dashboard_loop(snapshot_tx, filter_rx).await;
        });

        (snapshot_rx, DashboardHandle { handle, filter_tx })
    }

    // ── Private implementation ────────────────────────────────────────────

    /// Load once, send the initial snapshot, then answer filter requests until
    /// either channel closes.
    async fn dashboard_loop(
        self,
        tx: mpsc::Sender<DashboardSnapshot>,
        mut filter_rx: watch::Receiver<FilterState>,
    ) {
        let path = self.data_path.clone();
        let mut data_manager = match tokio::task::spawn_blocking(move || DataManager::load(&path))
            .await
        {
            Ok(manager) => manager,
            Err(e) => {
                tracing::warn!(error = %e, "dataset load task failed; continuing with no records");
                DataManager::new(Vec::new())
            }
        };

        if !Self::compute_and_send(&mut data_manager, &self.initial_filter, &tx).await {
            return;
        }

        while filter_rx.changed().await.is_ok() {
            let filter = filter_rx.borrow_and_update().clone();
            tracing::debug!(make = filter.make_label(), "computing views for new filter");

            if !Self::compute_and_send(&mut data_manager, &filter, &tx).await {
                break;
            }
        }

        tracing::debug!("dashboard loop finished");
    }

    /// Returns `false` once the receiver has been dropped.
    async fn compute_and_send(
        data_manager: &mut DataManager,
        filter: &FilterState,
        tx: &mpsc::Sender<DashboardSnapshot>,
    ) -> bool {
        let snapshot = DashboardSnapshot {
            analysis: data_manager.get_data(filter).clone(),
            options: data_manager.filter_options().clone(),
            load_report: data_manager.load_report().clone(),
        };

        if let Err(e) = tx.send(snapshot).await {
            tracing::debug!(error = %e, "snapshot receiver dropped");
            return false;
        }
        true
    }
}

// ── DashboardHandle ───────────────────────────────────────────────────────────

/// A handle to the background dashboard task.
pub struct DashboardHandle {
    handle: tokio::task::JoinHandle<()>,
    filter_tx: watch::Sender<FilterState>,
}

impl DashboardHandle {
    /// Ask for the views of `filter`, replacing any request not yet picked
    /// up.  Never blocks; returns `false` once the dashboard loop has stopped.
    pub fn request(&self, filter: FilterState) -> bool {
        self.filter_tx.send_replace(filter);
        if self.filter_tx.is_closed() {
            tracing::warn!("dashboard loop stopped; filter request ignored");
            return false;
        }
        true
    }

    /// Immediately abort the dashboard loop.
    pub fn abort(&self) {
        self.handle.abort();
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
