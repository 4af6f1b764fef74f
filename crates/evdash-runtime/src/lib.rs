//! Runtime layer for the EV registrations dashboard.
//!
//! Owns the loaded dataset, memoises the analysis for the current filter,
//! manages the filter lifecycle and runs the background task that feeds the
//! UI with snapshots.

pub mod data_manager;
pub mod filter_controller;
pub mod orchestrator;

pub use evdash_core as core;
pub use evdash_data as data;
