//! Data layer for the EV registrations dashboard.
//!
//! Responsible for discovering and reading registration datasets, filtering
//! them and deriving the aggregate views shown by the dashboard.

pub mod aggregator;
pub mod analysis;
pub mod reader;

mod proptests;

pub use evdash_core as core;
