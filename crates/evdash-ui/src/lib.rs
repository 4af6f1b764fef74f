//! Terminal UI layer for the EV registrations dashboard.
//!
//! Provides themes, the header and KPI components, the chart, map and table
//! views, and the main application event loop built on top of [`ratatui`].

pub mod app;
pub mod charts_view;
pub mod components;
pub mod map_view;
pub mod table_view;
pub mod themes;

pub use evdash_core as core;
