//! Shared domain types for the EV registrations dashboard.
//!
//! Holds the validated [`models::Record`] schema, the filter state and the
//! derived-view types, record validation at the load boundary, the error type,
//! CLI settings and number formatting helpers.

pub mod data_processors;
pub mod error;
pub mod formatting;
pub mod models;
pub mod settings;

pub use error::{DashboardError, Result};
