//! Reusable building blocks shared by every view.

pub mod header;
pub mod kpi;
