//! Property-based tests for the aggregator.
