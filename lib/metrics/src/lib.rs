//! Running statistics over completed ticket runs.
//!
//! A single [`MetricsAggregator`] is shared by every request handler; it is
//! the only mutable state shared between concurrent runs.

pub mod aggregator;

pub use aggregator::{MetricsAggregator, MetricsSnapshot};
