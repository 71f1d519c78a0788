//! Analysis modules.
//!
//! This module turns closed cycle batches into reports.

pub mod aggregator;

pub use aggregator::*;
