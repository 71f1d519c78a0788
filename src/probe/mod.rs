//! Probe functions.
//!
//! Each probe issues its own request, never retries, and reports any
//! problem as a `ProbeFailure` instead of an error.

mod seo;

pub use seo::{SearchEngine, SeoProber};

use crate::models::{AttributeResult, PerformanceResult, ProbeFailure, RankResult};
use async_trait::async_trait;

/// The three probes run against every target.
#[async_trait]
pub trait Prober: Send + Sync {
    /// Position of `target` in the search results for `keyword`.
    async fn check_ranking(&self, target: &str, keyword: &str) -> Result<RankResult, ProbeFailure>;

    /// Title, meta description, heading and image-alt counts of the landing page.
    async fn analyze_attributes(&self, target: &str) -> Result<AttributeResult, ProbeFailure>;

    /// Status, response time and size of one fetch of the landing page.
    async fn measure_performance(&self, target: &str)
        -> Result<PerformanceResult, ProbeFailure>;
}
