use super::Prober;
use crate::extract::Extractor;
use crate::fetch::{FetchResponse, Fetcher};
use crate::models::{
    match_key, page_url, AttributeResult, FailureKind, PerformanceResult, ProbeFailure, ProbeKind,
    RankResult,
};
use async_trait::async_trait;
use chrono::Utc;
use std::num::NonZeroUsize;
use std::sync::Arc;
use std::time::Instant;
use tracing::debug;
use url::Url;

/// Builds search URLs for keywords.
#[derive(Debug, Clone)]
pub struct SearchEngine {
    base_url: Url,
    query_param: String,
}

impl SearchEngine {
    pub fn new(base_url: &str, query_param: &str) -> Result<Self, url::ParseError> {
        Ok(Self {
            base_url: Url::parse(base_url)?,
            query_param: query_param.to_string(),
        })
    }

    /// Search URL for `keyword`, percent-encoded.
    pub fn query_url(&self, keyword: &str) -> String {
        let mut url = self.base_url.clone();
        url.query_pairs_mut().append_pair(&self.query_param, keyword);
        url.into()
    }
}

/// Production prober: fetches over HTTP and extracts with the HTML extractor.
pub struct SeoProber {
    fetcher: Arc<dyn Fetcher>,
    extractor: Arc<dyn Extractor>,
    search: SearchEngine,
}

impl SeoProber {
    pub fn new(
        fetcher: Arc<dyn Fetcher>,
        extractor: Arc<dyn Extractor>,
        search: SearchEngine,
    ) -> Self {
        Self {
            fetcher,
            extractor,
            search,
        }
    }
}

#[async_trait]
impl Prober for SeoProber {
    async fn check_ranking(&self, target: &str, keyword: &str) -> Result<RankResult, ProbeFailure> {
        let fail = |kind: FailureKind, detail: String| {
            ProbeFailure::new(ProbeKind::Rank, target, Some(keyword), kind, detail)
        };

        let url = self.search.query_url(keyword);
        let response = self
            .fetcher
            .fetch(&url)
            .await
            .and_then(FetchResponse::error_for_status)
            .map_err(|e| fail(e.kind(), e.to_string()))?;

        let entries = self
            .extractor
            .result_entries(&response.body)
            .map_err(|e| fail(FailureKind::Parse, e.to_string()))?;

        let needle = match_key(target);
        let position = entries
            .iter()
            .position(|entry| entry.contains(needle))
            .and_then(|index| NonZeroUsize::new(index + 1));

        debug!(
            "Rank for {} / {}: {:?} of {} entries",
            target,
            keyword,
            position,
            entries.len()
        );

        Ok(RankResult {
            target: target.to_string(),
            keyword: keyword.to_string(),
            position,
            observed_at: Utc::now(),
        })
    }

    async fn analyze_attributes(&self, target: &str) -> Result<AttributeResult, ProbeFailure> {
        let fail = |kind: FailureKind, detail: String| {
            ProbeFailure::new(ProbeKind::Attributes, target, None, kind, detail)
        };

        let response = self
            .fetcher
            .fetch(&page_url(target))
            .await
            .and_then(FetchResponse::error_for_status)
            .map_err(|e| fail(e.kind(), e.to_string()))?;

        let attrs = self
            .extractor
            .page_attributes(&response.body)
            .map_err(|e| fail(FailureKind::Parse, e.to_string()))?;

        Ok(AttributeResult {
            target: target.to_string(),
            title: attrs.title,
            meta_description: attrs.meta_description,
            h1_count: attrs.h1_count,
            h2_count: attrs.h2_count,
            missing_alt_count: attrs.missing_alt_count.min(attrs.image_count),
            observed_at: Utc::now(),
        })
    }

    async fn measure_performance(
        &self,
        target: &str,
    ) -> Result<PerformanceResult, ProbeFailure> {
        let started = Instant::now();
        let response = self.fetcher.fetch(&page_url(target)).await.map_err(|e| {
            ProbeFailure::new(
                ProbeKind::Performance,
                target,
                None,
                e.kind(),
                e.to_string(),
            )
        })?;
        let elapsed = started.elapsed();

        Ok(PerformanceResult {
            target: target.to_string(),
            status_code: response.status,
            response_time_seconds: elapsed.as_secs_f64(),
            content_length_bytes: response.content_length,
            observed_at: Utc::now(),
        })
    }
}
