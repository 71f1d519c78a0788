//! HTTP fetch collaborator.
//!
//! Probes talk to the network only through the [`Fetcher`] trait so that
//! orchestration and probe logic can be exercised without real requests.

pub mod http;

pub use http::HttpFetcher;

use crate::error::FetchError;
use async_trait::async_trait;

/// A fetched page. Any status is returned as data; use
/// [`FetchResponse::error_for_status`] where non-2xx must fail.
#[derive(Debug, Clone, PartialEq)]
pub struct FetchResponse {
    pub status: u16,
    pub body: String,
    /// Size of the raw response body in bytes.
    pub content_length: usize,
}

impl FetchResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Turn a non-2xx response into `FetchError::Status`.
    pub fn error_for_status(self) -> Result<Self, FetchError> {
        if self.is_success() {
            Ok(self)
        } else {
            Err(FetchError::Status(self.status))
        }
    }
}

/// Fetches a URL with the configured headers and timeout.
#[async_trait]
pub trait Fetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<FetchResponse, FetchError>;
}
