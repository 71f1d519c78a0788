//! `reqwest`-backed fetcher.

use super::{FetchResponse, Fetcher};
use crate::error::FetchError;
use async_trait::async_trait;
use std::time::Duration;
use tracing::debug;

/// Fetcher that performs real HTTP GET requests.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: reqwest::Client,
    timeout_seconds: u64,
}

impl HttpFetcher {
    /// Build a client that identifies itself with `user_agent` and gives up
    /// after `timeout_seconds`.
    pub fn new(user_agent: &str, timeout_seconds: u64) -> Result<Self, FetchError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_seconds))
            .user_agent(user_agent)
            .build()
            .map_err(|e| FetchError::Request(format!("failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            timeout_seconds,
        })
    }

    fn classify(&self, err: reqwest::Error) -> FetchError {
        if err.is_timeout() {
            FetchError::Timeout(self.timeout_seconds)
        } else if err.is_connect() {
            FetchError::Connect(err.to_string())
        } else {
            FetchError::Request(err.to_string())
        }
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<FetchResponse, FetchError> {
        debug!("GET {}", url);

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| self.classify(e))?;

        let status = response.status().as_u16();
        let bytes = response.bytes().await.map_err(|e| self.classify(e))?;

        Ok(FetchResponse {
            status,
            content_length: bytes.len(),
            body: String::from_utf8_lossy(&bytes).into_owned(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_fetch_returns_status_and_body() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/"))
            .and(header("user-agent", "test-agent/1.0"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>hello</html>"))
            .mount(&server)
            .await;

        let fetcher = HttpFetcher::new("test-agent/1.0", 5).unwrap();
        let response = fetcher.fetch(&format!("{}/", server.uri())).await.unwrap();

        assert_eq!(response.status, 200);
        assert_eq!(response.body, "<html>hello</html>");
        assert_eq!(response.content_length, 18);
    }

    #[tokio::test]
    async fn test_non_success_status_is_data() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(503).set_body_string("down"))
            .mount(&server)
            .await;

        let fetcher = HttpFetcher::new("test-agent/1.0", 5).unwrap();
        let response = fetcher.fetch(&server.uri()).await.unwrap();

        assert_eq!(response.status, 503);
        assert!(matches!(
            response.error_for_status(),
            Err(FetchError::Status(503))
        ));
    }

    #[tokio::test]
    async fn test_timeout_is_distinguished() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(3)))
            .mount(&server)
            .await;

        let fetcher = HttpFetcher::new("test-agent/1.0", 1).unwrap();
        let err = fetcher.fetch(&server.uri()).await.unwrap_err();

        assert!(matches!(err, FetchError::Timeout(1)));
    }

    #[tokio::test]
    async fn test_connection_failure_is_network_error() {
        // Bind then drop a listener so the port is very likely closed.
        let addr = std::net::TcpListener::bind("127.0.0.1:0")
            .unwrap()
            .local_addr()
            .unwrap();

        let fetcher = HttpFetcher::new("test-agent/1.0", 2).unwrap();
        let err = fetcher
            .fetch(&format!("http://{}/", addr))
            .await
            .unwrap_err();

        assert_eq!(err.kind(), crate::models::FailureKind::Network);
    }
}
