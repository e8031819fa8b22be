//! Remote asset retrieval.

use crate::error::FetchError;
use async_trait::async_trait;
use bridge_traits::http::{HttpClient, HttpRequest, RetryPolicy};
use bytes::Bytes;
use std::sync::Arc;
use tracing::{debug, instrument, warn};

/// Retrieves the bytes of a logical asset path.
///
/// Implementations do not cache; [`AssetStore`](crate::store::AssetStore)
/// sits in front of them.
#[async_trait]
pub trait AssetFetcher: Send + Sync {
    async fn fetch(&self, remote_path: &str) -> Result<Bytes, FetchError>;
}

/// [`AssetFetcher`] over the host's [`HttpClient`].
pub struct HttpAssetFetcher {
    http_client: Arc<dyn HttpClient>,
    base_url: String,
    retry_policy: RetryPolicy,
}

impl HttpAssetFetcher {
    pub fn new(http_client: Arc<dyn HttpClient>, base_url: impl Into<String>) -> Self {
        Self {
            http_client,
            base_url: base_url.into(),
            retry_policy: RetryPolicy::default(),
        }
    }

    pub fn with_retry_policy(mut self, policy: RetryPolicy) -> Self {
        self.retry_policy = policy;
        self
    }

    /// Full URL for `remote_path`, with duplicate slashes collapsed.
    pub fn asset_url(&self, remote_path: &str) -> String {
        let joined = format!("{}/{}", self.base_url, remote_path);
        let (scheme, rest) = match joined.split_once("://") {
            Some((scheme, rest)) => (Some(scheme), rest),
            None => (None, joined.as_str()),
        };

        let mut collapsed = String::with_capacity(rest.len());
        let mut previous_slash = false;
        for ch in rest.chars() {
            if ch == '/' && previous_slash {
                continue;
            }
            previous_slash = ch == '/';
            collapsed.push(ch);
        }

        match scheme {
            Some(scheme) => format!("{}://{}", scheme, collapsed),
            None => collapsed,
        }
    }
}

#[async_trait]
impl AssetFetcher for HttpAssetFetcher {
    #[instrument(skip(self))]
    async fn fetch(&self, remote_path: &str) -> Result<Bytes, FetchError> {
        let url = self.asset_url(remote_path);
        let request = HttpRequest::get(&url).no_cache();

        let response = self
            .http_client
            .execute_with_retry(request, self.retry_policy.clone())
            .await
            .map_err(|e| {
                warn!(error = %e, "Asset request failed");
                FetchError::NetworkError(e.to_string())
            })?;

        if response.is_ok() {
            debug!(size = response.body.len(), "Fetched asset");
            return Ok(response.body);
        }

        if response.is_not_found() {
            debug!(status = response.status, "Asset not found");
            return Err(FetchError::NotFound {
                path: remote_path.to_string(),
            });
        }

        warn!(status = response.status, "Unexpected asset response");
        Err(FetchError::ServerError {
            status: response.status,
            path: remote_path.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bridge_traits::error::{BridgeError, Result};
    use bridge_traits::http::HttpResponse;
    use mockall::mock;
    use std::collections::HashMap;

    mock! {
        HttpClient {}

        #[async_trait]
        impl HttpClient for HttpClient {
            async fn execute(&self, request: HttpRequest) -> Result<HttpResponse>;
        }
    }

    fn response(status: u16, body: &'static [u8]) -> HttpResponse {
        HttpResponse {
            status,
            headers: HashMap::new(),
            body: Bytes::from_static(body),
        }
    }

    fn fetcher(mock: MockHttpClient) -> HttpAssetFetcher {
        HttpAssetFetcher::new(Arc::new(mock), "https://assets.example.org/")
    }

    #[test]
    fn asset_url_collapses_slashes() {
        let fetcher = fetcher(MockHttpClient::new());
        assert_eq!(
            fetcher.asset_url("/audio//1985/en_007.mp3"),
            "https://assets.example.org/audio/1985/en_007.mp3"
        );
        assert_eq!(
            fetcher.asset_url("sheet-music/1985/PianoSheet_NewHymnal_en_001.png"),
            "https://assets.example.org/sheet-music/1985/PianoSheet_NewHymnal_en_001.png"
        );
    }

    #[tokio::test]
    async fn ok_response_returns_body_and_bypasses_http_caches() {
        let mut mock = MockHttpClient::new();
        mock.expect_execute()
            .withf(|request| {
                request.url == "https://assets.example.org/audio/1941/007.mp3"
                    && request.headers.get("Cache-Control").map(String::as_str) == Some("no-cache")
            })
            .times(1)
            .returning(|_| Ok(response(200, b"ID3")));

        let bytes = fetcher(mock).fetch("audio/1941/007.mp3").await.unwrap();
        assert_eq!(bytes, Bytes::from_static(b"ID3"));
    }

    #[tokio::test]
    async fn missing_asset_is_not_found() {
        let mut mock = MockHttpClient::new();
        mock.expect_execute()
            .times(1)
            .returning(|_| Ok(response(404, b"")));

        let err = fetcher(mock).fetch("audio/1985/en_999.mp3").await.unwrap_err();
        assert_eq!(
            err,
            FetchError::NotFound {
                path: "audio/1985/en_999.mp3".to_string()
            }
        );
    }

    #[tokio::test]
    async fn only_200_counts_as_success() {
        let mut mock = MockHttpClient::new();
        mock.expect_execute()
            .times(1)
            .returning(|_| Ok(response(204, b"")));

        let err = fetcher(mock).fetch("audio/1985/en_001.mp3").await.unwrap_err();
        assert!(matches!(err, FetchError::ServerError { status: 204, .. }));
    }

    #[tokio::test]
    async fn transport_failure_is_network_error() {
        let mut mock = MockHttpClient::new();
        mock.expect_execute()
            .times(1)
            .returning(|_| Err(BridgeError::OperationFailed("connection reset".to_string())));

        let err = fetcher(mock).fetch("audio/1985/en_001.mp3").await.unwrap_err();
        assert!(matches!(err, FetchError::NetworkError(_)));
        assert!(err.is_transient());
    }
}
