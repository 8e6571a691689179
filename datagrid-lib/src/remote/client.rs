//! HTTP client for remote data sources.

use std::sync::Arc;
use std::time::Duration;

use log::debug;
use log::warn;
use reqwest::Client;
use reqwest::header::AUTHORIZATION;
use reqwest::header::HeaderMap;
use reqwest::header::HeaderName;
use reqwest::header::HeaderValue;
use url::Url;

use super::RetryConfig;
use super::normalize_response;
use crate::error::ApiError;
use crate::model::Column;
use crate::query::QueryRequest;
use crate::query::SourcePage;
use crate::query::params::encode_params;

/// Client for remote data sources and relation endpoints.
///
/// Cheap to clone (uses `Arc` internally) and safe to share across tables.
///
/// # Example
///
/// ```ignore
/// use datagrid_lib::remote::RemoteClient;
/// use datagrid_lib::query::QueryRequest;
///
/// let client = RemoteClient::builder()
///     .timeout(Duration::from_secs(10))
///     .bearer_token("secret")
///     .build()?;
///
/// let page = client
///     .fetch_page("https://example.com/api/users", &QueryRequest::new(25), &columns)
///     .await?;
/// ```
#[derive(Clone)]
pub struct RemoteClient {
    inner: Arc<RemoteClientInner>,
}

struct RemoteClientInner {
    http_client: Client,
    headers: HeaderMap,
    timeout: Option<Duration>,
    retry: RetryConfig,
}

impl RemoteClient {
    /// Creates a new builder.
    pub fn builder() -> RemoteClientBuilder {
        RemoteClientBuilder::default()
    }

    /// Fetches one page from a remote data source.
    ///
    /// The request is encoded with the query-parameter grammar and the
    /// response is normalized with [`normalize_response`].
    pub async fn fetch_page(
        &self,
        url: &str,
        request: &QueryRequest,
        columns: &[Column],
    ) -> Result<SourcePage, ApiError> {
        let params = encode_params(request, columns);
        let body = self.get_json(url, &params).await?;
        Ok(normalize_response(body))
    }

    /// Sends a GET request and parses the JSON body.
    ///
    /// Non-2xx responses become [`ApiError::Http`] carrying the status code
    /// and status text. Retryable failures are retried per the configured
    /// [`RetryConfig`].
    pub async fn get_json(
        &self,
        url: &str,
        params: &[(String, String)],
    ) -> Result<serde_json::Value, ApiError> {
        let url = build_url(url, params)?;
        let retry = &self.inner.retry;
        let mut attempt = 0;

        loop {
            match self.send_once(&url).await {
                Ok(body) => return Ok(body),
                Err(e) if retry.should_retry(&e, attempt) => {
                    let delay = retry.delay_for(attempt);
                    warn!("Request to {} failed ({}), retrying in {:?}", url, e, delay);
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }

    async fn send_once(&self, url: &Url) -> Result<serde_json::Value, ApiError> {
        debug!("GET {}", url);
        let mut request = self
            .inner
            .http_client
            .get(url.clone())
            .headers(self.inner.headers.clone());
        if let Some(timeout) = self.inner.timeout {
            request = request.timeout(timeout);
        }

        let response = request.send().await.map_err(|e| self.map_send_error(e))?;
        let status = response.status();
        if !status.is_success() {
            let message = status.canonical_reason().unwrap_or("Unknown Status");
            return Err(ApiError::http(status.as_u16(), message));
        }

        let text = response.text().await.map_err(|e| self.map_send_error(e))?;
        serde_json::from_str(&text)
            .map_err(|e| ApiError::parse_with_body(format!("Invalid JSON: {e}"), text))
    }

    fn map_send_error(&self, error: reqwest::Error) -> ApiError {
        match self.inner.timeout {
            Some(timeout) if error.is_timeout() => ApiError::Timeout(timeout),
            _ => ApiError::Network(error),
        }
    }
}

impl std::fmt::Debug for RemoteClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RemoteClient")
            .field("timeout", &self.inner.timeout)
            .field("retry", &self.inner.retry)
            .finish_non_exhaustive()
    }
}

/// Appends query parameters to a base URL, keeping any it already has.
pub fn build_url(base: &str, params: &[(String, String)]) -> Result<Url, ApiError> {
    let mut url = Url::parse(base).map_err(|e| ApiError::InvalidUrl(format!("{base}: {e}")))?;
    if !params.is_empty() {
        url.query_pairs_mut()
            .extend_pairs(params.iter().map(|(k, v)| (k.as_str(), v.as_str())));
    }
    Ok(url)
}

// =============================================================================
// Builder
// =============================================================================

/// Builder for [`RemoteClient`].
#[derive(Default)]
pub struct RemoteClientBuilder {
    timeout: Option<Duration>,
    connect_timeout: Option<Duration>,
    bearer_token: Option<String>,
    headers: Vec<(String, String)>,
    retry: Option<RetryConfig>,
    http_client: Option<Client>,
}

impl RemoteClientBuilder {
    /// Sets the per-request timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Sets the connection timeout. Ignored when a custom client is set.
    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = Some(timeout);
        self
    }

    /// Sends `Authorization: Bearer <token>` with every request.
    pub fn bearer_token(mut self, token: impl Into<String>) -> Self {
        self.bearer_token = Some(token.into());
        self
    }

    /// Adds a header sent with every request.
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Sets the retry policy. Defaults to [`RetryConfig::default`].
    pub fn retry(mut self, retry: RetryConfig) -> Self {
        self.retry = Some(retry);
        self
    }

    /// Sets a custom HTTP client.
    pub fn http_client(mut self, client: Client) -> Self {
        self.http_client = Some(client);
        self
    }

    /// Builds the client.
    ///
    /// Fails on header names or values that are not valid HTTP, or if the
    /// underlying HTTP client cannot be created.
    pub fn build(self) -> Result<RemoteClient, ApiError> {
        let mut headers = HeaderMap::new();
        for (name, value) in &self.headers {
            let name = HeaderName::from_bytes(name.as_bytes())
                .map_err(|e| ApiError::InvalidUrl(format!("invalid header name {name}: {e}")))?;
            let value = HeaderValue::from_str(value)
                .map_err(|e| ApiError::InvalidUrl(format!("invalid header value: {e}")))?;
            headers.insert(name, value);
        }
        if let Some(token) = &self.bearer_token {
            let mut value = HeaderValue::from_str(&format!("Bearer {token}"))
                .map_err(|e| ApiError::InvalidUrl(format!("invalid bearer token: {e}")))?;
            value.set_sensitive(true);
            headers.insert(AUTHORIZATION, value);
        }

        let http_client = match self.http_client {
            Some(client) => client,
            None => {
                let mut builder = Client::builder();
                if let Some(timeout) = self.connect_timeout {
                    builder = builder.connect_timeout(timeout);
                }
                builder.build()?
            }
        };

        Ok(RemoteClient {
            inner: Arc::new(RemoteClientInner {
                http_client,
                headers,
                timeout: self.timeout,
                retry: self.retry.unwrap_or_default(),
            }),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_url_appends_params() {
        let params = vec![
            ("page".to_string(), "2".to_string()),
            ("filter[name]".to_string(), "a b".to_string()),
        ];
        let url = build_url("http://localhost:8080/api/users?tenant=x", &params).unwrap();
        let pairs: Vec<(String, String)> = url
            .query_pairs()
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect();
        assert_eq!(
            pairs,
            [
                ("tenant".to_string(), "x".to_string()),
                ("page".to_string(), "2".to_string()),
                ("filter[name]".to_string(), "a b".to_string()),
            ]
        );
    }

    #[test]
    fn test_build_url_rejects_relative() {
        assert!(matches!(build_url("/api/users", &[]), Err(ApiError::InvalidUrl(_))));
    }

    #[test]
    fn test_builder_rejects_bad_header() {
        let result = RemoteClient::builder().header("bad header", "x").build();
        assert!(result.is_err());
    }

    #[test]
    fn test_builder_defaults() {
        let client = RemoteClient::builder().build().unwrap();
        assert_eq!(client.inner.retry.max_retries, 3);
        assert!(client.inner.timeout.is_none());
    }
}
