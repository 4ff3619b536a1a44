//! HTTP fetch pipeline.
//!
//! ### URL Normalization
//! - Trim whitespace, strip fragments
//! - Lowercase host, preserve query string
//!
//! ### Transport semantics
//! - A transport failure (DNS, connect, TLS, read) is an error.
//! - An HTTP error status is NOT an error: interception returns whatever the
//!   origin said, so callers see the response exactly as fetched.
//! - No request timeout and no retry are configured; a slow origin simply
//!   delays the response.

pub mod url;

use async_trait::async_trait;
use bytes::Bytes;
use portico_core::{Error, Snapshot};
use reqwest::{Client, Method, Url};
use std::time::Instant;

pub use self::url::{UrlError, normalize};

/// Response from a fetch operation.
#[derive(Debug, Clone)]
pub struct FetchResponse {
    /// The URL requested
    pub url: Url,
    /// The final URL after redirects
    pub final_url: Url,
    /// HTTP status code
    pub status: u16,
    /// Response headers as name/value pairs
    pub headers: Vec<(String, String)>,
    /// Response body bytes
    pub bytes: Bytes,
    /// Time taken to fetch in milliseconds
    pub fetch_ms: u64,
}

impl FetchResponse {
    /// Whether the status code is in the 2xx success range.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Convert into a storable snapshot, keyed by the requested URL (not the
    /// post-redirect one, so lookups match what was asked for).
    pub fn to_snapshot(&self, method: &str) -> Snapshot {
        Snapshot::of_response(method, self.url.as_str(), self.status, self.headers.clone(), self.bytes.to_vec())
    }
}

/// Network seam for the fetch interceptor and the lifecycle manager.
///
/// Implemented by [`FetchClient`] for the real network and by in-memory
/// fakes in tests.
#[async_trait]
pub trait Fetcher: Send + Sync {
    /// Issue a request to the network.
    ///
    /// Errors only on transport failure; HTTP error statuses come back as
    /// ordinary responses.
    async fn send(&self, method: &str, url: &Url, body: Option<Vec<u8>>) -> Result<FetchResponse, Error>;

    /// GET a URL and require a success status.
    ///
    /// Used by bulk cache population, where a non-OK asset must abort the
    /// whole operation.
    async fn get_ok(&self, url: &Url) -> Result<FetchResponse, Error> {
        let response = self.send("GET", url, None).await?;
        if !response.is_success() {
            return Err(Error::HttpError(format!("{} returned status {}", url, response.status)));
        }
        Ok(response)
    }
}

/// HTTP fetch client backed by reqwest.
pub struct FetchClient {
    http: Client,
}

impl FetchClient {
    /// Create a new fetch client with the given User-Agent.
    pub fn new(user_agent: &str) -> Result<Self, Error> {
        let http = Client::builder()
            .user_agent(user_agent)
            .use_rustls_tls()
            .gzip(true)
            .brotli(true)
            .deflate(true)
            .build()
            .map_err(|e| Error::HttpError(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self { http })
    }
}

#[async_trait]
impl Fetcher for FetchClient {
    async fn send(&self, method: &str, url: &Url, body: Option<Vec<u8>>) -> Result<FetchResponse, Error> {
        let start = Instant::now();
        let method = Method::from_bytes(method.as_bytes())
            .map_err(|e| Error::InvalidInput(format!("invalid method: {}", e)))?;

        let mut request = self.http.request(method, url.clone());
        if let Some(body) = body {
            request = request.body(body);
        }

        let response = request
            .send()
            .await
            .map_err(|e| Error::HttpError(format!("network error: {}", e)))?;

        let status = response.status().as_u16();
        let final_url = response.url().clone();
        let headers = response
            .headers()
            .iter()
            .filter_map(|(name, value)| value.to_str().ok().map(|v| (name.to_string(), v.to_string())))
            .collect();

        let bytes = response
            .bytes()
            .await
            .map_err(|e| Error::HttpError(format!("failed to read response: {}", e)))?;

        let fetch_ms = start.elapsed().as_millis() as u64;

        tracing::debug!(
            "fetched {} -> {} status {} in {}ms ({} bytes)",
            url,
            final_url,
            status,
            fetch_ms,
            bytes.len()
        );

        Ok(FetchResponse { url: url.clone(), final_url, status, headers, bytes, fetch_ms })
    }
}
