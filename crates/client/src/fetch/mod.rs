//! HTTP fetch pipeline for title lookups.
//!
//! ### Target Validation
//! - Trim whitespace, require an http(s) scheme
//! - Remove fragments
//!
//! ### Policy
//! - One GET per call, no retries
//! - Only 2xx responses are accepted; any other status is `HTTP_ERROR`
//! - Redirects: reqwest's default limit (10)
//! - Max body bytes: 5MB (configurable), enforced while streaming
//! - Body decoded with the Content-Type charset, UTF-8 otherwise
//! - Timeouts surface as `FETCH_TIMEOUT`, every other transport failure as `NETWORK_ERROR`

pub mod url;

use async_trait::async_trait;
use bytes::{Bytes, BytesMut};
use encoding_rs::{Encoding, UTF_8};
use reqwest::{Client, header};
use std::error::Error as _;
use std::time::{Duration, Instant};

pub use self::url::{UrlError, parse_target};

use pagetitle_core::Error;

/// Source of HTML documents.
///
/// The resolver only depends on this trait, so tests can count or fail
/// fetches without touching the network.
#[async_trait]
pub trait PageSource: Send + Sync {
    /// Fetch `url` and return the response body as text.
    async fn fetch_html(&self, url: &str) -> Result<String, Error>;
}

/// Configuration for the fetch client.
#[derive(Debug, Clone)]
pub struct FetchConfig {
    /// User agent string (default: "pagetitle/0.1")
    pub user_agent: String,

    /// Maximum response body size in bytes (default: 5MB)
    pub max_bytes: usize,

    /// Request timeout covering connect, headers and body (default: 5s)
    pub timeout: Duration,

    /// Maximum number of redirects to follow (default: 10)
    pub max_redirects: usize,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            user_agent: "pagetitle/0.1".to_string(),
            max_bytes: 5 * 1024 * 1024,
            timeout: Duration::from_secs(5),
            max_redirects: 10,
        }
    }
}

/// Body of a successful fetch.
#[derive(Debug, Clone)]
pub struct FetchResponse {
    /// Content-Type header
    pub content_type: Option<String>,
    /// Response body bytes
    pub bytes: Bytes,
}

impl FetchResponse {
    /// Body decoded with the charset named in Content-Type.
    ///
    /// Unknown or missing charsets fall back to UTF-8; a byte order mark wins
    /// over the header. Invalid sequences become U+FFFD.
    pub fn text(&self) -> String {
        let encoding = self
            .content_type
            .as_deref()
            .and_then(charset_param)
            .and_then(|label| Encoding::for_label(label.as_bytes()))
            .unwrap_or(UTF_8);
        let (text, _, _) = encoding.decode(&self.bytes);
        text.into_owned()
    }
}

/// Value of the `charset` parameter of a Content-Type header.
fn charset_param(content_type: &str) -> Option<&str> {
    content_type.split(';').skip(1).find_map(|param| {
        let (name, value) = param.split_once('=')?;
        name.trim()
            .eq_ignore_ascii_case("charset")
            .then_some(value.trim().trim_matches('"'))
    })
}

/// HTTP fetch client.
pub struct FetchClient {
    http: Client,
    config: FetchConfig,
}

impl FetchClient {
    /// Create a new fetch client with the given configuration.
    pub fn new(config: FetchConfig) -> Result<Self, Error> {
        let http = Client::builder()
            .user_agent(&config.user_agent)
            .timeout(config.timeout)
            .redirect(reqwest::redirect::Policy::limited(config.max_redirects))
            .use_rustls_tls()
            .gzip(true)
            .brotli(true)
            .deflate(true)
            .build()
            .map_err(|e| Error::Internal(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self { http, config })
    }

    /// Fetch a URL, returning raw bytes and metadata.
    ///
    /// Rejects non-2xx responses and bodies above `max_bytes`. The body is
    /// read chunk by chunk and abandoned as soon as it passes the limit.
    pub async fn fetch(&self, url_str: &str) -> Result<FetchResponse, Error> {
        let start = Instant::now();
        let url = parse_target(url_str).map_err(|e| Error::InvalidUrl(e.to_string()))?;

        let mut response = self
            .http
            .get(url.as_str())
            .header(
                header::ACCEPT,
                "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8",
            )
            .send()
            .await
            .map_err(|e| self.classify(&e))?;

        let status = response.status();

        if !status.is_success() {
            return Err(Error::HttpStatus(status.as_u16()));
        }

        if let Some(len) = response.content_length()
            && len as usize > self.config.max_bytes
        {
            return Err(self.too_large(len));
        }

        let final_url = response.url().clone();
        let content_type = response
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(|s| s.to_string());

        let mut body = BytesMut::new();
        while let Some(chunk) = response.chunk().await.map_err(|e| self.classify(&e))? {
            let received = body.len() + chunk.len();
            if received > self.config.max_bytes {
                return Err(self.too_large(received as u64));
            }
            body.extend_from_slice(&chunk);
        }
        let bytes = body.freeze();

        let fetch_ms = start.elapsed().as_millis() as u64;

        tracing::debug!(
            "fetched {} -> {} in {}ms ({} bytes)",
            url,
            final_url,
            fetch_ms,
            bytes.len()
        );

        Ok(FetchResponse { content_type, bytes })
    }

    fn too_large(&self, received: u64) -> Error {
        Error::FetchTooLarge(format!("{} bytes exceeds {}", received, self.config.max_bytes))
    }

    /// Map a reqwest failure onto the error taxonomy, keeping the cause chain.
    fn classify(&self, err: &reqwest::Error) -> Error {
        if err.is_timeout() {
            return Error::FetchTimeout(format!("no response within {}ms", self.config.timeout.as_millis()));
        }

        let mut message = err.to_string();
        let mut source = err.source();
        while let Some(cause) = source {
            message.push_str(": ");
            message.push_str(&cause.to_string());
            source = cause.source();
        }

        if err.is_builder() { Error::InvalidUrl(message) } else { Error::Network(message) }
    }
}

#[async_trait]
impl PageSource for FetchClient {
    async fn fetch_html(&self, url: &str) -> Result<String, Error> {
        self.fetch(url).await.map(|response| response.text())
    }
}
