//! Minimal HTTP client with safe logging and retries, used to fetch search
//! result pages.
//!
//! - Request options: headers, timeout, retries
//! - Redacts sensitive query params and never logs secret values
//! - Retries network errors, 429 and 5xx with exponential backoff and
//!   `Retry-After` support (capped)
//! - Bodies are decoded with the charset named in `Content-Type`, UTF-8 otherwise
//! - Optional *raw* request/response logging via `EUREKA_HTTP_RAW=1`
//!
//! Example (no_run):
//! ```rust,no_run
//! # async fn demo() -> Result<(), eureka_http::HttpError> {
//! let client = eureka_http::HttpClient::new("https://eureka.mf.gov.pl/")?;
//! let page = client
//!     .get_text("informacje/wyszukiwanie", eureka_http::RequestOpts::default())
//!     .await?;
//! println!("{} bytes from {}", page.body.len(), page.url);
//! # Ok(()) }
//! ```
//!
//! Observability: structured `tracing` events are emitted for request start,
//! response headers, body snippets (truncated), retries and final errors.

use reqwest::header::{HeaderMap, RETRY_AFTER};
use reqwest::{Client, Method, StatusCode, Url};
use serde::Deserialize;
use std::env;
use std::time::Duration;
use thiserror::Error;
use tokio::time::sleep;

// ==============================
// Raw logging toggles
// ==============================

const RAW_ENV: &str = "EUREKA_HTTP_RAW";
const RAW_MAX_BODY: usize = 64 * 1024;
const MAX_RETRY_AFTER: Duration = Duration::from_secs(30);
const DEFAULT_CHARSET: &str = "utf-8";

pub use reqwest::header;

const SECRET_PARAMS: &[&str] = &[
    "access_token",
    "authorization",
    "auth",
    "key",
    "api_key",
    "token",
    "secret",
    "client_secret",
    "bearer",
];

fn raw_enabled() -> bool {
    matches!(
        env::var(RAW_ENV).as_deref(),
        Ok("1") | Ok("true") | Ok("yes")
    )
}

fn is_secret_param(name: &str) -> bool {
    SECRET_PARAMS.contains(&name.to_ascii_lowercase().as_str())
}

/// Render a best-effort curl command for repro/debug, with secrets redacted.
fn make_curl(method: &Method, url: &Url, headers: &HeaderMap) -> String {
    let mut parts = vec!["curl".to_string(), format!("-X{}", method)];
    for (name, val) in redact_headers(headers) {
        parts.push(format!("-H '{}: {}'", name, val.replace('\'', r"'\''")));
    }
    let mut shown = url.clone();
    let (_, redacted) = redact_query(url);
    if !redacted.is_empty() {
        shown.query_pairs_mut().clear().extend_pairs(redacted);
    }
    parts.push(format!("'{}'", shown.as_str()));
    parts.join(" ")
}

/// Redact sensitive headers for logging
fn redact_headers(h: &HeaderMap) -> Vec<(String, String)> {
    h.iter()
        .map(|(k, v)| {
            let key = k.as_str().to_string();
            let mut val = v.to_str().unwrap_or("").to_string();
            if key.eq_ignore_ascii_case("authorization") || key.eq_ignore_ascii_case("cookie") {
                val = "<redacted>".into();
            }
            (key, val)
        })
        .collect()
}

// ==============================
// Errors
// ==============================

#[derive(Debug, Error)]
pub enum HttpError {
    #[error("invalid URL: {0}")]
    Url(String),
    #[error("request build failed: {0}")]
    Build(String),
    #[error("network error: {0}")]
    Network(String),
    #[error("server returned error {status}: {message}, request_id={request_id}")]
    Api {
        status: StatusCode,
        message: String,
        request_id: String,
    },
}

// ==============================
// Request Options
// ==============================

/// Per-request tuning knobs for the HTTP client.
///
/// ```
/// use eureka_http::RequestOpts;
/// use eureka_http::header::{ACCEPT_LANGUAGE, HeaderMap, HeaderValue};
/// use std::time::Duration;
///
/// let mut headers = HeaderMap::new();
/// headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static("pl-PL"));
/// let opts = RequestOpts {
///     timeout: Some(Duration::from_secs(30)),
///     retries: Some(1),
///     headers: Some(headers),
///     ..Default::default()
/// };
///
/// assert_eq!(opts.timeout.unwrap().as_secs(), 30);
/// assert!(opts.allow_absolute == false);
/// ```
#[derive(Clone, Debug, Default)]
pub struct RequestOpts {
    pub timeout: Option<Duration>,
    pub retries: Option<usize>,
    pub headers: Option<HeaderMap>,
    /// If true and `path` is an absolute URL, use it as-is (ignore base).
    pub allow_absolute: bool,
}

/// A successfully fetched text document.
#[derive(Debug, Clone)]
pub struct TextResponse {
    /// Final URL after redirects; relative links in `body` resolve against it.
    pub url: Url,
    pub status: StatusCode,
    pub content_type: Option<String>,
    pub body: String,
}

// ==============================
// Client
// ==============================

#[derive(Clone)]
pub struct HttpClient {
    base: Url,
    inner: Client,
    pub default_timeout: Duration,
    pub max_retries: usize,
}

impl HttpClient {
    /// Construct a client anchored to a base URL.
    ///
    /// ```no_run
    /// use eureka_http::{HttpClient, HttpError};
    /// use std::time::Duration;
    ///
    /// let client = HttpClient::new("https://eureka.mf.gov.pl/")?;
    /// assert_eq!(client.default_timeout, Duration::from_secs(15));
    /// assert_eq!(client.max_retries, 2);
    /// # Ok::<(), HttpError>(())
    /// ```
    pub fn new(base: &str) -> Result<Self, HttpError> {
        let base = Url::parse(base).map_err(|e| HttpError::Url(e.to_string()))?;
        let inner = Client::builder()
            .connect_timeout(Duration::from_secs(5))
            .user_agent(concat!("eureka-search/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| HttpError::Build(e.to_string()))?;
        Ok(Self {
            base,
            inner,
            default_timeout: Duration::from_secs(15),
            max_retries: 2,
        })
    }

    /// Override the default timeout returned by [`HttpClient::new`].
    pub fn with_timeout(mut self, dur: Duration) -> Self {
        self.default_timeout = dur;
        self
    }

    /// Override the default retry budget returned by [`HttpClient::new`].
    pub fn with_retries(mut self, n: usize) -> Self {
        self.max_retries = n;
        self
    }

    pub fn base(&self) -> &Url {
        &self.base
    }

    /// GET a text document (HTML, XML, plain text).
    pub async fn get_text(&self, path: &str, opts: RequestOpts) -> Result<TextResponse, HttpError> {
        let url = self.resolve(path, opts.allow_absolute)?;
        self.request_text_internal(Method::GET, url, opts).await
    }

    fn resolve(&self, path: &str, allow_absolute: bool) -> Result<Url, HttpError> {
        if allow_absolute {
            if let Ok(abs) = Url::parse(path) {
                return Ok(abs);
            }
        }
        self.base
            .join(path)
            .map_err(|e| HttpError::Url(e.to_string()))
    }

    // ==============================
    // Core request implementation
    // ==============================

    async fn request_text_internal(
        &self,
        method: Method,
        url: Url,
        opts: RequestOpts,
    ) -> Result<TextResponse, HttpError> {
        let mut attempt = 0usize;
        let max_retries = opts.retries.unwrap_or(self.max_retries);
        let req_id = format!("r{}", uuid::Uuid::new_v4().simple());

        loop {
            // ----- Build request -----
            let mut rb = self.inner.request(method.clone(), url.clone());

            let timeout = opts.timeout.unwrap_or(self.default_timeout);
            rb = rb.timeout(timeout);

            if let Some(hdrs) = &opts.headers {
                rb = rb.headers(hdrs.clone());
            }

            // ----- Safe request logging (pre-send) -----
            let (host_path, url_q) = redact_query(&url);
            let attempt0 = attempt + 1;

            tracing::debug!(
                req_id=%req_id,
                attempt=attempt0,
                max_retries,
                method=%method,
                host_path=%host_path,
                url_query=?url_q,
                timeout_ms=timeout.as_millis() as u64,
                "http.request.start"
            );

            if raw_enabled() {
                let merged = opts.headers.clone().unwrap_or_default();
                let curl = make_curl(&method, &url, &merged);
                tracing::debug!(target: "http.raw", %req_id, %curl, "request");
            }

            // ----- Send -----
            let t0 = std::time::Instant::now();
            let resp = match rb.send().await {
                Ok(resp) => resp,
                Err(err) => {
                    let message = err.to_string();
                    if attempt < max_retries {
                        attempt += 1;
                        let delay = backoff(attempt);
                        tracing::warn!(
                            req_id=%req_id,
                            attempt,
                            max_retries,
                            backoff_ms=delay.as_millis() as u64,
                            message=%message,
                            "http.retrying.network_send"
                        );
                        sleep(delay).await;
                        continue;
                    }
                    tracing::warn!(
                        req_id=%req_id,
                        attempt,
                        max_retries,
                        message=%message,
                        "http.network_error.send"
                    );
                    return Err(HttpError::Network(message));
                }
            };
            let status = resp.status();
            let final_url = resp.url().clone();
            let headers = resp.headers().clone();
            let body = match resp.text_with_charset(DEFAULT_CHARSET).await {
                Ok(body) => body,
                Err(err) => {
                    let message = err.to_string();
                    if attempt < max_retries {
                        attempt += 1;
                        let delay = backoff(attempt);
                        tracing::warn!(
                            req_id=%req_id,
                            attempt,
                            max_retries,
                            backoff_ms=delay.as_millis() as u64,
                            message=%message,
                            "http.retrying.network_body"
                        );
                        sleep(delay).await;
                        continue;
                    }
                    tracing::warn!(
                        req_id=%req_id,
                        attempt,
                        max_retries,
                        message=%message,
                        "http.network_error.body"
                    );
                    return Err(HttpError::Network(message));
                }
            };
            let dur_ms = t0.elapsed().as_millis() as u64;

            let req_hdr_id = headers
                .get("x-request-id")
                .or_else(|| headers.get("x-correlation-id"))
                .and_then(|v| v.to_str().ok())
                .unwrap_or("-");
            let content_type = headers
                .get(reqwest::header::CONTENT_TYPE)
                .and_then(|v| v.to_str().ok())
                .map(str::to_string);

            tracing::debug!(
                req_id=%req_id,
                %status,
                duration_ms=dur_ms,
                body_len=content_len(&headers, body.len()),
                final_url=%final_url,
                x_request_id=%req_hdr_id,
                content_type=?content_type,
                "http.response.headers"
            );

            if raw_enabled() {
                let hdrs = redact_headers(&headers);
                let truncated = body.len() > RAW_MAX_BODY;
                let text: String = if truncated {
                    body.chars().take(RAW_MAX_BODY).collect()
                } else {
                    body.clone()
                };
                tracing::info!(
                    target:"http.raw",
                    %req_id,
                    status=%status,
                    duration_ms=dur_ms,
                    headers=?hdrs,
                    body=%text,
                    truncated
                );
            }

            let snippet = snip_body(body.as_bytes());
            tracing::trace!(
                req_id=%req_id,
                body_snippet=%snippet,
                "http.response.body_snippet"
            );

            // ----- Success path -----
            if status.is_success() {
                return Ok(TextResponse {
                    url: final_url,
                    status,
                    content_type,
                    body,
                });
            }

            // ----- Non-success: maybe retry -----
            let message = extract_error_message(body.as_bytes());
            let request_id = req_hdr_id.to_string();

            let is_429 = status == StatusCode::TOO_MANY_REQUESTS;
            let is_5xx = status.is_server_error();

            if (is_429 || is_5xx) && attempt < max_retries {
                attempt += 1;
                let delay = retry_delay(&headers, attempt, is_429);
                tracing::warn!(
                    req_id=%req_id,
                    %status,
                    attempt,
                    max_retries,
                    backoff_ms=delay.as_millis() as u64,
                    retry_after_secs=?retry_after_delay_secs(&headers),
                    message=%message,
                    "http.retrying"
                );
                sleep(delay).await;
                continue;
            }

            tracing::warn!(
                req_id=%req_id,
                %status,
                message=%message,
                x_request_id=%request_id,
                body_snippet=%snippet,
                "http.error"
            );
            return Err(HttpError::Api {
                status,
                message,
                request_id,
            });
        }
    }
}

// ==============================
// Helpers
// ==============================

fn backoff(attempt: usize) -> Duration {
    Duration::from_millis(200u64.saturating_mul(1 << (attempt.saturating_sub(1)).min(16)))
}

fn retry_delay(headers: &HeaderMap, attempt: usize, is_429: bool) -> Duration {
    if let Some(secs) = retry_after_delay_secs(headers) {
        Duration::from_secs(secs).min(MAX_RETRY_AFTER)
    } else if is_429 {
        // floor for 429 when no Retry-After is present
        backoff(attempt).max(Duration::from_millis(1100))
    } else {
        backoff(attempt)
    }
}

fn extract_error_message(body: &[u8]) -> String {
    // {"message":"..."} or {"detail":"..."} or {"error":"..."}
    #[derive(Deserialize)]
    struct Msg {
        #[serde(default)]
        message: String,
        #[serde(default)]
        detail: String,
        #[serde(default)]
        error: String,
    }

    if let Ok(m) = serde_json::from_slice::<Msg>(body) {
        if !m.message.is_empty() {
            return m.message;
        }
        if !m.detail.is_empty() {
            return m.detail;
        }
        if !m.error.is_empty() {
            return m.error;
        }
    }
    snip_body(body)
}

fn retry_after_delay_secs(h: &HeaderMap) -> Option<u64> {
    h.get(RETRY_AFTER)
        .and_then(|v| v.to_str().ok())?
        .parse()
        .ok()
}

fn snip_body(body: &[u8]) -> String {
    let snip = String::from_utf8_lossy(body);
    if snip.chars().count() > 500 {
        let mut cut: String = snip.chars().take(500).collect();
        cut.push_str("...");
        cut
    } else {
        snip.into_owned()
    }
}

fn redact_query(url: &Url) -> (String, Vec<(String, String)>) {
    // "host + path" string and redacted query list for logging
    let host_path = format!("{}{}", url.domain().unwrap_or("-"), url.path());
    let redacted = url
        .query_pairs()
        .map(|(k, v)| {
            let k = k.to_string();
            let v = v.to_string();
            let shown = if is_secret_param(&k) {
                "<redacted>".into()
            } else {
                v
            };
            (k, shown)
        })
        .collect::<Vec<_>>();
    (host_path, redacted)
}

fn content_len(headers: &HeaderMap, body_len: usize) -> usize {
    headers
        .get(reqwest::header::CONTENT_LENGTH)
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.parse::<usize>().ok())
        .unwrap_or(body_len)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn secret_query_params_are_redacted() {
        let url = Url::parse("https://eureka.mf.gov.pl/search?q=vat&token=abc").unwrap();
        let (host_path, pairs) = redact_query(&url);
        assert_eq!(host_path, "eureka.mf.gov.pl/search");
        assert_eq!(
            pairs,
            vec![
                ("q".to_string(), "vat".to_string()),
                ("token".to_string(), "<redacted>".to_string())
            ]
        );
    }

    #[test]
    fn curl_never_contains_secrets() {
        let url = Url::parse("https://eureka.mf.gov.pl/search?api_key=zzz").unwrap();
        let mut headers = HeaderMap::new();
        headers.insert("authorization", "Bearer zzz".parse().unwrap());
        let curl = make_curl(&Method::GET, &url, &headers);
        assert!(!curl.contains("zzz"));
        assert!(curl.contains("<redacted>"));
    }

    #[test]
    fn error_message_prefers_structured_fields() {
        assert_eq!(extract_error_message(br#"{"detail":"nope"}"#), "nope");
        assert_eq!(extract_error_message(b"plain failure"), "plain failure");
    }

    #[test]
    fn backoff_grows_exponentially() {
        assert_eq!(backoff(1), Duration::from_millis(200));
        assert_eq!(backoff(2), Duration::from_millis(400));
        assert_eq!(backoff(3), Duration::from_millis(800));
    }

    #[test]
    fn retry_after_is_honoured_up_to_a_cap() {
        let mut headers = HeaderMap::new();
        headers.insert(RETRY_AFTER, "3".parse().unwrap());
        assert_eq!(retry_delay(&headers, 1, true), Duration::from_secs(3));

        headers.insert(RETRY_AFTER, "86400".parse().unwrap());
        assert_eq!(retry_delay(&headers, 1, true), MAX_RETRY_AFTER);

        let empty = HeaderMap::new();
        assert_eq!(retry_delay(&empty, 1, true), Duration::from_millis(1100));
        assert_eq!(retry_delay(&empty, 2, false), Duration::from_millis(400));
    }

    #[test]
    fn long_bodies_are_snipped_on_char_boundaries() {
        let body = "ż".repeat(600);
        let snip = snip_body(body.as_bytes());
        assert!(snip.ends_with("..."));
        assert_eq!(snip.chars().count(), 503);
    }
}
