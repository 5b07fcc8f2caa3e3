use std::collections::BTreeMap;
use std::fmt::{Display, Formatter};
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;

/// Browser-like headers sent with every upstream request.
///
/// Several park upstreams answer 403/406 to non-browser user agents.
pub const DEFAULT_HEADERS: [(&str, &str); 4] = [
    (
        "user-agent",
        "Mozilla/5.0 (iPhone; CPU iPhone OS 17_4 like Mac OS X) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/17.4 Mobile/15E148 Safari/604.1",
    ),
    (
        "accept",
        "application/json, text/html;q=0.9, */*;q=0.8",
    ),
    ("accept-language", "en-US,en;q=0.9"),
    ("cache-control", "no-cache"),
];

/// Outbound GET request used by the acquisition layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpRequest {
    pub url: String,
    pub headers: BTreeMap<String, String>,
    pub timeout_ms: u64,
}

impl HttpRequest {
    /// GET request carrying the default browser headers.
    pub fn get(url: impl Into<String>) -> Self {
        let headers = DEFAULT_HEADERS
            .iter()
            .map(|(name, value)| ((*name).to_owned(), (*value).to_owned()))
            .collect();
        Self {
            url: url.into(),
            headers,
            timeout_ms: 8_000,
        }
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers
            .insert(name.into().to_ascii_lowercase(), value.into());
        self
    }

    /// Merges caller headers over the defaults; caller values win.
    pub fn with_headers<I, K, V>(mut self, headers: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        for (name, value) in headers {
            self = self.with_header(name, value);
        }
        self
    }

    pub fn with_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

/// Raw upstream response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

impl HttpResponse {
    pub fn ok(body: impl Into<String>) -> Self {
        Self {
            status: 200,
            body: body.into(),
        }
    }

    pub fn with_status(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    /// Only a 200 with a non-blank body counts as usable.
    pub fn is_usable(&self) -> bool {
        self.status == 200 && !self.body.trim().is_empty()
    }
}

/// Transport-level HTTP error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpError {
    message: String,
    timed_out: bool,
}

impl HttpError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            timed_out: false,
        }
    }

    pub fn timeout(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            timed_out: true,
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub const fn timed_out(&self) -> bool {
        self.timed_out
    }
}

impl Display for HttpError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for HttpError {}

pub type HttpFuture<'a> = Pin<Box<dyn Future<Output = Result<HttpResponse, HttpError>> + Send + 'a>>;

/// Transport contract; swapped for scripted fakes in tests.
pub trait HttpClient: Send + Sync {
    fn execute<'a>(&'a self, request: HttpRequest) -> HttpFuture<'a>;
}

/// Transport that fails every call without touching the network.
///
/// Useful offline: every acquisition resolves to fallback data.
#[derive(Debug, Default)]
pub struct OfflineHttpClient;

impl HttpClient for OfflineHttpClient {
    fn execute<'a>(&'a self, request: HttpRequest) -> HttpFuture<'a> {
        Box::pin(async move {
            Err(HttpError::new(format!(
                "offline transport refused request to {}",
                request.url
            )))
        })
    }
}

/// Production HTTP client backed by reqwest.
#[derive(Debug, Clone)]
pub struct ReqwestHttpClient {
    client: Arc<reqwest::Client>,
}

impl ReqwestHttpClient {
    pub fn new() -> Self {
        Self {
            client: Arc::new(
                reqwest::Client::builder()
                    .connect_timeout(Duration::from_secs(5))
                    .build()
                    .unwrap_or_else(|_| reqwest::Client::new()),
            ),
        }
    }

    pub fn with_client(client: reqwest::Client) -> Self {
        Self {
            client: Arc::new(client),
        }
    }
}

impl Default for ReqwestHttpClient {
    fn default() -> Self {
        Self::new()
    }
}

impl HttpClient for ReqwestHttpClient {
    fn execute<'a>(&'a self, request: HttpRequest) -> HttpFuture<'a> {
        Box::pin(async move {
            let mut builder = self.client.get(&request.url).timeout(request.timeout());

            for (name, value) in &request.headers {
                builder = builder.header(name, value);
            }

            let response = builder.send().await.map_err(|e| {
                if e.is_timeout() {
                    HttpError::timeout(format!("request timeout: {e}"))
                } else if e.is_connect() {
                    HttpError::new(format!("connection failed: {e}"))
                } else {
                    HttpError::new(format!("request failed: {e}"))
                }
            })?;

            let status = response.status().as_u16();
            let body = response
                .text()
                .await
                .map_err(|e| HttpError::new(format!("failed to read response body: {e}")))?;

            Ok(HttpResponse { status, body })
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn get_carries_browser_headers() {
        let request = HttpRequest::get("https://example.test/parks");

        assert!(request
            .headers
            .get("user-agent")
            .is_some_and(|ua| ua.starts_with("Mozilla/5.0")));
        assert_eq!(
            request.headers.get("accept-language").map(String::as_str),
            Some("en-US,en;q=0.9")
        );
    }

    #[test]
    fn caller_headers_override_defaults() {
        let request = HttpRequest::get("https://example.test/parks")
            .with_headers([("Accept", "text/html"), ("X-Client", "parkpulse")]);

        assert_eq!(
            request.headers.get("accept").map(String::as_str),
            Some("text/html")
        );
        assert_eq!(
            request.headers.get("x-client").map(String::as_str),
            Some("parkpulse")
        );
        assert_eq!(request.headers.len(), DEFAULT_HEADERS.len() + 1);
    }

    #[test]
    fn only_non_empty_200_is_usable() {
        assert!(HttpResponse::ok("{}").is_usable());
        assert!(!HttpResponse::ok("  ").is_usable());
        assert!(!HttpResponse::with_status(204, "{}").is_usable());
        assert!(!HttpResponse::with_status(406, "Not Acceptable").is_usable());
    }
}
