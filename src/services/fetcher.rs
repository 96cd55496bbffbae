// src/services/fetcher.rs

//! Document fetcher with failure classification and fixed-delay retries.
//!
//! | failure                         | retried |
//! |---------------------------------|---------|
//! | malformed URL, redirect loop    | no      |
//! | HTTP status error               | no      |
//! | timeout, connection failure     | yes     |
//! | anything else                   | no      |

use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use thiserror::Error;

use crate::models::CrawlerConfig;

/// A classified fetch failure.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FetchError {
    #[error("invalid URL '{url}': {message}")]
    InvalidUrl { url: String, message: String },

    #[error("too many redirects for {0}")]
    TooManyRedirects(String),

    #[error("HTTP status {status} for {url}")]
    Status { url: String, status: u16 },

    #[error("request timeout for {0}")]
    Timeout(String),

    #[error("connection error for {url}: {message}")]
    Connect { url: String, message: String },

    #[error("giving up on {url} after {attempts} attempts: {last}")]
    RetriesExhausted {
        url: String,
        attempts: u32,
        last: Box<FetchError>,
    },

    #[error("request to {url} failed: {message}")]
    Unknown { url: String, message: String },
}

impl FetchError {
    /// Whether another attempt may succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Timeout(_) | Self::Connect { .. })
    }

    /// Classify a transport error from the HTTP client.
    pub fn classify(url: &str, error: &reqwest::Error) -> Self {
        if error.is_builder() {
            Self::InvalidUrl {
                url: url.to_string(),
                message: error.to_string(),
            }
        } else if error.is_redirect() {
            Self::TooManyRedirects(url.to_string())
        } else if let Some(status) = error.status() {
            Self::Status {
                url: url.to_string(),
                status: status.as_u16(),
            }
        } else if error.is_timeout() {
            Self::Timeout(url.to_string())
        } else if error.is_connect() {
            Self::Connect {
                url: url.to_string(),
                message: error.to_string(),
            }
        } else {
            Self::Unknown {
                url: url.to_string(),
                message: error.to_string(),
            }
        }
    }
}

/// Anything that can turn a URL into a document body.
#[async_trait]
pub trait Fetch: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<String, FetchError>;
}

/// Retry settings for transient failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Extra attempts after the first one
    pub max_retries: u32,
    /// Fixed pause between attempts
    pub delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            delay: Duration::from_secs(2),
        }
    }
}

impl From<&CrawlerConfig> for RetryPolicy {
    fn from(config: &CrawlerConfig) -> Self {
        Self {
            max_retries: config.max_retries,
            delay: Duration::from_secs(config.retry_delay_secs),
        }
    }
}

/// Run `attempt` until it succeeds, fails fatally, or retries run out.
pub async fn with_retry<F, Fut>(
    policy: &RetryPolicy,
    url: &str,
    mut attempt: F,
) -> Result<String, FetchError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<String, FetchError>>,
{
    let total = policy.max_retries + 1;
    let mut attempts = 0;

    loop {
        attempts += 1;
        let error = match attempt().await {
            Ok(body) => return Ok(body),
            Err(error) => error,
        };

        if !error.is_retryable() {
            match &error {
                FetchError::Unknown { .. } => {
                    log::error!("Request failed due to unknown error: {}", error)
                }
                _ => log::warn!("{} (attempt {}/{}), not retrying", error, attempts, total),
            }
            return Err(error);
        }

        log::warn!("{} (attempt {}/{})", error, attempts, total);
        if attempts >= total {
            log::error!("Max retries reached for {}", url);
            return Err(FetchError::RetriesExhausted {
                url: url.to_string(),
                attempts,
                last: Box::new(error),
            });
        }

        log::info!("Retrying in {:?}...", policy.delay);
        tokio::time::sleep(policy.delay).await;
    }
}

/// HTTP GET fetcher backed by `reqwest`.
pub struct HttpFetcher {
    client: Client,
    policy: RetryPolicy,
}

impl HttpFetcher {
    pub fn new(client: Client, policy: RetryPolicy) -> Self {
        Self { client, policy }
    }

    async fn get_once(&self, url: &str) -> Result<String, FetchError> {
        let classify = |e: reqwest::Error| FetchError::classify(url, &e);

        let response = self.client.get(url).send().await.map_err(classify)?;
        let response = response.error_for_status().map_err(classify)?;
        response.text().await.map_err(classify)
    }
}

#[async_trait]
impl Fetch for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<String, FetchError> {
        if let Err(e) = url::Url::parse(url) {
            let error = FetchError::InvalidUrl {
                url: url.to_string(),
                message: e.to_string(),
            };
            log::warn!("{}", error);
            return Err(error);
        }

        log::debug!("GET {}", url);
        with_retry(&self.policy, url, || self.get_once(url)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;
    use std::io::{BufRead, BufReader, Write};
    use std::net::TcpListener;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};

    use crate::utils::http::create_client;

    fn instant_policy(max_retries: u32) -> RetryPolicy {
        RetryPolicy {
            max_retries,
            delay: Duration::ZERO,
        }
    }

    /// Replays scripted outcomes and counts attempts.
    struct Script {
        outcomes: Mutex<VecDeque<Result<String, FetchError>>>,
        calls: Mutex<u32>,
    }

    impl Script {
        fn new(outcomes: Vec<Result<String, FetchError>>) -> Self {
            Self {
                outcomes: Mutex::new(outcomes.into()),
                calls: Mutex::new(0),
            }
        }

        async fn next(&self) -> Result<String, FetchError> {
            *self.calls.lock().unwrap() += 1;
            self.outcomes
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Ok("default".into()))
        }

        fn calls(&self) -> u32 {
            *self.calls.lock().unwrap()
        }
    }

    fn timeout() -> FetchError {
        FetchError::Timeout("u".into())
    }

    #[tokio::test]
    async fn test_transient_then_success() {
        let script = Script::new(vec![Err(timeout()), Err(timeout()), Ok("body".into())]);
        let result = with_retry(&instant_policy(3), "u", || script.next()).await;
        assert_eq!(result.unwrap(), "body");
        assert_eq!(script.calls(), 3);
    }

    #[tokio::test]
    async fn test_retries_exhausted() {
        let script = Script::new(vec![Err(timeout()); 10]);
        let result = with_retry(&instant_policy(3), "u", || script.next()).await;
        match result {
            Err(FetchError::RetriesExhausted { attempts, last, .. }) => {
                assert_eq!(attempts, 4);
                assert_eq!(*last, timeout());
            }
            other => panic!("unexpected: {other:?}"),
        }
        assert_eq!(script.calls(), 4);
    }

    #[tokio::test]
    async fn test_status_error_is_not_retried() {
        let script = Script::new(vec![Err(FetchError::Status {
            url: "u".into(),
            status: 404,
        })]);
        let result = with_retry(&instant_policy(3), "u", || script.next()).await;
        assert!(matches!(result, Err(FetchError::Status { status: 404, .. })));
        assert_eq!(script.calls(), 1);
    }

    #[tokio::test]
    async fn test_unknown_error_is_not_retried() {
        let script = Script::new(vec![Err(FetchError::Unknown {
            url: "u".into(),
            message: "decode".into(),
        })]);
        let result = with_retry(&instant_policy(3), "u", || script.next()).await;
        assert!(matches!(result, Err(FetchError::Unknown { .. })));
        assert_eq!(script.calls(), 1);
    }

    #[tokio::test]
    async fn test_malformed_url_fails_without_request() {
        let client = create_client(&CrawlerConfig::default()).unwrap();
        let fetcher = HttpFetcher::new(client, instant_policy(3));
        let result = fetcher.fetch("not a url").await;
        assert!(matches!(result, Err(FetchError::InvalidUrl { .. })));
    }

    /// Minimal HTTP/1.1 server on a loopback port. Every connection gets
    /// `response`; an empty response holds the connection open unanswered.
    fn serve(response: &'static str) -> (String, Arc<AtomicUsize>) {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        let hits = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&hits);

        std::thread::spawn(move || {
            let mut held = Vec::new();
            for stream in listener.incoming() {
                let Ok(mut stream) = stream else { break };
                counter.fetch_add(1, Ordering::SeqCst);

                let mut reader = BufReader::new(&stream);
                let mut line = String::new();
                while reader.read_line(&mut line).map(|n| n > 0).unwrap_or(false) {
                    if line == "\r\n" {
                        break;
                    }
                    line.clear();
                }

                if response.is_empty() {
                    held.push(stream);
                } else {
                    let _ = stream.write_all(response.as_bytes());
                }
            }
        });

        (format!("http://{addr}/fixture"), hits)
    }

    fn http_fetcher(timeout_secs: u64, max_retries: u32) -> HttpFetcher {
        let config = CrawlerConfig {
            timeout_secs,
            ..CrawlerConfig::default()
        };
        HttpFetcher::new(create_client(&config).unwrap(), instant_policy(max_retries))
    }

    #[tokio::test]
    async fn test_http_success() {
        let (url, hits) = serve(
            "HTTP/1.1 200 OK\r\nContent-Length: 5\r\nConnection: close\r\n\r\nhello",
        );
        let body = http_fetcher(5, 2).fetch(&url).await.unwrap();
        assert_eq!(body, "hello");
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_http_connection_refused_is_retried() {
        let url = {
            let listener = TcpListener::bind("127.0.0.1:0").unwrap();
            format!("http://{}/fixture", listener.local_addr().unwrap())
        };
        match http_fetcher(5, 2).fetch(&url).await {
            Err(FetchError::RetriesExhausted { attempts, last, .. }) => {
                assert_eq!(attempts, 3);
                assert!(matches!(*last, FetchError::Connect { .. }));
            }
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_http_silent_server_times_out_and_is_retried() {
        let (url, hits) = serve("");
        match http_fetcher(1, 1).fetch(&url).await {
            Err(FetchError::RetriesExhausted { attempts, last, .. }) => {
                assert_eq!(attempts, 2);
                assert!(matches!(*last, FetchError::Timeout(_)));
            }
            other => panic!("unexpected: {other:?}"),
        }
        assert_eq!(hits.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_http_redirect_loop_is_fatal() {
        let (url, _) = serve(
            "HTTP/1.1 302 Found\r\nLocation: /fixture\r\nContent-Length: 0\r\nConnection: close\r\n\r\n",
        );
        let result = http_fetcher(5, 3).fetch(&url).await;
        assert!(matches!(result, Err(FetchError::TooManyRedirects(_))), "{result:?}");
    }

    #[tokio::test]
    async fn test_http_server_error_is_not_retried() {
        let (url, hits) = serve(
            "HTTP/1.1 500 Internal Server Error\r\nContent-Length: 0\r\nConnection: close\r\n\r\n",
        );
        let result = http_fetcher(5, 3).fetch(&url).await;
        assert!(matches!(result, Err(FetchError::Status { status: 500, .. })), "{result:?}");
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_retryable_classes() {
        assert!(timeout().is_retryable());
        assert!(FetchError::Connect { url: "u".into(), message: "refused".into() }.is_retryable());
        assert!(!FetchError::TooManyRedirects("u".into()).is_retryable());
        assert!(!FetchError::Status { url: "u".into(), status: 500 }.is_retryable());
    }

    #[test]
    fn test_policy_from_config() {
        let policy = RetryPolicy::from(&CrawlerConfig::default());
        assert_eq!(policy, RetryPolicy::default());
    }
}
