use reqwest::header::{ACCEPT, ACCEPT_LANGUAGE, HeaderMap, HeaderValue, USER_AGENT};
use std::error::Error;
use std::fmt;
use std::future::Future;
use std::time::Duration;

use crate::config::HarvestConfig;

/// Failure while retrieving one page
#[derive(Debug, Clone)]
pub enum FetchError {
    /// The start URL is not a syntactically valid absolute URL
    InvalidUrl(String),
    /// The request exceeded the configured timeout
    Timeout(String),
    /// Connection-level failure
    Transport(String),
    /// The remote answered with a non-success status
    Status(u16, String),
}

impl fmt::Display for FetchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FetchError::InvalidUrl(url) => write!(f, "invalid URL: {}", url),
            FetchError::Timeout(url) => write!(f, "request timed out: {}", url),
            FetchError::Transport(message) => write!(f, "transport error: {}", message),
            FetchError::Status(code, url) => {
                write!(f, "request failed with status {}: {}", code, url)
            }
        }
    }
}

impl Error for FetchError {}

/// Retrieves the raw markup of one page.
///
/// The trait is the injection seam for the harvest loop: production code
/// uses [`HttpFetcher`], tests substitute an in-memory double.
pub trait Fetch {
    fn fetch(&self, url: &str) -> impl Future<Output = Result<String, FetchError>> + Send;
}

/// HTTP fetcher with a fixed browser-like header profile.
///
/// One request per page, no cookies, no retries; a failed fetch is reported
/// to the harvest loop, which owns the failure policy.
pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    /// Builds the underlying client once, with timeout and default headers
    pub fn new(config: &HarvestConfig) -> Result<Self, Box<dyn Error>> {
        let mut headers = HeaderMap::new();
        headers.insert(USER_AGENT, HeaderValue::from_str(&config.user_agent)?);
        headers.insert(ACCEPT, HeaderValue::from_str(&config.accept)?);
        headers.insert(
            ACCEPT_LANGUAGE,
            HeaderValue::from_str(&config.accept_language)?,
        );

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .default_headers(headers)
            .build()?;

        Ok(Self { client })
    }
}

impl Fetch for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<String, FetchError> {
        ::log::debug!("GET {}", url);

        let response = self.client.get(url).send().await.map_err(|e| {
            if e.is_timeout() {
                FetchError::Timeout(url.to_string())
            } else {
                FetchError::Transport(e.to_string())
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status(status.as_u16(), url.to_string()));
        }

        // The site declares its charset inconsistently; the body is UTF-8
        // in practice, so decode it as such regardless of the header.
        let body = response
            .bytes()
            .await
            .map_err(|e| FetchError::Transport(e.to_string()))?;

        Ok(String::from_utf8_lossy(&body).into_owned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let error = FetchError::Status(503, "https://example.com/".to_string());
        assert_eq!(
            error.to_string(),
            "request failed with status 503: https://example.com/"
        );

        let error = FetchError::Timeout("https://example.com/".to_string());
        assert!(error.to_string().contains("timed out"));
    }

    #[test]
    fn test_fetcher_builds_from_default_config() {
        assert!(HttpFetcher::new(&HarvestConfig::default()).is_ok());
    }
}
