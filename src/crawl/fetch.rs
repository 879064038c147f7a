// src/crawl/fetch.rs
// =============================================================================
// This module fetches pages.
//
// The worker pool doesn't care HOW a page is fetched. It only needs
// "give me the body of this URL, or tell me why you couldn't". That contract
// is the Fetcher trait, so tests can plug in fake fetchers and the CLI can
// wrap the HTTP fetcher (e.g. to save pages to disk, see store.rs).
//
// HttpFetcher is the real implementation:
// - One reqwest Client, shared by every worker (connection pooling)
// - Per-request timeout
// - Non-2xx responses are failures ("HTTP 404 Not Found")
// - Bodies are read chunk by chunk and cut off at max_body_bytes
//
// Rust concepts:
// - Traits: Describe behaviour that different types can share
// - async-trait: Lets a trait have async methods and still be used as
//   Arc<dyn Fetcher>
// - thiserror: Derives Display/Error for our error enum
// =============================================================================

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

// Bodies larger than this are truncated (100 KiB)
pub const DEFAULT_MAX_BODY_BYTES: usize = 100 * 1024;

const USER_AGENT: &str = concat!("fanout-crawler/", env!("CARGO_PKG_VERSION"));

// Why a fetch failed
//
// The Display text is what ends up in "Error fetching <url>: <reason>"
#[derive(Debug, Error)]
pub enum FetchError {
    /// Network or protocol failure (DNS, connect, timeout, bad URL, ...)
    #[error("{0}")]
    Transport(#[from] reqwest::Error),

    /// The server answered, but not with a 2xx status
    #[error("HTTP {0}")]
    Status(StatusCode),

    /// The page was fetched but could not be saved
    #[error("could not save page to {}: {}", .path.display(), .source)]
    Storage {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Any other reason, described in plain text
    #[error("{0}")]
    Other(String),
}

// Anything that can turn a URL into page content
#[async_trait]
pub trait Fetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<String, FetchError>;
}

// Fetches pages over HTTP with reqwest
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
    max_body_bytes: usize,
}

impl HttpFetcher {
    // Builds a fetcher with the given timeout and body size cap
    pub fn new(timeout: Duration, max_body_bytes: usize) -> Result<Self, FetchError> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()?;

        Ok(Self {
            client,
            max_body_bytes,
        })
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<String, FetchError> {
        let mut response = self.client.get(url).send().await?;

        if !response.status().is_success() {
            return Err(FetchError::Status(response.status()));
        }

        // Read at most max_body_bytes; whatever comes after is ignored
        let mut body: Vec<u8> = Vec::new();
        while let Some(chunk) = response.chunk().await? {
            let room = self.max_body_bytes - body.len();
            if chunk.len() >= room {
                body.extend_from_slice(&chunk[..room]);
                break;
            }
            body.extend_from_slice(&chunk);
        }

        // A cut-off body can end in the middle of a UTF-8 character,
        // so decode lossily instead of failing
        Ok(String::from_utf8_lossy(&body).into_owned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_error_reason() {
        let err = FetchError::Status(StatusCode::NOT_FOUND);
        assert_eq!(err.to_string(), "HTTP 404 Not Found");
    }

    #[test]
    fn test_storage_error_reason() {
        let err = FetchError::Storage {
            path: PathBuf::from("/tmp/pages/page-000001.html"),
            source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        };
        assert_eq!(
            err.to_string(),
            "could not save page to /tmp/pages/page-000001.html: denied"
        );
    }

    #[tokio::test]
    async fn test_invalid_url_is_a_transport_error() {
        let fetcher = HttpFetcher::new(Duration::from_secs(1), DEFAULT_MAX_BODY_BYTES).unwrap();
        let err = fetcher.fetch("not a url").await.unwrap_err();
        assert!(matches!(err, FetchError::Transport(_)));
    }
}
