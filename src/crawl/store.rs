// src/crawl/store.rs
// =============================================================================
// Saves fetched pages to disk.
//
// PageStore wraps another Fetcher. Every successful fetch is written to
// `<dir>/page-NNNNNN.html`, where NNNNNN comes from a counter that only goes
// up, so file names never collide between workers. If the write fails, the
// fetch counts as failed for that one URL and the crawl moves on.
// =============================================================================

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use super::fetch::{FetchError, Fetcher};

pub struct PageStore {
    inner: Arc<dyn Fetcher>,
    dir: PathBuf,
    next_page: AtomicU64,
}

impl PageStore {
    // Wraps `inner`, creating `dir` if it doesn't exist yet
    pub fn new(inner: Arc<dyn Fetcher>, dir: impl Into<PathBuf>) -> std::io::Result<Self> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir)?;
        Ok(Self {
            inner,
            dir,
            next_page: AtomicU64::new(1),
        })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    // Page numbers handed out so far (one per successful fetch)
    pub fn saved(&self) -> u64 {
        self.next_page.load(Ordering::SeqCst) - 1
    }

    fn page_path(&self, number: u64) -> PathBuf {
        self.dir.join(format!("page-{:06}.html", number))
    }
}

#[async_trait]
impl Fetcher for PageStore {
    async fn fetch(&self, url: &str) -> Result<String, FetchError> {
        let body = self.inner.fetch(url).await?;

        let path = self.page_path(self.next_page.fetch_add(1, Ordering::SeqCst));
        if let Err(source) = tokio::fs::write(&path, body.as_bytes()).await {
            return Err(FetchError::Storage { path, source });
        }
        tracing::debug!(url, path = %path.display(), "saved page");

        Ok(body)
    }
}
