// src/crawl/pool.rs
// =============================================================================
// The worker pool: runs one whole crawl.
//
// How it works:
// 1. Create the shared queue and the shared fetch budget
// 2. Put the seed URL in the queue (before any worker starts)
// 3. Spawn a fixed number of workers as tokio tasks
// 4. Wait for every worker to finish
// 5. Sum up what the workers did into a CrawlReport
//
// The shared state only lives for the duration of run(), so a pool can be
// run again with another seed and starts from a fresh budget each time.
//
// Rust concepts:
// - Arc: Shared ownership of the queue/budget across worker tasks
// - tokio::spawn: Runs each worker on the multi-threaded runtime
// - join_all: Waits for a whole batch of futures
// =============================================================================

use futures::future::join_all;
use serde::Serialize;
use std::sync::Arc;
use std::time::Instant;
use tracing::{error, info};

use super::counter::SharedCounter;
use super::extract::LinkParser;
use super::fetch::Fetcher;
use super::queue::UrlQueue;
use super::sink::EventSink;
use super::worker::{Worker, WorkerStats};

pub const DEFAULT_WORKERS: usize = 4;

// Settings for one crawl
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrawlConfig {
    /// Number of workers (at least 1 is always used)
    pub workers: usize,
    /// Maximum number of fetches
    pub limit: u64,
    /// How links are found in page content
    pub parser: LinkParser,
    /// Skip enqueueing links once the budget is spent
    pub gate_enqueue: bool,
}

impl Default for CrawlConfig {
    fn default() -> Self {
        Self {
            workers: DEFAULT_WORKERS,
            limit: 100,
            parser: LinkParser::Marker,
            gate_enqueue: true,
        }
    }
}

// Summary of a finished crawl
#[derive(Debug, Clone, Serialize)]
pub struct CrawlReport {
    pub start_url: String,
    pub limit: u64,
    pub workers: usize,
    /// Fetch attempts admitted by the budget (fetched + failed)
    pub admitted: u64,
    #[serde(flatten)]
    pub stats: WorkerStats,
    /// URLs still in the queue when the crawl ended
    pub pending: usize,
    pub elapsed_ms: u64,
}

impl CrawlReport {
    // True if at least one fetch attempt failed
    pub fn has_failures(&self) -> bool {
        self.stats.failed > 0
    }
}

pub struct WorkerPool {
    config: CrawlConfig,
    fetcher: Arc<dyn Fetcher>,
    sink: Arc<dyn EventSink>,
}

impl WorkerPool {
    pub fn new(config: CrawlConfig, fetcher: Arc<dyn Fetcher>, sink: Arc<dyn EventSink>) -> Self {
        Self {
            config,
            fetcher,
            sink,
        }
    }

    // Crawls from `seed` and returns once every worker has exited
    pub async fn run(&self, seed: &str) -> CrawlReport {
        let started = Instant::now();
        let workers = self.config.workers.max(1);

        let queue = Arc::new(UrlQueue::new());
        let counter = Arc::new(SharedCounter::new(self.config.limit));
        queue.enqueue(seed);

        info!(seed, limit = self.config.limit, workers, "starting crawl");

        let handles: Vec<_> = (0..workers)
            .map(|id| {
                let worker = Worker {
                    id,
                    queue: Arc::clone(&queue),
                    counter: Arc::clone(&counter),
                    fetcher: Arc::clone(&self.fetcher),
                    sink: Arc::clone(&self.sink),
                    parser: self.config.parser,
                    gate_enqueue: self.config.gate_enqueue,
                };
                tokio::spawn(worker.run())
            })
            .collect();

        let mut stats = WorkerStats::default();
        for (id, result) in join_all(handles).await.into_iter().enumerate() {
            match result {
                Ok(worker_stats) => stats += worker_stats,
                // A panicking worker loses its own tallies but not the crawl
                Err(e) => error!(worker = id, error = %e, "worker task failed"),
            }
        }

        let report = CrawlReport {
            start_url: seed.to_string(),
            limit: self.config.limit,
            workers,
            admitted: counter.count(),
            stats,
            pending: queue.len(),
            elapsed_ms: started.elapsed().as_millis() as u64,
        };

        info!(
            admitted = report.admitted,
            fetched = report.stats.fetched,
            failed = report.stats.failed,
            pending = report.pending,
            "crawl finished"
        );

        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crawl::fetch::FetchError;
    use crate::crawl::sink::MemorySink;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    // A fetcher whose answers come from a plain function
    struct FnFetcher<F>(F);

    #[async_trait]
    impl<F> Fetcher for FnFetcher<F>
    where
        F: Fn(&str) -> Result<String, FetchError> + Send + Sync,
    {
        async fn fetch(&self, url: &str) -> Result<String, FetchError> {
            (self.0)(url)
        }
    }

    fn pool<F>(config: CrawlConfig, fetch: F) -> (WorkerPool, Arc<MemorySink>)
    where
        F: Fn(&str) -> Result<String, FetchError> + Send + Sync + 'static,
    {
        let sink = Arc::new(MemorySink::new());
        let pool = WorkerPool::new(
            config,
            Arc::new(FnFetcher(fetch)),
            Arc::clone(&sink) as Arc<dyn EventSink>,
        );
        (pool, sink)
    }

    fn two_links(_: &str) -> Result<String, FetchError> {
        Ok(r#"<a href="http://u1">1</a><a href="http://u2">2</a>"#.to_string())
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_limit_one_with_gate_drops_discovered_links() {
        let config = CrawlConfig {
            limit: 1,
            ..Default::default()
        };
        let (pool, sink) = pool(config, two_links);

        let report = pool.run("http://u0").await;

        assert_eq!(report.admitted, 1);
        assert_eq!(report.stats.fetched, 1);
        assert_eq!(report.stats.discovered, 2);
        assert_eq!(report.stats.dropped, 2);
        assert_eq!(report.stats.enqueued, 0);
        assert_eq!(report.pending, 0);
        assert_eq!(sink.lines(), vec!["Fetched URL: http://u0"]);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_limit_one_without_gate_keeps_discovered_links() {
        let config = CrawlConfig {
            limit: 1,
            workers: 1,
            gate_enqueue: false,
            ..Default::default()
        };
        let (pool, sink) = pool(config, two_links);

        let report = pool.run("http://u0").await;

        assert_eq!(report.admitted, 1);
        assert_eq!(report.stats.fetched, 1);
        assert_eq!(report.stats.enqueued, 2);
        // The worker takes u1, is refused admission and stops; u2 stays queued
        assert_eq!(report.stats.discarded, 1);
        assert_eq!(report.pending, 1);
        assert_eq!(sink.lines(), vec!["Fetched URL: http://u0"]);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_limit_one_without_gate_many_workers_fetches_once() {
        let config = CrawlConfig {
            limit: 1,
            gate_enqueue: false,
            ..Default::default()
        };
        let (pool, sink) = pool(config, two_links);

        let report = pool.run("http://u0").await;

        assert_eq!(report.admitted, 1);
        assert_eq!(sink.lines().len(), 1);
        assert_eq!(report.pending + report.stats.discarded as usize, 2);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_always_failing_fetcher() {
        let (pool, sink) = pool(CrawlConfig::default(), |_| {
            Err(FetchError::Other("Couldn't resolve host name".to_string()))
        });

        let report = pool.run("http://nowhere").await;

        assert_eq!(report.admitted, 1);
        assert_eq!(report.stats.failed, 1);
        assert_eq!(report.stats.enqueued, 0);
        assert_eq!(report.pending, 0);
        assert!(report.has_failures());
        assert_eq!(
            sink.lines(),
            vec!["Error fetching http://nowhere: Couldn't resolve host name"]
        );
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_one_failure_line_per_failing_link() {
        let (pool, sink) = pool(CrawlConfig::default(), |url| match url {
            "http://seed" => Ok(r#"<a href="http://x"><a href="http://y"><a href="http://z">"#.to_string()),
            _ => Err(FetchError::Other("timed out".to_string())),
        });

        let report = pool.run("http://seed").await;

        assert_eq!(report.stats.fetched, 1);
        assert_eq!(report.stats.failed, 3);
        assert_eq!(report.stats.enqueued, 3);
        assert_eq!(report.pending, 0);

        let mut failures: Vec<_> = sink
            .events()
            .into_iter()
            .filter(|e| !e.is_success())
            .map(|e| e.to_string())
            .collect();
        failures.sort();
        assert_eq!(
            failures,
            vec![
                "Error fetching http://x: timed out",
                "Error fetching http://y: timed out",
                "Error fetching http://z: timed out",
            ]
        );
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_endless_links_stop_at_limit() {
        for gate_enqueue in [true, false] {
            let config = CrawlConfig {
                limit: 25,
                workers: 4,
                gate_enqueue,
                ..Default::default()
            };
            let (pool, sink) = pool(config, |_| {
                Ok(r#"<a href="http://loop/a"></a><a href="http://loop/b"></a>"#.to_string())
            });

            let report = tokio::time::timeout(Duration::from_secs(10), pool.run("http://loop"))
                .await
                .expect("crawl should terminate");

            assert_eq!(report.admitted, 25);
            assert_eq!(report.stats.fetched, 25);
            assert_eq!(sink.lines().len(), 25);
        }
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_workers_wait_for_links_from_slow_pages() {
        struct SlowSeed {
            active: AtomicUsize,
            peak: AtomicUsize,
        }

        #[async_trait]
        impl Fetcher for SlowSeed {
            async fn fetch(&self, url: &str) -> Result<String, FetchError> {
                let now = self.active.fetch_add(1, Ordering::SeqCst) + 1;
                self.peak.fetch_max(now, Ordering::SeqCst);
                tokio::time::sleep(Duration::from_millis(100)).await;
                self.active.fetch_sub(1, Ordering::SeqCst);

                if url == "http://seed" {
                    Ok(r#"<a href="http://1"><a href="http://2"><a href="http://3">"#.to_string())
                } else {
                    Ok(String::new())
                }
            }
        }

        let fetcher = Arc::new(SlowSeed {
            active: AtomicUsize::new(0),
            peak: AtomicUsize::new(0),
        });
        let sink = Arc::new(MemorySink::new());
        let pool = WorkerPool::new(
            CrawlConfig::default(),
            Arc::clone(&fetcher) as Arc<dyn Fetcher>,
            Arc::clone(&sink) as Arc<dyn EventSink>,
        );

        let report = pool.run("http://seed").await;

        assert_eq!(report.stats.fetched, 4);
        assert_eq!(report.pending, 0);
        // The idle workers were still around to pick up the three links
        assert!(fetcher.peak.load(Ordering::SeqCst) >= 2);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_panicking_worker_does_not_stop_the_crawl() {
        let config = CrawlConfig {
            workers: 2,
            ..Default::default()
        };
        let (pool, sink) = pool(config, |url| match url {
            "http://seed" => Ok(r#"<a href="http://boom"><a href="http://fine">"#.to_string()),
            "http://boom" => panic!("fetcher bug"),
            _ => Ok(String::new()),
        });

        let report = pool.run("http://seed").await;

        assert_eq!(report.admitted, 3);
        assert!(sink.lines().contains(&"Fetched URL: http://fine".to_string()));
        assert_eq!(report.pending, 0);
    }

    #[tokio::test]
    async fn test_zero_workers_still_runs_one() {
        let config = CrawlConfig {
            workers: 0,
            ..Default::default()
        };
        let (pool, _sink) = pool(config, |_| Ok(String::new()));

        let report = pool.run("http://solo").await;

        assert_eq!(report.workers, 1);
        assert_eq!(report.stats.fetched, 1);
    }

    #[tokio::test]
    async fn test_report_serializes_flat() {
        let (pool, _sink) = pool(CrawlConfig::default(), |_| Ok(String::new()));
        let report = pool.run("http://solo").await;

        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["start_url"], "http://solo");
        assert_eq!(json["fetched"], 1);
        assert_eq!(json["limit"], 100);
    }
}
