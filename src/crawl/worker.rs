// src/crawl/worker.rs
// =============================================================================
// One worker's loop.
//
//   claim a URL ──> admit ──> fetch ──> extract links ──> enqueue ──┐
//        ^                      │                                   │
//        │                      └── failed: log it, skip the URL ───┤
//        └──────────────────────────────────────────────────────────┘
//
// The loop ends when:
// - claim() says the crawl is over (queue drained or closed), or
// - the fetch budget is spent. The worker then closes the queue so that
//   idle peers stop waiting, and exits. The URL it was holding is discarded.
//
// A failed fetch is never retried and never fatal: it is logged and the
// worker moves on to the next URL.
// =============================================================================

use serde::Serialize;
use std::ops::AddAssign;
use std::sync::Arc;
use tracing::{debug, info, warn};

use super::counter::SharedCounter;
use super::extract::LinkParser;
use super::fetch::Fetcher;
use super::queue::UrlQueue;
use super::sink::{EventSink, FetchEvent};

// What one worker did, summed into the crawl report
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct WorkerStats {
    /// Successful fetches
    pub fetched: u64,
    /// Failed fetches
    pub failed: u64,
    /// Links found in fetched pages
    pub discovered: u64,
    /// Links pushed onto the queue
    pub enqueued: u64,
    /// Links not enqueued because the budget was already spent
    pub dropped: u64,
    /// URLs taken from the queue but refused admission
    pub discarded: u64,
}

impl AddAssign for WorkerStats {
    fn add_assign(&mut self, other: Self) {
        self.fetched += other.fetched;
        self.failed += other.failed;
        self.discovered += other.discovered;
        self.enqueued += other.enqueued;
        self.dropped += other.dropped;
        self.discarded += other.discarded;
    }
}

pub(crate) struct Worker {
    pub(crate) id: usize,
    pub(crate) queue: Arc<UrlQueue>,
    pub(crate) counter: Arc<SharedCounter>,
    pub(crate) fetcher: Arc<dyn Fetcher>,
    pub(crate) sink: Arc<dyn EventSink>,
    pub(crate) parser: LinkParser,
    pub(crate) gate_enqueue: bool,
}

impl Worker {
    pub(crate) async fn run(self) -> WorkerStats {
        let mut stats = WorkerStats::default();

        // The claim is dropped at the end of each iteration, after its links
        // are in the queue
        while let Some(claim) = self.queue.claim().await {
            let url = claim.url();

            if !self.counter.try_admit() {
                debug!(worker = self.id, url, "fetch limit reached, stopping");
                stats.discarded += 1;
                self.queue.close();
                break;
            }

            match self.fetcher.fetch(url).await {
                Ok(content) => {
                    info!(worker = self.id, url, "Fetched URL");
                    self.sink.record(&FetchEvent::Fetched {
                        url: url.to_string(),
                    });
                    stats.fetched += 1;
                    self.enqueue_links(&content, &mut stats);
                }
                Err(e) => {
                    warn!(worker = self.id, url, error = %e, "Error fetching");
                    self.sink.record(&FetchEvent::Failed {
                        url: url.to_string(),
                        reason: e.to_string(),
                    });
                    stats.failed += 1;
                }
            }
        }

        debug!(worker = self.id, ?stats, "worker finished");
        stats
    }

    // Scans fetched content and pushes every link onto the queue
    //
    // With the enqueue gate on, links found after the budget ran out are
    // dropped here instead of being queued only to be refused later.
    fn enqueue_links(&self, content: &str, stats: &mut WorkerStats) {
        for link in self.parser.links(content) {
            stats.discovered += 1;

            if self.gate_enqueue && !self.counter.has_capacity() {
                stats.dropped += 1;
                continue;
            }

            self.queue.enqueue(&link);
            stats.enqueued += 1;
        }
    }
}
