// src/crawl/mod.rs
// =============================================================================
// This module is the crawl engine.
//
// A fixed pool of workers pulls URLs from one shared queue, spends one unit
// of a shared fetch budget per URL, fetches the page, scans it for links and
// pushes those links back onto the queue. The crawl ends when the budget is
// spent or when the queue is empty and nobody is still working on a page.
//
// Submodules (leaves first):
// - counter: the shared fetch budget (how many fetches are still allowed)
// - queue:   the shared FIFO of pending URLs, with claim/release tracking
// - extract: link extraction from page content
// - fetch:   the Fetcher trait and the HTTP implementation
// - store:   a Fetcher wrapper that saves page bodies to disk
// - sink:    where "Fetched URL: ..." / "Error fetching ..." lines go
// - worker:  one worker's dequeue -> admit -> fetch -> extract loop
// - pool:    spawns the workers, joins them, builds the report
// =============================================================================

mod counter;
mod extract;
mod fetch;
mod pool;
mod queue;
mod sink;
mod store;
mod worker;

pub use counter::SharedCounter;
pub use extract::{extract_links, HtmlLinks, LinkParser, MarkerLinks, HREF_MARKER};
pub use fetch::{FetchError, Fetcher, HttpFetcher, DEFAULT_MAX_BODY_BYTES};
pub use pool::{CrawlConfig, CrawlReport, WorkerPool, DEFAULT_WORKERS};
pub use queue::{Claim, UrlQueue};
pub use sink::{EventSink, FetchEvent, FileSink, MemorySink};
pub use store::PageStore;
pub use worker::WorkerStats;
