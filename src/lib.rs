// src/lib.rs
// =============================================================================
// Library root for fanout-crawler.
//
// The crawl engine lives here so that both the CLI (src/main.rs) and the
// integration tests (tests/) can use it. The binary only parses arguments,
// sets up logging, and prints the final report.
//
// Layout:
// - crawl: the worker pool, the shared queue, the fetch budget, link
//   extraction, fetchers and event sinks
// =============================================================================

pub mod crawl;

// Re-export the types most callers need so they can write
// `fanout_crawler::WorkerPool` instead of `fanout_crawler::crawl::WorkerPool`
pub use crawl::{
    CrawlConfig, CrawlReport, EventSink, FetchError, FetchEvent, Fetcher, FileSink, HttpFetcher,
    LinkParser, MemorySink, PageStore, SharedCounter, UrlQueue, WorkerPool,
};
