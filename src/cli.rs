// src/cli.rs
// =============================================================================
// This file defines our command-line interface using the `clap` crate.
//
// Usage:
//   fanout-crawler <START_URL> <LIMIT> [OPTIONS]
//
// clap validates the numbers for us (a limit of 0 or "abc" is rejected with
// a usage message and a nonzero exit code), so the rest of the program only
// ever sees sensible values.
//
// Rust concepts:
// - Derive macros: #[derive(Parser)] generates the parsing code
// - Doc comments (///) on fields become the --help text
// =============================================================================

use clap::Parser;
use fanout_crawler::crawl::{CrawlConfig, LinkParser, DEFAULT_MAX_BODY_BYTES, DEFAULT_WORKERS};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "fanout-crawler",
    version,
    about = "Crawl the web from a starting URL with a fixed pool of workers",
    long_about = "fanout-crawler starts at one URL, fetches it, follows every <a href=\"...\"> link it \
                  finds, and keeps going with a fixed number of parallel workers until LIMIT pages \
                  have been fetched or there is nothing left to fetch. Every attempt is logged to \
                  the log file as 'Fetched URL: ...' or 'Error fetching ...: reason'."
)]
pub struct Cli {
    /// URL to start crawling from (http or https)
    pub start_url: String,

    /// Maximum number of pages to fetch (a positive integer)
    #[arg(value_parser = clap::value_parser!(u64).range(1..))]
    pub limit: u64,

    /// Number of parallel workers
    #[arg(long, default_value_t = DEFAULT_WORKERS, value_parser = parse_workers)]
    pub workers: usize,

    /// File that receives one line per fetch attempt
    #[arg(long, default_value = "log.txt")]
    pub log_file: PathBuf,

    /// How links are found in fetched pages
    #[arg(long, value_enum, default_value_t = LinkParser::Marker)]
    pub parser: LinkParser,

    /// Keep enqueueing discovered links even after the limit is reached
    #[arg(long)]
    pub no_enqueue_gate: bool,

    /// Per-request timeout in seconds
    #[arg(long, default_value_t = 10)]
    pub timeout: u64,

    /// Response bodies are cut off after this many bytes
    #[arg(long, default_value_t = DEFAULT_MAX_BODY_BYTES)]
    pub max_body_bytes: usize,

    /// Save every fetched page into this directory as page-NNNNNN.html
    #[arg(long)]
    pub save_dir: Option<PathBuf>,

    /// Print the final report as JSON instead of a table
    #[arg(long)]
    pub json: bool,

    /// Show debug-level diagnostics (RUST_LOG overrides this)
    #[arg(short, long)]
    pub verbose: bool,
}

impl Cli {
    // Turns the parsed arguments into the crawl engine's settings
    pub fn crawl_config(&self) -> CrawlConfig {
        CrawlConfig {
            workers: self.workers,
            limit: self.limit,
            parser: self.parser,
            gate_enqueue: !self.no_enqueue_gate,
        }
    }
}

// Worker count must be a whole number of at least 1
fn parse_workers(value: &str) -> Result<usize, String> {
    match value.parse::<usize>() {
        Ok(0) => Err("must be at least 1".to_string()),
        Ok(n) => Ok(n),
        Err(e) => Err(e.to_string()),
    }
}
