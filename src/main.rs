// src/main.rs
// =============================================================================
// This is the entry point of our CLI application.
//
// What happens here:
// 1. Parse command-line arguments using clap
// 2. Set up diagnostics (tracing) on stderr
// 3. Check the start URL and open the log file (fail fast if we can't)
// 4. Build the HTTP fetcher (optionally saving pages to disk)
// 5. Run the worker pool and print the report
// 6. Exit with proper code (0 = crawl finished, 1 = setup error,
//    2 = bad arguments, which clap handles itself)
// =============================================================================

mod cli;

use anyhow::{bail, Context, Result};
use clap::Parser;
use cli::Cli;
use fanout_crawler::crawl::{CrawlReport, Fetcher, FileSink, HttpFetcher, PageStore, WorkerPool};
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;
use url::Url;

#[tokio::main]
async fn main() {
    let exit_code = match run().await {
        Ok(()) => 0,
        Err(e) => {
            // {:#} prints the whole context chain on one line
            eprintln!("Error: {:#}", e);
            1
        }
    };

    std::process::exit(exit_code);
}

async fn run() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    check_start_url(&cli.start_url)?;

    println!("Starting URL: {} with limit {}", cli.start_url, cli.limit);

    // Everything the crawl needs is acquired before any worker starts
    let sink = FileSink::create(&cli.log_file)
        .with_context(|| format!("Failed to open log file {}", cli.log_file.display()))?;

    let http = HttpFetcher::new(Duration::from_secs(cli.timeout), cli.max_body_bytes)
        .context("Failed to create HTTP client")?;

    let fetcher: Arc<dyn Fetcher> = match &cli.save_dir {
        Some(dir) => Arc::new(
            PageStore::new(Arc::new(http), dir)
                .with_context(|| format!("Failed to create save directory {}", dir.display()))?,
        ),
        None => Arc::new(http),
    };

    let pool = WorkerPool::new(cli.crawl_config(), fetcher, Arc::new(sink));
    let report = pool.run(&cli.start_url).await;

    print_report(&report, cli.json)
}

// Sends tracing output to stderr so stdout stays clean for --json
fn init_tracing(verbose: bool) {
    let default_level = if verbose {
        "fanout_crawler=debug"
    } else {
        "fanout_crawler=info"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

// The start URL must be an absolute http(s) URL
//
// Links found later are NOT checked like this; they go to the fetcher as-is
fn check_start_url(start_url: &str) -> Result<()> {
    let url = Url::parse(start_url).with_context(|| format!("Invalid URL '{}'", start_url))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        bail!("Unsupported URL scheme '{}' in {}", url.scheme(), start_url);
    }

    Ok(())
}

// Prints the report either as a table or JSON
fn print_report(report: &CrawlReport, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(report)?);
        return Ok(());
    }

    println!();
    println!("📊 Summary:");
    println!("   ✅ Fetched: {}", report.stats.fetched);
    println!("   ❌ Failed: {}", report.stats.failed);
    println!("   🔗 Links found: {}", report.stats.discovered);
    println!("   📥 Links queued: {}", report.stats.enqueued);
    println!("   🚫 Links dropped (limit reached): {}", report.stats.dropped);
    println!("   ⏳ Left in queue: {}", report.pending);
    println!(
        "   📋 Admitted: {}/{} with {} worker(s) in {} ms",
        report.admitted, report.limit, report.workers, report.elapsed_ms
    );

    Ok(())
}
