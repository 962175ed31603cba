//! # News Sweep
//!
//! Collects news search results newest first until they age past a cutoff,
//! then classifies each result for search-phrase mentions and money amounts.
//!
//! ## Usage
//!
//! ```sh
//! news_sweep --search-phrase "climate" --num-months 2
//! ```
//!
//! ## Architecture
//!
//! 1. **Collecting**: page through the search feed until the oldest visible
//!    result is older than `now - 30 * num_months` days
//! 2. **Classifying**: count phrase occurrences, flag money mentions, clean
//!    descriptions, drop untitled or too-old results
//! 3. **Images**: download thumbnails for the surviving rows
//! 4. **Output**: write the spreadsheet and a JSON report

use clap::Parser;
use std::error::Error;
use std::time::Duration as StdDuration;
use tracing::{debug, error, info, instrument};
use tracing_subscriber::{EnvFilter, fmt as tfmt};

use news_sweep::classifier::ArticleClassifier;
use news_sweep::cli::Cli;
use news_sweep::collector::PaginatedCollector;
use news_sweep::config::{ScrapeConfig, load_config, load_work_item, resolve_inputs};
use news_sweep::dates::{DateParser, cutoff_for_months};
use news_sweep::events::TracingEvents;
use news_sweep::fetch::{HttpFetcher, RetryFetch};
use news_sweep::models::Report;
use news_sweep::outputs::{images, json, spreadsheet};
use news_sweep::scrapers::aljazeera::SearchFeed;
use news_sweep::utils::ensure_writable_dir;

#[tokio::main]
#[instrument]
async fn main() -> Result<(), Box<dyn Error>> {
    // --- Tracing init ---
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tfmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .init();

    let start_time = std::time::Instant::now();
    info!("news_sweep starting up");

    // Parse CLI
    let args = Cli::parse();
    debug!(?args, "Parsed CLI arguments");

    // ---- Load config & inputs ----
    let config = match &args.config {
        Some(path) => load_config(path)?,
        None => ScrapeConfig::default(),
    }
    .with_overrides(&args);

    let work_item = args.work_item.as_deref().map(load_work_item).transpose()?;
    let inputs = resolve_inputs(&args, work_item)?;
    info!(
        search_phrase = %inputs.search_phrase,
        num_months = inputs.num_months,
        "Resolved search inputs"
    );

    // Every relative date and the cutoff are computed against this instant.
    let dates = DateParser::at_local_now();
    let cutoff = cutoff_for_months(dates.now(), inputs.num_months);
    info!(%cutoff, "Computed cutoff");

    // Early check: ensure output dirs are writable before scraping
    let image_dir = config.image_dir();
    for dir in [config.output_dir.as_str(), image_dir.as_str()] {
        if let Err(e) = ensure_writable_dir(dir).await {
            error!(
                path = %dir,
                error = %e,
                "Output directory is not writable (fix perms or choose a different path)"
            );
            return Err(e);
        }
    }

    // ---- Collect ----
    let http = HttpFetcher::new(StdDuration::from_secs(config.request_timeout_secs))?;
    let client = http.client().clone();
    let fetcher = RetryFetch::new(http, config.max_retries, StdDuration::from_secs(1));
    let mut feed = SearchFeed::new(fetcher, &config.base_url, &inputs.search_phrase)?;

    let events = TracingEvents;
    let collection = PaginatedCollector::new(dates, &events)
        .with_max_pages(config.max_pages)
        .collect(&mut feed, cutoff)
        .await;
    info!(
        records = collection.records.len(),
        pages_loaded = collection.pages_loaded,
        stop = collection.stop.as_str(),
        "Collection finished"
    );

    // ---- Classify ----
    let classifier = ArticleClassifier::new(dates, &inputs.search_phrase);
    let rows = classifier.classify_reporting(&collection.records, cutoff, &events);

    // ---- Images ----
    let rows =
        images::download_images(&client, &rows, &image_dir, config.download_concurrency).await?;

    // ---- Outputs ----
    spreadsheet::write_spreadsheet(&rows, &config.output_dir).await?;

    let report = Report {
        search_phrase: inputs.search_phrase.clone(),
        cutoff,
        generated_at: dates.now(),
        stop_reason: collection.stop.as_str().to_string(),
        pages_loaded: collection.pages_loaded,
        rows,
    };
    if let Err(e) = json::write_report(&report, &config.output_dir).await {
        error!(error = %e, "Failed to write JSON report");
    }

    let elapsed = start_time.elapsed();
    info!(
        ?elapsed,
        secs = elapsed.as_secs(),
        millis = elapsed.subsec_millis(),
        rows = report.rows.len(),
        "Execution complete"
    );

    Ok(())
}
