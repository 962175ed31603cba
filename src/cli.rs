//! Command-line interface definitions.
//!
//! Search inputs can come from flags, environment variables, or a work-item
//! file; tuning knobs come from an optional YAML config that flags override.

use clap::Parser;

/// Command-line arguments for a harvesting run.
///
/// # Examples
///
/// ```sh
/// # Search the last two months for "climate"
/// news_sweep -s climate -n 2
///
/// # Take inputs from a work item and write somewhere else
/// news_sweep -w work_item.json -o /tmp/news
///
/// # Tune pagination and timeouts from a config file
/// news_sweep -s oil -n 1 -c config.yaml --max-pages 10
/// ```
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// Phrase to search for
    #[arg(short, long, env = "SEARCH_PHRASE")]
    pub search_phrase: Option<String>,

    /// Number of 30-day months to look back
    #[arg(short, long, env = "NUM_MONTHS")]
    pub num_months: Option<u32>,

    /// Work item JSON file with an `input_search_phrase` payload
    #[arg(short, long)]
    pub work_item: Option<String>,

    /// Optional path to config.yaml file
    #[arg(short, long)]
    pub config: Option<String>,

    /// Output directory for the spreadsheet, images and JSON report
    #[arg(short, long)]
    pub output_dir: Option<String>,

    /// Maximum number of "Show more" pages to request
    #[arg(long)]
    pub max_pages: Option<usize>,
}
