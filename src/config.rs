//! Run configuration and search inputs.
//!
//! Settings are layered: built-in defaults, then an optional YAML file, then
//! command-line flags. Search inputs come from flags or from a work-item JSON
//! payload shaped like:
//!
//! ```json
//! { "input_search_phrase": { "search_phrase": "climate", "num_months": 2 } }
//! ```

use crate::cli::Cli;
use crate::collector::DEFAULT_MAX_PAGES;
use crate::scrapers::aljazeera::DEFAULT_BASE_URL;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fs;
use std::path::Path;
use tracing::{info, instrument};

/// Tunables for a harvesting run.
///
/// # Example `config.yaml`
///
/// ```yaml
/// base_url: https://www.aljazeera.com/
/// max_pages: 20
/// request_timeout_secs: 60
/// max_retries: 3
/// download_concurrency: 8
/// output_dir: output
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct ScrapeConfig {
    /// Site root the search path is joined onto.
    pub base_url: String,
    /// Cap on "Show more" requests per run.
    pub max_pages: usize,
    /// Per-request timeout, which also bounds every `load_more` wait.
    pub request_timeout_secs: u64,
    /// Retries per page fetch after the first attempt.
    pub max_retries: usize,
    /// Concurrent image downloads.
    pub download_concurrency: usize,
    pub output_dir: String,
    /// Defaults to `{output_dir}/images`.
    pub image_dir: Option<String>,
}

impl Default for ScrapeConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            max_pages: DEFAULT_MAX_PAGES,
            request_timeout_secs: 60,
            max_retries: 3,
            download_concurrency: 8,
            output_dir: "output".to_string(),
            image_dir: None,
        }
    }
}

impl ScrapeConfig {
    /// Apply command-line overrides.
    pub fn with_overrides(mut self, cli: &Cli) -> Self {
        if let Some(dir) = &cli.output_dir {
            self.output_dir = dir.clone();
        }
        if let Some(max_pages) = cli.max_pages {
            self.max_pages = max_pages;
        }
        self
    }

    /// Where downloaded thumbnails go.
    pub fn image_dir(&self) -> String {
        self.image_dir.clone().unwrap_or_else(|| {
            Path::new(&self.output_dir)
                .join("images")
                .to_string_lossy()
                .into_owned()
        })
    }
}

/// Load a YAML config file. Missing keys take their defaults.
#[instrument(level = "info")]
pub fn load_config(path: &str) -> Result<ScrapeConfig, Box<dyn Error>> {
    let text = fs::read_to_string(path)?;
    let config: ScrapeConfig = serde_yaml::from_str(&text)?;
    info!(?config, "Loaded configuration");
    Ok(config)
}

/// The `input_search_phrase` payload of a work item.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct SearchOptions {
    pub search_phrase: Option<String>,
    pub num_months: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct WorkItem {
    input_search_phrase: SearchOptions,
}

/// Read the search options out of a work-item JSON file.
#[instrument(level = "info")]
pub fn load_work_item(path: &str) -> Result<SearchOptions, Box<dyn Error>> {
    let text = fs::read_to_string(path)?;
    parse_work_item(&text)
}

pub fn parse_work_item(text: &str) -> Result<SearchOptions, Box<dyn Error>> {
    let item: WorkItem = serde_json::from_str(text)?;
    Ok(item.input_search_phrase)
}

/// Validated inputs for one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchInputs {
    pub search_phrase: String,
    pub num_months: u32,
}

/// Combine flag values with an optional work item; flags win.
pub fn resolve_inputs(
    cli: &Cli,
    work_item: Option<SearchOptions>,
) -> Result<SearchInputs, Box<dyn Error>> {
    let work_item = work_item.unwrap_or_default();

    let search_phrase = cli
        .search_phrase
        .clone()
        .or(work_item.search_phrase)
        .map(|p| p.trim().to_string())
        .filter(|p| !p.is_empty())
        .ok_or("a non-empty search phrase is required (--search-phrase or work item)")?;
    let num_months = cli
        .num_months
        .or(work_item.num_months)
        .ok_or("number of months is required (--num-months or work item)")?;

    Ok(SearchInputs {
        search_phrase,
        num_months,
    })
}
