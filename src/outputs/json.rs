//! JSON output of a run.
//!
//! # Output Structure
//!
//! Reports are grouped by the date of the run, one file per search phrase:
//! ```text
//! output_dir/
//! └── 2024-01-15/
//!     ├── climate-change.json
//!     └── oil.json
//! ```

use crate::models::Report;
use crate::utils::slugify_title;
use std::error::Error;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{error, info, instrument};

/// Path of the report file for `report` under `output_dir`.
pub fn report_path(report: &Report, output_dir: &str) -> PathBuf {
    let slug = slugify_title(&report.search_phrase);
    let name = if slug.is_empty() { "search".to_string() } else { slug };
    Path::new(output_dir)
        .join(report.generated_at.date().to_string())
        .join(format!("{name}.json"))
}

/// Write a [`Report`] as pretty-printed JSON and return where it went.
#[instrument(level = "info", skip_all, fields(%output_dir, rows = report.rows.len()))]
pub async fn write_report(report: &Report, output_dir: &str) -> Result<PathBuf, Box<dyn Error>> {
    let json = serde_json::to_string_pretty(report)?;
    let path = report_path(report, output_dir);

    if let Some(dir) = path.parent() {
        info!(dir = %dir.display(), "Ensuring JSON directory exists");
        if let Err(e) = fs::create_dir_all(dir).await {
            error!(dir = %dir.display(), error = %e, "Failed to create JSON dir");
            return Err(e.into());
        }
    }

    fs::write(&path, json).await?;
    info!(path = %path.display(), "Wrote JSON report");
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ClassifiedRow;
    use chrono::NaiveDate;

    fn report(phrase: &str) -> Report {
        let at = NaiveDate::from_ymd_opt(2024, 1, 15)
            .unwrap()
            .and_hms_opt(9, 30, 0)
            .unwrap();
        Report {
            search_phrase: phrase.to_string(),
            cutoff: at - chrono::TimeDelta::days(30),
            generated_at: at,
            stop_reason: "past_cutoff".to_string(),
            pages_loaded: 2,
            rows: vec![ClassifiedRow {
                title: "A".to_string(),
                formatted_date: "10 Jan 2024".to_string(),
                cleaned_description: "$5 million raised".to_string(),
                image_reference: String::new(),
                phrase_count: 1,
                contains_money: true,
                source_index: 0,
            }],
        }
    }

    #[test]
    fn test_report_path() {
        assert_eq!(
            report_path(&report("Climate Change"), "/tmp/out"),
            PathBuf::from("/tmp/out/2024-01-15/climate-change.json")
        );
        assert_eq!(
            report_path(&report("$$$"), "out"),
            PathBuf::from("out/2024-01-15/search.json")
        );
    }

    #[tokio::test]
    async fn test_write_report_round_trips() {
        let dir = std::env::temp_dir().join(format!("news_sweep_json_{}", std::process::id()));
        let original = report("oil");

        let path = write_report(&original, dir.to_str().unwrap()).await.unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        let back: Report = serde_json::from_str(&text).unwrap();
        assert_eq!(back.rows, original.rows);
        assert_eq!(back.cutoff, original.cutoff);
        let _ = std::fs::remove_dir_all(&dir);
    }
}
