//! Data models for search results and their classified representations.
//!
//! - [`ArticleRecord`]: one raw search result card, as read from the feed
//! - [`ClassifiedRow`]: one output row handed to the sinks
//! - [`Report`]: the JSON envelope written at the end of a run

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// A raw search result as produced by a page source.
///
/// Every field is optional because the feed markup is not reliable. Records
/// without a title never make it past the classifier.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Deserialize, Serialize)]
pub struct ArticleRecord {
    /// The headline text.
    pub title: Option<String>,
    /// Text of the card's date element, e.g. `"Last update 12 Jan 2024"`.
    pub raw_date_text: Option<String>,
    /// Text of the card's excerpt, which may embed a relative date such as `"3 days ago"`.
    pub raw_excerpt_text: Option<String>,
    /// The snippet shown under the headline.
    pub description: Option<String>,
    /// Absolute URL of the card's thumbnail.
    pub image_url: Option<String>,
}

impl ArticleRecord {
    /// Convenience constructor used by sources and tests.
    pub fn titled(title: &str) -> Self {
        Self {
            title: Some(title.to_string()),
            ..Self::default()
        }
    }

    pub fn with_date(mut self, date: &str) -> Self {
        self.raw_date_text = Some(date.to_string());
        self
    }

    pub fn with_excerpt(mut self, excerpt: &str) -> Self {
        self.raw_excerpt_text = Some(excerpt.to_string());
        self
    }

    pub fn with_description(mut self, description: &str) -> Self {
        self.description = Some(description.to_string());
        self
    }

    pub fn with_image(mut self, url: &str) -> Self {
        self.image_url = Some(url.to_string());
        self
    }
}

/// A classified article, ready for the spreadsheet and JSON sinks.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct ClassifiedRow {
    pub title: String,
    /// `DD Mon YYYY`, or empty when the date could not be parsed.
    pub formatted_date: String,
    pub cleaned_description: String,
    /// The image URL until the image stage swaps in the stored file path.
    pub image_reference: String,
    pub phrase_count: u32,
    pub contains_money: bool,
    /// Position of the source record in the collected feed, untitled cards
    /// included. Image files are numbered by it.
    pub source_index: usize,
}

impl ClassifiedRow {
    /// Return a copy of this row pointing at a stored image artifact.
    pub fn with_image_reference(&self, reference: impl Into<String>) -> Self {
        Self {
            image_reference: reference.into(),
            ..self.clone()
        }
    }
}

/// The JSON document written for one run.
#[derive(Debug, Deserialize, Serialize)]
pub struct Report {
    pub search_phrase: String,
    pub cutoff: NaiveDateTime,
    pub generated_at: NaiveDateTime,
    /// Why pagination stopped, e.g. `"past_cutoff"`.
    pub stop_reason: String,
    pub pages_loaded: usize,
    pub rows: Vec<ClassifiedRow>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn test_record_builder() {
        let record = ArticleRecord::titled("Oil prices")
            .with_date("12 Jan 2024")
            .with_description("Crude rises")
            .with_image("https://example.com/a.jpg");

        assert_eq!(record.title.as_deref(), Some("Oil prices"));
        assert_eq!(record.raw_date_text.as_deref(), Some("12 Jan 2024"));
        assert_eq!(record.raw_excerpt_text, None);
        assert_eq!(record.description.as_deref(), Some("Crude rises"));
        assert_eq!(record.image_url.as_deref(), Some("https://example.com/a.jpg"));
    }

    #[test]
    fn test_with_image_reference_leaves_original_untouched() {
        let row = ClassifiedRow {
            title: "A".to_string(),
            formatted_date: "10 Jan 2024".to_string(),
            cleaned_description: "desc".to_string(),
            image_reference: "https://example.com/a.jpg".to_string(),
            phrase_count: 2,
            contains_money: true,
            source_index: 0,
        };
        let stored = row.with_image_reference("output/images/img-0.jpg");

        assert_eq!(row.image_reference, "https://example.com/a.jpg");
        assert_eq!(stored.image_reference, "output/images/img-0.jpg");
        assert_eq!(stored.title, row.title);
        assert_eq!(stored.phrase_count, 2);
    }

    #[test]
    fn test_report_serialization() {
        let at = NaiveDate::from_ymd_opt(2024, 1, 15)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        let report = Report {
            search_phrase: "economy".to_string(),
            cutoff: at,
            generated_at: at,
            stop_reason: "past_cutoff".to_string(),
            pages_loaded: 3,
            rows: Vec::new(),
        };

        let json = serde_json::to_string(&report).unwrap();
        assert!(json.contains("\"search_phrase\":\"economy\""));
        assert!(json.contains("\"cutoff\":\"2024-01-15T00:00:00\""));
        assert!(json.contains("\"stop_reason\":\"past_cutoff\""));
        assert!(json.contains("\"rows\":[]"));
    }
}
