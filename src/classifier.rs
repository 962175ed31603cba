//! Turning raw search result cards into output rows.
//!
//! For every card with a title the classifier computes how often the search
//! phrase occurs, whether the text mentions an amount of money, and a cleaned
//! description. Cards are expected newest first; the first card dated before
//! the cutoff ends the run.

use crate::dates::{DateParser, format_date};
use crate::events::{EventSink, HarvestEvent};
use crate::models::{ArticleRecord, ClassifiedRow};
use chrono::NaiveDateTime;
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::{debug, instrument};

static MONEY_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\$[\d,]+(\.\d+)?|\d+\s?(dollars|USD)").expect("money regex")
});

static AGO_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b\d+\s+\w+\s+ago\b").expect("ago phrase regex"));

static ELLIPSIS_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\.{3,}|…").expect("ellipsis regex"));

static WHITESPACE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("whitespace regex"));

/// Classifies records against one search phrase.
#[derive(Debug, Clone)]
pub struct ArticleClassifier {
    dates: DateParser,
    phrase: String,
}

impl ArticleClassifier {
    pub fn new(dates: DateParser, search_phrase: &str) -> Self {
        Self {
            dates,
            phrase: search_phrase.to_lowercase(),
        }
    }

    /// Classify records in order, stopping at the first one older than `cutoff`.
    ///
    /// Records without a title are skipped. Records without a parseable date
    /// are kept and get an empty `formatted_date`.
    #[instrument(level = "info", skip_all, fields(records = records.len(), %cutoff))]
    pub fn classify(&self, records: &[ArticleRecord], cutoff: NaiveDateTime) -> Vec<ClassifiedRow> {
        let mut rows = Vec::new();

        for (idx, record) in records.iter().enumerate() {
            let Some(title) = record
                .title
                .as_deref()
                .map(str::trim)
                .filter(|t| !t.is_empty())
            else {
                debug!(index = idx, "Skipping record without title");
                continue;
            };

            let date = self.dates.record_date(record);
            if date.is_some_and(|d| d < cutoff) {
                debug!(index = idx, ?date, "Record is older than cutoff; stopping");
                break;
            }

            let description = record.description.as_deref().unwrap_or("");
            rows.push(ClassifiedRow {
                title: title.to_string(),
                formatted_date: format_date(date),
                cleaned_description: clean_description(description),
                image_reference: record.image_url.clone().unwrap_or_default(),
                phrase_count: self.phrase_count(title) + self.phrase_count(description),
                contains_money: contains_money(title) || contains_money(description),
                source_index: idx,
            });
        }

        rows
    }

    /// Classify and report the outcome to `events`.
    pub fn classify_reporting(
        &self,
        records: &[ArticleRecord],
        cutoff: NaiveDateTime,
        events: &dyn EventSink,
    ) -> Vec<ClassifiedRow> {
        let rows = self.classify(records, cutoff);
        events.emit(&HarvestEvent::RecordsClassified {
            input: records.len(),
            rows: rows.len(),
        });
        rows
    }

    /// Case-insensitive, non-overlapping occurrences of the phrase in `text`.
    fn phrase_count(&self, text: &str) -> u32 {
        if self.phrase.is_empty() {
            return 0;
        }
        text.to_lowercase().matches(self.phrase.as_str()).count() as u32
    }
}

/// True when `text` mentions a dollar amount: `$1,200.50`, `1200 dollars`, `50 USD`.
pub fn contains_money(text: &str) -> bool {
    MONEY_RE.is_match(text)
}

/// Strip relative-date phrases and ellipses from an excerpt and normalize spacing.
pub fn clean_description(text: &str) -> String {
    let without_ago = AGO_RE.replace_all(text, "");
    let without_ellipsis = ELLIPSIS_RE.replace_all(&without_ago, "");
    WHITESPACE_RE
        .replace_all(&without_ellipsis, " ")
        .trim()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::RecordingEvents;
    use chrono::NaiveDate;

    fn day(y: i32, m: u32, d: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap()
    }

    fn classifier(phrase: &str) -> ArticleClassifier {
        ArticleClassifier::new(DateParser::new(day(2024, 1, 15)), phrase)
    }

    #[test]
    fn test_end_to_end_scenario() {
        let records = vec![
            ArticleRecord::titled("A")
                .with_date("10 Jan 2024")
                .with_description("$5 million raised"),
            ArticleRecord::titled("B").with_date("1 Dec 2023"),
        ];

        let rows = classifier("raised").classify(&records, day(2024, 1, 1));

        assert_eq!(
            rows,
            vec![ClassifiedRow {
                title: "A".to_string(),
                formatted_date: "10 Jan 2024".to_string(),
                cleaned_description: "$5 million raised".to_string(),
                image_reference: String::new(),
                phrase_count: 1,
                contains_money: true,
                source_index: 0,
            }]
        );
    }

    #[test]
    fn test_records_without_title_are_skipped() {
        let mut untitled = ArticleRecord::titled("ignored").with_date("12 Jan 2024");
        untitled.title = None;
        let blank = ArticleRecord::titled("   ").with_date("12 Jan 2024");
        let records = vec![
            untitled,
            blank,
            ArticleRecord::titled("  Kept  ").with_date("12 Jan 2024"),
        ];

        let rows = classifier("x").classify(&records, day(2024, 1, 1));

        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].title, "Kept");
    }

    #[test]
    fn test_rows_remember_feed_position() {
        let mut untitled = ArticleRecord::titled("ignored").with_date("12 Jan 2024");
        untitled.title = None;
        let records = vec![
            ArticleRecord::titled("A").with_date("12 Jan 2024"),
            untitled,
            ArticleRecord::titled("C").with_date("11 Jan 2024"),
        ];

        let rows = classifier("x").classify(&records, day(2024, 1, 1));

        let positions: Vec<_> = rows.iter().map(|r| r.source_index).collect();
        assert_eq!(positions, vec![0, 2]);
    }

    #[test]
    fn test_untitled_old_record_does_not_stop_the_run() {
        let mut untitled = ArticleRecord::titled("ignored").with_date("1 Jan 2020");
        untitled.title = None;
        let records = vec![untitled, ArticleRecord::titled("B").with_date("12 Jan 2024")];

        let rows = classifier("x").classify(&records, day(2024, 1, 1));

        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].title, "B");
    }

    #[test]
    fn test_stops_at_first_old_record() {
        let records = vec![
            ArticleRecord::titled("A").with_date("12 Jan 2024"),
            ArticleRecord::titled("B").with_date("20 Dec 2023"),
            ArticleRecord::titled("C").with_date("11 Jan 2024"),
        ];

        let rows = classifier("x").classify(&records, day(2024, 1, 1));

        assert_eq!(rows.iter().map(|r| r.title.as_str()).collect::<Vec<_>>(), vec!["A"]);
    }

    #[test]
    fn test_undated_records_are_kept_with_empty_date() {
        let records = vec![
            ArticleRecord::titled("A").with_date("no idea"),
            ArticleRecord::titled("B").with_excerpt("Updated 2 days ago ..."),
        ];

        let rows = classifier("x").classify(&records, day(2024, 1, 1));

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].formatted_date, "");
        assert_eq!(rows[1].formatted_date, "13 Jan 2024");
    }

    #[test]
    fn test_phrase_count_is_case_insensitive_across_fields() {
        let records = vec![ArticleRecord::titled("Climate talks: CLIMATE deal")
            .with_date("12 Jan 2024")
            .with_description("The climate summit ended. climateclimate")];

        let rows = classifier("Climate").classify(&records, day(2024, 1, 1));

        assert_eq!(rows[0].phrase_count, 5);
    }

    #[test]
    fn test_phrase_count_does_not_overlap() {
        let records = vec![ArticleRecord::titled("aaaa").with_date("12 Jan 2024")];
        let rows = classifier("aa").classify(&records, day(2024, 1, 1));
        assert_eq!(rows[0].phrase_count, 2);
    }

    #[test]
    fn test_empty_phrase_counts_nothing() {
        let records = vec![ArticleRecord::titled("Anything").with_date("12 Jan 2024")];
        let rows = classifier("").classify(&records, day(2024, 1, 1));
        assert_eq!(rows[0].phrase_count, 0);
    }

    #[test]
    fn test_contains_money() {
        assert!(contains_money("$1,200"));
        assert!(contains_money("1200 dollars"));
        assert!(contains_money("50 USD"));
        assert!(contains_money("costs $3.50 each"));
        assert!(contains_money("a 20Dollars fine"));
        assert!(!contains_money("1200 people"));
        assert!(!contains_money("the dollar fell"));
        assert!(!contains_money(""));
    }

    #[test]
    fn test_money_in_title_only() {
        let records = vec![ArticleRecord::titled("Fund reaches $2bn")
            .with_date("12 Jan 2024")
            .with_description("No figures here")];
        let rows = classifier("x").classify(&records, day(2024, 1, 1));
        assert!(rows[0].contains_money);
    }

    #[test]
    fn test_clean_description() {
        assert_eq!(
            clean_description("3 days ago ... Protesters gathered   in the\n square..."),
            "Protesters gathered in the square"
        );
        assert_eq!(clean_description("Talks resume…"), "Talks resume");
        assert_eq!(clean_description("Posted 12 hours ago"), "Posted");
        assert_eq!(clean_description(""), "");
    }

    #[test]
    fn test_image_reference_comes_from_record() {
        let records = vec![ArticleRecord::titled("A")
            .with_date("12 Jan 2024")
            .with_image("https://example.com/a.jpg")];
        let rows = classifier("x").classify(&records, day(2024, 1, 1));
        assert_eq!(rows[0].image_reference, "https://example.com/a.jpg");
    }

    #[test]
    fn test_classify_is_idempotent() {
        let records = vec![
            ArticleRecord::titled("Aid worth $40m")
                .with_date("12 Jan 2024")
                .with_description("aid 1 day ago"),
            ArticleRecord::titled("Other").with_excerpt("5 hours ago"),
        ];
        let c = classifier("aid");

        let first = c.classify(&records, day(2024, 1, 1));
        let second = c.classify(&records, day(2024, 1, 1));

        assert_eq!(first, second);
    }

    #[test]
    fn test_classify_reporting_emits_counts() {
        let records = vec![
            ArticleRecord::titled("A").with_date("12 Jan 2024"),
            ArticleRecord::default(),
        ];
        let events = RecordingEvents::default();

        let rows = classifier("x").classify_reporting(&records, day(2024, 1, 1), &events);

        assert_eq!(rows.len(), 1);
        assert_eq!(
            events.events(),
            vec![HarvestEvent::RecordsClassified { input: 2, rows: 1 }]
        );
    }
}
