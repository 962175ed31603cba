//! Parsing of the free-text dates found on search result cards.
//!
//! Cards carry dates in two shapes:
//!
//! | Shape | Example | Source element |
//! |-------|---------|----------------|
//! | Absolute | `12 Jan 2024`, `Last update 12 Jan 2024` | date element |
//! | Relative | `3 days ago` somewhere in a sentence | excerpt |
//!
//! Everything here returns `Option`: an unparseable date is an ordinary
//! outcome, and callers decide what "no date" means for them.
//!
//! Relative dates are computed against a `now` captured when the
//! [`DateParser`] is built, so a whole run compares against one instant and
//! tests can pin the clock.

use crate::models::ArticleRecord;
use chrono::{Local, NaiveDate, NaiveDateTime, TimeDelta};
use once_cell::sync::Lazy;
use regex::Regex;

/// Absolute formats, tried in order. Each must match the whole string.
const ABSOLUTE_FORMATS: [&str; 2] = ["Last update %d %b %Y", "%d %b %Y"];

/// Output format for dates in the spreadsheet, e.g. `01 Dec 2023`.
pub const DISPLAY_FORMAT: &str = "%d %b %Y";

/// Exact shape of an absolute date. Chrono alone lets format spaces match
/// any amount of whitespace, including none.
static ABSOLUTE_SHAPE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?:Last update )?\d{1,2} [A-Za-z]{3} \d{4}$").expect("absolute date shape regex")
});

static RELATIVE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(\d+)\s+(minutes?|hours?|days?|years?)\s+ago").expect("relative date regex")
});

/// Converts card date text into timestamps.
#[derive(Debug, Clone, Copy)]
pub struct DateParser {
    now: NaiveDateTime,
}

impl DateParser {
    /// Build a parser that resolves relative dates against `now`.
    pub fn new(now: NaiveDateTime) -> Self {
        Self { now }
    }

    /// Build a parser pinned to the local wall clock at call time.
    pub fn at_local_now() -> Self {
        Self::new(Local::now().naive_local())
    }

    /// The reference instant used for relative dates.
    pub fn now(&self) -> NaiveDateTime {
        self.now
    }

    /// Parse arbitrary date text: the absolute formats first, then the
    /// relative grammar.
    ///
    /// # Examples
    ///
    /// ```ignore
    /// let parser = DateParser::new(now);
    /// assert_eq!(parser.parse(Some("12 Jan 2024")), parser.parse(Some("Last update 12 Jan 2024")));
    /// assert_eq!(parser.parse(Some("not a date")), None);
    /// ```
    pub fn parse(&self, raw_text: Option<&str>) -> Option<NaiveDateTime> {
        self.parse_absolute(raw_text)
            .or_else(|| self.parse_relative(raw_text))
    }

    /// Try each absolute format against the whole (trimmed) text.
    ///
    /// The result is midnight of the parsed day.
    pub fn parse_absolute(&self, raw_text: Option<&str>) -> Option<NaiveDateTime> {
        let text = raw_text?.trim();
        if !ABSOLUTE_SHAPE_RE.is_match(text) {
            return None;
        }
        ABSOLUTE_FORMATS
            .iter()
            .find_map(|format| NaiveDate::parse_from_str(text, format).ok())
            .and_then(|date| date.and_hms_opt(0, 0, 0))
    }

    /// Find the first `<n> <unit> ago` phrase in the text and subtract it from `now`.
    ///
    /// A year counts as exactly 365 days. This is an approximation: leap days
    /// are ignored.
    pub fn parse_relative(&self, raw_text: Option<&str>) -> Option<NaiveDateTime> {
        let caps = RELATIVE_RE.captures(raw_text?)?;
        let amount: i64 = caps.get(1)?.as_str().parse().ok()?;
        let delta = match caps.get(2)?.as_str().trim_end_matches('s') {
            "minute" => TimeDelta::try_minutes(amount)?,
            "hour" => TimeDelta::try_hours(amount)?,
            "day" => TimeDelta::try_days(amount)?,
            "year" => TimeDelta::try_days(amount.checked_mul(365)?)?,
            _ => return None,
        };
        self.now.checked_sub_signed(delta)
    }

    /// Date of a search result card.
    ///
    /// A card with a date element is judged on that element alone, using the
    /// absolute formats. Only a card without one falls back to the relative
    /// phrase in its excerpt.
    pub fn record_date(&self, record: &ArticleRecord) -> Option<NaiveDateTime> {
        match (&record.raw_date_text, &record.raw_excerpt_text) {
            (Some(date_text), _) => self.parse_absolute(Some(date_text)),
            (None, Some(excerpt)) => self.parse_relative(Some(excerpt)),
            (None, None) => None,
        }
    }
}

/// Render a parsed date for output, or an empty string when there is none.
pub fn format_date(date: Option<NaiveDateTime>) -> String {
    date.map(|d| d.format(DISPLAY_FORMAT).to_string())
        .unwrap_or_default()
}

/// Oldest acceptable timestamp for a lookback of `num_months` 30-day months.
///
/// Saturates at the earliest representable date.
pub fn cutoff_for_months(now: NaiveDateTime, num_months: u32) -> NaiveDateTime {
    TimeDelta::try_days(30 * i64::from(num_months))
        .and_then(|lookback| now.checked_sub_signed(lookback))
        .unwrap_or(NaiveDateTime::MIN)
}
