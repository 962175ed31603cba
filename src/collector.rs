//! Date-bounded pagination over an infinite-scroll search feed.
//!
//! A [`PageSource`] shows a growing list of result cards and can be asked to
//! reveal more. [`PaginatedCollector`] keeps asking until the oldest visible
//! card is older than the cutoff, the source runs dry or fails, or the page
//! guard trips.
//!
//! Only the tail card is tested. The final snapshot may therefore contain
//! cards older than the cutoff; the classifier drops those.

use crate::dates::DateParser;
use crate::events::{EventSink, HarvestEvent};
use crate::models::ArticleRecord;
use chrono::NaiveDateTime;
use std::error::Error;
use tracing::{debug, instrument};

/// Default number of `load_more` calls allowed per collection.
pub const DEFAULT_MAX_PAGES: usize = 50;

/// A feed of search results that grows when asked.
///
/// Implementations own their waiting: `load_more` should give up after its
/// own timeout rather than block forever.
#[allow(async_fn_in_trait)]
pub trait PageSource {
    /// All records currently visible, oldest last.
    async fn current_records(&mut self) -> Result<Vec<ArticleRecord>, Box<dyn Error>>;

    /// Reveal the next batch. `Ok(false)` means there is nothing more to show.
    async fn load_more(&mut self) -> Result<bool, Box<dyn Error>>;
}

/// Why a collection stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// The tail record is older than the cutoff.
    PastCutoff,
    /// The source had nothing more to show.
    Exhausted,
    /// The source returned an error; earlier results were kept.
    SourceFailed,
    /// `max_pages` further batches were already requested.
    PageLimit,
}

impl StopReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::PastCutoff => "past_cutoff",
            Self::Exhausted => "exhausted",
            Self::SourceFailed => "source_failed",
            Self::PageLimit => "page_limit",
        }
    }
}

/// Result of one collection run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Collection {
    /// The last snapshot read from the source.
    pub records: Vec<ArticleRecord>,
    pub stop: StopReason,
    /// Number of successful `load_more` calls.
    pub pages_loaded: usize,
}

/// Drives a [`PageSource`] until its results age past a cutoff.
pub struct PaginatedCollector<'a> {
    dates: DateParser,
    max_pages: usize,
    events: &'a dyn EventSink,
}

impl<'a> PaginatedCollector<'a> {
    pub fn new(dates: DateParser, events: &'a dyn EventSink) -> Self {
        Self {
            dates,
            max_pages: DEFAULT_MAX_PAGES,
            events,
        }
    }

    /// Limit the number of `load_more` calls.
    pub fn with_max_pages(mut self, max_pages: usize) -> Self {
        self.max_pages = max_pages;
        self
    }

    /// Read the source page by page until a stop condition holds.
    ///
    /// Never fails: source errors end the loop and whatever was read last is
    /// returned. A tail record whose date cannot be parsed does not stop the
    /// loop.
    #[instrument(level = "info", skip_all, fields(%cutoff, max_pages = self.max_pages))]
    pub async fn collect<S: PageSource>(
        &self,
        source: &mut S,
        cutoff: NaiveDateTime,
    ) -> Collection {
        let mut records = Vec::new();
        let mut pages_loaded = 0;

        let stop = loop {
            match source.current_records().await {
                Ok(snapshot) => records = snapshot,
                Err(e) => break self.source_failed(e),
            }
            self.events.emit(&HarvestEvent::PageLoaded {
                page: pages_loaded + 1,
                visible: records.len(),
            });

            let Some(tail) = records.last() else {
                debug!("Feed snapshot is empty");
                self.events.emit(&HarvestEvent::Exhausted);
                break StopReason::Exhausted;
            };

            let tail_date = self.dates.record_date(tail);
            debug!(tail_date = ?tail_date, "Checked tail record");
            if let Some(tail_date) = tail_date.filter(|d| *d < cutoff) {
                self.events.emit(&HarvestEvent::PastCutoff { tail_date });
                break StopReason::PastCutoff;
            }

            if pages_loaded >= self.max_pages {
                self.events.emit(&HarvestEvent::PageLimit {
                    max_pages: self.max_pages,
                });
                break StopReason::PageLimit;
            }

            match source.load_more().await {
                Ok(true) => pages_loaded += 1,
                Ok(false) => {
                    self.events.emit(&HarvestEvent::Exhausted);
                    break StopReason::Exhausted;
                }
                Err(e) => break self.source_failed(e),
            }
        };

        Collection {
            records,
            stop,
            pages_loaded,
        }
    }

    fn source_failed(&self, error: Box<dyn Error>) -> StopReason {
        self.events.emit(&HarvestEvent::SourceFailed {
            error: error.to_string(),
        });
        StopReason::SourceFailed
    }
}
