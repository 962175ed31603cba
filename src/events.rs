//! Structured run events.
//!
//! The collector and classifier report progress through an [`EventSink`]
//! instead of logging directly, so callers can decide where events go. The
//! binary uses [`TracingEvents`], which forwards every event to `tracing`
//! with an `event_kind` field.
//!
//! # Events
//!
//! | Event Kind | Description |
//! |------------|-------------|
//! | `collection.page_loaded` | A snapshot of the feed was read |
//! | `collection.past_cutoff` | The tail record is older than the cutoff |
//! | `collection.exhausted` | The source has no more results |
//! | `collection.source_failed` | The source returned an error |
//! | `collection.page_limit` | The pagination guard tripped |
//! | `classification.completed` | Records were turned into rows |

use chrono::NaiveDateTime;
use tracing::{info, warn};

/// Something worth reporting while harvesting a feed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HarvestEvent {
    PageLoaded { page: usize, visible: usize },
    PastCutoff { tail_date: NaiveDateTime },
    Exhausted,
    SourceFailed { error: String },
    PageLimit { max_pages: usize },
    RecordsClassified { input: usize, rows: usize },
}

impl HarvestEvent {
    /// Stable dotted name used as the `event_kind` field.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::PageLoaded { .. } => "collection.page_loaded",
            Self::PastCutoff { .. } => "collection.past_cutoff",
            Self::Exhausted => "collection.exhausted",
            Self::SourceFailed { .. } => "collection.source_failed",
            Self::PageLimit { .. } => "collection.page_limit",
            Self::RecordsClassified { .. } => "classification.completed",
        }
    }
}

/// Receiver for [`HarvestEvent`]s.
pub trait EventSink {
    fn emit(&self, event: &HarvestEvent);
}

/// Forwards events to the `tracing` subscriber.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingEvents;

impl EventSink for TracingEvents {
    fn emit(&self, event: &HarvestEvent) {
        let event_kind = event.kind();
        match event {
            HarvestEvent::PageLoaded { page, visible } => {
                info!(event_kind, page, visible, "Read feed snapshot")
            }
            HarvestEvent::PastCutoff { tail_date } => {
                info!(event_kind, %tail_date, "Tail record is older than cutoff; stopping")
            }
            HarvestEvent::Exhausted => info!(event_kind, "Feed has no more results"),
            HarvestEvent::SourceFailed { error } => {
                warn!(event_kind, %error, "Feed source failed; keeping partial results")
            }
            HarvestEvent::PageLimit { max_pages } => {
                warn!(event_kind, max_pages, "Reached maximum pages limit")
            }
            HarvestEvent::RecordsClassified { input, rows } => {
                info!(event_kind, input, rows, "Classified records")
            }
        }
    }
}

/// Keeps every event in memory for assertions.
#[cfg(test)]
#[derive(Debug, Default)]
pub struct RecordingEvents {
    events: std::cell::RefCell<Vec<HarvestEvent>>,
}

#[cfg(test)]
impl RecordingEvents {
    pub fn events(&self) -> Vec<HarvestEvent> {
        self.events.borrow().clone()
    }

    pub fn kinds(&self) -> Vec<&'static str> {
        self.events.borrow().iter().map(HarvestEvent::kind).collect()
    }
}

#[cfg(test)]
impl EventSink for RecordingEvents {
    fn emit(&self, event: &HarvestEvent) {
        self.events.borrow_mut().push(event.clone());
    }
}
