//! News search feeds.
//!
//! Each submodule turns one outlet's search results page into a
//! [`PageSource`](crate::collector::PageSource) the collector can drive.
//!
//! | Source | Module | Method |
//! |--------|--------|--------|
//! | Al Jazeera | [`aljazeera`] | HTML search results, `sort=date`, paged "Show more" |

pub mod aljazeera;
