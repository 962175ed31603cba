//! Date-bounded collection and classification of news search results.
//!
//! The pipeline pieces, leaves first:
//!
//! - [`dates`]: turns card date text (`12 Jan 2024`, `3 days ago`) into timestamps
//! - [`collector`]: pages through a [`collector::PageSource`] until results pass a cutoff
//! - [`classifier`]: turns raw records into output rows
//!
//! Around them sit the feed implementation ([`scrapers`], [`fetch`]), the
//! sinks ([`outputs`]), run events ([`events`]) and configuration
//! ([`cli`], [`config`]).

pub mod classifier;
pub mod cli;
pub mod collector;
pub mod config;
pub mod dates;
pub mod events;
pub mod fetch;
pub mod models;
pub mod outputs;
pub mod scrapers;
pub mod utils;
