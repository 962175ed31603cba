//! Al Jazeera search results feed.
//!
//! The search page lists result cards newest first (with `sort=date`) and
//! offers a "Show more" button. [`SearchFeed`] models that page as a
//! [`PageSource`]: each `load_more` fetches the next results page and appends
//! its unseen cards to the visible list, so the list only ever grows.
//!
//! # URL Pattern
//!
//! ```text
//! https://www.aljazeera.com/search/<phrase>?sort=date
//! https://www.aljazeera.com/search/<phrase>?sort=date&page=2
//! ```

use crate::collector::PageSource;
use crate::fetch::FetchHtml;
use crate::models::ArticleRecord;
use crate::utils::truncate_for_log;
use itertools::Itertools;
use once_cell::sync::Lazy;
use scraper::{ElementRef, Html, Selector};
use std::error::Error;
use tracing::{debug, info, instrument};
use url::Url;

pub const DEFAULT_BASE_URL: &str = "https://www.aljazeera.com/";

static CARD: Lazy<Selector> = Lazy::new(|| Selector::parse("article.gc").expect("card selector"));
static TITLE: Lazy<Selector> =
    Lazy::new(|| Selector::parse("h3.gc__title a").expect("title selector"));
static DATE: Lazy<Selector> =
    Lazy::new(|| Selector::parse("div.gc__date__date").expect("date selector"));
static DATE_TEXT: Lazy<Selector> =
    Lazy::new(|| Selector::parse("span[aria-hidden]").expect("date text selector"));
static EXCERPT: Lazy<Selector> =
    Lazy::new(|| Selector::parse("div.gc__excerpt p").expect("excerpt selector"));
static IMAGE: Lazy<Selector> =
    Lazy::new(|| Selector::parse("img.gc__image[src]").expect("image selector"));
static SHOW_MORE: Lazy<Selector> =
    Lazy::new(|| Selector::parse("button.show-more-button").expect("show more selector"));

/// Cards parsed from one results page.
#[derive(Debug, Default)]
pub struct SearchPage {
    pub records: Vec<ArticleRecord>,
    /// Whether the page offered a "Show more" button.
    pub has_more: bool,
}

/// Parse the result cards out of a search results document.
///
/// Relative image URLs are resolved against `base`. Empty text becomes `None`,
/// except for the date: a card with a date element always gets
/// `Some` date text, empty when the element has no visible date span, so the
/// card is never re-dated from its excerpt.
pub fn parse_search_results(html: &str, base: &Url) -> SearchPage {
    let document = Html::parse_document(html);

    let records = document
        .select(&CARD)
        .map(|card| {
            let excerpt = first_text(card, &EXCERPT);
            ArticleRecord {
                title: first_text(card, &TITLE),
                raw_date_text: card.select(&DATE).next().map(|date| {
                    date.select(&DATE_TEXT)
                        .next()
                        .map(element_text)
                        .unwrap_or_default()
                }),
                raw_excerpt_text: excerpt.clone(),
                description: excerpt,
                image_url: card
                    .select(&IMAGE)
                    .next()
                    .and_then(|img| img.value().attr("src"))
                    .and_then(|src| base.join(src).ok())
                    .map(|url| url.to_string()),
            }
        })
        .collect();

    SearchPage {
        records,
        has_more: document.select(&SHOW_MORE).next().is_some(),
    }
}

fn first_text(card: ElementRef<'_>, selector: &Selector) -> Option<String> {
    let text = element_text(card.select(selector).next()?);
    (!text.is_empty()).then_some(text)
}

fn element_text(element: ElementRef<'_>) -> String {
    element.text().flat_map(str::split_whitespace).join(" ")
}

/// Growing view over the search results for one phrase.
pub struct SearchFeed<F> {
    fetcher: F,
    search_url: Url,
    visible: Vec<ArticleRecord>,
    pages_fetched: u32,
    has_more: bool,
}

impl<F: FetchHtml> SearchFeed<F> {
    /// Prepare a feed for `search_phrase` under `base_url`. Nothing is fetched yet.
    pub fn new(fetcher: F, base_url: &str, search_phrase: &str) -> Result<Self, Box<dyn Error>> {
        let base = Url::parse(base_url)?;
        let mut search_url = base.join(&format!("search/{}", urlencoding::encode(search_phrase)))?;
        search_url.query_pairs_mut().append_pair("sort", "date");
        Ok(Self {
            fetcher,
            search_url,
            visible: Vec::new(),
            pages_fetched: 0,
            has_more: true,
        })
    }

    /// URL of results page `page` (1-based).
    pub fn page_url(&self, page: u32) -> Url {
        let mut url = self.search_url.clone();
        if page > 1 {
            url.query_pairs_mut().append_pair("page", &page.to_string());
        }
        url
    }

    /// Fetch the next results page and append its unseen cards.
    ///
    /// Returns how many cards were added.
    #[instrument(level = "info", skip(self), fields(page = self.pages_fetched + 1))]
    async fn fetch_next_page(&mut self) -> Result<usize, Box<dyn Error>> {
        let url = self.page_url(self.pages_fetched + 1);
        let html = self.fetcher.fetch(url.as_str()).await?;
        let page = parse_search_results(&html, &url);
        if page.records.is_empty() {
            debug!(preview = %truncate_for_log(&html, 300), "No result cards on page");
        }
        self.pages_fetched += 1;
        self.has_more = page.has_more;

        let before = self.visible.len();
        self.visible = std::mem::take(&mut self.visible)
            .into_iter()
            .chain(page.records)
            .unique_by(|r| (r.title.clone(), r.raw_date_text.clone(), r.image_url.clone()))
            .collect();
        let added = self.visible.len() - before;

        info!(
            added,
            visible = self.visible.len(),
            has_more = self.has_more,
            "Parsed search results page"
        );
        Ok(added)
    }
}

impl<F: FetchHtml> PageSource for SearchFeed<F> {
    async fn current_records(&mut self) -> Result<Vec<ArticleRecord>, Box<dyn Error>> {
        if self.pages_fetched == 0 {
            self.fetch_next_page().await?;
        }
        Ok(self.visible.clone())
    }

    async fn load_more(&mut self) -> Result<bool, Box<dyn Error>> {
        if !self.has_more {
            debug!("No show more button on last page");
            return Ok(false);
        }
        Ok(self.fetch_next_page().await? > 0)
    }
}
