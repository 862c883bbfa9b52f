//! Sold- and active-listings adapters for the scraped marketplace.

use crate::price;
use crate::research::{Condition, PriceObservation, Source};
use crate::scrape::selectors::listing;
use crate::scrape::ListingAdapter;
use scraper::Html;

const DEFAULT_BASE_URL: &str = "https://www.ebay.it";

/// Extracts observations from listing rows; shared by both variants.
fn extract_listing_rows(html: &str, source: Source) -> Vec<PriceObservation> {
    let document = Html::parse_document(html);

    document
        .select(&listing::ITEM)
        .filter_map(|item| {
            let price_text = item.select(&listing::PRICE).next()?.text().collect::<String>();
            let price = price::parse_plausible(&price_text)?;

            let title = item
                .select(&listing::TITLE)
                .next()
                .map(|e| e.text().collect::<String>().trim().to_string())
                .filter(|t| !t.is_empty());

            let url = item
                .select(&listing::LINK)
                .next()
                .and_then(|e| e.value().attr("href"))
                .map(String::from);

            Some(PriceObservation {
                source,
                price,
                currency: "EUR".to_string(),
                condition: Condition::Used,
                url,
                title,
            })
        })
        .collect()
}

/// Completed/sold listings — the strongest real-sale price signal.
pub struct SoldListingsAdapter {
    base_url: String,
}

impl SoldListingsAdapter {
    pub fn new() -> Self {
        Self::with_base_url(DEFAULT_BASE_URL)
    }

    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self { base_url: base_url.into() }
    }
}

impl Default for SoldListingsAdapter {
    fn default() -> Self {
        Self::new()
    }
}

impl ListingAdapter for SoldListingsAdapter {
    fn source(&self) -> Source {
        Source::SoldListings
    }

    fn cap(&self) -> usize {
        10
    }

    fn search_url(&self, query: &str) -> String {
        // LH_Complete + LH_Sold narrow to completed sales; _sop=13 sorts
        // by end date so the sample reflects the current market
        format!(
            "{}/sch/i.html?_nkw={}&LH_Complete=1&LH_Sold=1&_sop=13",
            self.base_url,
            urlencoding::encode(query)
        )
    }

    fn extract(&self, html: &str) -> Vec<PriceObservation> {
        extract_listing_rows(html, Source::SoldListings)
    }
}

/// Active listings — current asking prices, weaker signal than sold.
pub struct ActiveListingsAdapter {
    base_url: String,
}

impl ActiveListingsAdapter {
    pub fn new() -> Self {
        Self::with_base_url(DEFAULT_BASE_URL)
    }

    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self { base_url: base_url.into() }
    }
}

impl Default for ActiveListingsAdapter {
    fn default() -> Self {
        Self::new()
    }
}

impl ListingAdapter for ActiveListingsAdapter {
    fn source(&self) -> Source {
        Source::ActiveListings
    }

    fn cap(&self) -> usize {
        8
    }

    fn search_url(&self, query: &str) -> String {
        format!("{}/sch/i.html?_nkw={}&_sop=15", self.base_url, urlencoding::encode(query))
    }

    fn extract(&self, html: &str) -> Vec<PriceObservation> {
        extract_listing_rows(html, Source::ActiveListings)
    }
}
