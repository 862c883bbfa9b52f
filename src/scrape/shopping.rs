//! Shopping-aggregator adapter.
//!
//! The aggregator has no stable markup at all, so this adapter pattern-
//! matches currency-prefixed substrings in the raw document. Expect noise;
//! the plausibility band and dedup in the driver carry most of the weight.

use crate::price;
use crate::research::{Condition, PriceObservation, Source};
use crate::scrape::ListingAdapter;
use regex_lite::Regex;
use std::sync::LazyLock;

const DEFAULT_BASE_URL: &str = "https://www.google.it";

static EUR_PRICE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"€\s*([\d.,]+)").unwrap());

/// Currency-prefixed substring matcher over aggregator result pages.
pub struct ShoppingAggregatorAdapter {
    base_url: String,
}

impl ShoppingAggregatorAdapter {
    pub fn new() -> Self {
        Self::with_base_url(DEFAULT_BASE_URL)
    }

    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self { base_url: base_url.into() }
    }
}

impl Default for ShoppingAggregatorAdapter {
    fn default() -> Self {
        Self::new()
    }
}

impl ListingAdapter for ShoppingAggregatorAdapter {
    fn source(&self) -> Source {
        Source::Shopping
    }

    fn cap(&self) -> usize {
        8
    }

    fn search_url(&self, query: &str) -> String {
        format!("{}/search?q={}&tbm=shop&hl=it", self.base_url, urlencoding::encode(query))
    }

    fn extract(&self, html: &str) -> Vec<PriceObservation> {
        EUR_PRICE
            .captures_iter(html)
            .filter_map(|captures| {
                let value = price::parse_plausible(captures.get(1)?.as_str())?;
                Some(PriceObservation::bare(Source::Shopping, value, Condition::New))
            })
            .collect()
    }
}
