//! Scraped marketplace source adapters.
//!
//! Each adapter knows how to build a search URL for one source and how to
//! extract price observations from the fetched document. The [`run`]
//! driver wires an adapter to the fetch capability and applies the shared
//! hygiene: plausibility band, duplicate removal, result cap.

pub mod amazon;
pub mod ebay;
pub mod selectors;
pub mod shopping;

pub use amazon::MerchandiseAdapter;
pub use ebay::{ActiveListingsAdapter, SoldListingsAdapter};
pub use shopping::ShoppingAggregatorAdapter;

use crate::fetch::PageFetcher;
use crate::price;
use crate::research::{PriceObservation, Source};
use anyhow::Result;
use std::collections::HashSet;
use tracing::info;

/// A scraped listing source.
pub trait ListingAdapter: Send + Sync {
    /// Source tag applied to extracted observations.
    fn source(&self) -> Source;

    /// Maximum observations to keep per run.
    fn cap(&self) -> usize;

    /// Builds the source-specific search URL for a normalized query.
    fn search_url(&self, query: &str) -> String;

    /// Extracts candidate observations from a fetched document.
    /// Row-level failures are skipped, not surfaced.
    fn extract(&self, html: &str) -> Vec<PriceObservation>;
}

/// Fetches and extracts observations for one adapter, keeping at most
/// `cap` plausible, de-duplicated readings.
pub async fn run(
    adapter: &dyn ListingAdapter,
    fetcher: &dyn PageFetcher,
    query: &str,
) -> Result<Vec<PriceObservation>> {
    let url = adapter.search_url(query);
    let html = fetcher.fetch(&url).await?;

    let mut seen = HashSet::new();
    let mut observations = Vec::new();

    for observation in adapter.extract(&html) {
        if !price::is_plausible(observation.price) {
            continue;
        }
        if !seen.insert(observation.price.to_bits()) {
            continue;
        }
        observations.push(observation);
        if observations.len() >= adapter.cap() {
            break;
        }
    }

    info!("{:?}: {} observations for '{}'", adapter.source(), observations.len(), query);
    Ok(observations)
}
