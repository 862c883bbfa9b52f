//! Search client for the collector-pricing catalog.

use crate::catalog::models::CatalogResult;
use crate::catalog::parser;
use crate::fetch::PageFetcher;
use anyhow::Result;
use std::sync::Arc;
use tracing::info;

const DEFAULT_BASE_URL: &str = "https://www.pricecharting.com";

/// Max products kept per search.
const MAX_PRODUCTS: usize = 5;

/// Catalog client over the shared fetch capability.
pub struct CatalogClient {
    fetcher: Arc<dyn PageFetcher>,
    base_url: String,
}

impl CatalogClient {
    pub fn new(fetcher: Arc<dyn PageFetcher>) -> Self {
        Self::with_base_url(fetcher, DEFAULT_BASE_URL)
    }

    pub fn with_base_url(fetcher: Arc<dyn PageFetcher>, base_url: impl Into<String>) -> Self {
        Self { fetcher, base_url: base_url.into() }
    }

    /// Searches the catalog and parses tiered pricing for the best matches.
    pub async fn search(&self, query: &str) -> Result<CatalogResult> {
        let url = format!(
            "{}/search-products?q={}&type=videogames",
            self.base_url,
            urlencoding::encode(query)
        );

        let html = self.fetcher.fetch(&url).await?;
        let products = parser::parse_search_results(&html, MAX_PRODUCTS)?;

        info!("Catalog: {} products for '{}'", products.len(), query);
        Ok(CatalogResult { query: query.to_string(), products })
    }
}
