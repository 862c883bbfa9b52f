//! Research coordinator: concurrent fan-out over all price sources.

use crate::catalog::{self, CatalogClient, CatalogResult};
use crate::config::Config;
use crate::ebay::EbayApiClient;
use crate::fetch::{GatewayFetcher, PageFetcher};
use crate::intl::{InternationalClient, InternationalComparison};
use crate::research::models::{Condition, MarketResearch, PriceObservation};
use crate::scrape::{
    self, ActiveListingsAdapter, ListingAdapter, MerchandiseAdapter, ShoppingAggregatorAdapter,
    SoldListingsAdapter,
};
use anyhow::Result;
use std::sync::Arc;
use tracing::{info, warn};

/// Queries keep at most this many leading tokens.
const MAX_QUERY_TOKENS: usize = 6;

/// Owns every source client and runs the research fan-out.
///
/// Clients are injected at construction and dropped with the engine; there
/// are no process-wide singletons. Every source is an independent failure
/// domain: a dead source degrades to an empty group and can never abort
/// the others or the overall call.
pub struct ResearchEngine {
    config: Config,
    ebay: EbayApiClient,
    fetcher: Arc<dyn PageFetcher>,
    catalog: CatalogClient,
    international: InternationalClient,
    sold: SoldListingsAdapter,
    active: ActiveListingsAdapter,
    merchandise: MerchandiseAdapter,
    shopping: ShoppingAggregatorAdapter,
}

impl ResearchEngine {
    /// Creates an engine against production endpoints.
    pub fn new(config: Config) -> Result<Self> {
        let ebay = EbayApiClient::new(&config)?;
        let fetcher: Arc<dyn PageFetcher> = Arc::new(GatewayFetcher::new(&config)?);
        Ok(Self::with_parts(config, ebay, fetcher))
    }

    /// Assembles an engine from injected parts (for testing).
    pub fn with_parts(config: Config, ebay: EbayApiClient, fetcher: Arc<dyn PageFetcher>) -> Self {
        let catalog = CatalogClient::new(Arc::clone(&fetcher));
        let international = InternationalClient::new(Arc::clone(&fetcher));

        Self {
            config,
            ebay,
            fetcher,
            catalog,
            international,
            sold: SoldListingsAdapter::new(),
            active: ActiveListingsAdapter::new(),
            merchandise: MerchandiseAdapter::new(),
            shopping: ShoppingAggregatorAdapter::new(),
        }
    }

    /// Researches market prices for a product across all applicable
    /// sources concurrently.
    ///
    /// Always returns a result; when every source comes back empty the
    /// caller gets an empty `MarketResearch` ("no market signal"), never
    /// an error.
    pub async fn research(
        &self,
        product_name: &str,
        brand: Option<&str>,
        model: Option<&str>,
    ) -> MarketResearch {
        let query = build_query(product_name, brand, model);
        info!("Researching prices for: {}", query);

        let collectible = catalog::is_collectible(product_name);
        if collectible {
            info!("Collectible product detected, adding catalog search");
        }

        let (api_listings, sold_listings, active_listings, merchandise, shopping, catalog, international) = tokio::join!(
            self.api_group(&query),
            self.scrape_group(&self.sold, &query),
            self.scrape_group(&self.active, &query),
            self.scrape_group(&self.merchandise, &query),
            self.scrape_group(&self.shopping, &query),
            self.catalog_group(&query, collectible),
            self.international_group(&query),
        );

        MarketResearch {
            query,
            api_listings,
            sold_listings,
            active_listings,
            merchandise,
            shopping,
            catalog,
            international,
        }
    }

    /// Runs the international comparison on its own, at full market width.
    pub async fn research_international(
        &self,
        product_name: &str,
        condition: Condition,
    ) -> InternationalComparison {
        let query = build_query(product_name, None, None);
        self.international.compare(&query, &self.config.markets, condition).await
    }

    async fn api_group(&self, query: &str) -> Vec<PriceObservation> {
        match self.ebay.market_data(query).await {
            Ok(observations) => observations,
            Err(e) => {
                warn!("API source failed: {}", e);
                Vec::new()
            }
        }
    }

    async fn scrape_group(
        &self,
        adapter: &dyn ListingAdapter,
        query: &str,
    ) -> Vec<PriceObservation> {
        match scrape::run(adapter, self.fetcher.as_ref(), query).await {
            Ok(observations) => observations,
            Err(e) => {
                warn!("{:?} source failed: {}", adapter.source(), e);
                Vec::new()
            }
        }
    }

    async fn catalog_group(&self, query: &str, collectible: bool) -> Option<CatalogResult> {
        if !collectible {
            return None;
        }

        match self.catalog.search(query).await {
            Ok(result) => Some(result),
            Err(e) => {
                warn!("Catalog source failed: {}", e);
                None
            }
        }
    }

    async fn international_group(&self, query: &str) -> Option<InternationalComparison> {
        if self.config.markets.is_empty() {
            return None;
        }

        Some(self.international.compare(query, &self.config.markets, Condition::Used).await)
    }
}

/// Normalizes a raw listing title into a search query: punctuation
/// stripped, capped to the leading tokens, brand prepended and model
/// appended when not already present.
pub fn build_query(product_name: &str, brand: Option<&str>, model: Option<&str>) -> String {
    let cleaned: String = product_name
        .chars()
        .map(|c| if c.is_alphanumeric() { c } else { ' ' })
        .collect();

    let mut query = cleaned
        .split_whitespace()
        .take(MAX_QUERY_TOKENS)
        .collect::<Vec<_>>()
        .join(" ");

    if let Some(brand) = brand {
        if !brand.trim().is_empty() && !query.to_lowercase().contains(&brand.to_lowercase()) {
            query = format!("{} {}", brand, query);
        }
    }

    if let Some(model) = model {
        if !model.trim().is_empty() && !query.to_lowercase().contains(&model.to_lowercase()) {
            query = format!("{} {}", query, model);
        }
    }

    query.trim().to_string()
}
