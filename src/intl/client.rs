//! Per-market price sampling.

use crate::fetch::PageFetcher;
use crate::intl::markets::Market;
use crate::intl::models::{InternationalComparison, PriceSample};
use crate::price;
use crate::research::Condition;
use crate::scrape::selectors::listing;
use anyhow::Result;
use futures_util::future::join_all;
use scraper::Html;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Listings sampled per market before averaging.
const SAMPLE_SIZE: usize = 10;

/// Samples sold-listing prices across marketplace countries.
pub struct InternationalClient {
    fetcher: Arc<dyn PageFetcher>,
    /// Test override; production resolves per-market domains.
    base_url: Option<String>,
}

impl InternationalClient {
    pub fn new(fetcher: Arc<dyn PageFetcher>) -> Self {
        Self { fetcher, base_url: None }
    }

    /// Routes every market under one base URL, namespaced by market code
    /// (for testing).
    pub fn with_base_url(fetcher: Arc<dyn PageFetcher>, base_url: impl Into<String>) -> Self {
        Self { fetcher, base_url: Some(base_url.into()) }
    }

    /// Samples all requested markets concurrently. Every market is its own
    /// failure domain: a dead storefront drops out of the comparison
    /// without touching the others.
    pub async fn compare(
        &self,
        query: &str,
        markets: &[Market],
        condition: Condition,
    ) -> InternationalComparison {
        info!("Comparing international prices for: {}", query);

        let tasks = markets.iter().map(|&market| {
            let url = self.market_url(query, market, condition);
            async move { (market, self.sample_market(&url, market, condition).await) }
        });

        let mut samples = Vec::new();
        for (market, result) in join_all(tasks).await {
            match result {
                Ok(Some(sample)) => samples.push(sample),
                Ok(None) => debug!("No prices sampled for {}", market),
                Err(e) => warn!("Market {} sampling failed: {}", market, e),
            }
        }

        info!("Found prices in {} of {} markets", samples.len(), markets.len());
        InternationalComparison { query: query.to_string(), samples }
    }

    fn market_url(&self, query: &str, market: Market, condition: Condition) -> String {
        let base = match &self.base_url {
            Some(base) => format!("{}/{}", base, market),
            None => format!("https://www.{}", market.domain()),
        };

        let mut url = format!(
            "{}/sch/i.html?_nkw={}&LH_Complete=1&LH_Sold=1&LH_ItemCondition={}&_sop=13",
            base,
            urlencoding::encode(query),
            condition.listing_filter_id()
        );

        // Japan shares the US storefront; narrow by item location
        if market == Market::Jp {
            url.push_str("&LH_PrefLoc=2&_sacat=0");
        }

        url
    }

    async fn sample_market(
        &self,
        url: &str,
        market: Market,
        condition: Condition,
    ) -> Result<Option<PriceSample>> {
        let html = self.fetcher.fetch(url).await?;
        let document = Html::parse_document(&html);

        let prices: Vec<f64> = document
            .select(&listing::ITEM)
            .filter_map(|item| {
                let text = item.select(&listing::PRICE).next()?.text().collect::<String>();
                price::parse_plausible(&text)
            })
            .take(SAMPLE_SIZE)
            .collect();

        if prices.is_empty() {
            return Ok(None);
        }

        let avg = prices.iter().sum::<f64>() / prices.len() as f64;
        let sample = PriceSample::new(market, avg, condition);

        info!(
            "Market {}: avg {} {:.0} = €{:.0}",
            market, sample.currency, sample.local_price, sample.eur_price
        );

        Ok(Some(sample))
    }
}
