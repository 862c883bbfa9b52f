//! International comparison command implementation.

use crate::config::Config;
use crate::fetch::GatewayFetcher;
use crate::format::Formatter;
use crate::intl::{InternationalClient, Market};
use crate::research::{build_query, Condition};
use anyhow::{Context, Result};
use std::sync::Arc;
use tracing::info;

/// Executes an international price comparison with optional import/export
/// opportunity math.
pub struct IntlCommand {
    config: Config,
    sell_price: Option<f64>,
    buy_price: Option<f64>,
}

impl IntlCommand {
    pub fn new(config: Config, sell_price: Option<f64>, buy_price: Option<f64>) -> Self {
        Self { config, sell_price, buy_price }
    }

    /// Executes the comparison and returns formatted output.
    pub async fn execute(
        &self,
        query: &str,
        markets: &[Market],
        condition: Condition,
    ) -> Result<String> {
        let fetcher =
            Arc::new(GatewayFetcher::new(&self.config).context("Failed to create HTTP client")?);
        let client = InternationalClient::new(fetcher);

        self.execute_with_client(&client, query, markets, condition).await
    }

    /// Executes the comparison with a provided client (for testing).
    pub async fn execute_with_client(
        &self,
        client: &InternationalClient,
        query: &str,
        markets: &[Market],
        condition: Condition,
    ) -> Result<String> {
        let query = build_query(query, None, None);
        let comparison = client.compare(&query, markets, condition).await;

        info!("Compared {} of {} markets", comparison.samples.len(), markets.len());

        let import = self.sell_price.and_then(|price| comparison.import_opportunity(price));
        let export = self.buy_price.and_then(|price| comparison.export_opportunity(price));

        let formatter = Formatter::new(self.config.format);
        Ok(formatter.format_comparison(&comparison, import.as_ref(), export.as_ref()))
    }
}
