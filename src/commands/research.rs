//! Research command implementation.

use crate::config::Config;
use crate::format::Formatter;
use crate::research::ResearchEngine;
use anyhow::{Context, Result};
use tracing::info;

/// Executes a full market research run.
pub struct ResearchCommand {
    config: Config,
    prompt: bool,
}

impl ResearchCommand {
    /// Creates a new research command. With `prompt` set, the output is
    /// the raw prompt-context block instead of the formatted summary.
    pub fn new(config: Config, prompt: bool) -> Self {
        Self { config, prompt }
    }

    /// Executes the research and returns formatted output.
    pub async fn execute(
        &self,
        query: &str,
        brand: Option<&str>,
        model: Option<&str>,
    ) -> Result<String> {
        let engine = ResearchEngine::new(self.config.clone())
            .context("Failed to create research engine")?;

        self.execute_with_engine(&engine, query, brand, model).await
    }

    /// Executes the research with a provided engine (for testing).
    pub async fn execute_with_engine(
        &self,
        engine: &ResearchEngine,
        query: &str,
        brand: Option<&str>,
        model: Option<&str>,
    ) -> Result<String> {
        let research = engine.research(query, brand, model).await;

        info!(
            "Research complete: api={} sold={} active={} retail={} shopping={}",
            research.api_listings.len(),
            research.sold_listings.len(),
            research.active_listings.len(),
            research.merchandise.len(),
            research.shopping.len()
        );

        if self.prompt {
            return Ok(research.to_prompt_context());
        }

        let formatter = Formatter::new(self.config.format);
        Ok(formatter.format_research(&research))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ebay::EbayApiClient;
    use crate::fetch::PageFetcher;
    use async_trait::async_trait;
    use std::sync::Arc;

    struct DeadFetcher;

    #[async_trait]
    impl PageFetcher for DeadFetcher {
        async fn fetch(&self, _url: &str) -> Result<String> {
            anyhow::bail!("offline")
        }
    }

    /// Engine with no credentials and no reachable sources: every group
    /// degrades to empty.
    fn offline_engine() -> ResearchEngine {
        let config = Config { markets: Vec::new(), ..Config::default() };
        let ebay = EbayApiClient::new(&config).unwrap();
        ResearchEngine::with_parts(config, ebay, Arc::new(DeadFetcher))
    }

    #[tokio::test]
    async fn test_research_command_offline_summary() {
        let config = Config { markets: Vec::new(), ..Config::default() };
        let cmd = ResearchCommand::new(config, false);

        let output = cmd
            .execute_with_engine(&offline_engine(), "test product", None, None)
            .await
            .unwrap();

        assert!(output.contains("Market research for 'test product'"));
        assert!(output.contains("No market data found."));
    }

    #[tokio::test]
    async fn test_research_command_prompt_output() {
        let config = Config { markets: Vec::new(), ..Config::default() };
        let cmd = ResearchCommand::new(config, true);

        let output = cmd
            .execute_with_engine(&offline_engine(), "test product", None, None)
            .await
            .unwrap();

        assert!(output.starts_with("MARKET DATA for 'test product'"));
        assert!(output.contains("⚠️ No market data found"));
    }
}
