//! Document fetching for scraped sources.
//!
//! Scraped marketplaces are consumed as opaque HTML through the
//! [`PageFetcher`] capability. The production implementation routes
//! through a scraping gateway when an API key is configured and falls
//! back to direct requests with browser impersonation otherwise.

use crate::config::Config;
use anyhow::{Context, Result};
use async_trait::async_trait;
use rand::RngExt;
use std::time::Duration;
use tracing::{debug, warn};
use wreq::Client;
use wreq_util::Emulation;

/// Accept-Language for direct requests; the home market is Italy.
const ACCEPT_LANGUAGE: &str = "it-IT,it;q=0.9,en;q=0.8";

/// Capability for obtaining raw document content from a URL.
/// Implemented by the gateway client here and by mocks in tests.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    /// Fetches the document body at `url`.
    async fn fetch(&self, url: &str) -> Result<String>;
}

/// HTTP fetcher with gateway routing, browser impersonation, and
/// human-like request pacing.
pub struct GatewayFetcher {
    client: Client,
    gateway_url: Option<String>,
    gateway_api_key: Option<String>,
    delay_ms: u64,
    delay_jitter_ms: u64,
}

impl GatewayFetcher {
    /// Creates a fetcher from configuration.
    pub fn new(config: &Config) -> Result<Self> {
        let mut builder = Client::builder()
            .cookie_store(true)
            .gzip(true)
            .brotli(true)
            .timeout(Duration::from_secs(30))
            .connect_timeout(Duration::from_secs(10));

        if let Some(proxy_url) = &config.proxy {
            debug!("Configuring proxy: {}", proxy_url);
            let proxy = wreq::Proxy::all(proxy_url).context("Failed to configure proxy")?;
            builder = builder.proxy(proxy);
        }

        let client = builder.build()?;

        Ok(Self {
            client,
            gateway_url: config.gateway_api_key.as_ref().map(|_| config.gateway_url.clone()),
            gateway_api_key: config.gateway_api_key.clone(),
            delay_ms: config.delay_ms,
            delay_jitter_ms: config.delay_jitter_ms,
        })
    }

    /// Creates a fetcher routed through a specific gateway (for testing).
    pub fn with_gateway(gateway_url: impl Into<String>, api_key: impl Into<String>) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .connect_timeout(Duration::from_secs(10))
            .build()?;

        Ok(Self {
            client,
            gateway_url: Some(gateway_url.into()),
            gateway_api_key: Some(api_key.into()),
            delay_ms: 0,
            delay_jitter_ms: 0,
        })
    }

    /// Adds a random delay to mimic human behavior.
    async fn delay(&self) {
        if self.delay_ms == 0 {
            return;
        }

        let jitter = if self.delay_jitter_ms > 0 {
            rand::rng().random_range(0..=self.delay_jitter_ms)
        } else {
            0
        };

        let total_delay = self.delay_ms + jitter;
        debug!("Delaying {}ms", total_delay);
        tokio::time::sleep(Duration::from_millis(total_delay)).await;
    }

    async fn fetch_via_gateway(&self, gateway: &str, key: &str, url: &str) -> Result<String> {
        debug!("GET {} (via gateway)", url);

        let gateway_url = format!(
            "{}/?api_key={}&url={}&render=false",
            gateway.trim_end_matches('/'),
            urlencoding::encode(key),
            urlencoding::encode(url)
        );

        let response = self
            .client
            .get(&gateway_url)
            .send()
            .await
            .context("Failed to send gateway request")?;

        let status = response.status();
        if !status.is_success() {
            anyhow::bail!("Gateway returned status: {}", status);
        }

        response.text().await.context("Failed to read gateway response body")
    }

    async fn fetch_direct(&self, url: &str) -> Result<String> {
        debug!("GET {}", url);

        let response = self
            .client
            .get(url)
            .emulation(Emulation::Chrome131)
            .header("Accept", "text/html,application/xhtml+xml,application/xml;q=0.9,image/avif,image/webp,image/apng,*/*;q=0.8")
            .header("Accept-Language", ACCEPT_LANGUAGE)
            .header("Accept-Encoding", "gzip, deflate, br")
            .header("Cache-Control", "no-cache")
            .header("Upgrade-Insecure-Requests", "1")
            .send()
            .await
            .context("Failed to send request")?;

        let status = response.status();
        debug!("Response status: {}", status);

        if status == 503 {
            warn!("Rate limited (503). Consider a gateway key or a longer delay.");
            anyhow::bail!("Rate limited by source. Try increasing --delay or using a gateway.");
        }

        if !status.is_success() {
            anyhow::bail!("Request failed with status: {}", status);
        }

        response.text().await.context("Failed to read response body")
    }
}

#[async_trait]
impl PageFetcher for GatewayFetcher {
    async fn fetch(&self, url: &str) -> Result<String> {
        self.delay().await;

        match (&self.gateway_url, &self.gateway_api_key) {
            (Some(gateway), Some(key)) => self.fetch_via_gateway(gateway, key, url).await,
            _ => self.fetch_direct(url).await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_fetch_via_gateway() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/"))
            .and(query_param("api_key", "test-key"))
            .and(query_param("url", "https://www.example.test/listing"))
            .and(query_param("render", "false"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>ok</html>"))
            .mount(&mock_server)
            .await;

        let fetcher = GatewayFetcher::with_gateway(mock_server.uri(), "test-key").unwrap();
        let body = fetcher.fetch("https://www.example.test/listing").await.unwrap();
        assert_eq!(body, "<html>ok</html>");
    }

    #[tokio::test]
    async fn test_fetch_gateway_error_status() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&mock_server)
            .await;

        let fetcher = GatewayFetcher::with_gateway(mock_server.uri(), "test-key").unwrap();
        let result = fetcher.fetch("https://www.example.test/listing").await;
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("500"));
    }

    #[tokio::test]
    async fn test_fetch_direct_when_no_gateway() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/page"))
            .respond_with(ResponseTemplate::new(200).set_body_string("direct"))
            .mount(&mock_server)
            .await;

        let config = Config { delay_ms: 0, delay_jitter_ms: 0, ..Config::default() };
        let fetcher = GatewayFetcher::new(&config).unwrap();
        let body = fetcher.fetch(&format!("{}/page", mock_server.uri())).await.unwrap();
        assert_eq!(body, "direct");
    }

    #[tokio::test]
    async fn test_fetch_direct_rate_limited() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/page"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&mock_server)
            .await;

        let config = Config { delay_ms: 0, delay_jitter_ms: 0, ..Config::default() };
        let fetcher = GatewayFetcher::new(&config).unwrap();
        let result = fetcher.fetch(&format!("{}/page", mock_server.uri())).await;
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("Rate limited"));
    }
}
