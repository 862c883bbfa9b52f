//! Search client for the official marketplace Browse API.

use crate::config::Config;
use crate::ebay::auth::{AuthError, TokenCache};
use crate::price;
use crate::research::{Condition, PriceObservation, Source};
use anyhow::Result;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, info, warn};
use wreq::Client;

const DEFAULT_AUTH_URL: &str = "https://api.ebay.com/identity/v1/oauth2/token";
const DEFAULT_API_URL: &str = "https://api.ebay.com/buy/browse/v1";

/// Hard API-side cap on `limit`.
const MAX_SEARCH_LIMIT: usize = 200;

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(rename = "itemSummaries", default)]
    item_summaries: Vec<ItemSummary>,
}

#[derive(Debug, Deserialize)]
struct ItemSummary {
    #[serde(default)]
    title: String,
    price: Option<ApiPrice>,
    condition: Option<String>,
    #[serde(rename = "itemWebUrl")]
    item_web_url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiPrice {
    value: Option<String>,
    currency: Option<String>,
}

/// Authenticated Browse-API client.
///
/// Failure discipline: auth failures surface as [`AuthError`] (the caller
/// decides what an unauthenticated research run means); every other HTTP
/// failure degrades to an empty list so one bad response can never sink
/// the research fan-out.
pub struct EbayApiClient {
    client: Client,
    api_url: String,
    marketplace_id: String,
    auth: TokenCache,
}

impl EbayApiClient {
    /// Creates a client against the production API endpoints.
    pub fn new(config: &Config) -> Result<Self> {
        Self::with_urls(config, DEFAULT_AUTH_URL, DEFAULT_API_URL)
    }

    /// Creates a client against explicit endpoints (for testing).
    pub fn with_urls(config: &Config, auth_url: &str, api_url: &str) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .connect_timeout(Duration::from_secs(10))
            .build()?;

        let auth = TokenCache::new(
            client.clone(),
            auth_url,
            config.ebay_client_id.clone().unwrap_or_default(),
            config.ebay_client_secret.clone().unwrap_or_default(),
        );

        Ok(Self {
            client,
            api_url: api_url.to_string(),
            marketplace_id: config.marketplace_id.clone(),
            auth,
        })
    }

    /// Searches active listings.
    ///
    /// On a 401 the client forces exactly one re-authentication and
    /// retries; a second 401 gives up with an empty list.
    pub async fn search(
        &self,
        query: &str,
        limit: usize,
        condition: Option<Condition>,
        price_range: Option<(f64, f64)>,
    ) -> Result<Vec<PriceObservation>, AuthError> {
        let url = self.search_url(query, limit, condition, price_range);
        let mut forced_reauth = false;

        loop {
            let bearer = self.auth.bearer().await?;

            debug!("GET {}", url);
            let response = match self
                .client
                .get(&url)
                .header("Authorization", format!("Bearer {}", bearer))
                .header("X-EBAY-C-MARKETPLACE-ID", &self.marketplace_id)
                .header("X-EBAY-C-ENDUSERCTX", "contextualLocation=country=IT")
                .send()
                .await
            {
                Ok(response) => response,
                Err(e) => {
                    warn!("API search request failed: {}", e);
                    return Ok(Vec::new());
                }
            };

            let status = response.status();

            if status == 401 {
                if forced_reauth {
                    warn!("API search still unauthorized after forced re-authentication");
                    return Ok(Vec::new());
                }
                debug!("401 from search, forcing re-authentication");
                self.auth.invalidate().await;
                forced_reauth = true;
                continue;
            }

            if !status.is_success() {
                warn!("API search returned status {}", status);
                return Ok(Vec::new());
            }

            let text = match response.text().await {
                Ok(text) => text,
                Err(e) => {
                    warn!("Failed to read API search response: {}", e);
                    return Ok(Vec::new());
                }
            };

            let observations = self.parse_search_response(&text, query);
            info!("API search: {} observations for '{}'", observations.len(), query);
            return Ok(observations);
        }
    }

    /// Combined market snapshot: used listings plus a smaller new-condition
    /// sample for comparison.
    pub async fn market_data(&self, query: &str) -> Result<Vec<PriceObservation>, AuthError> {
        let mut observations = self.search(query, 15, Some(Condition::Used), None).await?;
        let new_items = self.search(query, 10, Some(Condition::New), None).await?;
        observations.extend(new_items);
        Ok(observations)
    }

    fn search_url(
        &self,
        query: &str,
        limit: usize,
        condition: Option<Condition>,
        price_range: Option<(f64, f64)>,
    ) -> String {
        let mut url = format!(
            "{}/item_summary/search?q={}&limit={}",
            self.api_url,
            urlencoding::encode(query),
            limit.min(MAX_SEARCH_LIMIT)
        );

        let mut filters = Vec::new();
        if let Some(condition) = condition {
            filters.push(format!("conditions:{{{}}}", condition.api_filter()));
        }
        if let Some((min, max)) = price_range {
            filters.push(format!("price:[{}..{}],priceCurrency:EUR", min, max));
        }
        if !filters.is_empty() {
            url.push_str("&filter=");
            url.push_str(&urlencoding::encode(&filters.join(",")).into_owned());
        }

        url
    }

    fn parse_search_response(&self, text: &str, query: &str) -> Vec<PriceObservation> {
        let response: SearchResponse = match serde_json::from_str(text) {
            Ok(response) => response,
            Err(e) => {
                warn!("Malformed API search response for '{}': {}", query, e);
                return Vec::new();
            }
        };

        response
            .item_summaries
            .into_iter()
            .filter_map(|item| {
                let price_info = item.price?;
                let value: f64 = price_info.value?.parse().ok()?;
                if !price::is_plausible(value) {
                    return None;
                }

                Some(PriceObservation {
                    source: Source::MarketplaceApi,
                    price: value,
                    currency: price_info.currency.unwrap_or_else(|| "EUR".to_string()),
                    condition: item
                        .condition
                        .as_deref()
                        .map(Condition::from_api)
                        .unwrap_or_default(),
                    url: item.item_web_url,
                    title: (!item.title.is_empty()).then_some(item.title),
                })
            })
            .collect()
    }
}

impl Condition {
    /// Browse-API condition filter value.
    pub fn api_filter(&self) -> &'static str {
        match self {
            Condition::New => "NEW",
            Condition::Used => "USED",
            Condition::Refurbished => "REFURBISHED",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn make_test_config() -> Config {
        Config {
            ebay_client_id: Some("client-id".to_string()),
            ebay_client_secret: Some("client-secret".to_string()),
            ..Config::default()
        }
    }

    async fn make_client(server: &MockServer) -> EbayApiClient {
        EbayApiClient::with_urls(
            &make_test_config(),
            &format!("{}/identity/v1/oauth2/token", server.uri()),
            &format!("{}/buy/browse/v1", server.uri()),
        )
        .unwrap()
    }

    async fn mount_token(server: &MockServer, expect: u64) {
        Mock::given(method("POST"))
            .and(path("/identity/v1/oauth2/token"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string(r#"{"access_token":"tok-1","expires_in":7200}"#),
            )
            .expect(expect)
            .mount(server)
            .await;
    }

    fn items_body() -> &'static str {
        r#"{
            "itemSummaries": [
                {
                    "itemId": "v1|1|0",
                    "title": "Nintendo Switch OLED",
                    "price": {"value": "249.90", "currency": "EUR"},
                    "condition": "USED_EXCELLENT",
                    "itemWebUrl": "https://www.ebay.it/itm/1"
                },
                {
                    "itemId": "v1|2|0",
                    "title": "Switch sticker pack",
                    "price": {"value": "2.50", "currency": "EUR"},
                    "condition": "NEW"
                },
                {
                    "itemId": "v1|3|0",
                    "title": "No price item"
                }
            ]
        }"#
    }

    #[tokio::test]
    async fn test_search_parses_and_filters_items() {
        let mock_server = MockServer::start().await;
        mount_token(&mock_server, 1).await;

        Mock::given(method("GET"))
            .and(path("/buy/browse/v1/item_summary/search"))
            .and(query_param("q", "nintendo switch"))
            .and(query_param("limit", "20"))
            .and(header("X-EBAY-C-MARKETPLACE-ID", "EBAY_IT"))
            .and(header("Authorization", "Bearer tok-1"))
            .respond_with(ResponseTemplate::new(200).set_body_string(items_body()))
            .mount(&mock_server)
            .await;

        let client = make_client(&mock_server).await;
        let observations = client.search("nintendo switch", 20, None, None).await.unwrap();

        // The 2.50 item is implausible, the third has no price
        assert_eq!(observations.len(), 1);
        assert_eq!(observations[0].price, 249.90);
        assert_eq!(observations[0].source, Source::MarketplaceApi);
        assert_eq!(observations[0].condition, Condition::Used);
        assert_eq!(observations[0].title.as_deref(), Some("Nintendo Switch OLED"));
        assert_eq!(observations[0].url.as_deref(), Some("https://www.ebay.it/itm/1"));
    }

    #[tokio::test]
    async fn test_search_condition_filter() {
        let mock_server = MockServer::start().await;
        mount_token(&mock_server, 1).await;

        Mock::given(method("GET"))
            .and(path("/buy/browse/v1/item_summary/search"))
            .and(query_param("filter", "conditions:{USED}"))
            .respond_with(ResponseTemplate::new(200).set_body_string(r#"{"itemSummaries":[]}"#))
            .expect(1)
            .mount(&mock_server)
            .await;

        let client = make_client(&mock_server).await;
        let observations =
            client.search("test", 10, Some(Condition::Used), None).await.unwrap();
        assert!(observations.is_empty());
    }

    #[tokio::test]
    async fn test_search_price_range_filter() {
        let mock_server = MockServer::start().await;
        mount_token(&mock_server, 1).await;

        Mock::given(method("GET"))
            .and(path("/buy/browse/v1/item_summary/search"))
            .and(query_param("filter", "conditions:{NEW},price:[10..500],priceCurrency:EUR"))
            .respond_with(ResponseTemplate::new(200).set_body_string(r#"{"itemSummaries":[]}"#))
            .expect(1)
            .mount(&mock_server)
            .await;

        let client = make_client(&mock_server).await;
        client
            .search("test", 10, Some(Condition::New), Some((10.0, 500.0)))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_search_limit_capped() {
        let mock_server = MockServer::start().await;
        mount_token(&mock_server, 1).await;

        Mock::given(method("GET"))
            .and(path("/buy/browse/v1/item_summary/search"))
            .and(query_param("limit", "200"))
            .respond_with(ResponseTemplate::new(200).set_body_string(r#"{"itemSummaries":[]}"#))
            .expect(1)
            .mount(&mock_server)
            .await;

        let client = make_client(&mock_server).await;
        client.search("test", 1000, None, None).await.unwrap();
    }

    #[tokio::test]
    async fn test_search_401_retries_once_then_succeeds() {
        let mock_server = MockServer::start().await;
        // Initial grant plus the forced re-authentication
        mount_token(&mock_server, 2).await;

        Mock::given(method("GET"))
            .and(path("/buy/browse/v1/item_summary/search"))
            .respond_with(ResponseTemplate::new(401))
            .up_to_n_times(1)
            .mount(&mock_server)
            .await;

        Mock::given(method("GET"))
            .and(path("/buy/browse/v1/item_summary/search"))
            .respond_with(ResponseTemplate::new(200).set_body_string(items_body()))
            .mount(&mock_server)
            .await;

        let client = make_client(&mock_server).await;
        let observations = client.search("nintendo switch", 20, None, None).await.unwrap();
        assert_eq!(observations.len(), 1);
    }

    #[tokio::test]
    async fn test_search_persistent_401_gives_up_empty() {
        let mock_server = MockServer::start().await;
        // Exactly one forced re-authentication, never more
        mount_token(&mock_server, 2).await;

        Mock::given(method("GET"))
            .and(path("/buy/browse/v1/item_summary/search"))
            .respond_with(ResponseTemplate::new(401))
            .expect(2)
            .mount(&mock_server)
            .await;

        let client = make_client(&mock_server).await;
        let observations = client.search("test", 10, None, None).await.unwrap();
        assert!(observations.is_empty());
    }

    #[tokio::test]
    async fn test_search_server_error_yields_empty() {
        let mock_server = MockServer::start().await;
        mount_token(&mock_server, 1).await;

        Mock::given(method("GET"))
            .and(path("/buy/browse/v1/item_summary/search"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&mock_server)
            .await;

        let client = make_client(&mock_server).await;
        let observations = client.search("test", 10, None, None).await.unwrap();
        assert!(observations.is_empty());
    }

    #[tokio::test]
    async fn test_search_malformed_body_yields_empty() {
        let mock_server = MockServer::start().await;
        mount_token(&mock_server, 1).await;

        Mock::given(method("GET"))
            .and(path("/buy/browse/v1/item_summary/search"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>not json</html>"))
            .mount(&mock_server)
            .await;

        let client = make_client(&mock_server).await;
        let observations = client.search("test", 10, None, None).await.unwrap();
        assert!(observations.is_empty());
    }

    #[tokio::test]
    async fn test_search_missing_credentials_surfaces_auth_error() {
        let mock_server = MockServer::start().await;
        let config = Config::default();
        let client = EbayApiClient::with_urls(
            &config,
            &format!("{}/identity/v1/oauth2/token", mock_server.uri()),
            &format!("{}/buy/browse/v1", mock_server.uri()),
        )
        .unwrap();

        let err = client.search("test", 10, None, None).await.unwrap_err();
        assert!(matches!(err, AuthError::MissingCredentials));
    }

    #[tokio::test]
    async fn test_market_data_merges_used_and_new() {
        let mock_server = MockServer::start().await;
        mount_token(&mock_server, 1).await;

        Mock::given(method("GET"))
            .and(path("/buy/browse/v1/item_summary/search"))
            .and(query_param("filter", "conditions:{USED}"))
            .respond_with(ResponseTemplate::new(200).set_body_string(
                r#"{"itemSummaries":[{"title":"A","price":{"value":"100.0","currency":"EUR"},"condition":"USED"}]}"#,
            ))
            .mount(&mock_server)
            .await;

        Mock::given(method("GET"))
            .and(path("/buy/browse/v1/item_summary/search"))
            .and(query_param("filter", "conditions:{NEW}"))
            .respond_with(ResponseTemplate::new(200).set_body_string(
                r#"{"itemSummaries":[{"title":"B","price":{"value":"150.0","currency":"EUR"},"condition":"NEW"}]}"#,
            ))
            .mount(&mock_server)
            .await;

        let client = make_client(&mock_server).await;
        let observations = client.market_data("test").await.unwrap();
        assert_eq!(observations.len(), 2);
        assert_eq!(observations[0].condition, Condition::Used);
        assert_eq!(observations[1].condition, Condition::New);
    }
}
