//! Canonical data model for market research results.

use crate::catalog::CatalogResult;
use crate::intl::InternationalComparison;
use serde::{Deserialize, Serialize};

/// Where a price observation came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Source {
    /// Official marketplace Browse API (authenticated).
    MarketplaceApi,
    /// Scraped completed/sold listings.
    SoldListings,
    /// Scraped active listings.
    ActiveListings,
    /// Scraped general-merchandise retail results.
    Merchandise,
    /// Scraped shopping-aggregator results (least reliable).
    Shopping,
    /// Specialty collector-pricing catalog.
    Catalog,
    /// International storefront sample.
    International,
}

/// Item condition attached to an observation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Condition {
    New,
    #[default]
    Used,
    Refurbished,
}

impl Condition {
    /// Lenient mapping from API condition strings
    /// ("USED_EXCELLENT", "NEW_WITH_TAGS", ...). Unknown values are Used.
    pub fn from_api(s: &str) -> Self {
        let upper = s.to_uppercase();
        if upper.contains("REFURB") {
            Condition::Refurbished
        } else if upper.contains("NEW") {
            Condition::New
        } else {
            Condition::Used
        }
    }

    /// Marketplace condition-id used in listing query URLs.
    pub fn listing_filter_id(&self) -> u32 {
        match self {
            Condition::New => 1000,
            Condition::Used | Condition::Refurbished => 3000,
        }
    }
}

/// One normalized price reading from a single source for a single listing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PriceObservation {
    pub source: Source,
    pub price: f64,
    pub currency: String,
    pub condition: Condition,
    pub url: Option<String>,
    pub title: Option<String>,
}

impl PriceObservation {
    /// Creates an observation with no URL/title metadata.
    pub fn bare(source: Source, price: f64, condition: Condition) -> Self {
        Self { source, price, currency: "EUR".to_string(), condition, url: None, title: None }
    }
}

/// Derived statistics for one observation group. Computed on demand,
/// never stored.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PriceStats {
    pub mean: f64,
    pub min: f64,
    pub max: f64,
    pub count: usize,
}

impl PriceStats {
    /// Computes stats over a group; `None` for an empty group.
    pub fn of(observations: &[PriceObservation]) -> Option<Self> {
        if observations.is_empty() {
            return None;
        }
        let mut min = f64::INFINITY;
        let mut max = f64::NEG_INFINITY;
        let mut sum = 0.0;
        for obs in observations {
            min = min.min(obs.price);
            max = max.max(obs.price);
            sum += obs.price;
        }
        Some(Self { mean: sum / observations.len() as f64, min, max, count: observations.len() })
    }
}

/// Aggregated market research for one normalized query.
///
/// Built fresh per research call and immutable once returned. Any group
/// may be empty; a fully-empty result means "no market signal" and is a
/// valid outcome callers must handle.
#[derive(Debug, Clone, Serialize)]
pub struct MarketResearch {
    pub query: String,
    /// Listings from the authenticated marketplace API.
    pub api_listings: Vec<PriceObservation>,
    /// Scraped completed/sold listings.
    pub sold_listings: Vec<PriceObservation>,
    /// Scraped active listings.
    pub active_listings: Vec<PriceObservation>,
    /// Scraped retail merchandise results (new condition).
    pub merchandise: Vec<PriceObservation>,
    /// Shopping-aggregator readings.
    pub shopping: Vec<PriceObservation>,
    /// Collector-pricing catalog match, when the product qualifies.
    pub catalog: Option<CatalogResult>,
    /// International storefront comparison.
    pub international: Option<InternationalComparison>,
}

impl MarketResearch {
    /// Creates an empty result for a query.
    pub fn empty(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            api_listings: Vec::new(),
            sold_listings: Vec::new(),
            active_listings: Vec::new(),
            merchandise: Vec::new(),
            shopping: Vec::new(),
            catalog: None,
            international: None,
        }
    }

    pub fn api_stats(&self) -> Option<PriceStats> {
        PriceStats::of(&self.api_listings)
    }

    pub fn sold_stats(&self) -> Option<PriceStats> {
        PriceStats::of(&self.sold_listings)
    }

    pub fn active_stats(&self) -> Option<PriceStats> {
        PriceStats::of(&self.active_listings)
    }

    pub fn merchandise_stats(&self) -> Option<PriceStats> {
        PriceStats::of(&self.merchandise)
    }

    pub fn shopping_stats(&self) -> Option<PriceStats> {
        PriceStats::of(&self.shopping)
    }

    /// True when every group came back empty.
    pub fn is_empty(&self) -> bool {
        self.api_listings.is_empty()
            && self.sold_listings.is_empty()
            && self.active_listings.is_empty()
            && self.merchandise.is_empty()
            && self.shopping.is_empty()
            && self.catalog.as_ref().map_or(true, |c| c.products.is_empty())
            && self.international.as_ref().map_or(true, |i| i.samples.is_empty())
    }

    /// Renders the fixed-format context block injected verbatim into the
    /// analysis model's prompt.
    ///
    /// Section order and headers are part of the downstream contract:
    /// the model's output shifts when they change, so treat any edit here
    /// as an interface change.
    pub fn to_prompt_context(&self) -> String {
        let mut lines = vec![format!("MARKET DATA for '{}':", self.query)];

        if let Some(stats) = self.api_stats() {
            lines.push(format!("\n🏷️ MARKETPLACE API ({} listings):", stats.count));
            lines.push(format!("   - Average: €{:.0}", stats.mean));
            lines.push(format!("   - Range: €{:.0} - €{:.0}", stats.min, stats.max));
        }

        if let Some(stats) = self.sold_stats() {
            lines.push("\n📊 SOLD LISTINGS (real sale prices):".to_string());
            lines.push(format!("   - Average: €{:.0}", stats.mean));
            lines.push(format!("   - Range: €{:.0} - €{:.0}", stats.min, stats.max));
            lines.push(format!("   - Sample: {} recent sales", stats.count));
        }

        if let Some(stats) = self.active_stats() {
            lines.push("\n📦 ACTIVE LISTINGS (current asking prices):".to_string());
            lines.push(format!("   - Average asking: €{:.0}", stats.mean));
            lines.push(format!("   - {} active listings", stats.count));
        }

        if let Some(stats) = self.merchandise_stats() {
            lines.push("\n🛒 RETAIL (new):".to_string());
            lines.push(format!("   - Average: €{:.0}", stats.mean));
            lines.push(format!("   - {} results", stats.count));
        }

        if let Some(stats) = self.shopping_stats() {
            lines.push("\n🔍 SHOPPING AGGREGATOR:".to_string());
            lines.push(format!("   - Lowest: €{:.0}", stats.min));
            lines.push(format!("   - Average: €{:.0}", stats.mean));
        }

        if let Some(catalog) = &self.catalog {
            let section = catalog.to_prompt_context();
            if !section.is_empty() {
                lines.push(section);
            }
        }

        if let Some(intl) = &self.international {
            let section = intl.to_prompt_context();
            if !section.is_empty() {
                lines.push(section);
            }
        }

        if self.is_empty() {
            lines.push("\n⚠️ No market data found - rely on prior knowledge".to_string());
        }

        lines.join("\n")
    }
}
