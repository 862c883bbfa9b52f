//! arb-scout - Market price research and arbitrage decision engine
//!
//! Fans out over multiple price sources (official marketplace API,
//! scraped marketplaces, collector catalog, international storefronts),
//! normalizes everything into one model, computes import/export
//! economics, and validates the analysis model's answer into a bounded
//! decision record.

pub mod catalog;
pub mod commands;
pub mod config;
pub mod decision;
pub mod ebay;
pub mod fetch;
pub mod format;
pub mod intl;
pub mod price;
pub mod research;
pub mod scrape;

pub use config::Config;
pub use decision::{parse_decision, DecisionPayload, Recommendation};
pub use intl::{InternationalComparison, Market};
pub use research::{Condition, MarketResearch, PriceObservation, ResearchEngine, Source};
