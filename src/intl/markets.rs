//! International market profiles.
//!
//! Each market carries the constants the comparator needs: marketplace
//! domain, currency, a static FX rate to EUR, and a flat shipping
//! estimate toward the home market. Static rates are a deliberate
//! simplification; refresh them here when they drift too far.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Supported marketplace countries. Italy is the home market.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Market {
    It,
    Us,
    Uk,
    De,
    Fr,
    Jp,
}

impl Market {
    /// The home market all economics are computed against.
    pub const HOME: Market = Market::It;

    /// Human-readable country name.
    pub fn name(&self) -> &'static str {
        match self {
            Market::It => "Italy",
            Market::Us => "United States",
            Market::Uk => "United Kingdom",
            Market::De => "Germany",
            Market::Fr => "France",
            Market::Jp => "Japan",
        }
    }

    /// Marketplace domain for this country's storefront. Japan has no
    /// dedicated storefront and is reached through the US one with a
    /// location filter.
    pub fn domain(&self) -> &'static str {
        match self {
            Market::It => "ebay.it",
            Market::Us | Market::Jp => "ebay.com",
            Market::Uk => "ebay.co.uk",
            Market::De => "ebay.de",
            Market::Fr => "ebay.fr",
        }
    }

    pub fn currency(&self) -> &'static str {
        match self {
            Market::It | Market::De | Market::Fr => "EUR",
            Market::Us => "USD",
            Market::Uk => "GBP",
            Market::Jp => "JPY",
        }
    }

    /// Static conversion rate from the local currency to EUR.
    pub fn fx_rate_to_eur(&self) -> f64 {
        match self {
            Market::It | Market::De | Market::Fr => 1.0,
            Market::Us => 0.92,
            Market::Uk => 1.17,
            Market::Jp => 0.0062,
        }
    }

    /// Flat shipping estimate toward the home market, in EUR.
    pub fn shipping_to_home(&self) -> f64 {
        match self {
            Market::It => 0.0,
            Market::Us => 25.0,
            Market::Uk => 15.0,
            Market::De | Market::Fr => 10.0,
            Market::Jp => 35.0,
        }
    }

    /// Whether inter-trade with the home market is duty-free.
    pub fn in_trade_bloc(&self) -> bool {
        matches!(self, Market::It | Market::De | Market::Fr)
    }

    pub fn flag(&self) -> &'static str {
        match self {
            Market::It => "🇮🇹",
            Market::Us => "🇺🇸",
            Market::Uk => "🇬🇧",
            Market::De => "🇩🇪",
            Market::Fr => "🇫🇷",
            Market::Jp => "🇯🇵",
        }
    }

    /// All supported markets.
    pub fn all() -> &'static [Market] {
        &[Market::It, Market::Us, Market::Uk, Market::De, Market::Fr, Market::Jp]
    }
}

impl fmt::Display for Market {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let code = match self {
            Market::It => "it",
            Market::Us => "us",
            Market::Uk => "uk",
            Market::De => "de",
            Market::Fr => "fr",
            Market::Jp => "jp",
        };
        write!(f, "{}", code)
    }
}

#[derive(Debug, Clone, Error)]
#[error("Unknown market '{0}'. Valid markets: it, us, uk, de, fr, jp")]
pub struct MarketParseError(String);

impl FromStr for Market {
    type Err = MarketParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "it" | "italy" => Ok(Market::It),
            "us" | "usa" | "united states" => Ok(Market::Us),
            "uk" | "gb" | "united kingdom" => Ok(Market::Uk),
            "de" | "germany" => Ok(Market::De),
            "fr" | "france" => Ok(Market::Fr),
            "jp" | "japan" => Ok(Market::Jp),
            _ => Err(MarketParseError(s.to_string())),
        }
    }
}
