//! International comparison results and arbitrage economics.

use crate::intl::markets::Market;
use crate::research::Condition;
use serde::{Deserialize, Serialize};

/// VAT applied to imports from outside the trade bloc.
pub const VAT_RATE: f64 = 0.22;

/// Customs duty applied on top of VAT above the duty-free threshold.
pub const DUTY_RATE: f64 = 0.05;

/// Landed value (price + shipping) above which duty kicks in, in EUR.
pub const DUTY_FREE_THRESHOLD: f64 = 150.0;

/// Shipping fallback when a market has no inbound estimate, in EUR.
pub const DEFAULT_IMPORT_SHIPPING: f64 = 15.0;

/// Margin percentage an import must clear to count as profitable.
pub const IMPORT_MARGIN_THRESHOLD: f64 = 20.0;

/// Margin percentage an export must clear; higher than the import bar to
/// reflect the added risk of selling abroad.
pub const EXPORT_MARGIN_THRESHOLD: f64 = 25.0;

/// Marketplace fee taken off an export sale.
pub const MARKETPLACE_FEE_RATE: f64 = 0.13;

/// Outbound shipping estimate to far markets (US, JP), in EUR.
const EXPORT_SHIPPING_FAR: f64 = 20.0;

/// Outbound shipping estimate within Europe, in EUR.
const EXPORT_SHIPPING_NEAR: f64 = 12.0;

/// Averaged price reading for one market.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PriceSample {
    pub market: Market,
    pub currency: String,
    /// Average price in the market's local currency.
    pub local_price: f64,
    /// Local price converted with the market's static FX rate.
    pub eur_price: f64,
    /// Flat inbound shipping estimate, in EUR.
    pub shipping_to_home: f64,
    pub condition: Condition,
}

impl PriceSample {
    /// Builds a sample from a local-currency price, deriving the EUR
    /// conversion and shipping from the market profile.
    pub fn new(market: Market, local_price: f64, condition: Condition) -> Self {
        Self {
            market,
            currency: market.currency().to_string(),
            local_price,
            eur_price: local_price * market.fx_rate_to_eur(),
            shipping_to_home: market.shipping_to_home(),
            condition,
        }
    }
}

/// Price samples across markets for one query.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InternationalComparison {
    pub query: String,
    pub samples: Vec<PriceSample>,
}

/// Import economics: buy abroad, sell at home.
#[derive(Debug, Clone, Serialize)]
pub struct ImportOpportunity {
    pub source_market: Market,
    pub buy_price: f64,
    pub shipping: f64,
    pub customs: f64,
    pub landed_cost: f64,
    pub sell_price: f64,
    pub margin: f64,
    pub margin_pct: f64,
    pub profitable: bool,
}

/// Export economics: buy at home, sell abroad.
#[derive(Debug, Clone, Serialize)]
pub struct ExportOpportunity {
    pub target_market: Market,
    pub buy_price: f64,
    pub sell_price: f64,
    pub shipping: f64,
    pub fees: f64,
    pub net_revenue: f64,
    pub margin: f64,
    pub margin_pct: f64,
    pub profitable: bool,
}

impl InternationalComparison {
    /// The home-market sample, when present.
    pub fn home(&self) -> Option<&PriceSample> {
        self.samples.iter().find(|s| s.market == Market::HOME)
    }

    /// Cheapest market to buy from, landed shipping included.
    pub fn cheapest(&self) -> Option<&PriceSample> {
        self.samples.iter().min_by(|a, b| {
            (a.eur_price + a.shipping_to_home)
                .total_cmp(&(b.eur_price + b.shipping_to_home))
        })
    }

    /// Dearest market, the export side of the ledger.
    pub fn most_expensive(&self) -> Option<&PriceSample> {
        self.samples.iter().max_by(|a, b| a.eur_price.total_cmp(&b.eur_price))
    }

    /// Computes the import play against a target home-market sell price.
    ///
    /// Landed cost = price + shipping, loaded with VAT (and duty above the
    /// duty-free threshold) when the source market sits outside the trade
    /// bloc. Intra-bloc imports carry no customs loading.
    pub fn import_opportunity(&self, home_sell_price: f64) -> Option<ImportOpportunity> {
        let cheapest = self.cheapest()?;

        let shipping = if cheapest.shipping_to_home > 0.0 {
            cheapest.shipping_to_home
        } else {
            DEFAULT_IMPORT_SHIPPING
        };

        let pre_customs = cheapest.eur_price + shipping;
        let customs = if cheapest.market.in_trade_bloc() {
            0.0
        } else if pre_customs > DUTY_FREE_THRESHOLD {
            pre_customs * (VAT_RATE + DUTY_RATE)
        } else {
            pre_customs * VAT_RATE
        };

        let landed_cost = pre_customs + customs;
        let margin = home_sell_price - landed_cost;
        let margin_pct = if landed_cost > 0.0 { margin / landed_cost * 100.0 } else { 0.0 };

        Some(ImportOpportunity {
            source_market: cheapest.market,
            buy_price: cheapest.eur_price,
            shipping,
            customs,
            landed_cost,
            sell_price: home_sell_price,
            margin,
            margin_pct,
            profitable: margin_pct > IMPORT_MARGIN_THRESHOLD,
        })
    }

    /// Computes the export play against a home-market buy price.
    pub fn export_opportunity(&self, home_buy_price: f64) -> Option<ExportOpportunity> {
        let target = self
            .samples
            .iter()
            .filter(|s| s.market != Market::HOME)
            .max_by(|a, b| a.eur_price.total_cmp(&b.eur_price))?;

        let shipping = match target.market {
            Market::Us | Market::Jp => EXPORT_SHIPPING_FAR,
            _ => EXPORT_SHIPPING_NEAR,
        };

        let fees = target.eur_price * MARKETPLACE_FEE_RATE;
        let net_revenue = target.eur_price - fees - shipping;
        let margin = net_revenue - home_buy_price;
        let margin_pct = if home_buy_price > 0.0 { margin / home_buy_price * 100.0 } else { 0.0 };

        Some(ExportOpportunity {
            target_market: target.market,
            buy_price: home_buy_price,
            sell_price: target.eur_price,
            shipping,
            fees,
            net_revenue,
            margin,
            margin_pct,
            profitable: margin_pct > EXPORT_MARGIN_THRESHOLD,
        })
    }

    /// Prompt-context section; empty string when no market reported.
    pub fn to_prompt_context(&self) -> String {
        if self.samples.is_empty() {
            return String::new();
        }

        let mut lines = vec![format!("\n🌍 INTERNATIONAL COMPARISON for '{}':", self.query)];

        let mut sorted: Vec<&PriceSample> = self.samples.iter().collect();
        sorted.sort_by(|a, b| a.eur_price.total_cmp(&b.eur_price));

        for sample in sorted.iter().take(5) {
            let shipping_info = if sample.shipping_to_home > 0.0 {
                format!(" (+€{:.0} ship.)", sample.shipping_to_home)
            } else {
                String::new()
            };
            lines.push(format!(
                "   {} {}: €{:.0}{}",
                sample.market.flag(),
                sample.market.name(),
                sample.eur_price,
                shipping_info
            ));
        }

        if let (Some(cheapest), Some(home)) = (self.cheapest(), self.home()) {
            let saving = home.eur_price - cheapest.eur_price;
            if saving > 20.0 {
                lines.push(format!(
                    "\n   💡 IMPORT: save €{:.0} buying from {}",
                    saving,
                    cheapest.market.name()
                ));
            }
        }

        lines.join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn comparison(samples: Vec<PriceSample>) -> InternationalComparison {
        InternationalComparison { query: "test".to_string(), samples }
    }

    fn sample(market: Market, eur_price: f64) -> PriceSample {
        // Local price chosen so the static FX rate lands on eur_price
        PriceSample::new(market, eur_price / market.fx_rate_to_eur(), Condition::Used)
    }

    #[test]
    fn test_sample_fx_conversion() {
        let us = PriceSample::new(Market::Us, 100.0, Condition::Used);
        assert_eq!(us.eur_price, 92.0);
        assert_eq!(us.currency, "USD");
        assert_eq!(us.shipping_to_home, 25.0);

        let jp = PriceSample::new(Market::Jp, 10_000.0, Condition::Used);
        assert!((jp.eur_price - 62.0).abs() < 1e-9);
    }

    #[test]
    fn test_cheapest_includes_shipping() {
        // DE: 100 + 10 = 110 landed; UK: 98 + 15 = 113 landed
        let cmp = comparison(vec![sample(Market::De, 100.0), sample(Market::Uk, 98.0)]);
        assert_eq!(cmp.cheapest().unwrap().market, Market::De);
        // most_expensive ranks by bare price, shipping excluded
        assert_eq!(cmp.most_expensive().unwrap().market, Market::De);
    }

    #[test]
    fn test_import_vat_only_below_duty_threshold() {
        // 120 + 15 shipping = 135 landed pre-customs, under the 150 bar:
        // VAT only, no duty
        let cmp = comparison(vec![sample(Market::Uk, 120.0)]);
        let opp = cmp.import_opportunity(200.0).unwrap();

        assert_eq!(opp.source_market, Market::Uk);
        assert_eq!(opp.shipping, 15.0);
        assert!((opp.customs - 135.0 * 0.22).abs() < 1e-9);
        assert!((opp.landed_cost - 164.7).abs() < 1e-9);
        assert!((opp.margin - 35.3).abs() < 1e-9);
        assert!(opp.margin_pct > 20.0 && opp.margin_pct < 22.0);
        assert!(opp.profitable);
    }

    #[test]
    fn test_import_vat_plus_duty_above_threshold() {
        // 150 + 25 shipping = 175 landed pre-customs, above the bar:
        // VAT + duty
        let cmp = comparison(vec![sample(Market::Us, 150.0)]);
        let opp = cmp.import_opportunity(200.0).unwrap();

        assert!((opp.customs - 175.0 * 0.27).abs() < 1e-9);
        assert!((opp.landed_cost - 222.25).abs() < 1e-9);
        assert!(opp.margin < 0.0);
        assert!(!opp.profitable);
    }

    #[test]
    fn test_import_intra_bloc_no_customs() {
        let cmp = comparison(vec![sample(Market::De, 100.0)]);
        let opp = cmp.import_opportunity(160.0).unwrap();

        assert_eq!(opp.customs, 0.0);
        assert_eq!(opp.landed_cost, 110.0);
        assert!((opp.margin_pct - 45.454545454545453).abs() < 1e-9);
        assert!(opp.profitable);
    }

    #[test]
    fn test_import_shipping_fallback() {
        // The home market ships for free; the flat fallback applies
        let cmp = comparison(vec![sample(Market::It, 100.0)]);
        let opp = cmp.import_opportunity(150.0).unwrap();
        assert_eq!(opp.shipping, DEFAULT_IMPORT_SHIPPING);
        assert_eq!(opp.customs, 0.0);
    }

    #[test]
    fn test_import_unprofitable_below_threshold() {
        // Margin lands under the 20% bar
        let cmp = comparison(vec![sample(Market::De, 100.0)]);
        let opp = cmp.import_opportunity(120.0).unwrap();
        assert!(opp.margin > 0.0);
        assert!(opp.margin_pct < IMPORT_MARGIN_THRESHOLD);
        assert!(!opp.profitable);
    }

    #[test]
    fn test_import_empty_comparison() {
        let cmp = comparison(Vec::new());
        assert!(cmp.import_opportunity(100.0).is_none());
    }

    #[test]
    fn test_export_to_dearest_foreign_market() {
        let cmp = comparison(vec![
            sample(Market::It, 150.0),
            sample(Market::Us, 200.0),
            sample(Market::De, 170.0),
        ]);
        let opp = cmp.export_opportunity(100.0).unwrap();

        assert_eq!(opp.target_market, Market::Us);
        assert!((opp.fees - 26.0).abs() < 1e-9);
        assert_eq!(opp.shipping, 20.0);
        assert!((opp.net_revenue - 154.0).abs() < 1e-9);
        assert!((opp.margin - 54.0).abs() < 1e-9);
        assert!((opp.margin_pct - 54.0).abs() < 1e-9);
        assert!(opp.profitable);
    }

    #[test]
    fn test_export_near_market_shipping() {
        let cmp = comparison(vec![sample(Market::De, 200.0)]);
        let opp = cmp.export_opportunity(150.0).unwrap();
        assert_eq!(opp.shipping, 12.0);
        // 200 - 26 - 12 = 162 net; margin 12 on 150 = 8% — under the bar
        assert!(!opp.profitable);
    }

    #[test]
    fn test_export_ignores_home_market() {
        let cmp = comparison(vec![sample(Market::It, 500.0)]);
        assert!(cmp.export_opportunity(100.0).is_none());
    }

    #[test]
    fn test_prompt_context() {
        let cmp = comparison(vec![
            sample(Market::It, 200.0),
            sample(Market::Us, 120.0),
            sample(Market::De, 150.0),
        ]);

        let context = cmp.to_prompt_context();
        assert!(context.contains("🌍 INTERNATIONAL COMPARISON for 'test'"));
        assert!(context.contains("🇺🇸 United States: €120 (+€25 ship.)"));
        assert!(context.contains("🇮🇹 Italy: €200"));
        // Home is €80 dearer than the US sample
        assert!(context.contains("💡 IMPORT: save €80 buying from United States"));
        // Sorted ascending by EUR price
        let us = context.find("United States").unwrap();
        let de = context.find("Germany").unwrap();
        let it = context.find("Italy").unwrap();
        assert!(us < de && de < it);
    }

    #[test]
    fn test_prompt_context_empty() {
        assert_eq!(comparison(Vec::new()).to_prompt_context(), "");
    }

    #[test]
    fn test_prompt_context_no_hint_for_small_saving() {
        let cmp = comparison(vec![sample(Market::It, 110.0), sample(Market::De, 100.0)]);
        assert!(!cmp.to_prompt_context().contains("💡"));
    }
}
