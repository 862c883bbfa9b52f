//! Data models for the collector-pricing catalog.

use serde::{Deserialize, Serialize};

/// Fixed conversion for the catalog's native USD pricing. A static rate
/// is deliberate: the hot path takes no live-FX dependency.
pub const USD_TO_EUR: f64 = 0.92;

/// Tiered pricing for one catalog product: loose (item only), complete
/// (boxed with inserts), new (sealed). Any tier can be missing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PriceTiers {
    pub product_id: String,
    pub product_name: String,
    /// Platform/line the product belongs to (derived from the catalog URL).
    pub console: String,
    pub loose_usd: Option<f64>,
    pub complete_usd: Option<f64>,
    pub new_usd: Option<f64>,
    pub loose_eur: Option<f64>,
    pub complete_eur: Option<f64>,
    pub new_eur: Option<f64>,
    pub product_url: Option<String>,
}

impl PriceTiers {
    /// Builds tiers from USD values, deriving the EUR conversions.
    pub fn from_usd(
        product_id: impl Into<String>,
        product_name: impl Into<String>,
        console: impl Into<String>,
        loose: Option<f64>,
        complete: Option<f64>,
        new: Option<f64>,
    ) -> Self {
        Self {
            product_id: product_id.into(),
            product_name: product_name.into(),
            console: console.into(),
            loose_usd: loose,
            complete_usd: complete,
            new_usd: new,
            loose_eur: loose.map(|p| p * USD_TO_EUR),
            complete_eur: complete.map(|p| p * USD_TO_EUR),
            new_eur: new.map(|p| p * USD_TO_EUR),
            product_url: None,
        }
    }
}

/// Catalog search result.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogResult {
    pub query: String,
    pub products: Vec<PriceTiers>,
}

impl CatalogResult {
    /// Most relevant product (the catalog returns best matches first).
    pub fn best_match(&self) -> Option<&PriceTiers> {
        self.products.first()
    }

    pub fn avg_loose_eur(&self) -> Option<f64> {
        avg(self.products.iter().filter_map(|p| p.loose_eur))
    }

    pub fn avg_complete_eur(&self) -> Option<f64> {
        avg(self.products.iter().filter_map(|p| p.complete_eur))
    }

    /// Prompt-context section; empty string when there is nothing to say.
    pub fn to_prompt_context(&self) -> String {
        let Some(best) = self.best_match() else {
            return String::new();
        };

        let mut lines = vec![format!("\n🎮 CATALOG (collector pricing) for '{}':", self.query)];
        lines.push(format!("   Product: {}", best.product_name));
        if !best.console.is_empty() {
            lines.push(format!("   Platform: {}", best.console));
        }
        if let Some(price) = best.loose_eur {
            lines.push(format!("   💿 Loose: €{:.0}", price));
        }
        if let Some(price) = best.complete_eur {
            lines.push(format!("   📦 Complete (CIB): €{:.0}", price));
        }
        if let Some(price) = best.new_eur {
            lines.push(format!("   🆕 New sealed: €{:.0}", price));
        }
        if self.products.len() > 1 {
            lines.push(format!("   ({} similar products found)", self.products.len()));
        }

        lines.join("\n")
    }
}

fn avg(values: impl Iterator<Item = f64>) -> Option<f64> {
    let values: Vec<f64> = values.collect();
    if values.is_empty() {
        None
    } else {
        Some(values.iter().sum::<f64>() / values.len() as f64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_usd_converts_tiers() {
        let tiers = PriceTiers::from_usd("mario-kart-8", "Mario Kart 8 Deluxe", "Nintendo Switch", Some(30.0), Some(40.0), None);

        assert_eq!(tiers.loose_usd, Some(30.0));
        assert_eq!(tiers.loose_eur, Some(27.6));
        assert!((tiers.complete_eur.unwrap() - 36.8).abs() < 1e-9);
        assert!(tiers.new_usd.is_none());
        assert!(tiers.new_eur.is_none());
    }

    #[test]
    fn test_best_match_and_averages() {
        let result = CatalogResult {
            query: "zelda".to_string(),
            products: vec![
                PriceTiers::from_usd("1", "Zelda BOTW", "Nintendo Switch", Some(20.0), Some(30.0), Some(50.0)),
                PriceTiers::from_usd("2", "Zelda TOTK", "Nintendo Switch", Some(40.0), None, None),
            ],
        };

        assert_eq!(result.best_match().unwrap().product_name, "Zelda BOTW");
        // (20 + 40) / 2 * 0.92
        assert_eq!(result.avg_loose_eur(), Some(27.6));
        // only the first product has a complete tier
        assert_eq!(result.avg_complete_eur(), Some(27.6));
    }

    #[test]
    fn test_empty_result() {
        let result = CatalogResult { query: "x".to_string(), products: Vec::new() };
        assert!(result.best_match().is_none());
        assert!(result.avg_loose_eur().is_none());
        assert_eq!(result.to_prompt_context(), "");
    }

    #[test]
    fn test_prompt_context() {
        let result = CatalogResult {
            query: "pokemon red".to_string(),
            products: vec![
                PriceTiers::from_usd("1", "Pokemon Red", "Gameboy", Some(50.0), Some(150.0), Some(1000.0)),
                PriceTiers::from_usd("2", "Pokemon Red JP", "Gameboy", Some(20.0), None, None),
            ],
        };

        let context = result.to_prompt_context();
        assert!(context.contains("🎮 CATALOG"));
        assert!(context.contains("Product: Pokemon Red"));
        assert!(context.contains("Platform: Gameboy"));
        assert!(context.contains("💿 Loose: €46"));
        assert!(context.contains("📦 Complete (CIB): €138"));
        assert!(context.contains("🆕 New sealed: €920"));
        assert!(context.contains("(2 similar products found)"));
    }
}
