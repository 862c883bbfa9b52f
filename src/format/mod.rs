//! Output formatting for research results (table, JSON).

use crate::config::OutputFormat;
use crate::decision::DecisionPayload;
use crate::intl::{ExportOpportunity, ImportOpportunity, InternationalComparison};
use crate::research::{MarketResearch, PriceStats};

/// Formats engine output for the terminal.
pub struct Formatter {
    format: OutputFormat,
}

impl Formatter {
    /// Creates a new formatter.
    pub fn new(format: OutputFormat) -> Self {
        Self { format }
    }

    /// Formats a full research result.
    pub fn format_research(&self, research: &MarketResearch) -> String {
        match self.format {
            OutputFormat::Json => {
                serde_json::to_string_pretty(research).unwrap_or_else(|_| "{}".to_string())
            }
            OutputFormat::Table => self.research_table(research),
        }
    }

    /// Formats an international comparison with optional opportunity math.
    pub fn format_comparison(
        &self,
        comparison: &InternationalComparison,
        import: Option<&ImportOpportunity>,
        export: Option<&ExportOpportunity>,
    ) -> String {
        match self.format {
            OutputFormat::Json => {
                let value = serde_json::json!({
                    "comparison": comparison,
                    "import": import,
                    "export": export,
                });
                serde_json::to_string_pretty(&value).unwrap_or_else(|_| "{}".to_string())
            }
            OutputFormat::Table => self.comparison_table(comparison, import, export),
        }
    }

    /// Formats a validated decision payload.
    pub fn format_decision(&self, payload: &DecisionPayload) -> String {
        match self.format {
            OutputFormat::Json => {
                serde_json::to_string_pretty(payload).unwrap_or_else(|_| "{}".to_string())
            }
            OutputFormat::Table => self.decision_table(payload),
        }
    }

    fn research_table(&self, research: &MarketResearch) -> String {
        let mut lines = Vec::new();

        lines.push(format!("Market research for '{}'", research.query));
        lines.push("=".repeat(64));
        lines.push(format!(
            "{:<20} {:>6} {:>10} {:>10} {:>10}",
            "Source", "Count", "Mean", "Min", "Max"
        ));
        lines.push("-".repeat(64));

        let groups: [(&str, Option<PriceStats>); 5] = [
            ("Marketplace API", research.api_stats()),
            ("Sold listings", research.sold_stats()),
            ("Active listings", research.active_stats()),
            ("Retail", research.merchandise_stats()),
            ("Shopping", research.shopping_stats()),
        ];

        for (label, stats) in groups {
            match stats {
                Some(s) => lines.push(format!(
                    "{:<20} {:>6} {:>10} {:>10} {:>10}",
                    label,
                    s.count,
                    format!("€{:.2}", s.mean),
                    format!("€{:.2}", s.min),
                    format!("€{:.2}", s.max)
                )),
                None => lines.push(format!("{:<20} {:>6} {:>10} {:>10} {:>10}", label, 0, "-", "-", "-")),
            }
        }

        if let Some(catalog) = &research.catalog {
            if let Some(best) = catalog.best_match() {
                lines.push(String::new());
                lines.push(format!("Catalog match: {} ({})", best.product_name, best.console));
                let tier = |v: Option<f64>| {
                    v.map(|p| format!("€{:.2}", p)).unwrap_or_else(|| "-".to_string())
                };
                lines.push(format!(
                    "  Loose: {}  CIB: {}  New: {}",
                    tier(best.loose_eur),
                    tier(best.complete_eur),
                    tier(best.new_eur)
                ));
            }
        }

        if let Some(intl) = &research.international {
            if !intl.samples.is_empty() {
                lines.push(String::new());
                lines.push("International:".to_string());
                for sample in &intl.samples {
                    lines.push(format!(
                        "  {} {:<16} €{:>8.2} (+€{:.0} ship.)",
                        sample.market.flag(),
                        sample.market.name(),
                        sample.eur_price,
                        sample.shipping_to_home
                    ));
                }
            }
        }

        if research.is_empty() {
            lines.push(String::new());
            lines.push("No market data found.".to_string());
        }

        lines.join("\n")
    }

    fn comparison_table(
        &self,
        comparison: &InternationalComparison,
        import: Option<&ImportOpportunity>,
        export: Option<&ExportOpportunity>,
    ) -> String {
        if comparison.samples.is_empty() {
            return format!("No international prices found for '{}'.", comparison.query);
        }

        let mut lines = Vec::new();

        lines.push(format!("International prices for '{}'", comparison.query));
        lines.push("=".repeat(60));
        lines.push(format!(
            "{:<20} {:>10} {:>10} {:>10}",
            "Market", "Local", "EUR", "Shipping"
        ));
        lines.push("-".repeat(60));

        for sample in &comparison.samples {
            lines.push(format!(
                "{:<20} {:>10} {:>10} {:>10}",
                format!("{} {}", sample.market.flag(), sample.market.name()),
                format!("{} {:.0}", sample.currency, sample.local_price),
                format!("€{:.2}", sample.eur_price),
                format!("€{:.0}", sample.shipping_to_home)
            ));
        }

        if let Some(opp) = import {
            lines.push(String::new());
            lines.push(format!("Import from {}:", opp.source_market.name()));
            lines.push(format!(
                "  Buy €{:.2} + ship €{:.0} + customs €{:.2} = landed €{:.2}",
                opp.buy_price, opp.shipping, opp.customs, opp.landed_cost
            ));
            lines.push(format!(
                "  Sell at €{:.2} -> margin €{:.2} ({:.1}%) {}",
                opp.sell_price,
                opp.margin,
                opp.margin_pct,
                if opp.profitable { "PROFITABLE" } else { "not profitable" }
            ));
        }

        if let Some(opp) = export {
            lines.push(String::new());
            lines.push(format!("Export to {}:", opp.target_market.name()));
            lines.push(format!(
                "  Sell €{:.2} - fees €{:.2} - ship €{:.0} = net €{:.2}",
                opp.sell_price, opp.fees, opp.shipping, opp.net_revenue
            ));
            lines.push(format!(
                "  Buy at €{:.2} -> margin €{:.2} ({:.1}%) {}",
                opp.buy_price,
                opp.margin,
                opp.margin_pct,
                if opp.profitable { "PROFITABLE" } else { "not profitable" }
            ));
        }

        lines.join("\n")
    }

    fn decision_table(&self, payload: &DecisionPayload) -> String {
        let mut lines = Vec::new();

        lines.push(format!("Score:          {}", payload.score));
        lines.push(format!("Recommendation: {:?}", payload.recommendation));
        lines.push(format!("Category:       {}", payload.category));

        if let Some(brand) = &payload.brand {
            lines.push(format!("Brand:          {}", brand));
        }
        if let Some(model) = &payload.model {
            lines.push(format!("Model:          {}", model));
        }

        lines.push(format!(
            "Value range:    €{:.2} - €{:.2}",
            payload.estimated_value_min, payload.estimated_value_max
        ));
        lines.push(format!("Margin:         {:.1}%", payload.margin_percentage));

        if !payload.reasoning.is_empty() {
            lines.push(format!("Reasoning:      {}", payload.reasoning));
        }
        if !payload.red_flags.is_empty() {
            lines.push(format!("Red flags:      {}", payload.red_flags.join("; ")));
        }
        if !payload.selling_tips.is_empty() {
            lines.push(format!("Selling tips:   {}", payload.selling_tips));
        }
        if !payload.analyzed {
            lines.push("(analysis unavailable, fallback values)".to_string());
        }

        lines.join("\n")
    }
}
