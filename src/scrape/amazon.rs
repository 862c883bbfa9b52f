//! General-merchandise retail adapter (new-condition reference prices).

use crate::price;
use crate::research::{Condition, PriceObservation, Source};
use crate::scrape::selectors::retail;
use crate::scrape::ListingAdapter;
use scraper::Html;

const DEFAULT_BASE_URL: &str = "https://www.amazon.it";

/// Retail search results; everything here is tagged new.
pub struct MerchandiseAdapter {
    base_url: String,
}

impl MerchandiseAdapter {
    pub fn new() -> Self {
        Self::with_base_url(DEFAULT_BASE_URL)
    }

    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self { base_url: base_url.into() }
    }
}

impl Default for MerchandiseAdapter {
    fn default() -> Self {
        Self::new()
    }
}

impl ListingAdapter for MerchandiseAdapter {
    fn source(&self) -> Source {
        Source::Merchandise
    }

    fn cap(&self) -> usize {
        6
    }

    fn search_url(&self, query: &str) -> String {
        format!("{}/s?k={}", self.base_url, urlencoding::encode(query))
    }

    fn extract(&self, html: &str) -> Vec<PriceObservation> {
        let document = Html::parse_document(html);

        document
            .select(&retail::RESULT)
            .filter_map(|result| {
                let price_text =
                    result.select(&retail::PRICE).next()?.text().collect::<String>();
                let price = price::parse_plausible(&price_text)?;

                let title = result
                    .select(&retail::TITLE)
                    .next()
                    .map(|e| e.text().collect::<String>().trim().to_string())
                    .filter(|t| !t.is_empty());

                Some(PriceObservation {
                    source: Source::Merchandise,
                    price,
                    currency: "EUR".to_string(),
                    condition: Condition::New,
                    url: None,
                    title,
                })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn retail_html(rows: &[(&str, &str)]) -> String {
        let mut html = String::from("<html><body>");
        for (title, price) in rows {
            html.push_str(&format!(
                r#"<div data-component-type="s-search-result">
                    <h2><span>{}</span></h2>
                    <span class="a-price"><span class="a-offscreen">{}</span></span>
                </div>"#,
                title, price
            ));
        }
        html.push_str("</body></html>");
        html
    }

    #[test]
    fn test_url() {
        let adapter = MerchandiseAdapter::new();
        assert_eq!(
            adapter.search_url("lego star wars"),
            "https://www.amazon.it/s?k=lego%20star%20wars"
        );
    }

    #[test]
    fn test_extract_results() {
        let html = retail_html(&[
            ("LEGO Star Wars 75192", "459,99 €"),
            ("LEGO Star Wars 75375", "64,99 €"),
        ]);

        let adapter = MerchandiseAdapter::new();
        let observations = adapter.extract(&html);

        assert_eq!(observations.len(), 2);
        assert_eq!(observations[0].price, 459.99);
        assert_eq!(observations[0].condition, Condition::New);
        assert_eq!(observations[0].source, Source::Merchandise);
        assert_eq!(observations[0].title.as_deref(), Some("LEGO Star Wars 75192"));
        assert_eq!(observations[1].price, 64.99);
    }

    #[test]
    fn test_extract_skips_results_without_price() {
        let html = r#"<html><body>
            <div data-component-type="s-search-result">
                <h2><span>Unavailable item</span></h2>
            </div>
        </body></html>"#;

        let adapter = MerchandiseAdapter::new();
        assert!(adapter.extract(html).is_empty());
    }

    #[test]
    fn test_extract_implausible_prices_dropped() {
        let html = retail_html(&[("Cable", "2,99 €"), ("Console", "299,00 €")]);

        let adapter = MerchandiseAdapter::new();
        let observations = adapter.extract(&html);
        assert_eq!(observations.len(), 1);
        assert_eq!(observations[0].price, 299.0);
    }
}
