//! HTML parser for catalog search-result tables.

use crate::catalog::models::PriceTiers;
use crate::price;
use crate::scrape::selectors::catalog;
use anyhow::Result;
use scraper::Html;
use tracing::debug;

/// Parses the catalog results table into tiered products.
///
/// Row layout: a title link cell followed by up to three price cells in
/// loose / complete / new order. Rows that fail to parse are skipped.
pub fn parse_search_results(html: &str, limit: usize) -> Result<Vec<PriceTiers>> {
    let document = Html::parse_document(html);
    let mut products = Vec::new();

    for row in document.select(&catalog::ROW) {
        if products.len() >= limit {
            break;
        }

        // Skip the header row
        if row.select(&catalog::HEADER).next().is_some() {
            continue;
        }

        let Some(title_link) = row.select(&catalog::TITLE_LINK).next() else {
            continue;
        };

        let product_name = title_link.text().collect::<String>().trim().to_string();
        if product_name.is_empty() {
            continue;
        }

        let product_url = title_link.value().attr("href").map(String::from);
        let product_id = product_url
            .as_deref()
            .and_then(|u| u.rsplit('/').next())
            .unwrap_or_default()
            .to_string();
        let console = product_url.as_deref().map(console_from_url).unwrap_or_default();

        let mut tiers = [None, None, None];
        for (i, span) in row.select(&catalog::PRICE).take(3).enumerate() {
            let text = span.text().collect::<String>();
            tiers[i] = price::parse_price(&text);
        }

        let mut product = PriceTiers::from_usd(
            product_id,
            product_name,
            console,
            tiers[0],
            tiers[1],
            tiers[2],
        );
        product.product_url = product_url.map(|u| {
            if u.starts_with("http") {
                u
            } else {
                format!("https://www.pricecharting.com{}", u)
            }
        });

        products.push(product);
    }

    debug!("Parsed {} products from catalog table", products.len());
    Ok(products)
}

/// Derives the platform name from a catalog product URL
/// (`/game/nintendo-switch/mario-kart-8` → `Nintendo Switch`).
fn console_from_url(url: &str) -> String {
    let Some(rest) = url.split("/game/").nth(1) else {
        return String::new();
    };
    let Some(slug) = rest.split('/').next() else {
        return String::new();
    };

    slug.split('-')
        .filter(|part| !part.is_empty())
        .map(|part| {
            let mut chars = part.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}
