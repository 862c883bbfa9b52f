//! CSS selectors for scraped marketplace pages.
//!
//! None of these structures are contractually stable; they are best-effort
//! against whatever the marketplaces currently render. When extraction
//! starts coming back empty, capture an HTML sample and update here.

use scraper::Selector;
use std::sync::LazyLock;

/// Selectors for marketplace listing-search pages (sold and active).
pub mod listing {
    use super::*;

    /// Listing row container.
    pub static ITEM: LazyLock<Selector> = LazyLock::new(|| Selector::parse(".s-item").unwrap());

    /// Listing price text.
    pub static PRICE: LazyLock<Selector> =
        LazyLock::new(|| Selector::parse(".s-item__price").unwrap());

    /// Listing title text.
    pub static TITLE: LazyLock<Selector> =
        LazyLock::new(|| Selector::parse(".s-item__title").unwrap());

    /// Listing link for URL extraction.
    pub static LINK: LazyLock<Selector> =
        LazyLock::new(|| Selector::parse("a.s-item__link").unwrap());
}

/// Selectors for retail merchandise search pages.
pub mod retail {
    use super::*;

    /// Search result card.
    pub static RESULT: LazyLock<Selector> =
        LazyLock::new(|| Selector::parse("[data-component-type='s-search-result']").unwrap());

    /// Offscreen price text (most reliable price element).
    pub static PRICE: LazyLock<Selector> =
        LazyLock::new(|| Selector::parse(".a-price .a-offscreen").unwrap());

    /// Result title text.
    pub static TITLE: LazyLock<Selector> = LazyLock::new(|| Selector::parse("h2 span").unwrap());
}

/// Selectors for the collector-pricing catalog.
pub mod catalog {
    use super::*;

    /// Results table rows.
    pub static ROW: LazyLock<Selector> =
        LazyLock::new(|| Selector::parse("table#games_table tr").unwrap());

    /// Header cell, used to skip the header row.
    pub static HEADER: LazyLock<Selector> = LazyLock::new(|| Selector::parse("th").unwrap());

    /// Product title link.
    pub static TITLE_LINK: LazyLock<Selector> =
        LazyLock::new(|| Selector::parse("td.title a").unwrap());

    /// Tier price cells (loose, complete, new — in that order).
    pub static PRICE: LazyLock<Selector> =
        LazyLock::new(|| Selector::parse("span.js-price").unwrap());
}
