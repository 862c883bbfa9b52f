//! Specialty collector-pricing catalog (games, consoles, retro, sets).

pub mod client;
pub mod models;
pub mod parser;

pub use client::CatalogClient;
pub use models::{CatalogResult, PriceTiers, USD_TO_EUR};

/// Vocabulary that marks a product as catalog material. Includes the home
/// market's Italian terms since most incoming titles are Italian listings.
const COLLECTIBLE_KEYWORDS: &[&str] = &[
    "nintendo", "switch", "playstation", "ps5", "ps4", "ps3", "ps2", "ps1",
    "xbox", "game", "gioco", "videogioco", "console", "controller",
    "gameboy", "game boy", "ds", "3ds", "wii", "gamecube", "n64",
    "sega", "mega drive", "dreamcast", "saturn", "atari",
    "amiibo", "pokemon", "zelda", "mario", "sonic",
    "retro", "vintage", "lego",
];

/// Keyword membership test deciding whether the catalog is worth querying
/// for a product title. The coordinator skips the catalog entirely when
/// this is false.
pub fn is_collectible(title: &str) -> bool {
    let title_lower = title.to_lowercase();
    COLLECTIBLE_KEYWORDS.iter().any(|keyword| title_lower.contains(keyword))
}
