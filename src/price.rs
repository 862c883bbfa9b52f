//! Locale-aware price string parsing.
//!
//! Marketplace pages mix formats freely: `"€450,00"`, `"$45.99"`,
//! `"¥5,000"`, `"1.234,56"`. The heuristics here normalize all of them
//! to a plain `f64` without knowing the page's locale up front.

/// Lower bound of the plausibility band; cheaper readings are noise
/// (shipping costs, accessory prices, truncated numbers).
pub const MIN_PLAUSIBLE_PRICE: f64 = 5.0;

/// Upper bound of the plausibility band.
pub const MAX_PLAUSIBLE_PRICE: f64 = 10_000.0;

/// Parses a price string into a numeric value.
///
/// Returns `None` when no digits remain after stripping currency noise.
/// Separator rules, in order:
/// - both `,` and `.` present: the right-most one is the decimal point,
///   the other is a thousands separator;
/// - only `,`: decimal point iff followed by exactly two digits at the
///   end of the string (`"40,00"`), otherwise thousands (`"1,000"`);
/// - only `.`: parsed as-is.
pub fn parse_price(text: &str) -> Option<f64> {
    // Keep digits and separators; drops currency symbols and alpha codes
    // (€, $, £, ¥, "EUR", "USD", ...).
    let cleaned: String =
        text.chars().filter(|c| c.is_ascii_digit() || *c == '.' || *c == ',').collect();

    if !cleaned.chars().any(|c| c.is_ascii_digit()) {
        return None;
    }

    let last_comma = cleaned.rfind(',');
    let last_period = cleaned.rfind('.');

    let normalized = match (last_comma, last_period) {
        (Some(c), Some(p)) => {
            if c > p {
                // EU format: 1.234,56
                cleaned.replace('.', "").replace(',', ".")
            } else {
                // US format: 1,234.56
                cleaned.replace(',', "")
            }
        }
        (Some(_), None) => {
            if comma_is_decimal(&cleaned) {
                cleaned.replace(',', ".")
            } else {
                cleaned.replace(',', "")
            }
        }
        _ => cleaned,
    };

    normalized.parse().ok().filter(|p: &f64| p.is_finite() && *p >= 0.0)
}

/// A lone comma is a decimal point only when exactly two digits follow it
/// at the end of the string. Checking the tail first is what keeps
/// `"1,000"` a thousand and `"40,00"` forty.
fn comma_is_decimal(cleaned: &str) -> bool {
    match cleaned.rsplit_once(',') {
        Some((_, tail)) => tail.len() == 2 && tail.chars().all(|c| c.is_ascii_digit()),
        None => false,
    }
}

/// Returns true when a parsed price falls inside the anti-noise band.
///
/// This is a sanity filter, not a correctness guarantee: it exists to keep
/// junk readings out of the aggregate, not to validate market values.
pub fn is_plausible(price: f64) -> bool {
    (MIN_PLAUSIBLE_PRICE..=MAX_PLAUSIBLE_PRICE).contains(&price)
}

/// Parses and filters in one step; adapters use this for row extraction.
pub fn parse_plausible(text: &str) -> Option<f64> {
    parse_price(text).filter(|p| is_plausible(*p))
}
