//! Validation of the analysis model's JSON response.
//!
//! The model answers in free text that should be JSON but often is not
//! quite: fenced in Markdown, out-of-range scores, lowercase
//! recommendations, missing fields. Everything that leaves this module is
//! a bounded [`DecisionPayload`]; callers never see raw model text and no
//! input, however broken, raises an error.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::warn;

/// Score substituted when the field is missing or non-numeric.
const DEFAULT_SCORE: u8 = 50;

/// What the analysis recommends doing with the listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Recommendation {
    Buy,
    Watch,
    #[default]
    Skip,
}

impl Recommendation {
    /// Case-insensitive parse; anything outside the three known values
    /// collapses to Skip.
    fn from_model(s: &str) -> Self {
        match s.to_uppercase().as_str() {
            "BUY" => Recommendation::Buy,
            "WATCH" => Recommendation::Watch,
            "SKIP" => Recommendation::Skip,
            _ => Recommendation::Skip,
        }
    }
}

/// Validated arbitrage decision.
///
/// `estimated_value_max >= estimated_value_min` is deliberately NOT
/// enforced: the upstream model sometimes inverts them and downstream
/// consumers are expected to tolerate that.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DecisionPayload {
    /// Profit-potential score in [1,100]; 0 only in the fallback payload.
    pub score: u8,
    pub category: String,
    pub brand: Option<String>,
    pub model: Option<String>,
    pub estimated_value_min: f64,
    pub estimated_value_max: f64,
    pub margin_percentage: f64,
    pub recommendation: Recommendation,
    pub reasoning: String,
    pub red_flags: Vec<String>,
    pub selling_tips: String,
    /// False when the payload is the parse-failure fallback.
    pub analyzed: bool,
}

impl DecisionPayload {
    /// Deterministic fallback returned for any unparseable response.
    fn fallback(cause: &str) -> Self {
        Self {
            score: 0,
            category: "Unknown".to_string(),
            brand: None,
            model: None,
            estimated_value_min: 0.0,
            estimated_value_max: 0.0,
            margin_percentage: 0.0,
            recommendation: Recommendation::Skip,
            reasoning: format!("Analysis unavailable: {}", cause),
            red_flags: Vec::new(),
            selling_tips: String::new(),
            analyzed: false,
        }
    }
}

/// Parses and bounds a raw model response. Never fails: malformed input
/// yields the fallback payload with the cause embedded in `reasoning`.
pub fn parse_decision(raw: &str) -> DecisionPayload {
    let content = strip_code_fences(raw);

    let value: Value = match serde_json::from_str(content) {
        Ok(value) => value,
        Err(e) => {
            warn!("Failed to parse decision response: {}", e);
            return DecisionPayload::fallback(&e.to_string());
        }
    };

    let Some(object) = value.as_object() else {
        warn!("Decision response is not a JSON object");
        return DecisionPayload::fallback("response is not a JSON object");
    };

    DecisionPayload {
        score: coerce_score(object.get("score")),
        category: string_or(object.get("category"), "Other"),
        brand: optional_string(object.get("brand")),
        model: optional_string(object.get("model")),
        estimated_value_min: money(object.get("estimated_value_min")),
        estimated_value_max: money(object.get("estimated_value_max")),
        margin_percentage: object
            .get("margin_percentage")
            .and_then(Value::as_f64)
            .unwrap_or(0.0),
        recommendation: object
            .get("recommendation")
            .and_then(Value::as_str)
            .map(Recommendation::from_model)
            .unwrap_or_default(),
        reasoning: string_or(object.get("reasoning"), ""),
        red_flags: object
            .get("red_flags")
            .and_then(Value::as_array)
            .map(|flags| {
                flags.iter().filter_map(|f| f.as_str().map(String::from)).collect()
            })
            .unwrap_or_default(),
        selling_tips: string_or(object.get("selling_tips"), ""),
        analyzed: true,
    }
}

/// Drops an optional Markdown code fence (with or without a `json` tag).
fn strip_code_fences(raw: &str) -> &str {
    let trimmed = raw.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };

    let rest = rest.strip_prefix("json").unwrap_or(rest);
    let rest = rest.strip_suffix("```").unwrap_or(rest);
    rest.trim()
}

/// Integer-coerces and clamps the score into [1,100].
fn coerce_score(value: Option<&Value>) -> u8 {
    match value {
        Some(v) => match v.as_f64() {
            Some(n) => (n as i64).clamp(1, 100) as u8,
            None => DEFAULT_SCORE,
        },
        None => DEFAULT_SCORE,
    }
}

/// Monetary coercion: absent or non-numeric becomes 0, negatives clamp
/// to 0 (estimates are non-negative by contract).
fn money(value: Option<&Value>) -> f64 {
    value.and_then(Value::as_f64).unwrap_or(0.0).max(0.0)
}

fn string_or(value: Option<&Value>, default: &str) -> String {
    value.and_then(Value::as_str).unwrap_or(default).to_string()
}

fn optional_string(value: Option<&Value>) -> Option<String> {
    value.and_then(Value::as_str).filter(|s| !s.is_empty()).map(String::from)
}
