//! Market research: canonical models and the aggregation coordinator.

pub mod engine;
pub mod models;

pub use engine::{build_query, ResearchEngine};
pub use models::{Condition, MarketResearch, PriceObservation, PriceStats, Source};
