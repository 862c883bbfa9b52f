//! International market comparison and import/export economics.

pub mod client;
pub mod markets;
pub mod models;

pub use client::InternationalClient;
pub use markets::{Market, MarketParseError};
pub use models::{
    ExportOpportunity, ImportOpportunity, InternationalComparison, PriceSample,
    DUTY_FREE_THRESHOLD, EXPORT_MARGIN_THRESHOLD, IMPORT_MARGIN_THRESHOLD,
};
