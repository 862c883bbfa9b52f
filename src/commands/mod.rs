//! CLI command implementations.

pub mod decide;
pub mod intl;
pub mod research;

pub use intl::IntlCommand;
pub use research::ResearchCommand;
