//! Authenticated marketplace API: OAuth2 token lifecycle and search.

pub mod auth;
pub mod client;

pub use auth::{AuthError, TokenCache, TOKEN_SAFETY_MARGIN};
pub use client::EbayApiClient;
