//! # FCM Courier Library
//!
//! Sends push notifications through the Firebase Cloud Messaging HTTP v1 API
//! using short-lived access tokens minted from a service-account key.
//! Batches are sent concurrently and every item is classified as sent,
//! unregistered or failed; an access token that expires mid-batch is
//! refreshed once and the unprocessed tail is re-sent.
//!
//! Modules:
//! - `config`: service configuration (YAML, env expansion, defaults)
//! - `credentials`: service-account key parsing and assertion signing
//! - `cache`: token store capability, memory/file stores, token cache
//! - `auth`: access token provider (cache-first, forced refresh)
//! - `messaging`: messages, results, batch engine and the `Messaging` facade

pub mod auth;
pub mod cache;
pub mod config;
pub mod credentials;
pub mod errors;
pub mod helpers;
pub mod messaging;
pub mod observability;
pub mod tests;
pub mod utils;

pub use crate::auth::provider::TokenProvider;
pub use crate::cache::store::TokenStore;
pub use crate::config::settings::ServiceConfig;
pub use crate::errors::FcmError;
pub use crate::messaging::client::Messaging;
pub use crate::messaging::error::ApiError;
pub use crate::messaging::message::{OutboundItem, Target};
pub use crate::messaging::result::BatchResult;
