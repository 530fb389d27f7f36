//! FoodKeeper core library.
//!
//! Shared by every FoodKeeper front end: the authenticated API client, local
//! token storage, the session-expiry event bus, configuration, and models.

pub mod api;
pub mod auth;
pub mod config;
pub mod models;

pub use api::{ApiClient, ApiError, ApiRequest};
pub use auth::{Credentials, SessionEvent, SessionEvents, TokenStore};
pub use config::Config;
