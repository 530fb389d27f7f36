//! REST API client module for the FoodKeeper backend.
//!
//! This module provides the `ApiClient` for communicating with the backend
//! to manage tracked food items and request recipe suggestions.
//!
//! Every response is wrapped in a `{ result, data, error }` envelope. The API
//! uses bearer token authentication; expired access tokens are refreshed
//! transparently by `ApiClient::execute`.

pub mod client;
pub mod endpoints;
pub mod envelope;
pub mod error;
pub mod request;

pub use client::{ApiClient, REFRESH_PATH, REFRESH_TOKEN_HEADER, TOKEN_EXPIRED_CODE};
pub use envelope::{Envelope, ErrorBody};
pub use error::ApiError;
pub use request::ApiRequest;
