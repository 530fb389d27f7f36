//! Data models for FoodKeeper entities.
//!
//! - `FoodItem`, `NewFoodItem`: tracked groceries and their expiry dates
//! - `Recipe`: AI-suggested recipes built from what is on hand
//! - `TokenPair`, `LoginResponse`: authentication payloads

pub mod auth;
pub mod food;
pub mod recipe;

pub use auth::{LoginResponse, TokenPair};
pub use food::{sort_by_urgency, ExpiryStatus, FoodItem, NewFoodItem, EXPIRING_SOON_DAYS};
pub use recipe::Recipe;
