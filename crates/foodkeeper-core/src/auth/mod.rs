//! Authentication state for the FoodKeeper client.
//!
//! This module provides:
//! - `TokenStore`: the access/refresh token pair, user id and onboarding flag
//! - Preference backends: JSON file, OS keychain, or in-memory
//! - `SessionEvents`: broadcast of forced logouts
//! - `await_callback`: adapter from callback-style social login SDKs to futures

pub mod events;
pub mod keychain;
pub mod preferences;
pub mod social;
pub mod store;

pub use events::{SessionEvent, SessionEvents};
pub use keychain::KeyringPreferences;
pub use preferences::{FilePreferences, MemoryPreferences, PreferenceStore};
pub use social::{await_callback, LoginCallback, SocialLoginError, SocialProvider};
pub use store::{Credentials, TokenStore};
