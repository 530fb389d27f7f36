use std::fmt;
use std::sync::Arc;

use anyhow::{Context, Result};

use super::preferences::{MemoryPreferences, PreferenceStore};

const ACCESS_TOKEN_KEY: &str = "access_token";
const REFRESH_TOKEN_KEY: &str = "refresh_token";
const USER_ID_KEY: &str = "user_id";
const ONBOARDING_COMPLETED_KEY: &str = "onboarding_completed";

/// Access and refresh token, always stored and read as a pair.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub access_token: String,
    pub refresh_token: String,
}

impl Credentials {
    pub fn new(access_token: impl Into<String>, refresh_token: impl Into<String>) -> Self {
        Self {
            access_token: access_token.into(),
            refresh_token: refresh_token.into(),
        }
    }
}

// Keep tokens out of logs
impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("access_token", &"<redacted>")
            .field("refresh_token", &"<redacted>")
            .finish()
    }
}

/// Local login state: the credential pair, the signed-in user id, and the
/// onboarding flag.
///
/// Cheap to clone; all clones share the same backend.
#[derive(Clone)]
pub struct TokenStore {
    prefs: Arc<dyn PreferenceStore>,
}

impl TokenStore {
    pub fn new(prefs: Arc<dyn PreferenceStore>) -> Self {
        Self { prefs }
    }

    /// A store that lives only as long as the process.
    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryPreferences::new()))
    }

    /// The stored credential pair. A half-written pair counts as logged out.
    pub fn credentials(&self) -> Result<Option<Credentials>> {
        let access = self.prefs.get(ACCESS_TOKEN_KEY)?;
        let refresh = self.prefs.get(REFRESH_TOKEN_KEY)?;
        Ok(match (access, refresh) {
            (Some(access_token), Some(refresh_token))
                if !access_token.is_empty() && !refresh_token.is_empty() =>
            {
                Some(Credentials {
                    access_token,
                    refresh_token,
                })
            }
            _ => None,
        })
    }

    pub fn access_token(&self) -> Result<Option<String>> {
        Ok(self.credentials()?.map(|c| c.access_token))
    }

    pub fn save_credentials(&self, credentials: &Credentials) -> Result<()> {
        self.prefs
            .set(ACCESS_TOKEN_KEY, &credentials.access_token)
            .context("Failed to save access token")?;
        self.prefs
            .set(REFRESH_TOKEN_KEY, &credentials.refresh_token)
            .context("Failed to save refresh token")?;
        Ok(())
    }

    /// Forget the tokens and the signed-in user. The onboarding flag stays.
    pub fn clear_credentials(&self) -> Result<()> {
        self.prefs.remove(ACCESS_TOKEN_KEY)?;
        self.prefs.remove(REFRESH_TOKEN_KEY)?;
        self.prefs.remove(USER_ID_KEY)?;
        Ok(())
    }

    pub fn is_logged_in(&self) -> Result<bool> {
        Ok(self.credentials()?.is_some())
    }

    pub fn user_id(&self) -> Result<Option<i64>> {
        match self.prefs.get(USER_ID_KEY)? {
            Some(raw) => Ok(Some(
                raw.parse()
                    .with_context(|| format!("Stored user id is not a number: {}", raw))?,
            )),
            None => Ok(None),
        }
    }

    pub fn set_user_id(&self, user_id: i64) -> Result<()> {
        self.prefs.set(USER_ID_KEY, &user_id.to_string())
    }

    pub fn onboarding_completed(&self) -> Result<bool> {
        Ok(self
            .prefs
            .get(ONBOARDING_COMPLETED_KEY)?
            .is_some_and(|v| v == "true"))
    }

    pub fn set_onboarding_completed(&self, completed: bool) -> Result<()> {
        self.prefs
            .set(ONBOARDING_COMPLETED_KEY, if completed { "true" } else { "false" })
    }
}
