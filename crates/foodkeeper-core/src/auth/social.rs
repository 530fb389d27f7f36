//! Bridges callback-style social login SDKs into async results.
//!
//! SDKs hand their outcome to a callback that may fire once, several times, or
//! never. [`await_callback`] turns that into a future that resolves exactly
//! once. Dropping the future does not cancel the SDK call; its late result is
//! simply discarded.

use std::fmt;
use std::sync::{Arc, Mutex};

use thiserror::Error;
use tokio::sync::oneshot;
use tracing::debug;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SocialLoginError {
    #[error("Login was cancelled")]
    Cancelled,

    #[error("Login failed: {0}")]
    Failed(String),

    #[error("Login provider never reported a result")]
    Abandoned,
}

/// Social login providers the backend accepts tokens from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SocialProvider {
    Kakao,
    Google,
    Apple,
}

impl SocialProvider {
    /// Path segment used by the login endpoint
    pub fn as_path(&self) -> &'static str {
        match self {
            SocialProvider::Kakao => "kakao",
            SocialProvider::Google => "google",
            SocialProvider::Apple => "apple",
        }
    }
}

impl fmt::Display for SocialProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SocialProvider::Kakao => write!(f, "Kakao"),
            SocialProvider::Google => write!(f, "Google"),
            SocialProvider::Apple => write!(f, "Apple"),
        }
    }
}

type Slot<T> = Arc<Mutex<Option<oneshot::Sender<Result<T, SocialLoginError>>>>>;

/// Handle passed to the SDK. Clone it freely; only the first outcome counts.
pub struct LoginCallback<T> {
    slot: Slot<T>,
}

impl<T> Clone for LoginCallback<T> {
    fn clone(&self) -> Self {
        Self {
            slot: Arc::clone(&self.slot),
        }
    }
}

impl<T> LoginCallback<T> {
    pub fn resolve(&self, value: T) {
        self.complete(Ok(value));
    }

    pub fn cancel(&self) {
        self.complete(Err(SocialLoginError::Cancelled));
    }

    pub fn fail(&self, reason: impl Into<String>) {
        self.complete(Err(SocialLoginError::Failed(reason.into())));
    }

    /// Returns false if an earlier outcome already won.
    pub fn complete(&self, outcome: Result<T, SocialLoginError>) -> bool {
        let sender = self.slot.lock().unwrap_or_else(|e| e.into_inner()).take();
        match sender {
            Some(tx) => {
                if tx.send(outcome).is_err() {
                    debug!("Login result arrived after the caller stopped waiting");
                }
                true
            }
            None => {
                debug!("Ignoring duplicate login callback");
                false
            }
        }
    }
}

/// Start a callback-based login and wait for its first outcome.
pub async fn await_callback<T, F>(start: F) -> Result<T, SocialLoginError>
where
    F: FnOnce(LoginCallback<T>),
{
    let (tx, rx) = oneshot::channel();
    start(LoginCallback {
        slot: Arc::new(Mutex::new(Some(tx))),
    });
    rx.await.unwrap_or(Err(SocialLoginError::Abandoned))
}
