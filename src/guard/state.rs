use std::sync::Arc;

use axum::extract::FromRef;
use axum_extra::extract::cookie::Key;

use super::config::{GuardConfig, GuardSettings};
use super::traits::{IdentityStore, IdentityStoreDyn};

/// Shared guard state: settings plus the consumer's identity store.
///
/// Cheap to clone; embed it in your application state and derive
/// `FromRef<AppState>` so the [`Staff`](super::Staff) extractor can reach it.
#[derive(Clone)]
pub struct GuardState {
    pub(super) store: Arc<dyn IdentityStoreDyn>,
    pub(super) settings: GuardSettings,
}

impl GuardState {
    #[must_use]
    pub fn new(config: GuardConfig, store: impl IdentityStore) -> Self {
        Self {
            store: Arc::new(store),
            settings: config.settings,
        }
    }

    /// Name of the session cookie the guard reads.
    #[must_use]
    pub fn session_cookie_name(&self) -> &str {
        &self.settings.session_cookie_name
    }

    /// Session lifetime in days, for [`issue_session`](super::issue_session).
    #[must_use]
    pub fn session_ttl_days(&self) -> i64 {
        self.settings.session_ttl_days
    }

    /// Whether session cookies are marked `Secure`.
    #[must_use]
    pub fn secure_cookies(&self) -> bool {
        self.settings.secure_cookies
    }
}

// PrivateCookieJar requires Key to be extractable from state
impl FromRef<GuardState> for Key {
    fn from_ref(state: &GuardState) -> Self {
        state.settings.cookie_key.clone()
    }
}
