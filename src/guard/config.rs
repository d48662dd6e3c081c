use axum_extra::extract::cookie::Key;

use crate::error::Error;

/// Shared guard settings used by both config and runtime state.
#[derive(Clone)]
pub(crate) struct GuardSettings {
    pub(crate) cookie_key: Key,
    pub(crate) session_cookie_name: String,
    pub(crate) session_ttl_days: i64,
    pub(crate) secure_cookies: bool,
    pub(crate) landing_url: String,
}

/// Access guard configuration.
///
/// The required field (`landing_url`, where every rejected request is sent)
/// is a constructor parameter — no runtime "missing field" errors.
///
/// Use [`from_env()`](GuardConfig::from_env) for convention-based setup,
/// or [`new()`](GuardConfig::new) with `with_*` methods for full control.
pub struct GuardConfig {
    pub(super) settings: GuardSettings,
}

impl GuardConfig {
    /// Create config with the required landing URL.
    ///
    /// All optional fields use sensible defaults. Override with `with_*` methods.
    #[must_use]
    pub fn new(landing_url: impl Into<String>) -> Self {
        Self {
            settings: GuardSettings {
                cookie_key: Key::generate(),
                session_cookie_name: "session".into(),
                session_ttl_days: 30,
                secure_cookies: true,
                landing_url: landing_url.into(),
            },
        }
    }

    /// Create config from environment variables.
    ///
    /// # Required env vars
    /// - `BACKOFFICE_LANDING_URL`: where rejected requests are redirected
    ///
    /// # Optional env vars
    /// - `BACKOFFICE_SESSION_COOKIE`: session cookie name (default `session`)
    /// - `BACKOFFICE_COOKIE_KEY`: cookie encryption key bytes (at least 64);
    ///   omitted, an ephemeral key is generated and sessions do not survive
    ///   a restart
    /// - `DEV_AUTH`: set to `"1"` or `"true"` to disable secure cookies
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if required env vars are missing or invalid.
    pub fn from_env() -> Result<Self, Error> {
        let landing_url = std::env::var("BACKOFFICE_LANDING_URL")
            .map_err(|_| Error::Config("BACKOFFICE_LANDING_URL is required".into()))?;

        let mut config = Self::new(landing_url);

        if let Ok(name) = std::env::var("BACKOFFICE_SESSION_COOKIE") {
            config = config.with_session_cookie_name(name);
        }

        if let Ok(k) = std::env::var("BACKOFFICE_COOKIE_KEY") {
            let key = Key::try_from(k.as_bytes()).map_err(|_| {
                Error::Config(
                    "BACKOFFICE_COOKIE_KEY is set but invalid (must be at least 64 bytes). \
                     Remove the env var to use an ephemeral key, or provide a valid key."
                        .into(),
                )
            })?;
            config = config.with_cookie_key(key);
        }

        let dev_auth = matches!(std::env::var("DEV_AUTH").as_deref(), Ok("1") | Ok("true"));

        Ok(config.with_secure_cookies(!dev_auth))
    }

    #[must_use]
    pub fn with_cookie_key(mut self, key: Key) -> Self {
        self.settings.cookie_key = key;
        self
    }

    #[must_use]
    pub fn with_session_cookie_name(mut self, name: impl Into<String>) -> Self {
        self.settings.session_cookie_name = name.into();
        self
    }

    #[must_use]
    pub fn with_session_ttl_days(mut self, days: i64) -> Self {
        self.settings.session_ttl_days = days;
        self
    }

    #[must_use]
    pub fn with_secure_cookies(mut self, secure: bool) -> Self {
        self.settings.secure_cookies = secure;
        self
    }
}
