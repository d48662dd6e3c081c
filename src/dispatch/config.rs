use std::time::Duration;

use crate::error::Error;

/// Mail relay configuration.
///
/// Required fields (`smtp_host`, `smtp_username`, `smtp_password`) are
/// constructor parameters — no runtime "missing field" errors.
///
/// Use [`from_env()`](RelayConfig::from_env) for convention-based setup,
/// or [`new()`](RelayConfig::new) with `with_*` methods for full control.
#[derive(Debug, Clone)]
pub struct RelayConfig {
    pub(crate) smtp_host: String,
    pub(crate) smtp_port: u16,
    pub(crate) smtp_username: String,
    pub(crate) smtp_password: String,
    pub(crate) timeout: Duration,
}

impl RelayConfig {
    #[must_use]
    pub fn new(
        smtp_host: impl Into<String>,
        smtp_username: impl Into<String>,
        smtp_password: impl Into<String>,
    ) -> Self {
        Self {
            smtp_host: smtp_host.into(),
            smtp_port: 587,
            smtp_username: smtp_username.into(),
            smtp_password: smtp_password.into(),
            timeout: Duration::from_secs(30),
        }
    }

    /// Create config from environment variables.
    ///
    /// # Required env vars
    /// - `SMTP_HOST`, `SMTP_USER`, `SMTP_PASS`
    ///
    /// # Optional env vars
    /// - `SMTP_PORT`: submission port (default `587`, STARTTLS)
    /// - `BACKOFFICE_DISPATCH_TIMEOUT_SECS`: whole-dispatch bound (default `30`)
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if required env vars are missing or a
    /// numeric value does not parse.
    pub fn from_env() -> Result<Self, Error> {
        let smtp_host = required("SMTP_HOST")?;
        let smtp_username = required("SMTP_USER")?;
        let smtp_password = required("SMTP_PASS")?;

        let mut config = Self::new(smtp_host, smtp_username, smtp_password);

        if let Ok(port) = std::env::var("SMTP_PORT") {
            let port: u16 = port
                .parse()
                .map_err(|e| Error::Config(format!("SMTP_PORT: {e}")))?;
            config = config.with_smtp_port(port);
        }
        if let Ok(secs) = std::env::var("BACKOFFICE_DISPATCH_TIMEOUT_SECS") {
            let secs: u64 = secs
                .parse()
                .map_err(|e| Error::Config(format!("BACKOFFICE_DISPATCH_TIMEOUT_SECS: {e}")))?;
            config = config.with_timeout(Duration::from_secs(secs));
        }

        Ok(config)
    }

    #[must_use]
    pub fn with_smtp_port(mut self, port: u16) -> Self {
        self.smtp_port = port;
        self
    }

    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Whole-dispatch timeout, for [`Dispatcher::with_timeout`](super::Dispatcher::with_timeout).
    #[must_use]
    pub fn timeout(&self) -> Duration {
        self.timeout
    }
}

pub(crate) fn required(key: &'static str) -> Result<String, Error> {
    std::env::var(key).map_err(|_| Error::Config(format!("{key} is required")))
}
