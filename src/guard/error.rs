use axum::response::{IntoResponse, Redirect, Response};

/// Guard rejection: the request does not reach protected content.
///
/// Every rejection renders identically — a redirect to the configured
/// landing URL — so an observer cannot distinguish a missing session from
/// an insufficient permission. The reason is kept for logging only.
#[derive(Debug, thiserror::Error)]
#[error("{reason}")]
pub struct GuardError {
    pub(super) reason: DenyReason,
    pub(super) landing_url: String,
}

impl GuardError {
    /// Why the request was rejected (not exposed to the client).
    #[must_use]
    pub fn reason(&self) -> &DenyReason {
        &self.reason
    }
}

#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum DenyReason {
    /// No session cookie, or the cookie failed authentication.
    #[error("no valid session cookie")]
    MissingSession,

    /// Cookie decrypted but the claims did not parse.
    #[error("malformed session claims")]
    MalformedClaims,

    /// Claims referenced a user id with no matching identity.
    #[error("unknown identity")]
    UnknownIdentity,

    /// Identity exists but its permission is not elevated.
    #[error("permission not elevated")]
    NotElevated,

    /// Identity store lookup failed.
    #[error("identity lookup failed: {0}")]
    Store(String),
}

impl IntoResponse for GuardError {
    fn into_response(self) -> Response {
        tracing::debug!(reason = %self.reason, "redirecting unauthorized request");
        Redirect::to(&self.landing_url).into_response()
    }
}
