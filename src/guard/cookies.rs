use axum_extra::extract::cookie::{Cookie, SameSite};
use time::Duration;

use super::types::SessionClaims;

/// Create a session cookie carrying the given claims.
///
/// The value is the serialized claims; add the cookie to a
/// `PrivateCookieJar` so it is encrypted and authenticated on the wire.
///
/// # Errors
///
/// Returns a serialization error if the claims cannot be encoded (does not
/// happen for well-formed claims).
pub fn issue_session(
    name: &str,
    claims: &SessionClaims,
    ttl_days: i64,
    secure: bool,
) -> Result<Cookie<'static>, serde_json::Error> {
    let value = serde_json::to_string(claims)?;

    Ok(Cookie::build((name.to_string(), value))
        .http_only(true)
        .secure(secure)
        .same_site(SameSite::Lax)
        .path("/".to_string())
        .max_age(Duration::days(ttl_days))
        .build())
}

/// Create a removal cookie for the session (logout).
pub fn clear_session(name: &str) -> Cookie<'static> {
    Cookie::build((name.to_string(), ""))
        .path("/".to_string())
        .max_age(Duration::ZERO)
        .build()
}
