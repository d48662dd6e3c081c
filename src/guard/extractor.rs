use axum::extract::{FromRef, FromRequestParts};
use axum::http::request::Parts;
use axum_extra::extract::PrivateCookieJar;

use super::error::{DenyReason, GuardError};
use super::state::GuardState;
use super::types::{Identity, SessionClaims};

/// Authorized staff member extracted from the session cookie.
///
/// Use as an Axum extractor in protected route handlers. Rejection is a
/// redirect to the landing URL, never an in-page error.
///
/// # Example
///
/// ```rust,ignore
/// async fn protected(staff: Staff) -> impl IntoResponse {
///     format!("Hello, {} ({})", staff.identity.username, staff.identity.permission)
/// }
/// ```
#[derive(Debug, Clone)]
pub struct Staff {
    /// Identity resolved by the guard, unchanged from the store.
    pub identity: Identity,
}

impl<S> FromRequestParts<S> for Staff
where
    S: Send + Sync,
    GuardState: FromRef<S>,
{
    type Rejection = GuardError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let state = GuardState::from_ref(state);
        let jar =
            PrivateCookieJar::from_headers(&parts.headers, state.settings.cookie_key.clone());

        let identity = resolve_session(&state, &jar).await?;
        Ok(Self { identity })
    }
}

/// Resolve the session cookie in `jar` to an elevated identity.
///
/// Fail-closed on every ambiguous path: a missing or unauthenticated cookie,
/// unparseable claims, a store error, an unknown user, and a non-elevated
/// permission all reject with the same redirect outcome. The lookup is
/// read-only; the jar is never modified.
///
/// # Errors
///
/// Returns [`GuardError`] on any rejection path. Store failures are logged
/// before being collapsed into the rejection.
pub async fn resolve_session(
    state: &GuardState,
    jar: &PrivateCookieJar,
) -> Result<Identity, GuardError> {
    let deny = |reason: DenyReason| GuardError {
        reason,
        landing_url: state.settings.landing_url.clone(),
    };

    let cookie = jar
        .get(&state.settings.session_cookie_name)
        .ok_or_else(|| deny(DenyReason::MissingSession))?;

    let claims: SessionClaims = serde_json::from_str(cookie.value())
        .map_err(|_| deny(DenyReason::MalformedClaims))?;

    let identity = state
        .store
        .find_dyn(claims.user_id)
        .await
        .map_err(|e| {
            tracing::error!(error = %e, user_id = %claims.user_id, "identity lookup failed");
            deny(DenyReason::Store(e.to_string()))
        })?
        .ok_or_else(|| deny(DenyReason::UnknownIdentity))?;

    if !identity.permission.is_elevated() {
        return Err(deny(DenyReason::NotElevated));
    }

    Ok(identity)
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use axum::http::HeaderMap;
    use axum_extra::extract::cookie::Key;

    use super::*;
    use crate::guard::{GuardConfig, cookies};
    use crate::types::{Permission, UserId};

    const LANDING: &str = "https://landing.example.com";

    struct MemStore(HashMap<i64, Identity>);

    impl crate::guard::IdentityStore for MemStore {
        async fn find(
            &self,
            user_id: UserId,
        ) -> Result<Option<Identity>, Box<dyn std::error::Error + Send + Sync>> {
            Ok(self.0.get(&user_id.0).cloned())
        }
    }

    struct FailingStore;

    impl crate::guard::IdentityStore for FailingStore {
        async fn find(
            &self,
            _user_id: UserId,
        ) -> Result<Option<Identity>, Box<dyn std::error::Error + Send + Sync>> {
            Err("connection refused".into())
        }
    }

    fn identity(id: i64, permission: Permission) -> Identity {
        Identity {
            id: UserId(id),
            username: format!("user{id}"),
            email: format!("user{id}@example.com"),
            profile_picture: None,
            permission,
        }
    }

    fn state_with(store: impl crate::guard::IdentityStore, key: Key) -> GuardState {
        GuardState::new(
            GuardConfig::new(LANDING).with_cookie_key(key),
            store,
        )
    }

    fn empty_jar(key: Key) -> PrivateCookieJar {
        PrivateCookieJar::from_headers(&HeaderMap::new(), key)
    }

    fn jar_with_session(key: Key, claims: &SessionClaims) -> PrivateCookieJar {
        let cookie = cookies::issue_session("session", claims, 30, true).unwrap();
        empty_jar(key).add(cookie)
    }

    fn claims_for(id: i64) -> SessionClaims {
        SessionClaims {
            user_id: UserId(id),
            username: format!("user{id}"),
            email: format!("user{id}@example.com"),
        }
    }

    #[tokio::test]
    async fn missing_cookie_rejects() {
        let key = Key::generate();
        let state = state_with(MemStore(HashMap::new()), key.clone());
        let jar = empty_jar(key);

        let err = resolve_session(&state, &jar).await.unwrap_err();
        assert!(matches!(err.reason(), DenyReason::MissingSession));
        assert_eq!(err.landing_url, LANDING);
    }

    #[tokio::test]
    async fn unauthenticated_cookie_reads_as_missing() {
        let key = Key::generate();
        let state = state_with(MemStore(HashMap::new()), key);

        // Jar built from raw headers: the cookie value was never encrypted
        // with our key, so the private jar refuses to surface it.
        let mut headers = HeaderMap::new();
        headers.insert("cookie", "session=forged-by-hand".parse().unwrap());
        let jar = PrivateCookieJar::from_headers(&headers, Key::generate());

        let err = resolve_session(&state, &jar).await.unwrap_err();
        assert!(matches!(err.reason(), DenyReason::MissingSession));
    }

    #[tokio::test]
    async fn malformed_claims_reject() {
        let key = Key::generate();
        let state = state_with(MemStore(HashMap::new()), key.clone());
        let jar = empty_jar(key)
            .add(axum_extra::extract::cookie::Cookie::new("session", "not json"));

        let err = resolve_session(&state, &jar).await.unwrap_err();
        assert!(matches!(err.reason(), DenyReason::MalformedClaims));
    }

    #[tokio::test]
    async fn unknown_identity_rejects() {
        let key = Key::generate();
        let state = state_with(MemStore(HashMap::new()), key.clone());
        let jar = jar_with_session(key, &claims_for(99));

        let err = resolve_session(&state, &jar).await.unwrap_err();
        assert!(matches!(err.reason(), DenyReason::UnknownIdentity));
    }

    #[tokio::test]
    async fn non_elevated_permission_rejects() {
        let key = Key::generate();
        let mut users = HashMap::new();
        users.insert(3, identity(3, Permission::Member));
        let state = state_with(MemStore(users), key.clone());
        let jar = jar_with_session(key, &claims_for(3));

        let err = resolve_session(&state, &jar).await.unwrap_err();
        assert!(matches!(err.reason(), DenyReason::NotElevated));
    }

    #[tokio::test]
    async fn store_failure_rejects_without_crashing() {
        let key = Key::generate();
        let state = state_with(FailingStore, key.clone());
        let jar = jar_with_session(key, &claims_for(1));

        let err = resolve_session(&state, &jar).await.unwrap_err();
        assert!(matches!(err.reason(), DenyReason::Store(_)));
    }

    #[tokio::test]
    async fn elevated_identity_passes_through_unchanged() {
        let key = Key::generate();
        let expected = Identity {
            profile_picture: Some("avatars/7.png".into()),
            ..identity(7, Permission::Admin)
        };
        let mut users = HashMap::new();
        users.insert(7, expected.clone());
        let state = state_with(MemStore(users), key.clone());
        let jar = jar_with_session(key, &claims_for(7));

        let resolved = resolve_session(&state, &jar).await.unwrap();
        assert_eq!(resolved, expected);
    }

    #[tokio::test]
    async fn owner_permission_passes() {
        let key = Key::generate();
        let mut users = HashMap::new();
        users.insert(1, identity(1, Permission::Owner));
        let state = state_with(MemStore(users), key.clone());
        let jar = jar_with_session(key, &claims_for(1));

        assert!(resolve_session(&state, &jar).await.is_ok());
    }
}
