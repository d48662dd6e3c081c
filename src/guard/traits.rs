use std::future::Future;

use super::types::Identity;
use crate::types::UserId;

/// Consumer-provided identity lookup.
///
/// Called by the guard on every protected request to resolve the user id
/// embedded in the session claims. The lookup must be read-only; the guard
/// never mutates state through it.
///
/// # Example
///
/// ```rust,ignore
/// impl IdentityStore for MyAppState {
///     async fn find(
///         &self,
///         user_id: UserId,
///     ) -> Result<Option<Identity>, Box<dyn std::error::Error + Send + Sync>> {
///         Ok(self.repo.find_user(user_id).await?.map(Identity::from))
///     }
/// }
/// ```
pub trait IdentityStore: Send + Sync + 'static {
    /// Look up an identity by user id. `Ok(None)` means no such user.
    fn find(
        &self,
        user_id: UserId,
    ) -> impl Future<Output = Result<Option<Identity>, Box<dyn std::error::Error + Send + Sync>>>
    + Send;
}

/// Object-safe wrapper for IdentityStore (needed for Arc<dyn>).
pub(super) trait IdentityStoreDyn: Send + Sync {
    fn find_dyn(
        &self,
        user_id: UserId,
    ) -> std::pin::Pin<
        Box<
            dyn std::future::Future<
                    Output = Result<
                        Option<Identity>,
                        Box<dyn std::error::Error + Send + Sync>,
                    >,
                > + Send
                + '_,
        >,
    >;
}

impl<T: IdentityStore> IdentityStoreDyn for T {
    fn find_dyn(
        &self,
        user_id: UserId,
    ) -> std::pin::Pin<
        Box<
            dyn std::future::Future<
                    Output = Result<
                        Option<Identity>,
                        Box<dyn std::error::Error + Send + Sync>,
                    >,
                > + Send
                + '_,
        >,
    > {
        Box::pin(self.find(user_id))
    }
}
