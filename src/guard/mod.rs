//! Session-gated access control for Axum back-office routes.
//!
//! Every protected handler is gated behind a valid elevated-permission
//! session. The session travels in an encrypted, authenticated cookie jar;
//! the embedded user id is resolved against a consumer-provided
//! [`IdentityStore`], and every ambiguous path (missing cookie, undecryptable
//! cookie, unparseable claims, unknown identity, store error, insufficient
//! permission) collapses to one behavior: a redirect to the configured
//! landing URL. No protected content is rendered on any failure path.
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use backoffice::guard::{GuardConfig, GuardState, Staff};
//!
//! // 1. Implement IdentityStore for your user table
//! // 2. Configure from environment
//! let state = GuardState::new(GuardConfig::from_env()?, my_store);
//!
//! // 3. Use the extractor in protected handlers
//! async fn dashboard(staff: Staff) -> String {
//!     format!("hello, {}", staff.identity.username)
//! }
//! ```

mod config;
mod cookies;
mod error;
mod extractor;
mod state;
mod traits;
mod types;

pub use config::GuardConfig;
pub use cookies::{clear_session, issue_session};
pub use error::{DenyReason, GuardError};
pub use extractor::{Staff, resolve_session};
pub use state::GuardState;
pub use traits::IdentityStore;
pub use types::{Identity, SessionClaims};

/// Re-export cookie key type for builder API.
pub use axum_extra::extract::cookie::Key as CookieKey;
