#![doc = include_str!("../README.md")]

pub mod composer;
pub mod dispatch;
pub mod error;
pub mod guard;
pub mod types;

// Re-exports for convenient access
pub use composer::{
    BlockKind, ComposeError, Composer, ComposerDefaults, ComposerState, EmailBlock,
    ValidationErrors,
};
pub use dispatch::{
    AssetStore, DispatchError, DispatchRequest, Dispatcher, MailRelay, ManifestEntry,
    OutboundEmail,
};
pub use error::Error;
pub use guard::{GuardConfig, GuardError, GuardState, IdentityStore, Staff, resolve_session};
pub use types::{EmailAddress, Permission, UserId};
