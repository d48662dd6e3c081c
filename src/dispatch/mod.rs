//! Email dispatch pipeline.
//!
//! Takes a [`DispatchRequest`] (fields + positional manifest + binary
//! parts), uploads every binary to an [`AssetStore`], renders one linear
//! HTML document in manifest order, and hands it to a [`MailRelay`].
//! All-or-nothing: any failure surfaces as a single [`DispatchError`] and
//! nothing is partially delivered.
//!
//! With the `relay` feature (default), [`HttpAssetStore`], [`SmtpRelay`],
//! and the guarded multipart [`dispatch_routes`] endpoint are available.

#[cfg(feature = "relay")]
mod assets;
#[cfg(feature = "relay")]
mod config;
mod dispatcher;
mod render;
mod request;
#[cfg(feature = "relay")]
mod routes;
#[cfg(feature = "relay")]
mod smtp;
mod traits;

#[cfg(feature = "relay")]
pub use assets::{AssetHostConfig, HttpAssetStore};
#[cfg(feature = "relay")]
pub use config::RelayConfig;
pub use dispatcher::{DispatchError, Dispatcher};
pub use render::render_document;
pub use request::{DispatchRequest, DocumentPart, ImagePart, ManifestEntry};
#[cfg(feature = "relay")]
pub use routes::dispatch_routes;
#[cfg(feature = "relay")]
pub use smtp::SmtpRelay;
pub use traits::{AssetStore, MailRelay, OutboundEmail};
