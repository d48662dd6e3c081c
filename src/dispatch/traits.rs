use std::future::Future;

use url::Url;

use crate::types::EmailAddress;

/// Finished email handed to the mail relay.
#[derive(Debug, Clone)]
pub struct OutboundEmail {
    pub from_name: String,
    pub from_email: String,
    pub to: EmailAddress,
    pub subject: String,
    pub html: String,
}

/// Persistent asset host: stores a binary and returns a durable,
/// publicly retrievable URL for it.
pub trait AssetStore: Send + Sync + 'static {
    fn store(
        &self,
        payload: &[u8],
        media_type: &str,
    ) -> impl Future<Output = Result<Url, Box<dyn std::error::Error + Send + Sync>>> + Send;
}

/// Outbound mail transport.
pub trait MailRelay: Send + Sync + 'static {
    fn relay(
        &self,
        email: OutboundEmail,
    ) -> impl Future<Output = Result<(), Box<dyn std::error::Error + Send + Sync>>> + Send;
}
