use std::collections::BTreeMap;
use std::time::Duration;

use url::Url;

use super::render::render_document;
use super::request::DispatchRequest;
use super::traits::{AssetStore, MailRelay, OutboundEmail};

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Dispatch pipeline failure. One submission either completes or is
/// reported failed as a whole; partial success is not an outcome.
#[derive(Debug, thiserror::Error)]
pub enum DispatchError {
    /// The manifest names an image position with no corresponding binary part.
    #[error("no binary part for image block {0}")]
    MissingPart(usize),

    #[error("asset upload failed: {0}")]
    Asset(#[source] Box<dyn std::error::Error + Send + Sync>),

    #[error("mail relay failed: {0}")]
    Relay(#[source] Box<dyn std::error::Error + Send + Sync>),

    #[error("dispatch timed out after {0:?}")]
    TimedOut(Duration),
}

/// Orchestrates one submission: resolve parts, upload assets, render the
/// document, relay the mail. The whole run is bounded by a timeout so a
/// submission can never leave its caller waiting indefinitely.
pub struct Dispatcher<A, M> {
    assets: A,
    relay: M,
    timeout: Duration,
}

impl<A: AssetStore, M: MailRelay> Dispatcher<A, M> {
    #[must_use]
    pub fn new(assets: A, relay: M) -> Self {
        Self {
            assets,
            relay,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Bound the whole dispatch run (uploads + relay) by `timeout`.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Run one submission end to end.
    ///
    /// # Errors
    ///
    /// Returns [`DispatchError`] if any part is missing, any upload or the
    /// relay fails, or the run exceeds the configured timeout. On error
    /// nothing has been delivered to the recipient.
    pub async fn dispatch(&self, request: DispatchRequest) -> Result<(), DispatchError> {
        match tokio::time::timeout(self.timeout, self.run(request)).await {
            Ok(outcome) => outcome,
            Err(_) => Err(DispatchError::TimedOut(self.timeout)),
        }
    }

    async fn run(&self, request: DispatchRequest) -> Result<(), DispatchError> {
        // Every image entry must have its binary before any upload starts.
        for (i, entry) in request.manifest.iter().enumerate() {
            if entry.is_image() && !request.images.contains_key(&i) {
                return Err(DispatchError::MissingPart(i));
            }
        }

        let mut image_urls = BTreeMap::new();
        for (&i, part) in &request.images {
            let url = self
                .assets
                .store(&part.payload, &part.media_type)
                .await
                .map_err(DispatchError::Asset)?;
            tracing::debug!(position = i, url = %url, "image uploaded");
            image_urls.insert(i, url);
        }

        let mut document_links: Vec<(String, Url)> = Vec::with_capacity(request.documents.len());
        for document in &request.documents {
            let url = self
                .assets
                .store(&document.payload, &document.media_type)
                .await
                .map_err(DispatchError::Asset)?;
            document_links.push((document.filename.clone(), url));
        }

        let html = render_document(&request, &image_urls, &document_links);

        self.relay
            .relay(OutboundEmail {
                from_name: request.from_name.clone(),
                from_email: request.from_email.clone(),
                to: request.to.clone(),
                subject: request.subject.clone(),
                html,
            })
            .await
            .map_err(DispatchError::Relay)?;

        tracing::info!(
            to = %request.to,
            blocks = request.manifest.len(),
            images = request.images.len(),
            documents = request.documents.len(),
            "email dispatched"
        );
        Ok(())
    }
}
