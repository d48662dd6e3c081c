use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::types::EmailAddress;

/// One positional entry of the dispatch manifest.
///
/// Text entries carry their literal value; image entries carry an opaque
/// placeholder, since the binary travels as a separate part keyed by the
/// same position. Wire shape matches the browser form:
/// `{"type":"text","value":"..."}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ManifestEntry {
    Text { value: String },
    Image { value: String },
}

impl ManifestEntry {
    #[must_use]
    pub fn text(value: impl Into<String>) -> Self {
        Self::Text {
            value: value.into(),
        }
    }

    /// Image entry whose value is the positional placeholder for `index`.
    #[must_use]
    pub fn image_placeholder(index: usize) -> Self {
        Self::Image {
            value: format!("__image_{index}__"),
        }
    }

    #[must_use]
    pub fn is_image(&self) -> bool {
        matches!(self, Self::Image { .. })
    }
}

/// Raw image payload keyed by manifest position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImagePart {
    pub payload: Vec<u8>,
    pub media_type: String,
}

/// Supplementary document attachment, listed after the content blocks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentPart {
    pub filename: String,
    pub payload: Vec<u8>,
    pub media_type: String,
}

/// One complete outbound submission, assembled by the composer (or parsed
/// from the multipart form) and consumed by the [`Dispatcher`](super::Dispatcher).
///
/// Exists only for the duration of one dispatch; it has no persisted
/// identity.
#[derive(Debug, Clone)]
pub struct DispatchRequest {
    pub from_name: String,
    pub from_email: String,
    pub to: EmailAddress,
    pub subject: String,
    pub closing: String,
    pub signature: String,
    pub disclaimer: String,
    /// Ordered, binary-free description of the content blocks.
    pub manifest: Vec<ManifestEntry>,
    /// Image payloads keyed by manifest position.
    pub images: BTreeMap<usize, ImagePart>,
    pub documents: Vec<DocumentPart>,
}
