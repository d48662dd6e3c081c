use base64::Engine;
use base64::engine::general_purpose::STANDARD;

/// Image payload ceiling (2 MiB).
pub const MAX_IMAGE_BYTES: usize = 2 * 1024 * 1024;

/// Raster image media types accepted for attachment.
pub const ALLOWED_IMAGE_TYPES: [&str; 4] =
    ["image/jpeg", "image/png", "image/gif", "image/webp"];

/// Which variant of block to append.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockKind {
    Text,
    Image,
}

/// Why an image attachment was rejected.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AttachmentError {
    #[error("unsupported image type {0:?}")]
    UnsupportedMediaType(String),
    #[error("image exceeds the 2 MiB ceiling ({0} bytes)")]
    TooLarge(usize),
}

/// A validated image payload attached to an image block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageAttachment {
    payload: Vec<u8>,
    media_type: String,
    preview: String,
}

impl ImageAttachment {
    /// Validate and accept an image payload.
    ///
    /// Checks the declared media type against the allow-list and the size
    /// against [`MAX_IMAGE_BYTES`], then computes a data-URI preview usable
    /// for immediate display without any network round trip.
    ///
    /// # Errors
    ///
    /// Returns [`AttachmentError`] if the media type is not allowed or the
    /// payload is too large.
    pub fn try_new(payload: Vec<u8>, media_type: &str) -> Result<Self, AttachmentError> {
        if !ALLOWED_IMAGE_TYPES.contains(&media_type) {
            return Err(AttachmentError::UnsupportedMediaType(media_type.to_owned()));
        }
        if payload.len() > MAX_IMAGE_BYTES {
            return Err(AttachmentError::TooLarge(payload.len()));
        }

        let preview = format!("data:{media_type};base64,{}", STANDARD.encode(&payload));
        Ok(Self {
            payload,
            media_type: media_type.to_owned(),
            preview,
        })
    }

    #[must_use]
    pub fn payload(&self) -> &[u8] {
        &self.payload
    }

    #[must_use]
    pub fn media_type(&self) -> &str {
        &self.media_type
    }

    /// Data-URI rendition of the payload for on-screen preview.
    #[must_use]
    pub fn preview(&self) -> &str {
        &self.preview
    }
}

/// One ordered unit of email content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EmailBlock {
    /// A text paragraph; must be non-empty before submission.
    Text(String),
    /// An image; must have an attached payload before submission.
    Image {
        attachment: Option<ImageAttachment>,
        /// Last attachment rejection for this block, if any.
        error: Option<String>,
    },
}

impl EmailBlock {
    pub(crate) fn empty(kind: BlockKind) -> Self {
        match kind {
            BlockKind::Text => Self::Text(String::new()),
            BlockKind::Image => Self::Image {
                attachment: None,
                error: None,
            },
        }
    }

    #[must_use]
    pub fn kind(&self) -> BlockKind {
        match self {
            Self::Text(_) => BlockKind::Text,
            Self::Image { .. } => BlockKind::Image,
        }
    }
}
