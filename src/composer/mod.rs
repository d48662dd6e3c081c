//! Multi-block email composer.
//!
//! A [`Composer`] owns the form fields and an ordered sequence of
//! [`EmailBlock`]s (text paragraphs and images). Positional order is the
//! load-bearing invariant: it is preserved across add/edit/remove and into
//! the dispatched manifest, where it becomes the paragraph/figure order of
//! the final document.
//!
//! The composer is an explicit one-shot state machine
//! (`Editing → Sending → Succeeded | Failed`); operations that are not
//! valid in the current state are rejected rather than ignored, and a
//! failed dispatch returns the form fully editable with nothing lost.

mod block;
#[allow(clippy::module_inception)]
mod composer;
mod validate;

pub use block::{
    ALLOWED_IMAGE_TYPES, AttachmentError, BlockKind, EmailBlock, ImageAttachment,
    MAX_IMAGE_BYTES,
};
pub use composer::{ComposeError, Composer, ComposerDefaults, ComposerState};
pub use validate::{Field, ValidationError, ValidationErrors};
