use std::collections::BTreeMap;

use super::block::{AttachmentError, BlockKind, EmailBlock, ImageAttachment};
use super::validate::{Field, ValidationErrors, validate_form};
use crate::dispatch::{
    AssetStore, DispatchRequest, Dispatcher, ImagePart, MailRelay, ManifestEntry,
};
use crate::types::EmailAddress;

/// Lifecycle of one composer instance.
///
/// `Editing` is the initial state. `Failed` is fully recoverable (the form
/// stays editable and may be resubmitted); `Succeeded` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComposerState {
    Editing,
    Sending,
    Succeeded,
    Failed,
}

/// Pre-populated values for the optional form fields.
#[derive(Debug, Clone)]
pub struct ComposerDefaults {
    pub from_name: String,
    pub from_email: String,
    pub closing: String,
    pub signature: String,
    pub disclaimer: String,
}

impl Default for ComposerDefaults {
    fn default() -> Self {
        Self {
            from_name: "Support".into(),
            from_email: "support@example.com".into(),
            closing: "Regards".into(),
            signature: "Support".into(),
            disclaimer: "Please do not reply to this message.".into(),
        }
    }
}

impl ComposerDefaults {
    #[must_use]
    pub fn with_from_name(mut self, value: impl Into<String>) -> Self {
        self.from_name = value.into();
        self
    }

    #[must_use]
    pub fn with_from_email(mut self, value: impl Into<String>) -> Self {
        self.from_email = value.into();
        self
    }

    #[must_use]
    pub fn with_closing(mut self, value: impl Into<String>) -> Self {
        self.closing = value.into();
        self
    }

    #[must_use]
    pub fn with_signature(mut self, value: impl Into<String>) -> Self {
        self.signature = value.into();
        self
    }

    #[must_use]
    pub fn with_disclaimer(mut self, value: impl Into<String>) -> Self {
        self.disclaimer = value.into();
        self
    }
}

/// Composer operation failures.
#[derive(Debug, thiserror::Error)]
pub enum ComposeError {
    /// The operation is not valid in the current state.
    #[error("operation not valid while {0:?}")]
    InvalidState(ComposerState),

    #[error("no block at index {0}")]
    NoSuchBlock(usize),

    #[error("block {0} is not a text block")]
    NotText(usize),

    #[error("block {0} is not an image block")]
    NotImage(usize),

    #[error(transparent)]
    Attachment(#[from] AttachmentError),

    #[error("validation failed: {0}")]
    Invalid(ValidationErrors),

    #[error("dispatch failed: {0}")]
    Dispatch(String),
}

/// Stateful builder for one outbound email.
///
/// Owns the form fields and the ordered block sequence; nothing else reads
/// or mutates them. All editing operations are rejected while a submission
/// is in flight, which also rules out a second concurrent dispatch from the
/// same instance.
#[derive(Debug, Clone)]
pub struct Composer {
    state: ComposerState,
    last_error: Option<String>,
    from_name: String,
    from_email: String,
    to: String,
    subject: String,
    closing: String,
    signature: String,
    disclaimer: String,
    blocks: Vec<EmailBlock>,
}

impl Default for Composer {
    fn default() -> Self {
        Self::new(ComposerDefaults::default())
    }
}

impl Composer {
    #[must_use]
    pub fn new(defaults: ComposerDefaults) -> Self {
        Self {
            state: ComposerState::Editing,
            last_error: None,
            from_name: defaults.from_name,
            from_email: defaults.from_email,
            to: String::new(),
            subject: String::new(),
            closing: defaults.closing,
            signature: defaults.signature,
            disclaimer: defaults.disclaimer,
            blocks: Vec::new(),
        }
    }

    #[must_use]
    pub fn state(&self) -> ComposerState {
        self.state
    }

    /// Error surfaced by the most recent failed dispatch, if any.
    #[must_use]
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    #[must_use]
    pub fn blocks(&self) -> &[EmailBlock] {
        &self.blocks
    }

    #[must_use]
    pub fn to(&self) -> &str {
        &self.to
    }

    #[must_use]
    pub fn subject(&self) -> &str {
        &self.subject
    }

    // ── Field edits ────────────────────────────────────────────────────

    pub fn set_from_name(&mut self, value: impl Into<String>) -> Result<(), ComposeError> {
        self.ensure_editable()?;
        self.from_name = value.into();
        Ok(())
    }

    pub fn set_from_email(&mut self, value: impl Into<String>) -> Result<(), ComposeError> {
        self.ensure_editable()?;
        self.from_email = value.into();
        Ok(())
    }

    pub fn set_to(&mut self, value: impl Into<String>) -> Result<(), ComposeError> {
        self.ensure_editable()?;
        self.to = value.into();
        Ok(())
    }

    pub fn set_subject(&mut self, value: impl Into<String>) -> Result<(), ComposeError> {
        self.ensure_editable()?;
        self.subject = value.into();
        Ok(())
    }

    pub fn set_closing(&mut self, value: impl Into<String>) -> Result<(), ComposeError> {
        self.ensure_editable()?;
        self.closing = value.into();
        Ok(())
    }

    pub fn set_signature(&mut self, value: impl Into<String>) -> Result<(), ComposeError> {
        self.ensure_editable()?;
        self.signature = value.into();
        Ok(())
    }

    pub fn set_disclaimer(&mut self, value: impl Into<String>) -> Result<(), ComposeError> {
        self.ensure_editable()?;
        self.disclaimer = value.into();
        Ok(())
    }

    // ── Block operations ───────────────────────────────────────────────

    /// Append an empty block of the given kind. Returns its index.
    pub fn add_block(&mut self, kind: BlockKind) -> Result<usize, ComposeError> {
        self.ensure_editable()?;
        self.blocks.push(EmailBlock::empty(kind));
        Ok(self.blocks.len() - 1)
    }

    /// Replace the value of the text block at `index`.
    ///
    /// Positional and stable: no other block moves or changes.
    pub fn edit_text(
        &mut self,
        index: usize,
        value: impl Into<String>,
    ) -> Result<(), ComposeError> {
        self.ensure_editable()?;
        match self
            .blocks
            .get_mut(index)
            .ok_or(ComposeError::NoSuchBlock(index))?
        {
            EmailBlock::Text(current) => {
                *current = value.into();
                Ok(())
            }
            EmailBlock::Image { .. } => Err(ComposeError::NotText(index)),
        }
    }

    /// Attach an image payload to the image block at `index`.
    ///
    /// On rejection (media type or size) the block keeps whatever valid
    /// attachment it already had and records the rejection message; only
    /// the offending block is marked, editing of other blocks is unaffected.
    pub fn attach_image(
        &mut self,
        index: usize,
        payload: Vec<u8>,
        media_type: &str,
    ) -> Result<(), ComposeError> {
        self.ensure_editable()?;
        let block = self
            .blocks
            .get_mut(index)
            .ok_or(ComposeError::NoSuchBlock(index))?;
        let EmailBlock::Image { attachment, error } = block else {
            return Err(ComposeError::NotImage(index));
        };

        match ImageAttachment::try_new(payload, media_type) {
            Ok(accepted) => {
                *attachment = Some(accepted);
                *error = None;
                Ok(())
            }
            Err(rejected) => {
                *error = Some(rejected.to_string());
                Err(rejected.into())
            }
        }
    }

    /// Delete the block at `index`; later blocks shift down by one.
    pub fn remove_block(&mut self, index: usize) -> Result<(), ComposeError> {
        self.ensure_editable()?;
        if index >= self.blocks.len() {
            return Err(ComposeError::NoSuchBlock(index));
        }
        self.blocks.remove(index);
        Ok(())
    }

    // ── Validation & submission ────────────────────────────────────────

    /// Pure validation of the current form state. Accumulates every
    /// applicable violation; makes no network call and mutates nothing.
    #[must_use]
    pub fn validate(&self) -> ValidationErrors {
        validate_form(&self.from_email, &self.to, &self.subject, &self.blocks)
    }

    /// Transition into `Sending` and produce the dispatch payload.
    ///
    /// Only reachable from an editable state with zero validation errors;
    /// a submission already in flight is rejected, so no second dispatch
    /// can start from this instance. The form itself is left untouched —
    /// a later failure loses nothing.
    pub fn begin_send(&mut self) -> Result<DispatchRequest, ComposeError> {
        self.ensure_editable()?;

        let errors = self.validate();
        if !errors.is_empty() {
            return Err(ComposeError::Invalid(errors));
        }

        let to = EmailAddress::try_from(self.to.clone()).map_err(|_| {
            let mut errors = ValidationErrors::default();
            errors.push(Field::To, "Recipient address is not valid");
            ComposeError::Invalid(errors)
        })?;

        let mut manifest = Vec::with_capacity(self.blocks.len());
        let mut images = BTreeMap::new();
        for (i, block) in self.blocks.iter().enumerate() {
            match block {
                EmailBlock::Text(value) => manifest.push(ManifestEntry::text(value.clone())),
                EmailBlock::Image { attachment, .. } => {
                    let Some(attachment) = attachment else {
                        let mut errors = ValidationErrors::default();
                        errors.push(Field::Block(i), "Image required");
                        return Err(ComposeError::Invalid(errors));
                    };
                    manifest.push(ManifestEntry::image_placeholder(i));
                    images.insert(
                        i,
                        ImagePart {
                            payload: attachment.payload().to_vec(),
                            media_type: attachment.media_type().to_owned(),
                        },
                    );
                }
            }
        }

        self.state = ComposerState::Sending;
        self.last_error = None;

        Ok(DispatchRequest {
            from_name: self.from_name.clone(),
            from_email: self.from_email.clone(),
            to,
            subject: self.subject.clone(),
            closing: self.closing.clone(),
            signature: self.signature.clone(),
            disclaimer: self.disclaimer.clone(),
            manifest,
            images,
            documents: Vec::new(),
        })
    }

    /// Record the outcome of the in-flight submission.
    ///
    /// Success is terminal; failure surfaces the server-reported message
    /// and returns the form to a fully editable state with all content
    /// intact.
    pub fn complete_send(&mut self, outcome: Result<(), String>) -> Result<(), ComposeError> {
        if self.state != ComposerState::Sending {
            return Err(ComposeError::InvalidState(self.state));
        }
        match outcome {
            Ok(()) => self.state = ComposerState::Succeeded,
            Err(message) => {
                self.state = ComposerState::Failed;
                self.last_error = Some(message);
            }
        }
        Ok(())
    }

    /// Validate, dispatch, and record the outcome in one call.
    ///
    /// # Errors
    ///
    /// [`ComposeError::Invalid`] if validation fails (nothing is sent),
    /// [`ComposeError::Dispatch`] if the dispatcher reports failure (the
    /// composer transitions to `Failed` and stays editable).
    pub async fn send<A: AssetStore, M: MailRelay>(
        &mut self,
        dispatcher: &Dispatcher<A, M>,
    ) -> Result<(), ComposeError> {
        let request = self.begin_send()?;
        match dispatcher.dispatch(request).await {
            Ok(()) => {
                self.complete_send(Ok(()))?;
                Ok(())
            }
            Err(e) => {
                let message = e.to_string();
                self.complete_send(Err(message.clone()))?;
                Err(ComposeError::Dispatch(message))
            }
        }
    }

    fn ensure_editable(&self) -> Result<(), ComposeError> {
        match self.state {
            ComposerState::Editing | ComposerState::Failed => Ok(()),
            state => Err(ComposeError::InvalidState(state)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn filled_composer() -> Composer {
        let mut composer = Composer::default();
        composer.set_to("dest@example.com").unwrap();
        composer.set_subject("Greetings").unwrap();
        composer
    }

    fn attach_png(composer: &mut Composer, index: usize) {
        composer
            .attach_image(index, vec![0u8; 8], "image/png")
            .unwrap();
    }

    #[test]
    fn starts_editing_with_defaults() {
        let composer = Composer::default();
        assert_eq!(composer.state(), ComposerState::Editing);
        assert!(composer.blocks().is_empty());
        assert!(composer.last_error().is_none());
    }

    #[test]
    fn remove_preserves_relative_order() {
        let mut composer = filled_composer();
        for i in 0..5 {
            composer.add_block(BlockKind::Text).unwrap();
            composer.edit_text(i, format!("para {i}")).unwrap();
        }

        composer.remove_block(2).unwrap();

        let values: Vec<_> = composer
            .blocks()
            .iter()
            .map(|b| match b {
                EmailBlock::Text(v) => v.clone(),
                EmailBlock::Image { .. } => unreachable!(),
            })
            .collect();
        assert_eq!(values, ["para 0", "para 1", "para 3", "para 4"]);
    }

    #[test]
    fn remove_keeps_unrelated_block_errors() {
        let mut composer = filled_composer();
        composer.add_block(BlockKind::Text).unwrap();
        composer.add_block(BlockKind::Image).unwrap();
        let _ = composer.attach_image(1, vec![0u8; 4], "text/plain");

        composer.remove_block(0).unwrap();

        match &composer.blocks()[0] {
            EmailBlock::Image { error, .. } => assert!(error.is_some()),
            EmailBlock::Text(_) => unreachable!(),
        }
    }

    #[test]
    fn edit_does_not_interfere_with_other_blocks() {
        let mut composer = filled_composer();
        composer.add_block(BlockKind::Text).unwrap();
        composer.add_block(BlockKind::Text).unwrap();
        composer.add_block(BlockKind::Text).unwrap();
        composer.edit_text(0, "a").unwrap();
        composer.edit_text(1, "b").unwrap();
        composer.edit_text(2, "c").unwrap();

        composer.edit_text(1, "B").unwrap();

        assert_eq!(
            composer.blocks(),
            &[
                EmailBlock::Text("a".into()),
                EmailBlock::Text("B".into()),
                EmailBlock::Text("c".into()),
            ]
        );
    }

    #[test]
    fn edit_rejects_wrong_kind_and_bad_index() {
        let mut composer = filled_composer();
        composer.add_block(BlockKind::Image).unwrap();

        assert!(matches!(
            composer.edit_text(0, "x").unwrap_err(),
            ComposeError::NotText(0)
        ));
        assert!(matches!(
            composer.edit_text(9, "x").unwrap_err(),
            ComposeError::NoSuchBlock(9)
        ));
    }

    #[test]
    fn rejected_attach_keeps_prior_attachment() {
        let mut composer = filled_composer();
        composer.add_block(BlockKind::Image).unwrap();
        attach_png(&mut composer, 0);

        let err = composer
            .attach_image(0, vec![0u8; 4], "application/pdf")
            .unwrap_err();
        assert!(matches!(err, ComposeError::Attachment(_)));

        match &composer.blocks()[0] {
            EmailBlock::Image { attachment, error } => {
                let attachment = attachment.as_ref().expect("prior attachment kept");
                assert_eq!(attachment.media_type(), "image/png");
                assert!(error.is_some());
            }
            EmailBlock::Text(_) => unreachable!(),
        }
    }

    #[test]
    fn successful_attach_clears_block_error() {
        let mut composer = filled_composer();
        composer.add_block(BlockKind::Image).unwrap();
        let _ = composer.attach_image(0, vec![0u8; 4], "text/plain");

        attach_png(&mut composer, 0);

        match &composer.blocks()[0] {
            EmailBlock::Image { attachment, error } => {
                assert!(attachment.is_some());
                assert!(error.is_none());
            }
            EmailBlock::Text(_) => unreachable!(),
        }
    }

    #[test]
    fn begin_send_requires_clean_validation() {
        let mut composer = Composer::default();
        let err = composer.begin_send().unwrap_err();

        let ComposeError::Invalid(errors) = err else {
            panic!("expected validation failure");
        };
        assert!(errors.get(Field::To).is_some());
        assert!(errors.get(Field::Subject).is_some());
        assert_eq!(errors.get(Field::Content), Some("Content is required"));
        assert_eq!(composer.state(), ComposerState::Editing);
    }

    #[test]
    fn begin_send_builds_positional_manifest() {
        let mut composer = filled_composer();
        composer.add_block(BlockKind::Text).unwrap();
        composer.edit_text(0, "Hello").unwrap();
        composer.add_block(BlockKind::Text).unwrap();
        composer.edit_text(1, "World").unwrap();
        composer.add_block(BlockKind::Image).unwrap();
        attach_png(&mut composer, 2);

        let request = composer.begin_send().unwrap();

        assert_eq!(
            request.manifest,
            vec![
                ManifestEntry::text("Hello"),
                ManifestEntry::text("World"),
                ManifestEntry::image_placeholder(2),
            ]
        );
        assert_eq!(request.images.len(), 1);
        assert!(request.images.contains_key(&2));
        assert_eq!(composer.state(), ComposerState::Sending);
    }

    #[test]
    fn no_edits_or_resubmit_while_sending() {
        let mut composer = filled_composer();
        composer.add_block(BlockKind::Text).unwrap();
        composer.edit_text(0, "hi").unwrap();
        composer.begin_send().unwrap();

        assert!(matches!(
            composer.begin_send().unwrap_err(),
            ComposeError::InvalidState(ComposerState::Sending)
        ));
        assert!(matches!(
            composer.edit_text(0, "changed").unwrap_err(),
            ComposeError::InvalidState(ComposerState::Sending)
        ));
        assert!(matches!(
            composer.add_block(BlockKind::Text).unwrap_err(),
            ComposeError::InvalidState(ComposerState::Sending)
        ));
    }

    #[test]
    fn failed_send_keeps_content_and_allows_resubmit() {
        let mut composer = filled_composer();
        composer.add_block(BlockKind::Text).unwrap();
        composer.edit_text(0, "precious words").unwrap();
        composer.begin_send().unwrap();

        composer
            .complete_send(Err("relay unavailable".into()))
            .unwrap();

        assert_eq!(composer.state(), ComposerState::Failed);
        assert_eq!(composer.last_error(), Some("relay unavailable"));
        assert_eq!(composer.blocks(), &[EmailBlock::Text("precious words".into())]);

        // Fully recoverable: edit and resubmit.
        composer.edit_text(0, "edited after failure").unwrap();
        let request = composer.begin_send().unwrap();
        assert_eq!(
            request.manifest,
            vec![ManifestEntry::text("edited after failure")]
        );
    }

    #[test]
    fn success_is_terminal() {
        let mut composer = filled_composer();
        composer.add_block(BlockKind::Text).unwrap();
        composer.edit_text(0, "hi").unwrap();
        composer.begin_send().unwrap();
        composer.complete_send(Ok(())).unwrap();

        assert_eq!(composer.state(), ComposerState::Succeeded);
        assert!(matches!(
            composer.edit_text(0, "too late").unwrap_err(),
            ComposeError::InvalidState(ComposerState::Succeeded)
        ));
        assert!(composer.begin_send().is_err());
    }

    #[test]
    fn complete_send_requires_in_flight_submission() {
        let mut composer = Composer::default();
        assert!(matches!(
            composer.complete_send(Ok(())).unwrap_err(),
            ComposeError::InvalidState(ComposerState::Editing)
        ));
    }
}
