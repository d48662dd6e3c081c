use super::block::EmailBlock;
use crate::types::EmailAddress;

/// Which part of the form a validation error is attached to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    FromEmail,
    To,
    Subject,
    /// The block sequence as a whole (empty content).
    Content,
    /// A single block, by position.
    Block(usize),
}

impl std::fmt::Display for Field {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::FromEmail => f.write_str("fromEmail"),
            Self::To => f.write_str("to"),
            Self::Subject => f.write_str("subject"),
            Self::Content => f.write_str("content"),
            Self::Block(i) => write!(f, "block_{i}"),
        }
    }
}

/// One validation violation, keyed by field or block index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    pub field: Field,
    pub message: String,
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Accumulated validation violations.
///
/// Checks never short-circuit: every applicable violation is collected so
/// the user sees everything at once.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationErrors(Vec<ValidationError>);

impl ValidationErrors {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ValidationError> {
        self.0.iter()
    }

    /// The message recorded for `field`, if any.
    #[must_use]
    pub fn get(&self, field: Field) -> Option<&str> {
        self.0
            .iter()
            .find(|e| e.field == field)
            .map(|e| e.message.as_str())
    }

    pub(crate) fn push(&mut self, field: Field, message: impl Into<String>) {
        self.0.push(ValidationError {
            field,
            message: message.into(),
        });
    }
}

impl std::fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut first = true;
        for error in &self.0 {
            if !first {
                f.write_str("; ")?;
            }
            write!(f, "{error}")?;
            first = false;
        }
        Ok(())
    }
}

impl IntoIterator for ValidationErrors {
    type Item = ValidationError;
    type IntoIter = std::vec::IntoIter<ValidationError>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

/// Pure validation over current form state. Accumulates, never short-circuits.
pub(super) fn validate_form(
    from_email: &str,
    to: &str,
    subject: &str,
    blocks: &[EmailBlock],
) -> ValidationErrors {
    let mut errors = ValidationErrors::default();

    if from_email.is_empty() {
        errors.push(Field::FromEmail, "Sender address required");
    }
    if to.is_empty() {
        errors.push(Field::To, "Recipient address required");
    } else if EmailAddress::try_from(to.to_owned()).is_err() {
        errors.push(Field::To, "Recipient address is not valid");
    }
    if subject.is_empty() {
        errors.push(Field::Subject, "Subject required");
    }
    if blocks.is_empty() {
        errors.push(Field::Content, "Content is required");
    }
    for (i, block) in blocks.iter().enumerate() {
        match block {
            EmailBlock::Text(value) if value.is_empty() => {
                errors.push(Field::Block(i), "Text required");
            }
            EmailBlock::Image {
                attachment: None, ..
            } => {
                errors.push(Field::Block(i), "Image required");
            }
            _ => {}
        }
    }

    errors
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::composer::block::ImageAttachment;

    #[test]
    fn empty_form_reports_all_errors_together() {
        let errors = validate_form("", "", "", &[]);

        assert_eq!(errors.len(), 4);
        assert!(errors.get(Field::FromEmail).is_some());
        assert!(errors.get(Field::To).is_some());
        assert!(errors.get(Field::Subject).is_some());
        assert_eq!(errors.get(Field::Content), Some("Content is required"));
    }

    #[test]
    fn recipient_shape_is_checked() {
        let blocks = [EmailBlock::Text("hi".into())];
        let errors = validate_form("ops@example.com", "not-an-address", "Subject", &blocks);

        assert_eq!(errors.len(), 1);
        assert_eq!(errors.get(Field::To), Some("Recipient address is not valid"));
    }

    #[test]
    fn per_block_errors_are_keyed_by_position() {
        let blocks = [
            EmailBlock::Text("ok".into()),
            EmailBlock::Text(String::new()),
            EmailBlock::Image {
                attachment: None,
                error: None,
            },
        ];
        let errors = validate_form("ops@example.com", "to@example.com", "Subject", &blocks);

        assert_eq!(errors.len(), 2);
        assert_eq!(errors.get(Field::Block(1)), Some("Text required"));
        assert_eq!(errors.get(Field::Block(2)), Some("Image required"));
    }

    #[test]
    fn complete_form_validates_clean() {
        let blocks = [
            EmailBlock::Text("hello".into()),
            EmailBlock::Image {
                attachment: Some(ImageAttachment::try_new(vec![0u8; 4], "image/png").unwrap()),
                error: None,
            },
        ];
        let errors = validate_form("ops@example.com", "to@example.com", "Subject", &blocks);
        assert!(errors.is_empty());
    }

    #[test]
    fn field_keys_render_like_the_form() {
        assert_eq!(Field::FromEmail.to_string(), "fromEmail");
        assert_eq!(Field::Block(4).to_string(), "block_4");
    }
}
