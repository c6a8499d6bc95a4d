use mime::Mime;
use serde::{Deserialize, Serialize};

const DEFAULT_MAX_BYTES: u64 = 5 * 1024 * 1024;

/// Completed attachment descriptor handed over by the platform picker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attachment {
    pub uri: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mime_hint: Option<String>,
    pub size_bytes: u64,
}

impl Attachment {
    pub fn new(uri: impl Into<String>, name: impl Into<String>, size_bytes: u64) -> Self {
        Self {
            uri: uri.into(),
            name: name.into(),
            mime_hint: None,
            size_bytes,
        }
    }

    pub fn with_mime_hint(mut self, hint: impl Into<String>) -> Self {
        self.mime_hint = Some(hint.into());
        self
    }

    /// Media type from the picker's hint, falling back to the file extension.
    pub fn media_type(&self) -> Option<Mime> {
        let hinted = self
            .mime_hint
            .as_deref()
            .map(str::trim)
            .filter(|hint| !hint.is_empty())
            .and_then(|hint| hint.parse::<Mime>().ok());

        hinted
            .or_else(|| mime_guess::from_path(&self.name).first())
            .map(canonical)
    }
}

// Some pickers report the non-registered `image/jpg`.
fn canonical(media_type: Mime) -> Mime {
    if media_type.type_() == mime::IMAGE && media_type.subtype().as_str() == "jpg" {
        mime::IMAGE_JPEG
    } else {
        media_type
    }
}

/// Attachment rejected before it becomes a document item.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AttachmentError {
    #[error("attachment has no file name")]
    EmptyName,
    #[error("attachment is {size} bytes, exceeding the {max} byte limit")]
    TooLarge { size: u64, max: u64 },
    #[error("unsupported attachment type: {0}")]
    UnsupportedType(String),
}

/// Size and type constraints applied to every uploaded document.
#[derive(Debug, Clone, PartialEq)]
pub struct AttachmentPolicy {
    max_bytes: u64,
    accepted: Vec<Mime>,
}

impl AttachmentPolicy {
    pub fn new(max_bytes: u64, accepted: Vec<Mime>) -> Self {
        Self {
            max_bytes,
            accepted: accepted.into_iter().map(canonical).collect(),
        }
    }

    pub fn max_bytes(&self) -> u64 {
        self.max_bytes
    }

    pub fn accepted(&self) -> &[Mime] {
        &self.accepted
    }

    /// Returns the resolved media type when the attachment is acceptable.
    pub fn check(&self, attachment: &Attachment) -> Result<Mime, AttachmentError> {
        if attachment.name.trim().is_empty() {
            return Err(AttachmentError::EmptyName);
        }

        if attachment.size_bytes > self.max_bytes {
            return Err(AttachmentError::TooLarge {
                size: attachment.size_bytes,
                max: self.max_bytes,
            });
        }

        let media_type = attachment
            .media_type()
            .ok_or_else(|| AttachmentError::UnsupportedType(attachment.name.clone()))?;

        if self
            .accepted
            .iter()
            .any(|accepted| accepted.essence_str() == media_type.essence_str())
        {
            Ok(media_type)
        } else {
            Err(AttachmentError::UnsupportedType(media_type.to_string()))
        }
    }
}

impl Default for AttachmentPolicy {
    fn default() -> Self {
        Self::new(
            DEFAULT_MAX_BYTES,
            vec![mime::APPLICATION_PDF, mime::IMAGE_JPEG, mime::IMAGE_PNG],
        )
    }
}

/// Result of asking the platform for a file or photo.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PickOutcome {
    Picked(Attachment),
    Cancelled,
}

/// Platform file/photo picker. The gate only consumes its result.
pub trait AttachmentPicker {
    fn pick(&mut self) -> PickOutcome;
}
