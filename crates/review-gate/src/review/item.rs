use std::fmt;

use serde::{Deserialize, Serialize};

use super::attachment::Attachment;
use super::validation::{validate, Rule, ValidationResult};

/// Stable identifier, unique within one review set.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ItemId(pub String);

impl ItemId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ItemId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for ItemId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ItemKind {
    Document,
    Field,
    ApplicationRecord,
}

/// Tri-state review status. Document screens call the approved state "verified".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ReviewStatus {
    Pending,
    #[serde(alias = "Verified", alias = "verified")]
    Approved,
    Rejected,
}

impl ReviewStatus {
    pub const fn is_terminal(self) -> bool {
        matches!(self, ReviewStatus::Approved | ReviewStatus::Rejected)
    }

    pub const fn label(self) -> &'static str {
        match self {
            ReviewStatus::Pending => "pending",
            ReviewStatus::Approved => "approved",
            ReviewStatus::Rejected => "rejected",
        }
    }
}

impl fmt::Display for ReviewStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Kind-specific data carried by an item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ItemPayload {
    Document(Attachment),
    Field { rule: Rule, raw_value: String },
    ApplicationRecord { application_id: String },
}

/// Atomic reviewable unit: a document, a form field, or an application record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReviewItem {
    id: ItemId,
    payload: ItemPayload,
    status: ReviewStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    comment: Option<String>,
}

impl ReviewItem {
    pub fn document(id: impl Into<ItemId>, attachment: Attachment) -> Self {
        Self::pending(id.into(), ItemPayload::Document(attachment))
    }

    pub fn field(id: impl Into<ItemId>, rule: Rule, raw_value: impl Into<String>) -> Self {
        Self::pending(
            id.into(),
            ItemPayload::Field {
                rule,
                raw_value: raw_value.into(),
            },
        )
    }

    pub fn application(id: impl Into<ItemId>, application_id: impl Into<String>) -> Self {
        Self::pending(
            id.into(),
            ItemPayload::ApplicationRecord {
                application_id: application_id.into(),
            },
        )
    }

    /// Build an item in an arbitrary state, e.g. when importing reviews in bulk.
    ///
    /// Nothing is checked here; the owning gate re-validates on construction and
    /// readiness reports any rejection that lacks a comment.
    pub fn from_parts(
        id: impl Into<ItemId>,
        payload: ItemPayload,
        status: ReviewStatus,
        comment: Option<String>,
    ) -> Self {
        Self {
            id: id.into(),
            payload,
            status,
            comment,
        }
    }

    fn pending(id: ItemId, payload: ItemPayload) -> Self {
        Self {
            id,
            payload,
            status: ReviewStatus::Pending,
            comment: None,
        }
    }

    pub fn id(&self) -> &ItemId {
        &self.id
    }

    pub fn kind(&self) -> ItemKind {
        match self.payload {
            ItemPayload::Document(_) => ItemKind::Document,
            ItemPayload::Field { .. } => ItemKind::Field,
            ItemPayload::ApplicationRecord { .. } => ItemKind::ApplicationRecord,
        }
    }

    pub fn payload(&self) -> &ItemPayload {
        &self.payload
    }

    pub fn status(&self) -> ReviewStatus {
        self.status
    }

    pub fn comment(&self) -> Option<&str> {
        self.comment.as_deref()
    }

    /// Rule check for field items; `None` for other kinds.
    pub fn field_validation(&self) -> Option<ValidationResult> {
        match &self.payload {
            ItemPayload::Field { rule, raw_value } => Some(validate(*rule, raw_value)),
            _ => None,
        }
    }

    /// False only for a rejection with no usable comment.
    pub fn is_justified(&self) -> bool {
        self.status != ReviewStatus::Rejected
            || self
                .comment
                .as_deref()
                .is_some_and(|comment| !comment.trim().is_empty())
    }

    pub(crate) fn apply(&mut self, status: ReviewStatus, comment: Option<String>) {
        self.status = status;
        if comment.is_some() {
            self.comment = comment;
        }
    }
}
