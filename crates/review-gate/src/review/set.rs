use std::fmt;

use serde::{Deserialize, Serialize, Serializer};
use tracing::debug;

use super::attachment::AttachmentError;
use super::item::{ItemId, ReviewItem, ReviewStatus};
use super::policy::comment_for;

/// A single item or field failed a format or content rule.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("comment required")]
    CommentRequired,
    #[error("unknown item {0}")]
    UnknownItem(ItemId),
    #[error("item {0} already exists")]
    DuplicateItem(ItemId),
    #[error("unknown field {0}")]
    UnknownField(ItemId),
    #[error("{id}: {message}")]
    InvalidField { id: ItemId, message: String },
    #[error(transparent)]
    Attachment(#[from] AttachmentError),
}

/// Which items must exist before the set can be submitted. Review readiness
/// additionally needs every present item to be terminal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Requirement {
    /// Any items, as long as the set is not empty.
    AllItems,
    /// At least this many items.
    AtLeast(usize),
    /// These specific items.
    Items(Vec<ItemId>),
}

/// Derived status counts; always sum to the number of items.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ReviewCounts {
    pub approved: usize,
    pub rejected: usize,
    pub pending: usize,
}

impl ReviewCounts {
    pub fn total(&self) -> usize {
        self.approved + self.rejected + self.pending
    }
}

/// Why a set (or the session fields) is not ready yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BlockingReason {
    Pending(ItemId),
    MissingComment(ItemId),
    Missing(ItemId),
    InvalidField { id: ItemId, message: String },
    Shortfall { required: usize, present: usize },
    Empty,
}

impl fmt::Display for BlockingReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BlockingReason::Pending(id) => write!(f, "{id} pending"),
            BlockingReason::MissingComment(id) => write!(f, "{id} rejected without comment"),
            BlockingReason::Missing(id) => write!(f, "{id} missing"),
            BlockingReason::InvalidField { id, message } => write!(f, "{id}: {message}"),
            BlockingReason::Shortfall { required, present } => {
                write!(f, "{required} item(s) required, {present} provided")
            }
            BlockingReason::Empty => f.write_str("no items to review"),
        }
    }
}

impl Serialize for BlockingReason {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Aggregate answer to "may the parent action proceed?".
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Readiness {
    pub ready: bool,
    pub pending_count: usize,
    pub blocking_reasons: Vec<BlockingReason>,
}

impl Readiness {
    pub(crate) fn from_reasons(pending_count: usize, blocking_reasons: Vec<BlockingReason>) -> Self {
        Self {
            ready: blocking_reasons.is_empty(),
            pending_count,
            blocking_reasons,
        }
    }

    /// Human-readable reasons, in item order.
    pub fn messages(&self) -> Vec<String> {
        self.blocking_reasons
            .iter()
            .map(ToString::to_string)
            .collect()
    }
}

/// Ordered collection of items reviewed together in one session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReviewSet {
    requirement: Requirement,
    items: Vec<ReviewItem>,
}

impl ReviewSet {
    pub fn new(requirement: Requirement) -> Self {
        Self {
            requirement,
            items: Vec::new(),
        }
    }

    pub fn with_items(
        requirement: Requirement,
        items: impl IntoIterator<Item = ReviewItem>,
    ) -> Result<Self, ValidationError> {
        let mut set = Self::new(requirement);
        for item in items {
            set.add(item)?;
        }
        Ok(set)
    }

    pub fn requirement(&self) -> &Requirement {
        &self.requirement
    }

    pub fn items(&self) -> &[ReviewItem] {
        &self.items
    }

    pub fn get(&self, id: &ItemId) -> Option<&ReviewItem> {
        self.items.iter().find(|item| item.id() == id)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn add(&mut self, item: ReviewItem) -> Result<&ReviewItem, ValidationError> {
        if self.get(item.id()).is_some() {
            return Err(ValidationError::DuplicateItem(item.id().clone()));
        }
        self.items.push(item);
        let index = self.items.len() - 1;
        Ok(&self.items[index])
    }

    /// Remove an item so it can be recreated, e.g. a document being re-uploaded.
    pub fn remove(&mut self, id: &ItemId) -> Result<ReviewItem, ValidationError> {
        let index = self.position(id)?;
        Ok(self.items.remove(index))
    }

    /// Change one item's status. On any error the item is left untouched.
    pub fn set_item_status(
        &mut self,
        id: &ItemId,
        status: ReviewStatus,
        comment: Option<&str>,
    ) -> Result<&ReviewItem, ValidationError> {
        let index = self.position(id)?;
        let comment = comment_for(status, comment)?;

        let item = &mut self.items[index];
        if status == ReviewStatus::Approved {
            if let Some(result) = item.field_validation() {
                if !result.valid {
                    return Err(ValidationError::InvalidField {
                        id: id.clone(),
                        message: result.error.unwrap_or_default(),
                    });
                }
            }
        }

        let previous = item.status();
        item.apply(status, comment);
        debug!(item = %id, from = %previous, to = %status, "item status updated");
        Ok(&self.items[index])
    }

    pub fn counts(&self) -> ReviewCounts {
        self.items
            .iter()
            .fold(ReviewCounts::default(), |mut counts, item| {
                match item.status() {
                    ReviewStatus::Approved => counts.approved += 1,
                    ReviewStatus::Rejected => counts.rejected += 1,
                    ReviewStatus::Pending => counts.pending += 1,
                }
                counts
            })
    }

    /// Whether every item is terminal, every rejection is justified, and the
    /// requirement's items are present.
    pub fn compute_readiness(&self) -> Readiness {
        let mut reasons = Vec::new();
        let mut pending = 0;

        for item in &self.items {
            if !item.is_justified() {
                reasons.push(BlockingReason::MissingComment(item.id().clone()));
            } else if item.status() == ReviewStatus::Pending {
                pending += 1;
                reasons.push(BlockingReason::Pending(item.id().clone()));
            }
        }

        reasons.extend(self.presence_blockers());
        Readiness::from_reasons(pending, reasons)
    }

    /// Items the requirement needs to exist, regardless of their status.
    pub fn presence_blockers(&self) -> Vec<BlockingReason> {
        match &self.requirement {
            Requirement::AllItems if self.items.is_empty() => vec![BlockingReason::Empty],
            Requirement::AllItems => Vec::new(),
            Requirement::AtLeast(required) if self.items.len() < *required => {
                vec![BlockingReason::Shortfall {
                    required: *required,
                    present: self.items.len(),
                }]
            }
            Requirement::AtLeast(_) => Vec::new(),
            Requirement::Items(ids) => ids
                .iter()
                .filter(|id| self.get(id).is_none())
                .map(|id| BlockingReason::Missing(id.clone()))
                .collect(),
        }
    }

    /// Send every rejected item back to pending, keeping its comment.
    pub(crate) fn reset_rejected(&mut self) -> Vec<ItemId> {
        self.items
            .iter_mut()
            .filter(|item| item.status() == ReviewStatus::Rejected)
            .map(|item| {
                item.apply(ReviewStatus::Pending, None);
                item.id().clone()
            })
            .collect()
    }

    pub(crate) fn force_pending(&mut self, id: &ItemId) {
        if let Ok(index) = self.position(id) {
            self.items[index].apply(ReviewStatus::Pending, None);
        }
    }

    fn position(&self, id: &ItemId) -> Result<usize, ValidationError> {
        self.items
            .iter()
            .position(|item| item.id() == id)
            .ok_or_else(|| ValidationError::UnknownItem(id.clone()))
    }
}
