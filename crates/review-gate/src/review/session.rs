use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::item::{ItemId, ReviewStatus};

/// Session-level status driven by the gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SessionStatus {
    Draft,
    Submitted,
    UnderReview,
    Approved,
    Rejected,
}

impl SessionStatus {
    pub const fn label(self) -> &'static str {
        match self {
            SessionStatus::Draft => "draft",
            SessionStatus::Submitted => "submitted",
            SessionStatus::UnderReview => "under_review",
            SessionStatus::Approved => "approved",
            SessionStatus::Rejected => "rejected",
        }
    }

    /// Transition table for session events. `None` means the event is illegal here.
    pub const fn next(self, event: GateEvent) -> Option<SessionStatus> {
        match (self, event) {
            (SessionStatus::Draft, GateEvent::Submit) => Some(SessionStatus::Submitted),
            (SessionStatus::Submitted, GateEvent::BeginReview) => Some(SessionStatus::UnderReview),
            (SessionStatus::UnderReview, GateEvent::Approve) => Some(SessionStatus::Approved),
            (SessionStatus::UnderReview, GateEvent::Reject) => Some(SessionStatus::Rejected),
            (SessionStatus::Rejected, GateEvent::Resubmit) => Some(SessionStatus::Draft),
            _ => None,
        }
    }

    /// Whether `event` may happen in this status, including events that keep it.
    pub const fn permits(self, event: GateEvent) -> bool {
        match event {
            GateEvent::EditItems => matches!(self, SessionStatus::Draft),
            GateEvent::ReviewItem => matches!(self, SessionStatus::UnderReview),
            _ => self.next(event).is_some(),
        }
    }
}

impl fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Actions a caller can attempt against a gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GateEvent {
    Submit,
    BeginReview,
    Approve,
    Reject,
    Resubmit,
    /// Attach, remove or fill in items and fields.
    EditItems,
    /// Reviewer sets an item's status.
    ReviewItem,
}

impl fmt::Display for GateEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            GateEvent::Submit => "submit",
            GateEvent::BeginReview => "begin review",
            GateEvent::Approve => "approve",
            GateEvent::Reject => "reject",
            GateEvent::Resubmit => "resubmit",
            GateEvent::EditItems => "edit items",
            GateEvent::ReviewItem => "review item",
        };
        f.write_str(label)
    }
}

/// Audit entry appended for every committed change. History is never truncated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SessionEvent {
    pub at: DateTime<Utc>,
    pub cycle: u32,
    pub kind: SessionEventKind,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SessionEventKind {
    ItemAdded {
        item: ItemId,
    },
    ItemRemoved {
        item: ItemId,
    },
    ItemStatusChanged {
        item: ItemId,
        from: ReviewStatus,
        to: ReviewStatus,
        #[serde(skip_serializing_if = "Option::is_none")]
        comment: Option<String>,
    },
    InvariantHealed {
        item: ItemId,
    },
    Transitioned {
        from: SessionStatus,
        to: SessionStatus,
        #[serde(skip_serializing_if = "Option::is_none")]
        reason: Option<String>,
    },
    ItemsReset {
        items: Vec<ItemId>,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL: [SessionStatus; 5] = [
        SessionStatus::Draft,
        SessionStatus::Submitted,
        SessionStatus::UnderReview,
        SessionStatus::Approved,
        SessionStatus::Rejected,
    ];

    #[test]
    fn approved_has_no_outgoing_transitions() {
        for event in [
            GateEvent::Submit,
            GateEvent::BeginReview,
            GateEvent::Approve,
            GateEvent::Reject,
            GateEvent::Resubmit,
        ] {
            assert_eq!(SessionStatus::Approved.next(event), None, "{event}");
        }
    }

    #[test]
    fn outgoing_transition_counts_match_the_table() {
        let outgoing: Vec<usize> = ALL
            .iter()
            .map(|status| {
                [
                    GateEvent::Submit,
                    GateEvent::BeginReview,
                    GateEvent::Approve,
                    GateEvent::Reject,
                    GateEvent::Resubmit,
                ]
                .iter()
                .filter(|event| status.next(**event).is_some())
                .count()
            })
            .collect();
        assert_eq!(outgoing, vec![1, 1, 2, 0, 1]);
    }

    #[test]
    fn item_edits_and_reviews_are_phase_bound() {
        assert!(SessionStatus::Draft.permits(GateEvent::EditItems));
        assert!(!SessionStatus::Submitted.permits(GateEvent::EditItems));
        assert!(SessionStatus::UnderReview.permits(GateEvent::ReviewItem));
        assert!(!SessionStatus::Draft.permits(GateEvent::ReviewItem));
        assert!(!SessionStatus::Approved.permits(GateEvent::ReviewItem));
    }
}
