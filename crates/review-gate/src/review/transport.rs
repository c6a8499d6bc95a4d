use serde::{Deserialize, Serialize};

use super::fields::SessionField;
use super::item::ReviewItem;
use super::session::SessionStatus;
use super::set::ReviewCounts;

/// Serializable view of a session handed to the submission transport.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionSnapshot {
    pub status: SessionStatus,
    pub cycle: u32,
    pub fields: Vec<SessionField>,
    pub items: Vec<ReviewItem>,
    pub counts: ReviewCounts,
}

impl SessionSnapshot {
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

/// Acknowledgement returned by the transport once a submission is accepted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ack {
    pub reference: String,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TransportFailure {
    #[error("submission refused: {0}")]
    Refused(String),
    #[error("transport unavailable: {0}")]
    Unavailable(String),
}

/// Outbound hook that delivers a validated session. The gate treats it as a black box.
pub trait SubmissionTransport: Send + Sync {
    fn submit(&self, snapshot: &SessionSnapshot) -> Result<Ack, TransportFailure>;
}
