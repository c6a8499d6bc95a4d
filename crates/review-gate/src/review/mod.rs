//! Multi-item review gate shared by the KYC, document verification, and
//! application review screens.
//!
//! Screens build a [`ReviewGate`] (usually through a [`ReviewProfile`]), feed it
//! field values and attachments, and react to the [`Readiness`] and
//! [`GateError`] values it returns. Nothing here performs I/O.

pub mod attachment;
pub mod fields;
pub mod gate;
pub mod item;
pub(crate) mod policy;
pub mod profile;
pub mod session;
pub mod set;
pub mod transport;
pub mod validation;

#[cfg(test)]
mod tests;

pub use attachment::{Attachment, AttachmentError, AttachmentPicker, AttachmentPolicy, PickOutcome};
pub use fields::{FieldSet, SessionField};
pub use gate::{GateError, ReviewGate};
pub use item::{ItemId, ItemKind, ItemPayload, ReviewItem, ReviewStatus};
pub use policy::{require_justification, InvariantMode};
pub use profile::ReviewProfile;
pub use session::{GateEvent, SessionEvent, SessionEventKind, SessionStatus};
pub use set::{BlockingReason, Readiness, Requirement, ReviewCounts, ReviewSet, ValidationError};
pub use transport::{Ack, SessionSnapshot, SubmissionTransport, TransportFailure};
pub use validation::{validate, validate_named, Rule, UnknownRule, ValidationResult};
