use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};

use crate::config::GateConfig;

use super::attachment::{Attachment, AttachmentPicker, PickOutcome};
use super::fields::FieldSet;
use super::item::{ItemId, ItemPayload, ReviewItem, ReviewStatus};
use super::policy::{enforce_justifications, require_justification};
use super::session::{GateEvent, SessionEvent, SessionEventKind, SessionStatus};
use super::set::{BlockingReason, Readiness, ReviewSet, ValidationError};
use super::transport::{Ack, SessionSnapshot, SubmissionTransport, TransportFailure};
use super::validation::{validate_named, Rule, ValidationResult};

/// Error raised by gate operations. A failed call never changes any state.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GateError {
    #[error("not ready: {}", join_reasons(.blocking_reasons))]
    NotReady {
        blocking_reasons: Vec<BlockingReason>,
    },
    #[error("a reason is required to reject")]
    MissingReason,
    #[error("cannot {event} while the session is {from}")]
    IllegalTransition {
        from: SessionStatus,
        event: GateEvent,
    },
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Transport(#[from] TransportFailure),
}

fn join_reasons(reasons: &[BlockingReason]) -> String {
    reasons
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// Owns one review set and the session fields, and decides when the parent
/// action (submit, approve, reject) is allowed.
#[derive(Debug)]
pub struct ReviewGate {
    status: SessionStatus,
    cycle: u32,
    fields: FieldSet,
    review_set: ReviewSet,
    config: GateConfig,
    rejection_reason: Option<String>,
    submitted_at: Option<DateTime<Utc>>,
    submission_ack: Option<Ack>,
    history: Vec<SessionEvent>,
}

impl ReviewGate {
    pub fn new(review_set: ReviewSet, config: GateConfig) -> Self {
        Self::with_fields(FieldSet::new(), review_set, config)
    }

    /// Take ownership of a set that may have been built outside the guarded path.
    ///
    /// Rejections without a comment panic or are healed, per `config.invariant_mode`.
    pub fn with_fields(fields: FieldSet, mut review_set: ReviewSet, config: GateConfig) -> Self {
        let healed = enforce_justifications(&mut review_set, config.invariant_mode);
        let mut gate = Self {
            status: SessionStatus::Draft,
            cycle: 1,
            fields,
            review_set,
            config,
            rejection_reason: None,
            submitted_at: None,
            submission_ack: None,
            history: Vec::new(),
        };
        for item in healed {
            gate.record(SessionEventKind::InvariantHealed { item });
        }
        gate
    }

    pub fn status(&self) -> SessionStatus {
        self.status
    }

    /// Submission cycle, starting at 1 and bumped on every resubmission.
    pub fn cycle(&self) -> u32 {
        self.cycle
    }

    pub fn review_set(&self) -> &ReviewSet {
        &self.review_set
    }

    pub fn fields(&self) -> &FieldSet {
        &self.fields
    }

    pub fn history(&self) -> &[SessionEvent] {
        &self.history
    }

    pub fn rejection_reason(&self) -> Option<&str> {
        self.rejection_reason.as_deref()
    }

    pub fn submitted_at(&self) -> Option<DateTime<Utc>> {
        self.submitted_at
    }

    pub fn submission_ack(&self) -> Option<&Ack> {
        self.submission_ack.as_ref()
    }

    pub fn readiness(&self) -> Readiness {
        self.review_set.compute_readiness()
    }

    pub fn field_readiness(&self) -> Readiness {
        self.fields.readiness()
    }

    pub fn validate_field(&self, rule_name: &str, raw_value: &str) -> ValidationResult {
        validate_named(rule_name, raw_value)
    }

    pub fn register_field(&mut self, id: impl Into<ItemId>, rule: Rule) -> Result<(), GateError> {
        self.ensure(GateEvent::EditItems)?;
        self.fields.register(id, rule)?;
        Ok(())
    }

    /// Store a field value. An invalid value is stored too and reported in the result.
    pub fn set_field(
        &mut self,
        id: &ItemId,
        raw_value: impl Into<String>,
    ) -> Result<ValidationResult, GateError> {
        self.ensure(GateEvent::EditItems)?;
        Ok(self.fields.set_value(id, raw_value)?)
    }

    pub fn attach_document(
        &mut self,
        id: impl Into<ItemId>,
        attachment: Attachment,
    ) -> Result<&ReviewItem, GateError> {
        self.add_item(ReviewItem::document(id, attachment))
    }

    /// Attach whatever the picker returns. A cancelled pick changes nothing.
    pub fn attach_picked<P: AttachmentPicker>(
        &mut self,
        id: impl Into<ItemId>,
        picker: &mut P,
    ) -> Result<Option<&ReviewItem>, GateError> {
        self.ensure(GateEvent::EditItems)?;
        match picker.pick() {
            PickOutcome::Picked(attachment) => self.attach_document(id, attachment).map(Some),
            PickOutcome::Cancelled => Ok(None),
        }
    }

    /// Add an item in draft. Documents must pass the attachment policy, and an
    /// unjustified rejection panics or is healed, per `config.invariant_mode`.
    pub fn add_item(&mut self, item: ReviewItem) -> Result<&ReviewItem, GateError> {
        self.ensure(GateEvent::EditItems)?;
        if let ItemPayload::Document(attachment) = item.payload() {
            self.config
                .attachments
                .check(attachment)
                .map_err(ValidationError::from)?;
        }
        let id = item.id().clone();
        self.review_set.add(item)?;
        self.record(SessionEventKind::ItemAdded { item: id.clone() });

        for healed in enforce_justifications(&mut self.review_set, self.config.invariant_mode) {
            self.record(SessionEventKind::InvariantHealed { item: healed });
        }
        self.item(&id)
    }

    pub fn remove_item(&mut self, id: &ItemId) -> Result<ReviewItem, GateError> {
        self.ensure(GateEvent::EditItems)?;
        let removed = self.review_set.remove(id)?;
        self.record(SessionEventKind::ItemRemoved { item: id.clone() });
        Ok(removed)
    }

    /// Reviewer-side status change; only accepted while the session is under review.
    pub fn set_item_status(
        &mut self,
        id: &ItemId,
        status: ReviewStatus,
        comment: Option<&str>,
    ) -> Result<&ReviewItem, GateError> {
        self.ensure(GateEvent::ReviewItem)?;
        let from = self
            .review_set
            .get(id)
            .map(ReviewItem::status)
            .ok_or_else(|| ValidationError::UnknownItem(id.clone()))?;
        let stored_comment = self
            .review_set
            .set_item_status(id, status, comment)?
            .comment()
            .map(str::to_string);

        self.record(SessionEventKind::ItemStatusChanged {
            item: id.clone(),
            from,
            to: status,
            comment: stored_comment,
        });
        self.item(id)
    }

    pub fn submit(&mut self) -> Result<SessionStatus, GateError> {
        self.check_submission()?;
        self.submitted_at = Some(Utc::now());
        Ok(self.commit(GateEvent::Submit, None))
    }

    /// Validate, hand the snapshot to `transport`, and only transition on an ack.
    pub fn submit_with<T: SubmissionTransport + ?Sized>(
        &mut self,
        transport: &T,
    ) -> Result<SessionStatus, GateError> {
        self.check_submission()?;
        let snapshot = self.snapshot();
        let ack = transport.submit(&snapshot).map_err(|failure| {
            warn!(cycle = self.cycle, error = %failure, "submission transport failed");
            GateError::from(failure)
        })?;

        info!(cycle = self.cycle, reference = %ack.reference, "submission acknowledged");
        self.submission_ack = Some(ack);
        self.submitted_at = Some(Utc::now());
        Ok(self.commit(GateEvent::Submit, None))
    }

    /// External reviewer picks the submission up.
    pub fn begin_review(&mut self) -> Result<SessionStatus, GateError> {
        self.ensure(GateEvent::BeginReview)?;
        Ok(self.commit(GateEvent::BeginReview, None))
    }

    pub fn approve(&mut self) -> Result<SessionStatus, GateError> {
        self.ensure(GateEvent::Approve)?;
        let readiness = self.review_set.compute_readiness();
        if !readiness.ready {
            return Err(self.not_ready(readiness.blocking_reasons));
        }
        Ok(self.commit(GateEvent::Approve, None))
    }

    /// Reject the whole session. The reason is independent of any item comment.
    pub fn reject(&mut self, reason: &str) -> Result<SessionStatus, GateError> {
        self.ensure(GateEvent::Reject)?;
        let reason = require_justification(Some(reason)).map_err(|_| {
            warn!(cycle = self.cycle, "session rejection refused without a reason");
            GateError::MissingReason
        })?;
        self.rejection_reason = Some(reason.clone());
        Ok(self.commit(GateEvent::Reject, Some(reason)))
    }

    /// Re-enter draft after a rejection. Only rejected items go back to pending.
    pub fn resubmit(&mut self) -> Result<SessionStatus, GateError> {
        self.ensure(GateEvent::Resubmit)?;
        let reset = self.review_set.reset_rejected();
        if !reset.is_empty() {
            self.record(SessionEventKind::ItemsReset { items: reset });
        }
        self.rejection_reason = None;
        self.submitted_at = None;
        self.submission_ack = None;
        let status = self.commit(GateEvent::Resubmit, None);
        self.cycle += 1;
        Ok(status)
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            status: self.status,
            cycle: self.cycle,
            fields: self.fields.fields().to_vec(),
            items: self.review_set.items().to_vec(),
            counts: self.review_set.counts(),
        }
    }

    fn check_submission(&self) -> Result<(), GateError> {
        self.ensure(GateEvent::Submit)?;

        let fields = self.fields.readiness();
        if !fields.ready {
            return Err(self.not_ready(fields.blocking_reasons));
        }

        let missing = self.review_set.presence_blockers();
        if !missing.is_empty() {
            return Err(self.not_ready(missing));
        }
        Ok(())
    }

    fn ensure(&self, event: GateEvent) -> Result<(), GateError> {
        if self.status.permits(event) {
            Ok(())
        } else {
            warn!(status = %self.status, %event, "illegal gate transition refused");
            Err(GateError::IllegalTransition {
                from: self.status,
                event,
            })
        }
    }

    fn not_ready(&self, blocking_reasons: Vec<BlockingReason>) -> GateError {
        debug!(
            status = %self.status,
            blockers = blocking_reasons.len(),
            "gate action blocked"
        );
        GateError::NotReady { blocking_reasons }
    }

    // Callers must have checked `ensure(event)` for a table event.
    fn commit(&mut self, event: GateEvent, reason: Option<String>) -> SessionStatus {
        let from = self.status;
        let to = from.next(event).unwrap_or(from);
        self.status = to;
        info!(cycle = self.cycle, %from, %to, %event, "session transitioned");
        self.record(SessionEventKind::Transitioned { from, to, reason });
        to
    }

    fn record(&mut self, kind: SessionEventKind) {
        self.history.push(SessionEvent {
            at: Utc::now(),
            cycle: self.cycle,
            kind,
        });
    }

    fn item(&self, id: &ItemId) -> Result<&ReviewItem, GateError> {
        self.review_set
            .get(id)
            .ok_or_else(|| ValidationError::UnknownItem(id.clone()).into())
    }
}
