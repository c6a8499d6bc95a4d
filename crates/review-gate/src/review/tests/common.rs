use std::sync::Mutex;

use crate::config::GateConfig;
use crate::review::attachment::{Attachment, AttachmentPicker, AttachmentPolicy, PickOutcome};
use crate::review::gate::ReviewGate;
use crate::review::item::{ItemId, ReviewItem, ReviewStatus};
use crate::review::policy::InvariantMode;
use crate::review::profile::{self, ReviewProfile};
use crate::review::set::{Requirement, ReviewSet};
use crate::review::transport::{Ack, SessionSnapshot, SubmissionTransport, TransportFailure};

pub(super) fn heal_config() -> GateConfig {
    GateConfig {
        attachments: AttachmentPolicy::default(),
        invariant_mode: InvariantMode::Heal,
    }
}

pub(super) fn strict_config() -> GateConfig {
    GateConfig {
        attachments: AttachmentPolicy::default(),
        invariant_mode: InvariantMode::Panic,
    }
}

pub(super) fn id(raw: &str) -> ItemId {
    ItemId::from(raw)
}

pub(super) fn pdf(name: &str) -> Attachment {
    Attachment::new(format!("file:///uploads/{name}"), name, 240_000)
}

pub(super) fn document(raw_id: &str) -> ReviewItem {
    ReviewItem::document(raw_id, pdf(&format!("{raw_id}.pdf")))
}

/// Three pending documents under the all-items requirement.
pub(super) fn three_documents() -> ReviewSet {
    ReviewSet::with_items(
        Requirement::AllItems,
        [document("doc-1"), document("doc-2"), document("doc-3")],
    )
    .expect("distinct ids")
}

pub(super) fn document_gate() -> ReviewGate {
    ReviewGate::new(three_documents(), strict_config())
}

/// KYC gate with valid identity and bank fields plus one uploaded document.
pub(super) fn filled_kyc_gate() -> ReviewGate {
    let mut gate = ReviewProfile::Kyc.gate(strict_config());
    for (field, value) in [
        (profile::IDENTITY_NUMBER, "ABCDE1234F"),
        (profile::ACCOUNT_HOLDER, "Asha Verma"),
        (profile::ACCOUNT_NUMBER, "123456789012"),
        (profile::IFSC, "sbin0001234"),
    ] {
        let result = gate.set_field(&id(field), value).expect("kyc field");
        assert!(result.valid, "{field} should validate: {result:?}");
    }
    gate.attach_document("pan_card", pdf("pan_card.pdf"))
        .expect("pdf attaches");
    gate
}

/// Drive a gate from draft into review without touching items.
pub(super) fn under_review(mut gate: ReviewGate) -> ReviewGate {
    gate.submit().expect("submits");
    gate.begin_review().expect("review begins");
    gate
}

pub(super) fn approve_all(gate: &mut ReviewGate) {
    let ids: Vec<ItemId> = gate
        .review_set()
        .items()
        .iter()
        .map(|item| item.id().clone())
        .collect();
    for item in ids {
        gate.set_item_status(&item, ReviewStatus::Approved, None)
            .expect("approves");
    }
}

pub(super) struct ScriptedPicker {
    outcomes: Vec<PickOutcome>,
}

impl ScriptedPicker {
    pub(super) fn new(outcomes: Vec<PickOutcome>) -> Self {
        Self { outcomes }
    }
}

impl AttachmentPicker for ScriptedPicker {
    fn pick(&mut self) -> PickOutcome {
        if self.outcomes.is_empty() {
            PickOutcome::Cancelled
        } else {
            self.outcomes.remove(0)
        }
    }
}

#[derive(Default)]
pub(super) struct RecordingTransport {
    pub(super) fail_with: Option<TransportFailure>,
    pub(super) received: Mutex<Vec<SessionSnapshot>>,
}

impl RecordingTransport {
    pub(super) fn failing(failure: TransportFailure) -> Self {
        Self {
            fail_with: Some(failure),
            received: Mutex::new(Vec::new()),
        }
    }

    pub(super) fn received(&self) -> Vec<SessionSnapshot> {
        self.received.lock().expect("transport mutex poisoned").clone()
    }
}

impl SubmissionTransport for RecordingTransport {
    fn submit(&self, snapshot: &SessionSnapshot) -> Result<Ack, TransportFailure> {
        self.received
            .lock()
            .expect("transport mutex poisoned")
            .push(snapshot.clone());
        match &self.fail_with {
            Some(failure) => Err(failure.clone()),
            None => Ok(Ack {
                reference: format!("kyc-{:04}", snapshot.cycle),
            }),
        }
    }
}
