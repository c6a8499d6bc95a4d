//! Integration scenarios for the review gate driven through the public API, the way the
//! KYC, document verification, and application review screens use it.

mod common {
    use std::sync::{Arc, Mutex};

    use review_gate::config::GateConfig;
    use review_gate::review::{
        Ack, Attachment, AttachmentPolicy, InvariantMode, ItemId, ReviewGate, ReviewProfile,
        SessionSnapshot, SubmissionTransport, TransportFailure,
    };

    pub(super) fn config() -> GateConfig {
        GateConfig {
            attachments: AttachmentPolicy::default(),
            invariant_mode: InvariantMode::Panic,
        }
    }

    pub(super) fn id(raw: &str) -> ItemId {
        ItemId::from(raw)
    }

    pub(super) fn scan(name: &str) -> Attachment {
        Attachment::new(format!("content://uploads/{name}"), name, 1_048_576)
    }

    pub(super) fn kyc_gate() -> ReviewGate {
        let mut gate = ReviewProfile::Kyc.gate(config());
        gate.set_field(&id("identity_number"), "abcde1234f")
            .expect("identity");
        gate.set_field(&id("account_holder"), "Meera Nair")
            .expect("holder");
        gate.set_field(&id("account_number"), "50100234567891")
            .expect("account");
        gate.set_field(&id("ifsc"), "HDFC0001234").expect("ifsc");
        gate.attach_document("pan_card", scan("pan_card.jpg"))
            .expect("pan");
        gate.attach_document("passbook", scan("passbook.pdf"))
            .expect("passbook");
        gate
    }

    #[derive(Default, Clone)]
    pub(super) struct MemoryTransport {
        submissions: Arc<Mutex<Vec<String>>>,
    }

    impl MemoryTransport {
        pub(super) fn submissions(&self) -> Vec<String> {
            self.submissions.lock().expect("lock").clone()
        }
    }

    impl SubmissionTransport for MemoryTransport {
        fn submit(&self, snapshot: &SessionSnapshot) -> Result<Ack, TransportFailure> {
            let json = snapshot
                .to_json()
                .map_err(|err| TransportFailure::Refused(err.to_string()))?;
            let mut guard = self.submissions.lock().expect("lock");
            guard.push(json);
            Ok(Ack {
                reference: format!("KYC-{}", guard.len()),
            })
        }
    }
}

mod kyc {
    use super::common::*;
    use review_gate::review::{GateError, ReviewStatus, SessionStatus};

    #[test]
    fn rejected_kyc_can_be_resubmitted_and_approved() {
        let transport = MemoryTransport::default();
        let mut gate = kyc_gate();

        assert_eq!(gate.submit_with(&transport), Ok(SessionStatus::Submitted));
        assert_eq!(gate.begin_review(), Ok(SessionStatus::UnderReview));
        gate.set_item_status(&id("pan_card"), ReviewStatus::Approved, None)
            .expect("pan verified");
        gate.set_item_status(&id("passbook"), ReviewStatus::Rejected, Some("Name not visible"))
            .expect("passbook rejected");
        assert!(gate.readiness().ready);
        assert_eq!(
            gate.reject("Upload a clearer bank passbook"),
            Ok(SessionStatus::Rejected)
        );

        assert_eq!(gate.resubmit(), Ok(SessionStatus::Draft));
        gate.remove_item(&id("passbook")).expect("remove old passbook");
        gate.attach_document("passbook", scan("passbook_clear.pdf"))
            .expect("re-upload");
        assert_eq!(gate.submit_with(&transport), Ok(SessionStatus::Submitted));
        gate.begin_review().expect("second review");

        match gate.approve() {
            Err(GateError::NotReady { blocking_reasons }) => {
                assert_eq!(blocking_reasons.len(), 1);
                assert_eq!(blocking_reasons[0].to_string(), "passbook pending");
            }
            other => panic!("expected pending passbook, got {other:?}"),
        }

        gate.set_item_status(&id("passbook"), ReviewStatus::Approved, None)
            .expect("passbook verified");
        assert_eq!(gate.approve(), Ok(SessionStatus::Approved));
        assert_eq!(gate.cycle(), 2);

        let submissions = transport.submissions();
        assert_eq!(submissions.len(), 2);
        assert!(submissions[1].contains("passbook_clear.pdf"));
        assert_eq!(
            gate.submission_ack().map(|ack| ack.reference.clone()),
            Some("KYC-2".to_string())
        );
    }

    #[test]
    fn approved_sessions_are_final() {
        let mut gate = kyc_gate();
        gate.submit().expect("submit");
        gate.begin_review().expect("review");
        gate.set_item_status(&id("pan_card"), ReviewStatus::Approved, None)
            .expect("approve");
        gate.set_item_status(&id("passbook"), ReviewStatus::Approved, None)
            .expect("approve");
        gate.approve().expect("approved");

        assert!(matches!(
            gate.resubmit(),
            Err(GateError::IllegalTransition { .. })
        ));
        assert!(matches!(
            gate.reject("changed my mind"),
            Err(GateError::IllegalTransition { .. })
        ));
        assert_eq!(gate.status(), SessionStatus::Approved);
    }
}

mod application_review {
    use super::common::*;
    use review_gate::review::{ReviewItem, ReviewProfile, ReviewSet, ReviewStatus, SessionStatus};

    #[test]
    fn queue_of_applications_gates_publication() {
        let mut gate = ReviewProfile::ApplicationReview.gate(config());
        for (item, application) in [("q-1", "SCH-001"), ("q-2", "SCH-002")] {
            gate.add_item(ReviewItem::application(item, application))
                .expect("assign application");
        }
        gate.submit().expect("queue submitted");
        gate.begin_review().expect("review opens");

        gate.set_item_status(&id("q-1"), ReviewStatus::Approved, Some("meets criteria"))
            .expect("approve");
        let readiness = gate.readiness();
        assert_eq!(readiness.pending_count, 1);
        assert_eq!(readiness.messages(), vec!["q-2 pending".to_string()]);

        gate.set_item_status(&id("q-2"), ReviewStatus::Rejected, Some("income proof missing"))
            .expect("reject");
        assert_eq!(gate.approve(), Ok(SessionStatus::Approved));

        let counts = gate.review_set().counts();
        assert_eq!((counts.approved, counts.rejected, counts.pending), (1, 1, 0));
    }

    #[test]
    fn document_verification_without_a_session() {
        let mut set = ReviewSet::new(ReviewProfile::DocumentVerification.requirement());
        set.add(ReviewItem::document("marksheet", scan("marksheet.pdf")))
            .expect("add");
        let verified: ReviewStatus =
            serde_json::from_str("\"Verified\"").expect("verified is an alias of approved");
        set.set_item_status(&id("marksheet"), verified, None)
            .expect("verify");
        assert!(set.compute_readiness().ready);
        assert_eq!(set.counts().approved, 1);
    }
}
