use crate::infra::{FixturePicker, InMemoryTransport};
use clap::Args;
use review_gate::config::GateConfig;
use review_gate::error::AppError;
use review_gate::review::profile::{ACCOUNT_HOLDER, ACCOUNT_NUMBER, IDENTITY_NUMBER, IFSC};
use review_gate::review::{
    validate_named, Attachment, GateError, ItemId, Readiness, ReviewGate, ReviewProfile,
    ReviewStatus, SessionEventKind,
};

#[derive(Args, Debug)]
pub(crate) struct ValidateArgs {
    /// Rule name, e.g. PAN, AADHAAR, PAN_OR_AADHAAR, IFSC, ACCOUNT_NUMBER, MIN_LENGTH(3)
    pub(crate) rule: String,
    /// Raw value as typed by the user
    pub(crate) value: String,
}

#[derive(Args, Debug)]
pub(crate) struct KycDemoArgs {
    /// PAN (10 characters) or Aadhaar (12 digits)
    #[arg(long, default_value = "ABCDE1234F")]
    pub(crate) identity: String,
    /// Bank account holder name
    #[arg(long, default_value = "Asha Verma")]
    pub(crate) holder: String,
    /// Bank account number
    #[arg(long, default_value = "123456789012")]
    pub(crate) account: String,
    /// Branch IFSC code
    #[arg(long, default_value = "SBIN0001234")]
    pub(crate) ifsc: String,
    /// Have the reviewer reject the bank proof once before approving the resubmission
    #[arg(long)]
    pub(crate) reject_first: bool,
    /// Print the final session snapshot as JSON
    #[arg(long)]
    pub(crate) json: bool,
}

pub(crate) fn run_validate(args: ValidateArgs) -> Result<(), AppError> {
    let result = validate_named(&args.rule, &args.value);
    let rendered = serde_json::to_string_pretty(&result).map_err(std::io::Error::from)?;
    println!("{rendered}");
    Ok(())
}

pub(crate) fn run_kyc_demo(args: KycDemoArgs, config: GateConfig) -> Result<(), AppError> {
    let KycDemoArgs {
        identity,
        holder,
        account,
        ifsc,
        reject_first,
        json,
    } = args;

    println!("KYC review gate demo");
    let mut gate = ReviewProfile::Kyc.gate(config);

    for (field, value) in [
        (IDENTITY_NUMBER, identity),
        (ACCOUNT_HOLDER, holder),
        (ACCOUNT_NUMBER, account),
        (IFSC, ifsc),
    ] {
        let result = gate.set_field(&ItemId::from(field), value)?;
        match (result.valid, result.error) {
            (true, _) => println!("- {field}: ok"),
            (false, error) => println!("- {field}: {}", error.unwrap_or_default()),
        }
    }

    let mut picker = FixturePicker::new([
        Attachment::new("content://uploads/pan_card.jpg", "pan_card.jpg", 820_000),
        Attachment::new("content://uploads/passbook.pdf", "passbook.pdf", 1_400_000),
    ]);
    for id in ["pan_card", "bank_proof"] {
        if let Some(item) = gate.attach_picked(id, &mut picker)? {
            println!("- attached {} ({:?})", item.id(), item.kind());
        }
    }

    let transport = InMemoryTransport::default();
    if let Err(err) = gate.submit_with(&transport) {
        println!("\nSubmission blocked");
        render_error(&err);
        return Ok(());
    }
    println!("\nSubmitted (cycle {})", gate.cycle());

    gate.begin_review()?;
    gate.set_item_status(&ItemId::from("pan_card"), ReviewStatus::Approved, None)?;
    if reject_first {
        gate.set_item_status(
            &ItemId::from("bank_proof"),
            ReviewStatus::Rejected,
            Some("Account holder name is not legible"),
        )?;
        gate.reject("Bank proof needs a clearer scan")?;
        println!(
            "Rejected: {}",
            gate.rejection_reason().unwrap_or("no reason recorded")
        );

        gate.resubmit()?;
        gate.remove_item(&ItemId::from("bank_proof"))?;
        gate.attach_document(
            "bank_proof",
            Attachment::new("content://uploads/passbook_v2.pdf", "passbook_v2.pdf", 900_000),
        )?;
        gate.submit_with(&transport)?;
        println!("Resubmitted (cycle {})", gate.cycle());
        gate.begin_review()?;
    }

    render_readiness(&gate.readiness());
    gate.set_item_status(&ItemId::from("bank_proof"), ReviewStatus::Approved, None)?;
    let status = gate.approve()?;
    println!("Final status: {}", status.label());

    render_history(&gate);
    if let Some(reference) = gate.submission_ack().map(|ack| ack.reference.as_str()) {
        println!("Transport reference: {reference}");
    }
    if json {
        let snapshot = gate.snapshot().to_json().map_err(std::io::Error::from)?;
        println!("\n{snapshot}");
    } else if let Some(last) = transport.last_submission() {
        println!("Last submitted payload: {} bytes", last.len());
    }

    Ok(())
}

fn render_readiness(readiness: &Readiness) {
    if readiness.ready {
        println!("Review set ready");
        return;
    }
    println!("Review set not ready ({} pending)", readiness.pending_count);
    for reason in readiness.messages() {
        println!("  - {reason}");
    }
}

fn render_error(err: &GateError) {
    match err {
        GateError::NotReady { blocking_reasons } => {
            for reason in blocking_reasons {
                println!("  - {reason}");
            }
        }
        other => println!("  - {other}"),
    }
}

fn render_history(gate: &ReviewGate) {
    println!("\nAudit trail:");
    for event in gate.history() {
        let line = match &event.kind {
            SessionEventKind::ItemAdded { item } => format!("{item} added"),
            SessionEventKind::ItemRemoved { item } => format!("{item} removed"),
            SessionEventKind::ItemStatusChanged {
                item,
                from,
                to,
                comment,
            } => match comment {
                Some(comment) => format!("{item}: {from} -> {to} ({comment})"),
                None => format!("{item}: {from} -> {to}"),
            },
            SessionEventKind::InvariantHealed { item } => format!("{item} reset to pending"),
            SessionEventKind::Transitioned { from, to, reason } => match reason {
                Some(reason) => format!("session {from} -> {to}: {reason}"),
                None => format!("session {from} -> {to}"),
            },
            SessionEventKind::ItemsReset { items } => {
                let ids: Vec<&str> = items.iter().map(ItemId::as_str).collect();
                format!("reset for re-review: {}", ids.join(", "))
            }
        };
        println!(
            "  [{} | cycle {}] {line}",
            event.at.format("%H:%M:%S"),
            event.cycle
        );
    }
}
