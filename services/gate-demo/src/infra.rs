use std::sync::{Arc, Mutex};

use review_gate::review::{
    Ack, Attachment, AttachmentPicker, PickOutcome, SessionSnapshot, SubmissionTransport,
    TransportFailure,
};
use tracing::info;

/// Transport that keeps serialized submissions in memory instead of sending them.
#[derive(Default, Clone)]
pub(crate) struct InMemoryTransport {
    submissions: Arc<Mutex<Vec<String>>>,
}

impl SubmissionTransport for InMemoryTransport {
    fn submit(&self, snapshot: &SessionSnapshot) -> Result<Ack, TransportFailure> {
        let payload = snapshot
            .to_json()
            .map_err(|err| TransportFailure::Refused(err.to_string()))?;
        let mut guard = self
            .submissions
            .lock()
            .map_err(|_| TransportFailure::Unavailable("transport mutex poisoned".to_string()))?;
        guard.push(payload);
        let reference = format!("KYC-{:05}", guard.len());
        info!(%reference, cycle = snapshot.cycle, "submission stored");
        Ok(Ack { reference })
    }
}

impl InMemoryTransport {
    pub(crate) fn last_submission(&self) -> Option<String> {
        self.submissions
            .lock()
            .ok()
            .and_then(|guard| guard.last().cloned())
    }
}

/// Picker that hands out a fixed list of files, then reports cancellation.
pub(crate) struct FixturePicker {
    queue: Vec<Attachment>,
}

impl FixturePicker {
    pub(crate) fn new(files: impl IntoIterator<Item = Attachment>) -> Self {
        let mut queue: Vec<Attachment> = files.into_iter().collect();
        queue.reverse();
        Self { queue }
    }
}

impl AttachmentPicker for FixturePicker {
    fn pick(&mut self) -> PickOutcome {
        match self.queue.pop() {
            Some(attachment) => PickOutcome::Picked(attachment),
            None => PickOutcome::Cancelled,
        }
    }
}
