use crate::domain::value::{MessageId, Recipient};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// Top-level vendor response metadata, passed through unchanged.
pub struct Envelope {
    /// Status/error code from the response envelope (`0` is success on both
    /// API generations).
    pub code: i64,
    /// Server-side unix timestamp, when the generation reports one.
    pub timestamp: Option<i64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// Per-recipient send result.
pub enum SendDisposition {
    /// The message was queued; carries the vendor message id.
    Accepted(MessageId),
    /// The message was refused; carries the vendor outcome code.
    Rejected(i64),
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// One normalized per-recipient send outcome.
pub struct SendOutcome {
    pub recipient: Recipient,
    pub disposition: SendDisposition,
    /// Catalog-resolved text for the outcome code (`None` when the code is
    /// not in the catalog).
    pub status_text: Option<String>,
}

impl SendOutcome {
    /// Whether this outcome carries a message id.
    pub fn is_accepted(&self) -> bool {
        matches!(self.disposition, SendDisposition::Accepted(_))
    }

    /// The vendor message id for accepted outcomes.
    pub fn message_id(&self) -> Option<MessageId> {
        match self.disposition {
            SendDisposition::Accepted(id) => Some(id),
            SendDisposition::Rejected(_) => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// Normalized result of a send call.
///
/// Invariant: `accepted + rejected == outcomes.len()`, which in turn equals
/// the recipient count of the originating request.
pub struct SendReport {
    outcomes: Vec<SendOutcome>,
    accepted: usize,
    rejected: usize,
    envelope: Envelope,
}

impl SendReport {
    /// Build a report, computing the aggregate counts in one scan.
    pub fn new(outcomes: Vec<SendOutcome>, envelope: Envelope) -> Self {
        let accepted = outcomes
            .iter()
            .filter(|outcome| outcome.is_accepted())
            .count();
        let rejected = outcomes.len() - accepted;
        Self {
            outcomes,
            accepted,
            rejected,
            envelope,
        }
    }

    /// Per-recipient outcomes, in request order.
    pub fn outcomes(&self) -> &[SendOutcome] {
        &self.outcomes
    }

    /// Number of recipients whose message was queued.
    pub fn accepted(&self) -> usize {
        self.accepted
    }

    /// Number of recipients whose message was refused.
    pub fn rejected(&self) -> usize {
        self.rejected
    }

    /// Vendor envelope metadata.
    pub fn envelope(&self) -> Envelope {
        self.envelope
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// Delivery-state code for one previously sent message.
///
/// The code is passed through unmodified; resolve text with the
/// delivery-state catalog of the generation that produced it.
pub struct DeliveryStatus {
    pub id: MessageId,
    pub code: i64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// Result of a delivery-status lookup.
pub struct StatusReport {
    pub statuses: Vec<DeliveryStatus>,
    pub envelope: Envelope,
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// One inbound message pulled from the account inbox.
pub struct InboundMessage {
    pub id: MessageId,
    /// Phone number the message was sent from.
    pub originator: String,
    /// Account line the message was received on.
    pub line: String,
    pub text: String,
    /// Unix receive timestamp, when the generation reports one.
    pub received_at: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// Account state as reported by the vendor.
pub struct AccountInfo {
    /// Remaining credit, preserved as the vendor's decimal string.
    pub credit: String,
    /// Account expiry timestamp, when reported.
    pub expires_at: Option<i64>,
}
