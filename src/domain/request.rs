use crate::domain::validation::ValidationError;
use crate::domain::value::{Encoding, LineNumber, MessageId, MessageText, Recipient};

#[derive(Debug, Clone)]
/// Scalar-or-sequence input accepted at the interface boundary.
///
/// Callers may hand over one value or an ordered sequence; the distinction is
/// resolved exactly once, inside [`SendRequest::new`].
pub enum OneOrMany<T> {
    One(T),
    Many(Vec<T>),
}

impl<T> From<T> for OneOrMany<T> {
    fn from(value: T) -> Self {
        Self::One(value)
    }
}

impl<T> From<Vec<T>> for OneOrMany<T> {
    fn from(values: Vec<T>) -> Self {
        Self::Many(values)
    }
}

/// A field after broadcast-rule normalization: either one value applying to
/// every recipient, or a sequence aligned to the recipient list.
enum Normalized<T> {
    Single(T),
    Aligned(Vec<T>),
}

impl<T> Normalized<T> {
    fn is_aligned(&self) -> bool {
        matches!(self, Self::Aligned(_))
    }

    fn single(self) -> Option<T> {
        match self {
            Self::Single(value) => Some(value),
            Self::Aligned(_) => None,
        }
    }
}

fn normalize<T>(
    field: &'static str,
    input: OneOrMany<T>,
    recipients: usize,
) -> Result<Normalized<T>, ValidationError> {
    match input {
        OneOrMany::One(value) => Ok(Normalized::Single(value)),
        OneOrMany::Many(mut values) => match values.len() {
            0 => Err(ValidationError::Empty { field }),
            1 => Ok(Normalized::Single(values.remove(0))),
            n if n == recipients => Ok(Normalized::Aligned(values)),
            n => Err(ValidationError::LengthMismatch {
                field,
                expected: recipients,
                actual: n,
            }),
        },
    }
}

#[derive(Debug, Clone, Default)]
/// Optional send parameters.
pub struct SendOptions {
    /// Sender line override. `None` uses the client's default line.
    pub senders: Option<OneOrMany<LineNumber>>,
    /// Per-message encoding flags. `None` lets the vendor pick.
    pub encodings: Option<OneOrMany<Encoding>>,
}

#[derive(Debug, Clone)]
/// Normalized payload of a send request.
///
/// `Broadcast` keeps single-valued inputs singular so the classic generation
/// can hit its dedicated one-to-many endpoint; the REST generation expands it
/// at encode time. `PerRecipient` sequences are always aligned to the
/// recipient list.
pub enum SendPayload {
    Broadcast {
        message: MessageText,
        sender: Option<LineNumber>,
        encoding: Option<Encoding>,
    },
    PerRecipient {
        messages: Vec<MessageText>,
        senders: Option<Vec<LineNumber>>,
        encodings: Option<Vec<Encoding>>,
    },
}

#[derive(Debug, Clone)]
/// Validated, normalized send request.
pub struct SendRequest {
    recipients: Vec<Recipient>,
    payload: SendPayload,
}

impl SendRequest {
    /// Validate and normalize a send request.
    ///
    /// Broadcast rule: a single value (or one-element sequence) for messages,
    /// senders, or encodings applies to every recipient. Multi-valued
    /// sequences must match the recipient count exactly; any of them being
    /// multi-valued switches the whole payload to the per-recipient shape,
    /// with remaining single values expanded to the recipient count.
    pub fn new(
        recipients: Vec<Recipient>,
        messages: impl Into<OneOrMany<MessageText>>,
        options: SendOptions,
    ) -> Result<Self, ValidationError> {
        if recipients.is_empty() {
            return Err(ValidationError::Empty {
                field: Recipient::FIELD,
            });
        }
        let count = recipients.len();

        let messages = normalize(MessageText::FIELD, messages.into(), count)?;
        let senders = options
            .senders
            .map(|input| normalize(LineNumber::FIELD, input, count))
            .transpose()?;
        let encodings = options
            .encodings
            .map(|input| normalize(Encoding::FIELD, input, count))
            .transpose()?;

        let payload = match (messages, senders, encodings) {
            (Normalized::Single(message), senders, encodings)
                if !senders.as_ref().is_some_and(Normalized::is_aligned)
                    && !encodings.as_ref().is_some_and(Normalized::is_aligned) =>
            {
                SendPayload::Broadcast {
                    message,
                    sender: senders.and_then(Normalized::single),
                    encoding: encodings.and_then(Normalized::single),
                }
            }
            (messages, senders, encodings) => SendPayload::PerRecipient {
                messages: expand(messages, count),
                senders: senders.map(|normalized| expand(normalized, count)),
                encodings: encodings.map(|normalized| expand(normalized, count)),
            },
        };

        Ok(Self {
            recipients,
            payload,
        })
    }

    /// Ordered recipient list.
    pub fn recipients(&self) -> &[Recipient] {
        &self.recipients
    }

    /// Normalized payload.
    pub fn payload(&self) -> &SendPayload {
        &self.payload
    }
}

fn expand<T: Clone>(normalized: Normalized<T>, count: usize) -> Vec<T> {
    match normalized {
        Normalized::Single(value) => vec![value; count],
        Normalized::Aligned(values) => values,
    }
}

#[derive(Debug, Clone)]
/// Ordered list of message ids for a delivery-status lookup.
pub struct StatusQuery {
    ids: Vec<MessageId>,
}

impl StatusQuery {
    /// Validate a status query (the id list must be non-empty).
    pub fn new(ids: Vec<MessageId>) -> Result<Self, ValidationError> {
        if ids.is_empty() {
            return Err(ValidationError::Empty {
                field: MessageId::FIELD,
            });
        }
        Ok(Self { ids })
    }

    /// Convenience constructor for a single id.
    pub fn one(id: MessageId) -> Self {
        Self { ids: vec![id] }
    }

    /// Ordered id list.
    pub fn ids(&self) -> &[MessageId] {
        &self.ids
    }
}
