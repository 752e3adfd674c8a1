use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::value::RawValue;
use serde_json::{Value, json};

use super::credit_token;
use crate::catalog::{self, Language};
use crate::domain::{
    AccountInfo, DeliveryStatus, Envelope, ExternalId, InboundMessage, LineNumber, MessageId,
    Password, Recipient, SendDisposition, SendOutcome, SendPayload, SendRequest, StatusQuery,
    Username,
};

#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("invalid JSON response: {0}")]
    Json(#[from] serde_json::Error),

    #[error("send result count mismatch: {actual} entries for {expected} recipients")]
    OutcomeCountMismatch { expected: usize, actual: usize },

    #[error("status result count mismatch: {actual} entries for {expected} ids")]
    StatusCountMismatch { expected: usize, actual: usize },

    #[error("credit field is neither a JSON string nor a number")]
    InvalidCredit,

    #[error("success envelope is missing its data payload")]
    MissingData,
}

/// Which classic send endpoint a request maps to. Observable behavior:
/// vendor-side billing differs between the two.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SendShape {
    /// Singular `text`/`from` broadcast to every recipient (`/send`).
    OneToMany,
    /// Aligned per-recipient arrays (`/sendarray`).
    ManyToMany,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(bound(deserialize = "T: serde::Deserialize<'de>"))]
struct WireEnvelope<T> {
    status: i64,
    #[serde(default)]
    time: Option<i64>,
    #[serde(default)]
    data: Option<T>,
}

impl<T> WireEnvelope<T> {
    fn envelope(&self) -> Envelope {
        Envelope {
            code: self.status,
            timestamp: self.time,
        }
    }
}

fn parse<T: DeserializeOwned>(body: &str) -> Result<WireEnvelope<T>, TransportError> {
    Ok(serde_json::from_str(body)?)
}

fn base_body(username: &Username, password: &Password) -> serde_json::Map<String, Value> {
    let mut body = serde_json::Map::new();
    body.insert(
        Username::FIELD.to_owned(),
        Value::String(username.as_str().to_owned()),
    );
    body.insert(
        Password::FIELD.to_owned(),
        Value::String(password.as_str().to_owned()),
    );
    body
}

pub fn encode_send_body(
    username: &Username,
    password: &Password,
    default_line: &LineNumber,
    request: &SendRequest,
) -> (SendShape, Value) {
    let mut body = base_body(username, password);
    let recipients = request
        .recipients()
        .iter()
        .map(Recipient::as_str)
        .collect::<Vec<_>>();
    body.insert("to".to_owned(), json!(recipients));

    match request.payload() {
        SendPayload::Broadcast {
            message,
            sender,
            encoding,
        } => {
            let line = sender.as_ref().unwrap_or(default_line);
            body.insert("text".to_owned(), json!(message.as_str()));
            body.insert(LineNumber::FIELD.to_owned(), json!(line.as_str()));
            if let Some(encoding) = encoding {
                body.insert("class".to_owned(), json!(encoding.as_u8()));
            }
            (SendShape::OneToMany, Value::Object(body))
        }
        SendPayload::PerRecipient {
            messages,
            senders,
            encodings,
        } => {
            let texts = messages
                .iter()
                .map(|message| message.as_str())
                .collect::<Vec<_>>();
            body.insert("text".to_owned(), json!(texts));

            let lines = match senders {
                Some(senders) => senders.iter().map(LineNumber::as_str).collect::<Vec<_>>(),
                None => vec![default_line.as_str(); request.recipients().len()],
            };
            body.insert(LineNumber::FIELD.to_owned(), json!(lines));

            if let Some(encodings) = encodings {
                let classes = encodings
                    .iter()
                    .map(|encoding| encoding.as_u8())
                    .collect::<Vec<_>>();
                body.insert("class".to_owned(), json!(classes));
            }
            (SendShape::ManyToMany, Value::Object(body))
        }
    }
}

#[derive(Debug, Clone)]
pub struct SendDecoded {
    pub envelope: Envelope,
    pub outcomes: Option<Vec<SendOutcome>>,
}

/// Decode a classic send response.
///
/// The `data` array is aligned to the request's recipients: positive entries
/// are message ids, entries `<= 0` are negated error codes.
pub fn decode_send_response(
    recipients: &[Recipient],
    lang: Language,
    body: &str,
) -> Result<SendDecoded, TransportError> {
    let parsed: WireEnvelope<Vec<i64>> = parse(body)?;
    let envelope = parsed.envelope();

    let outcomes = match parsed.data {
        Some(entries) => {
            if entries.len() != recipients.len() {
                return Err(TransportError::OutcomeCountMismatch {
                    expected: recipients.len(),
                    actual: entries.len(),
                });
            }
            Some(
                recipients
                    .iter()
                    .zip(entries)
                    .map(|(recipient, entry)| normalize_entry(recipient, entry, lang))
                    .collect(),
            )
        }
        None => None,
    };

    Ok(SendDecoded { envelope, outcomes })
}

fn normalize_entry(recipient: &Recipient, entry: i64, lang: Language) -> SendOutcome {
    if entry > 0 {
        SendOutcome {
            recipient: recipient.clone(),
            disposition: SendDisposition::Accepted(MessageId::new(entry as u64)),
            status_text: Some(catalog::success_text(lang).to_owned()),
        }
    } else {
        let code = -entry;
        SendOutcome {
            recipient: recipient.clone(),
            disposition: SendDisposition::Rejected(code),
            status_text: catalog::classic::error_text(code, lang).map(str::to_owned),
        }
    }
}

pub fn encode_status_body(username: &Username, password: &Password, query: &StatusQuery) -> Value {
    let mut body = base_body(username, password);
    let ids = query
        .ids()
        .iter()
        .map(|id| id.value())
        .collect::<Vec<_>>();
    body.insert(MessageId::FIELD.to_owned(), json!(ids));
    Value::Object(body)
}

#[derive(Debug, Clone)]
pub struct StatusDecoded {
    pub envelope: Envelope,
    pub statuses: Option<Vec<DeliveryStatus>>,
}

/// Decode a classic status response; the `data` array is aligned to the
/// queried ids.
pub fn decode_status_response(
    ids: &[MessageId],
    body: &str,
) -> Result<StatusDecoded, TransportError> {
    let parsed: WireEnvelope<Vec<i64>> = parse(body)?;
    let envelope = parsed.envelope();

    let statuses = match parsed.data {
        Some(codes) => {
            if codes.len() != ids.len() {
                return Err(TransportError::StatusCountMismatch {
                    expected: ids.len(),
                    actual: codes.len(),
                });
            }
            Some(
                ids.iter()
                    .zip(codes)
                    .map(|(id, code)| DeliveryStatus { id: *id, code })
                    .collect(),
            )
        }
        None => None,
    };

    Ok(StatusDecoded { envelope, statuses })
}

fn encode_credentials_only_body(username: &Username, password: &Password) -> Value {
    Value::Object(base_body(username, password))
}

pub fn encode_inbox_body(username: &Username, password: &Password) -> Value {
    encode_credentials_only_body(username, password)
}

pub fn encode_inbox_count_body(username: &Username, password: &Password) -> Value {
    encode_credentials_only_body(username, password)
}

pub fn encode_account_body(username: &Username, password: &Password) -> Value {
    encode_credentials_only_body(username, password)
}

#[derive(Debug, Clone, Deserialize)]
struct InboxJsonMessage {
    id: u64,
    from: String,
    to: String,
    text: String,
    #[serde(default)]
    time: Option<i64>,
}

#[derive(Debug, Clone)]
pub struct InboxDecoded {
    pub envelope: Envelope,
    pub messages: Option<Vec<InboundMessage>>,
}

pub fn decode_inbox_response(body: &str) -> Result<InboxDecoded, TransportError> {
    let parsed: WireEnvelope<Vec<InboxJsonMessage>> = parse(body)?;
    let envelope = parsed.envelope();
    let messages = parsed.data.map(|entries| {
        entries
            .into_iter()
            .map(|entry| InboundMessage {
                id: MessageId::new(entry.id),
                originator: entry.from,
                line: entry.to,
                text: entry.text,
                received_at: entry.time,
            })
            .collect()
    });
    Ok(InboxDecoded { envelope, messages })
}

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum TransportCount {
    Int(u64),
    String(String),
}

impl TransportCount {
    fn into_u64(self) -> Option<u64> {
        match self {
            Self::Int(value) => Some(value),
            Self::String(value) => value.trim().parse::<u64>().ok(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct CountDecoded {
    pub envelope: Envelope,
    pub count: Option<u64>,
}

pub fn decode_inbox_count_response(body: &str) -> Result<CountDecoded, TransportError> {
    let parsed: WireEnvelope<TransportCount> = parse(body)?;
    let envelope = parsed.envelope();
    let count = parsed.data.and_then(TransportCount::into_u64);
    Ok(CountDecoded { envelope, count })
}

#[derive(Debug, Deserialize)]
struct AccountJsonData {
    credit: Box<RawValue>,
    #[serde(default)]
    expire: Option<i64>,
}

#[derive(Debug, Clone)]
pub struct AccountDecoded {
    pub envelope: Envelope,
    pub info: Option<AccountInfo>,
}

pub fn decode_account_response(body: &str) -> Result<AccountDecoded, TransportError> {
    let parsed: WireEnvelope<AccountJsonData> = parse(body)?;
    let envelope = parsed.envelope();
    let info = match parsed.data {
        Some(data) => Some(AccountInfo {
            credit: credit_token(&data.credit).ok_or(TransportError::InvalidCredit)?,
            expires_at: data.expire,
        }),
        None => None,
    };
    Ok(AccountDecoded { envelope, info })
}

pub fn encode_mid_body(username: &Username, password: &Password, uid: &ExternalId) -> Value {
    let mut body = base_body(username, password);
    body.insert(ExternalId::FIELD.to_owned(), json!(uid.as_str()));
    Value::Object(body)
}

#[derive(Debug, Clone)]
pub struct MidDecoded {
    pub envelope: Envelope,
    /// Raw identifier; the vendor reports `0` when no message matches.
    pub id: Option<i64>,
}

pub fn decode_mid_response(body: &str) -> Result<MidDecoded, TransportError> {
    let parsed: WireEnvelope<i64> = parse(body)?;
    let envelope = parsed.envelope();
    Ok(MidDecoded {
        envelope,
        id: parsed.data,
    })
}
