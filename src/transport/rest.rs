use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::value::RawValue;
use serde_json::{Value, json};

use super::credit_token;
use crate::catalog::{self, Language};
use crate::domain::{
    AccountInfo, DeliveryStatus, Envelope, InboundMessage, LineNumber, MessageId, Recipient,
    SendDisposition, SendOutcome, SendPayload, SendRequest, StatusQuery,
};

#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("invalid JSON response: {0}")]
    Json(#[from] serde_json::Error),

    #[error("unrecognized envelope status: {value}")]
    UnrecognizedStatus { value: String },

    #[error("send result count mismatch: {actual} entries for {expected} recipients")]
    OutcomeCountMismatch { expected: usize, actual: usize },

    #[error("accepted send entry is missing its message id")]
    MissingMessageId,

    #[error("credit field is neither a JSON string nor a number")]
    InvalidCredit,

    #[error("success envelope is missing its data payload")]
    MissingData,
}

/// Envelope status as sent by the REST generation: a numeric code, or the
/// literal string `"success"` standing in for `0`.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum WireStatus {
    Code(i64),
    Text(String),
}

impl WireStatus {
    fn as_code(&self) -> Result<i64, TransportError> {
        match self {
            Self::Code(code) => Ok(*code),
            Self::Text(text) if text.eq_ignore_ascii_case("success") => Ok(0),
            Self::Text(text) => Err(TransportError::UnrecognizedStatus {
                value: text.clone(),
            }),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(bound(deserialize = "T: serde::Deserialize<'de>"))]
struct WireEnvelope<T> {
    status: WireStatus,
    #[serde(default)]
    timestamp: Option<i64>,
    #[serde(default)]
    data: Option<T>,
}

impl<T> WireEnvelope<T> {
    fn envelope(&self) -> Result<Envelope, TransportError> {
        Ok(Envelope {
            code: self.status.as_code()?,
            timestamp: self.timestamp,
        })
    }
}

fn parse<T: DeserializeOwned>(body: &str) -> Result<WireEnvelope<T>, TransportError> {
    Ok(serde_json::from_str(body)?)
}

/// Encode a REST send body. The REST generation has no singular shape: every
/// field is expanded to an array aligned to the recipient list.
pub fn encode_send_body(default_line: &LineNumber, request: &SendRequest) -> Value {
    let count = request.recipients().len();
    let recipients = request
        .recipients()
        .iter()
        .map(Recipient::as_str)
        .collect::<Vec<_>>();

    let (messages, senders, encodings) = match request.payload() {
        SendPayload::Broadcast {
            message,
            sender,
            encoding,
        } => (
            vec![message.as_str(); count],
            vec![sender.as_ref().unwrap_or(default_line).as_str(); count],
            encoding.map(|encoding| vec![encoding.as_u8(); count]),
        ),
        SendPayload::PerRecipient {
            messages,
            senders,
            encodings,
        } => (
            messages.iter().map(|message| message.as_str()).collect(),
            match senders {
                Some(senders) => senders.iter().map(LineNumber::as_str).collect(),
                None => vec![default_line.as_str(); count],
            },
            encodings
                .as_ref()
                .map(|encodings| encodings.iter().map(|encoding| encoding.as_u8()).collect()),
        ),
    };

    let mut body = json!({
        "recipients": recipients,
        "messages": messages,
        "senders": senders,
    });
    if let Some(encodings) = encodings {
        body["encodings"] = json!(encodings);
    }
    body
}

#[derive(Debug, Clone, Deserialize)]
struct SendJsonMessage {
    #[serde(default)]
    id: Option<u64>,
    status: i64,
}

#[derive(Debug, Clone, Deserialize)]
struct SendJsonData {
    messages: Vec<SendJsonMessage>,
}

#[derive(Debug, Clone)]
pub struct SendDecoded {
    pub envelope: Envelope,
    pub outcomes: Option<Vec<SendOutcome>>,
}

/// Decode a REST send response. `data.messages` is aligned to the request's
/// recipients; an entry with status `0` must carry a message id.
pub fn decode_send_response(
    recipients: &[Recipient],
    lang: Language,
    body: &str,
) -> Result<SendDecoded, TransportError> {
    let parsed: WireEnvelope<SendJsonData> = parse(body)?;
    let envelope = parsed.envelope()?;

    let outcomes = match parsed.data {
        Some(data) => {
            if data.messages.len() != recipients.len() {
                return Err(TransportError::OutcomeCountMismatch {
                    expected: recipients.len(),
                    actual: data.messages.len(),
                });
            }
            Some(
                recipients
                    .iter()
                    .zip(data.messages)
                    .map(|(recipient, entry)| normalize_entry(recipient, entry, lang))
                    .collect::<Result<Vec<_>, TransportError>>()?,
            )
        }
        None => None,
    };

    Ok(SendDecoded { envelope, outcomes })
}

fn normalize_entry(
    recipient: &Recipient,
    entry: SendJsonMessage,
    lang: Language,
) -> Result<SendOutcome, TransportError> {
    if entry.status == 0 {
        let id = entry.id.ok_or(TransportError::MissingMessageId)?;
        Ok(SendOutcome {
            recipient: recipient.clone(),
            disposition: SendDisposition::Accepted(MessageId::new(id)),
            status_text: Some(catalog::success_text(lang).to_owned()),
        })
    } else {
        Ok(SendOutcome {
            recipient: recipient.clone(),
            disposition: SendDisposition::Rejected(entry.status),
            status_text: catalog::rest::error_text(entry.status, lang).map(str::to_owned),
        })
    }
}

pub fn encode_statuses_body(query: &StatusQuery) -> Value {
    let ids = query
        .ids()
        .iter()
        .map(|id| id.value())
        .collect::<Vec<_>>();
    json!({ "ids": ids })
}

#[derive(Debug, Clone, Deserialize)]
struct StatusJsonEntry {
    id: u64,
    status: i64,
}

#[derive(Debug, Clone, Deserialize)]
struct StatusJsonData {
    statuses: Vec<StatusJsonEntry>,
}

#[derive(Debug, Clone)]
pub struct StatusDecoded {
    pub envelope: Envelope,
    pub statuses: Option<Vec<DeliveryStatus>>,
}

pub fn decode_statuses_response(body: &str) -> Result<StatusDecoded, TransportError> {
    let parsed: WireEnvelope<StatusJsonData> = parse(body)?;
    let envelope = parsed.envelope()?;
    let statuses = parsed.data.map(|data| {
        data.statuses
            .into_iter()
            .map(|entry| DeliveryStatus {
                id: MessageId::new(entry.id),
                code: entry.status,
            })
            .collect()
    });
    Ok(StatusDecoded { envelope, statuses })
}

#[derive(Debug, Clone, Deserialize)]
struct InboxJsonMessage {
    id: u64,
    originator: String,
    line: String,
    message: String,
    #[serde(default)]
    received_at: Option<i64>,
}

#[derive(Debug, Clone, Deserialize)]
struct InboxJsonData {
    messages: Vec<InboxJsonMessage>,
}

#[derive(Debug, Clone)]
pub struct InboxDecoded {
    pub envelope: Envelope,
    pub messages: Option<Vec<InboundMessage>>,
}

pub fn decode_inbox_response(body: &str) -> Result<InboxDecoded, TransportError> {
    let parsed: WireEnvelope<InboxJsonData> = parse(body)?;
    let envelope = parsed.envelope()?;
    let messages = parsed.data.map(|data| {
        data.messages
            .into_iter()
            .map(|entry| InboundMessage {
                id: MessageId::new(entry.id),
                originator: entry.originator,
                line: entry.line,
                text: entry.message,
                received_at: entry.received_at,
            })
            .collect()
    });
    Ok(InboxDecoded { envelope, messages })
}

#[derive(Debug, Clone, Deserialize)]
struct CountJsonData {
    count: u64,
}

#[derive(Debug, Clone)]
pub struct CountDecoded {
    pub envelope: Envelope,
    pub count: Option<u64>,
}

pub fn decode_inbox_count_response(body: &str) -> Result<CountDecoded, TransportError> {
    let parsed: WireEnvelope<CountJsonData> = parse(body)?;
    let envelope = parsed.envelope()?;
    let count = parsed.data.map(|data| data.count);
    Ok(CountDecoded { envelope, count })
}

#[derive(Debug, Deserialize)]
struct AccountJsonData {
    credit: Box<RawValue>,
    #[serde(default)]
    expires_at: Option<i64>,
}

#[derive(Debug, Clone)]
pub struct AccountDecoded {
    pub envelope: Envelope,
    pub info: Option<AccountInfo>,
}

pub fn decode_account_response(body: &str) -> Result<AccountDecoded, TransportError> {
    let parsed: WireEnvelope<AccountJsonData> = parse(body)?;
    let envelope = parsed.envelope()?;
    let info = match parsed.data {
        Some(data) => Some(AccountInfo {
            credit: credit_token(&data.credit).ok_or(TransportError::InvalidCredit)?,
            expires_at: data.expires_at,
        }),
        None => None,
    };
    Ok(AccountDecoded { envelope, info })
}

#[derive(Debug, Clone, Deserialize)]
struct MidJsonData {
    #[serde(default)]
    id: Option<u64>,
}

#[derive(Debug, Clone)]
pub struct MidDecoded {
    pub envelope: Envelope,
    /// Raw identifier; `null` and `0` both mean "no message matched".
    pub id: Option<Option<u64>>,
}

pub fn decode_mid_response(body: &str) -> Result<MidDecoded, TransportError> {
    let parsed: WireEnvelope<MidJsonData> = parse(body)?;
    let envelope = parsed.envelope()?;
    Ok(MidDecoded {
        envelope,
        id: parsed.data.map(|data| data.id),
    })
}

#[cfg(test)]
mod tests {
    use crate::domain::{Encoding, MessageText, OneOrMany, SendOptions};

    use super::*;

    fn recipients() -> Vec<Recipient> {
        vec![
            Recipient::new("09120000001").unwrap(),
            Recipient::new("09120000002").unwrap(),
        ]
    }

    fn line() -> LineNumber {
        LineNumber::new("98300077").unwrap()
    }

    #[test]
    fn broadcast_request_is_expanded_to_aligned_arrays() {
        let request = SendRequest::new(
            recipients(),
            OneOrMany::One(MessageText::new("hi").unwrap()),
            SendOptions::default(),
        )
        .unwrap();

        let body = encode_send_body(&line(), &request);
        assert_eq!(body["recipients"], json!(["09120000001", "09120000002"]));
        assert_eq!(body["messages"], json!(["hi", "hi"]));
        assert_eq!(body["senders"], json!(["98300077", "98300077"]));
        assert!(body.get("encodings").is_none());
    }

    #[test]
    fn per_recipient_request_keeps_aligned_arrays() {
        let request = SendRequest::new(
            recipients(),
            OneOrMany::Many(vec![
                MessageText::new("a").unwrap(),
                MessageText::new("b").unwrap(),
            ]),
            SendOptions {
                senders: Some(OneOrMany::One(LineNumber::new("5000").unwrap())),
                encodings: Some(OneOrMany::Many(vec![Encoding::Gsm7, Encoding::Ucs2])),
            },
        )
        .unwrap();

        let body = encode_send_body(&line(), &request);
        assert_eq!(body["messages"], json!(["a", "b"]));
        assert_eq!(body["senders"], json!(["5000", "5000"]));
        assert_eq!(body["encodings"], json!([0, 8]));
    }

    #[test]
    fn decode_send_resolves_outcome_texts() {
        let json = r#"
        {
          "status": "success",
          "timestamp": 1700000000,
          "data": {
            "messages": [
              { "id": 991, "status": 0 },
              { "status": -104 }
            ]
          }
        }
        "#;
        let decoded = decode_send_response(&recipients(), Language::English, json).unwrap();
        assert_eq!(decoded.envelope.code, 0);

        let outcomes = decoded.outcomes.unwrap();
        assert_eq!(
            outcomes[0].disposition,
            SendDisposition::Accepted(MessageId::new(991))
        );
        assert_eq!(outcomes[0].status_text.as_deref(), Some("success"));
        assert_eq!(outcomes[1].disposition, SendDisposition::Rejected(-104));
        assert_eq!(
            outcomes[1].status_text.as_deref(),
            Some("insufficient credit")
        );
    }

    #[test]
    fn decode_send_leaves_unknown_outcome_codes_without_text() {
        let json = r#"
        {
          "status": 0,
          "data": { "messages": [ { "status": -987 }, { "id": 3, "status": 0 } ] }
        }
        "#;
        let decoded = decode_send_response(&recipients(), Language::Persian, json).unwrap();
        let outcomes = decoded.outcomes.unwrap();
        assert_eq!(outcomes[0].status_text, None);
        assert_eq!(outcomes[1].status_text.as_deref(), Some("ارسال شد"));
    }

    #[test]
    fn decode_send_rejects_missing_id_on_accepted_entry() {
        let json = r#"{ "status": 0, "data": { "messages": [ { "status": 0 }, { "status": 0 } ] } }"#;
        let err = decode_send_response(&recipients(), Language::English, json).unwrap_err();
        assert!(matches!(err, TransportError::MissingMessageId));
    }

    #[test]
    fn decode_send_rejects_count_mismatch() {
        let json = r#"{ "status": 0, "data": { "messages": [ { "id": 1, "status": 0 } ] } }"#;
        let err = decode_send_response(&recipients(), Language::English, json).unwrap_err();
        assert!(matches!(
            err,
            TransportError::OutcomeCountMismatch {
                expected: 2,
                actual: 1
            }
        ));
    }

    #[test]
    fn unknown_status_string_is_rejected() {
        let json = r#"{ "status": "weird", "data": { "messages": [] } }"#;
        let err = decode_send_response(&[], Language::English, json).unwrap_err();
        assert!(matches!(err, TransportError::UnrecognizedStatus { .. }));
    }

    #[test]
    fn statuses_body_and_decode_pass_codes_through() {
        let query = StatusQuery::new(vec![MessageId::new(991)]).unwrap();
        assert_eq!(encode_statuses_body(&query), json!({ "ids": [991] }));

        let json = r#"{ "status": 0, "data": { "statuses": [ { "id": 991, "status": 8 } ] } }"#;
        let decoded = decode_statuses_response(json).unwrap();
        let statuses = decoded.statuses.unwrap();
        assert_eq!(statuses[0].id, MessageId::new(991));
        assert_eq!(statuses[0].code, 8);
    }

    #[test]
    fn decode_inbox_maps_wire_fields() {
        let json = r#"
        {
          "status": 0,
          "data": {
            "messages": [
              {
                "id": 12,
                "originator": "09120000009",
                "line": "98300077",
                "message": "hello back",
                "received_at": 1700000002
              }
            ]
          }
        }
        "#;
        let decoded = decode_inbox_response(json).unwrap();
        let messages = decoded.messages.unwrap();
        assert_eq!(messages[0].id, MessageId::new(12));
        assert_eq!(messages[0].text, "hello back");
    }

    #[test]
    fn decode_mid_distinguishes_null_and_value() {
        let decoded = decode_mid_response(r#"{ "status": 0, "data": { "id": 42 } }"#).unwrap();
        assert_eq!(decoded.id, Some(Some(42)));

        let decoded = decode_mid_response(r#"{ "status": 0, "data": { "id": null } }"#).unwrap();
        assert_eq!(decoded.id, Some(None));
    }

    #[test]
    fn decode_account_preserves_credit_token() {
        let json = r#"{ "status": 0, "data": { "credit": "880.50" } }"#;
        let decoded = decode_account_response(json).unwrap();
        assert_eq!(decoded.info.unwrap().credit, "880.50");

        let json = r#"{ "status": 0, "data": { "credit": 880.50 } }"#;
        let decoded = decode_account_response(json).unwrap();
        assert_eq!(decoded.info.unwrap().credit, "880.50");
    }

    #[test]
    fn decode_account_rejects_non_scalar_credit() {
        let json = r#"{ "status": 0, "data": { "credit": { "value": 1 } } }"#;
        assert!(matches!(
            decode_account_response(json),
            Err(TransportError::InvalidCredit)
        ));
    }

    #[test]
    fn missing_envelope_status_is_a_json_error() {
        let err = decode_inbox_count_response(r#"{ "data": { "count": 1 } }"#).unwrap_err();
        assert!(matches!(err, TransportError::Json(_)));
    }
}
