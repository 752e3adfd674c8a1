//! Domain layer: strong types with validation and invariants (no I/O).

mod request;
mod response;
mod validation;
mod value;

pub use request::{OneOrMany, SendOptions, SendPayload, SendRequest, StatusQuery};
pub use response::{
    AccountInfo, DeliveryStatus, Envelope, InboundMessage, SendDisposition, SendOutcome,
    SendReport, StatusReport,
};
pub use validation::ValidationError;
pub use value::{
    AccountDomain, Encoding, ExternalId, LineNumber, MessageId, MessageText, Password,
    PhoneNumber, Recipient, Username,
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn username_rejects_empty() {
        assert!(matches!(
            Username::new("   "),
            Err(ValidationError::Empty {
                field: Username::FIELD
            })
        ));
    }

    #[test]
    fn password_rejects_empty() {
        assert!(matches!(
            Password::new(""),
            Err(ValidationError::Empty {
                field: Password::FIELD
            })
        ));
    }

    #[test]
    fn phone_number_defaults_to_iranian_region() {
        let pn = PhoneNumber::parse(None, " 09120000001 ").unwrap();
        assert_eq!(pn.raw(), "09120000001");
        assert_eq!(pn.e164(), "+989120000001");
    }

    #[test]
    fn send_request_broadcast_round_trip() {
        let recipients = vec![
            Recipient::new("09120000001").unwrap(),
            Recipient::new("09120000002").unwrap(),
        ];
        let request = SendRequest::new(
            recipients,
            OneOrMany::One(MessageText::new("hi").unwrap()),
            SendOptions::default(),
        )
        .unwrap();
        assert_eq!(request.recipients().len(), 2);
        assert!(matches!(request.payload(), SendPayload::Broadcast { .. }));
    }
}
