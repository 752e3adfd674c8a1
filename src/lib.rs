//! Typed Rust client for both generations of the Payamgah SMS HTTP API.
//!
//! The vendor runs two divergent API generations. [`ClassicClient`] speaks
//! the v1 protocol (inline credentials, separate one-to-many and
//! many-to-many send endpoints); [`RestClient`] speaks the v2 protocol
//! (Basic auth, one bulk send endpoint with per-recipient arrays). Both
//! implement the [`SmsGateway`] contract and normalize responses into the
//! same client-side shape, with vendor status codes resolved to English or
//! Persian text through the static catalogs in [`catalog`].
//!
//! ```rust,no_run
//! use payamgah::{
//!     Credentials, LineNumber, MessageText, OneOrMany, RestClient, SendOptions, SendRequest,
//!     SmsGateway, Recipient,
//! };
//!
//! #[tokio::main]
//! async fn main() -> Result<(), payamgah::PayamgahError> {
//!     let credentials = Credentials::with_domain("user", "panel", "secret")?;
//!     let client = RestClient::new(credentials, LineNumber::new("98300077")?)?;
//!
//!     let request = SendRequest::new(
//!         vec![Recipient::new("09120000001")?, Recipient::new("09120000002")?],
//!         OneOrMany::One(MessageText::new("hi")?),
//!         SendOptions::default(),
//!     )?;
//!     let report = client.send(request).await?;
//!     println!("accepted {} of {}", report.accepted(), report.outcomes().len());
//!     Ok(())
//! }
//! ```
#![forbid(unsafe_code)]

pub mod catalog;
pub mod client;
pub mod domain;
mod transport;

pub use catalog::Language;
pub use client::{
    ClassicClient, ClassicClientBuilder, Credentials, DEFAULT_INBOX_LIMIT, PayamgahError,
    RestClient, RestClientBuilder, SmsGateway,
};
pub use domain::{
    AccountDomain, AccountInfo, DeliveryStatus, Encoding, Envelope, ExternalId, InboundMessage,
    LineNumber, MessageId, MessageText, OneOrMany, Password, PhoneNumber, Recipient,
    SendDisposition, SendOptions, SendOutcome, SendPayload, SendReport, SendRequest, StatusQuery,
    StatusReport, Username, ValidationError,
};
