//! Client layer: orchestrates transport calls and maps transport ↔ domain.

use std::error::Error as StdError;
use std::future::Future;
use std::pin::Pin;

use base64::prelude::*;

use crate::domain::{
    AccountDomain, AccountInfo, ExternalId, InboundMessage, MessageId, Password, SendReport,
    SendRequest, StatusQuery, StatusReport, Username, ValidationError,
};

mod classic;
mod rest;

pub use classic::{ClassicClient, ClassicClientBuilder};
pub use rest::{DEFAULT_INBOX_LIMIT, RestClient, RestClientBuilder};

pub(crate) type BoxError = Box<dyn StdError + Send + Sync>;
pub(crate) type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

#[derive(Debug, Clone)]
pub(crate) struct HttpResponse {
    pub(crate) status: u16,
    pub(crate) body: String,
}

/// Minimal HTTP collaborator. The client never retries, pools, or times out
/// by itself; supply those policies through the transport (or the builder's
/// timeout, which configures the bundled `reqwest` transport).
pub(crate) trait HttpTransport: Send + Sync {
    fn post_json<'a>(
        &'a self,
        url: &'a str,
        headers: Vec<(String, String)>,
        body: serde_json::Value,
    ) -> BoxFuture<'a, Result<HttpResponse, BoxError>>;

    fn get<'a>(
        &'a self,
        url: &'a str,
        headers: Vec<(String, String)>,
    ) -> BoxFuture<'a, Result<HttpResponse, BoxError>>;
}

#[derive(Debug, Clone)]
pub(crate) struct ReqwestTransport {
    pub(crate) client: reqwest::Client,
}

impl HttpTransport for ReqwestTransport {
    fn post_json<'a>(
        &'a self,
        url: &'a str,
        headers: Vec<(String, String)>,
        body: serde_json::Value,
    ) -> BoxFuture<'a, Result<HttpResponse, BoxError>> {
        Box::pin(async move {
            let mut request = self.client.post(url).json(&body);
            for (name, value) in headers {
                request = request.header(name, value);
            }
            let response = request.send().await?;
            let status = response.status().as_u16();
            let body = response.text().await?;
            Ok(HttpResponse { status, body })
        })
    }

    fn get<'a>(
        &'a self,
        url: &'a str,
        headers: Vec<(String, String)>,
    ) -> BoxFuture<'a, Result<HttpResponse, BoxError>> {
        Box::pin(async move {
            let mut request = self.client.get(url);
            for (name, value) in headers {
                request = request.header(name, value);
            }
            let response = request.send().await?;
            let status = response.status().as_u16();
            let body = response.text().await?;
            Ok(HttpResponse { status, body })
        })
    }
}

#[derive(Debug, thiserror::Error)]
#[error("unexpected HTTP status {status}")]
pub(crate) struct HttpStatusError {
    pub(crate) status: u16,
}

pub(crate) fn check_http(response: HttpResponse) -> Result<String, PayamgahError> {
    if (200..=299).contains(&response.status) {
        return Ok(response.body);
    }
    Err(PayamgahError::Transport(Box::new(HttpStatusError {
        status: response.status,
    })))
}

#[derive(Debug, Clone)]
/// Account credentials shared by both API generations.
///
/// The REST generation additionally uses the optional panel [`AccountDomain`]
/// when deriving its Basic credential (`username/domain:password`).
pub struct Credentials {
    username: Username,
    password: Password,
    domain: Option<AccountDomain>,
}

impl Credentials {
    /// Create credentials without a panel domain.
    pub fn new(
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Result<Self, ValidationError> {
        Ok(Self {
            username: Username::new(username)?,
            password: Password::new(password)?,
            domain: None,
        })
    }

    /// Create credentials with a panel domain.
    pub fn with_domain(
        username: impl Into<String>,
        domain: impl Into<String>,
        password: impl Into<String>,
    ) -> Result<Self, ValidationError> {
        Ok(Self {
            username: Username::new(username)?,
            password: Password::new(password)?,
            domain: Some(AccountDomain::new(domain)?),
        })
    }

    pub(crate) fn username(&self) -> &Username {
        &self.username
    }

    pub(crate) fn password(&self) -> &Password {
        &self.password
    }

    /// Precompute the `Authorization` value used by the REST generation.
    pub(crate) fn basic_header(&self) -> String {
        let identity = match &self.domain {
            Some(domain) => format!("{}/{}", self.username.as_str(), domain.as_str()),
            None => self.username.as_str().to_owned(),
        };
        let token = BASE64_STANDARD.encode(format!("{identity}:{}", self.password.as_str()));
        format!("Basic {token}")
    }
}

#[derive(Debug, thiserror::Error)]
/// Errors returned by [`ClassicClient`] and [`RestClient`].
///
/// Every operation rejects with exactly one of these kinds:
/// - [`PayamgahError::InvalidArgument`]: detected locally, before any
///   network call.
/// - [`PayamgahError::Transport`]: connection failure, non-2xx HTTP status,
///   non-JSON body, or a body missing the envelope `status` field. Never
///   retried internally.
/// - [`PayamgahError::Api`]: a structurally valid response whose envelope
///   code is in the generation's error catalog; carries the catalog text.
/// - [`PayamgahError::UnknownApi`]: a structurally valid response whose
///   envelope code is outside the catalog.
pub enum PayamgahError {
    #[error("invalid argument: {0}")]
    InvalidArgument(#[from] ValidationError),

    #[error("transport error: {0}")]
    Transport(#[source] BoxError),

    #[error("api error {code}: {text}")]
    Api { code: i64, text: String },

    #[error("api error: unrecognized status code {code}")]
    UnknownApi { code: i64 },
}

#[allow(async_fn_in_trait)]
/// Capability contract shared by both API generations.
///
/// The two generations do not share wire formats, auth schemes, or code
/// ranges, so they are independent implementations of this trait rather than
/// variations of one client.
pub trait SmsGateway {
    /// Send messages to one or more recipients.
    async fn send(&self, request: SendRequest) -> Result<SendReport, PayamgahError>;

    /// Query delivery-state codes for previously sent message ids.
    async fn message_statuses(&self, query: StatusQuery) -> Result<StatusReport, PayamgahError>;

    /// Pull received messages. `limit` caps the pull where the generation
    /// supports a count parameter; the classic generation fetches all
    /// pending messages unconditionally.
    async fn received_messages(
        &self,
        limit: Option<u32>,
    ) -> Result<Vec<InboundMessage>, PayamgahError>;

    /// Number of messages waiting in the account inbox.
    async fn received_messages_count(&self) -> Result<u64, PayamgahError>;

    /// Credit and expiry information for the account.
    async fn account_info(&self) -> Result<AccountInfo, PayamgahError>;

    /// Look up the vendor message id for a caller-supplied external id.
    /// Returns `None` when no message matches.
    async fn message_id_by_external_id(
        &self,
        uid: &ExternalId,
    ) -> Result<Option<MessageId>, PayamgahError>;
}

#[cfg(test)]
pub(crate) mod testing {
    use std::sync::{Arc, Mutex};

    use super::*;

    #[derive(Debug, Clone, PartialEq, Eq)]
    pub(crate) enum RecordedMethod {
        Post,
        Get,
    }

    #[derive(Debug)]
    pub(crate) struct FakeTransportState {
        pub(crate) last_method: Option<RecordedMethod>,
        pub(crate) last_url: Option<String>,
        pub(crate) last_headers: Vec<(String, String)>,
        pub(crate) last_body: Option<serde_json::Value>,
        pub(crate) response_status: u16,
        pub(crate) response_body: String,
    }

    #[derive(Debug, Clone)]
    pub(crate) struct FakeTransport {
        pub(crate) state: Arc<Mutex<FakeTransportState>>,
    }

    impl FakeTransport {
        pub(crate) fn new(response_status: u16, response_body: impl Into<String>) -> Self {
            Self {
                state: Arc::new(Mutex::new(FakeTransportState {
                    last_method: None,
                    last_url: None,
                    last_headers: Vec::new(),
                    last_body: None,
                    response_status,
                    response_body: response_body.into(),
                })),
            }
        }

        pub(crate) fn last_url(&self) -> Option<String> {
            self.state.lock().unwrap().last_url.clone()
        }

        pub(crate) fn last_body(&self) -> Option<serde_json::Value> {
            self.state.lock().unwrap().last_body.clone()
        }

        pub(crate) fn last_headers(&self) -> Vec<(String, String)> {
            self.state.lock().unwrap().last_headers.clone()
        }

        pub(crate) fn last_method(&self) -> Option<RecordedMethod> {
            self.state.lock().unwrap().last_method.clone()
        }
    }

    impl HttpTransport for FakeTransport {
        fn post_json<'a>(
            &'a self,
            url: &'a str,
            headers: Vec<(String, String)>,
            body: serde_json::Value,
        ) -> BoxFuture<'a, Result<HttpResponse, BoxError>> {
            Box::pin(async move {
                let (status, response_body) = {
                    let mut state = self.state.lock().unwrap();
                    state.last_method = Some(RecordedMethod::Post);
                    state.last_url = Some(url.to_owned());
                    state.last_headers = headers;
                    state.last_body = Some(body);
                    (state.response_status, state.response_body.clone())
                };
                Ok(HttpResponse {
                    status,
                    body: response_body,
                })
            })
        }

        fn get<'a>(
            &'a self,
            url: &'a str,
            headers: Vec<(String, String)>,
        ) -> BoxFuture<'a, Result<HttpResponse, BoxError>> {
            Box::pin(async move {
                let (status, response_body) = {
                    let mut state = self.state.lock().unwrap();
                    state.last_method = Some(RecordedMethod::Get);
                    state.last_url = Some(url.to_owned());
                    state.last_headers = headers;
                    state.last_body = None;
                    (state.response_status, state.response_body.clone())
                };
                Ok(HttpResponse {
                    status,
                    body: response_body,
                })
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn credentials_validate_inputs() {
        assert!(Credentials::new("   ", "pass").is_err());
        assert!(Credentials::new("user", "").is_err());
        assert!(Credentials::with_domain("user", " ", "pass").is_err());
    }

    #[test]
    fn basic_header_includes_domain_when_present() {
        let creds = Credentials::with_domain("user", "panel", "pass").unwrap();
        // base64("user/panel:pass")
        assert_eq!(creds.basic_header(), "Basic dXNlci9wYW5lbDpwYXNz");

        let creds = Credentials::new("user", "pass").unwrap();
        // base64("user:pass")
        assert_eq!(creds.basic_header(), "Basic dXNlcjpwYXNz");
    }

    #[test]
    fn check_http_accepts_success_and_rejects_failure() {
        let ok = check_http(HttpResponse {
            status: 200,
            body: "{}".to_owned(),
        });
        assert_eq!(ok.unwrap(), "{}");

        let err = check_http(HttpResponse {
            status: 503,
            body: "oops".to_owned(),
        })
        .unwrap_err();
        match err {
            PayamgahError::Transport(source) => {
                assert_eq!(source.to_string(), "unexpected HTTP status 503");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
