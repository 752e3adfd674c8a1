use std::sync::Arc;
use std::time::Duration;

use tracing::debug;

use super::{
    Credentials, HttpTransport, PayamgahError, ReqwestTransport, check_http,
};
use crate::catalog::{self, Language};
use crate::domain::{
    AccountInfo, Envelope, ExternalId, InboundMessage, LineNumber, MessageId, SendReport,
    SendRequest, StatusQuery, StatusReport,
};
use crate::transport::classic as wire;

const DEFAULT_BASE_URL: &str = "https://classic.payamgah.net/api/v1";

#[derive(Debug, Clone)]
/// Builder for [`ClassicClient`].
pub struct ClassicClientBuilder {
    credentials: Credentials,
    line: LineNumber,
    base_url: String,
    language: Language,
    timeout: Option<Duration>,
    user_agent: Option<String>,
}

impl ClassicClientBuilder {
    /// Create a builder with the default endpoint, English catalog text, and
    /// no timeout/user-agent override.
    pub fn new(credentials: Credentials, line: LineNumber) -> Self {
        Self {
            credentials,
            line,
            base_url: DEFAULT_BASE_URL.to_owned(),
            language: Language::default(),
            timeout: None,
            user_agent: None,
        }
    }

    /// Override the API base URL.
    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Language used when resolving catalog text into outcomes and errors.
    pub fn language(mut self, language: Language) -> Self {
        self.language = language;
        self
    }

    /// Set an HTTP client timeout applied to the entire request.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Override the HTTP `User-Agent` header.
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = Some(user_agent.into());
        self
    }

    /// Build a [`ClassicClient`].
    pub fn build(self) -> Result<ClassicClient, PayamgahError> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = self.timeout {
            builder = builder.timeout(timeout);
        }
        if let Some(user_agent) = self.user_agent {
            builder = builder.user_agent(user_agent);
        }
        let client = builder
            .build()
            .map_err(|err| PayamgahError::Transport(Box::new(err)))?;

        Ok(ClassicClient {
            credentials: self.credentials,
            line: self.line,
            base_url: self.base_url.trim_end_matches('/').to_owned(),
            language: self.language,
            http: Arc::new(ReqwestTransport { client }),
        })
    }
}

#[derive(Clone)]
/// Client for the classic (v1) API generation.
///
/// Credentials are injected into every request body. Single-valued requests
/// go to the vendor's one-to-many `send` endpoint with singular fields;
/// multi-valued requests go to `sendarray` with aligned per-recipient
/// arrays. The two endpoints are billed differently, so the selection is
/// part of the contract.
pub struct ClassicClient {
    credentials: Credentials,
    line: LineNumber,
    base_url: String,
    language: Language,
    http: Arc<dyn HttpTransport>,
}

impl ClassicClient {
    /// Create a client using the default endpoint.
    ///
    /// For more customization, use [`ClassicClient::builder`].
    pub fn new(credentials: Credentials, line: LineNumber) -> Result<Self, PayamgahError> {
        Self::builder(credentials, line).build()
    }

    /// Start building a client with custom settings.
    pub fn builder(credentials: Credentials, line: LineNumber) -> ClassicClientBuilder {
        ClassicClientBuilder::new(credentials, line)
    }

    async fn post(&self, path: &str, body: serde_json::Value) -> Result<String, PayamgahError> {
        let url = format!("{}/{path}", self.base_url);
        debug!(url = %url, "dispatching classic request");
        let response = self
            .http
            .post_json(&url, Vec::new(), body)
            .await
            .map_err(PayamgahError::Transport)?;
        check_http(response)
    }

    fn check_envelope(&self, envelope: Envelope) -> Result<(), PayamgahError> {
        if envelope.code == 0 {
            return Ok(());
        }
        match catalog::classic::error_text(envelope.code, self.language) {
            Some(text) => Err(PayamgahError::Api {
                code: envelope.code,
                text: text.to_owned(),
            }),
            None => Err(PayamgahError::UnknownApi {
                code: envelope.code,
            }),
        }
    }
}

fn transport_err(err: wire::TransportError) -> PayamgahError {
    PayamgahError::Transport(Box::new(err))
}

impl super::SmsGateway for ClassicClient {
    async fn send(&self, request: SendRequest) -> Result<SendReport, PayamgahError> {
        let (shape, body) = wire::encode_send_body(
            self.credentials.username(),
            self.credentials.password(),
            &self.line,
            &request,
        );
        let path = match shape {
            wire::SendShape::OneToMany => "send",
            wire::SendShape::ManyToMany => "sendarray",
        };
        debug!(recipients = request.recipients().len(), endpoint = path, "sending");

        let body = self.post(path, body).await?;
        let decoded = wire::decode_send_response(request.recipients(), self.language, &body)
            .map_err(transport_err)?;
        self.check_envelope(decoded.envelope)?;

        let outcomes = decoded
            .outcomes
            .ok_or_else(|| transport_err(wire::TransportError::MissingData))?;
        Ok(SendReport::new(outcomes, decoded.envelope))
    }

    async fn message_statuses(&self, query: StatusQuery) -> Result<StatusReport, PayamgahError> {
        let body = wire::encode_status_body(
            self.credentials.username(),
            self.credentials.password(),
            &query,
        );
        let body = self.post("status", body).await?;
        let decoded = wire::decode_status_response(query.ids(), &body).map_err(transport_err)?;
        self.check_envelope(decoded.envelope)?;

        let statuses = decoded
            .statuses
            .ok_or_else(|| transport_err(wire::TransportError::MissingData))?;
        Ok(StatusReport {
            statuses,
            envelope: decoded.envelope,
        })
    }

    async fn received_messages(
        &self,
        limit: Option<u32>,
    ) -> Result<Vec<InboundMessage>, PayamgahError> {
        // The classic generation has no count parameter; it always returns
        // every pending message.
        if limit.is_some() {
            debug!("classic inbox has no count parameter; fetching all pending messages");
        }
        let body = wire::encode_inbox_body(
            self.credentials.username(),
            self.credentials.password(),
        );
        let body = self.post("inbox", body).await?;
        let decoded = wire::decode_inbox_response(&body).map_err(transport_err)?;
        self.check_envelope(decoded.envelope)?;

        decoded
            .messages
            .ok_or_else(|| transport_err(wire::TransportError::MissingData))
    }

    async fn received_messages_count(&self) -> Result<u64, PayamgahError> {
        let body = wire::encode_inbox_count_body(
            self.credentials.username(),
            self.credentials.password(),
        );
        let body = self.post("inboxcount", body).await?;
        let decoded = wire::decode_inbox_count_response(&body).map_err(transport_err)?;
        self.check_envelope(decoded.envelope)?;

        decoded
            .count
            .ok_or_else(|| transport_err(wire::TransportError::MissingData))
    }

    async fn account_info(&self) -> Result<AccountInfo, PayamgahError> {
        let body = wire::encode_account_body(
            self.credentials.username(),
            self.credentials.password(),
        );
        let body = self.post("account", body).await?;
        let decoded = wire::decode_account_response(&body).map_err(transport_err)?;
        self.check_envelope(decoded.envelope)?;

        decoded
            .info
            .ok_or_else(|| transport_err(wire::TransportError::MissingData))
    }

    async fn message_id_by_external_id(
        &self,
        uid: &ExternalId,
    ) -> Result<Option<MessageId>, PayamgahError> {
        let body = wire::encode_mid_body(
            self.credentials.username(),
            self.credentials.password(),
            uid,
        );
        let body = self.post("mid", body).await?;
        let decoded = wire::decode_mid_response(&body).map_err(transport_err)?;
        self.check_envelope(decoded.envelope)?;

        let raw = decoded
            .id
            .ok_or_else(|| transport_err(wire::TransportError::MissingData))?;
        // The vendor reports 0 when nothing matched.
        Ok((raw > 0).then(|| MessageId::new(raw as u64)))
    }
}
