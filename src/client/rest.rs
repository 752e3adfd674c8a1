use std::sync::Arc;
use std::time::Duration;

use tracing::debug;
use url::Url;

use super::{
    Credentials, HttpTransport, PayamgahError, ReqwestTransport, check_http,
};
use crate::catalog::{self, Language};
use crate::domain::{
    AccountInfo, Envelope, ExternalId, InboundMessage, LineNumber, MessageId, SendReport,
    SendRequest, StatusQuery, StatusReport,
};
use crate::transport::rest as wire;

const DEFAULT_BASE_URL: &str = "https://rest.payamgah.net/api/v2";

/// Inbox pull size used when the caller does not supply a limit.
pub const DEFAULT_INBOX_LIMIT: u32 = 100;

#[derive(Debug, Clone)]
/// Builder for [`RestClient`].
pub struct RestClientBuilder {
    credentials: Credentials,
    line: LineNumber,
    base_url: String,
    language: Language,
    timeout: Option<Duration>,
    user_agent: Option<String>,
}

impl RestClientBuilder {
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

    /// Build a [`RestClient`]. The Basic credential is derived once, here.
    pub fn build(self) -> Result<RestClient, PayamgahError> {
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

        Ok(RestClient {
            auth_header: self.credentials.basic_header(),
            line: self.line,
            base_url: self.base_url.trim_end_matches('/').to_owned(),
            language: self.language,
            http: Arc::new(ReqwestTransport { client }),
        })
    }
}

#[derive(Clone)]
/// Client for the REST (v2) API generation.
///
/// Authentication is a precomputed `Authorization: Basic` header derived
/// from `username/domain:password`; request bodies never carry credentials.
/// Every send is expanded to aligned per-recipient arrays on the single bulk
/// endpoint.
pub struct RestClient {
    auth_header: String,
    line: LineNumber,
    base_url: String,
    language: Language,
    http: Arc<dyn HttpTransport>,
}

impl RestClient {
    /// Create a client using the default endpoint.
    ///
    /// For more customization, use [`RestClient::builder`].
    pub fn new(credentials: Credentials, line: LineNumber) -> Result<Self, PayamgahError> {
        Self::builder(credentials, line).build()
    }

    /// Start building a client with custom settings.
    pub fn builder(credentials: Credentials, line: LineNumber) -> RestClientBuilder {
        RestClientBuilder::new(credentials, line)
    }

    fn headers(&self) -> Vec<(String, String)> {
        vec![("Authorization".to_owned(), self.auth_header.clone())]
    }

    fn url_with(
        &self,
        path: &str,
        params: &[(&str, String)],
    ) -> Result<String, PayamgahError> {
        let url = Url::parse_with_params(&format!("{}/{path}", self.base_url), params)
            .map_err(|err| PayamgahError::Transport(Box::new(err)))?;
        Ok(url.into())
    }

    async fn post(&self, path: &str, body: serde_json::Value) -> Result<String, PayamgahError> {
        let url = format!("{}/{path}", self.base_url);
        debug!(url = %url, "dispatching rest request");
        let response = self
            .http
            .post_json(&url, self.headers(), body)
            .await
            .map_err(PayamgahError::Transport)?;
        check_http(response)
    }

    async fn get(&self, url: String) -> Result<String, PayamgahError> {
        debug!(url = %url, "dispatching rest request");
        let response = self
            .http
            .get(&url, self.headers())
            .await
            .map_err(PayamgahError::Transport)?;
        check_http(response)
    }

    fn check_envelope(&self, envelope: Envelope) -> Result<(), PayamgahError> {
        if envelope.code == 0 {
            return Ok(());
        }
        match catalog::rest::error_text(envelope.code, self.language) {
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

impl super::SmsGateway for RestClient {
    async fn send(&self, request: SendRequest) -> Result<SendReport, PayamgahError> {
        let body = wire::encode_send_body(&self.line, &request);
        debug!(recipients = request.recipients().len(), "sending");

        let body = self.post("sms/send", body).await?;
        let decoded = wire::decode_send_response(request.recipients(), self.language, &body)
            .map_err(transport_err)?;
        self.check_envelope(decoded.envelope)?;

        let outcomes = decoded
            .outcomes
            .ok_or_else(|| transport_err(wire::TransportError::MissingData))?;
        Ok(SendReport::new(outcomes, decoded.envelope))
    }

    async fn message_statuses(&self, query: StatusQuery) -> Result<StatusReport, PayamgahError> {
        let body = wire::encode_statuses_body(&query);
        let body = self.post("sms/statuses", body).await?;
        let decoded = wire::decode_statuses_response(&body).map_err(transport_err)?;
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
        let limit = limit.unwrap_or(DEFAULT_INBOX_LIMIT);
        let url = self.url_with("sms/inbox", &[("limit", limit.to_string())])?;
        let body = self.get(url).await?;
        let decoded = wire::decode_inbox_response(&body).map_err(transport_err)?;
        self.check_envelope(decoded.envelope)?;

        decoded
            .messages
            .ok_or_else(|| transport_err(wire::TransportError::MissingData))
    }

    async fn received_messages_count(&self) -> Result<u64, PayamgahError> {
        let body = self.get(format!("{}/sms/inbox/count", self.base_url)).await?;
        let decoded = wire::decode_inbox_count_response(&body).map_err(transport_err)?;
        self.check_envelope(decoded.envelope)?;

        decoded
            .count
            .ok_or_else(|| transport_err(wire::TransportError::MissingData))
    }

    async fn account_info(&self) -> Result<AccountInfo, PayamgahError> {
        let body = self.get(format!("{}/account/info", self.base_url)).await?;
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
        let url = self.url_with("sms/mid", &[(ExternalId::FIELD, uid.as_str().to_owned())])?;
        let body = self.get(url).await?;
        let decoded = wire::decode_mid_response(&body).map_err(transport_err)?;
        self.check_envelope(decoded.envelope)?;

        let raw = decoded
            .id
            .ok_or_else(|| transport_err(wire::TransportError::MissingData))?;
        // `null` and the 0 sentinel both mean "no message matched".
        Ok(raw.filter(|id| *id > 0).map(MessageId::new))
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use crate::client::SmsGateway;
    use crate::client::testing::{FakeTransport, RecordedMethod};
    use crate::domain::{MessageText, OneOrMany, Recipient, SendOptions};

    use super::*;

    fn make_client(transport: FakeTransport) -> RestClient {
        RestClient {
            auth_header: Credentials::with_domain("user", "panel", "pass")
                .unwrap()
                .basic_header(),
            line: LineNumber::new("98300077").unwrap(),
            base_url: "https://example.invalid/api/v2".to_owned(),
            language: Language::English,
            http: Arc::new(transport),
        }
    }

    fn recipients() -> Vec<Recipient> {
        vec![
            Recipient::new("09120000001").unwrap(),
            Recipient::new("09120000002").unwrap(),
        ]
    }

    fn broadcast_request() -> SendRequest {
        SendRequest::new(
            recipients(),
            OneOrMany::One(MessageText::new("hi").unwrap()),
            SendOptions::default(),
        )
        .unwrap()
    }

    #[tokio::test]
    async fn send_always_uses_bulk_endpoint_with_expanded_arrays() {
        let body = r#"
        {
          "status": "success",
          "data": {
            "messages": [ { "id": 1, "status": 0 }, { "id": 2, "status": 0 } ]
          }
        }
        "#;
        let transport = FakeTransport::new(200, body);
        let client = make_client(transport.clone());

        let report = client.send(broadcast_request()).await.unwrap();
        assert_eq!(report.accepted(), 2);
        assert_eq!(report.rejected(), 0);

        assert_eq!(
            transport.last_url().as_deref(),
            Some("https://example.invalid/api/v2/sms/send")
        );
        let sent = transport.last_body().unwrap();
        assert_eq!(sent["messages"], json!(["hi", "hi"]));
        assert_eq!(sent["senders"], json!(["98300077", "98300077"]));
        assert!(sent.get("username").is_none());
    }

    #[tokio::test]
    async fn requests_carry_precomputed_basic_header() {
        let transport = FakeTransport::new(
            200,
            r#"{ "status": 0, "data": { "count": 0 } }"#,
        );
        let client = make_client(transport.clone());

        client.received_messages_count().await.unwrap();

        let headers = transport.last_headers();
        assert_eq!(
            headers,
            vec![(
                "Authorization".to_owned(),
                "Basic dXNlci9wYW5lbDpwYXNz".to_owned()
            )]
        );
        assert_eq!(transport.last_method(), Some(RecordedMethod::Get));
    }

    #[tokio::test]
    async fn insufficient_credit_envelope_maps_to_api_error() {
        let transport = FakeTransport::new(200, r#"{ "status": -104 }"#);
        let client = make_client(transport);

        let err = client.send(broadcast_request()).await.unwrap_err();
        match err {
            PayamgahError::Api { code, text } => {
                assert_eq!(code, -104);
                assert_eq!(text, "insufficient credit");
                assert_eq!(
                    catalog::rest::error_text(code, Language::English),
                    Some(text.as_str())
                );
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn unknown_envelope_code_maps_to_unknown_api_error() {
        let transport = FakeTransport::new(200, r#"{ "status": -9999 }"#);
        let client = make_client(transport);

        let err = client.send(broadcast_request()).await.unwrap_err();
        assert!(matches!(err, PayamgahError::UnknownApi { code: -9999 }));
    }

    #[tokio::test]
    async fn missing_envelope_field_is_a_transport_error() {
        let transport = FakeTransport::new(200, r#"{ "data": { "messages": [] } }"#);
        let client = make_client(transport);

        let err = client.send(broadcast_request()).await.unwrap_err();
        assert!(matches!(err, PayamgahError::Transport(_)));
    }

    #[tokio::test]
    async fn inbox_defaults_to_limit_100() {
        let transport = FakeTransport::new(
            200,
            r#"{ "status": 0, "data": { "messages": [] } }"#,
        );
        let client = make_client(transport.clone());

        client.received_messages(None).await.unwrap();
        assert_eq!(
            transport.last_url().as_deref(),
            Some("https://example.invalid/api/v2/sms/inbox?limit=100")
        );

        client.received_messages(Some(5)).await.unwrap();
        assert_eq!(
            transport.last_url().as_deref(),
            Some("https://example.invalid/api/v2/sms/inbox?limit=5")
        );
    }

    #[tokio::test]
    async fn statuses_post_ids_and_pass_codes_through() {
        let transport = FakeTransport::new(
            200,
            r#"{ "status": 0, "data": { "statuses": [ { "id": 991, "status": 8 } ] } }"#,
        );
        let client = make_client(transport.clone());

        let report = client
            .message_statuses(StatusQuery::one(MessageId::new(991)))
            .await
            .unwrap();
        assert_eq!(report.statuses[0].code, 8);

        assert_eq!(
            transport.last_url().as_deref(),
            Some("https://example.invalid/api/v2/sms/statuses")
        );
        assert_eq!(transport.last_body().unwrap(), json!({ "ids": [991] }));
    }

    #[tokio::test]
    async fn null_mid_is_coerced_to_absent() {
        let transport = FakeTransport::new(200, r#"{ "status": 0, "data": { "id": null } }"#);
        let client = make_client(transport.clone());

        let uid = ExternalId::new("order-42").unwrap();
        assert_eq!(client.message_id_by_external_id(&uid).await.unwrap(), None);
        assert_eq!(
            transport.last_url().as_deref(),
            Some("https://example.invalid/api/v2/sms/mid?uid=order-42")
        );

        let transport = FakeTransport::new(200, r#"{ "status": 0, "data": { "id": 42 } }"#);
        let client = make_client(transport);
        assert_eq!(
            client.message_id_by_external_id(&uid).await.unwrap(),
            Some(MessageId::new(42))
        );
    }

    #[tokio::test]
    async fn account_info_decodes_credit_and_expiry() {
        let transport = FakeTransport::new(
            200,
            r#"{ "status": 0, "data": { "credit": 880.50, "expires_at": 1767000000 } }"#,
        );
        let client = make_client(transport);

        let info = client.account_info().await.unwrap();
        assert_eq!(info.credit, "880.50");
        assert_eq!(info.expires_at, Some(1_767_000_000));
    }

    #[test]
    fn builder_overrides_are_applied() {
        let client = RestClient::builder(
            Credentials::with_domain("user", "panel", "pass").unwrap(),
            LineNumber::new("98300077").unwrap(),
        )
        .base_url("https://example.invalid/api/v2/")
        .language(Language::Persian)
        .build()
        .unwrap();
        assert_eq!(client.base_url, "https://example.invalid/api/v2");
        assert_eq!(client.auth_header, "Basic dXNlci9wYW5lbDpwYXNz");
    }
}
