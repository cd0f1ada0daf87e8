use std::time::Duration;

use homeinspect_protocol::wire::Ack;
use homeinspect_protocol::wire::Credentials;
use homeinspect_protocol::wire::HierarchyPayload;
use homeinspect_protocol::wire::ResultRecord;
use homeinspect_protocol::wire::ResultsPayload;
use homeinspect_protocol::wire::TokenEnvelope;
use reqwest::RequestBuilder;
use reqwest::StatusCode;
use reqwest::header::ACCEPT;
use serde::de::DeserializeOwned;

use crate::endpoint::Endpoint;
use crate::error::ClientError;
use crate::error::ClientResult;

/// Production API root.
pub const DEFAULT_BASE_URL: &str = "http://crm.professionalhomeinspection.net/api";

/// Short-lived credential appended to authenticated requests.
#[derive(Clone, PartialEq, Eq)]
pub struct Token(String);

impl Token {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The token as a URL query fragment, `?token=<T>`.
    pub fn query_fragment(&self) -> String {
        format!("?token={}", self.0)
    }
}

impl std::fmt::Debug for Token {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("Token(<redacted>)")
    }
}

#[derive(Debug, Clone)]
pub struct BackendClient {
    client: reqwest::Client,
    base_url: String,
}

impl BackendClient {
    /// Build a client rooted at `base_url`; every request is bounded by
    /// `request_timeout`.
    pub fn new(base_url: impl Into<String>, request_timeout: Duration) -> ClientResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(request_timeout)
            .build()?;
        Ok(Self::with_client(client, base_url))
    }

    pub fn with_client(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { client, base_url }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Build URL for an endpoint
    pub fn endpoint_url(&self, endpoint: Endpoint) -> String {
        format!("{}/{}", self.base_url, endpoint.path())
    }

    fn request(&self, endpoint: Endpoint, token: Option<&Token>) -> ClientResult<RequestBuilder> {
        let mut url = self.endpoint_url(endpoint);
        if endpoint.requires_token() {
            let token = token.ok_or(ClientError::MissingToken(endpoint))?;
            url.push_str(&token.query_fragment());
        }
        Ok(self
            .client
            .request(endpoint.method(), url)
            .header(ACCEPT, "application/json"))
    }

    /// Send once and return the raw body of a 2xx response.
    async fn send(&self, endpoint: Endpoint, builder: RequestBuilder) -> ClientResult<String> {
        tracing::debug!(%endpoint, "sending backend request");
        let response = builder.send().await.map_err(|e| {
            tracing::warn!(%endpoint, "request failed: {e}");
            ClientError::Network(e.to_string())
        })?;

        let status = response.status();
        let body = response.text().await?;
        tracing::debug!(%endpoint, status = status.as_u16(), bytes = body.len(), "backend response");

        if status.is_success() {
            return Ok(body);
        }
        if endpoint == Endpoint::Token
            && matches!(status, StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN)
        {
            return Err(ClientError::Auth(format!("HTTP {status}")));
        }
        Err(ClientError::Server {
            status: status.as_u16(),
            message: body,
        })
    }

    fn decode<T: DeserializeOwned>(endpoint: Endpoint, body: &str) -> ClientResult<T> {
        serde_json::from_str(body).map_err(|e| {
            tracing::warn!(%endpoint, "malformed response: {e}");
            ClientError::Parse(format!("{endpoint}: {e}"))
        })
    }

    fn rejected(endpoint: Endpoint) -> ClientError {
        ClientError::Server {
            status: StatusCode::OK.as_u16(),
            message: format!("{endpoint}: backend reported success=false"),
        }
    }

    /// Exchange credentials for a token.
    pub async fn request_token(&self, credentials: &Credentials) -> ClientResult<Token> {
        let endpoint = Endpoint::Token;
        let builder = self.request(endpoint, None)?.json(credentials);
        let body = self.send(endpoint, builder).await?;

        let envelope: TokenEnvelope = serde_json::from_str(&body)
            .map_err(|e| ClientError::Auth(format!("unreadable token response: {e}")))?;
        if !envelope.success {
            return Err(ClientError::Auth("token request rejected".to_string()));
        }
        let token = envelope
            .token()
            .ok_or_else(|| ClientError::Auth("token missing from response".to_string()))?;

        tracing::info!(user = %credentials.username, "obtained backend token");
        Ok(Token::new(token))
    }

    /// Fetch the section/subsection/comment hierarchy.
    pub async fn fetch_hierarchy(&self, token: &Token) -> ClientResult<HierarchyPayload> {
        let endpoint = Endpoint::Hierarchy;
        let builder = self.request(endpoint, Some(token))?;
        let body = self.send(endpoint, builder).await?;

        let payload: HierarchyPayload = Self::decode(endpoint, &body)?;
        if !payload.success {
            return Err(Self::rejected(endpoint));
        }
        Ok(payload)
    }

    /// Fetch the results already stored on the backend.
    pub async fn fetch_results(&self, token: &Token) -> ClientResult<Vec<ResultRecord>> {
        let endpoint = Endpoint::ResultsRead;
        let builder = self.request(endpoint, Some(token))?;
        let body = self.send(endpoint, builder).await?;

        let payload: ResultsPayload = Self::decode(endpoint, &body)?;
        if !payload.success {
            return Err(Self::rejected(endpoint));
        }
        Ok(payload.data)
    }

    /// Post one result.
    pub async fn submit_result(&self, token: &Token, record: &ResultRecord) -> ClientResult<Ack> {
        let endpoint = Endpoint::ResultsWrite;
        let builder = self.request(endpoint, Some(token))?.json(record);
        let body = self.send(endpoint, builder).await?;

        let ack: Ack = Self::decode(endpoint, &body)?;
        if !ack.success {
            return Err(ClientError::Server {
                status: StatusCode::OK.as_u16(),
                message: ack
                    .message
                    .unwrap_or_else(|| format!("{endpoint}: backend reported success=false")),
            });
        }
        Ok(ack)
    }
}
