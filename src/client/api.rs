use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::AUTHORIZATION;
use serde::Serialize;
use serde_json::{Map, Value};

use crate::error::ClientError;
use crate::models::{AuthResponse, Role, User};
use crate::services::BackendEndpoint;

pub type ApiResult<T> = Result<T, ClientError>;

#[derive(Debug, Clone, Serialize)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

/// Formats a session token as an `Authorization` header value.
pub fn bearer(token: &str) -> String {
    format!("Bearer {}", token)
}

/// Calls the session store and page flows make against the proxy routes
#[async_trait]
#[cfg_attr(test, mockall::automock)]
pub trait AuthApi: Send + Sync {
    async fn login(&self, credentials: &Credentials) -> ApiResult<AuthResponse>;
    async fn logout(&self, token: &str) -> ApiResult<()>;
    async fn profile(&self, token: &str) -> ApiResult<User>;
    /// Final registration submission; the body never contains `role`.
    async fn signup(&self, role: Role, body: &Map<String, Value>) -> ApiResult<Value>;
}

/// [`AuthApi`] over HTTP against a running proxy
#[derive(Clone)]
pub struct HttpAuthApi {
    client: reqwest::Client,
    base_url: String,
}

impl HttpAuthApi {
    pub fn new(base_url: impl Into<String>) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .unwrap_or_else(|err| {
                tracing::warn!("falling back to a default HTTP client without timeout: {}", err);
                reqwest::Client::new()
            });

        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    fn url(&self, endpoint: BackendEndpoint) -> String {
        format!("{}{}", self.base_url, endpoint.local_route())
    }

    /// Reads the body as JSON and turns non-2xx answers into
    /// [`ClientError::Rejected`].
    async fn read_json(response: reqwest::Response) -> ApiResult<Value> {
        let status = response.status();
        let text = response.text().await?;
        let body = if text.trim().is_empty() {
            Value::Null
        } else {
            serde_json::from_str(&text).map_err(|e| ClientError::Decode(e.to_string()))?
        };

        if status.is_success() {
            Ok(body)
        } else {
            Err(ClientError::Rejected {
                status: status.as_u16(),
                body,
            })
        }
    }
}

#[async_trait]
impl AuthApi for HttpAuthApi {
    async fn login(&self, credentials: &Credentials) -> ApiResult<AuthResponse> {
        let response = self
            .client
            .post(self.url(BackendEndpoint::Login))
            .json(credentials)
            .send()
            .await?;

        let body = Self::read_json(response).await?;
        serde_json::from_value(body).map_err(|e| ClientError::Decode(e.to_string()))
    }

    async fn logout(&self, token: &str) -> ApiResult<()> {
        let response = self
            .client
            .post(self.url(BackendEndpoint::Logout))
            .header(AUTHORIZATION, bearer(token))
            .send()
            .await?;

        Self::read_json(response).await.map(|_| ())
    }

    async fn profile(&self, token: &str) -> ApiResult<User> {
        let response = self
            .client
            .get(self.url(BackendEndpoint::Profile))
            .header(AUTHORIZATION, bearer(token))
            .send()
            .await?;

        let body = Self::read_json(response).await?;
        User::from_fragments(&body).map_err(|e| ClientError::Decode(e.to_string()))
    }

    async fn signup(&self, role: Role, body: &Map<String, Value>) -> ApiResult<Value> {
        let endpoint = match role {
            Role::Freelancer => BackendEndpoint::FreelancerSignup,
            Role::Client => BackendEndpoint::ClientSignup,
        };

        let response = self.client.post(self.url(endpoint)).json(body).send().await?;
        Self::read_json(response).await
    }
}
