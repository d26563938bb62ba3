//! Forwarding client for the authentication/profile backend
//!
//! Every proxy route maps onto exactly one [`BackendEndpoint`]. The client
//! re-issues the browser's request with the same body, forwarding only the
//! `Content-Type` and `Authorization` headers, and hands back the backend's
//! status and raw body so the route can relay them unchanged.
//!
//! # Example
//!
//! ```rust,no_run
//! use trustwork::services::{BackendClient, BackendEndpoint, ForwardRequest};
//! use std::time::Duration;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = BackendClient::new("https://api.example.com", Duration::from_secs(30));
//! let request = ForwardRequest::new(BackendEndpoint::Login)
//!     .json_body(br#"{"email":"a@example.com","password":"secret"}"#.to_vec());
//! let response = client.forward(request).await?;
//! println!("{} {}", response.status, String::from_utf8_lossy(&response.body));
//! # Ok(())
//! # }
//! ```

use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use reqwest::Method;

use crate::error::ProxyError;

/// Backend endpoints the proxy knows about
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendEndpoint {
    Login,
    Logout,
    Profile,
    ClientSignup,
    FreelancerSignup,
}

impl BackendEndpoint {
    /// Path on the backend, relative to `BASE_URL`
    pub fn backend_path(&self) -> &'static str {
        match self {
            BackendEndpoint::Login => "/auth/login/",
            BackendEndpoint::Logout => "/auth/logout/",
            BackendEndpoint::Profile => "/profile/",
            BackendEndpoint::ClientSignup => "/auth/client/signup/",
            BackendEndpoint::FreelancerSignup => "/auth/freelancer/signup/",
        }
    }

    /// Same-origin route exposed by the proxy
    pub fn local_route(&self) -> &'static str {
        match self {
            BackendEndpoint::Login => "/api/login",
            BackendEndpoint::Logout => "/api/logout",
            BackendEndpoint::Profile => "/api/profile",
            BackendEndpoint::ClientSignup => "/api/client-signup",
            BackendEndpoint::FreelancerSignup => "/api/freelancer-signup",
        }
    }

    pub fn method(&self) -> Method {
        match self {
            BackendEndpoint::Profile => Method::GET,
            _ => Method::POST,
        }
    }

    pub fn requires_auth(&self) -> bool {
        matches!(self, BackendEndpoint::Logout | BackendEndpoint::Profile)
    }

    /// Whether the caller's JSON body is forwarded
    pub fn carries_body(&self) -> bool {
        matches!(
            self,
            BackendEndpoint::Login | BackendEndpoint::ClientSignup | BackendEndpoint::FreelancerSignup
        )
    }

    /// Status the backend answers with on success
    pub fn success_status(&self) -> u16 {
        match self {
            BackendEndpoint::ClientSignup | BackendEndpoint::FreelancerSignup => 201,
            _ => 200,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            BackendEndpoint::Login => "login",
            BackendEndpoint::Logout => "logout",
            BackendEndpoint::Profile => "profile",
            BackendEndpoint::ClientSignup => "client signup",
            BackendEndpoint::FreelancerSignup => "freelancer signup",
        }
    }
}

/// A request to re-issue against the backend
#[derive(Debug, Clone)]
pub struct ForwardRequest {
    pub endpoint: BackendEndpoint,
    pub authorization: Option<String>,
    pub body: Option<Vec<u8>>,
}

impl ForwardRequest {
    pub fn new(endpoint: BackendEndpoint) -> Self {
        Self {
            endpoint,
            authorization: None,
            body: None,
        }
    }

    pub fn authorization(mut self, value: impl Into<String>) -> Self {
        self.authorization = Some(value.into());
        self
    }

    pub fn json_body(mut self, body: Vec<u8>) -> Self {
        self.body = Some(body);
        self
    }
}

/// Backend answer, relayed verbatim by the proxy routes
#[derive(Debug, Clone)]
pub struct ForwardedResponse {
    pub status: u16,
    pub content_type: Option<String>,
    pub body: Vec<u8>,
}

impl ForwardedResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Shared reqwest client bound to one backend root
///
/// Cheap to clone; the underlying connection pool is shared.
#[derive(Clone)]
pub struct BackendClient {
    client: reqwest::Client,
    base_url: String,
}

impl BackendClient {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Self {
        let client = reqwest::Client::builder()
            .timeout(timeout)
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

    pub fn endpoint_url(&self, endpoint: BackendEndpoint) -> String {
        format!("{}{}", self.base_url, endpoint.backend_path())
    }

    fn build_headers(&self, request: &ForwardRequest) -> Result<HeaderMap, ProxyError> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        if let Some(authorization) = &request.authorization {
            let value = HeaderValue::from_str(authorization)
                .map_err(|e| ProxyError::InvalidHeader(e.to_string()))?;
            headers.insert(AUTHORIZATION, value);
        }

        Ok(headers)
    }

    /// Sends `request` to the backend and collects status, content type and
    /// body. Non-2xx answers are not errors here.
    pub async fn forward(&self, request: ForwardRequest) -> Result<ForwardedResponse, ProxyError> {
        let endpoint = request.endpoint;
        if endpoint.requires_auth() && request.authorization.is_none() {
            return Err(ProxyError::MissingAuthorization);
        }

        let url = self.endpoint_url(endpoint);
        let headers = self.build_headers(&request)?;

        let mut builder = self.client.request(endpoint.method(), &url).headers(headers);
        if endpoint.carries_body() {
            if let Some(body) = request.body {
                builder = builder.body(body);
            }
        }

        tracing::debug!("forwarding {} to {}", endpoint.name(), url);
        let response = builder.send().await?;

        let status = response.status().as_u16();
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string);
        let body = response.bytes().await?.to_vec();

        Ok(ForwardedResponse {
            status,
            content_type,
            body,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoint_table_matches_backend_contract() {
        let expected = [
            (BackendEndpoint::Login, "/auth/login/", Method::POST, false, 200),
            (BackendEndpoint::Logout, "/auth/logout/", Method::POST, true, 200),
            (BackendEndpoint::Profile, "/profile/", Method::GET, true, 200),
            (BackendEndpoint::ClientSignup, "/auth/client/signup/", Method::POST, false, 201),
            (
                BackendEndpoint::FreelancerSignup,
                "/auth/freelancer/signup/",
                Method::POST,
                false,
                201,
            ),
        ];

        for (endpoint, path, method, auth, status) in expected {
            assert_eq!(endpoint.backend_path(), path);
            assert_eq!(endpoint.method(), method);
            assert_eq!(endpoint.requires_auth(), auth);
            assert_eq!(endpoint.success_status(), status);
        }
    }

    #[test]
    fn base_url_trailing_slash_is_not_doubled() {
        let client = BackendClient::new("http://backend.local/", Duration::from_secs(1));
        assert_eq!(
            client.endpoint_url(BackendEndpoint::Profile),
            "http://backend.local/profile/"
        );
    }

    #[tokio::test]
    async fn authenticated_endpoint_without_header_fails_before_network() {
        // Port 9 is never contacted: the check happens first.
        let client = BackendClient::new("http://127.0.0.1:9", Duration::from_secs(1));
        let result = client.forward(ForwardRequest::new(BackendEndpoint::Logout)).await;
        assert!(matches!(result, Err(ProxyError::MissingAuthorization)));
    }
}
