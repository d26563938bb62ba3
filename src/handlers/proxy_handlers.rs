use axum::{
    body::{Body, Bytes},
    extract::State,
    http::{header, HeaderMap, HeaderValue, StatusCode},
    response::{IntoResponse, Json, Response},
};
use serde_json::json;

use crate::{
    error::ProxyError,
    services::{BackendEndpoint, ForwardRequest, ForwardedResponse},
    AppState,
};

/// POST /api/login
pub async fn login_handler(State(state): State<AppState>, body: Bytes) -> Response {
    forward(&state, BackendEndpoint::Login, &HeaderMap::new(), Some(body)).await
}

/// POST /api/logout
pub async fn logout_handler(State(state): State<AppState>, headers: HeaderMap) -> Response {
    forward(&state, BackendEndpoint::Logout, &headers, None).await
}

/// GET /api/profile
pub async fn profile_handler(State(state): State<AppState>, headers: HeaderMap) -> Response {
    forward(&state, BackendEndpoint::Profile, &headers, None).await
}

/// POST /api/client-signup
pub async fn client_signup_handler(State(state): State<AppState>, body: Bytes) -> Response {
    forward(
        &state,
        BackendEndpoint::ClientSignup,
        &HeaderMap::new(),
        Some(body),
    )
    .await
}

/// POST /api/freelancer-signup
pub async fn freelancer_signup_handler(State(state): State<AppState>, body: Bytes) -> Response {
    forward(
        &state,
        BackendEndpoint::FreelancerSignup,
        &HeaderMap::new(),
        Some(body),
    )
    .await
}

/// GET /health
pub async fn health_handler() -> impl IntoResponse {
    Json(json!({ "status": "ok" }))
}

async fn forward(
    state: &AppState,
    endpoint: BackendEndpoint,
    headers: &HeaderMap,
    body: Option<Bytes>,
) -> Response {
    match try_forward(state, endpoint, headers, body).await {
        Ok(response) => {
            if response.status == endpoint.success_status() {
                tracing::debug!("{} succeeded", endpoint.name());
            } else if response.is_success() {
                tracing::warn!(
                    "{} succeeded with unexpected status {}",
                    endpoint.name(),
                    response.status
                );
            } else {
                tracing::error!(
                    "backend returned an error for {}: {} {}",
                    endpoint.name(),
                    response.status,
                    String::from_utf8_lossy(&response.body)
                );
            }
            relay(response)
        }
        Err(err) => {
            if matches!(err, ProxyError::MissingAuthorization) {
                tracing::debug!("{} called without authorization", endpoint.name());
            } else {
                tracing::error!("{} route error: {}", endpoint.name(), err);
            }
            err.into_response()
        }
    }
}

async fn try_forward(
    state: &AppState,
    endpoint: BackendEndpoint,
    headers: &HeaderMap,
    body: Option<Bytes>,
) -> Result<ForwardedResponse, ProxyError> {
    let mut request = ForwardRequest::new(endpoint);

    if endpoint.requires_auth() {
        let authorization = extract_authorization(headers)?;
        request = request.authorization(authorization);
    }

    if let Some(body) = body {
        // Reject garbage locally instead of passing it on.
        serde_json::from_slice::<serde_json::Value>(&body)?;
        request = request.json_body(body.to_vec());
    }

    state.backend.forward(request).await
}

fn extract_authorization(headers: &HeaderMap) -> Result<String, ProxyError> {
    let value = headers
        .get(header::AUTHORIZATION)
        .ok_or(ProxyError::MissingAuthorization)?
        .to_str()
        .map_err(|e| ProxyError::InvalidHeader(e.to_string()))?;

    if value.trim().is_empty() {
        return Err(ProxyError::MissingAuthorization);
    }
    Ok(value.to_string())
}

fn relay(response: ForwardedResponse) -> Response {
    let Ok(status) = StatusCode::from_u16(response.status) else {
        return ProxyError::InvalidHeader(format!("status {}", response.status)).into_response();
    };

    let content_type = response
        .content_type
        .as_deref()
        .and_then(|value| HeaderValue::from_str(value).ok())
        .unwrap_or_else(|| HeaderValue::from_static("application/json"));

    (status, [(header::CONTENT_TYPE, content_type)], Body::from(response.body)).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_or_blank_authorization_is_rejected() {
        let headers = HeaderMap::new();
        assert!(matches!(
            extract_authorization(&headers),
            Err(ProxyError::MissingAuthorization)
        ));

        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("  "));
        assert!(matches!(
            extract_authorization(&headers),
            Err(ProxyError::MissingAuthorization)
        ));

        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Bearer abc"));
        assert_eq!(extract_authorization(&headers).unwrap(), "Bearer abc");
    }

    #[test]
    fn relay_keeps_status_and_body() {
        let response = relay(ForwardedResponse {
            status: 400,
            content_type: Some("application/json".to_string()),
            body: br#"{"non_field_errors":["Invalid credentials"]}"#.to_vec(),
        });
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            response.headers().get(header::CONTENT_TYPE).unwrap(),
            "application/json"
        );
    }
}
