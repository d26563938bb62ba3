pub mod catalog;
pub mod client;
pub mod config;
pub mod error;
pub mod flow;
pub mod handlers;
pub mod models;
pub mod services;
pub mod session;
pub mod ui;

use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::trace::TraceLayer;

use crate::config::AppConfig;
use crate::services::BackendClient;

#[derive(Clone)]
pub struct AppState {
    pub backend: BackendClient,
    pub config: Arc<AppConfig>,
}

impl AppState {
    pub fn new(config: AppConfig) -> Self {
        let backend = BackendClient::new(config.base_url.clone(), config.backend_timeout);
        Self {
            backend,
            config: Arc::new(config),
        }
    }
}

/// Same-origin proxy routes in front of the backend
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/api/login", post(handlers::login_handler))
        .route("/api/logout", post(handlers::logout_handler))
        .route("/api/profile", get(handlers::profile_handler))
        .route("/api/client-signup", post(handlers::client_signup_handler))
        .route(
            "/api/freelancer-signup",
            post(handlers::freelancer_signup_handler),
        )
        .route("/health", get(handlers::health_handler))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
