// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! API server implementation.

use std::net::SocketAddr;
use std::time::Duration;

use axum::{
    extract::DefaultBodyLimit,
    http::{header, HeaderName, HeaderValue, Method, StatusCode},
    routing::{get, post, put},
    Router,
};
use tower::ServiceBuilder;
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};
use tracing::{info, warn};

use crate::config::{CorsConfig, ServerConfig};
use crate::error::{ApiError, ApiResult};
use crate::handlers;
use crate::state::AppState;

// =============================================================================
// Router
// =============================================================================

/// Creates the router with all routes and middleware.
pub fn create_router(state: AppState) -> Router {
    let server = &state.config.server;

    let middleware_stack = ServiceBuilder::new()
        .layer(TraceLayer::new_for_http())
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            server.request_timeout,
        ))
        .layer(create_cors_layer(&server.cors))
        .layer(DefaultBodyLimit::max(server.max_body_size));

    Router::new()
        // Health (public)
        .route("/health", get(handlers::health))
        // Token issuance
        .route("/auth/token", post(handlers::login))
        .route("/auth/token/refresh", post(handlers::refresh_token))
        // Account
        .route("/auth/me", get(handlers::current_user))
        .route("/auth/me/change-password", post(handlers::change_password))
        .route("/auth/permissions", get(handlers::my_permissions))
        // Products
        .route(
            "/products",
            get(handlers::list_products).post(handlers::create_product),
        )
        .route(
            "/products/{id}",
            get(handlers::get_product)
                .put(handlers::update_product)
                .delete(handlers::delete_product),
        )
        // Users
        .route(
            "/users",
            get(handlers::list_users).post(handlers::create_user),
        )
        .route(
            "/users/{id}",
            put(handlers::update_user).delete(handlers::delete_user),
        )
        .layer(middleware_stack)
        .with_state(state)
}

// =============================================================================
// ApiServer
// =============================================================================

/// The API server.
pub struct ApiServer {
    state: AppState,
}

impl ApiServer {
    /// Creates a new API server with the given state.
    pub fn new(state: AppState) -> Self {
        Self { state }
    }

    /// Returns the router for this server.
    pub fn router(&self) -> Router {
        create_router(self.state.clone())
    }

    /// Returns the server address.
    pub fn addr(&self) -> SocketAddr {
        self.server_config().socket_addr()
    }

    fn server_config(&self) -> &ServerConfig {
        &self.state.config.server
    }

    /// Runs the server until the process is killed.
    pub async fn run(self) -> ApiResult<()> {
        self.run_with_shutdown(std::future::pending()).await
    }

    /// Runs the server with graceful shutdown.
    pub async fn run_with_shutdown(
        self,
        shutdown_signal: impl std::future::Future<Output = ()> + Send + 'static,
    ) -> ApiResult<()> {
        let addr = self.addr();
        let router = self.router();

        let listener = tokio::net::TcpListener::bind(addr)
            .await
            .map_err(|e| ApiError::internal(format!("Failed to bind {}: {}", addr, e)))?;

        info!(%addr, "Starting API server");

        axum::serve(listener, router)
            .with_graceful_shutdown(shutdown_signal)
            .await
            .map_err(|e| ApiError::internal(format!("Server error: {}", e)))?;

        info!("API server shutdown complete");
        Ok(())
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Creates the CORS layer from configuration.
fn create_cors_layer(cors: &CorsConfig) -> CorsLayer {
    let mut layer = CorsLayer::new().max_age(Duration::from_secs(cors.max_age));

    if cors.allowed_origins.iter().any(|o| o == "*") {
        layer = layer.allow_origin(Any);
    } else {
        let origins: Vec<HeaderValue> = cors
            .allowed_origins
            .iter()
            .filter_map(|o| match o.parse() {
                Ok(value) => Some(value),
                Err(_) => {
                    warn!(origin = %o, "Ignoring invalid CORS origin");
                    None
                }
            })
            .collect();
        layer = layer.allow_origin(AllowOrigin::list(origins));
    }

    let methods: Vec<Method> = cors
        .allowed_methods
        .iter()
        .filter_map(|m| m.parse().ok())
        .collect();
    layer = layer.allow_methods(methods);

    if cors.allowed_headers.iter().any(|h| h == "*") {
        layer = layer.allow_headers(Any);
    } else {
        let mut headers: Vec<HeaderName> = cors
            .allowed_headers
            .iter()
            .filter_map(|h| h.parse().ok())
            .collect();
        if headers.is_empty() {
            headers = vec![header::AUTHORIZATION, header::CONTENT_TYPE];
        }
        layer = layer.allow_headers(headers);
    }

    layer
}

// =============================================================================
// Tests
// =============================================================================
