// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Authentication handlers.

use axum::{body::Bytes, extract::State, response::IntoResponse, Json};
use serde::Deserialize;

use crate::error::{ApiError, ApiResult};
use crate::extractors::{BearerToken, ValidatedJson};
use crate::response::{MessageResponse, PermissionsResponse, TokenResponse};
use crate::state::AppState;

// =============================================================================
// Issue
// =============================================================================

/// Token request body.
#[derive(Deserialize)]
pub struct LoginRequest {
    /// Username.
    pub username: String,
    /// Password.
    pub password: String,
}

impl std::fmt::Debug for LoginRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoginRequest")
            .field("username", &self.username)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

/// POST /auth/token
///
/// Exchanges credentials for an access and refresh token pair.
pub async fn login(
    State(state): State<AppState>,
    ValidatedJson(request): ValidatedJson<LoginRequest>,
) -> ApiResult<impl IntoResponse> {
    if request.username.is_empty() || request.password.is_empty() {
        return Err(ApiError::bad_request("Username and password are required"));
    }

    let issued = state
        .tokens()
        .issue(&request.username, &request.password)
        .await?;

    tracing::info!(
        user_id = %issued.claims.sub,
        role = %issued.claims.role,
        "User logged in"
    );

    Ok(Json(TokenResponse::from(issued)))
}

// =============================================================================
// Refresh
// =============================================================================

/// Refresh request body.
#[derive(Debug, Deserialize)]
pub struct RefreshRequest {
    /// Refresh token.
    pub refresh_token: String,
}

/// POST /auth/token/refresh
///
/// Reissues an access token from a refresh token.
pub async fn refresh_token(
    State(state): State<AppState>,
    ValidatedJson(request): ValidatedJson<RefreshRequest>,
) -> ApiResult<impl IntoResponse> {
    let issued = state.tokens().refresh(&request.refresh_token).await?;

    tracing::debug!(user_id = %issued.claims.sub, "Token refreshed");

    Ok(Json(TokenResponse::from(issued)))
}

// =============================================================================
// Current User
// =============================================================================

/// GET /auth/me
pub async fn current_user(
    State(state): State<AppState>,
    BearerToken(token): BearerToken,
) -> ApiResult<impl IntoResponse> {
    let user = state.gateway().current_user(&token).await?;
    Ok(Json(user))
}

/// GET /auth/permissions
///
/// Lists what the caller's role may do.
pub async fn my_permissions(
    State(state): State<AppState>,
    BearerToken(token): BearerToken,
) -> ApiResult<impl IntoResponse> {
    let context = state.gateway().authenticate(&token).await?;
    let permissions = state
        .gateway()
        .permissions_for(context.role)
        .iter()
        .map(|p| p.to_string())
        .collect();

    Ok(Json(PermissionsResponse {
        role: context.role.to_string(),
        permissions,
    }))
}

// =============================================================================
// Change Password
// =============================================================================

/// Change password request body.
#[derive(Deserialize)]
pub struct ChangePasswordRequest {
    /// Current password.
    pub current_password: String,
    /// New password.
    pub new_password: String,
}

impl std::fmt::Debug for ChangePasswordRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("ChangePasswordRequest { .. }")
    }
}

/// POST /auth/me/change-password
///
/// The body is decoded after the token is accepted.
pub async fn change_password(
    State(state): State<AppState>,
    BearerToken(token): BearerToken,
    body: Bytes,
) -> ApiResult<impl IntoResponse> {
    let gateway = state.gateway();
    let context = gateway.authenticate(&token).await?;
    let request: ChangePasswordRequest = serde_json::from_slice(&body)
        .map_err(|e| ApiError::bad_request(format!("Invalid JSON: {}", e)))?;

    gateway
        .change_password_for(&context, &request.current_password, &request.new_password)
        .await?;

    Ok(Json(MessageResponse::ok("Password changed successfully")))
}

// =============================================================================
// Tests
// =============================================================================
