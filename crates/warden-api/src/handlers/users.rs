// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! User management handlers.

use axum::body::Bytes;
use axum::extract::{Path, State};
use serde_json::{json, Value};
use warden_core::{Operation, ResourceType};

use crate::error::ApiResult;
use crate::extractors::BearerToken;
use crate::gateway::Outcome;
use crate::state::AppState;

/// GET /users
pub async fn list_users(
    State(state): State<AppState>,
    BearerToken(token): BearerToken,
) -> ApiResult<Outcome> {
    Ok(state
        .gateway()
        .handle(&token, ResourceType::User, Operation::List, &Value::Null)
        .await?)
}

/// POST /users
pub async fn create_user(
    State(state): State<AppState>,
    BearerToken(token): BearerToken,
    body: Bytes,
) -> ApiResult<Outcome> {
    Ok(state
        .gateway()
        .handle_body(&token, ResourceType::User, Operation::Create, None, &body)
        .await?)
}

/// PUT /users/{id}
pub async fn update_user(
    State(state): State<AppState>,
    BearerToken(token): BearerToken,
    Path(id): Path<String>,
    body: Bytes,
) -> ApiResult<Outcome> {
    Ok(state
        .gateway()
        .handle_body(&token, ResourceType::User, Operation::Update, Some(&id), &body)
        .await?)
}

/// DELETE /users/{id}
pub async fn delete_user(
    State(state): State<AppState>,
    BearerToken(token): BearerToken,
    Path(id): Path<String>,
) -> ApiResult<Outcome> {
    Ok(state
        .gateway()
        .handle(&token, ResourceType::User, Operation::Delete, &json!({ "id": id }))
        .await?)
}
