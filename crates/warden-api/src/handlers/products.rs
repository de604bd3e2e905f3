// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Product handlers.
//!
//! Every handler forwards to the gateway, which authenticates, authorizes
//! and validates before touching the store. Bodies are passed through
//! undecoded so a malformed body never hides a 401 or 403.

use axum::body::Bytes;
use axum::extract::{Path, State};
use serde_json::{json, Value};
use warden_core::{Operation, ResourceType};

use crate::error::ApiResult;
use crate::extractors::BearerToken;
use crate::gateway::Outcome;
use crate::state::AppState;

/// GET /products
pub async fn list_products(
    State(state): State<AppState>,
    BearerToken(token): BearerToken,
) -> ApiResult<Outcome> {
    let outcome = state
        .gateway()
        .handle(&token, ResourceType::Product, Operation::List, &Value::Null)
        .await?;
    Ok(outcome)
}

/// POST /products
pub async fn create_product(
    State(state): State<AppState>,
    BearerToken(token): BearerToken,
    body: Bytes,
) -> ApiResult<Outcome> {
    let outcome = state
        .gateway()
        .handle_body(&token, ResourceType::Product, Operation::Create, None, &body)
        .await?;
    Ok(outcome)
}

/// GET /products/{id}
pub async fn get_product(
    State(state): State<AppState>,
    BearerToken(token): BearerToken,
    Path(id): Path<String>,
) -> ApiResult<Outcome> {
    let outcome = state
        .gateway()
        .handle(&token, ResourceType::Product, Operation::Read, &json!({ "id": id }))
        .await?;
    Ok(outcome)
}

/// PUT /products/{id}
pub async fn update_product(
    State(state): State<AppState>,
    BearerToken(token): BearerToken,
    Path(id): Path<String>,
    body: Bytes,
) -> ApiResult<Outcome> {
    let outcome = state
        .gateway()
        .handle_body(&token, ResourceType::Product, Operation::Update, Some(&id), &body)
        .await?;
    Ok(outcome)
}

/// DELETE /products/{id}
pub async fn delete_product(
    State(state): State<AppState>,
    BearerToken(token): BearerToken,
    Path(id): Path<String>,
) -> ApiResult<Outcome> {
    let outcome = state
        .gateway()
        .handle(&token, ResourceType::Product, Operation::Delete, &json!({ "id": id }))
        .await?;
    Ok(outcome)
}
