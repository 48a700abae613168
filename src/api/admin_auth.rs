// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Admin password login.

use axum::{extract::rejection::JsonRejection, extract::State, Json};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::extract::{extract_json, non_blank};
use crate::auth::credentials::{equalize_failed_lookup, verify_password};
use crate::auth::AuthenticatedAdmin;
use crate::error::ApiError;
use crate::state::AppState;
use crate::storage::AdminRepository;

#[derive(Debug, Deserialize, ToSchema)]
pub struct AdminLoginRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}

/// Issued admin token, shared by password and passkey login.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct AdminTokenResponse {
    pub token: String,
    pub admin: AuthenticatedAdmin,
}

#[utoipa::path(
    post,
    path = "/api/auth/login",
    request_body = AdminLoginRequest,
    tag = "Admin Auth",
    responses(
        (status = 200, body = AdminTokenResponse),
        (status = 400, description = "Email or password missing"),
        (status = 401, description = "Invalid credentials")
    )
)]
pub async fn login(
    State(state): State<AppState>,
    body: Result<Json<AdminLoginRequest>, JsonRejection>,
) -> Result<Json<AdminTokenResponse>, ApiError> {
    let request = extract_json(body)?;
    let (Some(email), Some(password)) = (non_blank(request.email), request.password.filter(|p| !p.is_empty()))
    else {
        return Err(ApiError::bad_request("Email and password are required"));
    };

    let Some(admin) = AdminRepository::new(&state.store).find_by_email(&email)? else {
        equalize_failed_lookup(&password).await;
        return Err(ApiError::invalid_credentials());
    };

    let matches = verify_password(&password, &admin.password_hash)
        .await
        .map_err(ApiError::internal)?;
    if !matches {
        tracing::info!(admin_id = %admin.id, "admin login rejected");
        return Err(ApiError::invalid_credentials());
    }

    let token = state
        .tokens
        .issue_admin_token(&admin)
        .map_err(ApiError::internal)?;
    tracing::info!(admin_id = %admin.id, "admin logged in");

    Ok(Json(AdminTokenResponse {
        token,
        admin: AuthenticatedAdmin::from(&admin),
    }))
}
