// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Admin passkey endpoints.
//!
//! Registration requires an admin token; authentication is keyed by email
//! and ends with a regular admin token. The outstanding challenge is kept
//! on the admin record between the `options` and `verify` calls, and a new
//! `options` call replaces it.

use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use webauthn_rs::prelude::{
    CreationChallengeResponse, PublicKeyCredential, RegisterPublicKeyCredential,
    RequestChallengeResponse,
};

use super::admin_auth::AdminTokenResponse;
use super::extract::{extract_json, non_blank};
use crate::auth::passkey::encode_credential_id;
use crate::auth::{AuthenticatedAdmin, CurrentAdmin, PasskeyService};
use crate::error::ApiError;
use crate::state::AppState;
use crate::storage::{AdminRepository, PendingCeremony, StoredAdmin};

const REGISTRATION_FAILED: &str = "Registration verification failed";
const AUTHENTICATION_FAILED: &str = "Authentication verification failed";

// =============================================================================
// Request / Response Types
// =============================================================================

#[derive(Debug, Deserialize, ToSchema)]
pub struct AuthenticationOptionsRequest {
    pub email: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct AuthenticationVerifyRequest {
    pub email: Option<String>,
    /// Assertion produced by `navigator.credentials.get()`
    #[schema(value_type = Option<Object>)]
    pub response: Option<PublicKeyCredential>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct RegistrationVerifiedResponse {
    pub verified: bool,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct PasskeyLoginResponse {
    pub verified: bool,
    #[serde(flatten)]
    pub session: AdminTokenResponse,
}

fn passkeys(state: &AppState) -> Result<&PasskeyService, ApiError> {
    state
        .passkeys
        .as_deref()
        .ok_or_else(|| ApiError::internal("WebAuthn relying party is not configured"))
}

fn load_admin(repo: &AdminRepository<'_>, admin_id: &str) -> Result<StoredAdmin, ApiError> {
    repo.get(admin_id)?
        .ok_or_else(|| ApiError::not_found("Admin not found"))
}

// =============================================================================
// Registration
// =============================================================================

/// Creation options for `navigator.credentials.create()`.
#[utoipa::path(
    post,
    path = "/api/auth/webauthn/register/options",
    tag = "Passkeys",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "PublicKeyCredentialCreationOptions"),
        (status = 401, description = "Missing or invalid admin token")
    )
)]
pub async fn registration_options(
    State(state): State<AppState>,
    CurrentAdmin(principal): CurrentAdmin,
) -> Result<Json<CreationChallengeResponse>, ApiError> {
    let service = passkeys(&state)?;
    let repo = AdminRepository::new(&state.store);
    let admin = load_admin(&repo, &principal.id)?;

    let (options, handle, ceremony) = service
        .start_registration(&admin)
        .map_err(ApiError::internal)?;

    repo.update(&admin.id, |a| {
        a.webauthn.user_handle = Some(handle);
        a.webauthn.pending = Some(PendingCeremony::Registration(ceremony));
    })?;
    tracing::debug!(admin_id = %admin.id, "passkey registration challenge issued");

    Ok(Json(options))
}

/// Verify an attestation and store the new credential.
///
/// Registering an authenticator that is already stored succeeds without
/// adding a duplicate.
#[utoipa::path(
    post,
    path = "/api/auth/webauthn/register/verify",
    request_body(content = Object, description = "Attestation from navigator.credentials.create()"),
    tag = "Passkeys",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, body = RegistrationVerifiedResponse),
        (status = 400, description = "Registration verification failed")
    )
)]
pub async fn verify_registration(
    State(state): State<AppState>,
    CurrentAdmin(principal): CurrentAdmin,
    body: Result<Json<RegisterPublicKeyCredential>, JsonRejection>,
) -> Result<Json<RegistrationVerifiedResponse>, ApiError> {
    let service = passkeys(&state)?;
    let Ok(Json(attestation)) = body else {
        return Err(ApiError::bad_request(REGISTRATION_FAILED));
    };
    let repo = AdminRepository::new(&state.store);
    let admin = load_admin(&repo, &principal.id)?;

    let Some(PendingCeremony::Registration(ceremony)) = &admin.webauthn.pending else {
        tracing::debug!(admin_id = %admin.id, "no registration challenge outstanding");
        return Err(ApiError::bad_request(REGISTRATION_FAILED));
    };

    let credential = service
        .finish_registration(&attestation, ceremony)
        .map_err(|e| {
            tracing::warn!(admin_id = %admin.id, error = %e, "passkey registration rejected");
            ApiError::bad_request(REGISTRATION_FAILED)
        })?;

    let credential_id = credential.credential_id.clone();
    let mut added = false;
    repo.update(&admin.id, |a| added = a.webauthn.add_credential(credential))?;
    if added {
        tracing::info!(admin_id = %admin.id, credential_id = %credential_id, "passkey registered");
    } else {
        tracing::debug!(admin_id = %admin.id, credential_id = %credential_id, "passkey already registered");
    }

    Ok(Json(RegistrationVerifiedResponse { verified: true }))
}

// =============================================================================
// Authentication
// =============================================================================

/// Request options for `navigator.credentials.get()`.
#[utoipa::path(
    post,
    path = "/api/auth/webauthn/authenticate/options",
    request_body = AuthenticationOptionsRequest,
    tag = "Passkeys",
    responses(
        (status = 200, description = "PublicKeyCredentialRequestOptions"),
        (status = 400, description = "Email missing or no passkeys registered"),
        (status = 404, description = "Admin not found")
    )
)]
pub async fn authentication_options(
    State(state): State<AppState>,
    body: Result<Json<AuthenticationOptionsRequest>, JsonRejection>,
) -> Result<Json<RequestChallengeResponse>, ApiError> {
    let service = passkeys(&state)?;
    let request = extract_json(body)?;
    let email = non_blank(request.email).ok_or_else(|| ApiError::bad_request("Email is required"))?;

    let repo = AdminRepository::new(&state.store);
    let admin = repo
        .find_by_email(&email)?
        .ok_or_else(|| ApiError::not_found("Admin not found"))?;
    if admin.webauthn.credentials.is_empty() {
        return Err(ApiError::bad_request("No passkeys registered for this admin"));
    }

    let (options, ceremony) = service
        .start_authentication(&admin)
        .map_err(ApiError::internal)?;
    repo.update(&admin.id, |a| {
        a.webauthn.pending = Some(PendingCeremony::Authentication(ceremony));
    })?;

    Ok(Json(options))
}

/// Verify an assertion and issue an admin token.
#[utoipa::path(
    post,
    path = "/api/auth/webauthn/authenticate/verify",
    request_body = AuthenticationVerifyRequest,
    tag = "Passkeys",
    responses(
        (status = 200, body = PasskeyLoginResponse),
        (status = 400, description = "Unknown credential or verification failed"),
        (status = 404, description = "Admin not found")
    )
)]
pub async fn verify_authentication(
    State(state): State<AppState>,
    body: Result<Json<AuthenticationVerifyRequest>, JsonRejection>,
) -> Result<Json<PasskeyLoginResponse>, ApiError> {
    let service = passkeys(&state)?;
    let request = extract_json(body)?;
    let (Some(email), Some(assertion)) = (non_blank(request.email), request.response) else {
        return Err(ApiError::bad_request("Email and response are required"));
    };

    let repo = AdminRepository::new(&state.store);
    let admin = repo
        .find_by_email(&email)?
        .ok_or_else(|| ApiError::not_found("Admin not found"))?;

    if admin.webauthn.credential(&assertion.id).is_none() {
        return Err(ApiError::bad_request("Unknown credential for this admin"));
    }
    let Some(PendingCeremony::Authentication(ceremony)) = &admin.webauthn.pending else {
        tracing::debug!(admin_id = %admin.id, "no authentication challenge outstanding");
        return Err(ApiError::bad_request(AUTHENTICATION_FAILED));
    };

    let result = service
        .finish_authentication(&assertion, ceremony)
        .map_err(|e| {
            tracing::warn!(admin_id = %admin.id, error = %e, "passkey assertion rejected");
            ApiError::bad_request(AUTHENTICATION_FAILED)
        })?;

    let credential_id = encode_credential_id(result.cred_id());
    let admin = repo.update(&admin.id, |a| {
        a.webauthn.finish_authentication(&credential_id, &result);
    })?;

    let token = state
        .tokens
        .issue_admin_token(&admin)
        .map_err(ApiError::internal)?;
    tracing::info!(admin_id = %admin.id, "admin logged in with passkey");

    Ok(Json(PasskeyLoginResponse {
        verified: true,
        session: AdminTokenResponse {
            token,
            admin: AuthenticatedAdmin::from(&admin),
        },
    }))
}
