// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Company and campaign endpoints for verified users.
//!
//! Every route here is scoped to companies the caller owns.

use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use super::campaigns::CampaignPayload;
use super::companies::CompanyPayload;
use super::extract::extract_json;
use crate::auth::{AuthenticatedUser, CurrentUser};
use crate::error::ApiError;
use crate::models::{parse_id, ApprovalStatus};
use crate::state::AppState;
use crate::storage::{
    CampaignRepository, CompanyRepository, OwnershipCheck, StoredCampaign, StoredCompany,
};
use crate::workflow::ApprovalWorkflow;

// =============================================================================
// Request / Response Types
// =============================================================================

#[derive(Debug, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
pub struct MyCompaniesQuery {
    /// `pending`, `approved` or `denied`; other values are ignored
    pub approval_status: Option<String>,
}

/// KYC provider outcome reported by the company owner.
#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct KycUpdateRequest {
    pub status: Option<String>,
    /// Required when `status` is `denied`
    pub denial_reason: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct KycUpdateResponse {
    pub message: String,
    pub company: StoredCompany,
}

/// Load a company the caller owns: 400 bad id, 404 unknown, 403 not theirs.
fn owned_company(state: &AppState, user: &AuthenticatedUser, raw_id: &str) -> Result<StoredCompany, ApiError> {
    let id = parse_id(raw_id, "company")?;
    Ok(CompanyRepository::new(&state.store)
        .require(&id)
        .verify_owner(user)?)
}

// =============================================================================
// Companies
// =============================================================================

#[utoipa::path(
    get,
    path = "/api/user/companies",
    params(MyCompaniesQuery),
    tag = "User Companies",
    security(("bearer_auth" = [])),
    responses((status = 200, body = [StoredCompany]))
)]
pub async fn list_my_companies(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Query(query): Query<MyCompaniesQuery>,
) -> Result<Json<Vec<StoredCompany>>, ApiError> {
    let status = query.approval_status.as_deref().and_then(ApprovalStatus::parse);
    Ok(Json(
        CompanyRepository::new(&state.store).list_for_owner(&user.id, status)?,
    ))
}

#[utoipa::path(
    post,
    path = "/api/user/companies",
    request_body = CompanyPayload,
    tag = "User Companies",
    security(("bearer_auth" = [])),
    responses(
        (status = 201, body = StoredCompany),
        (status = 400, description = "Missing required fields")
    )
)]
pub async fn create_my_company(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    body: Result<Json<CompanyPayload>, JsonRejection>,
) -> Result<(StatusCode, Json<StoredCompany>), ApiError> {
    let company = extract_json(body)?.into_new_company()?;
    let company = CompanyRepository::new(&state.store).create(company, Some(user.id.clone()))?;
    tracing::info!(company_id = %company.id, user_id = %user.id, "company registered");
    Ok((StatusCode::CREATED, Json(company)))
}

#[utoipa::path(
    get,
    path = "/api/user/companies/{id}",
    params(("id" = String, Path, description = "Company id")),
    tag = "User Companies",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, body = StoredCompany),
        (status = 403, description = "Forbidden: not your company"),
        (status = 404, description = "Company not found")
    )
)]
pub async fn get_my_company(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<String>,
) -> Result<Json<StoredCompany>, ApiError> {
    Ok(Json(owned_company(&state, &user, &id)?))
}

/// Record the KYC provider's verdict for an owned company.
///
/// Self-approval can be switched off with `ALLOW_USER_KYC_APPROVAL=false`.
#[utoipa::path(
    patch,
    path = "/api/user/companies/{id}/kyc",
    params(("id" = String, Path, description = "Company id")),
    request_body = KycUpdateRequest,
    tag = "User Companies",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, body = KycUpdateResponse),
        (status = 400, description = "Invalid status or missing denialReason"),
        (status = 403, description = "Not your company, or self-approval disabled"),
        (status = 404, description = "Company not found")
    )
)]
pub async fn update_kyc(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<String>,
    body: Result<Json<KycUpdateRequest>, JsonRejection>,
) -> Result<Json<KycUpdateResponse>, ApiError> {
    let request = extract_json(body)?;
    let status = request
        .status
        .as_deref()
        .and_then(ApprovalStatus::parse)
        .ok_or_else(|| {
            ApiError::bad_request("status must be one of 'pending', 'approved', 'denied'")
        })?;
    let id = parse_id(&id, "company")?;

    let company = ApprovalWorkflow::new(&state.store).report_kyc_result(
        &user,
        &id,
        status,
        request.denial_reason.as_deref(),
        state.config.allow_user_kyc_approval,
    )?;

    Ok(Json(KycUpdateResponse {
        message: "KYC status updated".to_string(),
        company,
    }))
}

// =============================================================================
// Campaigns
// =============================================================================

/// Submit a campaign for review.
///
/// The company must exist (404), belong to the caller (403) and have passed
/// KYC (403); the terms are validated only after those checks.
#[utoipa::path(
    post,
    path = "/api/user/companies/{id}/campaigns",
    params(("id" = String, Path, description = "Company id")),
    request_body = CampaignPayload,
    tag = "User Companies",
    security(("bearer_auth" = [])),
    responses(
        (status = 201, body = StoredCampaign),
        (status = 400, description = "Missing or invalid terms"),
        (status = 403, description = "Not your company, or KYC not approved"),
        (status = 404, description = "Company not found")
    )
)]
pub async fn create_campaign(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<String>,
    body: Result<Json<CampaignPayload>, JsonRejection>,
) -> Result<(StatusCode, Json<StoredCampaign>), ApiError> {
    let id = parse_id(&id, "company")?;
    let workflow = ApprovalWorkflow::new(&state.store);
    let company = workflow.authorize_submission(&user, &id)?;

    let terms = extract_json(body)?.into_terms()?;
    let campaign = workflow.submit_campaign(&user, &company, terms)?;
    Ok((StatusCode::CREATED, Json(campaign)))
}

#[utoipa::path(
    get,
    path = "/api/user/companies/{id}/campaigns",
    params(("id" = String, Path, description = "Company id")),
    tag = "User Companies",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, body = [StoredCampaign]),
        (status = 403, description = "Forbidden: not your company"),
        (status = 404, description = "Company not found")
    )
)]
pub async fn list_campaigns(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<String>,
) -> Result<Json<Vec<StoredCampaign>>, ApiError> {
    let company = owned_company(&state, &user, &id)?;
    Ok(Json(
        CampaignRepository::new(&state.store).list_for_company(&company.id, None)?,
    ))
}

#[utoipa::path(
    get,
    path = "/api/user/companies/{id}/campaigns/{campaign_id}",
    params(
        ("id" = String, Path, description = "Company id"),
        ("campaign_id" = String, Path, description = "Campaign id")
    ),
    tag = "User Companies",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, body = StoredCampaign),
        (status = 403, description = "Forbidden: not your company"),
        (status = 404, description = "Company or campaign not found")
    )
)]
pub async fn get_campaign(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path((id, campaign_id)): Path<(String, String)>,
) -> Result<Json<StoredCampaign>, ApiError> {
    let company = owned_company(&state, &user, &id)?;
    let campaign_id = parse_id(&campaign_id, "campaign")?;

    CampaignRepository::new(&state.store)
        .get(&campaign_id)?
        .filter(|c| c.company == company.id)
        .map(Json)
        .ok_or_else(|| ApiError::not_found("Campaign not found"))
}
