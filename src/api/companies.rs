// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Admin company management and KYC review.

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use utoipa::ToSchema;

use super::extract::{extract_json, non_blank};
use crate::auth::CurrentAdmin;
use crate::error::ApiError;
use crate::models::{parse_id, ApprovalStatus};
use crate::state::AppState;
use crate::storage::{CompanyRepository, NewCompany, StoredCompany};
use crate::workflow::ApprovalWorkflow;

// =============================================================================
// Request Types
// =============================================================================

/// Company fields as submitted by admins and users.
#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CompanyPayload {
    pub company_name: Option<String>,
    pub registration_number: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub website: Option<String>,
    pub industry: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub country: Option<String>,
}

impl CompanyPayload {
    /// Everything except `registrationNumber` and `website` is required.
    pub fn into_new_company(self) -> Result<NewCompany, ApiError> {
        let (
            Some(company_name),
            Some(email),
            Some(phone),
            Some(industry),
            Some(address),
            Some(city),
            Some(country),
        ) = (
            non_blank(self.company_name),
            non_blank(self.email),
            non_blank(self.phone),
            non_blank(self.industry),
            non_blank(self.address),
            non_blank(self.city),
            non_blank(self.country),
        )
        else {
            return Err(ApiError::bad_request("Missing required fields"));
        };

        Ok(NewCompany {
            company_name,
            registration_number: self.registration_number,
            email,
            phone,
            website: self.website,
            industry,
            address,
            city,
            country,
        })
    }
}

/// Body of the admin deny endpoints (companies and campaigns).
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct DenialRequest {
    /// Reason shown to the owner; required
    pub message: Option<String>,
}

// =============================================================================
// Handlers
// =============================================================================

#[utoipa::path(
    post,
    path = "/api/companies",
    request_body = CompanyPayload,
    tag = "Companies",
    security(("bearer_auth" = [])),
    responses(
        (status = 201, body = StoredCompany),
        (status = 400, description = "Missing required fields")
    )
)]
pub async fn create_company(
    State(state): State<AppState>,
    CurrentAdmin(admin): CurrentAdmin,
    body: Result<Json<CompanyPayload>, JsonRejection>,
) -> Result<(StatusCode, Json<StoredCompany>), ApiError> {
    let company = extract_json(body)?.into_new_company()?;
    let company = CompanyRepository::new(&state.store).create(company, None)?;
    tracing::info!(company_id = %company.id, admin_id = %admin.id, "company created by admin");
    Ok((StatusCode::CREATED, Json(company)))
}

#[utoipa::path(
    get,
    path = "/api/companies",
    tag = "Companies",
    security(("bearer_auth" = [])),
    responses((status = 200, body = [StoredCompany]))
)]
pub async fn list_companies(State(state): State<AppState>) -> Result<Json<Vec<StoredCompany>>, ApiError> {
    Ok(Json(CompanyRepository::new(&state.store).list(None)?))
}

fn list_by_status(state: &AppState, status: ApprovalStatus) -> Result<Json<Vec<StoredCompany>>, ApiError> {
    Ok(Json(CompanyRepository::new(&state.store).list(Some(status))?))
}

#[utoipa::path(
    get,
    path = "/api/companies/pending",
    tag = "Companies",
    security(("bearer_auth" = [])),
    responses((status = 200, body = [StoredCompany]))
)]
pub async fn list_pending(State(state): State<AppState>) -> Result<Json<Vec<StoredCompany>>, ApiError> {
    list_by_status(&state, ApprovalStatus::Pending)
}

#[utoipa::path(
    get,
    path = "/api/companies/approved",
    tag = "Companies",
    security(("bearer_auth" = [])),
    responses((status = 200, body = [StoredCompany]))
)]
pub async fn list_approved(State(state): State<AppState>) -> Result<Json<Vec<StoredCompany>>, ApiError> {
    list_by_status(&state, ApprovalStatus::Approved)
}

#[utoipa::path(
    get,
    path = "/api/companies/denied",
    tag = "Companies",
    security(("bearer_auth" = [])),
    responses((status = 200, body = [StoredCompany]))
)]
pub async fn list_denied(State(state): State<AppState>) -> Result<Json<Vec<StoredCompany>>, ApiError> {
    list_by_status(&state, ApprovalStatus::Denied)
}

#[utoipa::path(
    get,
    path = "/api/companies/{id}",
    params(("id" = String, Path, description = "Company id")),
    tag = "Companies",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, body = StoredCompany),
        (status = 400, description = "Invalid company id"),
        (status = 404, description = "Company not found")
    )
)]
pub async fn get_company(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<StoredCompany>, ApiError> {
    let id = parse_id(&id, "company")?;
    Ok(Json(CompanyRepository::new(&state.store).require(&id)?))
}

#[utoipa::path(
    post,
    path = "/api/companies/{id}/approve",
    params(("id" = String, Path, description = "Company id")),
    tag = "Companies",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, body = StoredCompany),
        (status = 404, description = "Company not found")
    )
)]
pub async fn approve_company(
    State(state): State<AppState>,
    CurrentAdmin(admin): CurrentAdmin,
    Path(id): Path<String>,
) -> Result<Json<StoredCompany>, ApiError> {
    let id = parse_id(&id, "company")?;
    tracing::debug!(admin_id = %admin.id, company_id = %id, "approving company");
    Ok(Json(ApprovalWorkflow::new(&state.store).approve_company(&id)?))
}

#[utoipa::path(
    post,
    path = "/api/companies/{id}/deny",
    params(("id" = String, Path, description = "Company id")),
    request_body = DenialRequest,
    tag = "Companies",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, body = StoredCompany),
        (status = 400, description = "Denial message is required"),
        (status = 404, description = "Company not found")
    )
)]
pub async fn deny_company(
    State(state): State<AppState>,
    CurrentAdmin(admin): CurrentAdmin,
    Path(id): Path<String>,
    body: Result<Json<DenialRequest>, JsonRejection>,
) -> Result<Json<StoredCompany>, ApiError> {
    let id = parse_id(&id, "company")?;
    let request = extract_json(body)?;
    tracing::debug!(admin_id = %admin.id, company_id = %id, "denying company");
    let company = ApprovalWorkflow::new(&state.store).deny_company(&id, request.message.as_deref())?;
    Ok(Json(company))
}
