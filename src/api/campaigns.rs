// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Admin campaign management and review.

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    Json,
};
use chrono::{DateTime, NaiveDate, Utc};
use serde::Deserialize;
use serde_json::Value;
use utoipa::ToSchema;

use super::companies::DenialRequest;
use super::extract::{extract_json, non_blank};
use crate::auth::CurrentAdmin;
use crate::error::ApiError;
use crate::models::{parse_id, ApprovalStatus};
use crate::state::AppState;
use crate::storage::{CampaignRepository, CompanyRepository, NewCampaign, StoredCampaign};
use crate::workflow::ApprovalWorkflow;

// =============================================================================
// Campaign Payload
// =============================================================================

/// Campaign terms as submitted by admins and company owners.
///
/// Older clients send the terms with a leading underscore (`_hardCap`);
/// both spellings are accepted. Numbers may be JSON numbers or numeric
/// strings; dates may be RFC 3339 timestamps, `YYYY-MM-DD` dates or epoch
/// milliseconds.
#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CampaignPayload {
    /// Target company; only read by the admin endpoint
    pub company_id: Option<String>,
    /// Defaults to the company's name when omitted
    #[serde(alias = "_companyName")]
    pub company_name: Option<String>,
    #[serde(alias = "_description")]
    pub description: Option<String>,
    /// Months
    #[serde(alias = "_duration")]
    #[schema(value_type = Option<f64>)]
    pub duration: Option<Value>,
    #[serde(alias = "_hardCap")]
    #[schema(value_type = Option<f64>)]
    pub hard_cap: Option<Value>,
    #[serde(alias = "_interestRate")]
    #[schema(value_type = Option<f64>)]
    pub interest_rate: Option<Value>,
    #[serde(alias = "_maxInvestment")]
    #[schema(value_type = Option<f64>)]
    pub max_investment: Option<Value>,
    #[serde(alias = "_minInvestment")]
    #[schema(value_type = Option<f64>)]
    pub min_investment: Option<Value>,
    #[serde(alias = "_payoutFrequency")]
    pub payout_frequency: Option<String>,
    #[serde(alias = "_softCap")]
    #[schema(value_type = Option<f64>)]
    pub soft_cap: Option<Value>,
    #[schema(value_type = Option<String>, format = DateTime)]
    pub campaign_start_time: Option<Value>,
    #[schema(value_type = Option<String>, format = DateTime)]
    pub campaign_end_time: Option<Value>,
    #[schema(value_type = Option<String>, format = DateTime)]
    pub maturity_date: Option<Value>,
}

fn missing_fields() -> ApiError {
    ApiError::bad_request("Missing required fields")
}

fn invalid(field: &str) -> ApiError {
    ApiError::bad_request(format!("Invalid value for {field}"))
}

/// `None` for absent, `null` and empty-string values.
fn present(value: Option<Value>) -> Option<Value> {
    value.filter(|v| match v {
        Value::Null => false,
        Value::String(s) => !s.trim().is_empty(),
        _ => true,
    })
}

fn number(field: &str, value: Option<Value>) -> Result<f64, ApiError> {
    let parsed = match present(value).ok_or_else(missing_fields)? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    parsed.filter(|n| n.is_finite()).ok_or_else(|| invalid(field))
}

fn timestamp(field: &str, value: Option<Value>) -> Result<DateTime<Utc>, ApiError> {
    let parsed = match present(value).ok_or_else(missing_fields)? {
        Value::String(s) => {
            let s = s.trim();
            DateTime::parse_from_rfc3339(s)
                .map(|dt| dt.with_timezone(&Utc))
                .ok()
                .or_else(|| {
                    NaiveDate::parse_from_str(s, "%Y-%m-%d")
                        .ok()
                        .and_then(|d| d.and_hms_opt(0, 0, 0))
                        .map(|dt| dt.and_utc())
                })
        }
        Value::Number(n) => n.as_i64().and_then(DateTime::from_timestamp_millis),
        _ => None,
    };
    parsed.ok_or_else(|| invalid(field))
}

impl CampaignPayload {
    /// Validate the terms. A blank company name is left empty and filled in
    /// from the company when the campaign is created.
    pub fn into_terms(self) -> Result<NewCampaign, ApiError> {
        Ok(NewCampaign {
            company_name: non_blank(self.company_name).unwrap_or_default(),
            description: non_blank(self.description).ok_or_else(missing_fields)?,
            duration: number("duration", self.duration)?,
            hard_cap: number("hardCap", self.hard_cap)?,
            interest_rate: number("interestRate", self.interest_rate)?,
            max_investment: number("maxInvestment", self.max_investment)?,
            min_investment: number("minInvestment", self.min_investment)?,
            payout_frequency: non_blank(self.payout_frequency).ok_or_else(missing_fields)?,
            soft_cap: number("softCap", self.soft_cap)?,
            campaign_start_time: timestamp("campaignStartTime", self.campaign_start_time)?,
            campaign_end_time: timestamp("campaignEndTime", self.campaign_end_time)?,
            maturity_date: timestamp("maturityDate", self.maturity_date)?,
        })
    }
}

// =============================================================================
// Handlers
// =============================================================================

#[utoipa::path(
    get,
    path = "/api/campaigns",
    tag = "Campaigns",
    security(("bearer_auth" = [])),
    responses((status = 200, body = [StoredCampaign]))
)]
pub async fn list_campaigns(State(state): State<AppState>) -> Result<Json<Vec<StoredCampaign>>, ApiError> {
    Ok(Json(CampaignRepository::new(&state.store).list()?))
}

/// Create a campaign for any company. No ownership or KYC gate applies and
/// nobody is notified.
#[utoipa::path(
    post,
    path = "/api/campaigns",
    request_body = CampaignPayload,
    tag = "Campaigns",
    security(("bearer_auth" = [])),
    responses(
        (status = 201, body = StoredCampaign),
        (status = 400, description = "companyId missing or invalid terms"),
        (status = 404, description = "Company not found")
    )
)]
pub async fn create_campaign(
    State(state): State<AppState>,
    CurrentAdmin(admin): CurrentAdmin,
    body: Result<Json<CampaignPayload>, JsonRejection>,
) -> Result<(StatusCode, Json<StoredCampaign>), ApiError> {
    let mut payload = extract_json(body)?;
    let company_id = non_blank(payload.company_id.take())
        .ok_or_else(|| ApiError::bad_request("companyId is required"))?;
    let company_id = parse_id(&company_id, "company")?;
    CompanyRepository::new(&state.store).require(&company_id)?;

    let terms = payload.into_terms()?;
    let campaign = ApprovalWorkflow::new(&state.store).create_campaign_as_admin(&company_id, terms)?;
    tracing::debug!(admin_id = %admin.id, campaign_id = %campaign.id, "admin created campaign");
    Ok((StatusCode::CREATED, Json(campaign)))
}

fn list_for_company(
    state: &AppState,
    company_id: &str,
    status: Option<ApprovalStatus>,
) -> Result<Json<Vec<StoredCampaign>>, ApiError> {
    let company_id = parse_id(company_id, "company")?;
    Ok(Json(
        CampaignRepository::new(&state.store).list_for_company(&company_id, status)?,
    ))
}

#[utoipa::path(
    get,
    path = "/api/campaigns/company/{company_id}",
    params(("company_id" = String, Path, description = "Company id")),
    tag = "Campaigns",
    security(("bearer_auth" = [])),
    responses((status = 200, body = [StoredCampaign]))
)]
pub async fn list_company_campaigns(
    State(state): State<AppState>,
    Path(company_id): Path<String>,
) -> Result<Json<Vec<StoredCampaign>>, ApiError> {
    list_for_company(&state, &company_id, None)
}

#[utoipa::path(
    get,
    path = "/api/campaigns/company/{company_id}/pending",
    params(("company_id" = String, Path, description = "Company id")),
    tag = "Campaigns",
    security(("bearer_auth" = [])),
    responses((status = 200, body = [StoredCampaign]))
)]
pub async fn list_company_pending(
    State(state): State<AppState>,
    Path(company_id): Path<String>,
) -> Result<Json<Vec<StoredCampaign>>, ApiError> {
    list_for_company(&state, &company_id, Some(ApprovalStatus::Pending))
}

#[utoipa::path(
    get,
    path = "/api/campaigns/company/{company_id}/approved",
    params(("company_id" = String, Path, description = "Company id")),
    tag = "Campaigns",
    security(("bearer_auth" = [])),
    responses((status = 200, body = [StoredCampaign]))
)]
pub async fn list_company_approved(
    State(state): State<AppState>,
    Path(company_id): Path<String>,
) -> Result<Json<Vec<StoredCampaign>>, ApiError> {
    list_for_company(&state, &company_id, Some(ApprovalStatus::Approved))
}

#[utoipa::path(
    get,
    path = "/api/campaigns/company/{company_id}/denied",
    params(("company_id" = String, Path, description = "Company id")),
    tag = "Campaigns",
    security(("bearer_auth" = [])),
    responses((status = 200, body = [StoredCampaign]))
)]
pub async fn list_company_denied(
    State(state): State<AppState>,
    Path(company_id): Path<String>,
) -> Result<Json<Vec<StoredCampaign>>, ApiError> {
    list_for_company(&state, &company_id, Some(ApprovalStatus::Denied))
}

#[utoipa::path(
    get,
    path = "/api/campaigns/{id}",
    params(("id" = String, Path, description = "Campaign id")),
    tag = "Campaigns",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, body = StoredCampaign),
        (status = 400, description = "Invalid campaign id"),
        (status = 404, description = "Campaign not found")
    )
)]
pub async fn get_campaign(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<StoredCampaign>, ApiError> {
    let id = parse_id(&id, "campaign")?;
    CampaignRepository::new(&state.store)
        .get(&id)?
        .map(Json)
        .ok_or_else(|| ApiError::not_found("Campaign not found"))
}

/// Approve and notify the company owner (if the company has one).
#[utoipa::path(
    post,
    path = "/api/campaigns/{id}/approve",
    params(("id" = String, Path, description = "Campaign id")),
    tag = "Campaigns",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, body = StoredCampaign),
        (status = 404, description = "Campaign not found")
    )
)]
pub async fn approve_campaign(
    State(state): State<AppState>,
    CurrentAdmin(admin): CurrentAdmin,
    Path(id): Path<String>,
) -> Result<Json<StoredCampaign>, ApiError> {
    let id = parse_id(&id, "campaign")?;
    tracing::debug!(admin_id = %admin.id, campaign_id = %id, "approving campaign");
    Ok(Json(ApprovalWorkflow::new(&state.store).approve_campaign(&id)?))
}

/// Deny with a reason; the reason is also the owner's notification text.
#[utoipa::path(
    post,
    path = "/api/campaigns/{id}/deny",
    params(("id" = String, Path, description = "Campaign id")),
    request_body = DenialRequest,
    tag = "Campaigns",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, body = StoredCampaign),
        (status = 400, description = "Denial message is required"),
        (status = 404, description = "Campaign not found")
    )
)]
pub async fn deny_campaign(
    State(state): State<AppState>,
    CurrentAdmin(admin): CurrentAdmin,
    Path(id): Path<String>,
    body: Result<Json<DenialRequest>, JsonRejection>,
) -> Result<Json<StoredCampaign>, ApiError> {
    let id = parse_id(&id, "campaign")?;
    let request = extract_json(body)?;
    tracing::debug!(admin_id = %admin.id, campaign_id = %id, "denying campaign");
    let campaign = ApprovalWorkflow::new(&state.store).deny_campaign(&id, request.message.as_deref())?;
    Ok(Json(campaign))
}
