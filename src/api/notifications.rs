// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::auth::CurrentUser;
use crate::error::ApiError;
use crate::models::parse_id;
use crate::state::AppState;
use crate::storage::repository::DEFAULT_PAGE_LIMIT;
use crate::storage::{NotificationPage, NotificationRepository, OwnershipEnforcer, StoredNotification};

/// Paging parameters. Only a leading integer is read (`2abc` is 2); values
/// without one, and 0, fall back to the defaults. Negative values become 1.
#[derive(Debug, Default, Deserialize, IntoParams)]
pub struct PageQuery {
    /// 1-based page number (default 1)
    pub page: Option<String>,
    /// Page size (default 20)
    pub limit: Option<String>,
}

impl PageQuery {
    fn leading_integer(raw: &str) -> Option<i64> {
        let raw = raw.trim_start();
        let digits_from = usize::from(raw.starts_with(|c: char| c == '-' || c == '+'));
        let end = raw[digits_from..]
            .find(|c: char| !c.is_ascii_digit())
            .map_or(raw.len(), |i| i + digits_from);
        raw[..end].parse().ok()
    }

    fn parse(raw: Option<&str>, default: u64) -> u64 {
        match raw.and_then(Self::leading_integer) {
            Some(0) | None => default,
            Some(n) => u64::try_from(n).unwrap_or(1).max(1),
        }
    }

    pub fn page(&self) -> u64 {
        Self::parse(self.page.as_deref(), 1)
    }

    pub fn limit(&self) -> u64 {
        Self::parse(self.limit.as_deref(), DEFAULT_PAGE_LIMIT)
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct MarkReadResponse {
    pub message: String,
    pub notification: StoredNotification,
}

#[utoipa::path(
    get,
    path = "/api/user/notifications",
    params(PageQuery),
    tag = "Notifications",
    security(("bearer_auth" = [])),
    responses((status = 200, body = NotificationPage))
)]
pub async fn list_notifications(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Query(query): Query<PageQuery>,
) -> Result<Json<NotificationPage>, ApiError> {
    let page = NotificationRepository::new(&state.store).list_for_user(
        &user.id,
        query.page(),
        query.limit(),
    )?;
    Ok(Json(page))
}

/// Mark one of the caller's notifications as read.
///
/// Another user's notification is reported as not found.
#[utoipa::path(
    patch,
    path = "/api/user/notifications/{id}/read",
    params(("id" = String, Path, description = "Notification id")),
    tag = "Notifications",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, body = MarkReadResponse),
        (status = 400, description = "Invalid notification id"),
        (status = 404, description = "Notification not found")
    )
)]
pub async fn mark_read(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<String>,
) -> Result<Json<MarkReadResponse>, ApiError> {
    let id = parse_id(&id, "notification")?;
    let repo = NotificationRepository::new(&state.store);

    let owned = repo
        .get(&id)?
        .filter(|n| n.verify_ownership(&user).is_ok())
        .ok_or_else(|| ApiError::not_found("Notification not found"))?;

    let notification = repo.mark_read(&owned.id)?;
    Ok(Json(MarkReadResponse {
        message: "Notification marked as read".to_string(),
        notification,
    }))
}
