// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Axum extractors for the authenticated principal.
//!
//! ```rust,ignore
//! async fn approve(CurrentAdmin(admin): CurrentAdmin, ...) -> ... {}
//! async fn my_companies(CurrentUser(user): CurrentUser, ...) -> ... {}
//! ```
//!
//! Both prefer the principal the guard middleware already resolved and
//! fall back to resolving the bearer token themselves.

use axum::{extract::FromRequestParts, http::request::Parts};

use super::middleware::{resolve_admin, resolve_user};
use super::{AuthError, AuthenticatedAdmin, AuthenticatedUser};
use crate::state::AppState;

pub struct CurrentAdmin(pub AuthenticatedAdmin);

impl FromRequestParts<AppState> for CurrentAdmin {
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        if let Some(admin) = parts.extensions.get::<AuthenticatedAdmin>().cloned() {
            return Ok(CurrentAdmin(admin));
        }
        resolve_admin(state, &parts.headers).map(CurrentAdmin)
    }
}

pub struct CurrentUser(pub AuthenticatedUser);

impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        if let Some(user) = parts.extensions.get::<AuthenticatedUser>().cloned() {
            return Ok(CurrentUser(user));
        }
        resolve_user(state, &parts.headers).map(CurrentUser)
    }
}
