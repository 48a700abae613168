// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Access guard middleware.
//!
//! `require_admin` and `require_user` are mounted with
//! `axum::middleware::from_fn_with_state` on the protected sub-routers. On
//! success the resolved principal is inserted into the request extensions,
//! where the [`CurrentAdmin`](super::CurrentAdmin) and
//! [`CurrentUser`](super::CurrentUser) extractors pick it up.

use axum::{
    extract::{Request, State},
    http::{header::AUTHORIZATION, HeaderMap},
    middleware::Next,
    response::{IntoResponse, Response},
};

use super::{AuthError, AuthenticatedAdmin, AuthenticatedUser, Role};
use crate::state::AppState;
use crate::storage::{AdminRepository, UserRepository};

/// Extract the token from `Authorization: Bearer <token>`.
pub fn bearer_token(headers: &HeaderMap) -> Result<&str, AuthError> {
    let header = headers
        .get(AUTHORIZATION)
        .ok_or(AuthError::MissingAuthHeader)?
        .to_str()
        .map_err(|_| AuthError::InvalidAuthHeader)?;

    let token = header
        .strip_prefix("Bearer ")
        .map(str::trim)
        .ok_or(AuthError::InvalidAuthHeader)?;
    if token.is_empty() {
        return Err(AuthError::MissingAuthHeader);
    }
    Ok(token)
}

/// Resolve an admin bearer token (1 day lifetime).
///
/// Tokens explicitly tagged `user` are refused; untagged tokens are
/// accepted as admin tokens.
pub fn resolve_admin(state: &AppState, headers: &HeaderMap) -> Result<AuthenticatedAdmin, AuthError> {
    let claims = state.tokens.verify(bearer_token(headers)?)?;
    if matches!(claims.typ, Some(role) if role != Role::Admin) {
        return Err(AuthError::WrongTokenType);
    }

    let admin = AdminRepository::new(&state.store)
        .get(&claims.sub)
        .map_err(|e| AuthError::InternalError(e.to_string()))?
        .ok_or(AuthError::PrincipalNotFound)?;

    Ok(AuthenticatedAdmin::from(&admin))
}

/// Resolve a user bearer token (7 day lifetime, `typ` must be `user`).
///
/// The user must have verified their email.
pub fn resolve_user(state: &AppState, headers: &HeaderMap) -> Result<AuthenticatedUser, AuthError> {
    let claims = state.tokens.verify(bearer_token(headers)?)?;
    if claims.typ != Some(Role::User) {
        return Err(AuthError::WrongTokenType);
    }

    let user = UserRepository::new(&state.store)
        .get(&claims.sub)
        .map_err(|e| AuthError::InternalError(e.to_string()))?
        .ok_or(AuthError::PrincipalNotFound)?;

    if !user.email_verified {
        return Err(AuthError::EmailNotVerified);
    }
    Ok(AuthenticatedUser::from(&user))
}

pub async fn require_admin(State(state): State<AppState>, mut request: Request, next: Next) -> Response {
    match resolve_admin(&state, request.headers()) {
        Ok(admin) => {
            request.extensions_mut().insert(admin);
            next.run(request).await
        }
        Err(e) => {
            tracing::debug!(error = %e, "admin guard rejected request");
            e.into_response()
        }
    }
}

pub async fn require_user(State(state): State<AppState>, mut request: Request, next: Next) -> Response {
    match resolve_user(&state, request.headers()) {
        Ok(user) => {
            request.extensions_mut().insert(user);
            next.run(request).await
        }
        Err(e) => {
            tracing::debug!(error = %e, "user guard rejected request");
            e.into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::credentials::generate_verification_code;
    use crate::storage::NewUser;
    use axum::http::HeaderValue;

    fn headers_with(token: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {token}")).unwrap(),
        );
        headers
    }

    fn create_user(state: &AppState, verified: bool) -> crate::storage::StoredUser {
        let (code, expires) = generate_verification_code().unwrap();
        let repo = UserRepository::new(&state.store);
        let user = repo
            .create(NewUser {
                first_name: "Ada".into(),
                last_name: "Lovelace".into(),
                email: "a@x.com".into(),
                phone_number: "555".into(),
                password_hash: "hash".into(),
                verification_code: code,
                verification_expires: expires,
            })
            .unwrap();
        if verified {
            repo.update(&user.id, |u| u.email_verified = true).unwrap()
        } else {
            user
        }
    }

    #[test]
    fn bearer_token_parsing() {
        assert!(matches!(bearer_token(&HeaderMap::new()), Err(AuthError::MissingAuthHeader)));

        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_static("Basic abc"));
        assert!(matches!(bearer_token(&headers), Err(AuthError::InvalidAuthHeader)));

        assert_eq!(bearer_token(&headers_with("abc")).unwrap(), "abc");
    }

    #[test]
    fn admin_guard_resolves_existing_admin() {
        let (state, _) = AppState::for_tests();
        let admin = AdminRepository::new(&state.store)
            .create("admin@example.com", "hash".into())
            .unwrap();
        let token = state.tokens.issue_admin_token(&admin).unwrap();

        let resolved = resolve_admin(&state, &headers_with(&token)).unwrap();
        assert_eq!(resolved.id, admin.id);
        assert_eq!(resolved.email, "admin@example.com");
    }

    #[test]
    fn admin_guard_rejects_unknown_subject_and_user_tokens() {
        let (state, _) = AppState::for_tests();
        let admin = AdminRepository::new(&state.store)
            .create("admin@example.com", "hash".into())
            .unwrap();
        let mut ghost = admin.clone();
        ghost.id = uuid::Uuid::new_v4().to_string();
        let token = state.tokens.issue_admin_token(&ghost).unwrap();
        assert!(matches!(
            resolve_admin(&state, &headers_with(&token)),
            Err(AuthError::PrincipalNotFound)
        ));

        let user = create_user(&state, true);
        let user_token = state.tokens.issue_user_token(&user).unwrap();
        assert!(matches!(
            resolve_admin(&state, &headers_with(&user_token)),
            Err(AuthError::WrongTokenType)
        ));
    }

    #[test]
    fn user_guard_requires_verified_email() {
        let (state, _) = AppState::for_tests();
        let user = create_user(&state, false);
        let token = state.tokens.issue_user_token(&user).unwrap();

        assert!(matches!(
            resolve_user(&state, &headers_with(&token)),
            Err(AuthError::EmailNotVerified)
        ));

        UserRepository::new(&state.store)
            .update(&user.id, |u| u.email_verified = true)
            .unwrap();
        let resolved = resolve_user(&state, &headers_with(&token)).unwrap();
        assert_eq!(resolved.id, user.id);
        assert!(resolved.email_verified);
    }

    #[test]
    fn user_guard_rejects_admin_tokens() {
        let (state, _) = AppState::for_tests();
        let admin = AdminRepository::new(&state.store)
            .create("admin@example.com", "hash".into())
            .unwrap();
        let token = state.tokens.issue_admin_token(&admin).unwrap();

        assert!(matches!(
            resolve_user(&state, &headers_with(&token)),
            Err(AuthError::WrongTokenType)
        ));
    }
}
