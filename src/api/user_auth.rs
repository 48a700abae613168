// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! User registration, login and email verification.
//!
//! A token is issued at registration, but it is useless until the email is
//! verified: the user guard refuses unverified accounts.

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    Json,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::extract::{extract_json, non_blank};
use crate::auth::credentials::{
    equalize_failed_lookup, generate_verification_code, hash_password, verify_password,
};
use crate::error::ApiError;
use crate::mail::send_verification_email;
use crate::state::AppState;
use crate::storage::{NewUser, StoredUser, UserProfile, UserRepository};

const INVALID_CODE: &str = "Invalid or expired verification code";
const ALREADY_VERIFIED: &str = "Email already verified";

// =============================================================================
// Request / Response Types
// =============================================================================

#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub phone_number: Option<String>,
    pub password: Option<String>,
}

/// `identifier` is an email if it contains `@`, otherwise a phone number.
#[derive(Debug, Deserialize, ToSchema)]
pub struct UserLoginRequest {
    pub identifier: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct VerifyEmailRequest {
    pub email: Option<String>,
    pub code: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct ResendEmailRequest {
    pub email: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct UserSessionResponse {
    pub token: String,
    pub user: UserProfile,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    fn new(message: &str) -> Json<Self> {
        Json(Self {
            message: message.to_string(),
        })
    }
}

fn session_for(state: &AppState, user: &StoredUser) -> Result<UserSessionResponse, ApiError> {
    let token = state
        .tokens
        .issue_user_token(user)
        .map_err(ApiError::internal)?;
    Ok(UserSessionResponse {
        token,
        user: UserProfile::from(user),
    })
}

// =============================================================================
// Handlers
// =============================================================================

#[utoipa::path(
    post,
    path = "/api/users/register",
    request_body = RegisterRequest,
    tag = "User Auth",
    responses(
        (status = 201, body = UserSessionResponse),
        (status = 400, description = "Missing fields"),
        (status = 409, description = "Email or phone number already in use"),
        (status = 500, description = "Verification email could not be sent")
    )
)]
pub async fn register(
    State(state): State<AppState>,
    body: Result<Json<RegisterRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<UserSessionResponse>), ApiError> {
    let request = extract_json(body)?;
    let (Some(first_name), Some(last_name), Some(email), Some(phone_number), Some(password)) = (
        non_blank(request.first_name),
        non_blank(request.last_name),
        non_blank(request.email),
        non_blank(request.phone_number),
        request.password.filter(|p| !p.is_empty()),
    ) else {
        return Err(ApiError::bad_request("All fields are required"));
    };

    let repo = UserRepository::new(&state.store);
    if repo.email_or_phone_taken(&email, &phone_number)? {
        return Err(ApiError::conflict("Email or phone number already in use"));
    }

    let password_hash = hash_password(&password).await.map_err(ApiError::internal)?;
    let (code, expires) = generate_verification_code().map_err(ApiError::internal)?;
    let user = repo.create(NewUser {
        first_name,
        last_name,
        email,
        phone_number,
        password_hash,
        verification_code: code.clone(),
        verification_expires: expires,
    })?;
    tracing::info!(user_id = %user.id, "user registered");

    // The account stays in place if this fails; the user can ask for a resend.
    send_verification_email(state.mailer.as_ref(), &user.email, &user.first_name, &code)
        .await
        .map_err(ApiError::internal)?;

    Ok((StatusCode::CREATED, Json(session_for(&state, &user)?)))
}

#[utoipa::path(
    post,
    path = "/api/users/login",
    request_body = UserLoginRequest,
    tag = "User Auth",
    responses(
        (status = 200, body = UserSessionResponse),
        (status = 401, description = "Invalid credentials"),
        (status = 403, description = "Email not verified (`needsVerification: true`)")
    )
)]
pub async fn login(
    State(state): State<AppState>,
    body: Result<Json<UserLoginRequest>, JsonRejection>,
) -> Result<Json<UserSessionResponse>, ApiError> {
    let request = extract_json(body)?;
    let (Some(identifier), Some(password)) = (
        non_blank(request.identifier),
        request.password.filter(|p| !p.is_empty()),
    ) else {
        return Err(ApiError::bad_request("Identifier and password are required"));
    };

    let repo = UserRepository::new(&state.store);
    let found = if identifier.contains('@') {
        repo.find_by_email(&identifier)?
    } else {
        repo.find_by_phone(&identifier)?
    };
    let Some(user) = found else {
        equalize_failed_lookup(&password).await;
        return Err(ApiError::invalid_credentials());
    };

    let matches = verify_password(&password, &user.password_hash)
        .await
        .map_err(ApiError::internal)?;
    if !matches {
        return Err(ApiError::invalid_credentials());
    }
    if !user.email_verified {
        return Err(ApiError::forbidden("Email not verified").with_needs_verification());
    }

    tracing::info!(user_id = %user.id, "user logged in");
    Ok(Json(session_for(&state, &user)?))
}

/// Check the emailed code. A used code is cleared, so it cannot be replayed.
#[utoipa::path(
    post,
    path = "/api/users/verify-email",
    request_body = VerifyEmailRequest,
    tag = "User Auth",
    responses(
        (status = 200, body = MessageResponse),
        (status = 400, description = "Invalid or expired code, or already verified")
    )
)]
pub async fn verify_email(
    State(state): State<AppState>,
    body: Result<Json<VerifyEmailRequest>, JsonRejection>,
) -> Result<Json<MessageResponse>, ApiError> {
    let request = extract_json(body)?;
    let (Some(email), Some(code)) = (non_blank(request.email), non_blank(request.code)) else {
        return Err(ApiError::bad_request("Email and code are required"));
    };

    let repo = UserRepository::new(&state.store);
    let Some(user) = repo.find_by_email(&email)? else {
        return Err(ApiError::bad_request(INVALID_CODE));
    };
    if user.email_verified {
        return Err(ApiError::bad_request(ALREADY_VERIFIED));
    }

    let code_matches = user.email_verification_code.as_deref() == Some(code.as_str());
    let unexpired = user
        .email_verification_expires
        .is_some_and(|expires| Utc::now() <= expires);
    if !(code_matches && unexpired) {
        tracing::debug!(user_id = %user.id, code_matches, unexpired, "email verification rejected");
        return Err(ApiError::bad_request(INVALID_CODE));
    }

    repo.update(&user.id, |u| {
        u.email_verified = true;
        u.email_verification_code = None;
        u.email_verification_expires = None;
    })?;
    tracing::info!(user_id = %user.id, "email verified");

    Ok(MessageResponse::new("Email verified successfully"))
}

/// Issue a fresh code (the old one stops working) and email it.
#[utoipa::path(
    post,
    path = "/api/users/resend-email",
    request_body = ResendEmailRequest,
    tag = "User Auth",
    responses(
        (status = 200, body = MessageResponse),
        (status = 400, description = "Email missing or already verified"),
        (status = 404, description = "User not found")
    )
)]
pub async fn resend_email(
    State(state): State<AppState>,
    body: Result<Json<ResendEmailRequest>, JsonRejection>,
) -> Result<Json<MessageResponse>, ApiError> {
    let request = extract_json(body)?;
    let email = non_blank(request.email).ok_or_else(|| ApiError::bad_request("Email is required"))?;

    let repo = UserRepository::new(&state.store);
    let user = repo
        .find_by_email(&email)?
        .ok_or_else(|| ApiError::not_found("User not found"))?;
    if user.email_verified {
        return Err(ApiError::bad_request(ALREADY_VERIFIED));
    }

    let (code, expires) = generate_verification_code().map_err(ApiError::internal)?;
    let user = repo.update(&user.id, |u| {
        u.email_verification_code = Some(code.clone());
        u.email_verification_expires = Some(expires);
    })?;

    send_verification_email(state.mailer.as_ref(), &user.email, &user.first_name, &code)
        .await
        .map_err(ApiError::internal)?;

    Ok(MessageResponse::new("Verification code sent"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mail::RecordingMailer;
    use std::sync::Arc;

    fn registration(email: &str, phone: &str) -> Result<Json<RegisterRequest>, JsonRejection> {
        Ok(Json(RegisterRequest {
            first_name: Some("Ada".into()),
            last_name: Some("Lovelace".into()),
            email: Some(email.into()),
            phone_number: Some(phone.into()),
            password: Some("hunter22".into()),
        }))
    }

    fn verify_body(email: &str, code: &str) -> Result<Json<VerifyEmailRequest>, JsonRejection> {
        Ok(Json(VerifyEmailRequest {
            email: Some(email.into()),
            code: Some(code.into()),
        }))
    }

    fn login_body(identifier: &str, password: &str) -> Result<Json<UserLoginRequest>, JsonRejection> {
        Ok(Json(UserLoginRequest {
            identifier: Some(identifier.into()),
            password: Some(password.into()),
        }))
    }

    #[tokio::test]
    async fn register_creates_unverified_user_and_emails_code() {
        let (state, mailer) = AppState::for_tests();
        let (status, Json(session)) = register(State(state.clone()), registration("A@X.com", "555"))
            .await
            .unwrap();

        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(session.user.email, "a@x.com");
        assert!(!session.user.email_verified);

        let sent = mailer.sent();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].to, "a@x.com");
        let code = mailer.last_code().unwrap();
        assert_eq!(code.len(), 6);

        let stored = UserRepository::new(&state.store)
            .find_by_email("a@x.com")
            .unwrap()
            .unwrap();
        assert_eq!(stored.email_verification_code.as_deref(), Some(code.as_str()));
    }

    #[tokio::test]
    async fn duplicate_email_or_phone_conflicts() {
        let (state, _) = AppState::for_tests();
        register(State(state.clone()), registration("a@x.com", "555"))
            .await
            .unwrap();

        let same_email = register(State(state.clone()), registration("a@x.com", "777"))
            .await
            .unwrap_err();
        assert_eq!(same_email.status, StatusCode::CONFLICT);
        assert_eq!(same_email.message, "Email or phone number already in use");

        let same_phone = register(State(state), registration("b@x.com", "555"))
            .await
            .unwrap_err();
        assert_eq!(same_phone.status, StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn register_requires_every_field() {
        let (state, _) = AppState::for_tests();
        let err = register(
            State(state),
            Ok(Json(RegisterRequest {
                email: Some("a@x.com".into()),
                ..Default::default()
            })),
        )
        .await
        .unwrap_err();
        assert_eq!(err.status, StatusCode::BAD_REQUEST);
        assert_eq!(err.message, "All fields are required");
    }

    #[tokio::test]
    async fn mail_failure_fails_request_but_keeps_account() {
        let (base, _) = AppState::for_tests();
        let state = AppState {
            mailer: Arc::new(RecordingMailer::failing()),
            ..base
        };

        let err = register(State(state.clone()), registration("a@x.com", "555"))
            .await
            .unwrap_err();
        assert_eq!(err.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(UserRepository::new(&state.store)
            .find_by_email("a@x.com")
            .unwrap()
            .is_some());
    }

    #[tokio::test]
    async fn verification_code_is_single_use() {
        let (state, mailer) = AppState::for_tests();
        register(State(state.clone()), registration("a@x.com", "555"))
            .await
            .unwrap();
        let code = mailer.last_code().unwrap();

        verify_email(State(state.clone()), verify_body("a@x.com", &code))
            .await
            .unwrap();
        let stored = UserRepository::new(&state.store)
            .find_by_email("a@x.com")
            .unwrap()
            .unwrap();
        assert!(stored.email_verified);
        assert!(stored.email_verification_code.is_none());
        assert!(stored.email_verification_expires.is_none());

        let replay = verify_email(State(state), verify_body("a@x.com", &code))
            .await
            .unwrap_err();
        assert_eq!(replay.status, StatusCode::BAD_REQUEST);
        assert_eq!(replay.message, ALREADY_VERIFIED);
    }

    #[tokio::test]
    async fn expired_code_is_rejected() {
        let (state, mailer) = AppState::for_tests();
        let (_, Json(session)) = register(State(state.clone()), registration("a@x.com", "555"))
            .await
            .unwrap();
        let code = mailer.last_code().unwrap();
        UserRepository::new(&state.store)
            .update(&session.user.id, |u| {
                u.email_verification_expires = Some(Utc::now() - chrono::Duration::minutes(1))
            })
            .unwrap();

        let err = verify_email(State(state), verify_body("a@x.com", &code))
            .await
            .unwrap_err();
        assert_eq!(err.message, INVALID_CODE);
    }

    #[tokio::test]
    async fn login_by_phone_and_email() {
        let (state, mailer) = AppState::for_tests();
        register(State(state.clone()), registration("a@x.com", "555"))
            .await
            .unwrap();
        let code = mailer.last_code().unwrap();
        verify_email(State(state.clone()), verify_body("a@x.com", &code))
            .await
            .unwrap();

        let Json(by_phone) = login(State(state.clone()), login_body("555", "hunter22"))
            .await
            .unwrap();
        let Json(by_email) = login(State(state.clone()), login_body("A@x.com", "hunter22"))
            .await
            .unwrap();
        assert_eq!(by_phone.user.id, by_email.user.id);

        let claims = state.tokens.verify(&by_phone.token).unwrap();
        assert_eq!(claims.phone_number.as_deref(), Some("555"));
    }

    #[tokio::test]
    async fn unknown_identifier_and_wrong_password_are_identical() {
        let (state, _) = AppState::for_tests();
        register(State(state.clone()), registration("a@x.com", "555"))
            .await
            .unwrap();

        let unknown = login(State(state.clone()), login_body("zz@x.com", "hunter22"))
            .await
            .unwrap_err();
        let wrong = login(State(state), login_body("a@x.com", "nope"))
            .await
            .unwrap_err();
        assert_eq!(unknown.status, StatusCode::UNAUTHORIZED);
        assert_eq!((unknown.status, unknown.message), (wrong.status, wrong.message));
    }

    #[tokio::test]
    async fn resend_replaces_code() {
        let (state, mailer) = AppState::for_tests();
        register(State(state.clone()), registration("a@x.com", "555"))
            .await
            .unwrap();
        let first = mailer.last_code().unwrap();

        resend_email(
            State(state.clone()),
            Ok(Json(ResendEmailRequest {
                email: Some("a@x.com".into()),
            })),
        )
        .await
        .unwrap();
        assert_eq!(mailer.sent().len(), 2);
        let second = mailer.last_code().unwrap();

        let stored = UserRepository::new(&state.store)
            .find_by_email("a@x.com")
            .unwrap()
            .unwrap();
        assert_eq!(stored.email_verification_code.as_deref(), Some(second.as_str()));
        if first != second {
            let err = verify_email(State(state), verify_body("a@x.com", &first))
                .await
                .unwrap_err();
            assert_eq!(err.status, StatusCode::BAD_REQUEST);
        }
    }
}
