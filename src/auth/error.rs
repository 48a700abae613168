// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Access guard errors.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

/// Reasons a bearer token fails to resolve to a usable principal.
#[derive(Debug)]
pub enum AuthError {
    /// No authorization header present
    MissingAuthHeader,
    /// Header present but not `Bearer <token>`
    InvalidAuthHeader,
    /// Token cannot be decoded
    MalformedToken,
    /// Token signature is invalid
    InvalidSignature,
    /// Token has expired
    TokenExpired,
    /// Subject does not exist (deleted account or stale token)
    PrincipalNotFound,
    /// Token was issued to the other kind of principal
    WrongTokenType,
    /// User has not verified their email yet
    EmailNotVerified,
    /// Store or configuration failure while resolving the principal
    InternalError(String),
}

#[derive(Serialize)]
struct AuthErrorBody {
    error: String,
    error_code: String,
}

impl AuthError {
    pub fn error_code(&self) -> &'static str {
        match self {
            AuthError::MissingAuthHeader => "missing_auth_header",
            AuthError::InvalidAuthHeader => "invalid_auth_header",
            AuthError::MalformedToken => "malformed_token",
            AuthError::InvalidSignature => "invalid_signature",
            AuthError::TokenExpired => "token_expired",
            AuthError::PrincipalNotFound => "principal_not_found",
            AuthError::WrongTokenType => "wrong_token_type",
            AuthError::EmailNotVerified => "email_not_verified",
            AuthError::InternalError(_) => "internal_error",
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            AuthError::MissingAuthHeader
            | AuthError::InvalidAuthHeader
            | AuthError::MalformedToken
            | AuthError::InvalidSignature
            | AuthError::TokenExpired
            | AuthError::PrincipalNotFound => StatusCode::UNAUTHORIZED,
            AuthError::WrongTokenType | AuthError::EmailNotVerified => StatusCode::FORBIDDEN,
            AuthError::InternalError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl std::fmt::Display for AuthError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AuthError::MissingAuthHeader => write!(f, "Authorization token missing"),
            AuthError::InvalidAuthHeader => {
                write!(f, "Invalid authorization header format (expected 'Bearer <token>')")
            }
            AuthError::MalformedToken => write!(f, "Token is malformed"),
            AuthError::InvalidSignature => write!(f, "Token signature is invalid"),
            AuthError::TokenExpired => write!(f, "Token has expired"),
            AuthError::PrincipalNotFound => write!(f, "Invalid token"),
            AuthError::WrongTokenType => write!(f, "Token is not valid for this resource"),
            AuthError::EmailNotVerified => write!(f, "Email not verified"),
            AuthError::InternalError(msg) => write!(f, "Internal authentication error: {msg}"),
        }
    }
}

impl std::error::Error for AuthError {}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if let AuthError::InternalError(detail) = &self {
            tracing::error!(error = %detail, "access guard failed");
        }
        let body = Json(AuthErrorBody {
            error: match &self {
                // Keep store details out of responses
                AuthError::InternalError(_) => crate::error::INTERNAL_ERROR_MESSAGE.to_string(),
                other => other.to_string(),
            },
            error_code: self.error_code().to_string(),
        });
        (status, body).into_response()
    }
}
