// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Bearer token claims, issuance and verification.
//!
//! Tokens are HS256 JWTs signed with `JWT_SECRET`:
//!
//! | Principal | Lifetime | `typ`   | Extra claims            |
//! |-----------|----------|---------|-------------------------|
//! | Admin     | 1 day    | `admin` | `email`                 |
//! | User      | 7 days   | `user`  | `email`, `phoneNumber`  |

use chrono::{Duration, Utc};
use jsonwebtoken::{
    decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation,
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::{AuthError, Role};
use crate::storage::{StoredAdmin, StoredUser};

pub const ADMIN_TOKEN_TTL: Duration = Duration::days(1);
pub const USER_TOKEN_TTL: Duration = Duration::days(7);

/// JWT payload.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Claims {
    /// Admin or user id
    pub sub: String,
    pub email: String,
    #[serde(rename = "phoneNumber", default, skip_serializing_if = "Option::is_none")]
    pub phone_number: Option<String>,
    /// Missing on tokens minted before the role tag existed; treated as admin.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub typ: Option<Role>,
    pub iat: i64,
    pub exp: i64,
}

/// Signs and verifies bearer tokens with a shared secret.
#[derive(Clone)]
pub struct TokenService {
    encoding: EncodingKey,
    decoding: DecodingKey,
}

impl TokenService {
    pub fn new(secret: &str) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
        }
    }

    pub fn issue_admin_token(&self, admin: &StoredAdmin) -> jsonwebtoken::errors::Result<String> {
        self.sign(&admin.id, &admin.email, None, Role::Admin, ADMIN_TOKEN_TTL)
    }

    pub fn issue_user_token(&self, user: &StoredUser) -> jsonwebtoken::errors::Result<String> {
        self.sign(
            &user.id,
            &user.email,
            Some(user.phone_number.clone()),
            Role::User,
            USER_TOKEN_TTL,
        )
    }

    fn sign(
        &self,
        sub: &str,
        email: &str,
        phone_number: Option<String>,
        role: Role,
        ttl: Duration,
    ) -> jsonwebtoken::errors::Result<String> {
        let now = Utc::now();
        let claims = Claims {
            sub: sub.to_string(),
            email: email.to_string(),
            phone_number,
            typ: Some(role),
            iat: now.timestamp(),
            exp: (now + ttl).timestamp(),
        };
        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
    }

    /// Verify signature and expiry and return the claims.
    pub fn verify(&self, token: &str) -> Result<Claims, AuthError> {
        let validation = Validation::new(Algorithm::HS256);
        decode::<Claims>(token, &self.decoding, &validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                ErrorKind::ExpiredSignature => AuthError::TokenExpired,
                ErrorKind::InvalidSignature => AuthError::InvalidSignature,
                _ => AuthError::MalformedToken,
            })
    }
}

/// Admin resolved from a bearer token (password hash excluded).
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
pub struct AuthenticatedAdmin {
    pub id: String,
    pub email: String,
}

impl From<&StoredAdmin> for AuthenticatedAdmin {
    fn from(admin: &StoredAdmin) -> Self {
        Self {
            id: admin.id.clone(),
            email: admin.email.clone(),
        }
    }
}

/// Verified user resolved from a bearer token.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct AuthenticatedUser {
    pub id: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone_number: String,
    pub email_verified: bool,
}

impl From<&StoredUser> for AuthenticatedUser {
    fn from(user: &StoredUser) -> Self {
        Self {
            id: user.id.clone(),
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
            email: user.email.clone(),
            phone_number: user.phone_number.clone(),
            email_verified: user.email_verified,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::WebAuthnProfile;

    fn admin() -> StoredAdmin {
        StoredAdmin {
            id: "admin-1".to_string(),
            email: "admin@example.com".to_string(),
            password_hash: "hash".to_string(),
            webauthn: WebAuthnProfile::default(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn user() -> StoredUser {
        StoredUser {
            id: "user-1".to_string(),
            first_name: "Ada".to_string(),
            last_name: "Lovelace".to_string(),
            email: "a@x.com".to_string(),
            phone_number: "555".to_string(),
            password_hash: "hash".to_string(),
            email_verified: false,
            email_verification_code: None,
            email_verification_expires: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn admin_token_round_trips_with_one_day_expiry() {
        let tokens = TokenService::new("secret");
        let token = tokens.issue_admin_token(&admin()).unwrap();

        let claims = tokens.verify(&token).unwrap();
        assert_eq!(claims.sub, "admin-1");
        assert_eq!(claims.typ, Some(Role::Admin));
        assert_eq!(claims.phone_number, None);
        assert_eq!(claims.exp - claims.iat, ADMIN_TOKEN_TTL.num_seconds());
    }

    #[test]
    fn user_token_carries_role_and_phone() {
        let tokens = TokenService::new("secret");
        let token = tokens.issue_user_token(&user()).unwrap();

        let claims = tokens.verify(&token).unwrap();
        assert_eq!(claims.typ, Some(Role::User));
        assert_eq!(claims.phone_number.as_deref(), Some("555"));
        assert_eq!(claims.exp - claims.iat, USER_TOKEN_TTL.num_seconds());
    }

    #[test]
    fn wrong_secret_is_rejected() {
        let token = TokenService::new("secret").issue_admin_token(&admin()).unwrap();
        let result = TokenService::new("other").verify(&token);
        assert!(matches!(result, Err(AuthError::InvalidSignature)));
    }

    #[test]
    fn expired_token_is_rejected() {
        let tokens = TokenService::new("secret");
        let claims = Claims {
            sub: "admin-1".to_string(),
            email: "admin@example.com".to_string(),
            phone_number: None,
            typ: Some(Role::Admin),
            iat: Utc::now().timestamp() - 7200,
            exp: Utc::now().timestamp() - 3600,
        };
        let token = encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(b"secret"),
        )
        .unwrap();

        assert!(matches!(tokens.verify(&token), Err(AuthError::TokenExpired)));
    }

    #[test]
    fn garbage_is_malformed() {
        let tokens = TokenService::new("secret");
        assert!(matches!(tokens.verify("not.a.jwt"), Err(AuthError::MalformedToken)));
    }
}
