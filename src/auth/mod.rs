// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Authentication Module
//!
//! Credential issuance and the access guard for InvestHub.
//!
//! ## Auth Flow
//!
//! 1. Admin logs in with email + password (or a passkey), user logs in with
//!    email-or-phone + password
//! 2. Server issues an HS256 bearer token (`typ` = `admin` | `user`)
//! 3. Protected routers run `require_admin` / `require_user`, which:
//!    - verify signature and expiry
//!    - check the `typ` tag
//!    - load the principal from the store (users must be email-verified)
//!
//! ## Security
//!
//! - Unknown account and wrong password produce the same 401 body
//! - Passwords are bcrypt hashed (cost 10) off the async runtime
//! - Passkey cryptography is delegated to `webauthn-rs`

pub mod claims;
pub mod credentials;
pub mod error;
pub mod extractor;
pub mod middleware;
pub mod passkey;
pub mod roles;

pub use claims::{AuthenticatedAdmin, AuthenticatedUser, Claims, TokenService};
pub use error::AuthError;
pub use extractor::{CurrentAdmin, CurrentUser};
pub use passkey::PasskeyService;
pub use roles::Role;
