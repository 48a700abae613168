// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Principal kinds carried in the token `typ` claim.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Which kind of principal a token was issued to.
///
/// Admins and users live in separate collections; a token only ever resolves
/// against the collection matching its role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Back-office reviewer (companies, campaigns, passkeys)
    Admin,
    /// Investor / company owner
    User,
}

impl Role {
    /// Parse a `typ` claim value (case-insensitive).
    pub fn parse(s: &str) -> Option<Role> {
        match s.to_lowercase().as_str() {
            "admin" => Some(Role::Admin),
            "user" => Some(Role::User),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::User => "user",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
