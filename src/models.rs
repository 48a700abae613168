// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Shared Data Models
//!
//! Enumerations and small value types shared by storage, the approval
//! workflow and the API layer. Entity records live next to their
//! repositories in [`crate::storage::repository`].

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

// =============================================================================
// Approval Status
// =============================================================================

/// Review state shared by companies (KYC) and campaigns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema, Default)]
#[serde(rename_all = "lowercase")]
pub enum ApprovalStatus {
    #[default]
    Pending,
    Approved,
    Denied,
}

impl ApprovalStatus {
    pub const ALL: [ApprovalStatus; 3] = [
        ApprovalStatus::Pending,
        ApprovalStatus::Approved,
        ApprovalStatus::Denied,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ApprovalStatus::Pending => "pending",
            ApprovalStatus::Approved => "approved",
            ApprovalStatus::Denied => "denied",
        }
    }

    /// Parse a status string (exact, lowercase).
    pub fn parse(s: &str) -> Option<ApprovalStatus> {
        Self::ALL.into_iter().find(|status| status.as_str() == s)
    }
}

impl std::fmt::Display for ApprovalStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// Notification Type
// =============================================================================

/// Events a user can be notified about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum NotificationType {
    CampaignSubmitted,
    CampaignApproved,
    CampaignDenied,
}

impl NotificationType {
    pub fn title(&self) -> &'static str {
        match self {
            NotificationType::CampaignSubmitted => "Campaign Submitted",
            NotificationType::CampaignApproved => "Campaign Approved",
            NotificationType::CampaignDenied => "Campaign Denied",
        }
    }
}

// =============================================================================
// Ids
// =============================================================================

/// Validate that a path id is a well-formed document id.
///
/// Ids are UUIDs; anything else is reported the way a failed id cast is:
/// `400 Invalid <entity> id`.
pub fn parse_id(raw: &str, entity: &str) -> Result<String, crate::error::ApiError> {
    uuid::Uuid::parse_str(raw)
        .map(|id| id.to_string())
        .map_err(|_| crate::error::ApiError::bad_request(format!("Invalid {entity} id")))
}

/// Generate a fresh document id.
pub fn new_id() -> String {
    uuid::Uuid::new_v4().to_string()
}
