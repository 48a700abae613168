// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Repository layer providing typed access to the document store.
//!
//! Each repository owns the queries for one collection, including
//! normalization of unique keys and `createdAt`-descending ordering.

pub mod admins;
pub mod campaigns;
pub mod companies;
pub mod notifications;
pub mod users;

pub use admins::{AdminRepository, PasskeyCredential, PendingCeremony, StoredAdmin, WebAuthnProfile};
pub use campaigns::{CampaignRepository, NewCampaign, StoredCampaign};
pub use companies::{CompanyRepository, NewCompany, StoredCompany};
pub use notifications::{
    NotificationData, NotificationPage, NotificationRepository, StoredNotification,
    DEFAULT_PAGE_LIMIT,
};
pub use users::{NewUser, StoredUser, UserProfile, UserRepository};
