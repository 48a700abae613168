// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Storage Module
//!
//! Persistent storage in a single embedded **redb** database file under
//! `DATA_DIR`. Each collection is a table of JSON documents keyed by
//! UUID; typed repositories sit on top and own all query logic
//! (filtering, `createdAt`-descending ordering, pagination).
//!
//! ## Collections
//!
//! ```text
//! admins          email (unique) + password hash + passkeys
//! users           email, phone (both unique) + verification state
//! companies       KYC records, optionally owned by a user
//! campaigns       investment offers, back-reference to a company
//! notifications   per-user inbox
//! ```

pub mod database;
pub mod ownership;
pub mod repository;

pub use database::{DocumentStore, StoreError, StoreResult};
pub use ownership::{OwnedResource, OwnershipCheck, OwnershipEnforcer};
pub use repository::{
    AdminRepository, CampaignRepository, CompanyRepository, NewCampaign, NewCompany, NewUser,
    NotificationData, NotificationPage, NotificationRepository, PasskeyCredential,
    PendingCeremony, StoredAdmin, StoredCampaign, StoredCompany, StoredNotification, StoredUser,
    UserProfile, UserRepository, WebAuthnProfile,
};
