// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! User repository.
//!
//! Email and phone number are both unique; registration claims both index
//! entries in one transaction.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::models::new_id;

use super::super::database::{UniqueKey, USERS, USER_EMAILS, USER_PHONES};
use super::super::{DocumentStore, StoreError, StoreResult};

/// User account stored in the database.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredUser {
    pub id: String,
    pub first_name: String,
    pub last_name: String,
    /// Lowercase, trimmed email (unique)
    pub email: String,
    /// Trimmed phone number (unique)
    pub phone_number: String,
    /// bcrypt hash
    pub password_hash: String,
    pub email_verified: bool,
    /// Pending 6-digit code; cleared once used
    pub email_verification_code: Option<String>,
    pub email_verification_expires: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Fields required to create a user.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone_number: String,
    pub password_hash: String,
    pub verification_code: String,
    pub verification_expires: DateTime<Utc>,
}

/// Public view of a user (never includes secrets).
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub id: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone_number: String,
    pub email_verified: bool,
}

impl From<&StoredUser> for UserProfile {
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

/// Repository for user accounts.
pub struct UserRepository<'a> {
    store: &'a DocumentStore,
}

impl<'a> UserRepository<'a> {
    pub fn new(store: &'a DocumentStore) -> Self {
        Self { store }
    }

    pub fn normalize_email(email: &str) -> String {
        email.trim().to_lowercase()
    }

    pub fn normalize_phone(phone: &str) -> String {
        phone.trim().to_string()
    }

    pub fn get(&self, user_id: &str) -> StoreResult<Option<StoredUser>> {
        self.store.get(USERS, user_id)
    }

    pub fn find_by_email(&self, email: &str) -> StoreResult<Option<StoredUser>> {
        match self.store.lookup(USER_EMAILS, &Self::normalize_email(email))? {
            Some(id) => self.get(&id),
            None => Ok(None),
        }
    }

    pub fn find_by_phone(&self, phone: &str) -> StoreResult<Option<StoredUser>> {
        match self.store.lookup(USER_PHONES, &Self::normalize_phone(phone))? {
            Some(id) => self.get(&id),
            None => Ok(None),
        }
    }

    /// Whether either the email or the phone number is already registered.
    pub fn email_or_phone_taken(&self, email: &str, phone: &str) -> StoreResult<bool> {
        Ok(self
            .store
            .lookup(USER_EMAILS, &Self::normalize_email(email))?
            .is_some()
            || self
                .store
                .lookup(USER_PHONES, &Self::normalize_phone(phone))?
                .is_some())
    }

    /// Create an unverified user.
    pub fn create(&self, new_user: NewUser) -> StoreResult<StoredUser> {
        let now = Utc::now();
        let user = StoredUser {
            id: new_id(),
            first_name: new_user.first_name.trim().to_string(),
            last_name: new_user.last_name.trim().to_string(),
            email: Self::normalize_email(&new_user.email),
            phone_number: Self::normalize_phone(&new_user.phone_number),
            password_hash: new_user.password_hash,
            email_verified: false,
            email_verification_code: Some(new_user.verification_code),
            email_verification_expires: Some(new_user.verification_expires),
            created_at: now,
            updated_at: now,
        };

        self.store.insert(
            USERS,
            &user.id,
            &user,
            &[
                UniqueKey {
                    index: USER_EMAILS,
                    key: &user.email,
                    label: "Email or phone number",
                },
                UniqueKey {
                    index: USER_PHONES,
                    key: &user.phone_number,
                    label: "Email or phone number",
                },
            ],
        )?;
        Ok(user)
    }

    /// Apply a change to a user record and persist it.
    pub fn update<F>(&self, user_id: &str, mutate: F) -> StoreResult<StoredUser>
    where
        F: FnOnce(&mut StoredUser),
    {
        self.store
            .update(USERS, user_id, |user: &mut StoredUser| {
                mutate(user);
                user.updated_at = Utc::now();
            })?
            .ok_or_else(|| StoreError::NotFound("User".to_string()))
    }
}
