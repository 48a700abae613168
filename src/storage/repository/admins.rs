// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Admin repository.
//!
//! Admins are looked up by id (bearer token subject) or by case-folded
//! email (password and passkey login). The WebAuthn profile is embedded in
//! the admin document and only mutated by the passkey ceremonies.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use webauthn_rs::prelude::{
    AuthenticationResult, Passkey, PasskeyAuthentication, PasskeyRegistration,
};

use super::super::database::{UniqueKey, ADMINS, ADMIN_EMAILS};
use super::super::{DocumentStore, StoreError, StoreResult};

/// Admin account stored in the database.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredAdmin {
    pub id: String,
    /// Lowercase, trimmed email (unique)
    pub email: String,
    /// bcrypt hash
    pub password_hash: String,
    #[serde(default)]
    pub webauthn: WebAuthnProfile,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Passkey state for one admin.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WebAuthnProfile {
    /// Stable user handle presented to authenticators.
    pub user_handle: Option<Uuid>,
    /// Outstanding challenge, if a ceremony has been started.
    pub pending: Option<PendingCeremony>,
    pub credentials: Vec<PasskeyCredential>,
}

/// Server-side state of a started-but-unfinished ceremony.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", content = "state", rename_all = "snake_case")]
pub enum PendingCeremony {
    Registration(PasskeyRegistration),
    Authentication(PasskeyAuthentication),
}

/// A registered authenticator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PasskeyCredential {
    /// Base64url (unpadded) credential id, unique per admin
    pub credential_id: String,
    /// Public key and verification parameters
    pub passkey: Passkey,
    /// Last signature counter reported by the authenticator
    pub counter: u32,
    #[serde(default)]
    pub transports: Vec<String>,
    /// `singleDevice` / `multiDevice`, once known
    pub device_type: Option<String>,
    pub backed_up: bool,
    pub created_at: DateTime<Utc>,
}

impl WebAuthnProfile {
    pub fn credential(&self, credential_id: &str) -> Option<&PasskeyCredential> {
        self.credentials
            .iter()
            .find(|c| c.credential_id == credential_id)
    }

    pub fn credential_mut(&mut self, credential_id: &str) -> Option<&mut PasskeyCredential> {
        self.credentials
            .iter_mut()
            .find(|c| c.credential_id == credential_id)
    }

    /// Store a verified credential and end the registration ceremony.
    ///
    /// Returns `false` when the credential id was already stored; the
    /// existing record is kept.
    pub fn add_credential(&mut self, credential: PasskeyCredential) -> bool {
        self.pending = None;
        if self.credential(&credential.credential_id).is_some() {
            return false;
        }
        self.credentials.push(credential);
        true
    }

    /// Apply a verified assertion to `credential_id` and end the
    /// authentication ceremony. Returns `false` if no such credential is
    /// stored.
    pub fn finish_authentication(&mut self, credential_id: &str, result: &AuthenticationResult) -> bool {
        self.pending = None;
        match self.credential_mut(credential_id) {
            Some(credential) => {
                credential.record_assertion(result);
                true
            }
            None => false,
        }
    }
}

impl PasskeyCredential {
    /// Record a successful assertion.
    ///
    /// The counter is overwritten with whatever the authenticator reported;
    /// a lower value than the stored one is not rejected.
    pub fn record_assertion(&mut self, result: &AuthenticationResult) {
        self.passkey.update_credential(result);
        self.counter = result.counter();
        self.backed_up = result.backup_state();
        self.device_type = Some(
            if result.backup_eligible() {
                "multiDevice"
            } else {
                "singleDevice"
            }
            .to_string(),
        );
    }
}

/// Repository for admin accounts.
pub struct AdminRepository<'a> {
    store: &'a DocumentStore,
}

impl<'a> AdminRepository<'a> {
    pub fn new(store: &'a DocumentStore) -> Self {
        Self { store }
    }

    /// Normalize an email for lookup and storage.
    pub fn normalize_email(email: &str) -> String {
        email.trim().to_lowercase()
    }

    pub fn get(&self, admin_id: &str) -> StoreResult<Option<StoredAdmin>> {
        self.store.get(ADMINS, admin_id)
    }

    pub fn find_by_email(&self, email: &str) -> StoreResult<Option<StoredAdmin>> {
        let email = Self::normalize_email(email);
        match self.store.lookup(ADMIN_EMAILS, &email)? {
            Some(id) => self.get(&id),
            None => Ok(None),
        }
    }

    /// Create a new admin. Fails with `UniqueViolation` if the email is taken.
    pub fn create(&self, email: &str, password_hash: String) -> StoreResult<StoredAdmin> {
        let now = Utc::now();
        let admin = StoredAdmin {
            id: Uuid::new_v4().to_string(),
            email: Self::normalize_email(email),
            password_hash,
            webauthn: WebAuthnProfile::default(),
            created_at: now,
            updated_at: now,
        };

        self.store.insert(
            ADMINS,
            &admin.id,
            &admin,
            &[UniqueKey {
                index: ADMIN_EMAILS,
                key: &admin.email,
                label: "Email",
            }],
        )?;
        Ok(admin)
    }

    /// Apply a change to an admin record and persist it.
    pub fn update<F>(&self, admin_id: &str, mutate: F) -> StoreResult<StoredAdmin>
    where
        F: FnOnce(&mut StoredAdmin),
    {
        self.store
            .update(ADMINS, admin_id, |admin: &mut StoredAdmin| {
                mutate(admin);
                admin.updated_at = Utc::now();
            })?
            .ok_or_else(|| StoreError::NotFound("Admin".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn email_lookup_is_case_insensitive() {
        let store = DocumentStore::in_memory().unwrap();
        let repo = AdminRepository::new(&store);

        let admin = repo.create("  Admin@Example.COM ", "hash".into()).unwrap();
        assert_eq!(admin.email, "admin@example.com");

        let found = repo.find_by_email("ADMIN@example.com").unwrap().unwrap();
        assert_eq!(found.id, admin.id);
        assert!(repo.find_by_email("other@example.com").unwrap().is_none());
    }

    #[test]
    fn duplicate_email_is_rejected() {
        let store = DocumentStore::in_memory().unwrap();
        let repo = AdminRepository::new(&store);

        repo.create("admin@example.com", "hash".into()).unwrap();
        let err = repo.create("ADMIN@example.com", "hash".into()).unwrap_err();
        assert!(matches!(err, StoreError::UniqueViolation(_)));
    }

    #[test]
    fn update_persists_and_bumps_timestamp() {
        let store = DocumentStore::in_memory().unwrap();
        let repo = AdminRepository::new(&store);
        let admin = repo.create("admin@example.com", "old".into()).unwrap();

        let updated = repo
            .update(&admin.id, |a| a.password_hash = "new".to_string())
            .unwrap();
        assert_eq!(updated.password_hash, "new");
        assert!(updated.updated_at >= admin.updated_at);

        let err = repo.update("missing", |_| {}).unwrap_err();
        assert!(matches!(err, StoreError::NotFound(_)));
    }
}
