// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Company repository (KYC records).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::models::{new_id, ApprovalStatus};

use super::super::database::COMPANIES;
use super::super::{DocumentStore, OwnedResource, StoreError, StoreResult};

/// Company record.
///
/// `approved` mirrors `approval_status == Approved`; use
/// [`StoredCompany::set_status`] to change either.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct StoredCompany {
    pub id: String,
    pub company_name: String,
    pub registration_number: Option<String>,
    pub email: String,
    pub phone: String,
    pub website: Option<String>,
    pub industry: String,
    pub address: String,
    pub city: String,
    pub country: String,
    /// Owning user id; `None` for admin-created companies
    pub owner: Option<String>,
    pub approved: bool,
    pub approval_status: ApprovalStatus,
    pub denial_reason: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl StoredCompany {
    /// Move to `status`, keeping `approved` and `denial_reason` consistent.
    ///
    /// The reason is only kept for `Denied`.
    pub fn set_status(&mut self, status: ApprovalStatus, denial_reason: Option<String>) {
        self.approval_status = status;
        self.approved = status == ApprovalStatus::Approved;
        self.denial_reason = match status {
            ApprovalStatus::Denied => denial_reason,
            _ => None,
        };
    }
}

impl OwnedResource for StoredCompany {
    const RESOURCE: &'static str = "company";

    fn owner_user_id(&self) -> Option<&str> {
        self.owner.as_deref()
    }
}

/// Validated input for a new company.
#[derive(Debug, Clone, Default)]
pub struct NewCompany {
    pub company_name: String,
    pub registration_number: Option<String>,
    pub email: String,
    pub phone: String,
    pub website: Option<String>,
    pub industry: String,
    pub address: String,
    pub city: String,
    pub country: String,
}

impl NewCompany {
    /// Build a pending record with fresh id and timestamps.
    pub fn into_record(self, owner: Option<String>) -> StoredCompany {
        let now = Utc::now();
        let trimmed = |s: Option<String>| {
            s.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
        };
        StoredCompany {
            id: new_id(),
            company_name: self.company_name.trim().to_string(),
            registration_number: trimmed(self.registration_number),
            email: self.email.trim().to_lowercase(),
            phone: self.phone.trim().to_string(),
            website: trimmed(self.website),
            industry: self.industry.trim().to_string(),
            address: self.address.trim().to_string(),
            city: self.city.trim().to_string(),
            country: self.country.trim().to_string(),
            owner,
            approved: false,
            approval_status: ApprovalStatus::Pending,
            denial_reason: None,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Repository for companies.
pub struct CompanyRepository<'a> {
    store: &'a DocumentStore,
}

impl<'a> CompanyRepository<'a> {
    pub fn new(store: &'a DocumentStore) -> Self {
        Self { store }
    }

    pub fn create(&self, company: NewCompany, owner: Option<String>) -> StoreResult<StoredCompany> {
        let record = company.into_record(owner);
        self.store.insert(COMPANIES, &record.id, &record, &[])?;
        Ok(record)
    }

    pub fn get(&self, company_id: &str) -> StoreResult<Option<StoredCompany>> {
        self.store.get(COMPANIES, company_id)
    }

    /// Get a company or fail with `NotFound`.
    pub fn require(&self, company_id: &str) -> StoreResult<StoredCompany> {
        self.get(company_id)?
            .ok_or_else(|| StoreError::NotFound("Company".to_string()))
    }

    /// All companies, optionally filtered by status, newest first.
    pub fn list(&self, status: Option<ApprovalStatus>) -> StoreResult<Vec<StoredCompany>> {
        self.query(|c| status.is_none_or(|s| c.approval_status == s))
    }

    /// Companies owned by a user, optionally filtered by status, newest first.
    pub fn list_for_owner(
        &self,
        owner: &str,
        status: Option<ApprovalStatus>,
    ) -> StoreResult<Vec<StoredCompany>> {
        self.query(|c| {
            c.owner.as_deref() == Some(owner) && status.is_none_or(|s| c.approval_status == s)
        })
    }

    /// Companies whose name is in `names` (used by the demo seeder).
    pub fn find_by_names(&self, names: &[&str]) -> StoreResult<Vec<StoredCompany>> {
        self.query(|c| names.contains(&c.company_name.as_str()))
    }

    fn query<F>(&self, filter: F) -> StoreResult<Vec<StoredCompany>>
    where
        F: Fn(&StoredCompany) -> bool,
    {
        let mut companies: Vec<StoredCompany> = self.store.find(COMPANIES, filter)?;
        companies.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(companies)
    }

    /// Change the approval status; fails with `NotFound` for unknown ids.
    pub fn set_status(
        &self,
        company_id: &str,
        status: ApprovalStatus,
        denial_reason: Option<String>,
    ) -> StoreResult<StoredCompany> {
        self.store
            .update(COMPANIES, company_id, |c: &mut StoredCompany| {
                c.set_status(status, denial_reason);
                c.updated_at = Utc::now();
            })?
            .ok_or_else(|| StoreError::NotFound("Company".to_string()))
    }

    pub fn insert_many(&self, companies: &[StoredCompany]) -> StoreResult<usize> {
        let docs: Vec<(String, &StoredCompany)> =
            companies.iter().map(|c| (c.id.clone(), c)).collect();
        self.store.insert_many(COMPANIES, &docs)
    }

    pub fn delete_by_ids(&self, ids: &[String]) -> StoreResult<usize> {
        self.store
            .delete_many(COMPANIES, |c: &StoredCompany| ids.contains(&c.id))
    }
}
