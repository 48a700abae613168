// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Campaign repository.
//!
//! Campaigns hold a back-reference to their company; the company document
//! does not list its campaigns.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::models::{new_id, ApprovalStatus};

use super::super::database::CAMPAIGNS;
use super::super::{DocumentStore, StoreError, StoreResult};

/// Investment campaign record.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct StoredCampaign {
    pub id: String,
    /// Owning company id
    pub company: String,
    /// Company name at submission time
    pub company_name: String,
    pub description: String,
    /// Duration in months
    pub duration: f64,
    pub hard_cap: f64,
    pub interest_rate: f64,
    pub max_investment: f64,
    pub min_investment: f64,
    pub payout_frequency: String,
    pub soft_cap: f64,
    pub campaign_start_time: DateTime<Utc>,
    pub campaign_end_time: DateTime<Utc>,
    pub maturity_date: DateTime<Utc>,
    pub approval_status: ApprovalStatus,
    pub denial_reason: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Validated campaign terms.
#[derive(Debug, Clone)]
pub struct NewCampaign {
    pub company_name: String,
    pub description: String,
    pub duration: f64,
    pub hard_cap: f64,
    pub interest_rate: f64,
    pub max_investment: f64,
    pub min_investment: f64,
    pub payout_frequency: String,
    pub soft_cap: f64,
    pub campaign_start_time: DateTime<Utc>,
    pub campaign_end_time: DateTime<Utc>,
    pub maturity_date: DateTime<Utc>,
}

impl NewCampaign {
    /// Build a pending record for `company_id`.
    pub fn into_record(self, company_id: &str) -> StoredCampaign {
        let now = Utc::now();
        StoredCampaign {
            id: new_id(),
            company: company_id.to_string(),
            company_name: self.company_name.trim().to_string(),
            description: self.description.trim().to_string(),
            duration: self.duration,
            hard_cap: self.hard_cap,
            interest_rate: self.interest_rate,
            max_investment: self.max_investment,
            min_investment: self.min_investment,
            payout_frequency: self.payout_frequency.trim().to_string(),
            soft_cap: self.soft_cap,
            campaign_start_time: self.campaign_start_time,
            campaign_end_time: self.campaign_end_time,
            maturity_date: self.maturity_date,
            approval_status: ApprovalStatus::Pending,
            denial_reason: None,
            created_at: now,
            updated_at: now,
        }
    }
}

pub struct CampaignRepository<'a> {
    store: &'a DocumentStore,
}

impl<'a> CampaignRepository<'a> {
    pub fn new(store: &'a DocumentStore) -> Self {
        Self { store }
    }

    /// Persist a new campaign. Always starts `pending`.
    pub fn create(&self, campaign: NewCampaign, company_id: &str) -> StoreResult<StoredCampaign> {
        let record = campaign.into_record(company_id);
        self.store.insert(CAMPAIGNS, &record.id, &record, &[])?;
        Ok(record)
    }

    pub fn get(&self, campaign_id: &str) -> StoreResult<Option<StoredCampaign>> {
        self.store.get(CAMPAIGNS, campaign_id)
    }

    pub fn list(&self) -> StoreResult<Vec<StoredCampaign>> {
        self.query(|_| true)
    }

    /// Campaigns of one company, optionally filtered by status, newest first.
    pub fn list_for_company(
        &self,
        company_id: &str,
        status: Option<ApprovalStatus>,
    ) -> StoreResult<Vec<StoredCampaign>> {
        self.query(|c| c.company == company_id && status.is_none_or(|s| c.approval_status == s))
    }

    fn query<F>(&self, filter: F) -> StoreResult<Vec<StoredCampaign>>
    where
        F: Fn(&StoredCampaign) -> bool,
    {
        let mut campaigns: Vec<StoredCampaign> = self.store.find(CAMPAIGNS, filter)?;
        campaigns.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(campaigns)
    }

    /// Change the approval status. The denial reason is kept only for `Denied`.
    pub fn set_status(
        &self,
        campaign_id: &str,
        status: ApprovalStatus,
        denial_reason: Option<String>,
    ) -> StoreResult<StoredCampaign> {
        self.store
            .update(CAMPAIGNS, campaign_id, |c: &mut StoredCampaign| {
                c.approval_status = status;
                c.denial_reason = match status {
                    ApprovalStatus::Denied => denial_reason,
                    _ => None,
                };
                c.updated_at = Utc::now();
            })?
            .ok_or_else(|| StoreError::NotFound("Campaign".to_string()))
    }

    pub fn insert_many(&self, campaigns: &[StoredCampaign]) -> StoreResult<usize> {
        let docs: Vec<(String, &StoredCampaign)> =
            campaigns.iter().map(|c| (c.id.clone(), c)).collect();
        self.store.insert_many(CAMPAIGNS, &docs)
    }

    /// Remove every campaign belonging to one of `company_ids`.
    pub fn delete_for_companies(&self, company_ids: &[String]) -> StoreResult<usize> {
        self.store
            .delete_many(CAMPAIGNS, |c: &StoredCampaign| company_ids.contains(&c.company))
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use chrono::Duration;

    pub(crate) fn terms(name: &str) -> NewCampaign {
        let start = Utc::now();
        NewCampaign {
            company_name: name.to_string(),
            description: "Expansion round".to_string(),
            duration: 12.0,
            hard_cap: 500_000.0,
            interest_rate: 8.5,
            max_investment: 50_000.0,
            min_investment: 1_000.0,
            payout_frequency: "Monthly".to_string(),
            soft_cap: 100_000.0,
            campaign_start_time: start,
            campaign_end_time: start + Duration::days(30),
            maturity_date: start + Duration::days(395),
        }
    }

    #[test]
    fn create_is_always_pending() {
        let store = DocumentStore::in_memory().unwrap();
        let repo = CampaignRepository::new(&store);

        let campaign = repo.create(terms("Acme"), "company-1").unwrap();
        assert_eq!(campaign.approval_status, ApprovalStatus::Pending);
        assert_eq!(campaign.company, "company-1");
        assert_eq!(repo.get(&campaign.id).unwrap(), Some(campaign));
    }

    #[test]
    fn approval_clears_previous_denial_reason() {
        let store = DocumentStore::in_memory().unwrap();
        let repo = CampaignRepository::new(&store);
        let campaign = repo.create(terms("Acme"), "company-1").unwrap();

        let denied = repo
            .set_status(&campaign.id, ApprovalStatus::Denied, Some("too risky".into()))
            .unwrap();
        assert_eq!(denied.denial_reason.as_deref(), Some("too risky"));

        let approved = repo
            .set_status(&campaign.id, ApprovalStatus::Approved, None)
            .unwrap();
        assert_eq!(approved.approval_status, ApprovalStatus::Approved);
        assert!(approved.denial_reason.is_none());
    }

    #[test]
    fn company_listing_filters_by_status() {
        let store = DocumentStore::in_memory().unwrap();
        let repo = CampaignRepository::new(&store);
        let a = repo.create(terms("A"), "c1").unwrap();
        std::thread::sleep(std::time::Duration::from_millis(2));
        let b = repo.create(terms("B"), "c1").unwrap();
        repo.create(terms("C"), "c2").unwrap();
        repo.set_status(&a.id, ApprovalStatus::Approved, None).unwrap();

        let all = repo.list_for_company("c1", None).unwrap();
        assert_eq!(all.iter().map(|c| &c.id).collect::<Vec<_>>(), vec![&b.id, &a.id]);

        let approved = repo
            .list_for_company("c1", Some(ApprovalStatus::Approved))
            .unwrap();
        assert_eq!(approved.len(), 1);
        assert_eq!(repo.list().unwrap().len(), 3);

        assert_eq!(repo.delete_for_companies(&["c1".to_string()]).unwrap(), 2);
        assert_eq!(repo.list().unwrap().len(), 1);
    }
}
