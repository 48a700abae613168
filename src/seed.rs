// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Seeding
//!
//! Operator tasks behind the `investhub-seed` binary:
//!
//! - [`seed_admin`] upserts the admin account from `ADMIN_EMAIL` /
//!   `ADMIN_PASSWORD`.
//! - [`seed_demo_data`] replaces the demo companies and their campaigns.
//!   Re-running it leaves exactly one copy of each.

use chrono::{DateTime, Duration, Utc};

use crate::auth::credentials::{hash_password, CredentialError};
use crate::config::AdminSeed;
use crate::models::ApprovalStatus;
use crate::storage::{
    AdminRepository, CampaignRepository, CompanyRepository, DocumentStore, NewCampaign, NewCompany,
    StoreError, StoredCampaign, StoredCompany,
};

#[derive(Debug, thiserror::Error)]
pub enum SeedError {
    #[error("ADMIN_EMAIL and ADMIN_PASSWORD must be set")]
    MissingAdminSeed,

    #[error("storage error: {0}")]
    Store(#[from] StoreError),

    #[error("password hashing failed: {0}")]
    Credentials(#[from] CredentialError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdminSeedOutcome {
    Created,
    Updated,
}

/// Create the admin, or reset the password of the existing one.
pub async fn seed_admin(store: &DocumentStore, seed: &AdminSeed) -> Result<AdminSeedOutcome, SeedError> {
    let repo = AdminRepository::new(store);
    let password_hash = hash_password(&seed.password).await?;

    match repo.find_by_email(&seed.email)? {
        Some(existing) => {
            repo.update(&existing.id, |admin| admin.password_hash = password_hash)?;
            tracing::info!(admin_id = %existing.id, email = %existing.email, "admin password updated");
            Ok(AdminSeedOutcome::Updated)
        }
        None => {
            let admin = repo.create(&seed.email, password_hash)?;
            tracing::info!(admin_id = %admin.id, email = %admin.email, "admin created");
            Ok(AdminSeedOutcome::Created)
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DemoSeedReport {
    pub removed_companies: usize,
    pub removed_campaigns: usize,
    pub companies: usize,
    pub campaigns: usize,
}

struct DemoCompany {
    name: &'static str,
    email: &'static str,
    phone: &'static str,
    website: &'static str,
    industry: &'static str,
    address: &'static str,
    city: &'static str,
    country: &'static str,
    status: ApprovalStatus,
}

struct DemoCampaign {
    company: &'static str,
    description: &'static str,
    duration: f64,
    hard_cap: f64,
    interest_rate: f64,
    max_investment: f64,
    min_investment: f64,
    payout_frequency: &'static str,
    soft_cap: f64,
    /// start, end and maturity as day offsets from now
    days: (i64, i64, i64),
    status: ApprovalStatus,
}

const DEMO_COMPANIES: [DemoCompany; 4] = [
    DemoCompany {
        name: "Acme Industries",
        email: "alice@acme.com",
        phone: "+1-555-0101",
        website: "https://acme.example",
        industry: "Manufacturing",
        address: "100 Foundry Road",
        city: "Pittsburgh",
        country: "United States",
        status: ApprovalStatus::Approved,
    },
    DemoCompany {
        name: "Beta Fintech",
        email: "bob@betafintech.io",
        phone: "+1-555-0202",
        website: "https://beta.example",
        industry: "Fintech",
        address: "22 Ledger Street",
        city: "New York",
        country: "United States",
        status: ApprovalStatus::Pending,
    },
    DemoCompany {
        name: "Cobalt Energy",
        email: "carol@cobalt.energy",
        phone: "+1-555-0303",
        website: "https://cobalt.example",
        industry: "Energy",
        address: "7 Sunfield Avenue",
        city: "Phoenix",
        country: "United States",
        status: ApprovalStatus::Approved,
    },
    DemoCompany {
        name: "Delta Health",
        email: "dan@deltahealth.ai",
        phone: "+1-555-0404",
        website: "https://delta.example",
        industry: "Healthcare",
        address: "415 Clinic Lane",
        city: "Boston",
        country: "United States",
        status: ApprovalStatus::Pending,
    },
];

const DEMO_CAMPAIGNS: [DemoCampaign; 5] = [
    DemoCampaign {
        company: "Acme Industries",
        description: "Robotics Series A",
        duration: 180.0,
        hard_cap: 1_000_000.0,
        interest_rate: 10.5,
        max_investment: 25_000.0,
        min_investment: 250.0,
        payout_frequency: "monthly",
        soft_cap: 400_000.0,
        days: (-7, 60, 365),
        status: ApprovalStatus::Approved,
    },
    DemoCampaign {
        company: "Acme Industries",
        description: "Automation Expansion",
        duration: 120.0,
        hard_cap: 750_000.0,
        interest_rate: 9.25,
        max_investment: 20_000.0,
        min_investment: 200.0,
        payout_frequency: "quarterly",
        soft_cap: 300_000.0,
        days: (1, 90, 455),
        status: ApprovalStatus::Pending,
    },
    DemoCampaign {
        company: "Beta Fintech",
        description: "SME Lending Pilot",
        duration: 90.0,
        hard_cap: 300_000.0,
        interest_rate: 12.0,
        max_investment: 10_000.0,
        min_investment: 100.0,
        payout_frequency: "monthly",
        soft_cap: 100_000.0,
        days: (3, 60, 365),
        status: ApprovalStatus::Pending,
    },
    DemoCampaign {
        company: "Cobalt Energy",
        description: "Solar Farm Buildout",
        duration: 240.0,
        hard_cap: 2_000_000.0,
        interest_rate: 8.75,
        max_investment: 50_000.0,
        min_investment: 500.0,
        payout_frequency: "semi-annual",
        soft_cap: 800_000.0,
        days: (-14, 120, 730),
        status: ApprovalStatus::Approved,
    },
    DemoCampaign {
        company: "Delta Health",
        description: "Diagnostics Platform Beta",
        duration: 150.0,
        hard_cap: 600_000.0,
        interest_rate: 11.0,
        max_investment: 15_000.0,
        min_investment: 150.0,
        payout_frequency: "monthly",
        soft_cap: 250_000.0,
        days: (5, 100, 515),
        status: ApprovalStatus::Pending,
    },
];

/// Names of the companies managed by [`seed_demo_data`].
pub fn demo_company_names() -> Vec<&'static str> {
    DEMO_COMPANIES.iter().map(|c| c.name).collect()
}

fn demo_companies() -> Vec<StoredCompany> {
    DEMO_COMPANIES
        .iter()
        .map(|demo| {
            let mut company = NewCompany {
                company_name: demo.name.to_string(),
                registration_number: None,
                email: demo.email.to_string(),
                phone: demo.phone.to_string(),
                website: Some(demo.website.to_string()),
                industry: demo.industry.to_string(),
                address: demo.address.to_string(),
                city: demo.city.to_string(),
                country: demo.country.to_string(),
            }
            .into_record(None);
            company.set_status(demo.status, None);
            company
        })
        .collect()
}

fn demo_campaigns(companies: &[StoredCompany], now: DateTime<Utc>) -> Vec<StoredCampaign> {
    DEMO_CAMPAIGNS
        .iter()
        .filter_map(|demo| {
            let company = companies.iter().find(|c| c.company_name == demo.company)?;
            let (start, end, maturity) = demo.days;
            let mut campaign = NewCampaign {
                company_name: company.company_name.clone(),
                description: demo.description.to_string(),
                duration: demo.duration,
                hard_cap: demo.hard_cap,
                interest_rate: demo.interest_rate,
                max_investment: demo.max_investment,
                min_investment: demo.min_investment,
                payout_frequency: demo.payout_frequency.to_string(),
                soft_cap: demo.soft_cap,
                campaign_start_time: now + Duration::days(start),
                campaign_end_time: now + Duration::days(end),
                maturity_date: now + Duration::days(maturity),
            }
            .into_record(&company.id);
            campaign.approval_status = demo.status;
            Some(campaign)
        })
        .collect()
}

/// Replace the demo companies and campaigns. Campaign dates are offsets
/// from `now`.
pub fn seed_demo_data(store: &DocumentStore, now: DateTime<Utc>) -> Result<DemoSeedReport, SeedError> {
    let companies = CompanyRepository::new(store);
    let campaigns = CampaignRepository::new(store);

    let existing: Vec<String> = companies
        .find_by_names(&demo_company_names())?
        .into_iter()
        .map(|c| c.id)
        .collect();
    let removed_campaigns = campaigns.delete_for_companies(&existing)?;
    let removed_companies = companies.delete_by_ids(&existing)?;

    let new_companies = demo_companies();
    let new_campaigns = demo_campaigns(&new_companies, now);
    let report = DemoSeedReport {
        removed_companies,
        removed_campaigns,
        companies: companies.insert_many(&new_companies)?,
        campaigns: campaigns.insert_many(&new_campaigns)?,
    };

    tracing::info!(
        removed_companies,
        removed_campaigns,
        companies = report.companies,
        campaigns = report.campaigns,
        "demo data seeded"
    );
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::credentials::verify_password;

    fn seed(password: &str) -> AdminSeed {
        AdminSeed {
            email: "Admin@InvestHub.test".to_string(),
            password: password.to_string(),
        }
    }

    #[tokio::test]
    async fn admin_seed_creates_then_rehashes() {
        let store = DocumentStore::in_memory().unwrap();

        assert_eq!(seed_admin(&store, &seed("first")).await.unwrap(), AdminSeedOutcome::Created);
        assert_eq!(seed_admin(&store, &seed("second")).await.unwrap(), AdminSeedOutcome::Updated);

        let admin = AdminRepository::new(&store)
            .find_by_email("admin@investhub.test")
            .unwrap()
            .unwrap();
        assert!(verify_password("second", &admin.password_hash).await.unwrap());
        assert!(!verify_password("first", &admin.password_hash).await.unwrap());
    }

    #[test]
    fn demo_seed_inserts_expected_records() {
        let store = DocumentStore::in_memory().unwrap();
        let now = Utc::now();

        let report = seed_demo_data(&store, now).unwrap();
        assert_eq!(report.companies, 4);
        assert_eq!(report.campaigns, 5);
        assert_eq!(report.removed_companies, 0);

        let companies = CompanyRepository::new(&store);
        assert_eq!(companies.list(Some(ApprovalStatus::Approved)).unwrap().len(), 2);
        assert_eq!(companies.list(Some(ApprovalStatus::Pending)).unwrap().len(), 2);
        assert!(companies.list(None).unwrap().iter().all(|c| c.owner.is_none()));

        let acme = companies.find_by_names(&["Acme Industries"]).unwrap().remove(0);
        assert!(acme.approved);
        let acme_campaigns = CampaignRepository::new(&store)
            .list_for_company(&acme.id, None)
            .unwrap();
        assert_eq!(acme_campaigns.len(), 2);

        let robotics = acme_campaigns
            .iter()
            .find(|c| c.description == "Robotics Series A")
            .unwrap();
        assert_eq!(robotics.approval_status, ApprovalStatus::Approved);
        assert_eq!(robotics.campaign_start_time, now - Duration::days(7));
        assert_eq!(robotics.maturity_date, now + Duration::days(365));
    }

    #[test]
    fn demo_seed_is_idempotent_and_leaves_other_data() {
        let store = DocumentStore::in_memory().unwrap();
        let companies = CompanyRepository::new(&store);
        let other = companies
            .create(crate::storage::repository::companies::tests::sample("Other Co"), None)
            .unwrap();

        seed_demo_data(&store, Utc::now()).unwrap();
        let rerun = seed_demo_data(&store, Utc::now()).unwrap();
        assert_eq!(rerun.removed_companies, 4);
        assert_eq!(rerun.removed_campaigns, 5);

        assert_eq!(companies.list(None).unwrap().len(), 5);
        assert_eq!(CampaignRepository::new(&store).list().unwrap().len(), 5);
        assert!(companies.get(&other.id).unwrap().is_some());
    }
}
