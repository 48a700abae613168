// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Approval Workflow
//!
//! The pending / approved / denied policy shared by companies (KYC) and
//! campaigns: who may trigger each transition and which notification
//! follows it.
//!
//! | Entity   | Transition             | Actor                         | Notification                 |
//! |----------|------------------------|-------------------------------|------------------------------|
//! | Company  | any → approved         | admin                         | none                         |
//! | Company  | any → denied (reason)  | admin                         | none                         |
//! | Company  | any → any              | owning user (KYC result)      | none                         |
//! | Campaign | create → pending       | owner of an approved company  | `campaign_submitted` to user |
//! | Campaign | create → pending       | admin                         | none                         |
//! | Campaign | any → approved         | admin                         | `campaign_approved` to owner |
//! | Campaign | any → denied (reason)  | admin                         | `campaign_denied` to owner   |
//!
//! Each transition is a single-document update; concurrent transitions on
//! the same record are last-write-wins. Notifications are written after the
//! transition commits and are never rolled back together with it.

use crate::auth::AuthenticatedUser;
use crate::error::ApiError;
use crate::models::ApprovalStatus;
use crate::notifications::{Delivery, NotificationOutbox};
use crate::storage::{
    CampaignRepository, CompanyRepository, DocumentStore, NewCampaign, OwnershipCheck,
    StoreError, StoredCampaign, StoredCompany,
};

#[derive(Debug, thiserror::Error)]
pub enum WorkflowError {
    #[error("Denial message is required")]
    MissingDenialReason,

    #[error("denialReason is required when status is denied")]
    MissingKycDenialReason,

    #[error("Company KYC not approved. You cannot create campaigns yet.")]
    KycNotApproved,

    #[error("KYC approval must be performed by an administrator")]
    SelfApprovalDisabled,

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl From<WorkflowError> for ApiError {
    fn from(err: WorkflowError) -> Self {
        match err {
            WorkflowError::MissingDenialReason | WorkflowError::MissingKycDenialReason => {
                ApiError::bad_request(err.to_string())
            }
            WorkflowError::KycNotApproved | WorkflowError::SelfApprovalDisabled => {
                ApiError::forbidden(err.to_string())
            }
            WorkflowError::Store(e) => e.into(),
        }
    }
}

pub type WorkflowResult<T> = Result<T, WorkflowError>;

/// A reason is usable only if it has non-whitespace content. Usable
/// reasons are kept exactly as sent.
fn require_reason(reason: Option<&str>) -> Option<String> {
    reason
        .filter(|r| !r.trim().is_empty())
        .map(str::to_string)
}

pub struct ApprovalWorkflow<'a> {
    companies: CompanyRepository<'a>,
    campaigns: CampaignRepository<'a>,
    outbox: NotificationOutbox<'a>,
}

impl<'a> ApprovalWorkflow<'a> {
    pub fn new(store: &'a DocumentStore) -> Self {
        Self {
            companies: CompanyRepository::new(store),
            campaigns: CampaignRepository::new(store),
            outbox: NotificationOutbox::new(store),
        }
    }

    // =========================================================================
    // Company KYC
    // =========================================================================

    /// Admin approval. Clears any earlier denial reason.
    pub fn approve_company(&self, company_id: &str) -> WorkflowResult<StoredCompany> {
        let company = self
            .companies
            .set_status(company_id, ApprovalStatus::Approved, None)?;
        tracing::info!(company_id = %company_id, "company approved");
        Ok(company)
    }

    /// Admin denial; the reason is mandatory and stored verbatim.
    pub fn deny_company(&self, company_id: &str, reason: Option<&str>) -> WorkflowResult<StoredCompany> {
        let reason = require_reason(reason).ok_or(WorkflowError::MissingDenialReason)?;
        let company = self
            .companies
            .set_status(company_id, ApprovalStatus::Denied, Some(reason))?;
        tracing::info!(company_id = %company_id, "company denied");
        Ok(company)
    }

    /// KYC provider result reported by the owning user.
    ///
    /// Any status may be set. Setting `approved` bypasses admin review, so it
    /// is logged and can be switched off with `allow_self_approval = false`.
    pub fn report_kyc_result(
        &self,
        user: &AuthenticatedUser,
        company_id: &str,
        status: ApprovalStatus,
        denial_reason: Option<&str>,
        allow_self_approval: bool,
    ) -> WorkflowResult<StoredCompany> {
        self.companies.require(company_id).verify_owner(user)?;

        let reason = match status {
            ApprovalStatus::Denied => {
                Some(require_reason(denial_reason).ok_or(WorkflowError::MissingKycDenialReason)?)
            }
            _ => None,
        };

        if status == ApprovalStatus::Approved {
            if !allow_self_approval {
                return Err(WorkflowError::SelfApprovalDisabled);
            }
            tracing::warn!(
                company_id = %company_id,
                user_id = %user.id,
                "company KYC approved by its owner without admin review"
            );
        }

        Ok(self.companies.set_status(company_id, status, reason)?)
    }

    // =========================================================================
    // Campaigns
    // =========================================================================

    /// Check that `user` may submit campaigns for `company_id`.
    ///
    /// The company must exist (404), be owned by the user (403) and have
    /// passed KYC (403).
    pub fn authorize_submission(
        &self,
        user: &AuthenticatedUser,
        company_id: &str,
    ) -> WorkflowResult<StoredCompany> {
        let company = self.companies.require(company_id).verify_owner(user)?;
        if company.approval_status != ApprovalStatus::Approved {
            return Err(WorkflowError::KycNotApproved);
        }
        Ok(company)
    }

    /// Create a pending campaign for an authorized company and notify the
    /// submitter.
    pub fn submit_campaign(
        &self,
        user: &AuthenticatedUser,
        company: &StoredCompany,
        terms: NewCampaign,
    ) -> WorkflowResult<StoredCampaign> {
        let campaign = self.campaigns.create(with_company_name(terms, company), &company.id)?;
        tracing::info!(campaign_id = %campaign.id, company_id = %company.id, "campaign submitted");

        self.outbox
            .campaign_submitted(&user.id, &campaign)
            .log(&campaign.id);
        Ok(campaign)
    }

    /// Admin-created campaign: no ownership or KYC gate, no notification.
    pub fn create_campaign_as_admin(
        &self,
        company_id: &str,
        terms: NewCampaign,
    ) -> WorkflowResult<StoredCampaign> {
        let company = self.companies.require(company_id)?;
        let campaign = self.campaigns.create(with_company_name(terms, &company), &company.id)?;
        tracing::info!(campaign_id = %campaign.id, company_id = %company.id, "campaign created by admin");
        Ok(campaign)
    }

    pub fn approve_campaign(&self, campaign_id: &str) -> WorkflowResult<StoredCampaign> {
        let campaign = self
            .campaigns
            .set_status(campaign_id, ApprovalStatus::Approved, None)?;
        tracing::info!(campaign_id = %campaign_id, "campaign approved");

        let owner = self.owner_of(&campaign);
        self.outbox
            .campaign_approved(owner.as_deref(), &campaign)
            .log(&campaign.id);
        Ok(campaign)
    }

    pub fn deny_campaign(&self, campaign_id: &str, reason: Option<&str>) -> WorkflowResult<StoredCampaign> {
        let reason = require_reason(reason).ok_or(WorkflowError::MissingDenialReason)?;
        let campaign = self
            .campaigns
            .set_status(campaign_id, ApprovalStatus::Denied, Some(reason.clone()))?;
        tracing::info!(campaign_id = %campaign_id, "campaign denied");

        let owner = self.owner_of(&campaign);
        self.outbox
            .campaign_denied(owner.as_deref(), &campaign, &reason)
            .log(&campaign.id);
        Ok(campaign)
    }

    /// Owner of the campaign's company; lookup failures count as "no owner".
    fn owner_of(&self, campaign: &StoredCampaign) -> Option<String> {
        match self.companies.get(&campaign.company) {
            Ok(company) => company.and_then(|c| c.owner),
            Err(e) => {
                Delivery::Failed(e.to_string()).log(&campaign.id);
                None
            }
        }
    }
}

fn with_company_name(mut terms: NewCampaign, company: &StoredCompany) -> NewCampaign {
    if terms.company_name.trim().is_empty() {
        terms.company_name = company.company_name.clone();
    }
    terms
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::NotificationType;
    use crate::storage::repository::campaigns::tests::terms;
    use crate::storage::repository::companies::tests::sample;
    use crate::storage::NotificationRepository;

    fn user(id: &str) -> AuthenticatedUser {
        AuthenticatedUser {
            id: id.to_string(),
            first_name: "Ada".to_string(),
            last_name: "Lovelace".to_string(),
            email: format!("{id}@example.com"),
            phone_number: "555".to_string(),
            email_verified: true,
        }
    }

    fn owned_company(store: &DocumentStore, owner: &str, status: ApprovalStatus) -> StoredCompany {
        let repo = CompanyRepository::new(store);
        let company = repo.create(sample("Acme"), Some(owner.to_string())).unwrap();
        repo.set_status(&company.id, status, Some("r".into())).unwrap()
    }

    #[test]
    fn deny_requires_reason_and_approve_clears_it() {
        let store = DocumentStore::in_memory().unwrap();
        let company = CompanyRepository::new(&store).create(sample("Acme"), None).unwrap();
        let workflow = ApprovalWorkflow::new(&store);

        assert!(matches!(
            workflow.deny_company(&company.id, None),
            Err(WorkflowError::MissingDenialReason)
        ));
        assert!(matches!(
            workflow.deny_company(&company.id, Some("   ")),
            Err(WorkflowError::MissingDenialReason)
        ));

        let denied = workflow.deny_company(&company.id, Some("Missing docs")).unwrap();
        assert_eq!(denied.denial_reason.as_deref(), Some("Missing docs"));
        assert!(!denied.approved);

        let approved = workflow.approve_company(&company.id).unwrap();
        assert!(approved.approved);
        assert_eq!(approved.denial_reason, None);
    }

    #[test]
    fn unknown_company_is_not_found() {
        let store = DocumentStore::in_memory().unwrap();
        let workflow = ApprovalWorkflow::new(&store);
        let err = workflow.approve_company("missing").unwrap_err();
        assert!(matches!(err, WorkflowError::Store(StoreError::NotFound(_))));
    }

    #[test]
    fn denial_reasons_are_stored_byte_for_byte() {
        let store = DocumentStore::in_memory().unwrap();
        let workflow = ApprovalWorkflow::new(&store);
        let reason = "  Missing docs\n";

        let company = owned_company(&store, "owner", ApprovalStatus::Approved);
        let denied = workflow.deny_company(&company.id, Some(reason)).unwrap();
        assert_eq!(denied.denial_reason.as_deref(), Some(reason));

        let campaign = workflow
            .create_campaign_as_admin(&company.id, terms("Acme"))
            .unwrap();
        let denied = workflow.deny_campaign(&campaign.id, Some(reason)).unwrap();
        assert_eq!(denied.denial_reason.as_deref(), Some(reason));

        let inbox = NotificationRepository::new(&store)
            .list_for_user("owner", 1, 20)
            .unwrap();
        assert_eq!(inbox.items[0].kind, NotificationType::CampaignDenied);
        assert_eq!(inbox.items[0].message, reason);

        let reported = workflow
            .report_kyc_result(&user("owner"), &company.id, ApprovalStatus::Denied, Some(reason), true)
            .unwrap();
        assert_eq!(reported.denial_reason.as_deref(), Some(reason));
    }

    #[test]
    fn kyc_result_is_owner_only() {
        let store = DocumentStore::in_memory().unwrap();
        let company = owned_company(&store, "u1", ApprovalStatus::Pending);
        let workflow = ApprovalWorkflow::new(&store);

        let err = workflow
            .report_kyc_result(&user("u2"), &company.id, ApprovalStatus::Approved, None, true)
            .unwrap_err();
        assert!(matches!(err, WorkflowError::Store(StoreError::PermissionDenied { .. })));

        let approved = workflow
            .report_kyc_result(&user("u1"), &company.id, ApprovalStatus::Approved, None, true)
            .unwrap();
        assert!(approved.approved);
    }

    #[test]
    fn kyc_denial_needs_reason_and_self_approval_can_be_disabled() {
        let store = DocumentStore::in_memory().unwrap();
        let company = owned_company(&store, "u1", ApprovalStatus::Pending);
        let workflow = ApprovalWorkflow::new(&store);
        let owner = user("u1");

        assert!(matches!(
            workflow.report_kyc_result(&owner, &company.id, ApprovalStatus::Denied, None, true),
            Err(WorkflowError::MissingKycDenialReason)
        ));
        let denied = workflow
            .report_kyc_result(&owner, &company.id, ApprovalStatus::Denied, Some("ID expired"), true)
            .unwrap();
        assert_eq!(denied.denial_reason.as_deref(), Some("ID expired"));

        assert!(matches!(
            workflow.report_kyc_result(&owner, &company.id, ApprovalStatus::Approved, None, false),
            Err(WorkflowError::SelfApprovalDisabled)
        ));
        let pending = workflow
            .report_kyc_result(&owner, &company.id, ApprovalStatus::Pending, None, false)
            .unwrap();
        assert_eq!(pending.approval_status, ApprovalStatus::Pending);
        assert_eq!(pending.denial_reason, None);
    }

    #[test]
    fn submission_requires_owned_approved_company() {
        let store = DocumentStore::in_memory().unwrap();
        let workflow = ApprovalWorkflow::new(&store);
        let owner = user("u1");

        let pending = owned_company(&store, "u1", ApprovalStatus::Pending);
        assert!(matches!(
            workflow.authorize_submission(&owner, &pending.id),
            Err(WorkflowError::KycNotApproved)
        ));

        let approved = owned_company(&store, "u1", ApprovalStatus::Approved);
        assert!(matches!(
            workflow.authorize_submission(&user("u2"), &approved.id),
            Err(WorkflowError::Store(StoreError::PermissionDenied { .. }))
        ));
        assert!(matches!(
            workflow.authorize_submission(&owner, "missing"),
            Err(WorkflowError::Store(StoreError::NotFound(_)))
        ));

        let unowned = CompanyRepository::new(&store).create(sample("Seeded"), None).unwrap();
        assert!(workflow.authorize_submission(&owner, &unowned.id).is_err());

        assert!(CampaignRepository::new(&store).list().unwrap().is_empty());
    }

    #[test]
    fn submission_notifies_submitter_and_defaults_company_name() {
        let store = DocumentStore::in_memory().unwrap();
        let workflow = ApprovalWorkflow::new(&store);
        let owner = user("u1");
        let company = owned_company(&store, "u1", ApprovalStatus::Approved);

        let company = workflow.authorize_submission(&owner, &company.id).unwrap();
        let campaign = workflow.submit_campaign(&owner, &company, terms("  ")).unwrap();
        assert_eq!(campaign.company_name, "Acme");
        assert_eq!(campaign.approval_status, ApprovalStatus::Pending);

        let inbox = NotificationRepository::new(&store).list_for_user("u1", 1, 20).unwrap();
        assert_eq!(inbox.total, 1);
        assert_eq!(inbox.items[0].kind, NotificationType::CampaignSubmitted);
        assert_eq!(
            inbox.items[0].message,
            "Your campaign for Acme has been submitted for review."
        );
    }

    #[test]
    fn campaign_review_notifies_company_owner() {
        let store = DocumentStore::in_memory().unwrap();
        let workflow = ApprovalWorkflow::new(&store);
        let company = owned_company(&store, "owner", ApprovalStatus::Approved);
        let campaign = workflow
            .create_campaign_as_admin(&company.id, terms("Acme"))
            .unwrap();

        assert!(matches!(
            workflow.deny_campaign(&campaign.id, Some("")),
            Err(WorkflowError::MissingDenialReason)
        ));

        let denied = workflow.deny_campaign(&campaign.id, Some("Too risky")).unwrap();
        assert_eq!(denied.denial_reason.as_deref(), Some("Too risky"));

        let approved = workflow.approve_campaign(&campaign.id).unwrap();
        assert_eq!(approved.approval_status, ApprovalStatus::Approved);
        assert_eq!(approved.denial_reason, None);

        let inbox = NotificationRepository::new(&store)
            .list_for_user("owner", 1, 20)
            .unwrap();
        assert_eq!(inbox.total, 2);
        assert_eq!(inbox.items[0].kind, NotificationType::CampaignApproved);
        assert_eq!(inbox.items[0].data.as_ref().unwrap().campaign_id, campaign.id);
        assert_eq!(inbox.items[1].kind, NotificationType::CampaignDenied);
        assert_eq!(inbox.items[1].message, "Too risky");
    }

    #[test]
    fn unowned_company_campaign_review_sends_nothing() {
        let store = DocumentStore::in_memory().unwrap();
        let workflow = ApprovalWorkflow::new(&store);
        let company = CompanyRepository::new(&store).create(sample("Seeded"), None).unwrap();
        let campaign = workflow
            .create_campaign_as_admin(&company.id, terms("Seeded"))
            .unwrap();

        workflow.approve_campaign(&campaign.id).unwrap();
        let count = store
            .count(crate::storage::database::NOTIFICATIONS, |_: &serde_json::Value| true)
            .unwrap();
        assert_eq!(count, 0);
    }
}
