// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Notification outbox.
//!
//! Notifications are side effects of campaign workflow transitions. Delivery
//! is best effort and at most once: a failure is reported as
//! [`Delivery::Failed`], logged by the caller, and never undoes or fails the
//! transition that triggered it.

use crate::models::NotificationType;
use crate::storage::{DocumentStore, NotificationData, NotificationRepository, StoredCampaign};

/// Outcome of a best-effort notification.
#[must_use = "log the delivery outcome"]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Delivery {
    /// Stored in the recipient's inbox (notification id)
    Delivered(String),
    /// Nobody to notify (e.g. company has no owner)
    Skipped,
    /// Storing failed; the error is kept for logging only
    Failed(String),
}

impl Delivery {
    /// Log failures at `warn` and drop the outcome.
    pub fn log(self, campaign_id: &str) {
        match self {
            Delivery::Delivered(id) => {
                tracing::debug!(campaign_id = %campaign_id, notification_id = %id, "notification delivered")
            }
            Delivery::Skipped => {
                tracing::debug!(campaign_id = %campaign_id, "no recipient for notification")
            }
            Delivery::Failed(error) => {
                tracing::warn!(campaign_id = %campaign_id, error = %error, "notification dropped")
            }
        }
    }
}

pub struct NotificationOutbox<'a> {
    repo: NotificationRepository<'a>,
}

impl<'a> NotificationOutbox<'a> {
    pub fn new(store: &'a DocumentStore) -> Self {
        Self {
            repo: NotificationRepository::new(store),
        }
    }

    /// Tell the submitting user their campaign is under review.
    pub fn campaign_submitted(&self, user_id: &str, campaign: &StoredCampaign) -> Delivery {
        self.deliver(
            Some(user_id),
            NotificationType::CampaignSubmitted,
            format!(
                "Your campaign for {} has been submitted for review.",
                campaign.company_name
            ),
            campaign,
        )
    }

    pub fn campaign_approved(&self, owner: Option<&str>, campaign: &StoredCampaign) -> Delivery {
        self.deliver(
            owner,
            NotificationType::CampaignApproved,
            format!("Your campaign for {} has been approved.", campaign.company_name),
            campaign,
        )
    }

    /// The reviewer's denial message is the notification text.
    pub fn campaign_denied(
        &self,
        owner: Option<&str>,
        campaign: &StoredCampaign,
        message: &str,
    ) -> Delivery {
        self.deliver(
            owner,
            NotificationType::CampaignDenied,
            message.to_string(),
            campaign,
        )
    }

    fn deliver(
        &self,
        recipient: Option<&str>,
        kind: NotificationType,
        message: String,
        campaign: &StoredCampaign,
    ) -> Delivery {
        let Some(user_id) = recipient else {
            return Delivery::Skipped;
        };
        let data = NotificationData {
            campaign_id: campaign.id.clone(),
            company_id: campaign.company.clone(),
        };
        match self.repo.create(user_id, kind, message, Some(data)) {
            Ok(notification) => Delivery::Delivered(notification.id),
            Err(e) => Delivery::Failed(e.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::repository::campaigns::tests::terms;
    use crate::storage::CampaignRepository;

    #[test]
    fn approved_notification_targets_owner_with_campaign_data() {
        let store = DocumentStore::in_memory().unwrap();
        let campaign = CampaignRepository::new(&store)
            .create(terms("Acme"), "company-1")
            .unwrap();

        let outbox = NotificationOutbox::new(&store);
        let Delivery::Delivered(id) = outbox.campaign_approved(Some("owner-1"), &campaign) else {
            panic!("expected delivery");
        };

        let stored = NotificationRepository::new(&store).get(&id).unwrap().unwrap();
        assert_eq!(stored.user, "owner-1");
        assert_eq!(stored.kind, NotificationType::CampaignApproved);
        assert_eq!(stored.message, "Your campaign for Acme has been approved.");
        let data = stored.data.unwrap();
        assert_eq!(data.campaign_id, campaign.id);
        assert_eq!(data.company_id, "company-1");
    }

    #[test]
    fn missing_owner_is_skipped() {
        let store = DocumentStore::in_memory().unwrap();
        let campaign = CampaignRepository::new(&store)
            .create(terms("Acme"), "company-1")
            .unwrap();

        let outbox = NotificationOutbox::new(&store);
        assert_eq!(outbox.campaign_denied(None, &campaign, "no"), Delivery::Skipped);
    }

    #[test]
    fn denial_uses_reviewer_message() {
        let store = DocumentStore::in_memory().unwrap();
        let campaign = CampaignRepository::new(&store)
            .create(terms("Acme"), "company-1")
            .unwrap();

        let outbox = NotificationOutbox::new(&store);
        let Delivery::Delivered(id) = outbox.campaign_denied(Some("u1"), &campaign, "Soft cap too low")
        else {
            panic!("expected delivery");
        };
        let stored = NotificationRepository::new(&store).get(&id).unwrap().unwrap();
        assert_eq!(stored.title, "Campaign Denied");
        assert_eq!(stored.message, "Soft cap too low");
    }
}
