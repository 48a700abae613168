// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Notification repository (per-user inbox).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::models::{new_id, NotificationType};

use super::super::database::NOTIFICATIONS;
use super::super::{DocumentStore, OwnedResource, StoreError, StoreResult};

/// Default page size for inbox listings.
pub const DEFAULT_PAGE_LIMIT: u64 = 20;

/// Structured payload attached to campaign notifications.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct NotificationData {
    pub campaign_id: String,
    pub company_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct StoredNotification {
    pub id: String,
    /// Recipient user id
    pub user: String,
    #[serde(rename = "type")]
    pub kind: NotificationType,
    pub title: String,
    pub message: String,
    pub data: Option<NotificationData>,
    pub read: bool,
    pub read_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl OwnedResource for StoredNotification {
    const RESOURCE: &'static str = "notification";

    fn owner_user_id(&self) -> Option<&str> {
        Some(&self.user)
    }
}

/// One page of a user's inbox.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct NotificationPage {
    /// Total notifications for the user (all pages)
    pub total: u64,
    pub page: u64,
    pub limit: u64,
    pub items: Vec<StoredNotification>,
}

pub struct NotificationRepository<'a> {
    store: &'a DocumentStore,
}

impl<'a> NotificationRepository<'a> {
    pub fn new(store: &'a DocumentStore) -> Self {
        Self { store }
    }

    pub fn create(
        &self,
        user_id: &str,
        kind: NotificationType,
        message: String,
        data: Option<NotificationData>,
    ) -> StoreResult<StoredNotification> {
        let now = Utc::now();
        let notification = StoredNotification {
            id: new_id(),
            user: user_id.to_string(),
            kind,
            title: kind.title().to_string(),
            message,
            data,
            read: false,
            read_at: None,
            created_at: now,
            updated_at: now,
        };
        self.store
            .insert(NOTIFICATIONS, &notification.id, &notification, &[])?;
        Ok(notification)
    }

    pub fn get(&self, notification_id: &str) -> StoreResult<Option<StoredNotification>> {
        self.store.get(NOTIFICATIONS, notification_id)
    }

    /// List a user's notifications newest first.
    ///
    /// `page` is 1-based; both `page` and `limit` are floored to 1.
    pub fn list_for_user(&self, user_id: &str, page: u64, limit: u64) -> StoreResult<NotificationPage> {
        let page = page.max(1);
        let limit = limit.max(1);

        let mut all: Vec<StoredNotification> = self
            .store
            .find(NOTIFICATIONS, |n: &StoredNotification| n.user == user_id)?;
        all.sort_by(|a, b| b.created_at.cmp(&a.created_at));

        let total = all.len() as u64;
        let skip = usize::try_from((page - 1).saturating_mul(limit)).unwrap_or(usize::MAX);
        let take = usize::try_from(limit).unwrap_or(usize::MAX);
        let items = all.into_iter().skip(skip).take(take).collect();

        Ok(NotificationPage {
            total,
            page,
            limit,
            items,
        })
    }

    /// Mark a notification read and stamp `readAt`.
    pub fn mark_read(&self, notification_id: &str) -> StoreResult<StoredNotification> {
        self.store
            .update(NOTIFICATIONS, notification_id, |n: &mut StoredNotification| {
                let now = Utc::now();
                n.read = true;
                n.read_at = Some(now);
                n.updated_at = now;
            })?
            .ok_or_else(|| StoreError::NotFound("Notification".to_string()))
    }
}
