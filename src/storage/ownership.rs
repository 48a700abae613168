// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Ownership enforcement for user-scoped records.
//!
//! Companies are owned by the user who created them (admin-seeded companies
//! have no owner and therefore belong to nobody); notifications are owned
//! by their recipient. Every user-facing read or write of these records
//! passes through [`OwnershipEnforcer::verify_ownership`].

use crate::auth::AuthenticatedUser;

use super::{StoreError, StoreResult};

/// Trait for resources that may have an owning user.
pub trait OwnedResource {
    /// Name used in permission errors ("company", "notification").
    const RESOURCE: &'static str;

    /// The owning user's id, if any.
    fn owner_user_id(&self) -> Option<&str>;
}

/// Trait for enforcing ownership on storage operations.
pub trait OwnershipEnforcer {
    /// Verify that the user owns this resource.
    ///
    /// # Errors
    /// Returns `StoreError::PermissionDenied` if the resource has no owner or
    /// belongs to someone else.
    fn verify_ownership(&self, user: &AuthenticatedUser) -> StoreResult<()>;
}

impl<T: OwnedResource> OwnershipEnforcer for T {
    fn verify_ownership(&self, user: &AuthenticatedUser) -> StoreResult<()> {
        match self.owner_user_id() {
            Some(owner) if owner == user.id => Ok(()),
            _ => Err(StoreError::PermissionDenied {
                user_id: user.id.clone(),
                resource: T::RESOURCE,
            }),
        }
    }
}

/// Ownership check chained onto a lookup result.
pub trait OwnershipCheck<T> {
    /// Verify ownership and return the resource if authorized.
    fn verify_owner(self, user: &AuthenticatedUser) -> StoreResult<T>;
}

impl<T: OwnedResource> OwnershipCheck<T> for StoreResult<T> {
    fn verify_owner(self, user: &AuthenticatedUser) -> StoreResult<T> {
        let resource = self?;
        resource.verify_ownership(user)?;
        Ok(resource)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct TestResource {
        owner: Option<String>,
    }

    impl OwnedResource for TestResource {
        const RESOURCE: &'static str = "thing";

        fn owner_user_id(&self) -> Option<&str> {
            self.owner.as_deref()
        }
    }

    fn make_user(id: &str) -> AuthenticatedUser {
        AuthenticatedUser {
            id: id.to_string(),
            first_name: "Test".to_string(),
            last_name: "User".to_string(),
            email: format!("{id}@example.com"),
            phone_number: "555".to_string(),
            email_verified: true,
        }
    }

    #[test]
    fn ownership_verification_passes_for_owner() {
        let resource = TestResource {
            owner: Some("user_123".to_string()),
        };
        assert!(resource.verify_ownership(&make_user("user_123")).is_ok());
    }

    #[test]
    fn ownership_verification_fails_for_non_owner() {
        let resource = TestResource {
            owner: Some("user_123".to_string()),
        };
        let result = resource.verify_ownership(&make_user("user_456"));
        assert!(matches!(
            result,
            Err(StoreError::PermissionDenied { resource: "thing", .. })
        ));
    }

    #[test]
    fn unowned_resources_belong_to_nobody() {
        let resource = TestResource { owner: None };
        assert!(resource.verify_ownership(&make_user("user_123")).is_err());
    }

    #[test]
    fn ownership_check_on_result() {
        let user = make_user("user_123");

        let ok: StoreResult<TestResource> = Ok(TestResource {
            owner: Some("user_123".to_string()),
        });
        assert!(ok.verify_owner(&user).is_ok());

        let missing: StoreResult<TestResource> = Err(StoreError::NotFound("Thing".into()));
        assert!(matches!(missing.verify_owner(&user), Err(StoreError::NotFound(_))));
    }
}
