// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! WebAuthn passkey ceremonies for admins.
//!
//! Challenge generation and attestation/assertion verification are done by
//! `webauthn-rs`; this module only maps between its types and the
//! credential records embedded in [`StoredAdmin`].
//!
//! ## Ceremony State
//!
//! ```text
//! no challenge ──options──▶ challenge issued ──verify ok──▶ no challenge
//!                                  │
//!                                  └──options again──▶ challenge replaced
//! ```

use base64ct::{Base64UrlUnpadded, Encoding};
use chrono::Utc;
use uuid::Uuid;
use webauthn_rs::prelude::{
    AuthenticationResult, CreationChallengeResponse, CredentialID, PasskeyAuthentication,
    PasskeyRegistration, PublicKeyCredential, RegisterPublicKeyCredential,
    RequestChallengeResponse, Webauthn, WebauthnBuilder, WebauthnError,
};

use crate::config::WebAuthnConfig;
use crate::storage::{PasskeyCredential, StoredAdmin};

/// Relying-party side of the passkey ceremonies.
pub struct PasskeyService {
    webauthn: Webauthn,
}

impl PasskeyService {
    pub fn new(config: &WebAuthnConfig) -> Result<Self, WebauthnError> {
        let webauthn = WebauthnBuilder::new(&config.rp_id, &config.origin)?
            .rp_name(&config.rp_name)
            .build()?;
        Ok(Self { webauthn })
    }

    /// Start registering a new authenticator.
    ///
    /// Returns the options for the browser, the admin's stable user handle
    /// (to persist if it was just assigned) and the state to keep until
    /// verification. Already-registered credentials are excluded.
    pub fn start_registration(
        &self,
        admin: &StoredAdmin,
    ) -> Result<(CreationChallengeResponse, Uuid, PasskeyRegistration), WebauthnError> {
        let handle = user_handle(admin);
        let exclude: Vec<CredentialID> = admin
            .webauthn
            .credentials
            .iter()
            .map(|c| c.passkey.cred_id().clone())
            .collect();
        let exclude = (!exclude.is_empty()).then_some(exclude);

        let (options, state) =
            self.webauthn
                .start_passkey_registration(handle, &admin.email, &admin.email, exclude)?;
        Ok((options, handle, state))
    }

    /// Verify the browser's attestation and build the credential record.
    pub fn finish_registration(
        &self,
        response: &RegisterPublicKeyCredential,
        state: &PasskeyRegistration,
    ) -> Result<PasskeyCredential, WebauthnError> {
        let passkey = self.webauthn.finish_passkey_registration(response, state)?;

        let transports = response
            .response
            .transports
            .iter()
            .flatten()
            .filter_map(|t| serde_json::to_value(t).ok())
            .filter_map(|v| v.as_str().map(str::to_string))
            .collect();

        Ok(PasskeyCredential {
            credential_id: encode_credential_id(passkey.cred_id()),
            passkey,
            counter: 0,
            transports,
            device_type: None,
            backed_up: false,
            created_at: Utc::now(),
        })
    }

    /// Start an assertion against all of the admin's credentials.
    pub fn start_authentication(
        &self,
        admin: &StoredAdmin,
    ) -> Result<(RequestChallengeResponse, PasskeyAuthentication), WebauthnError> {
        let passkeys: Vec<_> = admin
            .webauthn
            .credentials
            .iter()
            .map(|c| c.passkey.clone())
            .collect();
        self.webauthn.start_passkey_authentication(&passkeys)
    }

    pub fn finish_authentication(
        &self,
        response: &PublicKeyCredential,
        state: &PasskeyAuthentication,
    ) -> Result<AuthenticationResult, WebauthnError> {
        self.webauthn.finish_passkey_authentication(response, state)
    }
}

/// Base64url (unpadded) form of a credential id, as browsers report it.
pub fn encode_credential_id(id: &CredentialID) -> String {
    let bytes: &[u8] = id.as_ref();
    Base64UrlUnpadded::encode_string(bytes)
}

/// Stable WebAuthn user handle: the stored one, else derived from the admin id.
fn user_handle(admin: &StoredAdmin) -> Uuid {
    admin
        .webauthn
        .user_handle
        .or_else(|| Uuid::parse_str(&admin.id).ok())
        .unwrap_or_else(Uuid::new_v4)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppConfig;
    use crate::storage::{PendingCeremony, WebAuthnProfile};

    fn service() -> PasskeyService {
        let config = AppConfig::for_tests();
        let webauthn = config.webauthn.as_ref().unwrap();
        PasskeyService::new(webauthn).unwrap()
    }

    fn admin() -> StoredAdmin {
        StoredAdmin {
            id: Uuid::new_v4().to_string(),
            email: "admin@example.com".to_string(),
            password_hash: "hash".to_string(),
            webauthn: WebAuthnProfile::default(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn registration_uses_admin_id_as_user_handle() {
        let admin = admin();
        let (options, handle, _state) = service().start_registration(&admin).unwrap();

        assert_eq!(handle.to_string(), admin.id);
        let json = serde_json::to_value(&options).unwrap();
        assert_eq!(json["publicKey"]["rp"]["id"], "localhost");
        assert_eq!(json["publicKey"]["user"]["name"], "admin@example.com");
    }

    #[test]
    fn stored_user_handle_wins() {
        let mut admin = admin();
        let fixed = Uuid::new_v4();
        admin.webauthn.user_handle = Some(fixed);

        let (_, handle, _) = service().start_registration(&admin).unwrap();
        assert_eq!(handle, fixed);
    }

    #[test]
    fn pending_state_survives_serialization() {
        let (_, _, state) = service().start_registration(&admin()).unwrap();
        let pending = PendingCeremony::Registration(state);

        let json = serde_json::to_string(&pending).unwrap();
        let restored: PendingCeremony = serde_json::from_str(&json).unwrap();
        assert!(matches!(restored, PendingCeremony::Registration(_)));
    }

    #[test]
    fn credential_ids_are_base64url_without_padding() {
        let id: CredentialID = vec![0xfb, 0xff, 0x01].into();
        assert_eq!(encode_credential_id(&id), "-_8B");
    }
}
