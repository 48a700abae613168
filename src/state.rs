// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use std::sync::Arc;
use std::time::Instant;

use crate::auth::{PasskeyService, TokenService};
use crate::config::AppConfig;
use crate::mail::{DisabledMailer, MailError, Mailer, SmtpMailer};
use crate::storage::DocumentStore;

#[derive(Debug, thiserror::Error)]
pub enum StateError {
    #[error("invalid WebAuthn configuration: {0}")]
    WebAuthn(#[from] webauthn_rs::prelude::WebauthnError),

    #[error("invalid mail configuration: {0}")]
    Mail(#[from] MailError),
}

/// Shared application state, cloned into every handler.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub store: Arc<DocumentStore>,
    pub tokens: TokenService,
    pub mailer: Arc<dyn Mailer>,
    /// `None` when the `WEBAUTHN_*` variables are not set
    pub passkeys: Option<Arc<PasskeyService>>,
    pub started_at: Instant,
}

impl AppState {
    /// Build state from configuration, choosing the SMTP or disabled mailer.
    pub fn from_config(config: AppConfig, store: DocumentStore) -> Result<Self, StateError> {
        let mailer: Arc<dyn Mailer> = match &config.mail {
            Some(mail) => Arc::new(SmtpMailer::new(mail)?),
            None => {
                tracing::warn!("EMAIL_* not set; verification emails cannot be sent");
                Arc::new(DisabledMailer)
            }
        };
        Self::with_mailer(config, store, mailer)
    }

    pub fn with_mailer(
        config: AppConfig,
        store: DocumentStore,
        mailer: Arc<dyn Mailer>,
    ) -> Result<Self, StateError> {
        let passkeys = match &config.webauthn {
            Some(webauthn) => Some(Arc::new(PasskeyService::new(webauthn)?)),
            None => {
                tracing::warn!("WEBAUTHN_RP_ID/WEBAUTHN_ORIGIN not set; passkey login disabled");
                None
            }
        };

        Ok(Self {
            tokens: TokenService::new(&config.jwt_secret),
            config: Arc::new(config),
            store: Arc::new(store),
            mailer,
            passkeys,
            started_at: Instant::now(),
        })
    }
}

#[cfg(test)]
impl AppState {
    /// In-memory store, test configuration and a recording mailer.
    pub fn for_tests() -> (Self, Arc<crate::mail::RecordingMailer>) {
        let mailer = Arc::new(crate::mail::RecordingMailer::default());
        let state = Self::with_mailer(
            AppConfig::for_tests(),
            DocumentStore::in_memory().unwrap(),
            mailer.clone(),
        )
        .unwrap();
        (state, mailer)
    }
}
