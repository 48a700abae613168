// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Outbound email.
//!
//! Handlers depend on the [`Mailer`] trait only. Production uses
//! [`SmtpMailer`]; when the `EMAIL_*` variables are absent the server runs
//! with [`DisabledMailer`], which fails every send so the caller reports it.

use async_trait::async_trait;
use lettre::{
    message::header::ContentType, transport::smtp::authentication::Credentials,
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
};

use crate::config::MailConfig;

pub const VERIFICATION_SUBJECT: &str = "Email Verification - InvestHub";

/// Port on which SMTP is spoken over implicit TLS rather than STARTTLS.
const IMPLICIT_TLS_PORT: u16 = 465;

#[derive(Debug, thiserror::Error)]
pub enum MailError {
    #[error(
        "Email configuration missing. Please set EMAIL_HOST, EMAIL_PORT, EMAIL_USER, EMAIL_PASS, and EMAIL_FROM environment variables."
    )]
    NotConfigured,

    #[error("invalid address: {0}")]
    Address(#[from] lettre::address::AddressError),

    #[error("failed to build message: {0}")]
    Build(#[from] lettre::error::Error),

    #[error("SMTP error: {0}")]
    Smtp(#[from] lettre::transport::smtp::Error),
}

#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send_html(&self, to: &str, subject: &str, html: String) -> Result<(), MailError>;
}

/// SMTP transport built from [`MailConfig`].
pub struct SmtpMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: String,
}

impl SmtpMailer {
    pub fn new(config: &MailConfig) -> Result<Self, MailError> {
        let builder = if config.port == IMPLICIT_TLS_PORT {
            AsyncSmtpTransport::<Tokio1Executor>::relay(&config.host)?
        } else {
            AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.host)?
        };
        let transport = builder
            .port(config.port)
            .credentials(Credentials::new(
                config.username.clone(),
                config.password.clone(),
            ))
            .build();

        Ok(Self {
            transport,
            from: config.from.clone(),
        })
    }
}

#[async_trait]
impl Mailer for SmtpMailer {
    async fn send_html(&self, to: &str, subject: &str, html: String) -> Result<(), MailError> {
        let message = Message::builder()
            .from(self.from.parse()?)
            .to(to.parse()?)
            .subject(subject)
            .header(ContentType::TEXT_HTML)
            .body(html)?;

        let response = self.transport.send(message).await?;
        tracing::info!(
            to = %to,
            code = %response.code(),
            "email sent"
        );
        Ok(())
    }
}

/// Mailer used when no SMTP settings are configured.
pub struct DisabledMailer;

#[async_trait]
impl Mailer for DisabledMailer {
    async fn send_html(&self, _to: &str, _subject: &str, _html: String) -> Result<(), MailError> {
        Err(MailError::NotConfigured)
    }
}

/// Send the 6-digit verification code to a newly registered user.
pub async fn send_verification_email(
    mailer: &dyn Mailer,
    to: &str,
    first_name: &str,
    code: &str,
) -> Result<(), MailError> {
    mailer
        .send_html(to, VERIFICATION_SUBJECT, verification_html(first_name, code))
        .await
}

fn verification_html(first_name: &str, code: &str) -> String {
    let name = if first_name.trim().is_empty() {
        "there"
    } else {
        first_name
    };
    format!(
        r#"<div style="font-family: Arial, sans-serif; max-width: 600px; margin: 0 auto;">
  <h2>Email Verification</h2>
  <p>Hello {name},</p>
  <p>Thank you for registering with InvestHub. Please use the verification code below to verify your email address:</p>
  <div style="background-color: #f4f4f4; padding: 20px; text-align: center; margin: 20px 0;">
    <h1 style="color: #333; font-size: 32px; margin: 0; letter-spacing: 5px;">{code}</h1>
  </div>
  <p>This verification code will expire in 10 minutes.</p>
  <p>If you didn't request this verification, please ignore this email.</p>
  <p>Best regards,<br>InvestHub Team</p>
</div>"#
    )
}

// =============================================================================
// Test double
// =============================================================================

#[cfg(test)]
pub use recording::{RecordingMailer, SentMail};

#[cfg(test)]
mod recording {
    use std::sync::Mutex;

    use super::*;

    #[derive(Debug, Clone)]
    pub struct SentMail {
        pub to: String,
        pub subject: String,
        pub html: String,
    }

    /// Captures messages instead of sending them; can be told to fail.
    #[derive(Default)]
    pub struct RecordingMailer {
        pub sent: Mutex<Vec<SentMail>>,
        pub fail: bool,
    }

    impl RecordingMailer {
        pub fn failing() -> Self {
            Self {
                sent: Mutex::new(Vec::new()),
                fail: true,
            }
        }

        pub fn sent(&self) -> Vec<SentMail> {
            self.sent.lock().unwrap().clone()
        }

        /// The 6-digit code from the most recent verification email.
        pub fn last_code(&self) -> Option<String> {
            let sent = self.sent();
            let html = &sent.last()?.html;
            let start = html.find("letter-spacing: 5px;\">")? + "letter-spacing: 5px;\">".len();
            Some(html[start..start + 6].to_string())
        }
    }

    #[async_trait]
    impl Mailer for RecordingMailer {
        async fn send_html(&self, to: &str, subject: &str, html: String) -> Result<(), MailError> {
            if self.fail {
                return Err(MailError::NotConfigured);
            }
            self.sent.lock().unwrap().push(SentMail {
                to: to.to_string(),
                subject: subject.to_string(),
                html,
            });
            Ok(())
        }
    }
}
