// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Runtime Configuration
//!
//! Configuration is read from the environment exactly once at startup and
//! passed to every component through [`AppConfig`]. Handlers never call
//! `std::env::var` themselves.
//!
//! ## Environment Variables
//!
//! | Variable | Description | Default |
//! |----------|-------------|---------|
//! | `HOST` | Server bind address | `0.0.0.0` |
//! | `PORT` | Server bind port | `4000` |
//! | `DATA_DIR` | Directory holding the redb database file | `./data` |
//! | `JWT_SECRET` | HMAC secret for bearer tokens | Required |
//! | `WEBAUTHN_RP_ID` | Relying party id (domain) for passkeys | Optional |
//! | `WEBAUTHN_ORIGIN` | Expected browser origin for passkeys | Optional |
//! | `WEBAUTHN_RP_NAME` | Relying party display name | `InvestHub Admin` |
//! | `EMAIL_HOST` / `EMAIL_PORT` | SMTP relay | Optional |
//! | `EMAIL_USER` / `EMAIL_PASS` | SMTP credentials | Optional |
//! | `EMAIL_FROM` | Sender address for verification mail | Optional |
//! | `ADMIN_EMAIL` / `ADMIN_PASSWORD` | Admin account used by `investhub-seed admin` | Optional |
//! | `TLS_CERT_PATH` / `TLS_KEY_PATH` | PEM files; serve HTTPS when both are set | Optional |
//! | `ALLOW_USER_KYC_APPROVAL` | Let company owners self-report `approved` KYC | `true` |
//! | `LOG_FORMAT` | Logging format (`json` or `pretty`) | `pretty` |
//! | `RUST_LOG` | Log level filter | `info,tower_http=debug` |

use std::{env, net::SocketAddr, path::PathBuf};

use url::Url;

/// Environment variable name for the data directory path.
pub const DATA_DIR_ENV: &str = "DATA_DIR";

/// Name of the database file inside `DATA_DIR`.
pub const DATABASE_FILE: &str = "investhub.redb";

const DEFAULT_HOST: &str = "0.0.0.0";
const DEFAULT_PORT: u16 = 4000;
const DEFAULT_DATA_DIR: &str = "./data";
const DEFAULT_RP_NAME: &str = "InvestHub Admin";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{0} is not set in environment variables")]
    Missing(&'static str),

    #[error("{name} has an invalid value: {reason}")]
    Invalid { name: &'static str, reason: String },
}

/// WebAuthn relying-party settings.
#[derive(Debug, Clone)]
pub struct WebAuthnConfig {
    pub rp_id: String,
    pub rp_name: String,
    pub origin: Url,
}

/// SMTP transport settings.
#[derive(Debug, Clone)]
pub struct MailConfig {
    pub host: String,
    pub port: u16,
    pub username: String,
    pub password: String,
    pub from: String,
}

/// Credentials for the admin account, supplied to `investhub-seed admin`.
#[derive(Debug, Clone)]
pub struct AdminSeed {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone)]
pub struct TlsConfig {
    pub cert_path: PathBuf,
    pub key_path: PathBuf,
}

/// Fully resolved application configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub bind_addr: SocketAddr,
    pub data_dir: PathBuf,
    pub jwt_secret: String,
    pub webauthn: Option<WebAuthnConfig>,
    pub mail: Option<MailConfig>,
    pub tls: Option<TlsConfig>,
    pub allow_user_kyc_approval: bool,
}

impl AppConfig {
    /// Load configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Load configuration through an arbitrary lookup function.
    ///
    /// Empty values are treated as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let host = get("HOST").unwrap_or_else(|| DEFAULT_HOST.to_string());
        let port = match get("PORT") {
            Some(raw) => raw.parse::<u16>().map_err(|e| ConfigError::Invalid {
                name: "PORT",
                reason: e.to_string(),
            })?,
            None => DEFAULT_PORT,
        };
        let bind_addr: SocketAddr =
            format!("{host}:{port}")
                .parse()
                .map_err(|e: std::net::AddrParseError| ConfigError::Invalid {
                    name: "HOST",
                    reason: e.to_string(),
                })?;

        let data_dir = PathBuf::from(get(DATA_DIR_ENV).unwrap_or_else(|| DEFAULT_DATA_DIR.to_string()));
        let jwt_secret = get("JWT_SECRET").ok_or(ConfigError::Missing("JWT_SECRET"))?;

        let webauthn = match (get("WEBAUTHN_RP_ID"), get("WEBAUTHN_ORIGIN")) {
            (Some(rp_id), Some(origin)) => Some(WebAuthnConfig {
                rp_id,
                rp_name: get("WEBAUTHN_RP_NAME").unwrap_or_else(|| DEFAULT_RP_NAME.to_string()),
                origin: Url::parse(&origin).map_err(|e| ConfigError::Invalid {
                    name: "WEBAUTHN_ORIGIN",
                    reason: e.to_string(),
                })?,
            }),
            _ => None,
        };

        let mail = match (
            get("EMAIL_HOST"),
            get("EMAIL_PORT"),
            get("EMAIL_USER"),
            get("EMAIL_PASS"),
            get("EMAIL_FROM"),
        ) {
            (Some(host), Some(port), Some(username), Some(password), Some(from)) => {
                Some(MailConfig {
                    host,
                    port: port.parse().map_err(|e: std::num::ParseIntError| {
                        ConfigError::Invalid {
                            name: "EMAIL_PORT",
                            reason: e.to_string(),
                        }
                    })?,
                    username,
                    password,
                    from,
                })
            }
            _ => None,
        };

        let tls = match (get("TLS_CERT_PATH"), get("TLS_KEY_PATH")) {
            (Some(cert), Some(key)) => Some(TlsConfig {
                cert_path: PathBuf::from(cert),
                key_path: PathBuf::from(key),
            }),
            _ => None,
        };

        let allow_user_kyc_approval = match get("ALLOW_USER_KYC_APPROVAL") {
            Some(raw) => parse_bool(&raw).ok_or(ConfigError::Invalid {
                name: "ALLOW_USER_KYC_APPROVAL",
                reason: format!("expected true/false, got {raw:?}"),
            })?,
            None => true,
        };

        Ok(Self {
            bind_addr,
            data_dir,
            jwt_secret,
            webauthn,
            mail,
            tls,
            allow_user_kyc_approval,
        })
    }

    /// Path of the redb database file.
    pub fn database_path(&self) -> PathBuf {
        self.data_dir.join(DATABASE_FILE)
    }

    /// Minimal configuration for tests.
    #[cfg(test)]
    pub fn for_tests() -> Self {
        Self {
            bind_addr: SocketAddr::from(([127, 0, 0, 1], DEFAULT_PORT)),
            data_dir: PathBuf::from(DEFAULT_DATA_DIR),
            jwt_secret: "test-secret".to_string(),
            webauthn: Some(WebAuthnConfig {
                rp_id: "localhost".to_string(),
                rp_name: DEFAULT_RP_NAME.to_string(),
                origin: Url::parse("http://localhost:3000").expect("static url"),
            }),
            mail: None,
            tls: None,
            allow_user_kyc_approval: true,
        }
    }
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn jwt_secret_is_required() {
        let result = AppConfig::from_lookup(lookup(&[]));
        assert!(matches!(result, Err(ConfigError::Missing("JWT_SECRET"))));
    }

    #[test]
    fn defaults_apply_when_unset() {
        let config = AppConfig::from_lookup(lookup(&[("JWT_SECRET", "s3cret")])).unwrap();
        assert_eq!(config.bind_addr.port(), 4000);
        assert_eq!(config.data_dir, PathBuf::from("./data"));
        assert!(config.webauthn.is_none());
        assert!(config.mail.is_none());
        assert!(config.tls.is_none());
        assert!(config.allow_user_kyc_approval);
    }

    #[test]
    fn mail_requires_every_field() {
        let partial = AppConfig::from_lookup(lookup(&[
            ("JWT_SECRET", "s"),
            ("EMAIL_HOST", "smtp.example.com"),
            ("EMAIL_PORT", "587"),
        ]))
        .unwrap();
        assert!(partial.mail.is_none());

        let full = AppConfig::from_lookup(lookup(&[
            ("JWT_SECRET", "s"),
            ("EMAIL_HOST", "smtp.example.com"),
            ("EMAIL_PORT", "465"),
            ("EMAIL_USER", "mailer"),
            ("EMAIL_PASS", "pw"),
            ("EMAIL_FROM", "InvestHub <no-reply@example.com>"),
        ]))
        .unwrap();
        assert_eq!(full.mail.unwrap().port, 465);
    }

    #[test]
    fn invalid_origin_is_rejected() {
        let result = AppConfig::from_lookup(lookup(&[
            ("JWT_SECRET", "s"),
            ("WEBAUTHN_RP_ID", "example.com"),
            ("WEBAUTHN_ORIGIN", "not a url"),
        ]));
        assert!(matches!(
            result,
            Err(ConfigError::Invalid { name: "WEBAUTHN_ORIGIN", .. })
        ));
    }

    #[test]
    fn kyc_self_approval_flag_parses() {
        let config = AppConfig::from_lookup(lookup(&[
            ("JWT_SECRET", "s"),
            ("ALLOW_USER_KYC_APPROVAL", "false"),
        ]))
        .unwrap();
        assert!(!config.allow_user_kyc_approval);
    }
}
