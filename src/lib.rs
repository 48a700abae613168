// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! InvestHub - Company KYC & Campaign Approval Service
//!
//! Companies are onboarded through KYC, submit investment campaigns, and
//! admins approve or deny both. Owners are notified of every decision.
//!
//! ## Modules
//!
//! - `api` - HTTP API handlers (Axum)
//! - `auth` - Bearer tokens, password hashing and admin passkeys
//! - `storage` - Embedded redb document store and repositories
//! - `workflow` - Approval state machine for companies and campaigns
//! - `notifications` - Per-user notification outbox
//! - `mail` - SMTP delivery of verification codes
//! - `seed` - Admin and demo data seeding

pub mod api;
pub mod auth;
pub mod config;
pub mod error;
pub mod logging;
pub mod mail;
pub mod models;
pub mod notifications;
pub mod seed;
pub mod state;
pub mod storage;
pub mod workflow;
