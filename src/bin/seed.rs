// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! `investhub-seed`: operator tasks against the InvestHub database.
//!
//! ```text
//! investhub-seed admin        # upsert ADMIN_EMAIL / ADMIN_PASSWORD
//! investhub-seed demo-data    # replace the demo companies and campaigns
//! ```

use std::path::PathBuf;
use std::process::ExitCode;

use chrono::Utc;
use clap::{Parser, Subcommand};

use investhub_server::config::{AdminSeed, DATABASE_FILE};
use investhub_server::logging::{init_tracing, LogFormat};
use investhub_server::seed::{seed_admin, seed_demo_data, SeedError};
use investhub_server::storage::DocumentStore;

#[derive(Parser, Debug)]
#[command(name = "investhub-seed", version, about = "Seed the InvestHub database")]
struct Cli {
    /// Directory holding the database file
    #[arg(long, env = "DATA_DIR", default_value = "./data", global = true)]
    data_dir: PathBuf,

    /// `json` for JSON log lines
    #[arg(long, env = "LOG_FORMAT", global = true)]
    log_format: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Create the admin account, or reset its password.
    Admin {
        #[arg(long, env = "ADMIN_EMAIL")]
        email: Option<String>,

        #[arg(long, env = "ADMIN_PASSWORD", hide_env_values = true)]
        password: Option<String>,
    },

    /// Replace the demo companies and campaigns.
    DemoData,
}

async fn run(cli: Cli) -> Result<(), SeedError> {
    let store = DocumentStore::open(&cli.data_dir.join(DATABASE_FILE))?;

    match cli.command {
        Command::Admin { email, password } => {
            let seed = match (email, password) {
                (Some(email), Some(password)) if !email.trim().is_empty() && !password.is_empty() => {
                    AdminSeed { email, password }
                }
                _ => return Err(SeedError::MissingAdminSeed),
            };
            let outcome = seed_admin(&store, &seed).await?;
            tracing::info!(?outcome, "admin seed complete");
        }
        Command::DemoData => {
            seed_demo_data(&store, Utc::now())?;
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() -> ExitCode {
    let _ = dotenvy::dotenv();
    let cli = Cli::parse();
    init_tracing(LogFormat::parse(cli.log_format.as_deref()));

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::error!(error = %err, "seeding failed");
            ExitCode::FAILURE
        }
    }
}
