//! Operator CLI.
//!
//! # Responsibility
//! - Verify `authgate_core` linkage without starting the HTTP server.
//! - Register accounts and inspect lockout state directly on a database file.
//!
//! There is intentionally no unlock command: a locked account stays locked.

use anyhow::{bail, Context};
use authgate_core::db::open_db;
use authgate_core::{AuthService, RegisterRequest, SqliteAccountRepository};
use clap::{Parser, Subcommand};
use serde_json::json;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "authgate-cli", version, about = "Offline account tools for authgate")]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Log level for diagnostics written to stderr.
    #[arg(long, global = true, default_value = "warn")]
    log_level: String,
}

#[derive(Subcommand)]
enum Commands {
    /// Print core linkage and version information
    Ping,
    /// Register an account
    Register {
        #[arg(long, env = "AUTHGATE_DATABASE")]
        database: PathBuf,
        #[arg(long)]
        username: String,
        #[arg(long)]
        password: String,
        #[arg(long)]
        email: Option<String>,
        #[arg(long = "nic-number")]
        nic_number: Option<String>,
    },
    /// Show the lockout state of one account as JSON
    Status {
        #[arg(long, env = "AUTHGATE_DATABASE")]
        database: PathBuf,
        #[arg(long)]
        username: String,
    },
    /// List locked accounts as JSON
    Locked {
        #[arg(long, env = "AUTHGATE_DATABASE")]
        database: PathBuf,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    authgate_core::init_stderr_logging(&cli.log_level).map_err(anyhow::Error::msg)?;

    match cli.command {
        Commands::Ping => {
            println!("authgate_core ping={}", authgate_core::ping());
            println!("authgate_core version={}", authgate_core::core_version());
            Ok(())
        }
        Commands::Register {
            database,
            username,
            password,
            email,
            nic_number,
        } => {
            let conn = open_db(&database)
                .with_context(|| format!("failed to open `{}`", database.display()))?;
            let service = AuthService::new(SqliteAccountRepository::new(&conn));
            let id = service.register(&RegisterRequest {
                username,
                password,
                email,
                national_id: nic_number,
            })?;
            println!("{}", json!({ "id": id, "message": "User registered successfully" }));
            Ok(())
        }
        Commands::Status { database, username } => {
            let conn = open_db(&database)
                .with_context(|| format!("failed to open `{}`", database.display()))?;
            let service = AuthService::new(SqliteAccountRepository::new(&conn));
            let Some(state) = service.lockout_status(&username)? else {
                bail!("no account named `{username}`");
            };
            println!(
                "{}",
                json!({
                    "username": username,
                    "lockout": state,
                    "remaining_attempts": state.remaining_attempts(),
                })
            );
            Ok(())
        }
        Commands::Locked { database } => {
            let conn = open_db(&database)
                .with_context(|| format!("failed to open `{}`", database.display()))?;
            let service = AuthService::new(SqliteAccountRepository::new(&conn));
            let accounts = service.locked_accounts()?;
            println!("{}", serde_json::to_string_pretty(&accounts)?);
            Ok(())
        }
    }
}
