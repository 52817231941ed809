//! Operator CLI for a DesignFlow database.
//!
//! # Responsibility
//! - Verify `designflow_core` linkage and run migrations on a database file.
//! - Offer read-only inspection plus an explicit progress recompute.

use clap::{Parser, Subcommand};
use designflow_core::{
    classify_due_date, open_db, Clock, OrderSnapshotStore, ProjectService, SqliteRepositories,
    SystemClock,
};
use std::error::Error;
use std::path::PathBuf;
use std::process::ExitCode;
use uuid::Uuid;

#[derive(Parser)]
#[command(name = "designflow", version, about = "DesignFlow project maintenance CLI")]
struct Cli {
    /// SQLite database file; migrations are applied on open.
    #[arg(long, global = true, default_value = "designflow.sqlite3")]
    db: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print core ping and version.
    Ping,
    /// Open the database and apply pending migrations.
    Migrate,
    /// List recorded versions of an order.
    Versions { order_id: Uuid },
    /// Recompute progress and designer rosters of a project.
    Recompute { project_id: Uuid },
    /// Classify a due date (epoch ms) against now.
    Due {
        due_ms: i64,
        #[arg(long)]
        now_ms: Option<i64>,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("designflow: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn Error>> {
    match cli.command {
        Command::Ping => {
            println!("designflow_core ping={}", designflow_core::ping());
            println!("designflow_core version={}", designflow_core::core_version());
        }
        Command::Migrate => {
            open_db(&cli.db)?;
            println!("migrated {}", cli.db.display());
        }
        Command::Versions { order_id } => {
            let conn = open_db(&cli.db)?;
            let repos = SqliteRepositories::try_new(&conn)?;
            let clock = SystemClock;
            let versions = OrderSnapshotStore::new(repos.context(&clock)).list_versions(order_id)?;
            if versions.is_empty() {
                println!("order {order_id} has no versions");
            }
            for snapshot in versions {
                let total: f64 = snapshot.items.iter().map(|item| item.subtotal).sum();
                println!(
                    "v{} created_at={} items={} total={:.2}",
                    snapshot.version_number,
                    snapshot.created_at,
                    snapshot.items.len(),
                    total
                );
            }
        }
        Command::Recompute { project_id } => {
            let conn = open_db(&cli.db)?;
            let repos = SqliteRepositories::try_new(&conn)?;
            let clock = SystemClock;
            let rollup = ProjectService::new(repos.context(&clock)).recompute(project_id)?;
            let names = |designers: &[designflow_core::DesignerRef]| {
                designers
                    .iter()
                    .map(|designer| designer.name.as_str())
                    .collect::<Vec<_>>()
                    .join(", ")
            };
            println!("progress={}", rollup.progress);
            println!("main_designers={}", names(&rollup.main_designers));
            println!("assistant_designers={}", names(&rollup.assistant_designers));
        }
        Command::Due { due_ms, now_ms } => {
            let now_ms = now_ms.unwrap_or_else(|| SystemClock.now_ms());
            match classify_due_date(due_ms, now_ms) {
                Some(status) => println!(
                    "label={} tone={:?} diff_days={}",
                    status.label, status.tone, status.diff_days
                ),
                None => return Err(format!("timestamp out of range: {due_ms}").into()),
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{Cli, Command};
    use clap::{CommandFactory, Parser};

    #[test]
    fn command_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn due_accepts_explicit_now() {
        let cli = Cli::try_parse_from(["designflow", "due", "1000", "--now-ms", "0"]).unwrap();
        assert!(matches!(cli.command, Command::Due { due_ms: 1000, now_ms: Some(0) }));
    }
}
