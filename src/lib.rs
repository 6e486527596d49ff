//! fdms library root.
//! Fire department records: firefighter roster, activity categories and the
//! time ledger (clock-in/out, manual entries, stale-session sweep) on SQLite,
//! plus payroll export. Exposes the CLI parser, `run()`, and the modules.

pub mod cli;
pub mod config;
pub mod core;
pub mod db;
pub mod errors;
pub mod export;
pub mod models;
pub mod ui;
pub mod utils;

use chrono::{DateTime, Utc};
use clap::Parser;
use crate::cli::commands;
use crate::cli::parser::{Cli, Commands};
use crate::config::Config;
use crate::core::ledger::TimeLedger;
use crate::errors::AppResult;
use crate::ui::messages::warning;
use crate::utils::time::parse_local_datetime;
use tracing_subscriber::EnvFilter;

/// Close stale open sessions before commands that show or change clock state.
/// Cheap when nothing is stale.
pub fn sweep_stale_sessions(cfg: &Config, now: DateTime<Utc>) -> AppResult<usize> {
    let mut pool = commands::open_db(cfg)?;
    let closed = TimeLedger::auto_checkout_stale_sessions(
        &mut pool,
        now,
        cfg.auto_checkout_after_hours,
        cfg.auto_checkout_credit_hours,
    )?;

    if closed > 0 {
        warning(format!(
            "Auto checked out {} session(s) open for more than {} hours",
            closed, cfg.auto_checkout_after_hours
        ));
    }
    Ok(closed)
}

/// Central command dispatcher
pub fn dispatch(cli: &Cli, cfg: &Config, now: DateTime<Utc>) -> AppResult<()> {
    if matches!(
        cli.command,
        Commands::ClockIn { .. }
            | Commands::ClockOut { .. }
            | Commands::Status
            | Commands::Leaderboard
    ) {
        if let Err(e) = sweep_stale_sessions(cfg, now) {
            tracing::warn!(error = %e, "stale-session sweep failed");
            warning(format!("Stale-session sweep skipped: {e}"));
        }
    }

    match &cli.command {
        Commands::Init => commands::init::handle(cli),
        Commands::Config { .. } => commands::config::handle(&cli.command, cfg),
        Commands::Db { .. } => commands::db::handle(&cli.command, cfg),
        Commands::Log { .. } => commands::log::handle(&cli.command, cfg),
        Commands::Register { .. } => commands::register::handle(&cli.command, cfg),
        Commands::Firefighter { .. } => commands::firefighter::handle(&cli.command, cfg),
        Commands::Category { .. } => commands::category::handle(&cli.command, cfg),
        Commands::ClockIn { .. } | Commands::ClockOut { .. } => {
            commands::clock::handle(&cli.command, cfg, now)
        }
        Commands::Manual { .. } => commands::manual::handle(&cli.command, cfg),
        Commands::EditEntry { .. } => commands::edit_entry::handle(&cli.command, cfg),
        Commands::Del { .. } => commands::del::handle(&cli.command, cfg),
        Commands::Clear { .. } => commands::clear::handle(&cli.command, cfg),
        Commands::Status => commands::status::handle(cfg, now),
        Commands::Leaderboard => commands::leaderboard::handle(cfg),
        Commands::Recompute { .. } => commands::recompute::handle(&cli.command, cfg),
        Commands::Export { .. } => commands::export::handle(&cli.command, cfg),
        Commands::Backup { .. } => commands::backup::handle(&cli.command, cfg),
    }
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    // try_init: a subscriber may already be set (tests)
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

/// Entry point used by main.rs
pub fn run() -> AppResult<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let mut cfg = Config::load()?;
    if let Some(custom_db) = &cli.db {
        cfg.database = custom_db.clone();
    }
    cfg.validate()?;
    tracing::debug!(?cfg, "configuration loaded");

    let now = match &cli.now {
        Some(s) => parse_local_datetime(s)?,
        None => Utc::now(),
    };

    dispatch(&cli, &cfg, now)
}
