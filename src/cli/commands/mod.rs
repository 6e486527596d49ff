pub mod backup;
pub mod category;
pub mod clear;
pub mod clock;
pub mod config;
pub mod db;
pub mod del;
pub mod edit_entry;
pub mod export;
pub mod firefighter;
pub mod init;
pub mod leaderboard;
pub mod log;
pub mod manual;
pub mod recompute;
pub mod register;
pub mod status;

use crate::config::Config;
use crate::db::migrate::run_pending_migrations;
use crate::db::pool::DbPool;
use crate::errors::AppResult;

/// Open the configured database with the schema brought up to date.
pub(crate) fn open_db(cfg: &Config) -> AppResult<DbPool> {
    let pool = DbPool::new(&cfg.database)?;
    run_pending_migrations(&pool.conn)?;
    Ok(pool)
}
