#![allow(dead_code)]
use assert_cmd::{Command, cargo_bin_cmd};
use chrono::{DateTime, TimeZone, Utc};
use fdms::db::initialize::{init_db, seed_categories};
use fdms::db::pool::DbPool;
use tempfile::TempDir;

pub fn fdms() -> Command {
    cargo_bin_cmd!("fdms")
}

/// Fresh database path inside its own temp dir; keep the `TempDir` alive for the test.
pub fn setup_test_db(name: &str) -> (TempDir, String) {
    let dir = TempDir::with_prefix(name).expect("create temp dir");
    let db_path = dir
        .path()
        .join(format!("{name}_fdms.sqlite"))
        .to_string_lossy()
        .to_string();
    (dir, db_path)
}

/// Absolute output file path inside its own temp dir.
pub fn temp_out(name: &str, ext: &str) -> (TempDir, String) {
    let dir = TempDir::with_prefix(name).expect("create temp dir");
    let out = dir
        .path()
        .join(format!("{name}_out.{ext}"))
        .to_string_lossy()
        .to_string();
    (dir, out)
}

/// `init` in test mode, then register Alice (F1) and Bob (F2).
pub fn init_db_with_crew(db_path: &str) {
    fdms()
        .args(["--db", db_path, "--test", "init"])
        .assert()
        .success();

    for (number, name) in [("F1", "Alice Smith"), ("F2", "Bob Jones")] {
        fdms()
            .args(["--db", db_path, "register", number, name])
            .assert()
            .success();
    }
}

/// Fresh in-memory ledger with the default categories.
pub fn memory_pool() -> DbPool {
    let pool = DbPool::open_in_memory().expect("open in-memory db");
    init_db(&pool.conn).expect("init schema");
    seed_categories(
        &pool.conn,
        &["Training".to_string(), "Work Night".to_string()],
    )
    .expect("seed categories");
    pool
}

pub fn utc(y: i32, m: u32, d: u32, h: u32, min: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(y, m, d, h, min, 0).unwrap()
}
