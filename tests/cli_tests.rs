use predicates::prelude::PredicateBooleanExt;
use predicates::str::contains;

mod common;
use common::{fdms, init_db_with_crew, setup_test_db};

#[test]
fn test_clock_in_and_out() {
    let (_db_dir, db_path) = setup_test_db("cli_clock_in_out");
    init_db_with_crew(&db_path);

    fdms()
        .args([
            "--db",
            &db_path,
            "--now",
            "2024-01-01T08:00",
            "clock-in",
            "F1",
            "--activity",
            "Training",
        ])
        .assert()
        .success()
        .stdout(contains("Alice Smith clocked in for Training"));

    fdms()
        .args(["--db", &db_path, "--now", "2024-01-01T08:30", "status"])
        .assert()
        .success()
        .stdout(contains("F1").and(contains("Training")).and(contains("0.50")));

    fdms()
        .args([
            "--db",
            &db_path,
            "--now",
            "2024-01-01T10:30",
            "clock-out",
            "F1",
        ])
        .assert()
        .success()
        .stdout(contains("2.50 hours (total 2.50)"));

    fdms()
        .args(["--db", &db_path, "leaderboard"])
        .assert()
        .success()
        .stdout(contains("Alice Smith").and(contains("2.50")));
}

#[test]
fn test_double_clock_in_fails() {
    let (_db_dir, db_path) = setup_test_db("cli_double_clock_in");
    init_db_with_crew(&db_path);

    let clock_in = |now: &str| {
        fdms()
            .args([
                "--db",
                &db_path,
                "--now",
                now,
                "clock-in",
                "F2",
                "--activity",
                "Work Night",
            ])
            .assert()
    };

    clock_in("2024-01-01T19:00").success();
    clock_in("2024-01-01T19:05")
        .failure()
        .stderr(contains("F2 is already clocked in"));
}

#[test]
fn test_ledger_errors_are_reported() {
    let (_db_dir, db_path) = setup_test_db("cli_ledger_errors");
    init_db_with_crew(&db_path);

    fdms()
        .args(["--db", &db_path, "clock-out", "F1"])
        .assert()
        .failure()
        .stderr(contains("No open clock-in"));

    fdms()
        .args(["--db", &db_path, "clock-in", "F99", "--activity", "Training"])
        .assert()
        .failure()
        .stderr(contains("Unknown firefighter: F99"));

    fdms()
        .args([
            "--db",
            &db_path,
            "manual",
            "F1",
            "--activity",
            "Training",
            "--date",
            "2024-01-02",
            "--in",
            "09:00",
            "--out",
            "08:00",
        ])
        .assert()
        .failure()
        .stderr(contains("Invalid time range"));

    fdms()
        .args(["--db", &db_path, "register", "F1", "Impostor"])
        .assert()
        .failure()
        .stderr(contains("already registered"));
}

#[test]
fn test_manual_entry_and_delete() {
    let (_db_dir, db_path) = setup_test_db("cli_manual_delete");
    init_db_with_crew(&db_path);

    fdms()
        .args([
            "--db",
            &db_path,
            "manual",
            "F1",
            "--activity",
            "Board Meeting",
            "--date",
            "2024-01-02",
            "--in",
            "07:00",
            "--out",
            "09:00",
        ])
        .assert()
        .success()
        .stdout(contains("total 2.00 hours"));

    fdms()
        .args(["--db", &db_path, "firefighter", "show", "F1"])
        .assert()
        .success()
        .stdout(contains("Board Meeting").and(contains("manual")));

    fdms()
        .args(["--db", &db_path, "del", "1", "--yes"])
        .assert()
        .success()
        .stdout(contains("2.00 hours removed"));

    fdms()
        .args(["--db", &db_path, "firefighter", "list"])
        .assert()
        .success()
        .stdout(contains("Alice Smith").and(contains("0.00")));

    fdms()
        .args(["--db", &db_path, "del", "1", "--yes"])
        .assert()
        .failure()
        .stderr(contains("not found"));
}

#[test]
fn test_stale_session_is_auto_checked_out() {
    let (_db_dir, db_path) = setup_test_db("cli_stale_session");
    init_db_with_crew(&db_path);

    fdms()
        .args([
            "--db",
            &db_path,
            "--now",
            "2024-01-01T08:00",
            "clock-in",
            "F1",
            "--activity",
            "Training",
        ])
        .assert()
        .success();

    fdms()
        .args(["--db", &db_path, "--now", "2024-01-01T21:00", "status"])
        .assert()
        .success()
        .stdout(contains("Auto checked out 1 session").and(contains("Nobody is clocked in")));

    fdms()
        .args(["--db", &db_path, "--now", "2024-01-01T22:00", "leaderboard"])
        .assert()
        .success()
        .stdout(contains("1.00").and(contains("Auto checked out").not()));

    fdms()
        .args(["--db", &db_path, "firefighter", "show", "F1"])
        .assert()
        .success()
        .stdout(contains("auto"));
}

#[test]
fn test_clock_out_survives_a_failing_sweep() {
    let (_db_dir, db_path) = setup_test_db("cli_sweep_failure");
    init_db_with_crew(&db_path);

    fdms()
        .args([
            "--db",
            &db_path,
            "--now",
            "2024-01-01T08:00",
            "clock-in",
            "F1",
            "--activity",
            "Training",
        ])
        .assert()
        .success();

    // an unreadable open session for Bob makes the sweep fail
    let conn = rusqlite::Connection::open(&db_path).expect("open db");
    conn.execute(
        "INSERT INTO time_logs (firefighter_id, category_id, time_in)
         VALUES ((SELECT id FROM firefighters WHERE fireman_number = 'F2'),
                 (SELECT id FROM activity_categories WHERE name = 'Training'),
                 '0000-garbled')",
        [],
    )
    .expect("insert garbled entry");
    drop(conn);

    fdms()
        .args(["--db", &db_path, "--now", "2024-01-01T10:30", "clock-out", "F1"])
        .assert()
        .success()
        .stdout(contains("Stale-session sweep skipped").and(contains("2.50")));
}

#[test]
fn test_clear_requires_confirmation() {
    let (_db_dir, db_path) = setup_test_db("cli_clear");
    init_db_with_crew(&db_path);

    fdms()
        .args([
            "--db",
            &db_path,
            "manual",
            "F2",
            "--activity",
            "Training",
            "--date",
            "2024-01-02",
            "--in",
            "18:00",
            "--out",
            "21:00",
        ])
        .assert()
        .success();

    fdms()
        .args(["--db", &db_path, "clear"])
        .write_stdin("n\n")
        .assert()
        .success()
        .stdout(contains("Operation cancelled"));

    fdms()
        .args(["--db", &db_path, "leaderboard"])
        .assert()
        .success()
        .stdout(contains("3.00"));

    fdms()
        .args(["--db", &db_path, "clear", "--yes"])
        .assert()
        .success()
        .stdout(contains("Cleared 1 time log entries"));

    fdms()
        .args(["--db", &db_path, "leaderboard"])
        .assert()
        .success()
        .stdout(contains("3.00").not());
}

#[test]
fn test_category_commands() {
    let (_db_dir, db_path) = setup_test_db("cli_categories");
    init_db_with_crew(&db_path);

    fdms()
        .args(["--db", &db_path, "category", "list"])
        .assert()
        .success()
        .stdout(contains("Work Night").and(contains("EMR Meeting")));

    fdms()
        .args([
            "--db",
            &db_path,
            "manual",
            "F1",
            "--activity",
            "work night",
            "--date",
            "2024-01-02",
            "--in",
            "19:00",
            "--out",
            "22:00",
        ])
        .assert()
        .success();

    fdms()
        .args(["--db", &db_path, "category", "delete", "Work Night"])
        .assert()
        .failure()
        .stderr(contains("is used by 1 time log entries"));

    fdms()
        .args(["--db", &db_path, "category", "merge", "Work Night", "Other"])
        .assert()
        .success()
        .stdout(contains("1 entries moved"));

    fdms()
        .args(["--db", &db_path, "category", "set-default", "Other", "2.5"])
        .assert()
        .success()
        .stdout(contains("2.50 hours"));

    fdms()
        .args(["--db", &db_path, "category", "delete", "Board Meeting"])
        .assert()
        .success();
}

#[test]
fn test_recompute_reports_and_repairs() {
    let (_db_dir, db_path) = setup_test_db("cli_recompute");
    init_db_with_crew(&db_path);

    fdms()
        .args(["--db", &db_path, "recompute", "--check"])
        .assert()
        .success()
        .stdout(contains("All cached totals match"));

    let conn = rusqlite::Connection::open(&db_path).expect("open db");
    conn.execute(
        "UPDATE firefighters SET total_hours = 5 WHERE fireman_number = 'F2'",
        [],
    )
    .expect("corrupt total");
    drop(conn);

    fdms()
        .args(["--db", &db_path, "recompute", "--check"])
        .assert()
        .success()
        .stdout(contains("Bob Jones").and(contains("Recomputed").not()));

    fdms()
        .args(["--db", &db_path, "recompute"])
        .assert()
        .success()
        .stdout(contains("1 firefighter(s) updated"));

    fdms()
        .args(["--db", &db_path, "recompute", "--check"])
        .assert()
        .success()
        .stdout(contains("All cached totals match"));
}

#[test]
fn test_edit_entry_and_log() {
    let (_db_dir, db_path) = setup_test_db("cli_edit_entry");
    init_db_with_crew(&db_path);

    fdms()
        .args([
            "--db",
            &db_path,
            "--now",
            "2024-01-03T08:00",
            "clock-in",
            "F1",
            "--activity",
            "Training",
        ])
        .assert()
        .success();

    fdms()
        .args([
            "--db",
            &db_path,
            "edit-entry",
            "1",
            "--in",
            "2024-01-03 07:00",
            "--out",
            "2024-01-03 11:15",
        ])
        .assert()
        .success()
        .stdout(contains("4.25 hours"));

    fdms()
        .args(["--db", &db_path, "log", "--print"])
        .assert()
        .success()
        .stdout(contains("register").and(contains("clock_in")).and(contains("edit")));
}

#[test]
fn test_schema_setup_is_quiet_on_stdout() {
    let (_db_dir, db_path) = setup_test_db("cli_quiet_migrations");

    fdms()
        .args(["--db", &db_path, "--now", "2024-01-01T08:00", "status"])
        .assert()
        .success()
        .stdout(
            contains("Nobody is clocked in")
                .and(contains("Created").not())
                .and(contains("migration").not()),
        );

    fdms()
        .args(["--db", &db_path, "db", "--migrate"])
        .assert()
        .success()
        .stdout(contains("Migration completed"));
}
