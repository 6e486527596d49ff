mod common;
use common::{fdms, init_db_with_crew, memory_pool, setup_test_db, temp_out, utc};
use fdms::core::ledger::TimeLedger;
use fdms::core::roster::Roster;
use fdms::export::ExportLogic;
use predicates::str::contains;
use std::fs;

fn manual(db_path: &str, number: &str, activity: &str, date: &str, t_in: &str, t_out: &str) {
    fdms()
        .args([
            "--db",
            db_path,
            "manual",
            number,
            "--activity",
            activity,
            "--date",
            date,
            "--in",
            t_in,
            "--out",
            t_out,
        ])
        .assert()
        .success();
}

fn seed(db_path: &str) {
    init_db_with_crew(db_path);
    manual(db_path, "F1", "Training", "2024-01-02", "07:00", "09:00");
    manual(db_path, "F2", "Work Night", "2024-01-15", "19:00", "22:30");
    manual(db_path, "F1", "Board Meeting", "2024-02-01", "18:00", "19:00");
}

#[test]
fn test_export_csv_all() {
    let (_db_dir, db_path) = setup_test_db("export_csv_all");
    seed(&db_path);
    let (_out_dir, out) = temp_out("export_csv_all", "csv");

    fdms()
        .args(["--db", &db_path, "export", "--format", "csv", "--file", &out])
        .assert()
        .success()
        .stdout(contains("CSV export completed"));

    let content = fs::read_to_string(&out).expect("read exported csv");
    let mut lines = content.lines();
    assert_eq!(
        lines.next(),
        Some("fireman_number,full_name,date,time_in,time_out,activity,hours,manual,auto_checkout")
    );
    assert_eq!(
        lines.next(),
        Some("F1,Alice Smith,2024-01-02,07:00,09:00,Training,2.00,true,false")
    );
    assert!(content.contains("F2,Bob Jones,2024-01-15,19:00,22:30,Work Night,3.50,true,false"));
    assert!(content.contains("2024-02-01"));
}

#[test]
fn test_export_json_month_range() {
    let (_db_dir, db_path) = setup_test_db("export_json_month");
    seed(&db_path);
    let (_out_dir, out) = temp_out("export_json_month", "json");

    fdms()
        .args([
            "--db", &db_path, "export", "--format", "json", "--file", &out, "--range", "2024-01",
        ])
        .assert()
        .success();

    let content = fs::read_to_string(&out).expect("read exported json");
    let rows: serde_json::Value = serde_json::from_str(&content).expect("valid json");
    let rows = rows.as_array().expect("array");

    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0]["fireman_number"], "F1");
    assert_eq!(rows[1]["hours"], "3.50");
    assert!(!content.contains("2024-02-01"));
}

#[test]
fn test_export_xlsx_and_pdf() {
    let (_db_dir, db_path) = setup_test_db("export_xlsx_pdf");
    seed(&db_path);

    let (_xlsx_dir, xlsx) = temp_out("export_xlsx_pdf", "xlsx");
    fdms()
        .args([
            "--db", &db_path, "export", "--format", "xlsx", "--file", &xlsx, "--range", "2024",
        ])
        .assert()
        .success();
    let bytes = fs::read(&xlsx).expect("read xlsx");
    assert!(bytes.starts_with(b"PK"));

    let (_pdf_dir, pdf) = temp_out("export_xlsx_pdf", "pdf");
    fdms()
        .args([
            "--db", &db_path, "export", "--format", "pdf", "--file", &pdf, "--range",
            "2024-01-01:2024-01-31",
        ])
        .assert()
        .success();
    let bytes = fs::read(&pdf).expect("read pdf");
    assert!(bytes.starts_with(b"%PDF"));
}

#[test]
fn test_export_empty_range_writes_nothing() {
    let (_db_dir, db_path) = setup_test_db("export_empty_range");
    seed(&db_path);
    let (_out_dir, out) = temp_out("export_empty_range", "csv");

    fdms()
        .args([
            "--db", &db_path, "export", "--format", "csv", "--file", &out, "--range", "2023",
        ])
        .assert()
        .success()
        .stdout(contains("No time log entries found"));

    assert!(!std::path::Path::new(&out).exists());
}

#[test]
fn test_export_rejects_bad_input() {
    let (_db_dir, db_path) = setup_test_db("export_bad_input");
    seed(&db_path);

    fdms()
        .args(["--db", &db_path, "export", "--file", "relative.csv"])
        .assert()
        .failure()
        .stderr(contains("must be absolute"));

    let (_out_dir, out) = temp_out("export_bad_input", "csv");
    fdms()
        .args(["--db", &db_path, "export", "--file", &out, "--range", "2024-13"])
        .assert()
        .failure()
        .stderr(contains("invalid month"));
}

#[test]
fn test_export_existing_file_needs_force() {
    let (_db_dir, db_path) = setup_test_db("export_force");
    seed(&db_path);
    let (_out_dir, out) = temp_out("export_force", "csv");
    fs::write(&out, "keep me").expect("write placeholder");

    fdms()
        .args(["--db", &db_path, "export", "--file", &out])
        .write_stdin("n\n")
        .assert()
        .failure()
        .stderr(contains("was not overwritten"));
    assert_eq!(fs::read_to_string(&out).unwrap(), "keep me");

    fdms()
        .args(["--db", &db_path, "export", "--file", &out, "--force"])
        .assert()
        .success();
    assert!(fs::read_to_string(&out).unwrap().starts_with("fireman_number"));
}

#[test]
fn test_open_entries_export_with_zero_hours() {
    let mut pool = memory_pool();
    let alice = Roster::register(&mut pool, "F1", "Alice").unwrap();
    TimeLedger::clock_in(&mut pool, alice, "Training", utc(2024, 3, 1, 12, 0)).unwrap();

    let rows = ExportLogic::load(&pool, Some("all")).unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].time_out, "");
    assert_eq!(rows[0].hours, "0.00");
    assert!(!rows[0].manual);
}

#[test]
fn test_backup_copies_database() {
    let (_db_dir, db_path) = setup_test_db("backup_copy");
    seed(&db_path);

    let (_plain_dir, plain) = temp_out("backup_copy", "sqlite");
    fdms()
        .args(["--db", &db_path, "backup", "--file", &plain])
        .assert()
        .success()
        .stdout(contains("Backup created"));
    let conn = rusqlite::Connection::open(&plain).expect("open backup");
    let n: i64 = conn
        .query_row("SELECT COUNT(*) FROM time_logs", [], |r| r.get(0))
        .expect("count entries");
    assert_eq!(n, 3);

    let (_zipped_dir, zipped) = temp_out("backup_copy_zip", "zip");
    fdms()
        .args(["--db", &db_path, "backup", "--file", &zipped, "--compress"])
        .assert()
        .success();
    let bytes = fs::read(&zipped).expect("read zip");
    assert!(bytes.starts_with(b"PK"));
}
