mod common;
use common::{memory_pool, utc};
use fdms::core::categories::Categories;
use fdms::core::ledger::TimeLedger;
use fdms::core::roster::Roster;
use fdms::db::queries::{category_by_name, firefighter_by_number, firefighter_exists};
use fdms::errors::AppError;

#[test]
fn register_and_look_up_firefighters() {
    let mut pool = memory_pool();
    let id = Roster::register(&mut pool, " F1 ", "Alice Smith").unwrap();

    assert!(firefighter_exists(&pool.conn, id).unwrap());
    assert!(!firefighter_exists(&pool.conn, id + 1).unwrap());

    let ff = firefighter_by_number(&pool.conn, "F1").unwrap().unwrap();
    assert_eq!(ff.id, id);
    assert_eq!(ff.full_name, "Alice Smith");
    assert_eq!(ff.total_hours, 0.0);

    let err = Roster::register(&mut pool, "F1", "Someone Else").unwrap_err();
    assert!(matches!(err, AppError::DuplicateFirefighter(_)));

    let err = Roster::register(&mut pool, "F9", "   ").unwrap_err();
    assert!(matches!(err, AppError::InvalidInput(_)));

    let err = Roster::require(&pool, "F404").unwrap_err();
    assert!(matches!(err, AppError::UnknownFirefighter(_)));
}

#[test]
fn update_renumbers_and_renames() {
    let mut pool = memory_pool();
    Roster::register(&mut pool, "F1", "Alice").unwrap();
    Roster::register(&mut pool, "F2", "Bob").unwrap();

    let ff = Roster::update(&mut pool, "F1", Some("F10"), Some("Alice Smith")).unwrap();
    assert_eq!(ff.fireman_number, "F10");
    assert_eq!(ff.full_name, "Alice Smith");

    let err = Roster::update(&mut pool, "F10", Some("F2"), None).unwrap_err();
    assert!(matches!(err, AppError::DuplicateFirefighter(_)));
}

#[test]
fn deleting_a_firefighter_removes_their_entries() {
    let mut pool = memory_pool();
    let alice = Roster::register(&mut pool, "F1", "Alice").unwrap();
    TimeLedger::add_manual_entry(&mut pool, alice, "Training", "2024-01-02", "07:00", "09:00")
        .unwrap();
    TimeLedger::clock_in(&mut pool, alice, "Training", utc(2024, 1, 3, 8, 0)).unwrap();

    let (ff, entries) = Roster::delete(&mut pool, "F1").unwrap();
    assert_eq!(ff.id, alice);
    assert_eq!(entries, 2);

    let left: i64 = pool
        .conn
        .query_row("SELECT COUNT(*) FROM time_logs", [], |r| r.get(0))
        .unwrap();
    assert_eq!(left, 0);
}

#[test]
fn unseen_activity_labels_create_categories() {
    let mut pool = memory_pool();
    let alice = Roster::register(&mut pool, "F1", "Alice").unwrap();

    assert!(category_by_name(&pool.conn, "Hose Drill").unwrap().is_none());
    TimeLedger::clock_in(&mut pool, alice, "Hose Drill", utc(2024, 1, 1, 8, 0)).unwrap();

    let cat = category_by_name(&pool.conn, "hose drill").unwrap().unwrap();
    assert_eq!(cat.name, "Hose Drill");
    assert_eq!(cat.entry_count, 1);

    // same label, different case: no new category
    TimeLedger::clock_out(&mut pool, alice, utc(2024, 1, 1, 9, 0)).unwrap();
    TimeLedger::clock_in(&mut pool, alice, "HOSE DRILL", utc(2024, 1, 2, 8, 0)).unwrap();
    let names: Vec<String> = Categories::list(&pool)
        .unwrap()
        .into_iter()
        .map(|c| c.name)
        .filter(|n| n.eq_ignore_ascii_case("hose drill"))
        .collect();
    assert_eq!(names, ["Hose Drill"]);

    TimeLedger::clock_out(&mut pool, alice, utc(2024, 1, 2, 9, 0)).unwrap();
    let err = TimeLedger::clock_in(&mut pool, alice, "  ", utc(2024, 1, 3, 8, 0)).unwrap_err();
    assert!(matches!(err, AppError::InvalidCategory(_)));
}

#[test]
fn categories_are_unique_ignoring_case() {
    let mut pool = memory_pool();
    Categories::create(&mut pool, "Board Meeting", None).unwrap();

    let err = Categories::create(&mut pool, "board meeting", None).unwrap_err();
    assert!(matches!(err, AppError::DuplicateCategory(_)));

    let err = Categories::create(&mut pool, "EMR", Some(0.0)).unwrap_err();
    assert!(matches!(err, AppError::InvalidCategory(_)));
}

#[test]
fn categories_in_use_cannot_be_deleted_but_can_be_merged() {
    let mut pool = memory_pool();
    let alice = Roster::register(&mut pool, "F1", "Alice").unwrap();

    TimeLedger::add_manual_entry(&mut pool, alice, "Drill", "2024-01-03", "19:00", "21:00")
        .unwrap();

    let err = Categories::delete(&mut pool, "Drill").unwrap_err();
    assert!(matches!(err, AppError::CategoryInUse(ref n, 1) if n == "Drill"));

    let moved = Categories::merge(&mut pool, "Drill", "Training").unwrap();
    assert_eq!(moved, 1);
    assert!(category_by_name(&pool.conn, "Drill").unwrap().is_none());

    let training = Categories::require(&pool, "Training").unwrap();
    assert_eq!(training.entry_count, 1);

    let err = Categories::merge(&mut pool, "Training", "training").unwrap_err();
    assert!(matches!(err, AppError::InvalidCategory(_)));

    Categories::create(&mut pool, "Unused", None).unwrap();
    let deleted = Categories::delete(&mut pool, "unused").unwrap();
    assert_eq!(deleted.name, "Unused");

    // merging never changes totals
    assert_eq!(Roster::require_id(&pool, alice).unwrap().total_hours, 2.0);
}
