mod common;

use std::fs;

use common::{draft, recurring, ymd};
use pretty_assertions::assert_eq;
use tasknote::lifecycle::{complete_task, create_task, reactivate_task};
use tasknote::models::{Priority, Recurrence, TaskState};
use tasknote::query::{query, ListKind, SortOrder, TaskFilter};
use tasknote::storage::{JsonFile, Persistence, TaskStore};
use tempfile::TempDir;

fn db(dir: &TempDir) -> JsonFile {
    JsonFile::new(dir.path().join("tasks.json"))
}

#[test]
fn test_missing_file_loads_empty() {
    let dir = TempDir::new().unwrap();
    let state = db(&dir).load();
    assert_eq!(state, TaskState::default());
}

#[test]
fn test_corrupt_file_loads_empty() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("tasks.json"), "not json {{{").unwrap();
    let store = TaskStore::open(db(&dir));
    assert!(store.active().is_empty());
    assert!(store.finished().is_empty());
}

#[test]
fn test_missing_keys_default_to_empty_lists() {
    let dir = TempDir::new().unwrap();
    fs::write(
        dir.path().join("tasks.json"),
        r#"{ "active": [ { "name": "Only", "date": "10.05.2024", "info": "", "priority": "red", "created_date": "01.05.2024", "recurrence": null } ] }"#,
    )
    .unwrap();
    let store = TaskStore::open(db(&dir));
    assert_eq!(store.active().len(), 1);
    assert!(store.finished().is_empty());

    fs::write(dir.path().join("tasks.json"), "{}").unwrap();
    let store = TaskStore::open(db(&dir));
    assert!(store.active().is_empty());
}

#[test]
fn test_save_writes_expected_layout() {
    let dir = TempDir::new().unwrap();
    let mut store = TaskStore::open(db(&dir));
    let id = create_task(&mut store, &recurring("Zahnarzt ü", "10.05.2024", Recurrence::Monthly), ymd(2024, 5, 1)).unwrap();
    create_task(&mut store, &draft("Plain", "11.05.2024"), ymd(2024, 5, 1)).unwrap();
    complete_task(&mut store, id, ymd(2024, 5, 10)).unwrap();

    let text = fs::read_to_string(dir.path().join("tasks.json")).unwrap();
    let json: serde_json::Value = serde_json::from_str(&text).unwrap();

    let plain = &json["active"][0];
    assert_eq!(plain["name"], "Plain");
    assert_eq!(plain["date"], "11.05.2024");
    assert_eq!(plain["priority"], "green");
    assert_eq!(plain["recurrence"], serde_json::Value::Null);
    assert!(plain.get("finished_date").is_none());
    assert_eq!(plain["id"], 2);

    let done = &json["finished"][0];
    assert_eq!(done["finished_date"], "10.05.2024");
    assert_eq!(done["recurrence"], "monthly");

    // successor of the monthly task
    assert_eq!(json["active"][1]["date"], "10.06.2024");
    assert!(text.contains("Zahnarzt ü"));
}

#[test]
fn test_round_trip_is_idempotent() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("tasks.json");
    fs::write(
        &path,
        r#"{"active":[{"name":"Old","date":"2024-05-10","info":"x","priority":"yellow","created_date":"01.05.2024","recurrence":"weekly"},
                      {"name":"Back","date":"12.05.2024","info":"","priority":"red","created_date":"01.05.2024","recurrence":null,"finished_date":"11.05.2024"}],
            "finished":[{"name":"Done","date":"09.05.2024","info":"","priority":"green","created_date":"01.05.2024","recurrence":"none","finished_date":"09.05.2024"}]}"#,
    )
    .unwrap();

    let mut first = TaskStore::open(JsonFile::new(&path));
    first.save().unwrap();
    let once = fs::read_to_string(&path).unwrap();

    let mut second = TaskStore::open(JsonFile::new(&path));
    second.save().unwrap();
    let twice = fs::read_to_string(&path).unwrap();

    assert_eq!(once, twice);
    assert!(!once.contains("yellow"));
    assert!(once.contains("\"priority\": \"blue\""));
    // stored text of dates is kept as-is
    assert!(once.contains("2024-05-10"));
}

#[test]
fn test_legacy_yellow_behaves_like_blue() {
    let dir = TempDir::new().unwrap();
    fs::write(
        dir.path().join("tasks.json"),
        r#"{"active":[{"name":"Legacy","date":"10.05.2024","info":"","priority":"yellow","created_date":"01.05.2024","recurrence":null},
                      {"name":"Modern","date":"11.05.2024","info":"","priority":"blue","created_date":"01.05.2024","recurrence":null},
                      {"name":"Hot","date":"12.05.2024","info":"","priority":"red","created_date":"01.05.2024","recurrence":null}],
            "finished":[]}"#,
    )
    .unwrap();
    let store = TaskStore::open(db(&dir));
    assert_eq!(store.active()[0].priority, Priority::Blue);

    let filter = TaskFilter { priority: Some(Priority::Blue), ..TaskFilter::default() };
    let names: Vec<&str> = query(store.active(), ListKind::Active, &filter, SortOrder::Ascending, ymd(2024, 5, 1))
        .iter()
        .map(|t| t.name.as_str())
        .collect();
    assert_eq!(names, vec!["Legacy", "Modern"]);
}

#[test]
fn test_unknown_field_values_are_tolerated() {
    let dir = TempDir::new().unwrap();
    fs::write(
        dir.path().join("tasks.json"),
        r#"{"active":[{"name":"Odd","date":"10.05.2024","priority":"purple","recurrence":"yearly"},
                      {"name":"Bare","date":"11.05.2024"}]}"#,
    )
    .unwrap();
    let store = TaskStore::open(db(&dir));
    assert_eq!(store.active().len(), 2);
    assert_eq!(store.active()[0].priority, Priority::Green);
    assert_eq!(store.active()[0].recurrence, None);
    assert_eq!(store.active()[1].info, "");
    assert_eq!(store.active()[1].created_date, "");
}

#[test]
fn test_ids_are_deterministic_and_survive_moves() {
    let dir = TempDir::new().unwrap();
    let mut store = TaskStore::open(db(&dir));
    let today = ymd(2024, 5, 1);
    let a = create_task(&mut store, &draft("A", "10.05.2024"), today).unwrap();
    create_task(&mut store, &draft("B", "11.05.2024"), today).unwrap();
    complete_task(&mut store, a, today).unwrap();
    assert_eq!(store.find(a).map(|(k, _)| k), Some(ListKind::Finished));
    reactivate_task(&mut store, a).unwrap();
    assert_eq!(store.find(a).map(|(k, _)| k), Some(ListKind::Active));

    let reopened = TaskStore::open(db(&dir));
    let again = TaskStore::open(db(&dir));
    let ids: Vec<_> = reopened.active().iter().map(|t| (t.id, t.name.clone())).collect();
    let ids_again: Vec<_> = again.active().iter().map(|t| (t.id, t.name.clone())).collect();
    assert_eq!(ids, ids_again);
    assert_eq!(reopened.active().len(), 2);
}

#[test]
fn test_save_creates_missing_directory() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("nested").join("tasks.json");
    let mut store = TaskStore::open(JsonFile::new(&path));
    create_task(&mut store, &draft("Deep", "10.05.2024"), ymd(2024, 5, 1)).unwrap();
    assert!(path.exists());
}

#[test]
fn test_ids_are_persisted_and_never_reused() {
    let dir = TempDir::new().unwrap();
    let today = ymd(2024, 5, 1);
    let mut store = TaskStore::open(db(&dir));
    let a = create_task(&mut store, &draft("A", "10.05.2024"), today).unwrap();
    complete_task(&mut store, a, today).unwrap();

    let mut store = TaskStore::open(db(&dir));
    let b = create_task(&mut store, &draft("B", "11.05.2024"), today).unwrap();
    assert_ne!(a, b);

    let reopened = TaskStore::open(db(&dir));
    assert_eq!(reopened.find(a).map(|(k, t)| (k, t.name.as_str())), Some((ListKind::Finished, "A")));
    assert_eq!(reopened.find(b).map(|(k, t)| (k, t.name.as_str())), Some((ListKind::Active, "B")));
}

#[test]
fn test_missing_and_clashing_ids_are_assigned_above_the_highest() {
    let dir = TempDir::new().unwrap();
    fs::write(
        dir.path().join("tasks.json"),
        r#"{"active":[{"name":"Legacy","date":"10.05.2024"},
                      {"name":"Seven","date":"11.05.2024","id":7},
                      {"name":"Clash","date":"12.05.2024","id":7}],
            "finished":[{"name":"Old","date":"01.05.2024","finished_date":"01.05.2024","id":3}]}"#,
    )
    .unwrap();
    let store = TaskStore::open(db(&dir));
    let ids: Vec<_> = store.active().iter().chain(store.finished()).map(|t| (t.name.as_str(), t.id)).collect();
    assert_eq!(ids, vec![("Legacy", 8), ("Seven", 7), ("Clash", 9), ("Old", 3)]);
}
