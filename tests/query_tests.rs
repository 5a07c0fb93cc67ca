mod common;

use common::{finished, task, ymd};
use pretty_assertions::assert_eq;
use tasknote::error::TaskError;
use tasknote::models::{Priority, Task};
use tasknote::query::{is_overdue, parse_filter_date, query, ListKind, QuickRange, SortOrder, TaskFilter};

fn names(tasks: Vec<&Task>) -> Vec<&str> {
    tasks.into_iter().map(|t| t.name.as_str()).collect()
}

fn active_sample() -> Vec<Task> {
    vec![
        task("Tomorrow red", "11.05.2024", Priority::Red),
        task("Today red", "10.05.2024", Priority::Red),
        task("Unknown", "whenever", Priority::Green),
        task("Past blue", "2024-05-01", Priority::Blue),
        task("Next week green", "17.05.2024", Priority::Green),
        task("Far green", "18.05.2024", Priority::Green),
    ]
}

fn today() -> chrono::NaiveDate {
    ymd(2024, 5, 10)
}

#[test]
fn test_no_filter_sorts_ascending_unknown_last() {
    let tasks = active_sample();
    let out = query(&tasks, ListKind::Active, &TaskFilter::default(), SortOrder::Ascending, today());
    assert_eq!(
        names(out),
        vec!["Past blue", "Today red", "Tomorrow red", "Next week green", "Far green", "Unknown"]
    );
}

#[test]
fn test_descending_puts_unknown_active_first() {
    let tasks = active_sample();
    let out = query(&tasks, ListKind::Active, &TaskFilter::default(), SortOrder::Descending, today());
    assert_eq!(
        names(out),
        vec!["Unknown", "Far green", "Next week green", "Tomorrow red", "Today red", "Past blue"]
    );
}

#[test]
fn test_priority_and_today() {
    let tasks = active_sample();
    let filter = TaskFilter {
        priority: Some(Priority::Red),
        quick_range: Some(QuickRange::Today),
        ..TaskFilter::default()
    };
    let out = query(&tasks, ListKind::Active, &filter, SortOrder::Ascending, today());
    assert_eq!(names(out), vec!["Today red"]);
}

#[test]
fn test_this_week_is_inclusive() {
    let tasks = active_sample();
    let filter = TaskFilter { quick_range: Some(QuickRange::ThisWeek), ..TaskFilter::default() };
    let out = query(&tasks, ListKind::Active, &filter, SortOrder::Ascending, today());
    assert_eq!(names(out), vec!["Today red", "Tomorrow red", "Next week green"]);
}

#[test]
fn test_overdue_only() {
    let tasks = active_sample();
    let filter = TaskFilter { overdue_only: true, ..TaskFilter::default() };
    let out = query(&tasks, ListKind::Active, &filter, SortOrder::Ascending, today());
    assert_eq!(names(out), vec!["Past blue"]);

    assert!(is_overdue(&tasks[3], today()));
    assert!(!is_overdue(&tasks[1], today()));
    assert!(!is_overdue(&tasks[2], today()));
}

#[test]
fn test_min_date_is_inclusive_and_drops_unknown() {
    let tasks = active_sample();
    let filter = TaskFilter { min_date: Some(ymd(2024, 5, 11)), ..TaskFilter::default() };
    let out = query(&tasks, ListKind::Active, &filter, SortOrder::Ascending, today());
    assert_eq!(names(out), vec!["Tomorrow red", "Next week green", "Far green"]);
}

#[test]
fn test_name_search_is_case_insensitive() {
    let tasks = active_sample();
    let filter = TaskFilter { name_contains: "  GREEN ".into(), ..TaskFilter::default() };
    let out = query(&tasks, ListKind::Active, &filter, SortOrder::Ascending, today());
    assert_eq!(names(out), vec!["Next week green", "Far green"]);
}

#[test]
fn test_filters_compose_with_and() {
    let tasks = active_sample();
    let filter = TaskFilter {
        priority: Some(Priority::Green),
        quick_range: Some(QuickRange::ThisWeek),
        name_contains: "week".into(),
        ..TaskFilter::default()
    };
    let out = query(&tasks, ListKind::Active, &filter, SortOrder::Ascending, today());
    assert_eq!(names(out), vec!["Next week green"]);

    let impossible = TaskFilter { overdue_only: true, quick_range: Some(QuickRange::Today), ..TaskFilter::default() };
    assert!(query(&tasks, ListKind::Active, &impossible, SortOrder::Ascending, today()).is_empty());
}

#[test]
fn test_finished_sorts_by_finished_date_unknown_first() {
    let tasks = vec![
        finished("Late", Some("09.05.2024")),
        finished("Missing", None),
        finished("Early", Some("01.05.2024")),
        finished("Garbled", Some("n/a")),
    ];
    let out = query(&tasks, ListKind::Finished, &TaskFilter::default(), SortOrder::Ascending, today());
    assert_eq!(names(out), vec!["Missing", "Garbled", "Early", "Late"]);

    let out = query(&tasks, ListKind::Finished, &TaskFilter::default(), SortOrder::Descending, today());
    assert_eq!(names(out), vec!["Late", "Early", "Missing", "Garbled"]);
}

#[test]
fn test_finished_min_date_uses_finished_date() {
    let mut late = finished("Due long ago", Some("09.05.2024"));
    late.date = "01.01.2020".into();
    let tasks = vec![late, finished("Early", Some("01.05.2024")), finished("Missing", None)];
    let filter = TaskFilter { min_date: Some(ymd(2024, 5, 2)), ..TaskFilter::default() };
    let out = query(&tasks, ListKind::Finished, &filter, SortOrder::Ascending, today());
    assert_eq!(names(out), vec!["Due long ago"]);
}

#[test]
fn test_finished_ignores_active_only_filters() {
    let tasks = vec![finished("Done", Some("01.01.2024"))];
    let filter = TaskFilter {
        overdue_only: true,
        quick_range: Some(QuickRange::Today),
        ..TaskFilter::default()
    };
    let out = query(&tasks, ListKind::Finished, &filter, SortOrder::Ascending, today());
    assert_eq!(names(out), vec!["Done"]);
}

#[test]
fn test_filter_date_parsing() {
    assert_eq!(parse_filter_date("").unwrap(), None);
    assert_eq!(parse_filter_date("  ").unwrap(), None);
    assert_eq!(parse_filter_date("10.05.2024").unwrap(), Some(ymd(2024, 5, 10)));
    assert_eq!(parse_filter_date("2024-05-10").unwrap(), Some(ymd(2024, 5, 10)));
    assert!(matches!(parse_filter_date("next friday"), Err(TaskError::InvalidFilterDate(_))));
}

#[test]
fn test_query_reflects_latest_state() {
    let mut tasks = active_sample();
    let filter = TaskFilter { priority: Some(Priority::Red), ..TaskFilter::default() };
    assert_eq!(query(&tasks, ListKind::Active, &filter, SortOrder::Ascending, today()).len(), 2);
    tasks[0].priority = Priority::Blue;
    assert_eq!(query(&tasks, ListKind::Active, &filter, SortOrder::Ascending, today()).len(), 1);
}
