//! Filtering and sorting over one task list.
//!
//! Results are recomputed on every call; nothing derived is cached between store mutations.

use std::fmt;

use chrono::{Duration, NaiveDate};

use crate::dates::parse_date;
use crate::error::TaskError;
use crate::models::{Priority, Task};

/// Which of the two collections a task lives in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ListKind {
    Active,
    Finished,
}

impl fmt::Display for ListKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ListKind::Active => f.write_str("active"),
            ListKind::Finished => f.write_str("finished"),
        }
    }
}

/// Shortcut date windows for the active list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuickRange {
    /// Due on the current calendar day.
    Today,
    /// Due between today and today + 7 days, both inclusive.
    ThisWeek,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    #[default]
    Ascending,
    Descending,
}

impl SortOrder {
    pub fn toggled(self) -> SortOrder {
        match self {
            SortOrder::Ascending => SortOrder::Descending,
            SortOrder::Descending => SortOrder::Ascending,
        }
    }
}

/// Filter predicates, combined with logical AND.
///
/// On the finished list `min_date` applies to the finished date, and
/// `overdue_only` / `quick_range` are ignored.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TaskFilter {
    pub priority: Option<Priority>,
    pub overdue_only: bool,
    /// Inclusive lower bound. Tasks whose date is missing or unparseable are excluded.
    pub min_date: Option<NaiveDate>,
    pub quick_range: Option<QuickRange>,
    /// Case-insensitive substring of the name. Empty means no filter.
    pub name_contains: String,
}

/// Parses the text of a "from date" filter field.
///
/// An empty field is no filter; an unparseable one is an error the caller reports
/// before listing without the date bound.
pub fn parse_filter_date(text: &str) -> Result<Option<NaiveDate>, TaskError> {
    let text = text.trim();
    if text.is_empty() {
        return Ok(None);
    }
    parse_date(text)
        .map(Some)
        .ok_or_else(|| TaskError::InvalidFilterDate(text.to_string()))
}

/// An active task is overdue when its due date is strictly before today.
pub fn is_overdue(task: &Task, today: NaiveDate) -> bool {
    task.due().is_some_and(|d| d < today)
}

/// The date a list is filtered and sorted by.
fn list_date(task: &Task, kind: ListKind) -> Option<NaiveDate> {
    match kind {
        ListKind::Active => task.due(),
        ListKind::Finished => task.finished_on(),
    }
}

fn matches(task: &Task, kind: ListKind, filter: &TaskFilter, needle: &str, today: NaiveDate) -> bool {
    if filter.priority.is_some_and(|p| p != task.priority) {
        return false;
    }

    let date = list_date(task, kind);
    if let Some(min) = filter.min_date {
        if date.map_or(true, |d| d < min) {
            return false;
        }
    }

    if kind == ListKind::Active {
        if filter.overdue_only && date.map_or(true, |d| d >= today) {
            return false;
        }
        match filter.quick_range {
            Some(QuickRange::Today) if date != Some(today) => return false,
            Some(QuickRange::ThisWeek) => {
                let week_ahead = today + Duration::days(7);
                if date.map_or(true, |d| d < today || d > week_ahead) {
                    return false;
                }
            }
            _ => {}
        }
    }

    needle.is_empty() || task.name.to_lowercase().contains(needle)
}

/// Filters `tasks` and orders them by date.
///
/// Active tasks with an unparseable due date sort as the latest possible date;
/// finished tasks with an unparseable finished date sort as the earliest.
/// Ties keep list order in both directions.
pub fn query<'a>(
    tasks: &'a [Task],
    kind: ListKind,
    filter: &TaskFilter,
    order: SortOrder,
    today: NaiveDate,
) -> Vec<&'a Task> {
    let needle = filter.name_contains.trim().to_lowercase();
    let mut out: Vec<&Task> = tasks
        .iter()
        .filter(|t| matches(t, kind, filter, &needle, today))
        .collect();

    let unknown = match kind {
        ListKind::Active => NaiveDate::MAX,
        ListKind::Finished => NaiveDate::MIN,
    };
    let key = |t: &Task| list_date(t, kind).unwrap_or(unknown);
    match order {
        SortOrder::Ascending => out.sort_by_key(|t| key(*t)),
        SortOrder::Descending => out.sort_by(|a, b| key(*b).cmp(&key(*a))),
    }
    out
}
