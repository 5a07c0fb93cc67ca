use chrono::NaiveDate;
use comfy_table::presets::UTF8_FULL;
use comfy_table::{Attribute, Cell, Color, ContentArrangement, Table};

use crate::error::TaskError;
use crate::lifecycle::{complete_task, create_task, edit_task, reactivate_task, Completion};
use crate::models::{Priority, Recurrence, Task, TaskDraft, TaskId};
use crate::query::{is_overdue, parse_filter_date, query, ListKind, QuickRange, SortOrder, TaskFilter};
use crate::reminder::{Notifier, ReminderScheduler, StdoutNotifier};
use crate::storage::{Persistence, TaskStore};

/// Filter and sort options shared by `list` and `finished`.
#[derive(Debug, Clone, Default)]
pub struct ListOptions {
    pub priority: Option<Priority>,
    pub overdue: bool,
    /// Lower date bound as typed; an invalid value is reported and ignored.
    pub from: Option<String>,
    pub quick_range: Option<QuickRange>,
    pub search: Option<String>,
    pub descending: bool,
}

impl ListOptions {
    /// Builds the query filter. An unreadable `from` date is reported on stderr and dropped.
    pub fn filter(&self) -> TaskFilter {
        let min_date = match parse_filter_date(self.from.as_deref().unwrap_or_default()) {
            Ok(d) => d,
            Err(e) => {
                eprintln!("Warning: {}. Showing tasks without the date filter.", e);
                None
            }
        };
        TaskFilter {
            priority: self.priority,
            overdue_only: self.overdue,
            min_date,
            quick_range: self.quick_range,
            name_contains: self.search.clone().unwrap_or_default(),
        }
    }

    pub fn order(&self) -> SortOrder {
        if self.descending {
            SortOrder::Descending
        } else {
            SortOrder::Ascending
        }
    }
}

/// Field overrides for `edit`. `None` keeps the current value.
#[derive(Debug, Clone, Default)]
pub struct EditOptions {
    pub name: Option<String>,
    pub due: Option<String>,
    pub info: Option<String>,
    pub priority: Option<Priority>,
    pub recurrence: Option<Option<Recurrence>>,
}

pub fn priority_color(priority: Priority) -> Color {
    match priority {
        Priority::Red => Color::Red,
        Priority::Blue => Color::Blue,
        Priority::Green => Color::Green,
    }
}

/// "Today", "3d" or "2d overdue" relative to `today`; "?" when the date is unreadable.
pub fn time_left(task: &Task, today: NaiveDate) -> String {
    match task.due() {
        None => "?".to_string(),
        Some(due) => {
            let days_left = (due - today).num_days();
            if days_left < 0 {
                format!("{}d overdue", days_left.abs())
            } else if days_left == 0 {
                "Today".to_string()
            } else {
                format!("{}d", days_left)
            }
        }
    }
}

/// Adds a new active task and returns its id.
pub fn cmd_add<P: Persistence>(
    store: &mut TaskStore<P>,
    draft: TaskDraft,
    today: NaiveDate,
) -> Result<TaskId, TaskError> {
    let id = create_task(store, &draft, today)?;
    println!("Task added (id = {}).", id);
    Ok(id)
}

/// Edits an active task. The resulting record is validated as a whole.
pub fn cmd_edit<P: Persistence>(
    store: &mut TaskStore<P>,
    id: TaskId,
    edits: EditOptions,
) -> Result<(), TaskError> {
    let current = store
        .get(ListKind::Active, id)
        .ok_or(TaskError::NotFound { id, list: ListKind::Active })?;
    let mut draft = TaskDraft::from_task(current);
    if let Some(n) = edits.name { draft.name = n; }
    if let Some(d) = edits.due { draft.date = d; }
    if let Some(i) = edits.info { draft.info = i; }
    if let Some(p) = edits.priority { draft.priority = p; }
    if let Some(r) = edits.recurrence { draft.recurrence = r; }
    edit_task(store, id, &draft)?;
    println!("Task {} updated.", id);
    Ok(())
}

/// Marks an active task as complete.
pub fn cmd_complete<P: Persistence>(
    store: &mut TaskStore<P>,
    id: TaskId,
    today: NaiveDate,
) -> Result<Completion, TaskError> {
    let done = complete_task(store, id, today)?;
    println!("Task {} has been completed.", id);
    if let Some(next) = done.successor.and_then(|s| store.get(ListKind::Active, s)) {
        println!("Recurring task created (id = {}) due on {}.", next.id, next.date);
    }
    Ok(done)
}

/// Sets a finished task active again.
pub fn cmd_reactivate<P: Persistence>(store: &mut TaskStore<P>, id: TaskId) -> Result<(), TaskError> {
    reactivate_task(store, id)?;
    println!("Task {} has been set active again.", id);
    Ok(())
}

/// Lists active tasks in a formatted table.
pub fn cmd_list<P: Persistence>(store: &TaskStore<P>, options: &ListOptions, today: NaiveDate) {
    let tasks = query(store.active(), ListKind::Active, &options.filter(), options.order(), today);
    if tasks.is_empty() {
        println!("No active tasks found.");
        return;
    }

    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(header(&["ID", "Name", "Due", "Time Left", "Priority", "Recurrence"]));

    for t in tasks {
        let overdue = is_overdue(t, today);
        let color = if overdue { Color::Red } else { priority_color(t.priority) };
        let name = if overdue { format!("⚠ {}", t.name) } else { t.name.clone() };
        table.add_row(vec![
            Cell::new(t.id),
            Cell::new(name).fg(color),
            Cell::new(&t.date),
            Cell::new(time_left(t, today)).fg(if overdue { Color::Red } else { Color::Reset }),
            Cell::new(t.priority.label()).fg(priority_color(t.priority)),
            Cell::new(Recurrence::label(t.recurrence)),
        ]);
    }

    println!("{table}");
}

/// Lists finished tasks in a formatted table.
pub fn cmd_finished<P: Persistence>(store: &TaskStore<P>, options: &ListOptions, today: NaiveDate) {
    let tasks = query(store.finished(), ListKind::Finished, &options.filter(), options.order(), today);
    if tasks.is_empty() {
        println!("No finished tasks found.");
        return;
    }

    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(header(&["ID", "Name", "Due", "Finished", "Priority"]));

    for t in tasks {
        table.add_row(vec![
            Cell::new(t.id),
            Cell::new(&t.name).fg(priority_color(t.priority)),
            Cell::new(&t.date),
            Cell::new(t.finished_date.as_deref().unwrap_or("?")),
            Cell::new(t.priority.label()).fg(priority_color(t.priority)),
        ]);
    }

    println!("{table}");
}

/// Prints every field of one task.
pub fn cmd_show<P: Persistence>(store: &TaskStore<P>, id: TaskId, today: NaiveDate) -> Result<(), TaskError> {
    let (kind, t) = store.find(id).ok_or(TaskError::UnknownTask(id))?;

    let mut table = Table::new();
    table.load_preset(UTF8_FULL);
    table.add_row(vec![Cell::new("Name"), Cell::new(&t.name)]);
    table.add_row(vec![Cell::new("Status"), Cell::new(kind)]);
    let due = match kind {
        ListKind::Active => format!("{} ({})", t.date, time_left(t, today)),
        ListKind::Finished => t.date.clone(),
    };
    table.add_row(vec![Cell::new("Due"), Cell::new(due)]);
    table.add_row(vec![
        Cell::new("Priority"),
        Cell::new(format!("{} ({})", t.priority.label(), t.priority)).fg(priority_color(t.priority)),
    ]);
    table.add_row(vec![Cell::new("Recurrence"), Cell::new(Recurrence::label(t.recurrence))]);
    table.add_row(vec![Cell::new("Created"), Cell::new(or_unknown(&t.created_date))]);
    if kind == ListKind::Finished {
        table.add_row(vec![Cell::new("Finished"), Cell::new(t.finished_date.as_deref().unwrap_or("?"))]);
    }
    table.add_row(vec![Cell::new("Info"), Cell::new(&t.info)]);
    println!("{table}");
    Ok(())
}

/// Runs a single reminder check and prints the result.
pub fn cmd_remind<P: Persistence>(store: &TaskStore<P>, today: NaiveDate) {
    let now = std::time::Instant::now();
    let mut scheduler = ReminderScheduler::new(std::time::Duration::ZERO, std::time::Duration::ZERO);
    scheduler.start(now);
    let mut notifier = StdoutNotifier;
    if !scheduler.tick(now, store.active(), today, &mut notifier as &mut dyn Notifier) {
        println!("Nothing due today.");
    }
}

fn header(titles: &[&str]) -> Vec<Cell> {
    titles
        .iter()
        .map(|t| Cell::new(t).add_attribute(Attribute::Bold))
        .collect()
}

fn or_unknown(s: &str) -> &str {
    if s.is_empty() { "?" } else { s }
}
