use chrono::NaiveDate;

use crate::dates::{format_date, next_due_date, parse_entry_date};
use crate::error::TaskError;
use crate::models::{Task, TaskDraft, TaskId};
use crate::query::ListKind;
use crate::storage::{Persistence, TaskStore};

/// A draft that passed validation, with its date already canonicalised.
struct ValidDraft {
    name: String,
    date: String,
    info: String,
}

fn validate(draft: &TaskDraft) -> Result<ValidDraft, TaskError> {
    let name = draft.name.trim();
    let date = draft.date.trim();
    if name.is_empty() || date.is_empty() {
        return Err(TaskError::MissingFields);
    }
    let due = parse_entry_date(date).ok_or_else(|| TaskError::InvalidDueDate(date.to_string()))?;
    Ok(ValidDraft {
        name: name.to_string(),
        date: format_date(due),
        info: draft.info.trim().to_string(),
    })
}

/// Outcome of completing a task.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Completion {
    /// The completed task, now in the finished list under the same id.
    pub finished: TaskId,
    /// The regenerated active task, if the completed one recurs.
    pub successor: Option<TaskId>,
}

/// Creates a new active task and persists the store.
pub fn create_task<P: Persistence>(
    store: &mut TaskStore<P>,
    draft: &TaskDraft,
    today: NaiveDate,
) -> Result<TaskId, TaskError> {
    let valid = validate(draft)?;
    let task = Task {
        id: 0,
        name: valid.name,
        date: valid.date,
        info: valid.info,
        priority: draft.priority,
        created_date: format_date(today),
        recurrence: draft.recurrence,
        finished_date: None,
    };
    let id = store.commit(|store| Ok(store.push(ListKind::Active, task)))?;
    tracing::info!(id, "task created");
    Ok(id)
}

/// Replaces the mutable fields of an active task. `created_date` is left alone.
pub fn edit_task<P: Persistence>(
    store: &mut TaskStore<P>,
    id: TaskId,
    draft: &TaskDraft,
) -> Result<(), TaskError> {
    let valid = validate(draft)?;
    store.commit(|store| {
        let task = store
            .get_mut(ListKind::Active, id)
            .ok_or(TaskError::NotFound { id, list: ListKind::Active })?;
        task.name = valid.name;
        task.date = valid.date;
        task.info = valid.info;
        task.priority = draft.priority;
        task.recurrence = draft.recurrence;
        Ok(())
    })?;
    tracing::info!(id, "task updated");
    Ok(())
}

/// Moves an active task to the finished list, stamping today's date.
///
/// A recurring task with a parseable due date spawns a fresh active successor
/// carrying its name, info, priority and recurrence.
pub fn complete_task<P: Persistence>(
    store: &mut TaskStore<P>,
    id: TaskId,
    today: NaiveDate,
) -> Result<Completion, TaskError> {
    let successor = store.commit(|store| {
        let mut task = store
            .take(ListKind::Active, id)
            .ok_or(TaskError::NotFound { id, list: ListKind::Active })?;
        task.finished_date = Some(format_date(today));

        let successor = match (task.recurrence, task.due()) {
            (Some(recurrence), Some(due)) => next_due_date(due, recurrence).map(|next| Task {
                id: 0,
                name: task.name.clone(),
                date: format_date(next),
                info: task.info.clone(),
                priority: task.priority,
                created_date: format_date(today),
                recurrence: task.recurrence,
                finished_date: None,
            }),
            _ => None,
        };

        store.put(ListKind::Finished, task);
        Ok(successor.map(|t| store.push(ListKind::Active, t)))
    })?;
    match successor {
        Some(next) => tracing::info!(id, successor = next, "task completed, recurring successor created"),
        None => tracing::info!(id, "task completed"),
    }
    Ok(Completion { finished: id, successor })
}

/// Moves a finished task back to the active list unchanged.
///
/// Its `finished_date` stays on the record; membership in the active list is what makes it active.
pub fn reactivate_task<P: Persistence>(store: &mut TaskStore<P>, id: TaskId) -> Result<(), TaskError> {
    store.commit(|store| {
        let task = store
            .take(ListKind::Finished, id)
            .ok_or(TaskError::NotFound { id, list: ListKind::Finished })?;
        store.put(ListKind::Active, task);
        Ok(())
    })?;
    tracing::info!(id, "task reactivated");
    Ok(())
}
