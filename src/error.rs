use std::path::PathBuf;

use crate::models::TaskId;
use crate::query::ListKind;

/// Error type for reading and writing the data file.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("could not write {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("could not serialize tasks: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Errors surfaced to the user by task operations. None of them leave the store half-modified.
#[derive(Debug, thiserror::Error)]
pub enum TaskError {
    #[error("please enter a name and due date")]
    MissingFields,
    #[error("invalid due date '{0}': use date format DD.MM.YYYY (e.g. 20.10.2000)")]
    InvalidDueDate(String),
    #[error("the filter date '{0}' is invalid: use DD.MM.YYYY")]
    InvalidFilterDate(String),
    #[error("task {id} could not be found among {list} tasks")]
    NotFound { id: TaskId, list: ListKind },
    #[error("task {0} does not exist")]
    UnknownTask(TaskId),
    #[error(transparent)]
    Storage(#[from] StorageError),
}
