use std::fs;
use std::collections::HashSet;
use std::path::PathBuf;

use crate::error::{StorageError, TaskError};
use crate::models::{Task, TaskId, TaskState};
use crate::query::ListKind;

/// Load/save contract for the persisted task document.
pub trait Persistence {
    /// Reads both lists. A missing or unreadable resource yields two empty lists.
    fn load(&self) -> TaskState;

    /// Overwrites the backing resource with `state`.
    fn save(&mut self, state: &TaskState) -> Result<(), StorageError>;
}

/// JSON file on disk (`{ "active": [...], "finished": [...] }`).
#[derive(Debug, Clone)]
pub struct JsonFile {
    path: PathBuf,
}

impl JsonFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        JsonFile { path: path.into() }
    }
}

impl Persistence for JsonFile {
    fn load(&self) -> TaskState {
        let text = match fs::read_to_string(&self.path) {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %self.path.display(), "no data file yet, starting empty");
                return TaskState::default();
            }
            Err(e) => {
                tracing::warn!(path = %self.path.display(), error = %e, "could not read data file, starting empty");
                return TaskState::default();
            }
        };
        match serde_json::from_str::<TaskState>(&text) {
            Ok(state) => {
                tracing::debug!(
                    active = state.active.len(),
                    finished = state.finished.len(),
                    "loaded tasks"
                );
                state
            }
            Err(e) => {
                tracing::warn!(path = %self.path.display(), error = %e, "data file is malformed, starting empty");
                TaskState::default()
            }
        }
    }

    fn save(&mut self, state: &TaskState) -> Result<(), StorageError> {
        let mut s = serde_json::to_string_pretty(state)?;
        s.push('\n');
        if let Some(dir) = self.path.parent().filter(|d| !d.as_os_str().is_empty()) {
            fs::create_dir_all(dir).map_err(|source| StorageError::Io {
                path: dir.to_path_buf(),
                source,
            })?;
        }
        fs::write(&self.path, s).map_err(|source| StorageError::Io {
            path: self.path.clone(),
            source,
        })?;
        tracing::debug!(path = %self.path.display(), "saved tasks");
        Ok(())
    }
}

/// In-memory backend. Keeps the last saved document and counts writes.
#[derive(Debug, Clone, Default)]
pub struct MemoryBackend {
    pub saved: Option<TaskState>,
    pub saves: usize,
}

impl MemoryBackend {
    pub fn with_state(state: TaskState) -> Self {
        MemoryBackend { saved: Some(state), saves: 0 }
    }
}

impl Persistence for MemoryBackend {
    fn load(&self) -> TaskState {
        self.saved.clone().unwrap_or_default()
    }

    fn save(&mut self, state: &TaskState) -> Result<(), StorageError> {
        self.saved = Some(state.clone());
        self.saves += 1;
        Ok(())
    }
}

/// The in-memory task collection: an active and a finished list over a persistence backend.
///
/// Every task carries a persisted [`TaskId`]. Tasks loaded without one (older
/// files) or with an id already taken get a fresh id above the highest known one,
/// active list first, then finished, so the same file always yields the same ids.
/// Ids are never reused.
#[derive(Debug)]
pub struct TaskStore<P: Persistence> {
    backend: P,
    state: TaskState,
    next_id: TaskId,
}

impl<P: Persistence> TaskStore<P> {
    /// Loads the backend's document into a new store.
    pub fn open(backend: P) -> Self {
        let mut state = backend.load();
        let highest = state.active.iter().chain(&state.finished).map(|t| t.id).max().unwrap_or(0);
        let mut next_id = highest.saturating_add(1);
        let mut seen = HashSet::new();
        for task in state.active.iter_mut().chain(state.finished.iter_mut()) {
            if task.id == 0 || !seen.insert(task.id) {
                task.id = next_id;
                next_id += 1;
            }
        }
        TaskStore { backend, state, next_id }
    }

    pub fn active(&self) -> &[Task] {
        &self.state.active
    }

    pub fn finished(&self) -> &[Task] {
        &self.state.finished
    }

    pub fn list(&self, kind: ListKind) -> &[Task] {
        match kind {
            ListKind::Active => &self.state.active,
            ListKind::Finished => &self.state.finished,
        }
    }

    pub fn state(&self) -> &TaskState {
        &self.state
    }

    pub fn backend(&self) -> &P {
        &self.backend
    }

    pub fn backend_mut(&mut self) -> &mut P {
        &mut self.backend
    }

    pub fn get(&self, kind: ListKind, id: TaskId) -> Option<&Task> {
        self.list(kind).iter().find(|t| t.id == id)
    }

    /// Looks a task up in either list.
    pub fn find(&self, id: TaskId) -> Option<(ListKind, &Task)> {
        [ListKind::Active, ListKind::Finished]
            .into_iter()
            .find_map(|kind| self.get(kind, id).map(|t| (kind, t)))
    }

    /// Writes both lists to the backend, replacing its previous contents.
    pub fn save(&mut self) -> Result<(), StorageError> {
        self.backend.save(&self.state)
    }

    /// Applies `change` and persists the result.
    ///
    /// If `change` or the save fails, the store is put back exactly as it was.
    pub(crate) fn commit<T>(
        &mut self,
        change: impl FnOnce(&mut Self) -> Result<T, TaskError>,
    ) -> Result<T, TaskError> {
        let before = (self.state.clone(), self.next_id);
        let result = change(self).and_then(|value| {
            self.save()?;
            Ok(value)
        });
        if result.is_err() {
            (self.state, self.next_id) = before;
        }
        result
    }

    fn list_mut(&mut self, kind: ListKind) -> &mut Vec<Task> {
        match kind {
            ListKind::Active => &mut self.state.active,
            ListKind::Finished => &mut self.state.finished,
        }
    }

    pub(crate) fn get_mut(&mut self, kind: ListKind, id: TaskId) -> Option<&mut Task> {
        self.list_mut(kind).iter_mut().find(|t| t.id == id)
    }

    /// Appends `task` to a list under a fresh id and returns that id.
    pub(crate) fn push(&mut self, kind: ListKind, mut task: Task) -> TaskId {
        let id = self.next_id;
        self.next_id += 1;
        task.id = id;
        self.list_mut(kind).push(task);
        id
    }

    /// Moves a task between lists, keeping its id.
    pub(crate) fn take(&mut self, kind: ListKind, id: TaskId) -> Option<Task> {
        let list = self.list_mut(kind);
        let idx = list.iter().position(|t| t.id == id)?;
        Some(list.remove(idx))
    }

    pub(crate) fn put(&mut self, kind: ListKind, task: Task) {
        self.list_mut(kind).push(task);
    }
}
