//! The authoritative task collection and its persistence round-trip.

use tracing::{info, warn};

use crate::error::StoreError;
use crate::storage::Storage;
use crate::task::{Task, TaskDraft, TaskStatus};

#[derive(Debug)]
pub struct TaskStore<S> {
    storage: S,
    key: String,
    tasks: Vec<Task>,
    dirty: bool,
}

impl<S: Storage> TaskStore<S> {
    /// Loads the collection stored under `key`. Missing, unreadable or
    /// malformed data yields an empty collection.
    pub fn load(storage: S, key: impl Into<String>) -> Self {
        let key = key.into();
        let tasks = match storage.get_item(&key) {
            Ok(Some(data)) => match serde_json::from_str::<Vec<Task>>(&data) {
                Ok(tasks) => sanitize(tasks),
                Err(err) => {
                    warn!(%key, "Stored tasks are malformed, starting empty: {err}");
                    Vec::new()
                }
            },
            Ok(None) => Vec::new(),
            Err(err) => {
                warn!(%key, "Task storage unavailable, starting empty: {err}");
                Vec::new()
            }
        };
        info!(count = tasks.len(), "Loaded tasks");

        Self {
            storage,
            key,
            tasks,
            dirty: false,
        }
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == id)
    }

    pub fn get_tasks_by_status(&self, status: TaskStatus) -> Vec<&Task> {
        self.tasks.iter().filter(|t| t.status == status).collect()
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    pub fn storage_mut(&mut self) -> &mut S {
        &mut self.storage
    }

    /// True when the last commit failed and memory is ahead of storage.
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Appends a new task built from `draft`. The status is always `Todo`.
    pub fn create(&mut self, draft: TaskDraft) -> Result<Task, StoreError> {
        let task = Task::from_draft(draft);
        info!(id = %task.id, title = %task.title, "Creating task");
        self.tasks.push(task.clone());
        self.commit()?;
        Ok(task)
    }

    /// Replaces the task with the same id. Unknown ids leave the collection untouched.
    pub fn update(&mut self, task: Task) -> Result<(), StoreError> {
        let slot = self
            .tasks
            .iter_mut()
            .find(|t| t.id == task.id)
            .ok_or_else(|| StoreError::NotFound(task.id.clone()))?;
        info!(id = %task.id, status = %task.status, "Updating task");
        *slot = task;
        self.commit()
    }

    pub fn set_status(&mut self, id: &str, status: TaskStatus) -> Result<(), StoreError> {
        let task = self
            .tasks
            .iter_mut()
            .find(|t| t.id == id)
            .ok_or_else(|| StoreError::NotFound(id.to_string()))?;
        if task.status == status {
            return Ok(());
        }
        info!(%id, from = %task.status, to = %status, "Changing task status");
        task.status = status;
        self.commit()
    }

    /// Moves a task one stage forward (`direction > 0`) or back (`direction < 0`).
    pub fn move_task(&mut self, id: &str, direction: isize) -> Result<TaskStatus, StoreError> {
        let current = self
            .get(id)
            .map(|t| t.status)
            .ok_or_else(|| StoreError::NotFound(id.to_string()))?;
        let new_status = current.step(direction);
        self.set_status(id, new_status)?;
        Ok(new_status)
    }

    /// Removes the task with `id`, returning whether anything was removed.
    pub fn delete(&mut self, id: &str) -> Result<bool, StoreError> {
        let before = self.tasks.len();
        self.tasks.retain(|t| t.id != id);
        if self.tasks.len() == before {
            return Ok(false);
        }
        info!(%id, "Deleted task");
        self.commit()?;
        Ok(true)
    }

    /// Writes the full collection to storage. Runs after every mutation; on
    /// failure the store stays dirty so the next commit or [`flush`](Self::flush)
    /// writes again.
    pub fn commit(&mut self) -> Result<(), StoreError> {
        self.dirty = true;
        let data = serde_json::to_string_pretty(&self.tasks)?;
        if let Err(err) = self.storage.set_item(&self.key, &data) {
            warn!(key = %self.key, "Failed to save tasks: {err}");
            return Err(err.into());
        }
        self.dirty = false;
        Ok(())
    }

    /// Commits only if a previous write failed.
    pub fn flush(&mut self) -> Result<(), StoreError> {
        if self.dirty {
            self.commit()
        } else {
            Ok(())
        }
    }

    pub fn into_storage(self) -> S {
        self.storage
    }
}

/// Drops records without an id or with a blank title or description, then
/// any record whose id repeats an earlier one.
fn sanitize(tasks: Vec<Task>) -> Vec<Task> {
    let total = tasks.len();
    let mut valid: Vec<Task> = tasks
        .into_iter()
        .filter(|t| !t.id.is_empty() && !t.title.trim().is_empty() && !t.desc.trim().is_empty())
        .collect();
    if valid.len() != total {
        warn!(dropped = total - valid.len(), "Dropped tasks with missing fields");
    }

    let before = valid.len();
    let mut seen = std::collections::HashSet::new();
    valid.retain(|t| seen.insert(t.id.clone()));
    if valid.len() != before {
        warn!(dropped = before - valid.len(), "Dropped tasks with duplicate ids");
    }
    valid
}
