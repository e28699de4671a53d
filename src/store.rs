//! In-memory task store.
//!
//! `TaskStore` owns the authoritative, ordered task list for a session. It is
//! built empty or from a seed list, mutated only through `add`, `update`,
//! `remove` and `set_state`, and dropped when the session ends. Nothing is
//! ever written back to disk.

use std::collections::HashSet;
use std::fs;
use std::path::Path;

use chrono::Utc;
use serde::Deserialize;
use tracing::{debug, info};

use crate::error::SeedError;
use crate::fields::State;
use crate::task::{Task, TaskDraft};

/// The `{"tasks": [...]}` form of a seed file. A bare array is accepted too.
#[derive(Deserialize)]
struct WrappedSeed {
    tasks: Vec<Task>,
}

/// Ordered in-memory collection of tasks.
#[derive(Debug, Default)]
pub struct TaskStore {
    tasks: Vec<Task>,
    last_id: u64,
}

impl TaskStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a store holding `tasks` in the given order.
    pub fn with_seed(tasks: Vec<Task>) -> Result<Self, SeedError> {
        let mut seen = HashSet::with_capacity(tasks.len());
        for t in &tasks {
            if !seen.insert(t.id) {
                return Err(SeedError::DuplicateId(t.id));
            }
        }
        let last_id = tasks.iter().map(|t| t.id).max().unwrap_or(0);
        Ok(TaskStore { tasks, last_id })
    }

    /// Read a JSON seed file and build a store from it.
    pub fn load_seed(path: &Path) -> Result<Self, SeedError> {
        let buf = fs::read_to_string(path).map_err(|source| SeedError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        // Pick the shape up front so entry-level errors keep their message.
        let parsed = if buf.trim_start().starts_with('{') {
            serde_json::from_str::<WrappedSeed>(&buf).map(|seed| seed.tasks)
        } else {
            serde_json::from_str::<Vec<Task>>(&buf)
        };
        let tasks = parsed.map_err(|source| SeedError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        let store = Self::with_seed(tasks)?;
        info!(path = %path.display(), tasks = store.len(), "loaded seed");
        Ok(store)
    }

    /// Next id: the current time in milliseconds, bumped past every id
    /// already issued or seeded. Once the id space above is exhausted, the
    /// smallest unused id is handed out instead.
    fn fresh_id(&mut self) -> u64 {
        let Some(next) = self.last_id.checked_add(1) else {
            let id = self.smallest_unused_id();
            debug!(id, "id space exhausted, reusing a free id");
            return id;
        };
        let now = u64::try_from(Utc::now().timestamp_millis()).unwrap_or(0);
        let id = now.max(next);
        self.last_id = id;
        id
    }

    fn smallest_unused_id(&self) -> u64 {
        let used: HashSet<u64> = self.tasks.iter().map(|t| t.id).collect();
        (1..u64::MAX).find(|id| !used.contains(id)).unwrap_or(0)
    }

    /// Append a new task built from `draft` and return its id.
    pub fn add(&mut self, draft: TaskDraft) -> u64 {
        let id = self.fresh_id();
        self.tasks.push(Task::from_draft(id, draft));
        debug!(id, total = self.tasks.len(), "added task");
        id
    }

    /// Replace the stored task with the same id. Returns false if there is none.
    pub fn update(&mut self, task: Task) -> bool {
        match self.get_mut(task.id) {
            Some(slot) => {
                debug!(id = task.id, "updated task");
                *slot = task;
                true
            }
            None => {
                debug!(id = task.id, "update skipped, no such task");
                false
            }
        }
    }

    /// Delete the task with `id`. Returns false if there is none.
    ///
    /// Interactive callers go through the delete confirmation prompt first.
    pub fn remove(&mut self, id: u64) -> bool {
        let before = self.tasks.len();
        self.tasks.retain(|t| t.id != id);
        let removed = self.tasks.len() != before;
        debug!(id, removed, "remove task");
        removed
    }

    /// Set the lifecycle state of the task with `id`. Returns false if there is none.
    pub fn set_state(&mut self, id: u64, state: State) -> bool {
        match self.get_mut(id) {
            Some(t) => {
                t.state = state;
                debug!(id, ?state, "set task state");
                true
            }
            None => {
                debug!(id, "set_state skipped, no such task");
                false
            }
        }
    }

    /// Flip active/completed and return the new state.
    pub fn toggle_state(&mut self, id: u64) -> Option<State> {
        let next = self.get(id)?.state.flipped();
        self.set_state(id, next);
        Some(next)
    }

    pub fn get(&self, id: u64) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == id)
    }

    fn get_mut(&mut self, id: u64) -> Option<&mut Task> {
        self.tasks.iter_mut().find(|t| t.id == id)
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

    /// Distinct category labels in first-seen order.
    pub fn categories(&self) -> Vec<String> {
        let mut seen = HashSet::new();
        let mut out = Vec::new();
        for label in self.tasks.iter().flat_map(|t| t.category.iter()) {
            if !label.is_empty() && seen.insert(label.as_str()) {
                out.push(label.clone());
            }
        }
        out
    }
}
