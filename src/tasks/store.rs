//! The task store.
//!
//! Every mutation builds the next task list, persists it through the
//! repository and only then replaces the in-memory list. A failed write
//! leaves the store unchanged.

use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, info};
use uuid::Uuid;

use super::error::TaskError;
use super::repository::TaskRepository;
use crate::types::{
    NewTask, Task, TaskList, TaskUpdate, MAX_DURATION_MINUTES, MIN_DURATION_MINUTES,
};

/// Maximum task title length in characters.
pub const MAX_TITLE_LENGTH: usize = 100;

/// Validates and trims a task title.
///
/// # Errors
///
/// Returns an error if the title is empty or too long.
pub fn normalize_title(title: &str) -> Result<String, TaskError> {
    let trimmed = title.trim();
    if trimmed.is_empty() {
        return Err(TaskError::EmptyTitle);
    }
    if trimmed.chars().count() > MAX_TITLE_LENGTH {
        return Err(TaskError::TitleTooLong(MAX_TITLE_LENGTH));
    }
    Ok(trimmed.to_string())
}

/// Validates a task duration in minutes.
///
/// # Errors
///
/// Returns an error if the duration is out of range.
pub fn check_duration(duration: u32) -> Result<(), TaskError> {
    if !(MIN_DURATION_MINUTES..=MAX_DURATION_MINUTES).contains(&duration) {
        return Err(TaskError::InvalidDuration {
            value: duration,
            min: MIN_DURATION_MINUTES,
            max: MAX_DURATION_MINUTES,
        });
    }
    Ok(())
}

fn normalize_optional(text: Option<String>) -> Option<String> {
    text.map(|t| t.trim().to_string()).filter(|t| !t.is_empty())
}

/// Owns the task list and keeps it persisted.
pub struct TaskStore {
    repository: Arc<dyn TaskRepository>,
    list: TaskList,
}

impl TaskStore {
    /// Opens a store, loading the current list from the repository.
    ///
    /// # Errors
    ///
    /// Returns an error if the repository cannot be read or holds a task
    /// with an out-of-range duration.
    pub fn open(repository: Arc<dyn TaskRepository>) -> Result<Self, TaskError> {
        let mut list = repository.load()?;
        validate_loaded(&list)?;
        repair_active_flags(&mut list);
        debug!("Loaded {} tasks", list.tasks.len());
        Ok(Self { repository, list })
    }

    /// Returns every task in creation order.
    pub fn tasks(&self) -> &[Task] {
        &self.list.tasks
    }

    /// Returns true if the store holds no tasks.
    pub fn is_empty(&self) -> bool {
        self.list.tasks.is_empty()
    }

    /// Returns the active task, if any.
    pub fn active_task(&self) -> Option<&Task> {
        let id = self.list.active_task_id.as_deref()?;
        self.list.tasks.iter().find(|t| t.id == id)
    }

    /// Finds a task by full id or by unique id prefix.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` when nothing matches and `AmbiguousId` when a
    /// prefix matches more than one task.
    pub fn find(&self, id_or_prefix: &str) -> Result<&Task, TaskError> {
        let key = id_or_prefix.trim();
        if key.is_empty() {
            return Err(TaskError::NotFound(id_or_prefix.to_string()));
        }

        if let Some(task) = self.list.tasks.iter().find(|t| t.id == key) {
            return Ok(task);
        }

        let mut matches = self.list.tasks.iter().filter(|t| t.id.starts_with(key));
        match (matches.next(), matches.next()) {
            (Some(task), None) => Ok(task),
            (Some(_), Some(_)) => Err(TaskError::AmbiguousId(key.to_string())),
            (None, _) => Err(TaskError::NotFound(key.to_string())),
        }
    }

    /// Creates a task and returns it.
    ///
    /// New tasks are neither active nor completed.
    ///
    /// # Errors
    ///
    /// Returns an error if validation or persistence fails.
    pub fn add_task(&mut self, new_task: NewTask) -> Result<Task, TaskError> {
        let title = normalize_title(&new_task.title)?;
        check_duration(new_task.duration)?;

        let task = Task {
            id: Uuid::new_v4().to_string(),
            title,
            description: normalize_optional(new_task.description),
            duration: new_task.duration,
            start_time: None,
            is_completed: false,
            is_active: false,
            color: normalize_optional(new_task.color),
        };

        let mut next = self.list.clone();
        next.tasks.push(task.clone());
        self.commit(next)?;

        info!("Task added: {} ({} min)", task.title, task.duration);
        Ok(task)
    }

    /// Deletes a task and returns it. Clears the active task when it was
    /// the one removed.
    ///
    /// # Errors
    ///
    /// Returns an error if the task is not found or persistence fails.
    pub fn remove_task(&mut self, id_or_prefix: &str) -> Result<Task, TaskError> {
        let id = self.find(id_or_prefix)?.id.clone();

        let mut next = self.list.clone();
        let index = next
            .tasks
            .iter()
            .position(|t| t.id == id)
            .ok_or_else(|| TaskError::NotFound(id.clone()))?;
        let removed = next.tasks.remove(index);
        if next.active_task_id.as_deref() == Some(id.as_str()) {
            next.active_task_id = None;
        }
        self.commit(next)?;

        info!("Task removed: {}", removed.title);
        Ok(removed)
    }

    /// Applies a partial update and returns the updated task.
    ///
    /// # Errors
    ///
    /// Returns an error if the task is not found, a field is invalid or
    /// persistence fails.
    pub fn update_task(
        &mut self,
        id_or_prefix: &str,
        update: TaskUpdate,
    ) -> Result<Task, TaskError> {
        let id = self.find(id_or_prefix)?.id.clone();

        let title = update.title.as_deref().map(normalize_title).transpose()?;
        if let Some(duration) = update.duration {
            check_duration(duration)?;
        }

        let mut next = self.list.clone();
        let task = next
            .tasks
            .iter_mut()
            .find(|t| t.id == id)
            .ok_or_else(|| TaskError::NotFound(id.clone()))?;

        if let Some(title) = title {
            task.title = title;
        }
        if update.description.is_some() {
            task.description = normalize_optional(update.description);
        }
        if let Some(duration) = update.duration {
            task.duration = duration;
        }
        if update.color.is_some() {
            task.color = normalize_optional(update.color);
        }
        let updated = task.clone();
        self.commit(next)?;

        debug!("Task updated: {}", updated.id);
        Ok(updated)
    }

    /// Makes a task the active one and stamps its start time.
    ///
    /// # Errors
    ///
    /// Returns an error if the task is not found or persistence fails.
    pub fn select_task(&mut self, id_or_prefix: &str) -> Result<Task, TaskError> {
        let id = self.find(id_or_prefix)?.id.clone();
        let now = Utc::now();

        let mut next = self.list.clone();
        for task in &mut next.tasks {
            task.is_active = task.id == id;
            if task.is_active {
                task.start_time = Some(now);
            }
        }
        next.active_task_id = Some(id.clone());
        let selected = next
            .tasks
            .iter()
            .find(|t| t.id == id)
            .cloned()
            .ok_or_else(|| TaskError::NotFound(id.clone()))?;
        self.commit(next)?;

        info!("Task selected: {} ({} min)", selected.title, selected.duration);
        Ok(selected)
    }

    /// Marks the active task completed and clears the selection.
    ///
    /// Returns the completed task, or `None` when no task was active.
    ///
    /// # Errors
    ///
    /// Returns an error if persistence fails.
    pub fn complete_active_task(&mut self) -> Result<Option<Task>, TaskError> {
        let Some(id) = self.list.active_task_id.clone() else {
            return Ok(None);
        };

        let mut next = self.list.clone();
        next.active_task_id = None;
        let mut completed = None;
        for task in &mut next.tasks {
            if task.id == id {
                task.is_completed = true;
                task.is_active = false;
                completed = Some(task.clone());
            }
        }
        self.commit(next)?;

        if let Some(task) = &completed {
            info!("Task completed: {}", task.title);
        }
        Ok(completed)
    }

    /// Deletes every completed task and returns how many were removed.
    ///
    /// # Errors
    ///
    /// Returns an error if persistence fails.
    pub fn clear_completed_tasks(&mut self) -> Result<usize, TaskError> {
        let mut next = self.list.clone();
        next.tasks.retain(|t| !t.is_completed);
        let removed = self.list.tasks.len() - next.tasks.len();
        if removed == 0 {
            return Ok(0);
        }

        if let Some(active) = next.active_task_id.as_deref() {
            if !next.tasks.iter().any(|t| t.id == active) {
                next.active_task_id = None;
            }
        }
        self.commit(next)?;

        info!("Cleared {} completed tasks", removed);
        Ok(removed)
    }

    fn commit(&mut self, next: TaskList) -> Result<(), TaskError> {
        self.repository.save(&next)?;
        self.list = next;
        Ok(())
    }
}

impl std::fmt::Debug for TaskStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TaskStore")
            .field("list", &self.list)
            .finish_non_exhaustive()
    }
}

/// Rejects stored tasks the engine could not run.
fn validate_loaded(list: &TaskList) -> Result<(), TaskError> {
    for task in &list.tasks {
        check_duration(task.duration).map_err(|e| TaskError::InvalidRecord {
            id: task.id.clone(),
            source: Box::new(e),
        })?;
    }
    Ok(())
}

/// Makes `is_active` agree with `active_task_id` after loading.
fn repair_active_flags(list: &mut TaskList) {
    if let Some(active) = list.active_task_id.as_deref() {
        if !list.tasks.iter().any(|t| t.id == active) {
            list.active_task_id = None;
        }
    }
    let active = list.active_task_id.clone();
    for task in &mut list.tasks {
        task.is_active = active.as_deref() == Some(task.id.as_str());
    }
}

// ============================================================================
// Tests
// ============================================================================
