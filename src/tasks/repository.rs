//! Task list persistence.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use tracing::debug;

use super::error::TaskError;
use crate::types::TaskList;

/// Storage backend for the task list.
pub trait TaskRepository: Send + Sync {
    /// Loads the persisted task list. A store that was never written
    /// loads as an empty list.
    ///
    /// # Errors
    ///
    /// Returns an error if the list cannot be read or parsed.
    fn load(&self) -> Result<TaskList, TaskError>;

    /// Replaces the persisted task list.
    ///
    /// # Errors
    ///
    /// Returns an error if the list cannot be written.
    fn save(&self, list: &TaskList) -> Result<(), TaskError>;
}

// ============================================================================
// JsonFileRepository
// ============================================================================

/// Stores the task list as pretty-printed JSON in a single file.
///
/// Writes go to a sibling temporary file that is then renamed over the
/// target, so a crash never leaves a half-written list behind.
#[derive(Debug, Clone)]
pub struct JsonFileRepository {
    path: PathBuf,
}

impl JsonFileRepository {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Returns the path of the task file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }

    fn storage_error(&self, source: std::io::Error) -> TaskError {
        TaskError::Storage {
            path: self.path.clone(),
            source,
        }
    }
}

impl TaskRepository for JsonFileRepository {
    fn load(&self) -> Result<TaskList, TaskError> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!("Task file {} not found, starting empty", self.path.display());
                return Ok(TaskList::default());
            }
            Err(e) => return Err(self.storage_error(e)),
        };

        serde_json::from_str(&content).map_err(|source| TaskError::Corrupt {
            path: self.path.clone(),
            source,
        })
    }

    fn save(&self, list: &TaskList) -> Result<(), TaskError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(|e| self.storage_error(e))?;
            }
        }

        let json = serde_json::to_string_pretty(list).map_err(|source| TaskError::Corrupt {
            path: self.path.clone(),
            source,
        })?;

        let temp = self.temp_path();
        fs::write(&temp, json).map_err(|e| self.storage_error(e))?;
        fs::rename(&temp, &self.path).map_err(|e| self.storage_error(e))?;

        debug!(
            "Saved {} tasks to {}",
            list.tasks.len(),
            self.path.display()
        );
        Ok(())
    }
}

// ============================================================================
// InMemoryRepository
// ============================================================================

/// Keeps the task list in memory. Used by tests and when no task file
/// is wanted.
#[derive(Debug, Default)]
pub struct InMemoryRepository {
    list: Mutex<TaskList>,
    save_count: Mutex<usize>,
}

impl InMemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a repository pre-populated with a task list.
    pub fn with_list(list: TaskList) -> Self {
        Self {
            list: Mutex::new(list),
            save_count: Mutex::new(0),
        }
    }

    /// Returns a copy of the stored list.
    pub fn snapshot(&self) -> TaskList {
        self.list
            .lock()
            .map(|list| list.clone())
            .unwrap_or_default()
    }

    /// Number of saves performed.
    pub fn save_count(&self) -> usize {
        self.save_count.lock().map(|count| *count).unwrap_or(0)
    }
}

impl TaskRepository for InMemoryRepository {
    fn load(&self) -> Result<TaskList, TaskError> {
        Ok(self.snapshot())
    }

    fn save(&self, list: &TaskList) -> Result<(), TaskError> {
        if let Ok(mut stored) = self.list.lock() {
            *stored = list.clone();
        }
        if let Ok(mut count) = self.save_count.lock() {
            *count += 1;
        }
        Ok(())
    }
}
