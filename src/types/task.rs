//! Task data types.
//!
//! These are the records the task store persists and the CLI displays.
//! Field names serialize in camelCase; `startTime` is an RFC 3339 string.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Number of id characters shown by the CLI.
pub const SHORT_ID_LEN: usize = 8;

/// A named unit of work with a target duration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    /// Unique identifier (UUID v4)
    pub id: String,
    /// Task title
    pub title: String,
    /// Optional details
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Target duration in minutes
    pub duration: u32,
    /// When the task was last selected
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_time: Option<DateTime<Utc>>,
    /// Whether the task has been completed
    #[serde(default)]
    pub is_completed: bool,
    /// Whether the task is bound to the countdown
    #[serde(default)]
    pub is_active: bool,
    /// Optional display color
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

impl Task {
    /// Returns the leading characters of the id.
    pub fn short_id(&self) -> &str {
        let end = self
            .id
            .char_indices()
            .nth(SHORT_ID_LEN)
            .map_or(self.id.len(), |(i, _)| i);
        &self.id[..end]
    }
}

/// The persisted task list.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TaskList {
    /// All tasks in creation order
    pub tasks: Vec<Task>,
    /// Id of the active task, if any
    pub active_task_id: Option<String>,
}

/// Input for creating a task.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewTask {
    /// Task title
    pub title: String,
    /// Target duration in minutes
    pub duration: u32,
    /// Optional details
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Optional display color
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

/// Partial update of a task. `None` leaves a field unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskUpdate {
    pub title: Option<String>,
    pub description: Option<String>,
    pub duration: Option<u32>,
    pub color: Option<String>,
}
