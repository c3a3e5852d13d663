//! Core data types for the countdown.
//!
//! This module defines the data structures used for:
//! - The countdown state machine (`countdown`)
//! - Tasks and the persisted task list (`task`)
//! - IPC request/response serialization

mod countdown;
mod task;

pub use countdown::{
    progress, total_seconds, CountdownCommand, CountdownEffect, CountdownPhase,
    CountdownSnapshot, CountdownState, CueChannel, ALMOST_END_SECONDS, NEAR_END_ELAPSED_TENTHS,
    SECONDS_PER_MINUTE,
};
pub use task::{NewTask, Task, TaskList, TaskUpdate, SHORT_ID_LEN};

use serde::{Deserialize, Serialize};

/// Shortest allowed countdown duration in minutes.
pub const MIN_DURATION_MINUTES: u32 = 1;

/// Longest allowed countdown duration in minutes (one day).
pub const MAX_DURATION_MINUTES: u32 = 1440;

/// Validates a duration in minutes.
///
/// Returns an error message if validation fails.
pub fn validate_duration(minutes: u32) -> Result<(), String> {
    if !(MIN_DURATION_MINUTES..=MAX_DURATION_MINUTES).contains(&minutes) {
        return Err(format!(
            "時間は{}-{}分の範囲で指定してください",
            MIN_DURATION_MINUTES, MAX_DURATION_MINUTES
        ));
    }
    Ok(())
}

// ============================================================================
// IPC Types
// ============================================================================

/// Parameters for the add-task command.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddTaskParams {
    /// Task title
    pub title: String,
    /// Duration in minutes
    pub duration: u32,
    /// Optional description
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl From<AddTaskParams> for NewTask {
    fn from(params: AddTaskParams) -> Self {
        NewTask {
            title: params.title,
            duration: params.duration,
            description: params.description,
            color: None,
        }
    }
}

/// IPC request from client to daemon.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "command", rename_all = "snake_case")]
pub enum IpcRequest {
    /// Start or resume the countdown
    Start,
    /// Pause the countdown
    Pause,
    /// Acknowledge completion or re-arm the countdown
    Reset,
    /// Re-arm the countdown with a new duration
    SetTime {
        /// Duration in minutes
        minutes: u32,
    },
    /// Dismiss the completion alert
    CloseAlert,
    /// Query the current status
    Status,
    /// Create a task
    AddTask {
        /// Task parameters
        #[serde(flatten)]
        params: AddTaskParams,
    },
    /// List all tasks
    ListTasks,
    /// Make a task active and bind it to the countdown
    SelectTask {
        /// Task id or unique id prefix
        id: String,
    },
    /// Delete a task
    RemoveTask {
        /// Task id or unique id prefix
        id: String,
    },
    /// Mark the active task completed
    CompleteTask,
    /// Delete all completed tasks
    ClearCompleted,
}

/// Response data for IPC responses.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResponseData {
    /// Countdown snapshot
    #[serde(skip_serializing_if = "Option::is_none")]
    pub countdown: Option<CountdownSnapshot>,
    /// The active task
    #[serde(rename = "activeTask", skip_serializing_if = "Option::is_none")]
    pub active_task: Option<Task>,
    /// All tasks
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tasks: Option<Vec<Task>>,
    /// Id of the task the command affected
    #[serde(rename = "taskId", skip_serializing_if = "Option::is_none")]
    pub task_id: Option<String>,
}

impl ResponseData {
    /// Creates response data from a countdown snapshot.
    pub fn from_countdown(countdown: CountdownSnapshot, active_task: Option<Task>) -> Self {
        Self {
            countdown: Some(countdown),
            active_task,
            ..Self::default()
        }
    }

    /// Creates response data from a task list.
    pub fn from_tasks(tasks: Vec<Task>, active_task: Option<Task>) -> Self {
        Self {
            tasks: Some(tasks),
            active_task,
            ..Self::default()
        }
    }

    /// Sets the affected task id.
    pub fn with_task_id(mut self, task_id: impl Into<String>) -> Self {
        self.task_id = Some(task_id.into());
        self
    }
}

/// IPC response from daemon to client.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IpcResponse {
    /// Response status ("success" or "error")
    pub status: String,
    /// Human-readable message
    pub message: String,
    /// Optional response data
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<ResponseData>,
}

impl IpcResponse {
    /// Creates a success response.
    pub fn success(message: impl Into<String>, data: Option<ResponseData>) -> Self {
        Self {
            status: "success".to_string(),
            message: message.into(),
            data,
        }
    }

    /// Creates an error response.
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            status: "error".to_string(),
            message: message.into(),
            data: None,
        }
    }

    /// Returns true for a success response.
    pub fn is_success(&self) -> bool {
        self.status == "success"
    }
}

// ============================================================================
// Tests
// ============================================================================
