//! IPC Server for the countdown daemon.
//!
//! This module provides Unix Domain Socket IPC functionality:
//! - Server that listens on a Unix socket
//! - Request/response handling for countdown and task commands
//! - Integration with CountdownEngine and TaskStore for command execution

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{UnixListener, UnixStream};
use tokio::sync::Mutex;
use tokio::time::{timeout, Duration};
use tracing::debug;

use crate::tasks::TaskStore;
use crate::types::{
    validate_duration, AddTaskParams, IpcRequest, IpcResponse, ResponseData, Task,
};

use super::timer::CountdownEngine;

// ============================================================================
// Constants
// ============================================================================

/// Maximum request size in bytes (4KB)
const MAX_REQUEST_SIZE: usize = 4096;

/// Read timeout in seconds
const READ_TIMEOUT_SECS: u64 = 5;

// ============================================================================
// IpcError
// ============================================================================

/// IPC-specific error types.
#[derive(Debug, thiserror::Error)]
pub enum IpcError {
    /// Read error
    #[error("Failed to read request: {0}")]
    ReadError(String),

    /// Timeout error
    #[error("Operation timed out")]
    Timeout,

    /// Request too large
    #[error("Request too large (max {MAX_REQUEST_SIZE} bytes)")]
    RequestTooLarge,
}

// ============================================================================
// IpcServer
// ============================================================================

/// Unix Domain Socket IPC server.
pub struct IpcServer {
    /// Unix socket listener
    listener: UnixListener,
    /// Socket path (for cleanup)
    socket_path: PathBuf,
}

impl IpcServer {
    /// Creates a new IPC server bound to the specified socket path.
    ///
    /// If the socket file already exists, it will be removed before binding.
    ///
    /// # Errors
    ///
    /// Returns an error if the socket cannot be bound.
    pub fn new(socket_path: &Path) -> Result<Self> {
        if socket_path.exists() {
            std::fs::remove_file(socket_path)
                .with_context(|| format!("Failed to remove existing socket: {:?}", socket_path))?;
        }

        if let Some(parent) = socket_path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create socket directory: {:?}", parent))?;
        }

        let listener = UnixListener::bind(socket_path)
            .with_context(|| format!("Failed to bind Unix socket: {:?}", socket_path))?;

        Ok(Self {
            listener,
            socket_path: socket_path.to_path_buf(),
        })
    }

    /// Accepts an incoming client connection.
    ///
    /// # Errors
    ///
    /// Returns an error if the connection cannot be accepted.
    pub async fn accept(&self) -> Result<UnixStream> {
        let (stream, _addr) = self
            .listener
            .accept()
            .await
            .context("Failed to accept connection")?;
        Ok(stream)
    }

    /// Receives and deserializes an IPC request from the stream.
    ///
    /// Applies a read timeout to prevent blocking indefinitely.
    ///
    /// # Errors
    ///
    /// Returns an error if reading or deserialization fails.
    pub async fn receive_request(stream: &mut UnixStream) -> Result<IpcRequest> {
        let mut buffer = vec![0u8; MAX_REQUEST_SIZE + 1];

        let read_result = timeout(
            Duration::from_secs(READ_TIMEOUT_SECS),
            stream.read(&mut buffer),
        )
        .await;

        let n = match read_result {
            Ok(Ok(n)) => n,
            Ok(Err(e)) => return Err(IpcError::ReadError(e.to_string()).into()),
            Err(_) => return Err(IpcError::Timeout.into()),
        };

        if n == 0 {
            anyhow::bail!("Connection closed by client");
        }
        if n > MAX_REQUEST_SIZE {
            return Err(IpcError::RequestTooLarge.into());
        }

        let request: IpcRequest = serde_json::from_slice(&buffer[..n])
            .with_context(|| "Failed to deserialize IPC request")?;

        Ok(request)
    }

    /// Serializes and sends an IPC response to the stream, then closes
    /// the write half so the client sees the end of the response.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or writing fails.
    pub async fn send_response(stream: &mut UnixStream, response: &IpcResponse) -> Result<()> {
        let json = serde_json::to_vec(response).context("Failed to serialize IPC response")?;

        stream
            .write_all(&json)
            .await
            .context("Failed to write response")?;
        stream.flush().await.context("Failed to flush response")?;
        stream
            .shutdown()
            .await
            .context("Failed to close response stream")?;

        Ok(())
    }

    /// Handles one connection: one request in, one response out.
    ///
    /// A request that cannot be parsed is answered with an error response.
    ///
    /// # Errors
    ///
    /// Returns an error if the connection fails.
    pub async fn serve_connection(mut stream: UnixStream, handler: &RequestHandler) -> Result<()> {
        let response = match Self::receive_request(&mut stream).await {
            Ok(request) => {
                debug!("IPC request: {:?}", request);
                handler.handle(request).await
            }
            Err(e) => IpcResponse::error(format!("不正なリクエストです: {:#}", e)),
        };
        Self::send_response(&mut stream, &response).await
    }

    /// Returns the socket path.
    pub fn socket_path(&self) -> &Path {
        &self.socket_path
    }
}

impl Drop for IpcServer {
    fn drop(&mut self) {
        let _ = std::fs::remove_file(&self.socket_path);
    }
}

// ============================================================================
// RequestHandler
// ============================================================================

/// Handles IPC requests by dispatching to the CountdownEngine and TaskStore.
///
/// Locks are always taken in the order tasks, then engine.
pub struct RequestHandler {
    /// Shared reference to the countdown engine
    engine: Arc<Mutex<CountdownEngine>>,
    /// Shared reference to the task store
    tasks: Arc<Mutex<TaskStore>>,
}

impl RequestHandler {
    /// Creates a new request handler.
    pub fn new(engine: Arc<Mutex<CountdownEngine>>, tasks: Arc<Mutex<TaskStore>>) -> Self {
        Self { engine, tasks }
    }

    /// Handles an IPC request and returns the appropriate response.
    pub async fn handle(&self, request: IpcRequest) -> IpcResponse {
        match request {
            IpcRequest::Start => self.handle_start().await,
            IpcRequest::Pause => self.handle_pause().await,
            IpcRequest::Reset => self.handle_reset().await,
            IpcRequest::SetTime { minutes } => self.handle_set_time(minutes).await,
            IpcRequest::CloseAlert => self.handle_close_alert().await,
            IpcRequest::Status => self.handle_status().await,
            IpcRequest::AddTask { params } => self.handle_add_task(params).await,
            IpcRequest::ListTasks => self.handle_list_tasks().await,
            IpcRequest::SelectTask { id } => self.handle_select_task(&id).await,
            IpcRequest::RemoveTask { id } => self.handle_remove_task(&id).await,
            IpcRequest::CompleteTask => self.handle_complete_task().await,
            IpcRequest::ClearCompleted => self.handle_clear_completed().await,
        }
    }

    /// Handles the start command.
    async fn handle_start(&self) -> IpcResponse {
        let tasks = self.tasks.lock().await;
        let mut engine = self.engine.lock().await;

        let message = if engine.state().is_running() {
            "カウントダウンは既に実行中です"
        } else {
            "カウントダウンを開始しました"
        };
        let snapshot = engine.start();

        IpcResponse::success(
            message,
            Some(ResponseData::from_countdown(snapshot, active(&tasks))),
        )
    }

    /// Handles the pause command.
    async fn handle_pause(&self) -> IpcResponse {
        let tasks = self.tasks.lock().await;
        let mut engine = self.engine.lock().await;

        let message = if engine.state().is_running() {
            "カウントダウンを一時停止しました"
        } else {
            "カウントダウンは実行されていません"
        };
        let snapshot = engine.pause();

        IpcResponse::success(
            message,
            Some(ResponseData::from_countdown(snapshot, active(&tasks))),
        )
    }

    /// Handles the reset command.
    async fn handle_reset(&self) -> IpcResponse {
        let tasks = self.tasks.lock().await;
        let mut engine = self.engine.lock().await;

        let message = if engine.state().show_completion_info() {
            "完了表示を閉じました".to_string()
        } else {
            format!(
                "カウントダウンをリセットしました（{}分）",
                engine.state().original_minutes()
            )
        };
        let snapshot = engine.reset();

        IpcResponse::success(
            message,
            Some(ResponseData::from_countdown(snapshot, active(&tasks))),
        )
    }

    /// Handles the set-time command.
    async fn handle_set_time(&self, minutes: u32) -> IpcResponse {
        if let Err(e) = validate_duration(minutes) {
            return IpcResponse::error(e);
        }

        let tasks = self.tasks.lock().await;
        let mut engine = self.engine.lock().await;

        if engine.state().is_running() {
            return IpcResponse::error(
                "実行中は時間を変更できません。先に一時停止してください",
            );
        }
        let snapshot = engine.set_time(minutes);

        IpcResponse::success(
            format!("時間を{}分に設定しました", minutes),
            Some(ResponseData::from_countdown(snapshot, active(&tasks))),
        )
    }

    /// Handles the close-alert command.
    async fn handle_close_alert(&self) -> IpcResponse {
        let tasks = self.tasks.lock().await;
        let mut engine = self.engine.lock().await;
        let snapshot = engine.close_alert();

        IpcResponse::success(
            "アラートを閉じました",
            Some(ResponseData::from_countdown(snapshot, active(&tasks))),
        )
    }

    /// Handles the status command.
    async fn handle_status(&self) -> IpcResponse {
        let tasks = self.tasks.lock().await;
        let engine = self.engine.lock().await;

        IpcResponse::success(
            "",
            Some(ResponseData::from_countdown(
                engine.snapshot(),
                active(&tasks),
            )),
        )
    }

    /// Handles the add-task command. The first task added to an empty
    /// store is selected right away.
    async fn handle_add_task(&self, params: AddTaskParams) -> IpcResponse {
        let mut tasks = self.tasks.lock().await;
        let was_empty = tasks.is_empty();

        let task = match tasks.add_task(params.into()) {
            Ok(task) => task,
            Err(e) => return IpcResponse::error(e.to_string()),
        };

        let mut message = format!("タスクを追加しました: {}（{}分）", task.title, task.duration);
        if was_empty {
            match tasks.select_task(&task.id) {
                Ok(selected) => {
                    self.engine.lock().await.load(selected.duration);
                    message.push_str("。選択中のタスクに設定しました");
                }
                Err(e) => return IpcResponse::error(e.to_string()),
            }
        }

        IpcResponse::success(
            message,
            Some(
                ResponseData::from_tasks(tasks.tasks().to_vec(), active(&tasks))
                    .with_task_id(task.id),
            ),
        )
    }

    /// Handles the list-tasks command.
    async fn handle_list_tasks(&self) -> IpcResponse {
        let tasks = self.tasks.lock().await;
        IpcResponse::success(
            "",
            Some(ResponseData::from_tasks(
                tasks.tasks().to_vec(),
                active(&tasks),
            )),
        )
    }

    /// Handles the select-task command and binds the task's duration to
    /// the countdown.
    async fn handle_select_task(&self, id: &str) -> IpcResponse {
        let mut tasks = self.tasks.lock().await;

        let task = match tasks.select_task(id) {
            Ok(task) => task,
            Err(e) => return IpcResponse::error(e.to_string()),
        };
        let snapshot = self.engine.lock().await.load(task.duration);

        let mut data = ResponseData::from_countdown(snapshot, Some(task.clone()));
        data.task_id = Some(task.id.clone());
        IpcResponse::success(
            format!("タスクを選択しました: {}（{}分）", task.title, task.duration),
            Some(data),
        )
    }

    /// Handles the remove-task command.
    async fn handle_remove_task(&self, id: &str) -> IpcResponse {
        let mut tasks = self.tasks.lock().await;

        match tasks.remove_task(id) {
            Ok(task) => IpcResponse::success(
                format!("タスクを削除しました: {}", task.title),
                Some(
                    ResponseData::from_tasks(tasks.tasks().to_vec(), active(&tasks))
                        .with_task_id(task.id),
                ),
            ),
            Err(e) => IpcResponse::error(e.to_string()),
        }
    }

    /// Handles the complete-task command.
    async fn handle_complete_task(&self) -> IpcResponse {
        let mut tasks = self.tasks.lock().await;

        match tasks.complete_active_task() {
            Ok(Some(task)) => IpcResponse::success(
                format!("タスクを完了しました: {}", task.title),
                Some(
                    ResponseData::from_tasks(tasks.tasks().to_vec(), None).with_task_id(task.id),
                ),
            ),
            Ok(None) => IpcResponse::error("選択中のタスクがありません"),
            Err(e) => IpcResponse::error(e.to_string()),
        }
    }

    /// Handles the clear-completed command.
    async fn handle_clear_completed(&self) -> IpcResponse {
        let mut tasks = self.tasks.lock().await;

        match tasks.clear_completed_tasks() {
            Ok(removed) => IpcResponse::success(
                format!("完了済みのタスクを{}件削除しました", removed),
                Some(ResponseData::from_tasks(
                    tasks.tasks().to_vec(),
                    active(&tasks),
                )),
            ),
            Err(e) => IpcResponse::error(e.to_string()),
        }
    }
}

fn active(tasks: &TaskStore) -> Option<Task> {
    tasks.active_task().cloned()
}

// ============================================================================
// Tests
// ============================================================================
