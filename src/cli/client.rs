//! IPC Client for communicating with the countdown daemon.
//!
//! This module provides:
//! - Unix Domain Socket client
//! - Request/response handling
//! - Connection retry logic
//! - Timeout handling

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::UnixStream;
use tokio::time::timeout;

use crate::cli::commands::TaskAddArgs;
use crate::config::AppConfig;
use crate::types::{AddTaskParams, IpcRequest, IpcResponse};

// ============================================================================
// Constants
// ============================================================================

/// Connection timeout in seconds
const CONNECTION_TIMEOUT_SECS: u64 = 5;

/// Read/write timeout in seconds
const IO_TIMEOUT_SECS: u64 = 5;

/// Maximum response size in bytes (1MB, task lists can be long)
const MAX_RESPONSE_SIZE: u64 = 1024 * 1024;

/// Maximum retry attempts
const MAX_RETRIES: u32 = 3;

/// Retry delay in milliseconds (base delay, multiplied by attempt number)
const RETRY_DELAY_MS: u64 = 500;

// ============================================================================
// IpcClient
// ============================================================================

/// IPC client for daemon communication.
pub struct IpcClient {
    /// Socket path
    socket_path: PathBuf,
    /// Connection timeout
    timeout: Duration,
}

impl IpcClient {
    /// Creates a new IPC client.
    ///
    /// Uses `socket_path` when given, otherwise the `socket_path` of
    /// `~/.countdown/config.json`, otherwise `~/.countdown/countdown.sock`.
    pub fn new(socket_path: Option<PathBuf>) -> Result<Self> {
        let socket_path = match socket_path {
            Some(path) => path,
            None => AppConfig::load_default()?.socket_path()?,
        };
        Ok(Self::with_socket_path(socket_path))
    }

    /// Creates a new IPC client with a custom socket path.
    pub fn with_socket_path(socket_path: PathBuf) -> Self {
        Self {
            socket_path,
            timeout: Duration::from_secs(CONNECTION_TIMEOUT_SECS),
        }
    }

    /// Returns the socket path.
    pub fn socket_path(&self) -> &PathBuf {
        &self.socket_path
    }

    /// Sends a start command to the daemon.
    pub async fn start(&self) -> Result<IpcResponse> {
        self.send(&IpcRequest::Start).await
    }

    /// Sends a pause command to the daemon.
    pub async fn pause(&self) -> Result<IpcResponse> {
        self.send(&IpcRequest::Pause).await
    }

    /// Sends a reset command to the daemon.
    pub async fn reset(&self) -> Result<IpcResponse> {
        self.send(&IpcRequest::Reset).await
    }

    /// Sends a set-time command to the daemon.
    pub async fn set_time(&self, minutes: u32) -> Result<IpcResponse> {
        self.send(&IpcRequest::SetTime { minutes }).await
    }

    /// Sends a close-alert command to the daemon.
    pub async fn close_alert(&self) -> Result<IpcResponse> {
        self.send(&IpcRequest::CloseAlert).await
    }

    /// Sends a status query to the daemon.
    pub async fn status(&self) -> Result<IpcResponse> {
        self.send(&IpcRequest::Status).await
    }

    /// Sends an add-task command to the daemon.
    pub async fn add_task(&self, args: &TaskAddArgs) -> Result<IpcResponse> {
        let params = AddTaskParams {
            title: args.title.clone(),
            duration: args.duration,
            description: args.description.clone(),
        };
        self.send(&IpcRequest::AddTask { params }).await
    }

    /// Requests the task list.
    pub async fn list_tasks(&self) -> Result<IpcResponse> {
        self.send(&IpcRequest::ListTasks).await
    }

    /// Sends a select-task command to the daemon.
    pub async fn select_task(&self, id: &str) -> Result<IpcResponse> {
        self.send(&IpcRequest::SelectTask { id: id.to_string() })
            .await
    }

    /// Sends a remove-task command to the daemon.
    pub async fn remove_task(&self, id: &str) -> Result<IpcResponse> {
        self.send(&IpcRequest::RemoveTask { id: id.to_string() })
            .await
    }

    /// Sends a complete-task command to the daemon.
    pub async fn complete_task(&self) -> Result<IpcResponse> {
        self.send(&IpcRequest::CompleteTask).await
    }

    /// Sends a clear-completed command to the daemon.
    pub async fn clear_completed(&self) -> Result<IpcResponse> {
        self.send(&IpcRequest::ClearCompleted).await
    }

    /// Sends a request and turns an error response into an error.
    async fn send(&self, request: &IpcRequest) -> Result<IpcResponse> {
        let response = self.send_request_with_retry(request).await?;
        if !response.is_success() {
            anyhow::bail!("{}", response.message);
        }
        Ok(response)
    }

    /// Sends a request to the daemon with retry logic.
    ///
    /// Only transport failures are retried.
    async fn send_request_with_retry(&self, request: &IpcRequest) -> Result<IpcResponse> {
        let mut attempt = 1;
        loop {
            match self.send_request(request).await {
                Ok(response) => return Ok(response),
                Err(e) if attempt < MAX_RETRIES => {
                    tracing::warn!("Request failed (attempt {}/{}): {:#}", attempt, MAX_RETRIES, e);
                    let delay = Duration::from_millis(RETRY_DELAY_MS * u64::from(attempt));
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }

    /// Sends a single request to the daemon.
    async fn send_request(&self, request: &IpcRequest) -> Result<IpcResponse> {
        // Connect with timeout
        let mut stream = timeout(self.timeout, UnixStream::connect(&self.socket_path))
            .await
            .context("接続がタイムアウトしました")?
            .context("Daemonに接続できません。'countdown daemon' を起動してください")?;

        let request_json =
            serde_json::to_vec(request).context("リクエストのシリアライズに失敗しました")?;

        timeout(
            Duration::from_secs(IO_TIMEOUT_SECS),
            stream.write_all(&request_json),
        )
        .await
        .context("書き込みがタイムアウトしました")?
        .context("リクエストの送信に失敗しました")?;

        timeout(Duration::from_secs(IO_TIMEOUT_SECS), stream.flush())
            .await
            .context("フラッシュがタイムアウトしました")?
            .context("フラッシュに失敗しました")?;

        // Shutdown write side to signal end of request
        stream
            .shutdown()
            .await
            .context("シャットダウンに失敗しました")?;

        // Read until the daemon closes the connection
        let mut buffer = Vec::new();
        let mut limited = (&mut stream).take(MAX_RESPONSE_SIZE);
        timeout(
            Duration::from_secs(IO_TIMEOUT_SECS),
            limited.read_to_end(&mut buffer),
        )
        .await
        .context("読み込みがタイムアウトしました")?
        .context("レスポンスの受信に失敗しました")?;

        if buffer.is_empty() {
            anyhow::bail!("Daemonからの応答がありませんでした");
        }

        serde_json::from_slice(&buffer).context("レスポンスのパースに失敗しました")
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{CountdownSnapshot, ResponseData};
    use std::sync::Arc;
    use tokio::net::UnixListener;
    use tokio::sync::Mutex;

    // ------------------------------------------------------------------------
    // Helper functions
    // ------------------------------------------------------------------------

    fn create_temp_socket_path() -> (tempfile::TempDir, PathBuf) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("test.sock");
        (dir, path)
    }

    /// Accepts one connection, records the request and answers with `response`.
    fn spawn_mock_server(
        socket_path: &std::path::Path,
        response: IpcResponse,
    ) -> (tokio::task::JoinHandle<()>, Arc<Mutex<Option<IpcRequest>>>) {
        let listener = UnixListener::bind(socket_path).unwrap();
        let received = Arc::new(Mutex::new(None));
        let received_clone = received.clone();

        let handle = tokio::spawn(async move {
            let (mut stream, _) = listener.accept().await.unwrap();

            let mut buffer = Vec::new();
            stream.read_to_end(&mut buffer).await.unwrap();
            let request: IpcRequest = serde_json::from_slice(&buffer).unwrap();
            *received_clone.lock().await = Some(request);

            let json = serde_json::to_vec(&response).unwrap();
            stream.write_all(&json).await.unwrap();
            stream.flush().await.unwrap();
        });

        (handle, received)
    }

    fn snapshot(remaining_seconds: u32, is_running: bool) -> CountdownSnapshot {
        CountdownSnapshot {
            minutes: remaining_seconds / 60,
            seconds: remaining_seconds % 60,
            remaining_seconds,
            is_running,
            original_time: 25,
            ..CountdownSnapshot::default()
        }
    }

    // ------------------------------------------------------------------------
    // IpcClient Tests
    // ------------------------------------------------------------------------

    mod client_tests {
        use super::*;

        #[test]
        fn test_with_socket_path() {
            let path = PathBuf::from("/tmp/test.sock");
            let client = IpcClient::with_socket_path(path.clone());
            assert_eq!(client.socket_path(), &path);
        }

        #[test]
        fn test_new_prefers_explicit_path() {
            let path = PathBuf::from("/tmp/explicit.sock");
            let client = IpcClient::new(Some(path.clone())).unwrap();
            assert_eq!(client.socket_path(), &path);
        }

        #[tokio::test(start_paused = true)]
        async fn test_connection_failure() {
            let (_dir, socket_path) = create_temp_socket_path();
            let client = IpcClient::with_socket_path(socket_path);

            let result = client.status().await;
            let message = format!("{:#}", result.unwrap_err());
            assert!(message.contains("countdown daemon"), "got: {}", message);
        }

        #[tokio::test]
        async fn test_send_status_request() {
            let (_dir, socket_path) = create_temp_socket_path();
            let (server, received) = spawn_mock_server(
                &socket_path,
                IpcResponse::success(
                    "",
                    Some(ResponseData::from_countdown(snapshot(1500, false), None)),
                ),
            );

            let client = IpcClient::with_socket_path(socket_path);
            let response = client.status().await.unwrap();

            assert!(response.is_success());
            let countdown = response.data.unwrap().countdown.unwrap();
            assert_eq!(countdown.remaining_seconds, 1500);
            assert!(!countdown.is_running);

            server.await.unwrap();
            assert_eq!(*received.lock().await, Some(IpcRequest::Status));
        }

        #[tokio::test]
        async fn test_send_start_request() {
            let (_dir, socket_path) = create_temp_socket_path();
            let (server, received) = spawn_mock_server(
                &socket_path,
                IpcResponse::success(
                    "タイマーを開始しました",
                    Some(ResponseData::from_countdown(snapshot(1500, true), None)),
                ),
            );

            let client = IpcClient::with_socket_path(socket_path);
            let response = client.start().await.unwrap();

            assert_eq!(response.message, "タイマーを開始しました");
            server.await.unwrap();
            assert_eq!(*received.lock().await, Some(IpcRequest::Start));
        }

        #[tokio::test]
        async fn test_send_set_time_request() {
            let (_dir, socket_path) = create_temp_socket_path();
            let (server, received) =
                spawn_mock_server(&socket_path, IpcResponse::success("OK", None));

            let client = IpcClient::with_socket_path(socket_path);
            client.set_time(5).await.unwrap();

            server.await.unwrap();
            assert_eq!(
                *received.lock().await,
                Some(IpcRequest::SetTime { minutes: 5 })
            );
        }

        #[tokio::test]
        async fn test_error_response_is_not_retried() {
            let (_dir, socket_path) = create_temp_socket_path();
            let (server, _received) = spawn_mock_server(
                &socket_path,
                IpcResponse::error("タイマーは既に実行中です"),
            );

            let client = IpcClient::with_socket_path(socket_path);
            let result = client.start().await;

            let error_msg = result.unwrap_err().to_string();
            assert!(
                error_msg.contains("既に実行中"),
                "Expected error message to contain '既に実行中', got: {}",
                error_msg
            );
            server.await.unwrap();
        }

        #[tokio::test]
        async fn test_empty_response_is_an_error() {
            let (_dir, socket_path) = create_temp_socket_path();
            let listener = UnixListener::bind(&socket_path).unwrap();

            let server = tokio::spawn(async move {
                for _ in 0..MAX_RETRIES {
                    let (mut stream, _) = listener.accept().await.unwrap();
                    let mut buffer = Vec::new();
                    let _ = stream.read_to_end(&mut buffer).await;
                }
            });

            let client = IpcClient::with_socket_path(socket_path);
            let error = client.status().await.unwrap_err();
            assert!(error.to_string().contains("応答がありません"));

            server.await.unwrap();
        }
    }

    // ------------------------------------------------------------------------
    // Task Command Tests
    // ------------------------------------------------------------------------

    mod task_tests {
        use super::*;

        #[tokio::test]
        async fn test_add_task_sends_params() {
            let (_dir, socket_path) = create_temp_socket_path();
            let (server, received) = spawn_mock_server(
                &socket_path,
                IpcResponse::success("OK", Some(ResponseData::default().with_task_id("abc"))),
            );

            let client = IpcClient::with_socket_path(socket_path);
            let args = TaskAddArgs {
                title: "Write report".to_string(),
                duration: 15,
                description: Some("draft".to_string()),
            };
            let response = client.add_task(&args).await.unwrap();
            assert_eq!(response.data.unwrap().task_id.as_deref(), Some("abc"));

            server.await.unwrap();
            match received.lock().await.as_ref() {
                Some(IpcRequest::AddTask { params }) => {
                    assert_eq!(params.title, "Write report");
                    assert_eq!(params.duration, 15);
                    assert_eq!(params.description.as_deref(), Some("draft"));
                }
                other => panic!("Expected AddTask request, got {:?}", other),
            };
        }

        #[tokio::test]
        async fn test_select_task_sends_id() {
            let (_dir, socket_path) = create_temp_socket_path();
            let (server, received) =
                spawn_mock_server(&socket_path, IpcResponse::success("OK", None));

            let client = IpcClient::with_socket_path(socket_path);
            client.select_task("0f8f").await.unwrap();

            server.await.unwrap();
            assert_eq!(
                *received.lock().await,
                Some(IpcRequest::SelectTask {
                    id: "0f8f".to_string()
                })
            );
        }

        #[tokio::test]
        async fn test_clear_completed_request() {
            let (_dir, socket_path) = create_temp_socket_path();
            let (server, received) =
                spawn_mock_server(&socket_path, IpcResponse::success("OK", None));

            let client = IpcClient::with_socket_path(socket_path);
            client.clear_completed().await.unwrap();

            server.await.unwrap();
            assert_eq!(*received.lock().await, Some(IpcRequest::ClearCompleted));
        }
    }
}
