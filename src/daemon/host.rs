//! Daemon host.
//!
//! Wires the countdown engine, the task store and the audio cues together
//! and serves IPC requests until shutdown:
//!
//! ```text
//! IpcServer ──▶ RequestHandler ──▶ TaskStore
//!                     │                ▲
//!                     ▼                │ complete_active_task
//!             CountdownEngine ──events──▶ event listener
//!                     ▲
//!               tick driver
//! ```

use std::future::Future;
use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::sync::{mpsc, Mutex};
use tokio::task::JoinHandle;
use tokio::time::{sleep, Duration};
use tracing::{debug, info, warn};

use crate::config::AppConfig;
use crate::sound::{try_create_player, CueCoordinator, SoundPlayer};
use crate::tasks::{JsonFileRepository, TaskStore};

use super::ipc::{IpcServer, RequestHandler};
use super::timer::{run_tick_driver, CountdownEngine, CountdownEvent};

/// Delay between the countdown completing and the active task being
/// marked completed.
pub const COMPLETION_DELAY: Duration = Duration::from_millis(100);

/// A fully wired daemon, bound to its socket but not yet serving.
pub struct Daemon {
    server: IpcServer,
    handler: RequestHandler,
    engine: Arc<Mutex<CountdownEngine>>,
    tasks: Arc<Mutex<TaskStore>>,
    events: mpsc::UnboundedReceiver<CountdownEvent>,
}

impl Daemon {
    /// Builds the daemon from a configuration.
    ///
    /// The countdown starts on the active task's duration, or on the
    /// configured default when no task is active. `player` is `None` when
    /// no audio output is available.
    ///
    /// # Errors
    ///
    /// Returns an error if the task file cannot be loaded or the socket
    /// cannot be bound.
    pub fn new(config: &AppConfig, player: Option<Arc<dyn SoundPlayer>>) -> Result<Self> {
        let tasks_path = config.tasks_path()?;
        let store = TaskStore::open(Arc::new(JsonFileRepository::new(&tasks_path)))
            .with_context(|| format!("Failed to load tasks from {:?}", tasks_path))?;

        let minutes = store
            .active_task()
            .map_or(config.default_duration_minutes, |task| task.duration);

        let cues = CueCoordinator::new(player, config.sound.cue_set());
        let (event_tx, events) = mpsc::unbounded_channel();
        let engine = Arc::new(Mutex::new(CountdownEngine::new(minutes, cues, event_tx)));
        let tasks = Arc::new(Mutex::new(store));

        let socket_path = config.socket_path()?;
        let server = IpcServer::new(&socket_path)?;
        let handler = RequestHandler::new(engine.clone(), tasks.clone());

        info!(
            "Daemon ready on {} ({} minutes)",
            socket_path.display(),
            minutes
        );

        Ok(Self {
            server,
            handler,
            engine,
            tasks,
            events,
        })
    }

    /// Returns the shared countdown engine.
    pub fn engine(&self) -> Arc<Mutex<CountdownEngine>> {
        self.engine.clone()
    }

    /// Returns the shared task store.
    pub fn tasks(&self) -> Arc<Mutex<TaskStore>> {
        self.tasks.clone()
    }

    /// Serves requests until `shutdown` resolves. The socket file is
    /// removed on return.
    ///
    /// Connection errors are logged and do not stop the loop.
    ///
    /// # Errors
    ///
    /// Reserved for fatal serve errors.
    pub async fn run_until<F>(self, shutdown: F) -> Result<()>
    where
        F: Future<Output = ()>,
    {
        let Self {
            server,
            handler,
            engine,
            tasks,
            events,
        } = self;

        let driver = tokio::spawn(run_tick_driver(engine));
        let listener = spawn_event_listener(events, tasks, COMPLETION_DELAY);

        tokio::pin!(shutdown);
        loop {
            tokio::select! {
                _ = &mut shutdown => {
                    info!("Shutting down daemon");
                    break;
                }
                accepted = server.accept() => match accepted {
                    Ok(stream) => {
                        if let Err(e) = IpcServer::serve_connection(stream, &handler).await {
                            warn!("IPC connection failed: {:#}", e);
                        }
                    }
                    Err(e) => warn!("{:#}", e),
                },
            }
        }

        driver.abort();
        listener.abort();
        drop(server);
        Ok(())
    }
}

/// Spawns the task that reacts to countdown events.
///
/// On completion it waits `delay`, then marks the active task completed.
pub fn spawn_event_listener(
    mut events: mpsc::UnboundedReceiver<CountdownEvent>,
    tasks: Arc<Mutex<TaskStore>>,
    delay: Duration,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(event) = events.recv().await {
            match event {
                CountdownEvent::Completed { original_minutes } => {
                    sleep(delay).await;
                    match tasks.lock().await.complete_active_task() {
                        Ok(Some(task)) => info!(
                            "Task completed after {} minutes: {}",
                            original_minutes, task.title
                        ),
                        Ok(None) => debug!("Countdown completed without an active task"),
                        Err(e) => warn!("Failed to complete active task: {}", e),
                    }
                }
                CountdownEvent::Tick { remaining_seconds } => {
                    debug!("Tick: {}s remaining", remaining_seconds)
                }
                other => debug!("Countdown event: {:?}", other),
            }
        }
        debug!("Event listener stopped");
    })
}

/// Runs the daemon until Ctrl-C.
///
/// Audio is optional: when the output device cannot be opened or sound is
/// disabled, the countdown runs silently.
///
/// # Errors
///
/// Returns an error if the daemon cannot be built.
pub async fn run(config: AppConfig, no_sound: bool) -> Result<()> {
    let player = if config.sound.enabled && !no_sound {
        try_create_player(false).map(|p| p as Arc<dyn SoundPlayer>)
    } else {
        info!("Sound disabled");
        None
    };

    let daemon = Daemon::new(&config, player)?;
    daemon
        .run_until(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                warn!("Failed to listen for Ctrl-C: {}", e);
                std::future::pending::<()>().await;
            }
        })
        .await
}
