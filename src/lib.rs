//! Countdown Timer Library
//!
//! This library provides the core functionality for the countdown CLI.
//! It includes:
//! - Countdown state machine and engine driven by a one-second tick
//! - Task management with JSON file persistence
//! - IPC server/client for daemon-CLI communication
//! - CLI command parsing and display utilities
//! - Audio cues for the final seconds and completion
//! - Configuration loaded from `~/.countdown/config.json`

pub mod cli;
pub mod config;
pub mod daemon;
pub mod sound;
pub mod tasks;
pub mod types;

// Re-export commonly used types for convenience
pub use config::{AppConfig, ConfigError};
pub use types::{
    CountdownPhase, CountdownSnapshot, CountdownState, CueChannel, IpcRequest, IpcResponse,
    ResponseData, Task,
};

// Re-export daemon types
pub use daemon::{CountdownEngine, CountdownEvent, Daemon};

// Re-export task types
pub use tasks::{TaskError, TaskStore};

// Re-export sound types
pub use sound::{CueCoordinator, MockSoundPlayer, RodioSoundPlayer, SoundError, SoundPlayer};
