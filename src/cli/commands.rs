//! Command definitions for the countdown CLI.
//!
//! Uses clap derive macro for argument parsing.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::tasks::{normalize_title, MAX_TITLE_LENGTH};

// ============================================================================
// CLI Structure
// ============================================================================

/// Countdown CLI - a task-driven countdown timer
#[derive(Parser, Debug)]
#[command(
    name = "countdown",
    version,
    about = "タスク連動型カウントダウンタイマーCLI",
    long_about = "タスクごとの時間でカウントダウンするタイマー。\n\
                  残り10秒でビープ音、完了時にアラームを鳴らし、選択中のタスクを完了にします。",
    propagate_version = true
)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Enable verbose output for debugging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Daemon socket path (default: ~/.countdown/countdown.sock)
    #[arg(long, global = true, value_name = "PATH")]
    pub socket: Option<PathBuf>,
}

// ============================================================================
// Subcommands
// ============================================================================

/// Available subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Start or resume the countdown
    Start,

    /// Pause the countdown
    Pause,

    /// Dismiss the completion info, or restore the full duration
    Reset,

    /// Set the countdown duration in minutes (while not running)
    SetTime {
        /// Duration in minutes (1-1440)
        #[arg(value_parser = clap::value_parser!(u32).range(1..=1440))]
        minutes: u32,
    },

    /// Dismiss the completion alert
    CloseAlert,

    /// Show the countdown status
    Status,

    /// Manage tasks
    Task {
        #[command(subcommand)]
        command: TaskCommands,
    },

    /// Run the daemon in the foreground
    Daemon(DaemonArgs),

    /// Generate shell completion scripts
    Completions {
        /// Shell type for completion script
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

/// Task subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum TaskCommands {
    /// Add a task
    Add(TaskAddArgs),

    /// List all tasks
    List,

    /// Select a task and bind its duration to the countdown
    Select {
        /// Task id (a unique prefix is enough)
        id: String,
    },

    /// Remove a task
    Remove {
        /// Task id (a unique prefix is enough)
        id: String,
    },

    /// Mark the selected task completed
    Complete,

    /// Remove all completed tasks
    ClearCompleted,
}

// ============================================================================
// Arguments
// ============================================================================

/// Arguments for the task add command
#[derive(Args, Debug, Clone)]
pub struct TaskAddArgs {
    /// Task title
    #[arg(value_parser = validate_title)]
    pub title: String,

    /// Duration in minutes (1-1440)
    #[arg(
        short,
        long,
        default_value = "25",
        value_parser = clap::value_parser!(u32).range(1..=1440)
    )]
    pub duration: u32,

    /// Optional description
    #[arg(long)]
    pub description: Option<String>,
}

/// Arguments for the daemon command
#[derive(Args, Debug, Clone, Default)]
pub struct DaemonArgs {
    /// Config file path (default: ~/.countdown/config.json)
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Disable all audio cues
    #[arg(long)]
    pub no_sound: bool,
}

// ============================================================================
// Validation Functions
// ============================================================================

/// Validates and trims the task title.
fn validate_title(s: &str) -> Result<String, String> {
    normalize_title(s).map_err(|_| {
        if s.trim().is_empty() {
            "タスク名は空にできません".to_string()
        } else {
            format!("タスク名は{}文字以内にしてください", MAX_TITLE_LENGTH)
        }
    })
}

// ============================================================================
// Tests
// ============================================================================
