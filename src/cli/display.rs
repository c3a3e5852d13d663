//! Display utilities for the countdown CLI.
//!
//! This module provides formatted output for:
//! - Countdown status (time, progress bar, phase, completion info)
//! - Task lists
//! - Success and error messages

use crate::types::{CountdownPhase, CountdownSnapshot, IpcResponse, Task};

// ============================================================================
// Constants
// ============================================================================

/// Width of the progress bar in characters
const PROGRESS_BAR_WIDTH: usize = 30;

// ============================================================================
// Display
// ============================================================================

/// Display utilities for CLI output.
pub struct Display;

impl Display {
    /// Shows the daemon's message followed by the remaining time.
    ///
    /// Used for start, pause, reset, set-time and close-alert.
    pub fn show_countdown_result(response: &IpcResponse) {
        println!("* {}", response.message);

        if let Some(countdown) = response.data.as_ref().and_then(|d| d.countdown.as_ref()) {
            println!("  残り時間: {}", Self::format_clock(countdown));
        }
    }

    /// Shows the current countdown status.
    pub fn show_status(response: &IpcResponse) {
        let Some(data) = &response.data else {
            println!("タイマーは起動していません");
            return;
        };

        println!("カウントダウン ステータス");
        println!("─────────────────────────────");

        if let Some(task) = &data.active_task {
            println!("タスク: {} ({}分)", task.title, task.duration);
        } else {
            println!("タスク: (未選択)");
        }

        if let Some(countdown) = &data.countdown {
            for line in Self::status_lines(countdown) {
                println!("{}", line);
            }
        }
    }

    /// Shows the task list.
    pub fn show_task_list(response: &IpcResponse) {
        let tasks = response
            .data
            .as_ref()
            .and_then(|d| d.tasks.as_deref())
            .unwrap_or_default();

        if tasks.is_empty() {
            println!("タスクはありません");
            return;
        }

        for task in tasks {
            println!("{}", Self::format_task_line(task));
        }
    }

    /// Shows a success message, with the affected task id when present.
    pub fn show_success(response: &IpcResponse) {
        println!("* {}", response.message);

        if let Some(task_id) = response.data.as_ref().and_then(|d| d.task_id.as_ref()) {
            println!("  ID: {}", task_id);
        }
    }

    /// Shows an error message.
    pub fn show_error(message: &str) {
        eprintln!("エラー: {}", message);
    }

    /// Builds the status lines for a countdown snapshot.
    fn status_lines(countdown: &CountdownSnapshot) -> Vec<String> {
        let state = if countdown.is_running {
            "実行中"
        } else {
            "停止中"
        };

        let mut lines = vec![
            format!("状態: {} / {}", state, Self::phase_label(countdown.phase)),
            format!("残り時間: {}", Self::format_clock(countdown)),
            format!(
                "{} {:>3}%",
                Self::progress_bar(countdown.progress, PROGRESS_BAR_WIDTH),
                (countdown.progress * 100.0).round() as u32
            ),
        ];

        if countdown.show_completion_info {
            lines.push(format!("完了: {}分のタイマーが終了しました", countdown.original_time));
        }
        if countdown.show_end_alert {
            lines.push("!! 時間です ('countdown close-alert' で閉じる)".to_string());
        }

        lines
    }

    /// Returns the display label for a phase.
    fn phase_label(phase: CountdownPhase) -> &'static str {
        match phase {
            CountdownPhase::Normal => "通常",
            CountdownPhase::NearEnd => "残りわずか",
            CountdownPhase::AlmostEnd => "まもなく終了",
            CountdownPhase::Completed => "完了",
        }
    }

    /// Formats a task as a single list line.
    fn format_task_line(task: &Task) -> String {
        let marker = if task.is_completed {
            "[x]"
        } else if task.is_active {
            "[>]"
        } else {
            "[ ]"
        };
        format!(
            "{} {}  {} ({}分)",
            marker,
            task.short_id(),
            task.title,
            task.duration
        )
    }

    /// Renders `progress` in `[0, 1]` as a bar of `width` cells.
    fn progress_bar(progress: f64, width: usize) -> String {
        let filled = ((progress.clamp(0.0, 1.0) * width as f64).round() as usize).min(width);
        format!("[{}{}]", "#".repeat(filled), "-".repeat(width - filled))
    }

    /// Formats the remaining time as MM:SS.
    fn format_clock(countdown: &CountdownSnapshot) -> String {
        format!("{:02}:{:02}", countdown.minutes, countdown.seconds)
    }
}

// ============================================================================
// Tests
// ============================================================================
