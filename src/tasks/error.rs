//! Task store error types.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while managing tasks.
#[derive(Debug, Error)]
pub enum TaskError {
    /// The title is empty after trimming.
    #[error("タスク名を入力してください")]
    EmptyTitle,

    /// The title exceeds the maximum length.
    #[error("タスク名は{0}文字以内で指定してください")]
    TitleTooLong(usize),

    /// The duration is outside the allowed range.
    #[error("時間は{min}-{max}分の範囲で指定してください（指定値: {value}）")]
    InvalidDuration { value: u32, min: u32, max: u32 },

    /// No task matches the given id or prefix.
    #[error("タスク '{0}' が見つかりません")]
    NotFound(String),

    /// More than one task matches the given prefix.
    #[error("タスクID '{0}' に一致するタスクが複数あります。もっと長いIDを指定してください")]
    AmbiguousId(String),

    /// The task file could not be read or written.
    #[error("タスクファイル '{path}' の読み書きに失敗しました: {source}")]
    Storage {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The task file does not contain a valid task list.
    #[error("タスクファイル '{path}' の形式が不正です: {source}")]
    Corrupt {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// A task loaded from storage fails validation.
    #[error("保存されたタスク '{id}' が不正です: {source}")]
    InvalidRecord {
        id: String,
        #[source]
        source: Box<TaskError>,
    },
}

impl TaskError {
    /// Returns true if this error was caused by invalid user input.
    #[must_use]
    pub fn is_validation_error(&self) -> bool {
        matches!(
            self,
            Self::EmptyTitle
                | Self::TitleTooLong(_)
                | Self::InvalidDuration { .. }
                | Self::NotFound(_)
                | Self::AmbiguousId(_)
        )
    }

    /// Returns true if this error came from the persistence layer.
    #[must_use]
    pub fn is_storage_error(&self) -> bool {
        matches!(
            self,
            Self::Storage { .. } | Self::Corrupt { .. } | Self::InvalidRecord { .. }
        )
    }
}
