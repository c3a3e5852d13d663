//! Task management.
//!
//! Tasks carry a title and a target duration. Selecting a task binds its
//! duration to the countdown; when the countdown completes, the active
//! task is marked completed. The list is persisted after every change.

mod error;
mod repository;
mod store;

pub use error::TaskError;
pub use repository::{InMemoryRepository, JsonFileRepository, TaskRepository};
pub use store::{check_duration, normalize_title, TaskStore, MAX_TITLE_LENGTH};
