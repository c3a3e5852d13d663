//! Daemon module for the countdown.
//!
//! This module contains the core daemon functionality:
//! - `timer`: Countdown engine, effects execution and the tick driver
//! - `ipc`: Unix socket server and request handling
//! - `host`: Wiring and the serve loop

pub mod host;
pub mod ipc;
pub mod timer;

pub use host::{run, spawn_event_listener, Daemon, COMPLETION_DELAY};
pub use ipc::{IpcError, IpcServer, RequestHandler};
pub use timer::{run_tick_driver, CountdownEngine, CountdownEvent, TICK_INTERVAL};
