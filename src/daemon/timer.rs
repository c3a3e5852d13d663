//! Countdown engine for the daemon.
//!
//! This module wraps the pure [`CountdownState`] transition function:
//! - Executes effects (tick arming, audio cues, completion)
//! - Owns the single tick source through a generation-tagged watch channel
//! - Fires events for the host (completion, phase changes, ticks)

use std::sync::Arc;

use tokio::sync::{mpsc, watch, Mutex};
use tokio::time::{sleep, Duration};
use tracing::{debug, info};

use crate::sound::CueCoordinator;
use crate::types::{
    CountdownCommand, CountdownEffect, CountdownPhase, CountdownSnapshot, CountdownState,
};

/// Interval between ticks.
pub const TICK_INTERVAL: Duration = Duration::from_secs(1);

// ============================================================================
// CountdownEvent
// ============================================================================

/// Countdown events for the host and external integrations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CountdownEvent {
    /// The countdown started running
    Started {
        /// Remaining seconds at start
        remaining_seconds: u32,
    },
    /// The countdown was paused
    Paused {
        /// Remaining seconds at pause
        remaining_seconds: u32,
    },
    /// The full duration was restored
    Rearmed {
        /// Duration in minutes
        minutes: u32,
    },
    /// The completion info was dismissed
    CompletionAcknowledged,
    /// One second elapsed
    Tick {
        /// Remaining seconds
        remaining_seconds: u32,
    },
    /// The derived phase changed
    PhaseChanged {
        /// Phase before the transition
        from: CountdownPhase,
        /// Phase after the transition
        to: CountdownPhase,
    },
    /// The countdown reached zero
    Completed {
        /// Duration that just elapsed, in minutes
        original_minutes: u32,
    },
    /// The completion alert was dismissed
    AlertClosed,
}

// ============================================================================
// CountdownEngine
// ============================================================================

/// Countdown engine that executes state transitions and their effects.
pub struct CountdownEngine {
    /// Current countdown state
    state: CountdownState,
    /// Audio cues, released when the engine is dropped
    cues: CueCoordinator,
    /// Event sender channel
    event_tx: mpsc::UnboundedSender<CountdownEvent>,
    /// Generation of the armed tick source; `None` when disarmed
    armed: watch::Sender<Option<u64>>,
    /// Last generation handed out
    generation: u64,
}

impl CountdownEngine {
    /// Creates a new engine for a positive duration in minutes.
    pub fn new(
        minutes: u32,
        cues: CueCoordinator,
        event_tx: mpsc::UnboundedSender<CountdownEvent>,
    ) -> Self {
        let (armed, _) = watch::channel(None);
        Self {
            state: CountdownState::new(minutes),
            cues,
            event_tx,
            armed,
            generation: 0,
        }
    }

    /// Starts or resumes the countdown. Restarts from the full duration
    /// after completion. No-op while running.
    pub fn start(&mut self) -> CountdownSnapshot {
        if self.dispatch(CountdownCommand::Start) {
            info!("Countdown started ({}s remaining)", self.state.remaining_seconds());
            self.emit(CountdownEvent::Started {
                remaining_seconds: self.state.remaining_seconds(),
            });
        }
        self.snapshot()
    }

    /// Pauses the countdown. No-op while not running.
    pub fn pause(&mut self) -> CountdownSnapshot {
        if self.dispatch(CountdownCommand::Pause) {
            info!("Countdown paused ({}s remaining)", self.state.remaining_seconds());
            self.emit(CountdownEvent::Paused {
                remaining_seconds: self.state.remaining_seconds(),
            });
        }
        self.snapshot()
    }

    /// Dismisses the completion info when it is shown, otherwise restores
    /// the full duration.
    pub fn reset(&mut self) -> CountdownSnapshot {
        let acknowledging = self.state.show_completion_info();
        self.dispatch(CountdownCommand::Reset);

        if acknowledging {
            debug!("Completion acknowledged");
            self.emit(CountdownEvent::CompletionAcknowledged);
        } else {
            info!("Countdown reset to {} minutes", self.state.original_minutes());
            self.emit(CountdownEvent::Rearmed {
                minutes: self.state.original_minutes(),
            });
        }
        self.snapshot()
    }

    /// Restores the countdown with a new duration. No-op while running or
    /// for zero minutes.
    pub fn set_time(&mut self, minutes: u32) -> CountdownSnapshot {
        if self.dispatch(CountdownCommand::SetTime(minutes)) {
            info!("Countdown set to {} minutes", minutes);
            self.emit(CountdownEvent::Rearmed { minutes });
        }
        self.snapshot()
    }

    /// Dismisses the completion alert and silences the alarm.
    pub fn close_alert(&mut self) -> CountdownSnapshot {
        let was_shown = self.state.show_end_alert();
        self.dispatch(CountdownCommand::CloseAlert);
        if was_shown {
            debug!("Completion alert closed");
            self.emit(CountdownEvent::AlertClosed);
        }
        self.snapshot()
    }

    /// Binds a new duration regardless of the running state. Used when the
    /// active task changes.
    pub fn load(&mut self, minutes: u32) -> CountdownSnapshot {
        self.pause();
        self.set_time(minutes)
    }

    /// Advances the countdown by one second.
    pub fn tick(&mut self) -> CountdownSnapshot {
        if self.state.is_running() {
            self.dispatch(CountdownCommand::Tick);
            self.emit(CountdownEvent::Tick {
                remaining_seconds: self.state.remaining_seconds(),
            });
        }
        self.snapshot()
    }

    /// Advances the countdown for a tick produced by the given tick-source
    /// generation. Ticks from a superseded or disarmed source are ignored.
    ///
    /// Returns true if the tick was accepted.
    pub fn tick_from(&mut self, generation: u64) -> bool {
        if *self.armed.borrow() != Some(generation) {
            debug!("Ignoring tick from stale generation {}", generation);
            return false;
        }
        self.tick();
        true
    }

    /// Subscribes to tick-source arming. The value is the armed generation,
    /// or `None` while no tick source should run.
    pub fn subscribe_ticks(&self) -> watch::Receiver<Option<u64>> {
        self.armed.subscribe()
    }

    /// Returns the armed generation, if any.
    pub fn armed_generation(&self) -> Option<u64> {
        *self.armed.borrow()
    }

    /// Returns a snapshot of the current state.
    pub fn snapshot(&self) -> CountdownSnapshot {
        self.state.snapshot()
    }

    /// Returns a reference to the current countdown state.
    pub fn state(&self) -> &CountdownState {
        &self.state
    }

    /// Applies a command and executes its effects. Returns true if the
    /// command produced any effect.
    fn dispatch(&mut self, command: CountdownCommand) -> bool {
        let before = self.state.phase();
        let effects = self.state.apply(command);
        let changed = !effects.is_empty();

        let mut completed = false;
        for effect in effects {
            match effect {
                CountdownEffect::ArmTicks => self.arm_ticks(),
                CountdownEffect::DisarmTicks => self.disarm_ticks(),
                CountdownEffect::PlayCue(channel) => self.cues.play(channel),
                CountdownEffect::StopCue(channel) => self.cues.stop(channel),
                CountdownEffect::Completed => completed = true,
            }
        }

        let after = self.state.phase();
        if before != after {
            info!("Phase changed: {} -> {}", before.as_str(), after.as_str());
            self.emit(CountdownEvent::PhaseChanged {
                from: before,
                to: after,
            });
        }

        if completed {
            info!(
                "Countdown completed ({} minutes)",
                self.state.original_minutes()
            );
            self.emit(CountdownEvent::Completed {
                original_minutes: self.state.original_minutes(),
            });
        }

        changed
    }

    fn arm_ticks(&mut self) {
        self.generation += 1;
        self.armed.send_replace(Some(self.generation));
        debug!("Tick source armed (generation {})", self.generation);
    }

    fn disarm_ticks(&mut self) {
        if self.armed.send_replace(None).is_some() {
            debug!("Tick source disarmed");
        }
    }

    fn emit(&self, event: CountdownEvent) {
        if self.event_tx.send(event).is_err() {
            debug!("No event listener, dropping countdown event");
        }
    }
}

impl std::fmt::Debug for CountdownEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CountdownEngine")
            .field("state", &self.state)
            .field("armed", &*self.armed.borrow())
            .finish_non_exhaustive()
    }
}

// ============================================================================
// Tick driver
// ============================================================================

/// Runs the tick source for a shared engine.
///
/// Sleeps one second per tick while a generation is armed and forwards
/// each tick tagged with that generation. Re-arming restarts the second;
/// disarming stops ticking until the next arm. Returns when the engine's
/// watch channel closes. Spawn it as a separate tokio task.
pub async fn run_tick_driver(engine: Arc<Mutex<CountdownEngine>>) {
    let mut armed = engine.lock().await.subscribe_ticks();

    loop {
        let generation = *armed.borrow_and_update();

        match generation {
            Some(generation) => {
                tokio::select! {
                    _ = sleep(TICK_INTERVAL) => {
                        engine.lock().await.tick_from(generation);
                    }
                    changed = armed.changed() => {
                        if changed.is_err() {
                            break;
                        }
                    }
                }
            }
            None => {
                if armed.changed().await.is_err() {
                    break;
                }
            }
        }
    }

    debug!("Tick driver stopped");
}

// ============================================================================
// Tests
// ============================================================================
