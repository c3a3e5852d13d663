//! Countdown state machine.
//!
//! `CountdownState` is the single source of truth for a running countdown.
//! Every change goes through [`CountdownState::apply`], which mutates the
//! state and returns the side effects (tick source arming, audio cues,
//! completion) for the caller to carry out. Phase and progress are always
//! derived from `remaining_seconds` and `original_minutes`.

use serde::{Deserialize, Serialize};

// ============================================================================
// Constants
// ============================================================================

/// Seconds in one minute.
pub const SECONDS_PER_MINUTE: u32 = 60;

/// Remaining seconds at or below which the countdown is almost over.
pub const ALMOST_END_SECONDS: u32 = 10;

/// Share of the original duration (in tenths) that must have elapsed
/// before the countdown is near its end.
pub const NEAR_END_ELAPSED_TENTHS: u32 = 9;

/// Returns the total number of seconds for a duration in minutes.
pub fn total_seconds(minutes: u32) -> u32 {
    minutes.saturating_mul(SECONDS_PER_MINUTE)
}

/// Returns the elapsed share of the countdown in `[0, 1]`.
pub fn progress(remaining_seconds: u32, original_minutes: u32) -> f64 {
    let total = total_seconds(original_minutes);
    if total == 0 {
        return 1.0;
    }
    1.0 - f64::from(remaining_seconds.min(total)) / f64::from(total)
}

/// Returns true once at least 90% of the original duration has elapsed.
///
/// Integer arithmetic: `remaining / total <= 1/10`.
fn is_near_end(remaining_seconds: u32, original_minutes: u32) -> bool {
    let total = u64::from(total_seconds(original_minutes));
    u64::from(remaining_seconds) * 10 <= total * u64::from(10 - NEAR_END_ELAPSED_TENTHS)
}

fn is_almost_end(remaining_seconds: u32) -> bool {
    remaining_seconds <= ALMOST_END_SECONDS
}

// ============================================================================
// CountdownPhase
// ============================================================================

/// Derived display category of the countdown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CountdownPhase {
    /// More than 10% of the duration left
    Normal,
    /// 90% of the duration elapsed, more than 10 seconds left
    NearEnd,
    /// 10 seconds or less left
    AlmostEnd,
    /// Countdown reached zero
    Completed,
}

impl CountdownPhase {
    /// Derives the phase from the remaining time and the original duration.
    ///
    /// `AlmostEnd` takes precedence over `NearEnd` when both apply.
    pub fn derive(remaining_seconds: u32, original_minutes: u32) -> Self {
        if remaining_seconds == 0 {
            CountdownPhase::Completed
        } else if is_almost_end(remaining_seconds) {
            CountdownPhase::AlmostEnd
        } else if is_near_end(remaining_seconds, original_minutes) {
            CountdownPhase::NearEnd
        } else {
            CountdownPhase::Normal
        }
    }

    /// Returns the string representation of the phase.
    pub fn as_str(&self) -> &'static str {
        match self {
            CountdownPhase::Normal => "normal",
            CountdownPhase::NearEnd => "near_end",
            CountdownPhase::AlmostEnd => "almost_end",
            CountdownPhase::Completed => "completed",
        }
    }
}

impl Default for CountdownPhase {
    fn default() -> Self {
        CountdownPhase::Normal
    }
}

// ============================================================================
// CueChannel
// ============================================================================

/// Audio cue channels driven by the countdown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CueChannel {
    /// Per-second tick (not used by the default flow)
    Tick,
    /// Beep for each of the last ten seconds
    FinalBeep,
    /// Alarm on completion
    Alarm,
}

impl CueChannel {
    /// All channels, in a stable order.
    pub const ALL: [CueChannel; 3] = [CueChannel::Tick, CueChannel::FinalBeep, CueChannel::Alarm];

    /// Returns the string representation of the channel.
    pub fn as_str(&self) -> &'static str {
        match self {
            CueChannel::Tick => "tick",
            CueChannel::FinalBeep => "final_beep",
            CueChannel::Alarm => "alarm",
        }
    }
}

// ============================================================================
// Commands and effects
// ============================================================================

/// Inputs to the countdown transition function.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CountdownCommand {
    /// Start or resume the countdown
    Start,
    /// Pause the countdown
    Pause,
    /// One second elapsed
    Tick,
    /// Acknowledge a completion, or re-arm to the full duration
    Reset,
    /// Re-arm with a new duration in minutes
    SetTime(u32),
    /// Dismiss the completion alert
    CloseAlert,
}

/// Side effects requested by a transition, in the order they must run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CountdownEffect {
    /// Arm a fresh tick source, superseding any previous one
    ArmTicks,
    /// Disarm the tick source
    DisarmTicks,
    /// Play a cue from the start
    PlayCue(CueChannel),
    /// Stop a cue and rewind it
    StopCue(CueChannel),
    /// The countdown expired naturally
    Completed,
}

// ============================================================================
// CountdownState
// ============================================================================

/// State of a single countdown.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CountdownState {
    original_minutes: u32,
    remaining_seconds: u32,
    is_running: bool,
    show_completion_info: bool,
    show_end_alert: bool,
    /// Last remaining-seconds value the final beep fired for
    last_beep_second: Option<u32>,
}

impl CountdownState {
    /// Creates a paused countdown for the given duration in minutes.
    ///
    /// The duration must be positive; callers validate it beforehand.
    pub fn new(original_minutes: u32) -> Self {
        debug_assert!(original_minutes > 0, "countdown duration must be positive");
        Self {
            original_minutes,
            remaining_seconds: total_seconds(original_minutes),
            is_running: false,
            show_completion_info: false,
            show_end_alert: false,
            last_beep_second: None,
        }
    }

    /// Applies a command and returns the effects to carry out.
    pub fn apply(&mut self, command: CountdownCommand) -> Vec<CountdownEffect> {
        match command {
            CountdownCommand::Start => self.start(),
            CountdownCommand::Pause => self.pause(),
            CountdownCommand::Tick => self.tick(),
            CountdownCommand::Reset => self.reset(),
            CountdownCommand::SetTime(minutes) => self.set_time(minutes),
            CountdownCommand::CloseAlert => self.close_alert(),
        }
    }

    fn start(&mut self) -> Vec<CountdownEffect> {
        if self.is_running {
            return Vec::new();
        }

        let mut effects = Vec::new();
        if self.phase() == CountdownPhase::Completed {
            effects.extend(self.rearm(self.original_minutes));
        }

        self.is_running = true;
        effects.push(CountdownEffect::ArmTicks);
        effects
    }

    fn pause(&mut self) -> Vec<CountdownEffect> {
        if !self.is_running {
            return Vec::new();
        }

        self.is_running = false;
        vec![
            CountdownEffect::DisarmTicks,
            CountdownEffect::StopCue(CueChannel::Tick),
            CountdownEffect::StopCue(CueChannel::FinalBeep),
        ]
    }

    fn tick(&mut self) -> Vec<CountdownEffect> {
        if !self.is_running || self.remaining_seconds == 0 {
            return Vec::new();
        }

        self.remaining_seconds -= 1;

        if self.remaining_seconds == 0 {
            self.is_running = false;
            self.show_completion_info = true;
            self.show_end_alert = true;
            return vec![
                CountdownEffect::DisarmTicks,
                CountdownEffect::StopCue(CueChannel::Tick),
                CountdownEffect::StopCue(CueChannel::FinalBeep),
                CountdownEffect::PlayCue(CueChannel::Alarm),
                CountdownEffect::Completed,
            ];
        }

        let mut effects = Vec::new();
        if self.phase() == CountdownPhase::AlmostEnd
            && self.last_beep_second != Some(self.remaining_seconds)
        {
            self.last_beep_second = Some(self.remaining_seconds);
            effects.push(CountdownEffect::PlayCue(CueChannel::FinalBeep));
        }
        effects
    }

    fn reset(&mut self) -> Vec<CountdownEffect> {
        if self.show_completion_info {
            self.acknowledge_completion()
        } else {
            self.rearm(self.original_minutes)
        }
    }

    fn set_time(&mut self, minutes: u32) -> Vec<CountdownEffect> {
        if self.is_running || minutes == 0 {
            return Vec::new();
        }
        self.rearm(minutes)
    }

    fn close_alert(&mut self) -> Vec<CountdownEffect> {
        self.show_end_alert = false;
        vec![CountdownEffect::StopCue(CueChannel::Alarm)]
    }

    /// Hides the completion info, leaving the clock at zero.
    fn acknowledge_completion(&mut self) -> Vec<CountdownEffect> {
        self.show_completion_info = false;
        Vec::new()
    }

    /// Restores the full duration and silences every cue.
    fn rearm(&mut self, minutes: u32) -> Vec<CountdownEffect> {
        self.original_minutes = minutes;
        self.remaining_seconds = total_seconds(minutes);
        self.is_running = false;
        self.show_completion_info = false;
        self.show_end_alert = false;
        self.last_beep_second = None;

        let mut effects = vec![CountdownEffect::DisarmTicks];
        effects.extend(CueChannel::ALL.into_iter().map(CountdownEffect::StopCue));
        effects
    }

    /// Returns the original duration in minutes.
    pub fn original_minutes(&self) -> u32 {
        self.original_minutes
    }

    /// Returns the remaining seconds.
    pub fn remaining_seconds(&self) -> u32 {
        self.remaining_seconds
    }

    /// Returns true while the countdown is ticking.
    pub fn is_running(&self) -> bool {
        self.is_running
    }

    /// Returns true after a natural expiry until acknowledged or re-armed.
    pub fn show_completion_info(&self) -> bool {
        self.show_completion_info
    }

    /// Returns true while the completion alert is showing.
    pub fn show_end_alert(&self) -> bool {
        self.show_end_alert
    }

    /// Returns the remaining-seconds value the final beep last fired for.
    pub fn last_beep_second(&self) -> Option<u32> {
        self.last_beep_second
    }

    /// Returns the derived phase.
    pub fn phase(&self) -> CountdownPhase {
        CountdownPhase::derive(self.remaining_seconds, self.original_minutes)
    }

    /// Returns the derived progress in `[0, 1]`.
    pub fn progress(&self) -> f64 {
        progress(self.remaining_seconds, self.original_minutes)
    }

    /// Returns a consistent, fully derived view of the state.
    pub fn snapshot(&self) -> CountdownSnapshot {
        CountdownSnapshot {
            minutes: self.remaining_seconds / SECONDS_PER_MINUTE,
            seconds: self.remaining_seconds % SECONDS_PER_MINUTE,
            remaining_seconds: self.remaining_seconds,
            is_running: self.is_running,
            progress: self.progress(),
            is_near_end: is_near_end(self.remaining_seconds, self.original_minutes),
            is_almost_end: is_almost_end(self.remaining_seconds),
            show_completion_info: self.show_completion_info,
            original_time: self.original_minutes,
            show_end_alert: self.show_end_alert,
            phase: self.phase(),
        }
    }
}

// ============================================================================
// CountdownSnapshot
// ============================================================================

/// Read-only view of a countdown handed to the presentation layer.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CountdownSnapshot {
    /// Whole minutes remaining
    pub minutes: u32,
    /// Seconds remaining within the current minute
    pub seconds: u32,
    /// Total seconds remaining
    pub remaining_seconds: u32,
    /// Whether the countdown is ticking
    pub is_running: bool,
    /// Elapsed share in `[0, 1]`
    pub progress: f64,
    /// 90% of the duration elapsed
    pub is_near_end: bool,
    /// 10 seconds or less remaining
    pub is_almost_end: bool,
    /// Completion info is showing
    pub show_completion_info: bool,
    /// Original duration in minutes
    pub original_time: u32,
    /// Completion alert is showing
    pub show_end_alert: bool,
    /// Derived phase
    pub phase: CountdownPhase,
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn running(minutes: u32) -> CountdownState {
        let mut state = CountdownState::new(minutes);
        state.apply(CountdownCommand::Start);
        state
    }

    fn tick_n(state: &mut CountdownState, n: u32) -> Vec<CountdownEffect> {
        let mut effects = Vec::new();
        for _ in 0..n {
            effects.extend(state.apply(CountdownCommand::Tick));
        }
        effects
    }

    fn beeps(effects: &[CountdownEffect]) -> usize {
        effects
            .iter()
            .filter(|e| **e == CountdownEffect::PlayCue(CueChannel::FinalBeep))
            .count()
    }

    // ------------------------------------------------------------------------
    // Phase derivation
    // ------------------------------------------------------------------------

    mod phase_tests {
        use super::*;

        #[test]
        fn test_default_is_normal() {
            assert_eq!(CountdownPhase::default(), CountdownPhase::Normal);
        }

        #[test]
        fn test_as_str() {
            assert_eq!(CountdownPhase::Normal.as_str(), "normal");
            assert_eq!(CountdownPhase::NearEnd.as_str(), "near_end");
            assert_eq!(CountdownPhase::AlmostEnd.as_str(), "almost_end");
            assert_eq!(CountdownPhase::Completed.as_str(), "completed");
        }

        #[test]
        fn test_ten_minute_thresholds() {
            assert_eq!(CountdownPhase::derive(600, 10), CountdownPhase::Normal);
            assert_eq!(CountdownPhase::derive(61, 10), CountdownPhase::Normal);
            assert_eq!(CountdownPhase::derive(60, 10), CountdownPhase::NearEnd);
            assert_eq!(CountdownPhase::derive(11, 10), CountdownPhase::NearEnd);
            assert_eq!(CountdownPhase::derive(10, 10), CountdownPhase::AlmostEnd);
            assert_eq!(CountdownPhase::derive(1, 10), CountdownPhase::AlmostEnd);
            assert_eq!(CountdownPhase::derive(0, 10), CountdownPhase::Completed);
        }

        #[test]
        fn test_near_end_scales_with_duration() {
            assert_eq!(CountdownPhase::derive(13, 2), CountdownPhase::Normal);
            assert_eq!(CountdownPhase::derive(12, 2), CountdownPhase::NearEnd);
            assert_eq!(CountdownPhase::derive(361, 60), CountdownPhase::Normal);
            assert_eq!(CountdownPhase::derive(360, 60), CountdownPhase::NearEnd);
        }

        #[test]
        fn test_almost_end_wins_when_thresholds_overlap() {
            // One minute: near-end begins at 6s, already inside the last 10s.
            assert_eq!(CountdownPhase::derive(7, 1), CountdownPhase::AlmostEnd);
            assert_eq!(CountdownPhase::derive(6, 1), CountdownPhase::AlmostEnd);
        }

        #[test]
        fn test_serialize() {
            let json = serde_json::to_string(&CountdownPhase::NearEnd).unwrap();
            assert_eq!(json, "\"near_end\"");
        }
    }

    // ------------------------------------------------------------------------
    // Progress
    // ------------------------------------------------------------------------

    mod progress_tests {
        use super::*;

        #[test]
        fn test_progress_bounds() {
            assert_eq!(progress(600, 10), 0.0);
            assert_eq!(progress(0, 10), 1.0);
        }

        #[test]
        fn test_progress_midpoint() {
            assert!((progress(300, 10) - 0.5).abs() < 1e-12);
        }

        #[test]
        fn test_progress_non_decreasing_while_running() {
            let mut state = running(2);
            let mut last = state.progress();
            for _ in 0..120 {
                state.apply(CountdownCommand::Tick);
                let current = state.progress();
                assert!(current >= last, "progress went from {} to {}", last, current);
                last = current;
            }
            assert_eq!(state.progress(), 1.0);
        }
    }

    // ------------------------------------------------------------------------
    // Transitions
    // ------------------------------------------------------------------------

    mod transition_tests {
        use super::*;

        #[test]
        fn test_new_state() {
            let state = CountdownState::new(25);
            assert_eq!(state.original_minutes(), 25);
            assert_eq!(state.remaining_seconds(), 1500);
            assert!(!state.is_running());
            assert!(!state.show_completion_info());
            assert_eq!(state.phase(), CountdownPhase::Normal);
            assert_eq!(state.last_beep_second(), None);
        }

        #[test]
        fn test_start_arms_ticks() {
            let mut state = CountdownState::new(5);
            let effects = state.apply(CountdownCommand::Start);
            assert!(state.is_running());
            assert_eq!(effects, vec![CountdownEffect::ArmTicks]);
        }

        #[test]
        fn test_start_while_running_is_noop() {
            let mut state = running(5);
            let effects = state.apply(CountdownCommand::Start);
            assert!(effects.is_empty());
            assert!(state.is_running());
        }

        #[test]
        fn test_tick_when_paused_is_ignored() {
            let mut state = CountdownState::new(1);
            let effects = state.apply(CountdownCommand::Tick);
            assert!(effects.is_empty());
            assert_eq!(state.remaining_seconds(), 60);
        }

        #[test]
        fn test_tick_decrements_by_one() {
            let mut state = running(1);
            state.apply(CountdownCommand::Tick);
            assert_eq!(state.remaining_seconds(), 59);
        }

        #[test]
        fn test_pause_preserves_remaining_time() {
            let mut state = running(3);
            tick_n(&mut state, 37);
            let remaining = state.remaining_seconds();

            let effects = state.apply(CountdownCommand::Pause);
            assert!(!state.is_running());
            assert_eq!(state.remaining_seconds(), remaining);
            assert_eq!(
                effects,
                vec![
                    CountdownEffect::DisarmTicks,
                    CountdownEffect::StopCue(CueChannel::Tick),
                    CountdownEffect::StopCue(CueChannel::FinalBeep),
                ]
            );

            state.apply(CountdownCommand::Start);
            assert!(state.is_running());
            assert_eq!(state.remaining_seconds(), remaining);
        }

        #[test]
        fn test_pause_while_paused_is_noop() {
            let mut state = CountdownState::new(3);
            assert!(state.apply(CountdownCommand::Pause).is_empty());
        }

        #[test]
        fn test_completion_for_several_durations() {
            for minutes in [1, 2, 5, 10] {
                let mut state = running(minutes);
                let effects = tick_n(&mut state, minutes * 60);

                assert_eq!(state.remaining_seconds(), 0);
                assert_eq!(state.phase(), CountdownPhase::Completed);
                assert!(!state.is_running());
                assert!(state.show_completion_info());
                assert!(state.show_end_alert());
                let completions = effects
                    .iter()
                    .filter(|e| **e == CountdownEffect::Completed)
                    .count();
                assert_eq!(completions, 1, "duration {} minutes", minutes);
            }
        }

        #[test]
        fn test_completion_effects_order() {
            let mut state = running(1);
            tick_n(&mut state, 59);
            let effects = state.apply(CountdownCommand::Tick);
            assert_eq!(
                effects,
                vec![
                    CountdownEffect::DisarmTicks,
                    CountdownEffect::StopCue(CueChannel::Tick),
                    CountdownEffect::StopCue(CueChannel::FinalBeep),
                    CountdownEffect::PlayCue(CueChannel::Alarm),
                    CountdownEffect::Completed,
                ]
            );
        }

        #[test]
        fn test_ticks_after_completion_are_ignored() {
            let mut state = running(1);
            tick_n(&mut state, 60);
            let effects = tick_n(&mut state, 5);
            assert!(effects.is_empty());
            assert_eq!(state.remaining_seconds(), 0);
        }

        #[test]
        fn test_two_step_reset_after_completion() {
            let mut state = running(1);
            tick_n(&mut state, 60);

            let effects = state.apply(CountdownCommand::Reset);
            assert!(effects.is_empty());
            assert!(!state.show_completion_info());
            assert_eq!(state.remaining_seconds(), 0);
            assert_eq!(state.phase(), CountdownPhase::Completed);

            let effects = state.apply(CountdownCommand::Reset);
            assert_eq!(state.remaining_seconds(), 60);
            assert_eq!(state.phase(), CountdownPhase::Normal);
            assert!(!state.is_running());
            assert!(!state.show_end_alert());
            assert!(effects.contains(&CountdownEffect::StopCue(CueChannel::Alarm)));
        }

        #[test]
        fn test_reset_while_running_rearms() {
            let mut state = running(2);
            tick_n(&mut state, 115);
            assert_eq!(state.last_beep_second(), Some(5));

            let effects = state.apply(CountdownCommand::Reset);
            assert_eq!(state.remaining_seconds(), 120);
            assert!(!state.is_running());
            assert_eq!(state.last_beep_second(), None);
            assert_eq!(effects[0], CountdownEffect::DisarmTicks);
            for channel in CueChannel::ALL {
                assert!(effects.contains(&CountdownEffect::StopCue(channel)));
            }
        }

        #[test]
        fn test_start_after_completion_rearms_and_runs() {
            let mut state = running(1);
            tick_n(&mut state, 60);

            let effects = state.apply(CountdownCommand::Start);
            assert!(state.is_running());
            assert_eq!(state.remaining_seconds(), 60);
            assert!(!state.show_completion_info());
            assert_eq!(effects.last(), Some(&CountdownEffect::ArmTicks));
        }

        #[test]
        fn test_start_after_acknowledged_completion_rearms() {
            let mut state = running(1);
            tick_n(&mut state, 60);
            state.apply(CountdownCommand::Reset);

            state.apply(CountdownCommand::Start);
            assert!(state.is_running());
            assert_eq!(state.remaining_seconds(), 60);
        }

        #[test]
        fn test_set_time_while_paused() {
            let mut state = running(25);
            tick_n(&mut state, 100);
            state.apply(CountdownCommand::Pause);

            state.apply(CountdownCommand::SetTime(5));
            assert_eq!(state.remaining_seconds(), 300);
            assert_eq!(state.original_minutes(), 5);
            assert_eq!(state.phase(), CountdownPhase::Normal);
            assert!(!state.is_running());
        }

        #[test]
        fn test_set_time_after_completion() {
            let mut state = running(1);
            tick_n(&mut state, 60);

            state.apply(CountdownCommand::SetTime(5));
            assert_eq!(state.remaining_seconds(), 300);
            assert!(!state.show_completion_info());
            assert!(!state.show_end_alert());
        }

        #[test]
        fn test_set_time_while_running_is_noop() {
            let mut state = running(25);
            let effects = state.apply(CountdownCommand::SetTime(5));
            assert!(effects.is_empty());
            assert_eq!(state.original_minutes(), 25);
            assert!(state.is_running());
        }

        #[test]
        fn test_set_time_zero_is_noop() {
            let mut state = CountdownState::new(25);
            assert!(state.apply(CountdownCommand::SetTime(0)).is_empty());
            assert_eq!(state.remaining_seconds(), 1500);
        }

        #[test]
        fn test_close_alert_keeps_countdown() {
            let mut state = running(1);
            tick_n(&mut state, 60);

            let effects = state.apply(CountdownCommand::CloseAlert);
            assert_eq!(effects, vec![CountdownEffect::StopCue(CueChannel::Alarm)]);
            assert!(!state.show_end_alert());
            assert!(state.show_completion_info());
            assert_eq!(state.remaining_seconds(), 0);
        }
    }

    // ------------------------------------------------------------------------
    // Final beep
    // ------------------------------------------------------------------------

    mod final_beep_tests {
        use super::*;

        #[test]
        fn test_beeps_once_per_second_in_last_ten() {
            let mut state = running(1);
            let before = tick_n(&mut state, 49);
            assert_eq!(beeps(&before), 0);
            assert_eq!(state.remaining_seconds(), 11);

            let mut state = running(1);
            let effects = tick_n(&mut state, 60);
            // Remaining 10..=1 beep; zero plays the alarm instead.
            assert_eq!(beeps(&effects), 10);
        }

        #[test]
        fn test_same_second_twice_beeps_once() {
            let mut state = running(1);
            tick_n(&mut state, 50);
            assert_eq!(state.last_beep_second(), Some(10));

            // Replay the same second.
            state.remaining_seconds = 11;
            let effects = state.apply(CountdownCommand::Tick);
            assert_eq!(state.remaining_seconds(), 10);
            assert_eq!(beeps(&effects), 0);

            let effects = state.apply(CountdownCommand::Tick);
            assert_eq!(beeps(&effects), 1);
            assert_eq!(state.last_beep_second(), Some(9));
        }
    }

    // ------------------------------------------------------------------------
    // Snapshot and scenarios
    // ------------------------------------------------------------------------

    mod snapshot_tests {
        use super::*;

        #[test]
        fn test_initial_snapshot() {
            let snapshot = CountdownState::new(25).snapshot();
            assert_eq!(snapshot.minutes, 25);
            assert_eq!(snapshot.seconds, 0);
            assert_eq!(snapshot.remaining_seconds, 1500);
            assert_eq!(snapshot.original_time, 25);
            assert_eq!(snapshot.progress, 0.0);
            assert!(!snapshot.is_near_end);
            assert!(!snapshot.is_almost_end);
            assert_eq!(snapshot.phase, CountdownPhase::Normal);
        }

        #[test]
        fn test_snapshot_splits_minutes_and_seconds() {
            let mut state = running(2);
            tick_n(&mut state, 31);
            let snapshot = state.snapshot();
            assert_eq!(snapshot.minutes, 1);
            assert_eq!(snapshot.seconds, 29);
        }

        #[test]
        fn test_completed_snapshot_flags() {
            let mut state = running(1);
            tick_n(&mut state, 60);
            let snapshot = state.snapshot();
            assert!(snapshot.is_near_end);
            assert!(snapshot.is_almost_end);
            assert!(snapshot.show_completion_info);
            assert!(snapshot.show_end_alert);
            assert_eq!(snapshot.progress, 1.0);
            assert_eq!(snapshot.phase, CountdownPhase::Completed);
        }

        #[test]
        fn test_snapshot_serializes_camel_case() {
            let json = serde_json::to_value(CountdownState::new(1).snapshot()).unwrap();
            assert_eq!(json["originalTime"], 1);
            assert_eq!(json["isRunning"], false);
            assert_eq!(json["showCompletionInfo"], false);
            assert_eq!(json["phase"], "normal");
        }

        #[test]
        fn test_ten_minute_scenario() {
            let mut state = running(10);
            tick_n(&mut state, 539);
            assert_eq!(state.remaining_seconds(), 61);
            assert_eq!(state.phase(), CountdownPhase::Normal);

            state.apply(CountdownCommand::Tick);
            assert_eq!(state.remaining_seconds(), 60);
            assert_eq!(state.phase(), CountdownPhase::NearEnd);

            tick_n(&mut state, 49);
            assert_eq!(state.phase(), CountdownPhase::NearEnd);
            state.apply(CountdownCommand::Tick);
            assert_eq!(state.remaining_seconds(), 10);
            assert_eq!(state.phase(), CountdownPhase::AlmostEnd);
        }

        #[test]
        fn test_one_minute_scenario() {
            let mut state = running(1);
            tick_n(&mut state, 53);
            assert!(!state.snapshot().is_near_end);

            state.apply(CountdownCommand::Tick);
            let snapshot = state.snapshot();
            assert!((snapshot.progress - 0.9).abs() < 1e-12);
            assert!(snapshot.is_near_end);
            assert_eq!(snapshot.phase, CountdownPhase::AlmostEnd);

            let effects = tick_n(&mut state, 6);
            assert_eq!(state.phase(), CountdownPhase::Completed);
            assert!(state.show_completion_info());
            assert_eq!(
                effects
                    .iter()
                    .filter(|e| **e == CountdownEffect::Completed)
                    .count(),
                1
            );
        }
    }
}
