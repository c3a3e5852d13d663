//! Built-in cue tones.
//!
//! These are synthesized at playback time, so the binary needs no audio
//! assets and every cue has a sound even without configuration.

use crate::types::CueChannel;

/// A sine tone played as one or more pulses.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EmbeddedTone {
    /// Tone frequency in Hz
    pub frequency_hz: f32,
    /// Length of each pulse in milliseconds
    pub pulse_ms: u64,
    /// Silence between pulses in milliseconds
    pub gap_ms: u64,
    /// Number of pulses
    pub pulses: u32,
}

/// Short click for the per-second tick.
pub const TICK_TONE: EmbeddedTone = EmbeddedTone {
    frequency_hz: 1200.0,
    pulse_ms: 25,
    gap_ms: 0,
    pulses: 1,
};

/// Single beep for each of the last ten seconds.
pub const FINAL_BEEP_TONE: EmbeddedTone = EmbeddedTone {
    frequency_hz: 880.0,
    pulse_ms: 150,
    gap_ms: 0,
    pulses: 1,
};

/// Repeated alarm on completion.
pub const ALARM_TONE: EmbeddedTone = EmbeddedTone {
    frequency_hz: 660.0,
    pulse_ms: 300,
    gap_ms: 200,
    pulses: 6,
};

impl EmbeddedTone {
    /// Looks up a built-in tone by name.
    #[must_use]
    pub fn named(name: &str) -> Option<Self> {
        match name {
            "tick" => Some(TICK_TONE),
            "final_beep" => Some(FINAL_BEEP_TONE),
            "alarm" => Some(ALARM_TONE),
            _ => None,
        }
    }

    /// Returns the default tone for a cue channel.
    #[must_use]
    pub fn for_channel(channel: CueChannel) -> Self {
        match channel {
            CueChannel::Tick => TICK_TONE,
            CueChannel::FinalBeep => FINAL_BEEP_TONE,
            CueChannel::Alarm => ALARM_TONE,
        }
    }

    /// Total playing time in milliseconds, gaps included.
    #[must_use]
    pub fn total_ms(&self) -> u64 {
        let pulses = u64::from(self.pulses);
        pulses * self.pulse_ms + pulses.saturating_sub(1) * self.gap_ms
    }
}
