//! Audio cue coordination for the countdown.
//!
//! The coordinator maps each [`CueChannel`] to a sound and a volume and
//! forwards play/stop requests to a [`SoundPlayer`]. Failures are logged
//! and dropped here: the countdown never sees an audio error.

use std::sync::Arc;

use tracing::{debug, warn};

use super::source::SoundSource;
use super::SoundPlayer;
use crate::types::CueChannel;

/// Default volume of the tick cue.
pub const DEFAULT_TICK_VOLUME: f32 = 0.5;

/// Default volume of the final-countdown beep.
pub const DEFAULT_FINAL_BEEP_VOLUME: f32 = 0.4;

/// Default volume of the completion alarm.
pub const DEFAULT_ALARM_VOLUME: f32 = 0.8;

/// Sound and volume of one cue channel.
#[derive(Debug, Clone, PartialEq)]
pub struct Cue {
    /// What to play
    pub source: SoundSource,
    /// Playback volume in `0.0..=1.0`
    pub volume: f32,
}

impl Cue {
    /// Creates a cue, clamping the volume into range.
    #[must_use]
    pub fn new(source: SoundSource, volume: f32) -> Self {
        Self {
            source,
            volume: volume.clamp(0.0, 1.0),
        }
    }
}

/// The three cues used by the countdown.
#[derive(Debug, Clone, PartialEq)]
pub struct CueSet {
    pub tick: Cue,
    pub final_beep: Cue,
    pub alarm: Cue,
}

impl Default for CueSet {
    fn default() -> Self {
        Self {
            tick: Cue::new(SoundSource::embedded("tick"), DEFAULT_TICK_VOLUME),
            final_beep: Cue::new(
                SoundSource::embedded("final_beep"),
                DEFAULT_FINAL_BEEP_VOLUME,
            ),
            alarm: Cue::new(SoundSource::embedded("alarm"), DEFAULT_ALARM_VOLUME),
        }
    }
}

impl CueSet {
    /// Returns the cue for a channel.
    #[must_use]
    pub fn get(&self, channel: CueChannel) -> &Cue {
        match channel {
            CueChannel::Tick => &self.tick,
            CueChannel::FinalBeep => &self.final_beep,
            CueChannel::Alarm => &self.alarm,
        }
    }
}

/// Engine-owned handle on the audio cues.
///
/// Created together with the engine and dropped with it; dropping stops
/// every channel.
pub struct CueCoordinator {
    player: Option<Arc<dyn SoundPlayer>>,
    cues: CueSet,
}

impl CueCoordinator {
    /// Creates a coordinator. `None` means no audio output is available.
    pub fn new(player: Option<Arc<dyn SoundPlayer>>, cues: CueSet) -> Self {
        Self { player, cues }
    }

    /// Creates a coordinator that never makes a sound.
    pub fn silent() -> Self {
        Self::new(None, CueSet::default())
    }

    /// Plays a cue from the start.
    pub fn play(&self, channel: CueChannel) {
        let Some(player) = &self.player else {
            debug!("No audio output, skipping {} cue", channel.as_str());
            return;
        };

        let cue = self.cues.get(channel);
        if let Err(e) = player.play(channel, &cue.source, cue.volume) {
            warn!("Failed to play {} cue: {}", channel.as_str(), e);
        }
    }

    /// Stops a cue and rewinds it.
    pub fn stop(&self, channel: CueChannel) {
        let Some(player) = &self.player else {
            return;
        };

        if let Err(e) = player.stop(channel) {
            warn!("Failed to stop {} cue: {}", channel.as_str(), e);
        }
    }

    /// Stops every cue.
    pub fn stop_all(&self) {
        for channel in CueChannel::ALL {
            self.stop(channel);
        }
    }

    /// Returns true if cues can be heard.
    pub fn is_audible(&self) -> bool {
        self.player
            .as_ref()
            .is_some_and(|p| p.is_available() && !p.is_disabled())
    }

    /// Returns the configured cues.
    pub fn cues(&self) -> &CueSet {
        &self.cues
    }
}

impl Drop for CueCoordinator {
    fn drop(&mut self) {
        self.stop_all();
    }
}

impl std::fmt::Debug for CueCoordinator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CueCoordinator")
            .field("has_player", &self.player.is_some())
            .field("cues", &self.cues)
            .finish()
    }
}
