//! Sound playback system for the countdown.
//!
//! This module provides audio cue capabilities, including:
//!
//! - Per-channel playback with stop-and-rewind
//! - Built-in synthesized tones as the default cue sounds
//! - Non-blocking audio playback on a dedicated thread
//! - Graceful degradation when audio is unavailable
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────┐
//! │  CueCoordinator  │ ← Owned by the countdown engine
//! └────────┬─────────┘
//!          │ play(channel) / stop(channel)
//!          ▼
//! ┌──────────────────┐     ┌──────────────────┐
//! │   SoundPlayer    │────▶│   Audio thread   │
//! │ (RodioSoundPlayer│     │  (rodio sinks,   │
//! │  or mock)        │     │   one per cue)   │
//! └──────────────────┘     └──────────────────┘
//! ```
//!
//! # Usage
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use countdown::sound::{CueCoordinator, CueSet, SoundPlayer, try_create_player};
//! use countdown::types::CueChannel;
//!
//! let player = try_create_player(false).map(|p| p as Arc<dyn SoundPlayer>);
//! let cues = CueCoordinator::new(player, CueSet::default());
//! cues.play(CueChannel::Alarm);
//! ```

mod cue;
mod embedded;
mod error;
mod player;
mod source;

pub use cue::{
    Cue, CueCoordinator, CueSet, DEFAULT_ALARM_VOLUME, DEFAULT_FINAL_BEEP_VOLUME,
    DEFAULT_TICK_VOLUME,
};
pub use embedded::{EmbeddedTone, ALARM_TONE, FINAL_BEEP_TONE, TICK_TONE};
pub use error::SoundError;
pub use player::{try_create_player, RodioSoundPlayer};
pub use source::SoundSource;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use crate::types::CueChannel;

/// Trait for sound playback implementations.
///
/// This trait abstracts the sound playback functionality, allowing for
/// different implementations (e.g., rodio-based, mock for testing).
pub trait SoundPlayer: Send + Sync {
    /// Plays a sound on a channel, replacing anything the channel is
    /// playing. Non-blocking.
    ///
    /// # Errors
    ///
    /// Returns an error if the playback request cannot be issued.
    fn play(&self, channel: CueChannel, source: &SoundSource, volume: f32)
        -> Result<(), SoundError>;

    /// Stops a channel; the next play starts from the beginning.
    ///
    /// # Errors
    ///
    /// Returns an error if the stop request cannot be issued.
    fn stop(&self, channel: CueChannel) -> Result<(), SoundError>;

    /// Returns true if the audio system is available.
    fn is_available(&self) -> bool;

    /// Returns true if sound playback is disabled.
    fn is_disabled(&self) -> bool;

    /// Enables sound playback.
    fn enable(&self);

    /// Disables sound playback.
    fn disable(&self);
}

impl SoundPlayer for RodioSoundPlayer {
    fn play(
        &self,
        channel: CueChannel,
        source: &SoundSource,
        volume: f32,
    ) -> Result<(), SoundError> {
        RodioSoundPlayer::play(self, channel, source, volume)
    }

    fn stop(&self, channel: CueChannel) -> Result<(), SoundError> {
        RodioSoundPlayer::stop(self, channel)
    }

    fn is_available(&self) -> bool {
        RodioSoundPlayer::is_available(self)
    }

    fn is_disabled(&self) -> bool {
        RodioSoundPlayer::is_disabled(self)
    }

    fn enable(&self) {
        RodioSoundPlayer::enable(self)
    }

    fn disable(&self) {
        RodioSoundPlayer::disable(self)
    }
}

/// Mock sound player for testing.
#[derive(Debug)]
pub struct MockSoundPlayer {
    play_calls: Mutex<Vec<(CueChannel, SoundSource, f32)>>,
    stop_calls: Mutex<Vec<CueChannel>>,
    available: AtomicBool,
    disabled: AtomicBool,
    should_fail: AtomicBool,
}

impl Default for MockSoundPlayer {
    fn default() -> Self {
        Self::new()
    }
}

impl MockSoundPlayer {
    #[must_use]
    pub fn new() -> Self {
        Self {
            play_calls: Mutex::new(Vec::new()),
            stop_calls: Mutex::new(Vec::new()),
            available: AtomicBool::new(true),
            disabled: AtomicBool::new(false),
            should_fail: AtomicBool::new(false),
        }
    }

    pub fn set_available(&self, available: bool) {
        self.available.store(available, Ordering::SeqCst);
    }

    pub fn set_should_fail(&self, should_fail: bool) {
        self.should_fail.store(should_fail, Ordering::SeqCst);
    }

    #[must_use]
    pub fn play_count(&self) -> usize {
        self.play_calls.lock().unwrap().len()
    }

    /// Number of plays issued on one channel.
    #[must_use]
    pub fn plays_on(&self, channel: CueChannel) -> usize {
        self.play_calls
            .lock()
            .unwrap()
            .iter()
            .filter(|(c, _, _)| *c == channel)
            .count()
    }

    /// Number of stops issued on one channel.
    #[must_use]
    pub fn stop_count(&self, channel: CueChannel) -> usize {
        self.stop_calls
            .lock()
            .unwrap()
            .iter()
            .filter(|c| **c == channel)
            .count()
    }

    #[must_use]
    pub fn get_play_calls(&self) -> Vec<(CueChannel, SoundSource, f32)> {
        self.play_calls.lock().unwrap().clone()
    }

    #[must_use]
    pub fn get_stop_calls(&self) -> Vec<CueChannel> {
        self.stop_calls.lock().unwrap().clone()
    }

    pub fn clear_calls(&self) {
        self.play_calls.lock().unwrap().clear();
        self.stop_calls.lock().unwrap().clear();
    }
}

impl SoundPlayer for MockSoundPlayer {
    fn play(
        &self,
        channel: CueChannel,
        source: &SoundSource,
        volume: f32,
    ) -> Result<(), SoundError> {
        if self.should_fail.load(Ordering::SeqCst) {
            return Err(SoundError::PlaybackError("Mock failure".to_string()));
        }
        if self.disabled.load(Ordering::SeqCst) {
            return Ok(());
        }
        self.play_calls
            .lock()
            .unwrap()
            .push((channel, source.clone(), volume));
        Ok(())
    }

    fn stop(&self, channel: CueChannel) -> Result<(), SoundError> {
        if self.should_fail.load(Ordering::SeqCst) {
            return Err(SoundError::PlaybackError("Mock failure".to_string()));
        }
        self.stop_calls.lock().unwrap().push(channel);
        Ok(())
    }

    fn is_available(&self) -> bool {
        self.available.load(Ordering::SeqCst)
    }

    fn is_disabled(&self) -> bool {
        self.disabled.load(Ordering::SeqCst)
    }

    fn enable(&self) {
        self.disabled.store(false, Ordering::SeqCst);
    }

    fn disable(&self) {
        self.disabled.store(true, Ordering::SeqCst);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_module_exports() {
        let _: fn(bool) -> Result<RodioSoundPlayer, SoundError> = RodioSoundPlayer::new;
        let _: fn() -> CueCoordinator = CueCoordinator::silent;
        let _: fn(&str) -> Option<EmbeddedTone> = EmbeddedTone::named;
    }

    #[test]
    fn test_mock_records_calls() {
        let mock = MockSoundPlayer::new();
        let source = SoundSource::embedded("final_beep");

        mock.play(CueChannel::FinalBeep, &source, 0.4).unwrap();
        mock.play(CueChannel::FinalBeep, &source, 0.4).unwrap();
        mock.stop(CueChannel::FinalBeep).unwrap();

        assert_eq!(mock.play_count(), 2);
        assert_eq!(mock.plays_on(CueChannel::FinalBeep), 2);
        assert_eq!(mock.plays_on(CueChannel::Alarm), 0);
        assert_eq!(mock.stop_count(CueChannel::FinalBeep), 1);

        mock.clear_calls();
        assert_eq!(mock.play_count(), 0);
        assert!(mock.get_stop_calls().is_empty());
    }

    #[test]
    fn test_mock_disabled_skips_recording() {
        let mock = MockSoundPlayer::new();
        mock.disable();
        assert!(mock.is_disabled());

        mock.play(CueChannel::Alarm, &SoundSource::embedded("alarm"), 0.8)
            .unwrap();
        assert_eq!(mock.play_count(), 0);

        mock.enable();
        assert!(!mock.is_disabled());
    }

    #[test]
    fn test_mock_failure() {
        let mock = MockSoundPlayer::new();
        mock.set_should_fail(true);
        let result = mock.play(CueChannel::Tick, &SoundSource::embedded("tick"), 0.5);
        assert!(result.is_err());
    }

    #[test]
    fn test_mock_availability() {
        let mock = MockSoundPlayer::new();
        assert!(mock.is_available());
        mock.set_available(false);
        assert!(!mock.is_available());
    }
}
