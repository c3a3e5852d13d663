//! Sound player implementation using rodio.
//!
//! rodio's `OutputStream` cannot leave the thread that created it, so the
//! player owns a dedicated audio thread and talks to it over a
//! crossbeam channel. Each cue channel keeps at most one sink; playing a
//! channel again or stopping it drops the old sink, which is how
//! stop-and-rewind works here.

use std::collections::HashMap;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread::JoinHandle;
use std::time::Duration;

use crossbeam_channel::{Receiver, Sender};
use rodio::source::{SineWave, Source, Zero};
use rodio::{Decoder, OutputStream, OutputStreamHandle, Sink};
use tracing::{debug, warn};

use super::embedded::EmbeddedTone;
use super::error::SoundError;
use super::source::SoundSource;
use crate::types::CueChannel;

/// Amplitude applied to synthesized tones.
const TONE_AMPLITUDE: f32 = 0.25;

/// Sample rate used for the silence between tone pulses.
const SILENCE_SAMPLE_RATE: u32 = 48_000;

/// Commands sent to the audio thread.
#[derive(Debug)]
enum AudioCommand {
    Play {
        channel: CueChannel,
        source: SoundSource,
        volume: f32,
    },
    Stop(CueChannel),
    Shutdown,
}

/// A sound player that uses rodio for audio playback.
///
/// The player is `Send + Sync` and can be shared across tasks using `Arc`.
/// Playback is non-blocking: commands are queued to the audio thread and
/// failures there are logged, never returned.
pub struct RodioSoundPlayer {
    /// Command channel to the audio thread.
    commands: Sender<AudioCommand>,
    /// Audio thread handle, joined on drop.
    thread: Mutex<Option<JoinHandle<()>>>,
    /// Whether sound playback is disabled.
    disabled: AtomicBool,
}

impl RodioSoundPlayer {
    /// Creates a new sound player and its audio thread.
    ///
    /// # Arguments
    ///
    /// * `disabled` - If true, all sound playback will be silently skipped.
    ///
    /// # Errors
    ///
    /// Returns `SoundError::DeviceNotAvailable` if no audio output device
    /// is available.
    pub fn new(disabled: bool) -> Result<Self, SoundError> {
        let (command_tx, command_rx) = crossbeam_channel::unbounded();
        let (ready_tx, ready_rx) = crossbeam_channel::bounded(1);

        let handle = std::thread::Builder::new()
            .name("countdown-audio".to_string())
            .spawn(move || run_audio_thread(command_rx, ready_tx))
            .map_err(|e| SoundError::StreamError(e.to_string()))?;

        match ready_rx.recv() {
            Ok(Ok(())) => {}
            Ok(Err(e)) => {
                let _ = handle.join();
                return Err(e);
            }
            Err(_) => {
                let _ = handle.join();
                return Err(SoundError::Disconnected);
            }
        }

        debug!("Audio output thread initialized");

        Ok(Self {
            commands: command_tx,
            thread: Mutex::new(Some(handle)),
            disabled: AtomicBool::new(disabled),
        })
    }

    /// Queues a sound on the given channel, replacing whatever it plays.
    ///
    /// # Errors
    ///
    /// Returns `SoundError::Disconnected` if the audio thread has exited.
    pub fn play(
        &self,
        channel: CueChannel,
        source: &SoundSource,
        volume: f32,
    ) -> Result<(), SoundError> {
        if self.disabled.load(Ordering::Relaxed) {
            debug!("Sound playback disabled, skipping {}", channel.as_str());
            return Ok(());
        }

        self.send(AudioCommand::Play {
            channel,
            source: source.clone(),
            volume,
        })
    }

    /// Stops the given channel. The next play starts from the beginning.
    ///
    /// # Errors
    ///
    /// Returns `SoundError::Disconnected` if the audio thread has exited.
    pub fn stop(&self, channel: CueChannel) -> Result<(), SoundError> {
        self.send(AudioCommand::Stop(channel))
    }

    fn send(&self, command: AudioCommand) -> Result<(), SoundError> {
        self.commands
            .send(command)
            .map_err(|_| SoundError::Disconnected)
    }

    /// Returns true if sound playback is currently disabled.
    #[must_use]
    pub fn is_disabled(&self) -> bool {
        self.disabled.load(Ordering::Relaxed)
    }

    /// Enables sound playback.
    pub fn enable(&self) {
        self.disabled.store(false, Ordering::Relaxed);
        debug!("Sound playback enabled");
    }

    /// Disables sound playback.
    pub fn disable(&self) {
        self.disabled.store(true, Ordering::Relaxed);
        debug!("Sound playback disabled");
    }

    /// Returns true while the audio thread is running.
    #[must_use]
    pub fn is_available(&self) -> bool {
        self.thread
            .lock()
            .map(|guard| guard.as_ref().is_some_and(|h| !h.is_finished()))
            .unwrap_or(false)
    }
}

impl Drop for RodioSoundPlayer {
    fn drop(&mut self) {
        let _ = self.commands.send(AudioCommand::Shutdown);
        if let Ok(mut guard) = self.thread.lock() {
            if let Some(handle) = guard.take() {
                let _ = handle.join();
            }
        }
    }
}

impl std::fmt::Debug for RodioSoundPlayer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RodioSoundPlayer")
            .field("disabled", &self.disabled.load(Ordering::Relaxed))
            .finish_non_exhaustive()
    }
}

/// Creates a sound player, returning None if audio is unavailable.
///
/// If audio initialization fails, a warning is logged and the countdown
/// runs silently.
#[must_use]
pub fn try_create_player(disabled: bool) -> Option<Arc<RodioSoundPlayer>> {
    match RodioSoundPlayer::new(disabled) {
        Ok(player) => Some(Arc::new(player)),
        Err(e) => {
            warn!("Audio not available, sound disabled: {}", e);
            None
        }
    }
}

// ============================================================================
// Audio thread
// ============================================================================

fn run_audio_thread(commands: Receiver<AudioCommand>, ready: Sender<Result<(), SoundError>>) {
    let (_stream, handle) = match OutputStream::try_default() {
        Ok(pair) => {
            let _ = ready.send(Ok(()));
            pair
        }
        Err(e) => {
            let _ = ready.send(Err(SoundError::DeviceNotAvailable(e.to_string())));
            return;
        }
    };

    let mut sinks: HashMap<CueChannel, Sink> = HashMap::new();

    for command in commands.iter() {
        match command {
            AudioCommand::Play {
                channel,
                source,
                volume,
            } => {
                if let Some(previous) = sinks.remove(&channel) {
                    previous.stop();
                }
                match start_sink(&handle, channel, &source, volume) {
                    Ok(sink) => {
                        debug!("Playing {} cue: {}", channel.as_str(), source.name());
                        sinks.insert(channel, sink);
                    }
                    Err(e) => warn!("Failed to play {} cue: {}", channel.as_str(), e),
                }
            }
            AudioCommand::Stop(channel) => {
                if let Some(sink) = sinks.remove(&channel) {
                    sink.stop();
                    debug!("Stopped {} cue", channel.as_str());
                }
            }
            AudioCommand::Shutdown => break,
        }
    }

    for sink in sinks.into_values() {
        sink.stop();
    }
    debug!("Audio output thread exiting");
}

fn start_sink(
    handle: &OutputStreamHandle,
    channel: CueChannel,
    source: &SoundSource,
    volume: f32,
) -> Result<Sink, SoundError> {
    let sink = Sink::try_new(handle).map_err(|e| SoundError::StreamError(e.to_string()))?;
    sink.set_volume(volume);

    match source {
        SoundSource::File { path, name } => {
            if let Err(e) = append_file(&sink, path) {
                if !e.should_fallback_to_embedded() {
                    return Err(e);
                }
                warn!(
                    "Failed to play sound file '{}': {}, falling back to built-in tone",
                    name, e
                );
                append_tone(&sink, EmbeddedTone::for_channel(channel));
            }
        }
        SoundSource::Embedded { name } => {
            let tone = EmbeddedTone::named(name).unwrap_or_else(|| {
                warn!("Unknown built-in tone '{}', using channel default", name);
                EmbeddedTone::for_channel(channel)
            });
            append_tone(&sink, tone);
        }
    }

    Ok(sink)
}

fn append_file(sink: &Sink, path: &Path) -> Result<(), SoundError> {
    let file = File::open(path)
        .map_err(|e| SoundError::FileNotFound(format!("{}: {}", path.display(), e)))?;
    let decoder =
        Decoder::new(BufReader::new(file)).map_err(|e| SoundError::DecodeError(e.to_string()))?;
    sink.append(decoder);
    Ok(())
}

fn append_tone(sink: &Sink, tone: EmbeddedTone) {
    for pulse in 0..tone.pulses {
        sink.append(
            SineWave::new(tone.frequency_hz)
                .take_duration(Duration::from_millis(tone.pulse_ms))
                .amplify(TONE_AMPLITUDE),
        );
        if pulse + 1 < tone.pulses && tone.gap_ms > 0 {
            sink.append(
                Zero::<f32>::new(1, SILENCE_SAMPLE_RATE)
                    .take_duration(Duration::from_millis(tone.gap_ms)),
            );
        }
    }
}
