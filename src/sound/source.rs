//! Sound source management.
//!
//! A cue either plays an audio file chosen by the user or one of the
//! tones synthesized at runtime (see [`super::embedded`]).

use std::path::{Path, PathBuf};

use super::embedded::EmbeddedTone;
use super::error::SoundError;

/// Supported audio file extensions.
const SUPPORTED_EXTENSIONS: &[&str] = &["wav", "mp3", "ogg", "flac", "aiff", "m4a"];

/// Represents the source of a sound to be played.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SoundSource {
    /// An audio file on disk.
    File {
        /// Display name (the file stem).
        name: String,
        /// The full path to the sound file.
        path: PathBuf,
    },
    /// A tone built into the binary.
    Embedded {
        /// The name of the embedded tone (e.g., "alarm").
        name: String,
    },
}

impl SoundSource {
    /// Creates a new file sound source without checking the path.
    #[must_use]
    pub fn file(name: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self::File {
            name: name.into(),
            path: path.into(),
        }
    }

    /// Creates a file sound source after checking that the file exists and
    /// has a supported extension.
    ///
    /// # Errors
    ///
    /// Returns `SoundError::FileNotFound` if the path is not a file, or
    /// `SoundError::DecodeError` if the extension is not supported.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, SoundError> {
        let path = path.as_ref();
        if !path.is_file() {
            return Err(SoundError::FileNotFound(path.display().to_string()));
        }
        if !has_supported_extension(path) {
            return Err(SoundError::DecodeError(format!(
                "未対応の形式です: {}",
                path.display()
            )));
        }

        let name = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        Ok(Self::file(name, path))
    }

    /// Creates a new embedded sound source.
    #[must_use]
    pub fn embedded(name: impl Into<String>) -> Self {
        Self::Embedded { name: name.into() }
    }

    /// Returns the name of the sound source.
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Self::File { name, .. } | Self::Embedded { name } => name,
        }
    }

    /// Returns true if this is a file sound.
    #[must_use]
    pub fn is_file(&self) -> bool {
        matches!(self, Self::File { .. })
    }

    /// Returns true if this is an embedded sound.
    #[must_use]
    pub fn is_embedded(&self) -> bool {
        matches!(self, Self::Embedded { .. })
    }

    /// Returns the file path if this is a file sound.
    #[must_use]
    pub fn path(&self) -> Option<&PathBuf> {
        match self {
            Self::File { path, .. } => Some(path),
            Self::Embedded { .. } => None,
        }
    }

    /// Returns the built-in tone for an embedded source.
    #[must_use]
    pub fn embedded_tone(&self) -> Option<EmbeddedTone> {
        match self {
            Self::Embedded { name } => EmbeddedTone::named(name),
            Self::File { .. } => None,
        }
    }
}

fn has_supported_extension(path: &Path) -> bool {
    path.extension()
        .map(|ext| ext.to_string_lossy().to_lowercase())
        .is_some_and(|ext| SUPPORTED_EXTENSIONS.contains(&ext.as_str()))
}
