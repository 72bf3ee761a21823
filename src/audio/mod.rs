//! Audio loading, looping playback and frequency analysis.
//!
//! The decoded clip is shared between the cpal output callback, which
//! advances the playback cursor, and the render thread, which analyses the
//! frames just behind that cursor once per animation tick.

mod analyser;
mod loader;
mod reactor;
mod session;

// Re-export public types
pub use analyser::{blackman_window, FrequencyAnalyser, MAX_BYTE_MAGNITUDE};
pub use loader::{load_clip, AudioClip};
pub use reactor::AudioReactor;
pub use session::AudioSession;

use thiserror::Error;

use crate::params::ConfigError;

/// Errors from loading, configuring or playing audio
#[derive(Error, Debug)]
pub enum AudioError {
    #[error("Failed to open audio file: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Failed to decode audio: {0}")]
    DecodeError(#[from] symphonia::core::errors::Error),

    #[error("No audio track found in file")]
    NoAudioTrack,

    #[error("Unknown sample rate")]
    UnknownSampleRate,

    #[error("Invalid audio configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("No audio output device found")]
    NoOutputDevice,

    #[error("Failed to get audio output config: {0}")]
    OutputConfig(#[from] cpal::DefaultStreamConfigError),

    #[error("Failed to build audio stream: {0}")]
    BuildStream(#[from] cpal::BuildStreamError),

    #[error("Failed to start audio stream: {0}")]
    PlayStream(#[from] cpal::PlayStreamError),
}
