//! Audio playback and analysis configuration.

use std::path::PathBuf;

use thiserror::Error;

/// Invalid configuration values
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error("FFT size must be a power of 2 between 32 and 32768, got {0}")]
    InvalidFftSize(usize),

    #[error("Volume must be within 0.0..=1.0, got {0}")]
    InvalidVolume(f32),

    #[error("Smoothing time constant must be within 0.0..=1.0, got {0}")]
    InvalidSmoothing(f32),

    #[error("Decibel range is empty: min {min} dB >= max {max} dB")]
    InvalidDecibelRange { min: f32, max: f32 },
}

/// Audio asset, playback and analyser configuration
#[derive(Debug, Clone)]
pub struct AudioConfig {
    /// Path of the audio asset to load
    pub asset_path: PathBuf,

    /// Playback gain (0.0 = mute, 1.0 = unity)
    pub volume: f32,

    /// Restart from the beginning when the clip ends
    pub looping: bool,

    /// Analyser window size in frames (power of 2)
    /// Produces fft_size / 2 frequency bins
    pub fft_size: usize,

    /// Blend factor between the previous and current spectrum (0.0 = no smoothing)
    pub smoothing_time_constant: f32,

    /// Magnitude mapped to byte 0 (dB)
    pub min_decibels: f32,

    /// Magnitude mapped to byte 255 (dB)
    pub max_decibels: f32,
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            asset_path: PathBuf::from("static/Beats.mp3"),
            volume: 0.5,
            looping: true,
            fft_size: 256,
            smoothing_time_constant: 0.8,
            min_decibels: -100.0,
            max_decibels: -30.0,
        }
    }
}

impl AudioConfig {
    /// Number of frequency bins the analyser produces
    pub fn frequency_bin_count(&self) -> usize {
        self.fft_size / 2
    }

    /// Validate configuration (FFT size must be power of 2, etc.)
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.fft_size.is_power_of_two() || !(32..=32768).contains(&self.fft_size) {
            return Err(ConfigError::InvalidFftSize(self.fft_size));
        }
        if !(0.0..=1.0).contains(&self.volume) {
            return Err(ConfigError::InvalidVolume(self.volume));
        }
        if !(0.0..=1.0).contains(&self.smoothing_time_constant) {
            return Err(ConfigError::InvalidSmoothing(self.smoothing_time_constant));
        }
        if self.min_decibels >= self.max_decibels {
            return Err(ConfigError::InvalidDecibelRange {
                min: self.min_decibels,
                max: self.max_decibels,
            });
        }
        Ok(())
    }
}
