//! Byte-scaled frequency analyser over the most recent playback window.
//!
//! Per call: Blackman window, forward FFT, magnitude / N, exponential
//! smoothing against the previous call, conversion to decibels and a linear
//! map of [min_decibels, max_decibels] onto 0..=255.

use std::f32::consts::PI;
use std::sync::Arc;

use rustfft::{num_complex::Complex, Fft, FftPlanner};

use crate::params::{AudioConfig, ConfigError};

/// Largest value a byte-scaled bin can hold
pub const MAX_BYTE_MAGNITUDE: f32 = 255.0;

/// Frequency analyser with smoothing carried between calls
pub struct FrequencyAnalyser {
    fft_size: usize,
    fft: Arc<dyn Fft<f32>>,
    window: Vec<f32>,
    buffer: Vec<Complex<f32>>,
    smoothed: Vec<f32>,
    bytes: Vec<u8>,
    smoothing_time_constant: f32,
    min_decibels: f32,
    max_decibels: f32,
}

impl FrequencyAnalyser {
    /// Create an analyser from validated audio configuration
    pub fn new(config: &AudioConfig) -> Result<Self, ConfigError> {
        config.validate()?;

        let fft_size = config.fft_size;
        let bins = config.frequency_bin_count();
        let mut planner = FftPlanner::new();

        Ok(Self {
            fft_size,
            fft: planner.plan_fft_forward(fft_size),
            window: (0..fft_size).map(|i| blackman_window(i, fft_size)).collect(),
            buffer: vec![Complex::new(0.0, 0.0); fft_size],
            smoothed: vec![0.0; bins],
            bytes: vec![0; bins],
            smoothing_time_constant: config.smoothing_time_constant,
            min_decibels: config.min_decibels,
            max_decibels: config.max_decibels,
        })
    }

    pub fn fft_size(&self) -> usize {
        self.fft_size
    }

    /// Number of frequency bins (FFT size / 2)
    pub fn frequency_bin_count(&self) -> usize {
        self.bytes.len()
    }

    /// Analyse a window of mono samples (oldest first)
    ///
    /// Uses the last `fft_size` samples; shorter input is padded with
    /// leading silence.
    pub fn analyse(&mut self, samples: &[f32]) -> &[u8] {
        let n = self.fft_size;
        let take = samples.len().min(n);
        let pad = n - take;
        let recent = &samples[samples.len() - take..];

        for (i, slot) in self.buffer.iter_mut().enumerate() {
            let sample = if i < pad { 0.0 } else { recent[i - pad] };
            *slot = Complex::new(sample * self.window[i], 0.0);
        }

        self.fft.process(&mut self.buffer);

        let tau = self.smoothing_time_constant;
        let range_scale = MAX_BYTE_MAGNITUDE / (self.max_decibels - self.min_decibels);

        for (k, (smoothed, byte)) in self
            .smoothed
            .iter_mut()
            .zip(self.bytes.iter_mut())
            .enumerate()
        {
            let magnitude = self.buffer[k].norm() / n as f32;
            let mut value = tau * *smoothed + (1.0 - tau) * magnitude;
            if !value.is_finite() {
                value = 0.0;
            }
            *smoothed = value;

            // 20 * log10(0) is -inf, which clamps to 0
            let decibels = 20.0 * value.log10();
            let scaled = (range_scale * (decibels - self.min_decibels)).floor();
            *byte = scaled.clamp(0.0, MAX_BYTE_MAGNITUDE) as u8;
        }

        &self.bytes
    }

    /// Magnitude of one bin as f32 in 0.0..=255.0
    pub fn magnitude(&self, bin: usize) -> f32 {
        self.bytes.get(bin).copied().unwrap_or(0) as f32
    }
}

/// Blackman window function (alpha = 0.16)
pub fn blackman_window(index: usize, size: usize) -> f32 {
    let x = index as f32 / size as f32;
    0.42 - 0.5 * (2.0 * PI * x).cos() + 0.08 * (4.0 * PI * x).cos()
}
