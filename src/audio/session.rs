//! Playback session: looping cursor over a decoded clip.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};

use super::{AudioClip, AudioError};
use crate::params::AudioConfig;

/// Playback position in source frames, shared with the audio callback
///
/// Stored as f64 bits so fractional positions survive resampling.
#[derive(Debug, Default)]
struct PlaybackCursor(AtomicU64);

impl PlaybackCursor {
    fn load(&self) -> f64 {
        f64::from_bits(self.0.load(Ordering::Acquire))
    }

    fn store(&self, frames: f64) {
        self.0.store(frames.to_bits(), Ordering::Release);
    }
}

/// One playable clip with loop, volume and play state
///
/// Clones share the clip, cursor and play flag, so a clone can be moved
/// into the output callback while the original keeps reading the position.
#[derive(Debug, Clone)]
pub struct AudioSession {
    clip: Arc<AudioClip>,
    looping: bool,
    volume: f32,
    playing: Arc<AtomicBool>,
    cursor: Arc<PlaybackCursor>,
}

impl AudioSession {
    /// Create a stopped session at position 0
    pub fn new(clip: AudioClip, config: &AudioConfig) -> Self {
        Self {
            clip: Arc::new(clip),
            looping: config.looping,
            volume: config.volume,
            playing: Arc::new(AtomicBool::new(false)),
            cursor: Arc::new(PlaybackCursor::default()),
        }
    }

    pub fn play(&self) {
        self.playing.store(true, Ordering::Release);
    }

    pub fn is_playing(&self) -> bool {
        self.playing.load(Ordering::Acquire)
    }

    pub fn is_looping(&self) -> bool {
        self.looping
    }

    pub fn volume(&self) -> f32 {
        self.volume
    }

    /// Current playback position (source frames)
    pub fn position_frames(&self) -> f64 {
        self.cursor.load()
    }

    /// Fill an interleaved output buffer and advance the cursor
    ///
    /// Source frames are stepped at `clip_rate / output_rate` with linear
    /// interpolation. Writes silence while stopped; a non-looping session
    /// stops itself at the end of the clip.
    pub fn render_into(&self, out: &mut [f32], channels: usize, output_rate: u32) {
        let num_frames = self.clip.num_frames();
        if !self.is_playing() || num_frames == 0 || channels == 0 || output_rate == 0 {
            out.fill(0.0);
            return;
        }

        let total = num_frames as f64;
        let step = self.clip.sample_rate as f64 / output_rate as f64;
        let mut position = self.cursor.load();

        for frame in out.chunks_mut(channels) {
            if position >= total {
                if self.looping {
                    position %= total;
                } else {
                    self.playing.store(false, Ordering::Release);
                    frame.fill(0.0);
                    continue;
                }
            }

            let index = position as usize;
            let next = if index + 1 < num_frames {
                index + 1
            } else if self.looping {
                0
            } else {
                index
            };
            let frac = (position - index as f64) as f32;

            for (channel, sample) in frame.iter_mut().enumerate() {
                let a = self.clip.sample(index, channel);
                let b = self.clip.sample(next, channel);
                *sample = (a + (b - a) * frac) * self.volume;
            }

            position += step;
        }

        self.cursor.store(position);
    }

    /// Copy the mono frames just behind the cursor, after volume gain
    ///
    /// The last element is the most recent frame. Looping sessions wrap to
    /// the end of the clip; otherwise frames before the start read as silence.
    pub fn fill_analysis_window(&self, window: &mut [f32]) {
        let num_frames = self.clip.num_frames();
        if num_frames == 0 {
            window.fill(0.0);
            return;
        }

        let end = (self.cursor.load() as usize).min(num_frames) as isize;
        let len = window.len() as isize;

        for (offset, sample) in window.iter_mut().enumerate() {
            let frame = end - len + offset as isize;
            *sample = if frame >= 0 {
                self.clip.mono_frame(frame as usize) * self.volume
            } else if self.looping {
                let wrapped = frame.rem_euclid(num_frames as isize) as usize;
                self.clip.mono_frame(wrapped) * self.volume
            } else {
                0.0
            };
        }
    }

    /// Open the default output device and stream this session through it
    ///
    /// The returned stream must be kept alive for playback to continue.
    pub fn open_output_stream(&self) -> Result<cpal::Stream, AudioError> {
        let host = cpal::default_host();
        let device = host
            .default_output_device()
            .ok_or(AudioError::NoOutputDevice)?;
        let config = device.default_output_config()?;

        let channels = config.channels() as usize;
        let output_rate = config.sample_rate().0;

        log::info!(
            "Audio: {} @ {}Hz, {} channel(s)",
            device.name().unwrap_or_else(|_| "Unknown".to_string()),
            output_rate,
            channels
        );
        if output_rate != self.clip.sample_rate {
            log::info!(
                "Resampling clip from {}Hz to {}Hz",
                self.clip.sample_rate,
                output_rate
            );
        }

        let session = self.clone();
        let stream = device.build_output_stream(
            &config.into(),
            move |data: &mut [f32], _: &cpal::OutputCallbackInfo| {
                session.render_into(data, channels, output_rate);
            },
            |err| log::warn!("Audio stream error: {}", err),
            None,
        )?;

        stream.play()?;
        Ok(stream)
    }
}
