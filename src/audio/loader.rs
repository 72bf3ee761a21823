//! Audio file decoding using Symphonia.
//!
//! Supports MP3, WAV, FLAC and Ogg/Vorbis.

use std::fs::File;
use std::path::Path;

use symphonia::core::audio::{AudioBuffer, AudioBufferRef, Signal};
use symphonia::core::codecs::{DecoderOptions, CODEC_TYPE_NULL};
use symphonia::core::formats::FormatOptions;
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;

use super::AudioError;

/// Decoded audio asset
#[derive(Debug, Clone)]
pub struct AudioClip {
    /// Interleaved samples (f32, normalized to -1.0..1.0)
    pub samples: Vec<f32>,
    /// Sample rate in Hz
    pub sample_rate: u32,
    /// Number of channels
    pub channels: usize,
}

impl AudioClip {
    /// Duration in seconds
    pub fn duration(&self) -> f64 {
        if self.sample_rate == 0 || self.channels == 0 {
            return 0.0;
        }
        self.samples.len() as f64 / (self.sample_rate as f64 * self.channels as f64)
    }

    /// Number of frames (samples per channel)
    pub fn num_frames(&self) -> usize {
        if self.channels == 0 {
            return 0;
        }
        self.samples.len() / self.channels
    }

    /// Sample of one channel in one frame
    ///
    /// Output channels beyond the clip's channel count reuse the last one,
    /// so mono clips play on every speaker.
    pub fn sample(&self, frame: usize, channel: usize) -> f32 {
        let channel = channel.min(self.channels - 1);
        self.samples[frame * self.channels + channel]
    }

    /// Channel average of one frame
    pub fn mono_frame(&self, frame: usize) -> f32 {
        let start = frame * self.channels;
        self.samples[start..start + self.channels].iter().sum::<f32>() / self.channels as f32
    }
}

/// Decode an audio file into memory
///
/// Decode errors inside individual packets are skipped; anything that
/// prevents reading the container fails the whole load.
pub fn load_clip(path: &Path) -> Result<AudioClip, AudioError> {
    let file = File::open(path)?;
    let mss = MediaSourceStream::new(Box::new(file), Default::default());

    // Help format detection with the file extension
    let mut hint = Hint::new();
    if let Some(ext) = path.extension().and_then(|e| e.to_str()) {
        hint.with_extension(ext);
    }

    let probed = symphonia::default::get_probe().format(
        &hint,
        mss,
        &FormatOptions::default(),
        &MetadataOptions::default(),
    )?;

    let mut format = probed.format;

    let track = format
        .tracks()
        .iter()
        .find(|t| t.codec_params.codec != CODEC_TYPE_NULL)
        .ok_or(AudioError::NoAudioTrack)?;

    let track_id = track.id;
    let sample_rate = track
        .codec_params
        .sample_rate
        .ok_or(AudioError::UnknownSampleRate)?;
    let declared_channels = track.codec_params.channels.map(|c| c.count());

    let mut decoder =
        symphonia::default::get_codecs().make(&track.codec_params, &DecoderOptions::default())?;

    let mut builder = ClipBuilder::default();

    loop {
        let packet = match format.next_packet() {
            Ok(p) => p,
            Err(symphonia::core::errors::Error::IoError(ref e))
                if e.kind() == std::io::ErrorKind::UnexpectedEof =>
            {
                break;
            }
            Err(symphonia::core::errors::Error::ResetRequired) => {
                decoder.reset();
                continue;
            }
            Err(e) => return Err(e.into()),
        };

        if packet.track_id() != track_id {
            continue;
        }

        match decoder.decode(&packet) {
            Ok(decoded) => builder.push(decoded),
            Err(symphonia::core::errors::Error::DecodeError(msg)) => {
                log::debug!("Skipping undecodable packet: {}", msg);
            }
            Err(e) => return Err(e.into()),
        }
    }

    builder.finish(sample_rate, declared_channels)
}

/// Accumulates decoded packets as interleaved f32 frames
///
/// The first decoded packet fixes the channel layout; packets with a
/// different channel count are dropped.
#[derive(Default)]
struct ClipBuilder {
    samples: Vec<f32>,
    channels: Option<usize>,
    scratch: Option<AudioBuffer<f32>>,
}

impl ClipBuilder {
    fn push(&mut self, decoded: AudioBufferRef<'_>) {
        let spec = *decoded.spec();
        let channels = spec.channels.count();

        match self.channels {
            Some(expected) if expected != channels => {
                log::warn!(
                    "Dropping packet with {} channel(s), clip has {}",
                    channels,
                    expected
                );
                return;
            }
            _ => self.channels = Some(channels),
        }

        let reusable = self
            .scratch
            .as_ref()
            .is_some_and(|buf| *buf.spec() == spec && buf.capacity() >= decoded.frames());
        if !reusable {
            self.scratch = Some(AudioBuffer::new(decoded.capacity() as u64, spec));
        }
        let Some(scratch) = self.scratch.as_mut() else {
            return;
        };

        decoded.convert(scratch);

        self.samples.reserve(scratch.frames() * channels);
        for frame in 0..scratch.frames() {
            for channel in 0..channels {
                self.samples.push(scratch.chan(channel)[frame]);
            }
        }
    }

    fn finish(
        self,
        sample_rate: u32,
        declared_channels: Option<usize>,
    ) -> Result<AudioClip, AudioError> {
        let channels = self.channels.or(declared_channels).unwrap_or(0);
        if channels == 0 {
            return Err(AudioError::NoAudioTrack);
        }

        Ok(AudioClip {
            samples: self.samples,
            sample_rate,
            channels,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::borrow::Cow;
    use symphonia::core::audio::{Channels, SignalSpec};

    fn stereo_clip() -> AudioClip {
        AudioClip {
            samples: vec![0.5, -0.5, 1.0, 0.0], // 2 stereo frames
            sample_rate: 44100,
            channels: 2,
        }
    }

    #[test]
    fn test_clip_duration() {
        let clip = AudioClip {
            samples: vec![0.0; 44100 * 2], // 1 second of stereo
            sample_rate: 44100,
            channels: 2,
        };
        assert!((clip.duration() - 1.0).abs() < 0.001);
        assert_eq!(clip.num_frames(), 44100);
    }

    #[test]
    fn test_mono_frame_averages_channels() {
        let clip = stereo_clip();
        assert!((clip.mono_frame(0) - 0.0).abs() < 0.001);
        assert!((clip.mono_frame(1) - 0.5).abs() < 0.001);
    }

    #[test]
    fn test_extra_output_channels_reuse_last() {
        let mono = AudioClip {
            samples: vec![0.25, 0.75],
            sample_rate: 8000,
            channels: 1,
        };
        assert_eq!(mono.sample(1, 0), 0.75);
        assert_eq!(mono.sample(1, 1), 0.75);
    }

    fn planar(channels: &[&[f32]]) -> AudioBuffer<f32> {
        let layout = match channels.len() {
            1 => Channels::FRONT_LEFT,
            _ => Channels::FRONT_LEFT | Channels::FRONT_RIGHT,
        };
        let frames = channels[0].len();
        let mut buf = AudioBuffer::new(frames as u64, SignalSpec::new(44100, layout));
        buf.render_reserved(Some(frames));
        for (index, samples) in channels.iter().enumerate() {
            buf.chan_mut(index).copy_from_slice(samples);
        }
        buf
    }

    #[test]
    fn test_builder_interleaves_planar_packets() {
        let mut builder = ClipBuilder::default();
        builder.push(AudioBufferRef::F32(Cow::Owned(planar(&[&[0.1, 0.2], &[-0.1, -0.2]]))));
        builder.push(AudioBufferRef::F32(Cow::Owned(planar(&[&[0.3], &[-0.3]]))));

        let clip = builder.finish(44100, None).unwrap();
        assert_eq!(clip.channels, 2);
        assert_eq!(clip.samples, vec![0.1, -0.1, 0.2, -0.2, 0.3, -0.3]);
    }

    #[test]
    fn test_builder_drops_mismatched_channel_count() {
        let mut builder = ClipBuilder::default();
        builder.push(AudioBufferRef::F32(Cow::Owned(planar(&[&[0.5, 0.5]]))));
        builder.push(AudioBufferRef::F32(Cow::Owned(planar(&[&[1.0], &[1.0]]))));

        let clip = builder.finish(44100, Some(2)).unwrap();
        assert_eq!(clip.channels, 1);
        assert_eq!(clip.samples, vec![0.5, 0.5]);
    }

    #[test]
    fn test_builder_without_packets_uses_declared_layout() {
        let clip = ClipBuilder::default().finish(22050, Some(2)).unwrap();
        assert_eq!(clip.channels, 2);
        assert!(clip.samples.is_empty());

        let result = ClipBuilder::default().finish(22050, None);
        assert!(matches!(result, Err(AudioError::NoAudioTrack)));
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let result = load_clip(Path::new("does/not/exist.mp3"));
        assert!(matches!(result, Err(AudioError::IoError(_))));
    }
}
