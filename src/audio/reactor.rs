//! Audio reactor: background loading, playback start and per-tick readings.

use std::path::PathBuf;
use std::thread;

use super::{load_clip, AudioClip, AudioError, AudioSession, FrequencyAnalyser};
use crate::params::AudioConfig;

/// Playing session plus the analyser bound to it
pub struct AudioReactor {
    session: AudioSession,
    analyser: FrequencyAnalyser,
    /// Reused analysis window (fft_size mono frames)
    window: Vec<f32>,
    /// Output stream (kept alive; None when running without a device)
    _stream: Option<cpal::Stream>,
}

impl AudioReactor {
    /// Decode `path` on a background thread and hand the result to `notify`
    ///
    /// `notify` runs exactly once, on the loader thread.
    pub fn spawn_loader<F>(path: PathBuf, notify: F) -> thread::JoinHandle<()>
    where
        F: FnOnce(Result<AudioClip, AudioError>) + Send + 'static,
    {
        thread::spawn(move || {
            log::info!("Loading audio from {}", path.display());
            let result = load_clip(&path);
            if let Ok(clip) = &result {
                log::info!(
                    "Decoded {:.1}s @ {}Hz, {} channel(s)",
                    clip.duration(),
                    clip.sample_rate,
                    clip.channels
                );
            }
            notify(result);
        })
    }

    /// Start looping playback on the default output device
    pub fn start(clip: AudioClip, config: &AudioConfig) -> Result<Self, AudioError> {
        let mut reactor = Self::start_detached(clip, config)?;
        reactor._stream = Some(reactor.session.open_output_stream()?);
        Ok(reactor)
    }

    /// Start playback without an output device
    ///
    /// The session is marked playing but only moves when something calls
    /// `AudioSession::render_into`.
    pub fn start_detached(clip: AudioClip, config: &AudioConfig) -> Result<Self, AudioError> {
        let analyser = FrequencyAnalyser::new(config)?;
        let session = AudioSession::new(clip, config);
        session.play();

        Ok(Self {
            window: vec![0.0; analyser.fft_size()],
            session,
            analyser,
            _stream: None,
        })
    }

    pub fn session(&self) -> &AudioSession {
        &self.session
    }

    /// Analyse the frames just played and return every bin
    pub fn frequency_data(&mut self) -> &[u8] {
        self.session.fill_analysis_window(&mut self.window);
        self.analyser.analyse(&self.window)
    }

    /// Current magnitude of the lowest frequency bin (0.0..=255.0)
    pub fn magnitude(&mut self) -> f32 {
        self.frequency_data();
        self.analyser.magnitude(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::mpsc;

    fn clip(value: f32, frames: usize) -> AudioClip {
        AudioClip {
            samples: vec![value; frames],
            sample_rate: 44100,
            channels: 1,
        }
    }

    #[test]
    fn test_detached_start_is_playing() {
        let config = AudioConfig::default();
        let reactor = AudioReactor::start_detached(clip(0.0, 1024), &config).unwrap();

        assert!(reactor.session().is_playing());
        assert!(reactor.session().is_looping());
        assert_eq!(reactor.session().volume(), 0.5);
    }

    #[test]
    fn test_silent_clip_reads_zero() {
        let config = AudioConfig::default();
        let mut reactor = AudioReactor::start_detached(clip(0.0, 4096), &config).unwrap();
        let mut out = vec![0.0f32; 512];

        for _ in 0..5 {
            reactor.session().render_into(&mut out, 1, 44100);
            assert_eq!(reactor.magnitude(), 0.0);
        }
    }

    #[test]
    fn test_loud_clip_reads_high() {
        let config = AudioConfig::default();
        let mut reactor = AudioReactor::start_detached(clip(0.8, 4096), &config).unwrap();
        let mut out = vec![0.0f32; 512];
        reactor.session().render_into(&mut out, 1, 44100);

        let magnitude = reactor.magnitude();
        assert!(magnitude > 200.0 && magnitude <= 255.0);
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        let config = AudioConfig {
            fft_size: 100,
            ..Default::default()
        };
        let result = AudioReactor::start_detached(clip(0.0, 16), &config);
        assert!(matches!(result, Err(AudioError::Config(_))));
    }

    #[test]
    fn test_loader_reports_missing_file_once() {
        let (tx, rx) = mpsc::channel();
        AudioReactor::spawn_loader(PathBuf::from("no/such/asset.mp3"), move |result| {
            tx.send(result.is_err()).unwrap();
        })
        .join()
        .unwrap();

        assert_eq!(rx.iter().collect::<Vec<_>>(), vec![true]);
    }
}
