//! Command-line argument parsing.

use std::path::PathBuf;

use clap::Parser;

use crate::params::{AudioConfig, RenderConfig};

/// Command line arguments
#[derive(Parser, Debug)]
#[command(name = "icopulse")]
#[command(about = "Audio-reactive wireframe icosphere", long_about = None)]
pub struct Args {
    /// Audio file to loop (mp3, wav, flac, ogg)
    #[arg(long, value_name = "PATH", default_value = "static/Beats.mp3")]
    pub audio: PathBuf,

    /// Initial window width (pixels)
    #[arg(
        long,
        value_name = "PX",
        default_value = "1024",
        value_parser = clap::value_parser!(u32).range(1..)
    )]
    pub width: u32,

    /// Initial window height (pixels)
    #[arg(
        long,
        value_name = "PX",
        default_value = "768",
        value_parser = clap::value_parser!(u32).range(1..)
    )]
    pub height: u32,

    /// Playback volume (0.0 - 1.0)
    #[arg(long, value_name = "GAIN", default_value = "0.5")]
    pub volume: f32,
}

impl Args {
    /// Render configuration with the window size overridden
    pub fn render_config(&self) -> RenderConfig {
        RenderConfig {
            window_width: self.width,
            window_height: self.height,
            ..Default::default()
        }
    }

    /// Audio configuration with asset path and volume overridden
    pub fn audio_config(&self) -> AudioConfig {
        AudioConfig {
            asset_path: self.audio.clone(),
            volume: self.volume,
            ..Default::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let args = Args::parse_from(["icopulse"]);
        let render = args.render_config();
        let audio = args.audio_config();

        assert_eq!(render.window_width, 1024);
        assert_eq!(render.window_height, 768);
        assert_eq!(audio.asset_path, PathBuf::from("static/Beats.mp3"));
        assert_eq!(audio.volume, 0.5);
        assert!(audio.validate().is_ok());
    }

    #[test]
    fn test_overrides() {
        let args = Args::parse_from([
            "icopulse",
            "--audio",
            "track.wav",
            "--width",
            "800",
            "--height",
            "600",
            "--volume",
            "1.0",
        ]);

        assert_eq!(args.render_config().aspect_ratio(), 800.0 / 600.0);
        assert_eq!(args.audio_config().asset_path, PathBuf::from("track.wav"));
        assert_eq!(args.audio_config().volume, 1.0);
    }

    #[test]
    fn test_zero_window_size_is_rejected() {
        assert!(Args::try_parse_from(["icopulse", "--width", "0"]).is_err());
        assert!(Args::try_parse_from(["icopulse", "--height", "0"]).is_err());
        assert!(Args::try_parse_from(["icopulse", "--width", "1", "--height", "1"]).is_ok());
    }

    #[test]
    fn test_out_of_range_volume_fails_validation() {
        let args = Args::parse_from(["icopulse", "--volume", "3"]);
        assert!(args.audio_config().validate().is_err());
    }
}
