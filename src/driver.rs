//! Animation driver: the per-frame update invoked by the window's frame pump.
//!
//! The driver stays idle until audio is ready, then on every tick samples
//! one magnitude, advances the uniform set and hands it to the renderer.
//! Time advances by a fixed step per tick, so animation speed follows the
//! display refresh rate rather than wall-clock time.

use crate::audio::{AudioReactor, MAX_BYTE_MAGNITUDE};
use crate::params::ShapeParams;
use crate::shape::UniformSet;

/// Anything that can supply one frequency magnitude per tick
pub trait MagnitudeSource {
    fn magnitude(&mut self) -> f32;
}

impl MagnitudeSource for AudioReactor {
    fn magnitude(&mut self) -> f32 {
        AudioReactor::magnitude(self)
    }
}

/// Anything that can draw one frame from a uniform set
pub trait FrameSink {
    type Error;

    fn render_frame(&mut self, uniforms: &UniformSet) -> Result<(), Self::Error>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DriverState {
    /// No audio session yet; ticks do nothing
    WaitingForAudio,
    Running,
    /// Stopped for shutdown; never restarts
    Stopped,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TickOutcome {
    Idle,
    Rendered { magnitude: f32 },
}

/// Advance the uniform set to tick number `tick`
///
/// Time is derived from the tick count rather than summed, so it carries no
/// accumulated rounding error. The magnitude is clamped into the byte range
/// before it reaches the shader.
pub fn advance(uniforms: &UniformSet, tick: u64, time_step: f32, magnitude: f32) -> UniformSet {
    let mut next = *uniforms;
    let frequency = if magnitude.is_finite() {
        magnitude.clamp(0.0, MAX_BYTE_MAGNITUDE)
    } else {
        0.0
    };
    next.update_uniforms(tick as f32 * time_step, frequency);
    next
}

pub struct AnimationDriver {
    state: DriverState,
    uniforms: UniformSet,
    time_step: f32,
    ticks: u64,
}

impl AnimationDriver {
    pub fn new(params: &ShapeParams) -> Self {
        Self {
            state: DriverState::WaitingForAudio,
            uniforms: UniformSet::new(params),
            time_step: params.time_step,
            ticks: 0,
        }
    }

    pub fn state(&self) -> DriverState {
        self.state
    }

    pub fn uniforms(&self) -> &UniformSet {
        &self.uniforms
    }

    /// Ticks that produced a frame
    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    /// Arm the driver once the audio session is playing
    pub fn on_audio_ready(&mut self) {
        if self.state == DriverState::WaitingForAudio {
            self.state = DriverState::Running;
        }
    }

    pub fn stop(&mut self) {
        self.state = DriverState::Stopped;
    }

    /// Whether the frame pump should request a redraw every iteration
    ///
    /// Only a running driver animates. While waiting for audio, frames are
    /// drawn on demand (first expose, resize) through `render_still`.
    pub fn wants_continuous_redraw(&self) -> bool {
        self.state == DriverState::Running
    }

    /// Draw the current uniforms unchanged while waiting for audio
    ///
    /// Returns whether a frame was drawn. Time and frequency stay at their
    /// initial values, so this is the static pre-audio frame.
    pub fn render_still<F>(&self, sink: &mut F) -> Result<bool, F::Error>
    where
        F: FrameSink + ?Sized,
    {
        if self.state != DriverState::WaitingForAudio {
            return Ok(false);
        }
        sink.render_frame(&self.uniforms)?;
        Ok(true)
    }

    /// Run one animation tick
    ///
    /// Order: read the magnitude, update the uniforms, render. Does nothing
    /// unless the driver is running.
    pub fn tick<S, F>(&mut self, source: &mut S, sink: &mut F) -> Result<TickOutcome, F::Error>
    where
        S: MagnitudeSource + ?Sized,
        F: FrameSink + ?Sized,
    {
        if self.state != DriverState::Running {
            return Ok(TickOutcome::Idle);
        }

        let tick = self.ticks + 1;
        let next = advance(&self.uniforms, tick, self.time_step, source.magnitude());
        self.uniforms = next;
        self.ticks = tick;

        sink.render_frame(&self.uniforms)?;
        Ok(TickOutcome::Rendered {
            magnitude: self.uniforms.frequency,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Constant(f32);

    impl MagnitudeSource for Constant {
        fn magnitude(&mut self) -> f32 {
            self.0
        }
    }

    #[derive(Default)]
    struct Recorder {
        frames: Vec<UniformSet>,
    }

    impl FrameSink for Recorder {
        type Error = ();

        fn render_frame(&mut self, uniforms: &UniformSet) -> Result<(), ()> {
            self.frames.push(*uniforms);
            Ok(())
        }
    }

    struct Failing;

    impl FrameSink for Failing {
        type Error = &'static str;

        fn render_frame(&mut self, _: &UniformSet) -> Result<(), &'static str> {
            Err("surface lost")
        }
    }

    fn running_driver() -> AnimationDriver {
        let mut driver = AnimationDriver::new(&ShapeParams::default());
        driver.on_audio_ready();
        driver
    }

    #[test]
    fn test_idle_until_audio_ready() {
        let mut driver = AnimationDriver::new(&ShapeParams::default());
        let mut sink = Recorder::default();

        for _ in 0..10 {
            let outcome = driver.tick(&mut Constant(100.0), &mut sink).unwrap();
            assert_eq!(outcome, TickOutcome::Idle);
        }

        assert_eq!(driver.state(), DriverState::WaitingForAudio);
        assert!(sink.frames.is_empty());
        assert_eq!(driver.uniforms().time, 0.0);
    }

    #[test]
    fn test_time_is_tick_count_times_step() {
        // Animation speed is tied to tick rate, not elapsed time: a 144Hz
        // display animates faster than a 60Hz one.
        let mut driver = running_driver();
        let mut sink = Recorder::default();

        for n in 1..=1000u64 {
            driver.tick(&mut Constant(0.0), &mut sink).unwrap();
            assert_eq!(driver.uniforms().time, n as f32 * 0.05);
        }
        assert_eq!(driver.ticks(), 1000);
    }

    #[test]
    fn test_magnitude_reaches_uniforms_each_tick() {
        let mut driver = running_driver();
        let mut sink = Recorder::default();

        driver.tick(&mut Constant(12.0), &mut sink).unwrap();
        driver.tick(&mut Constant(200.0), &mut sink).unwrap();

        let frequencies: Vec<f32> = sink.frames.iter().map(|u| u.frequency).collect();
        assert_eq!(frequencies, vec![12.0, 200.0]);
    }

    #[test]
    fn test_out_of_range_magnitude_is_clamped() {
        let mut driver = running_driver();
        let mut sink = Recorder::default();

        for value in [-5.0, 300.0, f32::NAN, f32::INFINITY] {
            driver.tick(&mut Constant(value), &mut sink).unwrap();
        }

        for frame in &sink.frames {
            assert!((0.0..=MAX_BYTE_MAGNITUDE).contains(&frame.frequency));
        }
    }

    #[test]
    fn test_stop_halts_rendering() {
        let mut driver = running_driver();
        let mut sink = Recorder::default();

        driver.tick(&mut Constant(1.0), &mut sink).unwrap();
        driver.stop();
        driver.on_audio_ready();
        driver.tick(&mut Constant(1.0), &mut sink).unwrap();

        assert_eq!(driver.state(), DriverState::Stopped);
        assert_eq!(sink.frames.len(), 1);
    }

    #[test]
    fn test_advance_is_pure() {
        let start = UniformSet::new(&ShapeParams::default());
        let a = advance(&start, 7, 0.05, 42.0);
        let b = advance(&start, 7, 0.05, 42.0);

        assert_eq!(a, b);
        assert_eq!(start.time, 0.0);
        assert_eq!(a.time, 7.0 * 0.05);
        assert_eq!(a.frequency, 42.0);
    }

    #[test]
    fn test_still_frame_while_waiting() {
        let mut driver = AnimationDriver::new(&ShapeParams::default());
        let mut sink = Recorder::default();

        assert!(!driver.wants_continuous_redraw());
        assert_eq!(driver.render_still(&mut sink), Ok(true));
        assert_eq!(driver.render_still(&mut sink), Ok(true));

        assert_eq!(sink.frames.len(), 2);
        assert_eq!(sink.frames[0], UniformSet::new(&ShapeParams::default()));
        assert_eq!(driver.ticks(), 0);
        assert_eq!(driver.state(), DriverState::WaitingForAudio);

        driver.on_audio_ready();
        assert!(driver.wants_continuous_redraw());
        assert_eq!(driver.render_still(&mut sink), Ok(false));
        assert_eq!(sink.frames.len(), 2);
    }

    #[test]
    fn test_stopped_driver_draws_nothing() {
        let mut driver = AnimationDriver::new(&ShapeParams::default());
        let mut sink = Recorder::default();
        driver.stop();

        assert!(!driver.wants_continuous_redraw());
        assert_eq!(driver.render_still(&mut sink), Ok(false));
        assert_eq!(
            driver.tick(&mut Constant(1.0), &mut sink),
            Ok(TickOutcome::Idle)
        );
        assert!(sink.frames.is_empty());
    }

    #[test]
    fn test_render_error_is_returned() {
        let mut driver = running_driver();
        let result = driver.tick(&mut Constant(1.0), &mut Failing);
        assert_eq!(result, Err("surface lost"));
        // The tick still advanced the uniforms
        assert_eq!(driver.ticks(), 1);
    }
}
