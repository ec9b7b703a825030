//! Frame clock for driving a show from a render loop.
//!
//! Turns wall-clock frame intervals into simulation deltas: optionally fixed,
//! scaled, paused, and clamped so that a long hitch (window drag, breakpoint)
//! does not fling every particle across the sky in one step.
//!
//! # Example
//!
//! ```ignore
//! let mut clock = FrameClock::new().with_max_delta(0.1);
//!
//! // In your render loop:
//! let dt = clock.tick();
//! show.update(dt, Some(&camera.frame()));
//! ```

use std::time::{Duration, Instant};

/// Per-frame delta source.
#[derive(Debug)]
pub struct FrameClock {
    last_frame: Instant,
    /// Simulated seconds since creation.
    elapsed_secs: f32,
    delta_secs: f32,
    frame_count: u64,
    fps: f32,
    fps_frame_count: u64,
    fps_update_time: Instant,
    fps_update_interval: Duration,
    paused: bool,
    /// Fixed delta time for deterministic updates (optional).
    fixed_delta: Option<f32>,
    /// Time scale multiplier (1.0 = normal speed).
    time_scale: f32,
    /// Longest raw delta accepted before scaling.
    max_delta: f32,
}

impl FrameClock {
    /// Create a clock starting from now.
    pub fn new() -> Self {
        let now = Instant::now();
        Self {
            last_frame: now,
            elapsed_secs: 0.0,
            delta_secs: 0.0,
            frame_count: 0,
            fps: 0.0,
            fps_frame_count: 0,
            fps_update_time: now,
            fps_update_interval: Duration::from_millis(500),
            paused: false,
            fixed_delta: None,
            time_scale: 1.0,
            max_delta: 0.25,
        }
    }

    /// Clamp raw frame intervals to `seconds`.
    pub fn with_max_delta(mut self, seconds: f32) -> Self {
        self.max_delta = seconds.max(0.0);
        self
    }

    /// Use a fixed delta instead of wall-clock timing.
    pub fn with_fixed_delta(mut self, delta: f32) -> Self {
        self.fixed_delta = Some(delta.max(0.0));
        self
    }

    /// Measure the wall-clock interval since the last call and advance.
    ///
    /// Returns the simulation delta for this frame.
    pub fn tick(&mut self) -> f32 {
        let now = Instant::now();
        let raw = now.duration_since(self.last_frame).as_secs_f32();
        self.last_frame = now;

        let fps_elapsed = now.duration_since(self.fps_update_time);
        if fps_elapsed >= self.fps_update_interval {
            let frames_since = self.frame_count - self.fps_frame_count;
            self.fps = frames_since as f32 / fps_elapsed.as_secs_f32();
            self.fps_frame_count = self.frame_count;
            self.fps_update_time = now;
        }

        self.advance(raw)
    }

    /// Advance by an externally measured interval of `raw` seconds.
    pub fn advance(&mut self, raw: f32) -> f32 {
        self.frame_count += 1;
        if self.paused {
            self.delta_secs = 0.0;
            return 0.0;
        }

        let raw = self.fixed_delta.unwrap_or(raw).clamp(0.0, self.max_delta);
        self.delta_secs = raw * self.time_scale;
        self.elapsed_secs += self.delta_secs;
        self.delta_secs
    }

    /// Simulated seconds since creation.
    #[inline]
    pub fn elapsed(&self) -> f32 {
        self.elapsed_secs
    }

    /// Delta returned by the last tick.
    #[inline]
    pub fn delta(&self) -> f32 {
        self.delta_secs
    }

    /// Total frames since start.
    #[inline]
    pub fn frame(&self) -> u64 {
        self.frame_count
    }

    /// Calculated frames per second.
    #[inline]
    pub fn fps(&self) -> f32 {
        self.fps
    }

    #[inline]
    pub fn is_paused(&self) -> bool {
        self.paused
    }

    #[inline]
    pub fn time_scale(&self) -> f32 {
        self.time_scale
    }

    /// Toggle pause state. While paused, deltas are zero.
    pub fn toggle_pause(&mut self) {
        self.paused = !self.paused;
    }

    /// Set time scale multiplier.
    ///
    /// - `1.0` = normal speed
    /// - `0.5` = half speed (slow motion)
    /// - `2.0` = double speed
    pub fn set_time_scale(&mut self, scale: f32) {
        self.time_scale = scale.max(0.0);
    }
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn test_clock_new() {
        let clock = FrameClock::new();
        assert_eq!(clock.frame(), 0);
        assert!(!clock.is_paused());
        assert_eq!(clock.time_scale(), 1.0);
    }

    #[test]
    fn test_tick_measures_time() {
        let mut clock = FrameClock::new();
        thread::sleep(Duration::from_millis(10));
        let dt = clock.tick();
        assert!(dt > 0.0);
        assert_eq!(clock.frame(), 1);
    }

    #[test]
    fn test_hitch_is_clamped() {
        let mut clock = FrameClock::new().with_max_delta(0.1);
        assert_eq!(clock.advance(3.0), 0.1);
        assert_eq!(clock.advance(-1.0), 0.0);
    }

    #[test]
    fn test_pause_and_scale() {
        let mut clock = FrameClock::new();
        clock.toggle_pause();
        assert_eq!(clock.advance(0.016), 0.0);
        assert_eq!(clock.elapsed(), 0.0);

        clock.toggle_pause();
        clock.set_time_scale(2.0);
        assert!((clock.advance(0.01) - 0.02).abs() < 1e-6);

        clock.set_time_scale(-1.0);
        assert_eq!(clock.time_scale(), 0.0);
    }

    #[test]
    fn test_fixed_delta() {
        let mut clock = FrameClock::new().with_fixed_delta(1.0 / 60.0);
        thread::sleep(Duration::from_millis(20));
        let dt = clock.tick();
        assert!((dt - 1.0 / 60.0).abs() < 0.0001);
    }
}
