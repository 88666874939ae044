//! Wall-clock frame timing for the host loop.
//!
//! The physics itself runs on a tick counter and never reads the wall clock;
//! [`FrameClock`] only measures how fast the host is calling
//! [`Simulation::tick`](crate::Simulation::tick).
//!
//! # Example
//!
//! ```ignore
//! let mut clock = FrameClock::new();
//! loop {
//!     sim.tick();
//!     clock.tick();
//!     if clock.frame() % 60 == 0 {
//!         log::info!("{:.1} fps", clock.fps());
//!     }
//! }
//! ```

use std::time::{Duration, Instant};

/// Frame counter with elapsed time, delta and a periodically refreshed FPS.
#[derive(Debug)]
pub struct FrameClock {
    start: Instant,
    last_frame: Instant,
    delta_secs: f32,
    frame_count: u64,
    fps: f32,
    fps_frame_count: u64,
    fps_update_time: Instant,
    /// How often the FPS estimate is refreshed.
    fps_update_interval: Duration,
}

impl FrameClock {
    /// Start a clock at the current instant.
    pub fn new() -> Self {
        let now = Instant::now();
        Self {
            start: now,
            last_frame: now,
            delta_secs: 0.0,
            frame_count: 0,
            fps: 0.0,
            fps_frame_count: 0,
            fps_update_time: now,
            fps_update_interval: Duration::from_millis(500),
        }
    }

    /// Mark the end of a frame. Returns the frame's duration in seconds.
    pub fn tick(&mut self) -> f32 {
        let now = Instant::now();
        self.delta_secs = now.duration_since(self.last_frame).as_secs_f32();
        self.last_frame = now;
        self.frame_count += 1;

        let since = now.duration_since(self.fps_update_time);
        if since >= self.fps_update_interval {
            let frames = self.frame_count - self.fps_frame_count;
            self.fps = frames as f32 / since.as_secs_f32();
            self.fps_frame_count = self.frame_count;
            self.fps_update_time = now;
        }

        self.delta_secs
    }

    /// Seconds since the clock started.
    #[inline]
    pub fn elapsed(&self) -> f32 {
        self.last_frame.duration_since(self.start).as_secs_f32()
    }

    /// Duration of the last frame in seconds.
    #[inline]
    pub fn delta(&self) -> f32 {
        self.delta_secs
    }

    /// Frames counted so far.
    #[inline]
    pub fn frame(&self) -> u64 {
        self.frame_count
    }

    /// Most recent FPS estimate. Zero until the first refresh interval passes.
    #[inline]
    pub fn fps(&self) -> f32 {
        self.fps
    }

    /// Restart from zero at the current instant.
    pub fn reset(&mut self) {
        *self = Self::new();
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
        assert_eq!(clock.fps(), 0.0);
    }

    #[test]
    fn test_clock_tick() {
        let mut clock = FrameClock::new();
        thread::sleep(Duration::from_millis(10));
        let delta = clock.tick();

        assert!(delta > 0.0);
        assert!(clock.elapsed() > 0.0);
        assert_eq!(clock.frame(), 1);
    }

    #[test]
    fn test_fps_refresh() {
        let mut clock = FrameClock::new();
        clock.fps_update_interval = Duration::from_millis(5);
        thread::sleep(Duration::from_millis(10));
        clock.tick();
        assert!(clock.fps() > 0.0);
    }

    #[test]
    fn test_reset() {
        let mut clock = FrameClock::new();
        clock.tick();
        clock.reset();
        assert_eq!(clock.frame(), 0);
    }
}
