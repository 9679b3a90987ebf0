use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

/// Context time shared between the control side and the renderer.
///
/// Time is counted in rendered frames, so it only moves while the context
/// is running and never goes backwards.
#[derive(Debug)]
pub struct Clock {
    frames: AtomicU64,
    running: AtomicBool,
    sample_rate: f32,
}

impl Clock {
    pub fn new(sample_rate: f32) -> Self {
        Self {
            frames: AtomicU64::new(0),
            running: AtomicBool::new(false),
            sample_rate,
        }
    }

    /// Current context time in seconds.
    pub fn now(&self) -> f64 {
        self.frames() as f64 / self.sample_rate as f64
    }

    pub fn frames(&self) -> u64 {
        self.frames.load(Ordering::Acquire)
    }

    pub fn sample_rate(&self) -> f32 {
        self.sample_rate
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }

    pub(crate) fn set_running(&self, running: bool) {
        self.running.store(running, Ordering::Release);
    }

    pub(crate) fn advance(&self, frames: usize) {
        self.frames.fetch_add(frames as u64, Ordering::AcqRel);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn time_follows_rendered_frames() {
        let clock = Clock::new(48_000.0);
        assert_eq!(clock.now(), 0.0);

        clock.advance(24_000);
        assert!((clock.now() - 0.5).abs() < 1e-12);

        clock.advance(24_000);
        assert!((clock.now() - 1.0).abs() < 1e-12);
    }
}
