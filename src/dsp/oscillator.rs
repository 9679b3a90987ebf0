use std::f64::consts::TAU;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::graph::node::RenderCtx;

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceState {
    Scheduled, // Waiting for its start time
    Playing,   // Producing output
    Ended,     // Reached its stop time; terminal
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopOutcome {
    /// The stop time was (re)scheduled; the latest call wins
    Scheduled,
    /// The source had already ended, nothing to do
    AlreadyEnded,
}

/// Sine source with start and stop times in context seconds.
///
/// Single-use: once ended it never plays again.
#[derive(Debug, Clone)]
pub struct SineSource {
    frequency: f32,
    phase: f64, // 0.0..1.0
    start_time: f64,
    stop_time: Option<f64>,
    state: SourceState,
}

impl SineSource {
    pub fn new(frequency: f32) -> Self {
        Self {
            frequency,
            phase: 0.0,
            start_time: 0.0,
            stop_time: None,
            state: SourceState::Scheduled,
        }
    }

    pub fn start(&mut self, time: f64) {
        if self.state == SourceState::Scheduled {
            self.start_time = time;
        }
    }

    /// Schedule the stop time.
    ///
    /// Stopping an ended source is expected (a fade can race the natural end)
    /// and succeeds without effect.
    pub fn stop(&mut self, time: f64) -> StopOutcome {
        if self.state == SourceState::Ended {
            return StopOutcome::AlreadyEnded;
        }
        self.stop_time = Some(time);
        StopOutcome::Scheduled
    }

    pub fn stop_time(&self) -> Option<f64> {
        self.stop_time
    }

    pub fn state(&self) -> SourceState {
        self.state
    }

    pub fn has_ended(&self) -> bool {
        self.state == SourceState::Ended
    }

    /// Fill `buffer` with output, samples timed from `ctx.time`.
    pub fn render(&mut self, buffer: &mut [f32], ctx: &RenderCtx) {
        let increment = self.frequency as f64 / ctx.sample_rate as f64;

        for (i, sample) in buffer.iter_mut().enumerate() {
            let t = ctx.sample_time(i);

            if self.state == SourceState::Scheduled && t >= self.start_time {
                self.state = SourceState::Playing;
            }
            if self.state == SourceState::Playing && self.stop_time.is_some_and(|stop| t >= stop) {
                self.state = SourceState::Ended;
            }

            *sample = match self.state {
                SourceState::Playing => {
                    let out = (TAU * self.phase).sin() as f32;
                    self.phase = (self.phase + increment).fract();
                    out
                }
                SourceState::Scheduled | SourceState::Ended => 0.0,
            };
        }
    }
}
