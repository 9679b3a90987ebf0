/*
Parameter Automation
====================

A parameter (here: a voice's gain) is described by a timeline of events in
absolute context time rather than by a value poked every block. The control
side schedules the whole envelope at note-on and the render side evaluates it
per sample, so nothing has to cross threads while a note rings.

Event Kinds
-----------

  SetValue(v, t)         Jump to v at time t.
  LinearRamp(v, t)       Straight line from the previous event to v at t.
  ExponentialRamp(v, t)  Constant-ratio curve from the previous event to v at t.

A ramp always starts where the previous event left off: its value and its time.
With no previous event it starts from the default value at time zero.

    gain
    0.4 ┐  ╱╲
        │ ╱  ╲
        │╱    ╲__
        │        ╲____
  floor └────────────────────→ t
        t0 +attack      +decay
        Set Linear  Exponential

Exponential Ramps
-----------------

    v(t) = v0 * (v1 / v0) ^ ((t - t0) / (t1 - t0))

The curve can only travel between two values of the same sign, which is why
every fade targets an inaudible floor (0.0001) instead of zero. If the ramp
starts at zero (or crosses sign) it holds the start value until t1.

Cancelling
----------

`cancel_scheduled_values(t)` drops every event at or after t, including a ramp
that is currently in progress. Callers that want to fade from "where the
parameter is now" read `value_at(now)` first, cancel, then anchor the new
fade with `set_value_at_time(level, now)`.
*/

use thiserror::Error;

#[derive(Error, Debug, Clone, Copy, PartialEq)]
pub enum AutomationError {
    #[error("exponential ramp target must be non-zero and finite, got {0}")]
    InvalidExponentialTarget(f32),

    #[error("automation time must be finite and non-negative, got {0}")]
    InvalidTime(f64),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AutomationEvent {
    SetValue { value: f32, time: f64 },
    LinearRamp { value: f32, time: f64 },
    ExponentialRamp { value: f32, time: f64 },
}

impl AutomationEvent {
    pub fn time(&self) -> f64 {
        match *self {
            AutomationEvent::SetValue { time, .. }
            | AutomationEvent::LinearRamp { time, .. }
            | AutomationEvent::ExponentialRamp { time, .. } => time,
        }
    }

    pub fn value(&self) -> f32 {
        match *self {
            AutomationEvent::SetValue { value, .. }
            | AutomationEvent::LinearRamp { value, .. }
            | AutomationEvent::ExponentialRamp { value, .. } => value,
        }
    }
}

/// A single timeline edit, as shipped from the control side to the render side.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ParamOp {
    Schedule(AutomationEvent),
    CancelFrom(f64),
}

#[derive(Debug, Clone)]
pub struct ParamTimeline {
    default: f32,
    events: Vec<AutomationEvent>,
}

impl ParamTimeline {
    pub fn new(default: f32) -> Self {
        Self {
            default,
            events: Vec::with_capacity(8),
        }
    }

    pub fn set_value_at_time(&mut self, value: f32, time: f64) -> Result<(), AutomationError> {
        self.insert(AutomationEvent::SetValue { value, time })
    }

    pub fn linear_ramp_to_value_at_time(
        &mut self,
        value: f32,
        time: f64,
    ) -> Result<(), AutomationError> {
        self.insert(AutomationEvent::LinearRamp { value, time })
    }

    pub fn exponential_ramp_to_value_at_time(
        &mut self,
        value: f32,
        time: f64,
    ) -> Result<(), AutomationError> {
        self.insert(AutomationEvent::ExponentialRamp { value, time })
    }

    /// Drop every event scheduled at or after `time`.
    pub fn cancel_scheduled_values(&mut self, time: f64) {
        let keep = self.events.partition_point(|e| e.time() < time);
        self.events.truncate(keep);
    }

    /// Apply an edit produced by the control side.
    pub fn apply(&mut self, op: ParamOp) -> Result<(), AutomationError> {
        match op {
            ParamOp::Schedule(event) => self.insert(event),
            ParamOp::CancelFrom(time) => {
                self.cancel_scheduled_values(time);
                Ok(())
            }
        }
    }

    /// Evaluate the parameter at absolute time `t`.
    pub fn value_at(&self, t: f64) -> f32 {
        // events[..idx] are at or before t
        let idx = self.events.partition_point(|e| e.time() <= t);

        let (v0, t0) = match idx.checked_sub(1).map(|i| self.events[i]) {
            Some(prev) => (prev.value(), prev.time()),
            None => (self.default, 0.0),
        };

        match self.events.get(idx) {
            Some(&AutomationEvent::LinearRamp { value: v1, time: t1 }) => {
                let span = t1 - t0;
                if span <= 0.0 {
                    return v1;
                }
                let progress = (t - t0) / span;
                (v0 as f64 + (v1 as f64 - v0 as f64) * progress) as f32
            }
            Some(&AutomationEvent::ExponentialRamp { value: v1, time: t1 }) => {
                let span = t1 - t0;
                if span <= 0.0 {
                    return v1;
                }
                if v0 == 0.0 || (v0 < 0.0) != (v1 < 0.0) {
                    return v0;
                }
                let progress = (t - t0) / span;
                (v0 as f64 * (v1 as f64 / v0 as f64).powf(progress)) as f32
            }
            _ => v0,
        }
    }

    /// Forget events that can no longer influence values at or after `t`.
    ///
    /// The last event at or before `t` is kept as the anchor for whatever
    /// ramp follows it.
    pub fn prune_before(&mut self, t: f64) {
        let idx = self.events.partition_point(|e| e.time() <= t);
        if idx > 1 {
            self.events.drain(..idx - 1);
        }
    }

    pub fn events(&self) -> &[AutomationEvent] {
        &self.events
    }

    fn insert(&mut self, event: AutomationEvent) -> Result<(), AutomationError> {
        let time = event.time();
        if !(time.is_finite() && time >= 0.0) {
            return Err(AutomationError::InvalidTime(time));
        }
        if let AutomationEvent::ExponentialRamp { value, .. } = event {
            if value == 0.0 || !value.is_finite() {
                return Err(AutomationError::InvalidExponentialTarget(value));
            }
        }

        // Events at the same instant keep insertion order
        let idx = self.events.partition_point(|e| e.time() <= time);
        self.events.insert(idx, event);
        Ok(())
    }
}
