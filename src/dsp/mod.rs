//! Low-level DSP primitives used by the graph nodes.
//!
//! These components are allocation-free once built, making them safe to run
//! inside the output callback. They stay focused on the signal-processing
//! math; scheduling and ownership live in `graph` and `synth`.

/// Resonant state-variable lowpass.
pub mod filter;
/// Scheduled sine source with single-use start/stop semantics.
pub mod oscillator;
/// Time-stamped parameter automation (set, linear and exponential ramps).
pub mod param;

pub use oscillator::{SourceState, StopOutcome};
pub use param::{AutomationEvent, ParamOp, ParamTimeline};
