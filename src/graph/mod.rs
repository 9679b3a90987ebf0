//! Graph nodes wrapping the DSP primitives with block rendering and
//! scheduling, plus the fixed chain every voice is built from.

/// Oscillator → filter → gain, tagged with its voice identity.
pub mod chain;
/// Lowpass node with resonance.
pub mod filter;
/// Gain node driven by an automation timeline.
pub mod gain;
/// Core traits shared by all graph nodes.
pub mod node;
/// Single-use scheduled sine oscillator.
pub mod oscillator;

pub use chain::SignalChain;
pub use node::{GraphNode, RenderCtx};
