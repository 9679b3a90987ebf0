pub mod config; // Tunable envelope, tone and output settings
pub mod context; // Audio output context, clock and render side
pub mod dsp;
pub mod error;
pub mod graph; // Nodes and the fixed per-voice signal chain
pub mod synth; // Voice management and sustain semantics

pub use config::{EngineConfig, EnvelopeConfig, OutputBackend, OutputConfig, ToneConfig};
pub use context::{AudioContext, AudioOutput, ContextState, OutputStatus};
pub use error::AudioError;
pub use synth::{engine::VoiceEngine, note::Note, OnEnded};

pub const MAX_BLOCK_SIZE: usize = 2048;
