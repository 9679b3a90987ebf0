// Purpose: Voice management, retrigger and sustain semantics
// This layer sits above graph nodes and decides when chains start and fade

pub mod engine;
pub mod message;
pub mod note;
pub mod registry;
pub mod voice;

/// Completion signal for a voice that rang out on its own.
///
/// Invoked at most once, on the thread that calls `VoiceEngine::poll`.
pub type OnEnded = Box<dyn FnOnce()>;
