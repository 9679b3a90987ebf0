//! Error types for audio bring-up and scheduling.
//!
//! None of these ever escape `note_on`, `release_all` or `poll`: those entry
//! points are called from input handlers and log instead of returning.

use thiserror::Error;

pub use crate::config::ConfigError;
pub use crate::dsp::param::AutomationError;
pub use crate::synth::note::NoteError;

/// Errors raised while bringing up or driving the audio output
#[derive(Error, Debug)]
pub enum AudioError {
    /// The host has no default output device
    #[error("no audio output device available")]
    NoDevice,

    /// A device was requested by name and none matched
    #[error("audio output device '{0}' not found")]
    DeviceNotFound(String),

    #[error("failed to enumerate audio devices: {0}")]
    Devices(#[from] cpal::DevicesError),

    #[error("failed to query output configuration: {0}")]
    StreamConfig(#[from] cpal::DefaultStreamConfigError),

    #[error("unsupported output sample format {0:?}; expected f32")]
    UnsupportedFormat(cpal::SampleFormat),

    #[error("failed to build output stream: {0}")]
    BuildStream(#[from] cpal::BuildStreamError),

    #[error("failed to start output stream: {0}")]
    Play(#[from] cpal::PlayStreamError),

    #[error("failed to pause output stream: {0}")]
    Pause(#[from] cpal::PauseStreamError),

    /// Bring-up failed earlier; the output stays silent for the session
    #[error("audio output is unavailable")]
    Unavailable,

    /// The render side is not keeping up with control commands
    #[error("audio command queue is full")]
    QueueFull,

    /// Every preallocated voice slot on the render side is taken
    #[error("voice limit of {0} reached")]
    VoiceLimit(usize),

    /// `render` was called on a context that is driven by a device callback
    #[error("offline rendering requested on a device-backed context")]
    NotOffline,

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Automation(#[from] AutomationError),
}
