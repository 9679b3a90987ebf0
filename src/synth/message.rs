use crate::{dsp::ParamOp, graph::SignalChain, synth::voice::VoiceId};

/// Control side → renderer.
pub enum Command {
    /// Add a freshly built chain to the live set
    Start(Box<SignalChain>),
    /// Edit a live chain's gain timeline
    Automate { voice: VoiceId, op: ParamOp },
    /// (Re)schedule a live chain's oscillator stop
    Stop { voice: VoiceId, time: f64 },
}

/// Renderer → control side.
pub enum Event {
    /// The chain's oscillator passed its stop time; ownership returns to the
    /// control side for disposal
    Ended(Box<SignalChain>),
}
