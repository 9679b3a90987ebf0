//! The fixed per-voice signal chain: oscillator → lowpass → gain.

use crate::{
    dsp::{oscillator::StopOutcome, param::AutomationError, ParamOp},
    graph::{
        filter::FilterNode,
        gain::GainNode,
        node::{GraphNode, RenderCtx},
        oscillator::OscNode,
    },
    synth::{note::Note, voice::VoiceId},
};

/// One voice's nodes, exclusively owned by whichever side currently holds
/// the chain: built on the control side, rendered by the renderer, handed
/// back once the oscillator ends.
pub struct SignalChain {
    id: VoiceId,
    note: Note,
    osc: OscNode,
    filter: FilterNode,
    gain: GainNode,
}

impl SignalChain {
    pub fn new(id: VoiceId, note: Note, osc: OscNode, filter: FilterNode, gain: GainNode) -> Self {
        Self {
            id,
            note,
            osc,
            filter,
            gain,
        }
    }

    pub fn id(&self) -> VoiceId {
        self.id
    }

    pub fn note(&self) -> &Note {
        &self.note
    }

    pub fn stop(&mut self, time: f64) -> StopOutcome {
        self.osc.stop(time)
    }

    pub fn automate_gain(&mut self, op: ParamOp) -> Result<(), AutomationError> {
        self.gain.apply(op)
    }

    /// True once the oscillator passed its stop time.
    pub fn is_finished(&self) -> bool {
        self.osc.has_ended()
    }

    /// Tear the chain down, releasing its nodes.
    pub fn disconnect(self) {
        tracing::trace!(voice = %self.id, note = %self.note.name, "signal chain disconnected");
    }
}

impl GraphNode for SignalChain {
    fn render_block(&mut self, out: &mut [f32], ctx: &RenderCtx) {
        self.osc.render_block(out, ctx);
        self.filter.render_block(out, ctx);
        self.gain.render_block(out, ctx);

        // The chain is torn down with its source; drop the filter's ring-out
        if let Some(stop) = self.osc.stop_time().filter(|_| self.osc.has_ended()) {
            let cut = (0..out.len())
                .find(|&i| ctx.sample_time(i) >= stop)
                .unwrap_or(out.len());
            out[cut..].fill(0.0);
        }
    }

    fn is_active(&self) -> bool {
        !self.is_finished()
    }
}
