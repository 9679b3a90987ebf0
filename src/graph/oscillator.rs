use crate::dsp::oscillator::{SineSource, StopOutcome};
use crate::graph::node::{GraphNode, RenderCtx};

/*
Audio Oscillator
================

The oscillator is the sound source of a voice. A vibraphone bar rings with an
almost pure fundamental, so voices use a sine: a single frequency with no
harmonics. The lowpass and the envelope downstream shape it into a struck,
bell-like tone without adding overtones of their own.

Oscillator nodes are single-use. Each note gets a fresh node with its own
start and stop time; once the stop time passes the node is finished for
good and the chain it drives is handed back for disposal.

Example usage:
  let mut osc = OscNode::sine(440.0);
  osc.start(now);
  osc.stop(now + 0.9);
*/

pub struct OscNode {
    source: SineSource,
}

impl OscNode {
    pub fn sine(frequency: f32) -> Self {
        Self {
            source: SineSource::new(frequency),
        }
    }

    pub fn start(&mut self, time: f64) {
        self.source.start(time);
    }

    /// Schedule the stop; a no-op if the node already ended.
    pub fn stop(&mut self, time: f64) -> StopOutcome {
        self.source.stop(time)
    }

    pub fn stop_time(&self) -> Option<f64> {
        self.source.stop_time()
    }

    pub fn has_ended(&self) -> bool {
        self.source.has_ended()
    }
}

impl GraphNode for OscNode {
    fn render_block(&mut self, out: &mut [f32], ctx: &RenderCtx) {
        self.source.render(out, ctx);
    }

    fn is_active(&self) -> bool {
        !self.source.has_ended()
    }
}
