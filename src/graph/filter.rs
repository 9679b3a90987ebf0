use crate::{
    dsp::filter::SVFilter,
    graph::node::{GraphNode, RenderCtx},
};

/*
State-Variable Filter Node
==========================

Voices run their sine through a lowpass tuned relative to the note:

  cutoff = fundamental * cutoff_ratio   (3x by default)
  Q      = resonance                    (1.0 by default)

A sine has nothing above its fundamental to remove, so the filter's job is the
gentle resonant bump and phase colour it adds around the cutoff, which reads
as a brighter, rounder strike than the raw oscillator.

Example usage:
  let filter = FilterNode::lowpass(440.0 * 3.0, 1.0);
*/

pub struct FilterNode {
    filter: SVFilter,
}

impl FilterNode {
    pub fn lowpass(cutoff_hz: f32, q: f32) -> Self {
        Self {
            filter: SVFilter::lowpass(cutoff_hz, q),
        }
    }
}

impl GraphNode for FilterNode {
    fn render_block(&mut self, out: &mut [f32], ctx: &RenderCtx) {
        self.filter.render(out, ctx);
    }
}
