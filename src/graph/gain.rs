use crate::{
    dsp::param::{AutomationError, ParamOp, ParamTimeline},
    graph::node::{GraphNode, RenderCtx},
};

/// Multiplies the signal by an automated gain.
///
/// The gain is evaluated per sample from its timeline, so envelope ramps are
/// sample accurate regardless of block size.
pub struct GainNode {
    gain: ParamTimeline,
}

impl GainNode {
    pub fn new(gain: ParamTimeline) -> Self {
        Self { gain }
    }

    pub fn apply(&mut self, op: ParamOp) -> Result<(), AutomationError> {
        self.gain.apply(op)
    }

    pub fn value_at(&self, time: f64) -> f32 {
        self.gain.value_at(time)
    }
}

impl GraphNode for GainNode {
    fn render_block(&mut self, out: &mut [f32], ctx: &RenderCtx) {
        for (i, sample) in out.iter_mut().enumerate() {
            *sample *= self.gain.value_at(ctx.sample_time(i));
        }
        self.gain.prune_before(ctx.end_time(out.len()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn follows_linear_ramp() {
        let mut timeline = ParamTimeline::new(1.0);
        timeline.set_value_at_time(0.0, 0.0).unwrap();
        timeline.linear_ramp_to_value_at_time(1.0, 1.0).unwrap();

        let mut node = GainNode::new(timeline);
        let mut buffer = vec![1.0f32; 10];
        node.render_block(&mut buffer, &RenderCtx::at(10.0, 0.0));

        for (i, &s) in buffer.iter().enumerate() {
            assert!((s - i as f32 / 10.0).abs() < 1e-6, "sample {i} was {s}");
        }
    }

    #[test]
    fn pruning_keeps_later_values() {
        let mut timeline = ParamTimeline::new(1.0);
        timeline.set_value_at_time(0.0, 0.0).unwrap();
        timeline.linear_ramp_to_value_at_time(0.4, 0.01).unwrap();
        timeline.exponential_ramp_to_value_at_time(0.0001, 0.8).unwrap();
        let expected = timeline.value_at(0.5);

        let mut node = GainNode::new(timeline);
        let mut buffer = vec![1.0f32; 100];
        node.render_block(&mut buffer, &RenderCtx::at(1_000.0, 0.0));

        assert!((node.value_at(0.5) - expected).abs() < 1e-7);
    }
}
