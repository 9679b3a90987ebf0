//! Benchmarks for per-sample gain automation.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use vibraphone::config::EnvelopeConfig;
use vibraphone::graph::{gain::GainNode, node::GraphNode, node::RenderCtx};
use vibraphone::synth::voice::strike_envelope;

use crate::BLOCK_SIZES;

pub fn bench_param(c: &mut Criterion) {
    let mut group = c.benchmark_group("dsp/gain");
    let env = EnvelopeConfig::default();

    for &size in BLOCK_SIZES {
        let mut buffer = vec![1.0f32; size];

        // Mid-decay: the exponential segment is the steady-state cost
        let ctx = RenderCtx::at(48_000.0, 0.3);
        let timeline = strike_envelope(&env, 0.0, env.sustained_decay).unwrap();
        group.bench_with_input(BenchmarkId::new("decay", size), &size, |b, _| {
            b.iter(|| {
                let mut node = GainNode::new(timeline.clone());
                buffer.fill(1.0);
                node.render_block(black_box(&mut buffer), black_box(&ctx));
            })
        });
    }

    group.finish();
}
