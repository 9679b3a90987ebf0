//! Benchmarks for the scheduled sine source.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use vibraphone::dsp::oscillator::SineSource;
use vibraphone::graph::node::RenderCtx;

use crate::BLOCK_SIZES;

pub fn bench_oscillator(c: &mut Criterion) {
    let mut group = c.benchmark_group("dsp/oscillator");
    let ctx = RenderCtx::at(48_000.0, 0.0);

    for &size in BLOCK_SIZES {
        let mut buffer = vec![0.0f32; size];
        let mut osc = SineSource::new(440.0);
        osc.start(0.0);

        group.bench_with_input(BenchmarkId::new("sine", size), &size, |b, _| {
            b.iter(|| {
                osc.render(black_box(&mut buffer), black_box(&ctx));
            })
        });
    }

    group.finish();
}
