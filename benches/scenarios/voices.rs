//! Benchmarks for complete voice chains.
//!
//! A held chord with the pedal down is the heaviest steady load the engine
//! sees: every voice rings through its long decay at once.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use vibraphone::{EngineConfig, Note, VoiceEngine};

use crate::BLOCK_SIZES;

const CHORD: &[&str] = &["F3", "A3", "C4", "E4", "G4", "A4", "C5", "E5"];

fn sustained_chord(voices: usize) -> VoiceEngine {
    let mut config = EngineConfig::offline(48_000.0);
    // long enough that no voice ends mid-benchmark
    config.envelope.sustained_decay = 3_600.0;

    let mut engine = VoiceEngine::new(config).unwrap();
    engine.initialize().unwrap();
    for name in CHORD.iter().cycle().take(voices) {
        engine.note_on(&Note::parse(name).unwrap(), true, None);
    }
    engine
}

pub fn bench_voices(c: &mut Criterion) {
    let mut group = c.benchmark_group("scenarios/voices");

    for &size in BLOCK_SIZES {
        let mut buffer = vec![0.0f32; size];

        for voices in [1, 4, 8] {
            let mut engine = sustained_chord(voices);
            group.bench_with_input(
                BenchmarkId::new(format!("chord_{voices}"), size),
                &size,
                |b, _| {
                    b.iter(|| {
                        engine.render(black_box(&mut buffer)).unwrap();
                    })
                },
            );
        }
    }

    group.finish();
}
