//! Scenario benchmarks: whole voice chains and the engine's render path.

mod voices;

pub use voices::bench_voices;
