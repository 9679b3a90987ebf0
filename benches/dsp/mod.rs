//! Benchmarks for low-level DSP primitives.

mod filter;
mod oscillator;
mod param;

pub use filter::bench_filter;
pub use oscillator::bench_oscillator;
pub use param::bench_param;
