use std::f32::consts::PI;

use crate::graph::node::RenderCtx;

/*
Lowpass state-variable filter (TPT form)

Passes everything below the cutoff and rolls off above it at 12 dB/octave.
Resonance is expressed as the quality factor Q, with damping k = 1/Q.
Q = 0.707 is maximally flat; Q = 1 adds a gentle bump at the cutoff.
*/

/// Highest cutoff as a fraction of the sample rate; tan() blows up at Nyquist
const MAX_CUTOFF_RATIO: f32 = 0.49;

#[derive(Debug, Clone)]
pub struct SVFilter {
    ic1eq: f32, // First integrator's memory
    ic2eq: f32, // Second integrator's memory

    cutoff_hz: f32,
    q: f32,
}

impl SVFilter {
    pub fn lowpass(cutoff_hz: f32, q: f32) -> Self {
        Self {
            ic1eq: 0.0,
            ic2eq: 0.0,
            cutoff_hz,
            q,
        }
    }

    #[inline]
    fn compute_g(&self, ctx: &RenderCtx) -> f32 {
        let cutoff = self.cutoff_hz.clamp(1.0, ctx.sample_rate * MAX_CUTOFF_RATIO);
        (PI * cutoff / ctx.sample_rate).tan()
    }

    #[inline]
    fn damping(&self) -> f32 {
        1.0 / self.q.max(0.01)
    }

    #[inline]
    fn next_sample(&mut self, sample: f32, k: f32, g: f32) -> f32 {
        let h = 1.0 / (1.0 + g * (g + k));
        let v3 = sample - self.ic2eq;
        let v1 = h * (self.ic1eq + g * v3);
        let v2 = self.ic2eq + g * v1;

        self.ic1eq = 2.0 * v1 - self.ic1eq;
        self.ic2eq = 2.0 * v2 - self.ic2eq;

        v2
    }

    pub fn render(&mut self, buffer: &mut [f32], ctx: &RenderCtx) {
        let g = self.compute_g(ctx);
        let k = self.damping();

        for sample in buffer.iter_mut() {
            *sample = self.next_sample(*sample, k, g);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dsp::oscillator::SineSource;

    const SAMPLE_RATE: f32 = 48_000.0;

    fn peak_after_transient(buffer: &[f32]) -> f32 {
        let skip = buffer.len().min(256);
        buffer
            .get(skip..)
            .unwrap_or(buffer)
            .iter()
            .fold(0.0f32, |acc, &x| acc.max(x.abs()))
    }

    fn filtered_sine_peak(filter: &mut SVFilter, freq: f32) -> f32 {
        let ctx = RenderCtx::at(SAMPLE_RATE, 0.0);
        let mut osc = SineSource::new(freq);
        osc.start(0.0);

        let mut buffer = vec![0.0f32; 2048];
        osc.render(&mut buffer, &ctx);
        filter.render(&mut buffer, &ctx);
        peak_after_transient(&buffer)
    }

    #[test]
    fn test_lowpass_basic() {
        let mut filter = SVFilter::lowpass(500.0, 0.707);
        let mut buffer = vec![1.0; 1024];

        filter.render(&mut buffer, &RenderCtx::at(SAMPLE_RATE, 0.0));

        assert!(buffer[1023] > 0.99, "dc should pass, got {}", buffer[1023]);
    }

    #[test]
    fn test_lowpass_passes_fundamental_below_cutoff() {
        // the vibraphone voicing: cutoff at three times the note
        let mut filter = SVFilter::lowpass(3.0 * 440.0, 1.0);
        let peak = filtered_sine_peak(&mut filter, 440.0);

        assert!(
            (0.9..1.3).contains(&peak),
            "fundamental should pass near unity, got {peak}"
        );
    }

    #[test]
    fn test_lowpass_filters_high_freq() {
        let mut filter = SVFilter::lowpass(500.0, 0.707);
        let peak = filtered_sine_peak(&mut filter, 5_000.0);

        assert!(peak < 0.05, "expected high freq attenuation, got peak: {peak}");
    }

    #[test]
    fn test_q_affects_peak_at_cutoff() {
        let mut gentle = SVFilter::lowpass(1_000.0, 0.5);
        let gentle_peak = filtered_sine_peak(&mut gentle, 1_000.0);

        let mut resonant = SVFilter::lowpass(1_000.0, 4.0);
        let resonant_peak = filtered_sine_peak(&mut resonant, 1_000.0);

        assert!(
            resonant_peak > gentle_peak * 2.0,
            "higher Q should boost the cutoff: resonant={resonant_peak}, gentle={gentle_peak}"
        );
    }

    #[test]
    fn cutoff_above_nyquist_stays_stable() {
        let mut filter = SVFilter::lowpass(40_000.0, 1.0);
        let peak = filtered_sine_peak(&mut filter, 1_000.0);

        assert!(peak.is_finite());
        assert!(peak < 2.0);
    }
}
