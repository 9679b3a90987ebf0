use std::fmt;

use crate::{
    config::EnvelopeConfig,
    context::AudioContext,
    dsp::{
        param::{AutomationError, AutomationEvent},
        ParamOp, ParamTimeline,
    },
    error::AudioError,
    synth::{message::Command, note::Note, OnEnded},
};

/// Identity of one signal chain instance.
///
/// Note names are reused on every strike; ids never are, which is what lets
/// a termination event tell whether the registry entry is still its own.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct VoiceId(u64);

impl VoiceId {
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    pub fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for VoiceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Gain timeline for a struck bar: silence at `t0`, linear attack to the
/// peak, then an exponential fall that lands on the floor at `t0 + decay`.
pub fn strike_envelope(
    env: &EnvelopeConfig,
    t0: f64,
    decay: f64,
) -> Result<ParamTimeline, AutomationError> {
    let mut gain = ParamTimeline::new(1.0);
    gain.set_value_at_time(0.0, t0)?;
    gain.linear_ramp_to_value_at_time(env.peak, t0 + env.attack)?;
    gain.exponential_ramp_to_value_at_time(env.floor, t0 + decay)?;
    Ok(gain)
}

/// Control-side record of a sounding note.
///
/// The nodes themselves live on the render side; the voice keeps a mirror of
/// the gain timeline so the current level can be read without asking the
/// renderer.
pub struct Voice {
    id: VoiceId,
    note: Note,
    gain: ParamTimeline,
    scheduled_stop: f64,
    releasing: bool,
    on_ended: Option<OnEnded>,
}

impl Voice {
    pub(crate) fn new(
        id: VoiceId,
        note: Note,
        gain: ParamTimeline,
        scheduled_stop: f64,
        on_ended: Option<OnEnded>,
    ) -> Self {
        Self {
            id,
            note,
            gain,
            scheduled_stop,
            releasing: false,
            on_ended,
        }
    }

    pub fn id(&self) -> VoiceId {
        self.id
    }

    pub fn note(&self) -> &Note {
        &self.note
    }

    /// Absolute time at which the oscillator is commanded to halt.
    pub fn scheduled_stop(&self) -> f64 {
        self.scheduled_stop
    }

    pub fn gain_at(&self, time: f64) -> f32 {
        self.gain.value_at(time)
    }

    /// True once a forced fade has been scheduled.
    pub fn is_releasing(&self) -> bool {
        self.releasing
    }

    /// Fade from the current level to `floor` over `window`, then stop.
    ///
    /// The edits are only sent if the command ring has room for all of
    /// them, so the renderer never sees half a fade.
    pub(crate) fn fade_out(
        &mut self,
        ctx: &mut AudioContext,
        floor: f32,
        now: f64,
        window: f64,
    ) -> Result<(), AudioError> {
        const FADE_COMMANDS: usize = 4;
        if ctx.command_slots() < FADE_COMMANDS {
            return Err(AudioError::QueueFull);
        }

        let level = self.gain.value_at(now);
        let end = now + window;
        let ops = [
            ParamOp::CancelFrom(now),
            ParamOp::Schedule(AutomationEvent::SetValue {
                value: level,
                time: now,
            }),
            ParamOp::Schedule(AutomationEvent::ExponentialRamp {
                value: floor,
                time: end,
            }),
        ];

        for op in ops {
            self.gain.apply(op)?;
            ctx.send(Command::Automate { voice: self.id, op })?;
        }
        ctx.send(Command::Stop {
            voice: self.id,
            time: end,
        })?;

        self.scheduled_stop = end;
        self.releasing = true;
        Ok(())
    }

    /// Natural end: hand the caller its completion signal.
    pub(crate) fn finish(mut self) {
        if let Some(on_ended) = self.on_ended.take() {
            on_ended();
        }
    }
}

impl fmt::Debug for Voice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Voice")
            .field("id", &self.id)
            .field("note", &self.note)
            .field("scheduled_stop", &self.scheduled_stop)
            .field("releasing", &self.releasing)
            .field("on_ended", &self.on_ended.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strike_rises_then_falls() {
        let env = EnvelopeConfig::default();
        let gain = strike_envelope(&env, 2.0, env.decay).unwrap();

        assert_eq!(gain.value_at(2.0), 0.0);
        assert!((gain.value_at(2.01) - 0.4).abs() < 1e-5);

        let mut last = gain.value_at(2.01);
        let mut t = 2.01;
        while t < 2.9 {
            let level = gain.value_at(t);
            assert!(level <= last + 1e-7, "gain rose at t={t}");
            assert!(level > 0.0);
            last = level;
            t += 0.001;
        }
    }
}
