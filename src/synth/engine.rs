//! Voice engine: note-on, retrigger, sustain release and teardown.
//!
//! Every note is a fresh oscillator → lowpass → gain chain whose whole life
//! is scheduled up front: a 10 ms attack to 0.4, an exponential fall to the
//! floor over the decay window, and an oscillator stop shortly after. Nothing
//! is ever cut instantly; ending a note early always means a short fade to
//! the floor followed by a stop.
//!
//! Registry invariants:
//!
//! - At most one voice per note name. Striking a sounding note fades the old
//!   chain over 20 ms and drops its entry before the new one is registered.
//! - An entry is removed only by the termination of the chain it refers to.
//!   A superseded chain that finishes later finds a different id under its
//!   name and leaves the entry (and the newer voice's callback) alone.
//! - `release_all` fades every voice but removes nothing; each entry goes
//!   when its own chain reports the end.
//!
//! Termination reports arrive through `poll`, which the host calls from its
//! event loop; `note_on` and `release_all` also drain them first.

use tracing::{debug, trace, warn};

use crate::{
    config::{ConfigError, EngineConfig},
    context::{AudioOutput, OutputStatus},
    error::AudioError,
    graph::SignalChain,
    synth::{
        message::{Command, Event},
        note::Note,
        registry::VoiceRegistry,
        voice::{strike_envelope, Voice, VoiceId},
        OnEnded,
    },
};

pub struct VoiceEngine {
    config: EngineConfig,
    output: AudioOutput,
    registry: VoiceRegistry,
    next_id: u64,
}

impl VoiceEngine {
    pub fn new(config: EngineConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let output = AudioOutput::new(config.output.clone());

        Ok(Self {
            config,
            output,
            registry: VoiceRegistry::new(),
            next_id: 0,
        })
    }

    /// Bring up (or resume) the audio output. See [`AudioOutput::initialize`].
    pub fn initialize(&mut self) -> Result<(), AudioError> {
        self.output.initialize()
    }

    pub fn is_initialized(&self) -> bool {
        self.output.is_initialized()
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn output(&self) -> &AudioOutput {
        &self.output
    }

    pub fn output_mut(&mut self) -> &mut AudioOutput {
        &mut self.output
    }

    /// Context time, once the output is up.
    pub fn now(&self) -> Option<f64> {
        self.output.context().map(|ctx| ctx.now())
    }

    /// Strike `note`.
    ///
    /// Never fails: without a running output the call is logged and dropped.
    /// `on_ended` fires once, from `poll`, when this voice rings out; it is
    /// discarded unheard if the note is struck again first.
    pub fn note_on(&mut self, note: &Note, sustain_active: bool, on_ended: Option<OnEnded>) {
        self.poll();

        let status = self.output.status();
        let Some(ctx) = self.output.context_mut() else {
            match status {
                OutputStatus::Unavailable => {
                    debug!(note = %note.name, "audio output unavailable; note dropped")
                }
                _ => warn!(
                    note = %note.name,
                    "audio context not initialized; call initialize before note_on"
                ),
            }
            return;
        };

        ctx.resume_if_suspended();
        if !ctx.has_voice_room() {
            warn!(note = %note.name, "voice limit reached; note dropped");
            return;
        }

        let now = ctx.now();
        let env = &self.config.envelope;

        if let Some(mut prior) = self.registry.remove(&note.name) {
            debug!(voice = %prior.id(), note = %note.name, "retrigger; fading out previous voice");
            if let Err(err) = prior.fade_out(ctx, env.floor, now, env.retrigger_release) {
                warn!(%err, voice = %prior.id(), "could not schedule retrigger fade");
            }
        }

        let decay = env.decay_for(sustain_active);
        let stop_at = now + decay + env.stop_margin;
        let gain = match strike_envelope(env, now, decay) {
            Ok(gain) => gain,
            Err(err) => {
                warn!(%err, note = %note.name, "invalid envelope; note dropped");
                return;
            }
        };

        let id = VoiceId::new(self.next_id);
        self.next_id += 1;

        let mut osc = ctx.create_oscillator(note.frequency);
        osc.start(now);
        osc.stop(stop_at);
        let tone = &self.config.tone;
        let filter = ctx.create_lowpass(note.frequency * tone.cutoff_ratio, tone.resonance);
        let chain = SignalChain::new(id, note.clone(), osc, filter, ctx.create_gain(gain.clone()));

        if let Err(err) = ctx.send(Command::Start(Box::new(chain))) {
            warn!(%err, note = %note.name, "could not start voice; note dropped");
            return;
        }

        trace!(voice = %id, note = %note.name, sustain_active, stop_at, "voice started");
        self.registry
            .insert(Voice::new(id, note.clone(), gain, stop_at, on_ended));
    }

    /// Fade every sounding voice out over the forced-release window.
    ///
    /// Used when the sustain pedal is lifted. Voices already in a forced
    /// fade are left alone, so calling this twice is harmless.
    pub fn release_all(&mut self) {
        self.poll();

        let Some(ctx) = self.output.context_mut() else {
            return;
        };
        let now = ctx.now();
        let env = &self.config.envelope;

        for voice in self.registry.iter_mut() {
            if voice.is_releasing() {
                continue;
            }
            if let Err(err) = voice.fade_out(ctx, env.floor, now, env.forced_release) {
                warn!(%err, voice = %voice.id(), "could not schedule release");
            }
        }
    }

    /// Deliver termination reports from the renderer.
    ///
    /// Each finished chain is disposed of here. If the registry still maps
    /// its note to this very chain, the entry is removed and the voice's
    /// `on_ended` runs. Returns the number of voices that ended this way.
    pub fn poll(&mut self) -> usize {
        let Some(ctx) = self.output.context_mut() else {
            return 0;
        };

        let mut ended = 0;
        while let Some(Event::Ended(chain)) = ctx.next_event() {
            let owner = self.registry.remove_if_owned(&chain.note().name, chain.id());
            if owner.is_none() {
                trace!(voice = %chain.id(), note = %chain.note().name, "superseded voice ended");
            }
            (*chain).disconnect();

            if let Some(voice) = owner {
                debug!(voice = %voice.id(), note = %voice.note().name, "voice ended");
                voice.finish();
                ended += 1;
            }
        }
        ended
    }

    /// Pull mono samples from an offline output.
    pub fn render(&mut self, out: &mut [f32]) -> Result<(), AudioError> {
        match self.output.context_mut() {
            Some(ctx) => ctx.render(out),
            None => Err(AudioError::Unavailable),
        }
    }

    pub fn voice_count(&self) -> usize {
        self.registry.len()
    }

    pub fn is_sounding(&self, name: &str) -> bool {
        self.registry.contains(name)
    }

    pub fn active_notes(&self) -> impl Iterator<Item = &str> {
        self.registry.notes()
    }

    /// When the registered voice for `name` will stop, if one is sounding.
    pub fn scheduled_stop(&self, name: &str) -> Option<f64> {
        self.registry.get(name).map(Voice::scheduled_stop)
    }

    /// Envelope level of the registered voice for `name` at `time`.
    pub fn gain_at(&self, name: &str, time: f64) -> Option<f32> {
        self.registry.get(name).map(|voice| voice.gain_at(time))
    }

    pub fn voice_id(&self, name: &str) -> Option<VoiceId> {
        self.registry.get(name).map(Voice::id)
    }
}
