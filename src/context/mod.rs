//! Audio output context.
//!
//! `AudioOutput` is the session-wide handle: nothing is opened until the
//! first `initialize()`, which builds an [`AudioContext`] and resumes it.
//! Later calls only resume. If the platform has no usable output the failure
//! is reported once and the handle stays silent for the rest of the session.
//!
//! ```ignore
//! let mut output = AudioOutput::new(OutputConfig::default());
//! if let Err(err) = output.initialize() {
//!     eprintln!("no sound: {err}");
//! }
//! ```

mod clock;
mod device;
mod renderer;

use std::sync::Arc;

use rtrb::{Consumer, Producer, RingBuffer};
use tracing::{debug, error, info, warn};

pub use clock::Clock;
pub use device::output_device_names;
pub use renderer::Renderer;

use crate::{
    config::{OutputBackend, OutputConfig},
    dsp::ParamTimeline,
    error::AudioError,
    graph::{filter::FilterNode, gain::GainNode, oscillator::OscNode},
    synth::message::{Command, Event},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContextState {
    Suspended, // Clock frozen, output silent
    Running,
}

/// Lifecycle of the session-wide output handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputStatus {
    Uninitialized,
    Suspended,
    Running,
    /// Bring-up failed; the session continues without sound
    Unavailable,
}

enum Backend {
    Device(cpal::Stream),
    Offline(Renderer),
}

/// Control-side handle to the real-time render graph.
pub struct AudioContext {
    clock: Arc<Clock>,
    commands: Producer<Command>,
    events: Consumer<Event>,
    backend: Backend,
    channels: usize,
    /// Chains sent to the renderer and not yet handed back
    live_chains: usize,
    voice_capacity: usize,
}

impl AudioContext {
    /// Open the configured backend. The context starts suspended.
    pub fn open(config: &OutputConfig) -> Result<Self, AudioError> {
        match &config.backend {
            OutputBackend::Offline { sample_rate } => Ok(Self::offline(*sample_rate, config)),
            OutputBackend::Device { name } => Self::device(name.as_deref(), config),
        }
    }

    fn offline(sample_rate: f32, config: &OutputConfig) -> Self {
        let (clock, commands, events, renderer) = wire(sample_rate, config);
        debug!(sample_rate, "offline audio context created");

        Self {
            clock,
            commands,
            events,
            backend: Backend::Offline(renderer),
            channels: 1,
            live_chains: 0,
            voice_capacity: config.voice_capacity,
        }
    }

    fn device(name: Option<&str>, config: &OutputConfig) -> Result<Self, AudioError> {
        use cpal::traits::StreamTrait;

        let (device, stream_config) = device::open(name)?;
        let sample_rate = stream_config.sample_rate().0 as f32;
        let channels = stream_config.channels() as usize;

        let (clock, commands, events, renderer) = wire(sample_rate, config);
        let stream = device::build_stream(&device, &stream_config, renderer)?;

        // Some hosts start playing as soon as the stream is built
        if let Err(err) = stream.pause() {
            debug!(%err, "output stream could not be paused after build");
        }

        info!(
            device = name.unwrap_or("default"),
            sample_rate, channels, "audio output opened"
        );

        Ok(Self {
            clock,
            commands,
            events,
            backend: Backend::Device(stream),
            channels,
            live_chains: 0,
            voice_capacity: config.voice_capacity,
        })
    }

    /// Current context time in seconds.
    pub fn now(&self) -> f64 {
        self.clock.now()
    }

    pub fn sample_rate(&self) -> f32 {
        self.clock.sample_rate()
    }

    pub fn channels(&self) -> usize {
        self.channels
    }

    pub fn state(&self) -> ContextState {
        if self.clock.is_running() {
            ContextState::Running
        } else {
            ContextState::Suspended
        }
    }

    pub fn resume(&mut self) -> Result<(), AudioError> {
        if self.clock.is_running() {
            return Ok(());
        }
        if let Backend::Device(stream) = &self.backend {
            use cpal::traits::StreamTrait;
            stream.play()?;
        }
        self.clock.set_running(true);
        Ok(())
    }

    pub fn suspend(&mut self) -> Result<(), AudioError> {
        if !self.clock.is_running() {
            return Ok(());
        }
        if let Backend::Device(stream) = &self.backend {
            use cpal::traits::StreamTrait;
            stream.pause()?;
        }
        self.clock.set_running(false);
        Ok(())
    }

    /// Resume a context that was suspended behind our back (or never
    /// started). Returns whether a resume happened; failures are logged.
    pub fn resume_if_suspended(&mut self) -> bool {
        if self.state() == ContextState::Running {
            return false;
        }
        match self.resume() {
            Ok(()) => {
                debug!("audio context resumed");
                true
            }
            Err(err) => {
                warn!(%err, "failed to resume audio context");
                false
            }
        }
    }

    pub fn create_oscillator(&self, frequency: f32) -> OscNode {
        OscNode::sine(frequency)
    }

    pub fn create_lowpass(&self, cutoff_hz: f32, q: f32) -> FilterNode {
        FilterNode::lowpass(cutoff_hz, q)
    }

    pub fn create_gain(&self, timeline: ParamTimeline) -> GainNode {
        GainNode::new(timeline)
    }

    /// Pull `out.len()` mono samples from an offline context.
    pub fn render(&mut self, out: &mut [f32]) -> Result<(), AudioError> {
        match &mut self.backend {
            Backend::Offline(renderer) => {
                renderer.render(out);
                Ok(())
            }
            Backend::Device(_) => Err(AudioError::NotOffline),
        }
    }

    /// Chains the renderer is still producing; only observable offline.
    pub fn rendering_voices(&self) -> Option<usize> {
        match &self.backend {
            Backend::Offline(renderer) => Some(renderer.voice_count()),
            Backend::Device(_) => None,
        }
    }

    pub(crate) fn command_slots(&self) -> usize {
        self.commands.slots()
    }

    /// Whether another chain fits in the renderer's preallocated voice slots.
    pub(crate) fn has_voice_room(&self) -> bool {
        self.live_chains < self.voice_capacity
    }

    pub(crate) fn send(&mut self, command: Command) -> Result<(), AudioError> {
        let starts = matches!(command, Command::Start(_));
        if starts && !self.has_voice_room() {
            return Err(AudioError::VoiceLimit(self.voice_capacity));
        }

        self.commands
            .push(command)
            .map_err(|_| AudioError::QueueFull)?;
        if starts {
            self.live_chains += 1;
        }
        Ok(())
    }

    pub(crate) fn next_event(&mut self) -> Option<Event> {
        let event = self.events.pop().ok()?;
        match &event {
            Event::Ended(_) => self.live_chains = self.live_chains.saturating_sub(1),
        }
        Some(event)
    }
}

fn wire(
    sample_rate: f32,
    config: &OutputConfig,
) -> (Arc<Clock>, Producer<Command>, Consumer<Event>, Renderer) {
    let clock = Arc::new(Clock::new(sample_rate));
    let (command_tx, command_rx) = RingBuffer::new(config.command_capacity);
    let (event_tx, event_rx) = RingBuffer::new(config.event_capacity);
    let renderer = Renderer::new(clock.clone(), command_rx, event_tx, config.voice_capacity);

    (clock, command_tx, event_rx, renderer)
}

enum OutputState {
    Uninitialized,
    Ready(AudioContext),
    Unavailable,
}

/// Lazily-created, session-wide audio output.
pub struct AudioOutput {
    config: OutputConfig,
    state: OutputState,
}

impl AudioOutput {
    pub fn new(config: OutputConfig) -> Self {
        Self {
            config,
            state: OutputState::Uninitialized,
        }
    }

    /// Bring the output up, or resume it if it is already up.
    ///
    /// Safe to call from every site that is about to make sound. A failed
    /// bring-up is returned once; afterwards this returns
    /// [`AudioError::Unavailable`] without trying again.
    pub fn initialize(&mut self) -> Result<(), AudioError> {
        if let OutputState::Ready(ctx) = &mut self.state {
            ctx.resume_if_suspended();
            return Ok(());
        }
        if matches!(self.state, OutputState::Unavailable) {
            return Err(AudioError::Unavailable);
        }

        match AudioContext::open(&self.config) {
            Ok(mut ctx) => {
                if let Err(err) = ctx.resume() {
                    warn!(%err, "audio context created suspended and could not be resumed");
                }
                self.state = OutputState::Ready(ctx);
                Ok(())
            }
            Err(err) => {
                error!(%err, "audio output unavailable; continuing without sound");
                self.state = OutputState::Unavailable;
                Err(err)
            }
        }
    }

    pub fn is_initialized(&self) -> bool {
        matches!(self.state, OutputState::Ready(_))
    }

    pub fn status(&self) -> OutputStatus {
        match &self.state {
            OutputState::Uninitialized => OutputStatus::Uninitialized,
            OutputState::Unavailable => OutputStatus::Unavailable,
            OutputState::Ready(ctx) => match ctx.state() {
                ContextState::Suspended => OutputStatus::Suspended,
                ContextState::Running => OutputStatus::Running,
            },
        }
    }

    pub fn config(&self) -> &OutputConfig {
        &self.config
    }

    pub fn context(&self) -> Option<&AudioContext> {
        match &self.state {
            OutputState::Ready(ctx) => Some(ctx),
            _ => None,
        }
    }

    pub fn context_mut(&mut self) -> Option<&mut AudioContext> {
        match &mut self.state {
            OutputState::Ready(ctx) => Some(ctx),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn offline_config() -> OutputConfig {
        OutputConfig {
            backend: OutputBackend::Offline {
                sample_rate: 1_000.0,
            },
            ..OutputConfig::default()
        }
    }

    #[test]
    fn nothing_is_opened_before_initialize() {
        let output = AudioOutput::new(offline_config());
        assert!(!output.is_initialized());
        assert_eq!(output.status(), OutputStatus::Uninitialized);
        assert!(output.context().is_none());
    }

    #[test]
    fn initialize_is_idempotent_and_resumes() {
        let mut output = AudioOutput::new(offline_config());
        output.initialize().expect("offline output always opens");
        assert_eq!(output.status(), OutputStatus::Running);

        output.context_mut().unwrap().suspend().unwrap();
        assert_eq!(output.status(), OutputStatus::Suspended);

        output.initialize().unwrap();
        assert_eq!(output.status(), OutputStatus::Running);
    }

    #[test]
    fn suspended_context_holds_its_clock() {
        let mut ctx = AudioContext::open(&offline_config()).unwrap();
        assert_eq!(ctx.state(), ContextState::Suspended);

        let mut buffer = vec![1.0f32; 500];
        ctx.render(&mut buffer).unwrap();
        assert_eq!(ctx.now(), 0.0);
        assert!(buffer.iter().all(|&s| s == 0.0));

        assert!(ctx.resume_if_suspended());
        assert!(!ctx.resume_if_suspended());
        ctx.render(&mut buffer).unwrap();
        assert!((ctx.now() - 0.5).abs() < 1e-12);
    }

    #[test]
    fn offline_context_reports_its_format() {
        let ctx = AudioContext::open(&offline_config()).unwrap();
        assert_eq!(ctx.sample_rate(), 1_000.0);
        assert_eq!(ctx.channels(), 1);
        assert_eq!(ctx.rendering_voices(), Some(0));
    }

    #[test]
    fn missing_device_leaves_output_silent_for_good() {
        let mut output = AudioOutput::new(OutputConfig {
            backend: OutputBackend::Device {
                name: Some("no such output device \u{1F3B5}".to_string()),
            },
            ..OutputConfig::default()
        });

        assert!(output.initialize().is_err());
        assert_eq!(output.status(), OutputStatus::Unavailable);
        assert!(matches!(output.initialize(), Err(AudioError::Unavailable)));
        assert!(output.context_mut().is_none());
    }
}
