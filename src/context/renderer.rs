//! Render side of the audio context.
//!
//! The renderer lives wherever samples are produced: inside the cpal output
//! callback, or inside an offline context that the caller pulls from. It owns
//! every live signal chain; the control side only talks to it through the
//! command ring and hears back through the event ring.
//!
//! Per callback:
//!
//! 1. Drain queued commands (new chains, gain edits, stop times).
//! 2. Render each chain into scratch and sum into the mono mix.
//! 3. Move chains whose oscillator ended out of the live set.
//! 4. Advance the clock.
//! 5. Hand finished chains back; if the event ring is full they wait for the
//!    next callback so nothing is dropped on this thread.
//!
//! The control side never has more than `voice_capacity` chains out at once,
//! counting those waiting to be handed back, so neither chain list grows past
//! the capacity reserved here.

use std::sync::Arc;

use rtrb::{Consumer, Producer, PushError};

use crate::{
    context::clock::Clock,
    graph::{GraphNode, RenderCtx, SignalChain},
    synth::{
        message::{Command, Event},
        voice::VoiceId,
    },
    MAX_BLOCK_SIZE,
};

pub struct Renderer {
    clock: Arc<Clock>,
    commands: Consumer<Command>,
    events: Producer<Event>,
    chains: Vec<Box<SignalChain>>,
    finished: Vec<Box<SignalChain>>,
    scratch: Vec<f32>,
    mix: Vec<f32>,
}

impl Renderer {
    pub(crate) fn new(
        clock: Arc<Clock>,
        commands: Consumer<Command>,
        events: Producer<Event>,
        voice_capacity: usize,
    ) -> Self {
        Self {
            clock,
            commands,
            events,
            chains: Vec::with_capacity(voice_capacity),
            finished: Vec::with_capacity(voice_capacity),
            scratch: vec![0.0; MAX_BLOCK_SIZE],
            mix: vec![0.0; MAX_BLOCK_SIZE],
        }
    }

    /// Chains currently producing sound.
    pub fn voice_count(&self) -> usize {
        self.chains.len()
    }

    /// Render a mono buffer. Silence, with the clock held, while suspended.
    pub fn render(&mut self, out: &mut [f32]) {
        if !self.clock.is_running() {
            out.fill(0.0);
            return;
        }

        self.drain_commands();
        for block in out.chunks_mut(MAX_BLOCK_SIZE) {
            self.render_block(block);
        }
        self.hand_back();
    }

    /// Render into an interleaved device buffer, copying the mono mix to
    /// every channel.
    pub fn render_interleaved(&mut self, data: &mut [f32], channels: usize) {
        let channels = channels.max(1);
        if !self.clock.is_running() {
            data.fill(0.0);
            return;
        }

        self.drain_commands();

        let total_frames = data.len() / channels;
        let mut frames_written = 0;
        let mut mix = std::mem::take(&mut self.mix);

        while frames_written < total_frames {
            let frames_to_render = (total_frames - frames_written).min(MAX_BLOCK_SIZE);
            let block = &mut mix[..frames_to_render];
            self.render_block(block);

            let out_off = frames_written * channels;
            for (i, &s) in block.iter().enumerate() {
                let frame = out_off + i * channels;
                data[frame..frame + channels].fill(s);
            }

            frames_written += frames_to_render;
        }

        // trailing samples that do not form a whole frame
        data[total_frames * channels..].fill(0.0);

        self.mix = mix;
        self.hand_back();
    }

    fn drain_commands(&mut self) {
        while let Ok(command) = self.commands.pop() {
            match command {
                Command::Start(chain) => self.chains.push(chain),
                Command::Automate { voice, op } => {
                    // edits were validated when the control side applied them to its mirror
                    if let Some(chain) = self.find(voice) {
                        let _ = chain.automate_gain(op);
                    }
                }
                Command::Stop { voice, time } => {
                    // a chain that already ended is gone from the live set: nothing to stop
                    if let Some(chain) = self.find(voice) {
                        chain.stop(time);
                    }
                }
            }
        }
    }

    fn render_block(&mut self, out: &mut [f32]) {
        let frames = out.len();
        let ctx = RenderCtx::at(self.clock.sample_rate(), self.clock.now());
        out.fill(0.0);

        let mut i = 0;
        while i < self.chains.len() {
            let scratch = &mut self.scratch[..frames];
            self.chains[i].render_block(scratch, &ctx);
            for (o, s) in out.iter_mut().zip(scratch.iter()) {
                *o += s;
            }

            if !self.chains[i].is_active() {
                let chain = self.chains.swap_remove(i);
                self.finished.push(chain);
            } else {
                i += 1;
            }
        }

        self.clock.advance(frames);
    }

    fn hand_back(&mut self) {
        while let Some(chain) = self.finished.pop() {
            let pushed = self.events.push(Event::Ended(chain));
            if let Err(PushError::Full(Event::Ended(chain))) = pushed {
                self.finished.push(chain);
                break;
            }
        }
    }

    fn find(&mut self, voice: VoiceId) -> Option<&mut SignalChain> {
        self.chains
            .iter_mut()
            .find(|chain| chain.id() == voice)
            .map(|chain| chain.as_mut())
    }
}
