//! Event loop: keyboard in, notes out.

use std::{cell::RefCell, collections::HashSet, rc::Rc, time::Duration};

use color_eyre::eyre::Result;
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use ratatui::DefaultTerminal;
use tracing::{info, warn};
use vibraphone::{AudioError, VoiceEngine};

use crate::{
    keys::{self, KeyNote},
    ui::{self, View},
};

/// Bars currently drawn as struck. Shared with each voice's `on_ended`.
pub type LitKeys = Rc<RefCell<HashSet<&'static str>>>;

pub struct App {
    engine: VoiceEngine,
    lit: LitKeys,
    sustain: bool,
    notice: Option<String>,
    should_quit: bool,
}

pub fn run(engine: VoiceEngine) -> Result<()> {
    let mut app = App::new(engine);
    let mut terminal = ratatui::init();
    let result = app.run(&mut terminal);
    ratatui::restore();
    result
}

impl App {
    fn new(engine: VoiceEngine) -> Self {
        Self {
            engine,
            lit: LitKeys::default(),
            sustain: false,
            notice: None,
            should_quit: false,
        }
    }

    fn run(&mut self, terminal: &mut DefaultTerminal) -> Result<()> {
        while !self.should_quit {
            self.engine.poll();

            terminal.draw(|frame| {
                let lit = self.lit.borrow();
                ui::draw(
                    frame,
                    &View {
                        keys: keys::KEYS,
                        lit: &lit,
                        sustain: self.sustain,
                        voices: self.engine.voice_count(),
                        status: self.engine.output().status(),
                        format: self
                            .engine
                            .output()
                            .context()
                            .map(|ctx| (ctx.sample_rate(), ctx.channels())),
                        notice: self.notice.as_deref(),
                    },
                )
            })?;

            // ~60fps
            if event::poll(Duration::from_millis(16))? {
                if let Event::Key(key) = event::read()? {
                    self.handle_key(key);
                }
            }
        }

        Ok(())
    }

    fn handle_key(&mut self, key: KeyEvent) {
        if key.kind != KeyEventKind::Press {
            return;
        }

        match key.code {
            KeyCode::Esc => self.should_quit = true,
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.should_quit = true
            }
            KeyCode::Char(' ') => self.toggle_sustain(),
            code => {
                if let Some(key) = keys::lookup(code) {
                    self.strike(key);
                }
            }
        }
    }

    fn toggle_sustain(&mut self) {
        self.sustain = !self.sustain;
        info!(sustain = self.sustain, "sustain pedal");

        if !self.sustain {
            self.engine.release_all();
            self.lit.borrow_mut().clear();
        }
    }

    fn strike(&mut self, key: &'static KeyNote) {
        // Held keys auto-repeat; a lit bar is not struck again from the keyboard
        if self.lit.borrow().contains(key.name) {
            return;
        }

        self.ensure_audio();
        if !self.engine.is_initialized() {
            return;
        }

        let lit = Rc::clone(&self.lit);
        let name = key.name;
        self.engine.note_on(
            &key.note(),
            self.sustain,
            Some(Box::new(move || {
                lit.borrow_mut().remove(name);
            })),
        );

        // Light only after note_on: the poll inside it may deliver the end of
        // this bar's previous (faded) voice, whose callback clears the name.
        if self.engine.is_sounding(name) {
            self.lit.borrow_mut().insert(name);
        }
    }

    /// Audio comes up on the first keypress and is resumed on every one after.
    fn ensure_audio(&mut self) {
        match self.engine.initialize() {
            Ok(()) => {}
            // already reported
            Err(AudioError::Unavailable) => {}
            Err(err) => {
                warn!(%err, "audio output could not be opened");
                self.notice = Some(format!("no audio: {err}"));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vibraphone::EngineConfig;

    fn app() -> App {
        App::new(VoiceEngine::new(EngineConfig::offline(1_000.0)).unwrap())
    }

    fn render(app: &mut App, seconds: f64) {
        let mut buffer = vec![0.0f32; (seconds * 1_000.0) as usize];
        app.engine.render(&mut buffer).unwrap();
    }

    #[test]
    fn strike_lights_key_until_voice_ends() {
        let mut app = app();
        let a4 = keys::lookup(KeyCode::Char('/')).unwrap();

        app.strike(a4);
        assert!(app.lit.borrow().contains("A4"));

        render(&mut app, 1.0);
        app.engine.poll();
        assert!(app.lit.borrow().is_empty());
    }

    #[test]
    fn restrike_after_sustain_lift_stays_lit() {
        let mut app = app();
        let a4 = keys::lookup(KeyCode::Char('/')).unwrap();

        app.toggle_sustain();
        app.strike(a4);
        app.toggle_sustain();
        assert!(app.lit.borrow().is_empty());

        // the released voice ends but its report is still queued
        render(&mut app, 0.5);
        app.strike(a4);

        assert!(app.lit.borrow().contains("A4"));
        assert!(app.engine.is_sounding("A4"));
    }
}
