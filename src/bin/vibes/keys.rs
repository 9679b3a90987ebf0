//! Keyboard layout: 32 bars from F3 to C6.
//!
//! The low octave and a half sits on the bottom letter row (sharps on the
//! home row above it), the rest on the top letter row with sharps on the
//! number keys.

use crossterm::event::KeyCode;
use vibraphone::Note;

pub struct KeyNote {
    pub name: &'static str,
    pub frequency: f32,
    pub sharp: bool,
    pub key: KeyCode,
}

impl KeyNote {
    pub fn note(&self) -> Note {
        Note::new(self.name, self.frequency)
    }

    pub fn label(&self) -> String {
        match self.key {
            KeyCode::Char(c) => c.to_ascii_uppercase().to_string(),
            KeyCode::Enter => "⏎".to_string(),
            _ => "?".to_string(),
        }
    }
}

const fn bar(name: &'static str, frequency: f32, sharp: bool, key: KeyCode) -> KeyNote {
    KeyNote {
        name,
        frequency,
        sharp,
        key,
    }
}

pub const KEYS: &[KeyNote] = &[
    bar("F3", 174.61, false, KeyCode::Char('z')),
    bar("F#3", 185.00, true, KeyCode::Char('s')),
    bar("G3", 196.00, false, KeyCode::Char('x')),
    bar("G#3", 207.65, true, KeyCode::Char('d')),
    bar("A3", 220.00, false, KeyCode::Char('c')),
    bar("A#3", 233.08, true, KeyCode::Char('f')),
    bar("B3", 246.94, false, KeyCode::Char('v')),
    bar("C4", 261.63, false, KeyCode::Char('b')),
    bar("C#4", 277.18, true, KeyCode::Char('h')),
    bar("D4", 293.66, false, KeyCode::Char('n')),
    bar("D#4", 311.13, true, KeyCode::Char('j')),
    bar("E4", 329.63, false, KeyCode::Char('m')),
    bar("F4", 349.23, false, KeyCode::Char(',')),
    bar("F#4", 369.99, true, KeyCode::Char('l')),
    bar("G4", 392.00, false, KeyCode::Char('.')),
    bar("G#4", 415.30, true, KeyCode::Char(';')),
    bar("A4", 440.00, false, KeyCode::Char('/')),
    bar("A#4", 466.16, true, KeyCode::Char('\'')),
    // right shift cannot be seen on its own in a terminal
    bar("B4", 493.88, false, KeyCode::Enter),
    bar("C5", 523.25, false, KeyCode::Char('q')),
    bar("C#5", 554.37, true, KeyCode::Char('2')),
    bar("D5", 587.33, false, KeyCode::Char('w')),
    bar("D#5", 622.25, true, KeyCode::Char('3')),
    bar("E5", 659.25, false, KeyCode::Char('e')),
    bar("F5", 698.46, false, KeyCode::Char('r')),
    bar("F#5", 739.99, true, KeyCode::Char('5')),
    bar("G5", 783.99, false, KeyCode::Char('t')),
    bar("G#5", 830.61, true, KeyCode::Char('6')),
    bar("A5", 880.00, false, KeyCode::Char('y')),
    bar("A#5", 932.33, true, KeyCode::Char('7')),
    bar("B5", 987.77, false, KeyCode::Char('u')),
    bar("C6", 1046.50, false, KeyCode::Char('i')),
];

pub fn lookup(code: KeyCode) -> Option<&'static KeyNote> {
    let code = match code {
        KeyCode::Char(c) => KeyCode::Char(c.to_ascii_lowercase()),
        other => other,
    };
    KEYS.iter().find(|key| key.key == code)
}
