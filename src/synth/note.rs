/*
Notes
=====

A note is a name plus a fundamental frequency. The name is the voice's
identity: at most one voice per name sounds at any time, so striking "A4"
again replaces the A4 that is still ringing.

Names use scientific pitch notation, which `Note::parse` understands:

  letter     C D E F G A B (case-insensitive)
  accidental optional '#' (sharp) or 'b' (flat)
  octave     integer, C4 = middle C, octave -1 allowed

Frequencies are twelve-tone equal temperament around A4 = 440 Hz:

  midi = 12 * (octave + 1) + semitone
  freq = 440 * 2 ^ ((midi - 69) / 12)
*/

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum NoteError {
    #[error("note name is empty")]
    Empty,

    #[error("'{0}' does not start with a note letter A-G")]
    InvalidLetter(String),

    #[error("'{0}' has no valid octave number")]
    InvalidOctave(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Note {
    pub name: String,
    pub frequency: f32,
}

impl Note {
    pub fn new(name: impl Into<String>, frequency: f32) -> Self {
        Self {
            name: name.into(),
            frequency,
        }
    }

    /// Parse a scientific pitch name such as `"C#4"` or `"Bb3"`.
    pub fn parse(name: &str) -> Result<Self, NoteError> {
        let midi = midi_number(name)?;
        Ok(Self::new(name, midi_to_freq(midi)))
    }
}

impl FromStr for Note {
    type Err = NoteError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Note::parse(s)
    }
}

impl fmt::Display for Note {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({:.2} Hz)", self.name, self.frequency)
    }
}

fn midi_number(name: &str) -> Result<i32, NoteError> {
    let mut chars = name.chars();
    let letter = chars.next().ok_or(NoteError::Empty)?;

    let semitone = match letter.to_ascii_uppercase() {
        'C' => 0,
        'D' => 2,
        'E' => 4,
        'F' => 5,
        'G' => 7,
        'A' => 9,
        'B' => 11,
        _ => return Err(NoteError::InvalidLetter(name.to_string())),
    };

    let rest = chars.as_str();
    let (accidental, octave) = match rest.chars().next() {
        Some('#') => (1, &rest[1..]),
        Some('b') => (-1, &rest[1..]),
        _ => (0, rest),
    };

    let octave: i32 = octave
        .parse()
        .map_err(|_| NoteError::InvalidOctave(name.to_string()))?;

    Ok(12 * (octave + 1) + semitone + accidental)
}

/// A4 = 440 Hz = MIDI note 69
#[inline]
fn midi_to_freq(note: i32) -> f32 {
    440.0 * 2.0_f32.powf((note as f32 - 69.0) / 12.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_freq(name: &str, expected: f32) {
        let note = Note::parse(name).unwrap();
        assert!(
            (note.frequency - expected).abs() < 0.01,
            "{name}: expected {expected}, got {}",
            note.frequency
        );
        assert_eq!(note.name, name);
    }

    #[test]
    fn a440_is_concert_pitch() {
        assert_freq("A4", 440.0);
    }

    #[test]
    fn vibraphone_range() {
        assert_freq("F3", 174.61);
        assert_freq("C4", 261.63);
        assert_freq("C6", 1046.50);
    }

    #[test]
    fn sharps_and_flats_are_equal() {
        let sharp = Note::parse("C#5").unwrap();
        let flat = Note::parse("Db5").unwrap();
        assert!((sharp.frequency - flat.frequency).abs() < 1e-3);
        assert!((sharp.frequency - 554.37).abs() < 0.01);
    }

    #[test]
    fn octaves_double() {
        let low = Note::parse("G3").unwrap();
        let high = Note::parse("G4").unwrap();
        assert!((high.frequency / low.frequency - 2.0).abs() < 1e-4);
    }

    #[test]
    fn rejects_bad_names() {
        assert_eq!(Note::parse(""), Err(NoteError::Empty));
        assert!(matches!(Note::parse("H4"), Err(NoteError::InvalidLetter(_))));
        assert!(matches!(Note::parse("C#"), Err(NoteError::InvalidOctave(_))));
        assert!(matches!("Ax".parse::<Note>(), Err(NoteError::InvalidOctave(_))));
    }
}
