use std::collections::HashMap;

use crate::synth::voice::{Voice, VoiceId};

/// Sounding voices keyed by note name; at most one per name.
#[derive(Debug, Default)]
pub struct VoiceRegistry {
    voices: HashMap<String, Voice>,
}

impl VoiceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a voice under its note name.
    ///
    /// The slot must already be free: a retrigger removes the old voice first.
    pub fn insert(&mut self, voice: Voice) {
        let previous = self.voices.insert(voice.note().name.clone(), voice);
        debug_assert!(previous.is_none(), "voice registered over a live voice");
    }

    pub fn remove(&mut self, name: &str) -> Option<Voice> {
        self.voices.remove(name)
    }

    /// Remove the entry for `name` only if it is still the voice `id`.
    pub fn remove_if_owned(&mut self, name: &str, id: VoiceId) -> Option<Voice> {
        if self.voices.get(name).is_some_and(|voice| voice.id() == id) {
            self.voices.remove(name)
        } else {
            None
        }
    }

    pub fn get(&self, name: &str) -> Option<&Voice> {
        self.voices.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.voices.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.voices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.voices.is_empty()
    }

    pub fn notes(&self) -> impl Iterator<Item = &str> {
        self.voices.keys().map(String::as_str)
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Voice> {
        self.voices.values_mut()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dsp::ParamTimeline;
    use crate::synth::note::Note;

    fn voice(id: u64, name: &str) -> Voice {
        Voice::new(
            VoiceId::new(id),
            Note::new(name, 440.0),
            ParamTimeline::new(1.0),
            1.0,
            None,
        )
    }

    #[test]
    fn removal_requires_matching_instance() {
        let mut registry = VoiceRegistry::new();
        registry.insert(voice(1, "A4"));

        // a retrigger swaps the entry for a newer instance
        assert!(registry.remove("A4").is_some());
        registry.insert(voice(2, "A4"));

        assert!(registry.remove_if_owned("A4", VoiceId::new(1)).is_none());
        assert!(registry.contains("A4"));

        let removed = registry.remove_if_owned("A4", VoiceId::new(2));
        assert_eq!(removed.map(|v| v.id()), Some(VoiceId::new(2)));
        assert!(registry.is_empty());
    }

    #[test]
    fn lists_sounding_notes() {
        let mut registry = VoiceRegistry::new();
        registry.insert(voice(1, "A4"));
        registry.insert(voice(2, "C5"));

        let mut notes: Vec<_> = registry.notes().collect();
        notes.sort_unstable();
        assert_eq!(notes, ["A4", "C5"]);
        assert_eq!(registry.len(), 2);
    }
}
