#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::{synth::pool::VoiceId, NOTE_COUNT};

/// Origin of a note: a physical button or an incoming note-event number.
///
/// The two domains have separate id spaces, so `Button(3)` and `Note(3)` are
/// different sources.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SourceId {
    Button(u8),
    Note(u8),
}

/// Per-source hold state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NoteSource {
    held: bool,
    bound_voice: Option<VoiceId>,
    /// Press counter value at the most recent rising edge (0 = never pressed)
    timestamp: u64,
}

impl NoteSource {
    pub fn is_held(&self) -> bool {
        self.held
    }

    pub fn bound_voice(&self) -> Option<VoiceId> {
        self.bound_voice
    }

    pub fn timestamp(&self) -> u64 {
        self.timestamp
    }

    /// Held but without a voice (its voice was stolen).
    pub fn is_waiting(&self) -> bool {
        self.held && self.bound_voice.is_none()
    }
}

/// Hold state and press ordering for every note source.
///
/// Preallocated for `num_buttons` buttons plus the full 128-note event range.
/// Ids outside those ranges are ignored by every method rather than reported.
pub struct SourceRegistry {
    buttons: Vec<NoteSource>,
    notes: Vec<NoteSource>,
    press_counter: u64,
}

impl SourceRegistry {
    pub fn new(num_buttons: usize) -> Self {
        Self {
            buttons: vec![NoteSource::default(); num_buttons],
            notes: vec![NoteSource::default(); NOTE_COUNT],
            press_counter: 0,
        }
    }

    pub fn num_buttons(&self) -> usize {
        self.buttons.len()
    }

    pub fn contains(&self, id: SourceId) -> bool {
        self.get(id).is_some()
    }

    pub fn get(&self, id: SourceId) -> Option<&NoteSource> {
        match id {
            SourceId::Button(index) => self.buttons.get(index as usize),
            SourceId::Note(note) => self.notes.get(note as usize),
        }
    }

    fn get_mut(&mut self, id: SourceId) -> Option<&mut NoteSource> {
        match id {
            SourceId::Button(index) => self.buttons.get_mut(index as usize),
            SourceId::Note(note) => self.notes.get_mut(note as usize),
        }
    }

    /// Rising edge: mark held and stamp with a fresh press counter value.
    ///
    /// Re-stamps even when the source is already held. Returns `false` when
    /// the id is out of range and nothing changed.
    pub fn mark_held(&mut self, id: SourceId) -> bool {
        let Some(stamp) = self.press_counter.checked_add(1) else {
            return false;
        };
        match self.get_mut(id) {
            Some(source) => {
                source.held = true;
                source.timestamp = stamp;
                self.press_counter = stamp;
                true
            }
            None => false,
        }
    }

    /// Falling edge: clears `held` only. The voice binding is left alone.
    pub fn mark_released(&mut self, id: SourceId) -> bool {
        match self.get_mut(id) {
            Some(source) => {
                source.held = false;
                true
            }
            None => false,
        }
    }

    pub fn is_held(&self, id: SourceId) -> bool {
        self.get(id).is_some_and(NoteSource::is_held)
    }

    pub fn timestamp(&self, id: SourceId) -> Option<u64> {
        self.get(id).map(NoteSource::timestamp)
    }

    pub fn bound_voice(&self, id: SourceId) -> Option<VoiceId> {
        self.get(id).and_then(NoteSource::bound_voice)
    }

    pub(crate) fn set_bound_voice(&mut self, id: SourceId, voice: Option<VoiceId>) {
        if let Some(source) = self.get_mut(id) {
            source.bound_voice = voice;
        }
    }

    /// Last value handed out by the press counter.
    pub fn press_counter(&self) -> u64 {
        self.press_counter
    }

    /// Every source, buttons first in index order, then notes.
    pub fn iter(&self) -> impl Iterator<Item = (SourceId, &NoteSource)> + '_ {
        let buttons = self
            .buttons
            .iter()
            .enumerate()
            .map(|(i, s)| (SourceId::Button(i as u8), s));
        let notes = self
            .notes
            .iter()
            .enumerate()
            .map(|(i, s)| (SourceId::Note(i as u8), s));
        buttons.chain(notes)
    }

    /// The held, voiceless source with the smallest timestamp.
    pub fn oldest_waiting(&self) -> Option<SourceId> {
        self.iter()
            .filter(|(_, s)| s.is_waiting())
            .min_by_key(|(_, s)| s.timestamp)
            .map(|(id, _)| id)
    }
}
