//! Panel inputs shared between the UI thread and the control thread
//!
//! The UI writes, the control loop reads. Both sides are plain atomics so
//! neither thread ever waits on the other.

use std::sync::{
    atomic::{AtomicBool, AtomicU32, Ordering},
    Arc,
};

use log::warn;
use rtrb::Producer;
use voicepool::{
    io::{
        converter::midi_to_note,
        midi::{MidiEvent, ALL_NOTES_OFF},
        AnalogSource, DigitalSource,
    },
    synth::{mapper::channels, message::NoteMessage},
    MAX_BUTTONS, NOTE_COUNT,
};

pub const POT_COUNT: usize = channels::COUNT;

/// Display names, indexed by analog channel
pub const POT_NAMES: [&str; POT_COUNT] = [
    "osc 1 level",
    "osc 1 width",
    "osc 1 detune",
    "osc 2 level",
    "osc 2 width",
    "osc 2 detune",
    "pitch",
];

/// MIDI channel the computer keyboard plays on
const KEYBOARD_CHANNEL: u8 = 0;

/// Latching buttons. A terminal only reports key presses, so each press
/// toggles the button instead of holding it.
#[derive(Clone)]
pub struct SharedButtons(Arc<[AtomicBool; MAX_BUTTONS]>);

impl SharedButtons {
    pub fn new() -> Self {
        Self(Arc::new(std::array::from_fn(|_| AtomicBool::new(false))))
    }

    /// Flip button `index`, returning its new state.
    pub fn toggle(&self, index: usize) -> bool {
        match self.0.get(index) {
            Some(button) => !button.fetch_xor(true, Ordering::Relaxed),
            None => false,
        }
    }

    pub fn set(&self, index: usize, pressed: bool) {
        if let Some(button) = self.0.get(index) {
            button.store(pressed, Ordering::Relaxed);
        }
    }

    pub fn is_pressed(&self, index: usize) -> bool {
        self.0
            .get(index)
            .is_some_and(|button| button.load(Ordering::Relaxed))
    }
}

impl DigitalSource for SharedButtons {
    fn read_button(&mut self, index: usize) -> bool {
        self.is_pressed(index)
    }
}

/// Pot positions stored as `f32` bit patterns.
#[derive(Clone)]
pub struct SharedPots(Arc<[AtomicU32; POT_COUNT]>);

impl SharedPots {
    pub fn new(initial: f32) -> Self {
        Self(Arc::new(std::array::from_fn(|_| {
            AtomicU32::new(initial.to_bits())
        })))
    }

    pub fn get(&self, channel: usize) -> f32 {
        self.0
            .get(channel)
            .map_or(0.0, |pot| f32::from_bits(pot.load(Ordering::Relaxed)))
    }

    /// Turn a pot by `delta`, clamped to its travel.
    pub fn nudge(&self, channel: usize, delta: f32) {
        if let Some(pot) = self.0.get(channel) {
            let value = (self.get(channel) + delta).clamp(0.0, 1.0);
            pot.store(value.to_bits(), Ordering::Relaxed);
        }
    }
}

impl AnalogSource for SharedPots {
    fn read_normalized(&mut self, channel: usize) -> f32 {
        self.get(channel)
    }
}

/// The computer keyboard as a note-event source.
///
/// Keys latch like the buttons do. Events are built as MIDI, filtered to the
/// keyboard channel, and queued for the control loop.
pub struct KeyboardNotes {
    tx: Producer<NoteMessage>,
    held: [bool; NOTE_COUNT],
    base: u8,
}

impl KeyboardNotes {
    pub fn new(tx: Producer<NoteMessage>) -> Self {
        Self {
            tx,
            held: [false; NOTE_COUNT],
            base: 60,
        }
    }

    /// Lowest note of the playable octave.
    pub fn base(&self) -> u8 {
        self.base
    }

    pub fn is_held(&self, note: u8) -> bool {
        self.held.get(note as usize).copied().unwrap_or(false)
    }

    /// Shift the playable range by whole octaves. Held notes keep sounding.
    pub fn shift_octave(&mut self, octaves: i8) {
        let base = self.base as i16 + octaves as i16 * 12;
        if (0..=(NOTE_COUNT as i16 - 13)).contains(&base) {
            self.base = base as u8;
        }
    }

    /// Toggle the note `semitone` steps above the base.
    pub fn toggle(&mut self, semitone: u8) {
        let key = self.base.saturating_add(semitone);
        let Some(held) = self.held.get_mut(key as usize) else {
            return;
        };
        *held = !*held;

        let event = if *held {
            MidiEvent::NoteOn {
                channel: KEYBOARD_CHANNEL,
                key,
                velocity: 100,
            }
        } else {
            MidiEvent::NoteOff {
                channel: KEYBOARD_CHANNEL,
                key,
                velocity: 0,
            }
        };
        self.send(event);
    }

    /// Release every note, including ones the UI lost track of.
    pub fn all_off(&mut self) {
        self.held = [false; NOTE_COUNT];
        self.send(MidiEvent::ControlChange {
            channel: KEYBOARD_CHANNEL,
            controller: ALL_NOTES_OFF,
            value: 0,
        });
    }

    fn send(&mut self, event: MidiEvent) {
        if let Some(message) = midi_to_note(event, KEYBOARD_CHANNEL) {
            if self.tx.push(message).is_err() {
                warn!("note queue full, dropped {message:?}");
            }
        }
    }
}
