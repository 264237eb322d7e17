use crate::{
    io::midi::{MidiEvent, ALL_NOTES_OFF},
    synth::message::NoteMessage,
};

/// Keep note on/off events from one channel, dropping everything else.
pub fn midi_to_note(midi: MidiEvent, channel_filter: u8) -> Option<NoteMessage> {
    if midi.channel() != channel_filter {
        return None;
    }

    match midi {
        MidiEvent::NoteOn { key, velocity, .. } => Some(
            NoteMessage::NoteOn {
                note: key,
                velocity,
            }
            .normalized(),
        ),
        MidiEvent::NoteOff { key, .. } => Some(NoteMessage::NoteOff { note: key }),
        MidiEvent::ControlChange {
            controller: ALL_NOTES_OFF,
            ..
        } => Some(NoteMessage::AllNotesOff),
        _ => None,
    }
}

pub fn midi_note_to_freq(note: u8) -> f32 {
    note_to_freq(note as f32)
}

/// 12-TET frequency of a (possibly fractional) note number, A4 = 440 Hz.
pub fn note_to_freq(note: f32) -> f32 {
    440.0 * 2.0_f32.powf((note - 69.0) / 12.0)
}

/// Frequency multiplier for a detune in cents.
pub fn cents_to_ratio(cents: f32) -> f32 {
    2.0_f32.powf(cents / 1200.0)
}
