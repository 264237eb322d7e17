/*
Pitch Quantizer
===============

Turns a normalized pot reading into a pitch that sits on a scale.

  value   0.0 ──────────────────────────────── 1.0
  note    24 (C1) ─────────────────────────── 108 (C8)

The reading is first stretched linearly across the note range. What happens
next depends on the mode:

  Off        keep the fractional note (continuous glide)
  Chromatic  round to the nearest semitone
  Major      snap to the nearest degree of the major scale on `root`
  Minor      snap to the nearest degree of the natural minor scale on `root`

Scale snapping works inside one octave. The note is split into an octave and
a residual in [0, 12). Each degree offset is transposed by the root (mod 12)
and compared against the residual three times: as-is, one octave up and one
octave down, so a residual of 11.8 can land on the next octave's tonic. The
closest candidate wins; ties go to the earlier degree.

The result is a note number, converted to Hz with 12-TET around A4 = 440 Hz.
*/

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::io::converter::note_to_freq;

pub const MIN_NOTE: f32 = 24.0;
pub const MAX_NOTE: f32 = 108.0;

const MAJOR_DEGREES: [i32; 7] = [0, 2, 4, 5, 7, 9, 11];
const MINOR_DEGREES: [i32; 7] = [0, 2, 3, 5, 7, 8, 10];

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ScaleMode {
    #[default]
    Off,
    Chromatic,
    Major,
    Minor,
}

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct QuantizerSettings {
    pub mode: ScaleMode,
    /// Pitch class of the scale tonic, 0 = C
    pub root: u8,
}

impl QuantizerSettings {
    pub fn note(&self, value: f32) -> f32 {
        quantize_note(value, self.root, self.mode)
    }

    pub fn frequency(&self, value: f32) -> f32 {
        quantize(value, self.root, self.mode)
    }
}

/// Quantize a normalized reading to a (possibly fractional) note number.
pub fn quantize_note(value: f32, root: u8, mode: ScaleMode) -> f32 {
    let value = value.clamp(0.0, 1.0);
    let note = MIN_NOTE + value * (MAX_NOTE - MIN_NOTE);

    match mode {
        ScaleMode::Off => note,
        ScaleMode::Chromatic => note.round(),
        ScaleMode::Major => snap_to_scale(note, root, &MAJOR_DEGREES),
        ScaleMode::Minor => snap_to_scale(note, root, &MINOR_DEGREES),
    }
}

/// Quantize a normalized reading and return its frequency in Hz.
pub fn quantize(value: f32, root: u8, mode: ScaleMode) -> f32 {
    note_to_freq(quantize_note(value, root, mode))
}

fn snap_to_scale(note: f32, root: u8, degrees: &[i32; 7]) -> f32 {
    let octave = (note / 12.0).floor();
    let residual = note - octave * 12.0;
    let root = (root % 12) as i32;

    let mut best = 0.0f32;
    let mut best_distance = f32::INFINITY;
    for &degree in degrees {
        let offset = ((degree + root) % 12) as f32;
        for candidate in [offset, offset + 12.0, offset - 12.0] {
            let distance = (residual - candidate).abs();
            if distance < best_distance {
                best_distance = distance;
                best = candidate;
            }
        }
    }

    octave * 12.0 + best
}
