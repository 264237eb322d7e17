use crate::{
    dsp::oscillator::OscillatorWaveform,
    engine::snapshot::{BlockSnapshot, LayerParams, VoiceParams},
    io::{
        converter::{cents_to_ratio, midi_note_to_freq, note_to_freq},
        AnalogSource,
    },
    synth::{
        allocator::Allocator,
        quantizer::{QuantizerSettings, ScaleMode},
        source::SourceId,
    },
    LAYERS_PER_VOICE,
};

/// Analog channel assignments. Each oscillator layer has its own
/// amplitude, pulse width and detune pot; indices are per layer.
pub mod channels {
    use crate::LAYERS_PER_VOICE;

    pub const AMPLITUDE: [usize; LAYERS_PER_VOICE] = [0, 3];
    pub const PULSE_WIDTH: [usize; LAYERS_PER_VOICE] = [1, 4];
    pub const DETUNE: [usize; LAYERS_PER_VOICE] = [2, 5];
    pub const PITCH: usize = 6;
    /// Channels read per poll
    pub const COUNT: usize = 7;
}

/// Largest detune of a layer, either direction.
pub const MAX_DETUNE_CENTS: f32 = 50.0;

/// Button pitches: C major upwards from middle C, one octave per seven buttons.
pub const BUTTON_SCALE: [u8; 7] = [60, 62, 64, 65, 67, 69, 71];

pub fn button_note(index: u8) -> u8 {
    let octave = index / BUTTON_SCALE.len() as u8;
    let degree = BUTTON_SCALE[index as usize % BUTTON_SCALE.len()];
    degree.saturating_add(octave.saturating_mul(12))
}

/// Normalized readings of the shared controls for one block.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ControlValues {
    pub amplitude: [f32; LAYERS_PER_VOICE],
    pub pulse_width: [f32; LAYERS_PER_VOICE],
    /// 0.5 = no detune
    pub detune: [f32; LAYERS_PER_VOICE],
    pub pitch: f32,
}

impl Default for ControlValues {
    fn default() -> Self {
        Self {
            amplitude: [0.5; LAYERS_PER_VOICE],
            pulse_width: [0.5; LAYERS_PER_VOICE],
            detune: [0.5; LAYERS_PER_VOICE],
            pitch: 0.5,
        }
    }
}

impl ControlValues {
    pub fn read<A: AnalogSource + ?Sized>(source: &mut A) -> Self {
        let mut read = |indices: [usize; LAYERS_PER_VOICE]| {
            indices.map(|channel| source.read_normalized(channel))
        };
        let amplitude = read(channels::AMPLITUDE);
        let pulse_width = read(channels::PULSE_WIDTH);
        let detune = read(channels::DETUNE);

        Self {
            amplitude,
            pulse_width,
            detune,
            pitch: source.read_normalized(channels::PITCH),
        }
    }
}

/// Turns allocation state and control readings into per-voice oscillator
/// parameters. Stateless apart from the quantizer settings.
#[derive(Debug, Clone, Copy, Default)]
pub struct ParameterMapper {
    quantizer: QuantizerSettings,
}

impl ParameterMapper {
    pub fn new(quantizer: QuantizerSettings) -> Self {
        Self { quantizer }
    }

    /// Frequency multiplier of a layer for a detune reading.
    pub fn detune_ratio(reading: f32) -> f32 {
        let cents = (reading.clamp(0.0, 1.0) * 2.0 - 1.0) * MAX_DETUNE_CENTS;
        cents_to_ratio(cents)
    }

    /// Semitones the button table is shifted by.
    ///
    /// With quantization on, button 0 plays the quantized pitch-pot note and
    /// the other buttons keep their interval above it.
    pub fn button_transpose(&self, pitch: f32) -> f32 {
        match self.quantizer.mode {
            ScaleMode::Off => 0.0,
            _ => self.quantizer.note(pitch) - BUTTON_SCALE[0] as f32,
        }
    }

    pub fn source_frequency(&self, source: SourceId, transpose: f32) -> f32 {
        match source {
            SourceId::Button(index) => note_to_freq(button_note(index) as f32 + transpose),
            SourceId::Note(note) => midi_note_to_freq(note),
        }
    }

    /// Build the parameters for the next block.
    ///
    /// Bound slots get unit gain, free slots zero. A free slot's frequency is
    /// left at zero and ignored by the renderer, so its oscillators keep
    /// whatever pitch they last had.
    pub fn map(
        &self,
        allocator: &Allocator,
        controls: &ControlValues,
        waveforms: [OscillatorWaveform; LAYERS_PER_VOICE],
    ) -> BlockSnapshot {
        let mut snapshot = BlockSnapshot::silent(allocator.capacity());
        for (layer, params) in snapshot.layers.iter_mut().enumerate() {
            *params = LayerParams {
                amplitude: controls.amplitude[layer].clamp(0.0, 1.0),
                pulse_width: controls.pulse_width[layer],
                detune_ratio: Self::detune_ratio(controls.detune[layer]),
                waveform: waveforms[layer],
            };
        }

        let transpose = self.button_transpose(controls.pitch);
        for (params, voice) in snapshot.voices.iter_mut().zip(allocator.voices()) {
            *params = match voice.source() {
                Some(source) => VoiceParams {
                    source: Some(source),
                    frequency: self.source_frequency(source, transpose),
                    amplitude: 1.0,
                },
                None => VoiceParams::SILENT,
            };
        }

        snapshot
    }
}
