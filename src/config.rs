//! Engine configuration.
//!
//! Everything here is decided once at startup, before the control and render
//! tasks are split. Nothing in the allocation core reads a config at runtime.

use std::time::Duration;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{
    synth::quantizer::{QuantizerSettings, ScaleMode},
    LAYERS_PER_VOICE, MAX_BLOCK_SIZE, MAX_BUTTONS, MAX_VOICES,
};

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("sample rate must be positive, got {0}")]
    InvalidSampleRate(f32),
    #[error("block size must be within 1..={max}, got {got}")]
    InvalidBlockSize { got: usize, max: usize },
    #[error("at most {max} voices are supported, got {got}")]
    TooManyVoices { got: usize, max: usize },
    #[error("at most {max} buttons are supported, got {got}")]
    TooManyButtons { got: usize, max: usize },
    #[error("waveform button {index} is outside the {num_buttons} configured buttons")]
    WaveformButtonOutOfRange { index: usize, num_buttons: usize },
    #[error("button {index} cycles the waveform of more than one layer")]
    SharedWaveformButton { index: usize },
    #[error("quantizer root must be a pitch class 0..=11, got {0}")]
    InvalidRoot(u8),
    #[error("snapshot queue needs room for at least one block")]
    EmptySnapshotQueue,
}

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct EngineConfig {
    /// Audio sample rate in Hz
    pub sample_rate: f32,
    /// Frames rendered per block. Parameters are applied once per block.
    pub block_size: usize,
    /// Voice pool capacity. Zero is legal: every press is dropped.
    pub num_voices: usize,
    /// Physical buttons acting as note sources (or waveform buttons).
    pub num_buttons: usize,
    /// Delay between control loop iterations
    pub poll_interval: Duration,
    /// Per oscillator layer, the button that cycles that layer's waveform
    /// instead of sounding a note.
    pub waveform_buttons: [Option<usize>; LAYERS_PER_VOICE],
    /// Pitch-pot quantization applied to the button pitch table.
    pub quantizer: QuantizerSettings,
    /// Capacity of the control → render snapshot ring.
    pub snapshot_queue: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            sample_rate: 48_000.0,
            block_size: 4,
            num_voices: 4,
            num_buttons: 4,
            poll_interval: Duration::from_millis(10),
            waveform_buttons: [None; LAYERS_PER_VOICE],
            quantizer: QuantizerSettings::default(),
            snapshot_queue: 8,
        }
    }
}

impl EngineConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sample_rate(mut self, sample_rate: f32) -> Self {
        self.sample_rate = sample_rate;
        self
    }

    pub fn block_size(mut self, block_size: usize) -> Self {
        self.block_size = block_size;
        self
    }

    pub fn voices(mut self, num_voices: usize) -> Self {
        self.num_voices = num_voices;
        self
    }

    pub fn buttons(mut self, num_buttons: usize) -> Self {
        self.num_buttons = num_buttons;
        self
    }

    pub fn poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    /// Dedicate button `index` to cycling the waveform of `layer`.
    /// Layers past the last one are ignored.
    pub fn waveform_button(mut self, layer: usize, index: usize) -> Self {
        if let Some(slot) = self.waveform_buttons.get_mut(layer) {
            *slot = Some(index);
        }
        self
    }

    /// Layer whose waveform button is `index`, if any.
    pub fn waveform_layer(&self, index: usize) -> Option<usize> {
        self.waveform_buttons
            .iter()
            .position(|button| *button == Some(index))
    }

    pub fn quantizer(mut self, mode: ScaleMode, root: u8) -> Self {
        self.quantizer = QuantizerSettings { mode, root };
        self
    }

    pub fn snapshot_queue(mut self, capacity: usize) -> Self {
        self.snapshot_queue = capacity;
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.sample_rate > 0.0) {
            return Err(ConfigError::InvalidSampleRate(self.sample_rate));
        }
        if self.block_size == 0 || self.block_size > MAX_BLOCK_SIZE {
            return Err(ConfigError::InvalidBlockSize {
                got: self.block_size,
                max: MAX_BLOCK_SIZE,
            });
        }
        if self.num_voices > MAX_VOICES {
            return Err(ConfigError::TooManyVoices {
                got: self.num_voices,
                max: MAX_VOICES,
            });
        }
        if self.num_buttons > MAX_BUTTONS {
            return Err(ConfigError::TooManyButtons {
                got: self.num_buttons,
                max: MAX_BUTTONS,
            });
        }
        for (layer, button) in self.waveform_buttons.iter().enumerate() {
            let Some(index) = *button else { continue };
            if index >= self.num_buttons {
                return Err(ConfigError::WaveformButtonOutOfRange {
                    index,
                    num_buttons: self.num_buttons,
                });
            }
            if self.waveform_buttons[..layer].contains(button) {
                return Err(ConfigError::SharedWaveformButton { index });
            }
        }
        if self.quantizer.root > 11 {
            return Err(ConfigError::InvalidRoot(self.quantizer.root));
        }
        if self.snapshot_queue == 0 {
            return Err(ConfigError::EmptySnapshotQueue);
        }
        Ok(())
    }
}
