use crate::{
    config::EngineConfig,
    dsp::oscillator::{Oscillator, OscillatorBlock},
    engine::snapshot::{BlockSnapshot, SnapshotReader},
    LAYERS_PER_VOICE,
};

/// Fixed-block renderer. Runs in the audio callback.
///
/// Every voice slot owns a pair of oscillators that run continuously whether
/// or not the slot is bound; a free slot is muted by amplitude only. This
/// keeps phase continuous when a slot is stolen or handed back.
///
/// Parameters from the control task are applied once at the top of each
/// block. The render path never blocks or allocates.
pub struct Renderer<O: Oscillator = OscillatorBlock> {
    voices: Vec<[O; LAYERS_PER_VOICE]>,
    reader: SnapshotReader,
    block_size: usize,
}

impl Renderer<OscillatorBlock> {
    pub fn new(config: &EngineConfig, reader: SnapshotReader) -> Self {
        let voices = (0..config.num_voices)
            .map(|_| std::array::from_fn(|_| OscillatorBlock::new(config.sample_rate)))
            .collect();
        Self::with_oscillators(voices, reader, config.block_size)
    }
}

impl<O: Oscillator> Renderer<O> {
    pub fn with_oscillators(
        voices: Vec<[O; LAYERS_PER_VOICE]>,
        reader: SnapshotReader,
        block_size: usize,
    ) -> Self {
        Self {
            voices,
            reader,
            block_size: block_size.max(1),
        }
    }

    pub fn num_voices(&self) -> usize {
        self.voices.len()
    }

    pub fn block_size(&self) -> usize {
        self.block_size
    }

    /// Snapshot applied at the most recent block.
    pub fn snapshot(&self) -> &BlockSnapshot {
        self.reader.current()
    }

    pub fn oscillators(&self) -> &[[O; LAYERS_PER_VOICE]] {
        &self.voices
    }

    /// Pull the newest snapshot and push its parameters into the oscillators.
    fn apply_snapshot(&mut self) {
        let snapshot = *self.reader.latest();

        for (pair, params) in self.voices.iter_mut().zip(snapshot.voices()) {
            for (osc, layer) in pair.iter_mut().zip(&snapshot.layers) {
                osc.set_waveform(layer.waveform);
                osc.set_pulse_width(layer.pulse_width);
                osc.set_amplitude(params.amplitude * layer.amplitude);

                // Free slots keep their last pitch so the phase ramp is undisturbed
                if params.is_active() {
                    osc.set_frequency(params.frequency * layer.detune_ratio);
                }
            }
        }
    }

    /// Render one block into both channels.
    ///
    /// The mix of all `2 * N` oscillator layers is divided by `2 * N`, so the
    /// output stays within ±1 whenever every layer does.
    pub fn render_block(&mut self, left: &mut [f32], right: &mut [f32]) {
        self.apply_snapshot();

        let layers = (self.voices.len() * LAYERS_PER_VOICE) as f32;
        for (l, r) in left.iter_mut().zip(right.iter_mut()) {
            let mut mix = 0.0f32;
            for pair in &mut self.voices {
                for osc in pair.iter_mut() {
                    mix += osc.process();
                }
            }

            let sample = if layers > 0.0 { mix / layers } else { 0.0 };
            *l = sample;
            *r = sample;
        }
    }

    /// Render any number of frames as consecutive fixed-size blocks.
    ///
    /// A trailing partial block is rendered short; its parameters still come
    /// from a fresh snapshot.
    pub fn render(&mut self, left: &mut [f32], right: &mut [f32]) {
        let block = self.block_size;
        for (l, r) in left.chunks_mut(block).zip(right.chunks_mut(block)) {
            self.render_block(l, r);
        }
    }

    /// Render into an interleaved buffer with `channels` channels.
    ///
    /// Channels 0 and 1 get the mix; any further channels get silence.
    /// `scratch` must hold at least `2 * block_size` samples.
    pub fn render_interleaved(&mut self, data: &mut [f32], channels: usize, scratch: &mut [f32]) {
        let channels = channels.max(1);
        let block = self.block_size.min(scratch.len() / 2);
        if block == 0 {
            data.fill(0.0);
            return;
        }

        let (left, right) = scratch.split_at_mut(block);
        let right = &mut right[..block];
        for frames in data.chunks_mut(block * channels) {
            let n = frames.len() / channels;
            self.render_block(&mut left[..n], &mut right[..n]);

            for (i, frame) in frames.chunks_mut(channels).enumerate() {
                for (ch, out) in frame.iter_mut().enumerate() {
                    *out = match ch {
                        0 => left[i],
                        1 => right[i],
                        _ => 0.0,
                    };
                }
            }
        }
    }
}
