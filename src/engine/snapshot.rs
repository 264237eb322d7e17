//! Control → render handoff.
//!
//! The control task is the only writer of allocation state. Once per poll it
//! maps that state into a [`BlockSnapshot`] and pushes it through a wait-free
//! SPSC ring. The renderer drains the ring at the start of each block and keeps
//! only the newest snapshot, so it never blocks, never allocates, and never
//! sees a half-written voice table.

use rtrb::{Consumer, Producer, PushError, RingBuffer};

use crate::{
    dsp::oscillator::OscillatorWaveform, synth::source::SourceId, LAYERS_PER_VOICE, MAX_VOICES,
};

/// Parameters for one voice slot. `amplitude` is the voice gain; each layer
/// scales it by its own level and runs at `frequency * detune_ratio`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VoiceParams {
    pub source: Option<SourceId>,
    pub frequency: f32,
    pub amplitude: f32,
}

impl VoiceParams {
    pub const SILENT: Self = Self {
        source: None,
        frequency: 0.0,
        amplitude: 0.0,
    };

    pub fn is_active(&self) -> bool {
        self.source.is_some()
    }
}

/// Per-layer oscillator settings, shared by every voice.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LayerParams {
    pub amplitude: f32,
    pub pulse_width: f32,
    pub detune_ratio: f32,
    pub waveform: OscillatorWaveform,
}

impl Default for LayerParams {
    /// Full level, square duty, no detune.
    fn default() -> Self {
        Self {
            amplitude: 1.0,
            pulse_width: 0.5,
            detune_ratio: 1.0,
            waveform: OscillatorWaveform::default(),
        }
    }
}

/// Everything the renderer needs for one block. `Copy`, fixed-size.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BlockSnapshot {
    pub voices: [VoiceParams; MAX_VOICES],
    /// Slots in use; entries past this are always silent
    pub num_voices: usize,
    pub layers: [LayerParams; LAYERS_PER_VOICE],
    /// Control iteration that produced this snapshot
    pub sequence: u64,
}

impl BlockSnapshot {
    pub fn silent(num_voices: usize) -> Self {
        Self {
            voices: [VoiceParams::SILENT; MAX_VOICES],
            num_voices: num_voices.min(MAX_VOICES),
            layers: [LayerParams::default(); LAYERS_PER_VOICE],
            sequence: 0,
        }
    }

    pub fn voices(&self) -> &[VoiceParams] {
        &self.voices[..self.num_voices]
    }

    pub fn active_count(&self) -> usize {
        self.voices().iter().filter(|v| v.is_active()).count()
    }
}

/// Create a handoff ring with room for `capacity` unread snapshots.
pub fn snapshot_channel(
    capacity: usize,
    initial: BlockSnapshot,
) -> (SnapshotPublisher, SnapshotReader) {
    let (tx, rx) = RingBuffer::new(capacity.max(1));
    (
        SnapshotPublisher { tx, dropped: 0 },
        SnapshotReader {
            rx,
            current: initial,
        },
    )
}

/// Control-side end of the handoff.
pub struct SnapshotPublisher {
    tx: Producer<BlockSnapshot>,
    dropped: u64,
}

impl SnapshotPublisher {
    /// Queue a snapshot. Returns `false` if the ring is full.
    ///
    /// A full ring means the renderer has not run since several polls; the
    /// snapshot is dropped and the next poll supersedes it.
    pub fn publish(&mut self, snapshot: BlockSnapshot) -> bool {
        match self.tx.push(snapshot) {
            Ok(()) => true,
            Err(PushError::Full(_)) => {
                self.dropped += 1;
                false
            }
        }
    }

    /// Snapshots rejected because the ring was full.
    pub fn dropped(&self) -> u64 {
        self.dropped
    }
}

/// Render-side end of the handoff.
pub struct SnapshotReader {
    rx: Consumer<BlockSnapshot>,
    current: BlockSnapshot,
}

impl SnapshotReader {
    /// Drain the ring and return the newest snapshot seen so far.
    #[inline]
    pub fn latest(&mut self) -> &BlockSnapshot {
        while let Ok(snapshot) = self.rx.pop() {
            self.current = snapshot;
        }
        &self.current
    }

    /// Newest snapshot without draining.
    pub fn current(&self) -> &BlockSnapshot {
        &self.current
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reader_keeps_newest() {
        let (mut tx, mut rx) = snapshot_channel(4, BlockSnapshot::silent(2));
        assert_eq!(rx.latest().sequence, 0);

        for sequence in 1..=3 {
            let mut snap = BlockSnapshot::silent(2);
            snap.sequence = sequence;
            assert!(tx.publish(snap));
        }
        assert_eq!(rx.latest().sequence, 3);
        // Nothing new: same snapshot again
        assert_eq!(rx.latest().sequence, 3);
    }

    #[test]
    fn full_ring_drops_and_counts() {
        let (mut tx, mut rx) = snapshot_channel(1, BlockSnapshot::silent(1));
        assert!(tx.publish(BlockSnapshot::silent(1)));
        assert!(!tx.publish(BlockSnapshot::silent(1)));
        assert_eq!(tx.dropped(), 1);

        rx.latest();
        assert!(tx.publish(BlockSnapshot::silent(1)));
    }

    #[test]
    fn voices_view_is_trimmed() {
        let snap = BlockSnapshot::silent(3);
        assert_eq!(snap.voices().len(), 3);
        assert_eq!(snap.active_count(), 0);
        assert_eq!(BlockSnapshot::silent(MAX_VOICES + 4).num_voices, MAX_VOICES);
    }

    #[test]
    fn silent_layers_are_neutral() {
        let snap = BlockSnapshot::silent(1);
        for layer in snap.layers {
            assert_eq!(layer.amplitude, 1.0);
            assert_eq!(layer.detune_ratio, 1.0);
            assert_eq!(layer.waveform, OscillatorWaveform::Triangle);
        }
    }
}
