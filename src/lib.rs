pub mod config;
pub mod dsp; // Oscillator collaborator
pub mod engine; // Control loop, render loop, snapshot handoff
pub mod io; // Hardware-facing collaborator contracts
pub mod synth; // Note sources, voice pool, allocation policy

pub use config::{ConfigError, EngineConfig};
pub use engine::Engine;
pub use synth::allocator::Allocator;
pub use synth::source::SourceId;

pub const MAX_BLOCK_SIZE: usize = 2048;
/// Upper bound on the voice pool. Snapshots are fixed-size arrays of this length.
pub const MAX_VOICES: usize = 16;
pub const MAX_BUTTONS: usize = 16;
/// Size of the note-event id space (MIDI note numbers).
pub const NOTE_COUNT: usize = 128;
/// Oscillator layers per voice: the fundamental plus one detuned copy.
pub const LAYERS_PER_VOICE: usize = 2;
