//! Low-level DSP primitives driven by the render loop.
//!
//! These components are allocation-free and realtime-safe. They keep their
//! phase across parameter changes so voice reassignment never resets them.

/// Oscillator capability trait and the band-limited implementation.
pub mod oscillator;

pub use oscillator::{Oscillator, OscillatorBlock, OscillatorWaveform};
