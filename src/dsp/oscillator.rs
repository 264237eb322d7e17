use std::f32::consts::TAU;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OscillatorWaveform {
    Sine,
    Square,
    Saw,
    #[default]
    Triangle,
}

impl OscillatorWaveform {
    /// Waveform selected by the next press of the waveform button.
    ///
    /// The button cycles square → saw → triangle. Sine is only reachable
    /// programmatically and steps into the cycle at square.
    pub fn next(self) -> Self {
        match self {
            OscillatorWaveform::Square => OscillatorWaveform::Saw,
            OscillatorWaveform::Saw => OscillatorWaveform::Triangle,
            OscillatorWaveform::Triangle | OscillatorWaveform::Sine => OscillatorWaveform::Square,
        }
    }
}

/// The oscillator capability set the render loop drives.
///
/// Implementations keep their phase across calls regardless of amplitude, so
/// a voice slot muted at zero gain resumes without a discontinuity.
pub trait Oscillator: Send {
    fn set_frequency(&mut self, hz: f32);

    fn set_amplitude(&mut self, gain: f32);

    fn set_pulse_width(&mut self, duty: f32);

    fn set_waveform(&mut self, _waveform: OscillatorWaveform) {
        // Default: single-waveform oscillator
    }

    /// Produce one sample and advance the phase.
    fn process(&mut self) -> f32;
}

/// Band-limited oscillator using polyBLEP correction on the square and saw
/// discontinuities.
pub struct OscillatorBlock {
    inv_sample_rate: f32,
    waveform: OscillatorWaveform,
    phase: f32,
    phase_inc: f32,
    amplitude: f32,
    pulse_width: f32,
}

impl OscillatorBlock {
    pub fn new(sample_rate: f32) -> Self {
        Self {
            inv_sample_rate: sample_rate.recip(),
            waveform: OscillatorWaveform::default(),
            phase: 0.0,
            phase_inc: 0.0,
            amplitude: 0.0,
            pulse_width: 0.5,
        }
    }

    pub fn with_waveform(mut self, waveform: OscillatorWaveform) -> Self {
        self.waveform = waveform;
        self
    }

    pub fn phase(&self) -> f32 {
        self.phase
    }

    pub fn waveform(&self) -> OscillatorWaveform {
        self.waveform
    }

    /// Correction for a unit step at phase 0, `dt` = phase increment.
    #[inline]
    fn poly_blep(t: f32, dt: f32) -> f32 {
        if t < dt {
            let t = t / dt;
            2.0 * t - t * t - 1.0
        } else if t > 1.0 - dt {
            let t = (t - 1.0) / dt;
            t * t + 2.0 * t + 1.0
        } else {
            0.0
        }
    }

    #[inline]
    fn naive_sample(&self) -> f32 {
        let t = self.phase;
        let dt = self.phase_inc;
        match self.waveform {
            OscillatorWaveform::Sine => (TAU * t).sin(),
            OscillatorWaveform::Saw => {
                let s = 2.0 * t - 1.0;
                if dt > 0.0 {
                    s - Self::poly_blep(t, dt)
                } else {
                    s
                }
            }
            OscillatorWaveform::Square => {
                let pw = self.pulse_width;
                let mut s = if t < pw { 1.0 } else { -1.0 };
                if dt > 0.0 {
                    s += Self::poly_blep(t, dt);
                    s -= Self::poly_blep((t + 1.0 - pw) % 1.0, dt);
                }
                s
            }
            OscillatorWaveform::Triangle => {
                if t < 0.5 {
                    4.0 * t - 1.0
                } else {
                    3.0 - 4.0 * t
                }
            }
        }
    }
}

impl Oscillator for OscillatorBlock {
    fn set_frequency(&mut self, hz: f32) {
        // Stay below Nyquist so the blep window never exceeds a period
        let nyquist = 0.5 / self.inv_sample_rate;
        self.phase_inc = hz.clamp(0.0, nyquist * 0.999) * self.inv_sample_rate;
    }

    fn set_amplitude(&mut self, gain: f32) {
        self.amplitude = gain.max(0.0);
    }

    fn set_pulse_width(&mut self, duty: f32) {
        self.pulse_width = duty.clamp(0.01, 0.99);
    }

    fn set_waveform(&mut self, waveform: OscillatorWaveform) {
        self.waveform = waveform;
    }

    #[inline]
    fn process(&mut self) -> f32 {
        let sample = self.naive_sample() * self.amplitude;

        self.phase += self.phase_inc;
        if self.phase >= 1.0 {
            self.phase -= 1.0;
        }

        sample
    }
}
