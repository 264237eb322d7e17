// Purpose - contracts for the hardware collaborators, note-event conversions

pub mod converter;
pub mod midi;

/// Potentiometers and other continuous inputs.
pub trait AnalogSource {
    /// Reading of `channel` in [0, 1]. Unknown channels read 0.
    fn read_normalized(&mut self, channel: usize) -> f32;
}

/// Buttons, already debounced and normalized so pressed = `true`.
pub trait DigitalSource {
    fn read_button(&mut self, index: usize) -> bool;
}

/// Fixed readings, mainly for offline rendering and tests.
impl AnalogSource for [f32] {
    fn read_normalized(&mut self, channel: usize) -> f32 {
        self.get(channel).copied().unwrap_or(0.0).clamp(0.0, 1.0)
    }
}

impl<const N: usize> AnalogSource for [f32; N] {
    fn read_normalized(&mut self, channel: usize) -> f32 {
        self.as_mut_slice().read_normalized(channel)
    }
}

impl DigitalSource for [bool] {
    fn read_button(&mut self, index: usize) -> bool {
        self.get(index).copied().unwrap_or(false)
    }
}

impl<const N: usize> DigitalSource for [bool; N] {
    fn read_button(&mut self, index: usize) -> bool {
        self.as_mut_slice().read_button(index)
    }
}
