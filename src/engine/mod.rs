//! Control and render tasks.
//!
//! [`build`] validates a config and returns the two halves: a [`ControlLoop`]
//! for the cooperative polling context and a [`Renderer`] for the audio
//! callback. They share nothing but the snapshot ring.
//!
//! [`Engine`] keeps both halves on one thread and interleaves them (one poll,
//! then one block), which is what offline rendering, tests and benches want.

pub mod control;
pub mod render;
pub mod snapshot;

use log::info;

use crate::{
    config::{ConfigError, EngineConfig},
    io::{AnalogSource, DigitalSource},
    synth::message::MessageReceiver,
};

pub use self::{
    control::ControlLoop,
    render::Renderer,
    snapshot::{snapshot_channel, BlockSnapshot, LayerParams, VoiceParams},
};

/// Validate `config` and create a connected control loop and renderer.
pub fn build<A, D, M>(
    config: &EngineConfig,
    analog: A,
    digital: D,
    notes: M,
) -> Result<(ControlLoop<A, D, M>, Renderer), ConfigError>
where
    A: AnalogSource,
    D: DigitalSource,
    M: MessageReceiver,
{
    config.validate()?;
    info!(
        "engine: {} Hz, {}-frame blocks, {} voices",
        config.sample_rate, config.block_size, config.num_voices
    );

    let (publisher, reader) =
        snapshot_channel(config.snapshot_queue, BlockSnapshot::silent(config.num_voices));
    let control = ControlLoop::new(config, analog, digital, notes, publisher);
    let renderer = Renderer::new(config, reader);
    Ok((control, renderer))
}

/// Single-threaded pairing of the control loop and renderer.
pub struct Engine<A, D, M> {
    control: ControlLoop<A, D, M>,
    renderer: Renderer,
}

impl<A, D, M> Engine<A, D, M>
where
    A: AnalogSource,
    D: DigitalSource,
    M: MessageReceiver,
{
    pub fn new(config: &EngineConfig, analog: A, digital: D, notes: M) -> Result<Self, ConfigError> {
        let (control, renderer) = build(config, analog, digital, notes)?;
        Ok(Self { control, renderer })
    }

    /// Poll the controls once, then render one block.
    pub fn process_block(&mut self, left: &mut [f32], right: &mut [f32]) {
        self.control.poll();
        self.renderer.render_block(left, right);
    }

    /// Render any number of frames, polling before every block.
    pub fn render_into(&mut self, left: &mut [f32], right: &mut [f32]) {
        let block = self.renderer.block_size();
        for (l, r) in left.chunks_mut(block).zip(right.chunks_mut(block)) {
            self.process_block(l, r);
        }
    }

    pub fn control(&self) -> &ControlLoop<A, D, M> {
        &self.control
    }

    pub fn control_mut(&mut self) -> &mut ControlLoop<A, D, M> {
        &mut self.control
    }

    pub fn renderer(&self) -> &Renderer {
        &self.renderer
    }

    pub fn into_parts(self) -> (ControlLoop<A, D, M>, Renderer) {
        (self.control, self.renderer)
    }
}
