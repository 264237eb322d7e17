//! Voicepool - application builder and runner

use std::thread;

use color_eyre::eyre::{eyre, Result as EyreResult, WrapErr};
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use log::{error, info};
use rtrb::RingBuffer;
use voicepool::{
    engine::{self, BlockSnapshot},
    synth::{message::NoteMessage, quantizer::ScaleMode},
    EngineConfig,
};

use super::input::{KeyboardNotes, SharedButtons, SharedPots};
use super::ui::{PanelInfo, UiApp};

/// Note events buffered between the UI thread and the control thread
const NOTE_QUEUE: usize = 256;
/// Snapshots buffered for display; the UI only ever shows the newest
const UI_QUEUE: usize = 64;

/// Main application builder
pub struct Voicepool {
    config: EngineConfig,
}

impl Voicepool {
    pub fn new() -> Self {
        Self {
            config: EngineConfig::default(),
        }
    }

    pub fn voices(mut self, num_voices: usize) -> Self {
        self.config = self.config.voices(num_voices);
        self
    }

    pub fn buttons(mut self, num_buttons: usize) -> Self {
        self.config = self.config.buttons(num_buttons);
        self
    }

    pub fn waveform_button(mut self, layer: usize, index: usize) -> Self {
        self.config = self.config.waveform_button(layer, index);
        self
    }

    pub fn quantizer(mut self, mode: ScaleMode, root: u8) -> Self {
        self.config = self.config.quantizer(mode, root);
        self
    }

    /// Open the default output device, start the control thread and hand the
    /// terminal to the UI until it quits.
    pub fn run(self) -> EyreResult<()> {
        let host = cpal::default_host();
        let device = host
            .default_output_device()
            .ok_or_else(|| eyre!("no default output device available"))?;
        let stream_config = device
            .default_output_config()
            .wrap_err("failed to fetch default output config")?;

        let sample_rate = stream_config.sample_rate().0 as f32;
        let channels = stream_config.channels() as usize;
        let config = self.config.sample_rate(sample_rate);
        info!("output: {sample_rate} Hz, {channels} channels");

        let buttons = SharedButtons::new();
        let pots = SharedPots::new(0.5);
        let (note_tx, note_rx) = RingBuffer::<NoteMessage>::new(NOTE_QUEUE);

        let (control, mut renderer) =
            engine::build(&config, pots.clone(), buttons.clone(), note_rx)
                .wrap_err("invalid engine configuration")?;

        // Control thread: sole owner of the allocator
        let (mut ui_tx, ui_rx) = RingBuffer::<BlockSnapshot>::new(UI_QUEUE);
        thread::Builder::new()
            .name("control".into())
            .spawn(move || {
                control.run_with(|snapshot| {
                    // UI falling behind is harmless; it catches up on the next push
                    let _ = ui_tx.push(*snapshot);
                })
            })
            .wrap_err("failed to spawn control thread")?;

        // Audio thread: owns the renderer and a scratch buffer sized once here
        let mut scratch = vec![0.0f32; 2 * config.block_size];
        let stream = device.build_output_stream(
            &stream_config.into(),
            move |data: &mut [f32], _| {
                renderer.render_interleaved(data, channels, &mut scratch);
            },
            |err| error!("audio stream error: {err}"),
            None,
        )?;
        stream.play()?;

        let info = PanelInfo {
            sample_rate,
            num_buttons: config.num_buttons,
            waveform_buttons: config.waveform_buttons,
            quantizer: config.quantizer,
        };
        let initial = BlockSnapshot::silent(config.num_voices);
        let mut app = UiApp::new(ui_rx, initial, info, buttons, pots, KeyboardNotes::new(note_tx));

        let mut terminal = ratatui::init();
        let result = app.run(&mut terminal);
        ratatui::restore();

        drop(stream);
        result
    }
}

impl Default for Voicepool {
    fn default() -> Self {
        Self::new()
    }
}
