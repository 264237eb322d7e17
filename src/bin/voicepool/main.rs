//! voicepool - terminal front end for the voice allocator
//!
//! Run with: cargo run --bin voicepool
//!
//! Number keys latch the buttons, the home row plays notes, and the arrow
//! keys move the pots. Log output goes to stderr; set `RUST_LOG=debug` and
//! redirect it to a file to watch allocation decisions.

mod app;
mod input;
mod ui;

use app::Voicepool;
use voicepool::synth::quantizer::ScaleMode;

fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    // Four note buttons plus one waveform button per oscillator layer
    Voicepool::new()
        .voices(4)
        .buttons(6)
        .waveform_button(0, 4)
        .waveform_button(1, 5)
        .quantizer(ScaleMode::Major, 0)
        .run()
}
