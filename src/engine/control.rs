use std::{thread, time::Duration};

use log::{debug, info, warn};

use crate::{
    config::EngineConfig,
    dsp::oscillator::OscillatorWaveform,
    engine::snapshot::{BlockSnapshot, SnapshotPublisher},
    io::{AnalogSource, DigitalSource},
    synth::{
        allocator::Allocator,
        mapper::{ControlValues, ParameterMapper},
        message::{MessageReceiver, NoteMessage},
        source::SourceId,
    },
    LAYERS_PER_VOICE, MAX_BUTTONS,
};

/// The cooperative polling loop: sole writer of allocation state.
///
/// Each [`poll`](Self::poll) samples every button, applies the detected edges
/// in ascending button order, then applies queued note events in arrival
/// order, then reads the pots and publishes one snapshot for the renderer.
/// Stealing and restitution depend on the state at call time, so this order
/// is fixed.
pub struct ControlLoop<A, D, M> {
    allocator: Allocator,
    mapper: ParameterMapper,
    analog: A,
    digital: D,
    notes: M,
    publisher: SnapshotPublisher,

    last_buttons: [bool; MAX_BUTTONS],
    waveform_buttons: [Option<usize>; LAYERS_PER_VOICE],
    waveforms: [OscillatorWaveform; LAYERS_PER_VOICE],
    controls: ControlValues,
    snapshot: BlockSnapshot,
    interval: Duration,
}

impl<A, D, M> ControlLoop<A, D, M>
where
    A: AnalogSource,
    D: DigitalSource,
    M: MessageReceiver,
{
    /// Build from an already validated config.
    pub fn new(
        config: &EngineConfig,
        analog: A,
        digital: D,
        notes: M,
        publisher: SnapshotPublisher,
    ) -> Self {
        let num_buttons = config.num_buttons.min(MAX_BUTTONS);
        info!(
            "control loop: {} voices, {} buttons, polling every {:?}",
            config.num_voices, num_buttons, config.poll_interval
        );

        Self {
            allocator: Allocator::new(config.num_voices, num_buttons),
            mapper: ParameterMapper::new(config.quantizer),
            analog,
            digital,
            notes,
            publisher,
            last_buttons: [false; MAX_BUTTONS],
            waveform_buttons: config.waveform_buttons,
            waveforms: [OscillatorWaveform::default(); LAYERS_PER_VOICE],
            controls: ControlValues::default(),
            snapshot: BlockSnapshot::silent(config.num_voices),
            interval: config.poll_interval,
        }
    }

    /// Run one control iteration and return the snapshot it published.
    pub fn poll(&mut self) -> &BlockSnapshot {
        self.scan_buttons();
        self.drain_notes();

        self.controls = ControlValues::read(&mut self.analog);
        let sequence = self.snapshot.sequence + 1;
        self.snapshot = self.mapper.map(&self.allocator, &self.controls, self.waveforms);
        self.snapshot.sequence = sequence;

        if !self.publisher.publish(self.snapshot) {
            warn!(
                "snapshot {} dropped, renderer is behind ({} dropped so far)",
                sequence,
                self.publisher.dropped()
            );
        }

        &self.snapshot
    }

    /// Poll forever at the configured interval.
    pub fn run(self) -> ! {
        self.run_with(|_| {})
    }

    /// Poll forever, handing each published snapshot to `observe`.
    pub fn run_with(mut self, mut observe: impl FnMut(&BlockSnapshot)) -> ! {
        loop {
            observe(self.poll());
            thread::sleep(self.interval);
        }
    }

    fn scan_buttons(&mut self) {
        let num_buttons = self.allocator.num_buttons();

        // Sample everything first so edges reflect one instant
        let mut current = [false; MAX_BUTTONS];
        for (index, pressed) in current.iter_mut().enumerate().take(num_buttons) {
            *pressed = self.digital.read_button(index);
        }

        for index in 0..num_buttons {
            let (was, now) = (self.last_buttons[index], current[index]);
            if was == now {
                continue;
            }

            let layer = self.waveform_buttons.iter().position(|b| *b == Some(index));
            if let Some(layer) = layer {
                if now {
                    let waveform = &mut self.waveforms[layer];
                    *waveform = waveform.next();
                    debug!("layer {layer} waveform -> {waveform:?}");
                }
                continue;
            }

            let id = SourceId::Button(index as u8);
            if now {
                self.allocator.on_press(id);
            } else {
                self.allocator.on_release(id);
            }
        }

        self.last_buttons = current;
    }

    fn drain_notes(&mut self) {
        while let Some(message) = self.notes.pop() {
            match message.normalized() {
                NoteMessage::NoteOn { note, .. } => {
                    self.allocator.on_press(SourceId::Note(note));
                }
                NoteMessage::NoteOff { note } => {
                    self.allocator.on_release(SourceId::Note(note));
                }
                NoteMessage::AllNotesOff => {
                    debug!("all notes off, buttons keep their state");
                    self.allocator.release_notes();
                }
            }
        }
    }

    pub fn allocator(&self) -> &Allocator {
        &self.allocator
    }

    pub fn waveforms(&self) -> [OscillatorWaveform; LAYERS_PER_VOICE] {
        self.waveforms
    }

    pub fn controls(&self) -> &ControlValues {
        &self.controls
    }

    pub fn snapshot(&self) -> &BlockSnapshot {
        &self.snapshot
    }

    pub fn analog_mut(&mut self) -> &mut A {
        &mut self.analog
    }

    pub fn digital_mut(&mut self) -> &mut D {
        &mut self.digital
    }

    pub fn notes_mut(&mut self) -> &mut M {
        &mut self.notes
    }
}
