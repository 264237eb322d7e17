use std::collections::VecDeque;

use voicepool::{
    dsp::{Oscillator, OscillatorWaveform},
    engine::{snapshot_channel, BlockSnapshot, Renderer, VoiceParams},
    synth::{
        mapper::{button_note, channels},
        message::NoteMessage,
        quantizer::ScaleMode,
    },
    Engine, EngineConfig, SourceId,
};

type TestEngine = Engine<[f32; channels::COUNT], [bool; 6], VecDeque<NoteMessage>>;

fn engine(config: EngineConfig) -> TestEngine {
    let pots = [0.5; channels::COUNT];
    Engine::new(&config, pots, [false; 6], VecDeque::new()).expect("valid config")
}

fn render(engine: &mut TestEngine, frames: usize) -> (Vec<f32>, Vec<f32>) {
    let mut left = vec![0.0; frames];
    let mut right = vec![0.0; frames];
    engine.render_into(&mut left, &mut right);
    (left, right)
}

#[test]
fn renders_silence_with_nothing_held() {
    let mut engine = engine(EngineConfig::default());
    let (left, right) = render(&mut engine, 256);
    assert!(left.iter().chain(&right).all(|s| *s == 0.0));
}

#[test]
fn held_notes_render_bounded_audio() {
    let mut engine = engine(EngineConfig::default());
    for channel in channels::AMPLITUDE {
        engine.control_mut().analog_mut()[channel] = 1.0;
    }
    engine.control_mut().digital_mut()[..4].fill(true);
    for note in [48, 55, 79] {
        engine
            .control_mut()
            .notes_mut()
            .push_back(NoteMessage::NoteOn { note, velocity: 100 });
    }

    for pass in 0..3 {
        let (left, right) = render(&mut engine, 1024);
        assert!(left.iter().any(|s| s.abs() > 0.0), "pass {pass}");
        assert!(left.iter().all(|s| s.abs() <= 1.0));
        assert_eq!(left, right);
    }
    assert_eq!(engine.renderer().snapshot().active_count(), 4);
}

#[test]
fn release_returns_to_silence() {
    let mut engine = engine(EngineConfig::default().voices(2));
    engine.control_mut().digital_mut()[0] = true;
    let (left, _) = render(&mut engine, 64);
    assert!(left.iter().any(|s| s.abs() > 0.0));

    engine.control_mut().digital_mut()[0] = false;
    let (left, _) = render(&mut engine, 64);
    assert!(left.iter().all(|s| *s == 0.0));
}

#[test]
fn buttons_and_notes_share_the_pool() {
    let mut engine = engine(EngineConfig::default().voices(2));
    engine.control_mut().digital_mut()[0] = true;
    render(&mut engine, 4);
    engine
        .control_mut()
        .notes_mut()
        .push_back(NoteMessage::NoteOn { note: 69, velocity: 64 });
    render(&mut engine, 4);
    engine.control_mut().digital_mut()[1] = true;
    render(&mut engine, 4);

    // Third press stole button 0's voice
    let snap = *engine.renderer().snapshot();
    let sources: Vec<_> = snap.voices().iter().map(|v| v.source).collect();
    assert_eq!(sources, [Some(SourceId::Button(1)), Some(SourceId::Note(69))]);
    assert_eq!(snap.voices()[1].frequency, 440.0);

    // Releasing the note hands its voice back to button 0
    engine
        .control_mut()
        .notes_mut()
        .push_back(NoteMessage::NoteOff { note: 69 });
    render(&mut engine, 4);
    let snap = *engine.renderer().snapshot();
    assert_eq!(snap.voices()[1].source, Some(SourceId::Button(0)));
}

#[test]
fn chromatic_pitch_pot_transposes_buttons_exactly() {
    let config = EngineConfig::default().quantizer(ScaleMode::Chromatic, 0);
    let mut engine = engine(config);

    // Reading for note 69 (A4): (69 - 24) / 84
    engine.control_mut().analog_mut()[channels::PITCH] = 45.0 / 84.0;
    engine.control_mut().digital_mut()[0] = true;
    engine.control_mut().digital_mut()[2] = true;
    render(&mut engine, 4);

    let snap = *engine.renderer().snapshot();
    let freqs: Vec<f32> = snap.voices()[..2].iter().map(|v| v.frequency).collect();
    assert!((freqs[0] - 440.0).abs() < 1e-2, "{freqs:?}");

    // Button 2 keeps its interval above button 0
    let interval = (button_note(2) - button_note(0)) as f32;
    let expected = 440.0 * 2.0_f32.powf(interval / 12.0);
    assert!((freqs[1] - expected).abs() / expected < 1e-4, "{freqs:?}");
}

#[test]
fn waveform_button_reaches_renderer() {
    let config = EngineConfig::default()
        .buttons(6)
        .waveform_button(0, 4)
        .waveform_button(1, 5);
    let mut engine = engine(config);
    engine.control_mut().digital_mut()[5] = true;
    render(&mut engine, 4);

    let snap = *engine.renderer().snapshot();
    assert_eq!(snap.layers[0].waveform, OscillatorWaveform::Triangle);
    assert_eq!(snap.layers[1].waveform, OscillatorWaveform::Square);
    assert_eq!(snap.active_count(), 0);

    engine.control_mut().digital_mut()[4] = true;
    render(&mut engine, 4);
    let snap = *engine.renderer().snapshot();
    assert_eq!(snap.layers[0].waveform, OscillatorWaveform::Square);
    assert_eq!(snap.layers[1].waveform, OscillatorWaveform::Square);
}

#[test]
fn muting_one_layer_halves_full_scale() {
    let mut engine = engine(EngineConfig::default().voices(1));
    engine.control_mut().analog_mut()[channels::AMPLITUDE[0]] = 1.0;
    engine.control_mut().analog_mut()[channels::AMPLITUDE[1]] = 0.0;
    engine.control_mut().digital_mut()[0] = true;
    render(&mut engine, 4);

    let snap = *engine.renderer().snapshot();
    assert_eq!(snap.layers[0].amplitude, 1.0);
    assert_eq!(snap.layers[1].amplitude, 0.0);

    // With the second layer silent the mix never exceeds half scale
    let (left, _) = render(&mut engine, 2048);
    assert!(left.iter().any(|s| s.abs() > 0.0));
    assert!(left.iter().all(|s| s.abs() <= 0.5 + 1e-6));
}

#[test]
fn held_button_keeps_sounding_through_all_notes_off() {
    let mut engine = engine(EngineConfig::default().voices(2));
    engine.control_mut().digital_mut()[0] = true;
    engine
        .control_mut()
        .notes_mut()
        .push_back(NoteMessage::NoteOn { note: 69, velocity: 100 });
    render(&mut engine, 4);
    assert_eq!(engine.renderer().snapshot().active_count(), 2);

    engine.control_mut().notes_mut().push_back(NoteMessage::AllNotesOff);
    for _ in 0..4 {
        let (left, _) = render(&mut engine, 64);
        assert!(left.iter().any(|s| s.abs() > 0.0));
        let snap = *engine.renderer().snapshot();
        assert_eq!(snap.voices()[0].source, Some(SourceId::Button(0)));
        assert_eq!(snap.active_count(), 1);
    }
}

#[test]
fn invalid_config_is_rejected() {
    let config = EngineConfig::default().voices(64);
    let result = Engine::new(&config, [0.5; 4], [false; 4], VecDeque::<NoteMessage>::new());
    assert!(result.is_err());
}

/// Always outputs its amplitude.
struct Dc(f32);

impl Oscillator for Dc {
    fn set_frequency(&mut self, _hz: f32) {}
    fn set_amplitude(&mut self, gain: f32) {
        self.0 = gain;
    }
    fn set_pulse_width(&mut self, _duty: f32) {}
    fn process(&mut self) -> f32 {
        self.0
    }
}

#[test]
fn full_scale_mix_is_exactly_one() {
    for n in [1, 3, 4, 7, 16] {
        let (mut tx, rx) = snapshot_channel(2, BlockSnapshot::silent(n));
        let voices = (0..n).map(|_| [Dc(0.0), Dc(0.0)]).collect();
        let mut renderer = Renderer::with_oscillators(voices, rx, 4);

        let mut snap = BlockSnapshot::silent(n);
        for (i, v) in snap.voices.iter_mut().take(n).enumerate() {
            *v = VoiceParams {
                source: Some(SourceId::Note(i as u8)),
                frequency: 100.0,
                amplitude: 1.0,
            };
        }
        tx.publish(snap);

        let mut left = [0.0; 9];
        let mut right = [0.0; 9];
        renderer.render(&mut left, &mut right);
        assert_eq!(left, [1.0; 9], "{n} voices");
        assert_eq!(right, [1.0; 9]);
    }
}
