//! TUI module for voicepool
//!
//! Shows the voice table the renderer is playing and lets the keyboard stand
//! in for the panel: buttons, pots and a one-octave note row.

mod controls;
mod status;
mod voices;

use std::time::{Duration, Instant};

use color_eyre::eyre::Result as EyreResult;
use crossterm::event::{self, Event, KeyCode, KeyEventKind};
use ratatui::{
    layout::{Constraint, Direction, Layout},
    style::{Color, Style},
    widgets::Paragraph,
    DefaultTerminal, Frame,
};
use rtrb::Consumer;
use voicepool::{engine::BlockSnapshot, synth::quantizer::QuantizerSettings, LAYERS_PER_VOICE};

use super::input::{KeyboardNotes, SharedButtons, SharedPots, POT_COUNT};

use controls::render_controls;
use status::render_status;
use voices::render_voices;

/// Home-row piano layout, one octave from the keyboard base note
const NOTE_KEYS: [char; 13] = ['a', 'w', 's', 'e', 'd', 'f', 't', 'g', 'y', 'h', 'u', 'j', 'k'];

/// How far one arrow press turns a pot
const POT_STEP: f32 = 0.02;

/// How long a momentary button stays down; several control polls
const MOMENTARY_HOLD: Duration = Duration::from_millis(50);

/// Engine facts that never change while the UI runs
#[derive(Clone, Copy, Debug)]
pub struct PanelInfo {
    pub sample_rate: f32,
    pub num_buttons: usize,
    pub waveform_buttons: [Option<usize>; LAYERS_PER_VOICE],
    pub quantizer: QuantizerSettings,
}

/// UI application state
pub struct UiApp {
    /// Snapshots forwarded by the control thread
    snapshot_rx: Consumer<BlockSnapshot>,
    /// Latest snapshot received
    current: BlockSnapshot,
    info: PanelInfo,
    buttons: SharedButtons,
    pots: SharedPots,
    keys: KeyboardNotes,
    selected_pot: usize,
    /// Momentary button waiting to be let go
    release_at: Option<(usize, Instant)>,
    should_quit: bool,
}

impl UiApp {
    pub fn new(
        snapshot_rx: Consumer<BlockSnapshot>,
        initial: BlockSnapshot,
        info: PanelInfo,
        buttons: SharedButtons,
        pots: SharedPots,
        keys: KeyboardNotes,
    ) -> Self {
        Self {
            snapshot_rx,
            current: initial,
            info,
            buttons,
            pots,
            keys,
            selected_pot: 0,
            release_at: None,
            should_quit: false,
        }
    }

    /// Run the UI event loop
    pub fn run(&mut self, terminal: &mut DefaultTerminal) -> EyreResult<()> {
        while !self.should_quit {
            self.poll_state();
            self.release_momentary();

            terminal.draw(|frame| self.render(frame))?;

            // Non-blocking, ~60fps
            if event::poll(Duration::from_millis(16))? {
                if let Event::Key(key) = event::read()? {
                    if key.kind == KeyEventKind::Press {
                        self.handle_key(key.code);
                    }
                }
            }
        }

        Ok(())
    }

    /// Keep only the newest snapshot
    fn poll_state(&mut self) {
        while let Ok(snapshot) = self.snapshot_rx.pop() {
            self.current = snapshot;
        }
    }

    fn release_momentary(&mut self) {
        if let Some((index, at)) = self.release_at {
            if Instant::now() >= at {
                self.buttons.set(index, false);
                self.release_at = None;
            }
        }
    }

    fn handle_key(&mut self, key: KeyCode) {
        match key {
            KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => {
                self.should_quit = true;
            }
            KeyCode::Char(c @ '1'..='9') => {
                let index = c as usize - '1' as usize;
                if self.info.waveform_buttons.contains(&Some(index)) {
                    // Only the rising edge matters, so press and let go
                    self.buttons.set(index, true);
                    self.release_at = Some((index, Instant::now() + MOMENTARY_HOLD));
                } else if index < self.info.num_buttons {
                    self.buttons.toggle(index);
                }
            }
            KeyCode::Up => {
                self.selected_pot = (self.selected_pot + POT_COUNT - 1) % POT_COUNT;
            }
            KeyCode::Down => {
                self.selected_pot = (self.selected_pot + 1) % POT_COUNT;
            }
            KeyCode::Left => self.pots.nudge(self.selected_pot, -POT_STEP),
            KeyCode::Right => self.pots.nudge(self.selected_pot, POT_STEP),
            KeyCode::Char('z') => self.keys.shift_octave(-1),
            KeyCode::Char('x') => self.keys.shift_octave(1),
            KeyCode::Char(' ') => self.keys.all_off(),
            KeyCode::Char(c) => {
                if let Some(semitone) = NOTE_KEYS.iter().position(|&k| k == c) {
                    self.keys.toggle(semitone as u8);
                }
            }
            _ => {}
        }
    }

    fn render(&self, frame: &mut Frame) {
        let area = frame.area();

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3), // Status bar
                Constraint::Min(self.current.num_voices as u16 + 3), // Voice table
                Constraint::Length(POT_COUNT as u16 + 2), // Pots
                Constraint::Length(1), // Help bar
            ])
            .split(area);

        render_status(frame, chunks[0], &self.info, &self.current, &self.buttons, &self.keys);
        render_voices(frame, chunks[1], &self.current);
        render_controls(frame, chunks[2], &self.pots, self.selected_pot);

        let help = Paragraph::new(
            " [1-9] Buttons  [A-K] Notes  [Z/X] Octave  [Space] All off  [↑↓←→] Pots  [Q] Quit",
        )
        .style(Style::default().fg(Color::DarkGray));
        frame.render_widget(help, chunks[3]);
    }
}
