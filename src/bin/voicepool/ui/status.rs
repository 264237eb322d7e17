//! Status bar widget - waveform, pool usage, held inputs

use ratatui::{
    layout::Rect,
    style::{Color, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};
use voicepool::{engine::BlockSnapshot, synth::quantizer::ScaleMode};

use super::PanelInfo;
use crate::input::{KeyboardNotes, SharedButtons};

pub fn render_status(
    frame: &mut Frame,
    area: Rect,
    info: &PanelInfo,
    snapshot: &BlockSnapshot,
    buttons: &SharedButtons,
    keys: &KeyboardNotes,
) {
    let block = Block::default().title(" voicepool ").borders(Borders::ALL);

    // One cell per button; waveform buttons are marked separately
    let button_cells: String = (0..info.num_buttons)
        .map(|i| match (info.waveform_buttons.contains(&Some(i)), buttons.is_pressed(i)) {
            (true, _) => '~',
            (false, true) => '■',
            (false, false) => '□',
        })
        .collect();

    let held_notes = (0..=12).filter(|s| keys.is_held(keys.base() + s)).count();
    let scale = match info.quantizer.mode {
        ScaleMode::Off => "free".to_string(),
        mode => format!("{mode:?} on {}", info.quantizer.root),
    };
    let full = snapshot.active_count() == snapshot.num_voices;

    let line = Line::from(vec![
        Span::styled(
            format!(
                " {:?}/{:?}  ",
                snapshot.layers[0].waveform, snapshot.layers[1].waveform
            ),
            Style::default().fg(Color::Cyan),
        ),
        Span::styled(
            format!("voices {}/{}  ", snapshot.active_count(), snapshot.num_voices),
            Style::default().fg(if full { Color::Yellow } else { Color::Green }),
        ),
        Span::styled(
            format!("buttons {button_cells}  "),
            Style::default().fg(Color::White),
        ),
        Span::styled(
            format!("keys C{} +{held_notes}  ", keys.base() as i16 / 12 - 1),
            Style::default().fg(Color::White),
        ),
        Span::styled(format!("pitch {scale}  "), Style::default().fg(Color::DarkGray)),
        Span::styled(
            format!("{:.1}kHz  #{}", info.sample_rate / 1000.0, snapshot.sequence),
            Style::default().fg(Color::DarkGray),
        ),
    ]);

    frame.render_widget(Paragraph::new(line).block(block), area);
}
