//! Voice table widget - one row per slot in the pool

use ratatui::{
    layout::{Constraint, Rect},
    style::{Color, Modifier, Style},
    widgets::{Block, Borders, Row, Table},
    Frame,
};
use voicepool::{engine::BlockSnapshot, SourceId};

pub fn render_voices(frame: &mut Frame, area: Rect, snapshot: &BlockSnapshot) {
    let header = Row::new(["voice", "source", "osc 1", "osc 2", "level"])
        .style(Style::default().add_modifier(Modifier::BOLD));

    let mean_level = snapshot.layers.iter().map(|l| l.amplitude).sum::<f32>()
        / snapshot.layers.len() as f32;
    let rows = snapshot.voices().iter().enumerate().map(|(index, params)| {
        let Some(source) = params.source else {
            return Row::new([index.to_string(), "free".into(), "-".into(), "-".into(), "-".into()])
                .style(Style::default().fg(Color::DarkGray));
        };

        let source = match source {
            SourceId::Button(b) => format!("button {}", b + 1),
            SourceId::Note(n) => format!("note {n}"),
        };
        Row::new([
            index.to_string(),
            source,
            format!("{:.2} Hz", params.frequency * snapshot.layers[0].detune_ratio),
            format!("{:.2} Hz", params.frequency * snapshot.layers[1].detune_ratio),
            level_bar(params.amplitude * mean_level, 10),
        ])
    });

    let widths = [
        Constraint::Length(6),
        Constraint::Length(10),
        Constraint::Length(12),
        Constraint::Length(12),
        Constraint::Min(10),
    ];
    let table = Table::new(rows, widths)
        .header(header)
        .block(Block::default().title(" Voices ").borders(Borders::ALL));
    frame.render_widget(table, area);
}

fn level_bar(level: f32, width: usize) -> String {
    let filled = (level.clamp(0.0, 1.0) * width as f32).round() as usize;
    format!("{}{}", "█".repeat(filled), "·".repeat(width - filled))
}
