//! Pot widget - one gauge line per analog channel

use ratatui::{
    layout::Rect,
    style::{Color, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use crate::input::{SharedPots, POT_COUNT, POT_NAMES};

const GAUGE_WIDTH: usize = 24;

pub fn render_controls(frame: &mut Frame, area: Rect, pots: &SharedPots, selected: usize) {
    let lines: Vec<Line> = (0..POT_COUNT)
        .map(|channel| {
            let value = pots.get(channel);
            let filled = (value * GAUGE_WIDTH as f32).round() as usize;
            let style = if channel == selected {
                Style::default().fg(Color::Cyan)
            } else {
                Style::default().fg(Color::Gray)
            };
            let marker = if channel == selected { '>' } else { ' ' };

            Line::from(vec![
                Span::styled(format!("{marker} {:<12}", POT_NAMES[channel]), style),
                Span::styled(
                    format!(
                        "[{}{}] {value:.2}",
                        "=".repeat(filled),
                        " ".repeat(GAUGE_WIDTH - filled)
                    ),
                    style,
                ),
            ])
        })
        .collect();

    let block = Block::default().title(" Pots ").borders(Borders::ALL);
    frame.render_widget(Paragraph::new(lines).block(block), area);
}
