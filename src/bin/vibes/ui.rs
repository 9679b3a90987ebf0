//! Drawing: status bar, two rows of bars, help line.

use std::collections::HashSet;

use ratatui::{
    layout::{Constraint, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Paragraph},
    Frame,
};
use vibraphone::OutputStatus;

use crate::keys::KeyNote;

pub struct View<'a> {
    pub keys: &'a [KeyNote],
    pub lit: &'a HashSet<&'static str>,
    pub sustain: bool,
    pub voices: usize,
    pub status: OutputStatus,
    /// Sample rate and channel count of the open output
    pub format: Option<(f32, usize)>,
    pub notice: Option<&'a str>,
}

pub fn draw(frame: &mut Frame, view: &View) {
    let [status, sharps, naturals, help] = Layout::vertical([
        Constraint::Length(3),
        Constraint::Length(4),
        Constraint::Length(4),
        Constraint::Min(1),
    ])
    .areas(frame.area());

    draw_status(frame, status, view);
    draw_row(frame, sharps, view, true);
    draw_row(frame, naturals, view, false);

    let hint = Paragraph::new(" [keys] Strike  [Space] Sustain  [Esc] Quit")
        .style(Style::default().fg(Color::DarkGray));
    frame.render_widget(hint, help);
}

fn draw_status(frame: &mut Frame, area: Rect, view: &View) {
    let (pedal, pedal_style) = if view.sustain {
        ("● SUSTAIN", Style::default().fg(Color::Green).add_modifier(Modifier::BOLD))
    } else {
        ("○ sustain", Style::default().fg(Color::DarkGray))
    };

    let audio = match view.status {
        OutputStatus::Uninitialized => {
            Span::styled("audio: press a key", Style::default().fg(Color::DarkGray))
        }
        OutputStatus::Suspended => {
            Span::styled("audio: suspended", Style::default().fg(Color::Yellow))
        }
        OutputStatus::Running => {
            Span::styled("audio: running", Style::default().fg(Color::Cyan))
        }
        OutputStatus::Unavailable => Span::styled(
            view.notice.unwrap_or("audio: unavailable").to_string(),
            Style::default().fg(Color::Red),
        ),
    };

    // e.g. 48000 Hz stereo -> "48kHz 2ch"
    let format = view
        .format
        .map(|(sample_rate, channels)| format!("  {}kHz {channels}ch", sample_rate / 1000.0))
        .unwrap_or_default();

    let line = Line::from(vec![
        Span::styled(format!(" {pedal}  "), pedal_style),
        Span::raw(format!("voices: {:<3} ", view.voices)),
        audio,
        Span::styled(format, Style::default().fg(Color::DarkGray)),
    ]);

    let status = Paragraph::new(line).block(Block::bordered().title(" vibes "));
    frame.render_widget(status, area);
}

fn draw_row(frame: &mut Frame, area: Rect, view: &View, sharps: bool) {
    let bars: Vec<&KeyNote> = view.keys.iter().filter(|k| k.sharp == sharps).collect();

    let mut names = Vec::with_capacity(bars.len());
    let mut labels = Vec::with_capacity(bars.len());
    for key in bars {
        let style = if view.lit.contains(key.name) {
            Style::default().fg(Color::Black).bg(Color::Yellow)
        } else if sharps {
            Style::default().fg(Color::Gray)
        } else {
            Style::default().fg(Color::White)
        };
        names.push(Span::styled(format!("{:^5}", key.name), style));
        labels.push(Span::styled(
            format!("{:^5}", key.label()),
            style.add_modifier(Modifier::DIM),
        ));
    }

    let title = if sharps { " sharps " } else { " naturals " };
    let bars = Paragraph::new(vec![Line::from(names), Line::from(labels)])
        .block(Block::bordered().title(title));
    frame.render_widget(bars, area);
}
