//! UI module: View components for the TUI.

pub mod form;
pub mod result;

use ratatui::{
    layout::Rect,
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};

use crate::domain::{DISCLAIMER, REPORT_TITLE};
use crate::tui::styles::MedicalTheme;

/// Transient message under the current screen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StatusLine {
    Info(String),
    Error(String),
}

impl StatusLine {
    fn to_line(&self) -> Line<'_> {
        match self {
            Self::Info(msg) => Line::from(Span::styled(msg.as_str(), MedicalTheme::success())),
            Self::Error(msg) => Line::from(vec![
                Span::styled("! ", MedicalTheme::danger()),
                Span::styled(msg.as_str(), MedicalTheme::danger()),
            ]),
        }
    }
}

pub fn render_header(f: &mut Frame, area: Rect, subtitle: &str) {
    let header = Paragraph::new(Line::from(vec![
        Span::styled(" ", MedicalTheme::text()),
        Span::styled(REPORT_TITLE, MedicalTheme::title()),
        Span::styled(format!(" │ {subtitle}"), MedicalTheme::text_secondary()),
    ]))
    .block(
        Block::default()
            .borders(Borders::BOTTOM)
            .border_style(MedicalTheme::border()),
    );

    f.render_widget(header, area);
}

/// Footer: key hints, with the status line above them when there is one.
pub fn render_footer(f: &mut Frame, area: Rect, hints: &[(&str, &str)], status: Option<&StatusLine>) {
    let hints = Line::from(
        hints
            .iter()
            .flat_map(|(key, desc)| {
                [
                    Span::styled(format!("[{key}] "), MedicalTheme::key_hint()),
                    Span::styled(format!("{desc} "), MedicalTheme::key_desc()),
                ]
            })
            .collect::<Vec<_>>(),
    );
    let content: Vec<Line> = match status {
        Some(status) => vec![status.to_line(), hints],
        None => vec![hints],
    };

    let footer = Paragraph::new(content).block(
        Block::default()
            .borders(Borders::TOP)
            .border_style(MedicalTheme::border()),
    );

    f.render_widget(footer, area);
}

pub fn render_disclaimer(f: &mut Frame, area: Rect) {
    let block = Block::default()
        .borders(Borders::TOP)
        .border_style(MedicalTheme::border());

    let p = Paragraph::new(Line::from(Span::styled(DISCLAIMER, MedicalTheme::text_muted())))
        .block(block)
        .wrap(Wrap { trim: true });

    f.render_widget(p, area);
}

/// Rendered cells, one line per row.
#[cfg(test)]
pub(crate) fn screen_text(backend: &ratatui::backend::TestBackend) -> String {
    let buffer = backend.buffer();
    buffer
        .content
        .chunks(usize::from(buffer.area.width))
        .map(|row| row.iter().map(|cell| cell.symbol()).collect::<String>())
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::{backend::TestBackend, Terminal};

    #[test]
    fn test_disclaimer_strip_is_drawn() {
        let mut terminal = Terminal::new(TestBackend::new(160, 3)).unwrap();
        terminal.draw(|f| render_disclaimer(f, f.area())).unwrap();
        assert!(screen_text(terminal.backend()).contains(DISCLAIMER));
    }

    #[test]
    fn test_footer_shows_status_above_hints() {
        let mut terminal = Terminal::new(TestBackend::new(80, 3)).unwrap();
        let status = StatusLine::Error("Risk model unavailable: missing".into());
        terminal
            .draw(|f| render_footer(f, f.area(), &[("Q", "Quit")], Some(&status)))
            .unwrap();
        let screen = screen_text(terminal.backend());
        let lines: Vec<&str> = screen.lines().collect();
        assert!(lines[1].contains("! Risk model unavailable: missing"));
        assert!(lines[2].contains("[Q] Quit"));
    }
}
