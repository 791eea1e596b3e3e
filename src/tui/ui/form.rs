//! Risk assessment form.

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use super::{render_footer, render_header, StatusLine};
use crate::domain::{PatientField, PatientInput};
use crate::tui::styles::MedicalTheme;

/// Number of fields on the "Lifestyle & Symptoms" card.
const LIFESTYLE_FIELDS: usize = 6;

const SLIDER_WIDTH: usize = 20;

/// Cursor over the form fields.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FormState {
    pub selected: usize,
}

impl FormState {
    #[must_use]
    pub fn field(&self) -> PatientField {
        PatientField::ALL[self.selected.min(PatientField::ALL.len() - 1)]
    }

    pub fn next_field(&mut self) {
        self.selected = (self.selected + 1) % PatientField::ALL.len();
    }

    pub fn prev_field(&mut self) {
        self.selected = self
            .selected
            .checked_sub(1)
            .unwrap_or(PatientField::ALL.len() - 1);
    }
}

/// Text track for a slider, e.g. `━━━━━━●─────────────`.
pub(crate) fn slider_track(value: u8, (min, max): (u8, u8), width: usize) -> String {
    let span = f64::from(max.saturating_sub(min)).max(1.0);
    let fraction = (f64::from(value.clamp(min, max) - min) / span).clamp(0.0, 1.0);
    let knob = ((width.saturating_sub(1)) as f64 * fraction).round() as usize;

    (0..width)
        .map(|i| match i.cmp(&knob) {
            std::cmp::Ordering::Less => '━',
            std::cmp::Ordering::Equal => '●',
            std::cmp::Ordering::Greater => '─',
        })
        .collect()
}

pub fn render_form(
    f: &mut Frame,
    area: Rect,
    input: &PatientInput,
    state: &FormState,
    unavailable: Option<&str>,
    status: Option<&StatusLine>,
) {
    let banner_height = if unavailable.is_some() { 3 } else { 0 };
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),             // Header
            Constraint::Length(banner_height), // Model banner
            Constraint::Min(0),                // Cards
            Constraint::Length(3),             // Footer
        ])
        .split(area);

    render_header(f, chunks[0], "Lung Cancer Risk Assessment");
    if let Some(reason) = unavailable {
        render_banner(f, chunks[1], reason);
    }
    render_cards(f, chunks[2], input, state);
    render_footer(f, chunks[3], &form_hints(unavailable.is_none()), status);
}

/// Key hints; Enter is only offered while the model can score.
fn form_hints(can_submit: bool) -> Vec<(&'static str, &'static str)> {
    let mut hints = vec![("↑↓", "Navigate"), ("←→", "Change"), ("Home/End", "Min/Max")];
    if can_submit {
        hints.push(("Enter", "Calculate Risk"));
    }
    hints.extend([("R", "Reset"), ("Q", "Quit")]);
    hints
}

fn render_banner(f: &mut Frame, area: Rect, reason: &str) {
    let banner = Paragraph::new(vec![
        Line::from(Span::styled(
            " Risk model unavailable: calculations are disabled ",
            MedicalTheme::banner(),
        )),
        Line::from(Span::styled(reason, MedicalTheme::danger())),
    ])
    .block(Block::default().borders(Borders::NONE));

    f.render_widget(banner, area);
}

fn render_cards(f: &mut Frame, area: Rect, input: &PatientInput, state: &FormState) {
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .margin(1)
        .split(area);

    let (lifestyle, health) = PatientField::ALL.split_at(LIFESTYLE_FIELDS);
    render_card(f, columns[0], "Lifestyle & Symptoms", lifestyle, 0, input, state);
    render_card(
        f,
        columns[1],
        "Health & Demographics",
        health,
        LIFESTYLE_FIELDS,
        input,
        state,
    );
}

fn render_card(
    f: &mut Frame,
    area: Rect,
    title: &str,
    fields: &[PatientField],
    offset: usize,
    input: &PatientInput,
    state: &FormState,
) {
    let card = Block::default()
        .title(Span::styled(format!(" {title} "), MedicalTheme::subtitle()))
        .borders(Borders::ALL)
        .border_style(MedicalTheme::border());
    let inner = card.inner(area);
    f.render_widget(card, area);

    let constraints: Vec<Constraint> = fields
        .iter()
        .map(|_| Constraint::Length(3))
        .chain(std::iter::once(Constraint::Min(0)))
        .collect();
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints(constraints)
        .split(inner);

    for (i, &field) in fields.iter().enumerate() {
        let selected = offset + i == state.selected;
        let (border_style, title_style) = if selected {
            (MedicalTheme::border_focused(), MedicalTheme::focused())
        } else {
            (MedicalTheme::border(), MedicalTheme::text_secondary())
        };

        let block = Block::default()
            .title(Span::styled(format!(" {} ", field.label()), title_style))
            .borders(Borders::ALL)
            .border_style(border_style);

        let value = input.display_value(field);
        let mut spans = vec![Span::raw(" ")];
        match (field.range(), input.slider_value(field)) {
            (Some(range), Some(current)) => {
                spans.push(Span::styled(format!("{value:>3} "), MedicalTheme::text()));
                spans.push(Span::styled(
                    slider_track(current, range, SLIDER_WIDTH),
                    if selected {
                        MedicalTheme::focused()
                    } else {
                        MedicalTheme::text_muted()
                    },
                ));
                spans.push(Span::styled(
                    format!(" {}-{}", range.0, range.1),
                    MedicalTheme::text_muted(),
                ));
            }
            _ if selected => {
                spans.push(Span::styled("◀ ", MedicalTheme::focused()));
                spans.push(Span::styled(value, MedicalTheme::text()));
                spans.push(Span::styled(" ▶", MedicalTheme::focused()));
            }
            _ => spans.push(Span::styled(value, MedicalTheme::text())),
        }

        f.render_widget(Paragraph::new(Line::from(spans)).block(block), rows[i]);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tui::ui::screen_text;
    use ratatui::{backend::TestBackend, Terminal};

    fn draw(unavailable: Option<&str>) -> String {
        let mut terminal = Terminal::new(TestBackend::new(160, 50)).unwrap();
        terminal
            .draw(|f| {
                render_form(
                    f,
                    f.area(),
                    &PatientInput::default(),
                    &FormState::default(),
                    unavailable,
                    None,
                )
            })
            .unwrap();
        screen_text(terminal.backend())
    }

    #[test]
    fn test_unavailable_model_hides_calculate_hint() {
        let screen = draw(Some("no model artifact"));
        assert!(screen.contains("Risk model unavailable"));
        assert!(screen.contains("no model artifact"));
        assert!(!screen.contains("Calculate Risk"));

        let screen = draw(None);
        assert!(!screen.contains("Risk model unavailable"));
        assert!(screen.contains("[Enter] Calculate Risk"));
    }

    #[test]
    fn test_slider_track_positions_knob() {
        assert_eq!(slider_track(18, (18, 100), 5), "●────");
        assert_eq!(slider_track(100, (18, 100), 5), "━━━━●");
        assert_eq!(slider_track(5, (1, 9), 5), "━━●──");
        assert_eq!(slider_track(5, (1, 9), 5).chars().count(), 5);
    }

    #[test]
    fn test_field_cursor_wraps() {
        let mut state = FormState::default();
        state.prev_field();
        assert_eq!(state.field(), PatientField::Spo2);
        state.next_field();
        assert_eq!(state.field(), PatientField::Smoking);
    }

    #[test]
    fn test_cards_split_categorical_and_numeric() {
        let (lifestyle, health) = PatientField::ALL.split_at(LIFESTYLE_FIELDS);
        assert!(lifestyle.iter().all(|f| !f.is_slider()));
        assert!(health.iter().all(|f| f.is_slider()));
    }
}
