//! Assessment result view.

use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Gauge, Paragraph, Wrap},
    Frame,
};

use super::{render_footer, render_header, StatusLine};
use crate::domain::{GaugeChart, RiskResult};
use crate::tui::styles::MedicalTheme;

/// Horizontal three-band scale with the threshold marker.
///
/// Each cell takes the band color at its midpoint; the cell containing the
/// threshold shows `│` in the threshold color.
pub(crate) fn band_strip(chart: &GaugeChart, width: u16) -> Line<'static> {
    let width = width.max(1);
    let span = chart.max - chart.min;
    let marker = (((chart.threshold - chart.min) / span) * f64::from(width))
        .floor()
        .clamp(0.0, f64::from(width - 1)) as u16;

    let cells: Vec<Span<'static>> = (0..width)
        .map(|i| {
            let at = chart.min + (f64::from(i) + 0.5) / f64::from(width) * span;
            let bg = MedicalTheme::rgb(chart.band_color_at(at));
            if i == marker {
                Span::styled(
                    "│",
                    Style::default()
                        .bg(bg)
                        .fg(MedicalTheme::rgb(chart.threshold_color))
                        .add_modifier(Modifier::BOLD),
                )
            } else {
                Span::styled(" ", Style::default().bg(bg))
            }
        })
        .collect();

    Line::from(cells)
}

pub fn render_result(
    f: &mut Frame,
    area: Rect,
    result: Option<&RiskResult>,
    status: Option<&StatusLine>,
) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header
            Constraint::Min(0),    // Content
            Constraint::Length(3), // Footer
        ])
        .split(area);

    render_header(f, chunks[0], "Risk Assessment Result");

    let hints: &[(&str, &str)] = match result {
        Some(result) => {
            render_content(f, chunks[1], result);
            &[("D", "Download Report"), ("Esc", "Back to Form"), ("Q", "Quit")]
        }
        None => {
            let empty = Paragraph::new(Line::from(Span::styled(
                "No assessment yet. Fill in the form and press Enter.",
                MedicalTheme::text_muted(),
            )))
            .alignment(Alignment::Center);
            f.render_widget(empty, chunks[1]);
            &[("Esc", "Back to Form"), ("Q", "Quit")]
        }
    };

    render_footer(f, chunks[2], hints, status);
}

fn render_content(f: &mut Frame, area: Rect, result: &RiskResult) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Gauge
            Constraint::Length(3), // Band scale
            Constraint::Min(0),    // Result box
        ])
        .margin(1)
        .split(area);

    let chart = &result.chart;
    let tier = MedicalTheme::risk_level(result.level());

    let gauge = Gauge::default()
        .block(
            Block::default()
                .title(Span::styled(format!(" {} ", chart.title), MedicalTheme::text_secondary()))
                .borders(Borders::ALL)
                .border_style(MedicalTheme::border()),
        )
        .gauge_style(tier)
        .ratio(chart.fraction())
        .label(format!("{}", result.probability));
    f.render_widget(gauge, chunks[0]);

    let scale_block = Block::default()
        .borders(Borders::LEFT | Borders::RIGHT | Borders::BOTTOM)
        .border_style(MedicalTheme::border());
    let scale_inner = scale_block.inner(chunks[1]);
    f.render_widget(scale_block, chunks[1]);
    let scale = Paragraph::new(vec![
        band_strip(chart, scale_inner.width),
        Line::from(vec![
            Span::styled("0", MedicalTheme::text_muted()),
            Span::styled(
                format!("{:>w$}", "100", w = usize::from(scale_inner.width.saturating_sub(1))),
                MedicalTheme::text_muted(),
            ),
        ]),
    ]);
    f.render_widget(scale, scale_inner);

    let block = Block::default()
        .title(Span::styled(" Assessment ", MedicalTheme::subtitle()))
        .borders(Borders::ALL)
        .border_style(tier);

    let body = Paragraph::new(vec![
        Line::from(Span::styled(
            result.level().label(),
            tier.add_modifier(Modifier::BOLD),
        )),
        Line::from(vec![
            Span::styled("Probability: ", MedicalTheme::text_secondary()),
            Span::styled(result.probability.to_string(), MedicalTheme::text()),
        ]),
        Line::from(""),
        Line::from(Span::styled("Clinical Recommendation", MedicalTheme::text_secondary())),
        Line::from(Span::styled(result.advice(), MedicalTheme::text())),
        Line::from(""),
        Line::from(Span::styled(
            format!(
                "Assessed {}",
                result.assessed_at.format(crate::domain::TIMESTAMP_FORMAT)
            ),
            MedicalTheme::text_muted(),
        )),
    ])
    .alignment(Alignment::Center)
    .wrap(Wrap { trim: true })
    .block(block);

    f.render_widget(body, chunks[2]);
}
