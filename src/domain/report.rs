//! Report document model.
//!
//! A `ReportDocument` is the format-independent content of the downloadable
//! report. Writers (PDF) lay it out; nothing is recomputed from it.

use chrono::{DateTime, Local};

use super::patient::PatientField;
use super::risk::{Probability, RiskLevel, RiskResult};

pub const REPORT_TITLE: &str = "AeroLung AI";
pub const REPORT_SUBTITLE: &str = "Lung Cancer Risk Assessment Report";

/// Screening-only boilerplate shown on the live view and in every report.
pub const DISCLAIMER: &str = "This AI tool is for screening purposes only • Not a substitute for professional medical diagnosis";

/// Timestamp format used in the report body.
pub const TIMESTAMP_FORMAT: &str = "%B %d, %Y • %H:%M";

/// Packed 8-bit RGB image, row-major from the top-left corner.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RasterImage {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<u8>,
}

impl RasterImage {
    /// Solid-color image.
    #[must_use]
    pub fn filled(width: u32, height: u32, color: (u8, u8, u8)) -> Self {
        let len = width as usize * height as usize;
        let mut pixels = Vec::with_capacity(len * 3);
        for _ in 0..len {
            pixels.extend_from_slice(&[color.0, color.1, color.2]);
        }
        Self {
            width,
            height,
            pixels,
        }
    }

    #[must_use]
    pub fn pixel(&self, x: u32, y: u32) -> Option<(u8, u8, u8)> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let i = (y as usize * self.width as usize + x as usize) * 3;
        Some((self.pixels[i], self.pixels[i + 1], self.pixels[i + 2]))
    }

    pub fn put_pixel(&mut self, x: u32, y: u32, color: (u8, u8, u8)) {
        if x >= self.width || y >= self.height {
            return;
        }
        let i = (y as usize * self.width as usize + x as usize) * 3;
        self.pixels[i..i + 3].copy_from_slice(&[color.0, color.1, color.2]);
    }

    /// True when the buffer length matches the declared dimensions.
    #[must_use]
    pub fn is_consistent(&self) -> bool {
        self.pixels.len() == self.width as usize * self.height as usize * 3
    }
}

/// One factor/value row of the report table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportRow {
    pub label: &'static str,
    pub value: String,
}

/// The embedded gauge, or the warning that replaced it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReportFigure {
    Gauge(RasterImage),
    Unavailable { warning: String },
}

/// Content of a generated report.
#[derive(Debug, Clone, PartialEq)]
pub struct ReportDocument {
    pub title: &'static str,
    pub subtitle: &'static str,
    pub generated_at: DateTime<Local>,
    pub assessed_at: DateTime<Local>,
    pub rows: Vec<ReportRow>,
    pub level: RiskLevel,
    pub probability: Probability,
    pub advice: &'static str,
    pub figure: ReportFigure,
    pub disclaimer: &'static str,
}

impl ReportDocument {
    /// Assemble the report body from a stored result.
    ///
    /// Level, probability and advice are copied from `result` as-is.
    #[must_use]
    pub fn from_result(
        result: &RiskResult,
        figure: ReportFigure,
        generated_at: DateTime<Local>,
    ) -> Self {
        let rows = PatientField::ALL
            .iter()
            .map(|&field| ReportRow {
                label: field.label(),
                value: result.input.display_value(field),
            })
            .collect();

        Self {
            title: REPORT_TITLE,
            subtitle: REPORT_SUBTITLE,
            generated_at,
            assessed_at: result.assessed_at,
            rows,
            level: result.level(),
            probability: result.probability,
            advice: result.advice(),
            figure,
            disclaimer: DISCLAIMER,
        }
    }

    #[must_use]
    pub fn generated_label(&self) -> String {
        format!("Report generated: {}", self.generated_at.format(TIMESTAMP_FORMAT))
    }

    #[must_use]
    pub fn assessed_label(&self) -> String {
        format!("Assessment performed: {}", self.assessed_at.format(TIMESTAMP_FORMAT))
    }

    #[must_use]
    pub fn probability_label(&self) -> String {
        format!("Probability: {}", self.probability)
    }

    /// Download name, e.g. `AeroLung_Report_20261017_143005.pdf`.
    #[must_use]
    pub fn file_name(&self, extension: &str) -> String {
        format!(
            "AeroLung_Report_{}.{extension}",
            self.generated_at.format("%Y%m%d_%H%M%S")
        )
    }
}
