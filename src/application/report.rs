//! Report builder: turns a stored result into a report document.
//!
//! Gauge rasterization may fail; the document is produced regardless, with
//! a warning line in place of the image.

use chrono::{DateTime, Local};

use crate::domain::{ReportDocument, ReportFigure, RiskResult};
use crate::ports::{ChartRasterizer, ReportRenderError, ReportWriter};

/// Builds and serializes reports.
pub struct ReportBuilder<R, W>
where
    R: ChartRasterizer,
    W: ReportWriter,
{
    rasterizer: R,
    writer: W,
}

impl<R, W> ReportBuilder<R, W>
where
    R: ChartRasterizer,
    W: ReportWriter,
{
    pub fn new(rasterizer: R, writer: W) -> Self {
        Self { rasterizer, writer }
    }

    /// Assemble the report for `result`.
    ///
    /// Never fails: a rasterization error becomes a visible warning.
    pub fn render_report(&self, result: &RiskResult, generated_at: DateTime<Local>) -> ReportDocument {
        let figure = match self.rasterizer.rasterize(&result.chart) {
            Ok(image) => ReportFigure::Gauge(image),
            Err(e) => {
                tracing::warn!("Gauge rasterization failed, report continues without image: {}", e);
                ReportFigure::Unavailable {
                    warning: format!("Warning: risk gauge image could not be rendered ({e})."),
                }
            }
        };

        ReportDocument::from_result(result, figure, generated_at)
    }

    /// Serialize a document; returns the suggested file name and bytes.
    ///
    /// # Errors
    /// Returns `ReportRenderError` if the writer fails.
    pub fn export(&self, document: &ReportDocument) -> Result<(String, Vec<u8>), ReportRenderError> {
        let bytes = self.writer.write(document)?;
        Ok((document.file_name(self.writer.extension()), bytes))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::pdf::PdfReportWriter;
    use crate::adapters::raster::PixelGaugeRasterizer;
    use crate::domain::{
        classify, render_gauge, GaugeChart, PatientField, PatientInput, Probability, RasterImage,
        SmokingStatus,
    };
    use chrono::TimeZone;

    struct BrokenRasterizer;

    impl ChartRasterizer for BrokenRasterizer {
        fn rasterize(&self, _chart: &GaugeChart) -> Result<RasterImage, ReportRenderError> {
            Err(ReportRenderError::Rasterization("no display".into()))
        }
    }

    fn result_for(p: f64, input: PatientInput) -> RiskResult {
        let p = Probability::new(p).unwrap();
        let verdict = classify(p);
        RiskResult {
            probability: p,
            verdict,
            chart: render_gauge(p, verdict.level),
            input,
            assessed_at: Local.with_ymd_and_hms(2026, 10, 17, 9, 15, 0).unwrap(),
        }
    }

    fn now() -> DateTime<Local> {
        Local.with_ymd_and_hms(2026, 10, 17, 9, 16, 42).unwrap()
    }

    #[test]
    fn test_report_has_one_row_per_field() {
        let builder = ReportBuilder::new(PixelGaugeRasterizer::default(), PdfReportWriter::new());
        let inputs = [
            PatientInput::default(),
            PatientInput {
                smoking: SmokingStatus::Never,
                breathing_issue: false,
                throat_discomfort: false,
                pollution: false,
                family_cancer: false,
                family_smoking: false,
                age: 18,
                energy: 10,
                immunity: 10,
                spo2: 100,
            },
        ];

        let expected: Vec<_> = PatientField::ALL.iter().map(|f| f.label()).collect();
        for input in inputs {
            let doc = builder.render_report(&result_for(0.2, input), now());
            let labels: Vec<_> = doc.rows.iter().map(|r| r.label).collect();
            assert_eq!(labels, expected);
        }
    }

    #[test]
    fn test_report_copies_result_verbatim() {
        let builder = ReportBuilder::new(PixelGaugeRasterizer::default(), PdfReportWriter::new());
        let result = result_for(0.6999, PatientInput::default());
        let doc = builder.render_report(&result, now());

        assert_eq!(doc.probability, result.probability);
        assert_eq!(doc.level, result.level());
        assert_eq!(doc.advice, result.advice());
        assert_eq!(doc.probability_label(), "Probability: 70.0%");
        assert_eq!(doc.rows[0].value, "Current");
        assert_eq!(doc.rows[9].value, "91");
        assert!(matches!(doc.figure, ReportFigure::Gauge(_)));
    }

    #[test]
    fn test_rasterization_failure_degrades_to_warning() {
        let builder = ReportBuilder::new(BrokenRasterizer, PdfReportWriter::new());
        let doc = builder.render_report(&result_for(0.9, PatientInput::default()), now());

        match &doc.figure {
            ReportFigure::Unavailable { warning } => assert!(warning.contains("no display")),
            ReportFigure::Gauge(_) => panic!("expected warning"),
        }
        let (name, bytes) = builder.export(&doc).expect("document still produced");
        assert!(name.ends_with(".pdf"));
        assert!(!bytes.is_empty());
    }

    #[test]
    fn test_file_name_carries_generation_timestamp() {
        let builder = ReportBuilder::new(PixelGaugeRasterizer::default(), PdfReportWriter::new());
        let doc = builder.render_report(&result_for(0.1, PatientInput::default()), now());
        let (name, _) = builder.export(&doc).unwrap();
        assert_eq!(name, "AeroLung_Report_20261017_091642.pdf");
        assert_eq!(doc.generated_label(), "Report generated: October 17, 2026 • 09:16");
    }
}
