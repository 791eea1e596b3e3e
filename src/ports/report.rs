//! Report ports: chart rasterization and document serialization.

use crate::domain::{GaugeChart, RasterImage, ReportDocument};

/// Report rendering failures.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ReportRenderError {
    #[error("chart rasterization failed: {0}")]
    Rasterization(String),

    #[error("PDF generation failed: {0}")]
    Pdf(String),
}

/// Draws a gauge chart into an RGB image.
pub trait ChartRasterizer {
    /// # Errors
    /// Returns `ReportRenderError::Rasterization` when the chart cannot be drawn.
    fn rasterize(&self, chart: &GaugeChart) -> Result<RasterImage, ReportRenderError>;
}

/// Serializes a finished report into a downloadable file format.
pub trait ReportWriter {
    /// File extension without the dot, e.g. `pdf`.
    fn extension(&self) -> &'static str;

    /// # Errors
    /// Returns `ReportRenderError` if the document cannot be serialized.
    fn write(&self, document: &ReportDocument) -> Result<Vec<u8>, ReportRenderError>;
}
