//! Pixel rasterizer: Implementation of `ChartRasterizer`.
//!
//! Draws the semicircular gauge (background bands, value bar, threshold
//! marker) into an RGB buffer for embedding in the PDF report. Text is not
//! rasterized; the report prints the value next to the image.

use std::f64::consts::PI;

use crate::domain::{GaugeChart, RasterImage};
use crate::ports::{ChartRasterizer, ReportRenderError};

const BACKGROUND: (u8, u8, u8) = (255, 255, 255);
const BORDER: (u8, u8, u8) = (128, 128, 128);

const MIN_WIDTH: u32 = 64;
const MIN_HEIGHT: u32 = 48;
const MAX_PIXELS: u64 = 4_000_000;

/// Ring geometry as fractions of the outer radius.
const RING_INNER: f64 = 0.55;
const BAR_INNER: f64 = 0.66;
const BAR_OUTER: f64 = 0.89;
const THRESHOLD_INNER: f64 = 0.59;

/// Half width of the threshold marker, in axis percent.
const THRESHOLD_HALF_WIDTH: f64 = 0.6;

/// Renders a gauge at a fixed size.
#[derive(Debug, Clone, Copy)]
pub struct PixelGaugeRasterizer {
    width: u32,
    height: u32,
}

impl Default for PixelGaugeRasterizer {
    fn default() -> Self {
        Self {
            width: 480,
            height: 270,
        }
    }
}

impl PixelGaugeRasterizer {
    #[must_use]
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    fn check(&self, chart: &GaugeChart) -> Result<(), ReportRenderError> {
        if self.width < MIN_WIDTH || self.height < MIN_HEIGHT {
            return Err(ReportRenderError::Rasterization(format!(
                "image size {}x{} below minimum {MIN_WIDTH}x{MIN_HEIGHT}",
                self.width, self.height
            )));
        }
        if u64::from(self.width) * u64::from(self.height) > MAX_PIXELS {
            return Err(ReportRenderError::Rasterization(format!(
                "image size {}x{} exceeds {MAX_PIXELS} pixels",
                self.width, self.height
            )));
        }
        if !chart.value.is_finite() || !chart.threshold.is_finite() {
            return Err(ReportRenderError::Rasterization(
                "gauge value is not finite".into(),
            ));
        }
        if !(chart.max > chart.min) {
            return Err(ReportRenderError::Rasterization(format!(
                "invalid gauge axis [{}, {}]",
                chart.min, chart.max
            )));
        }
        Ok(())
    }
}

impl ChartRasterizer for PixelGaugeRasterizer {
    fn rasterize(&self, chart: &GaugeChart) -> Result<RasterImage, ReportRenderError> {
        self.check(chart)?;

        let mut image = RasterImage::filled(self.width, self.height, BACKGROUND);

        let w = f64::from(self.width);
        let h = f64::from(self.height);
        let margin = (w.min(h) * 0.06).max(4.0);
        let cx = w / 2.0;
        let cy = h - margin;
        let radius = (w / 2.0 - margin).min(h - 2.0 * margin);
        let span = chart.max - chart.min;
        let value = chart.value.clamp(chart.min, chart.max);

        for y in 0..self.height {
            for x in 0..self.width {
                let dx = f64::from(x) + 0.5 - cx;
                let dy = cy - (f64::from(y) + 0.5);
                if dy < 0.0 {
                    continue;
                }

                let r = (dx * dx + dy * dy).sqrt() / radius;
                if r > 1.0 + 1.5 / radius || r < RING_INNER {
                    continue;
                }

                // Left end of the arc is the axis minimum.
                let theta = dy.atan2(dx);
                let at = chart.min + (1.0 - theta / PI) * span;

                let color = if r > 1.0 {
                    BORDER
                } else if (at - chart.threshold).abs() <= THRESHOLD_HALF_WIDTH * span / 100.0
                    && r >= THRESHOLD_INNER
                {
                    chart.threshold_color
                } else if (BAR_INNER..=BAR_OUTER).contains(&r) && at <= value && value > chart.min {
                    chart.bar_color
                } else {
                    chart.band_color_at(at)
                };

                image.put_pixel(x, y, color);
            }
        }

        tracing::debug!(
            "Rasterized gauge {}x{} (value={:.1})",
            self.width,
            self.height,
            chart.value
        );

        Ok(image)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{classify, render_gauge, Probability};

    fn chart(p: f64) -> GaugeChart {
        let p = Probability::new(p).unwrap();
        render_gauge(p, classify(p).level)
    }

    /// Pixel on the bar radius at a given axis percentage.
    fn bar_pixel(img: &RasterImage, percent: f64) -> (u8, u8, u8) {
        let w = f64::from(img.width);
        let h = f64::from(img.height);
        let margin = (w.min(h) * 0.06).max(4.0);
        let radius = (w / 2.0 - margin).min(h - 2.0 * margin);
        let theta = PI * (1.0 - percent / 100.0);
        let r = radius * (BAR_INNER + BAR_OUTER) / 2.0;
        let x = w / 2.0 + r * theta.cos();
        let y = h - margin - r * theta.sin();
        img.pixel(x as u32, y as u32).unwrap()
    }

    #[test]
    fn test_rasterize_draws_bar_in_tier_color() {
        let chart = chart(0.5);
        let img = PixelGaugeRasterizer::default().rasterize(&chart).unwrap();
        assert!(img.is_consistent());
        assert_eq!(bar_pixel(&img, 25.0), chart.bar_color);
        // Past the value the band color shows through.
        assert_eq!(bar_pixel(&img, 60.0), chart.band_color_at(60.0));
        assert_eq!(bar_pixel(&img, 90.0), chart.band_color_at(90.0));
    }

    #[test]
    fn test_rasterize_draws_threshold_marker() {
        let chart = chart(0.1);
        let img = PixelGaugeRasterizer::default().rasterize(&chart).unwrap();
        assert_eq!(bar_pixel(&img, 70.0), chart.threshold_color);
    }

    #[test]
    fn test_rasterize_rejects_tiny_canvas() {
        let err = PixelGaugeRasterizer::new(10, 10)
            .rasterize(&chart(0.5))
            .expect_err("too small");
        assert!(matches!(err, ReportRenderError::Rasterization(_)));
    }

    #[test]
    fn test_rasterize_rejects_non_finite_value() {
        let mut chart = chart(0.5);
        chart.value = f64::NAN;
        assert!(PixelGaugeRasterizer::default().rasterize(&chart).is_err());
    }
}
