//! Radial risk gauge description.
//!
//! Rendering backends (the TUI and the report rasterizer) draw from this
//! value; nothing here depends on a drawing library.

use super::risk::{Probability, RiskLevel, HIGH_THRESHOLD, MODERATE_THRESHOLD};

pub const GAUGE_TITLE: &str = "Lung Cancer Risk Probability";

/// Colored background range of the gauge, in percent.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GaugeBand {
    pub from: f64,
    pub to: f64,
    pub color: (u8, u8, u8),
}

impl GaugeBand {
    #[must_use]
    pub fn contains(&self, value: f64) -> bool {
        value >= self.from && value <= self.to
    }
}

/// Low / moderate / high background bands.
pub const GAUGE_BANDS: [GaugeBand; 3] = [
    GaugeBand {
        from: 0.0,
        to: MODERATE_THRESHOLD * 100.0,
        color: (220, 252, 231), // #DCFCE7
    },
    GaugeBand {
        from: MODERATE_THRESHOLD * 100.0,
        to: HIGH_THRESHOLD * 100.0,
        color: (254, 249, 195), // #FEF9C3
    },
    GaugeBand {
        from: HIGH_THRESHOLD * 100.0,
        to: 100.0,
        color: (254, 202, 202), // #FECACA
    },
];

/// Threshold marker color.
pub const THRESHOLD_COLOR: (u8, u8, u8) = (255, 0, 0);

/// Gauge chart for one probability.
#[derive(Debug, Clone, PartialEq)]
pub struct GaugeChart {
    pub title: &'static str,
    /// Needle/bar value in percent, one decimal
    pub value: f64,
    pub min: f64,
    pub max: f64,
    pub bar_color: (u8, u8, u8),
    pub bands: [GaugeBand; 3],
    /// Threshold marker position in percent
    pub threshold: f64,
    pub threshold_color: (u8, u8, u8),
}

impl GaugeChart {
    /// Value as a fraction of the axis, clamped to [0, 1].
    #[must_use]
    pub fn fraction(&self) -> f64 {
        let span = self.max - self.min;
        if span <= 0.0 {
            return 0.0;
        }
        ((self.value - self.min) / span).clamp(0.0, 1.0)
    }

    /// Background band color at `value`.
    #[must_use]
    pub fn band_color_at(&self, value: f64) -> (u8, u8, u8) {
        self.bands
            .iter()
            .find(|b| b.contains(value))
            .map_or(self.bands[self.bands.len() - 1].color, |b| b.color)
    }
}

/// Build the gauge for a probability; the bar takes the tier color.
#[must_use]
pub fn render_gauge(p: Probability, level: RiskLevel) -> GaugeChart {
    GaugeChart {
        title: GAUGE_TITLE,
        value: p.percent(),
        min: 0.0,
        max: 100.0,
        bar_color: level.color(),
        bands: GAUGE_BANDS,
        threshold: HIGH_THRESHOLD * 100.0,
        threshold_color: THRESHOLD_COLOR,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::risk::classify;

    #[test]
    fn test_gauge_bar_follows_tier() {
        let p = Probability::new(0.5).unwrap();
        let chart = render_gauge(p, classify(p).level);
        assert_eq!(chart.bar_color, RiskLevel::Moderate.color());
        assert!((chart.value - 50.0).abs() < 1e-9);
        assert!((chart.threshold - 70.0).abs() < 1e-9);
    }

    #[test]
    fn test_bands_cover_axis() {
        let chart = render_gauge(Probability::new(0.1).unwrap(), RiskLevel::Low);
        assert_eq!(chart.band_color_at(10.0), (220, 252, 231));
        assert_eq!(chart.band_color_at(50.0), (254, 249, 195));
        assert_eq!(chart.band_color_at(95.0), (254, 202, 202));
        assert!((chart.bands[0].to - 30.0).abs() < 1e-9);
        assert!((chart.bands[2].from - 70.0).abs() < 1e-9);
    }

    #[test]
    fn test_fraction() {
        let chart = render_gauge(Probability::new(0.834).unwrap(), RiskLevel::High);
        assert!((chart.value - 83.4).abs() < 1e-9);
        assert!((chart.fraction() - 0.834).abs() < 1e-9);
    }

    #[test]
    fn test_label_matches_gauge_value() {
        let p = Probability::new(0.0015).unwrap();
        assert_eq!(p.to_string(), "0.2%");
        assert_eq!(format!("{:.1}%", render_gauge(p, RiskLevel::Low).value), "0.2%");

        for i in 0..=100_000 {
            let p = Probability::new(f64::from(i) / 100_000.0).unwrap();
            let chart = render_gauge(p, classify(p).level);
            assert_eq!(p.to_string(), format!("{:.1}%", chart.value), "p={}", p.value());
        }
    }
}
