//! Risk probability, verdict and result types.

use serde::{Deserialize, Serialize};

use super::gauge::GaugeChart;
use super::patient::PatientInput;

/// Probabilities below this are Low risk.
pub const MODERATE_THRESHOLD: f64 = 0.30;

/// Probabilities at or above this are High risk.
pub const HIGH_THRESHOLD: f64 = 0.70;

/// Positive-class probability, finite and within [0, 1].
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize)]
pub struct Probability(f64);

impl Probability {
    /// Returns `None` for NaN, infinities and values outside [0, 1].
    #[must_use]
    pub fn new(value: f64) -> Option<Self> {
        (value.is_finite() && (0.0..=1.0).contains(&value)).then_some(Self(value))
    }

    #[must_use]
    pub fn value(self) -> f64 {
        self.0
    }

    /// Percentage rounded to one decimal place.
    #[must_use]
    pub fn percent(self) -> f64 {
        (self.0 * 1000.0).round() / 10.0
    }
}

impl std::fmt::Display for Probability {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.1}%", self.percent())
    }
}

/// Three-tier lung cancer risk classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RiskLevel {
    /// Routine screening
    Low,
    /// Imaging and specialist referral
    Moderate,
    /// Urgent referral
    High,
}

impl RiskLevel {
    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            Self::Low => "Low Risk",
            Self::Moderate => "Moderate Risk",
            Self::High => "High Risk",
        }
    }

    /// Clinical recommendation for this tier.
    #[must_use]
    pub fn advice(&self) -> &'static str {
        match self {
            Self::Low => "Continue healthy lifestyle and annual screening.",
            Self::Moderate => "Recommend low-dose CT scan and pulmonologist consultation.",
            Self::High => "Urgent: Schedule chest CT and oncology referral immediately.",
        }
    }

    /// Tier color (RGB).
    #[must_use]
    pub fn color(&self) -> (u8, u8, u8) {
        match self {
            Self::Low => (22, 163, 74),      // #16A34A
            Self::Moderate => (202, 138, 4), // #CA8A04
            Self::High => (220, 38, 38),     // #DC2626
        }
    }

    /// Tier color as `#rrggbb`.
    #[must_use]
    pub fn hex_color(&self) -> String {
        let (r, g, b) = self.color();
        format!("#{r:02x}{g:02x}{b:02x}")
    }
}

impl std::fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Level plus the advice text that goes with it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RiskVerdict {
    pub level: RiskLevel,
    pub advice: &'static str,
}

/// Bucket a probability into a verdict.
///
/// Lower bounds are inclusive: 0.30 is Moderate, 0.70 is High.
#[must_use]
pub fn classify(p: Probability) -> RiskVerdict {
    let level = if p.value() < MODERATE_THRESHOLD {
        RiskLevel::Low
    } else if p.value() < HIGH_THRESHOLD {
        RiskLevel::Moderate
    } else {
        RiskLevel::High
    };

    RiskVerdict {
        level,
        advice: level.advice(),
    }
}

/// Outcome of one successful "Calculate Risk" submission.
#[derive(Debug, Clone, PartialEq)]
pub struct RiskResult {
    pub probability: Probability,
    pub verdict: RiskVerdict,
    pub chart: GaugeChart,
    /// Snapshot of the submitted form
    pub input: PatientInput,
    pub assessed_at: chrono::DateTime<chrono::Local>,
}

impl RiskResult {
    #[must_use]
    pub fn level(&self) -> RiskLevel {
        self.verdict.level
    }

    #[must_use]
    pub fn advice(&self) -> &'static str {
        self.verdict.advice
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn level_of(p: f64) -> RiskLevel {
        classify(Probability::new(p).expect("valid probability")).level
    }

    #[test]
    fn test_boundaries_are_exact() {
        assert_eq!(level_of(0.0), RiskLevel::Low);
        assert_eq!(level_of(0.2999), RiskLevel::Low);
        assert_eq!(level_of(0.3), RiskLevel::Moderate);
        assert_eq!(level_of(0.6999), RiskLevel::Moderate);
        assert_eq!(level_of(0.7), RiskLevel::High);
        assert_eq!(level_of(1.0), RiskLevel::High);
    }

    #[test]
    fn test_classify_is_monotonic() {
        let mut last = RiskLevel::Low;
        for i in 0..=1000 {
            let level = level_of(f64::from(i) / 1000.0);
            let rank = |l: RiskLevel| match l {
                RiskLevel::Low => 0,
                RiskLevel::Moderate => 1,
                RiskLevel::High => 2,
            };
            assert!(rank(level) >= rank(last));
            last = level;
        }
    }

    #[test]
    fn test_classify_is_pure() {
        let p = Probability::new(0.42).unwrap();
        assert_eq!(classify(p), classify(p));
        assert_eq!(classify(p).advice, RiskLevel::Moderate.advice());
    }

    #[test]
    fn test_probability_rejects_invalid_values() {
        assert!(Probability::new(-0.01).is_none());
        assert!(Probability::new(1.01).is_none());
        assert!(Probability::new(f64::NAN).is_none());
        assert!(Probability::new(f64::INFINITY).is_none());
    }

    #[test]
    fn test_probability_formatting() {
        let p = Probability::new(0.8347).unwrap();
        assert_eq!(p.to_string(), "83.5%");
        assert!((p.percent() - 83.5).abs() < 1e-9);
    }

    #[test]
    fn test_tier_colors() {
        assert_eq!(RiskLevel::Low.hex_color(), "#16a34a");
        assert_eq!(RiskLevel::Moderate.hex_color(), "#ca8a04");
        assert_eq!(RiskLevel::High.hex_color(), "#dc2626");
    }
}
