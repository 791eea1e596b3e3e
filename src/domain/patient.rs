//! Patient risk factors collected by the screening form.
//!
//! Six categorical selectors (smoking status plus five No/Yes questions) and
//! four bounded integer sliders.

use serde::{Deserialize, Serialize};

/// Allowed age range in years (inclusive).
pub const AGE_RANGE: (u8, u8) = (18, 100);

/// Allowed energy level range (1 = very low, 10 = high).
pub const ENERGY_RANGE: (u8, u8) = (1, 10);

/// Allowed stress & immune health range (1 = poor, 10 = excellent).
pub const IMMUNITY_RANGE: (u8, u8) = (1, 10);

/// Allowed resting SpO2 range in percent.
pub const SPO2_RANGE: (u8, u8) = (85, 100);

/// Labels of the No/Yes selectors, indexed by ordinal.
pub const YES_NO_LABELS: [&str; 2] = ["No", "Yes"];

/// Out-of-domain patient input.
///
/// Lists every offending field, not just the first one.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid patient input: {}", .issues.join(", "))]
pub struct ValidationError {
    pub issues: Vec<String>,
}

impl ValidationError {
    pub fn single(issue: impl Into<String>) -> Self {
        Self {
            issues: vec![issue.into()],
        }
    }
}

/// Smoking status selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SmokingStatus {
    Never,
    Former,
    Current,
}

impl SmokingStatus {
    /// All statuses in ordinal order.
    pub const ALL: [SmokingStatus; 3] = [Self::Never, Self::Former, Self::Current];

    /// Ordinal the classifier was trained with (Never=0, Former=1, Current=2).
    #[must_use]
    pub fn ordinal(self) -> u8 {
        match self {
            Self::Never => 0,
            Self::Former => 1,
            Self::Current => 2,
        }
    }

    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Never => "Never",
            Self::Former => "Former",
            Self::Current => "Current",
        }
    }

    /// Parse a selector label (case-insensitive).
    ///
    /// # Errors
    /// Returns `ValidationError` for labels outside Never/Former/Current.
    pub fn from_label(label: &str) -> Result<Self, ValidationError> {
        Self::ALL
            .into_iter()
            .find(|s| s.label().eq_ignore_ascii_case(label.trim()))
            .ok_or_else(|| {
                ValidationError::single(format!(
                    "Smoking Status: unknown option {label:?} (expected Never, Former or Current)"
                ))
            })
    }

    /// Next option, wrapping around.
    #[must_use]
    pub fn next(self) -> Self {
        Self::ALL[(usize::from(self.ordinal()) + 1) % Self::ALL.len()]
    }

    /// Previous option, wrapping around.
    #[must_use]
    pub fn prev(self) -> Self {
        let len = Self::ALL.len();
        Self::ALL[(usize::from(self.ordinal()) + len - 1) % len]
    }
}

impl std::fmt::Display for SmokingStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Display label of a No/Yes answer.
#[must_use]
pub fn yes_no(value: bool) -> &'static str {
    YES_NO_LABELS[usize::from(value)]
}

/// Parse a No/Yes label (case-insensitive).
///
/// # Errors
/// Returns `ValidationError` for anything other than "No" or "Yes".
pub fn parse_yes_no(label: &str) -> Result<bool, ValidationError> {
    match label.trim().to_ascii_lowercase().as_str() {
        "no" => Ok(false),
        "yes" => Ok(true),
        other => Err(ValidationError::single(format!(
            "unknown option {other:?} (expected No or Yes)"
        ))),
    }
}

/// Form fields in the order they appear on screen and in the report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PatientField {
    Smoking,
    BreathingIssue,
    ThroatDiscomfort,
    Pollution,
    FamilyCancer,
    FamilySmoking,
    Age,
    Energy,
    Immunity,
    Spo2,
}

impl PatientField {
    pub const ALL: [PatientField; 10] = [
        Self::Smoking,
        Self::BreathingIssue,
        Self::ThroatDiscomfort,
        Self::Pollution,
        Self::FamilyCancer,
        Self::FamilySmoking,
        Self::Age,
        Self::Energy,
        Self::Immunity,
        Self::Spo2,
    ];

    /// Label shown to the user on the form and in the report.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Smoking => "Smoking Status",
            Self::BreathingIssue => "Chronic Breathing Difficulty",
            Self::ThroatDiscomfort => "Frequent Throat Irritation",
            Self::Pollution => "High Pollution Exposure",
            Self::FamilyCancer => "Family History of Lung Cancer",
            Self::FamilySmoking => "Family History of Heavy Smoking",
            Self::Age => "Age",
            Self::Energy => "Energy Level (1=Very Low → 10=High)",
            Self::Immunity => "Stress & Immune Health (1=Poor → 10=Excellent)",
            Self::Spo2 => "Resting SpO₂ (%)",
        }
    }

    /// Inclusive bounds for slider fields, `None` for selectors.
    #[must_use]
    pub fn range(self) -> Option<(u8, u8)> {
        match self {
            Self::Age => Some(AGE_RANGE),
            Self::Energy => Some(ENERGY_RANGE),
            Self::Immunity => Some(IMMUNITY_RANGE),
            Self::Spo2 => Some(SPO2_RANGE),
            _ => None,
        }
    }

    #[must_use]
    pub fn is_slider(self) -> bool {
        self.range().is_some()
    }
}

/// Defaults used each time a fresh form is rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormDefaults {
    pub smoking: SmokingStatus,
    pub breathing_issue: bool,
    pub throat_discomfort: bool,
    pub pollution: bool,
    pub family_cancer: bool,
    pub family_smoking: bool,
    pub age: u8,
    pub energy: u8,
    pub immunity: u8,
    pub spo2: u8,
}

impl Default for FormDefaults {
    fn default() -> Self {
        Self {
            smoking: SmokingStatus::Current,
            breathing_issue: true,
            throat_discomfort: true,
            pollution: true,
            family_cancer: true,
            family_smoking: true,
            age: 68,
            energy: 4,
            immunity: 3,
            spo2: 91,
        }
    }
}

impl FormDefaults {
    /// Set both family-history selectors at once.
    #[must_use]
    pub fn with_family_history(mut self, value: bool) -> Self {
        self.family_cancer = value;
        self.family_smoking = value;
        self
    }
}

/// Raw patient input from the form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatientInput {
    pub smoking: SmokingStatus,
    pub breathing_issue: bool,
    pub throat_discomfort: bool,
    pub pollution: bool,
    pub family_cancer: bool,
    pub family_smoking: bool,
    /// Age in years (18-100)
    pub age: u8,
    /// Energy level (1-10)
    pub energy: u8,
    /// Stress & immune health score (1-10)
    pub immunity: u8,
    /// Resting oxygen saturation in percent (85-100)
    pub spo2: u8,
}

impl Default for PatientInput {
    fn default() -> Self {
        Self::from_defaults(&FormDefaults::default())
    }
}

impl PatientInput {
    #[must_use]
    pub fn from_defaults(defaults: &FormDefaults) -> Self {
        Self {
            smoking: defaults.smoking,
            breathing_issue: defaults.breathing_issue,
            throat_discomfort: defaults.throat_discomfort,
            pollution: defaults.pollution,
            family_cancer: defaults.family_cancer,
            family_smoking: defaults.family_smoking,
            age: defaults.age,
            energy: defaults.energy,
            immunity: defaults.immunity,
            spo2: defaults.spo2,
        }
    }

    /// Display value of a field, as shown on the form and in the report.
    #[must_use]
    pub fn display_value(&self, field: PatientField) -> String {
        match field {
            PatientField::Smoking => self.smoking.label().to_string(),
            PatientField::BreathingIssue => yes_no(self.breathing_issue).to_string(),
            PatientField::ThroatDiscomfort => yes_no(self.throat_discomfort).to_string(),
            PatientField::Pollution => yes_no(self.pollution).to_string(),
            PatientField::FamilyCancer => yes_no(self.family_cancer).to_string(),
            PatientField::FamilySmoking => yes_no(self.family_smoking).to_string(),
            PatientField::Age => self.age.to_string(),
            PatientField::Energy => self.energy.to_string(),
            PatientField::Immunity => self.immunity.to_string(),
            PatientField::Spo2 => self.spo2.to_string(),
        }
    }

    /// Current value of a slider field; `None` for selectors.
    #[must_use]
    pub fn slider_value(&self, field: PatientField) -> Option<u8> {
        match field {
            PatientField::Age => Some(self.age),
            PatientField::Energy => Some(self.energy),
            PatientField::Immunity => Some(self.immunity),
            PatientField::Spo2 => Some(self.spo2),
            _ => None,
        }
    }

    fn slider_mut(&mut self, field: PatientField) -> Option<&mut u8> {
        match field {
            PatientField::Age => Some(&mut self.age),
            PatientField::Energy => Some(&mut self.energy),
            PatientField::Immunity => Some(&mut self.immunity),
            PatientField::Spo2 => Some(&mut self.spo2),
            _ => None,
        }
    }

    fn toggle_mut(&mut self, field: PatientField) -> Option<&mut bool> {
        match field {
            PatientField::BreathingIssue => Some(&mut self.breathing_issue),
            PatientField::ThroatDiscomfort => Some(&mut self.throat_discomfort),
            PatientField::Pollution => Some(&mut self.pollution),
            PatientField::FamilyCancer => Some(&mut self.family_cancer),
            PatientField::FamilySmoking => Some(&mut self.family_smoking),
            _ => None,
        }
    }

    /// Step a field by `delta`.
    ///
    /// Selectors cycle through their options; sliders move and clamp to
    /// their bounds.
    pub fn step(&mut self, field: PatientField, delta: i32) {
        if field == PatientField::Smoking {
            let steps = delta.unsigned_abs() % SmokingStatus::ALL.len() as u32;
            for _ in 0..steps {
                self.smoking = if delta > 0 {
                    self.smoking.next()
                } else {
                    self.smoking.prev()
                };
            }
        } else if let Some(flag) = self.toggle_mut(field) {
            if delta % 2 != 0 {
                *flag = !*flag;
            }
        } else if let (Some((min, max)), Some(value)) = (field.range(), self.slider_mut(field)) {
            let next = (i32::from(*value) + delta).clamp(i32::from(min), i32::from(max));
            // Clamped into a u8 range above.
            *value = next as u8;
        }
    }

    /// Move a slider to its lower or upper bound. No-op for selectors.
    pub fn jump_to_bound(&mut self, field: PatientField, upper: bool) {
        if let (Some((min, max)), Some(value)) = (field.range(), self.slider_mut(field)) {
            *value = if upper { max } else { min };
        }
    }

    /// Validate that every slider is within its declared domain.
    ///
    /// # Errors
    /// Returns a `ValidationError` listing each out-of-range field.
    pub fn validate(&self) -> Result<(), ValidationError> {
        let mut issues = Vec::new();

        for field in PatientField::ALL {
            let (Some((min, max)), Some(value)) = (field.range(), self.slider_value(field)) else {
                continue;
            };
            if !(min..=max).contains(&value) {
                issues.push(format!(
                    "{}: {} out of range [{}, {}]",
                    field.label(),
                    value,
                    min,
                    max
                ));
            }
        }

        if issues.is_empty() {
            Ok(())
        } else {
            Err(ValidationError { issues })
        }
    }
}
