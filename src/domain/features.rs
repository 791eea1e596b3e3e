//! Feature encoding for the lung cancer classifier.
//!
//! The position of each value is a contract with the trained model; model
//! artifacts declare the encoding version and feature names they expect.

use serde::{Deserialize, Serialize};

use super::patient::{PatientInput, ValidationError};

/// Number of model inputs.
pub const FEATURE_COUNT: usize = 10;

/// Version of the ordinal mapping below. Bump whenever an ordinal or a
/// position changes.
pub const FEATURE_ENCODING_VERSION: u32 = 1;

/// Feature names in model order.
pub const FEATURE_NAMES: [&str; FEATURE_COUNT] = [
    "smoking",
    "breathing_issue",
    "throat_discomfort",
    "family_smoking",
    "energy",
    "immunity",
    "spo2",
    "family_cancer",
    "pollution",
    "age",
];

/// Encoded model input.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FeatureVector([f64; FEATURE_COUNT]);

impl FeatureVector {
    #[must_use]
    pub fn as_slice(&self) -> &[f64] {
        &self.0
    }

    #[must_use]
    pub fn values(&self) -> [f64; FEATURE_COUNT] {
        self.0
    }

    /// Value by feature name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<f64> {
        FEATURE_NAMES
            .iter()
            .position(|n| *n == name)
            .map(|i| self.0[i])
    }
}

/// Encode validated patient input into model order.
///
/// # Errors
/// Returns `ValidationError` if any field is outside its domain.
pub fn encode(input: &PatientInput) -> Result<FeatureVector, ValidationError> {
    input.validate()?;

    Ok(FeatureVector([
        f64::from(input.smoking.ordinal()),
        f64::from(u8::from(input.breathing_issue)),
        f64::from(u8::from(input.throat_discomfort)),
        f64::from(u8::from(input.family_smoking)),
        f64::from(input.energy),
        f64::from(input.immunity),
        f64::from(input.spo2),
        f64::from(u8::from(input.family_cancer)),
        f64::from(u8::from(input.pollution)),
        f64::from(input.age),
    ]))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::patient::{SmokingStatus, AGE_RANGE, ENERGY_RANGE, SPO2_RANGE};

    fn scenario_a() -> PatientInput {
        PatientInput {
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

    #[test]
    fn test_encode_contract_order() {
        let v = encode(&scenario_a()).expect("valid input");
        assert_eq!(
            v.values(),
            [2.0, 1.0, 1.0, 1.0, 4.0, 3.0, 91.0, 1.0, 1.0, 68.0]
        );
    }

    #[test]
    fn test_encode_distinguishes_family_fields() {
        let input = PatientInput {
            family_cancer: true,
            family_smoking: false,
            pollution: false,
            ..scenario_a()
        };
        let v = encode(&input).unwrap();
        assert_eq!(v.get("family_smoking"), Some(0.0));
        assert_eq!(v.get("family_cancer"), Some(1.0));
        assert_eq!(v.get("pollution"), Some(0.0));
        assert_eq!(v.get("unknown"), None);
    }

    #[test]
    fn test_encode_rejects_out_of_domain() {
        let input = PatientInput {
            age: 101,
            ..scenario_a()
        };
        assert!(encode(&input).is_err());

        let input = PatientInput {
            immunity: 0,
            ..scenario_a()
        };
        assert!(encode(&input).is_err());
    }

    #[test]
    fn test_encode_values_stay_in_domain() {
        for smoking in SmokingStatus::ALL {
            for flag in [false, true] {
                for age in [AGE_RANGE.0, 50, AGE_RANGE.1] {
                    for energy in [ENERGY_RANGE.0, ENERGY_RANGE.1] {
                        for spo2 in [SPO2_RANGE.0, SPO2_RANGE.1] {
                            let input = PatientInput {
                                smoking,
                                breathing_issue: flag,
                                throat_discomfort: !flag,
                                pollution: flag,
                                family_cancer: !flag,
                                family_smoking: flag,
                                age,
                                energy,
                                immunity: energy,
                                spo2,
                            };
                            let v = encode(&input).unwrap();
                            assert_eq!(v.as_slice().len(), FEATURE_COUNT);
                            assert!((0.0..=2.0).contains(&v.as_slice()[0]));
                            for idx in [1, 2, 3, 7, 8] {
                                assert!(v.as_slice()[idx] == 0.0 || v.as_slice()[idx] == 1.0);
                            }
                            assert!((1.0..=10.0).contains(&v.as_slice()[4]));
                            assert!((1.0..=10.0).contains(&v.as_slice()[5]));
                            assert!((85.0..=100.0).contains(&v.as_slice()[6]));
                            assert!((18.0..=100.0).contains(&v.as_slice()[9]));
                        }
                    }
                }
            }
        }
    }
}
