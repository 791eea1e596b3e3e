//! Domain layer: Core types and pure logic.
//!
//! No I/O happens here. Everything is deterministic and unit tested in place.

mod features;
mod gauge;
mod patient;
mod report;
mod risk;

pub use features::{encode, FeatureVector, FEATURE_COUNT, FEATURE_ENCODING_VERSION, FEATURE_NAMES};
pub use gauge::{render_gauge, GaugeBand, GaugeChart, GAUGE_BANDS, GAUGE_TITLE};
pub use patient::{
    parse_yes_no, yes_no, FormDefaults, PatientField, PatientInput, SmokingStatus,
    ValidationError,
};
pub use report::{
    RasterImage, ReportDocument, ReportFigure, ReportRow, DISCLAIMER, REPORT_SUBTITLE,
    REPORT_TITLE, TIMESTAMP_FORMAT,
};
pub use risk::{
    classify, Probability, RiskLevel, RiskResult, RiskVerdict, HIGH_THRESHOLD,
    MODERATE_THRESHOLD,
};
