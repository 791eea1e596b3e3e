//! # AeroLung
//!
//! Lung cancer risk screening form for the terminal.
//!
//! This crate provides:
//! - Deterministic encoding of form answers into the classifier's feature order
//! - A typed adapter over an externally trained stacking-ensemble classifier
//! - Three-tier risk bucketing with clinical advice
//! - A risk gauge and a downloadable PDF report
//!
//! ## Architecture
//!
//! The crate follows Hexagonal Architecture:
//! - `domain`: Core types (patient input, feature vector, verdict, gauge)
//! - `ports`: Trait definitions for the model and chart rasterization
//! - `adapters`: Concrete implementations (JSON model artifact, pixel rasterizer, PDF, log sanitizer)
//! - `application`: Classifier adapter, report builder and session controller
//! - `tui`: Terminal user interface

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
pub mod tui;

pub use domain::{PatientInput, Probability, RiskLevel, RiskResult};

/// Result type for AeroLung operations
pub type Result<T> = std::result::Result<T, AeroLungError>;

/// Main error type for AeroLung
#[derive(Debug, thiserror::Error)]
pub enum AeroLungError {
    #[error(transparent)]
    Validation(#[from] domain::ValidationError),

    #[error("Risk model unavailable: {0}")]
    ModelUnavailable(String),

    #[error("Unable to calculate risk, please retry ({0})")]
    Inference(String),

    #[error("Report rendering failed: {0}")]
    ReportRender(#[from] ports::ReportRenderError),

    #[error("No risk result available; calculate risk before downloading a report")]
    ReportUnavailable,

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
