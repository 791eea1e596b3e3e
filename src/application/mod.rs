//! Application layer: use cases over the domain and the ports.
//!
//! Wires the classifier adapter, the report builder and the session
//! controller that runs the submit pipeline.

mod classifier;
mod report;
mod session;

pub use classifier::RiskClassifier;
pub use report::ReportBuilder;
pub use session::Session;
