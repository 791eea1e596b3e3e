//! Ports layer: Trait definitions for external collaborators.
//!
//! Following Hexagonal Architecture, these traits define the boundaries
//! between the application and the trained model, the chart renderer and
//! the document writer.

mod classifier;
mod report;

pub use classifier::{ModelError, ModelLoader, RiskModel, POSITIVE_CLASS};
pub use report::{ChartRasterizer, ReportRenderError, ReportWriter};
