//! Adapters layer: concrete implementations of the ports.
//!
//! - `model`: stacking-ensemble artifact loader and scorer (serde_json, sha2)
//! - `raster`: pixel gauge rasterizer
//! - `pdf`: report writer (lopdf)
//! - `sanitize`: patient-data filtering for logs

pub mod model;
pub mod pdf;
pub mod raster;
pub mod sanitize;
