//! Integrity manifest utility for AeroLung model artifacts.
//!
//! Writes `manifest.json` next to `model.json`, binding it by SHA-256 so the
//! application refuses a model that was modified after export.
//!
//! # Usage
//!
//! ```bash
//! cargo run --bin write_manifest -- <model_dir | model.json>
//! ```

use std::env;
use std::path::PathBuf;

use anyhow::{bail, Result};

use aerolung::adapters::model::write_manifest;

fn usage() -> String {
    "Usage: write_manifest <model_dir | model.json>".to_string()
}

fn parse_args() -> Result<PathBuf> {
    let mut args = env::args().skip(1);
    let path = match args.next().as_deref() {
        None | Some("-h") | Some("--help") => bail!(usage()),
        Some(p) => PathBuf::from(p),
    };
    if args.next().is_some() {
        bail!(usage());
    }
    Ok(path)
}

fn main() -> Result<()> {
    let model_path = parse_args()?;
    let manifest = write_manifest(&model_path)?;
    println!("Wrote manifest: {}", manifest.display());
    Ok(())
}
