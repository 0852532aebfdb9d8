//! Check operation - generation without output.

use std::path::Path;

use eyre::Result;

use super::{Settings, generate};
use crate::reports::CheckReport;

/// Execute the check operation.
///
/// Runs a full generation and keeps only its diagnostics and counts.
pub fn check(template_path: &Path, settings: &Settings) -> Result<CheckReport> {
    let generation = generate(template_path, settings)?;
    Ok(CheckReport::new(template_path, &generation))
}
