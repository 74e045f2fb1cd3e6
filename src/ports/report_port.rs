//! Report writing port trait.

use crate::domain::error::TestfolioError;
use std::path::Path;

/// Port for writing serialized run results.
pub trait ReportPort {
    fn write(&self, report: &serde_json::Value, output_path: &Path) -> Result<(), TestfolioError>;
}
