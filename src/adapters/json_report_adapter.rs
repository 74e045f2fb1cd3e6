//! JSON file report adapter.

use crate::domain::error::TestfolioError;
use crate::ports::report_port::ReportPort;
use std::fs;
use std::path::Path;

pub struct JsonReportAdapter;

impl ReportPort for JsonReportAdapter {
    fn write(&self, report: &serde_json::Value, output_path: &Path) -> Result<(), TestfolioError> {
        let content =
            serde_json::to_string_pretty(report).map_err(|e| TestfolioError::Data {
                reason: format!("failed to serialize report: {}", e),
            })?;
        fs::write(output_path, content).map_err(|e| TestfolioError::Io {
            reason: format!("failed to write {}: {}", output_path.display(), e),
        })?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    #[test]
    fn write_produces_parseable_json() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("report.json");
        let report = json!({
            "results": [{"name": "60/40", "total_return": 0.12, "sharpe": null}]
        });

        JsonReportAdapter.write(&report, &path).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&content).unwrap();
        assert_eq!(parsed, report);
        assert!(content.contains("null"));
    }

    #[test]
    fn write_to_bad_path_is_io_error() {
        let report = json!({});
        let err = JsonReportAdapter
            .write(&report, Path::new("/nonexistent/dir/report.json"))
            .unwrap_err();
        assert!(matches!(err, TestfolioError::Io { .. }));
    }
}
