//! JSON reporter
//!
//! Serializes the finding sequence as a pretty-printed JSON array with
//! stable field order and explicit nulls for missing locations. The whole
//! sequence is finalized first, then written once; there is no streaming or
//! partial write.

use crate::models::Finding;
use anyhow::{Context, Result};
use std::path::Path;

/// Render findings as the canonical pretty-printed report.
pub fn render(findings: &[Finding]) -> Result<String> {
    Ok(serde_json::to_string_pretty(findings)?)
}

/// Render findings as compact JSON (single line).
pub fn render_compact(findings: &[Finding]) -> Result<String> {
    Ok(serde_json::to_string(findings)?)
}

/// Write the finalized report to a file in one shot.
pub fn save(findings: &[Finding], path: &Path) -> Result<()> {
    let report = render(findings)?;
    std::fs::write(path, report)
        .with_context(|| format!("failed to write report to {}", path.display()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Vec<Finding> {
        vec![
            Finding::new(
                "src/App.jsx",
                "DangerouslySetInnerHTML",
                "Potential XSS vulnerability: dangerouslySetInnerHTML found.",
                Some(14),
                Some(11),
            ),
            Finding::new("src/App.jsx", "Eval Usage", "msg", None, None),
        ]
    }

    #[test]
    fn test_render_is_a_json_array_in_discovery_order() {
        let report = render(&sample()).expect("render");
        let parsed: serde_json::Value = serde_json::from_str(&report).expect("valid JSON");
        let records = parsed.as_array().expect("array");
        assert_eq!(records.len(), 2);
        assert_eq!(records[0]["check"], "DangerouslySetInnerHTML");
        assert_eq!(records[1]["line"], serde_json::Value::Null);
    }

    #[test]
    fn test_render_is_pretty_printed() {
        let report = render(&sample()).expect("render");
        assert!(report.contains('\n'));
        let compact = render_compact(&sample()).expect("render compact");
        assert!(!compact.contains('\n'));
    }

    #[test]
    fn test_empty_report_is_an_empty_array() {
        assert_eq!(render_compact(&[]).expect("render"), "[]");
    }

    #[test]
    fn test_save_writes_whole_report_once() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("report.json");
        save(&sample(), &path).expect("save");
        let written = std::fs::read_to_string(&path).expect("read back");
        assert_eq!(written, render(&sample()).expect("render"));
    }
}
