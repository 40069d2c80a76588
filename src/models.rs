//! Core data models for jstaint
//!
//! A `Finding` is one reported vulnerability match. Findings are immutable
//! once created and are collected in discovery order: files in walk order,
//! rules in battery order within a file, matches in document order within a
//! rule. The reporter never deduplicates or sorts them.

use serde::{Deserialize, Serialize};

/// One located, named vulnerability match.
///
/// Field order is the serialization order of the report records; `line` is
/// 1-based, `column` is 0-based, and both serialize as `null` when the
/// matched node had no source location.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Finding {
    pub file: String,
    pub check: String,
    pub message: String,
    pub line: Option<u32>,
    pub column: Option<u32>,
}

impl Finding {
    pub fn new(
        file: impl Into<String>,
        check: impl Into<String>,
        message: impl Into<String>,
        line: Option<u32>,
        column: Option<u32>,
    ) -> Self {
        Self {
            file: file.into(),
            check: check.into(),
            message: message.into(),
            line,
            column,
        }
    }

    /// Human-readable location, for the diagnostic stream.
    pub fn location(&self) -> String {
        match (self.line, self.column) {
            (Some(line), Some(column)) => format!("Line {}, Column {}", line, column),
            _ => "Location unavailable".to_string(),
        }
    }
}
