//! Registry of known sanitization functions
//!
//! A call whose fully-qualified callee name is in the registry is treated as
//! taint-clearing: its result is never tainted, regardless of arguments.
//! Lookup is exact string match only; no wildcards and no type-based
//! resolution.

/// Callee names recognized as sanitizers by default.
const DEFAULT_SANITIZERS: &[&str] = &["DOMPurify.sanitize", "sanitizeHtml", "escapeHtml"];

/// Immutable set of fully-qualified sanitizer callee names.
///
/// Injected through `AnalyzerConfig` rather than held as a process global,
/// so project-specific sanitizer lists can coexist in one process.
#[derive(Debug, Clone)]
pub struct SanitizerRegistry {
    names: Vec<String>,
}

impl SanitizerRegistry {
    /// Build a registry from an explicit list of callee names.
    pub fn new(names: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            names: names.into_iter().map(Into::into).collect(),
        }
    }

    /// Exact-match lookup on a fully-qualified callee name.
    pub fn contains(&self, callee: &str) -> bool {
        self.names.iter().any(|n| n == callee)
    }
}

impl Default for SanitizerRegistry {
    fn default() -> Self {
        Self::new(DEFAULT_SANITIZERS.iter().copied())
    }
}
