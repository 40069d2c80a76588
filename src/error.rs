//! Error taxonomy for single-file analysis
//!
//! A file either analyzes to completion or fails with one of these errors.
//! Nothing here is retried; the walk layer decides (per `ErrorPolicy`)
//! whether a failed file aborts the run or is skipped.

use std::path::PathBuf;
use thiserror::Error;

/// Errors produced while analyzing one source file
#[derive(Debug, Error)]
pub enum AnalyzeError {
    /// Source text is not syntactically valid under the selected grammar.
    /// Carries the location of the first error node.
    #[error("parse error in {file} at line {line}, column {column}")]
    Parse {
        file: PathBuf,
        line: u32,
        column: u32,
    },

    /// A state-hook call whose destructuring pattern does not bind both a
    /// state name and a setter name (e.g. `const [x] = useState()`).
    #[error("malformed state hook destructuring in {file} at line {line}")]
    MalformedHookBinding { file: PathBuf, line: u32 },

    /// The tree-sitter grammar could not be loaded into the parser.
    #[error("failed to load parser grammar")]
    Language(#[from] tree_sitter::LanguageError),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
