//! jstaint - taint-tracking security scanner for JavaScript/JSX/TypeScript
//!
//! Pipeline: source text -> parse adapter (tree-sitter) -> single-pass
//! taint tracker -> rule battery gated on the taint set -> findings report.
//! Intraprocedural, single-pass, best-effort: no fixed point, no
//! interprocedural summaries, no cross-file flows.

pub mod analyzer;
pub mod cli;
pub mod error;
pub mod models;
pub mod parsers;
pub mod reporters;
