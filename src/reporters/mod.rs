//! Report output
//!
//! The canonical report is a JSON array of finding records in discovery
//! order. The reporter does no filtering, dedup, or sorting; it serializes
//! exactly what the analyzer collected.

pub mod json;
