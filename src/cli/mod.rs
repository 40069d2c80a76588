//! CLI command definition and handler

use crate::analyzer::{Analyzer, AnalyzerConfig, ErrorPolicy};
use crate::reporters;
use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use tracing::info;

/// jstaint - taint-tracking security scanner for JavaScript/JSX/TypeScript
///
/// Parses each source file, tracks which variables may hold
/// attacker-influenced values, and reports dangerous constructs
/// (dangerouslySetInnerHTML, eval, direct DOM writes, string setTimeout,
/// dynamic script sources) that are fed tainted data.
#[derive(Parser, Debug)]
#[command(name = "jstaint")]
#[command(
    version,
    about = "Taint-tracking security scanner for JavaScript, JSX, and TypeScript",
    after_help = "\
Examples:
  jstaint .                        Scan the current directory
  jstaint src -o report.json       Scan src/ and write the JSON report
  jstaint . --format compact       Single-line JSON on stdout
  jstaint . --on-error skip        Keep going past unparseable files"
)]
pub struct Cli {
    /// Path to a source directory or a single source file
    #[arg(default_value = ".")]
    pub path: PathBuf,

    /// Report file path (default: stdout)
    #[arg(long, short = 'o')]
    pub output: Option<PathBuf>,

    /// Output format
    #[arg(long, short = 'f', default_value = "json", value_parser = ["json", "compact"])]
    pub format: String,

    /// What to do when a file fails to parse or analyze
    #[arg(long, default_value = "abort", value_parser = ["abort", "skip"])]
    pub on_error: String,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long, default_value = "info", value_parser = ["error", "warn", "info", "debug", "trace"])]
    pub log_level: String,
}

/// Run a scan and emit one complete report, or fail with no report at all.
pub fn run(cli: Cli) -> Result<()> {
    let config = AnalyzerConfig {
        error_policy: match cli.on_error.as_str() {
            "skip" => ErrorPolicy::Skip,
            _ => ErrorPolicy::Abort,
        },
        ..Default::default()
    };
    let analyzer = Analyzer::new(config);

    let findings = if cli.path.is_file() {
        analyzer.analyze_file(&cli.path)
    } else {
        analyzer.analyze_dir(&cli.path)
    }
    .with_context(|| format!("analysis of {} failed", cli.path.display()))?;

    info!("{} finding(s) in {}", findings.len(), cli.path.display());

    match cli.output {
        Some(path) => {
            reporters::json::save(&findings, &path)?;
            info!("report saved to {}", path.display());
        }
        None => {
            let report = match cli.format.as_str() {
                "compact" => reporters::json::render_compact(&findings)?,
                _ => reporters::json::render(&findings)?,
            };
            println!("{report}");
        }
    }

    Ok(())
}
