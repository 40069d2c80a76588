//! Analysis driver: per-file pipeline and directory walk
//!
//! Each file is parsed, taint-tracked, and rule-checked to completion
//! before the next file begins. The taint set and hook bindings are created
//! fresh per file and discarded afterwards, so files are analyzed in
//! isolation and cross-file taint flows do not exist.

pub mod rules;
pub mod sanitizers;
pub mod taint;

use crate::error::AnalyzeError;
use crate::models::Finding;
use crate::parsers;
use sanitizers::SanitizerRegistry;
use std::path::Path;
use taint::{CallTaintPolicy, TaintPass};
use tracing::{debug, warn};
use walkdir::WalkDir;

/// Directory name skipped during the walk.
const SKIPPED_DIR: &str = "node_modules";

/// What a multi-file scan does when one file fails to analyze.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ErrorPolicy {
    /// One broken file aborts the whole run (compatibility default).
    #[default]
    Abort,
    /// Log the failure and continue with the remaining files.
    Skip,
}

/// Analysis configuration: sanitizer list, call-taint policy, and the
/// broken-file policy. All immutable for the lifetime of the analyzer.
#[derive(Debug, Clone, Default)]
pub struct AnalyzerConfig {
    pub sanitizers: SanitizerRegistry,
    pub call_taint_policy: CallTaintPolicy,
    pub error_policy: ErrorPolicy,
}

/// The taint analyzer. Single-threaded and synchronous; no shared state
/// between files.
pub struct Analyzer {
    config: AnalyzerConfig,
}

impl Analyzer {
    pub fn new(config: AnalyzerConfig) -> Self {
        Self { config }
    }

    /// Analyze source text directly, as if read from `path`.
    pub fn analyze_source(
        &self,
        source: String,
        path: &Path,
        ext: &str,
    ) -> Result<Vec<Finding>, AnalyzeError> {
        let parsed = parsers::parse_source(source, path, ext)?;

        let mut pass = TaintPass::new(
            &parsed,
            path,
            &self.config.sanitizers,
            self.config.call_taint_policy,
        );
        pass.run()?;

        Ok(rules::run(&parsed, &pass, &path.display().to_string()))
    }

    /// Analyze one file: read, parse, taint pass, rule battery.
    pub fn analyze_file(&self, path: &Path) -> Result<Vec<Finding>, AnalyzeError> {
        debug!("analyzing {}", path.display());
        let source = std::fs::read_to_string(path)?;
        let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");
        self.analyze_source(source, path, ext)
    }

    /// Analyze every source file under `root`.
    ///
    /// Depth-first walk in sorted order (so repeated runs over an unchanged
    /// tree produce byte-identical reports), skipping any directory named
    /// `node_modules` and visiting all others, hidden ones included.
    pub fn analyze_dir(&self, root: &Path) -> Result<Vec<Finding>, AnalyzeError> {
        let mut findings = Vec::new();

        let walker = WalkDir::new(root)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|entry| !(entry.file_type().is_dir() && entry.file_name() == SKIPPED_DIR));

        for entry in walker {
            let entry = entry.map_err(|e| AnalyzeError::Io(e.into()))?;
            if !entry.file_type().is_file() || !parsers::is_source_file(entry.path()) {
                continue;
            }

            match self.analyze_file(entry.path()) {
                Ok(file_findings) => findings.extend(file_findings),
                Err(err) => match self.config.error_policy {
                    ErrorPolicy::Abort => return Err(err),
                    ErrorPolicy::Skip => {
                        warn!("skipping {}: {}", entry.path().display(), err);
                    }
                },
            }
        }

        Ok(findings)
    }
}

impl Default for Analyzer {
    fn default() -> Self {
        Self::new(AnalyzerConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::path::PathBuf;

    const VULNERABLE: &str = "\
const [userInput, setUserInput] = useState('');
const handleChange = (e) => { setUserInput(e.target.value); };
const el = <div dangerouslySetInnerHTML={{ __html: userInput }} />;
";

    fn write(dir: &Path, name: &str, content: &str) -> PathBuf {
        let path = dir.join(name);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("create parent dirs");
        }
        fs::write(&path, content).expect("write fixture");
        path
    }

    #[test]
    fn test_analyze_source_end_to_end() {
        let analyzer = Analyzer::default();
        let findings = analyzer
            .analyze_source(VULNERABLE.to_string(), &PathBuf::from("App.jsx"), "jsx")
            .expect("analysis");
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].check, "DangerouslySetInnerHTML");
        assert_eq!(findings[0].file, "App.jsx");
    }

    #[test]
    fn test_walk_skips_node_modules_and_visits_hidden_dirs() {
        let dir = tempfile::tempdir().expect("tempdir");
        write(dir.path(), "node_modules/dep/index.js", "setTimeout('x()', 1);");
        write(dir.path(), ".hidden/app.jsx", "setTimeout('x()', 1);");
        write(dir.path(), "src/main.js", "setTimeout('x()', 1);");
        write(dir.path(), "src/readme.md", "setTimeout('x()', 1);");

        let analyzer = Analyzer::default();
        let findings = analyzer.analyze_dir(dir.path()).expect("walk");

        assert_eq!(findings.len(), 2);
        assert!(findings.iter().all(|f| !f.file.contains("node_modules")));
        assert!(findings.iter().any(|f| f.file.contains(".hidden")));
    }

    #[test]
    fn test_abort_policy_fails_whole_run_on_parse_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        write(dir.path(), "bad.js", "const = {{{");
        write(dir.path(), "good.js", "setTimeout('x()', 1);");

        let analyzer = Analyzer::default();
        let err = analyzer.analyze_dir(dir.path()).expect_err("abort");
        assert!(matches!(err, AnalyzeError::Parse { .. }));
    }

    #[test]
    fn test_skip_policy_continues_past_parse_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        write(dir.path(), "bad.js", "const = {{{");
        write(dir.path(), "good.js", "setTimeout('x()', 1);");

        let analyzer = Analyzer::new(AnalyzerConfig {
            error_policy: ErrorPolicy::Skip,
            ..Default::default()
        });
        let findings = analyzer.analyze_dir(dir.path()).expect("skip policy");
        assert_eq!(findings.len(), 1);
        assert!(findings[0].file.ends_with("good.js"));
    }

    #[test]
    fn test_files_are_analyzed_in_isolation() {
        let dir = tempfile::tempdir().expect("tempdir");
        // a.jsx taints `userInput`; b.jsx uses an identically-named clean one.
        write(dir.path(), "a.jsx", VULNERABLE);
        write(
            dir.path(),
            "b.jsx",
            "const userInput = 'static';\n\
             const el = <div dangerouslySetInnerHTML={{ __html: userInput }} />;\n",
        );

        let analyzer = Analyzer::default();
        let findings = analyzer.analyze_dir(dir.path()).expect("walk");
        assert_eq!(findings.len(), 1);
        assert!(findings[0].file.ends_with("a.jsx"));
    }

    #[test]
    fn test_repeated_runs_are_identical() {
        let dir = tempfile::tempdir().expect("tempdir");
        write(dir.path(), "a.jsx", VULNERABLE);
        write(dir.path(), "z.js", "const v = e.target.value; eval(v);");

        let analyzer = Analyzer::default();
        let first = analyzer.analyze_dir(dir.path()).expect("first run");
        let second = analyzer.analyze_dir(dir.path()).expect("second run");
        assert_eq!(first, second);
    }
}
