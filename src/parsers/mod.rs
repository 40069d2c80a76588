//! Parse adapter for JavaScript/JSX/TypeScript source using tree-sitter
//!
//! Produces an immutable syntax tree for one source file. The grammar is
//! chosen by file extension: the JavaScript grammar carries JSX, and the
//! TypeScript/TSX grammars add type annotations and class properties. The
//! tree is owned by `ParsedFile` for the duration of one file's analysis and
//! read-only to the rest of the pipeline.

use crate::error::AnalyzeError;
use std::path::Path;
use tree_sitter::{Language, Node, Parser, Tree};

/// File extensions the analyzer accepts, in grammar-selection order.
pub const SOURCE_EXTENSIONS: &[&str] = &["js", "jsx", "mjs", "cjs", "ts", "tsx"];

/// A parsed source file: the syntax tree plus the text it was built from.
#[derive(Debug)]
pub struct ParsedFile {
    tree: Tree,
    source: String,
}

impl ParsedFile {
    /// Root node of the syntax tree.
    pub fn root(&self) -> Node<'_> {
        self.tree.root_node()
    }

    /// Source bytes, for `Node::utf8_text`.
    pub fn source(&self) -> &[u8] {
        self.source.as_bytes()
    }

    /// Text of a node, empty on invalid UTF-8 ranges.
    pub fn text(&self, node: Node<'_>) -> &str {
        node.utf8_text(self.source()).unwrap_or("")
    }
}

/// Select the grammar for a file extension.
///
/// `ts` gets the TypeScript grammar, `tsx` the TSX grammar (TypeScript with
/// JSX); everything else uses the JavaScript grammar, which parses JSX
/// natively.
pub fn language_for_extension(ext: &str) -> Language {
    match ext {
        "ts" => tree_sitter_typescript::LANGUAGE_TYPESCRIPT.into(),
        "tsx" => tree_sitter_typescript::LANGUAGE_TSX.into(),
        _ => tree_sitter_javascript::LANGUAGE.into(),
    }
}

/// Whether a path has one of the accepted source extensions.
pub fn is_source_file(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|ext| SOURCE_EXTENSIONS.contains(&ext))
        .unwrap_or(false)
}

/// Read and parse a file from disk.
pub fn parse_file(path: &Path) -> Result<ParsedFile, AnalyzeError> {
    let source = std::fs::read_to_string(path)?;
    let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");
    parse_source(source, path, ext)
}

/// Parse source text under the grammar selected for `ext`.
///
/// A malformed file fails with `AnalyzeError::Parse` carrying the location
/// of the first syntax error; the caller decides whether that aborts the
/// run or skips the file.
pub fn parse_source(source: String, path: &Path, ext: &str) -> Result<ParsedFile, AnalyzeError> {
    let mut parser = Parser::new();
    parser.set_language(&language_for_extension(ext))?;

    let tree = parser.parse(&source, None).ok_or_else(|| AnalyzeError::Parse {
        file: path.to_path_buf(),
        line: 1,
        column: 0,
    })?;

    if tree.root_node().has_error() {
        let (line, column) = first_error_position(tree.root_node());
        return Err(AnalyzeError::Parse {
            file: path.to_path_buf(),
            line,
            column,
        });
    }

    Ok(ParsedFile { tree, source })
}

/// Locate the first ERROR or MISSING node in document order.
fn first_error_position(node: Node<'_>) -> (u32, u32) {
    if node.is_error() || node.is_missing() {
        let pos = node.start_position();
        return (pos.row as u32 + 1, pos.column as u32);
    }
    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        if child.has_error() || child.is_missing() {
            return first_error_position(child);
        }
    }
    let pos = node.start_position();
    (pos.row as u32 + 1, pos.column as u32)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn parse(source: &str, ext: &str) -> Result<ParsedFile, AnalyzeError> {
        parse_source(source.to_string(), &PathBuf::from(format!("test.{ext}")), ext)
    }

    #[test]
    fn test_parses_plain_javascript() {
        let parsed = parse("const x = 1;", "js").expect("valid JS");
        assert_eq!(parsed.root().kind(), "program");
    }

    #[test]
    fn test_parses_jsx_attribute() {
        let parsed = parse(
            "const el = <div dangerouslySetInnerHTML={{ __html: x }} />;",
            "jsx",
        )
        .expect("valid JSX");
        assert!(!parsed.root().has_error());
    }

    #[test]
    fn test_parses_typescript_annotations() {
        let parsed = parse("const x: string = useState<string>('')[0];", "ts").expect("valid TS");
        assert!(!parsed.root().has_error());
    }

    #[test]
    fn test_parses_tsx_component() {
        let parsed = parse(
            "function App(): JSX.Element { return <div>{value}</div>; }",
            "tsx",
        )
        .expect("valid TSX");
        assert!(!parsed.root().has_error());
    }

    #[test]
    fn test_malformed_source_is_a_parse_error() {
        let err = parse("const = {{{", "js").expect_err("malformed source");
        match err {
            AnalyzeError::Parse { line, .. } => assert!(line >= 1),
            other => panic!("expected parse error, got {other:?}"),
        }
    }
}
