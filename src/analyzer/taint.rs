//! Single-pass forward taint tracking
//!
//! Walks the syntax tree once in document (pre)order and classifies symbolic
//! variable names as tainted or clean. There is no fixed point and no
//! backward propagation: a taint fact established after a use is never
//! retroactively applied. That is a documented source of false negatives,
//! not a bug to fix here.
//!
//! Propagation rules, applied node by node:
//! 1. `[state, setter] = useState(...)` records a setter-to-state binding
//! 2. reads of `event.target.value` / `e.target.value` are taint sources
//! 3. declarations and assignments propagate taint to the left-hand name
//! 4. calls to a recorded setter taint (or clear) the bound state name
//! 5. calls to registered sanitizers clear taint on the receiving name
//! 6. calls to anything else are tainted if any argument is (policy-gated)
//! 7. expression taint is defined recursively over expression shape

use crate::analyzer::sanitizers::SanitizerRegistry;
use crate::error::AnalyzeError;
use crate::parsers::ParsedFile;
use std::collections::{HashMap, HashSet};
use std::path::Path;
use tree_sitter::Node;

/// How taint flows through calls to functions the analyzer knows nothing
/// about.
///
/// The default conflates "called with tainted arguments" and "returns
/// tainted data" — unsound in general, but it is the behavior the report
/// format is calibrated against. `OpaqueCalls` is the stricter alternative.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CallTaintPolicy {
    /// A call is tainted if any of its arguments is tainted.
    #[default]
    TaintedArgumentsTaintResult,
    /// Calls to unknown functions never propagate taint.
    OpaqueCalls,
}

/// The taint pass over one file: builds the taint set, then answers
/// expression-taint queries for the rule engine.
pub struct TaintPass<'a> {
    parsed: &'a ParsedFile,
    file: &'a Path,
    sanitizers: &'a SanitizerRegistry,
    policy: CallTaintPolicy,
    tainted: HashSet<String>,
    /// setter name -> state variable name, from state-hook destructuring.
    /// Last write wins when a setter name is reused.
    setters: HashMap<String, String>,
}

impl<'a> TaintPass<'a> {
    pub fn new(
        parsed: &'a ParsedFile,
        file: &'a Path,
        sanitizers: &'a SanitizerRegistry,
        policy: CallTaintPolicy,
    ) -> Self {
        Self {
            parsed,
            file,
            sanitizers,
            policy,
            tainted: HashSet::new(),
            setters: HashMap::new(),
        }
    }

    /// Run the single forward traversal over the whole tree.
    pub fn run(&mut self) -> Result<(), AnalyzeError> {
        self.visit(self.parsed.root())
    }

    /// Names currently believed tainted.
    pub fn tainted_names(&self) -> &HashSet<String> {
        &self.tainted
    }

    fn visit(&mut self, node: Node<'a>) -> Result<(), AnalyzeError> {
        match node.kind() {
            "variable_declarator" => self.visit_declarator(node)?,
            "assignment_expression" | "augmented_assignment_expression" => {
                self.visit_assignment(node)
            }
            "call_expression" => self.visit_call(node),
            _ => {}
        }

        let mut cursor = node.walk();
        for child in node.children(&mut cursor) {
            self.visit(child)?;
        }
        Ok(())
    }

    /// Declarations: state-hook destructuring, sanitizer clearing, and
    /// taint propagation into the declared name.
    fn visit_declarator(&mut self, node: Node<'a>) -> Result<(), AnalyzeError> {
        let Some(name) = node.child_by_field_name("name") else {
            return Ok(());
        };
        let Some(value) = node.child_by_field_name("value") else {
            return Ok(());
        };

        if self.is_state_hook_call(value) {
            return self.record_hook_binding(name);
        }

        let Some(target) = self.root_identifier(name) else {
            return Ok(());
        };

        if self.is_sanitizer_call(value) {
            // Sanitized result: clear, not merely skip.
            self.tainted.remove(&target);
        } else if self.is_event_value(value) || self.is_tainted(value) {
            self.tainted.insert(target);
        }
        Ok(())
    }

    /// Record `[state, setter] = useState(...)`.
    ///
    /// Any left-hand side that is not a pattern binding two plain names,
    /// including a bare `const state = useState(...)`, is fatal for the
    /// file, same propagation as a parse error.
    fn record_hook_binding(&mut self, pattern: Node<'a>) -> Result<(), AnalyzeError> {
        if pattern.kind() != "array_pattern" {
            return Err(AnalyzeError::MalformedHookBinding {
                file: self.file.to_path_buf(),
                line: pattern.start_position().row as u32 + 1,
            });
        }
        let state = pattern.named_child(0);
        let setter = pattern.named_child(1);
        match (state, setter) {
            (Some(state), Some(setter))
                if state.kind() == "identifier" && setter.kind() == "identifier" =>
            {
                let state = self.parsed.text(state).to_string();
                let setter = self.parsed.text(setter).to_string();
                self.setters.insert(setter, state);
                Ok(())
            }
            _ => Err(AnalyzeError::MalformedHookBinding {
                file: self.file.to_path_buf(),
                line: pattern.start_position().row as u32 + 1,
            }),
        }
    }

    /// Assignments: same source/propagation/clearing logic as declarations,
    /// with the destination derived by unwrapping member chains to their
    /// root identifier. Compound assignments (`+=` and friends) propagate
    /// but never clear: the destination keeps its previous value.
    fn visit_assignment(&mut self, node: Node<'a>) {
        let Some(left) = node.child_by_field_name("left") else {
            return;
        };
        let Some(right) = node.child_by_field_name("right") else {
            return;
        };
        let Some(target) = self.root_identifier(left) else {
            return;
        };
        let compound = node.kind() == "augmented_assignment_expression";

        if !compound && self.is_sanitizer_call(right) {
            self.tainted.remove(&target);
        } else if self.is_event_value(right) || self.is_tainted(right) {
            self.tainted.insert(target);
        }
    }

    /// Setter calls taint the bound state variable when fed tainted or
    /// event-value data, and clear it when fed a sanitizer call.
    fn visit_call(&mut self, node: Node<'a>) {
        let Some(callee) = node.child_by_field_name("function") else {
            return;
        };
        if callee.kind() != "identifier" {
            return;
        }
        let Some(state) = self.setters.get(self.parsed.text(callee)).cloned() else {
            return;
        };
        let Some(arg) = first_argument(node) else {
            return;
        };

        if self.is_sanitizer_call(arg) {
            self.tainted.remove(&state);
        } else if self.is_tainted(arg) || self.is_event_value(arg) {
            self.tainted.insert(state);
        }
    }

    /// Taint over expression shape (rule 7). Identifiers consult the taint
    /// set; everything else recurses; plain literals are never tainted.
    pub fn is_tainted(&self, node: Node<'a>) -> bool {
        match node.kind() {
            "identifier" | "shorthand_property_identifier" => {
                self.tainted.contains(self.parsed.text(node))
            }
            "member_expression" | "subscript_expression" => node
                .child_by_field_name("object")
                .map(|obj| self.is_tainted(obj))
                .unwrap_or(false),
            "call_expression" => {
                if self.is_sanitizer_call(node) {
                    return false;
                }
                match self.policy {
                    CallTaintPolicy::TaintedArgumentsTaintResult => {
                        arguments(node).any(|arg| self.is_tainted(arg))
                    }
                    CallTaintPolicy::OpaqueCalls => false,
                }
            }
            "binary_expression" => {
                let left = node.child_by_field_name("left");
                let right = node.child_by_field_name("right");
                left.map(|n| self.is_tainted(n)).unwrap_or(false)
                    || right.map(|n| self.is_tainted(n)).unwrap_or(false)
            }
            "ternary_expression" => ["condition", "consequence", "alternative"]
                .iter()
                .filter_map(|field| node.child_by_field_name(field))
                .any(|n| self.is_tainted(n)),
            "object" => {
                let mut cursor = node.walk();
                let tainted = node.named_children(&mut cursor).any(|prop| match prop.kind() {
                    "pair" => prop
                        .child_by_field_name("value")
                        .map(|v| self.is_tainted(v))
                        .unwrap_or(false),
                    "shorthand_property_identifier" | "spread_element" => {
                        self.is_tainted_in_children(prop) || self.is_tainted(prop)
                    }
                    _ => false,
                });
                tainted
            }
            "array" => {
                let mut cursor = node.walk();
                let tainted = node.named_children(&mut cursor).any(|el| self.is_tainted(el));
                tainted
            }
            "template_string" => {
                let mut cursor = node.walk();
                let tainted = node
                    .named_children(&mut cursor)
                    .filter(|c| c.kind() == "template_substitution")
                    .any(|sub| self.is_tainted_in_children(sub));
                tainted
            }
            // Wrappers the grammars insert around plain expressions.
            "parenthesized_expression"
            | "jsx_expression"
            | "spread_element"
            | "as_expression"
            | "satisfies_expression"
            | "non_null_expression" => self.is_tainted_in_children(node),
            _ => false,
        }
    }

    fn is_tainted_in_children(&self, node: Node<'a>) -> bool {
        let mut cursor = node.walk();
        let tainted = node.named_children(&mut cursor).any(|c| self.is_tainted(c));
        tainted
    }

    /// A two-level property read `<event|e>.target.value` (rule 2).
    pub fn is_event_value(&self, node: Node<'a>) -> bool {
        if node.kind() != "member_expression" {
            return false;
        }
        let Some(property) = node.child_by_field_name("property") else {
            return false;
        };
        let Some(object) = node.child_by_field_name("object") else {
            return false;
        };
        if self.parsed.text(property) != "value" || object.kind() != "member_expression" {
            return false;
        }
        let inner_property = object.child_by_field_name("property");
        let root = object.child_by_field_name("object");
        matches!(
            (inner_property, root),
            (Some(p), Some(r))
                if self.parsed.text(p) == "target"
                    && r.kind() == "identifier"
                    && matches!(self.parsed.text(r), "event" | "e")
        )
    }

    /// A call whose fully-qualified callee is in the sanitizer registry.
    pub fn is_sanitizer_call(&self, node: Node<'a>) -> bool {
        if node.kind() != "call_expression" {
            return false;
        }
        node.child_by_field_name("function")
            .map(|callee| self.sanitizers.contains(self.parsed.text(callee)))
            .unwrap_or(false)
    }

    fn is_state_hook_call(&self, node: Node<'a>) -> bool {
        if node.kind() != "call_expression" {
            return false;
        }
        node.child_by_field_name("function")
            .map(|callee| callee.kind() == "identifier" && self.parsed.text(callee) == "useState")
            .unwrap_or(false)
    }

    /// Unwrap a member/subscript chain down to its root identifier.
    fn root_identifier(&self, node: Node<'a>) -> Option<String> {
        let mut current = node;
        loop {
            match current.kind() {
                "identifier" => return Some(self.parsed.text(current).to_string()),
                "member_expression" | "subscript_expression" => {
                    current = current.child_by_field_name("object")?;
                }
                "non_null_expression" | "parenthesized_expression" => {
                    current = current.named_child(0)?;
                }
                _ => return None,
            }
        }
    }
}

/// First argument of a call, if any.
pub fn first_argument<'tree>(call: Node<'tree>) -> Option<Node<'tree>> {
    call.child_by_field_name("arguments")
        .and_then(|args| args.named_child(0))
}

/// All arguments of a call, in order.
pub fn arguments<'tree>(call: Node<'tree>) -> impl Iterator<Item = Node<'tree>> {
    let args = call.child_by_field_name("arguments");
    let count = args.map(|a| a.named_child_count()).unwrap_or(0);
    (0..count).filter_map(move |i| args.and_then(|a| a.named_child(i)))
}
