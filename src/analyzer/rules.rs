//! Rule battery: structural pattern matchers gated on taint
//!
//! Runs independently of the taint pass's side effects, against the same
//! tree. Each rule is a structural matcher over node kinds plus a gating
//! decision against the accumulated taint set. Matches that fail the gate
//! produce no finding and no side effect: under this heuristic, absence of
//! taint means "not exploitable", not "safe".

use crate::analyzer::taint::{arguments, first_argument, TaintPass};
use crate::models::Finding;
use crate::parsers::ParsedFile;
use tracing::info;
use tree_sitter::Node;

/// Structural shape a rule matches, dispatched on node kind.
#[derive(Debug, Clone, Copy)]
enum Pattern {
    /// `dangerouslySetInnerHTML={...}` on a markup element.
    DangerousHtmlAttribute,
    /// Call to the global `eval`.
    EvalCall,
    /// Assignment whose target's root object is `window` or `document`.
    GlobalObjectAssignment,
    /// `setTimeout(...)` call.
    TimeoutCall,
    /// Assignment to a `src`-named property.
    ScriptSourceAssignment,
}

/// One entry in the battery: canonical name, canonical message, and the
/// shape to match. Gating lives with the matcher for each shape.
struct Rule {
    name: &'static str,
    message: &'static str,
    pattern: Pattern,
}

/// The fixed battery, in report order.
const RULES: &[Rule] = &[
    Rule {
        name: "DangerouslySetInnerHTML",
        message: "Potential XSS vulnerability: dangerouslySetInnerHTML found.",
        pattern: Pattern::DangerousHtmlAttribute,
    },
    Rule {
        name: "Eval Usage",
        message: "Potential security risk: Usage of eval detected.",
        pattern: Pattern::EvalCall,
    },
    Rule {
        name: "Direct DOM Manipulation",
        message: "Potential security risk: Direct DOM manipulation detected.",
        pattern: Pattern::GlobalObjectAssignment,
    },
    Rule {
        name: "SetTimeout String Argument",
        message: "Potential security risk: setTimeout called with a string argument.",
        pattern: Pattern::TimeoutCall,
    },
    Rule {
        name: "Dynamic Script Source",
        message: "Potential security risk: Dynamic script source assignment detected.",
        pattern: Pattern::ScriptSourceAssignment,
    },
];

/// Run the full battery against one file's tree, consulting the completed
/// taint pass for gating. Findings come out in rule order, then document
/// order within a rule.
pub fn run<'a>(parsed: &'a ParsedFile, taint: &TaintPass<'a>, file: &str) -> Vec<Finding> {
    let mut findings = Vec::new();

    for rule in RULES {
        collect(parsed.root(), parsed, taint, rule, file, &mut findings);
    }

    findings
}

fn collect<'a>(
    node: Node<'a>,
    parsed: &'a ParsedFile,
    taint: &TaintPass<'a>,
    rule: &Rule,
    file: &str,
    findings: &mut Vec<Finding>,
) {
    if matches_rule(node, parsed, taint, rule.pattern) {
        let pos = node.start_position();
        let finding = Finding::new(
            file,
            rule.name,
            rule.message,
            Some(pos.row as u32 + 1),
            Some(pos.column as u32),
        );
        info!("{} Found in {} at {}", rule.message, file, finding.location());
        findings.push(finding);
    }

    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        collect(child, parsed, taint, rule, file, findings);
    }
}

fn matches_rule<'a>(
    node: Node<'a>,
    parsed: &'a ParsedFile,
    taint: &TaintPass<'a>,
    pattern: Pattern,
) -> bool {
    match pattern {
        Pattern::DangerousHtmlAttribute => {
            if node.kind() != "jsx_attribute" {
                return false;
            }
            let Some(name) = node.named_child(0) else {
                return false;
            };
            if parsed.text(name) != "dangerouslySetInnerHTML" {
                return false;
            }
            // Gate: the bound expression must be tainted.
            node.named_child(1)
                .map(|value| taint.is_tainted(value))
                .unwrap_or(false)
        }
        Pattern::EvalCall => {
            if !is_call_to(node, parsed, "eval") {
                return false;
            }
            // Gate: at least one argument must be tainted.
            arguments(node).any(|arg| taint.is_tainted(arg))
        }
        Pattern::GlobalObjectAssignment => {
            if !matches!(
                node.kind(),
                "assignment_expression" | "augmented_assignment_expression"
            ) {
                return false;
            }
            let Some(left) = node.child_by_field_name("left") else {
                return false;
            };
            if !matches!(left.kind(), "member_expression" | "subscript_expression") {
                return false;
            }
            if !matches!(
                root_object_name(left, parsed).as_deref(),
                Some("window") | Some("document")
            ) {
                return false;
            }
            // Gate: the assigned value must be tainted.
            node.child_by_field_name("right")
                .map(|right| taint.is_tainted(right))
                .unwrap_or(false)
        }
        Pattern::TimeoutCall => {
            if !is_call_to(node, parsed, "setTimeout") {
                return false;
            }
            // Not taint-gated: string-as-code is unsafe regardless of the
            // string's provenance.
            first_argument(node)
                .map(|arg| arg.kind() == "string")
                .unwrap_or(false)
        }
        Pattern::ScriptSourceAssignment => {
            if !matches!(
                node.kind(),
                "assignment_expression" | "augmented_assignment_expression"
            ) {
                return false;
            }
            let Some(left) = node.child_by_field_name("left") else {
                return false;
            };
            if left.kind() != "member_expression" {
                return false;
            }
            let is_src = left
                .child_by_field_name("property")
                .map(|p| parsed.text(p) == "src")
                .unwrap_or(false);
            if !is_src {
                return false;
            }
            // Gate: the assigned value must be tainted.
            node.child_by_field_name("right")
                .map(|right| taint.is_tainted(right))
                .unwrap_or(false)
        }
    }
}

fn is_call_to<'a>(node: Node<'a>, parsed: &'a ParsedFile, name: &str) -> bool {
    if node.kind() != "call_expression" {
        return false;
    }
    node.child_by_field_name("function")
        .map(|callee| callee.kind() == "identifier" && parsed.text(callee) == name)
        .unwrap_or(false)
}

/// Root identifier of a member/subscript chain (`document.body.style` ->
/// `document`).
fn root_object_name<'a>(node: Node<'a>, parsed: &'a ParsedFile) -> Option<String> {
    let mut current = node;
    loop {
        match current.kind() {
            "identifier" => return Some(parsed.text(current).to_string()),
            "member_expression" | "subscript_expression" => {
                current = current.child_by_field_name("object")?;
            }
            _ => return None,
        }
    }
}
