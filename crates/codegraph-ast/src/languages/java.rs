//! Java parser (tree-sitter-java).

use std::path::Path;

use codegraph_core::errors::ParseError;
use codegraph_core::FxHashMap;
use tree_sitter::Node;

use super::common::{disambiguate, end_line_of, line_of, text};
use super::metrics::compute_file_metrics;
use crate::complexity::{compute_complexity, ComplexityRules};
use crate::traits::LanguageParser;
use crate::types::{CallSite, ClassInfo, FunctionInfo, ImportInfo, ParsedFile, SyntaxErrorInfo};
use crate::Language;

// `&&`/`||` are both lexically "binary_expression" in this grammar along
// with every arithmetic/comparison operator, so they are excluded here and
// counted separately in `count_short_circuit` by inspecting the operator.
const RULES: ComplexityRules = ComplexityRules {
    branch_kinds: &["if_statement", "ternary_expression"],
    loop_kinds: &[
        "for_statement",
        "enhanced_for_statement",
        "while_statement",
        "do_statement",
    ],
    case_kinds: &["switch_block_statement_group", "switch_rule"],
    exception_kinds: &["catch_clause"],
    short_circuit_kinds: &[],
    comprehension_if_kinds: &[],
    nested_function_kinds: &["method_declaration", "constructor_declaration", "lambda_expression"],
};

pub struct JavaParser;

impl JavaParser {
    pub fn new() -> Self {
        Self
    }
}

impl Default for JavaParser {
    fn default() -> Self {
        Self::new()
    }
}

impl LanguageParser for JavaParser {
    fn language(&self) -> Language {
        Language::Java
    }

    fn parse(&self, source: &[u8], path: &Path) -> Result<ParsedFile, ParseError> {
        let source_str = std::str::from_utf8(source)
            .map_err(|_| ParseError::UnsupportedInput {
                reason: "not valid UTF-8".to_string(),
            })?;

        let mut parser = tree_sitter::Parser::new();
        parser
            .set_language(&tree_sitter_java::LANGUAGE.into())
            .map_err(|e| ParseError::ParseFailed {
                message: e.to_string(),
            })?;

        let tree = parser
            .parse(source, None)
            .ok_or_else(|| ParseError::ParseFailed {
                message: "tree-sitter returned no tree".to_string(),
            })?;

        let root = tree.root_node();
        let mut errors = Vec::new();
        collect_errors(root, &mut errors);

        let mut functions = Vec::new();
        let mut classes = Vec::new();
        let mut imports = Vec::new();
        let mut call_sites = Vec::new();
        let mut seen_names: FxHashMap<String, u32> = FxHashMap::default();

        walk_top_level(
            root,
            source,
            &mut functions,
            &mut classes,
            &mut imports,
            &mut call_sites,
            &mut seen_names,
        );

        let metrics = compute_file_metrics(source_str, Language::Java);

        Ok(ParsedFile {
            path: path.to_string_lossy().to_string(),
            language: Language::Java,
            functions,
            classes,
            imports,
            call_sites,
            metrics,
            partial: !errors.is_empty(),
            errors,
        })
    }
}

fn collect_errors(node: Node, out: &mut Vec<SyntaxErrorInfo>) {
    if node.is_error() || node.is_missing() {
        out.push(SyntaxErrorInfo {
            line: line_of(node),
            message: format!("unexpected syntax near `{}`", node.kind()),
        });
        return;
    }
    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        collect_errors(child, out);
    }
}

fn walk_top_level(
    node: Node,
    source: &[u8],
    functions: &mut Vec<FunctionInfo>,
    classes: &mut Vec<ClassInfo>,
    imports: &mut Vec<ImportInfo>,
    call_sites: &mut Vec<CallSite>,
    seen_names: &mut FxHashMap<String, u32>,
) {
    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        match child.kind() {
            "class_declaration" | "interface_declaration" | "enum_declaration" | "record_declaration" => {
                classes.push(build_class(child, source));
            }
            "method_declaration" | "constructor_declaration" => {
                // Top-level method-shaped nodes are rare in Java (only
                // inside a type), but walk_top_level is also entered for
                // synthetic wrapper nodes, so handle them defensively.
                let f = build_function(child, source, None, seen_names);
                call_sites.extend(collect_calls(child, source, &f.name));
                functions.push(f);
            }
            "import_declaration" => {
                imports.push(build_import(child, source));
            }
            _ => {
                walk_top_level(child, source, functions, classes, imports, call_sites, seen_names);
            }
        }
    }
}

fn build_class(node: Node, source: &[u8]) -> ClassInfo {
    let name = node
        .child_by_field_name("name")
        .map(|n| text(n, source).to_string())
        .unwrap_or_default();
    let start_line = line_of(node);

    let mut bases = Vec::new();
    if let Some(superclass) = node.child_by_field_name("superclass") {
        bases.push(text(superclass, source).trim_start_matches("extends").trim().to_string());
    }
    if let Some(interfaces) = node.child_by_field_name("interfaces") {
        let mut cursor = interfaces.walk();
        for iface in interfaces.named_children(&mut cursor) {
            bases.push(text(iface, source).to_string());
        }
    }

    let mut methods = Vec::new();
    let mut method_names: FxHashMap<String, u32> = FxHashMap::default();
    if let Some(body) = node.child_by_field_name("body") {
        let mut cursor = body.walk();
        for child in body.children(&mut cursor) {
            if matches!(child.kind(), "method_declaration" | "constructor_declaration") {
                methods.push(build_function(child, source, Some(&name), &mut method_names));
            }
        }
    }

    ClassInfo {
        name,
        start_line,
        bases,
        decorators: Vec::new(),
        methods,
    }
}

fn build_function(
    node: Node,
    source: &[u8],
    class_name: Option<&str>,
    seen_names: &mut FxHashMap<String, u32>,
) -> FunctionInfo {
    let raw_name = node
        .child_by_field_name("name")
        .map(|n| text(n, source).to_string())
        .unwrap_or_default();
    let start_line = line_of(node);
    let name = disambiguate(seen_names, &raw_name, start_line);

    let parameters = node
        .child_by_field_name("parameters")
        .map(|params| {
            let mut cursor = params.walk();
            params
                .named_children(&mut cursor)
                .map(|p| text(p, source).to_string())
                .collect()
        })
        .unwrap_or_default();

    let modifiers = node
        .child_by_field_name("modifiers")
        .map(|m| text(m, source).to_string())
        .unwrap_or_default();

    let decorators = modifiers
        .split_whitespace()
        .filter(|m| m.starts_with('@'))
        .map(|m| m.trim_start_matches('@').to_string())
        .collect();

    let complexity = node
        .child_by_field_name("body")
        .map(|body| compute_complexity(body, source, &RULES) + count_short_circuit(body, source))
        .unwrap_or(1);

    FunctionInfo {
        name,
        start_line,
        end_line: end_line_of(node),
        complexity,
        is_async: false,
        is_method: class_name.is_some(),
        class_name: class_name.map(|s| s.to_string()),
        parameters,
        decorators,
        is_nested: false,
    }
}

fn count_short_circuit(node: Node, source: &[u8]) -> u32 {
    let mut count = 0u32;
    count_short_circuit_rec(node, source, true, &mut count);
    count
}

fn count_short_circuit_rec(node: Node, source: &[u8], is_root: bool, count: &mut u32) {
    if !is_root && RULES.nested_function_kinds.contains(&node.kind()) {
        return;
    }
    if node.kind() == "binary_expression" {
        if let Some(op) = node.child_by_field_name("operator") {
            let op_text = text(op, source);
            if op_text == "&&" || op_text == "||" {
                *count += 1;
            }
        }
    }
    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        count_short_circuit_rec(child, source, false, count);
    }
}

fn build_import(node: Node, source: &[u8]) -> ImportInfo {
    let line = line_of(node);
    let raw = text(node, source)
        .trim_start_matches("import")
        .trim_end_matches(';')
        .trim()
        .to_string();
    let is_static = raw.starts_with("static");
    let path = raw.trim_start_matches("static").trim().to_string();
    let (module, name) = match path.rsplit_once('.') {
        Some((module, name)) => (module.to_string(), name.to_string()),
        None => (String::new(), path.clone()),
    };
    ImportInfo {
        name,
        module,
        alias: None,
        import_type: if is_static { "static_import".to_string() } else { "import".to_string() },
        line,
    }
}

fn collect_calls(body: Node, source: &[u8], caller: &str) -> Vec<CallSite> {
    let mut out = Vec::new();
    collect_calls_rec(body, source, caller, &mut out, true);
    out
}

fn collect_calls_rec(node: Node, source: &[u8], caller: &str, out: &mut Vec<CallSite>, is_root: bool) {
    if !is_root && RULES.nested_function_kinds.contains(&node.kind()) {
        return;
    }

    if node.kind() == "method_invocation" {
        if let Some(name_node) = node.child_by_field_name("name") {
            out.push(CallSite {
                caller: caller.to_string(),
                callee_name: text(name_node, source).to_string(),
                line: line_of(node),
            });
        }
    } else if node.kind() == "object_creation_expression" {
        if let Some(type_node) = node.child_by_field_name("type") {
            out.push(CallSite {
                caller: caller.to_string(),
                callee_name: text(type_node, source).to_string(),
                line: line_of(node),
            });
        }
    }

    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        collect_calls_rec(child, source, caller, out, false);
    }
}
