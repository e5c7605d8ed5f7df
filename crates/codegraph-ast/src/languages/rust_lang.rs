//! Rust parser (tree-sitter-rust). Structs/enums become [`ClassInfo`]
//! entries; their `impl` blocks' functions are attached as methods by
//! matching the `impl`'s type name against the struct/enum name.

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

const RULES: ComplexityRules = ComplexityRules {
    branch_kinds: &["if_expression", "if_let_expression"],
    loop_kinds: &["for_expression", "while_expression", "while_let_expression", "loop_expression"],
    case_kinds: &["match_arm"],
    exception_kinds: &[],
    short_circuit_kinds: &[],
    comprehension_if_kinds: &[],
    nested_function_kinds: &["function_item", "closure_expression"],
};

pub struct RustParser;

impl RustParser {
    pub fn new() -> Self {
        Self
    }
}

impl Default for RustParser {
    fn default() -> Self {
        Self::new()
    }
}

impl LanguageParser for RustParser {
    fn language(&self) -> Language {
        Language::Rust
    }

    fn parse(&self, source: &[u8], path: &Path) -> Result<ParsedFile, ParseError> {
        let source_str = std::str::from_utf8(source)
            .map_err(|_| ParseError::UnsupportedInput {
                reason: "not valid UTF-8".to_string(),
            })?;

        let mut parser = tree_sitter::Parser::new();
        parser
            .set_language(&tree_sitter_rust::LANGUAGE.into())
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
        let mut classes: Vec<ClassInfo> = Vec::new();
        let mut imports = Vec::new();
        let mut call_sites = Vec::new();
        let mut seen_names: FxHashMap<String, u32> = FxHashMap::default();
        let mut impl_methods: FxHashMap<String, Vec<FunctionInfo>> = FxHashMap::default();
        let mut impl_call_sites: Vec<CallSite> = Vec::new();

        walk_top_level(
            root,
            source,
            &mut functions,
            &mut classes,
            &mut imports,
            &mut call_sites,
            &mut seen_names,
            &mut impl_methods,
            &mut impl_call_sites,
        );

        call_sites.extend(impl_call_sites);
        for class in &mut classes {
            if let Some(methods) = impl_methods.remove(&class.name) {
                class.methods.extend(methods);
            }
        }

        let metrics = compute_file_metrics(source_str, Language::Rust);

        Ok(ParsedFile {
            path: path.to_string_lossy().to_string(),
            language: Language::Rust,
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

#[allow(clippy::too_many_arguments)]
fn walk_top_level(
    node: Node,
    source: &[u8],
    functions: &mut Vec<FunctionInfo>,
    classes: &mut Vec<ClassInfo>,
    imports: &mut Vec<ImportInfo>,
    call_sites: &mut Vec<CallSite>,
    seen_names: &mut FxHashMap<String, u32>,
    impl_methods: &mut FxHashMap<String, Vec<FunctionInfo>>,
    impl_call_sites: &mut Vec<CallSite>,
) {
    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        match child.kind() {
            "function_item" => {
                let f = build_function(child, source, None, seen_names);
                call_sites.extend(collect_calls(child, source, &f.name));
                functions.push(f);
            }
            "struct_item" | "enum_item" => {
                classes.push(build_type(child, source));
            }
            "impl_item" => {
                let (type_name, methods, calls) = build_impl(child, source);
                impl_methods.entry(type_name).or_default().extend(methods);
                impl_call_sites.extend(calls);
            }
            "use_declaration" => {
                imports.extend(build_imports(child, source));
            }
            "mod_item" => {
                if let Some(body) = child.child_by_field_name("body") {
                    walk_top_level(
                        body,
                        source,
                        functions,
                        classes,
                        imports,
                        call_sites,
                        seen_names,
                        impl_methods,
                        impl_call_sites,
                    );
                }
            }
            _ => {}
        }
    }
}

fn build_type(node: Node, source: &[u8]) -> ClassInfo {
    let name = node
        .child_by_field_name("name")
        .map(|n| text(n, source).to_string())
        .unwrap_or_default();
    ClassInfo {
        name,
        start_line: line_of(node),
        bases: Vec::new(),
        decorators: Vec::new(),
        methods: Vec::new(),
    }
}

fn build_impl(node: Node, source: &[u8]) -> (String, Vec<FunctionInfo>, Vec<CallSite>) {
    let type_name = node
        .child_by_field_name("type")
        .map(|n| base_type_name(n, source))
        .unwrap_or_default();

    let mut methods = Vec::new();
    let mut calls = Vec::new();
    let mut seen_names: FxHashMap<String, u32> = FxHashMap::default();
    if let Some(body) = node.child_by_field_name("body") {
        let mut cursor = body.walk();
        for child in body.children(&mut cursor) {
            if child.kind() == "function_item" {
                let f = build_function(child, source, Some(&type_name), &mut seen_names);
                calls.extend(collect_calls(child, source, &f.name));
                methods.push(f);
            }
        }
    }
    (type_name, methods, calls)
}

/// Strips generic-parameter text so `impl<T> Foo<T>` matches a plain `Foo`.
fn base_type_name(node: Node, source: &[u8]) -> String {
    let raw = text(node, source);
    raw.split(['<', ' ']).next().unwrap_or(raw).to_string()
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
                .filter(|p| p.kind() != "self_parameter")
                .map(|p| text(p, source).to_string())
                .collect()
        })
        .unwrap_or_default();

    let is_async = {
        let mut cursor = node.walk();
        let result = node.children(&mut cursor).any(|c| c.kind() == "async");
        result
    };

    let complexity = node
        .child_by_field_name("body")
        .map(|body| compute_complexity(body, source, &RULES) + count_short_circuit(body, source))
        .unwrap_or(1);

    FunctionInfo {
        name,
        start_line,
        end_line: end_line_of(node),
        complexity,
        is_async,
        is_method: class_name.is_some(),
        class_name: class_name.map(|s| s.to_string()),
        parameters,
        decorators: Vec::new(),
        is_nested: false,
    }
}

/// `&&`/`||` are both lexically `binary_expression` alongside every other
/// binary operator in this grammar, so [`RULES`] leaves them out and this
/// walker counts them separately by inspecting the operator field.
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

fn build_imports(node: Node, source: &[u8]) -> Vec<ImportInfo> {
    let line = line_of(node);
    let mut out = Vec::new();
    if let Some(arg) = node.child_by_field_name("argument") {
        flatten_use_tree(arg, source, String::new(), line, &mut out);
    }
    out
}

fn flatten_use_tree(node: Node, source: &[u8], prefix: String, line: u32, out: &mut Vec<ImportInfo>) {
    match node.kind() {
        "scoped_identifier" | "identifier" => {
            let full = text(node, source).to_string();
            let (module, name) = match full.rsplit_once("::") {
                Some((m, n)) => (format!("{prefix}{m}"), n.to_string()),
                None => (prefix.trim_end_matches("::").to_string(), full),
            };
            out.push(ImportInfo {
                name,
                module,
                alias: None,
                import_type: "use".to_string(),
                line,
            });
        }
        "use_as_clause" => {
            let path = node.child_by_field_name("path");
            let alias = node.child_by_field_name("alias").map(|n| text(n, source).to_string());
            if let Some(path) = path {
                let full = text(path, source).to_string();
                let (module, name) = match full.rsplit_once("::") {
                    Some((m, n)) => (format!("{prefix}{m}"), n.to_string()),
                    None => (prefix.trim_end_matches("::").to_string(), full),
                };
                out.push(ImportInfo {
                    name,
                    module,
                    alias,
                    import_type: "use".to_string(),
                    line,
                });
            }
        }
        "use_list" => {
            let mut cursor = node.walk();
            for child in node.named_children(&mut cursor) {
                flatten_use_tree(child, source, prefix.clone(), line, out);
            }
        }
        "scoped_use_list" => {
            let base = node
                .child_by_field_name("path")
                .map(|n| text(n, source).to_string())
                .unwrap_or_default();
            let new_prefix = format!("{prefix}{base}::");
            if let Some(list) = node.child_by_field_name("list") {
                flatten_use_tree(list, source, new_prefix, line, out);
            }
        }
        "use_wildcard" => {
            out.push(ImportInfo {
                name: "*".to_string(),
                module: prefix.trim_end_matches("::").to_string(),
                alias: None,
                import_type: "use_wildcard".to_string(),
                line,
            });
        }
        _ => {
            let mut cursor = node.walk();
            for child in node.named_children(&mut cursor) {
                flatten_use_tree(child, source, prefix.clone(), line, out);
            }
        }
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

    match node.kind() {
        "call_expression" => {
            if let Some(func) = node.child_by_field_name("function") {
                let callee_name = match func.kind() {
                    "identifier" => Some(text(func, source).to_string()),
                    "scoped_identifier" => func
                        .child_by_field_name("name")
                        .map(|n| text(n, source).to_string()),
                    "field_expression" => func
                        .child_by_field_name("field")
                        .map(|n| text(n, source).to_string()),
                    _ => None,
                };
                if let Some(callee_name) = callee_name {
                    out.push(CallSite {
                        caller: caller.to_string(),
                        callee_name,
                        line: line_of(node),
                    });
                }
            }
        }
        "method_call_expression" => {
            if let Some(name_node) = node.child_by_field_name("name") {
                out.push(CallSite {
                    caller: caller.to_string(),
                    callee_name: text(name_node, source).to_string(),
                    line: line_of(node),
                });
            }
        }
        _ => {}
    }

    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        collect_calls_rec(child, source, caller, out, false);
    }
}
