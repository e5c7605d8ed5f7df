//! Python parser (tree-sitter-python).

use std::path::Path;

use codegraph_core::errors::ParseError;
use codegraph_core::FxHashMap;
use tree_sitter::Node;

use super::common::{content_hash, disambiguate, end_line_of, line_of, text};
use super::metrics::compute_file_metrics;
use crate::complexity::{compute_complexity, ComplexityRules};
use crate::traits::LanguageParser;
use crate::types::{CallSite, ClassInfo, FunctionInfo, ImportInfo, ParsedFile, SyntaxErrorInfo};
use crate::Language;

const RULES: ComplexityRules = ComplexityRules {
    branch_kinds: &["if_statement", "elif_clause", "conditional_expression"],
    loop_kinds: &["for_statement", "while_statement"],
    case_kinds: &["case_clause"],
    exception_kinds: &["except_clause"],
    short_circuit_kinds: &["boolean_operator"],
    comprehension_if_kinds: &["if_clause"],
    nested_function_kinds: &["function_definition", "lambda"],
};

pub struct PythonParser;

impl PythonParser {
    pub fn new() -> Self {
        Self
    }
}

impl Default for PythonParser {
    fn default() -> Self {
        Self::new()
    }
}

impl LanguageParser for PythonParser {
    fn language(&self) -> Language {
        Language::Python
    }

    fn parse(&self, source: &[u8], path: &Path) -> Result<ParsedFile, ParseError> {
        let source_str = std::str::from_utf8(source)
            .map_err(|_| ParseError::UnsupportedInput {
                reason: "not valid UTF-8".to_string(),
            })?;

        let mut parser = tree_sitter::Parser::new();
        parser
            .set_language(&tree_sitter_python::LANGUAGE.into())
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
            false,
        );

        let metrics = compute_file_metrics(source_str, Language::Python);

        Ok(ParsedFile {
            path: path.to_string_lossy().to_string(),
            language: Language::Python,
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
    is_nested: bool,
) {
    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        match child.kind() {
            "decorated_definition" => {
                let decorators = collect_decorators(child, source);
                if let Some(inner) = child
                    .children(&mut child.walk())
                    .find(|c| c.kind() == "function_definition" || c.kind() == "class_definition")
                {
                    if inner.kind() == "function_definition" {
                        let f = build_function(inner, source, None, decorators, is_nested, seen_names);
                        call_sites.extend(collect_calls(inner, source, &f.name));
                        functions.push(f);
                    } else {
                        classes.push(build_class(inner, source, decorators));
                    }
                }
            }
            "function_definition" => {
                let f = build_function(child, source, None, Vec::new(), is_nested, seen_names);
                call_sites.extend(collect_calls(child, source, &f.name));
                functions.push(f);
            }
            "class_definition" => {
                classes.push(build_class(child, source, Vec::new()));
            }
            "import_statement" => {
                imports.extend(build_plain_imports(child, source));
            }
            "import_from_statement" => {
                imports.extend(build_from_imports(child, source));
            }
            _ => {
                // Recurse into compound statements (if/try/with/for at
                // module scope) so top-level conditional imports/defs are
                // still found, without treating their bodies as "nested".
                walk_top_level(
                    child, source, functions, classes, imports, call_sites, seen_names, is_nested,
                );
            }
        }
    }
}

fn collect_decorators(node: Node, source: &[u8]) -> Vec<String> {
    let mut out = Vec::new();
    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        if child.kind() == "decorator" {
            out.push(text(child, source).trim_start_matches('@').to_string());
        }
    }
    out
}

fn build_function(
    node: Node,
    source: &[u8],
    class_name: Option<&str>,
    decorators: Vec<String>,
    is_nested: bool,
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

    let is_async = node
        .utf8_text(source)
        .map(|t| t.trim_start().starts_with("async "))
        .unwrap_or(false);

    let complexity = node
        .child_by_field_name("body")
        .map(|body| compute_complexity(body, source, &RULES))
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
        decorators,
        is_nested,
    }
}

fn build_class(node: Node, source: &[u8], decorators: Vec<String>) -> ClassInfo {
    let name = node
        .child_by_field_name("name")
        .map(|n| text(n, source).to_string())
        .unwrap_or_default();
    let start_line = line_of(node);

    let bases = node
        .child_by_field_name("superclasses")
        .map(|args| {
            let mut cursor = args.walk();
            args.named_children(&mut cursor)
                .map(|a| text(a, source).to_string())
                .collect()
        })
        .unwrap_or_default();

    let mut methods = Vec::new();
    let mut method_names: FxHashMap<String, u32> = FxHashMap::default();
    if let Some(body) = node.child_by_field_name("body") {
        let mut cursor = body.walk();
        for child in body.children(&mut cursor) {
            match child.kind() {
                "function_definition" => {
                    methods.push(build_function(
                        child,
                        source,
                        Some(&name),
                        Vec::new(),
                        false,
                        &mut method_names,
                    ));
                }
                "decorated_definition" => {
                    let decos = collect_decorators(child, source);
                    if let Some(inner) = child
                        .children(&mut child.walk())
                        .find(|c| c.kind() == "function_definition")
                    {
                        methods.push(build_function(
                            inner,
                            source,
                            Some(&name),
                            decos,
                            false,
                            &mut method_names,
                        ));
                    }
                }
                _ => {}
            }
        }
    }

    ClassInfo {
        name,
        start_line,
        bases,
        decorators,
        methods,
    }
}

fn build_plain_imports(node: Node, source: &[u8]) -> Vec<ImportInfo> {
    let line = line_of(node);
    let mut out = Vec::new();
    let mut cursor = node.walk();
    for child in node.named_children(&mut cursor) {
        match child.kind() {
            "dotted_name" => {
                let module = text(child, source).to_string();
                out.push(ImportInfo {
                    name: module.clone(),
                    module,
                    alias: None,
                    import_type: "import".to_string(),
                    line,
                });
            }
            "aliased_import" => {
                let module = child
                    .child_by_field_name("name")
                    .map(|n| text(n, source).to_string())
                    .unwrap_or_default();
                let alias = child
                    .child_by_field_name("alias")
                    .map(|n| text(n, source).to_string());
                out.push(ImportInfo {
                    name: module.clone(),
                    module,
                    alias,
                    import_type: "import".to_string(),
                    line,
                });
            }
            _ => {}
        }
    }
    out
}

fn build_from_imports(node: Node, source: &[u8]) -> Vec<ImportInfo> {
    let line = line_of(node);
    let module = node
        .child_by_field_name("module_name")
        .map(|n| text(n, source).to_string())
        .unwrap_or_default();

    let mut out = Vec::new();
    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        match child.kind() {
            "dotted_name" | "identifier" => {
                let name = text(child, source).to_string();
                if name == module {
                    continue;
                }
                out.push(ImportInfo {
                    name,
                    module: module.clone(),
                    alias: None,
                    import_type: "from_import".to_string(),
                    line,
                });
            }
            "aliased_import" => {
                let name = child
                    .child_by_field_name("name")
                    .map(|n| text(n, source).to_string())
                    .unwrap_or_default();
                let alias = child
                    .child_by_field_name("alias")
                    .map(|n| text(n, source).to_string());
                out.push(ImportInfo {
                    name,
                    module: module.clone(),
                    alias,
                    import_type: "from_import".to_string(),
                    line,
                });
            }
            _ => {}
        }
    }
    if out.is_empty() && !module.is_empty() {
        out.push(ImportInfo {
            name: module.clone(),
            module,
            alias: None,
            import_type: "from_import".to_string(),
            line,
        });
    }
    out
}

fn collect_calls(body: Node, source: &[u8], caller: &str) -> Vec<CallSite> {
    let mut out = Vec::new();
    collect_calls_rec(body, source, caller, &mut out, true);
    out
}

fn collect_calls_rec(node: Node, source: &[u8], caller: &str, out: &mut Vec<CallSite>, is_root: bool) {
    if !is_root && matches!(node.kind(), "function_definition" | "lambda") {
        // Nested function's calls are attributed to it, not the parent,
        // when it is itself projected as a node elsewhere.
        return;
    }

    if node.kind() == "call" {
        if let Some(func) = node.child_by_field_name("function") {
            let callee_name = match func.kind() {
                "identifier" => Some(text(func, source).to_string()),
                "attribute" => func
                    .child_by_field_name("attribute")
                    .map(|a| text(a, source).to_string()),
                _ => None, // dynamic/unresolvable callee, skipped per spec
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

    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        collect_calls_rec(child, source, caller, out, false);
    }
}

pub(crate) fn hash_source(source: &[u8]) -> u64 {
    content_hash(source)
}
