//! Top-level AST Projector entry point (spec §4.1): validates input, parses
//! it through a [`ParserManager`], then lowers the resulting [`ParsedFile`]
//! into the uniform graph schema.

use std::path::Path;

use codegraph_core::errors::{ErrorCode, ParseError};
use codegraph_core::FxHashMap;
use codegraph_core::schema::{
    ClassNode, ContainsLevel, FileNode, FunctionNode, GraphEdge, GraphNode, ImportNode, ModuleNode,
};
use codegraph_core::{ClassId, FileId, FunctionId, ImportId, ModuleId, ProjectId};

use crate::manager::ParserManager;
use crate::types::ParsedFile;

#[derive(Debug, Clone, thiserror::Error)]
pub enum ProjectionError {
    #[error(transparent)]
    Parse(#[from] ParseError),
}

impl ErrorCode for ProjectionError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::Parse(e) => e.error_code(),
        }
    }
}

/// Validates, parses, and projects one file. `max_file_size` is
/// `AstConfig::effective_max_file_size()`; callers own config lookup so
/// this function stays config-agnostic.
pub fn project_file(
    manager: &ParserManager,
    project_id: &ProjectId,
    path: &Path,
    source: &[u8],
    max_file_size: u64,
) -> Result<(ParsedFile, Vec<GraphNode>, Vec<GraphEdge>), ProjectionError> {
    if source.len() as u64 > max_file_size {
        return Err(ProjectionError::Parse(ParseError::InputTooLarge {
            max_bytes: max_file_size,
        }));
    }
    if looks_binary(source) {
        return Err(ProjectionError::Parse(ParseError::UnsupportedInput {
            reason: "input looks binary (contains a NUL byte)".to_string(),
        }));
    }

    let parsed = manager.parse_file(source, path)?;
    let (nodes, edges) = lower(project_id, &parsed);
    Ok((parsed, nodes, edges))
}

fn looks_binary(source: &[u8]) -> bool {
    let sample_len = source.len().min(8192);
    source[..sample_len].contains(&0)
}

/// Lowers a [`ParsedFile`] into graph nodes/edges per spec §3's schema, using
/// the content-stable identifier constructors from `codegraph_core`.
pub fn lower(project_id: &ProjectId, parsed: &ParsedFile) -> (Vec<GraphNode>, Vec<GraphEdge>) {
    let mut nodes = Vec::new();
    let mut edges = Vec::new();
    let mut function_ids_by_name: FxHashMap<String, FunctionId> = FxHashMap::default();

    let file_id = FileId::new(project_id, &parsed.path);
    nodes.push(GraphNode::File(FileNode {
        file_id: file_id.clone(),
        project_id: project_id.clone(),
        path: parsed.path.clone(),
        language: parsed.language.name().to_string(),
        lines_of_code: parsed.metrics.total_lines,
        comment_ratio: parsed.metrics.comment_ratio,
    }));
    edges.push(GraphEdge::contains(
        project_id.as_str(),
        file_id.as_str(),
        ContainsLevel::ProjectFile,
    ));

    let mut seen_modules: FxHashMap<String, ()> = FxHashMap::default();
    for import in &parsed.imports {
        let import_id = ImportId::new(project_id, &parsed.path, &import.name);
        nodes.push(GraphNode::Import(ImportNode {
            import_id: import_id.clone(),
            file_id: file_id.clone(),
            name: import.name.clone(),
            module: import.module.clone(),
            alias: import.alias.clone(),
            import_type: import.import_type.clone(),
        }));
        edges.push(GraphEdge::contains(
            file_id.as_str(),
            import_id.as_str(),
            ContainsLevel::FileImport,
        ));

        // Module identifier is the resolved import path as declared (spec
        // §4.1 step 5): relative-import resolution against the file's own
        // package is a per-language concern left to future parser work, so
        // the declared module string is used as-is.
        let module_name = if import.module.is_empty() {
            import.name.clone()
        } else {
            import.module.clone()
        };
        let module_id = ModuleId::from(module_name.as_str());
        if seen_modules.insert(module_name.clone(), ()).is_none() {
            nodes.push(GraphNode::Module(ModuleNode {
                module_id: module_id.clone(),
                name: module_name,
            }));
            edges.push(GraphEdge::depends_on(file_id.as_str(), module_id.as_str()));
        }
    }

    for function in &parsed.functions {
        let function_id = FunctionId::for_module_function(project_id, &parsed.path, &function.name);
        function_ids_by_name.insert(function.name.clone(), function_id.clone());
        nodes.push(GraphNode::Function(FunctionNode {
            function_id: function_id.clone(),
            file_id: file_id.clone(),
            class_id: None,
            name: function.name.clone(),
            start_line: function.start_line,
            complexity: function.complexity,
            is_async: function.is_async,
            is_method: false,
            parameters: function.parameters.clone(),
        }));
        edges.push(GraphEdge::contains(
            file_id.as_str(),
            function_id.as_str(),
            ContainsLevel::FileFunction,
        ));
    }

    for class in &parsed.classes {
        let class_id = ClassId::new(project_id, &parsed.path, &class.name);
        nodes.push(GraphNode::Class(ClassNode {
            class_id: class_id.clone(),
            file_id: file_id.clone(),
            name: class.name.clone(),
            start_line: class.start_line,
            bases: class.bases.clone(),
        }));
        edges.push(GraphEdge::contains(
            file_id.as_str(),
            class_id.as_str(),
            ContainsLevel::FileClass,
        ));

        for base in &class.bases {
            edges.push(GraphEdge::inherits_from(class_id.as_str(), base));
        }

        for method in &class.methods {
            let method_id = FunctionId::for_method(&class_id, &method.name);
            function_ids_by_name.insert(method.name.clone(), method_id.clone());
            nodes.push(GraphNode::Function(FunctionNode {
                function_id: method_id.clone(),
                file_id: file_id.clone(),
                class_id: Some(class_id.clone()),
                name: method.name.clone(),
                start_line: method.start_line,
                complexity: method.complexity,
                is_async: method.is_async,
                is_method: true,
                parameters: method.parameters.clone(),
            }));
            edges.push(GraphEdge::contains(
                class_id.as_str(),
                method_id.as_str(),
                ContainsLevel::ClassFunction,
            ));
        }
    }

    // Callee identifiers are resolved only syntactically within this file
    // (spec §9 open question: cross-file call resolution is not attempted);
    // downstream consumers of `CALLS` edges should read them as lower bounds.
    for call in &parsed.call_sites {
        let caller_id = function_ids_by_name
            .get(&call.caller)
            .map(|id| id.as_str().to_string())
            .unwrap_or_else(|| call.caller.clone());
        edges.push(GraphEdge::calls(&caller_id, &call.callee_name));
    }

    (nodes, edges)
}
