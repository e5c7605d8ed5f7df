//! The uniform graph schema (spec §3) shared by the AST Projector (which
//! produces it), the Graph Store Adapter (which persists it), and Graph
//! Analytics (which reads it back). Keeping this in `codegraph-core` means
//! none of those crates need to depend on each other to agree on shapes.

use crate::types::{ClassId, FileId, FunctionId, ImportId, ModuleId, ProjectId};
use serde::{Deserialize, Serialize};

/// Discriminant for `CONTAINS` edges (spec §3: "Project→File→{Class,
/// Function,Import}; Class→Function for methods").
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContainsLevel {
    ProjectFile,
    FileClass,
    FileFunction,
    FileImport,
    ClassFunction,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectNode {
    pub project_id: ProjectId,
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileNode {
    pub file_id: FileId,
    pub project_id: ProjectId,
    pub path: String,
    pub language: String,
    pub lines_of_code: u32,
    pub comment_ratio: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModuleNode {
    pub module_id: ModuleId,
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassNode {
    pub class_id: ClassId,
    pub file_id: FileId,
    pub name: String,
    pub start_line: u32,
    pub bases: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FunctionNode {
    pub function_id: FunctionId,
    pub file_id: FileId,
    pub class_id: Option<ClassId>,
    pub name: String,
    pub start_line: u32,
    pub complexity: u32,
    pub is_async: bool,
    pub is_method: bool,
    pub parameters: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImportNode {
    pub import_id: ImportId,
    pub file_id: FileId,
    pub name: String,
    pub module: String,
    pub alias: Option<String>,
    pub import_type: String,
}

/// Any node in the graph, tagged by variant so the store can dispatch on a
/// single enum instead of five parallel collections at call sites that
/// don't care which kind they're touching (e.g. `countNodesByLabel`).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum GraphNode {
    Project(ProjectNode),
    File(FileNode),
    Module(ModuleNode),
    Class(ClassNode),
    Function(FunctionNode),
    Import(ImportNode),
}

impl GraphNode {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Project(_) => "Project",
            Self::File(_) => "File",
            Self::Module(_) => "Module",
            Self::Class(_) => "Class",
            Self::Function(_) => "Function",
            Self::Import(_) => "Import",
        }
    }

    pub fn id(&self) -> &str {
        match self {
            Self::Project(n) => n.project_id.as_str(),
            Self::File(n) => n.file_id.as_str(),
            Self::Module(n) => n.module_id.as_str(),
            Self::Class(n) => n.class_id.as_str(),
            Self::Function(n) => n.function_id.as_str(),
            Self::Import(n) => n.import_id.as_str(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EdgeKind {
    Contains,
    DependsOn,
    Calls,
    InheritsFrom,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GraphEdge {
    pub kind: EdgeKind,
    pub source: String,
    pub target: String,
    /// Populated for `Contains` edges.
    pub level: Option<ContainsLevel>,
    /// Populated for `DependsOn` edges (always 1, idempotent per pair) and
    /// `Calls` edges (monotonic non-decreasing re-observation counter).
    pub weight: u32,
}

impl GraphEdge {
    pub fn contains(source: &str, target: &str, level: ContainsLevel) -> Self {
        Self {
            kind: EdgeKind::Contains,
            source: source.to_string(),
            target: target.to_string(),
            level: Some(level),
            weight: 1,
        }
    }

    pub fn depends_on(source: &str, target: &str) -> Self {
        Self {
            kind: EdgeKind::DependsOn,
            source: source.to_string(),
            target: target.to_string(),
            level: None,
            weight: 1,
        }
    }

    pub fn calls(source: &str, target: &str) -> Self {
        Self {
            kind: EdgeKind::Calls,
            source: source.to_string(),
            target: target.to_string(),
            level: None,
            weight: 1,
        }
    }

    pub fn inherits_from(source: &str, target: &str) -> Self {
        Self {
            kind: EdgeKind::InheritsFrom,
            source: source.to_string(),
            target: target.to_string(),
            level: None,
            weight: 1,
        }
    }
}
