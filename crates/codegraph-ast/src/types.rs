//! The projector's intermediate, language-agnostic output shape. Every
//! `LanguageParser` produces this; [`crate::projector`] turns it into the
//! uniform graph schema from `codegraph_core::schema`.

use crate::Language;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionInfo {
    pub name: String,
    pub start_line: u32,
    pub end_line: u32,
    pub complexity: u32,
    pub is_async: bool,
    pub is_method: bool,
    /// Set only for methods; `None` for module-level functions.
    pub class_name: Option<String>,
    pub parameters: Vec<String>,
    pub decorators: Vec<String>,
    /// True if this function is lexically nested inside another function —
    /// it still gets a node, but is excluded from the externally-callable
    /// name index (spec §4.1 tie-break).
    pub is_nested: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassInfo {
    pub name: String,
    pub start_line: u32,
    pub bases: Vec<String>,
    pub decorators: Vec<String>,
    pub methods: Vec<FunctionInfo>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImportInfo {
    pub name: String,
    pub module: String,
    pub alias: Option<String>,
    pub import_type: String,
    pub line: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CallSite {
    /// Qualified name of the enclosing function/method, matching
    /// `FunctionInfo::name` (or `Class.method`) of the caller.
    pub caller: String,
    pub callee_name: String,
    pub line: u32,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct FileMetrics {
    pub total_lines: u32,
    pub comment_lines: u32,
    pub comment_ratio: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SyntaxErrorInfo {
    pub line: u32,
    pub message: String,
}

/// `ParsedFile{module, metrics, errors}` from spec §4.1: `module` is
/// represented here as the flattened functions/classes/imports/call_sites
/// collections (the projector turns these into graph elements).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParsedFile {
    pub path: String,
    pub language: Language,
    pub functions: Vec<FunctionInfo>,
    pub classes: Vec<ClassInfo>,
    pub imports: Vec<ImportInfo>,
    pub call_sites: Vec<CallSite>,
    pub metrics: FileMetrics,
    pub errors: Vec<SyntaxErrorInfo>,
    /// True when one or more `errors` truncated the walk — the rest of
    /// `functions`/`classes`/etc. reflect whatever was parsed up to that
    /// point (spec §4.1: "partial results ... are returned and flagged").
    pub partial: bool,
}

impl Language {
    fn serde_name(&self) -> &'static str {
        self.name()
    }
}

impl Serialize for crate::Language {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(self.serde_name())
    }
}

impl<'de> Deserialize<'de> for crate::Language {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        match s.as_str() {
            "python" => Ok(Self::Python),
            "java" => Ok(Self::Java),
            "rust" => Ok(Self::Rust),
            other => Err(serde::de::Error::custom(format!("unknown language {other}"))),
        }
    }
}
