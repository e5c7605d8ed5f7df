//! # codegraph-ast
//!
//! The AST Projector (spec §4.1): language-specific parsers that read a
//! file's text and emit a uniform set of graph elements plus per-function
//! complexity and file-level metrics. Adding a language means implementing
//! [`traits::LanguageParser`]; no other component changes.

pub mod cache;
pub mod complexity;
pub mod language_detect;
pub mod languages;
pub mod manager;
pub mod projector;
pub mod traits;
pub mod types;

pub use language_detect::Language;
pub use manager::ParserManager;
pub use projector::{project_file, ProjectionError};
pub use types::ParsedFile;
