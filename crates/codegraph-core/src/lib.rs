//! # codegraph-core
//!
//! Foundation crate for the code dependency graph engine.
//! Defines the types, identifiers, errors, config, events, and tracing
//! setup every other crate in the workspace builds on.

#![allow(dead_code)]

pub mod config;
pub mod errors;
pub mod events;
pub mod schema;
pub mod tracing_init;
pub mod types;

pub use config::EngineConfig;
pub use errors::error_code::ErrorCode;
pub use types::collections::{FxHashMap, FxHashSet};
pub use types::identifiers::{ClassId, FileId, FunctionId, ImportId, ModuleId, ProjectId};
pub use types::Severity;
