//! Content-stable identifier schemes for graph nodes (spec §3).
//!
//! Every identifier is a newtype over `String` built from a deterministic
//! format, so reparsing an unchanged file reproduces byte-identical ids.

use serde::{Deserialize, Serialize};
use std::fmt;

macro_rules! string_id {
    ($name:ident) => {
        #[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub String);

        impl $name {
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<String> for $name {
            fn from(s: String) -> Self {
                Self(s)
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                Self(s.to_string())
            }
        }
    };
}

string_id!(ProjectId);
string_id!(FileId);
string_id!(ModuleId);
string_id!(ClassId);
string_id!(FunctionId);
string_id!(ImportId);

impl FileId {
    /// `"{projectId}::{path}"`
    pub fn new(project: &ProjectId, path: &str) -> Self {
        Self(format!("{}::{}", project.0, path))
    }
}

impl ClassId {
    /// `"{projectId}::{path}::{name}"`, disambiguated by `startLine` when a
    /// duplicate declaration is found in the same file (spec §4.1 tie-break).
    pub fn new(project: &ProjectId, path: &str, name: &str) -> Self {
        Self(format!("{}::{}::{}", project.0, path, name))
    }

    pub fn disambiguated(project: &ProjectId, path: &str, name: &str, start_line: u32) -> Self {
        Self(format!("{}::{}::{}@{}", project.0, path, name, start_line))
    }
}

impl FunctionId {
    /// Module-level function: `"{projectId}::{path}::{name}"`.
    pub fn for_module_function(project: &ProjectId, path: &str, name: &str) -> Self {
        Self(format!("{}::{}::{}", project.0, path, name))
    }

    /// Method: `"{classId}::{name}"`.
    pub fn for_method(class: &ClassId, name: &str) -> Self {
        Self(format!("{}::{}", class.0, name))
    }

    pub fn disambiguated(base: &FunctionId, start_line: u32) -> Self {
        Self(format!("{}@{}", base.0, start_line))
    }
}

impl ImportId {
    pub fn new(project: &ProjectId, path: &str, name: &str) -> Self {
        Self(format!("{}::{}::{}", project.0, path, name))
    }
}
