//! Extension-based language detection, matching the teacher's
//! `scanner::language_detect::Language`.

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Language {
    Python,
    Java,
    Rust,
}

impl Language {
    pub fn from_extension(extension: Option<&str>) -> Option<Self> {
        match extension {
            Some("py") | Some("pyi") => Some(Self::Python),
            Some("java") => Some(Self::Java),
            Some("rs") => Some(Self::Rust),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Python => "python",
            Self::Java => "java",
            Self::Rust => "rust",
        }
    }
}
