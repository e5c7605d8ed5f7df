use crate::types::ParsedFile;
use crate::Language;
use codegraph_core::errors::ParseError;
use std::path::Path;

/// Implemented once per supported language (spec §4.1: "a tagged-variant
/// family over a common output type"). The orchestrator/manager selects an
/// implementation by file extension; adding a language means adding one
/// more `impl`, not touching callers.
pub trait LanguageParser: Send + Sync {
    fn language(&self) -> Language;

    /// Parse `source` (the full file text) at `path` into a [`ParsedFile`].
    /// Must be deterministic: identical bytes in, byte-identical (modulo
    /// map/set ordering, which callers normalize) output out.
    fn parse(&self, source: &[u8], path: &Path) -> Result<ParsedFile, ParseError>;
}
