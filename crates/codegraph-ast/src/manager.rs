//! Dispatches a file to the right [`LanguageParser`] by extension and
//! memoizes results in a [`ParseCache`], mirroring the teacher's
//! `ParserManager`.

use std::path::Path;
use std::sync::Arc;

use codegraph_core::errors::ParseError;
use tracing::debug;

use crate::cache::ParseCache;
use crate::languages::{java::JavaParser, python::PythonParser, rust_lang::RustParser};
use crate::traits::LanguageParser;
use crate::types::ParsedFile;
use crate::Language;

pub struct ParserManager {
    python: PythonParser,
    java: JavaParser,
    rust: RustParser,
    cache: Arc<ParseCache>,
}

impl ParserManager {
    pub fn new(cache_capacity: u64) -> Self {
        Self {
            python: PythonParser::new(),
            java: JavaParser::new(),
            rust: RustParser::new(),
            cache: Arc::new(ParseCache::new(cache_capacity)),
        }
    }

    pub fn parser_for(&self, language: Language) -> &dyn LanguageParser {
        match language {
            Language::Python => &self.python,
            Language::Java => &self.java,
            Language::Rust => &self.rust,
        }
    }

    /// Parse `source` at `path`, detecting the language from its extension.
    /// Returns a cached result when `source`'s content hash was seen before
    /// for that language.
    pub fn parse_file(&self, source: &[u8], path: &Path) -> Result<ParsedFile, ParseError> {
        let extension = path.extension().and_then(|e| e.to_str());
        let language = Language::from_extension(extension).ok_or_else(|| ParseError::UnsupportedLanguage {
            extension: extension.unwrap_or("").to_string(),
        })?;

        let content_hash = crate::languages::common::content_hash(source);
        if let Some(cached) = self.cache.get(content_hash, language) {
            debug!(path = %path.display(), "parse cache hit");
            return Ok(cached);
        }

        let parsed = self.parser_for(language).parse(source, path)?;
        self.cache.insert(content_hash, language, parsed.clone());
        Ok(parsed)
    }

    pub fn cache(&self) -> &ParseCache {
        &self.cache
    }
}

impl Default for ParserManager {
    fn default() -> Self {
        Self::new(10_000)
    }
}
