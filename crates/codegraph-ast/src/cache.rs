//! In-memory parse cache using Moka, keyed by `(content_hash, language)` so
//! identical bytes parsed as different languages never collide.

use crate::types::ParsedFile;
use crate::Language;
use moka::sync::Cache;

type CacheKey = (u64, Language);

pub struct ParseCache {
    inner: Cache<CacheKey, ParsedFile>,
}

impl ParseCache {
    pub fn new(capacity: u64) -> Self {
        Self {
            inner: Cache::new(capacity),
        }
    }

    pub fn get(&self, content_hash: u64, lang: Language) -> Option<ParsedFile> {
        self.inner.get(&(content_hash, lang))
    }

    pub fn insert(&self, content_hash: u64, lang: Language, result: ParsedFile) {
        self.inner.insert((content_hash, lang), result);
    }

    pub fn entry_count(&self) -> u64 {
        self.inner.entry_count()
    }

    pub fn invalidate(&self, content_hash: u64, lang: Language) {
        self.inner.invalidate(&(content_hash, lang));
    }
}

impl Default for ParseCache {
    fn default() -> Self {
        Self::new(10_000)
    }
}
