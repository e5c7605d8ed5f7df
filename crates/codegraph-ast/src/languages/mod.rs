//! One module per supported language (spec §4.1: "At minimum: the source
//! language of the repository under analysis [Rust], plus one general-
//! purpose scripting language [Python], plus one statically typed
//! curly-brace family language [Java]").

pub mod common;
pub mod java;
pub mod metrics;
pub mod python;
pub mod rust_lang;
