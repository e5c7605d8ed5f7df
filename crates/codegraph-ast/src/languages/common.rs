use codegraph_core::FxHashMap;
use tree_sitter::Node;

/// UTF-8 text of a node, empty string if the slice isn't valid UTF-8 (should
/// not happen — input is validated UTF-8 before parsing).
pub fn text<'a>(node: Node, source: &'a [u8]) -> &'a str {
    node.utf8_text(source).unwrap_or("")
}

pub fn line_of(node: Node) -> u32 {
    node.start_position().row as u32 + 1
}

pub fn end_line_of(node: Node) -> u32 {
    node.end_position().row as u32 + 1
}

/// Appends `@{start_line}` to any name already seen in `seen` for this file,
/// implementing spec §4.1's duplicate-declaration tie-break.
pub fn disambiguate(seen: &mut FxHashMap<String, u32>, name: &str, start_line: u32) -> String {
    let count = seen.entry(name.to_string()).or_insert(0);
    *count += 1;
    if *count == 1 {
        name.to_string()
    } else {
        format!("{name}@{start_line}")
    }
}

pub fn content_hash(bytes: &[u8]) -> u64 {
    xxhash_rust::xxh3::xxh3_64(bytes)
}
