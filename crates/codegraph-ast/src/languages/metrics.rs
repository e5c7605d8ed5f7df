use crate::types::FileMetrics;
use crate::Language;

/// Line-based metrics (spec §4.1: "a small set of file-level metrics:
/// total lines, comment lines, comment ratio"). Deliberately simple —
/// a per-line scan, not a full AST pass — since these are advisory
/// metrics, not inputs to any invariant.
pub fn compute_file_metrics(source: &str, language: Language) -> FileMetrics {
    let lines: Vec<&str> = source.split('\n').collect();
    let total_lines = if source.ends_with('\n') {
        lines.len().saturating_sub(1)
    } else {
        lines.len()
    } as u32;

    let mut comment_lines = 0u32;
    let mut in_block_comment = false;

    for line in lines.iter().take(total_lines as usize) {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        match language {
            Language::Python => {
                if trimmed.starts_with('#') {
                    comment_lines += 1;
                }
            }
            Language::Java | Language::Rust => {
                if in_block_comment {
                    comment_lines += 1;
                    if trimmed.contains("*/") {
                        in_block_comment = false;
                    }
                    continue;
                }
                if trimmed.starts_with("//") {
                    comment_lines += 1;
                } else if trimmed.starts_with("/*") {
                    comment_lines += 1;
                    if !trimmed.contains("*/") {
                        in_block_comment = true;
                    }
                }
            }
        }
    }

    let comment_ratio = if total_lines == 0 {
        0.0
    } else {
        comment_lines as f64 / total_lines as f64
    };

    FileMetrics {
        total_lines,
        comment_lines,
        comment_ratio,
    }
}
