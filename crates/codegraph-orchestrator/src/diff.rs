//! Diff truncation policy (spec §4.4 step 6): retain every file header and
//! added/removed line; interleaved context lines are kept only up to a
//! total-line cap. A single marker line is appended if anything was cut.

pub const DEFAULT_DIFF_MAX_LINES: usize = 800;

const TRUNCATION_MARKER: &str = "... [diff truncated, remaining context lines omitted] ...";

fn is_header(line: &str) -> bool {
    line.starts_with("diff --git")
        || line.starts_with("index ")
        || line.starts_with("--- ")
        || line.starts_with("+++ ")
        || line.starts_with("@@")
}

fn is_change(line: &str) -> bool {
    (line.starts_with('+') && !line.starts_with("+++")) || (line.starts_with('-') && !line.starts_with("---"))
}

/// Applies the cap: headers and +/- lines are never dropped; plain context
/// lines are dropped first, starting from wherever the running total first
/// exceeds `max_lines`.
pub fn truncate_diff(unified_diff: &str, max_lines: usize) -> String {
    let lines: Vec<&str> = unified_diff.lines().collect();
    let must_keep: Vec<bool> = lines.iter().map(|l| is_header(l) || is_change(l)).collect();
    let must_keep_count = must_keep.iter().filter(|k| **k).count();

    if lines.len() <= max_lines {
        return unified_diff.to_string();
    }

    let mut budget = max_lines.saturating_sub(must_keep_count);
    let mut out = Vec::with_capacity(max_lines + 1);
    let mut truncated = false;

    for (line, keep) in lines.iter().zip(must_keep.iter()) {
        if *keep {
            out.push(*line);
        } else if budget > 0 {
            out.push(*line);
            budget -= 1;
        } else {
            truncated = true;
        }
    }

    if truncated {
        out.push(TRUNCATION_MARKER);
    }
    out.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_diff_is_unchanged() {
        let diff = "diff --git a/a.py b/a.py\n+++ b/a.py\n@@ -1,1 +1,2 @@\n+print(1)\n context";
        assert_eq!(truncate_diff(diff, 800), diff);
    }

    #[test]
    fn long_diff_drops_context_lines_first_and_keeps_changes() {
        let mut lines = vec!["diff --git a/a.py b/a.py".to_string(), "+++ b/a.py".to_string()];
        for i in 0..2000 {
            lines.push(format!(" context line {i}"));
        }
        lines.push("+added line".to_string());
        let diff = lines.join("\n");

        let truncated = truncate_diff(&diff, 100);
        assert!(truncated.contains("diff --git"));
        assert!(truncated.contains("+added line"));
        assert!(truncated.contains("truncated"));
        assert!(truncated.lines().count() <= 101);
    }
}
