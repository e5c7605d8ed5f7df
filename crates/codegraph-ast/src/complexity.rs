//! McCabe cyclomatic complexity over a tree-sitter subtree (spec §3, §4.1
//! step 4): `complexity = 1 + sum(decision_points)`, where a decision point
//! is a branch, loop, switch/case arm, exception handler, each
//! short-circuit boolean operator beyond the first operand, or each `if`
//! clause inside a comprehension.

use tree_sitter::Node;

/// Per-language node-kind classification driving the generic walker below.
/// Each language's parser supplies its own table of tree-sitter node kinds;
/// the counting algorithm itself (this module) never changes.
pub struct ComplexityRules {
    /// `if`/`elif`/`else if`, ternary expressions.
    pub branch_kinds: &'static [&'static str],
    /// `for`, `while`, `do-while`.
    pub loop_kinds: &'static [&'static str],
    /// `case`/`when` arms inside a `switch`/`match`.
    pub case_kinds: &'static [&'static str],
    /// `except`/`catch` clauses.
    pub exception_kinds: &'static [&'static str],
    /// Binary `&&`/`||`-shaped nodes. Each node contributes `n - 1` where
    /// `n` is its operand count; tree-sitter represents these as
    /// left-associated binary nodes with exactly 2 operands each, so every
    /// occurrence contributes exactly 1.
    pub short_circuit_kinds: &'static [&'static str],
    /// `if` clauses inside list/dict/set comprehensions.
    pub comprehension_if_kinds: &'static [&'static str],
    /// Node kinds that start a new function's own complexity scope — the
    /// walker counts decision points belonging to the function whose body
    /// was passed in and does not descend into these once nested.
    pub nested_function_kinds: &'static [&'static str],
}

/// Walk `body` and return the McCabe complexity of the function it belongs
/// to (always `>= 1`, per spec §3 invariant).
pub fn compute_complexity(body: Node, source: &[u8], rules: &ComplexityRules) -> u32 {
    let mut decision_points = 0u32;
    walk(body, source, rules, true, &mut decision_points);
    1 + decision_points
}

fn walk(node: Node, source: &[u8], rules: &ComplexityRules, is_root: bool, count: &mut u32) {
    let kind = node.kind();

    if !is_root && rules.nested_function_kinds.contains(&kind) {
        // A nested function/lambda gets its own complexity elsewhere; do
        // not attribute its internal branching to the enclosing function.
        return;
    }

    if rules.branch_kinds.contains(&kind)
        || rules.loop_kinds.contains(&kind)
        || rules.case_kinds.contains(&kind)
        || rules.exception_kinds.contains(&kind)
        || rules.short_circuit_kinds.contains(&kind)
        || rules.comprehension_if_kinds.contains(&kind)
    {
        *count += 1;
    }

    let _ = source;
    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        walk(child, source, rules, false, count);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn minimal_function_has_complexity_one() {
        let rules = ComplexityRules {
            branch_kinds: &[],
            loop_kinds: &[],
            case_kinds: &[],
            exception_kinds: &[],
            short_circuit_kinds: &[],
            comprehension_if_kinds: &[],
            nested_function_kinds: &[],
        };
        let mut parser = tree_sitter::Parser::new();
        parser
            .set_language(&tree_sitter_python::LANGUAGE.into())
            .unwrap();
        let source = b"def f():\n    return 1\n";
        let tree = parser.parse(source, None).unwrap();
        let complexity = compute_complexity(tree.root_node(), source, &rules);
        assert_eq!(complexity, 1);
    }
}
