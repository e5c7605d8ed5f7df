//! Review prompt construction and oracle-response parsing/validation (spec
//! §4.4 steps 6-8). Prompt *shapes* are a template-level concern (spec §9
//! "LLM as oracle"); this module owns only the fields the spec pins down.

use serde::Deserialize;

use crate::context::ContextBundle;
use crate::diff::truncate_diff;
use crate::model::{Issue, IssueSeverity, IssueType};

pub const SYSTEM_PROMPT: &str = "You are an automated code reviewer. Respond with a single JSON object only: \
{\"issues\": [{\"type\", \"severity\", \"confidence\", \"file\", \"line\", \"title\", \"description\", \"suggestion\", \"example\"}], \
\"summary\", \"risk_score\"}. severity is one of low/medium/high/critical, type is one of quality/security/performance/style/bug, \
confidence and risk_score are integers 0-100.";

pub struct PromptInputs<'a> {
    pub repo: &'a str,
    pub pr_title: &'a str,
    pub pr_body: Option<&'a str>,
    pub file_count: usize,
    pub primary_language: &'a str,
    pub context_bundle: &'a ContextBundle,
    pub baseline_rules: Option<&'a str>,
    pub unified_diff: &'a str,
}

/// Step 6: repo identity, PR title/body, file count, primary language, the
/// context bundle, optional baseline rules, and the truncated diff.
pub fn build_user_prompt(inputs: &PromptInputs, diff_max_lines: usize) -> String {
    let truncated_diff = truncate_diff(inputs.unified_diff, diff_max_lines);

    let mut prompt = String::new();
    prompt.push_str(&format!("Repository: {}\n", inputs.repo));
    prompt.push_str(&format!("Pull request: {}\n", inputs.pr_title));
    if let Some(body) = inputs.pr_body {
        prompt.push_str(&format!("Description: {body}\n"));
    }
    prompt.push_str(&format!("Files changed: {}\n", inputs.file_count));
    prompt.push_str(&format!("Primary language: {}\n\n", inputs.primary_language));
    prompt.push_str(&inputs.context_bundle.text);
    prompt.push('\n');
    if let Some(rules) = inputs.baseline_rules {
        prompt.push_str("Baseline rules:\n");
        prompt.push_str(rules);
        prompt.push('\n');
    }
    prompt.push_str("\nUnified diff:\n");
    prompt.push_str(&truncated_diff);
    prompt
}

#[derive(Debug, Deserialize)]
struct RawOracleResponse {
    issues: Vec<RawIssue>,
    summary: String,
    risk_score: i64,
}

#[derive(Debug, Deserialize)]
struct RawIssue {
    #[serde(rename = "type")]
    issue_type: String,
    severity: String,
    confidence: i64,
    file: String,
    line: i64,
    title: String,
    description: String,
    suggestion: String,
    example: Option<String>,
}

pub struct ValidatedOracleResponse {
    pub issues: Vec<Issue>,
    pub summary: String,
    pub risk_score: u32,
}

/// Step 7-8: strict-JSON parse, then clamp/coerce every field into its
/// valid range rather than rejecting the whole response for one bad field.
pub fn parse_and_validate(raw_content: &str) -> Result<ValidatedOracleResponse, serde_json::Error> {
    let raw: RawOracleResponse = serde_json::from_str(raw_content)?;

    let issues = raw
        .issues
        .into_iter()
        .map(|i| Issue {
            issue_type: IssueType::from_str_lossy(&i.issue_type),
            severity: IssueSeverity::from_str_lossy(&i.severity),
            confidence: i.confidence.clamp(0, 100) as u32,
            file: i.file,
            line: i.line.max(0) as u32,
            title: i.title,
            description: i.description,
            suggestion: i.suggestion,
            example: i.example,
        })
        .collect();

    Ok(ValidatedOracleResponse {
        issues,
        summary: raw.summary,
        risk_score: raw.risk_score.clamp(0, 100) as u32,
    })
}
