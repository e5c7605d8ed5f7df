//! Security & audit compliance rollup (spec §6 "Compliance API"), grounded
//! on `security_compliance_service.py`'s `calculate_compliance_score` /
//! `_calculate_risk_level` and the npm-audit severity vocabulary it parses.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VulnerabilitySeverity {
    Low,
    Moderate,
    High,
    Critical,
}

impl VulnerabilitySeverity {
    fn from_str_lossy(s: &str) -> Self {
        match s.to_ascii_lowercase().as_str() {
            "moderate" => Self::Moderate,
            "high" => Self::High,
            "critical" => Self::Critical,
            _ => Self::Low,
        }
    }

    /// `severity_weights` from the Python service.
    fn impact(&self) -> u32 {
        match self {
            Self::Low => 5,
            Self::Moderate => 15,
            Self::High => 40,
            Self::Critical => 80,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Vulnerability {
    pub id: String,
    pub package: String,
    pub severity: VulnerabilitySeverity,
    pub title: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
    Critical,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComplianceReport {
    pub project_id: String,
    pub compliance_score: u32,
    pub vulnerability_count: usize,
    pub risk_level: RiskLevel,
    pub severity_breakdown: HashMap<String, usize>,
}

/// Parses an `npm audit --json`-shaped report into vulnerability records.
/// Unrecognized severities default to `low`, matching the Python parser's
/// `try/except ValueError -> LOW` fallback.
pub fn parse_npm_audit_json(audit_json: &serde_json::Value) -> Vec<Vulnerability> {
    let mut out = Vec::new();
    let Some(vulns) = audit_json.get("vulnerabilities").and_then(|v| v.as_object()) else {
        return out;
    };
    for (id, data) in vulns {
        let severity = data
            .get("severity")
            .and_then(|s| s.as_str())
            .map(VulnerabilitySeverity::from_str_lossy)
            .unwrap_or(VulnerabilitySeverity::Low);
        let package = data.get("name").and_then(|v| v.as_str()).unwrap_or("unknown").to_string();
        let title = data.get("title").and_then(|v| v.as_str()).unwrap_or("No title").to_string();
        out.push(Vulnerability {
            id: id.clone(),
            package,
            severity,
            title,
        });
    }
    out
}

/// `compliance_score = max(0, 100 - (Σimpact + 20*critical + 10*high))`.
pub fn calculate_compliance_score(vulnerabilities: &[Vulnerability]) -> u32 {
    if vulnerabilities.is_empty() {
        return 100;
    }
    let total_impact: u32 = vulnerabilities.iter().map(|v| v.severity.impact()).sum();
    let critical_count = vulnerabilities.iter().filter(|v| v.severity == VulnerabilitySeverity::Critical).count() as u32;
    let high_count = vulnerabilities.iter().filter(|v| v.severity == VulnerabilitySeverity::High).count() as u32;

    let total_penalty = total_impact + critical_count * 20 + high_count * 10;
    100u32.saturating_sub(total_penalty)
}

pub fn risk_level_for(compliance_score: u32) -> RiskLevel {
    if compliance_score >= 90 {
        RiskLevel::Low
    } else if compliance_score >= 70 {
        RiskLevel::Medium
    } else if compliance_score >= 50 {
        RiskLevel::High
    } else {
        RiskLevel::Critical
    }
}

/// Entry point behind `POST /security-compliance/process-audit` (spec §6):
/// parses the audit report and returns the rolled-up report. Persisting the
/// `audit_logs` row is the caller's responsibility (it has the
/// `RelationalStore` handle); this function stays a pure computation.
pub fn process_audit(project_id: &str, audit_json: &serde_json::Value) -> ComplianceReport {
    let vulnerabilities = parse_npm_audit_json(audit_json);
    let compliance_score = calculate_compliance_score(&vulnerabilities);

    let mut severity_breakdown: HashMap<String, usize> = HashMap::new();
    for vuln in &vulnerabilities {
        let key = match vuln.severity {
            VulnerabilitySeverity::Low => "low",
            VulnerabilitySeverity::Moderate => "moderate",
            VulnerabilitySeverity::High => "high",
            VulnerabilitySeverity::Critical => "critical",
        };
        *severity_breakdown.entry(key.to_string()).or_insert(0) += 1;
    }

    ComplianceReport {
        project_id: project_id.to_string(),
        compliance_score,
        vulnerability_count: vulnerabilities.len(),
        risk_level: risk_level_for(compliance_score),
        severity_breakdown,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum QualityGrade {
    APlus,
    A,
    B,
    C,
    D,
    F,
}

impl QualityGrade {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::APlus => "A+",
            Self::A => "A",
            Self::B => "B",
            Self::C => "C",
            Self::D => "D",
            Self::F => "F",
        }
    }
}

/// `GET /security-audit/quality-grade/{project_id}` table, verbatim from
/// spec §6.
pub fn quality_grade(critical_count: u32, high_count: u32, compliance_score: u32) -> QualityGrade {
    if critical_count == 0 && high_count <= 2 && compliance_score >= 95 {
        QualityGrade::APlus
    } else if critical_count == 0 && high_count <= 5 && compliance_score >= 90 {
        QualityGrade::A
    } else if critical_count <= 1 && high_count <= 10 && compliance_score >= 80 {
        QualityGrade::B
    } else if critical_count <= 3 && high_count <= 20 && compliance_score >= 70 {
        QualityGrade::C
    } else if critical_count <= 5 && high_count <= 30 && compliance_score >= 60 {
        QualityGrade::D
    } else {
        QualityGrade::F
    }
}
