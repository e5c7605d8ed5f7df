//! Layer classification and violation detection (spec §4.3 "Layer
//! classification and violations").

use codegraph_core::config::{GoldenStandardSchema, LayerRule};
use codegraph_core::errors::AnalyticsError;
use codegraph_core::schema::{EdgeKind, GraphNode};
use codegraph_core::{FxHashMap, Severity};
use codegraph_store::GraphSnapshot;
use glob::Pattern;
use serde::{Deserialize, Serialize};

use crate::cycles::CycleReport;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ViolationKind {
    Forbidden,
    Disallowed,
    CyclicDependency,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LayerViolation {
    pub kind: ViolationKind,
    pub source_id: String,
    pub target_id: String,
    pub source_layer: Option<String>,
    pub target_layer: Option<String>,
    pub reason: String,
    pub severity: Severity,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct LayerViolationReport {
    pub violations: Vec<LayerViolation>,
}

/// Classifies a candidate string (file path, file basename, or module name)
/// against one layer's patterns.
fn layer_matches(rule: &LayerRule, candidate: &str) -> bool {
    rule.file_patterns.iter().any(|pat| {
        Pattern::new(pat)
            .map(|p| p.matches(candidate))
            .unwrap_or(false)
    })
}

/// First-match-wins classification in schema declaration order (spec §4.3
/// step 1). Tries the full path, falling back to the basename, against
/// every pattern of a layer before moving to the next layer.
fn classify(schema: &GoldenStandardSchema, path: &str, basename: &str) -> Option<String> {
    schema
        .layers
        .iter()
        .find(|layer| layer_matches(layer, path) || layer_matches(layer, basename))
        .map(|layer| layer.name.clone())
}

fn basename(path: &str) -> &str {
    path.rsplit('/').next().unwrap_or(path)
}

/// Classifies every File and Module node in the snapshot. Files are
/// classified by path/basename; Modules have no path, so their declared
/// name stands in for both (spec §4.3 step 2: "infer layer from module name
/// using the same pattern match").
fn classify_all(schema: &GoldenStandardSchema, snapshot: &GraphSnapshot) -> FxHashMap<String, String> {
    let mut classified = FxHashMap::default();
    for node in &snapshot.nodes {
        match node {
            GraphNode::File(f) => {
                if let Some(layer) = classify(schema, &f.path, basename(&f.path)) {
                    classified.insert(f.file_id.as_str().to_string(), layer);
                }
            }
            GraphNode::Module(m) => {
                if let Some(layer) = classify(schema, &m.name, &m.name) {
                    classified.insert(m.module_id.as_str().to_string(), layer);
                }
            }
            _ => {}
        }
    }
    classified
}

pub fn find_layer_violations(
    snapshot: &GraphSnapshot,
    schema: &GoldenStandardSchema,
    cycles: &CycleReport,
) -> Result<LayerViolationReport, AnalyticsError> {
    let classified = classify_all(schema, snapshot);
    let mut violations = Vec::new();

    for edge in &snapshot.edges {
        if edge.kind != EdgeKind::DependsOn {
            continue;
        }
        let Some(source_layer) = classified.get(&edge.source) else {
            continue;
        };
        let Some(target_layer) = classified.get(&edge.target) else {
            continue;
        };
        let Some(rule) = schema.layer(source_layer) else {
            return Err(AnalyticsError::InvalidSchema(format!(
                "layer '{source_layer}' classified but absent from schema"
            )));
        };

        if rule.forbidden_dependencies.contains(target_layer) {
            violations.push(LayerViolation {
                kind: ViolationKind::Forbidden,
                source_id: edge.source.clone(),
                target_id: edge.target.clone(),
                source_layer: Some(source_layer.clone()),
                target_layer: Some(target_layer.clone()),
                reason: format!("layer '{source_layer}' forbids depending on layer '{target_layer}'"),
                severity: Severity::High,
            });
        } else if !rule.allowed_dependencies.is_empty() && !rule.allowed_dependencies.contains(target_layer) {
            violations.push(LayerViolation {
                kind: ViolationKind::Disallowed,
                source_id: edge.source.clone(),
                target_id: edge.target.clone(),
                source_layer: Some(source_layer.clone()),
                target_layer: Some(target_layer.clone()),
                reason: format!(
                    "layer '{source_layer}' only allows {:?}, not '{target_layer}'",
                    rule.allowed_dependencies
                ),
                severity: Severity::High,
            });
        }
    }

    for cycle in &cycles.cycles {
        violations.push(LayerViolation {
            kind: ViolationKind::CyclicDependency,
            source_id: cycle.nodes.first().cloned().unwrap_or_default(),
            target_id: cycle.nodes.last().cloned().unwrap_or_default(),
            source_layer: None,
            target_layer: None,
            reason: format!("dependency cycle of length {}: {}", cycle.length, cycle.nodes.join(" -> ")),
            severity: Severity::Critical,
        });
    }

    Ok(LayerViolationReport { violations })
}
