//! The golden-standard layer schema (spec §3 "Golden-standard schema").

use crate::types::FxHashSet;
use serde::{Deserialize, Serialize};

/// A declared architectural layer: which files belong to it, and what it
/// may/must-not depend on.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LayerRule {
    pub name: String,
    /// Glob patterns matched against file-name and path, in priority order
    /// within the rule (first match inside this rule wins no meaning beyond
    /// "any pattern matches"); layer *declaration order* in the schema is
    /// what decides first-match-wins across layers (spec §4.3 step 1).
    pub file_patterns: Vec<String>,
    #[serde(default)]
    pub allowed_dependencies: FxHashSet<String>,
    #[serde(default)]
    pub forbidden_dependencies: FxHashSet<String>,
}

/// Integer violation-count limits that turn a count into a pass/fail
/// verdict (spec §4.3 "Drift score").
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct DriftThresholds {
    pub critical: u32,
    pub high: u32,
    pub medium: u32,
    pub low: u32,
}

impl Default for DriftThresholds {
    fn default() -> Self {
        Self {
            critical: 0,
            high: 3,
            medium: 10,
            low: 25,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GoldenStandardSchema {
    pub version: String,
    /// Layers in declaration order — classification tests them in this
    /// order and the first match wins.
    pub layers: Vec<LayerRule>,
    pub thresholds: DriftThresholds,
}

impl GoldenStandardSchema {
    pub fn layer(&self, name: &str) -> Option<&LayerRule> {
        self.layers.iter().find(|l| l.name == name)
    }
}
