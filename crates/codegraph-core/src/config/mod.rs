//! Engine configuration, following `drift-core::config::ScanConfig`'s shape:
//! an all-optional, `#[serde(default)]` struct with `effective_*` accessors
//! that apply the documented defaults, loadable from TOML and overridable
//! by environment variables for secrets/connection strings (spec §6).

mod golden_standard;

pub use golden_standard::{DriftThresholds, GoldenStandardSchema, LayerRule};

use serde::{Deserialize, Serialize};
use std::env;

/// Top-level engine configuration (spec §6 "Environment variables").
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct EngineConfig {
    pub ast: AstConfig,
    pub fabric: FabricConfig,
    pub orchestrator: OrchestratorConfig,
    /// Connection string for the relational store. Overridden by
    /// `DATABASE_URL` if set.
    pub database_url: Option<String>,
    /// Connection string / path for the graph store. Overridden by
    /// `GRAPH_DATABASE_PATH` if set.
    pub graph_database_path: Option<String>,
    /// Connection string for the cache. Overridden by `CACHE_URL` if set.
    pub cache_url: Option<String>,
}

impl EngineConfig {
    pub fn from_toml_str(s: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(s)
    }

    /// Apply environment-variable overrides on top of file-loaded config,
    /// per spec §6's named variables.
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(v) = env::var("DATABASE_URL") {
            self.database_url = Some(v);
        }
        if let Ok(v) = env::var("GRAPH_DATABASE_PATH") {
            self.graph_database_path = Some(v);
        }
        if let Ok(v) = env::var("CACHE_URL") {
            self.cache_url = Some(v);
        }
        if let Some(v) = env::var("MAX_RETRIES").ok().and_then(|s| s.parse().ok()) {
            self.fabric.max_retries = Some(v);
        }
        if let Some(v) = env::var("LOCK_DEFAULT_TTL_SECS")
            .ok()
            .and_then(|s| s.parse().ok())
        {
            self.fabric.lock_default_ttl_secs = Some(v);
        }
        if let Some(v) = env::var("TASK_DEADLINE_SECS")
            .ok()
            .and_then(|s| s.parse().ok())
        {
            self.orchestrator.task_deadline_secs = Some(v);
        }
        if let Some(v) = env::var("DIFF_MAX_LINES").ok().and_then(|s| s.parse().ok()) {
            self.orchestrator.diff_max_lines = Some(v);
        }
        self
    }
}

/// AST Projector tunables (spec §4.1).
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct AstConfig {
    /// Maximum file size in bytes. Default: 1 MiB.
    pub max_file_size: Option<u64>,
    pub parse_cache_capacity: Option<u64>,
}

impl AstConfig {
    pub fn effective_max_file_size(&self) -> u64 {
        self.max_file_size.unwrap_or(1_048_576)
    }

    pub fn effective_parse_cache_capacity(&self) -> u64 {
        self.parse_cache_capacity.unwrap_or(10_000)
    }
}

/// Task Fabric tunables (spec §4.5).
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct FabricConfig {
    pub max_retries: Option<u32>,
    pub retry_initial_delay_ms: Option<u64>,
    pub retry_max_delay_ms: Option<u64>,
    pub retry_exponential_base: Option<f64>,
    pub retry_jitter: Option<bool>,
    pub lock_default_ttl_secs: Option<u64>,
    pub webhook_dedup_ttl_secs: Option<u64>,
    pub rate_limit_window_secs: Option<u64>,
    pub rate_limit_max_requests: Option<u32>,
    pub context_memo_ttl_secs: Option<u64>,
}

impl FabricConfig {
    pub fn effective_max_retries(&self) -> u32 {
        self.max_retries.unwrap_or(3)
    }
    pub fn effective_retry_initial_delay_ms(&self) -> u64 {
        self.retry_initial_delay_ms.unwrap_or(1_000)
    }
    pub fn effective_retry_max_delay_ms(&self) -> u64 {
        self.retry_max_delay_ms.unwrap_or(60_000)
    }
    pub fn effective_retry_exponential_base(&self) -> f64 {
        self.retry_exponential_base.unwrap_or(2.0)
    }
    pub fn effective_retry_jitter(&self) -> bool {
        self.retry_jitter.unwrap_or(true)
    }
    pub fn effective_lock_default_ttl_secs(&self) -> u64 {
        self.lock_default_ttl_secs.unwrap_or(1_800)
    }
    pub fn effective_webhook_dedup_ttl_secs(&self) -> u64 {
        self.webhook_dedup_ttl_secs.unwrap_or(86_400)
    }
    pub fn effective_rate_limit_window_secs(&self) -> u64 {
        self.rate_limit_window_secs.unwrap_or(60)
    }
    pub fn effective_rate_limit_max_requests(&self) -> u32 {
        self.rate_limit_max_requests.unwrap_or(60)
    }
    pub fn effective_context_memo_ttl_secs(&self) -> u64 {
        self.context_memo_ttl_secs.unwrap_or(3_600)
    }
}

/// Review Orchestrator tunables (spec §4.4, §5).
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct OrchestratorConfig {
    pub task_deadline_secs: Option<u64>,
    pub llm_inner_timeout_secs: Option<u64>,
    pub diff_max_lines: Option<usize>,
    pub llm_temperature: Option<f32>,
}

impl OrchestratorConfig {
    pub fn effective_task_deadline_secs(&self) -> u64 {
        self.task_deadline_secs.unwrap_or(1_800)
    }
    pub fn effective_llm_inner_timeout_secs(&self) -> u64 {
        self.llm_inner_timeout_secs.unwrap_or(120)
    }
    pub fn effective_diff_max_lines(&self) -> usize {
        self.diff_max_lines.unwrap_or(800)
    }
    pub fn effective_llm_temperature(&self) -> f32 {
        self.llm_temperature.unwrap_or(0.3)
    }
}
