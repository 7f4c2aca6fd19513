//! Driver-level configuration consumed by the Compiler: performance mode,
//! scheduling priority, and the cache directory/version pair, deserializable
//! from TOML the way callers in this ecosystem configure pipelines.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PerformanceMode {
    Normal,
    Low,
    High,
    Extreme,
}

impl Default for PerformanceMode {
    fn default() -> Self {
        PerformanceMode::Normal
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    Low,
    Medium,
    High,
}

impl Default for Priority {
    fn default() -> Self {
        Priority::Medium
    }
}

/// Compiler driver configuration (§4.9). `cache_dir`/`version` are both
/// required for a cache attempt; omitting either skips straight to compile.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CompileConfig {
    #[serde(default)]
    pub enable_float16: bool,
    #[serde(default)]
    pub perf_mode: PerformanceMode,
    #[serde(default)]
    pub priority: Priority,
    #[serde(default)]
    pub cache_dir: Option<PathBuf>,
    #[serde(default)]
    pub version: Option<i64>,
}

impl CompileConfig {
    pub fn from_toml_str(text: &str) -> anyhow::Result<Self> {
        let config = toml::from_str(text)?;
        Ok(config)
    }

    /// Whether this config asks the compiler to attempt a cache round-trip.
    pub fn cache_enabled(&self) -> bool {
        self.cache_dir.is_some() && self.version.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_skip_the_cache() {
        let config = CompileConfig::default();
        assert!(!config.cache_enabled());
    }

    #[test]
    fn parses_from_toml() {
        let text = r#"
            enable_float16 = true
            perf_mode = "high"
            priority = "high"
            cache_dir = "/tmp/nnrt-cache"
            version = 3
        "#;
        let config = CompileConfig::from_toml_str(text).unwrap();
        assert!(config.enable_float16);
        assert_eq!(config.perf_mode, PerformanceMode::High);
        assert_eq!(config.priority, Priority::High);
        assert!(config.cache_enabled());
        assert_eq!(config.version, Some(3));
    }
}
