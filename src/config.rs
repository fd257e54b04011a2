use std::path::Path;
use std::time::Duration;

use anyhow::{Result, ensure};
use serde::Deserialize;

use crate::error::Error;

/// How navigation treats the collection boundaries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum NavigationMode {
    /// Clip the window at index 0 and the last item.
    #[default]
    Linear,
    /// Wrap the window around the ends of the collection.
    Circular,
}

/// Engine options. Passed explicitly at construction, replaceable at runtime
/// via `reconfigure`. Recognized options only; unknown keys are rejected.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct EngineConfiguration {
    /// Upper bound on the window radius. The collection-size tier table
    /// picks the working radius underneath this cap.
    #[serde(default = "EngineConfiguration::default_window_radius")]
    pub window_radius: usize,

    /// Byte budget for the primary cache.
    #[serde(default = "EngineConfiguration::default_memory_budget_bytes")]
    pub memory_budget_bytes: usize,

    /// Byte budget for the second-chance LRU tier. Zero disables the tier.
    #[serde(default = "EngineConfiguration::default_lru_budget_bytes")]
    pub lru_budget_bytes: usize,

    /// Upper bound on concurrent decodes. The tier table picks the working
    /// pool size underneath this cap.
    #[serde(default = "EngineConfiguration::default_max_concurrent_decodes")]
    pub max_concurrent_decodes: usize,

    /// A decode exceeding this ceiling is treated as failed and its worker
    /// slot freed.
    #[serde(
        default = "EngineConfiguration::default_decode_timeout",
        with = "humantime_serde"
    )]
    pub decode_timeout: Duration,

    /// Cadence of the periodic cleanup pass.
    #[serde(
        default = "EngineConfiguration::default_cleanup_interval",
        with = "humantime_serde"
    )]
    pub cleanup_interval: Duration,

    #[serde(default)]
    pub navigation: NavigationMode,
}

impl Default for EngineConfiguration {
    fn default() -> Self {
        Self {
            window_radius: Self::default_window_radius(),
            memory_budget_bytes: Self::default_memory_budget_bytes(),
            lru_budget_bytes: Self::default_lru_budget_bytes(),
            max_concurrent_decodes: Self::default_max_concurrent_decodes(),
            decode_timeout: Self::default_decode_timeout(),
            cleanup_interval: Self::default_cleanup_interval(),
            navigation: NavigationMode::default(),
        }
    }
}

impl EngineConfiguration {
    const fn default_window_radius() -> usize {
        400
    }

    const fn default_memory_budget_bytes() -> usize {
        512 * 1024 * 1024
    }

    const fn default_lru_budget_bytes() -> usize {
        128 * 1024 * 1024
    }

    const fn default_max_concurrent_decodes() -> usize {
        16
    }

    const fn default_decode_timeout() -> Duration {
        Duration::from_secs(20)
    }

    const fn default_cleanup_interval() -> Duration {
        Duration::from_secs(5)
    }

    pub fn validate(&self) -> Result<()> {
        ensure!(self.window_radius >= 1, "window-radius must be at least 1");
        ensure!(
            self.memory_budget_bytes > 0,
            "memory-budget-bytes must be positive"
        );
        ensure!(
            (1..=50).contains(&self.max_concurrent_decodes),
            "max-concurrent-decodes must be between 1 and 50"
        );
        ensure!(
            !self.decode_timeout.is_zero(),
            "decode-timeout must be positive"
        );
        ensure!(
            self.cleanup_interval >= Duration::from_millis(100),
            "cleanup-interval must be at least 100ms"
        );
        Ok(())
    }
}

/// Load an [`EngineConfiguration`] from a YAML file.
pub fn from_yaml_file(path: &Path) -> Result<EngineConfiguration, Error> {
    let text = std::fs::read_to_string(path)?;
    let cfg = serde_yaml::from_str(&text)?;
    Ok(cfg)
}

/// Collection-size band. Selected once per collection and forced down one
/// step at a time under sustained memory pressure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum TierLevel {
    Tiny,
    Small,
    Medium,
    Massive,
    Extreme,
}

impl TierLevel {
    pub fn for_collection(size: usize) -> Self {
        match size {
            0..=100 => Self::Tiny,
            101..=1_000 => Self::Small,
            1_001..=10_000 => Self::Medium,
            10_001..=50_000 => Self::Massive,
            _ => Self::Extreme,
        }
    }

    fn step_down(self) -> Self {
        match self {
            Self::Extreme => Self::Massive,
            Self::Massive => Self::Medium,
            Self::Medium => Self::Small,
            Self::Small | Self::Tiny => Self::Tiny,
        }
    }

    fn base_concurrency(self) -> usize {
        match self {
            Self::Tiny => 2,
            Self::Small => 4,
            Self::Medium => 6,
            Self::Massive => 8,
            Self::Extreme => 12,
        }
    }
}

/// The working parameters derived from configuration, collection size, and
/// any pressure demotions currently in force.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TierProfile {
    pub level: TierLevel,
    pub window_radius: usize,
    pub max_concurrent_decodes: usize,
    pub memory_budget_bytes: usize,
}

impl TierProfile {
    /// Select the active tier. Each demotion step drops one size band and
    /// halves the configured radius cap, so a demoted tier always yields a
    /// strictly smaller window on the next recompute.
    pub fn select(cfg: &EngineConfiguration, collection_size: usize, demotions: u32) -> Self {
        let mut level = TierLevel::for_collection(collection_size);
        for _ in 0..demotions {
            level = level.step_down();
        }
        let cap = (cfg.window_radius >> demotions.min(8)).max(1);
        let window_radius = match level {
            TierLevel::Tiny => cap.min(collection_size),
            TierLevel::Small => cap.min((collection_size / 10).max(25)),
            TierLevel::Medium => cap.min((collection_size / 50).max(50)),
            TierLevel::Massive => cap.min(collection_size / 100).max(100),
            TierLevel::Extreme => cap.min(collection_size / 100).max(250),
        };
        let max_concurrent_decodes = level
            .base_concurrency()
            .min(cfg.max_concurrent_decodes)
            .max(1);
        Self {
            level,
            window_radius,
            max_concurrent_decodes,
            memory_budget_bytes: cfg.memory_budget_bytes,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tier_levels_follow_collection_size() {
        assert_eq!(TierLevel::for_collection(0), TierLevel::Tiny);
        assert_eq!(TierLevel::for_collection(100), TierLevel::Tiny);
        assert_eq!(TierLevel::for_collection(101), TierLevel::Small);
        assert_eq!(TierLevel::for_collection(1_000), TierLevel::Small);
        assert_eq!(TierLevel::for_collection(10_000), TierLevel::Medium);
        assert_eq!(TierLevel::for_collection(50_000), TierLevel::Massive);
        assert_eq!(TierLevel::for_collection(60_000), TierLevel::Extreme);
    }

    #[test]
    fn tiny_collections_are_fully_resident() {
        let cfg = EngineConfiguration::default();
        let tier = TierProfile::select(&cfg, 40, 0);
        assert_eq!(tier.window_radius, 40);
    }

    #[test]
    fn extreme_tier_has_radius_floor() {
        let cfg = EngineConfiguration {
            window_radius: 260,
            ..Default::default()
        };
        let tier = TierProfile::select(&cfg, 60_000, 0);
        assert_eq!(tier.level, TierLevel::Extreme);
        assert!(tier.window_radius >= 250);
    }

    #[test]
    fn demotion_shrinks_radius_and_concurrency() {
        let cfg = EngineConfiguration::default();
        let full = TierProfile::select(&cfg, 60_000, 0);
        let demoted = TierProfile::select(&cfg, 60_000, 1);
        assert_eq!(demoted.level, TierLevel::Massive);
        assert!(demoted.window_radius < full.window_radius);
        assert!(demoted.max_concurrent_decodes < full.max_concurrent_decodes);
    }

    #[test]
    fn concurrency_respects_configured_cap() {
        let cfg = EngineConfiguration {
            max_concurrent_decodes: 3,
            ..Default::default()
        };
        let tier = TierProfile::select(&cfg, 60_000, 0);
        assert_eq!(tier.max_concurrent_decodes, 3);
    }

    #[test]
    fn validate_rejects_out_of_range_options() {
        let mut cfg = EngineConfiguration::default();
        cfg.max_concurrent_decodes = 0;
        assert!(cfg.validate().is_err());
        cfg.max_concurrent_decodes = 51;
        assert!(cfg.validate().is_err());
        cfg.max_concurrent_decodes = 50;
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn yaml_round_trip_with_defaults() {
        let cfg: EngineConfiguration = serde_yaml::from_str(
            "window-radius: 32\nmemory-budget-bytes: 1048576\ndecode-timeout: 5s\n",
        )
        .unwrap();
        assert_eq!(cfg.window_radius, 32);
        assert_eq!(cfg.memory_budget_bytes, 1_048_576);
        assert_eq!(cfg.decode_timeout, Duration::from_secs(5));
        assert_eq!(cfg.navigation, NavigationMode::Linear);
        cfg.validate().unwrap();
    }

    #[test]
    fn yaml_rejects_unknown_options() {
        let parsed: Result<EngineConfiguration, _> = serde_yaml::from_str("frobnicate: true\n");
        assert!(parsed.is_err());
    }
}
