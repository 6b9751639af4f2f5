//! Configuration structs with sensible defaults and RON persistence.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Top-level configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    /// Looping animation settings.
    pub animation: AnimationConfig,
    /// Metrics and risk classification settings.
    pub metrics: MetricsConfig,
    /// Distance-range to scale-factor bucket table.
    pub scale: ScaleConfig,
    /// Debug/development settings.
    pub debug: DebugConfig,
    /// Host frame loop settings.
    pub host: HostConfig,
}

/// Animation configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AnimationConfig {
    /// Length of one pass along the trajectory in milliseconds.
    pub duration_ms: u64,
    /// Frame rate the synthetic fallback curves were tuned at. Per-frame
    /// rates are multiplied by this to get per-second rates.
    pub reference_fps: f64,
}

/// Metrics configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct MetricsConfig {
    /// Seconds between consecutive samples, used when the payload has no `dt`.
    pub step_interval_s: f64,
    /// Risk tier distance thresholds.
    pub risk: RiskConfig,
    /// Number of leading per-step speeds reported in the speed profile.
    pub speed_profile_len: usize,
}

/// Risk tier thresholds in kilometers. Illustrative defaults, not physics.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct RiskConfig {
    /// Minimum approach distance below which the risk is high.
    pub high_below_km: f64,
    /// Minimum approach distance below which the risk is medium.
    pub medium_below_km: f64,
}

/// One row of the scale table: ranges strictly above `above_km` use `factor`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct ScaleBucket {
    /// Lower (exclusive) bound of the distance range in kilometers.
    pub above_km: f64,
    /// Scale factor applied to kilometer coordinates.
    pub factor: f64,
}

/// Scale bucket table.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ScaleConfig {
    /// Buckets, checked from the largest threshold down.
    pub buckets: Vec<ScaleBucket>,
    /// Factor used when no bucket matches.
    pub default_factor: f64,
}

/// Debug/development configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DebugConfig {
    /// Log level override (e.g., "debug", "info", "warn").
    pub log_level: String,
    /// Run the HTTP status server (debug builds only).
    pub status_server: bool,
    /// Port for the status server.
    pub status_port: u16,
}

/// Host frame loop configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct HostConfig {
    /// Frames to run before exiting (0 = until a quit command arrives).
    pub frames: u64,
    /// Target frame rate of the host loop.
    pub target_fps: u32,
}

// --- Default implementations ---

impl Default for AnimationConfig {
    fn default() -> Self {
        Self {
            duration_ms: 8000,
            reference_fps: 60.0,
        }
    }
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            step_interval_s: 0.5,
            risk: RiskConfig::default(),
            speed_profile_len: 20,
        }
    }
}

impl Default for RiskConfig {
    fn default() -> Self {
        Self {
            high_below_km: 1_000.0,
            medium_below_km: 10_000.0,
        }
    }
}

impl Default for ScaleConfig {
    fn default() -> Self {
        Self {
            buckets: vec![
                ScaleBucket {
                    above_km: 1_000_000.0,
                    factor: 0.0001,
                },
                ScaleBucket {
                    above_km: 100_000.0,
                    factor: 0.001,
                },
                ScaleBucket {
                    above_km: 10_000.0,
                    factor: 0.01,
                },
            ],
            default_factor: 0.1,
        }
    }
}

impl Default for DebugConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            status_server: false,
            status_port: 9999,
        }
    }
}

impl Default for HostConfig {
    fn default() -> Self {
        Self {
            frames: 600,
            target_fps: 60,
        }
    }
}

// --- Validation ---

impl ScaleConfig {
    /// Buckets ordered from the largest threshold to the smallest.
    pub fn sorted_buckets(&self) -> Vec<ScaleBucket> {
        let mut buckets = self.buckets.clone();
        buckets.sort_by(|a, b| b.above_km.total_cmp(&a.above_km));
        buckets
    }

    /// Checks that every factor is positive and that a larger distance range
    /// never maps to a larger factor.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.default_factor.is_finite() && self.default_factor > 0.0) {
            return Err(ConfigError::Invalid(format!(
                "scale.default_factor must be positive, got {}",
                self.default_factor
            )));
        }

        let buckets = self.sorted_buckets();
        for bucket in &buckets {
            if !bucket.above_km.is_finite() || !(bucket.factor.is_finite() && bucket.factor > 0.0)
            {
                return Err(ConfigError::Invalid(format!(
                    "scale bucket {bucket:?} must have a finite threshold and positive factor"
                )));
            }
        }

        let factors: Vec<f64> = buckets
            .iter()
            .map(|b| b.factor)
            .chain(std::iter::once(self.default_factor))
            .collect();
        if factors.windows(2).any(|w| w[0] > w[1]) {
            return Err(ConfigError::Invalid(
                "scale factors must not grow with the distance range".to_string(),
            ));
        }
        Ok(())
    }
}

impl Config {
    /// Rejects settings that would break engine invariants.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.animation.duration_ms == 0 {
            return Err(ConfigError::Invalid(
                "animation.duration_ms must be greater than zero".to_string(),
            ));
        }
        if !(self.animation.reference_fps.is_finite() && self.animation.reference_fps > 0.0) {
            return Err(ConfigError::Invalid(
                "animation.reference_fps must be positive".to_string(),
            ));
        }
        if !(self.metrics.step_interval_s.is_finite() && self.metrics.step_interval_s > 0.0) {
            return Err(ConfigError::Invalid(
                "metrics.step_interval_s must be positive".to_string(),
            ));
        }
        let risk = &self.metrics.risk;
        if !(risk.high_below_km.is_finite() && risk.medium_below_km.is_finite())
            || risk.high_below_km >= risk.medium_below_km
        {
            return Err(ConfigError::Invalid(format!(
                "risk thresholds must satisfy high ({}) < medium ({})",
                risk.high_below_km, risk.medium_below_km
            )));
        }
        self.scale.validate()
    }
}

// --- Load / Save / Reload ---

impl Config {
    /// Load config from the given directory, or create a default config file.
    pub fn load_or_create(config_dir: &Path) -> Result<Self, ConfigError> {
        let config_path = config_dir.join("config.ron");

        if config_path.exists() {
            let contents = std::fs::read_to_string(&config_path).map_err(ConfigError::ReadError)?;
            let config: Config = ron::from_str(&contents).map_err(ConfigError::ParseError)?;
            config.validate()?;
            log::info!("Loaded config from {}", config_path.display());
            Ok(config)
        } else {
            let config = Config::default();
            config.save(config_dir)?;
            log::info!("Created default config at {}", config_path.display());
            Ok(config)
        }
    }

    /// Save config to the given directory as `config.ron`.
    pub fn save(&self, config_dir: &Path) -> Result<(), ConfigError> {
        std::fs::create_dir_all(config_dir).map_err(ConfigError::WriteError)?;

        let config_path = config_dir.join("config.ron");
        let pretty = ron::ser::PrettyConfig::new()
            .depth_limit(4)
            .separate_tuple_members(true)
            .enumerate_arrays(false);

        let serialized =
            ron::ser::to_string_pretty(self, pretty).map_err(ConfigError::SerializeError)?;

        std::fs::write(&config_path, serialized).map_err(ConfigError::WriteError)?;
        Ok(())
    }

    /// Hot-reload: returns `Some(new_config)` if the file changed, `None` otherwise.
    pub fn reload(&self, config_dir: &Path) -> Result<Option<Self>, ConfigError> {
        let config_path = config_dir.join("config.ron");
        let contents = std::fs::read_to_string(&config_path).map_err(ConfigError::ReadError)?;
        let new_config: Config = ron::from_str(&contents).map_err(ConfigError::ParseError)?;
        new_config.validate()?;

        if &new_config != self {
            log::info!("Config reloaded with changes");
            Ok(Some(new_config))
        } else {
            Ok(None)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_serializes() {
        let config = Config::default();
        let ron_str =
            ron::ser::to_string_pretty(&config, ron::ser::PrettyConfig::new().depth_limit(4))
                .unwrap();
        assert!(ron_str.contains("duration_ms: 8000"));
        assert!(ron_str.contains("step_interval_s: 0.5"));
    }

    #[test]
    fn test_default_config_is_valid() {
        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn test_config_roundtrip() {
        let config = Config::default();
        let ron_str = ron::to_string(&config).unwrap();
        let deserialized: Config = ron::from_str(&ron_str).unwrap();
        assert_eq!(config, deserialized);
    }

    #[test]
    fn test_missing_section_uses_default() {
        let ron_str = "(animation: (duration_ms: 4000))";
        let config: Config = ron::from_str(ron_str).unwrap();
        assert_eq!(config.animation.duration_ms, 4000);
        assert_eq!(config.animation.reference_fps, 60.0);
        assert_eq!(config.scale, ScaleConfig::default());
        assert_eq!(config.metrics, MetricsConfig::default());
    }

    #[test]
    fn test_extra_field_ignored() {
        let result: Result<Config, _> = ron::from_str("(future_setting: true)");
        assert!(result.is_ok());
    }

    #[test]
    fn test_sorted_buckets_descending() {
        let scale = ScaleConfig {
            buckets: vec![
                ScaleBucket {
                    above_km: 10.0,
                    factor: 0.5,
                },
                ScaleBucket {
                    above_km: 1000.0,
                    factor: 0.05,
                },
            ],
            default_factor: 1.0,
        };
        let sorted = scale.sorted_buckets();
        assert_eq!(sorted[0].above_km, 1000.0);
        assert_eq!(sorted[1].above_km, 10.0);
        assert!(scale.validate().is_ok());
    }

    #[test]
    fn test_non_monotone_scale_rejected() {
        let scale = ScaleConfig {
            buckets: vec![
                ScaleBucket {
                    above_km: 1000.0,
                    factor: 0.5,
                },
                ScaleBucket {
                    above_km: 10.0,
                    factor: 0.05,
                },
            ],
            default_factor: 1.0,
        };
        assert!(matches!(scale.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_default_factor_smaller_than_bucket_rejected() {
        let scale = ScaleConfig {
            default_factor: 0.001,
            ..ScaleConfig::default()
        };
        assert!(scale.validate().is_err());
    }

    #[test]
    fn test_inverted_risk_thresholds_rejected() {
        let mut config = Config::default();
        config.metrics.risk.high_below_km = 20_000.0;
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_zero_duration_rejected() {
        let mut config = Config::default();
        config.animation.duration_ms = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = Config::default();
        config.animation.duration_ms = 12_000;
        config.metrics.step_interval_s = 1.0;

        config.save(dir.path()).unwrap();
        let loaded = Config::load_or_create(dir.path()).unwrap();
        assert_eq!(config, loaded);
    }

    #[test]
    fn test_load_rejects_invalid_file() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("config.ron"),
            "(animation: (duration_ms: 0))",
        )
        .unwrap();
        let result = Config::load_or_create(dir.path());
        assert!(matches!(result, Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_reload_detects_changes() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::default();
        config.save(dir.path()).unwrap();

        let mut modified = config.clone();
        modified.metrics.risk.medium_below_km = 50_000.0;
        modified.save(dir.path()).unwrap();

        let result = config.reload(dir.path()).unwrap();
        assert_eq!(result.unwrap().metrics.risk.medium_below_km, 50_000.0);
    }

    #[test]
    fn test_reload_no_changes() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::default();
        config.save(dir.path()).unwrap();

        let result = config.reload(dir.path()).unwrap();
        assert!(result.is_none());
    }

    #[test]
    fn test_invalid_ron_produces_error() {
        let result: Result<Config, _> = ron::from_str("{{not valid}}");
        assert!(result.is_err());
    }
}
