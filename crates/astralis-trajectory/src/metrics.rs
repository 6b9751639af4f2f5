//! Distance, speed, and risk summaries over the valid samples.
//!
//! Recomputed from scratch on every query; nothing is cached between
//! trajectories.

use astralis_config::{MetricsConfig, RiskConfig};
use serde::Serialize;

use crate::error::TrajectoryError;
use crate::sample::ValidSampleSet;

/// Distance thresholds (km) separating the risk tiers.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct RiskThresholds {
    pub high_below_km: f64,
    pub medium_below_km: f64,
}

impl Default for RiskThresholds {
    fn default() -> Self {
        Self::from(&RiskConfig::default())
    }
}

impl From<&RiskConfig> for RiskThresholds {
    fn from(config: &RiskConfig) -> Self {
        Self {
            high_below_km: config.high_below_km,
            medium_below_km: config.medium_below_km,
        }
    }
}

/// Coarse proximity classification from the minimum approach distance.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskTier {
    High,
    Medium,
    Low,
}

impl RiskTier {
    pub fn classify(min_distance_km: f64, thresholds: &RiskThresholds) -> Self {
        if min_distance_km < thresholds.high_below_km {
            RiskTier::High
        } else if min_distance_km < thresholds.medium_below_km {
            RiskTier::Medium
        } else {
            RiskTier::Low
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            RiskTier::High => "HIGH RISK",
            RiskTier::Medium => "MEDIUM RISK",
            RiskTier::Low => "LOW RISK",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            RiskTier::High => "The object comes dangerously close to Earth",
            RiskTier::Medium => "The object approaches but keeps a safe distance",
            RiskTier::Low => "The object stays at a safe distance from Earth",
        }
    }
}

/// Settings that shape the summary but not the animation.
#[derive(Clone, Debug, PartialEq)]
pub struct MetricsSettings {
    pub risk: RiskThresholds,
    /// How many leading steps the speed profile reports.
    pub speed_profile_len: usize,
}

impl Default for MetricsSettings {
    fn default() -> Self {
        Self::from(&MetricsConfig::default())
    }
}

impl From<&MetricsConfig> for MetricsSettings {
    fn from(config: &MetricsConfig) -> Self {
        Self {
            risk: RiskThresholds::from(&config.risk),
            speed_profile_len: config.speed_profile_len,
        }
    }
}

/// Summary of one trajectory. Speeds are kilometers per sample step.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Metrics {
    pub min_distance: f64,
    pub max_distance: f64,
    pub max_speed: f64,
    pub avg_speed: f64,
    /// Path length, the sum of all step distances.
    pub total_distance: f64,
    /// `sample_count * step_interval`, in seconds. Rejected samples still
    /// occupy their time step.
    pub duration: f64,
    /// Samples received, valid or not.
    pub sample_count: usize,
    pub point_count: usize,
    pub rejected_count: usize,
    pub risk_tier: RiskTier,
    /// Leading step speeds normalized by `max_speed`, each in `[0, 1]`.
    pub speed_profile: Vec<f64>,
}

/// Summarizes the valid samples.
///
/// Fails with [`TrajectoryError::MetricsUnavailable`] below two samples,
/// where no speed is defined.
pub fn compute_metrics(
    valid: &ValidSampleSet,
    step_interval: f64,
    settings: &MetricsSettings,
) -> Result<Metrics, TrajectoryError> {
    let positions = valid.positions();
    if positions.len() < 2 {
        return Err(TrajectoryError::MetricsUnavailable {
            valid: positions.len(),
        });
    }
    let (min_distance, max_distance) =
        valid
            .distance_bounds()
            .ok_or(TrajectoryError::MetricsUnavailable {
                valid: positions.len(),
            })?;

    let speeds: Vec<f64> = positions
        .windows(2)
        .map(|pair| pair[1].distance(pair[0]))
        .collect();
    let total_distance: f64 = speeds.iter().sum();
    let max_speed = speeds.iter().copied().fold(0.0, f64::max);
    let avg_speed = total_distance / speeds.len() as f64;

    let speed_profile = speeds
        .iter()
        .take(settings.speed_profile_len)
        .map(|speed| {
            if max_speed > 0.0 {
                (speed / max_speed).min(1.0)
            } else {
                0.0
            }
        })
        .collect();

    let sample_count = positions.len() + valid.rejected();
    Ok(Metrics {
        min_distance,
        max_distance,
        max_speed,
        avg_speed,
        total_distance,
        duration: sample_count as f64 * step_interval,
        sample_count,
        point_count: positions.len(),
        rejected_count: valid.rejected(),
        risk_tier: RiskTier::classify(min_distance, &settings.risk),
        speed_profile,
    })
}
