//! Scenario tests driving [`AnimationLifecycle`] through whole start/stop
//! cycles against a [`RecordingSink`].

use std::time::{Duration, Instant};

use astralis_config::{Config, ScaleConfig};
use glam::DVec3;

use crate::error::TrajectoryError;
use crate::fallback::FallbackSeverity;
use crate::lifecycle::{AnimationLifecycle, AnimationMode, LifecycleSettings};
use crate::metrics::RiskTier;
use crate::sample::{Trajectory, TrajectorySample};
use crate::scale::ScaleTable;
use crate::sink::RecordingSink;

fn lifecycle() -> AnimationLifecycle<RecordingSink> {
    AnimationLifecycle::new(LifecycleSettings::default(), RecordingSink::default())
}

fn approach() -> Trajectory {
    Trajectory::from_positions([
        [2_000.0, 0.0, 0.0],
        [0.0, 4_000.0, 0.0],
        [0.0, 0.0, 6_000.0],
    ])
}

fn overflowing_settings() -> LifecycleSettings {
    LifecycleSettings {
        scale: ScaleTable::from_config(&ScaleConfig {
            buckets: vec![],
            default_factor: 1e300,
        })
        .unwrap(),
        ..LifecycleSettings::default()
    }
}

#[test]
fn test_idle_until_started() {
    let mut lc = lifecycle();
    assert_eq!(lc.mode(), AnimationMode::Idle);
    assert!(!lc.is_scheduled());
    assert!(lc.update(Instant::now()).is_none());
    assert_eq!(lc.sink().frames_applied, 0);
}

#[test]
fn test_valid_trajectory_follows_path_with_shared_scale() {
    let mut lc = lifecycle();
    assert_eq!(lc.start(Some(approach())), AnimationMode::Nominal);
    assert!(lc.is_scheduled());

    let scale = lc.scale().unwrap();
    // Range 4000 km falls below every bucket.
    assert_eq!(scale.value(), 0.1);

    let trail = lc.sink().trail.clone().unwrap();
    assert_eq!(trail.len(), 3);
    assert!((trail.vertices[0].position - DVec3::new(200.0, 0.0, 0.0)).length() < 1e-9);

    let frame = lc.update(Instant::now()).unwrap();
    assert!((frame.position - trail.vertices[0].position).length() < 1e-9);
    assert_eq!(lc.sink().last_frame, Some(frame));
    assert_eq!(lc.last_frame(), Some(frame));
}

#[test]
fn test_metrics_for_three_sample_approach() {
    let mut lc = lifecycle();
    lc.start(Some(approach().with_step_interval(0.5)));
    let m = lc.metrics().unwrap();
    assert_eq!(m.duration, 1.5);
    assert_eq!(m.min_distance, 2_000.0);
    assert_eq!(m.max_distance, 6_000.0);
    assert_eq!(m.risk_tier, RiskTier::Medium);
}

#[test]
fn test_step_interval_from_payload_wins_over_default() {
    let mut lc = lifecycle();
    lc.start(Some(approach().with_step_interval(2.0)));
    assert_eq!(lc.metrics().unwrap().duration, 6.0);

    lc.start(Some(approach()));
    let default = lc.settings().default_step_interval;
    assert_eq!(lc.metrics().unwrap().duration, 3.0 * default);
}

#[test]
fn test_absent_trajectory_runs_no_data_fallback() {
    let mut lc = lifecycle();
    assert_eq!(
        lc.start(None),
        AnimationMode::Fallback(FallbackSeverity::NoData)
    );
    assert!(lc.sink().trail.is_none());
    assert!(lc.scale().is_none());

    let t0 = Instant::now();
    for i in 0..30u64 {
        let frame = lc.update(t0 + Duration::from_millis(i * 16)).unwrap();
        assert!(frame.position.is_finite());
        assert_eq!(frame.intensity, 0.0);
    }
    assert!(matches!(
        lc.metrics(),
        Err(TrajectoryError::MetricsUnavailable { valid: 0 })
    ));
}

#[test]
fn test_empty_trajectory_is_treated_as_absent() {
    let mut lc = lifecycle();
    lc.start(Some(Trajectory::new(vec![], None)));
    assert_eq!(lc.mode(), AnimationMode::Fallback(FallbackSeverity::NoData));
    assert!(lc.trajectory().is_none());
}

#[test]
fn test_all_invalid_samples_fall_back_without_panicking() {
    let mut lc = lifecycle();
    let samples = vec![
        TrajectorySample::at(f64::NAN, 0.0, 0.0),
        TrajectorySample::at(0.0, f64::INFINITY, 0.0),
        TrajectorySample::default(),
    ];
    let mode = lc.start(Some(Trajectory::new(samples, Some(0.5))));
    assert_eq!(mode, AnimationMode::Fallback(FallbackSeverity::NoData));
    assert!(lc.trajectory().is_some());

    let t0 = Instant::now();
    for i in 0..100u64 {
        assert!(lc.update(t0 + Duration::from_millis(i * 16)).is_some());
    }
    assert!(matches!(
        lc.metrics(),
        Err(TrajectoryError::MetricsUnavailable { valid: 0 })
    ));
}

#[test]
fn test_single_valid_sample_animates_but_has_no_metrics() {
    let mut lc = lifecycle();
    lc.start(Some(Trajectory::from_positions([[500.0, 500.0, 500.0]])));
    assert_eq!(lc.mode(), AnimationMode::Nominal);

    let t0 = Instant::now();
    let a = lc.update(t0).unwrap();
    let b = lc.update(t0 + Duration::from_millis(3000)).unwrap();
    assert_eq!(a.position, b.position);
    assert!(matches!(
        lc.metrics(),
        Err(TrajectoryError::MetricsUnavailable { valid: 1 })
    ));
}

#[test]
fn test_restart_resets_to_first_sample() {
    let mut lc = lifecycle();
    lc.start(Some(approach()));
    let t0 = Instant::now();
    let first = lc.update(t0).unwrap();
    let later = lc.update(t0 + Duration::from_millis(5000)).unwrap();
    assert!(later.progress > 0.5);

    assert_eq!(lc.restart(), AnimationMode::Nominal);
    let frame = lc.update(t0 + Duration::from_millis(5016)).unwrap();
    assert_eq!(frame.progress, 0.0);
    assert!((frame.position - first.position).length() < 1e-9);
    assert!(frame.orientation.is_none());
}

#[test]
fn test_restart_cancels_previous_driver() {
    let mut lc = lifecycle();
    lc.start(Some(approach()));
    let old = lc.cancel_handle().unwrap();
    lc.restart();
    assert!(old.is_cancelled());
    assert!(!lc.cancel_handle().unwrap().is_cancelled());
}

#[test]
fn test_stop_releases_trail_and_halts_frames() {
    let mut lc = lifecycle();
    lc.start(Some(approach()));
    let handle = lc.cancel_handle().unwrap();
    lc.update(Instant::now());

    assert_eq!(lc.stop(), AnimationMode::Stopped);
    assert!(handle.is_cancelled());
    assert!(!lc.is_scheduled());
    assert!(lc.sink().trail.is_none());
    assert_eq!(lc.sink().trails_cleared, 1);

    let applied = lc.sink().frames_applied;
    assert!(lc.update(Instant::now()).is_none());
    assert_eq!(lc.sink().frames_applied, applied);
}

#[test]
fn test_stop_keeps_trajectory_for_metrics() {
    let mut lc = lifecycle();
    lc.start(Some(approach()));
    lc.stop();
    assert!(lc.metrics().is_ok());
}

#[test]
fn test_start_replaces_active_driver() {
    let mut lc = lifecycle();
    lc.start(None);
    let fallback = lc.cancel_handle().unwrap();

    lc.start(Some(approach()));
    assert!(fallback.is_cancelled());
    assert_eq!(lc.mode(), AnimationMode::Nominal);

    let nominal = lc.cancel_handle().unwrap();
    lc.start(Some(Trajectory::from_positions([[1.0, 1.0, 1.0], [2.0, 2.0, 2.0]])));
    assert!(nominal.is_cancelled());
    assert_eq!(lc.sink().trail.as_ref().unwrap().len(), 2);
}

#[test]
fn test_tick_failure_switches_to_error_fallback() {
    let mut lc = AnimationLifecycle::new(overflowing_settings(), RecordingSink::default());
    let samples = Trajectory::from_positions([[1e10, 0.0, 0.0], [2e10, 0.0, 0.0]]);
    assert_eq!(lc.start(Some(samples)), AnimationMode::Nominal);
    let nominal = lc.cancel_handle().unwrap();

    let frame = lc.update(Instant::now()).unwrap();
    assert_eq!(lc.mode(), AnimationMode::Fallback(FallbackSeverity::Error));
    assert!(nominal.is_cancelled());
    assert!(frame.position.is_finite());
    assert!(lc.sink().trail.is_none());

    // Keeps animating in the degraded mode.
    let next = lc.update(Instant::now() + Duration::from_millis(100));
    assert!(next.is_some());
    assert_eq!(lc.mode(), AnimationMode::Fallback(FallbackSeverity::Error));
}

#[test]
fn test_external_cancel_stops_lifecycle() {
    let mut lc = lifecycle();
    lc.start(Some(approach()));
    lc.cancel_handle().unwrap().cancel();
    assert!(!lc.is_scheduled());
    assert!(lc.update(Instant::now()).is_none());
    assert_eq!(lc.mode(), AnimationMode::Stopped);
}

#[test]
fn test_dropping_lifecycle_cancels_active_driver() {
    let mut lc = lifecycle();
    lc.start(Some(approach()));
    let handle = lc.cancel_handle().unwrap();
    assert!(!handle.is_cancelled());
    drop(lc);
    assert!(handle.is_cancelled());
}

#[test]
fn test_duration_counts_rejected_samples() {
    let mut lc = lifecycle();
    let samples = vec![
        TrajectorySample::at(2_000.0, 0.0, 0.0),
        TrajectorySample::at(f64::NAN, 0.0, 0.0),
        TrajectorySample::at(0.0, 0.0, 6_000.0),
    ];
    assert_eq!(
        lc.start(Some(Trajectory::new(samples, Some(0.5)))),
        AnimationMode::Nominal
    );
    let m = lc.metrics().unwrap();
    assert_eq!(m.point_count, 2);
    assert_eq!(m.duration, 1.5);
}

#[test]
fn test_start_json_tolerates_garbage() {
    let mut lc = lifecycle();
    assert_eq!(
        lc.start_json("<html>502</html>"),
        AnimationMode::Fallback(FallbackSeverity::NoData)
    );
    assert_eq!(
        lc.start_json(r#"{"trajectory": [{"position": [1200, 0, 0]}, {"position": [1300, 0, 0]}], "dt": 1.0}"#),
        AnimationMode::Nominal
    );
    assert_eq!(lc.metrics().unwrap().duration, 2.0);
}

#[test]
fn test_settings_from_config() {
    let mut config = Config::default();
    config.animation.duration_ms = 4000;
    let settings = LifecycleSettings::from_config(&config).unwrap();
    assert_eq!(settings.duration, Duration::from_millis(4000));

    config.scale.default_factor = -1.0;
    assert!(matches!(
        LifecycleSettings::from_config(&config),
        Err(TrajectoryError::InvalidScaleTable(_))
    ));
}

#[test]
fn test_mode_display() {
    assert_eq!(AnimationMode::Nominal.to_string(), "following trajectory");
    assert_eq!(
        AnimationMode::Fallback(FallbackSeverity::Error).to_string(),
        "fallback (error)"
    );
    assert!(AnimationMode::Fallback(FallbackSeverity::NoData).is_fallback());
    assert!(!AnimationMode::Stopped.is_fallback());
}
