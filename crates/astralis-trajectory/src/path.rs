//! Interpolation of a scaled position along the valid samples.

use glam::DVec3;

use crate::error::TrajectoryError;
use crate::sample::ValidSampleSet;
use crate::scale::ScaleFactor;

/// Cubic blending weights `(w0, w1)` for a local parameter `t` in `[0, 1]`.
///
/// `w0 = 1 - 3t² + 2t³`, `w1 = 3t² - 2t³`. Both have zero slope at the
/// segment ends, so the body eases through each sample instead of turning
/// sharply at it.
pub fn smoothstep_weights(t: f64) -> (f64, f64) {
    let t2 = t * t;
    let t3 = t2 * t;
    (1.0 - 3.0 * t2 + 2.0 * t3, 3.0 * t2 - 2.0 * t3)
}

/// The valid samples of one trajectory paired with its scale factor.
///
/// Both the trail and the moving body read positions through this type, so
/// they can never disagree on scale.
#[derive(Clone, Debug, PartialEq)]
pub struct ScaledPath {
    valid: ValidSampleSet,
    scale: ScaleFactor,
}

impl ScaledPath {
    /// Returns `None` when there is nothing to follow.
    pub fn new(valid: ValidSampleSet, scale: ScaleFactor) -> Option<Self> {
        if valid.is_empty() {
            return None;
        }
        Some(Self { valid, scale })
    }

    pub fn valid(&self) -> &ValidSampleSet {
        &self.valid
    }

    pub fn scale(&self) -> ScaleFactor {
        self.scale
    }

    pub fn len(&self) -> usize {
        self.valid.len()
    }

    pub fn is_empty(&self) -> bool {
        self.valid.is_empty()
    }

    /// Sample `index` in scene units.
    pub fn scaled(&self, index: usize) -> Option<DVec3> {
        self.valid
            .positions()
            .get(index)
            .map(|p| self.scale.apply(*p))
    }

    /// Scaled position at `progress` along the path.
    ///
    /// `progress` maps to the fractional index `progress * (N - 1)`; the two
    /// bracketing samples are blended with [`smoothstep_weights`]. Values at
    /// or past `1.0` clamp to the last sample, negative values to the first.
    pub fn sample_at(&self, progress: f64) -> Result<DVec3, TrajectoryError> {
        if !progress.is_finite() {
            return Err(TrajectoryError::TickFailure(format!(
                "progress is not finite: {progress}"
            )));
        }

        let positions = self.valid.positions();
        let last = positions.len() - 1;
        let raw = if progress >= 1.0 || last == 0 {
            positions[last]
        } else {
            let index = progress.max(0.0) * last as f64;
            let low = (index.floor() as usize).min(last);
            let high = (low + 1).min(last);
            let (w0, w1) = smoothstep_weights(index - low as f64);
            positions[low] * w0 + positions[high] * w1
        };

        let scaled = self.scale.apply(raw);
        if !scaled.is_finite() {
            return Err(TrajectoryError::TickFailure(format!(
                "interpolated position is not finite at progress {progress:.4}: {scaled}"
            )));
        }
        Ok(scaled)
    }
}
