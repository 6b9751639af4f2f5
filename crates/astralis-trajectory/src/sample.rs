//! Trajectory samples as delivered by the orbital service, and the validator
//! that reduces them to well-formed positions.

use glam::DVec3;
use serde::Serialize;
use serde_json::{Map, Value};

use crate::error::TrajectoryError;

/// One sample of the service's trajectory array.
///
/// `position` keeps whatever numeric shape arrived (entries that are not
/// numbers become NaN) so the validator, not the parser, decides what is
/// usable. Fields other than `position` are carried through untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TrajectorySample {
    /// Position in kilometers, ideally `[x, y, z]`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub position: Option<Vec<f64>>,
    /// Server-defined fields ignored by the engine.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl TrajectorySample {
    /// A sample at the given kilometer coordinates.
    pub fn at(x: f64, y: f64, z: f64) -> Self {
        Self {
            position: Some(vec![x, y, z]),
            extra: Map::new(),
        }
    }

    /// Builds a sample from one element of the service's array.
    pub fn from_value(value: Value) -> Self {
        let Value::Object(mut fields) = value else {
            return Self::default();
        };
        let position = fields.remove("position").and_then(|raw| match raw {
            Value::Null => None,
            Value::Array(items) => Some(
                items
                    .iter()
                    .map(|item| item.as_f64().unwrap_or(f64::NAN))
                    .collect(),
            ),
            // Present but not an array: kept so it counts as rejected.
            _ => Some(Vec::new()),
        });
        Self {
            position,
            extra: fields,
        }
    }

    /// The position as a vector, if it is a finite 3-tuple.
    pub fn valid_position(&self) -> Option<DVec3> {
        match self.position.as_deref()? {
            &[x, y, z] if x.is_finite() && y.is_finite() && z.is_finite() => {
                Some(DVec3::new(x, y, z))
            }
            _ => None,
        }
    }
}

/// The service response body: `{ "trajectory": [...], "dt": 0.5, ... }`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TrajectoryPayload {
    /// `None` when the field is missing or not an array.
    pub trajectory: Option<Vec<TrajectorySample>>,
    /// Seconds between samples, if the service reported it.
    pub dt: Option<f64>,
    /// Remaining response fields (impact data, metadata, ...).
    pub extra: Map<String, Value>,
}

impl TrajectoryPayload {
    /// Parses a response body. Only text that is not JSON is an error; any
    /// JSON shape yields a payload, possibly without a trajectory.
    pub fn from_json(text: &str) -> Result<Self, TrajectoryError> {
        let value: Value = serde_json::from_str(text).map_err(TrajectoryError::Parse)?;
        Ok(Self::from_value(value))
    }

    /// Builds a payload from an already parsed JSON value. A bare array is
    /// accepted as the sample list.
    pub fn from_value(value: Value) -> Self {
        match value {
            Value::Array(items) => Self {
                trajectory: Some(items.into_iter().map(TrajectorySample::from_value).collect()),
                ..Self::default()
            },
            Value::Object(mut fields) => {
                let trajectory = match fields.remove("trajectory") {
                    Some(Value::Array(items)) => {
                        Some(items.into_iter().map(TrajectorySample::from_value).collect())
                    }
                    _ => None,
                };
                let dt = fields.remove("dt").and_then(|v| v.as_f64());
                Self {
                    trajectory,
                    dt,
                    extra: fields,
                }
            }
            _ => Self::default(),
        }
    }

    /// The trajectory to animate, or `None` when there are no samples at all.
    pub fn into_trajectory(self) -> Option<Trajectory> {
        let samples = self.trajectory?;
        if samples.is_empty() {
            return None;
        }
        Some(Trajectory::new(samples, self.dt))
    }
}

/// An accepted, immutable sample sequence. Order defines path direction.
#[derive(Debug, Clone, PartialEq)]
pub struct Trajectory {
    samples: Vec<TrajectorySample>,
    step_interval: Option<f64>,
}

impl Trajectory {
    /// Wraps samples. A step interval that is not a finite positive number
    /// is dropped so the configured default applies.
    pub fn new(samples: Vec<TrajectorySample>, step_interval: Option<f64>) -> Self {
        Self {
            samples,
            step_interval: step_interval.filter(|dt| dt.is_finite() && *dt > 0.0),
        }
    }

    /// Convenience constructor from raw kilometer triples.
    pub fn from_positions(positions: impl IntoIterator<Item = [f64; 3]>) -> Self {
        let samples = positions
            .into_iter()
            .map(|[x, y, z]| TrajectorySample::at(x, y, z))
            .collect();
        Self::new(samples, None)
    }

    /// Same samples with an explicit step interval.
    pub fn with_step_interval(mut self, step_interval: f64) -> Self {
        self.step_interval = Some(step_interval).filter(|dt| dt.is_finite() && *dt > 0.0);
        self
    }

    pub fn samples(&self) -> &[TrajectorySample] {
        &self.samples
    }

    pub fn step_interval(&self) -> Option<f64> {
        self.step_interval
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }
}

/// The subsequence of samples whose position is a finite 3-tuple, in order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ValidSampleSet {
    positions: Vec<DVec3>,
    rejected: usize,
}

impl ValidSampleSet {
    /// Filters samples. Invalid entries are skipped and counted, never fatal.
    pub fn from_samples(samples: &[TrajectorySample]) -> Self {
        let positions: Vec<DVec3> = samples
            .iter()
            .filter_map(TrajectorySample::valid_position)
            .collect();
        let rejected = samples.len() - positions.len();
        Self {
            positions,
            rejected,
        }
    }

    pub fn from_trajectory(trajectory: &Trajectory) -> Self {
        Self::from_samples(trajectory.samples())
    }

    pub fn positions(&self) -> &[DVec3] {
        &self.positions
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    /// Number of samples dropped by validation.
    pub fn rejected(&self) -> usize {
        self.rejected
    }

    pub fn first(&self) -> Option<DVec3> {
        self.positions.first().copied()
    }

    pub fn last(&self) -> Option<DVec3> {
        self.positions.last().copied()
    }

    /// `(min, max)` of the distance from the origin over all positions.
    pub fn distance_bounds(&self) -> Option<(f64, f64)> {
        let mut norms = self.positions.iter().map(|p| p.length());
        let first = norms.next()?;
        Some(norms.fold((first, first), |(lo, hi), d| (lo.min(d), hi.max(d))))
    }
}
