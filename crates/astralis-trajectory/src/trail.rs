//! The rendered path: every valid sample in scene units with a color ramp.

use glam::DVec3;
use serde::Serialize;

use crate::path::ScaledPath;
use crate::scale::ScaleFactor;

/// One trail vertex.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct TrailVertex {
    /// Position in scene units.
    pub position: DVec3,
    /// Linear RGBA.
    pub color: [f32; 4],
}

/// Polyline through the whole trajectory, scaled like the moving body.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Trail {
    pub vertices: Vec<TrailVertex>,
    pub scale: ScaleFactor,
}

/// Orange at the start fading to a translucent yellow at the end.
pub fn gradient_color(index: usize, count: usize) -> [f32; 4] {
    let p = if count == 0 {
        0.0
    } else {
        index as f32 / count as f32
    };
    [1.0, 0.5 * (1.0 - p) + 0.8 * p, 0.1 * p, 0.9 - 0.3 * p]
}

impl Trail {
    /// Builds the trail from the same path the body follows.
    pub fn from_path(path: &ScaledPath) -> Self {
        let scale = path.scale();
        let count = path.len();
        let vertices = path
            .valid()
            .positions()
            .iter()
            .enumerate()
            .map(|(index, p)| TrailVertex {
                position: scale.apply(*p),
                color: gradient_color(index, count),
            })
            .collect();
        Self { vertices, scale }
    }

    pub fn len(&self) -> usize {
        self.vertices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    /// Flat `[x, y, z, x, y, z, ...]` buffer for vertex upload.
    pub fn position_buffer(&self) -> Vec<f32> {
        self.vertices
            .iter()
            .flat_map(|v| v.position.as_vec3().to_array())
            .collect()
    }
}
