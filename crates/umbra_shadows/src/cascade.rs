//! Cascaded Shadow Map Data
//!
//! Per-cascade culling spheres and filter data for directional light
//! shadows. The host computes the cascade projections; this module derives
//! what the shaders need to pick a cascade and size their filter.
//!
//! Each cascade's data is taken from the first reserved directional light
//! whose split for that cascade succeeds. Cascade ratios are global to the
//! frame, so every directional light ends up with the same cascade spheres.

use serde::{Serialize, Deserialize};

use crate::config::FilterMode;

/// Maximum supported cascade count
pub const MAX_CASCADES: usize = 4;

/// Smallest denominator used when inverting fade ranges and radii
const MIN_DENOMINATOR: f32 = 1e-5;

/// Culling spheres and cascade data for the current frame
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct CascadeState {
    /// Culling spheres (center xyz, squared shrunk radius w)
    pub culling_spheres: [[f32; 4]; MAX_CASCADES],

    /// Per cascade: x = 1 / squared radius, y = filter size * sqrt(2)
    pub data: [[f32; 4]; MAX_CASCADES],
}

impl CascadeState {
    /// Create zeroed cascade state
    pub fn new() -> Self {
        Self::default()
    }

    /// Store cascade `index` from the host's culling sphere
    ///
    /// The sphere is shrunk by the filter footprint so PCF taps near the
    /// edge stay inside the cascade, then its radius is squared for cheap
    /// inside tests in the shader.
    pub fn set_cascade(
        &mut self,
        index: usize,
        culling_sphere: [f32; 4],
        tile_size: f32,
        filter: FilterMode,
    ) {
        if index >= MAX_CASCADES {
            log::warn!("Cascade index {} out of range, ignoring", index);
            return;
        }

        let texel_size = 2.0 * culling_sphere[3] / tile_size;
        let filter_size = filter.filter_size(texel_size);

        let radius = culling_sphere[3] - filter_size;
        let radius_sq = radius * radius;

        self.culling_spheres[index] = [
            culling_sphere[0],
            culling_sphere[1],
            culling_sphere[2],
            radius_sq,
        ];
        self.data[index] = [
            1.0 / radius_sq.max(MIN_DENOMINATOR),
            filter_size * core::f32::consts::SQRT_2,
            0.0,
            0.0,
        ];
    }

    /// Squared radius stored for a cascade
    pub fn squared_radius(&self, index: usize) -> f32 {
        self.culling_spheres[index][3]
    }
}

/// Distance fade coefficients `(1/max_distance, 1/distance_fade, 1/(1 - f^2), 0)`
///
/// `f` is `1 - cascade_fade`, so the last term fades the final cascade over
/// the configured fraction of its radius.
pub fn distance_fade(max_distance: f32, distance_fade: f32, cascade_fade: f32) -> [f32; 4] {
    let f = 1.0 - cascade_fade;
    [
        1.0 / max_distance.max(MIN_DENOMINATOR),
        1.0 / distance_fade.max(MIN_DENOMINATOR),
        1.0 / (1.0 - f * f).max(MIN_DENOMINATOR),
        0.0,
    ]
}

/// Culling factor handed to the host so transition regions keep their casters
pub fn blend_culling_factor(cascade_fade: f32) -> f32 {
    (0.8 - cascade_fade).max(0.0)
}
