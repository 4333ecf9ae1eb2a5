//! Atlas-Space Transforms
//!
//! Converts light view-projection matrices so they map world positions
//! straight into a tile of the shadow atlas in [0, 1] UV space, and builds
//! the per-tile bounds used to clamp filter taps.

use serde::{Serialize, Deserialize};

use crate::config::FilterMode;
use crate::matrix::Mat4;

/// Which atlas a tile lives in
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AtlasKind {
    /// Cascades of directional lights
    Directional,
    /// Spot light tiles and point light cube faces
    Other,
}

/// Depth buffer convention of the target backend
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DepthConvention {
    /// Near = 0, far = 1
    #[default]
    Standard,
    /// Near = 1, far = 0
    Reversed,
}

/// Remap a clip-space matrix into one tile of the atlas
///
/// `offset` is the tile's grid cell and `scale` is `1 / split`. Rows 0 and 1
/// go from [-1, 1] to the tile's UV range, row 2 goes to [0, 1] depth and
/// row 3 is left alone.
pub fn convert_to_atlas_matrix(
    m: &Mat4,
    offset: [f32; 2],
    scale: f32,
    depth: DepthConvention,
) -> Mat4 {
    let mut m = *m;

    if depth == DepthConvention::Reversed {
        for value in m[2].iter_mut() {
            *value = -*value;
        }
    }

    let w = m[3];
    for col in 0..4 {
        m[0][col] = (0.5 * (m[0][col] + w[col]) + offset[0] * w[col]) * scale;
        m[1][col] = (0.5 * (m[1][col] + w[col]) + offset[1] * w[col]) * scale;
        m[2][col] = 0.5 * (m[2][col] + w[col]);
    }

    m
}

/// Tile bounds and normal bias for an other-light tile
///
/// The bounds are shrunk by half a texel on each side so PCF taps never read
/// from the neighbouring tile.
pub fn other_tile_data(offset: [f32; 2], scale: f32, bias: f32, inverse_atlas_size: f32) -> [f32; 4] {
    let border = inverse_atlas_size * 0.5;
    [
        offset[0] * scale + border,
        offset[1] * scale + border,
        scale - border - border,
        bias,
    ]
}

/// Filter size and normal bias for a perspective tile
///
/// Returns `(filter_size, normal_bias)` where the bias is scaled by the
/// filter diagonal.
pub fn other_normal_bias(normal_bias: f32, texel_size: f32, filter: FilterMode) -> (f32, f32) {
    let filter_size = filter.filter_size(texel_size);
    (filter_size, normal_bias * filter_size * core::f32::consts::SQRT_2)
}

/// Field of view widening in degrees for point light cube faces
///
/// Widening each face lets filter taps near a face edge sample valid depth
/// instead of running off the tile.
pub fn point_fov_bias(bias: f32, filter_size: f32) -> f32 {
    (1.0 + bias + filter_size).atan().to_degrees() * 2.0 - 90.0
}

/// Sizes of both atlases packed for the shader
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct AtlasSizes {
    /// Directional atlas resolution (0 when not rendered yet)
    pub directional: u32,

    /// Other atlas resolution (0 when not rendered yet)
    pub other: u32,
}

impl AtlasSizes {
    /// Record the resolution used for an atlas this frame
    pub fn set(&mut self, kind: AtlasKind, size: u32) {
        match kind {
            AtlasKind::Directional => self.directional = size,
            AtlasKind::Other => self.other = size,
        }
    }

    /// Texel size of the other atlas
    pub fn inverse_other(&self) -> f32 {
        inverse(self.other)
    }

    /// `[dir size, 1/dir size, other size, 1/other size]`
    pub fn to_vec4(&self) -> [f32; 4] {
        [
            self.directional as f32,
            inverse(self.directional),
            self.other as f32,
            inverse(self.other),
        ]
    }
}

fn inverse(size: u32) -> f32 {
    if size == 0 { 0.0 } else { 1.0 / size as f32 }
}
