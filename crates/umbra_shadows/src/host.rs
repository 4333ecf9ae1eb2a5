//! Host culling interface
//!
//! Scene culling and shadow projection setup belong to the host renderer.
//! The shadow system only asks questions through [`ShadowCulling`]; a host
//! without a real culling pass can implement it with fixed matrices.

use serde::{Serialize, Deserialize};

use crate::matrix::Mat4;

/// Axis-aligned world-space bounds
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    /// Center
    pub center: [f32; 3],

    /// Half size along each axis
    pub extents: [f32; 3],
}

/// Cube map face rendered for a point light
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CubemapFace {
    PositiveX,
    NegativeX,
    PositiveY,
    NegativeY,
    PositiveZ,
    NegativeZ,
}

impl CubemapFace {
    /// Faces in tile order
    pub const ALL: [CubemapFace; 6] = [
        Self::PositiveX,
        Self::NegativeX,
        Self::PositiveY,
        Self::NegativeY,
        Self::PositiveZ,
        Self::NegativeZ,
    ];
}

/// View, projection and culling data for one shadow tile
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ShadowSplit {
    /// Light view matrix (row-major)
    pub view: Mat4,

    /// Light projection matrix (row-major)
    pub projection: Mat4,

    /// Culling sphere (center xyz, radius w)
    pub culling_sphere: [f32; 4],

    /// Fraction of casters kept when culling against earlier cascades
    pub cascade_blend_culling_factor: f32,
}

/// Culling queries answered by the host renderer
pub trait ShadowCulling {
    /// World bounds of the casters visible to a light, `None` if there are none
    fn shadow_caster_bounds(&self, visible_light_index: usize) -> Option<Bounds>;

    /// Matrices for one cascade of a directional light
    fn directional_shadow_split(
        &self,
        visible_light_index: usize,
        cascade_index: u32,
        cascade_count: u32,
        cascade_ratios: [f32; 3],
        tile_size: u32,
        near_plane_offset: f32,
    ) -> Option<ShadowSplit>;

    /// Matrices for one cube face of a point light
    fn point_shadow_split(
        &self,
        visible_light_index: usize,
        face: CubemapFace,
        fov_bias: f32,
    ) -> Option<ShadowSplit>;

    /// Matrices for a spot light
    fn spot_shadow_split(&self, visible_light_index: usize) -> Option<ShadowSplit>;
}
