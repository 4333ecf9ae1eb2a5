//! GPU Shadow Data Structures
//!
//! GPU-compatible data structures for shadow sampling. All structures are
//! bytemuck Pod/Zeroable for direct GPU upload.

use serde::{Serialize, Deserialize};

use crate::cascade::{CascadeState, MAX_CASCADES};
use crate::matrix::Mat4;
use crate::reservation::{MAX_SHADOWED_DIRECTIONAL_LIGHTS, MAX_SHADOWED_OTHER_LIGHTS};

/// Directional atlas tiles (lights x cascades)
pub const MAX_DIRECTIONAL_TILES: usize = MAX_SHADOWED_DIRECTIONAL_LIGHTS * MAX_CASCADES;

/// Global shadow uniforms
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize, bytemuck::Pod, bytemuck::Zeroable)]
pub struct ShadowGlobals {
    /// `[dir size, 1/dir size, other size, 1/other size]`
    pub atlas_sizes: [f32; 4],

    /// `[1/max distance, 1/distance fade, 1/(1 - (1 - cascade fade)^2), 0]`
    pub distance_fade: [f32; 4],

    /// Active cascades, 0 when no directional light has shadows
    pub cascade_count: i32,

    /// Padding to 16 bytes
    pub _pad: [i32; 3],
}

impl ShadowGlobals {
    /// Get uniform data as bytes
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::bytes_of(self)
    }
}

/// Directional shadow uniforms
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize, bytemuck::Pod, bytemuck::Zeroable)]
pub struct DirectionalShadowUniforms {
    /// World-to-atlas matrices, indexed by tile
    pub matrices: [Mat4; MAX_DIRECTIONAL_TILES],

    /// Cascade culling spheres (center xyz, squared radius w)
    pub culling_spheres: [[f32; 4]; MAX_CASCADES],

    /// Cascade data (1/squared radius, filter size * sqrt 2)
    pub cascade_data: [[f32; 4]; MAX_CASCADES],
}

impl Default for DirectionalShadowUniforms {
    fn default() -> Self {
        bytemuck::Zeroable::zeroed()
    }
}

impl DirectionalShadowUniforms {
    /// Copy the frame's matrices and cascade state
    pub fn new(matrices: &[Mat4; MAX_DIRECTIONAL_TILES], cascades: &CascadeState) -> Self {
        Self {
            matrices: *matrices,
            culling_spheres: cascades.culling_spheres,
            cascade_data: cascades.data,
        }
    }

    /// Get uniform data as bytes
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::bytes_of(self)
    }
}

/// Spot and point light shadow uniforms
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize, bytemuck::Pod, bytemuck::Zeroable)]
pub struct OtherShadowUniforms {
    /// World-to-atlas matrices, indexed by tile
    pub matrices: [Mat4; MAX_SHADOWED_OTHER_LIGHTS],

    /// Tile bounds (min xy, size z) and normal bias w
    pub tiles: [[f32; 4]; MAX_SHADOWED_OTHER_LIGHTS],
}

impl Default for OtherShadowUniforms {
    fn default() -> Self {
        bytemuck::Zeroable::zeroed()
    }
}

impl OtherShadowUniforms {
    /// Get uniform data as bytes
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::bytes_of(self)
    }
}
