//! Visible lights handed over by the host's culling pass

use serde::{Serialize, Deserialize};
use umbra_shadows::{LightKind, LightShadowInfo, Mat4, IDENTITY};
use umbra_shadows::matrix::column;

/// A light that survived camera culling this frame
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct VisibleLight {
    /// Light type
    pub kind: LightKind,

    /// Color premultiplied by intensity (linear RGB, w unused)
    pub final_color: [f32; 4],

    /// Local-to-world transform (row-major)
    pub local_to_world: Mat4,

    /// Range for point and spot lights
    pub range: f32,

    /// Outer spot cone angle in degrees
    pub spot_angle: f32,

    /// Inner spot cone angle in degrees
    pub inner_spot_angle: f32,

    /// Rendering layers the light affects
    pub rendering_layer_mask: u32,

    /// Shadow parameters
    pub shadow: LightShadowInfo,
}

impl VisibleLight {
    /// Light of the given kind at the origin, looking down +Z
    pub fn new(kind: LightKind) -> Self {
        Self {
            kind,
            final_color: [1.0, 1.0, 1.0, 1.0],
            local_to_world: IDENTITY,
            range: 10.0,
            spot_angle: 30.0,
            inner_spot_angle: 21.8,
            rendering_layer_mask: u32::MAX,
            shadow: LightShadowInfo::new(),
        }
    }

    /// Set color
    pub fn with_color(mut self, color: [f32; 3]) -> Self {
        self.final_color = [color[0], color[1], color[2], 1.0];
        self
    }

    /// Set world position
    pub fn with_position(mut self, position: [f32; 3]) -> Self {
        for (row, value) in position.iter().enumerate() {
            self.local_to_world[row][3] = *value;
        }
        self
    }

    /// Set range
    pub fn with_range(mut self, range: f32) -> Self {
        self.range = range;
        self
    }

    /// Set inner and outer spot angles in degrees
    pub fn with_spot_angles(mut self, inner: f32, outer: f32) -> Self {
        self.inner_spot_angle = inner;
        self.spot_angle = outer;
        self
    }

    /// Set rendering layer mask
    pub fn with_layer_mask(mut self, mask: u32) -> Self {
        self.rendering_layer_mask = mask;
        self
    }

    /// Set shadow parameters
    pub fn with_shadow(mut self, shadow: LightShadowInfo) -> Self {
        self.shadow = shadow;
        self
    }

    /// Local +Z axis in world space
    pub fn forward(&self) -> [f32; 4] {
        column(&self.local_to_world, 2)
    }

    /// World position (w = 1)
    pub fn position(&self) -> [f32; 4] {
        column(&self.local_to_world, 3)
    }

    /// Whether the light affects any of the given layers
    pub fn affects_layers(&self, mask: u32) -> bool {
        self.rendering_layer_mask & mask != 0
    }
}
