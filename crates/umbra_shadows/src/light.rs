//! Per-light shadow parameters supplied by the host

use serde::{Serialize, Deserialize};

/// Light type as seen by the shadow system
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LightKind {
    Directional,
    Point,
    Spot,
}

/// Shadow casting mode configured on the light
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ShadowCastingMode {
    #[default]
    None,
    Hard,
    Soft,
}

/// How the light was baked
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LightmapBakeType {
    #[default]
    Realtime,
    Baked,
    Mixed,
}

/// Mixed lighting mode of a baked light
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MixedLightingMode {
    #[default]
    IndirectOnly,
    Shadowmask,
    Subtractive,
}

/// Baking metadata for a light
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct LightBakingOutput {
    /// Bake type
    pub bake_type: LightmapBakeType,

    /// Mixed lighting mode (only meaningful for mixed lights)
    pub mixed_lighting_mode: MixedLightingMode,

    /// Shadow mask channel holding this light's baked occlusion (-1 = none)
    pub occlusion_mask_channel: i32,
}

impl Default for LightBakingOutput {
    fn default() -> Self {
        Self {
            bake_type: LightmapBakeType::Realtime,
            mixed_lighting_mode: MixedLightingMode::IndirectOnly,
            occlusion_mask_channel: -1,
        }
    }
}

impl LightBakingOutput {
    /// Mixed light baked into the shadow mask
    pub fn shadowmask(channel: i32) -> Self {
        Self {
            bake_type: LightmapBakeType::Mixed,
            mixed_lighting_mode: MixedLightingMode::Shadowmask,
            occlusion_mask_channel: channel,
        }
    }

    /// Shadow mask channel to sample, if the light uses the shadow mask
    pub fn shadowmask_channel(&self) -> Option<i32> {
        (self.bake_type == LightmapBakeType::Mixed
            && self.mixed_lighting_mode == MixedLightingMode::Shadowmask)
            .then_some(self.occlusion_mask_channel)
    }
}

/// Shadow parameters of a single light
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct LightShadowInfo {
    /// Shadow casting mode
    pub shadows: ShadowCastingMode,

    /// Shadow strength (0-1, negative disables)
    pub strength: f32,

    /// Slope-scaled depth bias
    pub bias: f32,

    /// Normal bias
    pub normal_bias: f32,

    /// Near plane offset for directional cascades
    pub near_plane: f32,

    /// Baking metadata
    pub baking: LightBakingOutput,
}

impl LightShadowInfo {
    /// Shadow-casting light with default biases
    pub fn new() -> Self {
        Self {
            shadows: ShadowCastingMode::Hard,
            strength: 1.0,
            bias: 0.05,
            normal_bias: 0.4,
            near_plane: 0.2,
            baking: LightBakingOutput::default(),
        }
    }

    /// Set shadow strength
    pub fn with_strength(mut self, strength: f32) -> Self {
        self.strength = strength;
        self
    }

    /// Set baking output
    pub fn with_baking(mut self, baking: LightBakingOutput) -> Self {
        self.baking = baking;
        self
    }

    /// Set shadow casting mode
    pub fn with_shadows(mut self, shadows: ShadowCastingMode) -> Self {
        self.shadows = shadows;
        self
    }

    /// Whether the light asks for shadows at all
    ///
    /// Zero strength still reserves a slot. Only a negative strength or
    /// `ShadowCastingMode::None` opts the light out.
    pub fn casts_shadows(&self) -> bool {
        self.shadows != ShadowCastingMode::None && self.strength >= 0.0
    }
}

impl Default for LightShadowInfo {
    fn default() -> Self {
        Self::new()
    }
}
