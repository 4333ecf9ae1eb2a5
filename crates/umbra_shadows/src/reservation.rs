//! Shadow Slot Reservation
//!
//! Decides which lights get a shadow slot this frame. Slots live in
//! fixed-capacity arrays that are allocated once; each frame only resets the
//! counters, so nothing is resized after construction.
//!
//! # Slot Layout
//!
//! - Directional lights: up to 4, each using `cascade_count` atlas tiles
//! - Other lights: 16 tiles shared between spot lights (1 tile each) and
//!   point lights (6 contiguous tiles, one per cube face)

use serde::{Serialize, Deserialize};

use crate::host::ShadowCulling;
use crate::light::{LightKind, LightShadowInfo};

/// Maximum shadowed directional lights
pub const MAX_SHADOWED_DIRECTIONAL_LIGHTS: usize = 4;
/// Maximum other-light shadow tiles
pub const MAX_SHADOWED_OTHER_LIGHTS: usize = 16;
/// Tiles consumed by a point light
pub const POINT_LIGHT_TILES: usize = 6;

/// A directional light that owns shadow tiles this frame
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ShadowedDirectionalLight {
    /// Index into the host's visible light list
    pub visible_light_index: usize,

    /// Slope-scaled depth bias
    pub slope_scale_bias: f32,

    /// Near plane offset for cascade projections
    pub near_plane_offset: f32,
}

/// A point or spot light that owns shadow tiles this frame
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ShadowedOtherLight {
    /// Index into the host's visible light list
    pub visible_light_index: usize,

    /// Slope-scaled depth bias
    pub slope_scale_bias: f32,

    /// Normal bias
    pub normal_bias: f32,

    /// Point lights use six tiles
    pub is_point: bool,
}

impl ShadowedOtherLight {
    /// Tiles this light occupies
    pub fn tile_count(&self) -> usize {
        if self.is_point { POINT_LIGHT_TILES } else { 1 }
    }
}

/// Outcome of a shadow reservation
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub enum ShadowReservation {
    /// The light casts no shadows at all
    NoShadow,

    /// No realtime slot, but baked shadows may still apply
    BakedOnly {
        strength: f32,
        mask_channel: i32,
    },

    /// Directional light with a block of cascade tiles
    Directional {
        strength: f32,
        tile_offset: u32,
        normal_bias: f32,
        mask_channel: i32,
    },

    /// Point or spot light with its first tile index
    Other {
        strength: f32,
        tile_index: u32,
        is_point: bool,
        mask_channel: i32,
    },
}

impl ShadowReservation {
    /// Encode as the `{strength, tile, bias/flag, mask channel}` shader vector
    ///
    /// Baked-only results carry a negative strength so the shader skips the
    /// shadow map while still reading the mask channel.
    pub fn to_shader_data(&self) -> [f32; 4] {
        match *self {
            Self::NoShadow => [0.0, 0.0, 0.0, -1.0],
            Self::BakedOnly { strength, mask_channel } => {
                [-strength, 0.0, 0.0, mask_channel as f32]
            }
            Self::Directional { strength, tile_offset, normal_bias, mask_channel } => {
                [strength, tile_offset as f32, normal_bias, mask_channel as f32]
            }
            Self::Other { strength, tile_index, is_point, mask_channel } => {
                [strength, tile_index as f32, if is_point { 1.0 } else { 0.0 }, mask_channel as f32]
            }
        }
    }

    /// Whether the light got a realtime shadow slot
    pub fn is_reserved(&self) -> bool {
        matches!(self, Self::Directional { .. } | Self::Other { .. })
    }

    /// Shadow mask channel, -1 when unused
    pub fn mask_channel(&self) -> i32 {
        match *self {
            Self::NoShadow => -1,
            Self::BakedOnly { mask_channel, .. }
            | Self::Directional { mask_channel, .. }
            | Self::Other { mask_channel, .. } => mask_channel,
        }
    }
}

/// Frame-scoped shadow slot bookkeeping
#[derive(Clone, Debug, Default)]
pub struct ShadowReservations {
    directional: [ShadowedDirectionalLight; MAX_SHADOWED_DIRECTIONAL_LIGHTS],
    directional_count: usize,
    other: [ShadowedOtherLight; MAX_SHADOWED_OTHER_LIGHTS],
    other_count: usize,
    use_shadow_mask: bool,
}

impl ShadowReservations {
    /// Create empty reservations
    pub fn new() -> Self {
        Self::default()
    }

    /// Forget last frame's reservations
    pub fn reset(&mut self) {
        self.directional_count = 0;
        self.other_count = 0;
        self.use_shadow_mask = false;
    }

    /// Reserve cascade tiles for a directional light
    pub fn reserve_directional<C: ShadowCulling + ?Sized>(
        &mut self,
        light: &LightShadowInfo,
        visible_light_index: usize,
        cascade_count: u32,
        culling: &C,
    ) -> ShadowReservation {
        if self.directional_count >= MAX_SHADOWED_DIRECTIONAL_LIGHTS || !light.casts_shadows() {
            return ShadowReservation::NoShadow;
        }

        let mask_channel = self.mask_channel(light);

        if culling.shadow_caster_bounds(visible_light_index).is_none() {
            log::trace!(
                "Directional light {} has no shadow casters, using baked shadows only",
                visible_light_index
            );
            return ShadowReservation::BakedOnly {
                strength: light.strength,
                mask_channel,
            };
        }

        let index = self.directional_count;
        self.directional[index] = ShadowedDirectionalLight {
            visible_light_index,
            slope_scale_bias: light.bias,
            near_plane_offset: light.near_plane,
        };
        self.directional_count += 1;

        ShadowReservation::Directional {
            strength: light.strength,
            tile_offset: cascade_count * index as u32,
            normal_bias: light.normal_bias,
            mask_channel,
        }
    }

    /// Reserve tiles for a point or spot light
    ///
    /// `kind` decides the tile count, so it must be the kind of the visible
    /// light itself.
    pub fn reserve_other<C: ShadowCulling + ?Sized>(
        &mut self,
        light: &LightShadowInfo,
        kind: LightKind,
        visible_light_index: usize,
        culling: &C,
    ) -> ShadowReservation {
        if !light.casts_shadows() {
            return ShadowReservation::NoShadow;
        }

        let mask_channel = self.mask_channel(light);

        let is_point = kind == LightKind::Point;
        let new_count = self.other_count + if is_point { POINT_LIGHT_TILES } else { 1 };

        if new_count > MAX_SHADOWED_OTHER_LIGHTS
            || culling.shadow_caster_bounds(visible_light_index).is_none()
        {
            log::trace!(
                "Light {} gets no shadow tile ({} of {} in use)",
                visible_light_index,
                self.other_count,
                MAX_SHADOWED_OTHER_LIGHTS
            );
            return ShadowReservation::BakedOnly {
                strength: light.strength,
                mask_channel,
            };
        }

        let index = self.other_count;
        self.other[index] = ShadowedOtherLight {
            visible_light_index,
            slope_scale_bias: light.bias,
            normal_bias: light.normal_bias,
            is_point,
        };
        self.other_count = new_count;

        ShadowReservation::Other {
            strength: light.strength,
            tile_index: index as u32,
            is_point,
            mask_channel,
        }
    }

    fn mask_channel(&mut self, light: &LightShadowInfo) -> i32 {
        match light.baking.shadowmask_channel() {
            Some(channel) => {
                self.use_shadow_mask = true;
                channel
            }
            None => -1,
        }
    }

    /// Reserved directional lights in reservation order
    pub fn directional_lights(&self) -> &[ShadowedDirectionalLight] {
        &self.directional[..self.directional_count]
    }

    /// Reserved other lights with their first tile index
    pub fn other_lights(&self) -> OtherLightIter<'_> {
        OtherLightIter {
            lights: &self.other,
            tile: 0,
            end: self.other_count,
        }
    }

    /// Number of reserved directional lights
    pub fn directional_count(&self) -> usize {
        self.directional_count
    }

    /// Number of other-light tiles in use
    pub fn other_tile_count(&self) -> usize {
        self.other_count
    }

    /// Whether any reserved light reads the shadow mask
    pub fn use_shadow_mask(&self) -> bool {
        self.use_shadow_mask
    }
}

/// Walks reserved other lights, skipping the extra tiles of point lights
pub struct OtherLightIter<'a> {
    lights: &'a [ShadowedOtherLight; MAX_SHADOWED_OTHER_LIGHTS],
    tile: usize,
    end: usize,
}

impl<'a> Iterator for OtherLightIter<'a> {
    type Item = (usize, &'a ShadowedOtherLight);

    fn next(&mut self) -> Option<Self::Item> {
        if self.tile >= self.end {
            return None;
        }
        let tile = self.tile;
        let light = &self.lights[tile];
        self.tile += light.tile_count();
        Some((tile, light))
    }
}
