//! Per-frame light packing
//!
//! Walks the host's visible lights, packs the ones on the camera's
//! rendering layers into [`LightBuffer`], reserves their shadow tiles and
//! finally renders the shadow atlases.

use umbra_shadows::{
    DepthConvention, KeywordState, LightKind, ShadowCommandList, ShadowCulling,
    ShadowFrame, ShadowRenderer,
};

use crate::buffer::LightBuffer;
use crate::config::LightingConfig;
use crate::visible::VisibleLight;

/// Keyword toggled by the lights-per-object mode
pub const LIGHTS_PER_OBJECT_KEYWORD: &str = "_LIGHTS_PER_OBJECT";

/// Range attenuation is `1 / max(range^2, MIN_RANGE_SQ)`
const MIN_RANGE_SQ: f32 = 0.00001;

/// Spot angle range is clamped to at least this much cosine
const MIN_SPOT_ANGLE_RANGE: f32 = 0.001;

/// Everything the lit shaders need for one camera
#[derive(Clone, Debug)]
pub struct LightingFrame {
    /// Packed light arrays and counts
    pub lights: LightBuffer,

    /// Visible light index to other-light index, `-1` for unused lights
    pub light_index_map: Option<Vec<i32>>,

    /// Lights-per-object keyword state
    pub lights_per_object: KeywordState,

    /// Shadow uniforms and passes
    pub shadows: ShadowFrame,
}

/// Light packer and shadow driver for one camera
#[derive(Clone, Debug, Default)]
pub struct Lighting {
    buffer: LightBuffer,
    shadows: ShadowRenderer,
}

impl Lighting {
    /// Create lighting for the given depth convention
    pub fn new(depth: DepthConvention) -> Self {
        Self {
            buffer: LightBuffer::new(),
            shadows: ShadowRenderer::new(depth),
        }
    }

    /// Pack visible lights and render shadows
    pub fn setup<C: ShadowCulling + ?Sized>(
        &mut self,
        visible_lights: &[VisibleLight],
        culling: &C,
        config: &LightingConfig,
    ) -> LightingFrame {
        self.shadows.setup(&config.shadows);
        self.buffer.clear();

        let mut index_map = config
            .use_lights_per_object
            .then(|| Vec::with_capacity(visible_lights.len()));

        for (visible_index, light) in visible_lights.iter().enumerate() {
            let mut new_index = -1;

            if light.affects_layers(config.rendering_layer_mask) {
                match light.kind {
                    LightKind::Directional => {
                        if let Some(index) = self.buffer.next_directional() {
                            self.setup_directional(index, visible_index, light, culling);
                        }
                    }
                    LightKind::Point | LightKind::Spot => {
                        if let Some(index) = self.buffer.next_other() {
                            new_index = index as i32;
                            self.setup_other(index, visible_index, light, culling);
                        }
                    }
                }
            } else {
                self.buffer.record_filtered();
            }

            if let Some(map) = index_map.as_mut() {
                map.push(new_index);
            }
        }

        let lights_per_object = if config.use_lights_per_object {
            KeywordState::enable(LIGHTS_PER_OBJECT_KEYWORD)
        } else {
            KeywordState::disable(LIGHTS_PER_OBJECT_KEYWORD)
        };

        let counts = self.buffer.counts();
        log::debug!(
            "Packed {} directional and {} other lights ({} filtered, {} dropped)",
            counts.directional_count,
            counts.other_count,
            self.buffer.stats().filtered_count,
            self.buffer.stats().overflow_count
        );

        let shadows = self.shadows.render(culling);

        LightingFrame {
            lights: self.buffer.clone(),
            light_index_map: index_map,
            lights_per_object,
            shadows,
        }
    }

    /// Release the shadow atlases of the last frame
    pub fn cleanup(&mut self) -> ShadowCommandList {
        self.shadows.cleanup()
    }

    /// Shadow renderer used by this camera
    pub fn shadows(&self) -> &ShadowRenderer {
        &self.shadows
    }

    fn setup_directional<C: ShadowCulling + ?Sized>(
        &mut self,
        index: usize,
        visible_index: usize,
        light: &VisibleLight,
        culling: &C,
    ) {
        let mut direction = light.forward();
        direction[3] = f32::from_bits(light.rendering_layer_mask);

        let shadow = self
            .shadows
            .reserve_directional(&light.shadow, visible_index, culling);

        let lights = &mut self.buffer.directional;
        lights.colors[index] = light.final_color;
        lights.directions_and_masks[index] = direction;
        lights.shadow_data[index] = shadow.to_shader_data();
    }

    fn setup_other<C: ShadowCulling + ?Sized>(
        &mut self,
        index: usize,
        visible_index: usize,
        light: &VisibleLight,
        culling: &C,
    ) {
        let mut position = light.position();
        position[3] = 1.0 / (light.range * light.range).max(MIN_RANGE_SQ);

        let mask = f32::from_bits(light.rendering_layer_mask);
        let (direction, spot_angles) = match light.kind {
            LightKind::Spot => {
                let forward = light.forward();
                (
                    [-forward[0], -forward[1], -forward[2], mask],
                    spot_angles(light.inner_spot_angle, light.spot_angle),
                )
            }
            _ => ([0.0, 0.0, 0.0, mask], [0.0, 1.0, 0.0, 0.0]),
        };

        let shadow = self
            .shadows
            .reserve_other(&light.shadow, light.kind, visible_index, culling);

        let lights = &mut self.buffer.other;
        lights.colors[index] = light.final_color;
        lights.positions[index] = position;
        lights.directions_and_masks[index] = direction;
        lights.spot_angles[index] = spot_angles;
        lights.shadow_data[index] = shadow.to_shader_data();
    }
}

/// Spot attenuation `(a, b)` so that `saturate(d * a + b)` fades from outer to inner cone
pub fn spot_angles(inner_degrees: f32, outer_degrees: f32) -> [f32; 4] {
    let inner_cos = (0.5 * inner_degrees).to_radians().cos();
    let outer_cos = (0.5 * outer_degrees).to_radians().cos();
    let angle_range_inv = 1.0 / (inner_cos - outer_cos).max(MIN_SPOT_ANGLE_RANGE);
    [angle_range_inv, -outer_cos * angle_range_inv, 0.0, 0.0]
}
