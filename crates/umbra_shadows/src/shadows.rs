//! Per-frame shadow driver
//!
//! [`ShadowRenderer`] owns the frame's reservations, lays out both atlases,
//! asks the host for light matrices and records the shadow passes. The
//! output is a [`ShadowFrame`] holding the command list and the uniform
//! blocks the lit shaders read.
//!
//! Frame lifecycle:
//!
//! 1. `setup` with the current settings
//! 2. `reserve_directional` / `reserve_other` while packing lights
//! 3. `render` once all lights are reserved
//! 4. `cleanup` after the camera is done with the atlases

use crate::atlas::{
    convert_to_atlas_matrix, other_normal_bias, other_tile_data, point_fov_bias,
    AtlasKind, AtlasSizes, DepthConvention,
};
use crate::cascade::{blend_culling_factor, distance_fade, CascadeState, MAX_CASCADES};
use crate::command::{ShadowCommand, ShadowCommandList};
use crate::config::ShadowSettings;
use crate::data::{
    DirectionalShadowUniforms, OtherShadowUniforms, ShadowGlobals, MAX_DIRECTIONAL_TILES,
};
use crate::host::{CubemapFace, ShadowCulling, ShadowSplit};
use crate::keywords::{CASCADE_BLEND, DIRECTIONAL_FILTER, OTHER_FILTER, SHADOW_MASK};
use crate::light::{LightKind, LightShadowInfo};
use crate::matrix::{multiply, Mat4};
use crate::reservation::{
    ShadowReservation, ShadowReservations, ShadowedOtherLight, MAX_SHADOWED_OTHER_LIGHTS,
};
use crate::tile::{TileLayout, TileViewport};

const SAMPLE_NAME: &str = "Shadows";

/// Output of one shadow render
#[derive(Clone, Debug, Default)]
pub struct ShadowFrame {
    /// Global shadow uniforms
    pub globals: ShadowGlobals,

    /// Directional matrices and cascade data
    pub directional: DirectionalShadowUniforms,

    /// Other-light matrices and tile data
    pub other: OtherShadowUniforms,

    /// Commands to replay on the backend
    pub commands: ShadowCommandList,
}

impl ShadowFrame {
    /// Whether the frame drew anything into the atlases
    pub fn has_shadows(&self) -> bool {
        self.commands.draw_count() > 0
    }
}

/// Shadow atlas allocator and pass recorder
#[derive(Clone, Debug)]
pub struct ShadowRenderer {
    depth: DepthConvention,
    settings: ShadowSettings,
    reservations: ShadowReservations,
    cascades: CascadeState,
    directional_matrices: [Mat4; MAX_DIRECTIONAL_TILES],
    other_matrices: [Mat4; MAX_SHADOWED_OTHER_LIGHTS],
    other_tiles: [[f32; 4]; MAX_SHADOWED_OTHER_LIGHTS],
    atlas_sizes: AtlasSizes,
    other_atlas_acquired: bool,
}

impl Default for ShadowRenderer {
    fn default() -> Self {
        Self::new(DepthConvention::default())
    }
}

impl ShadowRenderer {
    /// Create a renderer for the given depth convention
    pub fn new(depth: DepthConvention) -> Self {
        Self {
            depth,
            settings: ShadowSettings::default(),
            reservations: ShadowReservations::new(),
            cascades: CascadeState::new(),
            directional_matrices: [[[0.0; 4]; 4]; MAX_DIRECTIONAL_TILES],
            other_matrices: [[[0.0; 4]; 4]; MAX_SHADOWED_OTHER_LIGHTS],
            other_tiles: [[0.0; 4]; MAX_SHADOWED_OTHER_LIGHTS],
            atlas_sizes: AtlasSizes::default(),
            other_atlas_acquired: false,
        }
    }

    /// Start a new frame
    ///
    /// Reservation counters and the shadow mask flag are reset. Matrices and
    /// atlas sizes persist until overwritten.
    pub fn setup(&mut self, settings: &ShadowSettings) {
        self.settings = settings.clone();
        self.settings.validate();
        self.reservations.reset();
        self.other_atlas_acquired = false;
    }

    /// Settings in use this frame
    pub fn settings(&self) -> &ShadowSettings {
        &self.settings
    }

    /// This frame's reservations
    pub fn reservations(&self) -> &ShadowReservations {
        &self.reservations
    }

    /// Reserve cascade tiles for a directional light
    pub fn reserve_directional<C: ShadowCulling + ?Sized>(
        &mut self,
        light: &LightShadowInfo,
        visible_light_index: usize,
        culling: &C,
    ) -> ShadowReservation {
        let cascade_count = self.settings.directional.cascade_count;
        self.reservations
            .reserve_directional(light, visible_light_index, cascade_count, culling)
    }

    /// Reserve tiles for a point or spot light
    pub fn reserve_other<C: ShadowCulling + ?Sized>(
        &mut self,
        light: &LightShadowInfo,
        kind: LightKind,
        visible_light_index: usize,
        culling: &C,
    ) -> ShadowReservation {
        self.reservations.reserve_other(light, kind, visible_light_index, culling)
    }

    /// Render both atlases and build the shadow uniforms
    pub fn render<C: ShadowCulling + ?Sized>(&mut self, culling: &C) -> ShadowFrame {
        let mut commands = ShadowCommandList::new();
        commands.push(ShadowCommand::BeginSample(SAMPLE_NAME.to_string()));

        if self.reservations.directional_count() > 0 {
            self.render_directional(culling, &mut commands);
        } else {
            commands.push(ShadowCommand::AcquireAtlas {
                atlas: AtlasKind::Directional,
                size: 1,
            });
        }

        if self.reservations.other_tile_count() > 0 {
            self.render_other(culling, &mut commands);
        } else {
            commands.push(ShadowCommand::AliasOtherAtlasToDirectional);
        }

        let mask_keyword = self
            .reservations
            .use_shadow_mask()
            .then(|| self.settings.shadowmask_mode.keyword_index());
        commands.set_keywords(SHADOW_MASK.select(mask_keyword));

        let cascade_count = if self.reservations.directional_count() > 0 {
            self.settings.directional.cascade_count as i32
        } else {
            0
        };

        let globals = ShadowGlobals {
            atlas_sizes: self.atlas_sizes.to_vec4(),
            distance_fade: distance_fade(
                self.settings.max_distance,
                self.settings.distance_fade,
                self.settings.directional.cascade_fade,
            ),
            cascade_count,
            _pad: [0; 3],
        };

        commands.push(ShadowCommand::EndSample(SAMPLE_NAME.to_string()));

        log::debug!(
            "Shadow frame: {} directional lights, {} other tiles, {} draws",
            self.reservations.directional_count(),
            self.reservations.other_tile_count(),
            commands.draw_count()
        );

        ShadowFrame {
            globals,
            directional: DirectionalShadowUniforms::new(&self.directional_matrices, &self.cascades),
            other: OtherShadowUniforms {
                matrices: self.other_matrices,
                tiles: self.other_tiles,
            },
            commands,
        }
    }

    /// Release the atlases acquired by the last render
    pub fn cleanup(&mut self) -> ShadowCommandList {
        let mut commands = ShadowCommandList::new();
        commands.push(ShadowCommand::ReleaseAtlas(AtlasKind::Directional));
        if self.other_atlas_acquired {
            commands.push(ShadowCommand::ReleaseAtlas(AtlasKind::Other));
            self.other_atlas_acquired = false;
        }
        commands
    }

    fn render_directional<C: ShadowCulling + ?Sized>(
        &mut self,
        culling: &C,
        commands: &mut ShadowCommandList,
    ) {
        let settings = &self.settings.directional;
        let atlas_size = settings.atlas_size.pixels();
        let cascade_count = settings.cascade_count;
        let ratios = settings.cascade_ratios();
        let culling_factor = blend_culling_factor(settings.cascade_fade);
        let filter = settings.filter;

        self.atlas_sizes.set(AtlasKind::Directional, atlas_size);
        commands.push(ShadowCommand::AcquireAtlas {
            atlas: AtlasKind::Directional,
            size: atlas_size,
        });
        commands.push(ShadowCommand::SetShadowPancaking(true));

        let tile_count = self.reservations.directional_count() * cascade_count as usize;
        let layout = TileLayout::new(atlas_size, tile_count);

        let mut cascade_set = [false; MAX_CASCADES];

        for (index, light) in self.reservations.directional_lights().iter().enumerate() {
            let tile_offset = index as u32 * cascade_count;

            for cascade in 0..cascade_count {
                let split = culling.directional_shadow_split(
                    light.visible_light_index,
                    cascade,
                    cascade_count,
                    ratios,
                    layout.tile_size,
                    light.near_plane_offset,
                );
                let Some(mut split) = split else {
                    log::warn!(
                        "No cascade {} matrices for directional light {}, skipping tile",
                        cascade, light.visible_light_index
                    );
                    continue;
                };
                split.cascade_blend_culling_factor = culling_factor;

                // Cascade spheres are shared by all directional lights. The first
                // light with a valid split for a cascade provides it.
                if !cascade_set[cascade as usize] {
                    self.cascades.set_cascade(
                        cascade as usize,
                        split.culling_sphere,
                        layout.tile_size as f32,
                        filter,
                    );
                    cascade_set[cascade as usize] = true;
                }

                let tile_index = tile_offset + cascade;
                let viewport = layout.viewport(tile_index);
                self.directional_matrices[tile_index as usize] = convert_to_atlas_matrix(
                    &multiply(&split.projection, &split.view),
                    viewport.offset,
                    layout.tile_scale(),
                    self.depth,
                );

                record_tile(commands, viewport, light.visible_light_index, light.slope_scale_bias, split);
            }
        }

        commands.set_keywords(DIRECTIONAL_FILTER.select(filter.keyword_index()));
        commands.set_keywords(CASCADE_BLEND.select(settings.cascade_blend.keyword_index()));

        log::trace!(
            "Directional atlas {}px, split {}, tile {}px",
            atlas_size, layout.split, layout.tile_size
        );
    }

    fn render_other<C: ShadowCulling + ?Sized>(
        &mut self,
        culling: &C,
        commands: &mut ShadowCommandList,
    ) {
        let atlas_size = self.settings.other.atlas_size.pixels();
        let filter = self.settings.other.filter;

        self.atlas_sizes.set(AtlasKind::Other, atlas_size);
        self.other_atlas_acquired = true;
        commands.push(ShadowCommand::AcquireAtlas {
            atlas: AtlasKind::Other,
            size: atlas_size,
        });
        commands.push(ShadowCommand::SetShadowPancaking(false));

        let layout = TileLayout::new(atlas_size, self.reservations.other_tile_count());
        // Fixed arrays, copied on the stack so tiles can be written while iterating
        let reservations = self.reservations.clone();
        for (tile, light) in reservations.other_lights() {
            if light.is_point {
                self.render_point(culling, commands, &layout, tile, light);
            } else {
                self.render_spot(culling, commands, &layout, tile, light);
            }
        }

        commands.set_keywords(OTHER_FILTER.select(filter.keyword_index()));

        log::trace!(
            "Other atlas {}px, split {}, tile {}px",
            atlas_size, layout.split, layout.tile_size
        );
    }

    fn render_spot<C: ShadowCulling + ?Sized>(
        &mut self,
        culling: &C,
        commands: &mut ShadowCommandList,
        layout: &TileLayout,
        tile: usize,
        light: &ShadowedOtherLight,
    ) {
        let Some(split) = culling.spot_shadow_split(light.visible_light_index) else {
            log::warn!(
                "No matrices for spot light {}, skipping tile",
                light.visible_light_index
            );
            return;
        };

        let texel_size = 2.0 / (layout.tile_size as f32 * split.projection[0][0]);
        let (_, bias) = other_normal_bias(light.normal_bias, texel_size, self.settings.other.filter);

        self.store_other_tile(layout, tile, bias, &split);
        record_tile(
            commands,
            layout.viewport(tile as u32),
            light.visible_light_index,
            light.slope_scale_bias,
            split,
        );
    }

    fn render_point<C: ShadowCulling + ?Sized>(
        &mut self,
        culling: &C,
        commands: &mut ShadowCommandList,
        layout: &TileLayout,
        tile: usize,
        light: &ShadowedOtherLight,
    ) {
        let texel_size = 2.0 / layout.tile_size as f32;
        let (filter_size, bias) =
            other_normal_bias(light.normal_bias, texel_size, self.settings.other.filter);
        let fov_bias = point_fov_bias(bias, filter_size);

        for (face_index, face) in CubemapFace::ALL.iter().enumerate() {
            let Some(mut split) = culling.point_shadow_split(light.visible_light_index, *face, fov_bias) else {
                log::warn!(
                    "No {:?} face matrices for point light {}, skipping tile",
                    face, light.visible_light_index
                );
                continue;
            };

            // Undo the cube map face flip so front faces stay front faces
            split.view[1][1] = -split.view[1][1];
            split.view[1][2] = -split.view[1][2];
            split.view[1][3] = -split.view[1][3];

            let tile_index = tile + face_index;
            self.store_other_tile(layout, tile_index, bias, &split);
            record_tile(
                commands,
                layout.viewport(tile_index as u32),
                light.visible_light_index,
                light.slope_scale_bias,
                split,
            );
        }
    }

    fn store_other_tile(&mut self, layout: &TileLayout, tile: usize, bias: f32, split: &ShadowSplit) {
        let viewport = layout.viewport(tile as u32);
        let scale = layout.tile_scale();

        self.other_tiles[tile] =
            other_tile_data(viewport.offset, scale, bias, self.atlas_sizes.inverse_other());
        self.other_matrices[tile] = convert_to_atlas_matrix(
            &multiply(&split.projection, &split.view),
            viewport.offset,
            scale,
            self.depth,
        );
    }
}

/// Record viewport, biased draw and bias reset for one tile
fn record_tile(
    commands: &mut ShadowCommandList,
    viewport: TileViewport,
    visible_light_index: usize,
    slope_bias: f32,
    split: ShadowSplit,
) {
    commands.push(ShadowCommand::SetViewport(viewport));
    commands.push(ShadowCommand::SetViewProjection {
        view: split.view,
        projection: split.projection,
    });
    commands.push(ShadowCommand::SetDepthBias { bias: 0.0, slope_bias });
    commands.push(ShadowCommand::DrawShadows { visible_light_index, split });
    commands.push(ShadowCommand::SetDepthBias { bias: 0.0, slope_bias: 0.0 });
}
