//! # umbra_shadows - Shadow Atlas Allocation
//!
//! Backend-agnostic shadow bookkeeping for directional, spot, and point
//! light shadows packed into shared atlas textures.
//!
//! # Architecture
//!
//! The shadow system is split into:
//!
//! - **Config**: Shadow settings (atlas sizes, filters, cascades)
//! - **Reservation**: Which lights get shadow slots this frame
//! - **Tile**: Square grid layout of tiles inside an atlas
//! - **Cascade**: Culling spheres and fade data for directional cascades
//! - **Atlas**: World-to-atlas matrices and per-tile bounds
//! - **Data**: GPU-ready data structures for shader uniforms
//! - **Shadows**: The per-frame driver that ties everything together
//!
//! # Usage
//!
//! ```ignore
//! use umbra_shadows::*;
//!
//! let mut shadows = ShadowRenderer::new(DepthConvention::Reversed);
//!
//! // Per-frame shadow setup
//! shadows.setup(&settings);
//!
//! // Reserve slots while packing lights
//! let dir_data = shadows.reserve_directional(&sun.shadow, 0, &culling);
//! let spot_data = shadows.reserve_other(&spot.shadow, spot.kind, 1, &culling);
//!
//! // Record shadow passes and build uniforms
//! let frame = shadows.render(&culling);
//! for command in frame.commands.iter() {
//!     backend.execute(command);
//! }
//! backend.upload(frame.directional.as_bytes());
//!
//! // After the camera finished rendering
//! let release = shadows.cleanup();
//! ```

pub mod error;
pub mod config;
pub mod matrix;
pub mod light;
pub mod tile;
pub mod reservation;
pub mod cascade;
pub mod atlas;
pub mod keywords;
pub mod host;
pub mod command;
pub mod data;
pub mod shadows;

// Re-exports
pub use error::ConfigError;

pub use config::{
    ShadowSettings,
    DirectionalShadowSettings,
    OtherShadowSettings,
    MapSize,
    FilterMode,
    CascadeBlendMode,
    ShadowmaskMode,
    ShadowQuality,
};

pub use matrix::{Mat4, IDENTITY};

pub use light::{
    LightKind,
    ShadowCastingMode,
    LightmapBakeType,
    MixedLightingMode,
    LightBakingOutput,
    LightShadowInfo,
};

pub use tile::{TileLayout, TileViewport, compute_split};

pub use reservation::{
    ShadowReservations,
    ShadowReservation,
    ShadowedDirectionalLight,
    ShadowedOtherLight,
    MAX_SHADOWED_DIRECTIONAL_LIGHTS,
    MAX_SHADOWED_OTHER_LIGHTS,
    POINT_LIGHT_TILES,
};

pub use cascade::{CascadeState, MAX_CASCADES};

pub use atlas::{AtlasKind, AtlasSizes, DepthConvention, convert_to_atlas_matrix};

pub use keywords::{KeywordGroup, KeywordState};

pub use host::{Bounds, CubemapFace, ShadowCulling, ShadowSplit};

pub use command::{ShadowCommand, ShadowCommandList};

pub use data::{
    DirectionalShadowUniforms,
    OtherShadowUniforms,
    ShadowGlobals,
};

pub use shadows::{ShadowRenderer, ShadowFrame};
