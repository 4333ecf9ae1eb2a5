//! # umbra_lighting - Light Packing
//!
//! Packs the host's visible lights into fixed-size GPU arrays, builds the
//! lights-per-object index map and drives [`umbra_shadows`] for the frame.
//!
//! # Usage
//!
//! ```ignore
//! use umbra_lighting::*;
//!
//! let mut lighting = Lighting::new(DepthConvention::Reversed);
//! let config = LightingConfig::load("lighting.json")?;
//!
//! let frame = lighting.setup(&visible_lights, &culling, &config);
//! backend.upload(frame.lights.other_bytes());
//! for command in frame.shadows.commands.iter() {
//!     backend.execute(command);
//! }
//!
//! let release = lighting.cleanup();
//! ```

pub mod buffer;
pub mod config;
pub mod lighting;
pub mod visible;

pub use buffer::{
    GpuDirectionalLights,
    GpuOtherLights,
    LightBuffer,
    LightBufferStats,
    LightCounts,
    MAX_DIRECTIONAL_LIGHTS,
    MAX_OTHER_LIGHTS,
};
pub use config::LightingConfig;
pub use lighting::{Lighting, LightingFrame, LIGHTS_PER_OBJECT_KEYWORD, spot_angles};
pub use visible::VisibleLight;

pub use umbra_shadows::DepthConvention;
