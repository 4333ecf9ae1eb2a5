//! Lighting configuration

use std::path::Path;

use serde::{Serialize, Deserialize};
use umbra_shadows::{ConfigError, ShadowSettings};

/// Per-camera lighting configuration
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LightingConfig {
    /// Build a lights-per-object index map
    pub use_lights_per_object: bool,

    /// Rendering layers lit by this camera
    pub rendering_layer_mask: u32,

    /// Shadow settings
    pub shadows: ShadowSettings,
}

impl Default for LightingConfig {
    fn default() -> Self {
        Self {
            use_lights_per_object: true,
            rendering_layer_mask: u32::MAX,
            shadows: ShadowSettings::default(),
        }
    }
}

impl LightingConfig {
    /// Clamp shadow settings to valid ranges
    pub fn validate(&mut self) {
        self.shadows.validate();
    }

    /// Parse from JSON, validating the result
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let mut config: Self = serde_json::from_str(json)?;
        config.validate();
        Ok(config)
    }

    /// Serialize to pretty JSON
    pub fn to_json(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Load from a JSON file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)?;
        log::debug!("Loading lighting config from {}", path.display());
        Self::from_json(&json)
    }
}
