//! Shadow Configuration
//!
//! Shadow settings with serde support so pipeline assets can be stored as
//! JSON and reloaded without recompiling.

use std::path::Path;

use serde::{Serialize, Deserialize};

use crate::error::ConfigError;

/// Square shadow atlas resolution
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub enum MapSize {
    S256,
    S512,
    S1024,
    S2048,
    S4096,
    S8192,
}

impl MapSize {
    /// Atlas width and height in pixels
    pub fn pixels(self) -> u32 {
        match self {
            Self::S256 => 256,
            Self::S512 => 512,
            Self::S1024 => 1024,
            Self::S2048 => 2048,
            Self::S4096 => 4096,
            Self::S8192 => 8192,
        }
    }
}

impl Default for MapSize {
    fn default() -> Self {
        Self::S1024
    }
}

impl TryFrom<u32> for MapSize {
    type Error = ConfigError;

    fn try_from(pixels: u32) -> Result<Self, Self::Error> {
        match pixels {
            256 => Ok(Self::S256),
            512 => Ok(Self::S512),
            1024 => Ok(Self::S1024),
            2048 => Ok(Self::S2048),
            4096 => Ok(Self::S4096),
            8192 => Ok(Self::S8192),
            other => Err(ConfigError::UnsupportedMapSize(other)),
        }
    }
}

impl From<MapSize> for u32 {
    fn from(size: MapSize) -> Self {
        size.pixels()
    }
}

/// PCF filter kernel used when sampling shadow maps
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FilterMode {
    /// Hardware 2x2 bilinear comparison, no keyword
    #[default]
    Pcf2x2,
    Pcf3x3,
    Pcf5x5,
    Pcf7x7,
}

impl FilterMode {
    /// Position in the declaration order (PCF2x2 = 0)
    pub fn ordinal(self) -> u32 {
        match self {
            Self::Pcf2x2 => 0,
            Self::Pcf3x3 => 1,
            Self::Pcf5x5 => 2,
            Self::Pcf7x7 => 3,
        }
    }

    /// Index of the filter keyword to enable, `None` for the default kernel
    pub fn keyword_index(self) -> Option<usize> {
        (self.ordinal() as usize).checked_sub(1)
    }

    /// Filter footprint in world units for a given texel size
    pub fn filter_size(self, texel_size: f32) -> f32 {
        texel_size * (self.ordinal() as f32 + 1.0)
    }
}

/// How neighbouring cascades are blended
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CascadeBlendMode {
    #[default]
    Hard,
    Soft,
    Dither,
}

impl CascadeBlendMode {
    /// Index of the blend keyword to enable, `None` for hard transitions
    pub fn keyword_index(self) -> Option<usize> {
        match self {
            Self::Hard => None,
            Self::Soft => Some(0),
            Self::Dither => Some(1),
        }
    }
}

/// Project-wide shadow mask mode for mixed lights
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ShadowmaskMode {
    /// Baked shadows are always used for static casters
    Shadowmask,
    /// Realtime shadows up to the shadow distance, baked beyond
    #[default]
    DistanceShadowmask,
}

impl ShadowmaskMode {
    /// Index into the shadow mask keyword group
    pub fn keyword_index(self) -> usize {
        match self {
            Self::Shadowmask => 0,
            Self::DistanceShadowmask => 1,
        }
    }
}

/// Directional light shadow settings
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DirectionalShadowSettings {
    /// Directional atlas resolution
    pub atlas_size: MapSize,

    /// PCF filter
    pub filter: FilterMode,

    /// Cascade count (1-4)
    pub cascade_count: u32,

    /// First cascade split as a fraction of the shadow distance
    pub cascade_ratio1: f32,

    /// Second cascade split
    pub cascade_ratio2: f32,

    /// Third cascade split
    pub cascade_ratio3: f32,

    /// Fraction of each cascade used to fade into the next
    pub cascade_fade: f32,

    /// Blend mode between cascades
    pub cascade_blend: CascadeBlendMode,
}

impl Default for DirectionalShadowSettings {
    fn default() -> Self {
        Self {
            atlas_size: MapSize::S1024,
            filter: FilterMode::Pcf2x2,
            cascade_count: 4,
            cascade_ratio1: 0.1,
            cascade_ratio2: 0.25,
            cascade_ratio3: 0.5,
            cascade_fade: 0.1,
            cascade_blend: CascadeBlendMode::Hard,
        }
    }
}

impl DirectionalShadowSettings {
    /// Cascade split ratios in the order the culling host expects
    pub fn cascade_ratios(&self) -> [f32; 3] {
        [self.cascade_ratio1, self.cascade_ratio2, self.cascade_ratio3]
    }
}

/// Point and spot light shadow settings
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OtherShadowSettings {
    /// Other-light atlas resolution
    pub atlas_size: MapSize,

    /// PCF filter
    pub filter: FilterMode,
}

/// Shadow settings shared by every camera in the pipeline
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShadowSettings {
    /// Maximum shadow distance from the camera
    pub max_distance: f32,

    /// Fraction of `max_distance` over which shadows fade out
    pub distance_fade: f32,

    /// Shadow mask mode for mixed lights
    pub shadowmask_mode: ShadowmaskMode,

    /// Directional light settings
    pub directional: DirectionalShadowSettings,

    /// Point and spot light settings
    pub other: OtherShadowSettings,
}

impl Default for ShadowSettings {
    fn default() -> Self {
        Self {
            max_distance: 100.0,
            distance_fade: 0.1,
            shadowmask_mode: ShadowmaskMode::DistanceShadowmask,
            directional: DirectionalShadowSettings::default(),
            other: OtherShadowSettings::default(),
        }
    }
}

impl ShadowSettings {
    /// Create a high-quality shadow configuration
    pub fn high_quality() -> Self {
        Self {
            directional: DirectionalShadowSettings {
                atlas_size: MapSize::S4096,
                filter: FilterMode::Pcf5x5,
                cascade_blend: CascadeBlendMode::Soft,
                ..Default::default()
            },
            other: OtherShadowSettings {
                atlas_size: MapSize::S2048,
                filter: FilterMode::Pcf5x5,
            },
            ..Default::default()
        }
    }

    /// Create a low-quality shadow configuration for performance
    pub fn low_quality() -> Self {
        Self {
            max_distance: 50.0,
            directional: DirectionalShadowSettings {
                atlas_size: MapSize::S1024,
                cascade_count: 2,
                cascade_ratio1: 0.25,
                ..Default::default()
            },
            other: OtherShadowSettings {
                atlas_size: MapSize::S512,
                filter: FilterMode::Pcf2x2,
            },
            ..Default::default()
        }
    }

    /// Validate configuration and clamp values to valid ranges
    pub fn validate(&mut self) {
        self.max_distance = self.max_distance.max(0.001);
        self.distance_fade = self.distance_fade.clamp(0.001, 1.0);

        let dir = &mut self.directional;
        dir.cascade_count = dir.cascade_count.clamp(1, 4);
        dir.cascade_ratio1 = dir.cascade_ratio1.clamp(0.0, 1.0);
        dir.cascade_ratio2 = dir.cascade_ratio2.clamp(0.0, 1.0);
        dir.cascade_ratio3 = dir.cascade_ratio3.clamp(0.0, 1.0);
        dir.cascade_fade = dir.cascade_fade.clamp(0.001, 1.0);
    }

    /// Parse settings from JSON and clamp them to valid ranges
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let mut settings: Self = serde_json::from_str(json)?;
        settings.validate();
        Ok(settings)
    }

    /// Serialize settings to pretty JSON
    pub fn to_json(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Load settings from a JSON file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)?;
        log::debug!("Loading shadow settings from {}", path.display());
        Self::from_json(&json)
    }
}

/// Shadow quality preset
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ShadowQuality {
    Low,
    Medium,
    High,
}

impl ShadowQuality {
    /// Convert to shadow settings
    pub fn to_settings(self) -> ShadowSettings {
        match self {
            Self::Low => ShadowSettings::low_quality(),
            Self::Medium => ShadowSettings::default(),
            Self::High => ShadowSettings::high_quality(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shadow_settings_default() {
        let settings = ShadowSettings::default();
        assert_eq!(settings.max_distance, 100.0);
        assert_eq!(settings.directional.atlas_size.pixels(), 1024);
        assert_eq!(settings.directional.cascade_count, 4);
        assert_eq!(settings.directional.cascade_ratios(), [0.1, 0.25, 0.5]);
        assert_eq!(settings.other.filter, FilterMode::Pcf2x2);
    }

    #[test]
    fn test_shadow_settings_validate() {
        let mut settings = ShadowSettings {
            max_distance: -5.0,
            distance_fade: 3.0,
            ..Default::default()
        };
        settings.directional.cascade_count = 10;
        settings.directional.cascade_ratio2 = -1.0;
        settings.directional.cascade_fade = 0.0;

        settings.validate();

        assert_eq!(settings.max_distance, 0.001);
        assert_eq!(settings.distance_fade, 1.0);
        assert_eq!(settings.directional.cascade_count, 4);
        assert_eq!(settings.directional.cascade_ratio2, 0.0);
        assert_eq!(settings.directional.cascade_fade, 0.001);
    }

    #[test]
    fn test_filter_mode_ordinals() {
        assert_eq!(FilterMode::Pcf2x2.keyword_index(), None);
        assert_eq!(FilterMode::Pcf3x3.keyword_index(), Some(0));
        assert_eq!(FilterMode::Pcf7x7.keyword_index(), Some(2));
        assert_eq!(FilterMode::Pcf5x5.filter_size(0.5), 1.5);
    }

    #[test]
    fn test_cascade_blend_keyword_index() {
        assert_eq!(CascadeBlendMode::Hard.keyword_index(), None);
        assert_eq!(CascadeBlendMode::Soft.keyword_index(), Some(0));
        assert_eq!(CascadeBlendMode::Dither.keyword_index(), Some(1));
    }

    #[test]
    fn test_map_size_conversion() {
        assert_eq!(MapSize::try_from(2048).unwrap(), MapSize::S2048);
        assert!(matches!(
            MapSize::try_from(1000),
            Err(ConfigError::UnsupportedMapSize(1000))
        ));
        assert_eq!(u32::from(MapSize::S8192), 8192);
    }

    #[test]
    fn test_shadow_settings_serialization() {
        let settings = ShadowSettings::high_quality();
        let json = settings.to_json().unwrap();
        assert!(json.contains("4096"));

        let restored = ShadowSettings::from_json(&json).unwrap();
        assert_eq!(restored, settings);
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let settings = ShadowSettings::from_json(
            r#"{ "max_distance": 40.0, "directional": { "atlas_size": 2048 } }"#,
        )
        .unwrap();

        assert_eq!(settings.max_distance, 40.0);
        assert_eq!(settings.directional.atlas_size, MapSize::S2048);
        assert_eq!(settings.directional.cascade_count, 4);
        assert_eq!(settings.other.atlas_size, MapSize::S1024);
    }

    #[test]
    fn test_invalid_map_size_rejected() {
        let result = ShadowSettings::from_json(r#"{ "other": { "atlas_size": 300 } }"#);
        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_shadow_quality_presets() {
        let low = ShadowQuality::Low.to_settings();
        assert_eq!(low.directional.cascade_count, 2);

        let high = ShadowQuality::High.to_settings();
        assert_eq!(high.directional.filter, FilterMode::Pcf5x5);
    }
}
