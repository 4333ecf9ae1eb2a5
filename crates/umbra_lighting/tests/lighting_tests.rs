//! Integration tests for umbra_lighting

use umbra_lighting::*;
use umbra_shadows::{
    AtlasKind, Bounds, CubemapFace, LightBakingOutput, LightKind, LightShadowInfo,
    ShadowCommand, ShadowCulling, ShadowSplit, ShadowmaskMode, IDENTITY,
};

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Every light has casters and identity matrices
struct OpenScene;

impl OpenScene {
    fn split() -> Option<ShadowSplit> {
        Some(ShadowSplit {
            view: IDENTITY,
            projection: IDENTITY,
            culling_sphere: [0.0, 0.0, 0.0, 10.0],
            cascade_blend_culling_factor: 0.0,
        })
    }
}

impl ShadowCulling for OpenScene {
    fn shadow_caster_bounds(&self, _: usize) -> Option<Bounds> {
        Some(Bounds { center: [0.0; 3], extents: [2.0; 3] })
    }

    fn directional_shadow_split(
        &self, _: usize, _: u32, _: u32, _: [f32; 3], _: u32, _: f32,
    ) -> Option<ShadowSplit> {
        Self::split()
    }

    fn point_shadow_split(&self, _: usize, _: CubemapFace, _: f32) -> Option<ShadowSplit> {
        Self::split()
    }

    fn spot_shadow_split(&self, _: usize) -> Option<ShadowSplit> {
        Self::split()
    }
}

#[test]
fn test_mixed_scene() {
    init_logging();

    let mut lighting = Lighting::new(DepthConvention::Reversed);
    let lights = [
        VisibleLight::new(LightKind::Directional),
        VisibleLight::new(LightKind::Point).with_position([0.0, 3.0, 0.0]),
        VisibleLight::new(LightKind::Spot).with_spot_angles(20.0, 40.0),
    ];

    let frame = lighting.setup(&lights, &OpenScene, &LightingConfig::default());

    let counts = frame.lights.counts();
    assert_eq!(counts.directional_count, 1);
    assert_eq!(counts.other_count, 2);

    // Directional tile block starts at 0
    assert_eq!(frame.lights.directional.shadow_data[0], [1.0, 0.0, 0.4, -1.0]);
    // Point light takes tiles 0-5, spot follows at 6
    assert_eq!(frame.lights.other.shadow_data[0], [1.0, 0.0, 1.0, -1.0]);
    assert_eq!(frame.lights.other.shadow_data[1], [1.0, 6.0, 0.0, -1.0]);

    assert_eq!(frame.light_index_map, Some(vec![-1, 0, 1]));
    assert_eq!(frame.shadows.globals.cascade_count, 4);
    // 4 cascades + 6 faces + 1 spot
    assert_eq!(frame.shadows.commands.draw_count(), 11);

    let release = lighting.cleanup().into_vec();
    assert_eq!(
        release,
        vec![
            ShadowCommand::ReleaseAtlas(AtlasKind::Directional),
            ShadowCommand::ReleaseAtlas(AtlasKind::Other),
        ]
    );
}

#[test]
fn test_shadow_mask_from_lighting() {
    init_logging();

    let mut lighting = Lighting::default();
    let baked = LightShadowInfo::new().with_baking(LightBakingOutput::shadowmask(3));
    let lights = [VisibleLight::new(LightKind::Spot).with_shadow(baked)];

    let mut config = LightingConfig::default();
    config.shadows.shadowmask_mode = ShadowmaskMode::Shadowmask;

    let frame = lighting.setup(&lights, &OpenScene, &config);
    assert_eq!(frame.lights.other.shadow_data[0][3], 3.0);
    assert_eq!(frame.shadows.commands.keyword("_SHADOW_MASK_ALWAYS"), Some(true));
}

#[test]
fn test_custom_shadow_keeps_spot_tile_count() {
    init_logging();

    let mut lighting = Lighting::default();
    let faded = LightShadowInfo::new().with_strength(0.5);
    let lights = [
        VisibleLight::new(LightKind::Spot).with_shadow(faded),
        VisibleLight::new(LightKind::Spot),
    ];

    let frame = lighting.setup(&lights, &OpenScene, &LightingConfig::default());
    assert_eq!(frame.lights.other.shadow_data[0], [0.5, 0.0, 0.0, -1.0]);
    assert_eq!(frame.lights.other.shadow_data[1], [1.0, 1.0, 0.0, -1.0]);
    assert_eq!(frame.shadows.commands.draw_count(), 2);
}

#[test]
fn test_frames_do_not_leak_reservations() {
    init_logging();

    let mut lighting = Lighting::default();
    let points = vec![VisibleLight::new(LightKind::Point); 2];

    for _ in 0..3 {
        let frame = lighting.setup(&points, &OpenScene, &LightingConfig::default());
        assert_eq!(frame.lights.other.shadow_data[1][1], 6.0);
        assert_eq!(frame.shadows.commands.draw_count(), 12);
        lighting.cleanup();
    }
}

#[test]
fn test_other_light_limit() {
    init_logging();

    let mut lighting = Lighting::default();
    let lights = vec![VisibleLight::new(LightKind::Spot); MAX_OTHER_LIGHTS + 4];

    let frame = lighting.setup(&lights, &OpenScene, &LightingConfig::default());
    let map = frame.light_index_map.unwrap();

    assert_eq!(frame.lights.counts().other_count as usize, MAX_OTHER_LIGHTS);
    assert_eq!(map[MAX_OTHER_LIGHTS - 1], (MAX_OTHER_LIGHTS - 1) as i32);
    assert!(map[MAX_OTHER_LIGHTS..].iter().all(|&i| i == -1));

    // Only 16 spot lights get shadow tiles, the rest fall back to baked
    assert_eq!(frame.lights.other.shadow_data[15][1], 15.0);
    assert!(frame.lights.other.shadow_data[16][0] < 0.0);
    assert_eq!(frame.shadows.commands.draw_count(), 16);
}

#[test]
fn test_config_file() {
    init_logging();

    let path = std::env::temp_dir().join("umbra_lighting_config_test.json");
    let config = LightingConfig {
        use_lights_per_object: false,
        rendering_layer_mask: 0xff,
        ..Default::default()
    };
    std::fs::write(&path, config.to_json().unwrap()).unwrap();

    let loaded = LightingConfig::load(&path).unwrap();
    assert_eq!(loaded, config);
    let _ = std::fs::remove_file(&path);
}
