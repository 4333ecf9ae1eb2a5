//! Integration tests for umbra_shadows

use approx::assert_relative_eq;
use umbra_shadows::*;
use umbra_shadows::matrix::transform;

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Host that culls with simple orthographic and perspective projections
struct TestScene {
    /// Visible light indices without any shadow casters
    empty: Vec<usize>,
    /// Lights whose split queries fail
    broken: Vec<usize>,
    radius: f32,
}

impl TestScene {
    fn new() -> Self {
        Self { empty: Vec::new(), broken: Vec::new(), radius: 20.0 }
    }

    fn ortho(&self) -> Mat4 {
        let s = 1.0 / self.radius;
        [
            [s, 0.0, 0.0, 0.0],
            [0.0, s, 0.0, 0.0],
            [0.0, 0.0, -s, 0.0],
            [0.0, 0.0, 0.0, 1.0],
        ]
    }

    fn perspective() -> Mat4 {
        // 90 degree frustum, near 0.1, far 10
        let (n, f) = (0.1f32, 10.0f32);
        [
            [1.0, 0.0, 0.0, 0.0],
            [0.0, 1.0, 0.0, 0.0],
            [0.0, 0.0, (f + n) / (n - f), 2.0 * f * n / (n - f)],
            [0.0, 0.0, -1.0, 0.0],
        ]
    }

    fn split(&self, index: usize, projection: Mat4) -> Option<ShadowSplit> {
        if self.broken.contains(&index) {
            return None;
        }
        Some(ShadowSplit {
            view: IDENTITY,
            projection,
            culling_sphere: [0.0, 0.0, 0.0, self.radius],
            cascade_blend_culling_factor: 0.0,
        })
    }
}

impl ShadowCulling for TestScene {
    fn shadow_caster_bounds(&self, index: usize) -> Option<Bounds> {
        if self.empty.contains(&index) {
            None
        } else {
            Some(Bounds { center: [0.0; 3], extents: [5.0; 3] })
        }
    }

    fn directional_shadow_split(
        &self,
        index: usize,
        _cascade_index: u32,
        _cascade_count: u32,
        _cascade_ratios: [f32; 3],
        _tile_size: u32,
        _near_plane_offset: f32,
    ) -> Option<ShadowSplit> {
        self.split(index, self.ortho())
    }

    fn point_shadow_split(&self, index: usize, _face: CubemapFace, _fov_bias: f32) -> Option<ShadowSplit> {
        self.split(index, Self::perspective())
    }

    fn spot_shadow_split(&self, index: usize) -> Option<ShadowSplit> {
        self.split(index, Self::perspective())
    }
}

fn uv(m: &Mat4, p: [f32; 3]) -> [f32; 2] {
    let v = transform(m, [p[0], p[1], p[2], 1.0]);
    [v[0] / v[3], v[1] / v[3]]
}

#[test]
fn test_directional_matrices_stay_in_their_tile() {
    init_logging();

    let mut settings = ShadowSettings::default();
    settings.directional.atlas_size = MapSize::S2048;
    settings.directional.cascade_count = 2;

    let scene = TestScene::new();
    let mut shadows = ShadowRenderer::new(DepthConvention::Reversed);
    shadows.setup(&settings);

    let sun = LightShadowInfo::new();
    let moon = LightShadowInfo::new().with_strength(0.5);
    let first = shadows.reserve_directional(&sun, 0, &scene);
    let second = shadows.reserve_directional(&moon, 1, &scene);

    assert_eq!(first.to_shader_data()[1], 0.0);
    assert_eq!(second.to_shader_data(), [0.5, 2.0, 0.4, -1.0]);

    let frame = shadows.render(&scene);

    // 4 tiles in a 2x2 grid
    for tile in 0..4usize {
        let m = &frame.directional.matrices[tile];
        let cell = [(tile % 2) as f32 * 0.5, (tile / 2) as f32 * 0.5];

        for corner in [[-20.0, -20.0, 0.0], [20.0, 20.0, 0.0], [0.0, 0.0, 5.0]] {
            let p = uv(m, corner);
            assert!(p[0] >= cell[0] - 1e-5 && p[0] <= cell[0] + 0.5 + 1e-5);
            assert!(p[1] >= cell[1] - 1e-5 && p[1] <= cell[1] + 0.5 + 1e-5);
        }
    }

    assert_eq!(frame.globals.cascade_count, 2);
    assert_eq!(frame.globals.atlas_sizes[0], 2048.0);
    assert_relative_eq!(frame.globals.atlas_sizes[1], 1.0 / 2048.0);
}

#[test]
fn test_other_atlas_tiles_and_bias() {
    init_logging();

    let mut settings = ShadowSettings::default();
    settings.other.atlas_size = MapSize::S1024;
    settings.other.filter = FilterMode::Pcf3x3;

    let scene = TestScene::new();
    let mut shadows = ShadowRenderer::default();
    shadows.setup(&settings);

    let spot = LightShadowInfo::new();
    let reservation = shadows.reserve_other(&spot, LightKind::Spot, 3, &scene);
    assert_eq!(reservation.to_shader_data(), [1.0, 0.0, 0.0, -1.0]);

    let frame = shadows.render(&scene);

    // A single spot light fills the whole atlas
    let tile = frame.other.tiles[0];
    let border = 0.5 / 1024.0;
    assert_relative_eq!(tile[0], border);
    assert_relative_eq!(tile[2], 1.0 - 2.0 * border);

    // texel = 2 / (1024 * 1), filter = 2 texels
    let filter = 2.0 * 2.0 / 1024.0;
    assert_relative_eq!(tile[3], 0.4 * filter * std::f32::consts::SQRT_2, max_relative = 1e-5);

    assert_eq!(frame.commands.keyword("_OTHER_PCF3"), Some(true));
    assert_eq!(frame.globals.cascade_count, 0);
    assert!(frame
        .commands
        .iter()
        .any(|c| *c == ShadowCommand::SetShadowPancaking(false)));
}

#[test]
fn test_capacity_overflow_degrades_to_baked() {
    init_logging();

    let scene = TestScene::new();
    let mut shadows = ShadowRenderer::default();
    shadows.setup(&ShadowSettings::default());

    let point = LightShadowInfo::new();
    let spot = LightShadowInfo::new();

    // 6 + 6 tiles, then 3 spots fill 15 of 16
    assert!(shadows.reserve_other(&point, LightKind::Point, 0, &scene).is_reserved());
    assert!(shadows.reserve_other(&point, LightKind::Point, 1, &scene).is_reserved());
    for i in 2..5 {
        assert!(shadows.reserve_other(&spot, LightKind::Spot, i, &scene).is_reserved());
    }

    let rejected = shadows.reserve_other(&point, LightKind::Point, 5, &scene);
    assert_eq!(rejected.to_shader_data(), [-1.0, 0.0, 0.0, -1.0]);

    let last = shadows.reserve_other(&spot, LightKind::Spot, 6, &scene);
    assert_eq!(last.to_shader_data()[1], 15.0);

    let overflow = shadows.reserve_other(&spot, LightKind::Spot, 7, &scene);
    assert!(!overflow.is_reserved());

    let frame = shadows.render(&scene);
    assert_eq!(frame.commands.draw_count(), 16);
}

#[test]
fn test_failed_split_skips_tile() {
    init_logging();

    let mut scene = TestScene::new();
    scene.broken.push(1);

    let mut shadows = ShadowRenderer::default();
    shadows.setup(&ShadowSettings::default());

    let spot = LightShadowInfo::new();
    shadows.reserve_other(&spot, LightKind::Spot, 0, &scene);
    shadows.reserve_other(&spot, LightKind::Spot, 1, &scene);

    let frame = shadows.render(&scene);
    assert_eq!(frame.commands.draw_count(), 1);
    assert_eq!(frame.other.tiles[1], [0.0; 4]);
}

#[test]
fn test_shadow_mask_without_casters() {
    init_logging();

    let mut scene = TestScene::new();
    scene.empty.push(0);

    let mut shadows = ShadowRenderer::default();
    shadows.setup(&ShadowSettings::default());

    let light = LightShadowInfo::new()
        .with_strength(0.8)
        .with_baking(LightBakingOutput::shadowmask(1));
    let reservation = shadows.reserve_directional(&light, 0, &scene);
    assert_eq!(reservation.to_shader_data(), [-0.8, 0.0, 0.0, 1.0]);

    let frame = shadows.render(&scene);
    assert_eq!(frame.commands.keyword("_SHADOW_MASK_DISTANCE"), Some(true));
    assert_eq!(frame.globals.cascade_count, 0);
    assert!(!frame.has_shadows());
}

#[test]
fn test_uniform_uploads() {
    init_logging();

    let scene = TestScene::new();
    let mut shadows = ShadowRenderer::default();
    shadows.setup(&ShadowSettings::high_quality());
    shadows.reserve_directional(&LightShadowInfo::new(), 0, &scene);

    let frame = shadows.render(&scene);
    assert_eq!(frame.globals.as_bytes().len(), 48);
    assert_eq!(frame.directional.as_bytes().len(), std::mem::size_of::<DirectionalShadowUniforms>());
    assert_eq!(frame.other.as_bytes().len(), std::mem::size_of::<OtherShadowUniforms>());
}

#[test]
fn test_settings_file_round_trip() {
    init_logging();

    let path = std::env::temp_dir().join("umbra_shadow_settings_test.json");
    let settings = ShadowQuality::Medium.to_settings();
    std::fs::write(&path, settings.to_json().unwrap()).unwrap();

    let loaded = ShadowSettings::load(&path).unwrap();
    assert_eq!(loaded, settings);

    let _ = std::fs::remove_file(&path);
    assert!(matches!(ShadowSettings::load(&path), Err(ConfigError::FileRead(_))));
}
