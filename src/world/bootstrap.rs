//! World Bootstrapper
//!
//! Turns a parsed level into engine bodies, render items and static geometry.
//! Scale derivation is split out into `WorldPlan::derive` so a degenerate
//! level is refused before the engine is touched.

use super::level::LevelSpec;
use super::reachability::StaticGeometry;
use super::viewport::{ScreenTransform, Viewport};
use crate::config::SkinConfig;
use crate::constants::{layout, materials};
use crate::error::{GameError, GameResult};
use crate::physics::{
    density_for, BodyCategory, BodyHandle, BoundaryKind, Material, PhysicsEngine, Shape, Vec2,
    WorldBounds, WorldRect,
};
use crate::renderer::registry::RenderItem;
use crate::renderer::visual::{RenderKind, Visual};
use rand::seq::SliceRandom;
use rand::Rng;

/// Scale and horizontal span derived from a level and a viewport
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WorldPlan {
    pub min_x: f32,
    pub max_x: f32,
    pub transform: ScreenTransform,
}

impl WorldPlan {
    pub fn derive(level: &LevelSpec, viewport: Viewport) -> GameResult<Self> {
        let (mut min_x, mut max_x) = level.x_extent();
        if !min_x.is_finite() || !max_x.is_finite() {
            min_x = layout::DEFAULT_SPAN_MIN_X;
            max_x = layout::DEFAULT_SPAN_MAX_X;
        }
        if max_x <= min_x {
            return Err(GameError::DegenerateLevel { min_x, max_x });
        }

        let pixels_per_unit = viewport.width_px / (max_x - min_x);
        Ok(Self {
            min_x,
            max_x,
            transform: ScreenTransform::new(viewport, pixels_per_unit),
        })
    }

    pub fn pixels_per_unit(&self) -> f32 {
        self.transform.pixels_per_unit
    }

    /// Boundary positions: ground at 0, roof at the world height, walls at half the width
    pub fn bounds(&self) -> WorldBounds {
        let size = self.transform.world_size();
        WorldBounds {
            left: -size.x / 2.0,
            right: size.x / 2.0,
            ground: 0.0,
            roof: size.y,
        }
    }
}

/// Where the level's interactive bodies ended up
#[derive(Debug, Clone, PartialEq)]
pub struct WorldLayout {
    pub transform: ScreenTransform,
    pub bounds: WorldBounds,
    pub source: BodyHandle,
    pub source_radius: f32,
    pub targets: Vec<BodyHandle>,
}

/// Everything a level build produced, ready to install
#[derive(Debug, Clone)]
pub struct BuiltWorld {
    pub layout: WorldLayout,
    /// Render items in creation order
    pub items: Vec<RenderItem>,
    pub statics: StaticGeometry,
    /// Sum of the score values of every target that was created
    pub target_threshold: u32,
}

fn material(friction: f32, restitution: f32, half_extents: Vec2) -> Material {
    Material {
        density: density_for(half_extents, materials::BASE_DENSITY),
        friction,
        restitution,
    }
}

/// Populate a freshly created engine world from `level`
///
/// The engine must already hold an empty world with the level's gravity.
/// Rejected statics, targets and obstacles are skipped; a rejected source
/// fails the build and the caller is expected to destroy the world.
pub fn build_world<R: Rng + ?Sized>(
    engine: &mut dyn PhysicsEngine,
    level: &LevelSpec,
    plan: &WorldPlan,
    skins: &SkinConfig,
    rng: &mut R,
) -> GameResult<BuiltWorld> {
    let transform = plan.transform;
    let bounds = plan.bounds();
    let width = bounds.right - bounds.left;
    let height = bounds.roof - bounds.ground;

    let boundary = material(
        materials::BOUNDARY_FRICTION,
        materials::BOUNDARY_RESTITUTION,
        Vec2::ZERO,
    );
    engine.create_boundary(BoundaryKind::Ground, bounds.ground, width, boundary);
    engine.create_boundary(BoundaryKind::Roof, bounds.roof, width, boundary);
    engine.create_boundary(BoundaryKind::LeftWall, bounds.left, height, boundary);
    engine.create_boundary(BoundaryKind::RightWall, bounds.right, height, boundary);

    let mut items = Vec::new();
    let mut statics = StaticGeometry::new();

    for (kind, def) in level.static_objects() {
        let half_extents = def.half_extents();
        let mat = material(materials::STATIC_FRICTION, materials::STATIC_RESTITUTION, half_extents);
        let Some(handle) = engine.create_static_body(Shape::Box { half_extents }, def.center(), mat) else {
            log::warn!("[Bootstrap] Static {:?} at ({}, {}) rejected, skipping", kind, def.x, def.y);
            continue;
        };

        let placed = engine.body_position(handle).unwrap_or_else(|| def.center());
        statics.insert(handle, WorldRect::from_center_half_extents(placed, half_extents));

        let sprite = def
            .sprite_index
            .and_then(|i| level.bitmaps.static_block.get(i))
            .map(String::as_str);
        items.push(RenderItem {
            handle,
            kind: RenderKind::StaticDecor(kind),
            footprint: transform.footprint(half_extents),
            half_extents,
            visual: Visual::for_static(sprite, def.color, skins.fill_for(kind)),
        });
    }

    let mut targets = Vec::new();
    let mut target_threshold = 0u32;
    for def in &level.objects.targets {
        let half_extents = Vec2::splat(def.radius);
        let mat = material(materials::TARGET_FRICTION, materials::TARGET_RESTITUTION, half_extents);
        let shape = Shape::Circle { radius: def.radius };
        let placement = Vec2::new(def.x, def.y);
        let Some(handle) = engine.create_dynamic_body(BodyCategory::Target, shape, placement, mat, def.score) else {
            log::warn!("[Bootstrap] Target at ({}, {}) rejected, skipping", def.x, def.y);
            continue;
        };

        targets.push(handle);
        target_threshold = target_threshold.saturating_add(def.score);
        let sprite = level.bitmaps.target.get(def.sprite_index).map(String::as_str);
        items.push(RenderItem {
            handle,
            kind: RenderKind::Target,
            footprint: transform.footprint(half_extents),
            half_extents,
            visual: Visual::sprite_or_none(sprite),
        });
    }

    for def in &level.objects.obstacles {
        let half_extents = Vec2::new(def.half_w, def.half_h);
        let mat = material(materials::OBSTACLE_FRICTION, materials::OBSTACLE_RESTITUTION, half_extents);
        let shape = Shape::Box { half_extents };
        let placement = Vec2::new(def.x, def.y);
        let Some(handle) = engine.create_dynamic_body(BodyCategory::Obstacle, shape, placement, mat, 0) else {
            log::warn!("[Bootstrap] Obstacle at ({}, {}) rejected, skipping", def.x, def.y);
            continue;
        };

        let sprite = level.bitmaps.obstacle.get(def.sprite_index).map(String::as_str);
        items.push(RenderItem {
            handle,
            kind: RenderKind::Obstacle,
            footprint: transform.footprint(half_extents),
            half_extents,
            visual: Visual::sprite_or_none(sprite),
        });
    }

    let source_def = level.objects.source;
    let half_extents = Vec2::splat(source_def.radius);
    let mat = material(materials::SOURCE_FRICTION, materials::SOURCE_RESTITUTION, half_extents);
    let shape = Shape::Circle { radius: source_def.radius };
    let placement = Vec2::new(source_def.x, source_def.y);
    let source = engine
        .create_dynamic_body(BodyCategory::Source, shape, placement, mat, 0)
        .ok_or(GameError::SourceRejected { x: source_def.x, y: source_def.y })?;
    engine.set_velocity(source, Vec2::ZERO);

    let sprite = level.bitmaps.source.choose(rng).map(String::as_str);
    items.push(RenderItem {
        handle: source,
        kind: RenderKind::Source,
        footprint: transform.footprint(half_extents),
        half_extents,
        visual: Visual::sprite_or_none(sprite),
    });

    log::info!(
        "[Bootstrap] Built '{}': {:.2} px/unit, {} statics, {} targets (threshold {}), {} items",
        level.level_name,
        plan.pixels_per_unit(),
        statics.len(),
        targets.len(),
        target_threshold,
        items.len()
    );

    Ok(BuiltWorld {
        layout: WorldLayout {
            transform,
            // Drag limits follow the boundaries the engine actually holds
            bounds: engine.world_bounds(),
            source,
            source_radius: source_def.radius,
            targets,
        },
        items,
        statics,
        target_threshold,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::physics::KinematicWorld;
    use crate::renderer::visual::Rgba;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    const LEVEL: &str = r##"{
        "levelName": "Bootstrap",
        "world": { "gravity": { "gx": 0.0, "gy": -10.0 } },
        "bitmaps": { "target": ["ic_target"], "obstacle": ["crate"], "source": ["ball_a", "ball_b"] },
        "objects": {
            "pillars": [ { "x": -2.0, "y": 1.0, "halfW": 0.25, "halfH": 1.0 } ],
            "shelves": [ { "x": 0.0, "y": 3.0, "halfW": 1.0, "halfH": 0.1, "color": "#FF0000" } ],
            "targets": [
                { "x": 4.0, "y": 1.0, "radius": 0.5, "score": 5, "spriteIndex": 0 },
                { "x": 3.0, "y": 1.0, "radius": 0.5, "score": 2, "spriteIndex": 3 }
            ],
            "obstacles": [ { "x": 2.0, "y": 0.5, "halfW": 0.5, "halfH": 0.5, "spriteIndex": 0 } ],
            "source": { "x": -5.0, "y": 1.0, "radius": 0.5 }
        }
    }"##;

    fn build(level: &LevelSpec) -> (KinematicWorld, BuiltWorld) {
        let plan = WorldPlan::derive(level, Viewport::default()).expect("plan");
        let mut engine = KinematicWorld::new();
        engine.create_world(level.gravity());
        let built = build_world(&mut engine, level, &plan, &SkinConfig::default(), &mut StdRng::seed_from_u64(7))
            .expect("build");
        (engine, built)
    }

    #[test]
    fn test_scale_from_x_extent() {
        let level = LevelSpec::from_json_str(LEVEL).expect("parse");
        let plan = WorldPlan::derive(&level, Viewport::default()).expect("plan");
        // Extent is [-5.5, 4.5]
        assert_eq!((plan.min_x, plan.max_x), (-5.5, 4.5));
        assert!((plan.pixels_per_unit() - 108.0).abs() < 1e-4);

        let bounds = plan.bounds();
        assert!((bounds.right - 5.0).abs() < 1e-4);
        assert!((bounds.left + 5.0).abs() < 1e-4);
        assert!((bounds.roof - 1920.0 / 108.0).abs() < 1e-3);
    }

    #[test]
    fn test_degenerate_level_is_refused() {
        let mut level = LevelSpec::from_json_str(LEVEL).expect("parse");
        level.objects.pillars.clear();
        level.objects.shelves.clear();
        level.objects.targets.clear();
        level.objects.obstacles.clear();
        level.objects.source.radius = 0.0;

        let err = WorldPlan::derive(&level, Viewport::default()).unwrap_err();
        assert!(matches!(err, GameError::DegenerateLevel { .. }));
    }

    #[test]
    fn test_build_creates_everything() {
        let level = LevelSpec::from_json_str(LEVEL).expect("parse");
        let (engine, built) = build(&level);

        // 2 statics, 2 targets, 1 obstacle, 1 source
        assert_eq!(engine.body_count(), 6);
        assert_eq!(built.items.len(), 6);
        assert_eq!(built.statics.len(), 2);
        assert_eq!(built.target_threshold, 7);
        assert_eq!(built.layout.targets.len(), 2);
        assert_eq!(built.layout.source_radius, 0.5);
        assert_eq!(built.layout.bounds, engine.world_bounds());
        assert_eq!(engine.world_bounds().ground, 0.0);

        let pillar = built.statics.iter().next().expect("pillar").1;
        assert_eq!(pillar, WorldRect { min_x: -2.25, min_y: 0.0, max_x: -1.75, max_y: 2.0 });

        // Visual precedence
        assert_eq!(built.items[0].visual, Visual::Fill(Rgba([0x5D, 0x40, 0x37, 0xFF])));
        assert_eq!(built.items[1].visual, Visual::Fill(Rgba([0xFF, 0, 0, 0xFF])));
        assert_eq!(built.items[2].visual, Visual::Sprite("ic_target".into()));
        assert_eq!(built.items[3].visual, Visual::None);
        assert_eq!(built.items[4].visual, Visual::Sprite("crate".into()));
        let source = built.items.last().expect("source");
        assert_eq!(source.kind, RenderKind::Source);
        assert!(matches!(&source.visual, Visual::Sprite(name) if name.starts_with("ball_")));

        assert_eq!(engine.velocity(built.layout.source), Some(Vec2::ZERO));
        assert_eq!(built.items[0].footprint.width, 54);
    }

    #[test]
    fn test_rejected_target_does_not_count() {
        let mut level = LevelSpec::from_json_str(LEVEL).expect("parse");
        // Far below the ground, out of bounds
        level.objects.targets[1].y = -50.0;
        let (_, built) = build(&level);

        assert_eq!(built.target_threshold, 5);
        assert_eq!(built.layout.targets.len(), 1);
    }

    #[test]
    fn test_rejected_source_fails_the_build() {
        let mut level = LevelSpec::from_json_str(LEVEL).expect("parse");
        level.objects.source.y = -50.0;
        let plan = WorldPlan::derive(&level, Viewport::default()).expect("plan");
        let mut engine = KinematicWorld::new();
        engine.create_world(level.gravity());

        let result = build_world(&mut engine, &level, &plan, &SkinConfig::default(), &mut StdRng::seed_from_u64(1));
        assert!(matches!(result, Err(GameError::SourceRejected { .. })));
    }
}
