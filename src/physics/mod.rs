pub mod aabb;
pub mod snapshot;
pub mod world;
pub mod worker;

pub use aabb::{WorldRect, circle_contains_point, rect_contains_point, segment_intersects_rect};
pub use snapshot::BodySnapshot;
pub use world::KinematicWorld;
pub use worker::{BodyCommand, CommandSink, PhysicsJob, PhysicsQueue, PhysicsWorker};

pub use glam::Vec2;

use std::fmt;

/// Opaque body identifier issued by the engine
///
/// The only key linking an engine body to its render item and world rectangle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct BodyHandle(pub u32);

impl fmt::Display for BodyHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// What a dynamic body means to the game
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BodyCategory {
    Source,
    Target,
    Obstacle,
}

/// Collision shape in body-local coordinates
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Shape {
    Circle { radius: f32 },
    Box { half_extents: Vec2 },
}

impl Shape {
    /// Half extents of the shape's bounding box
    pub fn half_extents(&self) -> Vec2 {
        match *self {
            Shape::Circle { radius } => Vec2::splat(radius),
            Shape::Box { half_extents } => half_extents,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Material {
    pub density: f32,
    pub friction: f32,
    pub restitution: f32,
}

/// Density scaled by the shape's bounding area
pub fn density_for(half_extents: Vec2, base_density: f32) -> f32 {
    base_density * (half_extents.x * 2.0) * (half_extents.y * 2.0)
}

/// Immovable playfield edges
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BoundaryKind {
    Ground,
    Roof,
    LeftWall,
    RightWall,
}

/// Playfield edges in world units as recorded by the engine
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct WorldBounds {
    pub left: f32,
    pub right: f32,
    pub ground: f32,
    pub roof: f32,
}

/// Engine contract consumed by the coordination layer
///
/// Implementations are owned by the physics thread; nothing else calls the
/// mutating methods. Creation returns `None` where the engine rejects a body
/// (capacity, out-of-bounds placement, bad shape).
pub trait PhysicsEngine: Send {
    fn create_world(&mut self, gravity: Vec2);
    fn destroy_world(&mut self);
    fn has_world(&self) -> bool;

    /// Advance by `dt` seconds and return the handles destroyed during this step
    fn step(&mut self, dt: f32) -> Vec<BodyHandle>;

    /// `at` is the y of a ground/roof or the x of a wall; `length` spans the other axis
    fn create_boundary(&mut self, kind: BoundaryKind, at: f32, length: f32, material: Material);

    fn create_static_body(&mut self, shape: Shape, placement: Vec2, material: Material) -> Option<BodyHandle>;

    fn create_dynamic_body(
        &mut self,
        category: BodyCategory,
        shape: Shape,
        placement: Vec2,
        material: Material,
        score_value: u32,
    ) -> Option<BodyHandle>;

    fn destroy_body(&mut self, handle: BodyHandle);
    fn teleport_body(&mut self, handle: BodyHandle, position: Vec2);
    fn set_velocity(&mut self, handle: BodyHandle, velocity: Vec2);
    fn set_gravity_scale(&mut self, handle: BodyHandle, scale: f32);

    fn body_position(&self, handle: BodyHandle) -> Option<Vec2>;
    fn all_body_positions(&self) -> Vec<(BodyHandle, Vec2)>;

    fn current_score(&self) -> u32;
    fn reset_score(&mut self);
    fn world_bounds(&self) -> WorldBounds;
}
