use super::{
    BodyCategory, BodyHandle, BoundaryKind, Material, PhysicsEngine, Shape, Vec2, WorldBounds,
};
use std::collections::BTreeMap;

/// Maximum simultaneous bodies before creation is rejected
pub const DEFAULT_BODY_CAPACITY: usize = 1024;

#[derive(Debug, Clone)]
struct KinematicBody {
    /// `None` for static decor
    category: Option<BodyCategory>,
    shape: Shape,
    position: Vec2,
    velocity: Vec2,
    gravity_scale: f32,
    restitution: f32,
    score_value: u32,
}

impl KinematicBody {
    fn is_static(&self) -> bool {
        self.category.is_none()
    }
}

/// Minimal body-space simulator implementing the engine contract
///
/// Integrates gravity, keeps dynamic bodies inside the recorded boundaries and
/// scores a target when the source overlaps it. There is no contact
/// resolution between bodies; this is the engine used by tests and the level
/// checker, not a rigid-body solver.
pub struct KinematicWorld {
    bodies: BTreeMap<BodyHandle, KinematicBody>,
    next_handle: u32,
    capacity: usize,
    gravity: Vec2,
    world_alive: bool,
    score: u32,
    ground: Option<f32>,
    roof: Option<f32>,
    left: Option<f32>,
    right: Option<f32>,
}

impl KinematicWorld {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_BODY_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            bodies: BTreeMap::new(),
            // Handles are never reused, even across worlds
            next_handle: 1,
            capacity,
            gravity: Vec2::ZERO,
            world_alive: false,
            score: 0,
            ground: None,
            roof: None,
            left: None,
            right: None,
        }
    }

    pub fn body_count(&self) -> usize {
        self.bodies.len()
    }

    pub fn velocity(&self, handle: BodyHandle) -> Option<Vec2> {
        self.bodies.get(&handle).map(|b| b.velocity)
    }

    pub fn gravity_scale(&self, handle: BodyHandle) -> Option<f32> {
        self.bodies.get(&handle).map(|b| b.gravity_scale)
    }

    fn placement_in_bounds(&self, p: Vec2) -> bool {
        !(self.ground.map_or(false, |g| p.y < g)
            || self.roof.map_or(false, |r| p.y > r)
            || self.left.map_or(false, |l| p.x < l)
            || self.right.map_or(false, |r| p.x > r))
    }

    fn insert(&mut self, body: KinematicBody) -> Option<BodyHandle> {
        if !self.world_alive {
            log::warn!("[KinematicWorld] Body creation without a world");
            return None;
        }
        if self.bodies.len() >= self.capacity {
            log::warn!("[KinematicWorld] Capacity {} reached", self.capacity);
            return None;
        }
        if !self.placement_in_bounds(body.position) {
            return None;
        }
        let handle = BodyHandle(self.next_handle);
        self.next_handle += 1;
        self.bodies.insert(handle, body);
        Some(handle)
    }

    /// Keep a dynamic body inside the boundaries, bouncing off the edge it crossed
    fn clamp_to_bounds(&self, body: &mut KinematicBody) {
        let half = body.shape.half_extents();
        if let Some(ground) = self.ground {
            if body.position.y - half.y < ground {
                body.position.y = ground + half.y;
                body.velocity.y = -body.velocity.y * body.restitution;
            }
        }
        if let Some(roof) = self.roof {
            if body.position.y + half.y > roof {
                body.position.y = roof - half.y;
                body.velocity.y = -body.velocity.y * body.restitution;
            }
        }
        if let Some(left) = self.left {
            if body.position.x - half.x < left {
                body.position.x = left + half.x;
                body.velocity.x = -body.velocity.x * body.restitution;
            }
        }
        if let Some(right) = self.right {
            if body.position.x + half.x > right {
                body.position.x = right - half.x;
                body.velocity.x = -body.velocity.x * body.restitution;
            }
        }
    }

    fn overlaps(a: &KinematicBody, b: &KinematicBody) -> bool {
        match (a.shape, b.shape) {
            (Shape::Circle { radius: ra }, Shape::Circle { radius: rb }) => {
                a.position.distance_squared(b.position) <= (ra + rb) * (ra + rb)
            }
            _ => {
                let d = (a.position - b.position).abs();
                let reach = a.shape.half_extents() + b.shape.half_extents();
                d.x <= reach.x && d.y <= reach.y
            }
        }
    }
}

impl Default for KinematicWorld {
    fn default() -> Self {
        Self::new()
    }
}

impl PhysicsEngine for KinematicWorld {
    fn create_world(&mut self, gravity: Vec2) {
        self.bodies.clear();
        self.gravity = gravity;
        self.world_alive = true;
        self.score = 0;
        self.ground = None;
        self.roof = None;
        self.left = None;
        self.right = None;
    }

    fn destroy_world(&mut self) {
        self.bodies.clear();
        self.world_alive = false;
    }

    fn has_world(&self) -> bool {
        self.world_alive
    }

    fn step(&mut self, dt: f32) -> Vec<BodyHandle> {
        if !self.world_alive {
            return Vec::new();
        }

        let gravity = self.gravity;
        let mut moved: Vec<(BodyHandle, KinematicBody)> = Vec::new();
        for (handle, body) in self.bodies.iter() {
            if body.is_static() {
                continue;
            }
            let mut body = body.clone();
            body.velocity += gravity * body.gravity_scale * dt;
            body.position += body.velocity * dt;
            self.clamp_to_bounds(&mut body);
            moved.push((*handle, body));
        }
        for (handle, body) in moved {
            self.bodies.insert(handle, body);
        }

        // Source touching a target destroys the target and scores it
        let mut destroyed = Vec::new();
        for (source_handle, source) in self.bodies.iter() {
            if source.category != Some(BodyCategory::Source) {
                continue;
            }
            for (handle, body) in self.bodies.iter() {
                if *handle == *source_handle || body.category != Some(BodyCategory::Target) {
                    continue;
                }
                if Self::overlaps(source, body) && !destroyed.contains(handle) {
                    destroyed.push(*handle);
                }
            }
        }
        for handle in &destroyed {
            if let Some(body) = self.bodies.remove(handle) {
                self.score = self.score.saturating_add(body.score_value);
            }
        }
        destroyed
    }

    fn create_boundary(&mut self, kind: BoundaryKind, at: f32, _length: f32, _material: Material) {
        if !self.world_alive {
            return;
        }
        match kind {
            BoundaryKind::Ground => self.ground = Some(at),
            BoundaryKind::Roof => self.roof = Some(at),
            BoundaryKind::LeftWall => self.left = Some(at),
            BoundaryKind::RightWall => self.right = Some(at),
        }
    }

    fn create_static_body(&mut self, shape: Shape, placement: Vec2, material: Material) -> Option<BodyHandle> {
        self.insert(KinematicBody {
            category: None,
            shape,
            position: placement,
            velocity: Vec2::ZERO,
            gravity_scale: 0.0,
            restitution: material.restitution,
            score_value: 0,
        })
    }

    fn create_dynamic_body(
        &mut self,
        category: BodyCategory,
        shape: Shape,
        placement: Vec2,
        material: Material,
        score_value: u32,
    ) -> Option<BodyHandle> {
        self.insert(KinematicBody {
            category: Some(category),
            shape,
            position: placement,
            velocity: Vec2::ZERO,
            gravity_scale: 1.0,
            restitution: material.restitution,
            score_value,
        })
    }

    fn destroy_body(&mut self, handle: BodyHandle) {
        self.bodies.remove(&handle);
    }

    fn teleport_body(&mut self, handle: BodyHandle, position: Vec2) {
        if let Some(body) = self.bodies.get_mut(&handle) {
            body.position = position;
        }
    }

    fn set_velocity(&mut self, handle: BodyHandle, velocity: Vec2) {
        if let Some(body) = self.bodies.get_mut(&handle) {
            if !body.is_static() {
                body.velocity = velocity;
            }
        }
    }

    fn set_gravity_scale(&mut self, handle: BodyHandle, scale: f32) {
        if let Some(body) = self.bodies.get_mut(&handle) {
            if !body.is_static() {
                body.gravity_scale = scale;
            }
        }
    }

    fn body_position(&self, handle: BodyHandle) -> Option<Vec2> {
        self.bodies.get(&handle).map(|b| b.position)
    }

    fn all_body_positions(&self) -> Vec<(BodyHandle, Vec2)> {
        self.bodies.iter().map(|(h, b)| (*h, b.position)).collect()
    }

    fn current_score(&self) -> u32 {
        self.score
    }

    fn reset_score(&mut self) {
        self.score = 0;
    }

    fn world_bounds(&self) -> WorldBounds {
        WorldBounds {
            left: self.left.unwrap_or(0.0),
            right: self.right.unwrap_or(0.0),
            ground: self.ground.unwrap_or(0.0),
            roof: self.roof.unwrap_or(0.0),
        }
    }
}
