//! Axis-Aligned World Rectangles
//!
//! Static bodies are recorded as world rectangles at creation time; every
//! line-of-sight and drag-sweep query runs against these.
//! Pure functions over rectangle data - no state.

use glam::Vec2;

/// Axis-aligned rectangle in world units - pure data structure
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WorldRect {
    pub min_x: f32,
    pub min_y: f32,
    pub max_x: f32,
    pub max_y: f32,
}

impl WorldRect {
    pub fn new(min_x: f32, min_y: f32, max_x: f32, max_y: f32) -> Self {
        Self { min_x, min_y, max_x, max_y }
    }

    /// Build from a center point and half extents
    pub fn from_center_half_extents(center: Vec2, half_extents: Vec2) -> Self {
        Self {
            min_x: center.x - half_extents.x,
            min_y: center.y - half_extents.y,
            max_x: center.x + half_extents.x,
            max_y: center.y + half_extents.y,
        }
    }

    pub fn center(&self) -> Vec2 {
        Vec2::new((self.min_x + self.max_x) * 0.5, (self.min_y + self.max_y) * 0.5)
    }

    pub fn half_extents(&self) -> Vec2 {
        Vec2::new((self.max_x - self.min_x) * 0.5, (self.max_y - self.min_y) * 0.5)
    }
}

/// Test if a rectangle contains a point (closed bounds)
/// Pure function - tests point containment
pub fn rect_contains_point(rect: &WorldRect, point: Vec2) -> bool {
    point.x >= rect.min_x && point.x <= rect.max_x &&
    point.y >= rect.min_y && point.y <= rect.max_y
}

/// Test if a circle contains a point (closed disc)
/// Pure function - squared-distance comparison, no sqrt
pub fn circle_contains_point(center: Vec2, radius: f32, point: Vec2) -> bool {
    center.distance_squared(point) <= radius * radius
}

/// Test if the closed segment p1→p2 touches the closed rectangle
/// Pure function - Liang-Barsky clipping of t ∈ [0, 1] against the four half-planes
///
/// An endpoint inside the rectangle counts as an intersection. A zero
/// directional component never divides: it only checks which side of the
/// edge the segment lies on.
pub fn segment_intersects_rect(p1: Vec2, p2: Vec2, rect: &WorldRect) -> bool {
    // Both endpoints beyond the same edge
    if p1.x < rect.min_x && p2.x < rect.min_x { return false; }
    if p1.x > rect.max_x && p2.x > rect.max_x { return false; }
    if p1.y < rect.min_y && p2.y < rect.min_y { return false; }
    if p1.y > rect.max_y && p2.y > rect.max_y { return false; }

    let dx = p2.x - p1.x;
    let dy = p2.y - p1.y;
    let mut t0 = 0.0_f32;
    let mut t1 = 1.0_f32;

    let mut clip = |p: f32, q: f32| -> bool {
        if p == 0.0 {
            return q >= 0.0;
        }
        let r = q / p;
        if p < 0.0 {
            if r > t1 {
                return false;
            }
            if r > t0 {
                t0 = r;
            }
        } else {
            if r < t0 {
                return false;
            }
            if r < t1 {
                t1 = r;
            }
        }
        true
    };

    clip(-dx, p1.x - rect.min_x)
        && clip(dx, rect.max_x - p1.x)
        && clip(-dy, p1.y - rect.min_y)
        && clip(dy, rect.max_y - p1.y)
}
