//! Line-of-sight checks from the source to the targets
//!
//! A target is reachable when the straight segment between the source and the
//! target center crosses no static rectangle. Only static geometry blocks;
//! dynamic obstacles can be knocked out of the way.

use crate::physics::{segment_intersects_rect, BodyHandle, Vec2, WorldRect};

/// World rectangles of every live static body, in creation order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StaticGeometry {
    rects: Vec<(BodyHandle, WorldRect)>,
}

impl StaticGeometry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, handle: BodyHandle, rect: WorldRect) {
        self.rects.push((handle, rect));
    }

    pub fn remove(&mut self, handle: BodyHandle) -> Option<WorldRect> {
        let index = self.rects.iter().position(|(h, _)| *h == handle)?;
        Some(self.rects.remove(index).1)
    }

    pub fn get(&self, handle: BodyHandle) -> Option<WorldRect> {
        self.rects.iter().find(|(h, _)| *h == handle).map(|(_, r)| *r)
    }

    pub fn iter(&self) -> impl Iterator<Item = &(BodyHandle, WorldRect)> {
        self.rects.iter()
    }

    pub fn rects(&self) -> impl Iterator<Item = WorldRect> + '_ {
        self.rects.iter().map(|(_, r)| *r)
    }

    pub fn first(&self) -> Option<BodyHandle> {
        self.rects.first().map(|(h, _)| *h)
    }

    pub fn clear(&mut self) {
        self.rects.clear();
    }

    pub fn len(&self) -> usize {
        self.rects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rects.is_empty()
    }
}

pub fn is_target_reachable<'a>(
    source: Vec2,
    target: Vec2,
    statics: impl IntoIterator<Item = &'a WorldRect>,
) -> bool {
    statics
        .into_iter()
        .all(|rect| !segment_intersects_rect(source, target, rect))
}

/// True when no static rectangle blocks any target. Vacuously true without targets.
pub fn all_targets_reachable(source: Vec2, targets: &[Vec2], statics: &[WorldRect]) -> bool {
    targets
        .iter()
        .all(|target| is_target_reachable(source, *target, statics))
}

/// Pick one static body whose removal would open every line of sight
///
/// Statics are tried in creation order and the first one that works is
/// returned. When no single removal suffices the first static is returned
/// anyway; `None` only when there are no statics at all.
pub fn find_removable_blocker(
    source: Vec2,
    targets: &[Vec2],
    statics: &StaticGeometry,
) -> Option<BodyHandle> {
    let all: Vec<WorldRect> = statics.rects().collect();

    for (index, (handle, _)) in statics.iter().enumerate() {
        let remaining: Vec<WorldRect> = all
            .iter()
            .enumerate()
            .filter(|(i, _)| *i != index)
            .map(|(_, r)| *r)
            .collect();
        if all_targets_reachable(source, targets, &remaining) {
            return Some(*handle);
        }
    }

    let fallback = statics.first();
    if let Some(handle) = fallback {
        log::warn!(
            "[Reachability] No single static clears every target, falling back to {}",
            handle
        );
    }
    fallback
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rect(min_x: f32, min_y: f32, max_x: f32, max_y: f32) -> WorldRect {
        WorldRect { min_x, min_y, max_x, max_y }
    }

    #[test]
    fn test_vacuous_for_no_targets() {
        let statics = [rect(-100.0, -100.0, 100.0, 100.0)];
        assert!(all_targets_reachable(Vec2::ZERO, &[], &statics));
    }

    #[test]
    fn test_open_line_of_sight() {
        let statics = [rect(-1.0, 3.0, 1.0, 4.0)];
        assert!(is_target_reachable(Vec2::new(-5.0, 1.0), Vec2::new(5.0, 1.0), &statics));
        assert!(!is_target_reachable(Vec2::new(-5.0, 3.5), Vec2::new(5.0, 3.5), &statics));
    }

    #[test]
    fn test_enclosed_target_blocker_is_found() {
        // Target at (4, 1) boxed in by a roof, a wall between it and the source,
        // and a floor; only the wall is in the way
        let mut statics = StaticGeometry::new();
        statics.insert(BodyHandle(10), rect(2.5, 2.5, 5.5, 3.0));
        statics.insert(BodyHandle(11), rect(2.5, 0.0, 3.0, 2.5));
        statics.insert(BodyHandle(12), rect(5.0, 0.0, 5.5, 2.5));

        let source = Vec2::new(-5.0, 1.0);
        let targets = [Vec2::new(4.0, 1.0)];
        let all: Vec<_> = statics.rects().collect();
        assert!(!all_targets_reachable(source, &targets, &all));

        let blocker = find_removable_blocker(source, &targets, &statics);
        assert_eq!(blocker, Some(BodyHandle(11)));

        statics.remove(BodyHandle(11));
        let remaining: Vec<_> = statics.rects().collect();
        assert!(all_targets_reachable(source, &targets, &remaining));
    }

    #[test]
    fn test_falls_back_to_first_static() {
        // Two walls in series; removing either alone leaves the other
        let mut statics = StaticGeometry::new();
        statics.insert(BodyHandle(3), rect(-1.0, 0.0, -0.5, 5.0));
        statics.insert(BodyHandle(4), rect(0.5, 0.0, 1.0, 5.0));

        let blocker = find_removable_blocker(Vec2::new(-5.0, 1.0), &[Vec2::new(5.0, 1.0)], &statics);
        assert_eq!(blocker, Some(BodyHandle(3)));

        assert_eq!(find_removable_blocker(Vec2::ZERO, &[Vec2::ONE], &StaticGeometry::new()), None);
    }
}
