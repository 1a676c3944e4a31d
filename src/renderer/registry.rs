//! Render Registry
//!
//! Maps body handles to render items. Written by the physics-step completion
//! and the level loader, read by the render pass. One mutex covers every
//! mutation and every snapshot, so a reader never sees a partial list.

use super::visual::{RenderKind, Visual};
use crate::physics::{BodyHandle, Vec2};
use parking_lot::Mutex;

/// On-screen size in pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PixelSize {
    pub width: i32,
    pub height: i32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RenderItem {
    pub handle: BodyHandle,
    pub kind: RenderKind,
    pub footprint: PixelSize,
    /// Authoritative world half extents, used for obstacle sweep rectangles
    pub half_extents: Vec2,
    pub visual: Visual,
}

#[derive(Default)]
pub struct RenderRegistry {
    items: Mutex<Vec<RenderItem>>,
}

impl RenderRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert, or replace the entry for the same handle in place
    pub fn upsert(&self, item: RenderItem) {
        let mut items = self.items.lock();
        match items.iter_mut().find(|existing| existing.handle == item.handle) {
            Some(existing) => *existing = item,
            None => items.push(item),
        }
    }

    pub fn extend(&self, new_items: impl IntoIterator<Item = RenderItem>) {
        let mut items = self.items.lock();
        for item in new_items {
            match items.iter_mut().find(|existing| existing.handle == item.handle) {
                Some(existing) => *existing = item,
                None => items.push(item),
            }
        }
    }

    pub fn remove_by_handle(&self, handle: BodyHandle) -> Option<RenderItem> {
        let mut items = self.items.lock();
        let index = items.iter().position(|item| item.handle == handle)?;
        Some(items.remove(index))
    }

    /// Drop every item whose handle is in `handles`; returns how many went
    pub fn remove_all_matching_any(&self, handles: &[BodyHandle]) -> usize {
        if handles.is_empty() {
            return 0;
        }
        let mut items = self.items.lock();
        let before = items.len();
        items.retain(|item| !handles.contains(&item.handle));
        before - items.len()
    }

    /// Copy of the current list, in draw order
    pub fn snapshot(&self) -> Vec<RenderItem> {
        self.items.lock().clone()
    }

    pub fn items_of_kind(&self, kind: RenderKind) -> Vec<RenderItem> {
        self.items
            .lock()
            .iter()
            .filter(|item| item.kind == kind)
            .cloned()
            .collect()
    }

    pub fn get(&self, handle: BodyHandle) -> Option<RenderItem> {
        self.items.lock().iter().find(|item| item.handle == handle).cloned()
    }

    pub fn clear(&self) {
        self.items.lock().clear();
    }

    pub fn len(&self) -> usize {
        self.items.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.lock().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    fn item(id: u32, kind: RenderKind) -> RenderItem {
        RenderItem {
            handle: BodyHandle(id),
            kind,
            footprint: PixelSize { width: 10, height: 10 },
            half_extents: Vec2::splat(0.5),
            visual: Visual::None,
        }
    }

    #[test]
    fn test_upsert_replaces_in_place() {
        let registry = RenderRegistry::new();
        registry.upsert(item(1, RenderKind::Target));
        registry.upsert(item(2, RenderKind::Source));
        let mut replacement = item(1, RenderKind::Target);
        replacement.visual = Visual::Sprite("ic_target".into());
        registry.upsert(replacement.clone());

        let snapshot = registry.snapshot();
        assert_eq!(snapshot.len(), 2);
        assert_eq!(snapshot[0], replacement);
    }

    #[test]
    fn test_remove_batch() {
        let registry = RenderRegistry::new();
        registry.extend((1..=5).map(|i| item(i, RenderKind::Target)));

        assert_eq!(registry.remove_all_matching_any(&[BodyHandle(2), BodyHandle(4), BodyHandle(9)]), 2);
        let handles: Vec<_> = registry.snapshot().iter().map(|i| i.handle.0).collect();
        assert_eq!(handles, vec![1, 3, 5]);
        assert!(registry.remove_by_handle(BodyHandle(3)).is_some());
        assert!(registry.remove_by_handle(BodyHandle(3)).is_none());
    }

    #[test]
    fn test_concurrent_writer_and_reader() {
        let registry = Arc::new(RenderRegistry::new());
        registry.extend((0..1000).map(|i| item(i, RenderKind::Target)));

        let writer = {
            let registry = Arc::clone(&registry);
            std::thread::spawn(move || {
                for chunk in (0..1000u32).collect::<Vec<_>>().chunks(10) {
                    let handles: Vec<_> = chunk.iter().map(|i| BodyHandle(*i)).collect();
                    registry.remove_all_matching_any(&handles);
                }
            })
        };

        // Removal happens in batches of ten, so every snapshot holds a multiple of ten
        for _ in 0..200 {
            let snapshot = registry.snapshot();
            assert_eq!(snapshot.len() % 10, 0);
        }
        writer.join().expect("writer");
        assert!(registry.is_empty());
    }
}
