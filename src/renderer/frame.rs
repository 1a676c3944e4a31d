//! Frame Scheduler
//!
//! Driven once per display refresh. Each tick posts exactly one physics step
//! and composites whatever the physics thread last published; it never waits
//! for the step it just posted, so a frame can lag the simulation by one step.

use super::registry::{PixelSize, RenderItem};
use super::visual::{RenderKind, Visual};
use crate::physics::{BodyHandle, BodySnapshot, Vec2};
use crate::world::viewport::ScreenTransform;
use std::time::Instant;

/// One body to draw, in screen pixels
#[derive(Debug, Clone, PartialEq)]
pub struct DrawItem {
    pub handle: BodyHandle,
    pub kind: RenderKind,
    pub center: Vec2,
    pub footprint: PixelSize,
    pub visual: Visual,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Frame {
    pub items: Vec<DrawItem>,
    pub score: u32,
}

/// Drawing backend fed with composed frames
pub trait Compositor: Send {
    fn present(&mut self, frame: &Frame);
}

/// What the scheduler needs from the running simulation
pub trait FrameSource: Send + Sync {
    /// Queue one physics step of `dt` seconds without waiting for it
    fn post_step(&self, dt: f32) -> bool;

    /// Compose the latest published state into screen space
    fn compose(&self) -> Frame;
}

/// Place registry items at their snapshot positions
///
/// Items whose body has no published position yet are left out.
pub fn compose_frame(
    items: Vec<RenderItem>,
    snapshot: &BodySnapshot,
    transform: &ScreenTransform,
) -> Frame {
    let items = items
        .into_iter()
        .filter_map(|item| {
            let position = snapshot.position(item.handle)?;
            Some(DrawItem {
                handle: item.handle,
                kind: item.kind,
                center: transform.world_to_screen(position),
                footprint: item.footprint,
                visual: item.visual,
            })
        })
        .collect();

    Frame {
        items,
        score: snapshot.score(),
    }
}

pub struct FrameScheduler {
    source: Box<dyn FrameSource>,
    compositor: Box<dyn Compositor>,
    last_frame: Option<Instant>,
    frames: u64,
}

impl FrameScheduler {
    pub fn new(source: Box<dyn FrameSource>, compositor: Box<dyn Compositor>) -> Self {
        Self {
            source,
            compositor,
            last_frame: None,
            frames: 0,
        }
    }

    /// Handle one refresh tick at `now`
    pub fn on_frame(&mut self, now: Instant) {
        let dt = match self.last_frame {
            Some(last) => now.saturating_duration_since(last).as_secs_f32(),
            None => 0.0,
        };
        self.last_frame = Some(now);

        if !self.source.post_step(dt) {
            log::trace!("[FrameScheduler] Step not posted, physics thread stopped");
        }

        let frame = self.source.compose();
        self.compositor.present(&frame);
        self.frames += 1;
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }
}
