//! State shared between the physics thread, the render thread and input
//!
//! The physics thread is the only writer of the snapshot, static geometry
//! and layout. The render pass and pointer handlers only read.

use super::events::GameEvent;
use super::state::LevelState;
use crate::physics::{
    BodyCommand, BodyHandle, BodySnapshot, CommandSink, PhysicsEngine, PhysicsJob, PhysicsQueue,
    Vec2, WorldRect,
};
use crate::renderer::frame::{compose_frame, Frame, FrameSource};
use crate::renderer::registry::RenderRegistry;
use crate::renderer::visual::RenderKind;
use crate::world::bootstrap::{BuiltWorld, WorldLayout};
use crate::world::reachability::{all_targets_reachable, find_removable_blocker, StaticGeometry};
use crossbeam_channel::Sender;
use parking_lot::{Mutex, RwLock};
use std::sync::Arc;

pub struct SharedWorld {
    pub registry: RenderRegistry,
    pub statics: RwLock<StaticGeometry>,
    pub snapshot: RwLock<BodySnapshot>,
    pub layout: RwLock<Option<WorldLayout>>,
    pub level: Mutex<LevelState>,
    events: Sender<GameEvent>,
}

impl SharedWorld {
    pub fn new(events: Sender<GameEvent>) -> Self {
        Self {
            registry: RenderRegistry::new(),
            statics: RwLock::new(StaticGeometry::new()),
            snapshot: RwLock::new(BodySnapshot::default()),
            layout: RwLock::new(None),
            level: Mutex::new(LevelState::default()),
            events,
        }
    }

    pub fn emit(&self, event: GameEvent) {
        if self.events.send(event).is_err() {
            log::debug!("[SharedWorld] No event listener left");
        }
    }

    /// Forget every body of the previous world
    pub fn clear(&self) {
        self.registry.clear();
        self.statics.write().clear();
        *self.layout.write() = None;
        *self.snapshot.write() = BodySnapshot::default();
    }

    /// Take over a freshly built world and start a new level state
    pub fn install(&self, built: BuiltWorld, level_name: &str) {
        self.registry.extend(built.items);
        *self.statics.write() = built.statics;
        *self.layout.write() = Some(built.layout);
        *self.level.lock() = LevelState::new(level_name, built.target_threshold);
    }

    pub fn publish(&self, engine: &dyn PhysicsEngine, steps: u64) {
        *self.snapshot.write() = BodySnapshot::capture(engine, steps);
    }

    /// Bookkeeping after one engine step: drop destroyed bodies, publish and check for a win
    pub fn complete_step(&self, engine: &dyn PhysicsEngine, destroyed: &[BodyHandle]) {
        if !destroyed.is_empty() {
            let removed = self.registry.remove_all_matching_any(destroyed);
            if let Some(layout) = self.layout.write().as_mut() {
                layout.targets.retain(|h| !destroyed.contains(h));
            }
            log::debug!("[SharedWorld] {} bodies destroyed this step", removed);
        }

        let steps = self.snapshot.read().steps() + 1;
        self.publish(engine, steps);

        let won = self.level.lock().record_score(engine.current_score());
        if let Some(stats) = won {
            log::info!(
                "[SharedWorld] Level '{}' won with score {} after {} drags",
                stats.level_name,
                stats.score,
                stats.drags
            );
            self.emit(GameEvent::LevelWon(stats));
        }
    }

    /// Remove one static body if some target has no line of sight from the source
    ///
    /// Runs once per load on the physics thread. Returns the removed handle.
    pub fn clear_blocker(&self, engine: &mut dyn PhysicsEngine) -> Option<BodyHandle> {
        let (source, targets) = {
            let layout = self.layout.read();
            let layout = layout.as_ref()?;
            let source = engine.body_position(layout.source)?;
            let targets: Vec<Vec2> = layout
                .targets
                .iter()
                .filter_map(|h| engine.body_position(*h))
                .collect();
            (source, targets)
        };

        let blocker = {
            let statics = self.statics.read();
            let rects: Vec<WorldRect> = statics.rects().collect();
            if all_targets_reachable(source, &targets, &rects) {
                return None;
            }
            find_removable_blocker(source, &targets, &statics)?
        };

        engine.destroy_body(blocker);
        self.statics.write().remove(blocker);
        self.registry.remove_by_handle(blocker);
        let steps = self.snapshot.read().steps();
        self.publish(engine, steps);
        log::info!("[SharedWorld] Removed blocking static {}", blocker);
        Some(blocker)
    }

    /// Current frame in screen space, empty until a level is installed
    pub fn compose_frame(&self) -> Frame {
        let Some(transform) = self.layout.read().as_ref().map(|l| l.transform) else {
            return Frame::default();
        };
        let items = self.registry.snapshot();
        let snapshot = self.snapshot.read();
        compose_frame(items, &snapshot, &transform)
    }

    /// Static rectangles plus the current rectangle of every obstacle
    pub fn drag_blockers(&self) -> Vec<WorldRect> {
        let mut blockers: Vec<WorldRect> = self.statics.read().rects().collect();
        let snapshot = self.snapshot.read();
        for item in self.registry.items_of_kind(RenderKind::Obstacle) {
            if let Some(center) = snapshot.position(item.handle) {
                blockers.push(WorldRect::from_center_half_extents(center, item.half_extents));
            }
        }
        blockers
    }
}

/// Build the job that advances the engine by `dt` and runs the step bookkeeping
pub fn step_job(shared: Arc<SharedWorld>, dt: f32) -> PhysicsJob {
    Box::new(move |engine: &mut dyn PhysicsEngine| {
        if !engine.has_world() {
            return;
        }
        let destroyed = engine.step(dt);
        shared.complete_step(engine, &destroyed);
    })
}

/// Queue one physics step without waiting for it
pub fn post_step(queue: &PhysicsQueue, shared: &Arc<SharedWorld>, dt: f32) -> bool {
    queue.post("step", step_job(Arc::clone(shared), dt))
}

/// Posts drag commands to the physics thread and republishes the snapshot after them
pub struct PublishingSink<'a> {
    pub queue: &'a PhysicsQueue,
    pub shared: &'a Arc<SharedWorld>,
}

impl CommandSink for PublishingSink<'_> {
    fn submit(&self, commands: Vec<BodyCommand>) {
        if commands.is_empty() {
            return;
        }
        let shared = Arc::clone(self.shared);
        self.queue.post(
            "body-commands",
            Box::new(move |engine: &mut dyn PhysicsEngine| {
                if !engine.has_world() {
                    return;
                }
                for command in commands {
                    command.apply(engine);
                }
                let steps = shared.snapshot.read().steps();
                shared.publish(engine, steps);
            }),
        );
    }
}

/// Frame source backed by a session's physics queue and shared world
pub struct SessionFrames {
    pub queue: PhysicsQueue,
    pub shared: Arc<SharedWorld>,
}

impl FrameSource for SessionFrames {
    fn post_step(&self, dt: f32) -> bool {
        post_step(&self.queue, &self.shared, dt)
    }

    fn compose(&self) -> Frame {
        self.shared.compose_frame()
    }
}
