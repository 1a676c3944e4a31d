//! Level Session Controller
//!
//! `GameSession` owns the physics worker, the state shared with the render
//! thread and the drag machine. Nothing is global; two sessions can run side
//! by side.

pub mod campaign;
pub mod events;
pub mod shared;
pub mod state;

pub use campaign::{Campaign, CampaignStep, CampaignSummary, LevelDirectory};
pub use events::GameEvent;
pub use shared::{PublishingSink, SessionFrames, SharedWorld};
pub use state::{LevelState, LevelStats};

use crate::config::GameConfig;
use crate::error::{GameError, GameResult};
use crate::input::{DragContext, DragController, DragOutcome, PointerEvent, PointerPhase};
use crate::physics::{BodySnapshot, PhysicsEngine, PhysicsQueue, PhysicsWorker, Vec2};
use crate::renderer::{Compositor, DisplayLink, FrameScheduler};
use crate::world::bootstrap::{build_world, WorldLayout, WorldPlan};
use crate::world::level::LevelSpec;
use crate::world::reachability::StaticGeometry;
use crossbeam_channel::{unbounded, Receiver};
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Instant;

pub struct GameSession {
    config: GameConfig,
    shared: Arc<SharedWorld>,
    queue: PhysicsQueue,
    worker: Option<PhysicsWorker>,
    drag: Mutex<DragController>,
    events: Receiver<GameEvent>,
    display: Option<DisplayLink>,
}

impl GameSession {
    /// Move `engine` onto a new physics thread and start an empty session
    pub fn new(engine: Box<dyn PhysicsEngine>, config: GameConfig) -> GameResult<Self> {
        let worker = PhysicsWorker::spawn(engine)?;
        let (event_tx, events) = unbounded();
        let drag = DragController::new(
            config.interaction.drag_timeout(),
            config.interaction.cooldown(),
        );

        Ok(Self {
            config,
            shared: Arc::new(SharedWorld::new(event_tx)),
            queue: worker.queue(),
            worker: Some(worker),
            drag: Mutex::new(drag),
            events,
            display: None,
        })
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    /// Replace the current level with `level`
    ///
    /// Scale derivation happens here, so a degenerate level fails before any
    /// pending work is cancelled. The rebuild itself runs on the physics thread
    /// and reports back with `LevelLoaded` or `LevelLoadFailed`.
    pub fn load_level(&self, level: LevelSpec) -> GameResult<()> {
        let plan = WorldPlan::derive(&level, self.config.viewport)?;
        if self.queue.is_stopped() {
            return Err(GameError::WorkerStopped);
        }

        let epoch = self.queue.advance_epoch();
        self.drag.lock().reset();
        log::info!("[GameSession] Loading '{}' (epoch {})", level.level_name, epoch);

        let shared = Arc::clone(&self.shared);
        let skins = self.config.skins;
        let posted = self.queue.post(
            "load-level",
            Box::new(move |engine: &mut dyn PhysicsEngine| {
                engine.destroy_world();
                shared.clear();
                engine.create_world(level.gravity());
                engine.reset_score();

                match build_world(engine, &level, &plan, &skins, &mut rand::thread_rng()) {
                    Ok(built) => {
                        shared.install(built, &level.level_name);
                        shared.publish(engine, 0);
                        let removed_blocker = shared.clear_blocker(engine);
                        shared.emit(GameEvent::LevelLoaded {
                            level: level.level_name.clone(),
                            removed_blocker,
                        });
                    }
                    Err(e) => {
                        log::error!("[GameSession] Failed to build '{}': {}", level.level_name, e);
                        engine.destroy_world();
                        shared.clear();
                        *shared.level.lock() = LevelState::new(&level.level_name, 0);
                        shared.emit(GameEvent::LevelLoadFailed {
                            level: level.level_name.clone(),
                            reason: e.to_string(),
                        });
                    }
                }
            }),
        );

        if posted {
            Ok(())
        } else {
            Err(GameError::WorkerStopped)
        }
    }

    /// Queue one physics step of `dt` seconds without waiting for it
    pub fn step(&self, dt: f32) -> bool {
        shared::post_step(&self.queue, &self.shared, dt)
    }

    /// Block until every job posted so far has run
    pub fn flush(&self) -> GameResult<()> {
        self.worker.as_ref().ok_or(GameError::WorkerStopped)?.flush()
    }

    pub fn handle_pointer(&self, event: PointerEvent) -> Option<DragOutcome> {
        match event.phase {
            PointerPhase::Down => {
                self.pointer_down(event.position, event.at);
                None
            }
            PointerPhase::Move => self.pointer_move(event.position, event.at),
            PointerPhase::Up => self.pointer_up(event.at),
        }
    }

    /// Pick-up at a screen position. Returns true when a drag started.
    pub fn pointer_down(&self, screen: Vec2, now: Instant) -> bool {
        let Some(layout) = self.layout() else {
            return false;
        };
        let Some(source_position) = self.shared.snapshot.read().position(layout.source) else {
            return false;
        };

        let blockers = self.shared.drag_blockers();
        let ctx = DragContext {
            source: layout.source,
            source_radius: layout.source_radius,
            source_position,
            bounds: layout.bounds,
            blockers: &blockers,
        };
        let point = layout.transform.screen_to_world(screen);

        let accepted = self.drag.lock().pointer_down(point, &ctx, now, &self.sink());
        if accepted {
            self.shared.level.lock().record_drag();
        }
        accepted
    }

    pub fn pointer_move(&self, screen: Vec2, now: Instant) -> Option<DragOutcome> {
        let layout = self.layout()?;
        let mut drag = self.drag.lock();
        if !drag.is_dragging() {
            return None;
        }

        let source_position = self
            .shared
            .snapshot
            .read()
            .position(layout.source)
            .unwrap_or_default();
        let blockers = self.shared.drag_blockers();
        let ctx = DragContext {
            source: layout.source,
            source_radius: layout.source_radius,
            source_position,
            bounds: layout.bounds,
            blockers: &blockers,
        };
        let point = layout.transform.screen_to_world(screen);
        drag.pointer_move(point, &ctx, now, &self.sink())
    }

    pub fn pointer_up(&self, now: Instant) -> Option<DragOutcome> {
        self.drag.lock().pointer_up(now, &self.sink())
    }

    fn sink(&self) -> PublishingSink<'_> {
        PublishingSink {
            queue: &self.queue,
            shared: &self.shared,
        }
    }

    /// Frame scheduler bound to this session, for callers that own their own display loop
    pub fn frame_scheduler(&self, compositor: Box<dyn Compositor>) -> FrameScheduler {
        let source = SessionFrames {
            queue: self.queue.clone(),
            shared: Arc::clone(&self.shared),
        };
        FrameScheduler::new(Box::new(source), compositor)
    }

    /// Start the render thread at the configured refresh rate
    pub fn start_display(&mut self, compositor: Box<dyn Compositor>) -> GameResult<()> {
        self.stop_display();
        let scheduler = self.frame_scheduler(compositor);
        self.display = Some(DisplayLink::start(scheduler, self.config.display.frame_interval())?);
        Ok(())
    }

    pub fn stop_display(&mut self) {
        if let Some(display) = self.display.take() {
            display.stop();
        }
    }

    pub fn events(&self) -> &Receiver<GameEvent> {
        &self.events
    }

    pub fn shared(&self) -> &Arc<SharedWorld> {
        &self.shared
    }

    pub fn snapshot(&self) -> BodySnapshot {
        self.shared.snapshot.read().clone()
    }

    pub fn level_state(&self) -> LevelState {
        self.shared.level.lock().clone()
    }

    pub fn layout(&self) -> Option<WorldLayout> {
        self.shared.layout.read().clone()
    }

    pub fn statics(&self) -> StaticGeometry {
        self.shared.statics.read().clone()
    }

    /// Stop rendering, drain and join the physics thread, then release the world
    pub fn shutdown(mut self) -> GameResult<()> {
        self.teardown()
    }

    fn teardown(&mut self) -> GameResult<()> {
        self.stop_display();
        let Some(worker) = self.worker.take() else {
            return Ok(());
        };
        let mut engine = worker.shutdown()?;
        engine.destroy_world();
        self.shared.clear();
        log::info!("[GameSession] Shut down");
        Ok(())
    }
}

impl Drop for GameSession {
    fn drop(&mut self) {
        if let Err(e) = self.teardown() {
            log::error!("[GameSession] Teardown failed: {}", e);
        }
    }
}
