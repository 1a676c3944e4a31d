pub mod config;
pub mod constants;
pub mod error;
pub mod game;
pub mod input;
pub mod physics;
pub mod renderer;
pub mod world;

pub use config::GameConfig;
pub use error::{GameError, GameResult};
pub use game::{Campaign, CampaignStep, CampaignSummary, GameEvent, GameSession, LevelDirectory, LevelState, LevelStats};
pub use input::{DragController, DragOutcome, PointerEvent, PointerPhase};
pub use physics::{BodyHandle, KinematicWorld, PhysicsEngine, PhysicsWorker, Vec2, WorldRect};
pub use renderer::{Compositor, Frame, RenderRegistry};
pub use world::{LevelSpec, StaticGeometry, Viewport, WorldPlan};

/// Initialise logging from `RUST_LOG`, defaulting to `info`
///
/// Safe to call more than once; later calls are ignored.
pub fn init_logging() {
    let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .try_init();
}
