use super::state::LevelStats;
use crate::physics::BodyHandle;

/// Notifications sent from the physics thread to whoever drives the session
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GameEvent {
    /// A level finished building. `removed_blocker` is the static body taken
    /// out so every target has a line of sight.
    LevelLoaded {
        level: String,
        removed_blocker: Option<BodyHandle>,
    },
    LevelLoadFailed {
        level: String,
        reason: String,
    },
    /// Fired exactly once per level, when the score first reaches the threshold
    LevelWon(LevelStats),
}
