//! Latest committed body state, published by the physics thread
//!
//! The render pass and the input path never touch the engine directly; they
//! read the snapshot written after the most recent physics job.

use super::{BodyHandle, PhysicsEngine, Vec2};
use rustc_hash::FxHashMap;

#[derive(Debug, Clone, Default)]
pub struct BodySnapshot {
    positions: FxHashMap<BodyHandle, Vec2>,
    score: u32,
    /// Number of completed steps since the world was built
    steps: u64,
}

impl BodySnapshot {
    /// Capture positions and score from the engine
    pub fn capture(engine: &dyn PhysicsEngine, steps: u64) -> Self {
        let mut positions = FxHashMap::default();
        for (handle, position) in engine.all_body_positions() {
            positions.insert(handle, position);
        }
        Self {
            positions,
            score: engine.current_score(),
            steps,
        }
    }

    pub fn position(&self, handle: BodyHandle) -> Option<Vec2> {
        self.positions.get(&handle).copied()
    }

    pub fn contains(&self, handle: BodyHandle) -> bool {
        self.positions.contains_key(&handle)
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn steps(&self) -> u64 {
        self.steps
    }

    pub fn body_count(&self) -> usize {
        self.positions.len()
    }
}
