//! Per-level score bookkeeping

/// Summary of a finished level, published with the win event
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LevelStats {
    pub level_name: String,
    pub drags: u32,
    pub score: u32,
}

/// State of the level being played; replaced on every load
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LevelState {
    pub level_name: String,
    pub score: u32,
    /// Sum of every created target's score value
    pub target_threshold: u32,
    pub won: bool,
    pub drag_count: u32,
}

impl LevelState {
    pub fn new(level_name: impl Into<String>, target_threshold: u32) -> Self {
        Self {
            level_name: level_name.into(),
            target_threshold,
            ..Self::default()
        }
    }

    pub fn record_drag(&mut self) {
        self.drag_count += 1;
    }

    /// Take the engine's score after a step
    ///
    /// Returns the level stats the first time the threshold is reached. A level
    /// without targets (threshold 0) can never be won.
    pub fn record_score(&mut self, score: u32) -> Option<LevelStats> {
        self.score = score;
        if self.won || self.target_threshold == 0 || score < self.target_threshold {
            return None;
        }
        self.won = true;
        Some(self.stats())
    }

    pub fn stats(&self) -> LevelStats {
        LevelStats {
            level_name: self.level_name.clone(),
            drags: self.drag_count,
            score: self.score,
        }
    }
}
