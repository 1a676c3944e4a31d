//! Level progression across numbered level files
//!
//! Levels live in one directory as `level1.json`, `level2.json`, ... The
//! campaign advances on every win and finishes at the first missing file.

use super::state::LevelStats;
use crate::error::{io_error, GameResult};
use crate::world::level::LevelSpec;
use std::io::ErrorKind;
use std::path::PathBuf;

#[derive(Debug, Clone)]
pub struct LevelDirectory {
    root: PathBuf,
}

impl LevelDirectory {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn path_for(&self, number: u32) -> PathBuf {
        self.root.join(format!("level{}.json", number))
    }

    /// Parse level `number`; `None` when its file does not exist
    pub fn load(&self, number: u32) -> GameResult<Option<LevelSpec>> {
        let path = self.path_for(number);
        match std::fs::read_to_string(&path) {
            Ok(json) => LevelSpec::from_json_str(&json).map(Some),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(io_error(path, e)),
        }
    }
}

/// Totals over every completed level
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CampaignSummary {
    pub total_drags: u32,
    pub total_score: u32,
    pub levels: Vec<LevelStats>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum CampaignStep {
    Play { number: u32, level: LevelSpec },
    Finished(CampaignSummary),
}

#[derive(Debug, Clone)]
pub struct Campaign {
    directory: LevelDirectory,
    current: u32,
    completed: Vec<LevelStats>,
}

impl Campaign {
    pub fn new(directory: LevelDirectory) -> Self {
        Self {
            directory,
            current: 1,
            completed: Vec::new(),
        }
    }

    pub fn current_level(&self) -> u32 {
        self.current
    }

    /// Level to play now, or the summary if there is none
    pub fn start(&self) -> GameResult<CampaignStep> {
        self.step_at(self.current)
    }

    /// Record a won level and move on to the next file
    pub fn on_level_won(&mut self, stats: LevelStats) -> GameResult<CampaignStep> {
        log::info!(
            "[Campaign] Level {} '{}' done: {} drags, score {}",
            self.current,
            stats.level_name,
            stats.drags,
            stats.score
        );
        self.completed.push(stats);
        self.current += 1;
        self.step_at(self.current)
    }

    pub fn summary(&self) -> CampaignSummary {
        CampaignSummary {
            total_drags: self.completed.iter().map(|s| s.drags).sum(),
            total_score: self.completed.iter().map(|s| s.score).sum(),
            levels: self.completed.clone(),
        }
    }

    fn step_at(&self, number: u32) -> GameResult<CampaignStep> {
        match self.directory.load(number)? {
            Some(level) => Ok(CampaignStep::Play { number, level }),
            None => {
                log::info!("[Campaign] No level {}, campaign finished", number);
                Ok(CampaignStep::Finished(self.summary()))
            }
        }
    }
}
