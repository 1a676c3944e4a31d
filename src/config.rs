//! Runtime configuration
//!
//! Every field has a default taken from `constants`, so an empty TOML document
//! is a valid config and any section or key may be left out.

use crate::constants::{interaction, layout, skins};
use crate::error::{io_error, GameResult};
use crate::renderer::visual::Rgba;
use crate::world::level::StaticKind;
use crate::world::viewport::Viewport;
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    pub viewport: Viewport,
    pub display: DisplayConfig,
    pub interaction: InteractionConfig,
    pub skins: SkinConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    pub refresh_hz: u32,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self { refresh_hz: layout::REFRESH_HZ }
    }
}

impl DisplayConfig {
    /// Interval between display ticks; a zero rate is treated as 1 Hz
    pub fn frame_interval(&self) -> Duration {
        Duration::from_secs_f64(1.0 / f64::from(self.refresh_hz.max(1)))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct InteractionConfig {
    pub drag_timeout_ms: u64,
    pub cooldown_ms: u64,
}

impl Default for InteractionConfig {
    fn default() -> Self {
        Self {
            drag_timeout_ms: interaction::DRAG_TIMEOUT_MS,
            cooldown_ms: interaction::COOLDOWN_MS,
        }
    }
}

impl InteractionConfig {
    pub fn drag_timeout(&self) -> Duration {
        Duration::from_millis(self.drag_timeout_ms)
    }

    pub fn cooldown(&self) -> Duration {
        Duration::from_millis(self.cooldown_ms)
    }
}

/// Per-kind default fills for static decor without an explicit color or sprite
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct SkinConfig {
    pub pillar: Option<Rgba>,
    pub shelf: Option<Rgba>,
    pub block: Option<Rgba>,
}

impl Default for SkinConfig {
    fn default() -> Self {
        Self {
            pillar: Some(Rgba(skins::PILLAR_FILL)),
            shelf: Some(Rgba(skins::SHELF_FILL)),
            block: Some(Rgba(skins::BLOCK_FILL)),
        }
    }
}

impl SkinConfig {
    pub fn fill_for(&self, kind: StaticKind) -> Option<Rgba> {
        match kind {
            StaticKind::Pillar => self.pillar,
            StaticKind::Shelf => self.shelf,
            StaticKind::Block => self.block,
        }
    }
}

impl GameConfig {
    pub fn from_toml_str(raw: &str) -> GameResult<Self> {
        Ok(toml::from_str(raw)?)
    }

    pub fn load(path: impl AsRef<Path>) -> GameResult<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|e| io_error(path, e))?;
        let config = Self::from_toml_str(&raw)?;
        log::info!("[GameConfig] Loaded {}", path.display());
        Ok(config)
    }
}
