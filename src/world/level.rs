//! Level description schema
//!
//! Mirrors the JSON the game's levels are authored in (camelCase keys).
//! Only the logical content is modelled; nothing here decides how level
//! files are stored.

use crate::error::{io_error, GameResult};
use crate::physics::Vec2;
use crate::renderer::visual::Rgba;
use serde::Deserialize;
use std::path::Path;

/// Flavour of static decor, each with its own default fill
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StaticKind {
    Pillar,
    Shelf,
    Block,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LevelSpec {
    pub level_name: String,
    pub world: WorldSettings,
    #[serde(default)]
    pub bitmaps: SpriteSheets,
    pub objects: LevelObjects,
}

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct WorldSettings {
    pub gravity: GravitySpec,
}

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct GravitySpec {
    pub gx: f32,
    pub gy: f32,
}

/// Sprite names per object category; objects refer to them by index
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SpriteSheets {
    pub target: Vec<String>,
    pub obstacle: Vec<String>,
    pub static_block: Vec<String>,
    pub source: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LevelObjects {
    #[serde(default)]
    pub pillars: Vec<BoxDef>,
    #[serde(default)]
    pub shelves: Vec<BoxDef>,
    #[serde(default)]
    pub static_blocks: Vec<BoxDef>,
    #[serde(default)]
    pub targets: Vec<TargetDef>,
    #[serde(default)]
    pub obstacles: Vec<ObstacleDef>,
    pub source: SourceDef,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BoxDef {
    pub x: f32,
    pub y: f32,
    pub half_w: f32,
    pub half_h: f32,
    #[serde(default)]
    pub color: Option<Rgba>,
    #[serde(default)]
    pub sprite_index: Option<usize>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TargetDef {
    pub x: f32,
    pub y: f32,
    pub radius: f32,
    pub score: u32,
    pub sprite_index: usize,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ObstacleDef {
    pub x: f32,
    pub y: f32,
    pub half_w: f32,
    pub half_h: f32,
    pub sprite_index: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct SourceDef {
    pub x: f32,
    pub y: f32,
    pub radius: f32,
}

impl BoxDef {
    pub fn center(&self) -> Vec2 {
        Vec2::new(self.x, self.y)
    }

    pub fn half_extents(&self) -> Vec2 {
        Vec2::new(self.half_w, self.half_h)
    }
}

impl LevelSpec {
    pub fn from_json_str(json: &str) -> GameResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn load(path: impl AsRef<Path>) -> GameResult<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|e| io_error(path, e))?;
        Self::from_json_str(&json)
    }

    pub fn gravity(&self) -> Vec2 {
        Vec2::new(self.world.gravity.gx, self.world.gravity.gy)
    }

    /// Every static object in creation order: pillars, shelves, then blocks
    pub fn static_objects(&self) -> impl Iterator<Item = (StaticKind, &BoxDef)> {
        let objects = &self.objects;
        objects.pillars.iter().map(|d| (StaticKind::Pillar, d))
            .chain(objects.shelves.iter().map(|d| (StaticKind::Shelf, d)))
            .chain(objects.static_blocks.iter().map(|d| (StaticKind::Block, d)))
    }

    /// Union of every object's horizontal extent, including the source
    pub fn x_extent(&self) -> (f32, f32) {
        let objects = &self.objects;
        let boxes = self.static_objects().map(|(_, d)| (d.x - d.half_w, d.x + d.half_w));
        let obstacles = objects.obstacles.iter().map(|d| (d.x - d.half_w, d.x + d.half_w));
        let targets = objects.targets.iter().map(|d| (d.x - d.radius, d.x + d.radius));
        let source = std::iter::once((
            objects.source.x - objects.source.radius,
            objects.source.x + objects.source.radius,
        ));

        boxes
            .chain(obstacles)
            .chain(targets)
            .chain(source)
            .fold((f32::INFINITY, f32::NEG_INFINITY), |(lo, hi), (a, b)| (lo.min(a), hi.max(b)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r##"{
        "levelName": "Warmup",
        "world": { "gravity": { "gx": 0.0, "gy": -10.0 } },
        "bitmaps": { "target": ["ic_target", "ic_target4"], "staticBlock": ["brick"] },
        "objects": {
            "pillars": [ { "x": -2.0, "y": 1.0, "halfW": 0.25, "halfH": 1.0, "color": "#333333" } ],
            "staticBlocks": [ { "x": 1.0, "y": 2.0, "halfW": 0.5, "halfH": 0.5, "spriteIndex": 0 } ],
            "targets": [ { "x": 4.0, "y": 1.0, "radius": 0.5, "score": 5, "spriteIndex": 1 } ],
            "source": { "x": -5.0, "y": 1.0, "radius": 0.5 }
        }
    }"##;

    #[test]
    fn test_parse_sample() {
        let level = LevelSpec::from_json_str(SAMPLE).expect("parse");
        assert_eq!(level.level_name, "Warmup");
        assert_eq!(level.gravity(), Vec2::new(0.0, -10.0));
        assert_eq!(level.objects.pillars[0].color, Some(Rgba([0x33, 0x33, 0x33, 0xFF])));
        assert!(level.objects.shelves.is_empty());
        assert!(level.bitmaps.source.is_empty());
        assert_eq!(level.static_objects().count(), 2);
        assert_eq!(level.x_extent(), (-5.5, 4.5));
    }

    #[test]
    fn test_bad_color_is_a_parse_error() {
        let broken = SAMPLE.replace("#333333", "grey");
        assert!(LevelSpec::from_json_str(&broken).is_err());
    }
}
