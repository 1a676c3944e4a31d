use crate::constants::layout;
use crate::physics::Vec2;
use crate::renderer::registry::PixelSize;
use serde::Deserialize;

/// Drawable surface in pixels
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct Viewport {
    pub width_px: f32,
    pub height_px: f32,
    /// Distance from the bottom edge to world y = 0
    pub ground_offset_px: f32,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            width_px: layout::VIEWPORT_WIDTH_PX,
            height_px: layout::VIEWPORT_HEIGHT_PX,
            ground_offset_px: layout::GROUND_OFFSET_PX,
        }
    }
}

/// World <-> screen mapping for one level
///
/// World x = 0 sits at the horizontal center, world y grows upward from the
/// ground line `ground_offset_px` above the bottom edge.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScreenTransform {
    pub viewport: Viewport,
    pub pixels_per_unit: f32,
}

impl ScreenTransform {
    pub fn new(viewport: Viewport, pixels_per_unit: f32) -> Self {
        Self { viewport, pixels_per_unit }
    }

    pub fn world_to_screen(&self, world: Vec2) -> Vec2 {
        Vec2::new(
            world.x * self.pixels_per_unit + self.viewport.width_px / 2.0,
            self.viewport.height_px - (world.y * self.pixels_per_unit + self.viewport.ground_offset_px),
        )
    }

    pub fn screen_to_world(&self, screen: Vec2) -> Vec2 {
        Vec2::new(
            (screen.x - self.viewport.width_px / 2.0) / self.pixels_per_unit,
            (self.viewport.height_px - screen.y - self.viewport.ground_offset_px) / self.pixels_per_unit,
        )
    }

    /// Pixel footprint of a body with the given world half extents
    pub fn footprint(&self, half_extents: Vec2) -> PixelSize {
        PixelSize {
            width: (half_extents.x * 2.0 * self.pixels_per_unit).round() as i32,
            height: (half_extents.y * 2.0 * self.pixels_per_unit).round() as i32,
        }
    }

    /// Visible world width and height
    pub fn world_size(&self) -> Vec2 {
        Vec2::new(
            self.viewport.width_px / self.pixels_per_unit,
            self.viewport.height_px / self.pixels_per_unit,
        )
    }
}
