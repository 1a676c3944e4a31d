// Strike Engine Constants - SINGLE SOURCE OF TRUTH
//
// Gameplay timings, materials and layout defaults used across the crate.
// Config values default to these; do not repeat the literals elsewhere.

/// Interaction timings
pub mod interaction {
    /// A drag longer than this is cancelled on the next movement sample
    pub const DRAG_TIMEOUT_MS: u64 = 500;
    /// Dead period after a launch or cancel before the next pick-up
    pub const COOLDOWN_MS: u64 = 500;
    /// Floor for the velocity-estimate denominator
    pub const MIN_SAMPLE_INTERVAL_MS: u64 = 1;
}

/// Viewport and layout defaults
pub mod layout {
    pub const VIEWPORT_WIDTH_PX: f32 = 1080.0;
    pub const VIEWPORT_HEIGHT_PX: f32 = 1920.0;
    /// Pixels between the screen bottom and world y = 0
    pub const GROUND_OFFSET_PX: f32 = 100.0;
    /// X span used when a level declares no objects
    pub const DEFAULT_SPAN_MIN_X: f32 = -7.0;
    pub const DEFAULT_SPAN_MAX_X: f32 = 7.0;
    pub const REFRESH_HZ: u32 = 60;
}

/// Body materials per category
pub mod materials {
    /// Mass per unit area
    pub const BASE_DENSITY: f32 = 0.5;

    pub const BOUNDARY_FRICTION: f32 = 0.5;
    pub const BOUNDARY_RESTITUTION: f32 = 0.0;

    pub const STATIC_FRICTION: f32 = 0.5;
    pub const STATIC_RESTITUTION: f32 = 0.0;

    pub const TARGET_FRICTION: f32 = 0.3;
    pub const TARGET_RESTITUTION: f32 = 0.8;

    pub const OBSTACLE_FRICTION: f32 = 0.3;
    pub const OBSTACLE_RESTITUTION: f32 = 0.8;

    pub const SOURCE_FRICTION: f32 = 0.2;
    pub const SOURCE_RESTITUTION: f32 = 0.5;
}

/// Default fills for static decor, RGBA
pub mod skins {
    pub const PILLAR_FILL: [u8; 4] = [0x5D, 0x40, 0x37, 0xFF];
    pub const SHELF_FILL: [u8; 4] = [0x8D, 0x6E, 0x63, 0xFF];
    pub const BLOCK_FILL: [u8; 4] = [0x44, 0x44, 0x44, 0xFF];
}
