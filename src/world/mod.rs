//! Level data and world construction
//!
//! - **level**: the consumed level schema
//! - **viewport**: world/screen mapping
//! - **bootstrap**: scale derivation and body creation
//! - **reachability**: line-of-sight from the source to the targets

pub mod bootstrap;
pub mod level;
pub mod reachability;
pub mod viewport;

pub use bootstrap::{build_world, BuiltWorld, WorldLayout, WorldPlan};
pub use level::{LevelSpec, StaticKind};
pub use reachability::{
    all_targets_reachable, find_removable_blocker, is_target_reachable, StaticGeometry,
};
pub use viewport::{ScreenTransform, Viewport};
