//! Render-side bookkeeping
//!
//! Nothing here draws pixels. The registry tracks what exists, the frame
//! scheduler composes it into screen space, and a `Compositor` does the drawing.

pub mod display_link;
pub mod frame;
pub mod registry;
pub mod visual;

pub use display_link::DisplayLink;
pub use frame::{compose_frame, Compositor, DrawItem, Frame, FrameScheduler};
pub use registry::{PixelSize, RenderItem, RenderRegistry};
pub use visual::{RenderKind, Rgba, Visual};
