//! Pointer input
//!
//! Events arrive in screen pixels; the session maps them into world units
//! before they reach the drag machine.

pub mod drag;

pub use drag::{CancelReason, CooldownGate, DragContext, DragController, DragOutcome, DragPhase};

use crate::physics::Vec2;
use std::time::Instant;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerPhase {
    Down,
    Move,
    Up,
}

/// One touch or mouse sample in screen pixels
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerEvent {
    pub phase: PointerPhase,
    pub position: Vec2,
    pub at: Instant,
}

impl PointerEvent {
    pub fn new(phase: PointerPhase, position: Vec2, at: Instant) -> Self {
        Self { phase, position, at }
    }

    pub fn down(position: Vec2, at: Instant) -> Self {
        Self::new(PointerPhase::Down, position, at)
    }

    pub fn moved(position: Vec2, at: Instant) -> Self {
        Self::new(PointerPhase::Move, position, at)
    }

    pub fn up(position: Vec2, at: Instant) -> Self {
        Self::new(PointerPhase::Up, position, at)
    }
}
