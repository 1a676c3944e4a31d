//! Drag-and-launch state machine
//!
//! Idle -> Dragging -> (Committed | Cancelled) -> CooldownLocked -> Idle
//!
//! The machine never touches the engine. Every body mutation is emitted as
//! `BodyCommand`s through a `CommandSink`, which in the running game is the
//! physics queue.

use crate::constants::interaction;
use crate::physics::{
    circle_contains_point, segment_intersects_rect, BodyCommand, BodyHandle, CommandSink, Vec2,
    WorldBounds, WorldRect,
};
use std::time::{Duration, Instant};

/// Pick-up gate holding the end of the current cooldown
///
/// Pick-ups are allowed once `now >= deadline`, so an attempt exactly at
/// expiry succeeds. The gate lives inside the drag machine and is guarded by
/// whatever lock guards the machine.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CooldownGate {
    deadline: Option<Instant>,
}

impl CooldownGate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lock_until(&mut self, deadline: Instant) {
        self.deadline = Some(deadline);
    }

    pub fn is_open(&self, now: Instant) -> bool {
        self.deadline.map_or(true, |deadline| now >= deadline)
    }

    pub fn reset(&mut self) {
        self.deadline = None;
    }
}

/// Why a drag ended without a launch
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CancelReason {
    Timeout,
    OutOfBounds,
    /// The movement segment crossed a static or obstacle rectangle
    Swept,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DragOutcome {
    Committed { velocity: Vec2 },
    Cancelled(CancelReason),
}

/// Observable phase of the machine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DragPhase {
    Idle,
    Dragging,
    CooldownLocked,
}

/// Read-only view of the world a drag is checked against
#[derive(Debug, Clone, Copy)]
pub struct DragContext<'a> {
    pub source: BodyHandle,
    pub source_radius: f32,
    /// Latest physics-reported source position
    pub source_position: Vec2,
    pub bounds: WorldBounds,
    /// Static and obstacle rectangles the drag may not sweep through
    pub blockers: &'a [WorldRect],
}

impl DragContext<'_> {
    fn in_bounds(&self, p: Vec2) -> bool {
        let r = self.source_radius;
        let b = &self.bounds;
        p.x >= b.left + r && p.x <= b.right - r && p.y >= b.ground + r / 2.0 && p.y <= b.roof - r
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct DragSession {
    source: BodyHandle,
    origin: Vec2,
    last: Vec2,
    started_at: Instant,
    prev_sample_at: Instant,
    velocity: Vec2,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum DragState {
    Idle,
    Dragging(DragSession),
    CooldownLocked,
}

#[derive(Debug)]
pub struct DragController {
    state: DragState,
    gate: CooldownGate,
    timeout: Duration,
    cooldown: Duration,
}

impl Default for DragController {
    fn default() -> Self {
        Self::new(
            Duration::from_millis(interaction::DRAG_TIMEOUT_MS),
            Duration::from_millis(interaction::COOLDOWN_MS),
        )
    }
}

impl DragController {
    pub fn new(timeout: Duration, cooldown: Duration) -> Self {
        Self {
            state: DragState::Idle,
            gate: CooldownGate::new(),
            timeout,
            cooldown,
        }
    }

    pub fn phase(&self, now: Instant) -> DragPhase {
        match self.state {
            DragState::Idle => DragPhase::Idle,
            DragState::Dragging(_) => DragPhase::Dragging,
            DragState::CooldownLocked if self.gate.is_open(now) => DragPhase::Idle,
            DragState::CooldownLocked => DragPhase::CooldownLocked,
        }
    }

    pub fn is_dragging(&self) -> bool {
        matches!(self.state, DragState::Dragging(_))
    }

    /// Drop any drag in progress and open the gate, without emitting commands
    pub fn reset(&mut self) {
        self.state = DragState::Idle;
        self.gate.reset();
    }

    /// Try to pick the source up at `point`. Returns true when a drag started.
    pub fn pointer_down(
        &mut self,
        point: Vec2,
        ctx: &DragContext<'_>,
        now: Instant,
        sink: &dyn CommandSink,
    ) -> bool {
        match self.state {
            DragState::Dragging(_) => return false,
            DragState::CooldownLocked => {
                if !self.gate.is_open(now) {
                    log::debug!("[Drag] Pick-up refused during cooldown");
                    return false;
                }
                self.state = DragState::Idle;
            }
            DragState::Idle => {}
        }

        if !circle_contains_point(ctx.source_position, ctx.source_radius, point) {
            return false;
        }

        self.state = DragState::Dragging(DragSession {
            source: ctx.source,
            origin: ctx.source_position,
            last: point,
            started_at: now,
            prev_sample_at: now,
            velocity: Vec2::ZERO,
        });
        sink.submit(vec![
            BodyCommand::Teleport { handle: ctx.source, position: point },
            BodyCommand::SetVelocity { handle: ctx.source, velocity: Vec2::ZERO },
            BodyCommand::SetGravityScale { handle: ctx.source, scale: 0.0 },
        ]);
        true
    }

    /// Feed one movement sample. Returns the outcome if the drag got cancelled.
    pub fn pointer_move(
        &mut self,
        point: Vec2,
        ctx: &DragContext<'_>,
        now: Instant,
        sink: &dyn CommandSink,
    ) -> Option<DragOutcome> {
        let DragState::Dragging(mut session) = self.state else {
            return None;
        };

        // Timeout wins over any geometric check
        let violation = if self.timed_out(&session, now) {
            Some(CancelReason::Timeout)
        } else if !ctx.in_bounds(point) {
            Some(CancelReason::OutOfBounds)
        } else if ctx
            .blockers
            .iter()
            .any(|rect| segment_intersects_rect(session.last, point, rect))
        {
            Some(CancelReason::Swept)
        } else {
            None
        };

        if let Some(reason) = violation {
            return Some(self.cancel(&session, reason, now, sink));
        }

        let min_interval = Duration::from_millis(interaction::MIN_SAMPLE_INTERVAL_MS);
        let dt = now
            .saturating_duration_since(session.prev_sample_at)
            .max(min_interval)
            .as_secs_f32();
        session.velocity = (point - session.last) / dt;
        session.last = point;
        session.prev_sample_at = now;
        self.state = DragState::Dragging(session);

        sink.submit(vec![BodyCommand::Teleport { handle: session.source, position: point }]);
        None
    }

    /// Release the source. Launches it with the current velocity estimate,
    /// unless the hold outlasted the timeout.
    pub fn pointer_up(&mut self, now: Instant, sink: &dyn CommandSink) -> Option<DragOutcome> {
        let DragState::Dragging(session) = self.state else {
            return None;
        };
        if self.timed_out(&session, now) {
            return Some(self.cancel(&session, CancelReason::Timeout, now, sink));
        }

        sink.submit(vec![
            BodyCommand::Teleport { handle: session.source, position: session.last },
            BodyCommand::SetGravityScale { handle: session.source, scale: 1.0 },
            BodyCommand::SetVelocity { handle: session.source, velocity: session.velocity },
        ]);
        self.enter_cooldown(now);
        log::debug!("[Drag] Launched with velocity {:?}", session.velocity);
        Some(DragOutcome::Committed { velocity: session.velocity })
    }

    fn timed_out(&self, session: &DragSession, now: Instant) -> bool {
        now.saturating_duration_since(session.started_at) > self.timeout
    }

    /// Snap the source back to its pick-up origin and start the cooldown
    fn cancel(
        &mut self,
        session: &DragSession,
        reason: CancelReason,
        now: Instant,
        sink: &dyn CommandSink,
    ) -> DragOutcome {
        log::debug!("[Drag] Cancelled: {:?}", reason);
        sink.submit(vec![
            BodyCommand::Teleport { handle: session.source, position: session.origin },
            BodyCommand::SetVelocity { handle: session.source, velocity: Vec2::ZERO },
            BodyCommand::SetGravityScale { handle: session.source, scale: 1.0 },
        ]);
        self.enter_cooldown(now);
        DragOutcome::Cancelled(reason)
    }

    fn enter_cooldown(&mut self, now: Instant) {
        self.gate.lock_until(now + self.cooldown);
        self.state = DragState::CooldownLocked;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;

    #[derive(Default)]
    struct RecordingSink {
        commands: Mutex<Vec<BodyCommand>>,
    }

    impl CommandSink for RecordingSink {
        fn submit(&self, commands: Vec<BodyCommand>) {
            self.commands.lock().extend(commands);
        }
    }

    impl RecordingSink {
        fn take(&self) -> Vec<BodyCommand> {
            std::mem::take(&mut *self.commands.lock())
        }
    }

    const SOURCE: BodyHandle = BodyHandle(1);

    fn bounds() -> WorldBounds {
        WorldBounds { left: -10.0, right: 10.0, ground: -10.0, roof: 10.0 }
    }

    fn ctx(blockers: &[WorldRect]) -> DragContext<'_> {
        DragContext {
            source: SOURCE,
            source_radius: 0.5,
            source_position: Vec2::ZERO,
            bounds: bounds(),
            blockers,
        }
    }

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    #[test]
    fn test_pick_up_outside_source_stays_idle() {
        let mut drag = DragController::default();
        let sink = RecordingSink::default();
        let t0 = Instant::now();

        assert!(!drag.pointer_down(Vec2::new(0.6, 0.0), &ctx(&[]), t0, &sink));
        assert_eq!(drag.phase(t0), DragPhase::Idle);
        assert!(sink.take().is_empty());

        assert!(drag.pointer_down(Vec2::new(0.3, 0.3), &ctx(&[]), t0, &sink));
        assert_eq!(drag.phase(t0), DragPhase::Dragging);
        assert_eq!(
            sink.take(),
            vec![
                BodyCommand::Teleport { handle: SOURCE, position: Vec2::new(0.3, 0.3) },
                BodyCommand::SetVelocity { handle: SOURCE, velocity: Vec2::ZERO },
                BodyCommand::SetGravityScale { handle: SOURCE, scale: 0.0 },
            ]
        );
    }

    #[test]
    fn test_timeout_cancels() {
        let mut drag = DragController::default();
        let sink = RecordingSink::default();
        let t0 = Instant::now();
        drag.pointer_down(Vec2::ZERO, &ctx(&[]), t0, &sink);

        assert_eq!(drag.pointer_move(Vec2::new(0.1, 0.0), &ctx(&[]), t0 + ms(500), &sink), None);
        assert_eq!(
            drag.pointer_move(Vec2::new(0.2, 0.0), &ctx(&[]), t0 + ms(501), &sink),
            Some(DragOutcome::Cancelled(CancelReason::Timeout))
        );
        assert_eq!(drag.phase(t0 + ms(501)), DragPhase::CooldownLocked);
    }

    #[test]
    fn test_release_after_timeout_cancels() {
        let mut drag = DragController::default();
        let sink = RecordingSink::default();
        let t0 = Instant::now();
        drag.pointer_down(Vec2::ZERO, &ctx(&[]), t0, &sink);
        drag.pointer_move(Vec2::new(1.0, 0.0), &ctx(&[]), t0 + ms(100), &sink);
        sink.take();

        assert_eq!(
            drag.pointer_up(t0 + ms(2000), &sink),
            Some(DragOutcome::Cancelled(CancelReason::Timeout))
        );
        assert_eq!(
            sink.take(),
            vec![
                BodyCommand::Teleport { handle: SOURCE, position: Vec2::ZERO },
                BodyCommand::SetVelocity { handle: SOURCE, velocity: Vec2::ZERO },
                BodyCommand::SetGravityScale { handle: SOURCE, scale: 1.0 },
            ]
        );
        assert_eq!(drag.phase(t0 + ms(2000)), DragPhase::CooldownLocked);
        assert!(!drag.pointer_down(Vec2::ZERO, &ctx(&[]), t0 + ms(2100), &sink));
    }

    #[test]
    fn test_timeout_wins_over_geometry() {
        let blockers = [WorldRect::new(0.5, -0.5, 1.5, 0.5)];
        let mut drag = DragController::default();
        let sink = RecordingSink::default();
        let t0 = Instant::now();
        drag.pointer_down(Vec2::ZERO, &ctx(&blockers), t0, &sink);

        // Swept through the blocker and out of bounds, but late
        let outcome = drag.pointer_move(Vec2::new(20.0, 0.0), &ctx(&blockers), t0 + ms(600), &sink);
        assert_eq!(outcome, Some(DragOutcome::Cancelled(CancelReason::Timeout)));
    }

    #[test]
    fn test_gate_opens_at_deadline() {
        let t0 = Instant::now();
        let mut gate = CooldownGate::new();
        assert!(gate.is_open(t0));

        gate.lock_until(t0 + ms(500));
        assert!(!gate.is_open(t0 + ms(499)));
        assert!(gate.is_open(t0 + ms(500)));

        gate.reset();
        assert!(gate.is_open(t0));
    }

    #[test]
    fn test_out_of_bounds_cancels() {
        let mut drag = DragController::default();
        let sink = RecordingSink::default();
        let t0 = Instant::now();
        drag.pointer_down(Vec2::ZERO, &ctx(&[]), t0, &sink);

        // Roof is at 10 and the radius 0.5
        assert_eq!(
            drag.pointer_move(Vec2::new(0.0, 9.6), &ctx(&[]), t0 + ms(10), &sink),
            Some(DragOutcome::Cancelled(CancelReason::OutOfBounds))
        );
    }

    #[test]
    fn test_commit_velocity_from_last_two_samples() {
        let mut drag = DragController::default();
        let sink = RecordingSink::default();
        let t0 = Instant::now();
        drag.pointer_down(Vec2::ZERO, &ctx(&[]), t0, &sink);
        drag.pointer_move(Vec2::new(1.0, 0.0), &ctx(&[]), t0 + ms(50), &sink);
        drag.pointer_move(Vec2::new(1.5, 0.5), &ctx(&[]), t0 + ms(100), &sink);
        sink.take();

        let Some(DragOutcome::Committed { velocity }) = drag.pointer_up(t0 + ms(120), &sink) else {
            panic!("expected a launch");
        };
        assert!((velocity - Vec2::new(10.0, 10.0)).length() < 1e-3);

        let commands = sink.take();
        assert_eq!(commands[0], BodyCommand::Teleport { handle: SOURCE, position: Vec2::new(1.5, 0.5) });
        assert_eq!(commands[1], BodyCommand::SetGravityScale { handle: SOURCE, scale: 1.0 });
        assert!(matches!(commands[2], BodyCommand::SetVelocity { .. }));
    }

    #[test]
    fn test_same_instant_samples_use_minimum_interval() {
        let mut drag = DragController::default();
        let sink = RecordingSink::default();
        let t0 = Instant::now();
        drag.pointer_down(Vec2::ZERO, &ctx(&[]), t0, &sink);
        drag.pointer_move(Vec2::new(0.001, 0.0), &ctx(&[]), t0, &sink);

        let Some(DragOutcome::Committed { velocity }) = drag.pointer_up(t0, &sink) else {
            panic!("expected a launch");
        };
        assert!(velocity.is_finite());
        assert!((velocity.x - 1.0).abs() < 1e-3);
    }

    #[test]
    fn test_cooldown_boundary() {
        let mut drag = DragController::default();
        let sink = RecordingSink::default();
        let t0 = Instant::now();
        drag.pointer_down(Vec2::ZERO, &ctx(&[]), t0, &sink);
        let released_at = t0 + ms(100);
        drag.pointer_up(released_at, &sink);

        let just_before = released_at + ms(500) - Duration::from_nanos(1);
        assert!(!drag.pointer_down(Vec2::ZERO, &ctx(&[]), just_before, &sink));
        assert_eq!(drag.phase(just_before), DragPhase::CooldownLocked);

        assert!(drag.pointer_down(Vec2::ZERO, &ctx(&[]), released_at + ms(500), &sink));
    }

    #[test]
    fn test_sweep_through_rectangle_snaps_back() {
        let blockers = [WorldRect::new(0.5, -0.5, 1.5, 0.5)];
        let mut drag = DragController::default();
        let sink = RecordingSink::default();
        let t0 = Instant::now();

        assert!(drag.pointer_down(Vec2::ZERO, &ctx(&blockers), t0, &sink));
        sink.take();

        let outcome = drag.pointer_move(Vec2::new(2.0, 0.0), &ctx(&blockers), t0 + ms(100), &sink);
        assert_eq!(outcome, Some(DragOutcome::Cancelled(CancelReason::Swept)));
        assert_eq!(
            sink.take(),
            vec![
                BodyCommand::Teleport { handle: SOURCE, position: Vec2::ZERO },
                BodyCommand::SetVelocity { handle: SOURCE, velocity: Vec2::ZERO },
                BodyCommand::SetGravityScale { handle: SOURCE, scale: 1.0 },
            ]
        );
        assert_eq!(drag.pointer_up(t0 + ms(110), &sink), None);
    }

    #[test]
    fn test_reset_reopens_gate() {
        let mut drag = DragController::default();
        let sink = RecordingSink::default();
        let t0 = Instant::now();
        drag.pointer_down(Vec2::ZERO, &ctx(&[]), t0, &sink);
        drag.pointer_up(t0, &sink);
        drag.reset();

        assert!(drag.pointer_down(Vec2::ZERO, &ctx(&[]), t0 + ms(1), &sink));
    }
}
