//! Serial physics thread
//!
//! The engine lives on one worker thread and is mutated only by jobs posted
//! to its queue. Jobs run strictly in submission order. Posting never blocks.
//!
//! Pending work is cancelled with epochs: every job carries the epoch that was
//! current when it was posted, and the worker skips jobs older than the current
//! epoch when it dequeues them. A job that is already running is never interrupted.

use super::{BodyHandle, PhysicsEngine, Vec2};
use crate::error::{GameError, GameResult};
use crossbeam_channel::{bounded, unbounded, Receiver, Sender};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;

/// Work item executed on the physics thread with exclusive engine access
pub type PhysicsJob = Box<dyn FnOnce(&mut dyn PhysicsEngine) + Send + 'static>;

/// Engine mutation issued by the interaction layer, as plain data
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BodyCommand {
    Teleport { handle: BodyHandle, position: Vec2 },
    SetVelocity { handle: BodyHandle, velocity: Vec2 },
    SetGravityScale { handle: BodyHandle, scale: f32 },
}

impl BodyCommand {
    pub fn apply(self, engine: &mut dyn PhysicsEngine) {
        match self {
            BodyCommand::Teleport { handle, position } => engine.teleport_body(handle, position),
            BodyCommand::SetVelocity { handle, velocity } => engine.set_velocity(handle, velocity),
            BodyCommand::SetGravityScale { handle, scale } => engine.set_gravity_scale(handle, scale),
        }
    }
}

/// Destination for engine commands
pub trait CommandSink {
    fn submit(&self, commands: Vec<BodyCommand>);
}

enum WorkerMessage {
    Job {
        epoch: u64,
        label: &'static str,
        job: PhysicsJob,
    },
    Barrier(Sender<()>),
    Shutdown,
}

/// Cloneable posting handle for the physics thread
#[derive(Clone)]
pub struct PhysicsQueue {
    sender: Sender<WorkerMessage>,
    epoch: Arc<AtomicU64>,
    stopped: Arc<AtomicBool>,
}

impl PhysicsQueue {
    /// Post a job tagged with the current epoch. Returns false once the worker stopped.
    pub fn post(&self, label: &'static str, job: PhysicsJob) -> bool {
        if self.stopped.load(Ordering::Acquire) {
            log::debug!("[PhysicsQueue] Dropping '{}' after shutdown", label);
            return false;
        }
        let epoch = self.epoch.load(Ordering::Acquire);
        match self.sender.send(WorkerMessage::Job { epoch, label, job }) {
            Ok(()) => true,
            Err(_) => {
                log::debug!("[PhysicsQueue] Worker gone, dropping '{}'", label);
                false
            }
        }
    }

    /// Invalidate every job posted so far; returns the new epoch
    pub fn advance_epoch(&self) -> u64 {
        self.epoch.fetch_add(1, Ordering::AcqRel) + 1
    }

    pub fn is_stopped(&self) -> bool {
        self.stopped.load(Ordering::Acquire)
    }
}

/// Owner of the physics thread
pub struct PhysicsWorker {
    queue: PhysicsQueue,
    thread: Option<JoinHandle<Box<dyn PhysicsEngine>>>,
}

impl PhysicsWorker {
    /// Move the engine onto a new physics thread
    pub fn spawn(engine: Box<dyn PhysicsEngine>) -> GameResult<Self> {
        let (sender, receiver) = unbounded::<WorkerMessage>();
        let epoch = Arc::new(AtomicU64::new(0));
        let worker_epoch = Arc::clone(&epoch);

        let thread = std::thread::Builder::new()
            .name("physics".to_string())
            .spawn(move || run_worker(engine, receiver, worker_epoch))
            .map_err(|e| crate::error::io_error("physics thread", e))?;

        log::debug!("[PhysicsWorker] Started");

        Ok(Self {
            queue: PhysicsQueue {
                sender,
                epoch,
                stopped: Arc::new(AtomicBool::new(false)),
            },
            thread: Some(thread),
        })
    }

    pub fn queue(&self) -> PhysicsQueue {
        self.queue.clone()
    }

    /// Block until every job posted before this call has run or been skipped
    ///
    /// Never call this from the render thread.
    pub fn flush(&self) -> GameResult<()> {
        if self.queue.is_stopped() {
            return Err(GameError::WorkerStopped);
        }
        let (done_tx, done_rx) = bounded(1);
        self.queue
            .sender
            .send(WorkerMessage::Barrier(done_tx))
            .map_err(|_| GameError::WorkerStopped)?;
        done_rx.recv().map_err(|_| GameError::WorkerStopped)
    }

    /// Drain the queue, stop and join the thread, and hand the engine back
    ///
    /// The caller releases the engine's world after this returns, so no posted
    /// job can touch a destroyed world.
    pub fn shutdown(mut self) -> GameResult<Box<dyn PhysicsEngine>> {
        self.stop_and_join().ok_or(GameError::WorkerStopped)
    }

    fn stop_and_join(&mut self) -> Option<Box<dyn PhysicsEngine>> {
        let thread = self.thread.take()?;
        let _ = self.queue.sender.send(WorkerMessage::Shutdown);
        self.queue.stopped.store(true, Ordering::Release);
        match thread.join() {
            Ok(engine) => {
                log::debug!("[PhysicsWorker] Joined");
                Some(engine)
            }
            Err(_) => {
                log::error!("[PhysicsWorker] Physics thread panicked");
                None
            }
        }
    }
}

impl Drop for PhysicsWorker {
    fn drop(&mut self) {
        if let Some(mut engine) = self.stop_and_join() {
            engine.destroy_world();
        }
    }
}

fn run_worker(
    mut engine: Box<dyn PhysicsEngine>,
    receiver: Receiver<WorkerMessage>,
    epoch: Arc<AtomicU64>,
) -> Box<dyn PhysicsEngine> {
    let mut skipped: u64 = 0;

    while let Ok(message) = receiver.recv() {
        match message {
            WorkerMessage::Job { epoch: job_epoch, label, job } => {
                if job_epoch < epoch.load(Ordering::Acquire) {
                    skipped += 1;
                    log::trace!("[PhysicsWorker] Skipping stale '{}' (epoch {})", label, job_epoch);
                    continue;
                }
                job(engine.as_mut());
            }
            WorkerMessage::Barrier(done) => {
                let _ = done.send(());
            }
            WorkerMessage::Shutdown => break,
        }
    }

    log::debug!("[PhysicsWorker] Exiting, {} stale jobs skipped", skipped);
    engine
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::physics::KinematicWorld;
    use parking_lot::Mutex;

    #[test]
    fn test_jobs_run_in_submission_order() {
        let worker = PhysicsWorker::spawn(Box::new(KinematicWorld::new())).expect("spawn");
        let queue = worker.queue();
        let log = Arc::new(Mutex::new(Vec::new()));

        for i in 0..100 {
            let log = Arc::clone(&log);
            queue.post("record", Box::new(move |_engine: &mut dyn PhysicsEngine| log.lock().push(i)));
        }
        worker.flush().expect("flush");

        assert_eq!(*log.lock(), (0..100).collect::<Vec<_>>());
    }

    #[test]
    fn test_stale_epoch_jobs_are_skipped() {
        let worker = PhysicsWorker::spawn(Box::new(KinematicWorld::new())).expect("spawn");
        let queue = worker.queue();
        let ran = Arc::new(Mutex::new(Vec::new()));

        // Hold the worker so the next posts queue up behind it
        let (release_tx, release_rx) = bounded::<()>(1);
        queue.post("block", Box::new(move |_engine: &mut dyn PhysicsEngine| {
            let _ = release_rx.recv();
        }));

        let r = Arc::clone(&ran);
        queue.post("old", Box::new(move |_engine: &mut dyn PhysicsEngine| r.lock().push("old")));
        queue.advance_epoch();
        let r = Arc::clone(&ran);
        queue.post("new", Box::new(move |_engine: &mut dyn PhysicsEngine| r.lock().push("new")));

        // The blocking job itself may already be stale
        let _ = release_tx.send(());
        worker.flush().expect("flush");

        assert_eq!(*ran.lock(), vec!["new"]);
    }

    #[test]
    fn test_shutdown_returns_engine_and_refuses_posts() {
        let worker = PhysicsWorker::spawn(Box::new(KinematicWorld::new())).expect("spawn");
        let queue = worker.queue();
        queue.post("world", Box::new(|engine: &mut dyn PhysicsEngine| engine.create_world(Vec2::ZERO)));

        let engine = worker.shutdown().expect("shutdown");
        assert!(engine.has_world(), "queued job drained before exit");
        assert!(!queue.post("late", Box::new(|_engine: &mut dyn PhysicsEngine| {})));
    }
}
