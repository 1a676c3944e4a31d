//! Render thread driving a `FrameScheduler` at a fixed refresh rate

use super::frame::FrameScheduler;
use crate::error::{io_error, GameResult};
use crossbeam_channel::{bounded, select, tick, Sender};
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

pub struct DisplayLink {
    stop: Option<Sender<()>>,
    thread: Option<JoinHandle<FrameScheduler>>,
}

impl DisplayLink {
    pub fn start(mut scheduler: FrameScheduler, interval: Duration) -> GameResult<Self> {
        let (stop_tx, stop_rx) = bounded::<()>(1);
        let ticker = tick(interval);

        let thread = std::thread::Builder::new()
            .name("render".to_string())
            .spawn(move || {
                loop {
                    select! {
                        recv(ticker) -> _ => scheduler.on_frame(Instant::now()),
                        recv(stop_rx) -> _ => break,
                    }
                }
                scheduler
            })
            .map_err(|e| io_error("render thread", e))?;

        log::debug!("[DisplayLink] Started at {:?} per frame", interval);
        Ok(Self {
            stop: Some(stop_tx),
            thread: Some(thread),
        })
    }

    /// Stop ticking and join the render thread; returns the scheduler
    pub fn stop(mut self) -> Option<FrameScheduler> {
        self.stop_and_join()
    }

    fn stop_and_join(&mut self) -> Option<FrameScheduler> {
        // Dropping the sender wakes the select as well
        if let Some(stop) = self.stop.take() {
            let _ = stop.send(());
        }
        let thread = self.thread.take()?;
        match thread.join() {
            Ok(scheduler) => {
                log::debug!("[DisplayLink] Stopped after {} frames", scheduler.frames());
                Some(scheduler)
            }
            Err(_) => {
                log::error!("[DisplayLink] Render thread panicked");
                None
            }
        }
    }
}

impl Drop for DisplayLink {
    fn drop(&mut self) {
        self.stop_and_join();
    }
}
