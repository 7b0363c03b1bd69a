//! Repeating frame-tick loop with a stop handle

use crate::camera::VideoSource;
use crate::controller::{ScanController, TickOutcome};
use crate::decoder::Decoder;
use crate::render::ResultSurface;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};
use tracing::debug;

/// Cancels a running [`FrameLoop`]
///
/// Cheap to clone; every clone controls the same loop.
#[derive(Debug, Clone, Default)]
pub struct StopHandle(Arc<AtomicBool>);

impl StopHandle {
    /// New handle, not stopped
    pub fn new() -> Self {
        Self::default()
    }

    /// Ask the loop to stop before its next tick
    pub fn stop(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    /// True once [`StopHandle::stop`] was called
    pub fn is_stopped(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Paces ticks, one call per frame
pub trait FrameClock {
    /// Block until the next frame is due
    fn wait_for_next_frame(&mut self);
}

/// Clock firing at a fixed interval
///
/// Sleeps only for what is left of the interval after the tick's own work.
#[derive(Debug, Clone)]
pub struct IntervalClock {
    interval: Duration,
    last: Option<Instant>,
}

impl IntervalClock {
    /// Clock with the given frame interval
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            last: None,
        }
    }
}

impl FrameClock for IntervalClock {
    fn wait_for_next_frame(&mut self) {
        if let Some(last) = self.last {
            let elapsed = last.elapsed();
            if elapsed < self.interval {
                std::thread::sleep(self.interval - elapsed);
            }
        }
        self.last = Some(Instant::now());
    }
}

/// Clock that never waits
#[derive(Debug, Clone, Copy, Default)]
pub struct ImmediateClock;

impl FrameClock for ImmediateClock {
    fn wait_for_next_frame(&mut self) {}
}

/// Tick counts from a finished loop
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoopSummary {
    /// Ticks run
    pub ticks: u64,
    /// Ticks that decoded a payload
    pub decoded: u64,
    /// Ticks skipped because the video was not ready or capture failed
    pub skipped: u64,
}

/// Runs [`ScanController::tick`] once per frame until stopped
///
/// Every tick reschedules the next one whatever its outcome, with no backoff.
/// Without a tick limit the loop runs until its [`StopHandle`] fires.
pub struct FrameLoop<C> {
    clock: C,
    stop: StopHandle,
    tick_limit: Option<u64>,
}

impl<C: FrameClock> FrameLoop<C> {
    /// Loop paced by `clock`
    pub fn new(clock: C) -> Self {
        Self {
            clock,
            stop: StopHandle::new(),
            tick_limit: None,
        }
    }

    /// Stop after `limit` ticks
    pub fn with_tick_limit(mut self, limit: u64) -> Self {
        self.tick_limit = Some(limit);
        self
    }

    /// Handle that cancels this loop
    pub fn stop_handle(&self) -> StopHandle {
        self.stop.clone()
    }

    /// Drive the controller, calling `on_tick` after every tick
    pub fn run_with<D, R, V, F>(
        &mut self,
        controller: &mut ScanController<D, R, V>,
        mut on_tick: F,
    ) -> LoopSummary
    where
        D: Decoder,
        R: ResultSurface,
        V: VideoSource,
        F: FnMut(&ScanController<D, R, V>, &TickOutcome),
    {
        let mut summary = LoopSummary::default();
        loop {
            if self.stop.is_stopped() {
                break;
            }
            if self.tick_limit.is_some_and(|limit| summary.ticks >= limit) {
                break;
            }
            self.clock.wait_for_next_frame();
            // stop may have been requested while waiting
            if self.stop.is_stopped() {
                break;
            }

            let outcome = controller.tick();
            summary.ticks += 1;
            match &outcome {
                TickOutcome::Decoded(_) => summary.decoded += 1,
                TickOutcome::NotReady | TickOutcome::CaptureFailed(_) | TickOutcome::Idle => {
                    summary.skipped += 1
                }
                TickOutcome::NoCode => {}
            }
            on_tick(&*controller, &outcome);
        }
        debug!(?summary, "frame loop finished");
        summary
    }

    /// Drive the controller until stopped
    pub fn run<D, R, V>(&mut self, controller: &mut ScanController<D, R, V>) -> LoopSummary
    where
        D: Decoder,
        R: ResultSurface,
        V: VideoSource,
    {
        self.run_with(controller, |_, _| {})
    }
}
