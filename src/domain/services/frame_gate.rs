use crate::domain::model::SkipReason;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

/// Admits at most one frame at a time, and no more often than `interval_ms`.
#[derive(Debug)]
pub struct FrameGate {
    interval_ms: u64,
    busy: AtomicBool,
    started: AtomicBool,
    last_ms: AtomicU64,
}

/// Held while a frame is being recognized.
#[derive(Debug)]
pub struct FramePermit<'a> {
    gate: &'a FrameGate,
}

impl Drop for FramePermit<'_> {
    fn drop(&mut self) {
        self.gate.busy.store(false, Ordering::Release);
    }
}

impl FrameGate {
    pub fn new(interval_ms: u64) -> Self {
        Self {
            interval_ms,
            busy: AtomicBool::new(false),
            started: AtomicBool::new(false),
            last_ms: AtomicU64::new(0),
        }
    }

    pub fn try_acquire(&self, timestamp_ms: u64) -> Result<FramePermit<'_>, SkipReason> {
        if self
            .busy
            .compare_exchange(false, true, Ordering::Acquire, Ordering::Relaxed)
            .is_err()
        {
            return Err(SkipReason::Busy);
        }

        let last = self.last_ms.load(Ordering::Relaxed);
        if self.started.load(Ordering::Relaxed)
            && timestamp_ms.saturating_sub(last) < self.interval_ms
        {
            self.busy.store(false, Ordering::Release);
            return Err(SkipReason::Throttled);
        }

        self.last_ms.store(timestamp_ms, Ordering::Relaxed);
        self.started.store(true, Ordering::Relaxed);
        Ok(FramePermit { gate: self })
    }

    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }

    pub fn reset(&self) {
        self.started.store(false, Ordering::Relaxed);
    }
}
