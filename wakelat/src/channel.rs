use crossbeam_channel::{Receiver, Sender};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use wakelat_common::{Result, WakeError};

use crate::pool::Cancel;

/// The byte carried on both signaling paths. Its value is never inspected.
const SIGNAL: u8 = 0;

/// Timestamp slot shared by one driver/worker pair.
///
/// Times are stored as nanoseconds since `epoch`. Both fields are written by
/// one side and read by the other only across a channel handoff, which orders
/// the accesses, so relaxed atomics are enough.
struct WakeSlot {
    epoch: Instant,
    stamp_ns: AtomicU64,
    last_elapsed_ns: AtomicU64,
}

impl WakeSlot {
    fn nanos_since_epoch(&self, at: Instant) -> u64 {
        at.saturating_duration_since(self.epoch).as_nanos() as u64
    }
}

/// Driver's end of a wake channel: sends `start`, receives `ack`.
pub struct WakeLink {
    slot: Arc<WakeSlot>,
    start_tx: Option<Sender<u8>>,
    ack_rx: Receiver<u8>,
}

/// Worker's end of a wake channel: receives `start`, sends `ack`.
pub struct WakeEndpoint {
    slot: Arc<WakeSlot>,
    start_rx: Receiver<u8>,
    ack_tx: Sender<u8>,
}

/// Create the two one-byte signaling paths and the shared timestamp slot for
/// one worker.
pub fn wake_channel() -> (WakeLink, WakeEndpoint) {
    let slot = Arc::new(WakeSlot {
        epoch: Instant::now(),
        stamp_ns: AtomicU64::new(0),
        last_elapsed_ns: AtomicU64::new(0),
    });
    let (start_tx, start_rx) = crossbeam_channel::bounded(1);
    let (ack_tx, ack_rx) = crossbeam_channel::bounded(1);

    let link = WakeLink { slot: Arc::clone(&slot), start_tx: Some(start_tx), ack_rx };
    let endpoint = WakeEndpoint { slot, start_rx, ack_tx };
    (link, endpoint)
}

impl WakeLink {
    /// Record the current time into the slot, then send `start`.
    ///
    /// At most one `start` may be outstanding: callers must receive the
    /// matching ack with [`WakeLink::await_ack`] before signaling again.
    pub fn signal(&self) -> Result<()> {
        let start_tx = self.start_tx.as_ref().ok_or(WakeError::ChannelClosed("start"))?;
        self.slot
            .stamp_ns
            .store(self.slot.nanos_since_epoch(Instant::now()), Ordering::Relaxed);
        start_tx.send(SIGNAL).map_err(|_| WakeError::ChannelClosed("start"))
    }

    /// Block until the worker acknowledges the last `start`, then return the
    /// wakeup latency it measured.
    pub fn await_ack(&self) -> Result<Duration> {
        self.ack_rx.recv().map_err(|_| WakeError::ChannelClosed("ack"))?;
        Ok(self.last_elapsed())
    }

    /// Latency recorded by the worker for its most recent wakeup.
    pub fn last_elapsed(&self) -> Duration {
        Duration::from_nanos(self.slot.last_elapsed_ns.load(Ordering::Relaxed))
    }

    pub fn is_cancelled(&self) -> bool {
        self.start_tx.is_none()
    }
}

impl Cancel for WakeLink {
    /// Hang up the `start` path. A worker blocked in its receive sees the
    /// disconnect and exits; a worker mid-cycle exits at its next receive.
    fn cancel(&mut self) {
        self.start_tx.take();
    }
}

impl WakeEndpoint {
    /// Worker body: wait for `start`, measure, acknowledge, repeat until the
    /// driver cancels.
    pub fn serve(self) -> Result<()> {
        while self.start_rx.recv().is_ok() {
            let woke_ns = self.slot.nanos_since_epoch(Instant::now());
            let elapsed = woke_ns.saturating_sub(self.slot.stamp_ns.load(Ordering::Relaxed));
            self.slot.last_elapsed_ns.store(elapsed, Ordering::Relaxed);

            self.ack_tx.send(SIGNAL).map_err(|_| WakeError::ChannelClosed("ack"))?;
        }
        Ok(())
    }
}
