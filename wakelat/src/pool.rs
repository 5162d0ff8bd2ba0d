use log::{debug, info, warn};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use wakelat_common::{Result, SchedulingHint, WakeError};

use crate::sched;

/// Driver-side end of a worker's per-thread state.
///
/// `cancel` must cause the worker's pending blocking receive to return so the
/// worker can exit, even if it is never woken again.
pub trait Cancel {
    fn cancel(&mut self);
}

/// One spawned worker: its thread, whether it has been joined, and the
/// driver's end of its per-thread state.
pub struct WorkerHandle<D> {
    pub index: usize,
    thread: Option<JoinHandle<Result<()>>>,
    dead: bool,
    link: Option<D>,
}

/// Fixed-size set of worker threads, alive for one scenario run.
///
/// Dropping a pool without calling [`WorkerPool::teardown`] cancels and joins
/// every remaining worker.
pub struct WorkerPool<D: Cancel> {
    workers: Vec<WorkerHandle<D>>,
}

impl<D: Cancel> WorkerPool<D> {
    /// Spawn `n` workers.
    ///
    /// For each index, `construct` runs synchronously on the calling thread
    /// before the worker starts and returns the driver's end `D` plus the
    /// worker's state `S`. The worker thread applies `hint` to itself, reports
    /// back, then runs `body(state)`.
    ///
    /// Any failure (construction, thread creation, scheduling policy) cancels
    /// and joins the workers spawned so far and returns the error; a pool is
    /// never handed out short of `n` workers.
    pub fn spawn<A, S, C, B>(
        n: usize,
        arg: &A,
        hint: SchedulingHint,
        mut construct: C,
        body: B,
    ) -> Result<Self>
    where
        C: FnMut(usize, &A) -> Result<(D, S)>,
        S: Send + 'static,
        B: Fn(S) -> Result<()> + Send + Sync + 'static,
    {
        let body = Arc::new(body);
        let mut pool = WorkerPool { workers: Vec::with_capacity(n) };

        for index in 0..n {
            let (link, state) = construct(index, arg)?;
            let (ready_tx, ready_rx) = crossbeam_channel::bounded::<Result<()>>(1);
            let body = Arc::clone(&body);

            let thread = thread::Builder::new()
                .name(format!("wakelat-worker-{index}"))
                .spawn(move || {
                    let applied = sched::apply_to_current_thread(hint);
                    let ok = applied.is_ok();
                    // The spawner is blocked on this receive; it cannot be gone.
                    let _ = ready_tx.send(applied);
                    if !ok {
                        return Ok(());
                    }
                    body(state)
                })
                .map_err(|e| WakeError::SpawnFailed(index, e.to_string()))?;

            let ready = ready_rx.recv().unwrap_or(Err(WakeError::WorkerPanicked(index)));
            pool.workers.push(WorkerHandle {
                index,
                thread: Some(thread),
                dead: false,
                link: Some(link),
            });
            ready?;
            debug!("worker {index} started ({})", hint.policy_name());
        }

        info!("spawned {n} workers");
        Ok(pool)
    }

    pub fn len(&self) -> usize {
        self.workers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.workers.is_empty()
    }

    /// Driver-side ends of all live workers, in spawn order.
    pub fn links(&self) -> impl Iterator<Item = &D> {
        self.workers.iter().filter_map(|w| w.link.as_ref())
    }

    /// Deliver a cancellation request to every worker.
    pub fn cancel_all(&mut self) {
        for link in self.workers.iter_mut().filter_map(|w| w.link.as_mut()) {
            link.cancel();
        }
    }

    /// Join every worker, invoking `destroy(index, link)` as each one is joined.
    ///
    /// Workers are polled with a non-blocking completion check rather than
    /// joined in order, so teardown never waits on one worker while another
    /// has already exited. Workers must have been cancelled first or this
    /// spins until they exit on their own.
    ///
    /// Returns the number of workers joined, or the first worker error.
    pub fn teardown<F>(mut self, mut destroy: F) -> Result<usize>
    where
        F: FnMut(usize, D),
    {
        let mut workers = std::mem::take(&mut self.workers);
        let total = workers.len();
        let mut dead = 0;
        let mut first_err = None;

        while dead < total {
            for worker in workers.iter_mut() {
                if worker.dead {
                    continue;
                }
                if worker.thread.as_ref().is_some_and(|t| !t.is_finished()) {
                    continue;
                }

                worker.dead = true;
                dead += 1;

                let outcome = match worker.thread.take().map(JoinHandle::join) {
                    Some(Ok(result)) => result,
                    Some(Err(_)) => Err(WakeError::WorkerPanicked(worker.index)),
                    None => Ok(()),
                };
                if let Err(e) = outcome {
                    warn!("worker {} exited with error: {e}", worker.index);
                    first_err.get_or_insert(e);
                }

                if let Some(link) = worker.link.take() {
                    destroy(worker.index, link);
                }
            }
            if dead < total {
                thread::yield_now();
            }
        }

        info!("joined {dead} workers");
        match first_err {
            Some(e) => Err(e),
            None => Ok(dead),
        }
    }
}

impl<D: Cancel> Drop for WorkerPool<D> {
    fn drop(&mut self) {
        if self.workers.is_empty() {
            return;
        }
        self.cancel_all();
        for worker in self.workers.drain(..) {
            if let Some(thread) = worker.thread {
                let _ = thread.join();
            }
        }
    }
}
