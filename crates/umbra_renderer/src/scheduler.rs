//! Mutex-guarded work queue drained by a fixed set of worker threads.
//!
//! Every worker runs a pull loop: take one unit under the lock, process it
//! outside the lock, then record the completion under the lock again. Load
//! balances dynamically without work stealing. Completions are forwarded over
//! a channel to the calling thread, which alone runs the progress reporter, so
//! a slow reporter never holds up the queue.

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::mpsc::{channel, Sender};
use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::error::{RenderError, RenderResult};

struct PoolState<T> {
    queue: Vec<T>,
    remaining: usize,
    failure: Option<String>,
}

/// A fixed batch of independent work units.
pub struct WorkPool<T> {
    units: Vec<T>,
}

impl<T: Send> WorkPool<T> {
    /// Units are handed out from the back of `units`.
    pub fn new(units: Vec<T>) -> Self {
        Self { units }
    }

    pub fn len(&self) -> usize {
        self.units.len()
    }

    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }

    /// Process every unit exactly once on `threads` workers.
    ///
    /// `reporter` runs on the calling thread with the number of units still
    /// unfinished. Counts arriving after a smaller one are dropped, so it sees
    /// a strictly decreasing sequence ending at zero; with one worker that is
    /// every count. A panicking unit stops the pool: queued units are
    /// discarded and the panic message is returned as
    /// [`RenderError::WorkerPanicked`].
    pub fn run<W, R>(self, threads: usize, worker: W, mut reporter: R) -> RenderResult<()>
    where
        W: Fn(T) + Sync,
        R: FnMut(usize),
    {
        if threads == 0 {
            return Err(RenderError::InvalidConfig(
                "thread count must be at least 1".to_string(),
            ));
        }

        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .thread_name(|i| format!("umbra-worker-{}", i))
            .build()?;

        let state = Mutex::new(PoolState {
            remaining: self.units.len(),
            queue: self.units,
            failure: None,
        });
        let (tx, rx) = channel();

        pool.in_place_scope(|scope| {
            for _ in 0..threads {
                let tx = tx.clone();
                let state = &state;
                let worker = &worker;
                scope.spawn(move |_| pull_loop(state, worker, tx));
            }
            drop(tx);

            // Ends once every worker has returned and dropped its sender
            let mut last = usize::MAX;
            for remaining in rx {
                if remaining < last {
                    last = remaining;
                    reporter(remaining);
                }
            }
        });

        let state = state.into_inner().unwrap_or_else(PoisonError::into_inner);
        match state.failure {
            Some(message) => Err(RenderError::WorkerPanicked(message)),
            None => Ok(()),
        }
    }
}

fn lock<T>(state: &Mutex<PoolState<T>>) -> MutexGuard<'_, PoolState<T>> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}

fn pull_loop<T, W: Fn(T)>(state: &Mutex<PoolState<T>>, worker: &W, progress: Sender<usize>) {
    loop {
        let unit = {
            let mut guard = lock(state);
            if guard.failure.is_some() {
                return;
            }
            match guard.queue.pop() {
                Some(unit) => unit,
                None => return,
            }
        };

        let outcome = panic::catch_unwind(AssertUnwindSafe(|| worker(unit)));

        let remaining = {
            let mut guard = lock(state);
            match outcome {
                Ok(()) => {
                    guard.remaining -= 1;
                    guard.remaining
                }
                Err(payload) => {
                    let message = panic_message(payload.as_ref());
                    log::error!("Worker panicked: {}", message);
                    guard.failure.get_or_insert(message);
                    guard.queue.clear();
                    return;
                }
            }
        };

        // The receiver outlives every worker
        let _ = progress.send(remaining);
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic payload".to_string()
    }
}
