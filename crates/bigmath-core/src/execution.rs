//! Execution strategy and the helpers that run work sequentially or in
//! parallel.

use std::thread;

use rayon::ThreadPoolBuilder;
use serde::{Deserialize, Serialize};

use crate::error::MathError;
use crate::slots::{AbortOnPanic, SlotArray};

/// Whether an operation may spread its work across threads.
///
/// Both strategies perform the same arithmetic, so they return identical
/// values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Execution {
    #[default]
    Sequential,
    Threaded,
}

impl Execution {
    #[must_use]
    pub fn from_flag(threaded: bool) -> Self {
        if threaded {
            Self::Threaded
        } else {
            Self::Sequential
        }
    }

    #[must_use]
    pub fn is_threaded(self) -> bool {
        self == Self::Threaded
    }
}

/// Run two independent closures, concurrently under [`Execution::Threaded`].
pub fn join<A, B, RA, RB>(execution: Execution, a: A, b: B) -> (RA, RB)
where
    A: FnOnce() -> RA + Send,
    B: FnOnce() -> RB + Send,
    RA: Send,
    RB: Send,
{
    match execution {
        Execution::Sequential => {
            let ra = a();
            (ra, b())
        }
        Execution::Threaded => rayon::join(a, b),
    }
}

/// Execute tasks in parallel on a dedicated pool of `threads` threads.
///
/// Results come back in task order, or the first error.
pub fn execute_tasks<T, F>(tasks: Vec<F>, threads: usize) -> Result<Vec<T>, MathError>
where
    T: Send,
    F: FnOnce() -> Result<T, MathError> + Send,
{
    let pool = ThreadPoolBuilder::new()
        .num_threads(threads)
        .build()
        .map_err(|e| MathError::Worker(format!("failed to create thread pool: {e}")))?;

    let results: Vec<Result<T, MathError>> = pool.install(|| {
        use rayon::iter::{IntoParallelIterator, ParallelIterator};
        tasks.into_par_iter().map(|task| task()).collect()
    });

    results.into_iter().collect()
}

/// A named worker body for [`run_workers`].
pub(crate) type Task<'a> = Box<dyn FnOnce() -> Result<(), MathError> + Send + 'a>;

/// Run `tasks` on scoped threads while `main` runs on the calling thread.
///
/// The workers communicate through `slots`. Every worker reports its outcome
/// over a result channel; the first failure (or panic) aborts the slot array,
/// which wakes every blocked waiter, and is returned to the caller.
pub(crate) fn run_workers<'a, T, R>(
    slots: &'a SlotArray<T>,
    tasks: Vec<(&'static str, Task<'a>)>,
    main: impl FnOnce() -> Result<R, MathError>,
) -> Result<R, MathError>
where
    T: Send + Sync,
{
    let (sender, receiver) = crossbeam_channel::unbounded();
    thread::scope(|scope| {
        let mut handles = Vec::with_capacity(tasks.len());
        for (name, task) in tasks {
            let sender = sender.clone();
            let handle = scope.spawn(move || {
                let _guard = AbortOnPanic::new(slots, name);
                let outcome = task();
                if let Err(err) = &outcome {
                    slots.abort(err.clone());
                }
                // The receiver outlives every worker.
                let _ = sender.send((name, outcome));
            });
            handles.push((name, handle));
        }
        drop(sender);

        let main_outcome = {
            let _guard = AbortOnPanic::new(slots, "orchestrator");
            main()
        };
        if let Err(err) = &main_outcome {
            slots.abort(err.clone());
        }

        let mut first_error = None;
        for (name, outcome) in receiver.iter() {
            if let Err(err) = outcome {
                tracing::debug!(worker = name, error = %err, "worker failed");
                first_error.get_or_insert(err);
            }
        }
        for (name, handle) in handles {
            if handle.join().is_err() {
                first_error.get_or_insert(MathError::Worker(format!("{name} panicked")));
            }
        }

        let value = main_outcome?;
        match first_error {
            Some(err) => Err(err),
            None => Ok(value),
        }
    })
}
