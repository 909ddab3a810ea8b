//! Single-assignment slots shared between the workers of one computation.
//!
//! Each slot is written exactly once and read any number of times. Readers
//! block until the slot is published or the whole array is aborted, in which
//! case they receive the abort error instead of waiting forever.

use std::sync::Arc;

use parking_lot::{Condvar, Mutex};

use crate::error::MathError;

struct SlotState<T> {
    values: Vec<Option<Arc<T>>>,
    failure: Option<MathError>,
}

/// Fixed-size array of write-once values with blocking reads.
pub struct SlotArray<T> {
    state: Mutex<SlotState<T>>,
    published: Condvar,
}

impl<T> SlotArray<T> {
    #[must_use]
    pub fn new(len: usize) -> Self {
        Self {
            state: Mutex::new(SlotState {
                values: (0..len).map(|_| None).collect(),
                failure: None,
            }),
            published: Condvar::new(),
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.state.lock().values.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Publish `value` into slot `index` and wake every waiter.
    ///
    /// Publishing twice into the same slot is an `Argument` error.
    pub fn publish(&self, index: usize, value: T) -> Result<Arc<T>, MathError> {
        let mut state = self.state.lock();
        let slot = state
            .values
            .get_mut(index)
            .ok_or_else(|| MathError::argument(format!("slot {index} out of range")))?;
        if slot.is_some() {
            return Err(MathError::argument(format!("slot {index} already published")));
        }
        let value = Arc::new(value);
        *slot = Some(Arc::clone(&value));
        drop(state);
        self.published.notify_all();
        Ok(value)
    }

    /// Block until slot `index` is published.
    pub fn wait(&self, index: usize) -> Result<Arc<T>, MathError> {
        let mut state = self.state.lock();
        loop {
            if let Some(err) = &state.failure {
                return Err(err.clone());
            }
            let ready = state
                .values
                .get(index)
                .ok_or_else(|| MathError::argument(format!("slot {index} out of range")))?
                .clone();
            if let Some(value) = ready {
                return Ok(value);
            }
            self.published.wait(&mut state);
        }
    }

    /// Block until at least one of `pending` is published; return all of
    /// them that are.
    pub fn wait_any(&self, pending: &[usize]) -> Result<Vec<(usize, Arc<T>)>, MathError> {
        let mut state = self.state.lock();
        loop {
            if let Some(err) = &state.failure {
                return Err(err.clone());
            }
            let ready: Vec<(usize, Arc<T>)> = pending
                .iter()
                .filter_map(|&index| {
                    state
                        .values
                        .get(index)
                        .and_then(Option::as_ref)
                        .map(|value| (index, Arc::clone(value)))
                })
                .collect();
            if !ready.is_empty() || pending.is_empty() {
                return Ok(ready);
            }
            self.published.wait(&mut state);
        }
    }

    /// Current value of slot `index`, without blocking.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<Arc<T>> {
        self.state.lock().values.get(index).cloned().flatten()
    }

    /// Fail the computation: every current and future waiter gets `err`.
    /// Only the first abort is kept.
    pub fn abort(&self, err: MathError) {
        let mut state = self.state.lock();
        if state.failure.is_none() {
            state.failure = Some(err);
        }
        drop(state);
        self.published.notify_all();
    }
}

/// Aborts the slot array if the owning thread unwinds.
pub(crate) struct AbortOnPanic<'a, T> {
    slots: &'a SlotArray<T>,
    name: &'static str,
}

impl<'a, T> AbortOnPanic<'a, T> {
    pub(crate) fn new(slots: &'a SlotArray<T>, name: &'static str) -> Self {
        Self { slots, name }
    }
}

impl<T> Drop for AbortOnPanic<'_, T> {
    fn drop(&mut self) {
        if std::thread::panicking() {
            self.slots
                .abort(MathError::Worker(format!("{} panicked", self.name)));
        }
    }
}
