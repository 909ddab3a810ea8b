//! Refresh-only cache of π and ln 2 backed by optional persistent stores.

use std::path::Path;
use std::sync::Arc;

use bigmath_core::{
    ln2_with, BigFloat, ConstantProvider, Execution, MathError, PiAlgorithm, RoundingMode,
    DEFAULT_BBP_THREADS,
};
use bigmath_store::{ConstantStore, FileStore, StoreError};
use parking_lot::RwLock;

/// Extra bits computed before truncating a constant to the requested precision.
const GUARD_BITS: i64 = 32;

/// A constant kept by [`ConstantCache`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Constant {
    Pi,
    Ln2,
}

impl Constant {
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Pi => "pi",
            Self::Ln2 => "ln2",
        }
    }
}

/// A cached value tagged with the precision it is known to.
#[derive(Debug, Clone)]
struct Entry {
    value: BigFloat,
    precision: i64,
}

/// Slot of one constant: the in-memory entry and where it is persisted.
struct Slot {
    entry: RwLock<Option<Entry>>,
    store: Option<Arc<dyn ConstantStore>>,
}

impl Slot {
    fn new(store: Option<Arc<dyn ConstantStore>>) -> Self {
        Self {
            entry: RwLock::new(None),
            store,
        }
    }

    fn lookup(&self, precision: i64) -> Option<BigFloat> {
        self.entry
            .read()
            .as_ref()
            .filter(|entry| entry.precision >= precision)
            .map(|entry| entry.value.round(precision, RoundingMode::Truncate))
    }

    /// Keep `value` unless the cache already holds something at least as precise.
    fn offer(&self, value: &BigFloat, precision: i64) -> bool {
        let mut entry = self.entry.write();
        if entry.as_ref().is_some_and(|current| current.precision >= precision) {
            return false;
        }
        *entry = Some(Entry {
            value: value.clone(),
            precision,
        });
        true
    }
}

/// In-memory cache of π and ln 2.
///
/// Values are truncated, so a shorter request served from a longer entry
/// matches a fresh computation. Each entry only ever moves to a higher
/// precision. A miss consults the
/// constant's store first and then computes; computed values are written
/// back when the store holds something less precise. No lock is held while
/// computing, so concurrent misses may compute the same value twice.
pub struct ConstantCache {
    pi: Slot,
    ln2: Slot,
    pi_algorithm: PiAlgorithm,
    bbp_threads: usize,
}

impl ConstantCache {
    /// Cache without persistence.
    #[must_use]
    pub fn new(pi_algorithm: PiAlgorithm, bbp_threads: usize) -> Self {
        Self {
            pi: Slot::new(None),
            ln2: Slot::new(None),
            pi_algorithm,
            bbp_threads: if bbp_threads == 0 {
                DEFAULT_BBP_THREADS
            } else {
                bbp_threads
            },
        }
    }

    /// Attach stores for π and ln 2.
    #[must_use]
    pub fn with_stores(
        mut self,
        pi: Arc<dyn ConstantStore>,
        ln2: Arc<dyn ConstantStore>,
    ) -> Self {
        self.pi.store = Some(pi);
        self.ln2.store = Some(ln2);
        self
    }

    /// Persist both constants as files inside `dir`.
    #[must_use]
    pub fn with_file_stores(self, dir: &Path) -> Self {
        self.with_stores(Arc::new(FileStore::pi(dir)), Arc::new(FileStore::ln2(dir)))
    }

    #[must_use]
    pub fn pi_algorithm(&self) -> PiAlgorithm {
        self.pi_algorithm
    }

    fn slot(&self, constant: Constant) -> &Slot {
        match constant {
            Constant::Pi => &self.pi,
            Constant::Ln2 => &self.ln2,
        }
    }

    /// Precision the in-memory entry is known to, if any.
    #[must_use]
    pub fn cached_precision(&self, constant: Constant) -> Option<i64> {
        self.slot(constant).entry.read().as_ref().map(|entry| entry.precision)
    }

    /// Drop the in-memory entries; stores are left untouched.
    pub fn clear(&self) {
        *self.pi.entry.write() = None;
        *self.ln2.entry.write() = None;
    }

    /// `constant` with `precision` fractional bits, from memory, the store,
    /// or a fresh computation, in that order.
    pub fn get(
        &self,
        constant: Constant,
        precision: i64,
        execution: Execution,
    ) -> Result<BigFloat, MathError> {
        let slot = self.slot(constant);
        if let Some(value) = slot.lookup(precision) {
            tracing::debug!(constant = constant.name(), precision, "constant cache hit");
            return Ok(value);
        }
        if let Some(value) = self.load(constant, precision) {
            slot.offer(&value, precision);
            return Ok(value);
        }
        self.recompute(constant, precision, execution)
    }

    /// Compute `constant` afresh, bypassing memory and store, then refresh
    /// both if the result is more precise than what they hold.
    pub fn recompute(
        &self,
        constant: Constant,
        precision: i64,
        execution: Execution,
    ) -> Result<BigFloat, MathError> {
        tracing::debug!(constant = constant.name(), precision, "computing constant");
        let work = match (constant, self.pi_algorithm) {
            // each quadrature bit doubles the work
            (Constant::Pi, PiAlgorithm::Quadrature) => precision,
            _ => precision + GUARD_BITS,
        };
        let value = match constant {
            Constant::Pi => self.pi_algorithm.compute(work, execution, self.bbp_threads)?,
            Constant::Ln2 => ln2_with(work, execution, self)?,
        }
        .round(precision, RoundingMode::Truncate);

        let slot = self.slot(constant);
        if slot.offer(&value, precision) {
            tracing::debug!(constant = constant.name(), precision, "constant cache refreshed");
        }
        self.save(constant, &value);
        Ok(value)
    }

    fn load(&self, constant: Constant, precision: i64) -> Option<BigFloat> {
        let store = self.slot(constant).store.as_ref()?;
        match store.load_constant(precision) {
            Ok(value) => {
                tracing::debug!(constant = constant.name(), precision, "constant loaded from store");
                Some(value)
            }
            Err(StoreError::NotFound) => None,
            Err(e) => {
                tracing::debug!(constant = constant.name(), error = %e, "unreadable stored constant, recomputing");
                None
            }
        }
    }

    fn save(&self, constant: Constant, value: &BigFloat) {
        let Some(store) = self.slot(constant).store.as_ref() else {
            return;
        };
        if store
            .stored_precision()
            .is_some_and(|stored| stored >= value.exponent())
        {
            return;
        }
        if let Err(e) = store.save_constant(value) {
            tracing::warn!(constant = constant.name(), error = %e, "failed to persist constant");
        }
    }
}

impl Default for ConstantCache {
    fn default() -> Self {
        Self::new(PiAlgorithm::default(), DEFAULT_BBP_THREADS)
    }
}

impl std::fmt::Debug for ConstantCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConstantCache")
            .field("pi_algorithm", &self.pi_algorithm)
            .field("pi_precision", &self.cached_precision(Constant::Pi))
            .field("ln2_precision", &self.cached_precision(Constant::Ln2))
            .field("persistent", &self.pi.store.is_some())
            .finish_non_exhaustive()
    }
}

impl ConstantProvider for ConstantCache {
    fn pi(&self, precision: i64, execution: Execution) -> Result<BigFloat, MathError> {
        self.get(Constant::Pi, precision, execution)
    }

    fn ln2(&self, precision: i64, execution: Execution) -> Result<BigFloat, MathError> {
        self.get(Constant::Ln2, precision, execution)
    }
}
