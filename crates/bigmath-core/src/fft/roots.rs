//! Lazily extended table of principal roots of unity.

use parking_lot::RwLock;

use crate::complex::ComplexNumber;
use crate::error::MathError;

/// `ws[d] = e^(2πi / 2^(d+1))`: `ws[0] = -1`, `ws[1] = i`, each further
/// entry the half-angle root of the previous one.
///
/// Shared by every transform of one engine. Extension is monotonic and
/// all-or-nothing: readers see either the old table or the fully extended
/// one.
pub struct RootTable {
    precision: i64,
    roots: RwLock<Vec<ComplexNumber>>,
}

impl RootTable {
    #[must_use]
    pub fn new(precision: i64) -> Self {
        Self {
            precision,
            roots: RwLock::new(vec![
                ComplexNumber::from_i64(-1, 0),
                ComplexNumber::from_i64(0, 1),
            ]),
        }
    }

    /// Number of roots currently in the table.
    #[must_use]
    pub fn depth(&self) -> usize {
        self.roots.read().len()
    }

    /// Make sure the table holds at least `depth` roots.
    pub fn ensure_depth(&self, depth: usize) -> Result<(), MathError> {
        if self.roots.read().len() >= depth {
            return Ok(());
        }
        let mut roots = self.roots.write();
        if roots.len() >= depth {
            return Ok(());
        }
        let mut fresh = Vec::with_capacity(depth - roots.len());
        let mut last = roots[roots.len() - 1].clone();
        while roots.len() + fresh.len() < depth {
            last = last.half_angle(self.precision)?;
            fresh.push(last.clone());
        }
        tracing::trace!(from = roots.len(), to = depth, "extending root table");
        roots.extend(fresh);
        Ok(())
    }

    /// Copy of the first `depth` roots, extending the table if needed.
    pub fn snapshot(&self, depth: usize) -> Result<Vec<ComplexNumber>, MathError> {
        self.ensure_depth(depth)?;
        Ok(self.roots.read()[..depth].to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::float::BigFloat;

    fn close(x: &BigFloat, y: &BigFloat, bits: i64) -> bool {
        (x - y).floor_log2().map_or(true, |log| log < -bits)
    }

    #[test]
    fn starts_with_minus_one_and_i() {
        let table = RootTable::new(64);
        assert_eq!(table.depth(), 2);
        let roots = table.snapshot(2).unwrap();
        assert_eq!(roots[0], ComplexNumber::from_i64(-1, 0));
        assert_eq!(roots[1], ComplexNumber::from_i64(0, 1));
    }

    #[test]
    fn extension_squares_back() {
        let table = RootTable::new(80);
        let roots = table.snapshot(6).unwrap();
        assert_eq!(table.depth(), 6);
        for d in 2..6 {
            let square = (&roots[d] * &roots[d]).round(80);
            assert!(close(square.real(), roots[d - 1].real(), 74), "depth {d}");
            assert!(close(square.imaginary(), roots[d - 1].imaginary(), 74), "depth {d}");
        }
    }

    #[test]
    fn extension_is_monotonic() {
        let table = RootTable::new(32);
        table.ensure_depth(5).unwrap();
        table.ensure_depth(3).unwrap();
        assert_eq!(table.depth(), 5);
    }

    #[test]
    fn concurrent_extension() {
        let table = RootTable::new(48);
        std::thread::scope(|scope| {
            for depth in [4, 7, 5, 7] {
                let table = &table;
                scope.spawn(move || table.ensure_depth(depth).unwrap());
            }
        });
        assert_eq!(table.depth(), 7);
        let roots = table.snapshot(7).unwrap();
        // e^(2πi/8) has equal parts
        assert!(close(roots[2].real(), roots[2].imaginary(), 46));
    }
}
