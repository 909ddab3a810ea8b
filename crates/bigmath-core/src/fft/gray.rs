//! Gray-code enumeration used to walk the twiddle factors of one stage.

/// One index of the walk, with the bit that changed to reach it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GrayStep {
    pub index: usize,
    /// `(bit, now_set)`; `None` for the first index.
    pub toggled: Option<(usize, bool)>,
}

/// Enumerates all `bits`-bit indices so that consecutive ones differ in
/// exactly one bit, starting from zero.
#[derive(Debug, Clone)]
pub struct GrayCode {
    count: usize,
    position: usize,
    index: usize,
}

impl GrayCode {
    #[must_use]
    pub fn new(bits: u32) -> Self {
        Self {
            count: 1 << bits,
            position: 0,
            index: 0,
        }
    }
}

impl Iterator for GrayCode {
    type Item = GrayStep;

    fn next(&mut self) -> Option<GrayStep> {
        if self.position >= self.count {
            return None;
        }
        let step = if self.position == 0 {
            GrayStep {
                index: 0,
                toggled: None,
            }
        } else {
            let bit = self.position.trailing_zeros() as usize;
            self.index ^= 1 << bit;
            GrayStep {
                index: self.index,
                toggled: Some((bit, self.index & (1 << bit) != 0)),
            }
        };
        self.position += 1;
        Some(step)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let left = self.count - self.position;
        (left, Some(left))
    }
}

impl ExactSizeIterator for GrayCode {}
