//! Validated construction parameters for a [`crate::Sketch`].
//!
//! A small, copyable value computed once at construction time so the hot
//! paths (`add`, `merge`, `cardinality`) never have to re-derive
//! precision-dependent constants.

// minimum and maximum values for the precision parameter `p`
const MINIMUM_P: u32 = 2;
const MAXIMUM_P: u32 = 18;

/// Upper bound on how many pending entries the sparse append buffer
/// accumulates before a flush is forced. `SparseList::add` flushes at
/// whichever is smaller, this constant or the sketch's own
/// `max_sparse_len` (see `sparse.rs`), so a caller-supplied threshold
/// smaller than this constant still gets enforced promptly rather than
/// waiting for the buffer to fill all the way to 128.
pub(crate) const SPARSE_FLUSH_THRESHOLD: usize = 128;

#[derive(Copy, Clone, Debug, PartialEq)]
pub(crate) struct Settings {
    pub(crate) p: u32,
    pub(crate) m: u32,
    pub(crate) seed: u32,
    pub(crate) max_sparse_len: usize,
    /// alpha_m * m^2, the constant numerator factor in the histogram estimator.
    pub(crate) alpha_msquared: f64,
}

impl Settings {
    pub(crate) fn new(
        p: u32,
        seed: u32,
        max_sparse_len: Option<usize>,
    ) -> Result<Self, crate::HllError> {
        if !(MINIMUM_P..=MAXIMUM_P).contains(&p) {
            return Err(crate::HllError::InvalidArgument(format!(
                "p must be between {MINIMUM_P} and {MAXIMUM_P}, got {p}"
            )));
        }

        let m = 1u32 << p;
        let max_sparse_len = max_sparse_len.unwrap_or(m as usize);

        Ok(Self {
            p,
            m,
            seed,
            max_sparse_len,
            alpha_msquared: Self::alpha_m(m) * (m as f64) * (m as f64),
        })
    }

    pub(crate) fn check_compatible(&self, other: &Self) -> Result<(), crate::HllError> {
        if self.p != other.p {
            return Err(crate::HllError::InvalidArgument(format!(
                "cannot merge sketches with different precision ({} vs {})",
                self.p, other.p
            )));
        }
        if self.seed != other.seed {
            return Err(crate::HllError::InvalidArgument(format!(
                "cannot merge sketches with different seeds ({} vs {})",
                self.seed, other.seed
            )));
        }
        Ok(())
    }

    /// The standard HLL alpha constant, with the small-`m` special cases from
    /// the original paper and the asymptotic approximation otherwise.
    fn alpha_m(m: u32) -> f64 {
        let m = m as f64;
        match m as u64 {
            16 => 0.673,
            32 => 0.697,
            64 => 0.709,
            _ => 0.7213 / (1.0 + 1.079 / m),
        }
    }
}
