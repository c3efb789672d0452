//! The sketch core: mode state, the `add` fast path, promotion policy, and
//! union dispatch. This is the file that ties together `dense`, `sparse`,
//! `estimator`, `hash`, and `codec`.

use crate::builder::SketchBuilder;
use crate::dense::DenseRegisters;
use crate::error::HllError;
use crate::settings::Settings;
use crate::sparse::SparseList;
use crate::{codec, estimator, hash};

#[derive(Clone, Debug, PartialEq)]
pub(crate) enum Mode {
    Sparse(SparseList),
    Dense(DenseRegisters),
}

/// A HyperLogLog cardinality sketch.
///
/// Construct with [`Sketch::new`] or [`Sketch::builder`]. A sketch is a
/// single-owner mutable value: it is not thread-safe, and callers that need
/// concurrent updates must externally serialise or shard.
#[derive(Clone, Debug, PartialEq)]
pub struct Sketch {
    pub(crate) settings: Settings,
    pub(crate) mode: Mode,
}

impl Sketch {
    /// Builds a sketch with `p ∈ [2, 18]`, a hash seed, an initial
    /// representation, and an optional sparse→dense promotion threshold
    /// (defaults to `m`).
    pub fn new(
        p: u32,
        seed: u32,
        sparse: bool,
        max_sparse_len: Option<usize>,
    ) -> Result<Self, HllError> {
        let settings = Settings::new(p, seed, max_sparse_len)?;
        let mode = if sparse {
            Mode::Sparse(SparseList::new(settings.max_sparse_len))
        } else {
            Mode::Dense(DenseRegisters::new(settings.m))
        };
        Ok(Self { settings, mode })
    }

    pub fn builder(p: u32) -> SketchBuilder {
        SketchBuilder::new(p)
    }

    pub fn size(&self) -> usize {
        self.settings.m as usize
    }

    pub fn seed(&self) -> u32 {
        self.settings.seed
    }

    /// Exposes the sketch's seeded hash, for testing.
    pub fn hash(&self, bytes: &[u8]) -> u64 {
        hash::hash64(self.settings.seed, bytes)
    }

    /// Adds an opaque byte value, returning whether the effective register
    /// grew. In sparse mode this is always `false`: detecting a true change
    /// would require a lookup the fast path is built to avoid.
    pub fn add(&mut self, bytes: &[u8]) -> bool {
        let h = hash::hash64(self.settings.seed, bytes);
        let (index, rank) = self.derive_index_rank(h);

        match &mut self.mode {
            Mode::Dense(dense) => rank > dense.set_max(index, rank),
            Mode::Sparse(sparse) => {
                let flushed = sparse.add(index, rank);
                if flushed && sparse.exceeds_threshold() {
                    self.promote();
                }
                false
            }
        }
    }

    fn derive_index_rank(&self, h: u64) -> (u32, u8) {
        let p = self.settings.p;
        let index = (h >> (64 - p)) as u32;
        let w = (h << p) | (1u64 << (p - 1));
        let rank = (1 + w.leading_zeros()).min(63) as u8;
        (index, rank)
    }

    fn promote(&mut self) {
        if let Mode::Sparse(sparse) = &mut self.mode {
            sparse.flush();
            tracing::debug!(
                p = self.settings.p,
                len = sparse.len(),
                "promoting sparse sketch to dense"
            );
            self.mode = Mode::Dense(sparse.to_dense(self.settings.m));
        }
    }

    pub fn histogram(&self) -> [u32; 65] {
        match &self.mode {
            Mode::Dense(dense) => dense.histogram(),
            Mode::Sparse(sparse) => sparse.histogram(self.settings.m),
        }
    }

    pub fn cardinality(&self) -> f64 {
        estimator::estimate(
            self.settings.p,
            self.settings.m,
            self.settings.alpha_msquared,
            &self.histogram(),
        )
    }

    pub fn get_register(&self, index: u32) -> Result<u8, HllError> {
        self.check_bounds(index)?;
        Ok(match &self.mode {
            Mode::Dense(dense) => dense.get(index),
            Mode::Sparse(sparse) => sparse.get(index),
        })
    }

    /// Unconditionally sets register `index` to `value`. Forces promotion to
    /// dense first if the sketch is currently sparse, since a single-register
    /// overwrite is meaningful only against the full register array. A
    /// testing/codec aid, not part of the add/merge data plane.
    pub fn set_register(&mut self, index: u32, value: u8) -> Result<(), HllError> {
        self.check_bounds(index)?;
        if value > 63 {
            return Err(HllError::InvalidArgument(format!(
                "register value {value} exceeds the 6-bit cell width"
            )));
        }
        if matches!(self.mode, Mode::Sparse(_)) {
            self.promote();
        }
        if let Mode::Dense(dense) = &mut self.mode {
            dense.bulk_set(index, value);
        }
        Ok(())
    }

    fn check_bounds(&self, index: u32) -> Result<(), HllError> {
        if index >= self.settings.m {
            return Err(HllError::OutOfBounds {
                index,
                size: self.settings.m,
            });
        }
        Ok(())
    }

    /// Unions `other` into `self` in place. Both sketches must share `p` and
    /// `seed`. Commutative and associative over the equivalence classes
    /// observed via `cardinality()` and per-register equality.
    pub fn merge(&mut self, other: &Sketch) -> Result<(), HllError> {
        self.settings.check_compatible(&other.settings)?;

        match &other.mode {
            Mode::Dense(rhs) => {
                if matches!(self.mode, Mode::Sparse(_)) {
                    self.promote();
                }
                if let Mode::Dense(lhs) = &mut self.mode {
                    lhs.union_dense(rhs);
                }
            }
            Mode::Sparse(rhs) => match &mut self.mode {
                Mode::Dense(lhs) => {
                    for (index, rank) in rhs.decoded_entries() {
                        lhs.set_max(index, rank);
                    }
                }
                Mode::Sparse(lhs) => {
                    lhs.union_sparse(rhs);
                    if lhs.exceeds_threshold() {
                        self.promote();
                    }
                }
            },
        }

        Ok(())
    }

    pub fn encode(&self) -> Vec<u8> {
        codec::encode(self)
    }

    pub fn decode(bytes: &[u8]) -> Result<Sketch, HllError> {
        codec::decode(bytes)
    }
}
