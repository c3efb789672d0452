//! A small config-builder layered over `Sketch::new`, in the spirit of the
//! validated-at-construction `Settings` this crate already carries — lets
//! callers set only the fields they care about and defer the rest to
//! sensible defaults.

use crate::{HllError, Sketch};

#[derive(Clone, Debug)]
pub struct SketchBuilder {
    p: u32,
    seed: u32,
    sparse: bool,
    max_sparse_len: Option<usize>,
}

impl SketchBuilder {
    pub(crate) fn new(p: u32) -> Self {
        Self {
            p,
            seed: 0,
            sparse: false,
            max_sparse_len: None,
        }
    }

    pub fn seed(mut self, seed: u32) -> Self {
        self.seed = seed;
        self
    }

    pub fn sparse(mut self, sparse: bool) -> Self {
        self.sparse = sparse;
        self
    }

    pub fn max_sparse_len(mut self, max_sparse_len: usize) -> Self {
        self.max_sparse_len = Some(max_sparse_len);
        self
    }

    pub fn build(self) -> Result<Sketch, HllError> {
        Sketch::new(self.p, self.seed, self.sparse, self.max_sparse_len)
    }
}
