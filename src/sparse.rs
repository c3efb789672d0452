//! Sparse representation: a sorted, deduplicated list of 32-bit encoded
//! `(index, rank)` entries plus a small unsorted append buffer.
//!
//! Each entry packs `index` in the high bits and `rank` in the low 6 bits,
//! so numeric ordering of the raw `u32` already sorts by index first and
//! rank second — collapsing duplicate indices during a flush is just "keep
//! the last entry in each run", with no separate comparator needed.

use crate::bits::REG_WIDTH;
use crate::dense::DenseRegisters;
use crate::settings::SPARSE_FLUSH_THRESHOLD;

const RANK_MASK: u32 = (1 << REG_WIDTH) - 1;

#[derive(Clone, Debug, PartialEq)]
pub(crate) struct SparseList {
    max_sparse_len: usize,
    sorted: Vec<u32>,
    pending: Vec<u32>,
}

fn encode(index: u32, rank: u8) -> u32 {
    (index << REG_WIDTH) | (rank as u32 & RANK_MASK)
}

fn decode(entry: u32) -> (u32, u8) {
    (entry >> REG_WIDTH, (entry & RANK_MASK) as u8)
}

/// Merges two index-sorted, rank-ascending-within-index entry lists and
/// collapses duplicate indices to the entry with the largest rank.
fn merge_collapse(a: &[u32], b: &[u32]) -> Vec<u32> {
    let mut merged = Vec::with_capacity(a.len() + b.len());
    let (mut i, mut j) = (0, 0);
    while i < a.len() && j < b.len() {
        if a[i] <= b[j] {
            merged.push(a[i]);
            i += 1;
        } else {
            merged.push(b[j]);
            j += 1;
        }
    }
    merged.extend_from_slice(&a[i..]);
    merged.extend_from_slice(&b[j..]);

    let mut out: Vec<u32> = Vec::with_capacity(merged.len());
    for entry in merged {
        let index = entry >> REG_WIDTH;
        match out.last() {
            Some(&last) if (last >> REG_WIDTH) == index => {
                *out.last_mut().unwrap() = entry;
            }
            _ => out.push(entry),
        }
    }
    out
}

impl SparseList {
    pub(crate) fn new(max_sparse_len: usize) -> Self {
        Self {
            max_sparse_len,
            sorted: Vec::new(),
            pending: Vec::new(),
        }
    }

    /// Appends an entry to the unsorted buffer, flushing it into the sorted
    /// backbone once the buffer grows past `SPARSE_FLUSH_THRESHOLD` entries
    /// — or past `max_sparse_len`, whichever is smaller, so a small
    /// caller-supplied threshold still gets checked promptly instead of
    /// waiting for the fixed buffer cap. Returns whether a flush happened,
    /// so the caller can check the promotion threshold only when the sorted
    /// length actually changed.
    pub(crate) fn add(&mut self, index: u32, rank: u8) -> bool {
        self.pending.push(encode(index, rank));
        let flush_at = self.max_sparse_len.min(SPARSE_FLUSH_THRESHOLD);
        if self.pending.len() > flush_at {
            self.flush();
            true
        } else {
            false
        }
    }

    pub(crate) fn flush(&mut self) {
        if self.pending.is_empty() {
            return;
        }
        self.pending.sort_unstable();
        self.sorted = merge_collapse(&self.sorted, &self.pending);
        self.pending.clear();
        tracing::trace!(len = self.sorted.len(), "flushed sparse append buffer");
    }

    /// Length of the sorted backbone after a flush; the caller is
    /// responsible for flushing first if an exact count is required.
    pub(crate) fn len(&self) -> usize {
        self.sorted.len()
    }

    pub(crate) fn exceeds_threshold(&self) -> bool {
        self.sorted.len() > self.max_sparse_len
    }

    /// Returns `(index, rank)` entries after folding in the pending buffer,
    /// without mutating `self` — used by read-only union dispatch.
    pub(crate) fn flushed_entries(&self) -> Vec<u32> {
        if self.pending.is_empty() {
            return self.sorted.clone();
        }
        let mut pending = self.pending.clone();
        pending.sort_unstable();
        merge_collapse(&self.sorted, &pending)
    }

    pub(crate) fn get(&self, index: u32) -> u8 {
        let lo = encode(index, 0);
        let hi = encode(index, RANK_MASK as u8);

        let mut best = 0u8;
        let start = self.sorted.partition_point(|&e| e < lo);
        if start < self.sorted.len() && self.sorted[start] <= hi {
            best = decode(self.sorted[start]).1;
        }
        for &e in &self.pending {
            if (e >> REG_WIDTH) == index {
                best = best.max(decode(e).1);
            }
        }
        best
    }

    pub(crate) fn to_dense(&self, m: u32) -> DenseRegisters {
        let mut dense = DenseRegisters::new(m);
        for entry in self.flushed_entries() {
            let (index, rank) = decode(entry);
            dense.set_max(index, rank);
        }
        dense
    }

    /// `(index, rank)` pairs after folding in the pending buffer, without
    /// mutating `self`.
    pub(crate) fn decoded_entries(&self) -> impl Iterator<Item = (u32, u8)> {
        self.flushed_entries().into_iter().map(decode)
    }

    pub(crate) fn union_sparse(&mut self, other: &SparseList) {
        self.flush();
        let other_entries = other.flushed_entries();
        self.sorted = merge_collapse(&self.sorted, &other_entries);
    }

    pub(crate) fn histogram(&self, m: u32) -> [u32; 65] {
        let mut h = [0u32; 65];
        let mut nonzero = 0u32;
        for entry in self.flushed_entries() {
            let (_, rank) = decode(entry);
            h[rank as usize] += 1;
            nonzero += 1;
        }
        h[0] += m - nonzero;
        h
    }

    pub(crate) fn to_bytes(&self) -> Vec<u8> {
        let entries = self.flushed_entries();
        let mut out = Vec::with_capacity(4 + entries.len() * 4);
        out.extend_from_slice(&(entries.len() as u32).to_le_bytes());
        for entry in entries {
            out.extend_from_slice(&entry.to_le_bytes());
        }
        out
    }

    pub(crate) fn from_sorted_entries(max_sparse_len: usize, sorted: Vec<u32>) -> Self {
        Self {
            max_sparse_len,
            sorted,
            pending: Vec::new(),
        }
    }
}
