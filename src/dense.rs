//! Dense representation: a 6-bit-packed register array plus a histogram of
//! register values, maintained as an invariant rather than recomputed on
//! demand (see `cardinality` in `sketch.rs`).

use crate::bits::{calc_position, divide_by_8_round_up, read_reg_bits, write_reg_bits, REG_WIDTH};

#[derive(Clone, Debug, PartialEq)]
pub(crate) struct DenseRegisters {
    m: u32,
    buf: Vec<u8>,
    histogram: [u32; 65],
}

impl DenseRegisters {
    pub(crate) fn new(m: u32) -> Self {
        let cap = divide_by_8_round_up(m * REG_WIDTH as u32) as usize;
        let mut histogram = [0u32; 65];
        histogram[0] = m;

        Self {
            m,
            buf: vec![0; cap],
            histogram,
        }
    }

    pub(crate) fn m(&self) -> u32 {
        self.m
    }

    pub(crate) fn get(&self, reg_num: u32) -> u8 {
        let (idx, pos) = calc_position(reg_num);
        read_reg_bits(&self.buf, idx, pos)
    }

    /// Writes `value` iff it is greater than the current cell value, keeping
    /// the histogram in lock step. Returns the prior value.
    pub(crate) fn set_max(&mut self, reg_num: u32, value: u8) -> u8 {
        let old = self.get(reg_num);
        if value > old {
            let (idx, pos) = calc_position(reg_num);
            write_reg_bits(&mut self.buf, idx, pos, value);
            self.histogram[old as usize] -= 1;
            self.histogram[value as usize] += 1;
        }
        old
    }

    /// Unconditional write, used by codec load and the `set_register` test
    /// aid. Keeps the histogram in sync even when `value` is lower than the
    /// prior cell value.
    pub(crate) fn bulk_set(&mut self, reg_num: u32, value: u8) {
        let old = self.get(reg_num);
        if old != value {
            let (idx, pos) = calc_position(reg_num);
            write_reg_bits(&mut self.buf, idx, pos, value);
            self.histogram[old as usize] -= 1;
            self.histogram[value as usize] += 1;
        }
    }

    pub(crate) fn histogram(&self) -> [u32; 65] {
        self.histogram
    }

    pub(crate) fn iter(&self) -> impl Iterator<Item = (u32, u8)> + '_ {
        (0..self.m).map(move |i| (i, self.get(i)))
    }

    pub(crate) fn union_dense(&mut self, other: &Self) {
        for (reg_num, value) in other.iter() {
            self.set_max(reg_num, value);
        }
    }

    pub(crate) fn to_bytes(&self) -> Vec<u8> {
        self.buf.clone()
    }

    /// Reconstructs a dense array from packed register bytes, rebuilding the
    /// histogram with a single pass rather than trusting a serialised count.
    pub(crate) fn from_bytes(m: u32, buf: &[u8]) -> Self {
        let mut registers = Self {
            m,
            buf: buf.to_vec(),
            histogram: [0u32; 65],
        };
        registers.rebuild_histogram();
        registers
    }

    fn rebuild_histogram(&mut self) {
        self.histogram = [0u32; 65];
        for i in 0..self.m {
            let v = self.get(i);
            self.histogram[v as usize] += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_registers_are_all_zero() {
        let d = DenseRegisters::new(16);
        assert_eq!(d.histogram()[0], 16);
        for i in 0..16 {
            assert_eq!(d.get(i), 0);
        }
    }

    #[test]
    fn set_max_is_monotonic_and_keeps_histogram_in_sync() {
        let mut d = DenseRegisters::new(8);
        assert_eq!(d.set_max(3, 5), 0);
        assert_eq!(d.get(3), 5);
        assert_eq!(d.set_max(3, 2), 5); // no-op, returns prior value
        assert_eq!(d.get(3), 5);
        assert_eq!(d.set_max(3, 9), 5);
        assert_eq!(d.get(3), 9);

        let h = d.histogram();
        assert_eq!(h.iter().sum::<u32>(), 8);
        assert_eq!(h[9], 1);
        assert_eq!(h[0], 7);
    }

    #[test]
    fn bulk_set_can_lower_a_cell_and_rebalances_histogram() {
        let mut d = DenseRegisters::new(4);
        d.set_max(0, 40);
        d.bulk_set(0, 3);
        assert_eq!(d.get(0), 3);
        assert_eq!(d.histogram()[3], 1);
        assert_eq!(d.histogram()[40], 0);
    }

    #[test]
    fn round_trips_through_bytes_with_histogram_rebuilt() {
        let mut d = DenseRegisters::new(20);
        for i in 0..20 {
            d.set_max(i, ((i * 7) % 64) as u8);
        }
        let bytes = d.to_bytes();
        let restored = DenseRegisters::from_bytes(20, &bytes);

        for i in 0..20 {
            assert_eq!(d.get(i), restored.get(i));
        }
        assert_eq!(d.histogram(), restored.histogram());
    }
}
