//! The hash function is treated as a black-box 64-bit PRF seeded with a
//! 32-bit value; only its output width and uniformity matter to the sketch
//! core. XxHash64 is used because it is fast, seedable, and well distributed
//! for this kind of bucketing/leading-zero workload.

use std::hash::Hasher;
use twox_hash::XxHash64;

pub(crate) fn hash64(seed: u32, bytes: &[u8]) -> u64 {
    let mut hasher = XxHash64::with_seed(seed as u64);
    hasher.write(bytes);
    hasher.finish()
}
