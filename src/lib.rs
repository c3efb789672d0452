//! A HyperLogLog cardinality estimator: a 64-bit-hash sketch with bit-packed
//! dense registers, an adaptive sparse representation for low cardinalities,
//! lossless union, and a versioned byte encoding for persistence/transport.
//!
//! ```
//! use hll_sketch::Sketch;
//!
//! let mut a = Sketch::new(12, 0, false, None).unwrap();
//! a.add(b"alice");
//! a.add(b"bob");
//! a.add(b"alice"); // duplicate, does not raise the estimate
//!
//! let mut b = Sketch::new(12, 0, false, None).unwrap();
//! b.add(b"carol");
//!
//! a.merge(&b).unwrap();
//! // three distinct values in 4096 registers: comfortably in single digits.
//! assert!(a.cardinality() > 0.0 && a.cardinality() < 20.0);
//!
//! let bytes = a.encode();
//! let restored = Sketch::decode(&bytes).unwrap();
//! assert_eq!(a.cardinality(), restored.cardinality());
//! ```
//!
//! Out of scope: the host language binding/CLI, any I/O, and concurrency
//! above single-sketch thread-safety — a `Sketch` is a single-owner mutable
//! value; callers needing concurrent updates must externally serialise or
//! shard.

mod bits;
mod builder;
mod codec;
mod dense;
mod error;
mod estimator;
mod hash;
mod settings;
mod sparse;
mod sketch;

#[cfg(test)]
mod property_test;

pub use builder::SketchBuilder;
pub use error::HllError;
pub use sketch::Sketch;

pub(crate) use sketch::Mode;
