use thiserror::Error;

/// Errors surfaced at the operation boundary. A failed operation never
/// leaves the sketch partially mutated.
#[derive(Clone, Debug, Error, PartialEq)]
pub enum HllError {
    /// A constructor or mutation parameter was out of its valid range, or two
    /// sketches being merged have mismatched precision or seed.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// A register index passed to `get_register`/`set_register` was outside
    /// `[0, size())`.
    #[error("register index {index} out of bounds for size {size}")]
    OutOfBounds { index: u32, size: u32 },

    /// Serialised bytes failed validation on load.
    #[error("decode error: {0}")]
    DecodeError(String),
}
