//! Error types for the quantization simulation kernels.
//!
//! All errors are raised synchronously at call entry; the numeric kernels
//! themselves never fail mid-buffer.

use thiserror::Error;

/// Result type for quantization operations
pub type Result<T> = std::result::Result<T, QuantError>;

/// Errors that can occur when invoking a quantization operation
#[derive(Debug, Error, Clone, PartialEq)]
pub enum QuantError {
    /// Bit width the kernels cannot represent (bit_length < 2 would leave
    /// zero positive levels and divide by zero)
    #[error("Invalid bit_length {bit_length}: expected a value in 2..=16")]
    InvalidBitLength { bit_length: usize },

    /// Moving-average decay factor outside the open interval (0, 1)
    #[error("Invalid moving_rate {moving_rate}: expected a finite value in (0, 1)")]
    InvalidMovingRate { moving_rate: f32 },

    /// Backward pass invoked without an input-gradient destination
    #[error("Straight-through backward has no destination for output '{name}'")]
    MissingGradOutput { name: &'static str },
}
