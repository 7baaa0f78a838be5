//! Fake Quantization for Quantization-Aware Training (QAT)
//!
//! Fake quantization simulates the effects of quantization during training:
//! - Forward: clip to the scale range, quantize to `2^(bit_length-1) - 1`
//!   positive levels, dequantize back to floating point
//! - Backward: Straight-Through Estimator (STE) passes gradients unchanged
//!
//! The quantization scale is either the abs-max of the current input or a
//! bias-corrected exponential moving average of abs-max values across
//! training steps. Moving-average state is an explicit `(accum, state)`
//! pair the caller threads through successive calls.

mod absmax;
mod config;
mod moving_average;
mod ops;
mod transform;


// Re-export all public types
pub use absmax::find_abs_max;
pub use config::{QuantConfig, RoundType};
pub use moving_average::MovingAverageState;
pub use ops::{
    fake_quantize_abs_max, quantize_dequantize_abs_max,
    quantize_dequantize_moving_average_abs_max, ste_backward, straight_through_backward,
    straight_through_backward_clamped, track_moving_average_scale, AbsMaxForward,
    MovingAverageForward, ScaleTrack,
};
pub use transform::clip_quantize_dequantize;
