//! Simulated low-bit quantization for quantization-aware training (QAT)
//!
//! Fake quantization runs values through a clip → round → dequantize
//! transform at a given bit width, so a floating-point model experiences
//! the noise of a deployed integer model while staying differentiable:
//! - Forward: estimate a scale (abs-max or moving-average abs-max), then
//!   quantize → dequantize (values snap to the quantization grid)
//! - Backward: Straight-Through Estimator (STE) passes gradients unchanged
//!
//! Per-tensor moving-average state is an explicit value pair the caller
//! threads through its training loop; nothing is hidden in globals.

pub mod error;
pub mod fake_quantize;
pub mod tensor;
pub mod trace;

pub use error::{QuantError, Result};
pub use fake_quantize::{
    clip_quantize_dequantize, fake_quantize_abs_max, find_abs_max,
    quantize_dequantize_abs_max, quantize_dequantize_moving_average_abs_max, ste_backward,
    straight_through_backward, straight_through_backward_clamped, track_moving_average_scale,
    AbsMaxForward, MovingAverageForward, MovingAverageState, QuantConfig, RoundType, ScaleTrack,
};
pub use tensor::Tensor;
