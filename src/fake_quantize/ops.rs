//! Forward and backward entry points for simulated quantization.
//!
//! Each operation is a pure function: buffers in, buffers out. The
//! moving-average variants additionally thread the caller-owned
//! `(accum, state)` pair through the call. Configuration is validated at
//! entry; the numeric kernels never fail mid-buffer.

use crate::error::{QuantError, Result};
use crate::tensor::Tensor;
use crate::trace::{TraceStep, TRACER};

use super::absmax::find_abs_max;
use super::config::QuantConfig;
use super::moving_average::MovingAverageState;
use super::transform::clip_quantize_dequantize;

/// Output of the one-shot abs-max forward pass
#[derive(Clone, Debug)]
pub struct AbsMaxForward {
    /// Quantize-dequantized values
    pub out: Tensor,
    /// Abs-max scale observed on this input
    pub out_scale: f32,
}

/// Output of the moving-average abs-max forward pass
#[derive(Clone, Debug)]
pub struct MovingAverageForward {
    /// Quantize-dequantized values
    pub out: Tensor,
    /// Updated accumulator pair in train mode; the input pair in test mode
    pub state: MovingAverageState,
    /// Scale used for quantization: the updated estimate in train mode,
    /// the frozen `in_scale` in test mode
    pub out_scale: f32,
}

/// Output of the scale-tracking pass
#[derive(Clone, Debug)]
pub struct ScaleTrack {
    /// Verbatim copy of the input, when requested
    pub out: Option<Tensor>,
    /// Updated accumulator pair in train mode; the input pair in test mode
    pub state: MovingAverageState,
    /// Updated scale estimate in train mode; `None` in test mode
    pub out_scale: Option<f32>,
}

/// Quantize-dequantize with a scale recomputed from the current input.
///
/// The scale is the abs-max of `input`, recomputed fresh on every call in
/// both train and test mode; no state persists between calls. The observed
/// scale is returned alongside the output for inspection and export.
pub fn quantize_dequantize_abs_max(input: &Tensor, config: &QuantConfig) -> Result<AbsMaxForward> {
    config.validate()?;
    Ok(TRACER.span(TraceStep::Forward, "quantize_dequantize_abs_max", || {
        let out_scale = TRACER.span(TraceStep::AbsMax, "abs_max", || {
            find_abs_max(input.as_slice())
        });
        let out = TRACER.span(TraceStep::Quantize, "clip_quant_dequant", || {
            clip_quantize_dequantize(
                input.as_slice(),
                out_scale,
                config.bin_cnt(),
                config.round_type,
            )
        });
        AbsMaxForward {
            out: Tensor::from_vec(out),
            out_scale,
        }
    }))
}

/// Quantize-dequantize with a moving-average abs-max scale.
///
/// Test mode uses the externally supplied, already-frozen `in_scale` and
/// leaves the state untouched. Train mode folds the current abs-max into
/// the running estimate and quantizes with the updated scale.
pub fn quantize_dequantize_moving_average_abs_max(
    input: &Tensor,
    state: &MovingAverageState,
    in_scale: f32,
    config: &QuantConfig,
) -> Result<MovingAverageForward> {
    config.validate()?;
    Ok(TRACER.span(
        TraceStep::Forward,
        "quantize_dequantize_moving_average_abs_max",
        || {
            let (state, out_scale) = if config.is_test {
                (*state, in_scale)
            } else {
                moving_average_scale_pass(input, *state, config.moving_rate)
            };
            let out = TRACER.span(TraceStep::Quantize, "clip_quant_dequant", || {
                clip_quantize_dequantize(
                    input.as_slice(),
                    out_scale,
                    config.bin_cnt(),
                    config.round_type,
                )
            });
            MovingAverageForward {
                out: Tensor::from_vec(out),
                state,
                out_scale,
            }
        },
    ))
}

/// Track a moving-average scale without quantizing the tensor.
///
/// Used for a tensor whose consumer quantizes it elsewhere: the running
/// estimate is updated exactly as in the quantizing variant, and the input
/// is optionally copied through verbatim when `copy_input` is set. Test
/// mode performs the optional copy only.
pub fn track_moving_average_scale(
    input: &Tensor,
    state: &MovingAverageState,
    config: &QuantConfig,
    copy_input: bool,
) -> Result<ScaleTrack> {
    config.validate()?;
    let out = copy_input.then(|| input.clone());
    if config.is_test {
        return Ok(ScaleTrack {
            out,
            state: *state,
            out_scale: None,
        });
    }
    let (state, out_scale) = moving_average_scale_pass(input, *state, config.moving_rate);
    Ok(ScaleTrack {
        out,
        state,
        out_scale: Some(out_scale),
    })
}

/// Backward pass: Straight-Through Estimator (STE).
///
/// The clip and round steps of the forward transform are not differentiable
/// (round is flat almost everywhere, clip is flat outside range); STE
/// approximates their gradient as the identity, so `d_input` is a direct
/// copy of `d_out`. The scale and accumulator state do not participate in
/// backpropagation.
///
/// # Errors
///
/// Returns [`QuantError::MissingGradOutput`] when the caller did not
/// provide an input-gradient destination.
pub fn straight_through_backward(d_out: &Tensor, d_input: Option<&mut Tensor>) -> Result<()> {
    let slot = d_input.ok_or(QuantError::MissingGradOutput { name: "d_input" })?;
    TRACER.span(TraceStep::Backward, "straight_through", || {
        *slot = d_out.clone();
    });
    Ok(())
}

/// Clamped STE backward: gradients are zeroed where the forward input fell
/// outside `[-scale, scale]`, since those elements were saturated by the
/// clip and carry no local signal. Can improve training stability over the
/// plain pass-through.
///
/// # Errors
///
/// Returns [`QuantError::MissingGradOutput`] when the caller did not
/// provide an input-gradient destination.
pub fn straight_through_backward_clamped(
    d_out: &Tensor,
    input: &Tensor,
    scale: f32,
    d_input: Option<&mut Tensor>,
) -> Result<()> {
    let slot = d_input.ok_or(QuantError::MissingGradOutput { name: "d_input" })?;
    TRACER.span(TraceStep::Backward, "straight_through_clamped", || {
        let grads: Vec<f32> = d_out
            .as_slice()
            .iter()
            .zip(input.as_slice().iter())
            .map(|(&grad, &x)| if x.abs() > scale { 0.0 } else { grad })
            .collect();
        *slot = Tensor::from_vec(grads);
    });
    Ok(())
}

/// Convenience function: one-shot abs-max quantize-dequantize at the given
/// bit width, returning just the transformed tensor
pub fn fake_quantize_abs_max(input: &Tensor, bit_length: usize) -> Result<Tensor> {
    let config = QuantConfig::new(bit_length);
    Ok(quantize_dequantize_abs_max(input, &config)?.out)
}

/// Convenience function for the STE backward pass
pub fn ste_backward(grad_output: &Tensor) -> Tensor {
    // STE: gradient passes through unchanged
    grad_output.clone()
}

/// Shared scale pass for the moving-average family: abs-max of the current
/// input folded into the running estimate. The reduction result feeds the
/// update, and the update result feeds whichever transform the caller
/// applies next.
fn moving_average_scale_pass(
    input: &Tensor,
    state: MovingAverageState,
    moving_rate: f32,
) -> (MovingAverageState, f32) {
    let cur_scale = TRACER.span(TraceStep::AbsMax, "abs_max", || {
        find_abs_max(input.as_slice())
    });
    TRACER.span(TraceStep::MovingAverage, "ema_update", || {
        state.update(cur_scale, moving_rate)
    })
}
