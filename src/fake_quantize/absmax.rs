//! Abs-max reduction for scale estimation.

/// Largest absolute value in the buffer.
///
/// Max is associative and commutative, so chunked or vectorized reductions
/// produce the same result in any order. Callers are expected to never feed
/// NaN. An empty buffer yields the fold identity `0.0`, which downstream
/// handles as the degenerate zero-scale case.
pub fn find_abs_max(values: &[f32]) -> f32 {
    values.iter().map(|v| v.abs()).fold(0.0f32, f32::max)
}
