//! The clip → quantize → dequantize elementwise transform.

use super::config::RoundType;

/// Simulate quantization of `input` at `scale` with `bin_cnt` positive
/// levels, per element:
///
/// ```text
/// clipped = clamp(x, -scale, scale)
/// rounded = round(clipped * bin_cnt / scale)   # per round_type
/// y       = rounded * scale / bin_cnt
/// ```
///
/// No integer buffer is materialized: the output stays floating point but
/// takes on only `2 * bin_cnt + 1` distinct values spaced `scale / bin_cnt`
/// apart. A zero scale means an all-zero (or fully degenerate) input and
/// short-circuits to an all-zero output instead of dividing.
pub fn clip_quantize_dequantize(
    input: &[f32],
    scale: f32,
    bin_cnt: usize,
    round_type: RoundType,
) -> Vec<f32> {
    if scale == 0.0 {
        return vec![0.0; input.len()];
    }

    let levels = bin_cnt as f32;
    input
        .iter()
        .map(|&x| {
            let clipped = x.clamp(-scale, scale);
            let rounded = round_type.round(clipped * levels / scale);
            rounded * scale / levels
        })
        .collect()
}
