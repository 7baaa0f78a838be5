//! Property tests for the simulated quantization core
//!
//! Ensures the quantize-dequantize transform and scale estimation satisfy
//! their mathematical invariants:
//! - Abs-max invariant under permutation and negation
//! - Quantization error bounded by half a level
//! - Outputs on the quantization grid, never NaN or Infinity
//! - Moving-average estimate converges and stays well-defined
//! - Straight-through backward is exactly the identity

use cuantizar::{
    clip_quantize_dequantize, find_abs_max, quantize_dequantize_abs_max,
    quantize_dequantize_moving_average_abs_max, straight_through_backward,
    track_moving_average_scale, MovingAverageState, QuantConfig, RoundType, Tensor,
};
use proptest::collection::vec;
use proptest::prelude::*;

// =============================================================================
// Strategy Helpers
// =============================================================================

/// Generate a non-empty buffer of finite values
fn buffer(len: std::ops::Range<usize>) -> impl Strategy<Value = Vec<f32>> {
    vec(-1000.0f32..1000.0, len)
}

/// Generate a buffer together with a permutation of itself
fn buffer_with_permutation(
    len: std::ops::Range<usize>,
) -> impl Strategy<Value = (Vec<f32>, Vec<f32>)> {
    buffer(len).prop_flat_map(|v| {
        let original = v.clone();
        Just(v)
            .prop_shuffle()
            .prop_map(move |shuffled| (original.clone(), shuffled))
    })
}

/// Generate a valid rounding rule
fn round_type() -> impl Strategy<Value = RoundType> {
    prop_oneof![
        Just(RoundType::HalfAwayFromZero),
        Just(RoundType::HalfToEven),
    ]
}

// =============================================================================
// Abs-Max Properties
// =============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(1000))]

    #[test]
    fn prop_abs_max_permutation_invariant(
        (original, shuffled) in buffer_with_permutation(1..128)
    ) {
        prop_assert_eq!(find_abs_max(&original), find_abs_max(&shuffled));
    }

    #[test]
    fn prop_abs_max_negation_invariant(values in buffer(1..128)) {
        let negated: Vec<f32> = values.iter().map(|v| -v).collect();
        prop_assert_eq!(find_abs_max(&values), find_abs_max(&negated));
    }

    #[test]
    fn prop_abs_max_dominates_all_elements(values in buffer(1..128)) {
        let max_abs = find_abs_max(&values);
        for &v in &values {
            prop_assert!(v.abs() <= max_abs);
        }
        prop_assert!(values.iter().any(|v| v.abs() == max_abs));
    }

    // =========================================================================
    // Transform Properties
    // =========================================================================

    #[test]
    fn prop_round_trip_error_at_most_half_level(values in buffer(1..128)) {
        let config = QuantConfig::new(8);
        let scale = find_abs_max(&values);
        prop_assume!(scale > 0.0);

        let output = clip_quantize_dequantize(
            &values,
            scale,
            config.bin_cnt(),
            RoundType::HalfAwayFromZero,
        );

        let half_level = scale / (2.0 * config.bin_cnt() as f32);
        for (&x, &y) in values.iter().zip(output.iter()) {
            prop_assert!(
                (y - x).abs() <= half_level + scale * 1e-6,
                "Quantization error |{} - {}| above half a level {}",
                y, x, half_level
            );
        }
    }

    #[test]
    fn prop_transform_never_nan_or_inf(
        values in buffer(1..128),
        bit_length in 2usize..13,
        rt in round_type(),
    ) {
        let config = QuantConfig::new(bit_length);
        let scale = find_abs_max(&values);

        let output = clip_quantize_dequantize(&values, scale, config.bin_cnt(), rt);

        prop_assert_eq!(output.len(), values.len());
        for &y in &output {
            prop_assert!(y.is_finite(), "Output {} is NaN or Inf", y);
        }
    }

    #[test]
    fn prop_transform_idempotent_at_fixed_scale(
        values in buffer(1..128),
        bit_length in 2usize..13,
        rt in round_type(),
    ) {
        let config = QuantConfig::new(bit_length);
        let scale = find_abs_max(&values);
        prop_assume!(scale > 0.0);

        let once = clip_quantize_dequantize(&values, scale, config.bin_cnt(), rt);
        let twice = clip_quantize_dequantize(&once, scale, config.bin_cnt(), rt);

        for (&a, &b) in once.iter().zip(twice.iter()) {
            prop_assert!(
                (a - b).abs() <= 1e-5 * a.abs().max(1.0),
                "Re-quantization moved {} to {}", a, b
            );
        }
    }

    #[test]
    fn prop_transform_preserves_sign(values in buffer(1..64)) {
        let config = QuantConfig::new(8);
        let scale = find_abs_max(&values);
        prop_assume!(scale > 0.0);

        let output = clip_quantize_dequantize(
            &values,
            scale,
            config.bin_cnt(),
            RoundType::HalfAwayFromZero,
        );

        for (&x, &y) in values.iter().zip(output.iter()) {
            // Rounding may flatten small values to zero, never flip the sign
            prop_assert!(x * y >= 0.0, "Sign flipped: {} -> {}", x, y);
        }
    }

    // =========================================================================
    // Moving-Average Properties
    // =========================================================================

    #[test]
    fn prop_moving_average_denominator_at_least_one(
        scales in vec(0.0f32..1000.0, 1..64),
        moving_rate in 0.01f32..0.99,
    ) {
        let mut state = MovingAverageState::default();
        for &cur_scale in &scales {
            let (next, out_scale) = state.update(cur_scale, moving_rate);
            state = next;
            prop_assert!(state.state >= 1.0);
            prop_assert!(out_scale.is_finite());
            prop_assert!(out_scale >= 0.0);
        }
    }

    #[test]
    fn prop_moving_average_estimate_within_observed_range(
        scales in vec(0.001f32..1000.0, 1..64),
        moving_rate in 0.01f32..0.99,
    ) {
        let mut state = MovingAverageState::default();
        let mut lo = f32::INFINITY;
        let mut hi = f32::NEG_INFINITY;
        for &cur_scale in &scales {
            lo = lo.min(cur_scale);
            hi = hi.max(cur_scale);
            let (next, out_scale) = state.update(cur_scale, moving_rate);
            state = next;
            // Weighted average of observed scales with geometric weights
            prop_assert!(
                out_scale >= lo * (1.0 - 1e-5) && out_scale <= hi * (1.0 + 1e-5),
                "Estimate {} outside observed range [{}, {}]", out_scale, lo, hi
            );
        }
    }

    #[test]
    fn prop_moving_average_monotone_convergence_from_below(
        warm_scale in 0.1f32..1.0,
        target in 2.0f32..100.0,
        warm_steps in 1usize..8,
        steps in 2usize..32,
    ) {
        // Warm the state on a smaller scale, then feed a constant target:
        // the estimate must rise strictly toward it and never overshoot
        let mut state = MovingAverageState::default();
        for _ in 0..warm_steps {
            state = state.update(warm_scale, 0.9).0;
        }

        let mut prev = state.accum / state.state;
        for _ in 0..steps {
            let (next, out_scale) = state.update(target, 0.9);
            state = next;
            prop_assert!(out_scale > prev, "Estimate {} did not rise above {}", out_scale, prev);
            prop_assert!(out_scale < target, "Estimate {} overshot target {}", out_scale, target);
            prev = out_scale;
        }
    }

    // =========================================================================
    // Operation-Level Properties
    // =========================================================================

    #[test]
    fn prop_forward_zero_input_yields_zero_output(len in 1usize..128) {
        let input = Tensor::zeros(len);
        let config = QuantConfig::default();

        let result = quantize_dequantize_abs_max(&input, &config).unwrap();

        prop_assert_eq!(result.out_scale, 0.0);
        for &y in result.out.as_slice() {
            prop_assert_eq!(y, 0.0);
        }
    }

    #[test]
    fn prop_forward_observed_scale_matches_abs_max(values in buffer(1..128)) {
        let input = Tensor::from_vec(values.clone());
        let config = QuantConfig::default();

        let result = quantize_dequantize_abs_max(&input, &config).unwrap();

        prop_assert_eq!(result.out_scale, find_abs_max(&values));
    }

    #[test]
    fn prop_test_mode_never_mutates_state(
        values in buffer(1..64),
        accum in 0.0f32..100.0,
        in_scale in 0.001f32..100.0,
    ) {
        let input = Tensor::from_vec(values);
        let state = MovingAverageState::new(accum, 1.0 + accum);
        let config = QuantConfig::default().test_mode();

        let quantized =
            quantize_dequantize_moving_average_abs_max(&input, &state, in_scale, &config).unwrap();
        prop_assert_eq!(quantized.state, state);
        prop_assert_eq!(quantized.out_scale, in_scale);

        let tracked = track_moving_average_scale(&input, &state, &config, false).unwrap();
        prop_assert_eq!(tracked.state, state);
        prop_assert!(tracked.out_scale.is_none());
    }

    #[test]
    fn prop_tracking_and_quantizing_agree_on_state(
        values in buffer(1..64),
        accum in 0.0f32..100.0,
    ) {
        // The tracking-only variant runs the same scale pass as the
        // quantizing variant; their state transitions must be identical
        let input = Tensor::from_vec(values);
        let state = MovingAverageState::new(accum, 1.0);
        let config = QuantConfig::default();

        let quantized =
            quantize_dequantize_moving_average_abs_max(&input, &state, 0.0, &config).unwrap();
        let tracked = track_moving_average_scale(&input, &state, &config, false).unwrap();

        prop_assert_eq!(quantized.state, tracked.state);
        prop_assert_eq!(Some(quantized.out_scale), tracked.out_scale);
    }

    #[test]
    fn prop_track_copy_is_verbatim(values in buffer(1..64)) {
        let input = Tensor::from_vec(values);
        let state = MovingAverageState::default();
        let config = QuantConfig::default();

        let result = track_moving_average_scale(&input, &state, &config, true).unwrap();

        prop_assert_eq!(result.out.unwrap(), input);
    }

    // =========================================================================
    // Straight-Through Backward Properties
    // =========================================================================

    #[test]
    fn prop_ste_backward_exact_identity(grads in vec(-1e30f32..1e30, 1..128)) {
        let d_out = Tensor::from_vec(grads);
        let mut d_input = Tensor::zeros(1);

        straight_through_backward(&d_out, Some(&mut d_input)).unwrap();

        prop_assert_eq!(d_input, d_out);
    }
}
