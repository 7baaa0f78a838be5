//! Bias-corrected exponential moving average of observed scales.

use serde::{Deserialize, Serialize};

/// Per-tensor moving-average accumulator pair.
///
/// Owned by the caller's training loop: read as input and written as output
/// on every training step, commonly initialized to `(0, 0)` before the
/// first step. Serializable so it can be checkpointed alongside the rest of
/// the training state.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct MovingAverageState {
    /// Decayed running sum of observed scales
    pub accum: f32,
    /// Decayed running count; the bias-correction denominator
    pub state: f32,
}

impl MovingAverageState {
    /// Create a state pair from checkpointed values
    pub fn new(accum: f32, state: f32) -> Self {
        Self { accum, state }
    }

    /// Fold one observed scale into the running estimate.
    ///
    /// ```text
    /// accum' = accum * moving_rate + cur_scale
    /// state' = state * moving_rate + 1
    /// out_scale = accum' / state'
    /// ```
    ///
    /// Returns the updated pair and the bias-corrected scale estimate. The
    /// `+ 1` term keeps the denominator at or above 1 for any nonnegative
    /// starting state, so the division is always well-defined and early
    /// steps are not under-weighted against the thin decayed history.
    pub fn update(self, cur_scale: f32, moving_rate: f32) -> (Self, f32) {
        let accum = self.accum * moving_rate + cur_scale;
        let state = self.state * moving_rate + 1.0;
        (Self { accum, state }, accum / state)
    }
}
