//! Fake quantization configuration types.

use serde::{Deserialize, Serialize};

use crate::error::{QuantError, Result};

/// Rounding rule applied when snapping scaled values to integer levels
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum RoundType {
    /// Ties round to the larger-magnitude integer (2.5 → 3, -2.5 → -3)
    #[default]
    HalfAwayFromZero,
    /// Ties round to the nearest even integer (banker's rounding), reducing
    /// systematic bias over many quantization events
    HalfToEven,
}

impl RoundType {
    /// Round a scaled value to an integer level under this rule
    #[inline]
    pub fn round(self, value: f32) -> f32 {
        match self {
            RoundType::HalfAwayFromZero => value.round(),
            RoundType::HalfToEven => value.round_ties_even(),
        }
    }
}

/// Fake quantization configuration
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct QuantConfig {
    /// Number of bits for quantization (e.g., 4, 8)
    pub bit_length: usize,
    /// Rounding rule for the quantize step
    pub round_type: RoundType,
    /// Decay factor for the moving-average scale estimate, in (0, 1)
    pub moving_rate: f32,
    /// Inference mode: freeze the scale and skip state updates
    pub is_test: bool,
}

impl QuantConfig {
    /// Create a config for the given bit width with default rounding,
    /// moving rate, and training mode
    pub fn new(bit_length: usize) -> Self {
        Self {
            bit_length,
            ..Self::default()
        }
    }

    /// Number of positive quantization levels: `2^(bit_length-1) - 1`
    /// (8-bit: 127, 4-bit: 7)
    pub fn bin_cnt(&self) -> usize {
        (1 << (self.bit_length - 1)) - 1
    }

    /// Set the rounding rule
    pub fn with_round_type(mut self, round_type: RoundType) -> Self {
        self.round_type = round_type;
        self
    }

    /// Set the moving-average decay factor
    pub fn with_moving_rate(mut self, moving_rate: f32) -> Self {
        self.moving_rate = moving_rate;
        self
    }

    /// Switch to inference mode
    pub fn test_mode(mut self) -> Self {
        self.is_test = true;
        self
    }

    /// Reject configurations the numeric kernels cannot run safely.
    ///
    /// `bit_length` below 2 would leave zero positive levels (division by
    /// zero in the transform); a `moving_rate` outside (0, 1) makes the
    /// running estimate diverge or never decay.
    pub fn validate(&self) -> Result<()> {
        if !(2..=16).contains(&self.bit_length) {
            return Err(QuantError::InvalidBitLength {
                bit_length: self.bit_length,
            });
        }
        if !self.moving_rate.is_finite() || self.moving_rate <= 0.0 || self.moving_rate >= 1.0 {
            return Err(QuantError::InvalidMovingRate {
                moving_rate: self.moving_rate,
            });
        }
        Ok(())
    }
}

impl Default for QuantConfig {
    fn default() -> Self {
        Self {
            bit_length: 8,
            round_type: RoundType::default(),
            moving_rate: 0.9,
            is_test: false,
        }
    }
}
