//! Host-resident numeric buffer.
//!
//! A thin owned wrapper over a contiguous `ndarray` vector. Device
//! residency and transfer are the host framework's concern; every kernel
//! in this crate reads the input buffer once and fully overwrites its
//! output buffer.

use ndarray::Array1;

/// Owned, contiguous, fixed-length buffer of f32 values
#[derive(Clone, Debug, PartialEq)]
pub struct Tensor {
    data: Array1<f32>,
}

impl Tensor {
    /// Create a tensor from an ndarray vector
    pub fn new(data: Array1<f32>) -> Self {
        Self { data }
    }

    /// Create a tensor from a plain vector
    pub fn from_vec(values: Vec<f32>) -> Self {
        Self {
            data: Array1::from_vec(values),
        }
    }

    /// Create a zero-filled tensor of `len` elements
    pub fn zeros(len: usize) -> Self {
        Self {
            data: Array1::zeros(len),
        }
    }

    /// Borrow the underlying array
    pub fn data(&self) -> &Array1<f32> {
        &self.data
    }

    /// Borrow the elements as a contiguous slice
    pub fn as_slice(&self) -> &[f32] {
        self.data.as_slice().unwrap_or(&[])
    }

    /// Number of elements
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Whether the tensor holds no elements
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

impl From<Vec<f32>> for Tensor {
    fn from(values: Vec<f32>) -> Self {
        Self::from_vec(values)
    }
}
