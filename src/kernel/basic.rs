//! Basic kernel over the flat feature sets of two documents

use crate::core::{BasicKernel, ForestDocument, KernelError, Result};
use crate::kernel::{LinearKernel, VectorKernel};

/// Applies a [`VectorKernel`] to one feature set of each document
#[derive(Debug, Clone, Default)]
pub struct VectorBasicKernel<K: VectorKernel = LinearKernel> {
    kernel: K,
}

impl VectorBasicKernel<LinearKernel> {
    /// Basic kernel using the dot product
    pub fn linear() -> Self {
        Self {
            kernel: LinearKernel::new(),
        }
    }
}

impl<K: VectorKernel> VectorBasicKernel<K> {
    /// Basic kernel using a custom vector kernel
    pub fn with_kernel(kernel: K) -> Self {
        Self { kernel }
    }

    /// The underlying vector kernel
    pub fn kernel(&self) -> &K {
        &self.kernel
    }
}

impl<D: ForestDocument, K: VectorKernel> BasicKernel<D> for VectorBasicKernel<K> {
    fn evaluate(&self, a: &D, b: &D, set_a: usize, set_b: usize) -> Result<f64> {
        let x = a
            .feature_set(set_a)
            .ok_or(KernelError::FeatureSetOutOfRange {
                document: a.id(),
                index: set_a,
            })?;
        let y = b
            .feature_set(set_b)
            .ok_or(KernelError::FeatureSetOutOfRange {
                document: b.id(),
                index: set_b,
            })?;
        Ok(self.kernel.compute(x, y))
    }
}
