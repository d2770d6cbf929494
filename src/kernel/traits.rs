//! Vector kernel trait definition

use crate::core::SparseVector;

/// Kernel function over flat feature vectors
///
/// Used by [`VectorBasicKernel`](crate::kernel::VectorBasicKernel) to compare
/// one feature set of each document.
pub trait VectorKernel: Send + Sync {
    /// Compute kernel value K(x, y)
    fn compute(&self, x: &SparseVector, y: &SparseVector) -> f64;
}
