//! Core traits: the evaluator seams the combiner is built on

use crate::core::{Document, KernelSettings, Result, SparseVector};

/// Document abstraction used by the bundled evaluators
pub trait ForestDocument: Send + Sync {
    /// Stable identifier of the document
    fn id(&self) -> usize;

    /// Flat feature set at `index`, if the document has one
    fn feature_set(&self, index: usize) -> Option<&SparseVector>;

    /// Number of flat feature sets
    fn n_feature_sets(&self) -> usize;
}

impl ForestDocument for Document {
    fn id(&self) -> usize {
        self.id
    }

    fn feature_set(&self, index: usize) -> Option<&SparseVector> {
        self.feature_sets.get(index)
    }

    fn n_feature_sets(&self) -> usize {
        self.feature_sets.len()
    }
}

/// Sub-kernel evaluator for one tree representation
///
/// Implementations must return `0.0` when `settings.family` is
/// [`KernelFamily::Exclude`](crate::core::KernelFamily::Exclude): the combiner
/// calls the evaluator for every configured slot.
pub trait TreeKernel<D: ?Sized>: Send + Sync {
    /// Similarity between tree `tree_a` of `a` and tree `tree_b` of `b`
    fn evaluate(
        &self,
        settings: &KernelSettings,
        a: &D,
        b: &D,
        tree_a: usize,
        tree_b: usize,
    ) -> Result<f64>;
}

/// Kernel over flat feature sets
pub trait BasicKernel<D: ?Sized>: Send + Sync {
    /// Similarity between feature set `set_a` of `a` and `set_b` of `b`
    fn evaluate(&self, a: &D, b: &D, set_a: usize, set_b: usize) -> Result<f64>;
}

/// A complete kernel over documents, usable as a Gram-matrix entry
pub trait DocumentKernel<D: ?Sized>: Send + Sync {
    /// Compute K(a, b)
    fn compute(&self, a: &D, b: &D) -> Result<f64>;
}

impl<D: ?Sized, T: TreeKernel<D> + ?Sized> TreeKernel<D> for &T {
    fn evaluate(
        &self,
        settings: &KernelSettings,
        a: &D,
        b: &D,
        tree_a: usize,
        tree_b: usize,
    ) -> Result<f64> {
        (**self).evaluate(settings, a, b, tree_a, tree_b)
    }
}

impl<D: ?Sized, B: BasicKernel<D> + ?Sized> BasicKernel<D> for &B {
    fn evaluate(&self, a: &D, b: &D, set_a: usize, set_b: usize) -> Result<f64> {
        (**self).evaluate(a, b, set_a, set_b)
    }
}
