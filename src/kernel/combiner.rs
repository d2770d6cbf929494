//! Kernel combiner: blends tree sub-kernels and a squared flat kernel
//!
//! For documents `a` and `b` the combined kernel is
//!
//! ```text
//! K(a, b) = c_tree * Σ_s weight[s] * tree(a, b, s, s) + c_flat * (Σ_f basic(a, b, f, f))²
//! ```
//!
//! where `s` runs over the blend's tree slots and `f` over its flat feature
//! sets. Each tree evaluation receives the [`KernelSettings`] of its own slot.
//!
//! # Example
//!
//! ```rust
//! use tkcombine::config::BlendConfig;
//! use tkcombine::core::{Document, KernelFamily, SparseVector, TreeKernelParams};
//! use tkcombine::kernel::{KernelCombiner, PrecomputedTreeKernel, VectorBasicKernel};
//! use tkcombine::params::ParameterTable;
//! use tkcombine::DocumentKernel;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let table = ParameterTable::new(vec![TreeKernelParams::new(
//!     KernelFamily::SubsetTree, 1, 0.4, 1.0, 1.0, true,
//! )])?;
//!
//! let mut trees = PrecomputedTreeKernel::new();
//! trees.insert_slot(0, 1, 0, 2.0);
//!
//! let combiner = KernelCombiner::new(
//!     table,
//!     BlendConfig::single(),
//!     trees,
//!     VectorBasicKernel::linear(),
//! )?;
//!
//! let a = Document::new(0, vec![
//!     SparseVector::new(vec![0], vec![1.0]),
//!     SparseVector::new(vec![1], vec![1.0]),
//! ]);
//! let b = Document::new(1, vec![
//!     SparseVector::new(vec![0], vec![1.0]),
//!     SparseVector::new(vec![1], vec![0.5]),
//! ]);
//!
//! // 0.23 * 1.5² + 0.77 * 2.0
//! let k = combiner.compute(&a, &b)?;
//! assert!((k - 2.0575).abs() < 1e-12);
//! # Ok(())
//! # }
//! ```

use crate::config::{BlendConfig, KernelConfig};
use crate::core::{BasicKernel, DocumentKernel, KernelSettings, Result, TreeKernel};
use crate::params::ParameterTable;
use log::{debug, trace};

/// Combined tree/flat kernel over documents of type `D`
///
/// Holds only immutable configuration, so one combiner can serve many
/// threads when its evaluators can.
#[derive(Debug, Clone)]
pub struct KernelCombiner<T, B> {
    table: ParameterTable,
    blend: BlendConfig,
    tree_kernel: T,
    basic_kernel: B,
}

impl<T, B> KernelCombiner<T, B> {
    /// Create a combiner, checking every blend slot against the table
    pub fn new(
        table: ParameterTable,
        blend: BlendConfig,
        tree_kernel: T,
        basic_kernel: B,
    ) -> Result<Self> {
        blend.validate(&table)?;
        debug!(
            "Kernel combiner: slots {:?}, flat sets {:?}, tree coefficient {}, flat coefficient {}",
            blend.slots, blend.flat_sets, blend.tree_coefficient, blend.flat_coefficient
        );
        Ok(Self {
            table,
            blend,
            tree_kernel,
            basic_kernel,
        })
    }

    /// Create a combiner from a loaded configuration
    pub fn from_config(config: KernelConfig, tree_kernel: T, basic_kernel: B) -> Result<Self> {
        Self::new(config.parameters, config.blend, tree_kernel, basic_kernel)
    }

    /// Single-slot blend: `0.23 * flat² + 0.77 * weight[0] * tree(0)`
    pub fn single(table: ParameterTable, tree_kernel: T, basic_kernel: B) -> Result<Self> {
        Self::new(table, BlendConfig::single(), tree_kernel, basic_kernel)
    }

    /// Seven-slot blend over slots 0 and 2-7 with alpha = 0.2
    pub fn multi_slot(table: ParameterTable, tree_kernel: T, basic_kernel: B) -> Result<Self> {
        Self::new(table, BlendConfig::multi_slot(), tree_kernel, basic_kernel)
    }

    pub fn table(&self) -> &ParameterTable {
        &self.table
    }

    pub fn blend(&self) -> &BlendConfig {
        &self.blend
    }

    pub fn tree_kernel(&self) -> &T {
        &self.tree_kernel
    }

    pub fn basic_kernel(&self) -> &B {
        &self.basic_kernel
    }

    /// Weighted sum of the tree sub-kernels over the blend's slots
    pub fn tree_term<D: ?Sized>(&self, a: &D, b: &D) -> Result<f64>
    where
        T: TreeKernel<D>,
    {
        let mut sum = 0.0;
        for &slot in &self.blend.slots {
            let params = self.table.get(slot)?;
            let settings = KernelSettings::from(params);
            trace!("Evaluating tree slot {} with {:?}", slot, settings);
            sum += params.weight * self.tree_kernel.evaluate(&settings, a, b, slot, slot)?;
        }
        Ok(sum)
    }

    /// Sum of the basic kernel over the blend's flat feature sets
    pub fn flat_term<D: ?Sized>(&self, a: &D, b: &D) -> Result<f64>
    where
        B: BasicKernel<D>,
    {
        let mut sum = 0.0;
        for &set in &self.blend.flat_sets {
            sum += self.basic_kernel.evaluate(a, b, set, set)?;
        }
        Ok(sum)
    }
}

impl<D, T, B> DocumentKernel<D> for KernelCombiner<T, B>
where
    D: ?Sized,
    T: TreeKernel<D>,
    B: BasicKernel<D>,
{
    fn compute(&self, a: &D, b: &D) -> Result<f64> {
        let tree = self.tree_term(a, b)?;
        let flat = self.flat_term(a, b)?;
        Ok(self.blend.tree_coefficient * tree + self.blend.flat_coefficient * flat * flat)
    }
}
