//! Combined tree/vector kernels for SVM tree-kernel learning
//!
//! A custom kernel mixes several tree sub-kernels, each configured by one slot
//! of a [`ParameterTable`], with a squared kernel over flat feature vectors.

pub mod cache;
pub mod config;
pub mod core;
pub mod kernel;
pub mod params;

// Re-export main types for convenience
pub use crate::cache::{CacheStats, KernelCache};
pub use crate::config::{BlendConfig, KernelConfig};
pub use crate::core::traits::*;
pub use crate::core::types::*;
pub use crate::core::{KernelError, Result};
pub use crate::kernel::{
    GramMatrix, KernelCombiner, LinearKernel, PolynomialKernel, PrecomputedTreeKernel, RbfKernel,
    VectorBasicKernel, VectorKernel,
};
pub use crate::params::ParameterTable;

// Version info
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
