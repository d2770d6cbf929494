//! Kernels: vector kernels, the basic and precomputed tree evaluators, the
//! combiner, and Gram matrices

pub mod basic;
pub mod combiner;
pub mod gram;
pub mod precomputed;
pub mod traits;
pub mod vector;

pub use self::basic::*;
pub use self::combiner::*;
pub use self::gram::*;
pub use self::precomputed::*;
pub use self::traits::*;
pub use self::vector::*;
