//! Core type definitions for tree/vector kernel combination

use crate::core::{KernelError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Sparse vector representation with sorted indices
#[derive(Clone, Debug, PartialEq)]
pub struct SparseVector {
    /// Sorted indices of non-zero elements
    pub indices: Vec<usize>,
    /// Values corresponding to indices
    pub values: Vec<f64>,
}

impl SparseVector {
    /// Create a new sparse vector, ensuring indices are sorted
    pub fn new(indices: Vec<usize>, values: Vec<f64>) -> Self {
        assert_eq!(
            indices.len(),
            values.len(),
            "Indices and values must have same length"
        );

        let mut pairs: Vec<_> = indices.into_iter().zip(values).collect();
        pairs.sort_by_key(|&(idx, _)| idx);

        let (indices, values): (Vec<_>, Vec<_>) = pairs.into_iter().unzip();
        Self { indices, values }
    }

    /// Create an empty sparse vector
    pub fn empty() -> Self {
        Self {
            indices: Vec::new(),
            values: Vec::new(),
        }
    }

    /// Get the value at a specific index (0 if not present)
    pub fn get(&self, index: usize) -> f64 {
        match self.indices.binary_search(&index) {
            Ok(pos) => self.values[pos],
            Err(_) => 0.0,
        }
    }

    /// Dot product with another sparse vector
    ///
    /// Both index lists are sorted, so this is a single merge pass.
    pub fn dot(&self, other: &SparseVector) -> f64 {
        let mut result = 0.0;
        let mut i = 0;
        let mut j = 0;

        while i < self.indices.len() && j < other.indices.len() {
            let a = self.indices[i];
            let b = other.indices[j];

            if a == b {
                result += self.values[i] * other.values[j];
                i += 1;
                j += 1;
            } else if a < b {
                i += 1;
            } else {
                j += 1;
            }
        }

        result
    }

    /// Squared euclidean distance ||x - y||²
    pub fn squared_distance(&self, other: &SparseVector) -> f64 {
        (self.norm_squared() + other.norm_squared() - 2.0 * self.dot(other)).max(0.0)
    }

    /// Compute squared L2 norm
    pub fn norm_squared(&self) -> f64 {
        self.values.iter().map(|&v| v * v).sum()
    }

    /// Compute L2 norm
    pub fn norm(&self) -> f64 {
        self.norm_squared().sqrt()
    }

    /// Number of non-zero elements
    pub fn nnz(&self) -> usize {
        self.indices.len()
    }

    /// Check if vector is empty
    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }
}

/// Tree kernel family selected for a slot
///
/// Legacy integer codes are kept for the brace-table notation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KernelFamily {
    /// Moschitti et al. 2007 (code -1)
    Acl07,
    /// Vishwanathan and Smola 2002 (code 0)
    Subtree,
    /// Collins and Duffy 2002 (code 1)
    SubsetTree,
    /// Zhang 2003, bag-of-words SST (code 2)
    BowSubsetTree,
    /// Moschitti, ECML 2006 (code 3)
    PartialTree,
    /// Partial tree kernel without leaves (code 4)
    NoLeavesPartialTree,
    /// Taylor and Cristianini 2004 (code 6)
    StringKernel,
    /// Don't use this tree in any tree kernel (code -10)
    Exclude,
}

impl KernelFamily {
    /// Every family, in code order
    pub const ALL: [KernelFamily; 8] = [
        KernelFamily::Exclude,
        KernelFamily::Acl07,
        KernelFamily::Subtree,
        KernelFamily::SubsetTree,
        KernelFamily::BowSubsetTree,
        KernelFamily::PartialTree,
        KernelFamily::NoLeavesPartialTree,
        KernelFamily::StringKernel,
    ];

    /// Legacy integer code
    pub fn code(self) -> i32 {
        match self {
            KernelFamily::Acl07 => -1,
            KernelFamily::Subtree => 0,
            KernelFamily::SubsetTree => 1,
            KernelFamily::BowSubsetTree => 2,
            KernelFamily::PartialTree => 3,
            KernelFamily::NoLeavesPartialTree => 4,
            KernelFamily::StringKernel => 6,
            KernelFamily::Exclude => -10,
        }
    }

    /// Resolve a legacy integer code
    pub fn from_code(code: i32) -> Result<Self> {
        Self::ALL
            .iter()
            .copied()
            .find(|family| family.code() == code)
            .ok_or(KernelError::UnknownKernelFamily(code))
    }

    /// Legacy symbolic name, e.g. `SUBSET_TREE_KERNEL`
    pub fn legacy_name(self) -> &'static str {
        match self {
            KernelFamily::Acl07 => "ACL07_KERNEL",
            KernelFamily::Subtree => "SUBTREE_KERNEL",
            KernelFamily::SubsetTree => "SUBSET_TREE_KERNEL",
            KernelFamily::BowSubsetTree => "BOW_SST_KERNEL",
            KernelFamily::PartialTree => "PARTIAL_TREE_KERNEL",
            KernelFamily::NoLeavesPartialTree => "NOLEAVES_PT_KERNEL",
            KernelFamily::StringKernel => "STRING_KERNEL",
            KernelFamily::Exclude => "NOKERNEL",
        }
    }

    /// Resolve a legacy symbolic name
    pub fn from_legacy_name(name: &str) -> Option<Self> {
        Self::ALL
            .iter()
            .copied()
            .find(|family| family.legacy_name() == name)
    }

    /// Whether this is the exclusion sentinel
    pub fn is_excluded(self) -> bool {
        self == KernelFamily::Exclude
    }
}

impl fmt::Display for KernelFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.legacy_name())
    }
}

/// Configuration of one tree-kernel slot
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TreeKernelParams {
    /// Kernel family, or `Exclude` to drop the tree from the combination
    pub family: KernelFamily,
    /// Generality flag forwarded to the tree evaluator
    pub generality: u32,
    /// Decay factor lambda
    pub lambda: f64,
    /// Decay factor mu (partial tree kernels)
    pub mu: f64,
    /// Multiplier applied to this slot's tree kernel value
    pub weight: f64,
    /// Whether the evaluator should normalize this tree's kernel
    pub normalize: bool,
}

impl TreeKernelParams {
    /// Create a new parameter entry
    pub fn new(
        family: KernelFamily,
        generality: u32,
        lambda: f64,
        mu: f64,
        weight: f64,
        normalize: bool,
    ) -> Self {
        Self {
            family,
            generality,
            lambda,
            mu,
            weight,
            normalize,
        }
    }

    /// An entry marking the tree as unused
    pub fn excluded() -> Self {
        Self::new(KernelFamily::Exclude, 1, 0.4, 1.0, 1.0, true)
    }

    /// Check that decay factors and weight are usable
    ///
    /// Decay factors of excluded entries are never read and are not checked.
    pub fn validate(&self) -> Result<()> {
        if !self.weight.is_finite() {
            return Err(KernelError::InvalidParameter(format!(
                "weight must be finite, got {}",
                self.weight
            )));
        }
        if self.family.is_excluded() {
            return Ok(());
        }
        if !(self.lambda.is_finite() && self.lambda > 0.0) {
            return Err(KernelError::InvalidParameter(format!(
                "lambda must be positive and finite, got {}",
                self.lambda
            )));
        }
        if !(self.mu.is_finite() && self.mu > 0.0) {
            return Err(KernelError::InvalidParameter(format!(
                "mu must be positive and finite, got {}",
                self.mu
            )));
        }
        Ok(())
    }
}

/// Parameters a tree evaluator runs with for a single call
///
/// Derived from one [`TreeKernelParams`] entry right before the evaluator is
/// invoked for that entry's slot.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KernelSettings {
    pub family: KernelFamily,
    pub lambda: f64,
    /// lambda², precomputed
    pub lambda_squared: f64,
    pub mu: f64,
    pub generality: u32,
    pub normalize: bool,
}

impl From<&TreeKernelParams> for KernelSettings {
    fn from(params: &TreeKernelParams) -> Self {
        Self {
            family: params.family,
            lambda: params.lambda,
            lambda_squared: params.lambda * params.lambda,
            mu: params.mu,
            generality: params.generality,
            normalize: params.normalize,
        }
    }
}

/// Document carrying an identifier and indexed flat feature sets
#[derive(Clone, Debug, PartialEq)]
pub struct Document {
    /// Identifier used to address precomputed values and cache entries
    pub id: usize,
    /// Flat feature sets (e.g. question and answer bag-of-words)
    pub feature_sets: Vec<SparseVector>,
}

impl Document {
    /// Create a new document
    pub fn new(id: usize, feature_sets: Vec<SparseVector>) -> Self {
        Self { id, feature_sets }
    }
}
