//! Gram matrix of a document kernel

use crate::cache::KernelCache;
use crate::core::{DocumentKernel, ForestDocument, Result};
use log::debug;

/// Dense symmetric kernel matrix over a document collection
#[derive(Debug, Clone, PartialEq)]
pub struct GramMatrix {
    size: usize,
    values: Vec<f64>,
}

impl GramMatrix {
    /// Compute K(i, j) for every document pair
    ///
    /// Only the upper triangle is evaluated and mirrored, so the kernel is
    /// assumed symmetric. Values are looked up in and stored to `cache` by
    /// document id.
    pub fn compute<D, K>(kernel: &K, documents: &[D], cache: &mut KernelCache) -> Result<Self>
    where
        D: ForestDocument,
        K: DocumentKernel<D> + ?Sized,
    {
        let size = documents.len();
        let mut values = vec![0.0; size * size];

        for i in 0..size {
            for j in i..size {
                let (a, b) = (&documents[i], &documents[j]);
                let value = cache.get_or_insert_with(a.id(), b.id(), || kernel.compute(a, b))?;
                values[i * size + j] = value;
                values[j * size + i] = value;
            }
        }

        let stats = cache.stats();
        debug!(
            "Gram matrix {}x{} computed, cache hits {} misses {}",
            size, size, stats.hits, stats.misses
        );

        Ok(Self { size, values })
    }

    /// Number of documents
    pub fn size(&self) -> usize {
        self.size
    }

    /// K(i, j)
    ///
    /// # Panics
    /// Panics if `i` or `j` is not below `size()`
    pub fn get(&self, i: usize, j: usize) -> f64 {
        assert!(i < self.size && j < self.size, "Gram index out of bounds");
        self.values[i * self.size + j]
    }

    /// Row `i` of the matrix
    ///
    /// # Panics
    /// Panics if `i` is not below `size()`
    pub fn row(&self, i: usize) -> &[f64] {
        assert!(i < self.size, "Gram row out of bounds");
        &self.values[i * self.size..(i + 1) * self.size]
    }

    /// Diagonal K(i, i)
    pub fn diagonal(&self) -> Vec<f64> {
        (0..self.size).map(|i| self.get(i, i)).collect()
    }
}
