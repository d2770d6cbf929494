//! Vector kernels: linear, polynomial and RBF
//!
//! - Linear: K(x, y) = <x, y>
//! - Polynomial: K(x, y) = (γ * <x, y> + r)^d
//! - RBF: K(x, y) = exp(-γ * ||x - y||²)

use crate::core::{KernelError, Result, SparseVector};
use crate::kernel::VectorKernel;

/// Linear kernel: K(x, y) = x^T * y
#[derive(Debug, Clone, Copy, Default)]
pub struct LinearKernel;

impl LinearKernel {
    /// Create a new linear kernel
    pub fn new() -> Self {
        Self
    }
}

impl VectorKernel for LinearKernel {
    fn compute(&self, x: &SparseVector, y: &SparseVector) -> f64 {
        x.dot(y)
    }
}

/// Polynomial kernel with configurable degree, gamma, and coefficient
#[derive(Debug, Clone, Copy)]
pub struct PolynomialKernel {
    gamma: f64,
    coef0: f64,
    degree: u32,
}

impl PolynomialKernel {
    /// Create a polynomial kernel
    ///
    /// # Arguments
    /// * `degree` - Degree of the polynomial (must be > 0)
    /// * `gamma` - Scaling factor for the dot product (must be > 0)
    /// * `coef0` - Independent term
    pub fn new(degree: u32, gamma: f64, coef0: f64) -> Result<Self> {
        if degree == 0 {
            return Err(KernelError::InvalidParameter(
                "polynomial degree must be positive".to_string(),
            ));
        }
        if !(gamma.is_finite() && gamma > 0.0) {
            return Err(KernelError::InvalidParameter(format!(
                "gamma must be positive, got {}",
                gamma
            )));
        }
        Ok(Self {
            gamma,
            coef0,
            degree,
        })
    }

    /// Quadratic kernel: (γ * <x,y> + 1)²
    pub fn quadratic(gamma: f64) -> Result<Self> {
        Self::new(2, gamma, 1.0)
    }

    pub fn degree(&self) -> u32 {
        self.degree
    }

    pub fn gamma(&self) -> f64 {
        self.gamma
    }

    pub fn coef0(&self) -> f64 {
        self.coef0
    }
}

impl VectorKernel for PolynomialKernel {
    fn compute(&self, x: &SparseVector, y: &SparseVector) -> f64 {
        (self.gamma * x.dot(y) + self.coef0).powi(self.degree as i32)
    }
}

/// RBF kernel: K(x, y) = exp(-γ * ||x - y||²)
#[derive(Debug, Clone, Copy)]
pub struct RbfKernel {
    gamma: f64,
}

impl RbfKernel {
    /// Create an RBF kernel; gamma must be positive
    pub fn new(gamma: f64) -> Result<Self> {
        if !(gamma.is_finite() && gamma > 0.0) {
            return Err(KernelError::InvalidParameter(format!(
                "gamma must be positive, got {}",
                gamma
            )));
        }
        Ok(Self { gamma })
    }

    pub fn gamma(&self) -> f64 {
        self.gamma
    }
}

impl VectorKernel for RbfKernel {
    fn compute(&self, x: &SparseVector, y: &SparseVector) -> f64 {
        (-self.gamma * x.squared_distance(y)).exp()
    }
}
