//! Tree evaluator backed by externally computed sub-kernel values
//!
//! Values are stored per (document, tree) pair and looked up symmetrically.
//! The text format is one value per line:
//!
//! ```text
//! # id_a id_b slot value
//! 0 1 0 2.5
//! 0 1 2 0.75
//! ```

use crate::core::{ForestDocument, KernelError, KernelSettings, Result, TreeKernel};
use log::debug;
use std::collections::HashMap;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

/// Lookup key, normalized so that the smaller (document, tree) side comes first
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct SubKernelKey {
    left: (usize, usize),
    right: (usize, usize),
}

impl SubKernelKey {
    fn new(doc_a: usize, tree_a: usize, doc_b: usize, tree_b: usize) -> Self {
        let a = (doc_a, tree_a);
        let b = (doc_b, tree_b);
        if a <= b {
            Self { left: a, right: b }
        } else {
            Self { left: b, right: a }
        }
    }
}

/// Serves precomputed tree kernel values
#[derive(Debug, Clone, Default)]
pub struct PrecomputedTreeKernel {
    values: HashMap<SubKernelKey, f64>,
}

impl PrecomputedTreeKernel {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Store the value of tree `tree_a` of `doc_a` against tree `tree_b` of `doc_b`
    pub fn insert(&mut self, doc_a: usize, tree_a: usize, doc_b: usize, tree_b: usize, value: f64) {
        self.values
            .insert(SubKernelKey::new(doc_a, tree_a, doc_b, tree_b), value);
    }

    /// Store a same-slot value, the common case for custom kernels
    pub fn insert_slot(&mut self, doc_a: usize, doc_b: usize, slot: usize, value: f64) {
        self.insert(doc_a, slot, doc_b, slot, value);
    }

    /// Look up a stored value
    pub fn get(&self, doc_a: usize, tree_a: usize, doc_b: usize, tree_b: usize) -> Option<f64> {
        self.values
            .get(&SubKernelKey::new(doc_a, tree_a, doc_b, tree_b))
            .copied()
    }

    /// Number of stored values
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Check if no values are stored
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Load values from a file of `id_a id_b slot value` lines
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path).map_err(KernelError::IoError)?;
        let store = Self::from_reader(BufReader::new(file))?;
        debug!(
            "Loaded {} precomputed sub-kernel values from {:?}",
            store.len(),
            path
        );
        Ok(store)
    }

    /// Load values from a reader
    pub fn from_reader<R: BufRead>(reader: R) -> Result<Self> {
        let mut store = Self::new();

        for (line_num, line) in reader.lines().enumerate() {
            let line = line.map_err(KernelError::IoError)?;
            let line = line.trim();

            // Skip empty lines and comments
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            let (doc_a, doc_b, slot, value) = Self::parse_line(line).map_err(|e| {
                KernelError::ParseError(format!("Error parsing line {}: {}", line_num + 1, e))
            })?;
            store.insert_slot(doc_a, doc_b, slot, value);
        }

        Ok(store)
    }

    fn parse_line(line: &str) -> Result<(usize, usize, usize, f64)> {
        let parts: Vec<&str> = line.split_whitespace().collect();
        if parts.len() != 4 {
            return Err(KernelError::ParseError(format!(
                "expected 4 fields, got {}",
                parts.len()
            )));
        }

        let index = |s: &str| {
            s.parse::<usize>()
                .map_err(|_| KernelError::ParseError(format!("Invalid index: {}", s)))
        };
        let value = parts[3]
            .parse::<f64>()
            .map_err(|_| KernelError::ParseError(format!("Invalid value: {}", parts[3])))?;

        Ok((index(parts[0])?, index(parts[1])?, index(parts[2])?, value))
    }
}

impl<D: ForestDocument> TreeKernel<D> for PrecomputedTreeKernel {
    fn evaluate(
        &self,
        settings: &KernelSettings,
        a: &D,
        b: &D,
        tree_a: usize,
        tree_b: usize,
    ) -> Result<f64> {
        if settings.family.is_excluded() {
            return Ok(0.0);
        }

        self.get(a.id(), tree_a, b.id(), tree_b)
            .ok_or(KernelError::MissingSubKernel {
                doc_a: a.id(),
                doc_b: b.id(),
                tree_a,
                tree_b,
            })
    }
}
