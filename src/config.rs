//! Blend configuration and combined kernel configuration files

use crate::core::{KernelError, Result};
use crate::params::ParameterTable;
use log::debug;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;

/// How tree slots and flat feature sets are mixed into one kernel value
///
/// `K = tree_coefficient * Σ weight[s] * tree(s, s) + flat_coefficient * (Σ basic(f, f))²`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlendConfig {
    /// Tree slots evaluated, in order
    pub slots: Vec<usize>,
    /// Flat feature sets summed into the flat term
    #[serde(default = "default_flat_sets")]
    pub flat_sets: Vec<usize>,
    /// Multiplier of the tree sum
    pub tree_coefficient: f64,
    /// Multiplier of the squared flat term
    pub flat_coefficient: f64,
}

fn default_flat_sets() -> Vec<usize> {
    vec![0, 1]
}

impl BlendConfig {
    /// Weight of the squared flat term in the multi-slot blend
    pub const MULTI_SLOT_ALPHA: f64 = 0.2;

    /// Single tree slot: `0.23 * flat² + 0.77 * tree(0)`
    pub fn single() -> Self {
        Self {
            slots: vec![0],
            flat_sets: default_flat_sets(),
            tree_coefficient: 0.77,
            flat_coefficient: 0.23,
        }
    }

    /// Slots 0 and 2-7: `0.8 * Σ tree(s) + 0.2 * flat²`
    pub fn multi_slot() -> Self {
        Self {
            slots: vec![0, 2, 3, 4, 5, 6, 7],
            flat_sets: default_flat_sets(),
            tree_coefficient: 1.0 - Self::MULTI_SLOT_ALPHA,
            flat_coefficient: Self::MULTI_SLOT_ALPHA,
        }
    }

    /// Multi-slot blend with a custom flat weight alpha in [0, 1]
    pub fn multi_slot_with_alpha(alpha: f64) -> Result<Self> {
        if !(0.0..=1.0).contains(&alpha) {
            return Err(KernelError::InvalidParameter(format!(
                "alpha must lie in [0, 1], got {}",
                alpha
            )));
        }
        Ok(Self {
            tree_coefficient: 1.0 - alpha,
            flat_coefficient: alpha,
            ..Self::multi_slot()
        })
    }

    /// Check the blend against a parameter table
    pub fn validate(&self, table: &ParameterTable) -> Result<()> {
        if self.slots.is_empty() && self.flat_sets.is_empty() {
            return Err(KernelError::InvalidParameter(
                "blend needs at least one tree slot or flat feature set".to_string(),
            ));
        }
        if !self.tree_coefficient.is_finite() || !self.flat_coefficient.is_finite() {
            return Err(KernelError::InvalidParameter(format!(
                "blend coefficients must be finite, got tree={} flat={}",
                self.tree_coefficient, self.flat_coefficient
            )));
        }
        for &slot in &self.slots {
            table.get(slot)?;
        }
        Ok(())
    }
}

/// Parameter table plus blend, as stored in a configuration file
///
/// ```json
/// {
///   "parameters": [
///     {"family": "acl07", "generality": 1, "lambda": 0.4, "mu": 0.4, "weight": 1.0, "normalize": true}
///   ],
///   "blend": {"slots": [0], "flat_sets": [0, 1], "tree_coefficient": 0.77, "flat_coefficient": 0.23}
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KernelConfig {
    pub parameters: ParameterTable,
    pub blend: BlendConfig,
}

impl KernelConfig {
    /// Create a configuration, validating the blend against the table
    pub fn new(parameters: ParameterTable, blend: BlendConfig) -> Result<Self> {
        blend.validate(&parameters)?;
        Ok(Self { parameters, blend })
    }

    /// Load and validate a configuration from a JSON file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path).map_err(KernelError::IoError)?;
        let config: Self = serde_json::from_reader(BufReader::new(file))?;
        config.blend.validate(&config.parameters)?;
        debug!(
            "Loaded kernel configuration from {:?}: {} slots, blend over {:?}",
            path,
            config.parameters.len(),
            config.blend.slots
        );
        Ok(config)
    }

    /// Save the configuration as JSON
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let file = File::create(path).map_err(KernelError::IoError)?;
        serde_json::to_writer_pretty(BufWriter::new(file), self)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{KernelFamily, TreeKernelParams};

    fn table(n: usize) -> ParameterTable {
        ParameterTable::new(
            (0..n)
                .map(|_| TreeKernelParams::new(KernelFamily::SubsetTree, 1, 0.4, 1.0, 1.0, true))
                .collect(),
        )
        .unwrap()
    }

    #[test]
    fn test_presets() {
        let single = BlendConfig::single();
        assert_eq!(single.slots, vec![0]);
        assert_eq!(single.flat_sets, vec![0, 1]);
        assert_eq!(single.tree_coefficient, 0.77);
        assert_eq!(single.flat_coefficient, 0.23);

        let multi = BlendConfig::multi_slot();
        assert_eq!(multi.slots, vec![0, 2, 3, 4, 5, 6, 7]);
        assert!((multi.tree_coefficient - 0.8).abs() < 1e-12);
        assert_eq!(multi.flat_coefficient, 0.2);
    }

    #[test]
    fn test_alpha_bounds() {
        let blend = BlendConfig::multi_slot_with_alpha(0.5).unwrap();
        assert_eq!(blend.tree_coefficient, 0.5);
        assert_eq!(blend.flat_coefficient, 0.5);

        assert!(BlendConfig::multi_slot_with_alpha(-0.1).is_err());
        assert!(BlendConfig::multi_slot_with_alpha(1.5).is_err());
        assert!(BlendConfig::multi_slot_with_alpha(f64::NAN).is_err());
    }

    #[test]
    fn test_validate_against_table() {
        assert!(BlendConfig::single().validate(&table(1)).is_ok());
        assert!(BlendConfig::multi_slot().validate(&table(8)).is_ok());
        assert!(matches!(
            BlendConfig::multi_slot().validate(&table(7)),
            Err(KernelError::SlotOutOfRange { slot: 7, len: 7 })
        ));

        let empty = BlendConfig {
            slots: vec![],
            flat_sets: vec![],
            tree_coefficient: 1.0,
            flat_coefficient: 1.0,
        };
        assert!(empty.validate(&table(1)).is_err());

        let nan = BlendConfig {
            tree_coefficient: f64::NAN,
            ..BlendConfig::single()
        };
        assert!(nan.validate(&table(1)).is_err());
    }

    #[test]
    fn test_flat_sets_default_when_missing() {
        let blend: BlendConfig =
            serde_json::from_str(r#"{"slots":[0],"tree_coefficient":1.0,"flat_coefficient":0.0}"#)
                .unwrap();
        assert_eq!(blend.flat_sets, vec![0, 1]);
    }

    #[test]
    fn test_kernel_config_rejects_bad_blend() {
        assert!(KernelConfig::new(table(1), BlendConfig::multi_slot()).is_err());
        assert!(KernelConfig::new(table(8), BlendConfig::multi_slot()).is_ok());
    }
}
