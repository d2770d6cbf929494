//! Tree-kernel parameter table
//!
//! The table is an ordered list of [`TreeKernelParams`], one per tree slot.
//! It can be built in code, read from JSON (an array of entries), or read
//! from the legacy brace notation used by custom-kernel headers:
//!
//! ```text
//! // PT             BOW                POS
//! {ACL07_KERNEL,1,.4,.4,1,1}, {ACL07_KERNEL,1,.4,.4,1,1}, {NOKERNEL,1,.4,1,1,1},
//! {END_OF_TREE_KERNELS,0,0,0,0,0}
//! ```
//!
//! Each row is `{family, generality, lambda, mu, weight, normalization}`. The
//! family may be a symbolic name or its integer code; a row whose family is
//! `END_OF_TREE_KERNELS` ends the table.

use crate::core::{KernelError, KernelFamily, Result, TreeKernelParams};
use log::debug;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufReader, BufWriter, Read};
use std::ops::Index;
use std::path::Path;

/// Row family that terminates a legacy table
const END_OF_TREE_KERNELS: &str = "END_OF_TREE_KERNELS";

/// Declaration that precedes the table initializer in a custom-kernel header
const TABLE_DECLARATION: &str = "tree_kernel_params";

/// Number of fields in a legacy row
const LEGACY_FIELDS: usize = 6;

/// Validated, read-only table of per-slot tree kernel parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<TreeKernelParams>", into = "Vec<TreeKernelParams>")]
pub struct ParameterTable {
    entries: Vec<TreeKernelParams>,
}

impl ParameterTable {
    /// Create a table, validating every entry
    pub fn new(entries: Vec<TreeKernelParams>) -> Result<Self> {
        if entries.is_empty() {
            return Err(KernelError::EmptyTable);
        }

        for (slot, entry) in entries.iter().enumerate() {
            entry.validate().map_err(|e| match e {
                KernelError::InvalidParameter(msg) => {
                    KernelError::InvalidParameter(format!("slot {}: {}", slot, msg))
                }
                other => other,
            })?;
        }

        Ok(Self { entries })
    }

    /// Entry for `slot`
    pub fn get(&self, slot: usize) -> Result<&TreeKernelParams> {
        self.entries.get(slot).ok_or(KernelError::SlotOutOfRange {
            slot,
            len: self.entries.len(),
        })
    }

    /// Number of slots
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Always false for a constructed table
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate over entries in slot order
    pub fn iter(&self) -> impl Iterator<Item = &TreeKernelParams> {
        self.entries.iter()
    }

    /// Slots whose family is not the exclusion sentinel
    pub fn active_slots(&self) -> Vec<usize> {
        self.entries
            .iter()
            .enumerate()
            .filter(|(_, entry)| !entry.family.is_excluded())
            .map(|(slot, _)| slot)
            .collect()
    }

    /// Load a table from a JSON file
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path).map_err(KernelError::IoError)?;
        let table: Self = serde_json::from_reader(BufReader::new(file))?;
        debug!(
            "Loaded parameter table with {} slots from {:?}",
            table.len(),
            path
        );
        Ok(table)
    }

    /// Save the table as JSON
    pub fn save_json<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let file = File::create(path).map_err(KernelError::IoError)?;
        serde_json::to_writer_pretty(BufWriter::new(file), self)?;
        Ok(())
    }

    /// Load a table written in the legacy brace notation
    pub fn from_legacy_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let mut text = String::new();
        File::open(path)
            .map_err(KernelError::IoError)?
            .read_to_string(&mut text)?;
        let table = Self::from_legacy_str(&text)?;
        debug!(
            "Loaded legacy parameter table with {} slots from {:?}",
            table.len(),
            path
        );
        Ok(table)
    }

    /// Parse the legacy brace notation
    ///
    /// Accepts a whole custom-kernel header: parsing starts after the
    /// `tree_kernel_params` declaration when there is one, `/*` and `*/`
    /// markers are ignored, and only innermost `{...}` groups holding a
    /// comma-separated list without `;` are rows.
    pub fn from_legacy_str(text: &str) -> Result<Self> {
        let text = match text.find(TABLE_DECLARATION) {
            Some(pos) => &text[pos + TABLE_DECLARATION.len()..],
            None => text,
        };
        let stripped: String = text
            .lines()
            .map(|line| match line.find("//") {
                Some(pos) => &line[..pos],
                None => line,
            })
            .collect::<Vec<_>>()
            .join("\n")
            .replace("/*", "  ")
            .replace("*/", "  ");

        let mut entries = Vec::new();
        let mut row_start = None;

        for (pos, ch) in stripped.char_indices() {
            match ch {
                '{' => row_start = Some(pos + 1),
                '}' => {
                    let Some(start) = row_start.take() else {
                        continue;
                    };
                    let body = &stripped[start..pos];
                    if !body.contains(',') || body.contains(';') {
                        continue;
                    }
                    match parse_legacy_row(body, entries.len())? {
                        Some(entry) => entries.push(entry),
                        None => break,
                    }
                }
                _ => {}
            }
        }

        Self::new(entries)
    }

    /// Render the table in the legacy brace notation, one row per line
    pub fn to_legacy_string(&self) -> String {
        let mut out = String::new();
        for (slot, entry) in self.entries.iter().enumerate() {
            out.push_str(&format!(
                "{{{},{},{},{},{},{}}}, // {}\n",
                entry.family.legacy_name(),
                entry.generality,
                entry.lambda,
                entry.mu,
                entry.weight,
                u8::from(entry.normalize),
                slot
            ));
        }
        out.push_str(&format!("{{{},0,0,0,0,0}}\n", END_OF_TREE_KERNELS));
        out
    }
}

impl TryFrom<Vec<TreeKernelParams>> for ParameterTable {
    type Error = KernelError;

    fn try_from(entries: Vec<TreeKernelParams>) -> Result<Self> {
        Self::new(entries)
    }
}

impl From<ParameterTable> for Vec<TreeKernelParams> {
    fn from(table: ParameterTable) -> Self {
        table.entries
    }
}

impl Index<usize> for ParameterTable {
    type Output = TreeKernelParams;

    fn index(&self, slot: usize) -> &TreeKernelParams {
        &self.entries[slot]
    }
}

/// Parse one row body; `None` marks the end of the table
fn parse_legacy_row(body: &str, slot: usize) -> Result<Option<TreeKernelParams>> {
    let fields: Vec<&str> = body.split(',').map(str::trim).collect();

    if fields.first() == Some(&END_OF_TREE_KERNELS) {
        return Ok(None);
    }

    if fields.len() != LEGACY_FIELDS {
        return Err(KernelError::ParseError(format!(
            "row {}: expected {} fields, got {}",
            slot,
            LEGACY_FIELDS,
            fields.len()
        )));
    }

    let family = parse_family(fields[0], slot)?;
    let generality = fields[1].parse::<u32>().map_err(|_| {
        KernelError::ParseError(format!("row {}: invalid generality: {}", slot, fields[1]))
    })?;
    let lambda = parse_number(fields[2], "lambda", slot)?;
    let mu = parse_number(fields[3], "mu", slot)?;
    let weight = parse_number(fields[4], "weight", slot)?;
    let normalize = parse_number(fields[5], "normalization", slot)? != 0.0;

    Ok(Some(TreeKernelParams::new(
        family, generality, lambda, mu, weight, normalize,
    )))
}

fn parse_family(field: &str, slot: usize) -> Result<KernelFamily> {
    if let Some(family) = KernelFamily::from_legacy_name(field) {
        return Ok(family);
    }
    let code = field.parse::<i32>().map_err(|_| {
        KernelError::ParseError(format!("row {}: unknown kernel family: {}", slot, field))
    })?;
    KernelFamily::from_code(code)
}

fn parse_number(field: &str, name: &str, slot: usize) -> Result<f64> {
    field
        .parse::<f64>()
        .map_err(|_| KernelError::ParseError(format!("row {}: invalid {}: {}", slot, name, field)))
}
