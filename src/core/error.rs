//! Error types for kernel combination

use thiserror::Error;

#[derive(Error, Debug)]
pub enum KernelError {
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("Tree slot {slot} out of range: parameter table has {len} entries")]
    SlotOutOfRange { slot: usize, len: usize },

    #[error("Document {document} has no feature set {index}")]
    FeatureSetOutOfRange { document: usize, index: usize },

    #[error("Unknown kernel family code: {0}")]
    UnknownKernelFamily(i32),

    #[error(
        "No precomputed sub-kernel value for documents ({doc_a}, {doc_b}), trees ({tree_a}, {tree_b})"
    )]
    MissingSubKernel {
        doc_a: usize,
        doc_b: usize,
        tree_a: usize,
        tree_b: usize,
    },

    #[error("Empty parameter table")]
    EmptyTable,

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, KernelError>;
