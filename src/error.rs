//! Error kinds surfaced by the core.
//!
//! Mirrors the flat, one-variant-per-failure-kind style of the early `bogn`
//! era of this crate, but derives `Display`/`std::error::Error` via
//! `thiserror` rather than hand-rolling them.

use thiserror::Error;

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;

/// Every failure kind the core must distinguish.
#[derive(Debug, Error)]
pub enum Error {
    /// Non-key, wrong arity, empty input to a coder that forbids it,
    /// unordered input.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// Construction from more than `L` records.
    #[error("partition overflow: {have} records exceeds limit {limit}")]
    PartitionOverflow {
        /// records actually supplied
        have: usize,
        /// configured partition limit
        limit: usize,
    },

    /// A referenced digest is absent from the node store.
    #[error("missing node: {0}")]
    MissingNode(String),

    /// Node has an unexpected `:data/type` tag.
    #[error("type mismatch at {reference}: expected {expected}, found {found}")]
    TypeMismatch {
        /// node reference where the mismatch was found
        reference: String,
        /// the type the caller expected
        expected: &'static str,
        /// the type tag actually present on the node
        found: String,
    },

    /// Attributes fail an invariant (e.g. child count != keys + 1).
    #[error("corrupt node at {reference}: {attribute}: {detail}")]
    CorruptNode {
        /// node reference where corruption was detected
        reference: String,
        /// attribute that failed its invariant
        attribute: &'static str,
        /// human-readable detail
        detail: String,
    },

    /// Unknown lexicoder tag, or wrong parameter count for a known tag.
    #[error("unsupported config: {0}")]
    UnsupportedConfig(String),
}

impl Error {
    pub(crate) fn invalid_argument<S: Into<String>>(msg: S) -> Error {
        Error::InvalidArgument(msg.into())
    }

    pub(crate) fn missing_node<S: Into<String>>(reference: S) -> Error {
        Error::MissingNode(reference.into())
    }

    pub(crate) fn unsupported_config<S: Into<String>>(msg: S) -> Error {
        Error::UnsupportedConfig(msg.into())
    }
}
