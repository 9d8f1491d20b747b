//! Error types for tree construction, proof generation and the codecs.

use thiserror::Error;

/// Errors returned by tree construction, proof handling and the
/// field-element codecs.
///
/// A proof that fails to verify is not an error; verification reports
/// mismatches through its boolean result.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MerkleError {
    /// Input rejected up front: a height outside the supported range, more
    /// leaves than the tree can hold, a zero table of the wrong height, or a
    /// malformed encoding. Construction fails before any layer is allocated.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// A proof was requested for a leaf index the tree was not built with.
    #[error("leaf index {index} is out of bounds for a tree with {leaf_count} leaves")]
    IndexOutOfRange {
        /// The requested leaf index.
        index: usize,
        /// Number of leaves the tree was built with.
        leaf_count: usize,
    },

    /// A value was required but absent, such as an empty zero table or an
    /// empty field-element encoding.
    #[error("missing value: {0}")]
    MissingValue(String),
}
