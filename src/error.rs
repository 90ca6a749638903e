use thiserror::Error;

/// Result type used across the crate.
pub type Result<T> = std::result::Result<T, MerkleError>;

/// Failures of tree construction, proof generation and digest parsing.
///
/// A proof that does not verify is not an error: verification reports it as
/// `false`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MerkleError {
    /// A commitment over zero items is undefined.
    #[error("cannot build a merkle tree from an empty item list")]
    EmptyInput,

    /// A proof was requested for a leaf the tree does not have.
    #[error("leaf index {index} out of range for a tree of {leafs} leafs")]
    IndexOutOfRange {
        /// Requested leaf index.
        index: usize,
        /// Number of leafs in the tree.
        leafs: usize,
    },

    /// Digest bytes or hex text were malformed.
    #[error("invalid digest: {0}")]
    InvalidDigest(String),
}
