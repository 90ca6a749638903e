//! Succinct _Merkle Tree_ commitments.
//!
//! A party commits to an ordered list of items with a single SHA-256 root
//! digest, then proves that one item sits at a given position with a proof
//! of `O(log n)` sibling digests. Verification needs only the root, the item,
//! its index, the number of leafs and the proof.
//!
//! Leafs and interior nodes are hashed with the same function and no prefix:
//!
//! ```text
//! MTH({d(0)}) = SHA-256(d(0)).
//! For n > 1, let k = ceil(n / 2). The Merkle Tree Hash of an n-element
//! list D[n] is then defined recursively as
//! MTH(D[n]) = SHA-256(MTH(D[0:k]) || MTH(D[k:n])),
//! ```
//!
//! so the tree shape depends on the number of leafs alone and no leaf is
//! ever duplicated to fill a level.
//!
//! Link: [](https://en.wikipedia.org/wiki/Merkle_tree)
//!
//! # Interface
//!
//! ```text
//! - commit (bytes) -> digest
//! - build tree (items) -> tree
//! - get root -> digest
//! - gen proof (index) -> proof
//! - verify proof (root, item, proof, index, leafs) -> bool
//! ```
//!
//! # Examples
//!
//! ```
//! use merkle_commit::{verify_proof, MerkleTree};
//!
//! let items = ["A", "B", "C", "D"];
//! let tree = MerkleTree::new(items).unwrap();
//! let root = tree.root();
//!
//! let proof = tree.gen_proof(2).unwrap();
//! assert_eq!(proof.len(), 2);
//! assert!(verify_proof(&root, "C", &proof, 2, items.len()));
//! assert!(!verify_proof(&root, "C*", &proof, 2, items.len()));
//! ```

#![deny(missing_docs, missing_debug_implementations, unsafe_code, unstable_features)]
#![warn(
    unused_qualifications,
    missing_copy_implementations,
    trivial_casts,
    trivial_numeric_casts,
    unused_import_braces
)]

/// Error type shared by the crate.
pub mod error;

/// Commitment primitive and digest type.
pub mod hash;

/// Merkle tree construction and proof generation.
pub mod merkle;

/// Merkle tree inclusion proof and its verification.
pub mod proof;

#[cfg(test)]
mod test_common;

pub use crate::error::{MerkleError, Result};
pub use crate::hash::{commit, commit_node, Algorithm, Digest, Sha256Algorithm, DIGEST_LEN};
pub use crate::merkle::MerkleTree;
pub use crate::proof::{verify_proof, verify_proof_with_config, Proof, ProofLayout, VerifyConfig};
