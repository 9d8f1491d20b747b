//! Fixed-height Merkle commitment tree over the BN254 scalar field.
//!
//! Builds append-style commitment trees whose roots and membership proofs
//! are bit-compatible with `MerkleTreeWithHistory` style verifier
//! contracts. It handles:
//! - Layer-by-layer construction with zero-table padding of the sparse
//!   right edge
//! - Membership proof generation (sibling path plus direction bits)
//! - Standalone proof verification against a recorded root
//!
//! The two-to-one hash is a capability supplied at construction, so the
//! tree itself never touches field arithmetic; the bundled
//! [`Poseidon2Hasher`] wraps the Poseidon2 permutation from `zkhash`.
//!
//! ```
//! use commitment_tree::{MerkleTree, MockHasher, Scalar, ZeroTable, verify_proof};
//!
//! # fn main() -> Result<(), commitment_tree::MerkleError> {
//! let hasher = MockHasher;
//! let zeros = ZeroTable::derive(3, &hasher, Scalar::from(0u64))?;
//! let leaves = [Scalar::from(1u64), Scalar::from(2u64), Scalar::from(3u64)];
//!
//! let tree = MerkleTree::new(3, &leaves, &hasher, zeros)?;
//! let proof = tree.proof(2)?;
//! assert!(verify_proof(&leaves[2], &proof, &hasher));
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod hasher;
pub mod proof;
pub mod serialization;
pub mod tree;
pub mod zeros;

pub use error::MerkleError;
pub use hasher::{MockHasher, PairHasher, Poseidon2Hasher};
pub use proof::{Proof, verify_proof};
pub use tree::{MAX_TREE_HEIGHT, MerkleTree, TREE_HEIGHT};
pub use zeros::{
    EMPTY_LEAF_HEX, REFERENCE_ZEROS_HEX, ZeroTable, canonical_empty_leaf, default_zeros,
};

/// BN254 scalar field element used for leaves, nodes and roots.
pub use zkhash::fields::bn256::FpBN256 as Scalar;
