//! Membership proofs and the standalone verifier.

use zkhash::fields::bn256::FpBN256 as Scalar;

use crate::error::MerkleError;
use crate::hasher::PairHasher;

/// Membership proof for one leaf: the sibling path, the left/right
/// direction bits, and the root the path commits to.
///
/// Proofs are plain values. They copy everything they need out of the tree
/// and stay valid after the tree is dropped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Proof {
    /// Sibling values along the path, leaf level first.
    pub(crate) path_elements: Vec<Scalar>,
    /// Direction bits, leaf level first: 0 when the current node is the
    /// left child at that level, 1 when it is the right child.
    pub(crate) path_indices: Vec<u8>,
    /// Root of the tree at proof-generation time.
    pub(crate) path_root: Scalar,
}

impl Proof {
    /// Reassemble a proof received from outside the process.
    ///
    /// Enforces the shape invariants: both vectors must have the same
    /// length and every direction entry must be 0 or 1.
    pub fn new(
        path_elements: Vec<Scalar>,
        path_indices: Vec<u8>,
        path_root: Scalar,
    ) -> Result<Proof, MerkleError> {
        if path_elements.len() != path_indices.len() {
            return Err(MerkleError::InvalidInput(format!(
                "proof has {} path elements but {} direction bits",
                path_elements.len(),
                path_indices.len()
            )));
        }
        if let Some(bit) = path_indices.iter().find(|bit| **bit > 1) {
            return Err(MerkleError::InvalidInput(format!(
                "direction bits must be 0 or 1, got {bit}"
            )));
        }
        Ok(Proof {
            path_elements,
            path_indices,
            path_root,
        })
    }

    /// Sibling values along the path, leaf level first.
    pub fn path_elements(&self) -> &[Scalar] {
        &self.path_elements
    }

    /// Direction bits along the path, leaf level first.
    pub fn path_indices(&self) -> &[u8] {
        &self.path_indices
    }

    /// Root of the tree at proof-generation time.
    pub fn path_root(&self) -> Scalar {
        self.path_root
    }

    /// Number of levels the path covers (the tree height).
    pub fn height(&self) -> usize {
        self.path_elements.len()
    }
}

/// Replay `proof` from `leaf` and compare the result with the recorded
/// root.
///
/// At each level the direction bit selects the argument order: 0 hashes
/// `(current, sibling)`, 1 hashes `(sibling, current)`. Returns whether the
/// replayed root equals `path_root`; a mismatch is a normal outcome, not an
/// error. Verification must use the same hash function the tree was built
/// with, otherwise it reports `false`.
pub fn verify_proof<H: PairHasher>(leaf: &Scalar, proof: &Proof, hasher: &H) -> bool {
    let mut current = *leaf;
    for (sibling, bit) in proof.path_elements.iter().zip(&proof.path_indices) {
        current = if *bit == 0 {
            hasher.hash_pair(&current, sibling)
        } else {
            hasher.hash_pair(sibling, &current)
        };
    }
    current == proof.path_root
}
