//! Fixed-height Merkle tree construction, root retrieval and proof
//! generation.
//!
//! The layer layout and sibling arithmetic match `MerkleTreeWithHistory`
//! style verifier contracts bit for bit: missing right siblings are padded
//! from the zero table, the sibling of index `i` is `i ^ 1`, and the
//! direction bit at each level is `i % 2`.

use zkhash::fields::bn256::FpBN256 as Scalar;

use crate::error::MerkleError;
use crate::hasher::PairHasher;
use crate::proof::Proof;
use crate::zeros::ZeroTable;

/// Height of the commitment tree used by the deployed verifiers this
/// library mirrors.
pub const TREE_HEIGHT: usize = 20;

/// Largest supported tree height.
pub const MAX_TREE_HEIGHT: usize = 32;

/// Fixed-height append-style Merkle tree over BN254 scalars.
///
/// All layers are built once at construction and never change. A tree of
/// height `h` holds up to `2^h` leaves; the sparse right edge of every
/// layer is padded from the zero table, which keeps roots and proofs
/// bit-compatible with a verifier that assumes a full-capacity tree.
/// Because the tree is read-only after construction, shared references can
/// be used freely across threads.
#[derive(Debug, Clone)]
pub struct MerkleTree {
    /// Number of hashing levels above the leaves.
    height: usize,
    /// Maximum number of leaves (2^height).
    capacity: usize,
    /// Per-level padding values; spans levels `0..=height`.
    zeros: ZeroTable,
    /// All layers, leaves first, root layer last.
    layers: Vec<Vec<Scalar>>,
}

impl MerkleTree {
    /// Build a tree of the given height from `leaves`.
    ///
    /// Leaves are copied in; the caller keeps ownership of its slice. The
    /// hasher is only used during construction, so it is borrowed rather
    /// than stored.
    ///
    /// # Arguments
    /// * `height` - Tree height (1-32)
    /// * `leaves` - At most `2^height` leaf values, left to right
    /// * `hasher` - Hash used to combine sibling nodes
    /// * `zeros` - Padding table; its height must equal `height` and it
    ///   must have been produced with `hasher` for proofs to check out
    ///   against an external verifier
    pub fn new<H: PairHasher>(
        height: usize,
        leaves: &[Scalar],
        hasher: &H,
        zeros: ZeroTable,
    ) -> Result<MerkleTree, MerkleError> {
        if height == 0 || height > MAX_TREE_HEIGHT {
            return Err(MerkleError::InvalidInput(format!(
                "height must be between 1 and {MAX_TREE_HEIGHT}, got {height}"
            )));
        }

        let height_u32 = u32::try_from(height).expect("height <= 32 fits in u32");
        let capacity = 1usize
            .checked_shl(height_u32)
            .ok_or_else(|| MerkleError::InvalidInput("height too large for this platform".into()))?;

        if leaves.len() > capacity {
            return Err(MerkleError::InvalidInput(format!(
                "{} leaves exceed the capacity {capacity} of a height-{height} tree",
                leaves.len()
            )));
        }

        if zeros.height() != height {
            return Err(MerkleError::InvalidInput(format!(
                "zero table serves height {}, tree has height {height}",
                zeros.height()
            )));
        }

        let level_count = height.checked_add(1).expect("height <= 32");
        let mut layers = Vec::with_capacity(level_count);
        layers.push(leaves.to_vec());

        for level in 0..height {
            let zero = *zeros.level(level).expect("zero table spans every level");
            let parent = {
                let children = layers.last().expect("the leaf layer is always present");
                hash_layer(children, zero, hasher)
            };
            layers.push(parent);
        }

        Ok(MerkleTree {
            height,
            capacity,
            zeros,
            layers,
        })
    }

    /// Root of the tree.
    ///
    /// For a tree built from zero leaves every layer is empty and the root
    /// is the zero table's top entry, the hash of a fully empty tree.
    pub fn root(&self) -> Scalar {
        self.layers
            .last()
            .and_then(|top| top.first())
            .copied()
            .unwrap_or_else(|| *self.zeros.empty_root())
    }

    /// Generate a membership proof for the leaf at `index`.
    ///
    /// Walks one level at a time: the sibling is `index ^ 1` (taken from
    /// the zero table when the layer is too short to contain it), the
    /// direction bit is `index % 2`, and the index halves for the next
    /// level. Only indices of leaves supplied at construction are provable.
    pub fn proof(&self, index: usize) -> Result<Proof, MerkleError> {
        let leaf_count = self.leaf_count();
        if index >= leaf_count {
            return Err(MerkleError::IndexOutOfRange { index, leaf_count });
        }

        let mut path_elements = Vec::with_capacity(self.height);
        let mut path_indices = Vec::with_capacity(self.height);
        let mut cursor = index;

        for level in 0..self.height {
            let zero = *self.zeros.level(level).expect("zero table spans every level");
            let layer = &self.layers[level];
            let sibling = cursor ^ 1;

            path_elements.push(layer.get(sibling).copied().unwrap_or(zero));
            path_indices.push(u8::from(cursor % 2 == 1));

            cursor /= 2;
        }

        Ok(Proof {
            path_elements,
            path_indices,
            path_root: self.root(),
        })
    }

    /// Tree height (number of hashing levels above the leaves).
    pub fn height(&self) -> usize {
        self.height
    }

    /// Maximum number of leaves this tree can hold (2^height).
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of leaves the tree was built with.
    pub fn leaf_count(&self) -> usize {
        self.layers.first().map_or(0, Vec::len)
    }

    /// The padding table the tree was built with.
    pub fn zeros(&self) -> &ZeroTable {
        &self.zeros
    }
}

/// Hash one layer into its parent layer, padding a missing right sibling
/// with `empty_right`.
fn hash_layer<H: PairHasher>(children: &[Scalar], empty_right: Scalar, hasher: &H) -> Vec<Scalar> {
    let mut parents = Vec::with_capacity(children.len().div_ceil(2));
    for pair in children.chunks(2) {
        let left = pair[0];
        let right = pair.get(1).copied().unwrap_or(empty_right);
        parents.push(hasher.hash_pair(&left, &right));
    }
    parents
}
