//! Per-level hashes of empty subtrees.
//!
//! Level `i` of a [`ZeroTable`] is the root of a fully empty subtree of
//! height `i`: level 0 is the empty-leaf sentinel and every later level
//! hashes the previous one with itself. A tree of height `h` pads missing
//! right siblings from levels `0..h` and falls back to level `h` when it
//! holds no leaves at all, so its table must span `h + 1` levels. The
//! height match is checked at tree construction.

use lazy_static::lazy_static;
use zkhash::fields::bn256::FpBN256 as Scalar;

use crate::error::MerkleError;
use crate::hasher::{PairHasher, Poseidon2Hasher};
use crate::serialization::hex_to_scalar;
use crate::tree::{MAX_TREE_HEIGHT, TREE_HEIGHT};

/// Empty-leaf sentinel of the reference deployment: a domain constant
/// reduced into the field, deliberately not the integer zero.
pub const EMPTY_LEAF_HEX: &str =
    "2fe54c60d3acabf3343a35b6eba15db4821b340f76e741e2249685ed4899af6c";

/// Per-level zero values published by the reference deployment, leaf level
/// first.
///
/// These were produced with the deployment's own hash and are kept verbatim
/// for interoperability; they are not outputs of [`Poseidon2Hasher`]. Note
/// that the published table stops at level 19, one level short of what a
/// height-20 tree needs for its empty-tree root, so as shipped it can only
/// back trees up to height 19.
pub const REFERENCE_ZEROS_HEX: [&str; 20] = [
    "2fe54c60d3acabf3343a35b6eba15db4821b340f76e741e2249685ed4899af6c",
    "256a6135777eee2fd26f54b8b7037a25439d5235caee224154186d2b8a52e31d",
    "1151949895e82ab19924de92c40a3d6f7bcb60d92b00504b8199613683f0c200",
    "20121ee811489ff8d61f09fb89e313f14959a0f28bb428a20dba6b0b068b3bdb",
    "0a89ca6ffa14cc462cfedb842c30ed221a50a3d6bf022a6a57dc82ab24c157c9",
    "24ca05c2b5cd42e890d6be94c68d0689f4f21c9cec9c0f13fe41d566dfb54959",
    "1ccb97c932565a92c60156bdba2d08f3bf1377464e025cee765679e604a7315c",
    "19156fbd7d1a8bf5cba8909367de1b624534ebab4f0f79e003bccdd1b182bdb4",
    "261af8c1f0912e465744641409f622d466c3920ac6e5ff37e36604cb11dfff80",
    "0058459724ff6ca5a1652fcbc3e82b93895cf08e975b19beab3f54c217d1c007",
    "1f04ef20dee48d39984d8eabe768a70eafa6310ad20849d4573c3c40c2ad1e30",
    "1bea3dec5dab51567ce7e200a30f7ba6d4276aeaa53e2686f962a46c66d511e5",
    "0ee0f941e2da4b9e31c3ca97a40d8fa9ce68d97c084177071b3cb46cd3372f0f",
    "1ca9503e8935884501bbaf20be14eb4c46b89772c97b96e3b2ebf3a36a948bbd",
    "133a80e30697cd55d8f7d4b0965b7be24057ba5dc3da898ee2187232446cb108",
    "13e6d8fc88839ed76e182c2a779af5b2c0da9dd18c90427a644f7e148a6253b6",
    "1eb16b057a477f4bc8f572ea6bee39561098f78f15bfb3699dcbb7bd8db61854",
    "0da2cb16a1ceaabf1c16b838f7a9e3f2a3a3088d9e0a6debaa748114620696ea",
    "24a3b3d822420b14b5d8cb6c28a574f01e98ea9e940551d2ebd75cee12649f9d",
    "198622acbd783d1b0d9064105b1fc8e4d8889de95c4c519b3f635809fe6afc05",
];

lazy_static! {
    static ref DEFAULT_ZEROS: ZeroTable = ZeroTable::derive(
        TREE_HEIGHT,
        &Poseidon2Hasher,
        canonical_empty_leaf(),
    )
    .expect("TREE_HEIGHT is within the supported range");
}

/// The canonical empty-leaf sentinel as a field element.
pub fn canonical_empty_leaf() -> Scalar {
    hex_to_scalar(EMPTY_LEAF_HEX).expect("the canonical sentinel is valid hex")
}

/// Shared zero table for height [`TREE_HEIGHT`] trees built with
/// [`Poseidon2Hasher`] and the canonical empty leaf.
///
/// Derived once per process on first use; clone it into each tree instead
/// of re-deriving.
pub fn default_zeros() -> &'static ZeroTable {
    &DEFAULT_ZEROS
}

/// Owned table of per-level empty-subtree hashes, leaf level first.
///
/// A table for height `h` holds `h + 1` values. Tables and hash functions
/// come in pairs: a table derived under one hash produces wrong roots under
/// another, and only [`ZeroTable::derive`] can guarantee consistency with
/// the hasher a tree uses. Tables copied from an external verifier must be
/// validated against that verifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ZeroTable {
    values: Vec<Scalar>,
}

impl ZeroTable {
    /// Build a table from explicit per-level values, leaf level first.
    pub fn from_values(values: Vec<Scalar>) -> Result<Self, MerkleError> {
        if values.is_empty() {
            return Err(MerkleError::MissingValue(
                "zero table needs at least the empty-leaf level".into(),
            ));
        }
        Ok(ZeroTable { values })
    }

    /// Parse a table from hex-encoded per-level values, leaf level first.
    pub fn from_hex(encoded: &[&str]) -> Result<Self, MerkleError> {
        let values = encoded
            .iter()
            .map(|level| hex_to_scalar(level))
            .collect::<Result<Vec<_>, _>>()?;
        Self::from_values(values)
    }

    /// Derive the table for a height: level 0 is `empty_leaf` and each later
    /// level hashes the previous one with itself.
    ///
    /// # Arguments
    /// * `height` - Tree height the table will serve (1-32)
    /// * `hasher` - The hash the tree will be built with
    /// * `empty_leaf` - Domain-specific sentinel for absent leaves
    pub fn derive<H: PairHasher>(
        height: usize,
        hasher: &H,
        empty_leaf: Scalar,
    ) -> Result<Self, MerkleError> {
        if height == 0 || height > MAX_TREE_HEIGHT {
            return Err(MerkleError::InvalidInput(format!(
                "height must be between 1 and {MAX_TREE_HEIGHT}, got {height}"
            )));
        }

        let levels = height.checked_add(1).expect("height <= 32");
        let mut values = Vec::with_capacity(levels);
        values.push(empty_leaf);

        let mut current = empty_leaf;
        for _ in 0..height {
            current = hasher.hash_pair(&current, &current);
            values.push(current);
        }

        Ok(ZeroTable { values })
    }

    /// Height this table serves: one less than its number of levels.
    pub fn height(&self) -> usize {
        self.values.len().saturating_sub(1)
    }

    /// The zero value for a level, if the table spans it.
    pub fn level(&self, level: usize) -> Option<&Scalar> {
        self.values.get(level)
    }

    /// The empty-leaf sentinel (level 0).
    pub fn empty_leaf(&self) -> &Scalar {
        self.values.first().expect("table is never empty")
    }

    /// Root of a fully empty tree of this table's height (the top level).
    pub fn empty_root(&self) -> &Scalar {
        self.values.last().expect("table is never empty")
    }

    /// All levels, leaf level first.
    pub fn as_slice(&self) -> &[Scalar] {
        &self.values
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hasher::MockHasher;

    #[test]
    fn derive_builds_height_plus_one_levels() {
        let table = ZeroTable::derive(4, &MockHasher, Scalar::from(5u64)).expect("derive");
        assert_eq!(table.height(), 4);
        assert_eq!(table.as_slice().len(), 5);
        assert_eq!(table.empty_leaf(), &Scalar::from(5u64));
    }

    #[test]
    fn derive_follows_the_doubling_recurrence() {
        let table = ZeroTable::derive(6, &MockHasher, Scalar::from(7u64)).expect("derive");
        for pair in table.as_slice().windows(2) {
            assert_eq!(pair[1], MockHasher.hash_pair(&pair[0], &pair[0]));
        }
    }

    #[test]
    fn derive_is_consistent_with_poseidon2() {
        let table =
            ZeroTable::derive(3, &Poseidon2Hasher, canonical_empty_leaf()).expect("derive");
        for pair in table.as_slice().windows(2) {
            assert_eq!(pair[1], Poseidon2Hasher.hash_pair(&pair[0], &pair[0]));
        }
    }

    #[test]
    fn derive_rejects_out_of_range_heights() {
        assert!(ZeroTable::derive(0, &MockHasher, Scalar::from(0u64)).is_err());
        assert!(ZeroTable::derive(33, &MockHasher, Scalar::from(0u64)).is_err());
        assert!(ZeroTable::derive(32, &MockHasher, Scalar::from(0u64)).is_ok());
    }

    #[test]
    fn empty_table_is_a_missing_value() {
        let err = ZeroTable::from_values(Vec::new()).expect_err("empty table");
        assert!(matches!(err, MerkleError::MissingValue(_)));
    }

    #[test]
    fn reference_table_parses_and_serves_height_19() {
        let table = ZeroTable::from_hex(&REFERENCE_ZEROS_HEX).expect("parse reference table");
        assert_eq!(table.height(), 19);
        assert_eq!(table.empty_leaf(), &canonical_empty_leaf());
    }

    #[test]
    fn default_table_matches_the_canonical_pairing() {
        let table = default_zeros();
        assert_eq!(table.height(), TREE_HEIGHT);
        assert_eq!(table.empty_leaf(), &canonical_empty_leaf());
        for pair in table.as_slice().windows(2) {
            assert_eq!(pair[1], Poseidon2Hasher.hash_pair(&pair[0], &pair[0]));
        }
    }
}
