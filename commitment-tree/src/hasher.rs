//! Hash functions for combining tree nodes.
//!
//! The tree performs no field arithmetic of its own; every parent node is
//! produced through the [`PairHasher`] capability. The production hasher
//! wraps the Poseidon2 permutation from `zkhash`; the permutation internals
//! (round function, round constants) stay inside that crate.

use core::ops::Add;

use zkhash::ark_ff::Field;
use zkhash::fields::bn256::FpBN256 as Scalar;
use zkhash::poseidon2::{poseidon2::Poseidon2, poseidon2_instance_bn256::POSEIDON2_BN256_PARAMS};

/// Two-to-one hash over BN254 scalars used to combine sibling nodes.
///
/// Implementations must be deterministic and order-sensitive:
/// `hash_pair(a, b)` and `hash_pair(b, a)` are different parents.
pub trait PairHasher {
    /// Hash an ordered `(left, right)` pair into a parent node.
    fn hash_pair(&self, left: &Scalar, right: &Scalar) -> Scalar;
}

impl<F> PairHasher for F
where
    F: Fn(&Scalar, &Scalar) -> Scalar,
{
    fn hash_pair(&self, left: &Scalar, right: &Scalar) -> Scalar {
        self(left, right)
    }
}

/// Poseidon2 hash with 2 inputs over BN254 (t=3, r=2, c=1).
///
/// Permutes `(left, right, 0)` and returns the first output lane; the zero
/// third lane is the domain-separation slot.
#[derive(Debug, Clone, Copy, Default)]
pub struct Poseidon2Hasher;

impl PairHasher for Poseidon2Hasher {
    fn hash_pair(&self, left: &Scalar, right: &Scalar) -> Scalar {
        let poseidon2 = Poseidon2::new(&POSEIDON2_BN256_PARAMS);
        let input = [*left, *right, Scalar::from(0u64)];
        let perm = poseidon2.permutation(&input);
        perm[0]
    }
}

/// Non-cryptographic stand-in hash: `(left + right) * 2` in the field.
///
/// Keeps node values small enough to check by hand. For tests and
/// demonstrations only; it offers no collision resistance.
#[derive(Debug, Clone, Copy, Default)]
pub struct MockHasher;

impl PairHasher for MockHasher {
    fn hash_pair(&self, left: &Scalar, right: &Scalar) -> Scalar {
        (*left).add(right).double()
    }
}
