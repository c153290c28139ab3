use serde::{Deserialize, Serialize};

use crate::annotated;
use crate::arith::PairingType;
use crate::errors::Error;

/// What a scheme needs from a bilinear group.
///
/// Requirements are immutable once built and compare structurally. The group
/// order must be a product of exactly `cardinality_num_prime_factors` distinct
/// primes (1 for prime-order groups).
///
/// # Example
///
/// ```rust
/// use bilinear::arith::PairingType;
/// use bilinear::factory::BilinearGroupRequirement;
///
/// let requirement = BilinearGroupRequirement::with_hashing(PairingType::Type3, true, false, false);
/// assert!(requirement.hash_into_g1_needed());
/// assert_eq!(requirement.cardinality_num_prime_factors(), 1);
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BilinearGroupRequirement {
    pairing_type: PairingType,
    hash_into_g1_needed: bool,
    hash_into_g2_needed: bool,
    hash_into_gt_needed: bool,
    cardinality_num_prime_factors: u32,
}

annotated!(BilinearGroupRequirement {
    pairing_type,
    hash_into_g1_needed,
    hash_into_g2_needed,
    hash_into_gt_needed,
    cardinality_num_prime_factors,
});

impl BilinearGroupRequirement {
    /// Prime-order group of the given type without hashing.
    pub fn new(pairing_type: PairingType) -> Self {
        Self::full(pairing_type, false, false, false, 1)
    }

    pub fn with_prime_factors(pairing_type: PairingType, prime_factors: u32) -> Self {
        Self::full(pairing_type, false, false, false, prime_factors)
    }

    pub fn with_hashing(
        pairing_type: PairingType,
        hash_into_g1: bool,
        hash_into_g2: bool,
        hash_into_gt: bool,
    ) -> Self {
        Self::full(pairing_type, hash_into_g1, hash_into_g2, hash_into_gt, 1)
    }

    pub fn full(
        pairing_type: PairingType,
        hash_into_g1: bool,
        hash_into_g2: bool,
        hash_into_gt: bool,
        prime_factors: u32,
    ) -> Self {
        Self {
            pairing_type,
            hash_into_g1_needed: hash_into_g1,
            hash_into_g2_needed: hash_into_g2,
            hash_into_gt_needed: hash_into_gt,
            cardinality_num_prime_factors: prime_factors,
        }
    }

    pub fn pairing_type(&self) -> PairingType {
        self.pairing_type
    }

    pub fn hash_into_g1_needed(&self) -> bool {
        self.hash_into_g1_needed
    }

    pub fn hash_into_g2_needed(&self) -> bool {
        self.hash_into_g2_needed
    }

    pub fn hash_into_gt_needed(&self) -> bool {
        self.hash_into_gt_needed
    }

    pub fn cardinality_num_prime_factors(&self) -> u32 {
        self.cardinality_num_prime_factors
    }

    /// Checks that the requirement can be satisfied by some group at all.
    pub fn validate(&self) -> Result<(), Error> {
        if self.cardinality_num_prime_factors == 0 {
            return Err(Error::InvalidConfig(
                "the group order needs at least one prime factor".into(),
            ));
        }
        Ok(())
    }
}
