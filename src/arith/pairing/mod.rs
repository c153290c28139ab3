use std::fmt::Debug;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::{Element, Group, SourceGroup};
use crate::errors::Error;
use crate::repr::{polymorphic_capability, StandaloneRepresentable};
use crate::represented_enum;

mod debug;
pub use debug::{DebugBilinearGroup, DebugBilinearGroupProvider};

mod supersingular;
pub use supersingular::{SupersingularBilinearGroup, SupersingularProvider};

mod lazy;
pub use lazy::{force_all, LazyBilinearGroup, LazyElement, LazyGroup};

#[cfg(any(feature = "ark_bn254", feature = "ark_bls12381"))]
mod ark;
#[cfg(any(feature = "ark_bn254", feature = "ark_bls12381"))]
pub(crate) use ark::register_types as register_ark_types;
#[cfg(any(feature = "ark_bn254", feature = "ark_bls12381"))]
pub use ark::{ArkBilinearGroup, ArkCurve};
#[cfg(feature = "ark_bn254")]
pub use ark::BarretoNaehrigProvider;
#[cfg(feature = "ark_bls12381")]
pub use ark::Bls12Provider;

/// Classification of pairings by the relation between the source groups.
///
/// - **Type 1**: `G1 = G2` (symmetric)
/// - **Type 2**: `G1 != G2` with an efficiently computable map `G2 -> G1`
/// - **Type 3**: `G1 != G2` with no efficient map in either direction
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PairingType {
    #[default]
    #[serde(rename = "TYPE_1")]
    Type1,
    #[serde(rename = "TYPE_2")]
    Type2,
    #[serde(rename = "TYPE_3")]
    Type3,
}

represented_enum!(PairingType {
    Type1 => "TYPE_1",
    Type2 => "TYPE_2",
    Type3 => "TYPE_3",
});

impl PairingType {
    pub fn is_symmetric(&self) -> bool {
        *self == PairingType::Type1
    }
}

/// Non-degenerate bilinear map `e: G1 x G2 -> GT`.
pub trait BilinearMap: Debug + Send + Sync {
    /// Computes `e(g1, g2)`; operands must belong to `G1` and `G2` respectively.
    fn apply(&self, g1: &Element, g2: &Element) -> Result<Element, Error>;
}

/// Hash function onto a group.
pub trait HashIntoGroup: Debug + Send + Sync {
    fn hash_into(&self, data: &[u8]) -> Result<Element, Error>;
}

impl HashIntoGroup for SourceGroup {
    fn hash_into(&self, data: &[u8]) -> Result<Element, Error> {
        self.hash_to_point(data)
    }
}

/// A bilinear group `(G1, G2, GT, e)` with optional hash functions.
///
/// # Example
///
/// ```rust
/// use bilinear::arith::{BilinearGroup, DebugBilinearGroup, PairingType};
///
/// let bg = DebugBilinearGroup::new(80, PairingType::Type3, 2).unwrap();
/// let h = bg.hash_into_g1().unwrap().hash_into(b"message").unwrap();
/// assert!(bg.g1().contains(&h));
/// ```
pub trait BilinearGroup: StandaloneRepresentable + Debug + Send + Sync {
    fn pairing_type(&self) -> PairingType;

    fn g1(&self) -> Arc<dyn Group>;

    fn g2(&self) -> Arc<dyn Group>;

    fn gt(&self) -> Arc<dyn Group>;

    fn bilinear_map(&self) -> Arc<dyn BilinearMap>;

    fn hash_into_g1(&self) -> Result<Arc<dyn HashIntoGroup>, Error> {
        Err(Error::Unsupported("hashing into G1"))
    }

    fn hash_into_g2(&self) -> Result<Arc<dyn HashIntoGroup>, Error> {
        Err(Error::Unsupported("hashing into G2"))
    }

    fn hash_into_gt(&self) -> Result<Arc<dyn HashIntoGroup>, Error> {
        Err(Error::Unsupported("hashing into GT"))
    }
}

impl PartialEq for dyn BilinearGroup {
    fn eq(&self, other: &Self) -> bool {
        self.type_name() == other.type_name() && self.to_repr() == other.to_repr()
    }
}

impl Eq for dyn BilinearGroup {}

polymorphic_capability!(dyn BilinearGroup);
