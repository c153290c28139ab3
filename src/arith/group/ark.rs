//! Arkworks-backed prime-order groups.
//!
//! [`ArkGroup`] adapts any `ark_ec::PrimeGroup` (curve points in projective
//! form, or a pairing target group) to the [`Group`] trait. Elements are
//! persisted through their compressed canonical serialization.
//!
//! # Feature Flag
//!
//! Only available when `ark_bn254` or `ark_bls12381` is enabled.

use std::fmt;
use std::marker::PhantomData;

use ark_ec::PrimeGroup;
use ark_ff::{BigInteger, PrimeField};
use ark_std::UniformRand;
use num_bigint::{BigInt, BigUint, Sign};
use rand_core::RngCore;
use tracing::warn;

use super::Group;
use crate::arith::Element;
use crate::errors::{Error, RepresentationError};
use crate::repr::{Repr, ReprObject, Representable, StandaloneRepresentable};

/// Element wrapper for an arkworks group.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ArkElement<G: PrimeGroup>(pub G);

impl<G: PrimeGroup> Representable for ArkElement<G> {
    fn to_repr(&self) -> Repr {
        let mut bytes = Vec::with_capacity(self.0.compressed_size());
        match self.0.serialize_compressed(&mut bytes) {
            Ok(()) => Repr::from_bytes(&bytes),
            Err(err) => {
                warn!(%err, "failed to serialize group element");
                Repr::Null
            }
        }
    }
}

/// An arkworks prime-order group under a fixed type identifier.
pub struct ArkGroup<G> {
    name: &'static str,
    _group: PhantomData<fn() -> G>,
}

impl<G: PrimeGroup> ArkGroup<G> {
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            _group: PhantomData,
        }
    }

    pub fn element(&self, value: G) -> Element {
        Element::new(ArkElement(value))
    }

    pub fn value_of<'a>(&self, a: &'a Element) -> Result<&'a G, Error> {
        a.value::<ArkElement<G>>(self.name).map(|element| &element.0)
    }

    /// Maps an integer exponent into the scalar field.
    pub fn scalar(exponent: &BigInt) -> G::ScalarField {
        let magnitude = G::ScalarField::from_le_bytes_mod_order(&exponent.magnitude().to_bytes_le());
        match exponent.sign() {
            Sign::Minus => -magnitude,
            _ => magnitude,
        }
    }

    fn encoded_len() -> usize {
        G::zero().compressed_size()
    }
}

impl<G> fmt::Debug for ArkGroup<G> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ArkGroup").field(&self.name).finish()
    }
}

impl<G: PrimeGroup> Representable for ArkGroup<G> {
    fn to_repr(&self) -> Repr {
        ReprObject::new().into()
    }
}

impl<G: PrimeGroup> StandaloneRepresentable for ArkGroup<G> {
    fn type_name(&self) -> &'static str {
        self.name
    }
}

impl<G: PrimeGroup> Group for ArkGroup<G> {
    fn identity(&self) -> Element {
        self.element(G::zero())
    }

    fn op(&self, a: &Element, b: &Element) -> Result<Element, Error> {
        Ok(self.element(*self.value_of(a)? + *self.value_of(b)?))
    }

    fn inverse(&self, a: &Element) -> Result<Element, Error> {
        Ok(self.element(-*self.value_of(a)?))
    }

    fn pow(&self, a: &Element, exponent: &BigInt) -> Result<Element, Error> {
        let scalar = Self::scalar(exponent);
        Ok(self.element(self.value_of(a)?.mul_bigint(scalar.into_bigint())))
    }

    fn size(&self) -> Option<BigUint> {
        Some(BigUint::from_bytes_le(
            &<G::ScalarField as PrimeField>::MODULUS.to_bytes_le(),
        ))
    }

    fn generator(&self) -> Result<Element, Error> {
        Ok(self.element(G::generator()))
    }

    fn is_commutative(&self) -> bool {
        true
    }

    fn contains(&self, a: &Element) -> bool {
        a.is::<ArkElement<G>>()
    }

    fn restore_element(&self, repr: &Repr) -> Result<Element, Error> {
        let bytes = repr.to_bytes(Self::encoded_len())?;
        let value = G::deserialize_compressed(bytes.as_slice()).map_err(|err| {
            RepresentationError::InvalidValue(format!("invalid {} element: {err}", self.name))
        })?;
        Ok(self.element(value))
    }

    fn random(&self, rng: &mut dyn RngCore) -> Result<Element, Error> {
        let scalar = G::ScalarField::rand(rng);
        Ok(self.element(G::generator().mul_bigint(scalar.into_bigint())))
    }
}

#[cfg(all(test, feature = "ark_bn254"))]
mod tests {
    use ark_bn254::{G1Projective, G2Projective};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    use super::*;

    #[test]
    fn pow_matches_scalar_multiplication() {
        let group = ArkGroup::<G1Projective>::new("bn254-g1");
        let g = group.generator().unwrap();
        let five = group.pow(&g, &BigInt::from(5)).unwrap();
        let mut expected = group.identity();
        for _ in 0..5 {
            expected = group.op(&expected, &g).unwrap();
        }
        assert_eq!(five, expected);

        let minus_five = group.pow(&g, &BigInt::from(-5)).unwrap();
        assert_eq!(group.op(&five, &minus_five).unwrap(), group.identity());

        let order = BigInt::from(group.size().unwrap());
        assert_eq!(group.pow(&g, &order).unwrap(), group.identity());
    }

    #[test]
    fn elements_restore_from_bytes() {
        let group = ArkGroup::<G2Projective>::new("bn254-g2");
        let mut rng = StdRng::seed_from_u64(5);
        for _ in 0..4 {
            let a = group.random(&mut rng).unwrap();
            assert_eq!(group.restore_element(&a.to_repr()).unwrap(), a);
        }
        let identity = group.identity();
        assert_eq!(group.restore_element(&identity.to_repr()).unwrap(), identity);
        assert!(group.restore_element(&Repr::from("bytes")).is_err());
    }

    #[test]
    fn foreign_elements_are_rejected() {
        let g1 = ArkGroup::<G1Projective>::new("bn254-g1");
        let g2 = ArkGroup::<G2Projective>::new("bn254-g2");
        let a = g2.generator().unwrap();
        assert!(!g1.contains(&a));
        assert!(matches!(g1.inverse(&a), Err(Error::ForeignElement("bn254-g1"))));
    }
}
