use std::fmt::Debug;

use num_bigint::{BigInt, BigUint, RandBigInt, Sign};
use rand_core::RngCore;

use super::Element;
use crate::errors::Error;
use crate::repr::{polymorphic_capability, Repr, StandaloneRepresentable};

mod ring_group;
pub use ring_group::{RingGroup, RingGroupElement, RingGroupKind};

mod curve;
pub use curve::{CompressedPoint, CurvePoint, PointCompression, SourceGroup};

#[cfg(any(feature = "ark_bn254", feature = "ark_bls12381"))]
mod ark;
#[cfg(any(feature = "ark_bn254", feature = "ark_bls12381"))]
pub use ark::{ArkElement, ArkGroup};

/// Group abstraction over opaque [`Element`] handles.
///
/// Notation is multiplicative regardless of the underlying structure: `op` is
/// the group law and `pow` repeated application of it.
///
/// # Example
///
/// ```rust
/// use std::sync::Arc;
///
/// use bilinear::arith::{Group, Ring, RingGroup, Zn};
/// use num_bigint::{BigInt, BigUint};
///
/// let ring = Arc::new(Zn::new(BigUint::from(11u32)).unwrap());
/// let group = RingGroup::additive(ring.clone());
///
/// let g = group.generator().unwrap();
/// let x = group.pow(&g, &BigInt::from(-3)).unwrap();
/// assert_eq!(group.project(&x).unwrap(), ring.element(8u32));
/// ```
pub trait Group: StandaloneRepresentable + Debug + Send + Sync {
    /// Returns the neutral element.
    fn identity(&self) -> Element;

    /// Applies the group law.
    fn op(&self, a: &Element, b: &Element) -> Result<Element, Error>;

    /// Returns the inverse of `a`.
    fn inverse(&self, a: &Element) -> Result<Element, Error>;

    /// Computes `a^exponent`; negative exponents go through [`Group::inverse`].
    fn pow(&self, a: &Element, exponent: &BigInt) -> Result<Element, Error> {
        pow_by_squaring(self, a, exponent)
    }

    /// Group order, `None` if unknown or infinite.
    fn size(&self) -> Option<BigUint>;

    /// A distinguished generator, if the group has one.
    fn generator(&self) -> Result<Element, Error> {
        Err(Error::Unsupported("group has no distinguished generator"))
    }

    fn is_commutative(&self) -> bool;

    /// Whether `a` is an element of this group.
    fn contains(&self, a: &Element) -> bool;

    /// Rebuilds an element from the tree produced by its `to_repr`.
    fn restore_element(&self, repr: &Repr) -> Result<Element, Error>;

    /// Samples `g^k` for a uniform `k` below the group order.
    fn random(&self, rng: &mut dyn RngCore) -> Result<Element, Error> {
        let size = self
            .size()
            .ok_or(Error::Unsupported("sampling from a group of unknown order"))?;
        let exponent = BigInt::from(rng.gen_biguint_below(&size));
        self.pow(&self.generator()?, &exponent)
    }
}

impl PartialEq for dyn Group {
    fn eq(&self, other: &Self) -> bool {
        self.type_name() == other.type_name() && self.to_repr() == other.to_repr()
    }
}

impl Eq for dyn Group {}

polymorphic_capability!(dyn Group);

/// Left-to-right square-and-multiply over the group law.
pub fn pow_by_squaring<G: Group + ?Sized>(
    group: &G,
    a: &Element,
    exponent: &BigInt,
) -> Result<Element, Error> {
    let base = match exponent.sign() {
        Sign::Minus => group.inverse(a)?,
        _ => a.clone(),
    };
    let magnitude = exponent.magnitude();
    let mut result = group.identity();
    for bit in (0..magnitude.bits()).rev() {
        result = group.op(&result, &result)?;
        if magnitude.bit(bit) {
            result = group.op(&result, &base)?;
        }
    }
    Ok(result)
}

/// Computes `prod a_i^{k_i}`.
///
/// For commutative groups all exponents share one chain of squarings
/// (interleaved square-and-multiply); otherwise the powers are multiplied in
/// order.
pub fn multiexp<G: Group + ?Sized>(
    group: &G,
    terms: &[(Element, BigInt)],
) -> Result<Element, Error> {
    if !group.is_commutative() {
        return terms.iter().try_fold(group.identity(), |acc, (a, k)| {
            let power = group.pow(a, k)?;
            group.op(&acc, &power)
        });
    }

    let bases = terms
        .iter()
        .map(|(a, k)| {
            let base = match k.sign() {
                Sign::Minus => group.inverse(a)?,
                _ => a.clone(),
            };
            Ok((base, k.magnitude()))
        })
        .collect::<Result<Vec<_>, Error>>()?;
    let bits = bases.iter().map(|(_, k)| k.bits()).max().unwrap_or(0);

    let mut acc = group.identity();
    for bit in (0..bits).rev() {
        acc = group.op(&acc, &acc)?;
        for (base, k) in &bases {
            if k.bit(bit) {
                acc = group.op(&acc, base)?;
            }
        }
    }
    Ok(acc)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use rand::rngs::StdRng;
    use rand::SeedableRng;

    use super::*;
    use crate::arith::{Ring, Zp};
    use crate::repr::{Representable, Restore};

    fn unit_group() -> RingGroup {
        RingGroup::unit(Arc::new(Zp::new(BigUint::from(1009u32)).unwrap()))
    }

    #[test]
    fn multiexp_matches_naive_product() {
        let group = unit_group();
        let mut rng = StdRng::seed_from_u64(21);
        let terms: Vec<(Element, BigInt)> = (0..5)
            .map(|i| {
                let a = group.random(&mut rng).unwrap();
                (a, BigInt::from(i * 97 - 150))
            })
            .collect();

        let naive = terms.iter().fold(group.identity(), |acc, (a, k)| {
            group.op(&acc, &group.pow(a, k).unwrap()).unwrap()
        });
        assert_eq!(multiexp(&group, &terms).unwrap(), naive);
        assert_eq!(multiexp(&group, &[]).unwrap(), group.identity());
    }

    #[test]
    fn negative_exponents_invert() {
        let group = unit_group();
        let a = group.wrap(&group.ring().one()).unwrap();
        let b = group.wrap(&Zp::new(BigUint::from(1009u32)).unwrap().element(5u32)).unwrap();
        assert_eq!(group.pow(&a, &BigInt::from(-7)).unwrap(), a);
        let inverse = group.pow(&b, &BigInt::from(-1)).unwrap();
        assert_eq!(group.op(&inverse, &b).unwrap(), group.identity());
    }

    #[test]
    fn groups_round_trip_polymorphically() {
        let groups: Vec<Arc<dyn Group>> = vec![
            Arc::new(unit_group()),
            Arc::new(RingGroup::additive(Arc::new(
                Zp::new(BigUint::from(13u32)).unwrap(),
            ))),
        ];
        for group in groups {
            let restored = Arc::<dyn Group>::from_repr(&group.to_repr()).unwrap();
            assert!(*restored == *group);
        }
    }
}
