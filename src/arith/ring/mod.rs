//! Rings and fields.
//!
//! A [`Ring`] operates on opaque [`Element`] handles; each implementation
//! checks that the operands belong to it and fails with
//! [`Error::ForeignElement`] otherwise.
//!
//! - **[`Zn`]**: integers modulo `n`
//! - **[`Zp`]**: the prime field `F_p`, with square and cube roots
//! - **[`QuadraticExtensionField`]**: `F_p[i] / (i^2 + 1)` for `p ≡ 3 (mod 4)`
//! - **[`PolynomialRing`]**: polynomials over any ring
//!
//! # Example
//!
//! ```rust
//! use bilinear::arith::{Ring, Zp};
//! use num_bigint::BigUint;
//!
//! let field = Zp::new(BigUint::from(13u32)).unwrap();
//! let three = field.element(3u32);
//! let inverse = field.invert(&three).unwrap();
//! assert_eq!(field.mul(&three, &inverse).unwrap(), field.one());
//! ```

use std::fmt::Debug;

use num_bigint::BigUint;
use num_traits::{One, Zero};
use rand_core::RngCore;

use super::Element;
use crate::errors::Error;
use crate::repr::{polymorphic_capability, Repr, StandaloneRepresentable};

pub mod number_theory;

mod zn;
pub use zn::{Zn, ZnElement, Zp};

mod extension;
pub use extension::{Fp2Element, QuadraticExtensionField};

mod polynomial;
pub use polynomial::{Polynomial, PolynomialRing};

/// Commutative ring with one.
pub trait Ring: StandaloneRepresentable + Debug + Send + Sync {
    fn zero(&self) -> Element;

    fn one(&self) -> Element;

    fn add(&self, a: &Element, b: &Element) -> Result<Element, Error>;

    fn negate(&self, a: &Element) -> Result<Element, Error>;

    fn sub(&self, a: &Element, b: &Element) -> Result<Element, Error> {
        let negated = self.negate(b)?;
        self.add(a, &negated)
    }

    fn mul(&self, a: &Element, b: &Element) -> Result<Element, Error>;

    /// Square-and-multiply exponentiation.
    fn pow(&self, a: &Element, exponent: &BigUint) -> Result<Element, Error> {
        let mut result = self.one();
        for bit in (0..exponent.bits()).rev() {
            result = self.mul(&result, &result)?;
            if exponent.bit(bit) {
                result = self.mul(&result, a)?;
            }
        }
        Ok(result)
    }

    /// Multiplicative inverse; fails with [`Error::Math`] for non-units.
    fn invert(&self, a: &Element) -> Result<Element, Error>;

    fn is_unit(&self, a: &Element) -> Result<bool, Error>;

    /// Number of elements, `None` if infinite.
    fn size(&self) -> Option<BigUint>;

    fn characteristic(&self) -> BigUint;

    /// Number of units, when it is known without factoring.
    fn unit_count(&self) -> Option<BigUint> {
        None
    }

    fn contains(&self, a: &Element) -> bool;

    /// Rebuilds an element from the tree produced by its `to_repr`.
    fn restore_element(&self, repr: &Repr) -> Result<Element, Error>;

    fn random(&self, rng: &mut dyn RngCore) -> Result<Element, Error>;

    fn as_field(&self) -> Option<&dyn Field> {
        None
    }
}

/// A ring in which every non-zero element is a unit.
pub trait Field: Ring {
    fn div(&self, a: &Element, b: &Element) -> Result<Element, Error> {
        let inverse = self.invert(b)?;
        self.mul(a, &inverse)
    }
}

impl PartialEq for dyn Ring {
    fn eq(&self, other: &Self) -> bool {
        self.type_name() == other.type_name() && self.to_repr() == other.to_repr()
    }
}

impl Eq for dyn Ring {}

polymorphic_capability!(dyn Ring);

/// `size == characteristic`, i.e. the additive group is cyclic and generated by one.
pub(crate) fn is_prime_ring(ring: &dyn Ring) -> bool {
    ring.size()
        .is_some_and(|size| !size.is_zero() && size == ring.characteristic())
}

/// Fields of order `q` have `q - 1` units.
pub(crate) fn field_unit_count(size: Option<BigUint>) -> Option<BigUint> {
    size.filter(|q| !q.is_zero()).map(|q| q - BigUint::one())
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::repr::{Representable, Restore};

    #[test]
    fn rings_compare_by_identity_and_parameters() {
        let a: Arc<dyn Ring> = Arc::new(Zn::new(BigUint::from(15u32)).unwrap());
        let b: Arc<dyn Ring> = Arc::new(Zn::new(BigUint::from(15u32)).unwrap());
        let c: Arc<dyn Ring> = Arc::new(Zn::new(BigUint::from(13u32)).unwrap());
        let d: Arc<dyn Ring> = Arc::new(Zp::new(BigUint::from(13u32)).unwrap());
        assert!(*a == *b);
        assert!(*a != *c);
        assert!(*c != *d);
    }

    #[test]
    fn polymorphic_rings_round_trip() {
        let rings: Vec<Arc<dyn Ring>> = vec![
            Arc::new(Zn::new(BigUint::from(91u32)).unwrap()),
            Arc::new(Zp::new(BigUint::from(101u32)).unwrap()),
            Arc::new(QuadraticExtensionField::new(BigUint::from(103u32)).unwrap()),
            Arc::new(PolynomialRing::new(Arc::new(
                Zp::new(BigUint::from(7u32)).unwrap(),
            ))),
        ];
        for ring in rings {
            let repr = ring.to_repr();
            let restored = Arc::<dyn Ring>::from_repr(&repr).expect("restore ring");
            assert!(*restored == *ring, "{ring:?}");
        }
    }

    #[test]
    fn default_pow_is_square_and_multiply() {
        let ring = Zn::new(BigUint::from(10u32)).unwrap();
        let pow = ring.pow(&ring.element(3u32), &BigUint::from(4u32)).unwrap();
        assert_eq!(pow, ring.element(1u32));
        assert_eq!(ring.pow(&ring.element(7u32), &BigUint::zero()).unwrap(), ring.one());
    }
}
