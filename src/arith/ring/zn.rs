use num_bigint::{BigUint, RandBigInt};
use num_integer::Integer;
use num_traits::{One, Zero};
use rand_core::RngCore;

use super::number_theory::{cube_root_mod, cube_root_of_unity, is_probable_prime, sqrt_mod};
use super::{field_unit_count, Field, Ring};
use crate::arith::Element;
use crate::errors::{Error, RepresentationError};
use crate::repr::{Repr, ReprObject, Representable, Restore, StandaloneRepresentable};

/// Residue class in `[0, n)`.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ZnElement(BigUint);

impl ZnElement {
    pub fn value(&self) -> &BigUint {
        &self.0
    }
}

impl Representable for ZnElement {
    fn to_repr(&self) -> Repr {
        self.0.to_repr()
    }
}

/// The ring of integers modulo `n`.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Zn {
    modulus: BigUint,
}

impl Zn {
    pub fn new(modulus: BigUint) -> Result<Self, Error> {
        if modulus < BigUint::from(2u32) {
            return Err(Error::Math("modulus must be at least 2"));
        }
        Ok(Self { modulus })
    }

    pub fn modulus(&self) -> &BigUint {
        &self.modulus
    }

    /// The residue class of `value`.
    pub fn element(&self, value: impl Into<BigUint>) -> Element {
        Element::new(ZnElement(value.into() % &self.modulus))
    }

    /// The representative in `[0, n)` of an element of this ring.
    pub fn value<'a>(&self, a: &'a Element) -> Result<&'a BigUint, Error> {
        let value = &a.value::<ZnElement>("zn")?.0;
        if *value >= self.modulus {
            return Err(Error::ForeignElement("zn"));
        }
        Ok(value)
    }

    fn wrap(&self, value: BigUint) -> Element {
        Element::new(ZnElement(value % &self.modulus))
    }

    pub(crate) fn reduce_bytes(&self, bytes: &[u8]) -> Element {
        self.wrap(BigUint::from_bytes_be(bytes))
    }
}

impl Representable for Zn {
    fn to_repr(&self) -> Repr {
        ReprObject::new().with("modulus", &self.modulus).into()
    }
}

impl Restore for Zn {
    fn from_repr(repr: &Repr) -> Result<Self, RepresentationError> {
        let object = repr.as_object()?;
        object.deny_unknown(&["modulus"])?;
        Zn::new(object.field("modulus")?)
            .map_err(|err| RepresentationError::InvalidValue(err.to_string()))
    }
}

impl StandaloneRepresentable for Zn {
    fn type_name(&self) -> &'static str {
        "zn"
    }
}

impl Ring for Zn {
    fn zero(&self) -> Element {
        self.wrap(BigUint::zero())
    }

    fn one(&self) -> Element {
        self.wrap(BigUint::one())
    }

    fn add(&self, a: &Element, b: &Element) -> Result<Element, Error> {
        Ok(self.wrap(self.value(a)? + self.value(b)?))
    }

    fn negate(&self, a: &Element) -> Result<Element, Error> {
        Ok(self.wrap(&self.modulus - self.value(a)?))
    }

    fn sub(&self, a: &Element, b: &Element) -> Result<Element, Error> {
        Ok(self.wrap(&self.modulus + self.value(a)? - self.value(b)?))
    }

    fn mul(&self, a: &Element, b: &Element) -> Result<Element, Error> {
        Ok(self.wrap(self.value(a)? * self.value(b)?))
    }

    fn pow(&self, a: &Element, exponent: &BigUint) -> Result<Element, Error> {
        Ok(self.wrap(self.value(a)?.modpow(exponent, &self.modulus)))
    }

    fn invert(&self, a: &Element) -> Result<Element, Error> {
        self.value(a)?
            .modinv(&self.modulus)
            .map(|inverse| self.wrap(inverse))
            .ok_or(Error::Math("element is not a unit"))
    }

    fn is_unit(&self, a: &Element) -> Result<bool, Error> {
        Ok(self.value(a)?.gcd(&self.modulus).is_one())
    }

    fn size(&self) -> Option<BigUint> {
        Some(self.modulus.clone())
    }

    fn characteristic(&self) -> BigUint {
        self.modulus.clone()
    }

    fn contains(&self, a: &Element) -> bool {
        self.value(a).is_ok()
    }

    fn restore_element(&self, repr: &Repr) -> Result<Element, Error> {
        let value = repr.as_uint()?;
        if value >= self.modulus {
            return Err(RepresentationError::InvalidValue(format!(
                "{value} is not reduced modulo {}",
                self.modulus
            ))
            .into());
        }
        Ok(self.wrap(value))
    }

    fn random(&self, rng: &mut dyn RngCore) -> Result<Element, Error> {
        Ok(self.wrap(rng.gen_biguint_below(&self.modulus)))
    }
}

/// The prime field `F_p`.
///
/// Elements are [`ZnElement`]s, shared with [`Zn`].
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Zp {
    ring: Zn,
}

impl Zp {
    /// Fails with [`Error::Math`] unless `p` is (probably) prime.
    pub fn new(p: BigUint) -> Result<Self, Error> {
        if !is_probable_prime(&p) {
            return Err(Error::Math("modulus is not prime"));
        }
        Ok(Self { ring: Zn::new(p)? })
    }

    pub fn modulus(&self) -> &BigUint {
        self.ring.modulus()
    }

    pub fn element(&self, value: impl Into<BigUint>) -> Element {
        self.ring.element(value)
    }

    pub fn value<'a>(&self, a: &'a Element) -> Result<&'a BigUint, Error> {
        self.ring.value(a)
    }

    /// A square root of `a`, if `a` is a square.
    pub fn sqrt(&self, a: &Element) -> Result<Option<Element>, Error> {
        Ok(sqrt_mod(self.value(a)?, self.modulus()).map(|root| self.element(root)))
    }

    /// A cube root of `a`, if `a` is a cube. The other roots are `r * w` and
    /// `r * w^2` for `w` = [`Zp::cube_root_of_unity`].
    pub fn cube_root(&self, a: &Element) -> Result<Option<Element>, Error> {
        Ok(cube_root_mod(self.value(a)?, self.modulus()).map(|root| self.element(root)))
    }

    /// A primitive cube root of unity; exists iff `p ≡ 1 (mod 3)`.
    pub fn cube_root_of_unity(&self) -> Option<Element> {
        cube_root_of_unity(self.modulus()).map(|w| self.element(w))
    }
}

impl Representable for Zp {
    fn to_repr(&self) -> Repr {
        self.ring.to_repr()
    }
}

impl Restore for Zp {
    fn from_repr(repr: &Repr) -> Result<Self, RepresentationError> {
        let ring = Zn::from_repr(repr)?;
        Zp::new(ring.modulus)
            .map_err(|err| RepresentationError::InvalidValue(err.to_string()))
    }
}

impl StandaloneRepresentable for Zp {
    fn type_name(&self) -> &'static str {
        "zp"
    }
}

impl Ring for Zp {
    fn zero(&self) -> Element {
        self.ring.zero()
    }

    fn one(&self) -> Element {
        self.ring.one()
    }

    fn add(&self, a: &Element, b: &Element) -> Result<Element, Error> {
        self.ring.add(a, b)
    }

    fn negate(&self, a: &Element) -> Result<Element, Error> {
        self.ring.negate(a)
    }

    fn sub(&self, a: &Element, b: &Element) -> Result<Element, Error> {
        self.ring.sub(a, b)
    }

    fn mul(&self, a: &Element, b: &Element) -> Result<Element, Error> {
        self.ring.mul(a, b)
    }

    fn pow(&self, a: &Element, exponent: &BigUint) -> Result<Element, Error> {
        self.ring.pow(a, exponent)
    }

    fn invert(&self, a: &Element) -> Result<Element, Error> {
        self.ring.invert(a)
    }

    fn is_unit(&self, a: &Element) -> Result<bool, Error> {
        Ok(!self.value(a)?.is_zero())
    }

    fn size(&self) -> Option<BigUint> {
        self.ring.size()
    }

    fn characteristic(&self) -> BigUint {
        self.ring.characteristic()
    }

    fn unit_count(&self) -> Option<BigUint> {
        field_unit_count(self.size())
    }

    fn contains(&self, a: &Element) -> bool {
        self.ring.contains(a)
    }

    fn restore_element(&self, repr: &Repr) -> Result<Element, Error> {
        self.ring.restore_element(repr)
    }

    fn random(&self, rng: &mut dyn RngCore) -> Result<Element, Error> {
        self.ring.random(rng)
    }

    fn as_field(&self) -> Option<&dyn Field> {
        Some(self)
    }
}

impl Field for Zp {}
