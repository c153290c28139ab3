use num_bigint::{BigUint, RandBigInt};
use num_traits::{One, Zero};
use rand_core::RngCore;

use super::{field_unit_count, Field, Ring, Zp};
use crate::annotated;
use crate::arith::Element;
use crate::errors::{Error, RepresentationError};
use crate::repr::{Repr, ReprObject, Representable, Restore, StandaloneRepresentable};

/// `c0 + c1 * i` with `i^2 = -1`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct Fp2Element {
    c0: BigUint,
    c1: BigUint,
}

annotated!(Fp2Element { c0, c1 });

impl Fp2Element {
    pub fn c0(&self) -> &BigUint {
        &self.c0
    }

    pub fn c1(&self) -> &BigUint {
        &self.c1
    }
}

/// `F_p[i] / (i^2 + 1)`, a field of `p^2` elements when `p ≡ 3 (mod 4)`.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct QuadraticExtensionField {
    base: Zp,
}

impl QuadraticExtensionField {
    pub fn new(p: BigUint) -> Result<Self, Error> {
        if (&p % 4u32) != BigUint::from(3u32) {
            return Err(Error::Math("-1 must be a non-residue: need p = 3 mod 4"));
        }
        Ok(Self { base: Zp::new(p)? })
    }

    pub fn base(&self) -> &Zp {
        &self.base
    }

    fn p(&self) -> &BigUint {
        self.base.modulus()
    }

    pub fn element(&self, c0: impl Into<BigUint>, c1: impl Into<BigUint>) -> Element {
        Element::new(self.reduce(c0.into(), c1.into()))
    }

    pub(crate) fn reduce(&self, c0: BigUint, c1: BigUint) -> Fp2Element {
        Fp2Element {
            c0: c0 % self.p(),
            c1: c1 % self.p(),
        }
    }

    pub fn coefficients<'a>(&self, a: &'a Element) -> Result<&'a Fp2Element, Error> {
        let value = a.value::<Fp2Element>("fp2")?;
        if value.c0 >= *self.p() || value.c1 >= *self.p() {
            return Err(Error::ForeignElement("fp2"));
        }
        Ok(value)
    }

    pub(crate) fn add_values(&self, a: &Fp2Element, b: &Fp2Element) -> Fp2Element {
        self.reduce(&a.c0 + &b.c0, &a.c1 + &b.c1)
    }

    pub(crate) fn sub_values(&self, a: &Fp2Element, b: &Fp2Element) -> Fp2Element {
        let p = self.p();
        self.reduce(p + &a.c0 - &b.c0, p + &a.c1 - &b.c1)
    }

    pub(crate) fn mul_values(&self, a: &Fp2Element, b: &Fp2Element) -> Fp2Element {
        let p = self.p();
        let real = (&a.c0 * &b.c0 + (p - &a.c1) * &b.c1) % p;
        let imaginary = &a.c0 * &b.c1 + &a.c1 * &b.c0;
        self.reduce(real, imaginary)
    }

    /// Complex conjugation, which is also the Frobenius map `x -> x^p`.
    pub(crate) fn conjugate_values(&self, a: &Fp2Element) -> Fp2Element {
        self.reduce(a.c0.clone(), self.p() - &a.c1)
    }

    pub(crate) fn invert_values(&self, a: &Fp2Element) -> Option<Fp2Element> {
        let p = self.p();
        let norm = (&a.c0 * &a.c0 + &a.c1 * &a.c1) % p;
        let norm_inv = norm.modinv(p)?;
        Some(self.reduce(&a.c0 * &norm_inv, (p - &a.c1) * &norm_inv))
    }

    pub(crate) fn pow_values(&self, a: &Fp2Element, exponent: &BigUint) -> Fp2Element {
        let mut result = self.reduce(BigUint::one(), BigUint::zero());
        for bit in (0..exponent.bits()).rev() {
            result = self.mul_values(&result, &result);
            if exponent.bit(bit) {
                result = self.mul_values(&result, a);
            }
        }
        result
    }

    pub fn conjugate(&self, a: &Element) -> Result<Element, Error> {
        Ok(Element::new(self.conjugate_values(self.coefficients(a)?)))
    }
}

impl Representable for QuadraticExtensionField {
    fn to_repr(&self) -> Repr {
        ReprObject::new().with("modulus", self.p()).into()
    }
}

impl Restore for QuadraticExtensionField {
    fn from_repr(repr: &Repr) -> Result<Self, RepresentationError> {
        let object = repr.as_object()?;
        object.deny_unknown(&["modulus"])?;
        QuadraticExtensionField::new(object.field("modulus")?)
            .map_err(|err| RepresentationError::InvalidValue(err.to_string()))
    }
}

impl StandaloneRepresentable for QuadraticExtensionField {
    fn type_name(&self) -> &'static str {
        "fp2"
    }
}

impl Ring for QuadraticExtensionField {
    fn zero(&self) -> Element {
        self.element(0u32, 0u32)
    }

    fn one(&self) -> Element {
        self.element(1u32, 0u32)
    }

    fn add(&self, a: &Element, b: &Element) -> Result<Element, Error> {
        Ok(Element::new(
            self.add_values(self.coefficients(a)?, self.coefficients(b)?),
        ))
    }

    fn negate(&self, a: &Element) -> Result<Element, Error> {
        let a = self.coefficients(a)?;
        Ok(Element::new(self.sub_values(&Fp2Element::default(), a)))
    }

    fn sub(&self, a: &Element, b: &Element) -> Result<Element, Error> {
        Ok(Element::new(
            self.sub_values(self.coefficients(a)?, self.coefficients(b)?),
        ))
    }

    fn mul(&self, a: &Element, b: &Element) -> Result<Element, Error> {
        Ok(Element::new(
            self.mul_values(self.coefficients(a)?, self.coefficients(b)?),
        ))
    }

    fn pow(&self, a: &Element, exponent: &BigUint) -> Result<Element, Error> {
        Ok(Element::new(self.pow_values(self.coefficients(a)?, exponent)))
    }

    fn invert(&self, a: &Element) -> Result<Element, Error> {
        self.invert_values(self.coefficients(a)?)
            .map(Element::new)
            .ok_or(Error::Math("zero is not invertible"))
    }

    fn is_unit(&self, a: &Element) -> Result<bool, Error> {
        Ok(*self.coefficients(a)? != Fp2Element::default())
    }

    fn size(&self) -> Option<BigUint> {
        Some(self.p() * self.p())
    }

    fn characteristic(&self) -> BigUint {
        self.p().clone()
    }

    fn unit_count(&self) -> Option<BigUint> {
        field_unit_count(self.size())
    }

    fn contains(&self, a: &Element) -> bool {
        self.coefficients(a).is_ok()
    }

    fn restore_element(&self, repr: &Repr) -> Result<Element, Error> {
        let value = Fp2Element::from_repr(repr)?;
        if value.c0 >= *self.p() || value.c1 >= *self.p() {
            return Err(RepresentationError::InvalidValue("coefficient not reduced".into()).into());
        }
        Ok(Element::new(value))
    }

    fn random(&self, rng: &mut dyn RngCore) -> Result<Element, Error> {
        let c0 = rng.gen_biguint_below(self.p());
        let c1 = rng.gen_biguint_below(self.p());
        Ok(self.element(c0, c1))
    }

    fn as_field(&self) -> Option<&dyn Field> {
        Some(self)
    }
}

impl Field for QuadraticExtensionField {}

#[cfg(test)]
mod tests {
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    use super::*;

    fn field() -> QuadraticExtensionField {
        QuadraticExtensionField::new(BigUint::from(103u32)).unwrap()
    }

    #[test]
    fn i_squared_is_minus_one() {
        let f = field();
        let i = f.element(0u32, 1u32);
        assert_eq!(f.mul(&i, &i).unwrap(), f.negate(&f.one()).unwrap());
        assert!(QuadraticExtensionField::new(BigUint::from(101u32)).is_err());
    }

    #[test]
    fn inverses_and_frobenius() {
        let f = field();
        let p = BigUint::from(103u32);
        let mut rng = StdRng::seed_from_u64(11);
        for _ in 0..20 {
            let a = f.random(&mut rng).unwrap();
            if a == f.zero() {
                continue;
            }
            let inverse = f.invert(&a).unwrap();
            assert_eq!(f.mul(&a, &inverse).unwrap(), f.one());
            assert_eq!(f.pow(&a, &p).unwrap(), f.conjugate(&a).unwrap());
            assert_eq!(f.restore_element(&a.to_repr()).unwrap(), a);
        }
        assert!(f.invert(&f.zero()).is_err());
        assert_eq!(f.unit_count(), Some(BigUint::from(103u32 * 103 - 1)));
    }

    #[test]
    fn element_repr_is_annotated() {
        let f = field();
        let repr = f.element(4u32, 9u32).to_repr();
        let object = repr.as_object().unwrap();
        assert_eq!(object.keys().collect::<Vec<_>>(), ["c0", "c1"]);
        assert!(f.restore_element(&Repr::from(4u32)).is_err());
    }
}
