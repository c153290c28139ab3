use std::sync::Arc;

use num_bigint::BigUint;
use rand_core::RngCore;

use super::Ring;
use crate::arith::Element;
use crate::errors::{Error, RepresentationError};
use crate::repr::{Repr, ReprObject, Representable, Restore, StandaloneRepresentable};

/// Polynomial with coefficients in the base ring, lowest degree first.
///
/// Trailing zero coefficients are always trimmed, so the zero polynomial has
/// no coefficients.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Polynomial {
    coefficients: Vec<Element>,
}

impl Polynomial {
    pub fn coefficients(&self) -> &[Element] {
        &self.coefficients
    }

    /// `None` for the zero polynomial.
    pub fn degree(&self) -> Option<usize> {
        self.coefficients.len().checked_sub(1)
    }
}

impl Representable for Polynomial {
    fn to_repr(&self) -> Repr {
        self.coefficients.to_repr()
    }
}

/// The ring `R[x]` over an arbitrary base ring.
#[derive(Debug)]
pub struct PolynomialRing {
    base: Arc<dyn Ring>,
}

impl PolynomialRing {
    pub fn new(base: Arc<dyn Ring>) -> Self {
        Self { base }
    }

    pub fn base(&self) -> &Arc<dyn Ring> {
        &self.base
    }

    /// Builds a polynomial from base-ring coefficients, lowest degree first.
    pub fn polynomial(&self, coefficients: Vec<Element>) -> Result<Element, Error> {
        if !coefficients.iter().all(|c| self.base.contains(c)) {
            return Err(Error::ForeignElement("polynomial coefficient ring"));
        }
        Ok(self.wrap(coefficients))
    }

    fn wrap(&self, mut coefficients: Vec<Element>) -> Element {
        let zero = self.base.zero();
        while coefficients.last().is_some_and(|c| *c == zero) {
            coefficients.pop();
        }
        Element::new(Polynomial { coefficients })
    }

    pub fn polynomial_of<'a>(&self, a: &'a Element) -> Result<&'a Polynomial, Error> {
        let polynomial = a.value::<Polynomial>("polynomial-ring")?;
        if !polynomial.coefficients.iter().all(|c| self.base.contains(c)) {
            return Err(Error::ForeignElement("polynomial-ring"));
        }
        Ok(polynomial)
    }

    /// Evaluates `a` at `x` (Horner's rule).
    pub fn evaluate(&self, a: &Element, x: &Element) -> Result<Element, Error> {
        let polynomial = self.polynomial_of(a)?;
        let mut acc = self.base.zero();
        for coefficient in polynomial.coefficients.iter().rev() {
            acc = self.base.mul(&acc, x)?;
            acc = self.base.add(&acc, coefficient)?;
        }
        Ok(acc)
    }

    fn coefficient_at(&self, polynomial: &Polynomial, index: usize) -> Element {
        polynomial
            .coefficients
            .get(index)
            .cloned()
            .unwrap_or_else(|| self.base.zero())
    }
}

impl Representable for PolynomialRing {
    fn to_repr(&self) -> Repr {
        ReprObject::new().with("base", &self.base).into()
    }
}

impl Restore for PolynomialRing {
    fn from_repr(repr: &Repr) -> Result<Self, RepresentationError> {
        let object = repr.as_object()?;
        object.deny_unknown(&["base"])?;
        Ok(Self::new(object.field("base")?))
    }
}

impl StandaloneRepresentable for PolynomialRing {
    fn type_name(&self) -> &'static str {
        "polynomial-ring"
    }
}

impl Ring for PolynomialRing {
    fn zero(&self) -> Element {
        self.wrap(Vec::new())
    }

    fn one(&self) -> Element {
        self.wrap(vec![self.base.one()])
    }

    fn add(&self, a: &Element, b: &Element) -> Result<Element, Error> {
        let (a, b) = (self.polynomial_of(a)?, self.polynomial_of(b)?);
        let len = a.coefficients.len().max(b.coefficients.len());
        let sum = (0..len)
            .map(|i| {
                self.base
                    .add(&self.coefficient_at(a, i), &self.coefficient_at(b, i))
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(self.wrap(sum))
    }

    fn negate(&self, a: &Element) -> Result<Element, Error> {
        let negated = self
            .polynomial_of(a)?
            .coefficients
            .iter()
            .map(|c| self.base.negate(c))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(self.wrap(negated))
    }

    fn mul(&self, a: &Element, b: &Element) -> Result<Element, Error> {
        let (a, b) = (self.polynomial_of(a)?, self.polynomial_of(b)?);
        if a.coefficients.is_empty() || b.coefficients.is_empty() {
            return Ok(self.zero());
        }
        let mut product = vec![self.base.zero(); a.coefficients.len() + b.coefficients.len() - 1];
        for (i, x) in a.coefficients.iter().enumerate() {
            for (j, y) in b.coefficients.iter().enumerate() {
                let term = self.base.mul(x, y)?;
                product[i + j] = self.base.add(&product[i + j], &term)?;
            }
        }
        Ok(self.wrap(product))
    }

    /// Only constant polynomials with a unit coefficient are invertible.
    fn invert(&self, a: &Element) -> Result<Element, Error> {
        match self.polynomial_of(a)?.coefficients.as_slice() {
            [constant] => Ok(self.wrap(vec![self.base.invert(constant)?])),
            _ => Err(Error::Math("non-constant polynomial is not a unit")),
        }
    }

    fn is_unit(&self, a: &Element) -> Result<bool, Error> {
        match self.polynomial_of(a)?.coefficients.as_slice() {
            [constant] => self.base.is_unit(constant),
            _ => Ok(false),
        }
    }

    fn size(&self) -> Option<BigUint> {
        None
    }

    fn characteristic(&self) -> BigUint {
        self.base.characteristic()
    }

    fn contains(&self, a: &Element) -> bool {
        self.polynomial_of(a).is_ok()
    }

    fn restore_element(&self, repr: &Repr) -> Result<Element, Error> {
        let coefficients = repr
            .as_list()?
            .iter()
            .map(|c| self.base.restore_element(c))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(self.wrap(coefficients))
    }

    fn random(&self, _rng: &mut dyn RngCore) -> Result<Element, Error> {
        Err(Error::Unsupported("uniform sampling from an infinite ring"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::arith::Zn;

    fn ring() -> (Arc<Zn>, PolynomialRing) {
        let base = Arc::new(Zn::new(BigUint::from(7u32)).unwrap());
        (base.clone(), PolynomialRing::new(base))
    }

    #[test]
    fn arithmetic_trims_leading_zeros() {
        let (zn, ring) = ring();
        // (x + 1) * (x + 6) = x^2 + 6 over Z/7
        let a = ring.polynomial(vec![zn.element(1u32), zn.element(1u32)]).unwrap();
        let b = ring.polynomial(vec![zn.element(6u32), zn.element(1u32)]).unwrap();
        let product = ring.mul(&a, &b).unwrap();
        let expected = ring
            .polynomial(vec![zn.element(6u32), zn.zero(), zn.element(1u32)])
            .unwrap();
        assert_eq!(product, expected);

        let difference = ring.sub(&a, &a).unwrap();
        assert_eq!(difference, ring.zero());
        let degree = ring.polynomial_of(&difference).unwrap().degree();
        assert_eq!(degree, None);
    }

    #[test]
    fn horner_evaluation() {
        let (zn, ring) = ring();
        // 3x^2 + 2x + 5 at x = 4: 48 + 8 + 5 = 61 = 5 mod 7
        let p = ring
            .polynomial(vec![zn.element(5u32), zn.element(2u32), zn.element(3u32)])
            .unwrap();
        assert_eq!(ring.evaluate(&p, &zn.element(4u32)).unwrap(), zn.element(5u32));
        assert_eq!(ring.evaluate(&ring.zero(), &zn.element(4u32)).unwrap(), zn.zero());
    }

    #[test]
    fn units_are_unit_constants() {
        let (zn, ring) = ring();
        let three = ring.polynomial(vec![zn.element(3u32)]).unwrap();
        let inverse = ring.invert(&three).unwrap();
        assert_eq!(ring.mul(&three, &inverse).unwrap(), ring.one());
        let x = ring.polynomial(vec![zn.zero(), zn.one()]).unwrap();
        assert!(!ring.is_unit(&x).unwrap());
        assert!(ring.invert(&x).is_err());
    }

    #[test]
    fn elements_restore_through_base_ring() {
        let (zn, ring) = ring();
        let p = ring
            .polynomial(vec![zn.element(2u32), zn.element(0u32), zn.element(6u32)])
            .unwrap();
        assert_eq!(ring.restore_element(&p.to_repr()).unwrap(), p);
        let foreign = Zn::new(BigUint::from(11u32)).unwrap().element(9u32);
        assert!(ring.polynomial(vec![foreign]).is_err());
    }
}
