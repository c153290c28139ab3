//! Prime-order subgroups of `y^2 = x^3 + b` over a prime field.
//!
//! Besides the group law this module implements point compression by
//! y-coordinate: for a fixed `y` the x-coordinates of curve points are the
//! cube roots of `y^2 - b`, so a point is described by `y` and the position of
//! its `x` in the list of those roots (`r, r*w, r*w^2` for a primitive cube root
//! of unity `w` when `p ≡ 1 (mod 3)`, just `r` otherwise).

use blake3::Hasher;
use num_bigint::{BigInt, BigUint, RandBigInt};
use num_integer::Integer;
use num_traits::{One, Zero};
use rand_core::RngCore;

use super::Group;
use crate::annotated;
use crate::arith::ring::number_theory::{cube_root_mod, cube_root_of_unity, sqrt_mod};
use crate::arith::{Element, Zp};
use crate::errors::{Error, RepresentationError};
use crate::repr::{Repr, ReprObject, Representable, Restore, StandaloneRepresentable};

const HASH_DOMAIN: &[u8] = b"bilinear/source-group/hash-into";
const HASH_ATTEMPTS: u32 = 1 << 12;

/// A point in affine coordinates, or the point at infinity.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum CurvePoint {
    Infinity,
    Affine { x: BigUint, y: BigUint },
}

impl CurvePoint {
    pub fn affine(x: impl Into<BigUint>, y: impl Into<BigUint>) -> Self {
        CurvePoint::Affine {
            x: x.into(),
            y: y.into(),
        }
    }

    pub fn is_infinity(&self) -> bool {
        matches!(self, CurvePoint::Infinity)
    }

    pub fn coordinates(&self) -> Option<(&BigUint, &BigUint)> {
        match self {
            CurvePoint::Infinity => None,
            CurvePoint::Affine { x, y } => Some((x, y)),
        }
    }
}

impl Representable for CurvePoint {
    fn to_repr(&self) -> Repr {
        match self {
            CurvePoint::Infinity => Repr::Null,
            CurvePoint::Affine { x, y } => ReprObject::new().with("x", x).with("y", y).into(),
        }
    }
}

impl Restore for CurvePoint {
    fn from_repr(repr: &Repr) -> Result<Self, RepresentationError> {
        if repr.is_null() {
            return Ok(CurvePoint::Infinity);
        }
        let object = repr.as_object()?;
        object.deny_unknown(&["x", "y"])?;
        Ok(CurvePoint::Affine {
            x: object.field("x")?,
            y: object.field("y")?,
        })
    }
}

/// Compressed form of an affine point: its y-coordinate and the index of its
/// x-coordinate among the candidate cube roots.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct CompressedPoint {
    y: BigUint,
    index: u8,
}

annotated!(CompressedPoint { y, index });

impl CompressedPoint {
    pub fn new(y: BigUint, index: u8) -> Self {
        Self { y, index }
    }

    pub fn y(&self) -> &BigUint {
        &self.y
    }

    pub fn index(&self) -> u8 {
        self.index
    }
}

/// Groups whose elements admit a compact encoding.
pub trait PointCompression {
    /// Fails with [`Error::CompressionImpossible`] if no candidate reproduces the point.
    fn compress(&self, point: &Element) -> Result<CompressedPoint, Error>;

    fn decompress(&self, compressed: &CompressedPoint) -> Result<Element, Error>;
}

/// Subgroup of prime order `order` of `E: y^2 = x^3 + b` over `F_p`, with
/// `#E = order * cofactor`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SourceGroup {
    field: Zp,
    b: BigUint,
    order: BigUint,
    cofactor: BigUint,
    generator: CurvePoint,
    omega: Option<BigUint>,
}

impl SourceGroup {
    /// Validates that `generator` lies on the curve and has order `order`.
    pub fn new(
        modulus: BigUint,
        b: BigUint,
        order: BigUint,
        cofactor: BigUint,
        generator: CurvePoint,
    ) -> Result<Self, Error> {
        let field = Zp::new(modulus)?;
        let b = b % field.modulus();
        let omega = cube_root_of_unity(field.modulus());
        let group = Self {
            field,
            b,
            order,
            cofactor,
            generator,
            omega,
        };
        if group.order < BigUint::from(2u32) || group.cofactor.is_zero() {
            return Err(Error::Math("order and cofactor must be positive"));
        }
        if group.generator.is_infinity() || !group.is_on_curve(&group.generator) {
            return Err(Error::Math("generator is not an affine point on the curve"));
        }
        if !group.mul_point(&group.generator, &group.order)?.is_infinity() {
            return Err(Error::Math("generator does not have the given order"));
        }
        Ok(group)
    }

    /// Builds the subgroup with a generator obtained by clearing the cofactor
    /// of random curve points. `order` must be prime.
    pub fn with_random_generator<R: RngCore + ?Sized>(
        modulus: BigUint,
        b: BigUint,
        order: BigUint,
        cofactor: BigUint,
        rng: &mut R,
    ) -> Result<Self, Error> {
        let field = Zp::new(modulus)?;
        let p = field.modulus().clone();
        let mut group = Self {
            b: b % &p,
            omega: cube_root_of_unity(&p),
            field,
            order,
            cofactor,
            generator: CurvePoint::Infinity,
        };
        for _ in 0..HASH_ATTEMPTS {
            let x = rng.gen_biguint_below(&p);
            let Some(y) = sqrt_mod(&((&x * &x * &x + &group.b) % &p), &p) else {
                continue;
            };
            let candidate = group.mul_point(&CurvePoint::Affine { x, y }, &group.cofactor)?;
            if candidate.is_infinity() {
                continue;
            }
            if !group.mul_point(&candidate, &group.order)?.is_infinity() {
                return Err(Error::Math("curve order is not order * cofactor"));
            }
            group.generator = candidate;
            return Ok(group);
        }
        Err(Error::Math("no point of the given order found"))
    }

    pub fn field(&self) -> &Zp {
        &self.field
    }

    pub fn b(&self) -> &BigUint {
        &self.b
    }

    pub fn order(&self) -> &BigUint {
        &self.order
    }

    pub fn cofactor(&self) -> &BigUint {
        &self.cofactor
    }

    pub fn generator_point(&self) -> &CurvePoint {
        &self.generator
    }

    fn p(&self) -> &BigUint {
        self.field.modulus()
    }

    /// The element `(x, y)`, which must lie in the subgroup.
    pub fn point(&self, x: impl Into<BigUint>, y: impl Into<BigUint>) -> Result<Element, Error> {
        let point = CurvePoint::affine(x, y);
        if !self.in_subgroup(&point)? {
            return Err(Error::ForeignElement("source-group"));
        }
        Ok(Element::new(point))
    }

    pub fn point_of<'a>(&self, a: &'a Element) -> Result<&'a CurvePoint, Error> {
        let point = a.value::<CurvePoint>("source-group")?;
        if !self.is_on_curve(point) {
            return Err(Error::ForeignElement("source-group"));
        }
        Ok(point)
    }

    fn is_on_curve(&self, point: &CurvePoint) -> bool {
        match point {
            CurvePoint::Infinity => true,
            CurvePoint::Affine { x, y } => {
                let p = self.p();
                x < p && y < p && (y * y) % p == (x * x * x + &self.b) % p
            }
        }
    }

    fn in_subgroup(&self, point: &CurvePoint) -> Result<bool, Error> {
        if !self.is_on_curve(point) {
            return Ok(false);
        }
        if self.cofactor.is_one() {
            return Ok(true);
        }
        Ok(self.mul_point(point, &self.order)?.is_infinity())
    }

    fn inverse_mod(&self, value: &BigUint) -> Result<BigUint, Error> {
        value
            .modinv(self.p())
            .ok_or(Error::Math("division by zero in the curve law"))
    }

    fn neg_point(&self, point: &CurvePoint) -> CurvePoint {
        match point {
            CurvePoint::Infinity => CurvePoint::Infinity,
            CurvePoint::Affine { x, y } => CurvePoint::Affine {
                x: x.clone(),
                y: (self.p() - y) % self.p(),
            },
        }
    }

    pub(crate) fn add_points(&self, a: &CurvePoint, b: &CurvePoint) -> Result<CurvePoint, Error> {
        let (x1, y1, x2, y2) = match (a, b) {
            (CurvePoint::Infinity, _) => return Ok(b.clone()),
            (_, CurvePoint::Infinity) => return Ok(a.clone()),
            (CurvePoint::Affine { x: x1, y: y1 }, CurvePoint::Affine { x: x2, y: y2 }) => {
                (x1, y1, x2, y2)
            }
        };
        let p = self.p();
        if x1 == x2 {
            if ((y1 + y2) % p).is_zero() {
                return Ok(CurvePoint::Infinity);
            }
            return self.double_point(a);
        }
        let lambda = ((p + y2 - y1) * self.inverse_mod(&((p + x2 - x1) % p))?) % p;
        Ok(self.chord_point(&lambda, x1, y1, x2))
    }

    pub(crate) fn double_point(&self, a: &CurvePoint) -> Result<CurvePoint, Error> {
        let (x, y) = match a {
            CurvePoint::Infinity => return Ok(CurvePoint::Infinity),
            CurvePoint::Affine { x, y } => (x, y),
        };
        if y.is_zero() {
            return Ok(CurvePoint::Infinity);
        }
        let p = self.p();
        let lambda = (x * x * 3u32 % p * self.inverse_mod(&(y * 2u32 % p))?) % p;
        Ok(self.chord_point(&lambda, x, y, x))
    }

    /// Third intersection of the line of slope `lambda` through `(x1, y1)`, negated.
    fn chord_point(&self, lambda: &BigUint, x1: &BigUint, y1: &BigUint, x2: &BigUint) -> CurvePoint {
        let p = self.p();
        let x3 = (lambda * lambda + p * 2u32 - x1 - x2) % p;
        let y3 = (lambda * ((p + x1 - &x3) % p) + p - y1) % p;
        CurvePoint::Affine { x: x3, y: y3 }
    }

    pub(crate) fn mul_point(&self, point: &CurvePoint, k: &BigUint) -> Result<CurvePoint, Error> {
        let mut result = CurvePoint::Infinity;
        for bit in (0..k.bits()).rev() {
            result = self.double_point(&result)?;
            if k.bit(bit) {
                result = self.add_points(&result, point)?;
            }
        }
        Ok(result)
    }

    /// Possible x-coordinates of a point with y-coordinate `y`.
    fn candidates(&self, y: &BigUint) -> Vec<BigUint> {
        let p = self.p();
        let rhs = (y * y + p - &self.b) % p;
        let Some(root) = cube_root_mod(&rhs, p) else {
            return Vec::new();
        };
        match &self.omega {
            Some(omega) => {
                let second = (&root * omega) % p;
                let third = (&second * omega) % p;
                vec![root, second, third]
            }
            None => vec![root],
        }
    }

    /// Hashes `data` onto the subgroup: try-and-increment over BLAKE3, then
    /// cofactor clearing.
    pub fn hash_to_point(&self, data: &[u8]) -> Result<Element, Error> {
        let p = self.p();
        let width = p.bits().div_ceil(8) as usize + 16;
        for counter in 0..HASH_ATTEMPTS {
            let mut hasher = Hasher::new();
            hasher.update(HASH_DOMAIN);
            hasher.update(&(data.len() as u64).to_le_bytes());
            hasher.update(data);
            hasher.update(&counter.to_le_bytes());
            let mut wide = vec![0u8; width + 1];
            hasher.finalize_xof().fill(&mut wide);

            let x = BigUint::from_bytes_be(&wide[1..]) % p;
            let rhs = (&x * &x * &x + &self.b) % p;
            let Some(y) = sqrt_mod(&rhs, p) else {
                continue;
            };
            let y = if y.is_odd() == (wide[0] & 1 == 1) {
                y
            } else {
                (p - y) % p
            };
            let point = self.mul_point(&CurvePoint::Affine { x, y }, &self.cofactor)?;
            if !point.is_infinity() {
                return Ok(Element::new(point));
            }
        }
        Err(Error::Math("hashing onto the curve did not find a point"))
    }
}

impl PointCompression for SourceGroup {
    fn compress(&self, point: &Element) -> Result<CompressedPoint, Error> {
        let (_, y) = self
            .point_of(point)?
            .coordinates()
            .ok_or(Error::Unsupported("the point at infinity has no compressed form"))?;
        self.candidates(y)
            .into_iter()
            .position(|x| Element::new(CurvePoint::Affine { x, y: y.clone() }) == *point)
            .map(|index| CompressedPoint::new(y.clone(), index as u8))
            .ok_or(Error::CompressionImpossible(
                "no candidate x-coordinate reproduces the point",
            ))
    }

    fn decompress(&self, compressed: &CompressedPoint) -> Result<Element, Error> {
        if compressed.index > 2 {
            return Err(RepresentationError::InvalidValue(format!(
                "compression index {} out of range",
                compressed.index
            ))
            .into());
        }
        if compressed.y >= *self.p() {
            return Err(RepresentationError::InvalidValue("y-coordinate not reduced".into()).into());
        }
        let x = self
            .candidates(&compressed.y)
            .into_iter()
            .nth(usize::from(compressed.index))
            .ok_or(Error::Math("no curve point for this y-coordinate and index"))?;
        let point = CurvePoint::Affine {
            x,
            y: compressed.y.clone(),
        };
        if !self.in_subgroup(&point)? {
            return Err(Error::Math("decompressed point is outside the subgroup"));
        }
        Ok(Element::new(point))
    }
}

impl Representable for SourceGroup {
    fn to_repr(&self) -> Repr {
        ReprObject::new()
            .with("modulus", self.p())
            .with("b", &self.b)
            .with("order", &self.order)
            .with("cofactor", &self.cofactor)
            .with("generator", &self.generator)
            .into()
    }
}

impl Restore for SourceGroup {
    fn from_repr(repr: &Repr) -> Result<Self, RepresentationError> {
        let object = repr.as_object()?;
        object.deny_unknown(&["modulus", "b", "order", "cofactor", "generator"])?;
        SourceGroup::new(
            object.field("modulus")?,
            object.field("b")?,
            object.field("order")?,
            object.field("cofactor")?,
            object.field("generator")?,
        )
        .map_err(|err| RepresentationError::InvalidValue(err.to_string()))
    }
}

impl StandaloneRepresentable for SourceGroup {
    fn type_name(&self) -> &'static str {
        "source-group"
    }
}

impl Group for SourceGroup {
    fn identity(&self) -> Element {
        Element::new(CurvePoint::Infinity)
    }

    fn op(&self, a: &Element, b: &Element) -> Result<Element, Error> {
        let sum = self.add_points(self.point_of(a)?, self.point_of(b)?)?;
        Ok(Element::new(sum))
    }

    fn inverse(&self, a: &Element) -> Result<Element, Error> {
        Ok(Element::new(self.neg_point(self.point_of(a)?)))
    }

    fn pow(&self, a: &Element, exponent: &BigInt) -> Result<Element, Error> {
        let point = self.point_of(a)?;
        let k = exponent
            .mod_floor(&BigInt::from(self.order.clone()))
            .magnitude()
            .clone();
        Ok(Element::new(self.mul_point(point, &k)?))
    }

    fn size(&self) -> Option<BigUint> {
        Some(self.order.clone())
    }

    fn generator(&self) -> Result<Element, Error> {
        Ok(Element::new(self.generator.clone()))
    }

    fn is_commutative(&self) -> bool {
        true
    }

    fn contains(&self, a: &Element) -> bool {
        a.downcast_ref::<CurvePoint>()
            .is_some_and(|point| self.in_subgroup(point).unwrap_or(false))
    }

    fn restore_element(&self, repr: &Repr) -> Result<Element, Error> {
        let point = CurvePoint::from_repr(repr)?;
        if !self.in_subgroup(&point)? {
            return Err(RepresentationError::InvalidValue("point is not in the group".into()).into());
        }
        Ok(Element::new(point))
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;
    use std::sync::Arc;

    use rand::SeedableRng;

    use super::*;

    /// `y^2 = x^3 + 3` over `F_7` has 13 points.
    fn toy_curve() -> SourceGroup {
        SourceGroup::new(
            BigUint::from(7u32),
            BigUint::from(3u32),
            BigUint::from(13u32),
            BigUint::one(),
            CurvePoint::affine(1u32, 2u32),
        )
        .expect("valid toy curve")
    }

    fn all_points(group: &SourceGroup) -> Vec<Element> {
        let g = group.generator().unwrap();
        (1..13)
            .map(|k| group.pow(&g, &BigInt::from(k)).unwrap())
            .collect()
    }

    #[test]
    fn group_law() {
        let group = toy_curve();
        let g = group.generator().unwrap();
        assert_eq!(group.pow(&g, &BigInt::from(13)).unwrap(), group.identity());
        assert_eq!(group.pow(&g, &BigInt::from(2)).unwrap(), group.point(6u32, 3u32).unwrap());
        assert_eq!(
            group.pow(&g, &BigInt::from(-1)).unwrap(),
            group.inverse(&g).unwrap()
        );

        let points = all_points(&group);
        let distinct: BTreeSet<_> = points
            .iter()
            .map(|p| group.point_of(p).unwrap().coordinates().map(|(x, y)| (x.clone(), y.clone())))
            .collect();
        assert_eq!(distinct.len(), 12);
        for a in &points {
            for b in &points {
                let ab = group.op(a, b).unwrap();
                assert_eq!(ab, group.op(b, a).unwrap());
                assert!(group.contains(&ab));
            }
        }
    }

    #[test]
    fn compression_round_trips_with_every_index() {
        let group = toy_curve();
        let mut indices = BTreeSet::new();
        for point in all_points(&group) {
            let compressed = group.compress(&point).expect("compress");
            indices.insert(compressed.index());
            assert_eq!(group.decompress(&compressed).unwrap(), point);

            let restored = CompressedPoint::from_repr(&compressed.to_repr()).unwrap();
            assert_eq!(restored, compressed);
        }
        assert_eq!(indices, BTreeSet::from([0, 1, 2]));
    }

    #[test]
    fn compression_edge_cases() {
        let group = toy_curve();
        assert!(matches!(
            group.compress(&group.identity()),
            Err(Error::Unsupported(_))
        ));
        // off the curve
        let stray = Element::new(CurvePoint::affine(0u32, 1u32));
        assert!(matches!(group.compress(&stray), Err(Error::ForeignElement(_))));

        assert!(group.decompress(&CompressedPoint::new(BigUint::from(2u32), 3)).is_err());
        // 0^2 - 3 = 4 is not a cube mod 7
        assert!(matches!(
            group.decompress(&CompressedPoint::new(BigUint::zero(), 0)),
            Err(Error::Math(_))
        ));
    }

    #[test]
    fn construction_validates_generator() {
        let wrong_order = SourceGroup::new(
            BigUint::from(7u32),
            BigUint::from(3u32),
            BigUint::from(11u32),
            BigUint::one(),
            CurvePoint::affine(1u32, 2u32),
        );
        assert!(wrong_order.is_err());
        let off_curve = SourceGroup::new(
            BigUint::from(7u32),
            BigUint::from(3u32),
            BigUint::from(13u32),
            BigUint::one(),
            CurvePoint::affine(1u32, 1u32),
        );
        assert!(off_curve.is_err());
    }

    #[test]
    fn random_generator_has_the_subgroup_order() {
        let mut rng = rand::rngs::StdRng::seed_from_u64(8);
        // y^2 = x^3 + 1 over F_11 has 12 points
        let group = SourceGroup::with_random_generator(
            BigUint::from(11u32),
            BigUint::one(),
            BigUint::from(3u32),
            BigUint::from(4u32),
            &mut rng,
        )
        .unwrap();
        let g = group.generator().unwrap();
        assert_ne!(g, group.identity());
        assert_eq!(group.pow(&g, &BigInt::from(3)).unwrap(), group.identity());
        assert!(SourceGroup::from_repr(&group.to_repr()).is_ok());
    }

    #[test]
    fn hashing_is_deterministic() {
        let group = toy_curve();
        let a = group.hash_to_point(b"alpha").unwrap();
        assert_eq!(a, group.hash_to_point(b"alpha").unwrap());
        assert!(group.contains(&a));
        assert_ne!(a, group.identity());
    }

    #[test]
    fn group_and_elements_restore() {
        let group: Arc<dyn Group> = Arc::new(toy_curve());
        let restored = Arc::<dyn Group>::from_repr(&group.to_repr()).unwrap();
        assert!(*restored == *group);

        let g = group.generator().unwrap();
        assert_eq!(restored.restore_element(&g.to_repr()).unwrap(), g);
        assert_eq!(
            restored.restore_element(&Repr::Null).unwrap(),
            group.identity()
        );
        let stray = CurvePoint::affine(1u32, 1u32).to_repr();
        assert!(restored.restore_element(&stray).is_err());
    }
}
