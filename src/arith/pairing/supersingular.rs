//! Type 1 pairing on the supersingular curve `y^2 = x^3 + 1`.
//!
//! For `p ≡ 2 (mod 3)` the curve has `p + 1` points and embedding degree 2.
//! Parameters are chosen as `p = 12 * k * r - 1` for a prime `r`, so that
//! `p ≡ 11 (mod 12)` and `F_{p^2} = F_p[i] / (i^2 + 1)`. The pairing is the
//! reduced Tate pairing composed with the distortion map
//! `psi(x, y) = (zeta * x, y)`, `zeta` a primitive cube root of unity in
//! `F_{p^2} \ F_p`:
//!
//! ```text
//! e(P, Q) = f_{r,P}(psi(Q)) ^ ((p^2 - 1) / r)
//! ```

use std::sync::Arc;

use num_bigint::{BigUint, RandBigInt};
use num_traits::{One, Zero};
use rand_chacha::ChaCha20Rng;
use rand_core::{RngCore, SeedableRng};
use tracing::{debug, instrument};

use super::{BilinearGroup, BilinearMap, HashIntoGroup, PairingType};
use crate::arith::ring::number_theory::{is_probable_prime, random_prime};
use crate::arith::{
    CurvePoint, Element, Fp2Element, Group, QuadraticExtensionField, RingGroup, SourceGroup,
};
use crate::errors::{Error, RepresentationError};
use crate::factory::{BilinearGroupProvider, BilinearGroupRequirement};
use crate::repr::{Repr, ReprObject, Representable, Restore, StandaloneRepresentable};

/// `(security level, bits of r, bits of p)`, the smallest row covering the
/// requested level is used.
const PARAMETERS: [(u32, u64, u64); 3] = [(80, 160, 512), (112, 224, 1024), (128, 256, 1536)];

/// Supersingular bilinear group with `G1 = G2` of prime order `r` and
/// `GT ⊂ F_{p^2}^*`.
#[derive(Debug)]
pub struct SupersingularBilinearGroup {
    curve: Arc<SourceGroup>,
    pairing: Arc<TatePairing>,
}

impl SupersingularBilinearGroup {
    /// Wraps a source group on `y^2 = x^3 + 1` whose order times cofactor is `p + 1`.
    pub fn new(curve: SourceGroup) -> Result<Self, Error> {
        let p = curve.field().modulus().clone();
        if !curve.b().is_one() {
            return Err(Error::Math("the curve must be y^2 = x^3 + 1"));
        }
        if (&p % 3u32) != BigUint::from(2u32) {
            return Err(Error::Math("the curve is supersingular only for p = 2 mod 3"));
        }
        if curve.order() * curve.cofactor() != &p + 1u32 {
            return Err(Error::Math("order * cofactor must equal p + 1"));
        }
        let field = QuadraticExtensionField::new(p.clone())?;
        let zeta = cube_root_of_unity(&field)?;
        let curve = Arc::new(curve);
        let pairing = Arc::new(TatePairing {
            gt: Arc::new(RingGroup::unit(Arc::new(field.clone()))),
            curve: curve.clone(),
            field,
            zeta,
        });
        Ok(Self { curve, pairing })
    }

    /// Samples fresh parameters: a prime `r` of `order_bits` bits and a prime
    /// `p = 12 * k * r - 1` of `field_bits` bits.
    #[instrument(level = "info", skip(rng))]
    pub fn generate<R: RngCore + ?Sized>(
        rng: &mut R,
        order_bits: u64,
        field_bits: u64,
    ) -> Result<Self, Error> {
        if order_bits < 3 || field_bits < order_bits + 8 {
            return Err(Error::InvalidConfig(format!(
                "cannot fit a {order_bits}-bit subgroup into a {field_bits}-bit field"
            )));
        }
        let order = random_prime(rng, order_bits);
        let k_bits = field_bits - order_bits - 3;
        let top = BigUint::one() << (k_bits - 1);
        let (p, cofactor) = loop {
            let cofactor = (rng.gen_biguint(k_bits) | &top) * 12u32;
            let p = &cofactor * &order - 1u32;
            if p.bits() == field_bits
                && !(&cofactor % &order).is_zero()
                && is_probable_prime(&p)
            {
                break (p, cofactor);
            }
        };
        debug!(order_bits = order.bits(), field_bits = p.bits(), "found supersingular parameters");
        let curve = SourceGroup::with_random_generator(p, BigUint::one(), order, cofactor, rng)?;
        Self::new(curve)
    }

    pub fn curve(&self) -> &SourceGroup {
        &self.curve
    }
}

/// `(-1 + sqrt(-3)) / 2` with `sqrt(-3) = i * sqrt(3)`; 3 is a square mod `p`
/// for `p ≡ 11 (mod 12)`.
fn cube_root_of_unity(field: &QuadraticExtensionField) -> Result<Fp2Element, Error> {
    let p = field.base().modulus();
    let sqrt3 = BigUint::from(3u32).modpow(&((p + 1u32) >> 2), p);
    if (&sqrt3 * &sqrt3) % p != BigUint::from(3u32) {
        return Err(Error::Math("3 is not a square modulo p"));
    }
    let half = BigUint::from(2u32)
        .modinv(p)
        .ok_or(Error::Math("2 is not invertible modulo p"))?;
    Ok(field.reduce((p - 1u32) * &half, sqrt3 * half))
}

impl Representable for SupersingularBilinearGroup {
    fn to_repr(&self) -> Repr {
        ReprObject::new()
            .with("modulus", self.curve.field().modulus())
            .with("order", self.curve.order())
            .with("cofactor", self.curve.cofactor())
            .with("generator", self.curve.generator_point())
            .into()
    }
}

impl Restore for SupersingularBilinearGroup {
    fn from_repr(repr: &Repr) -> Result<Self, RepresentationError> {
        let object = repr.as_object()?;
        object.deny_unknown(&["modulus", "order", "cofactor", "generator"])?;
        SourceGroup::new(
            object.field("modulus")?,
            BigUint::one(),
            object.field("order")?,
            object.field("cofactor")?,
            object.field("generator")?,
        )
        .and_then(SupersingularBilinearGroup::new)
        .map_err(|err| RepresentationError::InvalidValue(err.to_string()))
    }
}

impl StandaloneRepresentable for SupersingularBilinearGroup {
    fn type_name(&self) -> &'static str {
        "supersingular-bilinear-group"
    }
}

impl BilinearGroup for SupersingularBilinearGroup {
    fn pairing_type(&self) -> PairingType {
        PairingType::Type1
    }

    fn g1(&self) -> Arc<dyn Group> {
        self.curve.clone()
    }

    fn g2(&self) -> Arc<dyn Group> {
        self.curve.clone()
    }

    fn gt(&self) -> Arc<dyn Group> {
        self.pairing.gt.clone()
    }

    fn bilinear_map(&self) -> Arc<dyn BilinearMap> {
        self.pairing.clone()
    }

    fn hash_into_g1(&self) -> Result<Arc<dyn HashIntoGroup>, Error> {
        Ok(self.curve.clone())
    }

    fn hash_into_g2(&self) -> Result<Arc<dyn HashIntoGroup>, Error> {
        Ok(self.curve.clone())
    }
}

/// Reduced Tate pairing with distortion.
#[derive(Debug)]
struct TatePairing {
    curve: Arc<SourceGroup>,
    field: QuadraticExtensionField,
    zeta: Fp2Element,
    gt: Arc<RingGroup>,
}

/// One Miller step: `l(S) / v(S)` for the line through `T` and `U`, and `T + U`.
struct LineValue {
    numerator: Fp2Element,
    denominator: Option<Fp2Element>,
    sum: CurvePoint,
}

impl LineValue {
    /// Multiplies the line value into the running quotient and returns `T + U`.
    fn absorb(
        self,
        field: &QuadraticExtensionField,
        numerator: &mut Fp2Element,
        denominator: &mut Fp2Element,
    ) -> CurvePoint {
        *numerator = field.mul_values(numerator, &self.numerator);
        if let Some(v) = &self.denominator {
            *denominator = field.mul_values(denominator, v);
        }
        self.sum
    }
}

impl TatePairing {
    fn embed(&self, a: &BigUint) -> Fp2Element {
        self.field.reduce(a.clone(), BigUint::zero())
    }

    fn line(
        &self,
        t: &CurvePoint,
        u: &CurvePoint,
        sx: &Fp2Element,
        sy: &Fp2Element,
    ) -> Result<LineValue, Error> {
        let ((xt, yt), (xu, yu)) = match (t.coordinates(), u.coordinates()) {
            (Some(t), Some(u)) => (t, u),
            _ => return Err(Error::Math("Miller loop reached the point at infinity")),
        };
        let p = self.curve.field().modulus();
        let dx = self.field.sub_values(sx, &self.embed(xt));

        if xt == xu && ((yt + yu) % p).is_zero() {
            return Ok(LineValue {
                numerator: dx,
                denominator: None,
                sum: CurvePoint::Infinity,
            });
        }

        let (slope_num, slope_den) = if t == u {
            ((xt * xt * 3u32) % p, (yt * 2u32) % p)
        } else {
            ((p + yu - yt) % p, (p + xu - xt) % p)
        };
        let slope = (slope_num
            * slope_den
                .modinv(p)
                .ok_or(Error::Math("vertical tangent in the Miller loop"))?)
            % p;
        let numerator = self.field.sub_values(
            &self.field.sub_values(sy, &self.embed(yt)),
            &self.field.mul_values(&self.embed(&slope), &dx),
        );
        let sum = self.curve.add_points(t, u)?;
        let denominator = sum
            .coordinates()
            .map(|(x, _)| self.field.sub_values(sx, &self.embed(x)));
        Ok(LineValue {
            numerator,
            denominator,
            sum,
        })
    }

    /// `f_{r,P}(S)` as a single quotient.
    fn miller_loop(
        &self,
        point: &CurvePoint,
        sx: &Fp2Element,
        sy: &Fp2Element,
    ) -> Result<Fp2Element, Error> {
        let order = self.curve.order();
        let one = self.embed(&BigUint::one());
        let (mut numerator, mut denominator) = (one.clone(), one);
        let mut t = point.clone();

        for bit in (0..order.bits().saturating_sub(1)).rev() {
            numerator = self.field.mul_values(&numerator, &numerator);
            denominator = self.field.mul_values(&denominator, &denominator);
            let step = self.line(&t, &t, sx, sy)?;
            t = step.absorb(&self.field, &mut numerator, &mut denominator);
            if order.bit(bit) {
                let step = self.line(&t, point, sx, sy)?;
                t = step.absorb(&self.field, &mut numerator, &mut denominator);
            }
        }
        if !t.is_infinity() {
            return Err(Error::Math("point order does not divide the group order"));
        }
        let inverse = self
            .field
            .invert_values(&denominator)
            .ok_or(Error::Math("degenerate Miller loop"))?;
        Ok(self.field.mul_values(&numerator, &inverse))
    }

    /// `f^((p^2 - 1) / r) = (conj(f) / f)^cofactor`.
    fn final_exponentiation(&self, f: &Fp2Element) -> Result<Fp2Element, Error> {
        let inverse = self
            .field
            .invert_values(f)
            .ok_or(Error::Math("degenerate Miller loop"))?;
        let unitary = self.field.mul_values(&self.field.conjugate_values(f), &inverse);
        Ok(self.field.pow_values(&unitary, self.curve.cofactor()))
    }
}

impl BilinearMap for TatePairing {
    fn apply(&self, g1: &Element, g2: &Element) -> Result<Element, Error> {
        if !self.curve.contains(g1) || !self.curve.contains(g2) {
            return Err(Error::ForeignElement("supersingular-bilinear-group"));
        }
        let (p, q) = (self.curve.point_of(g1)?, self.curve.point_of(g2)?);
        let Some((xq, yq)) = q.coordinates() else {
            return Ok(self.gt.identity());
        };
        if p.is_infinity() {
            return Ok(self.gt.identity());
        }
        let sx = self.field.mul_values(&self.zeta, &self.embed(xq));
        let sy = self.embed(yq);
        let f = self.miller_loop(p, &sx, &sy)?;
        let value = self.final_exponentiation(&f)?;
        self.gt.wrap(&Element::new(value))
    }
}

/// Provides [`SupersingularBilinearGroup`]s for prime-order Type 1 requirements
/// up to 128-bit security.
#[derive(Clone, Copy, Debug, Default)]
pub struct SupersingularProvider;

impl SupersingularProvider {
    /// `(bits of r, bits of p)` for the given security level.
    pub fn parameters(security_parameter: u32) -> Option<(u64, u64)> {
        if security_parameter == 0 {
            return None;
        }
        PARAMETERS
            .iter()
            .find(|(level, _, _)| security_parameter <= *level)
            .map(|&(_, order_bits, field_bits)| (order_bits, field_bits))
    }
}

impl BilinearGroupProvider for SupersingularProvider {
    fn check_requirements(
        &self,
        security_parameter: u32,
        requirements: &BilinearGroupRequirement,
    ) -> bool {
        requirements.pairing_type() == PairingType::Type1
            && requirements.cardinality_num_prime_factors() == 1
            && !requirements.hash_into_gt_needed()
            && Self::parameters(security_parameter).is_some()
    }

    fn provide_bilinear_group(
        &self,
        security_parameter: u32,
        requirements: &BilinearGroupRequirement,
    ) -> Result<Arc<dyn BilinearGroup>, Error> {
        if !self.check_requirements(security_parameter, requirements) {
            return Err(Error::UnsupportedConfig(format!(
                "supersingular groups cannot satisfy {requirements:?} at security {security_parameter}"
            )));
        }
        let (order_bits, field_bits) = Self::parameters(security_parameter)
            .ok_or_else(|| Error::UnsupportedConfig("security parameter out of range".into()))?;
        let mut rng = ChaCha20Rng::from_entropy();
        Ok(Arc::new(SupersingularBilinearGroup::generate(
            &mut rng, order_bits, field_bits,
        )?))
    }
}

#[cfg(test)]
mod tests {
    use num_bigint::BigInt;
    use rand::rngs::StdRng;

    use super::*;
    use crate::arith::Ring;

    fn small_group(seed: u64) -> SupersingularBilinearGroup {
        let mut rng = StdRng::seed_from_u64(seed);
        SupersingularBilinearGroup::generate(&mut rng, 24, 64).expect("parameters")
    }

    #[test]
    fn parameters_have_the_expected_shape() {
        let bg = small_group(1);
        let curve = bg.curve();
        let p = curve.field().modulus();
        assert_eq!(p.bits(), 64);
        assert_eq!(curve.order().bits(), 24);
        assert_eq!(p % 12u32, BigUint::from(11u32));
        assert_eq!(curve.order() * curve.cofactor(), p + 1u32);

        let field = QuadraticExtensionField::new(p.clone()).unwrap();
        let zeta = Element::new(cube_root_of_unity(&field).unwrap());
        assert_ne!(zeta, field.one());
        assert_eq!(field.pow(&zeta, &BigUint::from(3u32)).unwrap(), field.one());
    }

    #[test]
    fn pairing_is_bilinear_and_non_degenerate() {
        let bg = small_group(2);
        let (g1, gt) = (bg.g1(), bg.gt());
        let e = bg.bilinear_map();
        let g = g1.generator().unwrap();
        let base = e.apply(&g, &g).unwrap();
        assert_ne!(base, gt.identity());
        let order = BigInt::from(bg.curve().order().clone());
        assert_eq!(gt.pow(&base, &order).unwrap(), gt.identity());

        let (a, b) = (BigInt::from(1234567), BigInt::from(-89));
        let lhs = e
            .apply(&g1.pow(&g, &a).unwrap(), &g1.pow(&g, &b).unwrap())
            .unwrap();
        assert_eq!(lhs, gt.pow(&base, &(&a * &b)).unwrap());

        let h = bg.hash_into_g2().unwrap().hash_into(b"identity").unwrap();
        let x = BigInt::from(77);
        assert_eq!(
            e.apply(&g1.pow(&g, &x).unwrap(), &h).unwrap(),
            e.apply(&g, &g1.pow(&h, &x).unwrap()).unwrap()
        );
        assert_eq!(e.apply(&g1.identity(), &h).unwrap(), gt.identity());
    }

    #[test]
    fn restores_and_validates() {
        let bg: Arc<dyn BilinearGroup> = Arc::new(small_group(3));
        let restored = Arc::<dyn BilinearGroup>::from_repr(&bg.to_repr()).unwrap();
        assert!(*restored == *bg);
        assert!(bg.hash_into_gt().is_err());

        let mut tampered = bg.to_repr().as_object().unwrap().clone();
        let mut value = tampered.get("__value").unwrap().as_object().unwrap().clone();
        value.insert("cofactor", Repr::from(4u32));
        tampered.insert("__value", value.into());
        assert!(Arc::<dyn BilinearGroup>::from_repr(&tampered.into()).is_err());
    }

    #[test]
    fn provider_capabilities() {
        let provider = SupersingularProvider;
        let type1 = BilinearGroupRequirement::new(PairingType::Type1);
        assert!(provider.check_requirements(80, &type1));
        assert!(provider.check_requirements(128, &type1));
        assert!(!provider.check_requirements(129, &type1));
        assert!(!provider.check_requirements(0, &type1));
        assert!(!provider.check_requirements(80, &BilinearGroupRequirement::new(PairingType::Type3)));
        assert!(!provider.check_requirements(
            80,
            &BilinearGroupRequirement::with_prime_factors(PairingType::Type1, 2)
        ));
        assert!(!provider.check_requirements(
            80,
            &BilinearGroupRequirement::with_hashing(PairingType::Type1, true, true, true)
        ));
        assert_eq!(SupersingularProvider::parameters(100), Some((224, 1024)));
        assert!(matches!(
            provider.provide_bilinear_group(80, &BilinearGroupRequirement::new(PairingType::Type2)),
            Err(Error::UnsupportedConfig(_))
        ));
    }
}
