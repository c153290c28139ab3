//! Arkworks-backed Type 3 bilinear groups (BN254, BLS12-381).
//!
//! `G1`, `G2` and `GT` are [`ArkGroup`]s over the curve's projective points
//! and pairing output. `G1` is additionally described as an explicit
//! [`SourceGroup`] over its base field, which gives point compression by
//! y-coordinate and hashing into `G1`.
//!
//! # Feature Flags
//!
//! `ark_bn254` enables [`BarretoNaehrigProvider`], `ark_bls12381` enables
//! [`Bls12Provider`].

use std::sync::Arc;

use ark_ec::pairing::{Pairing, PairingOutput};
use ark_ec::short_weierstrass::{Affine, Projective, SWCurveConfig};
use ark_ec::{AffineRepr, CurveGroup};
use ark_ff::{BigInteger, PrimeField};
use ark_std::Zero;
use num_bigint::BigUint;

use super::{BilinearGroup, BilinearMap, HashIntoGroup, PairingType};
use crate::arith::{
    ArkGroup, CompressedPoint, CurvePoint, Element, Group, PointCompression, SourceGroup,
};
use crate::errors::{Error, RepresentationError};
use crate::factory::{BilinearGroupProvider, BilinearGroupRequirement};
use crate::repr::{Repr, ReprObject, Representable, Restore, StandaloneRepresentable, TypeRegistry};

/// A pairing-friendly curve from arkworks with its type identifiers.
pub trait ArkCurve: Pairing {
    const NAME: &'static str;
    const G1_NAME: &'static str;
    const G2_NAME: &'static str;
    const GT_NAME: &'static str;
    /// Approximate security level in bits.
    const SECURITY_LEVEL: u32;

    /// `G1` as an explicit subgroup of `y^2 = x^3 + b` over the base field.
    fn g1_curve() -> Result<SourceGroup, Error>;

    fn g1_to_point(point: &Self::G1) -> CurvePoint;

    /// Fails with [`Error::ForeignElement`] for points outside `G1`.
    fn g1_from_point(point: &CurvePoint) -> Result<Self::G1, Error>;
}

fn to_biguint<F: PrimeField>(value: &F) -> BigUint {
    BigUint::from_bytes_le(&value.into_bigint().to_bytes_le())
}

fn modulus<F: PrimeField>() -> BigUint {
    BigUint::from_bytes_le(&F::MODULUS.to_bytes_le())
}

fn sw_to_point<C: SWCurveConfig>(point: &Projective<C>) -> CurvePoint
where
    C::BaseField: PrimeField,
{
    let affine = point.into_affine();
    if affine.infinity {
        return CurvePoint::Infinity;
    }
    CurvePoint::Affine {
        x: to_biguint(&affine.x),
        y: to_biguint(&affine.y),
    }
}

fn sw_from_point<C: SWCurveConfig>(point: &CurvePoint) -> Result<Projective<C>, Error>
where
    C::BaseField: PrimeField,
{
    let (x, y) = match point {
        CurvePoint::Infinity => return Ok(Projective::zero()),
        CurvePoint::Affine { x, y } => (x, y),
    };
    let affine = Affine::<C>::new_unchecked(
        C::BaseField::from_le_bytes_mod_order(&x.to_bytes_le()),
        C::BaseField::from_le_bytes_mod_order(&y.to_bytes_le()),
    );
    if !affine.is_on_curve() || !affine.is_in_correct_subgroup_assuming_on_curve() {
        return Err(Error::ForeignElement("G1"));
    }
    Ok(affine.into_group())
}

fn sw_curve<C: SWCurveConfig>() -> Result<SourceGroup, Error>
where
    C::BaseField: PrimeField,
{
    let cofactor: Vec<u8> = C::COFACTOR.iter().flat_map(|limb| limb.to_le_bytes()).collect();
    SourceGroup::new(
        modulus::<C::BaseField>(),
        to_biguint(&C::COEFF_B),
        modulus::<C::ScalarField>(),
        BigUint::from_bytes_le(&cofactor),
        sw_to_point::<C>(&Affine::<C>::generator().into_group()),
    )
}

macro_rules! ark_curve {
    ($curve:ty, $g1:ty, $name:literal, $security:literal) => {
        impl ArkCurve for $curve {
            const NAME: &'static str = $name;
            const G1_NAME: &'static str = concat!($name, "-g1");
            const G2_NAME: &'static str = concat!($name, "-g2");
            const GT_NAME: &'static str = concat!($name, "-gt");
            const SECURITY_LEVEL: u32 = $security;

            fn g1_curve() -> Result<SourceGroup, Error> {
                sw_curve::<$g1>()
            }

            fn g1_to_point(point: &Self::G1) -> CurvePoint {
                sw_to_point::<$g1>(point)
            }

            fn g1_from_point(point: &CurvePoint) -> Result<Self::G1, Error> {
                sw_from_point::<$g1>(point)
            }
        }
    };
}

#[cfg(feature = "ark_bn254")]
ark_curve!(ark_bn254::Bn254, ark_bn254::g1::Config, "bn254", 100);
#[cfg(feature = "ark_bls12381")]
ark_curve!(ark_bls12_381::Bls12_381, ark_bls12_381::g1::Config, "bls12-381", 128);

/// Type 3 bilinear group over an arkworks pairing engine.
#[derive(Debug)]
pub struct ArkBilinearGroup<E: ArkCurve> {
    pairing: Arc<ArkPairing<E>>,
    curve: Arc<SourceGroup>,
}

impl<E: ArkCurve> ArkBilinearGroup<E> {
    pub fn new() -> Result<Self, Error> {
        Ok(Self {
            pairing: Arc::new(ArkPairing {
                g1: Arc::new(ArkGroup::new(E::G1_NAME)),
                g2: Arc::new(ArkGroup::new(E::G2_NAME)),
                gt: Arc::new(ArkGroup::new(E::GT_NAME)),
            }),
            curve: Arc::new(E::g1_curve()?),
        })
    }

    /// `G1` as an explicit curve group.
    pub fn g1_curve(&self) -> &SourceGroup {
        &self.curve
    }
}

impl<E: ArkCurve> Representable for ArkBilinearGroup<E> {
    fn to_repr(&self) -> Repr {
        ReprObject::new().into()
    }
}

impl<E: ArkCurve> Restore for ArkBilinearGroup<E> {
    fn from_repr(repr: &Repr) -> Result<Self, RepresentationError> {
        repr.as_object()?.deny_unknown(&[])?;
        Self::new().map_err(|err| RepresentationError::InvalidValue(err.to_string()))
    }
}

impl<E: ArkCurve> StandaloneRepresentable for ArkBilinearGroup<E> {
    fn type_name(&self) -> &'static str {
        E::NAME
    }
}

impl<E: ArkCurve> BilinearGroup for ArkBilinearGroup<E> {
    fn pairing_type(&self) -> PairingType {
        PairingType::Type3
    }

    fn g1(&self) -> Arc<dyn Group> {
        self.pairing.g1.clone()
    }

    fn g2(&self) -> Arc<dyn Group> {
        self.pairing.g2.clone()
    }

    fn gt(&self) -> Arc<dyn Group> {
        self.pairing.gt.clone()
    }

    fn bilinear_map(&self) -> Arc<dyn BilinearMap> {
        self.pairing.clone()
    }

    fn hash_into_g1(&self) -> Result<Arc<dyn HashIntoGroup>, Error> {
        Ok(Arc::new(ArkHashIntoG1::<E> {
            curve: self.curve.clone(),
            g1: self.pairing.g1.clone(),
        }))
    }
}

/// Compression of `G1` elements.
impl<E: ArkCurve> PointCompression for ArkBilinearGroup<E> {
    fn compress(&self, point: &Element) -> Result<CompressedPoint, Error> {
        let value = self.pairing.g1.value_of(point)?;
        self.curve.compress(&Element::new(E::g1_to_point(value)))
    }

    fn decompress(&self, compressed: &CompressedPoint) -> Result<Element, Error> {
        let point = self.curve.decompress(compressed)?;
        let value = E::g1_from_point(self.curve.point_of(&point)?)?;
        Ok(self.pairing.g1.element(value))
    }
}

#[derive(Debug)]
struct ArkPairing<E: Pairing> {
    g1: Arc<ArkGroup<E::G1>>,
    g2: Arc<ArkGroup<E::G2>>,
    gt: Arc<ArkGroup<PairingOutput<E>>>,
}

impl<E: Pairing> BilinearMap for ArkPairing<E> {
    fn apply(&self, g1: &Element, g2: &Element) -> Result<Element, Error> {
        let a = *self.g1.value_of(g1)?;
        let b = *self.g2.value_of(g2)?;
        Ok(self.gt.element(E::pairing(a, b)))
    }
}

#[derive(Debug)]
struct ArkHashIntoG1<E: Pairing> {
    curve: Arc<SourceGroup>,
    g1: Arc<ArkGroup<E::G1>>,
}

impl<E: ArkCurve> HashIntoGroup for ArkHashIntoG1<E> {
    fn hash_into(&self, data: &[u8]) -> Result<Element, Error> {
        let point = self.curve.hash_to_point(data)?;
        let value = E::g1_from_point(self.curve.point_of(&point)?)?;
        Ok(self.g1.element(value))
    }
}

fn restore_ark_bilinear_group<E: ArkCurve>(
    repr: &Repr,
) -> Result<Arc<dyn BilinearGroup>, RepresentationError> {
    Ok(Arc::new(ArkBilinearGroup::<E>::from_repr(repr)?))
}

fn restore_ark_group<G: ark_ec::PrimeGroup>(
    name: &'static str,
    repr: &Repr,
) -> Result<Arc<dyn Group>, RepresentationError> {
    repr.as_object()?.deny_unknown(&[])?;
    Ok(Arc::new(ArkGroup::<G>::new(name)))
}

fn restore_g1<E: ArkCurve>(repr: &Repr) -> Result<Arc<dyn Group>, RepresentationError> {
    restore_ark_group::<E::G1>(E::G1_NAME, repr)
}

fn restore_g2<E: ArkCurve>(repr: &Repr) -> Result<Arc<dyn Group>, RepresentationError> {
    restore_ark_group::<E::G2>(E::G2_NAME, repr)
}

fn restore_gt<E: ArkCurve>(repr: &Repr) -> Result<Arc<dyn Group>, RepresentationError> {
    restore_ark_group::<PairingOutput<E>>(E::GT_NAME, repr)
}

fn register_curve<E: ArkCurve>(registry: &TypeRegistry) {
    registry.register::<dyn BilinearGroup>(E::NAME, restore_ark_bilinear_group::<E>);
    registry.register::<dyn Group>(E::G1_NAME, restore_g1::<E>);
    registry.register::<dyn Group>(E::G2_NAME, restore_g2::<E>);
    registry.register::<dyn Group>(E::GT_NAME, restore_gt::<E>);
}

pub(crate) fn register_types(registry: &TypeRegistry) {
    #[cfg(feature = "ark_bn254")]
    register_curve::<ark_bn254::Bn254>(registry);
    #[cfg(feature = "ark_bls12381")]
    register_curve::<ark_bls12_381::Bls12_381>(registry);
}

/// Prime-order Type 3 curves hash into `G1` only.
fn supports<E: ArkCurve>(security_parameter: u32, requirements: &BilinearGroupRequirement) -> bool {
    requirements.pairing_type() == PairingType::Type3
        && requirements.cardinality_num_prime_factors() == 1
        && !requirements.hash_into_g2_needed()
        && !requirements.hash_into_gt_needed()
        && security_parameter > 0
        && security_parameter <= E::SECURITY_LEVEL
}

fn provide<E: ArkCurve>(
    security_parameter: u32,
    requirements: &BilinearGroupRequirement,
) -> Result<Arc<dyn BilinearGroup>, Error> {
    if !supports::<E>(security_parameter, requirements) {
        return Err(Error::UnsupportedConfig(format!(
            "{} cannot satisfy {requirements:?} at security {security_parameter}",
            E::NAME
        )));
    }
    Ok(Arc::new(ArkBilinearGroup::<E>::new()?))
}

/// Provides BN254 (roughly 100-bit security) for prime-order Type 3 requirements.
#[cfg(feature = "ark_bn254")]
#[derive(Clone, Copy, Debug, Default)]
pub struct BarretoNaehrigProvider;

#[cfg(feature = "ark_bn254")]
impl BilinearGroupProvider for BarretoNaehrigProvider {
    fn check_requirements(
        &self,
        security_parameter: u32,
        requirements: &BilinearGroupRequirement,
    ) -> bool {
        supports::<ark_bn254::Bn254>(security_parameter, requirements)
    }

    fn provide_bilinear_group(
        &self,
        security_parameter: u32,
        requirements: &BilinearGroupRequirement,
    ) -> Result<Arc<dyn BilinearGroup>, Error> {
        provide::<ark_bn254::Bn254>(security_parameter, requirements)
    }
}

/// Provides BLS12-381 for prime-order Type 3 requirements up to 128 bits.
#[cfg(feature = "ark_bls12381")]
#[derive(Clone, Copy, Debug, Default)]
pub struct Bls12Provider;

#[cfg(feature = "ark_bls12381")]
impl BilinearGroupProvider for Bls12Provider {
    fn check_requirements(
        &self,
        security_parameter: u32,
        requirements: &BilinearGroupRequirement,
    ) -> bool {
        supports::<ark_bls12_381::Bls12_381>(security_parameter, requirements)
    }

    fn provide_bilinear_group(
        &self,
        security_parameter: u32,
        requirements: &BilinearGroupRequirement,
    ) -> Result<Arc<dyn BilinearGroup>, Error> {
        provide::<ark_bls12_381::Bls12_381>(security_parameter, requirements)
    }
}
