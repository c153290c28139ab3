//! Insecure bilinear group `Z_n x Z_n -> Z_n` for testing.
//!
//! All three groups are the additive group of `Z_n` and the map is ring
//! multiplication. Discrete logarithms are trivial here, so this construction
//! must never protect anything; it exists to exercise schemes quickly and with
//! composite group orders.

use std::sync::Arc;

use blake3::Hasher;
use num_bigint::BigUint;
use tracing::{debug, instrument};

use super::{BilinearGroup, BilinearMap, HashIntoGroup, PairingType};
use crate::arith::ring::number_theory::largest_primes;
use crate::arith::{Element, Group, Ring, RingGroup, Zn};
use crate::errors::{Error, RepresentationError};
use crate::factory::{BilinearGroupProvider, BilinearGroupRequirement};
use crate::repr::{Repr, ReprObject, Representable, Restore, StandaloneRepresentable};

const HASH_DOMAIN: &[u8] = b"bilinear/debug/hash-into";

/// Debug bilinear group whose order `n` is the product of the
/// `prime_factors` largest primes not exceeding the security parameter.
#[derive(Debug)]
pub struct DebugBilinearGroup {
    pairing_type: PairingType,
    security_parameter: u32,
    prime_factors: u32,
    ring: Zn,
    group: Arc<RingGroup>,
}

impl DebugBilinearGroup {
    #[instrument(
        level = "info",
        skip_all,
        fields(security = security_parameter, pairing_type = ?pairing_type, factors = prime_factors)
    )]
    pub fn new(
        security_parameter: u32,
        pairing_type: PairingType,
        prime_factors: u32,
    ) -> Result<Self, Error> {
        let modulus = debug_modulus(security_parameter, prime_factors)?;
        debug!(%modulus, "debug group order");
        let ring = Zn::new(modulus)?;
        let group = Arc::new(RingGroup::additive(Arc::new(ring.clone())));
        Ok(Self {
            pairing_type,
            security_parameter,
            prime_factors,
            ring,
            group,
        })
    }

    /// The group order `n`.
    pub fn modulus(&self) -> &BigUint {
        self.ring.modulus()
    }

    fn hash(&self, label: &'static str) -> Arc<dyn HashIntoGroup> {
        Arc::new(DebugHash {
            label,
            ring: self.ring.clone(),
            group: self.group.clone(),
        })
    }
}

fn debug_modulus(security_parameter: u32, prime_factors: u32) -> Result<BigUint, Error> {
    if prime_factors == 0 {
        return Err(Error::InvalidConfig(
            "the group order needs at least one prime factor".into(),
        ));
    }
    let primes = largest_primes(&BigUint::from(security_parameter), prime_factors as usize)
        .ok_or_else(|| {
            Error::UnsupportedConfig(format!(
                "fewer than {prime_factors} primes below {security_parameter}"
            ))
        })?;
    Ok(primes.iter().product())
}

impl Representable for DebugBilinearGroup {
    fn to_repr(&self) -> Repr {
        ReprObject::new()
            .with("pairing_type", &self.pairing_type)
            .with("security_parameter", &self.security_parameter)
            .with("prime_factors", &self.prime_factors)
            .into()
    }
}

impl Restore for DebugBilinearGroup {
    fn from_repr(repr: &Repr) -> Result<Self, RepresentationError> {
        let object = repr.as_object()?;
        object.deny_unknown(&["pairing_type", "security_parameter", "prime_factors"])?;
        DebugBilinearGroup::new(
            object.field("security_parameter")?,
            object.field("pairing_type")?,
            object.field("prime_factors")?,
        )
        .map_err(|err| RepresentationError::InvalidValue(err.to_string()))
    }
}

impl StandaloneRepresentable for DebugBilinearGroup {
    fn type_name(&self) -> &'static str {
        "debug-bilinear-group"
    }
}

impl BilinearGroup for DebugBilinearGroup {
    fn pairing_type(&self) -> PairingType {
        self.pairing_type
    }

    fn g1(&self) -> Arc<dyn Group> {
        self.group.clone()
    }

    fn g2(&self) -> Arc<dyn Group> {
        self.group.clone()
    }

    fn gt(&self) -> Arc<dyn Group> {
        self.group.clone()
    }

    fn bilinear_map(&self) -> Arc<dyn BilinearMap> {
        Arc::new(DebugBilinearMap {
            ring: self.ring.clone(),
            group: self.group.clone(),
        })
    }

    fn hash_into_g1(&self) -> Result<Arc<dyn HashIntoGroup>, Error> {
        Ok(self.hash("G1"))
    }

    fn hash_into_g2(&self) -> Result<Arc<dyn HashIntoGroup>, Error> {
        Ok(self.hash("G2"))
    }

    fn hash_into_gt(&self) -> Result<Arc<dyn HashIntoGroup>, Error> {
        Ok(self.hash("GT"))
    }
}

/// `e(a, b) = a * b` in `Z_n`.
#[derive(Debug)]
struct DebugBilinearMap {
    ring: Zn,
    group: Arc<RingGroup>,
}

impl BilinearMap for DebugBilinearMap {
    fn apply(&self, g1: &Element, g2: &Element) -> Result<Element, Error> {
        let a = self.group.project(g1)?;
        let b = self.group.project(g2)?;
        self.group.wrap(&self.ring.mul(&a, &b)?)
    }
}

#[derive(Debug)]
struct DebugHash {
    label: &'static str,
    ring: Zn,
    group: Arc<RingGroup>,
}

impl HashIntoGroup for DebugHash {
    fn hash_into(&self, data: &[u8]) -> Result<Element, Error> {
        let mut hasher = Hasher::new();
        hasher.update(HASH_DOMAIN);
        hasher.update(self.label.as_bytes());
        hasher.update(&(data.len() as u64).to_le_bytes());
        hasher.update(data);
        let mut wide = vec![0u8; self.ring.modulus().bits().div_ceil(8) as usize + 16];
        hasher.finalize_xof().fill(&mut wide);
        self.group.wrap(&self.ring.reduce_bytes(&wide))
    }
}

/// Provides [`DebugBilinearGroup`]s for any pairing type and hashing need.
#[derive(Clone, Copy, Debug, Default)]
pub struct DebugBilinearGroupProvider;

impl BilinearGroupProvider for DebugBilinearGroupProvider {
    fn check_requirements(
        &self,
        security_parameter: u32,
        requirements: &BilinearGroupRequirement,
    ) -> bool {
        debug_modulus(security_parameter, requirements.cardinality_num_prime_factors()).is_ok()
    }

    fn provide_bilinear_group(
        &self,
        security_parameter: u32,
        requirements: &BilinearGroupRequirement,
    ) -> Result<Arc<dyn BilinearGroup>, Error> {
        Ok(Arc::new(DebugBilinearGroup::new(
            security_parameter,
            requirements.pairing_type(),
            requirements.cardinality_num_prime_factors(),
        )?))
    }
}

#[cfg(test)]
mod tests {
    use num_bigint::BigInt;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    use super::*;

    #[test]
    fn modulus_is_product_of_largest_primes() {
        let prime = DebugBilinearGroup::new(80, PairingType::Type1, 1).unwrap();
        assert_eq!(prime.modulus(), &BigUint::from(79u32));
        let composite = DebugBilinearGroup::new(80, PairingType::Type3, 3).unwrap();
        assert_eq!(composite.modulus(), &BigUint::from(79u32 * 73 * 71));
        assert_eq!(composite.g1().size(), Some(BigUint::from(79u32 * 73 * 71)));

        assert!(matches!(
            DebugBilinearGroup::new(5, PairingType::Type1, 4),
            Err(Error::UnsupportedConfig(_))
        ));
        assert!(matches!(
            DebugBilinearGroup::new(80, PairingType::Type1, 0),
            Err(Error::InvalidConfig(_))
        ));
    }

    #[test]
    fn map_is_bilinear_and_non_degenerate() {
        let bg = DebugBilinearGroup::new(128, PairingType::Type2, 2).unwrap();
        let e = bg.bilinear_map();
        let (g1, g2, gt) = (bg.g1(), bg.g2(), bg.gt());
        let mut rng = StdRng::seed_from_u64(3);
        let a = g1.random(&mut rng).unwrap();
        let b = g2.random(&mut rng).unwrap();
        let (x, y) = (BigInt::from(17), BigInt::from(-5));

        let lhs = e
            .apply(&g1.pow(&a, &x).unwrap(), &g2.pow(&b, &y).unwrap())
            .unwrap();
        let rhs = gt.pow(&e.apply(&a, &b).unwrap(), &(&x * &y)).unwrap();
        assert_eq!(lhs, rhs);

        let generators = e
            .apply(&g1.generator().unwrap(), &g2.generator().unwrap())
            .unwrap();
        assert_ne!(generators, gt.identity());
    }

    #[test]
    fn hashing_is_deterministic() {
        let bg = DebugBilinearGroup::new(128, PairingType::Type3, 1).unwrap();
        let h1 = bg.hash_into_g1().unwrap();
        let h2 = bg.hash_into_g2().unwrap();
        let a = h1.hash_into(b"id").unwrap();
        assert_eq!(a, h1.hash_into(b"id").unwrap());
        assert!(bg.g1().contains(&a));
        assert!(bg.g2().contains(&h2.hash_into(b"id").unwrap()));
        assert!(bg.gt().contains(&bg.hash_into_gt().unwrap().hash_into(b"id").unwrap()));
    }

    #[test]
    fn restores_through_registry() {
        let bg: Arc<dyn BilinearGroup> =
            Arc::new(DebugBilinearGroup::new(64, PairingType::Type3, 2).unwrap());
        let restored = Arc::<dyn BilinearGroup>::from_repr(&bg.to_repr()).unwrap();
        assert!(*restored == *bg);
        assert_eq!(restored.pairing_type(), PairingType::Type3);
        assert_eq!(restored.g1().size(), bg.g1().size());
    }

    #[test]
    fn provider_accepts_satisfiable_requirements() {
        let provider = DebugBilinearGroupProvider;
        let requirement = BilinearGroupRequirement::with_prime_factors(PairingType::Type1, 2);
        assert!(provider.check_requirements(64, &requirement));
        assert!(!provider.check_requirements(2, &requirement));
        let bg = provider.provide_bilinear_group(64, &requirement).unwrap();
        assert_eq!(bg.type_name(), "debug-bilinear-group");
    }
}
