use std::sync::Arc;

use tracing::{debug, instrument, trace};

use super::{default_providers, BilinearGroupProvider, BilinearGroupRequirement};
use crate::arith::{BilinearGroup, DebugBilinearGroup, LazyBilinearGroup};
use crate::config::FactoryConfig;
use crate::errors::Error;

/// Builds bilinear groups that satisfy a [`BilinearGroupRequirement`].
///
/// The factory is configured once through its setters and can then build any
/// number of groups. Without registered providers it consults
/// [`default_providers`]; the first provider (in registration order) whose
/// `check_requirements` accepts the request builds the group.
///
/// # Example
///
/// ```rust
/// use bilinear::arith::PairingType;
/// use bilinear::factory::{BilinearGroupFactory, BilinearGroupRequirement};
/// use bilinear::repr::StandaloneRepresentable;
///
/// let mut factory = BilinearGroupFactory::new(64);
/// factory
///     .set_requirements(BilinearGroupRequirement::with_prime_factors(PairingType::Type3, 2))
///     .set_debug_mode(true);
/// let group = factory.create_bilinear_group()?;
/// assert_eq!(group.type_name(), "debug-bilinear-group");
/// # Ok::<(), bilinear::Error>(())
/// ```
#[derive(Debug, Default)]
pub struct BilinearGroupFactory {
    security_parameter: u32,
    requirements: Option<BilinearGroupRequirement>,
    providers: Option<Vec<Arc<dyn BilinearGroupProvider>>>,
    debug_mode: bool,
    lazy_groups: bool,
}

impl BilinearGroupFactory {
    pub fn new(security_parameter: u32) -> Self {
        Self {
            security_parameter,
            ..Self::default()
        }
    }

    /// Creates a factory from a validated configuration.
    ///
    /// Providers are not part of the configuration; register them afterwards
    /// to replace the defaults.
    pub fn from_config(config: &FactoryConfig) -> Result<Self, Error> {
        config.validate()?;
        Ok(Self {
            security_parameter: config.security_parameter,
            requirements: Some(config.requirements.clone()),
            providers: None,
            debug_mode: config.debug_mode,
            lazy_groups: config.lazy_groups,
        })
    }

    pub fn set_requirements(&mut self, requirements: BilinearGroupRequirement) -> &mut Self {
        self.requirements = Some(requirements);
        self
    }

    /// Replaces the providers consulted by [`create_bilinear_group`](Self::create_bilinear_group).
    pub fn register_providers(
        &mut self,
        providers: Vec<Arc<dyn BilinearGroupProvider>>,
    ) -> &mut Self {
        self.providers = Some(providers);
        self
    }

    pub fn set_security_parameter(&mut self, security_parameter: u32) -> &mut Self {
        self.security_parameter = security_parameter;
        self
    }

    /// In debug mode the factory returns an insecure [`DebugBilinearGroup`]
    /// and never consults a provider.
    pub fn set_debug_mode(&mut self, enabled: bool) -> &mut Self {
        self.debug_mode = enabled;
        self
    }

    /// Wraps every produced group in a [`LazyBilinearGroup`].
    pub fn set_lazy_groups(&mut self, enabled: bool) -> &mut Self {
        self.lazy_groups = enabled;
        self
    }

    pub fn security_parameter(&self) -> u32 {
        self.security_parameter
    }

    pub fn requirements(&self) -> Option<&BilinearGroupRequirement> {
        self.requirements.as_ref()
    }

    #[instrument(
        level = "info",
        skip_all,
        fields(security = self.security_parameter, debug = self.debug_mode, lazy = self.lazy_groups)
    )]
    pub fn create_bilinear_group(&self) -> Result<Arc<dyn BilinearGroup>, Error> {
        let requirements = self.requirements.as_ref().ok_or_else(|| {
            Error::InvalidConfig("requirements must be set before creating a group".into())
        })?;
        requirements.validate()?;
        if self.security_parameter == 0 {
            return Err(Error::InvalidConfig(
                "security parameter must be positive".into(),
            ));
        }

        if self.debug_mode {
            debug!(?requirements, "building debug bilinear group");
            return Ok(Arc::new(DebugBilinearGroup::new(
                self.security_parameter,
                requirements.pairing_type(),
                requirements.cardinality_num_prime_factors(),
            )?));
        }

        let defaults;
        let providers = match &self.providers {
            Some(providers) => providers,
            None => {
                defaults = default_providers();
                &defaults
            }
        };
        let provider = providers
            .iter()
            .find(|provider| {
                let accepted = provider.check_requirements(self.security_parameter, requirements);
                trace!(?provider, accepted, "checked provider");
                accepted
            })
            .ok_or_else(|| {
                Error::UnsupportedConfig(format!(
                    "no provider supports {requirements:?} at security level {}",
                    self.security_parameter
                ))
            })?;
        debug!(?provider, "selected provider");

        let group = provider.provide_bilinear_group(self.security_parameter, requirements)?;
        if self.lazy_groups {
            return Ok(Arc::new(LazyBilinearGroup::new(group)));
        }
        Ok(group)
    }
}

#[cfg(test)]
mod tests {
    use num_bigint::BigUint;

    use super::*;
    use crate::arith::{Group, PairingType};
    use crate::repr::StandaloneRepresentable;

    #[test]
    fn requirements_are_mandatory() {
        let factory = BilinearGroupFactory::new(80);
        assert!(matches!(
            factory.create_bilinear_group(),
            Err(Error::InvalidConfig(_))
        ));
    }

    #[test]
    fn zero_security_or_factors_is_invalid() {
        let mut factory = BilinearGroupFactory::new(0);
        factory
            .set_requirements(BilinearGroupRequirement::new(PairingType::Type1))
            .set_debug_mode(true);
        assert!(matches!(
            factory.create_bilinear_group(),
            Err(Error::InvalidConfig(_))
        ));

        factory
            .set_security_parameter(80)
            .set_requirements(BilinearGroupRequirement::with_prime_factors(PairingType::Type1, 0));
        assert!(matches!(
            factory.create_bilinear_group(),
            Err(Error::InvalidConfig(_))
        ));
    }

    #[test]
    fn debug_mode_honors_pairing_type() {
        let mut factory = BilinearGroupFactory::new(80);
        factory
            .set_requirements(BilinearGroupRequirement::with_prime_factors(PairingType::Type2, 2))
            .set_debug_mode(true)
            .set_lazy_groups(true);
        let group = factory.create_bilinear_group().unwrap();
        assert_eq!(group.type_name(), "debug-bilinear-group");
        assert_eq!(group.pairing_type(), PairingType::Type2);
        assert_eq!(group.g1().size(), Some(BigUint::from(79u32 * 73)));
    }

    #[test]
    fn empty_provider_list_is_unsupported() {
        let mut factory = BilinearGroupFactory::new(80);
        factory
            .set_requirements(BilinearGroupRequirement::new(PairingType::Type1))
            .register_providers(Vec::new());
        assert!(matches!(
            factory.create_bilinear_group(),
            Err(Error::UnsupportedConfig(_))
        ));
    }

    #[test]
    fn default_providers_reject_composite_orders() {
        let mut factory = BilinearGroupFactory::new(80);
        factory
            .set_requirements(BilinearGroupRequirement::with_prime_factors(PairingType::Type1, 2));
        assert!(matches!(
            factory.create_bilinear_group(),
            Err(Error::UnsupportedConfig(_))
        ));
    }

    #[cfg(feature = "ark_bn254")]
    #[test]
    fn default_providers_build_bn254_for_type3() {
        let mut factory = BilinearGroupFactory::new(100);
        factory
            .set_requirements(BilinearGroupRequirement::with_hashing(
                PairingType::Type3,
                true,
                false,
                false,
            ))
            .set_lazy_groups(true);
        let group = factory.create_bilinear_group().unwrap();
        assert_eq!(group.type_name(), "lazy-bilinear-group");
        assert_eq!(group.pairing_type(), PairingType::Type3);
        assert!(group.hash_into_g1().is_ok());
    }
}
