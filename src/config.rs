//! Configuration for the bilinear group factory.
//!
//! [`FactoryConfig`] bundles everything a [`BilinearGroupFactory`](crate::factory::BilinearGroupFactory)
//! needs except the provider list, so it can be stored alongside the scheme
//! that uses it and deserialized with any serde format.
//!
//! # Example
//!
//! ```rust
//! use bilinear::arith::PairingType;
//! use bilinear::factory::{BilinearGroupFactory, BilinearGroupRequirement};
//! use bilinear::FactoryConfig;
//!
//! let config = FactoryConfig::new(
//!     80,
//!     BilinearGroupRequirement::with_prime_factors(PairingType::Type1, 2),
//!     true,
//!     false,
//! )
//! .expect("valid config");
//! let factory = BilinearGroupFactory::from_config(&config).expect("valid config");
//! assert_eq!(factory.security_parameter(), 80);
//! ```

use serde::{Deserialize, Serialize};

use crate::errors::Error;
use crate::factory::BilinearGroupRequirement;

/// Factory settings.
///
/// # Fields
///
/// - `security_parameter`: target security level in bits. Must be positive.
/// - `requirements`: what the produced group must offer
/// - `debug_mode`: substitute an insecure debug group (testing only)
/// - `lazy_groups`: wrap produced groups so operations are deferred
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FactoryConfig {
    pub security_parameter: u32,
    pub requirements: BilinearGroupRequirement,
    #[serde(default)]
    pub debug_mode: bool,
    #[serde(default)]
    pub lazy_groups: bool,
}

impl FactoryConfig {
    /// Creates and validates a configuration.
    pub fn new(
        security_parameter: u32,
        requirements: BilinearGroupRequirement,
        debug_mode: bool,
        lazy_groups: bool,
    ) -> Result<Self, Error> {
        let config = Self {
            security_parameter,
            requirements,
            debug_mode,
            lazy_groups,
        };
        config.validate()?;
        Ok(config)
    }

    /// Validates the configuration.
    ///
    /// This checks that the security parameter is positive and that the
    /// requirement asks for at least one prime factor. Whether any provider
    /// can satisfy it is only known when a group is created.
    pub fn validate(&self) -> Result<(), Error> {
        if self.security_parameter == 0 {
            return Err(Error::InvalidConfig(
                "security parameter must be positive".into(),
            ));
        }
        self.requirements.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::arith::PairingType;

    #[test]
    fn rejects_zero_security_parameter() {
        let result = FactoryConfig::new(
            0,
            BilinearGroupRequirement::new(PairingType::Type1),
            false,
            false,
        );
        assert!(matches!(result, Err(Error::InvalidConfig(_))));
    }

    #[test]
    fn flags_default_to_false_when_absent() {
        let json = r#"{
            "security_parameter": 112,
            "requirements": {
                "pairing_type": "TYPE_3",
                "hash_into_g1_needed": true,
                "hash_into_g2_needed": false,
                "hash_into_gt_needed": false,
                "cardinality_num_prime_factors": 1
            }
        }"#;
        let config: FactoryConfig = serde_json::from_str(json).unwrap();
        config.validate().unwrap();
        assert!(!config.debug_mode);
        assert!(!config.lazy_groups);
        assert_eq!(
            config.requirements,
            BilinearGroupRequirement::with_hashing(PairingType::Type3, true, false, false)
        );
    }
}
