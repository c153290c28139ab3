use std::fmt::Debug;
use std::sync::Arc;

use super::BilinearGroupRequirement;
use crate::arith::{BilinearGroup, SupersingularProvider};
use crate::errors::Error;

/// Strategy that knows how to build one family of bilinear groups.
///
/// Providers are stateless: `check_requirements` must answer the same way for
/// the same inputs, and `provide_bilinear_group` must only be called after it
/// answered `true`.
pub trait BilinearGroupProvider: Debug + Send + Sync {
    /// Returns whether this provider can build a group for the given security
    /// parameter (in bits) that satisfies `requirements`.
    fn check_requirements(
        &self,
        security_parameter: u32,
        requirements: &BilinearGroupRequirement,
    ) -> bool;

    /// Builds a group satisfying `requirements`.
    fn provide_bilinear_group(
        &self,
        security_parameter: u32,
        requirements: &BilinearGroupRequirement,
    ) -> Result<Arc<dyn BilinearGroup>, Error>;
}

/// Providers consulted when none were registered, in priority order.
pub fn default_providers() -> Vec<Arc<dyn BilinearGroupProvider>> {
    #[allow(unused_mut)]
    let mut providers: Vec<Arc<dyn BilinearGroupProvider>> = vec![Arc::new(SupersingularProvider)];
    #[cfg(feature = "ark_bn254")]
    providers.push(Arc::new(crate::arith::BarretoNaehrigProvider));
    providers
}
