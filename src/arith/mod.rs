//! Algebraic structures and bilinear groups.
//!
//! Every structure works on opaque, cheaply clonable [`Element`] handles, so
//! rings, groups and bilinear groups of different concrete types can be used
//! behind trait objects and nested inside one another.
//!
//! # Architecture
//!
//! - **[`ring`]**: [`Ring`] / [`Field`] traits, `Z/nZ`, `F_p`, `F_p^2`, polynomial rings
//!   and the number-theoretic helpers they rely on
//! - **[`group`]**: the [`Group`] trait, multi-exponentiation, ring groups,
//!   elliptic-curve source groups with point compression, arkworks groups
//! - **[`pairing`]**: the [`BilinearGroup`] abstraction and its constructions
//!   (debug, supersingular, arkworks BN254 / BLS12-381, lazy decorator)
//!
//! # Backend Support
//!
//! | Feature | Construction | Pairing type | Status |
//! |---------|--------------|--------------|--------|
//! | (always) | debug `Z/nZ` | 1, 2, 3 | Insecure, testing only |
//! | (always) | supersingular `y^2 = x^3 + 1` | 1 | Stable |
//! | `ark_bn254` (default) | Arkworks BN254 | 3 | Stable |
//! | `ark_bls12381` (default) | Arkworks BLS12-381 | 3 | Stable |
//!
//! # Example
//!
//! ```rust
//! use num_bigint::BigInt;
//! use bilinear::arith::{BilinearGroup, DebugBilinearGroup, Group, PairingType};
//!
//! let bg = DebugBilinearGroup::new(64, PairingType::Type1, 1).unwrap();
//! let (g1, g2) = (bg.g1().generator().unwrap(), bg.g2().generator().unwrap());
//! let e = bg.bilinear_map();
//!
//! let lhs = e.apply(&bg.g1().pow(&g1, &BigInt::from(6)).unwrap(), &g2).unwrap();
//! let rhs = bg.gt().pow(&e.apply(&g1, &g2).unwrap(), &BigInt::from(6)).unwrap();
//! assert_eq!(lhs, rhs);
//! ```

mod element;
pub use element::{Element, ElementValue};

pub mod ring;
pub use ring::*;

pub mod group;
pub use group::*;

pub mod pairing;
pub use pairing::*;

use std::sync::Arc;

use crate::errors::RepresentationError;
use crate::repr::{Repr, Restore, TypeRegistry};

fn restore_ring<T: Ring + Restore + 'static>(repr: &Repr) -> Result<Arc<dyn Ring>, RepresentationError> {
    Ok(Arc::new(T::from_repr(repr)?))
}

fn restore_group<T: Group + Restore + 'static>(
    repr: &Repr,
) -> Result<Arc<dyn Group>, RepresentationError> {
    Ok(Arc::new(T::from_repr(repr)?))
}

fn restore_bilinear_group<T: BilinearGroup + Restore + 'static>(
    repr: &Repr,
) -> Result<Arc<dyn BilinearGroup>, RepresentationError> {
    Ok(Arc::new(T::from_repr(repr)?))
}

/// Registers every structure defined in this crate.
pub(crate) fn register_builtin_types(registry: &TypeRegistry) {
    registry.register::<dyn Ring>("zn", restore_ring::<Zn>);
    registry.register::<dyn Ring>("zp", restore_ring::<Zp>);
    registry.register::<dyn Ring>("fp2", restore_ring::<QuadraticExtensionField>);
    registry.register::<dyn Ring>("polynomial-ring", restore_ring::<PolynomialRing>);

    registry.register::<dyn Group>("ring-group", restore_group::<RingGroup>);
    registry.register::<dyn Group>("source-group", restore_group::<SourceGroup>);
    registry.register::<dyn Group>("lazy-group", restore_group::<LazyGroup>);

    registry.register::<dyn BilinearGroup>(
        "debug-bilinear-group",
        restore_bilinear_group::<DebugBilinearGroup>,
    );
    registry.register::<dyn BilinearGroup>(
        "supersingular-bilinear-group",
        restore_bilinear_group::<SupersingularBilinearGroup>,
    );
    registry.register::<dyn BilinearGroup>(
        "lazy-bilinear-group",
        restore_bilinear_group::<LazyBilinearGroup>,
    );

    #[cfg(any(feature = "ark_bn254", feature = "ark_bls12381"))]
    pairing::register_ark_types(registry);
}
