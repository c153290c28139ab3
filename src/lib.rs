//! # bilinear: algebraic structures and a bilinear group factory
//!
//! `bilinear` provides the algebra that pairing-based schemes are written
//! against, together with a factory that picks a concrete bilinear group for a
//! stated set of requirements and a target security level.
//!
//! ## Overview
//!
//! Schemes describe what they need (pairing type, hashing into the source or
//! target groups, composite or prime group order) as a
//! [`BilinearGroupRequirement`](factory::BilinearGroupRequirement). A
//! [`BilinearGroupFactory`](factory::BilinearGroupFactory) asks its registered
//! providers in order and returns the first group that fits. In debug mode an
//! insecure but fast `Z/nZ` construction is substituted, and in lazy mode every
//! group operation is deferred until a value is actually needed.
//!
//! ## Architecture
//!
//! - **[`repr`]**: self-describing representation trees, the codec that turns
//!   structures into trees and back, and the type registry used to restore
//!   polymorphic values
//!
//! - **[`arith`]**: rings, fields, groups and bilinear groups over opaque
//!   [`Element`](arith::Element) handles, elliptic-curve point compression, and
//!   the lazy group decorator
//!
//! - **[`factory`]**: the requirement/provider protocol and the factory itself
//!
//! - **[`config`]**: [`FactoryConfig`] for building factories from stored settings
//!
//! - **[`errors`]**: error types for the codec and for everything else
//!
//! ## Quick Example
//!
//! ```rust
//! use num_bigint::BigInt;
//! use bilinear::arith::{Group, PairingType};
//! use bilinear::factory::{BilinearGroupFactory, BilinearGroupRequirement};
//!
//! # fn main() -> Result<(), bilinear::Error> {
//! let mut factory = BilinearGroupFactory::new(80);
//! factory
//!     .set_requirements(BilinearGroupRequirement::new(PairingType::Type1))
//!     .set_debug_mode(true)
//!     .set_lazy_groups(true);
//! let group = factory.create_bilinear_group()?;
//!
//! let (g1, g2, gt) = (group.g1(), group.g2(), group.gt());
//! let e = group.bilinear_map();
//! let a = g1.pow(&g1.generator()?, &BigInt::from(3))?;
//! let b = g2.pow(&g2.generator()?, &BigInt::from(5))?;
//! let expected = gt.pow(&e.apply(&g1.generator()?, &g2.generator()?)?, &BigInt::from(15))?;
//! assert_eq!(e.apply(&a, &b)?, expected);
//! # Ok(())
//! # }
//! ```
//!
//! ## Feature Flags
//!
//! - **`ark_bn254`** (default): Arkworks BN254 group and `BarretoNaehrigProvider`
//! - **`ark_bls12381`** (default): Arkworks BLS12-381 group and `Bls12Provider`
//!
//! ## Security Considerations
//!
//! - **Debug groups**: discrete logarithms are trivial in the debug construction.
//!   Never enable debug mode outside tests.
//! - **Parameter generation**: supersingular parameters are sampled with a
//!   ChaCha20 RNG seeded from the operating system on every request.

pub mod arith;
pub mod config;
pub mod errors;
pub mod factory;
pub mod repr;

pub use config::FactoryConfig;
pub use errors::{Error, RepresentationError};
