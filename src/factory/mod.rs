//! Requirement/provider protocol for obtaining bilinear groups.
//!
//! A scheme states what it needs as a [`BilinearGroupRequirement`] (pairing
//! type, hashing needs, number of prime factors of the group order) and asks a
//! [`BilinearGroupFactory`] for a group at a given security level. The factory
//! picks the first registered [`BilinearGroupProvider`] that accepts the request,
//! or substitutes an insecure debug group when debug mode is on.
//!
//! # Built-in providers
//!
//! | Provider | Pairing type | Prime factors | Hashing | Security |
//! |----------|--------------|---------------|---------|----------|
//! | [`SupersingularProvider`](crate::arith::SupersingularProvider) | 1 | 1 | G1, G2 | ≤ 128 |
//! | `BarretoNaehrigProvider` (`ark_bn254`) | 3 | 1 | G1 | ≤ 100 |
//! | `Bls12Provider` (`ark_bls12381`) | 3 | 1 | G1 | ≤ 128 |
//! | [`DebugBilinearGroupProvider`](crate::arith::DebugBilinearGroupProvider) | any | any | all | any |
//!
//! The first two form [`default_providers`].

mod requirement;
pub use requirement::*;

mod provider;
pub use provider::*;

mod bilinear_group_factory;
pub use bilinear_group_factory::*;
