use std::sync::Arc;

use num_bigint::BigUint;
use rand_core::RngCore;

use super::Group;
use crate::arith::ring::is_prime_ring;
use crate::arith::{Element, Ring};
use crate::errors::{Error, RepresentationError};
use crate::repr::{Repr, ReprObject, Representable, Restore, StandaloneRepresentable};
use crate::represented_enum;

/// Which substructure of the ring forms the group.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum RingGroupKind {
    /// `(R, +)`
    #[default]
    Additive,
    /// `(R^*, *)`
    Multiplicative,
}

represented_enum!(RingGroupKind {
    Additive => "ADDITIVE",
    Multiplicative => "MULTIPLICATIVE",
});

/// Ring element viewed as a group element.
///
/// Equality only looks at the wrapped ring element, so the same value wrapped
/// by two equal ring groups compares equal. It never equals the bare ring
/// element.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct RingGroupElement(Element);

impl RingGroupElement {
    pub fn project_to_ring(&self) -> &Element {
        &self.0
    }
}

impl Representable for RingGroupElement {
    fn to_repr(&self) -> Repr {
        self.0.to_repr()
    }
}

/// The additive group or the unit group of a ring.
#[derive(Debug)]
pub struct RingGroup {
    ring: Arc<dyn Ring>,
    kind: RingGroupKind,
}

impl RingGroup {
    pub fn new(ring: Arc<dyn Ring>, kind: RingGroupKind) -> Self {
        Self { ring, kind }
    }

    pub fn additive(ring: Arc<dyn Ring>) -> Self {
        Self::new(ring, RingGroupKind::Additive)
    }

    /// The group of units of `ring`.
    pub fn unit(ring: Arc<dyn Ring>) -> Self {
        Self::new(ring, RingGroupKind::Multiplicative)
    }

    pub fn ring(&self) -> &Arc<dyn Ring> {
        &self.ring
    }

    pub fn kind(&self) -> RingGroupKind {
        self.kind
    }

    /// Lifts a ring element into the group. Non-units are rejected by unit groups.
    pub fn wrap(&self, a: &Element) -> Result<Element, Error> {
        if !self.ring.contains(a) {
            return Err(Error::ForeignElement("ring-group"));
        }
        if self.kind == RingGroupKind::Multiplicative && !self.ring.is_unit(a)? {
            return Err(Error::Math("element is not a unit"));
        }
        Ok(self.lift(a.clone()))
    }

    fn lift(&self, a: Element) -> Element {
        Element::new(RingGroupElement(a))
    }

    /// Projects a group element back into the ring.
    pub fn project(&self, a: &Element) -> Result<Element, Error> {
        self.ring_element(a).cloned()
    }

    fn ring_element<'a>(&self, a: &'a Element) -> Result<&'a Element, Error> {
        let inner = &a.value::<RingGroupElement>("ring-group")?.0;
        if !self.ring.contains(inner) {
            return Err(Error::ForeignElement("ring-group"));
        }
        Ok(inner)
    }
}

impl Representable for RingGroup {
    fn to_repr(&self) -> Repr {
        ReprObject::new()
            .with("ring", &self.ring)
            .with("kind", &self.kind)
            .into()
    }
}

impl Restore for RingGroup {
    fn from_repr(repr: &Repr) -> Result<Self, RepresentationError> {
        let object = repr.as_object()?;
        object.deny_unknown(&["ring", "kind"])?;
        Ok(Self::new(object.field("ring")?, object.field("kind")?))
    }
}

impl StandaloneRepresentable for RingGroup {
    fn type_name(&self) -> &'static str {
        "ring-group"
    }
}

impl Group for RingGroup {
    fn identity(&self) -> Element {
        match self.kind {
            RingGroupKind::Additive => self.lift(self.ring.zero()),
            RingGroupKind::Multiplicative => self.lift(self.ring.one()),
        }
    }

    fn op(&self, a: &Element, b: &Element) -> Result<Element, Error> {
        let (a, b) = (self.ring_element(a)?, self.ring_element(b)?);
        let result = match self.kind {
            RingGroupKind::Additive => self.ring.add(a, b)?,
            RingGroupKind::Multiplicative => self.ring.mul(a, b)?,
        };
        Ok(self.lift(result))
    }

    fn inverse(&self, a: &Element) -> Result<Element, Error> {
        let a = self.ring_element(a)?;
        let result = match self.kind {
            RingGroupKind::Additive => self.ring.negate(a)?,
            RingGroupKind::Multiplicative => self.ring.invert(a)?,
        };
        Ok(self.lift(result))
    }

    fn size(&self) -> Option<BigUint> {
        match self.kind {
            RingGroupKind::Additive => self.ring.size(),
            RingGroupKind::Multiplicative => self.ring.unit_count(),
        }
    }

    /// `1` generates the additive group of `Z/n`-like rings; unit groups have
    /// no generator known without factoring.
    fn generator(&self) -> Result<Element, Error> {
        match self.kind {
            RingGroupKind::Additive if is_prime_ring(self.ring.as_ref()) => {
                Ok(self.lift(self.ring.one()))
            }
            _ => Err(Error::Unsupported("ring group has no known generator")),
        }
    }

    fn is_commutative(&self) -> bool {
        true
    }

    fn contains(&self, a: &Element) -> bool {
        match self.ring_element(a) {
            Ok(inner) => {
                self.kind == RingGroupKind::Additive || self.ring.is_unit(inner).unwrap_or(false)
            }
            Err(_) => false,
        }
    }

    fn restore_element(&self, repr: &Repr) -> Result<Element, Error> {
        let inner = self.ring.restore_element(repr)?;
        self.wrap(&inner)
    }

    fn random(&self, rng: &mut dyn RngCore) -> Result<Element, Error> {
        match self.kind {
            RingGroupKind::Additive => Ok(self.lift(self.ring.random(rng)?)),
            RingGroupKind::Multiplicative => {
                for _ in 0..256 {
                    let candidate = self.ring.random(rng)?;
                    if self.ring.is_unit(&candidate)? {
                        return Ok(self.lift(candidate));
                    }
                }
                Err(Error::Math("failed to sample a unit"))
            }
        }
    }
}
