use std::any::{Any, TypeId};
use std::fmt::{self, Debug};
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use crate::errors::Error;
use crate::repr::{Repr, Representable};

/// Object-safe view of a concrete element value.
///
/// Implemented for every `Debug + PartialEq + Hash + Representable` type, so
/// structures only need to define their element type.
pub trait ElementValue: Representable + Debug + Send + Sync + 'static {
    fn as_any(&self) -> &dyn Any;

    fn dyn_eq(&self, other: &dyn ElementValue) -> bool;

    fn dyn_hash(&self, state: &mut dyn Hasher);
}

impl<T> ElementValue for T
where
    T: Representable + Debug + PartialEq + Hash + Send + Sync + 'static,
{
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn dyn_eq(&self, other: &dyn ElementValue) -> bool {
        other
            .as_any()
            .downcast_ref::<T>()
            .is_some_and(|other| other == self)
    }

    fn dyn_hash(&self, mut state: &mut dyn Hasher) {
        TypeId::of::<T>().hash(&mut state);
        self.hash(&mut state);
    }
}

/// Handle to an element of some ring or group.
///
/// Cloning is cheap. Two elements are equal iff they hold values of the same
/// concrete type that compare equal.
#[derive(Clone)]
pub struct Element(Arc<dyn ElementValue>);

impl Element {
    pub fn new<T: ElementValue>(value: T) -> Self {
        if let Some(element) = (&value as &dyn Any).downcast_ref::<Element>() {
            return element.clone();
        }
        Self(Arc::new(value))
    }

    pub fn downcast_ref<T: 'static>(&self) -> Option<&T> {
        self.0.as_any().downcast_ref::<T>()
    }

    pub fn is<T: 'static>(&self) -> bool {
        self.0.as_any().is::<T>()
    }

    /// Downcasts to `T`, failing with [`Error::ForeignElement`] naming `owner`.
    pub(crate) fn value<T: 'static>(&self, owner: &'static str) -> Result<&T, Error> {
        self.downcast_ref::<T>().ok_or(Error::ForeignElement(owner))
    }
}

impl PartialEq for Element {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0) || self.0.dyn_eq(&*other.0)
    }
}

impl Eq for Element {}

impl Hash for Element {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.0.dyn_hash(state);
    }
}

impl Debug for Element {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        Debug::fmt(&*self.0, f)
    }
}

impl Representable for Element {
    fn to_repr(&self) -> Repr {
        self.0.to_repr()
    }
}
