//! Encoding values into representation trees and restoring them.
//!
//! Restorer rules are picked at compile time from a field's type: scalars,
//! enums (by constant name), fixed arrays, lists, sets, maps, `Option` (null)
//! and nested objects. Structs list their persisted fields explicitly through
//! [`Annotated::fields`], usually generated with [`annotated!`](crate::annotated).
//! Fields whose concrete type is only known at runtime (`Arc<dyn Ring>` and
//! friends) are written together with their type identifier and rebuilt
//! through the [`TypeRegistry`](super::TypeRegistry).
//!
//! # Example
//!
//! ```rust
//! use std::collections::BTreeMap;
//!
//! use bilinear::{annotated, represented_enum};
//! use bilinear::repr::{Representable, Restore};
//!
//! #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord)]
//! enum Color {
//!     #[default]
//!     Red,
//!     Blue,
//! }
//! represented_enum!(Color { Red => "RED", Blue => "BLUE" });
//!
//! #[derive(Debug, Default, PartialEq)]
//! struct Palette {
//!     primary: Color,
//!     accent: Option<Color>,
//!     weights: BTreeMap<Color, u32>,
//! }
//! annotated!(Palette { primary, accent, weights });
//!
//! let palette = Palette {
//!     primary: Color::Blue,
//!     accent: None,
//!     weights: BTreeMap::from([(Color::Red, 3)]),
//! };
//! let repr = palette.to_repr();
//! assert_eq!(Palette::from_repr(&repr).unwrap(), palette);
//! ```

use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};
use std::hash::Hash;
use std::sync::Arc;

use num_bigint::{BigInt, BigUint};

use tracing::warn;

use super::{global_registry, Repr, ReprObject};
use crate::errors::RepresentationError;

/// Reserved key holding the type identifier of a polymorphic value.
pub const TYPE_KEY: &str = "__type";
/// Reserved key holding the representation of a polymorphic value.
pub const VALUE_KEY: &str = "__value";

/// Values that can produce their own representation tree.
pub trait Representable {
    fn to_repr(&self) -> Repr;
}

/// Values that can be rebuilt from a representation tree without outside context.
pub trait Restore: Sized {
    fn from_repr(repr: &Repr) -> Result<Self, RepresentationError>;
}

/// Representable values with a stable type identifier used as registry key.
pub trait StandaloneRepresentable: Representable {
    fn type_name(&self) -> &'static str;
}

impl Representable for Repr {
    fn to_repr(&self) -> Repr {
        self.clone()
    }
}

impl Restore for Repr {
    fn from_repr(repr: &Repr) -> Result<Self, RepresentationError> {
        Ok(repr.clone())
    }
}

impl Representable for bool {
    fn to_repr(&self) -> Repr {
        Repr::Bool(*self)
    }
}

impl Restore for bool {
    fn from_repr(repr: &Repr) -> Result<Self, RepresentationError> {
        repr.as_bool()
    }
}

macro_rules! integer_rule {
    ($($ty:ty),* $(,)?) => {$(
        impl Representable for $ty {
            fn to_repr(&self) -> Repr {
                Repr::Int(BigInt::from(*self))
            }
        }

        impl Restore for $ty {
            fn from_repr(repr: &Repr) -> Result<Self, RepresentationError> {
                let value = repr.as_int()?;
                <$ty>::try_from(value).map_err(|_| {
                    RepresentationError::InvalidValue(format!(
                        "{value} is out of range for {}",
                        stringify!($ty)
                    ))
                })
            }
        }
    )*};
}

integer_rule!(u8, u16, u32, u64, usize, i8, i16, i32, i64);

impl Representable for BigInt {
    fn to_repr(&self) -> Repr {
        Repr::Int(self.clone())
    }
}

impl Restore for BigInt {
    fn from_repr(repr: &Repr) -> Result<Self, RepresentationError> {
        repr.as_int().cloned()
    }
}

impl Representable for BigUint {
    fn to_repr(&self) -> Repr {
        Repr::Int(BigInt::from(self.clone()))
    }
}

impl Restore for BigUint {
    fn from_repr(repr: &Repr) -> Result<Self, RepresentationError> {
        repr.as_uint()
    }
}

impl Representable for str {
    fn to_repr(&self) -> Repr {
        Repr::Str(self.to_owned())
    }
}

impl Representable for String {
    fn to_repr(&self) -> Repr {
        Repr::Str(self.clone())
    }
}

impl Restore for String {
    fn from_repr(repr: &Repr) -> Result<Self, RepresentationError> {
        repr.as_str().map(str::to_owned)
    }
}

/// `None` is written as [`Repr::Null`] and `Some(v)` as `v` itself, so `T` must
/// never encode to `Null`. Nested options (`Option<Option<T>>`) and optional
/// `Repr`s do not round-trip: `Some(None)` restores as `None`.
impl<T: Representable> Representable for Option<T> {
    fn to_repr(&self) -> Repr {
        match self {
            Some(value) => {
                let repr = value.to_repr();
                if repr.is_null() {
                    warn!("optional value encodes to null and will restore as None");
                }
                repr
            }
            None => Repr::Null,
        }
    }
}

impl<T: Restore> Restore for Option<T> {
    fn from_repr(repr: &Repr) -> Result<Self, RepresentationError> {
        match repr {
            Repr::Null => Ok(None),
            other => T::from_repr(other).map(Some),
        }
    }
}

impl<T: Representable> Representable for Box<T> {
    fn to_repr(&self) -> Repr {
        (**self).to_repr()
    }
}

impl<T: Restore> Restore for Box<T> {
    fn from_repr(repr: &Repr) -> Result<Self, RepresentationError> {
        T::from_repr(repr).map(Box::new)
    }
}

impl<T: Representable> Representable for [T] {
    fn to_repr(&self) -> Repr {
        Repr::List(self.iter().map(Representable::to_repr).collect())
    }
}

impl<T: Representable> Representable for Vec<T> {
    fn to_repr(&self) -> Repr {
        self.as_slice().to_repr()
    }
}

impl<T: Restore> Restore for Vec<T> {
    fn from_repr(repr: &Repr) -> Result<Self, RepresentationError> {
        repr.as_list()?.iter().map(T::from_repr).collect()
    }
}

impl<T: Representable, const N: usize> Representable for [T; N] {
    fn to_repr(&self) -> Repr {
        self.as_slice().to_repr()
    }
}

impl<T: Restore, const N: usize> Restore for [T; N] {
    fn from_repr(repr: &Repr) -> Result<Self, RepresentationError> {
        let items: Vec<T> = Vec::from_repr(repr)?;
        let len = items.len();
        items.try_into().map_err(|_| {
            RepresentationError::InvalidValue(format!("expected array of length {N}, got {len}"))
        })
    }
}

impl<T: Representable> Representable for BTreeSet<T> {
    fn to_repr(&self) -> Repr {
        Repr::List(self.iter().map(Representable::to_repr).collect())
    }
}

impl<T: Restore + Ord> Restore for BTreeSet<T> {
    fn from_repr(repr: &Repr) -> Result<Self, RepresentationError> {
        let mut set = BTreeSet::new();
        for item in repr.as_list()? {
            if !set.insert(T::from_repr(item)?) {
                return Err(duplicate("set element"));
            }
        }
        Ok(set)
    }
}

impl<T: Representable + Ord> Representable for HashSet<T> {
    fn to_repr(&self) -> Repr {
        let mut items: Vec<&T> = self.iter().collect();
        items.sort();
        Repr::List(items.into_iter().map(Representable::to_repr).collect())
    }
}

impl<T: Restore + Eq + Hash> Restore for HashSet<T> {
    fn from_repr(repr: &Repr) -> Result<Self, RepresentationError> {
        let mut set = HashSet::new();
        for item in repr.as_list()? {
            if !set.insert(T::from_repr(item)?) {
                return Err(duplicate("set element"));
            }
        }
        Ok(set)
    }
}

fn entry_repr<K: Representable, V: Representable>(key: &K, value: &V) -> Repr {
    let mut entry = ReprObject::new();
    entry.insert("key", key.to_repr());
    entry.insert("value", value.to_repr());
    Repr::Object(entry)
}

fn restore_entries<K: Restore, V: Restore>(
    repr: &Repr,
) -> Result<Vec<(K, V)>, RepresentationError> {
    repr.as_list()?
        .iter()
        .map(|entry| {
            let entry = entry.as_object()?;
            entry.deny_unknown(&["key", "value"])?;
            Ok((entry.field("key")?, entry.field("value")?))
        })
        .collect()
}

fn duplicate(what: &str) -> RepresentationError {
    RepresentationError::InvalidValue(format!("duplicate {what}"))
}

impl<K: Representable, V: Representable> Representable for BTreeMap<K, V> {
    fn to_repr(&self) -> Repr {
        Repr::List(self.iter().map(|(k, v)| entry_repr(k, v)).collect())
    }
}

impl<K: Restore + Ord, V: Restore> Restore for BTreeMap<K, V> {
    fn from_repr(repr: &Repr) -> Result<Self, RepresentationError> {
        let mut map = BTreeMap::new();
        for (key, value) in restore_entries(repr)? {
            if map.insert(key, value).is_some() {
                return Err(duplicate("map key"));
            }
        }
        Ok(map)
    }
}

impl<K: Representable + Ord, V: Representable> Representable for HashMap<K, V> {
    fn to_repr(&self) -> Repr {
        let mut entries: Vec<(&K, &V)> = self.iter().collect();
        entries.sort_by(|a, b| a.0.cmp(b.0));
        Repr::List(entries.into_iter().map(|(k, v)| entry_repr(k, v)).collect())
    }
}

impl<K: Restore + Eq + Hash, V: Restore> Restore for HashMap<K, V> {
    fn from_repr(repr: &Repr) -> Result<Self, RepresentationError> {
        let mut map = HashMap::new();
        for (key, value) in restore_entries(repr)? {
            if map.insert(key, value).is_some() {
                return Err(duplicate("map key"));
            }
        }
        Ok(map)
    }
}

/// Enums persisted by the name of their constant.
///
/// Implemented by [`represented_enum!`](crate::represented_enum), which also
/// provides the [`Representable`] and [`Restore`] impls.
pub trait RepresentedEnum: Copy + 'static {
    const ENUM_NAME: &'static str;

    /// All constants of the enum, in declaration order.
    fn constants() -> &'static [Self];

    fn constant_name(&self) -> &'static str;
}

pub fn put_enum<E: RepresentedEnum>(value: &E) -> Repr {
    Repr::Str(value.constant_name().to_owned())
}

pub fn restore_enum<E: RepresentedEnum>(repr: &Repr) -> Result<E, RepresentationError> {
    let name = repr.as_str()?;
    E::constants()
        .iter()
        .copied()
        .find(|constant| constant.constant_name() == name)
        .ok_or_else(|| RepresentationError::UnknownConstant {
            enum_name: E::ENUM_NAME,
            name: name.to_owned(),
        })
}

/// Implements [`RepresentedEnum`], [`Representable`] and [`Restore`] for a fieldless enum.
///
/// Every variant must be listed; the match is exhaustive.
#[macro_export]
macro_rules! represented_enum {
    ($ty:ident { $($variant:ident => $name:literal),+ $(,)? }) => {
        impl $crate::repr::RepresentedEnum for $ty {
            const ENUM_NAME: &'static str = stringify!($ty);

            fn constants() -> &'static [Self] {
                &[$($ty::$variant),+]
            }

            fn constant_name(&self) -> &'static str {
                match self {
                    $($ty::$variant => $name),+
                }
            }
        }

        impl $crate::repr::Representable for $ty {
            fn to_repr(&self) -> $crate::repr::Repr {
                $crate::repr::put_enum(self)
            }
        }

        impl $crate::repr::Restore for $ty {
            fn from_repr(
                repr: &$crate::repr::Repr,
            ) -> ::core::result::Result<Self, $crate::errors::RepresentationError> {
                $crate::repr::restore_enum(repr)
            }
        }
    };
}

/// One persisted field: its key and how to write and restore it.
pub struct FieldDescriptor<T> {
    name: &'static str,
    put: fn(&T) -> Repr,
    restore: fn(&mut T, &Repr) -> Result<(), RepresentationError>,
}

impl<T> FieldDescriptor<T> {
    pub fn new(
        name: &'static str,
        put: fn(&T) -> Repr,
        restore: fn(&mut T, &Repr) -> Result<(), RepresentationError>,
    ) -> Self {
        Self { name, put, restore }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }
}

/// Structs persisted field by field.
///
/// `fields` fixes the key order of the produced object; restoring starts from
/// `Default` and overwrites every declared field.
pub trait Annotated: Default {
    fn fields() -> Vec<FieldDescriptor<Self>>;
}

pub fn put_annotated<T: Annotated>(value: &T) -> Repr {
    let mut object = ReprObject::new();
    for field in T::fields() {
        object.insert(field.name, (field.put)(value));
    }
    Repr::Object(object)
}

pub fn restore_annotated<T: Annotated>(repr: &Repr) -> Result<T, RepresentationError> {
    let object = repr.as_object()?;
    let fields = T::fields();
    let names: Vec<&str> = fields.iter().map(FieldDescriptor::name).collect();
    object.deny_unknown(&names)?;

    let mut value = T::default();
    for field in &fields {
        (field.restore)(&mut value, object.require(field.name)?)?;
    }
    Ok(value)
}

/// Implements [`Annotated`], [`Representable`] and [`Restore`] for a struct,
/// persisting the listed fields in the given order.
#[macro_export]
macro_rules! annotated {
    ($ty:ident { $($field:ident),* $(,)? }) => {
        impl $crate::repr::Annotated for $ty {
            fn fields() -> ::std::vec::Vec<$crate::repr::FieldDescriptor<Self>> {
                ::std::vec![$(
                    $crate::repr::FieldDescriptor::new(
                        stringify!($field),
                        |value: &$ty| $crate::repr::Representable::to_repr(&value.$field),
                        |value: &mut $ty, repr: &$crate::repr::Repr| {
                            value.$field = $crate::repr::Restore::from_repr(repr)?;
                            Ok(())
                        },
                    )
                ),*]
            }
        }

        impl $crate::repr::Representable for $ty {
            fn to_repr(&self) -> $crate::repr::Repr {
                $crate::repr::put_annotated(self)
            }
        }

        impl $crate::repr::Restore for $ty {
            fn from_repr(
                repr: &$crate::repr::Repr,
            ) -> ::core::result::Result<Self, $crate::errors::RepresentationError> {
                $crate::repr::restore_annotated(repr)
            }
        }
    };
}

/// Writes `value` together with its type identifier.
pub fn put_polymorphic<T: StandaloneRepresentable + ?Sized>(value: &T) -> Repr {
    let mut object = ReprObject::new();
    object.insert(TYPE_KEY, Repr::from(value.type_name()));
    object.insert(VALUE_KEY, value.to_repr());
    Repr::Object(object)
}

/// Rebuilds a value written by [`put_polymorphic`] through the global registry.
///
/// `C` is the capability the value is restored as, e.g. `dyn Ring`.
pub fn restore_polymorphic<C: ?Sized + 'static>(repr: &Repr) -> Result<Arc<C>, RepresentationError> {
    let object = repr.as_object()?;
    object.deny_unknown(&[TYPE_KEY, VALUE_KEY])?;
    let type_name = object.require(TYPE_KEY)?.as_str()?;
    global_registry().restore::<C>(type_name, object.require(VALUE_KEY)?)
}

/// Lets `Arc<dyn Capability>` fields take part in the codec.
macro_rules! polymorphic_capability {
    ($cap:ty) => {
        impl $crate::repr::Representable for ::std::sync::Arc<$cap> {
            fn to_repr(&self) -> $crate::repr::Repr {
                $crate::repr::put_polymorphic(&**self)
            }
        }

        impl $crate::repr::Restore for ::std::sync::Arc<$cap> {
            fn from_repr(
                repr: &$crate::repr::Repr,
            ) -> ::core::result::Result<Self, $crate::errors::RepresentationError> {
                $crate::repr::restore_polymorphic::<$cap>(repr)
            }
        }
    };
}
pub(crate) use polymorphic_capability;
