//! Self-describing representation trees.
//!
//! A [`Repr`] is a recursive value built from six node kinds: null, booleans,
//! arbitrary-precision integers, strings, ordered lists and string-keyed objects.
//! Every persisted structure in this crate (rings, groups, bilinear groups,
//! requirements, elements) produces such a tree and can be rebuilt from it.
//!
//! # Modules
//!
//! - **[`codec`]**: the [`Representable`] / [`Restore`] traits, restorer rules for
//!   primitives and collections, enum and annotated-struct support, polymorphic fields
//! - **[`registry`]**: the [`TypeRegistry`] mapping type identifiers to restore routines
//!
//! # Wire shape
//!
//! With serde, every node is tagged by its kind, so the format needs no schema:
//!
//! ```text
//! "null" | {"bool": true} | {"bigint": "-42"} | {"string": "zn"}
//!        | {"list": [..]} | {"map": {"key": <node>, ..}}
//! ```
//!
//! # Example
//!
//! ```rust
//! use bilinear::repr::{Repr, ReprObject};
//!
//! let mut object = ReprObject::new();
//! object.insert("modulus", Repr::from(17u32));
//! object.insert("name", Repr::from("zp"));
//! let repr = Repr::Object(object);
//!
//! let modulus = repr.as_object().unwrap().require("modulus").unwrap();
//! assert_eq!(modulus.as_int().unwrap().to_string(), "17");
//! ```

pub mod codec;
pub use codec::*;
pub(crate) use codec::polymorphic_capability;

pub mod registry;
pub use registry::*;

use core::fmt;

use num_bigint::{BigInt, BigUint, Sign};
use serde::de::{self, MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::errors::RepresentationError;

/// A node of a representation tree.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Repr {
    #[serde(rename = "null")]
    Null,
    #[serde(rename = "bool")]
    Bool(bool),
    #[serde(rename = "bigint", with = "decimal")]
    Int(BigInt),
    #[serde(rename = "string")]
    Str(String),
    #[serde(rename = "list")]
    List(Vec<Repr>),
    #[serde(rename = "map")]
    Object(ReprObject),
}

impl Repr {
    /// Name of this node's kind, as used in error messages and on the wire.
    pub fn kind(&self) -> &'static str {
        match self {
            Repr::Null => "null",
            Repr::Bool(_) => "bool",
            Repr::Int(_) => "bigint",
            Repr::Str(_) => "string",
            Repr::List(_) => "list",
            Repr::Object(_) => "map",
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Repr::Null)
    }

    pub fn as_bool(&self) -> Result<bool, RepresentationError> {
        match self {
            Repr::Bool(value) => Ok(*value),
            other => Err(other.mismatch("bool")),
        }
    }

    pub fn as_int(&self) -> Result<&BigInt, RepresentationError> {
        match self {
            Repr::Int(value) => Ok(value),
            other => Err(other.mismatch("bigint")),
        }
    }

    /// Returns the integer payload as a non-negative [`BigUint`].
    pub fn as_uint(&self) -> Result<BigUint, RepresentationError> {
        let value = self.as_int()?;
        value.to_biguint().ok_or_else(|| {
            RepresentationError::InvalidValue(format!("expected non-negative integer, got {value}"))
        })
    }

    pub fn as_str(&self) -> Result<&str, RepresentationError> {
        match self {
            Repr::Str(value) => Ok(value),
            other => Err(other.mismatch("string")),
        }
    }

    pub fn as_list(&self) -> Result<&[Repr], RepresentationError> {
        match self {
            Repr::List(items) => Ok(items),
            other => Err(other.mismatch("list")),
        }
    }

    pub fn as_object(&self) -> Result<&ReprObject, RepresentationError> {
        match self {
            Repr::Object(object) => Ok(object),
            other => Err(other.mismatch("map")),
        }
    }

    /// Encodes a fixed-width byte string as a big-endian non-negative integer.
    pub fn from_bytes(bytes: &[u8]) -> Self {
        Repr::Int(BigInt::from_bytes_be(Sign::Plus, bytes))
    }

    /// Decodes a byte string produced by [`Repr::from_bytes`], left-padding to `len` bytes.
    pub fn to_bytes(&self, len: usize) -> Result<Vec<u8>, RepresentationError> {
        let raw = self.as_uint()?.to_bytes_be();
        let raw: &[u8] = if raw == [0] { &[] } else { &raw };
        if raw.len() > len {
            return Err(RepresentationError::InvalidValue(format!(
                "byte string of {} bytes exceeds expected width {len}",
                raw.len()
            )));
        }
        let mut bytes = vec![0u8; len - raw.len()];
        bytes.extend_from_slice(raw);
        Ok(bytes)
    }

    pub(crate) fn mismatch(&self, expected: &'static str) -> RepresentationError {
        RepresentationError::Malformed {
            expected,
            found: self.kind(),
        }
    }
}

impl From<bool> for Repr {
    fn from(value: bool) -> Self {
        Repr::Bool(value)
    }
}

impl From<BigInt> for Repr {
    fn from(value: BigInt) -> Self {
        Repr::Int(value)
    }
}

impl From<BigUint> for Repr {
    fn from(value: BigUint) -> Self {
        Repr::Int(BigInt::from(value))
    }
}

impl From<u32> for Repr {
    fn from(value: u32) -> Self {
        Repr::Int(BigInt::from(value))
    }
}

impl From<&str> for Repr {
    fn from(value: &str) -> Self {
        Repr::Str(value.to_owned())
    }
}

impl From<String> for Repr {
    fn from(value: String) -> Self {
        Repr::Str(value)
    }
}

impl From<Vec<Repr>> for Repr {
    fn from(items: Vec<Repr>) -> Self {
        Repr::List(items)
    }
}

impl From<ReprObject> for Repr {
    fn from(object: ReprObject) -> Self {
        Repr::Object(object)
    }
}

/// String-keyed object node. Keys are unique and keep their insertion order.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct ReprObject {
    entries: Vec<(String, Repr)>,
}

impl ReprObject {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts `value` under `key`, replacing (in place) and returning any previous value.
    pub fn insert(&mut self, key: impl Into<String>, value: Repr) -> Option<Repr> {
        let key = key.into();
        match self.entries.iter_mut().find(|(existing, _)| *existing == key) {
            Some((_, slot)) => Some(core::mem::replace(slot, value)),
            None => {
                self.entries.push((key, value));
                None
            }
        }
    }

    /// Builder-style insertion of any representable value.
    pub fn with(mut self, key: impl Into<String>, value: &(impl Representable + ?Sized)) -> Self {
        self.insert(key, value.to_repr());
        self
    }

    pub fn get(&self, key: &str) -> Option<&Repr> {
        self.entries
            .iter()
            .find(|(existing, _)| existing == key)
            .map(|(_, value)| value)
    }

    /// Like [`ReprObject::get`], failing with `MissingField` when the key is absent.
    pub fn require(&self, key: &str) -> Result<&Repr, RepresentationError> {
        self.get(key)
            .ok_or_else(|| RepresentationError::MissingField(key.to_owned()))
    }

    /// Restores the value stored under `key`.
    pub fn field<T: Restore>(&self, key: &str) -> Result<T, RepresentationError> {
        T::from_repr(self.require(key)?)
    }

    /// Fails with `UnexpectedField` if any key outside `allowed` is present.
    pub fn deny_unknown(&self, allowed: &[&str]) -> Result<(), RepresentationError> {
        match self.keys().find(|key| !allowed.contains(key)) {
            Some(key) => Err(RepresentationError::UnexpectedField(key.to_owned())),
            None => Ok(()),
        }
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(key, _)| key.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Repr)> {
        self.entries.iter().map(|(key, value)| (key.as_str(), value))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Serialize for ReprObject {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (key, value) in &self.entries {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for ReprObject {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct ObjectVisitor;

        impl<'de> Visitor<'de> for ObjectVisitor {
            type Value = ReprObject;

            fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                formatter.write_str("a map of representation nodes")
            }

            fn visit_map<A>(self, mut access: A) -> Result<Self::Value, A::Error>
            where
                A: MapAccess<'de>,
            {
                let mut object = ReprObject::new();
                while let Some((key, value)) = access.next_entry::<String, Repr>()? {
                    if object.get(&key).is_some() {
                        return Err(de::Error::custom(format!("duplicate key `{key}`")));
                    }
                    object.entries.push((key, value));
                }
                Ok(object)
            }
        }

        deserializer.deserialize_map(ObjectVisitor)
    }
}

/// Big integers travel as decimal strings so no precision is lost in JSON.
mod decimal {
    use num_bigint::BigInt;
    use serde::{de, Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(value: &BigInt, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&value.to_string())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<BigInt, D::Error>
    where
        D: Deserializer<'de>,
    {
        let digits = String::deserialize(deserializer)?;
        BigInt::parse_bytes(digits.as_bytes(), 10)
            .ok_or_else(|| de::Error::custom(format!("invalid decimal integer `{digits}`")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Repr {
        let mut inner = ReprObject::new();
        inner.insert("z", Repr::Null);
        inner.insert("a", Repr::from(true));
        let mut object = ReprObject::new();
        object.insert("value", Repr::Int(BigInt::from(-123456789012345678i64) * 1000));
        object.insert("name", Repr::from("zn"));
        object.insert("items", Repr::List(vec![Repr::Null, Repr::Object(inner)]));
        Repr::Object(object)
    }

    #[test]
    fn json_wire_shape_round_trips() {
        let repr = sample();
        let json = serde_json::to_string(&repr).expect("serialize");
        assert!(json.contains(r#"{"bigint":"-123456789012345678000"}"#));
        assert!(json.contains(r#""null""#));
        let back: Repr = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(back, repr);
    }

    #[test]
    fn object_keeps_insertion_order() {
        let repr = sample();
        let object = repr.as_object().unwrap();
        assert_eq!(object.keys().collect::<Vec<_>>(), ["value", "name", "items"]);

        let json = serde_json::to_string(&repr).unwrap();
        let value_pos = json.find("\"value\"").unwrap();
        let name_pos = json.find("\"name\"").unwrap();
        assert!(value_pos < name_pos);
    }

    #[test]
    fn insert_replaces_in_place() {
        let mut object = ReprObject::new();
        object.insert("a", Repr::from(1u32));
        object.insert("b", Repr::from(2u32));
        let previous = object.insert("a", Repr::from(3u32));
        assert_eq!(previous, Some(Repr::from(1u32)));
        assert_eq!(object.keys().collect::<Vec<_>>(), ["a", "b"]);
        assert_eq!(object.len(), 2);
    }

    #[test]
    fn duplicate_keys_are_rejected() {
        let json = r#"{"map":{"a":"null","a":{"bool":true}}}"#;
        assert!(serde_json::from_str::<Repr>(json).is_err());
    }

    #[test]
    fn accessors_report_kind_mismatch() {
        let err = Repr::from("x").as_int().unwrap_err();
        assert_eq!(
            err,
            RepresentationError::Malformed {
                expected: "bigint",
                found: "string"
            }
        );
        assert!(Repr::Int(BigInt::from(-1)).as_uint().is_err());
        assert!(matches!(
            ReprObject::new().require("x"),
            Err(RepresentationError::MissingField(_))
        ));
    }

    #[test]
    fn byte_strings_keep_leading_zeros() {
        let bytes = [0u8, 0, 7, 255];
        let repr = Repr::from_bytes(&bytes);
        assert_eq!(repr.to_bytes(4).unwrap(), bytes);
        assert_eq!(Repr::from_bytes(&[0, 0]).to_bytes(2).unwrap(), [0, 0]);
        assert!(repr.to_bytes(1).is_err());
    }
}
