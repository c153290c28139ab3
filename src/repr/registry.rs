//! Type registry used to rebuild polymorphic values.
//!
//! Each entry maps a capability (a trait-object type such as `dyn Ring`) and a
//! type identifier to a restore routine. The process-wide instance returned by
//! [`global_registry`] is filled with every built-in type on first access and
//! only grows afterwards.

use std::any::{type_name, Any, TypeId};
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, PoisonError, RwLock};

use once_cell::sync::Lazy;
use tracing::{debug, trace};

use super::Repr;
use crate::errors::RepresentationError;

/// Restore routine for values of capability `C`.
pub type RestoreFn<C> = fn(&Repr) -> Result<Arc<C>, RepresentationError>;

type Slot = HashMap<&'static str, Box<dyn Any + Send + Sync>>;

#[derive(Default)]
pub struct TypeRegistry {
    entries: RwLock<HashMap<TypeId, Slot>>,
}

impl TypeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `restore` for `type_id` under capability `C`.
    ///
    /// Returns `false` and leaves the registry unchanged if the identifier is
    /// already taken for that capability.
    pub fn register<C: ?Sized + 'static>(&self, type_id: &'static str, restore: RestoreFn<C>) -> bool {
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        let slot = entries.entry(TypeId::of::<C>()).or_default();
        if slot.contains_key(type_id) {
            debug!(type_id, capability = type_name::<C>(), "type identifier already registered");
            return false;
        }
        slot.insert(type_id, Box::new(restore));
        trace!(type_id, capability = type_name::<C>(), "registered restorer");
        true
    }

    pub fn contains<C: ?Sized + 'static>(&self, type_id: &str) -> bool {
        self.lookup::<C>(type_id).is_some()
    }

    /// Rebuilds the value stored as `repr` using the routine registered for `type_id`.
    pub fn restore<C: ?Sized + 'static>(
        &self,
        type_id: &str,
        repr: &Repr,
    ) -> Result<Arc<C>, RepresentationError> {
        // The lock is released before the routine runs: nested polymorphic
        // fields come back through this registry.
        let restore = self
            .lookup::<C>(type_id)
            .ok_or_else(|| RepresentationError::UnknownType(type_id.to_owned()))?;
        restore(repr)
    }

    fn lookup<C: ?Sized + 'static>(&self, type_id: &str) -> Option<RestoreFn<C>> {
        let entries = self.entries.read().unwrap_or_else(PoisonError::into_inner);
        entries
            .get(&TypeId::of::<C>())
            .and_then(|slot| slot.get(type_id))
            .and_then(|entry| entry.downcast_ref::<RestoreFn<C>>())
            .copied()
    }

    /// Registered identifiers for capability `C`, sorted.
    pub fn type_ids<C: ?Sized + 'static>(&self) -> Vec<&'static str> {
        let entries = self.entries.read().unwrap_or_else(PoisonError::into_inner);
        let mut ids: Vec<_> = entries
            .get(&TypeId::of::<C>())
            .map(|slot| slot.keys().copied().collect())
            .unwrap_or_default();
        ids.sort_unstable();
        ids
    }
}

impl fmt::Debug for TypeRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let entries = self.entries.read().unwrap_or_else(PoisonError::into_inner);
        f.debug_struct("TypeRegistry")
            .field("capabilities", &entries.len())
            .field("types", &entries.values().map(HashMap::len).sum::<usize>())
            .finish()
    }
}

static GLOBAL: Lazy<TypeRegistry> = Lazy::new(|| {
    let registry = TypeRegistry::new();
    crate::arith::register_builtin_types(&registry);
    debug!(?registry, "initialized global type registry");
    registry
});

/// The process-wide registry consulted when restoring polymorphic fields.
pub fn global_registry() -> &'static TypeRegistry {
    &GLOBAL
}
