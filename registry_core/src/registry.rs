//! Lookup capabilities consumed by entry lists
//!
//! Entry lists never own registry data. Everything they need to know about
//! the outside world is asked through these traits.

use crate::key::{ResourceKey, TagKey};

/// Key lookup plus tag membership for one registry
pub trait Registry {
    /// The objects this registry holds (blocks, entity types, items, ...)
    type Object;

    /// Whether `key` names a registered object
    fn contains_key(&self, key: &ResourceKey) -> bool;

    /// Resolve a key to its registered object
    fn resolve(&self, key: &ResourceKey) -> Option<&Self::Object>;

    /// Resolve an object back to its key
    fn key_of(&self, object: &Self::Object) -> Option<ResourceKey>;

    /// Every registered key in `namespace`, in a stable order
    fn keys_in_namespace(&self, namespace: &str) -> Vec<ResourceKey>;

    /// Whether `object` carries `tag`
    fn has_tag(&self, object: &Self::Object, tag: &TagKey) -> bool;
}

/// Runtime-class information for entity registries
///
/// An entity type's class is only known once an instance exists, so the
/// registry is asked to look one up on demand.
pub trait EntityRegistry: Registry {
    type Class: Clone + PartialEq;

    /// Instantiate a sample of the entity type and report its class
    fn probe_class(&self, entity_type: &ResourceKey) -> Option<Self::Class>;

    /// Whether `class` is `ancestor` or inherits from it
    fn is_subclass(&self, class: &Self::Class, ancestor: &Self::Class) -> bool;
}
