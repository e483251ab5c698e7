use crate::key::{ResourceKey, TagKey};
use crate::registry::{EntityRegistry, Registry};
use std::collections::{BTreeMap, HashMap, HashSet};

/// An object registered in a [`MemoryRegistry`]
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RegistryObject {
    key: ResourceKey,
}

impl RegistryObject {
    pub fn key(&self) -> &ResourceKey {
        &self.key
    }
}

/// In-memory registry with tags and an optional class hierarchy
#[derive(Debug, Clone, Default)]
pub struct MemoryRegistry {
    id: String,
    objects: BTreeMap<ResourceKey, RegistryObject>,
    tags: HashMap<TagKey, HashSet<ResourceKey>>,
    /// Runtime class per registered key (entity registries)
    classes: HashMap<ResourceKey, String>,
    /// Parent of each class that has one
    parents: HashMap<String, String>,
}

impl MemoryRegistry {
    /// Create an empty registry
    pub fn new(id: &str) -> Self {
        MemoryRegistry {
            id: id.to_string(),
            ..Default::default()
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// Register an object under `key`, returning it
    pub fn register(&mut self, key: ResourceKey) -> RegistryObject {
        self.objects
            .entry(key.clone())
            .or_insert(RegistryObject { key })
            .clone()
    }

    /// Add `key` to `tag`
    pub fn tag(&mut self, key: &ResourceKey, tag: TagKey) {
        self.tags.entry(tag).or_default().insert(key.clone());
    }

    /// Record the runtime class produced by instantiating `key`
    pub fn set_class(&mut self, key: &ResourceKey, class: &str) {
        self.classes.insert(key.clone(), class.to_string());
    }

    /// Record that `class` directly inherits from `parent`
    pub fn set_parent(&mut self, class: &str, parent: &str) {
        self.parents.insert(class.to_string(), parent.to_string());
    }

    /// Get an object by key
    pub fn get(&self, key: &ResourceKey) -> Option<&RegistryObject> {
        self.objects.get(key)
    }

    /// All registered keys, sorted
    pub fn keys(&self) -> impl Iterator<Item = &ResourceKey> {
        self.objects.keys()
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }
}

impl Registry for MemoryRegistry {
    type Object = RegistryObject;

    fn contains_key(&self, key: &ResourceKey) -> bool {
        self.objects.contains_key(key)
    }

    fn resolve(&self, key: &ResourceKey) -> Option<&RegistryObject> {
        self.objects.get(key)
    }

    fn key_of(&self, object: &RegistryObject) -> Option<ResourceKey> {
        self.objects
            .contains_key(&object.key)
            .then(|| object.key.clone())
    }

    fn keys_in_namespace(&self, namespace: &str) -> Vec<ResourceKey> {
        self.objects
            .keys()
            .filter(|k| k.namespace() == namespace)
            .cloned()
            .collect()
    }

    fn has_tag(&self, object: &RegistryObject, tag: &TagKey) -> bool {
        self.tags
            .get(tag)
            .is_some_and(|members| members.contains(&object.key))
    }
}

impl EntityRegistry for MemoryRegistry {
    type Class = String;

    fn probe_class(&self, entity_type: &ResourceKey) -> Option<String> {
        self.classes.get(entity_type).cloned()
    }

    fn is_subclass(&self, class: &String, ancestor: &String) -> bool {
        let mut current = class;
        // Bounded walk; a malformed hierarchy may contain a cycle
        for _ in 0..=self.parents.len() {
            if current == ancestor {
                return true;
            }
            match self.parents.get(current) {
                Some(parent) => current = parent,
                None => return false,
            }
        }
        false
    }
}
