//! Identity lists over an arbitrary registry
//!
//! Exact keys are checked against the registry while parsing, so the
//! registry must already be populated. See [`LazyRegistryEntryList`] for
//! lists that are read before their registry is ready.
//!
//! [`LazyRegistryEntryList`]: crate::LazyRegistryEntryList

use crate::entry::{Line, LineKind, NamespaceEntry, TagEntry, ValueEntry};
use crate::payload::{Payload, ValuePolicy};
use crate::report::FieldContext;
use crate::store::{to_literal, EntryStore};
use crate::ListError;
use registry_core::{Registry, ResourceKey, TagKey};
use std::fmt;

/// A list of entries used to match registry objects
#[derive(Debug, Clone, Default)]
pub struct RegistryEntryList {
    store: EntryStore<ValueEntry>,
}

impl RegistryEntryList {
    /// Create a list from default keys
    pub fn from_keys(keys: impl IntoIterator<Item = ResourceKey>) -> Self {
        let mut list = RegistryEntryList::default();
        for key in keys {
            list.insert_key(key);
        }
        list
    }

    /// Create a list from loaded objects; objects without a key are skipped
    pub fn from_objects<'a, R: Registry>(
        registry: &R,
        objects: impl IntoIterator<Item = &'a R::Object>,
    ) -> Self
    where
        R::Object: 'a,
    {
        Self::from_keys(objects.into_iter().filter_map(|o| registry.key_of(o)))
    }

    /// Builder: add tags, skipping ones already present
    pub fn with_tags(mut self, tags: impl IntoIterator<Item = TagKey>) -> Self {
        for tag in tags {
            self.store.insert_tag(TagEntry::new(tag, Payload::empty()));
        }
        self
    }

    /// Builder: add namespaces, skipping ones already present
    pub fn with_namespaces<'a>(mut self, namespaces: impl IntoIterator<Item = &'a str>) -> Self {
        for namespace in namespaces {
            self.store
                .insert_namespace(NamespaceEntry::new(namespace, Payload::empty()));
        }
        self
    }

    /// Create a list from config lines, validating keys against `registry`
    pub fn parse<R: Registry>(
        ctx: &FieldContext,
        registry: &R,
        lines: &[impl AsRef<str>],
    ) -> Result<Self, ListError> {
        let policy = ValuePolicy::default().no_values();
        let mut list = RegistryEntryList::default();

        for text in lines {
            let line = Line::split(text.as_ref());
            match line.kind() {
                LineKind::Tag(tag) => {
                    let Some(tag) = line.parse_tag(ctx, tag)? else {
                        continue;
                    };
                    let payload = line.values(ctx, &policy);
                    if !list.store.insert_tag(TagEntry::new(tag, payload)) {
                        ctx.warn("Duplicate tag entry! Skipping tag", line.text);
                    }
                }
                LineKind::Namespace(token) => {
                    let Some(namespace) = line.parse_namespace(ctx, token) else {
                        continue;
                    };
                    let payload = line.values(ctx, &policy);
                    if !list
                        .store
                        .insert_namespace(NamespaceEntry::new(&namespace, payload))
                    {
                        ctx.warn("Duplicate namespace entry! Skipping entry", line.text);
                    }
                }
                LineKind::Default | LineKind::Exact(_) => {
                    let Some(key) = line.parse_key(ctx, line.identity) else {
                        continue;
                    };
                    line.values(ctx, &policy);
                    if !registry.contains_key(&key) || !list.insert_key(key) {
                        ctx.warn("Invalid or duplicate entry! Deleting entry", line.text);
                    }
                }
            }
        }

        Ok(list)
    }

    /// Add a key unless already present
    pub(crate) fn insert_key(&mut self, key: ResourceKey) -> bool {
        let printed = key.to_string();
        self.store.insert_exact(ValueEntry::key_only(key), printed)
    }

    pub(crate) fn insert_tag(&mut self, entry: TagEntry) -> bool {
        self.store.insert_tag(entry)
    }

    /// Whether the object is matched by this list
    pub fn contains<R: Registry>(&self, registry: &R, object: &R::Object) -> bool {
        let key = registry.key_of(object);
        self.store
            .best_match(
                key.as_ref(),
                |store| store.lookup(key.as_ref()),
                |tag| registry.has_tag(object, tag),
            )
            .is_some()
    }

    pub fn is_empty(&self) -> bool {
        self.store.is_empty()
    }

    /// Exact keys, in the order they were added
    pub fn entries(&self) -> impl Iterator<Item = &ResourceKey> {
        self.store.exact_entries().map(|e| &e.key)
    }

    pub fn tags(&self) -> impl Iterator<Item = &TagKey> {
        self.store.tags().iter().map(|t| &t.tag)
    }

    pub fn namespaces(&self) -> impl Iterator<Item = &str> {
        self.store.namespaces().iter().map(|n| n.namespace.as_str())
    }

    /// Lines that represent this list in a config file
    pub fn to_string_list(&self) -> Vec<String> {
        self.store.print_list().to_vec()
    }
}

impl PartialEq for RegistryEntryList {
    fn eq(&self, other: &Self) -> bool {
        self.store.print_list() == other.store.print_list()
    }
}

impl fmt::Display for RegistryEntryList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&to_literal(self.store.print_list()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::CollectingReporter;
    use registry_core::{MemoryRegistry, RegistryObject};
    use std::sync::Arc;

    fn key(s: &str) -> ResourceKey {
        ResourceKey::parse(s).unwrap()
    }

    fn registry() -> (MemoryRegistry, Vec<RegistryObject>) {
        let mut registry = MemoryRegistry::new("minecraft:item");
        let objects = vec![
            registry.register(key("minecraft:diamond")),
            registry.register(key("minecraft:emerald")),
            registry.register(key("modx:foo")),
            registry.register(key("mody:foo")),
        ];
        registry.tag(&key("minecraft:emerald"), TagKey::parse("minecraft:gems").unwrap());
        (registry, objects)
    }

    fn ctx() -> (FieldContext, Arc<CollectingReporter>) {
        let reporter = Arc::new(CollectingReporter::new());
        (FieldContext::new("items", reporter.clone()), reporter)
    }

    #[test]
    fn test_namespace_wildcard_scenario() {
        let (registry, objects) = registry();
        let (ctx, _) = ctx();
        let list = RegistryEntryList::parse(&ctx, &registry, &["modx:*"]).unwrap();

        assert!(list.contains(&registry, &objects[2]));
        assert!(!list.contains(&registry, &objects[3]));
    }

    #[test]
    fn test_exact_and_tag_entries() {
        let (registry, objects) = registry();
        let (ctx, reporter) = ctx();
        let list =
            RegistryEntryList::parse(&ctx, &registry, &["minecraft:diamond", "#minecraft:gems"]).unwrap();

        assert!(reporter.is_empty());
        assert!(list.contains(&registry, &objects[0]));
        assert!(list.contains(&registry, &objects[1]));
        assert!(!list.contains(&registry, &objects[2]));
    }

    #[test]
    fn test_unknown_and_duplicate_keys_dropped() {
        let (registry, _) = registry();
        let (ctx, reporter) = ctx();
        let list = RegistryEntryList::parse(
            &ctx,
            &registry,
            &["minecraft:diamond", "diamond", "minecraft:ruby", "#minecraft:gems", "#gems"],
        )
        .unwrap();

        // Unknown key, duplicate key, duplicate tag
        assert_eq!(reporter.len(), 3);
        assert_eq!(
            list.to_string_list(),
            vec!["minecraft:diamond".to_string(), "#minecraft:gems".to_string()]
        );
        assert_eq!(list.entries().count(), 1);
        assert_eq!(list.tags().count(), 1);
    }

    #[test]
    fn test_values_are_not_allowed() {
        let (registry, _) = registry();
        let (ctx, reporter) = ctx();
        let list = RegistryEntryList::parse(&ctx, &registry, &["minecraft:diamond 3"]).unwrap();

        assert_eq!(reporter.len(), 1);
        assert_eq!(list.to_string_list(), vec!["minecraft:diamond".to_string()]);
    }

    #[test]
    fn test_from_objects() {
        let (registry, objects) = registry();
        let list = RegistryEntryList::from_objects(&registry, &objects[..2]).with_namespaces(["mody"]);

        assert!(list.contains(&registry, &objects[0]));
        assert!(list.contains(&registry, &objects[3]));
        assert!(!list.contains(&registry, &objects[2]));
        assert_eq!(
            list.to_string(),
            r#"["minecraft:diamond", "minecraft:emerald", "mody:*"]"#
        );
    }

    #[test]
    fn test_equality_by_string_list() {
        let (registry, _) = registry();
        let (ctx, _) = ctx();
        let parsed = RegistryEntryList::parse(&ctx, &registry, &["diamond"]).unwrap();
        let built = RegistryEntryList::from_keys([key("minecraft:diamond")]);

        assert_eq!(parsed, built);
        assert_ne!(parsed, RegistryEntryList::default());
        assert!(RegistryEntryList::default().is_empty());
    }
}
