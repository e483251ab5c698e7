//! Registry lists that defer registry lookups until first use
//!
//! Config files are read before every registry is populated. A lazy list
//! buffers its tokens unvalidated and resolves them exactly once, on the
//! first query. Tags are kept as-is and never validated.

use crate::entry::{Line, LineKind, TagEntry};
use crate::payload::{Payload, ValuePolicy};
use crate::registry_list::RegistryEntryList;
use crate::report::FieldContext;
use crate::store::to_literal;
use crate::ListError;
use registry_core::{Registry, ResourceKey, TagKey};
use std::collections::HashSet;
use std::fmt;
use std::sync::OnceLock;

/// A buffered identity token
#[derive(Debug, Clone, PartialEq, Eq)]
enum Pending {
    Key(ResourceKey),
    Namespace(String),
}

/// Observable state of a lazy list
#[derive(Debug)]
pub enum LazyState<'a> {
    /// Tokens are buffered; the registry has not been consulted
    Unmaterialized,
    Materialized(&'a RegistryEntryList),
}

/// A [`RegistryEntryList`] that may be built before its registry is loaded
///
/// Materialization runs once. It is not synchronized against concurrent
/// first queries from different registries; materialize during startup
/// before sharing the list across threads.
#[derive(Debug, Clone)]
pub struct LazyRegistryEntryList {
    ctx: FieldContext,
    pending: Vec<Pending>,
    tags: Vec<TagEntry>,
    print_list: Vec<String>,
    resolved: OnceLock<RegistryEntryList>,
}

impl LazyRegistryEntryList {
    fn empty(ctx: FieldContext) -> Self {
        LazyRegistryEntryList {
            ctx,
            pending: Vec::new(),
            tags: Vec::new(),
            print_list: Vec::new(),
            resolved: OnceLock::new(),
        }
    }

    /// Create a list from objects that are already registered
    ///
    /// The list is materialized immediately.
    pub fn loaded<'a, R: Registry>(
        registry: &R,
        objects: impl IntoIterator<Item = &'a R::Object>,
        tags: impl IntoIterator<Item = TagKey>,
    ) -> Self
    where
        R::Object: 'a,
    {
        let mut list = Self::empty(FieldContext::traced("<default>"));
        let mut resolved = RegistryEntryList::default();

        for key in objects.into_iter().filter_map(|o| registry.key_of(o)) {
            if resolved.insert_key(key.clone()) {
                list.print_list.push(key.to_string());
                list.pending.push(Pending::Key(key));
            }
        }
        for tag in tags {
            list.push_tag(TagEntry::new(tag, Payload::empty()));
        }
        for tag in &list.tags {
            resolved.insert_tag(tag.clone());
        }

        // Freshly created, so the cell is empty
        let _ = list.resolved.set(resolved);
        list
    }

    /// Create a list from raw tokens (`namespace:path`, `namespace:*`, `#tag`)
    ///
    /// Nothing is validated against a registry until the first query.
    pub fn from_tokens(tokens: &[impl AsRef<str>]) -> Result<Self, ListError> {
        Self::parse(&FieldContext::traced("<default>"), tokens)
    }

    /// Create a list from config lines without touching any registry
    pub fn parse(ctx: &FieldContext, lines: &[impl AsRef<str>]) -> Result<Self, ListError> {
        let policy = ValuePolicy::default().no_values();
        let mut list = Self::empty(ctx.clone());

        for text in lines {
            let line = Line::split(text.as_ref());
            match line.kind() {
                LineKind::Tag(tag) => {
                    let Some(tag) = line.parse_tag(ctx, tag)? else {
                        continue;
                    };
                    let payload = line.values(ctx, &policy);
                    if !list.push_tag(TagEntry::new(tag, payload)) {
                        ctx.warn("Duplicate tag entry! Skipping tag", line.text);
                    }
                }
                LineKind::Namespace(token) => {
                    let Some(namespace) = line.parse_namespace(ctx, token) else {
                        continue;
                    };
                    line.values(ctx, &policy);
                    let duplicate = list
                        .pending
                        .iter()
                        .any(|p| matches!(p, Pending::Namespace(ns) if *ns == namespace));
                    if duplicate {
                        ctx.warn("Duplicate namespace entry! Skipping entry", line.text);
                        continue;
                    }
                    list.print_list.push(format!("{}:*", namespace));
                    list.pending.push(Pending::Namespace(namespace));
                }
                LineKind::Default | LineKind::Exact(_) => {
                    let Some(key) = line.parse_key(ctx, line.identity) else {
                        continue;
                    };
                    line.values(ctx, &policy);
                    list.print_list.push(key.to_string());
                    list.pending.push(Pending::Key(key));
                }
            }
        }

        Ok(list)
    }

    fn push_tag(&mut self, entry: TagEntry) -> bool {
        if self.tags.iter().any(|t| t.tag == entry.tag) {
            return false;
        }
        self.print_list.push(entry.tag.to_string());
        self.tags.push(entry);
        true
    }

    /// Resolve buffered tokens against `registry`, once
    pub fn materialize<R: Registry>(&self, registry: &R) -> &RegistryEntryList {
        self.resolved.get_or_init(|| self.resolve(registry))
    }

    fn resolve<R: Registry>(&self, registry: &R) -> RegistryEntryList {
        let mut list = RegistryEntryList::default();
        // Keys named on their own line, as opposed to reached through a namespace
        let mut explicit = HashSet::new();

        for (pending, line) in self.pending.iter().zip(self.key_lines()) {
            match pending {
                Pending::Namespace(namespace) => {
                    let keys = registry.keys_in_namespace(namespace);
                    if keys.is_empty() {
                        self.ctx.warn(
                            "Namespace entry did not match anything! Questionable entry",
                            line,
                        );
                    }
                    for key in keys {
                        list.insert_key(key);
                    }
                }
                Pending::Key(key) => {
                    if !registry.contains_key(key) || !explicit.insert(key) {
                        self.ctx
                            .warn("Invalid or duplicate entry! Deleting entry", line);
                        continue;
                    }
                    list.insert_key(key.clone());
                }
            }
        }
        for tag in &self.tags {
            list.insert_tag(tag.clone());
        }

        list
    }

    /// Print lines of buffered key/namespace tokens, parallel to `pending`
    fn key_lines(&self) -> impl Iterator<Item = &str> {
        self.print_list
            .iter()
            .filter(|line| !line.starts_with('#'))
            .map(|line| line.as_str())
    }

    pub fn state(&self) -> LazyState<'_> {
        match self.resolved.get() {
            Some(list) => LazyState::Materialized(list),
            None => LazyState::Unmaterialized,
        }
    }

    pub fn is_materialized(&self) -> bool {
        self.resolved.get().is_some()
    }

    /// Whether the object is matched by this list; materializes on first call
    pub fn contains<R: Registry>(&self, registry: &R, object: &R::Object) -> bool {
        self.materialize(registry).contains(registry, object)
    }

    /// Resolved exact keys; materializes on first call
    pub fn entries<R: Registry>(&self, registry: &R) -> impl Iterator<Item = &ResourceKey> {
        self.materialize(registry).entries()
    }

    pub fn tags(&self) -> impl Iterator<Item = &TagKey> {
        self.tags.iter().map(|t| &t.tag)
    }

    /// Answered from the buffered tokens until materialized
    pub fn is_empty(&self) -> bool {
        match self.resolved.get() {
            Some(list) => list.is_empty(),
            None => self.print_list.is_empty(),
        }
    }

    /// Lines that represent this list in a config file
    pub fn to_string_list(&self) -> Vec<String> {
        self.print_list.clone()
    }
}

impl PartialEq for LazyRegistryEntryList {
    fn eq(&self, other: &Self) -> bool {
        self.print_list == other.print_list
    }
}

impl fmt::Display for LazyRegistryEntryList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&to_literal(&self.print_list))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::CollectingReporter;
    use registry_core::{MemoryRegistry, RegistryObject};
    use std::cell::Cell;
    use std::sync::Arc;

    fn key(s: &str) -> ResourceKey {
        ResourceKey::parse(s).unwrap()
    }

    /// Counts every registry call made through it
    struct CountingRegistry {
        inner: MemoryRegistry,
        calls: Cell<usize>,
    }

    impl CountingRegistry {
        fn bump(&self) {
            self.calls.set(self.calls.get() + 1);
        }
    }

    impl Registry for CountingRegistry {
        type Object = RegistryObject;

        fn contains_key(&self, key: &ResourceKey) -> bool {
            self.bump();
            self.inner.contains_key(key)
        }

        fn resolve(&self, key: &ResourceKey) -> Option<&RegistryObject> {
            self.inner.resolve(key)
        }

        fn key_of(&self, object: &RegistryObject) -> Option<ResourceKey> {
            self.inner.key_of(object)
        }

        fn keys_in_namespace(&self, namespace: &str) -> Vec<ResourceKey> {
            self.bump();
            self.inner.keys_in_namespace(namespace)
        }

        fn has_tag(&self, object: &RegistryObject, tag: &TagKey) -> bool {
            self.inner.has_tag(object, tag)
        }
    }

    fn ctx() -> (FieldContext, Arc<CollectingReporter>) {
        let reporter = Arc::new(CollectingReporter::new());
        (FieldContext::new("lazy_items", reporter.clone()), reporter)
    }

    #[test]
    fn test_parse_does_not_need_registry() {
        let (ctx, reporter) = ctx();
        let list =
            LazyRegistryEntryList::parse(&ctx, &["modx:gadget", "modx:*", "#modx:tools"]).unwrap();

        assert!(!list.is_materialized());
        assert!(matches!(list.state(), LazyState::Unmaterialized));
        assert!(!list.is_empty());
        assert!(reporter.is_empty());
        assert_eq!(
            list.to_string_list(),
            vec!["modx:gadget".to_string(), "modx:*".to_string(), "#modx:tools".to_string()]
        );
    }

    #[test]
    fn test_forward_reference_resolves_later() {
        let (ctx, reporter) = ctx();
        let list = LazyRegistryEntryList::parse(&ctx, &["modx:gadget"]).unwrap();

        // Registry populated after the list was read
        let mut registry = MemoryRegistry::new("minecraft:item");
        let gadget = registry.register(key("modx:gadget"));
        let other = registry.register(key("modx:widget"));

        assert!(list.contains(&registry, &gadget));
        assert!(!list.contains(&registry, &other));
        assert!(list.is_materialized());
        assert!(reporter.is_empty());
    }

    #[test]
    fn test_materializes_once() {
        let (ctx, _) = ctx();
        let list = LazyRegistryEntryList::parse(&ctx, &["modx:gadget", "modx:*"]).unwrap();

        let mut inner = MemoryRegistry::new("minecraft:item");
        let gadget = inner.register(key("modx:gadget"));
        let registry = CountingRegistry {
            inner,
            calls: Cell::new(0),
        };

        let first = list.contains(&registry, &gadget);
        let calls = registry.calls.get();
        let second = list.contains(&registry, &gadget);

        assert!(first);
        assert_eq!(first, second);
        assert!(calls > 0);
        assert_eq!(registry.calls.get(), calls);
    }

    #[test]
    fn test_namespace_expands_to_current_keys() {
        let (ctx, reporter) = ctx();
        let list = LazyRegistryEntryList::parse(&ctx, &["modx:*", "mody:*"]).unwrap();

        let mut registry = MemoryRegistry::new("minecraft:item");
        let a = registry.register(key("modx:a"));
        let b = registry.register(key("modx:b"));
        let entries: Vec<_> = list.entries(&registry).cloned().collect();
        assert_eq!(entries, vec![key("modx:a"), key("modx:b")]);

        // The empty namespace is reported but kept in the written list
        assert_eq!(reporter.len(), 1);
        assert_eq!(list.to_string_list(), vec!["modx:*".to_string(), "mody:*".to_string()]);

        // Keys registered after materialization are not picked up
        let c = registry.register(key("modx:c"));
        assert!(list.contains(&registry, &a));
        assert!(list.contains(&registry, &b));
        assert!(!list.contains(&registry, &c));
    }

    #[test]
    fn test_duplicate_namespace_skipped() {
        let (ctx, reporter) = ctx();
        let list = LazyRegistryEntryList::parse(&ctx, &["modx:*", "modx*", "modx:a"]).unwrap();

        assert_eq!(reporter.len(), 1);
        assert_eq!(reporter.reports()[0].line, "modx*");
        assert_eq!(list.to_string_list(), vec!["modx:*".to_string(), "modx:a".to_string()]);
    }

    #[test]
    fn test_key_covered_by_namespace_is_not_a_duplicate() {
        let (ctx, reporter) = ctx();
        let list = LazyRegistryEntryList::parse(&ctx, &["modx:*", "modx:a", "modx:b", "modx:b"]).unwrap();

        let mut registry = MemoryRegistry::new("minecraft:item");
        let a = registry.register(key("modx:a"));
        registry.register(key("modx:b"));

        assert!(list.contains(&registry, &a));
        assert_eq!(list.entries(&registry).count(), 2);
        // Only the repeated explicit key is reported
        assert_eq!(reporter.len(), 1);
        assert_eq!(reporter.reports()[0].line, "modx:b");
    }

    #[test]
    fn test_unresolvable_tokens_dropped_at_materialization() {
        let (ctx, reporter) = ctx();
        let list = LazyRegistryEntryList::parse(&ctx, &["modx:gone", "modx:here", "modx:here"]).unwrap();

        let mut registry = MemoryRegistry::new("minecraft:item");
        let here = registry.register(key("modx:here"));

        assert!(list.contains(&registry, &here));
        // Missing key and duplicate key
        assert_eq!(reporter.len(), 2);
        assert_eq!(reporter.reports()[0].line, "modx:gone");
        assert_eq!(list.entries(&registry).count(), 1);
    }

    #[test]
    fn test_tags_are_not_validated() {
        let (ctx, reporter) = ctx();
        let list = LazyRegistryEntryList::parse(&ctx, &["#modx:tools"]).unwrap();

        let mut registry = MemoryRegistry::new("minecraft:item");
        let wrench = registry.register(key("modx:wrench"));
        let stick = registry.register(key("minecraft:stick"));
        registry.tag(wrench.key(), TagKey::parse("modx:tools").unwrap());

        assert!(list.contains(&registry, &wrench));
        assert!(!list.contains(&registry, &stick));
        assert!(reporter.is_empty());
        assert_eq!(list.tags().count(), 1);
    }

    #[test]
    fn test_loaded_is_materialized() {
        let mut registry = MemoryRegistry::new("minecraft:item");
        let stick = registry.register(key("minecraft:stick"));
        let list = LazyRegistryEntryList::loaded(
            &registry,
            [&stick],
            [TagKey::parse("minecraft:planks").unwrap()],
        );

        assert!(list.is_materialized());
        assert!(list.contains(&registry, &stick));
        assert_eq!(
            list.to_string(),
            r##"["minecraft:stick", "#minecraft:planks"]"##
        );
    }

    #[test]
    fn test_empty_tag_fails_parse() {
        let result = LazyRegistryEntryList::from_tokens(&["#"]);
        assert!(matches!(result, Err(ListError::MalformedTag { .. })));
    }

    #[test]
    fn test_is_empty_after_materialization() {
        let list = LazyRegistryEntryList::from_tokens(&["modx:gone"]).unwrap();
        assert!(!list.is_empty());

        let registry = MemoryRegistry::new("minecraft:item");
        list.materialize(&registry);
        assert!(list.is_empty());
    }
}
