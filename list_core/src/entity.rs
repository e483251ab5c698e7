//! Entity value lists with subclass-aware entries
//!
//! An extendable entry (the default) also matches entities whose runtime
//! class inherits from the entry's class. A `~` prefix restricts the entry
//! to its exact entity type. Runtime classes are looked up through the
//! registry the first time an entry needs one and cached per entry.

use crate::combined::{ValueList, ValueQuery};
use crate::entry::{DefaultEntry, Line, LineKind, NamespaceEntry, TagEntry};
use crate::payload::{Payload, ValuePolicy};
use crate::report::FieldContext;
use crate::store::{to_literal, EntryStore, ExactEntry, ExactLookup};
use crate::ListError;
use registry_core::{EntityRegistry, EntityView, ResourceKey, TagKey};
use std::fmt;
use std::sync::OnceLock;

/// Prefix marking an entry that does not extend to subclasses
pub const SPECIFIC_PREFIX: char = '~';

/// An exact rule for one entity type
#[derive(Debug, Clone)]
pub struct EntityEntry<C> {
    pub key: ResourceKey,
    /// Also match subclasses of this type's runtime class
    pub extend: bool,
    pub payload: Payload,
    class: OnceLock<C>,
}

impl<C> EntityEntry<C> {
    pub fn new(key: ResourceKey, extend: bool, payload: impl Into<Payload>) -> Self {
        EntityEntry {
            key,
            extend,
            payload: payload.into(),
            class: OnceLock::new(),
        }
    }

    /// Extendable entry
    pub fn extending(key: ResourceKey, payload: impl Into<Payload>) -> Self {
        Self::new(key, true, payload)
    }

    /// Entry for this exact type only
    pub fn specific(key: ResourceKey, payload: impl Into<Payload>) -> Self {
        Self::new(key, false, payload)
    }

    /// Runtime class of this entry's type
    ///
    /// Looked up again until a class is found; the first one is kept.
    pub fn class<R>(&self, registry: &R) -> Option<&C>
    where
        R: EntityRegistry<Class = C>,
    {
        if let Some(class) = self.class.get() {
            return Some(class);
        }
        let found = registry.probe_class(&self.key)?;
        Some(self.class.get_or_init(|| found))
    }
}

impl<C> ExactEntry for EntityEntry<C> {
    fn key(&self) -> &ResourceKey {
        &self.key
    }

    fn payload(&self) -> &Payload {
        &self.payload
    }
}

impl<C> PartialEq for EntityEntry<C> {
    fn eq(&self, other: &Self) -> bool {
        self.key == other.key && self.extend == other.extend && self.payload == other.payload
    }
}

/// `~key v0 v1 ...` for specific entries, `key v0 v1 ...` otherwise
impl<C> fmt::Display for EntityEntry<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut out = String::new();
        if !self.extend {
            out.push(SPECIFIC_PREFIX);
        }
        out.push_str(&self.key.to_string());
        self.payload.render_onto(&mut out);
        f.write_str(&out)
    }
}

/// A value list matched against live entities
#[derive(Debug, Clone)]
pub struct EntityList<C> {
    ctx: FieldContext,
    policy: ValuePolicy,
    store: EntryStore<EntityEntry<C>>,
}

impl<C: Clone + PartialEq> EntityList<C> {
    /// Create a list from default entries; duplicate types are skipped
    pub fn new(policy: ValuePolicy, entries: impl IntoIterator<Item = EntityEntry<C>>) -> Self {
        let mut list = EntityList {
            ctx: FieldContext::traced("<default>"),
            policy,
            store: EntryStore::new(),
        };
        for entry in entries {
            let printed = entry.to_string();
            list.store.insert_exact(entry, printed);
        }
        list
    }

    /// Builder: add a tag entry; a tag already present is skipped
    pub fn with_tag(mut self, tag: TagKey, values: impl Into<Payload>) -> Self {
        self.store.insert_tag(TagEntry::new(tag, values));
        self
    }

    /// Builder: add a namespace entry; a namespace already present is skipped
    pub fn with_namespace(mut self, namespace: &str, values: impl Into<Payload>) -> Self {
        self.store.insert_namespace(NamespaceEntry::new(namespace, values));
        self
    }

    /// Builder: set the default entry unless one is already set
    pub fn with_default(mut self, values: impl Into<Payload>) -> Self {
        self.store.set_default(DefaultEntry::new(values));
        self
    }

    /// Create a list from config lines, validating entity types against `registry`
    pub fn parse<R>(
        ctx: &FieldContext,
        policy: ValuePolicy,
        registry: &R,
        lines: &[impl AsRef<str>],
    ) -> Result<Self, ListError>
    where
        R: EntityRegistry<Class = C>,
    {
        let mut list = EntityList {
            ctx: ctx.clone(),
            policy,
            store: EntryStore::new(),
        };

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
                LineKind::Default => {
                    let payload = line.values(ctx, &policy);
                    list.store.set_default(DefaultEntry::new(payload));
                }
                LineKind::Exact(token) => {
                    let (extend, token) = match token.strip_prefix(SPECIFIC_PREFIX) {
                        Some(rest) => (false, rest),
                        None => (true, token),
                    };
                    let Some(key) = line.parse_key(ctx, token) else {
                        continue;
                    };
                    let payload = line.values(ctx, &policy);
                    if !registry.contains_key(&key) {
                        ctx.warn("Invalid or duplicate entry! Deleting entry", line.text);
                        continue;
                    }
                    let entry = EntityEntry::new(key, extend, payload);
                    let printed = entry.to_string();
                    if !list.store.insert_exact(entry, printed) {
                        ctx.warn("Invalid or duplicate entry! Deleting entry", line.text);
                    }
                }
            }
        }

        Ok(list)
    }

    /// Payload of the best-matching entry for `entity`
    ///
    /// An entry for the entity's own type wins. Otherwise the extendable
    /// entry with the most specific ancestor class wins, ties going to the
    /// earlier entry. Tags, namespaces and the default follow.
    pub fn get_values<R, V>(&self, registry: &R, entity: &V) -> Option<&Payload>
    where
        R: EntityRegistry<Class = C>,
        V: EntityView<EntityType = R::Object, Class = C>,
    {
        let entity_type = entity.entity_type();
        let key = registry.key_of(entity_type);
        self.store
            .best_match(
                key.as_ref(),
                |store| match store.lookup(key.as_ref()) {
                    ExactLookup::Miss => Self::extended_match(store, registry, entity.class()),
                    found => found,
                },
                |tag| registry.has_tag(entity_type, tag),
            )
            .map(|matched| matched.payload())
    }

    fn extended_match<'a, R>(
        store: &'a EntryStore<EntityEntry<C>>,
        registry: &R,
        class: &C,
    ) -> ExactLookup<'a, EntityEntry<C>>
    where
        R: EntityRegistry<Class = C>,
    {
        let mut best: Option<(&EntityEntry<C>, &C)> = None;

        for entry in store.exact_entries().filter(|e| e.extend) {
            let Some(ancestor) = entry.class(registry) else {
                continue;
            };
            if !registry.is_subclass(class, ancestor) {
                continue;
            }
            let closer = match best {
                None => true,
                Some((_, current)) => {
                    ancestor != current && registry.is_subclass(ancestor, current)
                }
            };
            if closer {
                best = Some((entry, ancestor));
            }
        }

        match best {
            Some((entry, _)) => ExactLookup::Hit(entry),
            None => ExactLookup::Miss,
        }
    }

    pub fn policy(&self) -> &ValuePolicy {
        &self.policy
    }

    pub fn field_key(&self) -> &str {
        self.ctx.key()
    }

    pub fn is_empty(&self) -> bool {
        self.store.is_empty()
    }

    /// Exact entries in insertion order
    pub fn entries(&self) -> impl Iterator<Item = &EntityEntry<C>> {
        self.store.exact_entries()
    }

    pub fn tags(&self) -> &[TagEntry] {
        self.store.tags()
    }

    pub fn namespaces(&self) -> &[NamespaceEntry] {
        self.store.namespaces()
    }

    /// Lines that represent this list in a config file
    pub fn to_string_list(&self) -> Vec<String> {
        self.store.print_list().to_vec()
    }
}

impl<C> ValueList for EntityList<C> {
    fn policy(&self) -> &ValuePolicy {
        &self.policy
    }

    fn field_key(&self) -> &str {
        self.ctx.key()
    }
}

impl<C, R, V> ValueQuery<R, V> for EntityList<C>
where
    C: Clone + PartialEq,
    R: EntityRegistry<Class = C>,
    V: EntityView<EntityType = R::Object, Class = C>,
{
    fn get_values(&self, registry: &R, query: &V) -> Option<&Payload> {
        EntityList::get_values(self, registry, query)
    }
}

impl<C> PartialEq for EntityList<C> {
    fn eq(&self, other: &Self) -> bool {
        self.store.print_list() == other.store.print_list()
    }
}

impl<C> fmt::Display for EntityList<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&to_literal(self.store.print_list()))
    }
}
