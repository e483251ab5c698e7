//! Tiered entry storage and best-match resolution
//!
//! Priority order: exact > tag > namespace > default. Matching order is fixed
//! by tier; the print list keeps the order entries were accepted in.

use crate::entry::{DefaultEntry, NamespaceEntry, TagEntry, ValueEntry};
use crate::payload::Payload;
use registry_core::{ResourceKey, TagKey};
use std::collections::HashMap;

/// An exact-tier rule
pub trait ExactEntry {
    fn key(&self) -> &ResourceKey;

    fn payload(&self) -> &Payload;
}

impl ExactEntry for ValueEntry {
    fn key(&self) -> &ResourceKey {
        &self.key
    }

    fn payload(&self) -> &Payload {
        &self.payload
    }
}

/// The entry that won resolution
#[derive(Debug)]
pub enum Matched<'a, E> {
    Exact(&'a E),
    Tag(&'a TagEntry),
    Namespace(&'a NamespaceEntry),
    Default(&'a DefaultEntry),
}

impl<'a, E: ExactEntry> Matched<'a, E> {
    pub fn payload(&self) -> &'a Payload {
        match self {
            Matched::Exact(entry) => entry.payload(),
            Matched::Tag(entry) => &entry.payload,
            Matched::Namespace(entry) => &entry.payload,
            Matched::Default(entry) => &entry.payload,
        }
    }
}

/// Outcome of the exact-tier lookup
pub(crate) enum ExactLookup<'a, E> {
    /// An exact entry matched; lower tiers are not consulted
    Hit(&'a E),
    /// An exact entry exists for the key but rejected the query
    Reject,
    /// No exact entry applies
    Miss,
}

/// The four tiers of one list plus its print list
#[derive(Debug, Clone)]
pub struct EntryStore<E> {
    exact: Vec<E>,
    index: HashMap<ResourceKey, usize>,
    tags: Vec<TagEntry>,
    namespaces: Vec<NamespaceEntry>,
    default: Option<DefaultEntry>,
    print_list: Vec<String>,
}

impl<E> Default for EntryStore<E> {
    fn default() -> Self {
        EntryStore {
            exact: Vec::new(),
            index: HashMap::new(),
            tags: Vec::new(),
            namespaces: Vec::new(),
            default: None,
            print_list: Vec::new(),
        }
    }
}

impl<E: ExactEntry> EntryStore<E> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an exact entry unless its key is already present
    pub fn insert_exact(&mut self, entry: E, printed: String) -> bool {
        if self.index.contains_key(entry.key()) {
            return false;
        }
        self.index.insert(entry.key().clone(), self.exact.len());
        self.exact.push(entry);
        self.print_list.push(printed);
        true
    }

    /// Add an exact entry, folding it into an existing one for the same key
    pub fn merge_exact(&mut self, entry: E, printed: String, merge: impl FnOnce(&mut E, E)) {
        self.print_list.push(printed);
        match self.index.get(entry.key()) {
            Some(&i) => merge(&mut self.exact[i], entry),
            None => {
                self.index.insert(entry.key().clone(), self.exact.len());
                self.exact.push(entry);
            }
        }
    }

    /// Add a tag entry unless the tag is already present
    pub fn insert_tag(&mut self, entry: TagEntry) -> bool {
        if self.tags.iter().any(|t| t.tag == entry.tag) {
            return false;
        }
        self.print_list.push(entry.to_string());
        self.tags.push(entry);
        true
    }

    /// Add a namespace entry unless the namespace is already present
    pub fn insert_namespace(&mut self, entry: NamespaceEntry) -> bool {
        if self.namespaces.iter().any(|n| n.namespace == entry.namespace) {
            return false;
        }
        self.print_list.push(entry.to_string());
        self.namespaces.push(entry);
        true
    }

    /// Set the default entry; only the first one is kept
    pub fn set_default(&mut self, entry: DefaultEntry) -> bool {
        if self.default.is_some() {
            return false;
        }
        self.print_list.push(entry.to_string());
        self.default = Some(entry);
        true
    }

    pub fn exact(&self, key: &ResourceKey) -> Option<&E> {
        self.index.get(key).map(|&i| &self.exact[i])
    }

    /// Exact entries in insertion order
    pub fn exact_entries(&self) -> impl Iterator<Item = &E> {
        self.exact.iter()
    }

    pub fn tags(&self) -> &[TagEntry] {
        &self.tags
    }

    pub fn namespaces(&self) -> &[NamespaceEntry] {
        &self.namespaces
    }

    pub fn default_entry(&self) -> Option<&DefaultEntry> {
        self.default.as_ref()
    }

    pub fn is_empty(&self) -> bool {
        self.exact.is_empty()
            && self.tags.is_empty()
            && self.namespaces.is_empty()
            && self.default.is_none()
    }

    pub fn print_list(&self) -> &[String] {
        &self.print_list
    }

    /// Resolve the highest-priority entry for a query
    ///
    /// `key` is the query's registry key, if it has one. `exact` decides the
    /// exact tier; `tagged` answers tag membership for the query.
    pub(crate) fn best_match<'a>(
        &'a self,
        key: Option<&ResourceKey>,
        exact: impl FnOnce(&'a Self) -> ExactLookup<'a, E>,
        mut tagged: impl FnMut(&TagKey) -> bool,
    ) -> Option<Matched<'a, E>> {
        match exact(self) {
            ExactLookup::Hit(entry) => return Some(Matched::Exact(entry)),
            ExactLookup::Reject => return None,
            ExactLookup::Miss => {}
        }

        if let Some(entry) = self.tags.iter().find(|t| tagged(&t.tag)) {
            return Some(Matched::Tag(entry));
        }

        if let Some(key) = key {
            if let Some(entry) = self.namespaces.iter().find(|n| n.contains(key)) {
                return Some(Matched::Namespace(entry));
            }
        }

        self.default.as_ref().map(Matched::Default)
    }

    /// Plain key lookup for the exact tier
    pub(crate) fn lookup(&self, key: Option<&ResourceKey>) -> ExactLookup<'_, E> {
        match key.and_then(|k| self.exact(k)) {
            Some(entry) => ExactLookup::Hit(entry),
            None => ExactLookup::Miss,
        }
    }
}

/// Render a string list as a TOML array literal
pub(crate) fn to_literal(list: &[String]) -> String {
    toml::Value::Array(list.iter().cloned().map(toml::Value::String).collect()).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(s: &str) -> ResourceKey {
        ResourceKey::parse(s).unwrap()
    }

    fn tag(s: &str) -> TagKey {
        TagKey::parse(s).unwrap()
    }

    fn store() -> EntryStore<ValueEntry> {
        let mut store = EntryStore::new();
        let entry = ValueEntry::new(key("modx:ruby"), [1.0]);
        let printed = entry.to_string();
        store.insert_exact(entry, printed);
        store.insert_tag(TagEntry::new(tag("minecraft:gems"), [2.0]));
        store.insert_namespace(NamespaceEntry::new("modx", [3.0]));
        store.set_default(DefaultEntry::new([4.0]));
        store
    }

    fn resolve<'a>(
        store: &'a EntryStore<ValueEntry>,
        query: &ResourceKey,
        tags: &[TagKey],
    ) -> Option<&'a Payload> {
        store
            .best_match(Some(query), |s| s.lookup(Some(query)), |t| tags.contains(t))
            .map(|m| m.payload())
    }

    #[test]
    fn test_priority_order() {
        let store = store();
        let gems = [tag("minecraft:gems")];

        // In all four tiers: exact wins
        assert_eq!(resolve(&store, &key("modx:ruby"), &gems).unwrap().values(), &[1.0]);
        // Tag beats namespace
        assert_eq!(resolve(&store, &key("modx:sapphire"), &gems).unwrap().values(), &[2.0]);
        // Namespace beats default
        assert_eq!(resolve(&store, &key("modx:sapphire"), &[]).unwrap().values(), &[3.0]);
        // Default catches the rest
        assert_eq!(resolve(&store, &key("minecraft:dirt"), &[]).unwrap().values(), &[4.0]);
    }

    #[test]
    fn test_no_match_without_default() {
        let mut store: EntryStore<ValueEntry> = EntryStore::new();
        store.insert_namespace(NamespaceEntry::new("modx", Payload::empty()));
        assert!(resolve(&store, &key("mody:foo"), &[]).is_none());
        assert!(resolve(&store, &key("modx:foo"), &[]).is_some());
    }

    #[test]
    fn test_reject_stops_resolution() {
        let store = store();
        let query = key("modx:ruby");
        let matched = store.best_match(Some(&query), |_| ExactLookup::Reject, |_| true);
        assert!(matched.is_none());
    }

    #[test]
    fn test_tag_dedup() {
        let mut store: EntryStore<ValueEntry> = EntryStore::new();
        assert!(store.insert_tag(TagEntry::new(tag("minecraft:logs"), [1.0])));
        assert!(!store.insert_tag(TagEntry::new(tag("minecraft:logs"), [2.0])));
        assert_eq!(store.tags().len(), 1);
        assert_eq!(store.tags()[0].payload.values(), &[1.0]);
        assert_eq!(store.print_list(), &["#minecraft:logs 1.0".to_string()]);
    }

    #[test]
    fn test_exact_first_write_wins() {
        let mut store: EntryStore<ValueEntry> = EntryStore::new();
        assert!(store.insert_exact(ValueEntry::new(key("a:b"), [1.0]), "a:b 1.0".into()));
        assert!(!store.insert_exact(ValueEntry::new(key("a:b"), [2.0]), "a:b 2.0".into()));
        assert_eq!(store.exact(&key("a:b")).unwrap().payload.values(), &[1.0]);
        assert_eq!(store.print_list().len(), 1);
    }

    #[test]
    fn test_merge_exact_keeps_every_line() {
        let mut store: EntryStore<ValueEntry> = EntryStore::new();
        let merge = |existing: &mut ValueEntry, other: ValueEntry| {
            existing.payload = other.payload;
        };
        store.merge_exact(ValueEntry::new(key("a:b"), [1.0]), "first".into(), merge);
        store.merge_exact(ValueEntry::new(key("a:b"), [2.0]), "second".into(), merge);

        assert_eq!(store.exact_entries().count(), 1);
        assert_eq!(store.exact(&key("a:b")).unwrap().payload.values(), &[2.0]);
        assert_eq!(store.print_list(), &["first".to_string(), "second".to_string()]);
    }

    #[test]
    fn test_empty() {
        let mut store: EntryStore<ValueEntry> = EntryStore::new();
        assert!(store.is_empty());
        store.set_default(DefaultEntry::new([1.0]));
        assert!(!store.is_empty());
        assert!(!store.set_default(DefaultEntry::new([2.0])));
    }

    #[test]
    fn test_to_literal() {
        let list = vec!["minecraft:stone".to_string(), "#minecraft:logs".to_string()];
        assert_eq!(to_literal(&list), r##"["minecraft:stone", "#minecraft:logs"]"##);
    }
}
