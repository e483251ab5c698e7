//! Registry lists that attach numeric values to their entries

use crate::combined::{ValueList, ValueQuery};
use crate::entry::{DefaultEntry, Line, LineKind, NamespaceEntry, TagEntry, ValueEntry};
use crate::payload::{Payload, ValuePolicy};
use crate::report::FieldContext;
use crate::store::{to_literal, EntryStore};
use crate::ListError;
use registry_core::{Registry, ResourceKey, TagKey};
use std::fmt;
use std::sync::OnceLock;

/// A value list over an arbitrary registry
///
/// Exact keys are not checked while parsing. They are validated against the
/// registry once, on the first query; keys the registry does not know are
/// reported then and simply never match.
#[derive(Debug, Clone)]
pub struct RegistryEntryValueList {
    ctx: FieldContext,
    policy: ValuePolicy,
    store: EntryStore<ValueEntry>,
    validated: OnceLock<()>,
}

impl RegistryEntryValueList {
    /// Empty list shaped by `policy`, for building defaults
    pub fn new(policy: ValuePolicy) -> Self {
        RegistryEntryValueList {
            ctx: FieldContext::traced("<default>"),
            policy,
            store: EntryStore::new(),
            validated: OnceLock::new(),
        }
    }

    /// Builder: add an exact entry; a key already present is skipped
    pub fn with_entry(mut self, key: ResourceKey, values: impl Into<Payload>) -> Self {
        let entry = ValueEntry::new(key, values);
        let printed = entry.to_string();
        self.store.insert_exact(entry, printed);
        self
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

    /// Create a list from config lines
    pub fn parse(
        ctx: &FieldContext,
        policy: ValuePolicy,
        lines: &[impl AsRef<str>],
    ) -> Result<Self, ListError> {
        let mut list = RegistryEntryValueList {
            ctx: ctx.clone(),
            ..Self::new(policy)
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
                    // Later default lines are dropped without a warning
                    let payload = line.values(ctx, &policy);
                    list.store.set_default(DefaultEntry::new(payload));
                }
                LineKind::Exact(token) => {
                    let Some(key) = line.parse_key(ctx, token) else {
                        continue;
                    };
                    let entry = ValueEntry::new(key, line.values(ctx, &policy));
                    let printed = entry.to_string();
                    if !list.store.insert_exact(entry, printed) {
                        ctx.warn("Invalid or duplicate entry! Deleting entry", line.text);
                    }
                }
            }
        }

        Ok(list)
    }

    /// Report exact keys the registry does not know, once per list
    pub fn validate<R: Registry>(&self, registry: &R) {
        self.validated.get_or_init(|| {
            for entry in self.store.exact_entries() {
                if !registry.contains_key(&entry.key) {
                    self.ctx
                        .warn("Invalid entry! Entry will never match", &entry.to_string());
                }
            }
        });
    }

    /// Payload of the best-matching entry for `object`
    pub fn get_values<R: Registry>(&self, registry: &R, object: &R::Object) -> Option<&Payload> {
        self.validate(registry);
        let key = registry.key_of(object);
        self.store
            .best_match(
                key.as_ref(),
                |store| store.lookup(key.as_ref()),
                |tag| registry.has_tag(object, tag),
            )
            .map(|matched| matched.payload())
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
    pub fn entries(&self) -> impl Iterator<Item = &ValueEntry> {
        self.store.exact_entries()
    }

    pub fn tags(&self) -> &[TagEntry] {
        self.store.tags()
    }

    pub fn namespaces(&self) -> &[NamespaceEntry] {
        self.store.namespaces()
    }

    pub fn default_entry(&self) -> Option<&DefaultEntry> {
        self.store.default_entry()
    }

    /// Lines that represent this list in a config file
    pub fn to_string_list(&self) -> Vec<String> {
        self.store.print_list().to_vec()
    }
}

impl ValueList for RegistryEntryValueList {
    fn policy(&self) -> &ValuePolicy {
        &self.policy
    }

    fn field_key(&self) -> &str {
        self.ctx.key()
    }
}

impl<R: Registry> ValueQuery<R, R::Object> for RegistryEntryValueList {
    fn get_values(&self, registry: &R, query: &R::Object) -> Option<&Payload> {
        RegistryEntryValueList::get_values(self, registry, query)
    }
}

impl PartialEq for RegistryEntryValueList {
    fn eq(&self, other: &Self) -> bool {
        self.store.print_list() == other.store.print_list()
    }
}

impl fmt::Display for RegistryEntryValueList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&to_literal(self.store.print_list()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::CollectingReporter;
    use proptest::prelude::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;
    use registry_core::{MemoryRegistry, RegistryObject};
    use std::sync::Arc;

    fn key(s: &str) -> ResourceKey {
        ResourceKey::parse(s).unwrap()
    }

    fn ctx() -> (FieldContext, Arc<CollectingReporter>) {
        let reporter = Arc::new(CollectingReporter::new());
        (FieldContext::new("ore_weights", reporter.clone()), reporter)
    }

    fn items() -> MemoryRegistry {
        let mut registry = MemoryRegistry::new("minecraft:item");
        for k in ["minecraft:diamond", "minecraft:emerald", "minecraft:coal", "modx:ruby"] {
            registry.register(key(k));
        }
        registry.tag(&key("minecraft:emerald"), TagKey::parse("minecraft:gems").unwrap());
        registry.tag(&key("modx:ruby"), TagKey::parse("minecraft:gems").unwrap());
        registry
    }

    fn object(registry: &MemoryRegistry, k: &str) -> RegistryObject {
        registry.get(&key(k)).unwrap().clone()
    }

    #[test]
    fn test_default_scenario() {
        let registry = items();
        let (ctx, reporter) = ctx();
        let list = RegistryEntryValueList::parse(
            &ctx,
            ValuePolicy::default(),
            &["default 5", "minecraft:diamond 10"],
        )
        .unwrap();

        assert_eq!(list.get_value(&registry, &object(&registry, "minecraft:diamond")), 10.0);
        assert_eq!(list.get_value(&registry, &object(&registry, "minecraft:emerald")), 5.0);
        assert!(reporter.is_empty());
    }

    #[test]
    fn test_priority_exact_over_tag_over_namespace() {
        let registry = items();
        let (ctx, _) = ctx();
        let list = RegistryEntryValueList::parse(
            &ctx,
            ValuePolicy::default().single_value(),
            &["modx:* 3", "#minecraft:gems 2", "modx:ruby 1"],
        )
        .unwrap();

        let ruby = object(&registry, "modx:ruby");
        let emerald = object(&registry, "minecraft:emerald");
        let coal = object(&registry, "minecraft:coal");

        assert_eq!(list.get_values(&registry, &ruby).unwrap().values(), &[1.0]);
        assert_eq!(list.get_values(&registry, &emerald).unwrap().values(), &[2.0]);
        assert!(list.get_values(&registry, &coal).is_none());
        assert!(!list.contains(&registry, &coal));
        assert_eq!(list.get_value(&registry, &coal), 0.0);
    }

    #[test]
    fn test_arity_and_range_corrections() {
        let (ctx, reporter) = ctx();
        let policy = ValuePolicy::default().multi_value(2).range_0_to_1();
        let list = RegistryEntryValueList::parse(
            &ctx,
            policy,
            &["minecraft:diamond 0.5", "minecraft:coal 1.7 0.2 0.3"],
        )
        .unwrap();

        let entries: Vec<_> = list.entries().collect();
        assert_eq!(entries[0].payload.values(), &[0.5, 0.0]);
        assert_eq!(entries[1].payload.values(), &[1.0, 0.2]);
        // Missing value, extra value, clamp
        assert_eq!(reporter.len(), 3);
        assert_eq!(
            list.to_string_list(),
            vec!["minecraft:diamond 0.5 0.0".to_string(), "minecraft:coal 1.0 0.2".to_string()]
        );
    }

    #[test]
    fn test_duplicates() {
        let (ctx, reporter) = ctx();
        let list = RegistryEntryValueList::parse(
            &ctx,
            ValuePolicy::default(),
            &[
                "minecraft:diamond 1",
                "minecraft:diamond 2",
                "#minecraft:gems 1",
                "#minecraft:gems 2",
                "modx:* 1",
                "modx:* 2",
                "default 1",
                "default 2",
            ],
        )
        .unwrap();

        // The second default is dropped silently
        assert_eq!(reporter.len(), 3);
        assert_eq!(list.tags().len(), 1);
        assert_eq!(list.namespaces().len(), 1);
        assert_eq!(list.default_entry().unwrap().payload.values(), &[1.0]);
        assert_eq!(list.entries().next().unwrap().payload.values(), &[1.0]);
    }

    #[test]
    fn test_unknown_keys_reported_once() {
        let registry = items();
        let (ctx, reporter) = ctx();
        let list =
            RegistryEntryValueList::parse(&ctx, ValuePolicy::default(), &["modx:gone 4", "minecraft:coal 1"])
                .unwrap();
        assert!(reporter.is_empty());

        let coal = object(&registry, "minecraft:coal");
        assert!(list.contains(&registry, &coal));
        assert!(list.contains(&registry, &coal));
        assert_eq!(reporter.len(), 1);
        assert_eq!(reporter.reports()[0].line, "modx:gone 4.0");
    }

    #[test]
    fn test_builders() {
        let registry = items();
        let list = RegistryEntryValueList::new(ValuePolicy::default().single_value())
            .with_entry(key("minecraft:diamond"), [4.0])
            .with_tag(TagKey::parse("minecraft:gems").unwrap(), [2.0])
            .with_namespace("modx", [3.0])
            .with_default([1.0]);

        assert_eq!(list.get_value(&registry, &object(&registry, "minecraft:diamond")), 4.0);
        assert_eq!(list.get_value(&registry, &object(&registry, "modx:ruby")), 2.0);
        assert_eq!(list.get_value(&registry, &object(&registry, "minecraft:coal")), 1.0);
        assert_eq!(
            list.to_string(),
            r##"["minecraft:diamond 4.0", "#minecraft:gems 2.0", "modx:* 3.0", "default 1.0"]"##
        );
        assert_eq!(list.field_key(), "<default>");
    }

    #[test]
    fn test_roll_chance_draws_once() {
        let registry = items();
        let (ctx, _) = ctx();
        let list = RegistryEntryValueList::parse(
            &ctx,
            ValuePolicy::default().single_percent(),
            &["minecraft:diamond 1", "minecraft:coal 0"],
        )
        .unwrap();
        let diamond = object(&registry, "minecraft:diamond");
        let coal = object(&registry, "minecraft:coal");
        let emerald = object(&registry, "minecraft:emerald");

        let mut rng = ChaCha8Rng::seed_from_u64(7);
        for _ in 0..50 {
            assert!(list.roll_chance(&registry, &diamond, &mut rng));
            assert!(!list.roll_chance(&registry, &coal, &mut rng));
            assert!(!list.roll_chance(&registry, &emerald, &mut rng));
        }

        // Every roll consumes exactly one sample, matched or not
        let mut a = ChaCha8Rng::seed_from_u64(11);
        let mut b = ChaCha8Rng::seed_from_u64(11);
        list.roll_chance(&registry, &emerald, &mut a);
        let _: f64 = rand::Rng::gen(&mut b);
        assert_eq!(rand::Rng::gen::<u64>(&mut a), rand::Rng::gen::<u64>(&mut b));
    }

    #[test]
    fn test_equality_by_string_list() {
        let (ctx, _) = ctx();
        let parsed =
            RegistryEntryValueList::parse(&ctx, ValuePolicy::default(), &["default 5", "diamond 10"]).unwrap();
        let built = RegistryEntryValueList::new(ValuePolicy::default())
            .with_default([5.0])
            .with_entry(key("minecraft:diamond"), [10.0]);

        assert_eq!(parsed, built);
        assert_eq!(
            parsed.to_string_list(),
            vec!["default 5.0".to_string(), "minecraft:diamond 10.0".to_string()]
        );
    }

    fn line_strategy() -> impl Strategy<Value = String> {
        let identity = prop_oneof![
            "[a-z]{1,6}:[a-z_]{1,8}",
            "#[a-z]{1,6}:[a-z_/]{1,8}",
            "[a-z]{1,6}:\\*",
            Just("default".to_string()),
        ];
        let values = prop::collection::vec(-1000i32..1000, 1..4);
        (identity, values).prop_map(|(identity, values)| {
            let values: Vec<String> = values.iter().map(|v| format!("{}", *v as f64 / 4.0)).collect();
            format!("{} {}", identity, values.join(" "))
        })
    }

    proptest! {
        #[test]
        fn test_round_trip(lines in prop::collection::vec(line_strategy(), 0..12)) {
            let (ctx, _) = ctx();
            let first = RegistryEntryValueList::parse(&ctx, ValuePolicy::default(), &lines).unwrap();
            let second =
                RegistryEntryValueList::parse(&ctx, ValuePolicy::default(), &first.to_string_list()).unwrap();

            prop_assert_eq!(first.to_string_list(), second.to_string_list());
            prop_assert_eq!(first, second);
        }
    }
}
