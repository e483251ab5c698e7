//! Block lists: exact block entries narrowed by state properties
//!
//! Line format: `namespace:block [property=value ...]`, also accepted as
//! `namespace:block[property=value,...]`. A block with no properties listed
//! matches every state of that block.

use crate::entry::{Line, LineKind, NamespaceEntry, TagEntry};
use crate::payload::{Payload, ValuePolicy};
use crate::report::FieldContext;
use crate::store::{to_literal, EntryStore, ExactEntry, ExactLookup};
use crate::ListError;
use registry_core::{BlockStateView, Registry, ResourceKey, TagKey};
use std::fmt;

/// Property assignments a block state must all satisfy
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StateClause {
    properties: Vec<(String, String)>,
}

impl StateClause {
    pub fn new(properties: &[(&str, &str)]) -> Self {
        StateClause {
            properties: properties
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        }
    }

    pub fn matches<S: BlockStateView>(&self, state: &S) -> bool {
        self.properties
            .iter()
            .all(|(name, value)| state.property(name) == Some(value.as_str()))
    }
}

impl fmt::Display for StateClause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, (name, value)) in self.properties.iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            write!(f, "{}={}", name, value)?;
        }
        Ok(())
    }
}

/// One block, matching any state or any of a set of clauses
#[derive(Debug, Clone, PartialEq)]
pub struct BlockEntry {
    key: ResourceKey,
    /// `None` accepts every state
    states: Option<Vec<StateClause>>,
    payload: Payload,
}

impl BlockEntry {
    /// Entry matching every state of the block
    pub fn any_state(key: ResourceKey) -> Self {
        BlockEntry {
            key,
            states: None,
            payload: Payload::empty(),
        }
    }

    /// Entry matching states that satisfy `clause`
    pub fn with_state(key: ResourceKey, clause: StateClause) -> Self {
        BlockEntry {
            key,
            states: Some(vec![clause]),
            payload: Payload::empty(),
        }
    }

    pub fn key(&self) -> &ResourceKey {
        &self.key
    }

    pub fn matches<S: BlockStateView>(&self, state: &S) -> bool {
        match &self.states {
            None => true,
            Some(clauses) => clauses.iter().any(|c| c.matches(state)),
        }
    }

    /// Fold another entry for the same block into this one
    ///
    /// An entry without clauses widens this one to every state; otherwise the
    /// other entry's clauses become additional alternatives.
    fn merge_from(&mut self, other: BlockEntry) {
        let Some(clauses) = &mut self.states else {
            return;
        };
        match other.states {
            None => self.states = None,
            Some(others) => {
                for clause in others {
                    if !clauses.contains(&clause) {
                        clauses.push(clause);
                    }
                }
            }
        }
    }

    /// Parse `key prop=value ...` or `key[prop=value,...]`
    fn parse(ctx: &FieldContext, line: &Line<'_>) -> Option<Self> {
        let (key_text, bracket) = match line.identity.split_once('[') {
            Some((key, rest)) => match rest.strip_suffix(']') {
                Some(inner) => (key, Some(inner)),
                None => {
                    ctx.warn("Unclosed block state brackets! Ignoring block state", line.text);
                    (key, None)
                }
            },
            None => (line.identity, None),
        };
        let key = line.parse_key(ctx, key_text)?;

        let mut tokens: Vec<&str> = bracket
            .map(|inner| inner.split(',').map(str::trim).filter(|t| !t.is_empty()).collect())
            .unwrap_or_default();
        tokens.extend(line.args());

        let mut properties = Vec::new();
        for token in tokens {
            match token.split_once('=') {
                Some((name, value)) if !name.is_empty() && !value.is_empty() => {
                    properties.push((name.to_string(), value.to_string()));
                }
                _ => ctx.warn(
                    &format!("Invalid block property '{}'! Ignoring property", token),
                    line.text,
                ),
            }
        }

        Some(if properties.is_empty() {
            BlockEntry::any_state(key)
        } else {
            BlockEntry {
                key,
                states: Some(vec![StateClause { properties }]),
                payload: Payload::empty(),
            }
        })
    }
}

impl ExactEntry for BlockEntry {
    fn key(&self) -> &ResourceKey {
        &self.key
    }

    fn payload(&self) -> &Payload {
        &self.payload
    }
}

/// Renders the canonical line form, `key prop=value ...`
impl fmt::Display for BlockEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.key)?;
        if let Some(clauses) = &self.states {
            for clause in clauses {
                write!(f, " {}", clause)?;
            }
        }
        Ok(())
    }
}

/// A list of block entries used to match specific block states
#[derive(Debug, Clone, Default)]
pub struct BlockList {
    store: EntryStore<BlockEntry>,
}

impl BlockList {
    /// Create a list from default entries
    pub fn new(entries: impl IntoIterator<Item = BlockEntry>) -> Self {
        let mut list = BlockList::default();
        for entry in entries {
            list.merge(entry);
        }
        list
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

    /// Create a list from config lines, validating blocks against `registry`
    pub fn parse<R: Registry>(
        ctx: &FieldContext,
        registry: &R,
        lines: &[impl AsRef<str>],
    ) -> Result<Self, ListError> {
        let policy = ValuePolicy::default().no_values();
        let mut list = BlockList::default();

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
                // Block lists carry no default; the token is read as a block key
                LineKind::Default | LineKind::Exact(_) => {
                    let Some(entry) = BlockEntry::parse(ctx, &line) else {
                        continue;
                    };
                    if !registry.contains_key(entry.key()) {
                        ctx.warn("Invalid entry! Deleting entry", line.text);
                        continue;
                    }
                    list.merge(entry);
                }
            }
        }

        Ok(list)
    }

    fn merge(&mut self, entry: BlockEntry) {
        let printed = entry.to_string();
        self.store.merge_exact(entry, printed, BlockEntry::merge_from);
    }

    /// Whether the block state is matched by this list
    pub fn matches<R, S>(&self, registry: &R, state: &S) -> bool
    where
        R: Registry,
        S: BlockStateView<Block = R::Object>,
    {
        let key = registry.key_of(state.block());
        self.store
            .best_match(
                key.as_ref(),
                |store| match key.as_ref().and_then(|k| store.exact(k)) {
                    Some(entry) if entry.matches(state) => ExactLookup::Hit(entry),
                    Some(_) => ExactLookup::Reject,
                    None => ExactLookup::Miss,
                },
                |tag| registry.has_tag(state.block(), tag),
            )
            .is_some()
    }

    pub fn is_empty(&self) -> bool {
        self.store.is_empty()
    }

    pub fn entries(&self) -> impl Iterator<Item = &BlockEntry> {
        self.store.exact_entries()
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

impl PartialEq for BlockList {
    fn eq(&self, other: &Self) -> bool {
        self.store.print_list() == other.store.print_list()
    }
}

impl fmt::Display for BlockList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&to_literal(self.store.print_list()))
    }
}
