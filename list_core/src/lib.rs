//! list_core - Tiered entry lists for registry-backed config fields
//!
//! This library provides:
//! - BlockList: block matching with optional state qualifiers
//! - RegistryEntryList / LazyRegistryEntryList: identity lists over any registry
//! - RegistryEntryValueList / EntityList: lists that attach values to matches
//! - Combined: whitelist narrowed by a blacklist
//! - ListField: loading lists from raw TOML values and writing them back
//!
//! Every list resolves a query in the same order: exact entry, then tag,
//! then namespace, then default.
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use list_core::{FieldContext, RegistryEntryValueList, ValuePolicy, ValueQuery};
//!
//! let ctx = FieldContext::traced("ore_weights");
//! let list = RegistryEntryValueList::parse(
//!     &ctx,
//!     ValuePolicy::default().single_value(),
//!     &["default 5", "minecraft:diamond 10"],
//! )?;
//! let weight = list.get_value(&registry, &diamond);
//! ```

mod block;
mod combined;
mod entity;
mod entry;
mod field;
mod lazy;
mod payload;
mod registry_list;
mod report;
mod store;
mod value_list;

// Lists
pub use block::{BlockEntry, BlockList, StateClause};
pub use entity::{EntityEntry, EntityList, SPECIFIC_PREFIX};
pub use lazy::{LazyRegistryEntryList, LazyState};
pub use registry_list::RegistryEntryList;
pub use value_list::RegistryEntryValueList;

// Queries and composition
pub use combined::{Combined, ValueList, ValueQuery};
pub use store::{EntryStore, ExactEntry, Matched};

// Entries and values
pub use entry::{DefaultEntry, NamespaceEntry, TagEntry, ValueEntry, KEY_DEFAULT};
pub use payload::{Arity, Payload, ValuePolicy};

// Fields and diagnostics
pub use field::{parse_string_list, value_list_description, ListField, StringList};
pub use report::{CollectingReporter, FieldContext, Report, Reporter, TracingReporter};

use thiserror::Error;

/// Error that aborts parsing a list
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ListError {
    #[error("Malformed tag in '{field}': expected \"#namespace:path\" but got \"{line}\"")]
    MalformedTag { field: String, line: String },
    #[error("Blacklist '{0}' must not allow values")]
    BlacklistHasValues(String),
}
