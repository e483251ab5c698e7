//! registry_core - Registry and tag capabilities for config entry lists
//!
//! This library provides:
//! - ResourceKey / TagKey: `namespace:path` identifiers
//! - Registry / EntityRegistry: the lookups entry lists are allowed to make
//! - BlockStateView / EntityView: what a list is queried with
//! - MemoryRegistry + RegistrySet: in-memory registries loaded from TOML

mod config;
mod key;
mod loader;
mod memory;
mod registry;
mod view;

pub use key::{KeyError, ResourceKey, TagKey, DEFAULT_NAMESPACE};
pub use loader::RegistrySet;
pub use memory::{MemoryRegistry, RegistryObject};
pub use registry::{EntityRegistry, Registry};
pub use view::{BlockState, BlockStateView, Entity, EntityView};

use std::path::PathBuf;
use thiserror::Error;

/// Error loading registry snapshot files
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("IO error reading '{path:?}': {error}")]
    Io {
        error: std::io::Error,
        path: Option<PathBuf>,
    },
    #[error("Parse error in '{path}': {error}")]
    Parse {
        error: toml::de::Error,
        path: PathBuf,
    },
    #[error("Validation error in '{path}': {message}")]
    Validation { message: String, path: PathBuf },
    #[error("Registry '{id}' defined more than once (again in '{path:?}')")]
    DuplicateRegistry { id: String, path: Option<PathBuf> },
}
