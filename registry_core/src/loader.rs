//! Registry snapshots: one TOML file per registry, anywhere under a directory

use crate::config::RegistryFileConfig;
use crate::key::{ResourceKey, TagKey};
use crate::memory::MemoryRegistry;
use crate::LoadError;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Registries keyed by their ID
#[derive(Debug, Default)]
pub struct RegistrySet {
    registries: HashMap<String, MemoryRegistry>,
}

impl RegistrySet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Read every `*.toml` snapshot under `dir`
    ///
    /// Files are read in path order, so a duplicate registry ID is always
    /// reported against the same file. A missing directory yields an empty set.
    pub fn load(dir: &Path) -> Result<Self, LoadError> {
        let mut paths = Vec::new();
        collect_snapshots(dir, &mut paths)?;
        paths.sort();

        let mut set = Self::new();
        for path in paths {
            let registry = read_snapshot(&path)?;
            set.insert_from(registry, Some(path))?;
        }
        Ok(set)
    }

    /// Add a registry, refusing to replace one with the same ID
    pub fn insert(&mut self, registry: MemoryRegistry) -> Result<(), LoadError> {
        self.insert_from(registry, None)
    }

    fn insert_from(&mut self, registry: MemoryRegistry, path: Option<PathBuf>) -> Result<(), LoadError> {
        if self.registries.contains_key(registry.id()) {
            return Err(LoadError::DuplicateRegistry {
                id: registry.id().to_string(),
                path,
            });
        }
        self.registries.insert(registry.id().to_string(), registry);
        Ok(())
    }

    pub fn get(&self, id: &str) -> Option<&MemoryRegistry> {
        self.registries.get(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.registries.contains_key(id)
    }

    pub fn registry_ids(&self) -> impl Iterator<Item = &str> {
        self.registries.keys().map(|s| s.as_str())
    }
}

fn io_error(path: &Path) -> impl FnOnce(std::io::Error) -> LoadError + '_ {
    move |error| LoadError::Io {
        error,
        path: Some(path.to_path_buf()),
    }
}

/// Gather snapshot paths below `dir`, descending into subdirectories
fn collect_snapshots(dir: &Path, out: &mut Vec<PathBuf>) -> Result<(), LoadError> {
    if !dir.exists() {
        return Ok(());
    }
    for entry in std::fs::read_dir(dir).map_err(io_error(dir))? {
        let path = entry.map_err(io_error(dir))?.path();
        if path.is_dir() {
            collect_snapshots(&path, out)?;
        } else if path.extension().is_some_and(|ext| ext == "toml") {
            out.push(path);
        }
    }
    Ok(())
}

/// Parse one snapshot file into a registry
fn read_snapshot(path: &Path) -> Result<MemoryRegistry, LoadError> {
    let content = std::fs::read_to_string(path).map_err(io_error(path))?;
    let config: RegistryFileConfig = toml::from_str(&content).map_err(|error| LoadError::Parse {
        error,
        path: path.to_path_buf(),
    })?;

    registry_from_config(config).map_err(|message| LoadError::Validation {
        message,
        path: path.to_path_buf(),
    })
}

/// Build a registry from a parsed snapshot
fn registry_from_config(config: RegistryFileConfig) -> Result<MemoryRegistry, String> {
    let mut registry = MemoryRegistry::new(&config.registry.id);

    for entry in config.entries {
        let key = ResourceKey::parse(&entry.key).map_err(|e| e.to_string())?;
        if registry.get(&key).is_some() {
            return Err(format!("Duplicate entry '{}'", key));
        }
        registry.register(key.clone());

        for tag in &entry.tags {
            let tag = TagKey::parse(tag).map_err(|e| e.to_string())?;
            registry.tag(&key, tag);
        }
        if let Some(class) = &entry.class {
            registry.set_class(&key, class);
        }
    }

    for class in config.classes {
        if class.name == class.parent {
            return Err(format!("Class '{}' cannot be its own parent", class.name));
        }
        registry.set_parent(&class.name, &class.parent);
    }

    Ok(registry)
}
