use serde::Deserialize;

/// TOML configuration for a registry snapshot file
#[derive(Debug, Deserialize)]
pub struct RegistryFileConfig {
    pub registry: RegistryConfig,
    #[serde(default)]
    pub entries: Vec<EntryConfig>,
    #[serde(default)]
    pub classes: Vec<ClassConfig>,
}

/// Configuration for the registry itself
#[derive(Debug, Deserialize)]
pub struct RegistryConfig {
    pub id: String,
}

/// One registered object
#[derive(Debug, Deserialize)]
pub struct EntryConfig {
    pub key: String,
    #[serde(default)]
    pub tags: Vec<String>,
    // Entity registries only
    #[serde(default)]
    pub class: Option<String>,
}

/// One edge of the runtime class hierarchy
#[derive(Debug, Deserialize)]
pub struct ClassConfig {
    pub name: String,
    pub parent: String,
}
