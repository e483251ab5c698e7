//! Resource keys and tag keys
//!
//! A resource key is a `namespace:path` pair. Text without a namespace
//! resolves to the default `minecraft` namespace, so `stone` and
//! `minecraft:stone` name the same key.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Namespace used when key text omits one
pub const DEFAULT_NAMESPACE: &str = "minecraft";

/// Error parsing a resource key
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum KeyError {
    #[error("Empty resource key")]
    Empty,
    #[error("Invalid character in namespace of '{0}'")]
    InvalidNamespace(String),
    #[error("Invalid character in path of '{0}'")]
    InvalidPath(String),
}

/// A registry key of the form `namespace:path`
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ResourceKey {
    namespace: String,
    path: String,
}

impl ResourceKey {
    /// Build a key from its parts, validating both
    pub fn new(namespace: &str, path: &str) -> Result<Self, KeyError> {
        let text = format!("{}:{}", namespace, path);
        if !is_valid_namespace(namespace) {
            return Err(KeyError::InvalidNamespace(text));
        }
        if path.is_empty() || !is_valid_path(path) {
            return Err(KeyError::InvalidPath(text));
        }
        Ok(ResourceKey {
            namespace: namespace.to_string(),
            path: path.to_string(),
        })
    }

    /// Parse `namespace:path` or bare `path` text
    pub fn parse(text: &str) -> Result<Self, KeyError> {
        let text = text.trim();
        if text.is_empty() {
            return Err(KeyError::Empty);
        }
        match text.split_once(':') {
            Some(("", path)) => Self::new(DEFAULT_NAMESPACE, path),
            Some((namespace, path)) => Self::new(namespace, path),
            None => Self::new(DEFAULT_NAMESPACE, text),
        }
    }

    /// Parse, discarding the reason on failure
    pub fn try_parse(text: &str) -> Option<Self> {
        Self::parse(text).ok()
    }

    /// Whether `namespace` is usable as a key namespace
    pub fn is_valid_namespace(namespace: &str) -> bool {
        !namespace.is_empty() && is_valid_namespace(namespace)
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    pub fn path(&self) -> &str {
        &self.path
    }
}

impl fmt::Display for ResourceKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.namespace, self.path)
    }
}

impl FromStr for ResourceKey {
    type Err = KeyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for ResourceKey {
    type Error = KeyError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<ResourceKey> for String {
    fn from(key: ResourceKey) -> Self {
        key.to_string()
    }
}

/// A named collection of registry objects
///
/// Tag identity is the location alone; membership is answered by the
/// registry, never by the key itself.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TagKey {
    location: ResourceKey,
}

impl TagKey {
    pub fn new(location: ResourceKey) -> Self {
        TagKey { location }
    }

    /// Parse tag text, with or without the leading `#`
    pub fn parse(text: &str) -> Result<Self, KeyError> {
        let text = text.trim();
        let text = text.strip_prefix('#').unwrap_or(text);
        ResourceKey::parse(text).map(TagKey::new)
    }

    pub fn location(&self) -> &ResourceKey {
        &self.location
    }
}

/// Renders as `#namespace:path`, the form used in config lines
impl fmt::Display for TagKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.location)
    }
}

fn is_valid_namespace(namespace: &str) -> bool {
    namespace
        .chars()
        .all(|c| matches!(c, 'a'..='z' | '0'..='9' | '_' | '-' | '.'))
}

fn is_valid_path(path: &str) -> bool {
    path.chars()
        .all(|c| matches!(c, 'a'..='z' | '0'..='9' | '_' | '-' | '.' | '/'))
}
