//! Single matching rules and the line grammar that produces them
//!
//! ```text
//! #namespace:path v0 v1 ...     tag entry
//! namespace:* v0 v1 ...         namespace entry
//! default v0 v1 ...             default entry (value lists)
//! namespace:path v0 v1 ...      exact entry
//! ```

use crate::payload::{Payload, ValuePolicy};
use crate::report::FieldContext;
use crate::ListError;
use registry_core::{ResourceKey, TagKey};
use std::fmt;

/// Identity token that marks a default entry
pub const KEY_DEFAULT: &str = "default";

/// A config line split into its identity token and value tokens
#[derive(Debug, Clone, Copy)]
pub(crate) struct Line<'a> {
    pub text: &'a str,
    pub identity: &'a str,
    args: &'a str,
}

impl<'a> Line<'a> {
    pub fn split(text: &'a str) -> Self {
        let trimmed = text.trim();
        // A bracketed block state may contain spaces; it ends at its ']'
        let end = match trimmed.find('[') {
            Some(open) if trimmed[..open].chars().all(|c| !c.is_whitespace()) => trimmed[open..]
                .find(']')
                .map(|close| open + close + 1),
            _ => None,
        };
        let (identity, args) = match end {
            Some(end) => (&trimmed[..end], trimmed[end..].trim_start()),
            None => trimmed
                .split_once(char::is_whitespace)
                .unwrap_or((trimmed, "")),
        };
        Line {
            text,
            identity,
            args,
        }
    }

    /// Whitespace-separated tokens after the identity
    pub fn args(&self) -> Vec<&'a str> {
        self.args.split_whitespace().collect()
    }

    pub fn kind(&self) -> LineKind<'a> {
        if let Some(tag) = self.identity.strip_prefix('#') {
            LineKind::Tag(tag)
        } else if self.identity.ends_with('*') {
            LineKind::Namespace(self.identity)
        } else if self.identity == KEY_DEFAULT {
            LineKind::Default
        } else {
            LineKind::Exact(self.identity)
        }
    }

    /// Parse the tag named by a `#` line
    ///
    /// A bare `#` has no recoverable form and fails the whole parse. Any
    /// other unreadable tag is reported and skipped.
    pub fn parse_tag(&self, ctx: &FieldContext, tag: &str) -> Result<Option<TagKey>, ListError> {
        if tag.is_empty() {
            return Err(ListError::MalformedTag {
                field: ctx.key().to_string(),
                line: self.text.to_string(),
            });
        }
        match TagKey::parse(tag) {
            Ok(tag) => Ok(Some(tag)),
            Err(_) => {
                ctx.warn("Invalid tag key! Skipping tag", self.text);
                Ok(None)
            }
        }
    }

    /// Namespace named by a `namespace:*` token, if it has one
    pub fn parse_namespace(&self, ctx: &FieldContext, token: &str) -> Option<String> {
        let stripped = token.trim_end_matches('*');
        let namespace = stripped
            .split_once(':')
            .map(|(ns, _)| ns)
            .unwrap_or(stripped);

        if !ResourceKey::is_valid_namespace(namespace) {
            ctx.warn("Invalid namespace entry! Skipping entry", self.text);
            return None;
        }
        Some(namespace.to_string())
    }

    /// Parse the exact key of this line, reporting unreadable keys
    pub fn parse_key(&self, ctx: &FieldContext, token: &str) -> Option<ResourceKey> {
        match ResourceKey::parse(token) {
            Ok(key) => Some(key),
            Err(_) => {
                ctx.warn("Invalid entry! Deleting entry", self.text);
                None
            }
        }
    }

    pub fn values(&self, ctx: &FieldContext, policy: &ValuePolicy) -> Payload {
        policy.parse_values(ctx, self.text, &self.args())
    }
}

/// What an identity token denotes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum LineKind<'a> {
    Tag(&'a str),
    Namespace(&'a str),
    Default,
    Exact(&'a str),
}

/// An exact rule for one registry key
#[derive(Debug, Clone, PartialEq)]
pub struct ValueEntry {
    pub key: ResourceKey,
    pub payload: Payload,
}

impl ValueEntry {
    pub fn new(key: ResourceKey, payload: impl Into<Payload>) -> Self {
        ValueEntry {
            key,
            payload: payload.into(),
        }
    }

    /// Entry with no values, for identity-only lists
    pub fn key_only(key: ResourceKey) -> Self {
        Self::new(key, Payload::empty())
    }
}

impl fmt::Display for ValueEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut out = self.key.to_string();
        self.payload.render_onto(&mut out);
        f.write_str(&out)
    }
}

/// Values for everything carrying a tag
#[derive(Debug, Clone, PartialEq)]
pub struct TagEntry {
    pub tag: TagKey,
    pub payload: Payload,
}

impl TagEntry {
    pub fn new(tag: TagKey, payload: impl Into<Payload>) -> Self {
        TagEntry {
            tag,
            payload: payload.into(),
        }
    }
}

impl fmt::Display for TagEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut out = self.tag.to_string();
        self.payload.render_onto(&mut out);
        f.write_str(&out)
    }
}

/// Values for every key in a namespace
#[derive(Debug, Clone, PartialEq)]
pub struct NamespaceEntry {
    pub namespace: String,
    pub payload: Payload,
}

impl NamespaceEntry {
    pub fn new(namespace: &str, payload: impl Into<Payload>) -> Self {
        NamespaceEntry {
            namespace: namespace.to_string(),
            payload: payload.into(),
        }
    }

    pub fn contains(&self, key: &ResourceKey) -> bool {
        key.namespace() == self.namespace
    }
}

impl fmt::Display for NamespaceEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut out = format!("{}:*", self.namespace);
        self.payload.render_onto(&mut out);
        f.write_str(&out)
    }
}

/// Fallback values for anything not otherwise matched
#[derive(Debug, Clone, PartialEq)]
pub struct DefaultEntry {
    pub payload: Payload,
}

impl DefaultEntry {
    /// An empty payload becomes a single 0
    pub fn new(payload: impl Into<Payload>) -> Self {
        let payload = payload.into();
        let payload = if payload.is_empty() {
            Payload::new(vec![0.0])
        } else {
            payload
        };
        DefaultEntry { payload }
    }
}

impl fmt::Display for DefaultEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut out = KEY_DEFAULT.to_string();
        self.payload.render_onto(&mut out);
        f.write_str(&out)
    }
}
