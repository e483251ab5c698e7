//! Value-list queries and whitelist/blacklist composition

use crate::payload::{Payload, ValuePolicy};
use crate::ListError;
use rand::Rng;

/// Shape shared by every list that carries values
pub trait ValueList {
    fn policy(&self) -> &ValuePolicy;

    /// Key of the config field the list was read from
    fn field_key(&self) -> &str;
}

/// Value lookups for queries of type `Q` against registry `R`
pub trait ValueQuery<R, Q>: ValueList {
    /// Payload of the best-matching entry, if any
    fn get_values(&self, registry: &R, query: &Q) -> Option<&Payload>;

    fn contains(&self, registry: &R, query: &Q) -> bool {
        self.get_values(registry, query).is_some()
    }

    /// First value of the match, or 0 when nothing matches
    ///
    /// Only meaningful for single-value lists.
    fn get_value(&self, registry: &R, query: &Q) -> f64 {
        self.get_values(registry, query)
            .map(Payload::first_or_zero)
            .unwrap_or(0.0)
    }

    /// Roll against the matched chance; one sample is drawn every call
    ///
    /// Only meaningful for single-percent lists.
    fn roll_chance(&self, registry: &R, query: &Q, rng: &mut impl Rng) -> bool {
        let roll = rng.gen::<f64>();
        roll < self.get_value(registry, query)
    }
}

/// A whitelist narrowed by an identity-only blacklist
#[derive(Debug, Clone, PartialEq)]
pub struct Combined<L> {
    whitelist: L,
    blacklist: L,
}

impl<L: ValueList> Combined<L> {
    /// Fails if the blacklist's policy allows values
    pub fn new(whitelist: L, blacklist: L) -> Result<Self, ListError> {
        if blacklist.policy().allows_values() {
            return Err(ListError::BlacklistHasValues(blacklist.field_key().to_string()));
        }
        Ok(Combined {
            whitelist,
            blacklist,
        })
    }

    pub fn whitelist(&self) -> &L {
        &self.whitelist
    }

    pub fn blacklist(&self) -> &L {
        &self.blacklist
    }

    /// Whether the query is whitelisted and not blacklisted
    pub fn contains<R, Q>(&self, registry: &R, query: &Q) -> bool
    where
        L: ValueQuery<R, Q>,
    {
        !self.blacklist.contains(registry, query) && self.whitelist.contains(registry, query)
    }

    /// Whitelist payload, unless the query is blacklisted
    pub fn get_values<R, Q>(&self, registry: &R, query: &Q) -> Option<&Payload>
    where
        L: ValueQuery<R, Q>,
    {
        if self.blacklist.contains(registry, query) {
            return None;
        }
        self.whitelist.get_values(registry, query)
    }

    pub fn get_value<R, Q>(&self, registry: &R, query: &Q) -> f64
    where
        L: ValueQuery<R, Q>,
    {
        self.get_values(registry, query)
            .map(Payload::first_or_zero)
            .unwrap_or(0.0)
    }

    /// Roll against the whitelisted chance; one sample is drawn every call
    pub fn roll_chance<R, Q>(&self, registry: &R, query: &Q, rng: &mut impl Rng) -> bool
    where
        L: ValueQuery<R, Q>,
    {
        let roll = rng.gen::<f64>();
        roll < self.get_value(registry, query)
    }
}
