//! Query objects handed to entry lists
//!
//! Blocks are queried by state and entities by live instance. Both carry
//! more than a registry key, so lists see them through these views.

use crate::memory::RegistryObject;
use std::collections::BTreeMap;

/// A block state: a block plus its property assignments
pub trait BlockStateView {
    type Block;

    fn block(&self) -> &Self::Block;

    /// Value of a state property, if the block defines it
    fn property(&self, name: &str) -> Option<&str>;
}

/// A live entity: its registered type plus its runtime class
pub trait EntityView {
    type EntityType;
    type Class;

    fn entity_type(&self) -> &Self::EntityType;

    fn class(&self) -> &Self::Class;
}

/// Block state backed by a plain property map
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockState {
    pub block: RegistryObject,
    pub properties: BTreeMap<String, String>,
}

impl BlockState {
    /// A state with no properties set
    pub fn of(block: RegistryObject) -> Self {
        BlockState {
            block,
            properties: BTreeMap::new(),
        }
    }

    /// Builder: assign one property
    pub fn with(mut self, name: &str, value: &str) -> Self {
        self.properties.insert(name.to_string(), value.to_string());
        self
    }
}

impl BlockStateView for BlockState {
    type Block = RegistryObject;

    fn block(&self) -> &RegistryObject {
        &self.block
    }

    fn property(&self, name: &str) -> Option<&str> {
        self.properties.get(name).map(|s| s.as_str())
    }
}

/// Entity instance identified by type and class name
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entity {
    pub entity_type: RegistryObject,
    pub class: String,
}

impl EntityView for Entity {
    type EntityType = RegistryObject;
    type Class = String;

    fn entity_type(&self) -> &RegistryObject {
        &self.entity_type
    }

    fn class(&self) -> &String {
        &self.class
    }
}
