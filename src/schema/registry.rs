//! Named schema definitions for `$ref`-style self-reference.
//!
//! A descriptor may reference another definition with a one-key
//! `{"$ref": "Name"}` object, which is how recursive and shared shapes are
//! encoded. The registry is the lookup table those references resolve
//! against; resolution itself lives on [`SchemaNode`](super::SchemaNode).

use serde_json::{Map, Value};
use thiserror::Error;

/// Errors raised while assembling a [`SchemaRegistry`].
///
/// This is the only fallible surface of the crate; reflection over a built
/// registry always degrades instead of erroring.
#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("schema definition name cannot be empty")]
    EmptyName,

    #[error("duplicate schema definition: '{0}'")]
    Duplicate(String),
}

/// Ordered table of named schema definitions.
#[derive(Debug, Default, Clone)]
pub struct SchemaRegistry {
    definitions: Map<String, Value>,
}

impl SchemaRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a definition under `name`.
    pub fn insert(&mut self, name: impl Into<String>, schema: Value) -> Result<(), RegistryError> {
        let name = name.into();
        if name.is_empty() {
            return Err(RegistryError::EmptyName);
        }
        if self.definitions.contains_key(&name) {
            return Err(RegistryError::Duplicate(name));
        }
        self.definitions.insert(name, schema);
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.definitions.get(name)
    }

    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }

    pub fn len(&self) -> usize {
        self.definitions.len()
    }
}
