//! Schema overlay and the scope that follows tree traversal.
//!
//! A schema document maps keys to [`SchemaEntry`] values. Each entry may
//! carry nested `properties` which apply to the children of that key:
//!
//! ```json
//! {
//!     "server": {
//!         "tooltip": "Server settings",
//!         "properties": {
//!             "port": {"type": "Integer", "default": 8080},
//!             "name": {"editable": false}
//!         }
//!     }
//! }
//! ```
//!
//! List elements are looked up by their index (`"0"`, `"1"`, ...).

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::{
    data::value::{Data, Key},
    error::Result,
};

/// A schema document: key → entry for one nesting level.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Schema(pub IndexMap<String, SchemaEntry>);

/// Schema information attached to one key.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SchemaEntry {
    /// Name of the variant forced on this key.
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub type_name: Option<String>,
    /// Value restored by a reset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default: Option<serde_json::Value>,
    /// Absent means editable.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub editable: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tooltip: Option<String>,
    /// Schema for the children of this key.
    #[serde(skip_serializing_if = "Schema::is_empty")]
    pub properties: Schema,
}

impl Schema {
    /// Parse a schema from JSON text.
    pub fn parse(s: &str) -> Result<Self> {
        Ok(serde_json::from_str(s)?)
    }

    /// Parse a schema from an already loaded JSON value.
    pub fn from_value(value: &serde_json::Value) -> Result<Self> {
        Ok(Schema::deserialize(value)?)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, key: &str) -> Option<&SchemaEntry> {
        self.0.get(key)
    }
}

impl SchemaEntry {
    pub fn is_editable(&self) -> bool {
        self.editable.unwrap_or(true)
    }

    /// The schema default converted to data.
    pub fn default_data(&self) -> Option<Data> {
        self.default.as_ref().map(Data::from)
    }
}

/// View of the schema level that applies to the children being built.
///
/// Scopes are plain values: descending returns a narrowed scope for the
/// subtree while the caller keeps its own, so sibling subtrees always start
/// from the same level.
#[derive(Debug, Clone, Copy, Default)]
pub struct SchemaScope<'a> {
    current: Option<&'a Schema>,
}

impl<'a> SchemaScope<'a> {
    pub fn new(schema: &'a Schema) -> Self {
        Self {
            current: Some(schema),
        }
    }

    /// A scope without any schema information.
    pub fn empty() -> Self {
        Self { current: None }
    }

    /// Entry for `key` at the current level.
    pub fn fragment(&self, key: &Key) -> Option<&'a SchemaEntry> {
        if matches!(key, Key::Root) {
            return None;
        }
        self.current?.get(&key.segment())
    }

    /// Scope for the children of `key`.
    pub fn descend_into(&self, key: &Key) -> SchemaScope<'a> {
        match self.fragment(key) {
            Some(entry) => SchemaScope::new(&entry.properties),
            None => SchemaScope::empty(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.current.is_none_or(Schema::is_empty)
    }
}
