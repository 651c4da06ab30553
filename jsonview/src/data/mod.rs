//! Data model, classification and the tree/data mapping.
//!
//! - [`value`] - JSON-like values and node keys
//! - [`schema`] - Schema overlay and traversal scope
//! - [`variant`] - Value variants and compound value rules
//! - [`registry`] - Ordered variant registry
//! - [`node`] - Tree nodes
//! - [`build`] - Data to tree
//! - [`serialize`] - Tree to data
//! - [`tree`] - The tree and its edit operations
//! - [`document`] - File-backed editing session

/// JSON-like values and node keys.
pub mod value;

/// Schema documents and the scope threaded through traversal.
pub mod schema;

/// Value variants: matching, display, editing and serialization rules.
pub mod variant;

/// Ordered registry resolving values to variants.
pub mod registry;

/// Tree nodes and their identities.
pub mod node;

/// Tree construction.
pub mod build;

/// Tree back to data.
pub mod serialize;

/// The editable tree.
pub mod tree;

/// Editing session backed by a JSON or TOML file.
pub mod document;

pub use build::TreeOptions;
pub use document::Document;
pub use node::{Node, NodeId};
pub use registry::Registry;
pub use schema::{Schema, SchemaEntry, SchemaScope};
pub use tree::Tree;
pub use value::{Data, Key, Map};
pub use variant::{Variant, VariantExt};
