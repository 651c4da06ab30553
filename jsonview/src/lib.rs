//! # jsonview
//!
//! Schema-guided, bidirectional mapping between JSON-like data and an
//! editable tree.
//!
//! Every value of a document is classified into a [`Variant`](data::Variant)
//! by an ordered [`Registry`](data::Registry), turned into a tree of
//! [`Node`](data::Node)s with a schema overlay for defaults, editability and
//! tooltips, and serialized back into an equivalent value after edits.
//!
//! ## Features
//!
//! - Builtin variants: None, String, Integer, Float, Boolean, List, Map,
//!   OrderedMap, Url, Filepath and the catch-all Any
//! - Compound leaves: Range (`{start, end, step}`) and Choice
//!   (`{value, choices}`)
//! - User extensions through [`VariantExt`](data::VariantExt), and schema
//!   types registered on first use
//! - Lossless round trip, key order and ordered-map identity included
//! - Search filter with ancestor/descendant visibility propagation
//! - JSON and TOML files with timestamped backups on save
//!
//! ## Quick Start
//!
//! ```rust
//! use jsonview::data::{Data, Registry, Schema, Tree};
//! use serde_json::json;
//!
//! let schema = Schema::from_value(&json!({"x": {"type": "String"}})).unwrap();
//! let mut registry = Registry::new();
//! let mut tree = Tree::build(&Data::from(json!({"x": 5, "n": 1})), &schema, &mut registry);
//!
//! let id = tree.id_by_path("n").unwrap();
//! tree.commit_value(id, Data::Int(2)).unwrap();
//! assert_eq!(tree.serialize().to_json(), json!({"x": "5", "n": 2}));
//! ```
//!
//! ## Modules
//!
//! - [`data`] - Values, schema, variants, tree building and serialization
//! - [`filter`] - Search filter over a built tree
//! - [`error`] - Error types

#[macro_use]
extern crate log;

/// Values, schema, variants and the tree/data mapping.
pub mod data;

/// Error types.
pub mod error;

/// Search filter with visibility propagation.
pub mod filter;

pub use data::{Data, Document, Schema, Tree};
pub use error::TreeError;
pub use filter::Filter;
