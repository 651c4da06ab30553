use std::fmt;

use crate::data::{
    schema::SchemaEntry,
    value::{Data, Key},
    variant::Variant,
};

/// Identity of a node, unique within one tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub(crate) u64);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// One row of the tree: a key paired with a typed value.
#[derive(Debug, Clone)]
pub struct Node {
    pub id: NodeId,
    pub key: Key,
    pub variant: Variant,
    /// Schema entry of this key; empty when the schema says nothing.
    pub schema: SchemaEntry,
    /// Text shown and edited in the value column.
    pub display: String,
    /// Typed value, kept apart from the display text.
    pub raw: Data,
    pub editable_key: bool,
    pub editable_value: bool,
    /// Children in source order. Always empty for leaves.
    pub children: Vec<Node>,
}

impl Node {
    pub fn is_container(&self) -> bool {
        self.variant.is_container()
    }

    /// Container whose value did not fit its variant and is kept whole in
    /// `raw` instead of being split into children.
    pub fn keeps_raw_value(&self) -> bool {
        self.variant
            .empty_container()
            .is_some_and(|empty| empty != self.raw)
    }

    pub fn variant_label(&self) -> &str {
        self.variant.name()
    }

    /// Schema tooltip, or the variant name.
    pub fn tooltip(&self) -> &str {
        self.schema
            .tooltip
            .as_deref()
            .unwrap_or_else(|| self.variant.name())
    }

    /// Text put on the clipboard by a copy action.
    pub fn copy_text(&self) -> String {
        match self.variant {
            Variant::Range | Variant::Choice => self.raw.to_string(),
            _ => self.display.clone(),
        }
    }

    /// Whether the current value equals the schema default.
    pub fn is_default(&self) -> bool {
        let Some(default) = self.schema.default_data() else {
            return false;
        };
        match (&self.variant, &self.raw) {
            (Variant::Choice, Data::Map(m) | Data::OrderedMap(m)) => m.get("value") == Some(&default),
            (Variant::Range, _) => {
                let Some(current) = crate::data::variant::range_fields(&self.raw) else {
                    return false;
                };
                match &default {
                    Data::List(items) => items.iter().eq(current),
                    other => other == &self.raw,
                }
            }
            _ => self.variant.to_data(&self.raw, &self.display) == default,
        }
    }

    pub fn child(&self, key: &Key) -> Option<&Node> {
        self.children.iter().find(|c| &c.key == key)
    }

    /// Child addressed by one path segment: a key name, or an index for
    /// list elements.
    pub fn child_by_segment(&self, segment: &str) -> Option<&Node> {
        self.children.iter().find(|c| c.key.segment() == segment)
    }

    /// Number of nodes in this subtree, itself included.
    pub fn node_count(&self) -> usize {
        1 + self.children.iter().map(Node::node_count).sum::<usize>()
    }

    /// Pre-order iterator over this subtree.
    pub fn iter(&self) -> impl Iterator<Item = &Node> {
        let mut stack = vec![self];
        std::iter::from_fn(move || {
            let node = stack.pop()?;
            stack.extend(node.children.iter().rev());
            Some(node)
        })
    }
}
