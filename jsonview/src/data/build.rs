use crate::data::{
    node::{Node, NodeId},
    registry::Registry,
    schema::{Schema, SchemaEntry, SchemaScope},
    value::{Data, Key},
    variant::Variant,
};

/// Model-level editing switches, combined with schema `editable` flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TreeOptions {
    /// Allow renaming map keys.
    pub editable_keys: bool,
    /// Allow committing leaf values.
    pub editable_values: bool,
}

impl Default for TreeOptions {
    fn default() -> Self {
        Self {
            editable_keys: true,
            editable_values: true,
        }
    }
}

/// Turns data into nodes, one subtree at a time.
pub(crate) struct TreeBuilder<'a> {
    registry: &'a mut Registry,
    options: TreeOptions,
    next_id: &'a mut u64,
}

impl<'a> TreeBuilder<'a> {
    pub fn new(registry: &'a mut Registry, options: TreeOptions, next_id: &'a mut u64) -> Self {
        Self {
            registry,
            options,
            next_id,
        }
    }

    fn alloc_id(&mut self) -> NodeId {
        let id = NodeId(*self.next_id);
        *self.next_id += 1;
        id
    }

    /// Root node for a whole document.
    ///
    /// The root carries the full schema as its `properties`, so edits below
    /// it see the same scope the initial build did.
    pub fn build_root(&mut self, data: &Data, schema: &Schema) -> Node {
        let variant = self.registry.resolve(data, None);
        let entry = SchemaEntry {
            properties: schema.clone(),
            ..Default::default()
        };
        let mut root = self.node(Key::Root, variant, entry, data, true);
        if root.is_container() {
            self.fill_children(&mut root, data, SchemaScope::new(schema));
        }
        root
    }

    /// Node for `key` holding `data`, with its whole subtree.
    ///
    /// `scope` is the schema level of the parent; it is narrowed for the
    /// children and left untouched for the caller.
    pub fn build_child(&mut self, key: Key, data: &Data, scope: SchemaScope<'_>) -> Node {
        let fragment = scope.fragment(&key);
        let variant = self.registry.resolve(data, fragment);
        trace!("classified `{}` as {}", key.segment(), variant);

        let editable = fragment.is_none_or(SchemaEntry::is_editable);
        let entry = fragment.cloned().unwrap_or_default();
        let mut node = self.node(key, variant, entry, data, editable);
        if node.is_container() {
            let inner = scope.descend_into(&node.key);
            self.fill_children(&mut node, data, inner);
        }
        node
    }

    /// Build the children of a container node.
    ///
    /// A value the container variant cannot descend (a schema forcing `List`
    /// onto a number, say) is kept whole in `raw` and written back as is.
    fn fill_children(&mut self, node: &mut Node, data: &Data, scope: SchemaScope<'_>) {
        let Some(entries) = node.variant.descend(data) else {
            warn!(
                "`{}`: {} value does not fit type {}, keeping it unchanged",
                node.key.segment(),
                data.kind(),
                node.variant
            );
            node.raw = data.clone();
            node.display = data.label();
            return;
        };
        node.children = entries
            .into_iter()
            .map(|(key, value)| self.build_child(key, value, scope))
            .collect();
    }

    fn node(
        &mut self,
        key: Key,
        variant: Variant,
        schema: SchemaEntry,
        data: &Data,
        editable: bool,
    ) -> Node {
        let editable_key = self.options.editable_keys && editable && matches!(key, Key::Name(_));
        let editable_value =
            self.options.editable_values && editable && variant.is_value_editable();
        let display = variant.display(data);
        // containers keep their contents in `children` only
        let raw = match variant.empty_container() {
            Some(empty) => empty,
            None => data.clone(),
        };
        Node {
            id: self.alloc_id(),
            key,
            variant,
            schema,
            display,
            raw,
            editable_key,
            editable_value,
            children: Vec::new(),
        }
    }
}
