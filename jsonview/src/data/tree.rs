//! The editable tree and its edit operations.
//!
//! Edits validate first and mutate last, so a failed edit leaves the tree
//! exactly as it was.

use crate::{
    data::{
        build::{TreeBuilder, TreeOptions},
        node::{Node, NodeId},
        registry::Registry,
        schema::{Schema, SchemaScope},
        serialize::serialize,
        value::{Data, Key},
        variant::{Variant, choice_options},
    },
    error::{Result, TreeError},
};

/// A document as a tree of nodes under an implicit root.
#[derive(Debug, Clone)]
pub struct Tree {
    root: Node,
    options: TreeOptions,
    next_id: u64,
}

impl Tree {
    /// Build a tree with default options.
    pub fn build(data: &Data, schema: &Schema, registry: &mut Registry) -> Self {
        Self::build_with_options(data, schema, registry, TreeOptions::default())
    }

    pub fn build_with_options(
        data: &Data,
        schema: &Schema,
        registry: &mut Registry,
        options: TreeOptions,
    ) -> Self {
        let mut next_id = 0;
        let root = TreeBuilder::new(registry, options, &mut next_id).build_root(data, schema);
        debug!(
            "built tree: {} nodes, root {}",
            root.node_count(),
            root.variant
        );
        Self {
            root,
            options,
            next_id,
        }
    }

    pub fn root(&self) -> &Node {
        &self.root
    }

    pub fn options(&self) -> TreeOptions {
        self.options
    }

    /// Number of nodes including the root.
    pub fn node_count(&self) -> usize {
        self.root.node_count()
    }

    /// Regenerate the whole data value from the tree.
    pub fn serialize(&self) -> Data {
        serialize(&self.root)
    }

    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.locate(id).and_then(|loc| self.node_at(&loc))
    }

    /// Node at a dot-separated path such as `servers.0.name`.
    ///
    /// List elements are addressed by index. The empty path is the root.
    pub fn get_by_path(&self, path: &str) -> Option<&Node> {
        path.split('.')
            .filter(|s| !s.is_empty())
            .try_fold(&self.root, |node, segment| node.child_by_segment(segment))
    }

    pub fn id_by_path(&self, path: &str) -> Option<NodeId> {
        self.get_by_path(path).map(|n| n.id)
    }

    /// Dot-separated path of a node; the root is the empty string.
    pub fn path_of(&self, id: NodeId) -> Option<String> {
        self.locate(id).map(|loc| self.path_string(&loc))
    }

    /// Replace the value of a leaf.
    pub fn commit_value(&mut self, id: NodeId, value: Data) -> Result<()> {
        let (loc, path) = self.resolve(id)?;
        let node = self.node_at_mut(&loc).ok_or(TreeError::NodeNotFound(id))?;
        if node.is_container() {
            return Err(TreeError::InvalidTarget {
                path,
                reason: "containers have no value to commit".to_string(),
            });
        }
        if !node.editable_value {
            return Err(TreeError::NotEditable { path });
        }
        let raw = node.variant.accept(&path, &node.raw, &value)?;
        node.display = node.variant.display(&raw);
        node.raw = raw;
        debug!("commit `{path}` = {}", node.display);
        Ok(())
    }

    /// Restore a leaf to its schema default, or its variant default.
    pub fn reset_value(&mut self, id: NodeId) -> Result<()> {
        let node = self.get(id).ok_or(TreeError::NodeNotFound(id))?;
        let default = match node.schema.default_data() {
            Some(default) => default,
            None => match node.variant {
                Variant::Choice => choice_options(&node.raw)
                    .and_then(|c| c.first().cloned())
                    .unwrap_or_default(),
                ref variant => variant.default_value(),
            },
        };
        self.commit_value(id, default)
    }

    /// Rename a map entry.
    pub fn rename_key(&mut self, id: NodeId, new_key: &str) -> Result<()> {
        let (loc, path) = self.resolve(id)?;
        let Some((&index, parent_loc)) = loc.split_last() else {
            return Err(TreeError::InvalidTarget {
                path,
                reason: "the root has no key".to_string(),
            });
        };
        let parent = self
            .node_at(parent_loc)
            .ok_or(TreeError::NodeNotFound(id))?;
        let node = &parent.children[index];
        if !matches!(node.key, Key::Name(_)) {
            return Err(TreeError::InvalidTarget {
                path,
                reason: "list elements have no editable key".to_string(),
            });
        }
        if !node.editable_key {
            return Err(TreeError::NotEditable { path });
        }
        if node.key.name() == Some(new_key) {
            return Ok(());
        }
        let new = Key::Name(new_key.to_string());
        if parent.child(&new).is_some() {
            return Err(TreeError::DuplicateKey {
                path: self.path_string(parent_loc),
                key: new_key.to_string(),
            });
        }

        if let Some(node) = self.node_at_mut(&loc) {
            node.key = new;
        }
        debug!("renamed `{path}` to `{new_key}`");
        Ok(())
    }

    /// Append a child to a container.
    ///
    /// Map entries need a key that is not taken yet; list elements ignore
    /// `key` and go to the end. The child is built under the container's
    /// schema scope. Refused when values are read-only, either tree-wide or
    /// by the container's schema entry.
    pub fn add_child(
        &mut self,
        registry: &mut Registry,
        parent: NodeId,
        key: Option<&str>,
        value: &Data,
    ) -> Result<NodeId> {
        let (loc, path) = self.resolve(parent)?;
        let (key, properties) = {
            let node = self.node_at(&loc).ok_or(TreeError::NodeNotFound(parent))?;
            self.check_structural(node, &path)?;
            // `raw` of a container is its empty value, which tells lists from maps
            let key = match node.raw {
                Data::List(_) => Key::Index(node.children.len()),
                Data::Map(_) | Data::OrderedMap(_) => {
                    let name = key.ok_or_else(|| TreeError::InvalidTarget {
                        path: path.clone(),
                        reason: "map entries need a key".to_string(),
                    })?;
                    let key = Key::Name(name.to_string());
                    if node.child(&key).is_some() {
                        return Err(TreeError::DuplicateKey {
                            path,
                            key: name.to_string(),
                        });
                    }
                    key
                }
                _ => {
                    return Err(TreeError::InvalidTarget {
                        path,
                        reason: format!("{} is not a container", node.variant),
                    });
                }
            };
            (key, node.schema.properties.clone())
        };

        let child = TreeBuilder::new(registry, self.options, &mut self.next_id).build_child(
            key,
            value,
            SchemaScope::new(&properties),
        );
        let id = child.id;
        debug!("add {} `{}` under `{path}`", child.variant, child.key.segment());
        self.node_at_mut(&loc)
            .ok_or(TreeError::NodeNotFound(parent))?
            .children
            .push(child);
        Ok(id)
    }

    /// Remove the child at `key` from a container and return its subtree.
    ///
    /// Later list elements move up by one index. Read-only containers are
    /// refused as in [`Tree::add_child`].
    pub fn remove_child(&mut self, parent: NodeId, key: &Key) -> Result<Node> {
        let (loc, path) = self.resolve(parent)?;
        let node = self.node_at(&loc).ok_or(TreeError::NodeNotFound(parent))?;
        self.check_structural(node, &path)?;
        let node = self.node_at_mut(&loc).ok_or(TreeError::NodeNotFound(parent))?;
        let Some(pos) = node.children.iter().position(|c| &c.key == key) else {
            return Err(TreeError::KeyNotFound {
                path: join_path(&path, &key.segment()),
            });
        };
        let removed = node.children.remove(pos);
        if matches!(node.raw, Data::List(_)) {
            for (i, child) in node.children.iter_mut().enumerate().skip(pos) {
                child.key = Key::Index(i);
            }
        }
        debug!("removed `{}` from `{path}`", key.segment());
        Ok(removed)
    }

    /// Whether children may be added to or removed from `node`.
    fn check_structural(&self, node: &Node, path: &str) -> Result<()> {
        if !node.is_container() {
            return Err(TreeError::InvalidTarget {
                path: path.to_string(),
                reason: format!("{} is not a container", node.variant),
            });
        }
        if node.keeps_raw_value() {
            return Err(TreeError::InvalidTarget {
                path: path.to_string(),
                reason: format!("{} value does not fit type {}", node.raw.kind(), node.variant),
            });
        }
        if !self.options.editable_values || !node.schema.is_editable() {
            return Err(TreeError::NotEditable {
                path: path.to_string(),
            });
        }
        Ok(())
    }

    fn resolve(&self, id: NodeId) -> Result<(Vec<usize>, String)> {
        let loc = self.locate(id).ok_or(TreeError::NodeNotFound(id))?;
        let path = self.path_string(&loc);
        Ok((loc, path))
    }

    /// Child indices leading from the root to `id`.
    fn locate(&self, id: NodeId) -> Option<Vec<usize>> {
        fn walk(node: &Node, id: NodeId, loc: &mut Vec<usize>) -> bool {
            if node.id == id {
                return true;
            }
            for (i, child) in node.children.iter().enumerate() {
                loc.push(i);
                if walk(child, id, loc) {
                    return true;
                }
                loc.pop();
            }
            false
        }

        let mut loc = Vec::new();
        walk(&self.root, id, &mut loc).then_some(loc)
    }

    fn node_at(&self, loc: &[usize]) -> Option<&Node> {
        loc.iter()
            .try_fold(&self.root, |node, &i| node.children.get(i))
    }

    fn node_at_mut(&mut self, loc: &[usize]) -> Option<&mut Node> {
        let mut node = &mut self.root;
        for &i in loc {
            node = node.children.get_mut(i)?;
        }
        Some(node)
    }

    fn path_string(&self, loc: &[usize]) -> String {
        let mut node = &self.root;
        let mut path = String::new();
        for &i in loc {
            let Some(child) = node.children.get(i) else {
                break;
            };
            path = join_path(&path, &child.key.segment());
            node = child;
        }
        path
    }
}

fn join_path(parent: &str, segment: &str) -> String {
    if parent.is_empty() {
        segment.to_string()
    } else {
        format!("{parent}.{segment}")
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::data::variant::VariantExt;
    use serde_json::json;

    fn data(v: serde_json::Value) -> Data {
        Data::from(v)
    }

    fn build(v: serde_json::Value, schema: serde_json::Value) -> (Tree, Registry) {
        let _ = env_logger::builder().is_test(true).try_init();
        let mut registry = Registry::new();
        let schema = Schema::from_value(&schema).unwrap();
        let tree = Tree::build(&data(v), &schema, &mut registry);
        (tree, registry)
    }

    fn round_trip(v: serde_json::Value) {
        let (tree, _) = build(v.clone(), json!({}));
        assert_eq!(tree.serialize().to_json(), v);
    }

    #[test]
    fn test_round_trip_primitives_and_nesting() {
        round_trip(json!({
            "none": null,
            "bool": true,
            "int": 666,
            "float": 1.23,
            "text": "value",
            "url": "https://example.com",
            "path": "/tmp/file.txt",
            "list1": [1, 2, 3],
            "dict": {"key": "value"},
            "nested": [{"a": [1, [2, {"b": []}]]}, {}],
            "range": {"start": 0, "end": 10, "step": 2},
            "choice": {"value": "B", "choices": ["A", "B", "C"]}
        }));
        round_trip(json!([]));
        round_trip(json!("scalar root"));
        round_trip(json!(null));
    }

    #[test]
    fn test_key_order_is_preserved() {
        let (tree, _) = build(json!({"b": 1, "a": 2}), json!({}));
        let out = tree.serialize();
        let keys: Vec<_> = out.as_map().unwrap().keys().cloned().collect();
        assert_eq!(keys, vec!["b", "a"]);
    }

    #[test]
    fn test_ordered_map_identity_survives() {
        let mut registry = Registry::new();
        let inner = Data::ordered_map([("z", Data::Int(1)), ("y", Data::Int(2))]);
        let value = Data::map([("inner", inner.clone())]);
        let tree = Tree::build(&value, &Schema::default(), &mut registry);
        let out = tree.serialize();
        let out_inner = out.as_map().unwrap().get("inner").unwrap();
        assert!(matches!(out_inner, Data::OrderedMap(_)));
        assert_eq!(out_inner, &inner);
        let keys: Vec<_> = out_inner.as_map().unwrap().keys().cloned().collect();
        assert_eq!(keys, vec!["z", "y"]);
    }

    #[test]
    fn test_empty_list_stays_list() {
        let (tree, _) = build(json!([]), json!({}));
        assert_eq!(tree.root().variant, Variant::List);
        assert!(tree.root().children.is_empty());
        assert_eq!(tree.serialize(), Data::List(vec![]));

        let (tree, _) = build(json!({"l": [], "m": {}}), json!({}));
        assert_eq!(tree.serialize().to_json(), json!({"l": [], "m": {}}));
    }

    #[test]
    fn test_compound_nodes_are_leaves() {
        let (tree, _) = build(json!({"r": {"start": 0, "end": 10, "step": 2}}), json!({}));
        let r = tree.get_by_path("r").unwrap();
        assert_eq!(r.variant, Variant::Range);
        assert!(r.children.is_empty());
        assert_eq!(r.display, "0, 10, 2");
        assert_eq!(
            tree.serialize().to_json(),
            json!({"r": {"start": 0, "end": 10, "step": 2}})
        );
    }

    #[test]
    fn test_explicit_string_override() {
        let (tree, _) = build(json!({"x": 5}), json!({"x": {"type": "String"}}));
        let x = tree.get_by_path("x").unwrap();
        assert_eq!(x.variant, Variant::String);
        assert_eq!(x.display, "5");
        assert_eq!(x.raw, Data::Int(5));
        assert_eq!(tree.serialize().to_json(), json!({"x": "5"}));
    }

    #[test]
    fn test_schema_scope_does_not_leak_to_siblings() {
        let schema = json!({
            "a": {"properties": {"v": {"type": "String"}}},
            "v": {"editable": false}
        });
        let (tree, _) = build(json!({"a": {"v": 1}, "b": {"v": 2}, "v": 3}), schema);
        assert_eq!(tree.get_by_path("a.v").unwrap().variant, Variant::String);
        assert_eq!(tree.get_by_path("b.v").unwrap().variant, Variant::Integer);
        assert!(tree.get_by_path("b.v").unwrap().editable_value);
        assert!(!tree.get_by_path("v").unwrap().editable_value);
    }

    #[test]
    fn test_editable_flags() {
        let (tree, _) = build(
            json!({"m": {"k": 1}, "l": [1], "locked": 2}),
            json!({"locked": {"editable": false}}),
        );
        let m = tree.get_by_path("m").unwrap();
        assert!(!m.editable_value);
        assert!(m.editable_key);
        let elem = tree.get_by_path("l.0").unwrap();
        assert!(elem.editable_value);
        assert!(!elem.editable_key);
        assert_eq!(elem.key.to_string(), "-");
        let locked = tree.get_by_path("locked").unwrap();
        assert!(!locked.editable_value);
        assert!(!locked.editable_key);

        let mut registry = Registry::new();
        let options = TreeOptions {
            editable_keys: false,
            editable_values: false,
        };
        let tree = Tree::build_with_options(
            &data(json!({"k": 1})),
            &Schema::default(),
            &mut registry,
            options,
        );
        let k = tree.get_by_path("k").unwrap();
        assert!(!k.editable_key && !k.editable_value);
    }

    #[test]
    fn test_commit_choice() {
        let (mut tree, _) = build(
            json!({"c": {"value": "B", "choices": ["A", "B", "C"]}}),
            json!({}),
        );
        let id = tree.id_by_path("c").unwrap();
        tree.commit_value(id, Data::from("C")).unwrap();
        assert_eq!(tree.get(id).unwrap().display, "C");
        assert_eq!(
            tree.serialize().to_json(),
            json!({"c": {"value": "C", "choices": ["A", "B", "C"]}})
        );
        assert!(tree.commit_value(id, Data::from("D")).is_err());
        assert_eq!(tree.get(id).unwrap().display, "C");
    }

    #[test]
    fn test_commit_range_policy() {
        let (mut tree, _) = build(json!({"r": {"start": 0, "end": 1.5, "step": 1}}), json!({}));
        let id = tree.id_by_path("r").unwrap();
        let err = tree.commit_value(id, data(json!([0.5, 2, 1]))).unwrap_err();
        assert!(matches!(err, TreeError::TypeMismatch { .. }));
        assert_eq!(
            tree.serialize().to_json(),
            json!({"r": {"start": 0, "end": 1.5, "step": 1}})
        );

        tree.commit_value(id, data(json!({"start": 2.0, "end": 3, "step": 1})))
            .unwrap();
        assert_eq!(
            tree.serialize().to_json(),
            json!({"r": {"start": 2, "end": 3.0, "step": 1}})
        );
    }

    #[test]
    fn test_commit_rejections() {
        let (mut tree, _) = build(json!({"m": {}, "n": 1, "s": "x"}), json!({"s": {"editable": false}}));
        let m = tree.id_by_path("m").unwrap();
        assert!(matches!(
            tree.commit_value(m, Data::Int(1)),
            Err(TreeError::InvalidTarget { .. })
        ));
        let n = tree.id_by_path("n").unwrap();
        assert!(matches!(
            tree.commit_value(n, Data::from("one")),
            Err(TreeError::TypeMismatch { .. })
        ));
        let s = tree.id_by_path("s").unwrap();
        assert!(matches!(
            tree.commit_value(s, Data::from("y")),
            Err(TreeError::NotEditable { .. })
        ));
        assert_eq!(tree.serialize().to_json(), json!({"m": {}, "n": 1, "s": "x"}));
    }

    #[test]
    fn test_commit_none_to_text_and_back() {
        let (mut tree, _) = build(json!({"n": null}), json!({}));
        let id = tree.id_by_path("n").unwrap();
        assert_eq!(tree.get(id).unwrap().display, "None");
        tree.commit_value(id, Data::from("filled")).unwrap();
        assert_eq!(tree.serialize().to_json(), json!({"n": "filled"}));
        tree.commit_value(id, Data::Null).unwrap();
        assert_eq!(tree.serialize().to_json(), json!({"n": null}));
    }

    #[test]
    fn test_reset_value() {
        let (mut tree, _) = build(
            json!({"port": 9000, "flag": true, "r": {"start": 3, "end": 4, "step": 5},
                   "c": {"value": "B", "choices": ["A", "B"]}}),
            json!({"port": {"default": 8080}}),
        );
        for path in ["port", "flag", "r", "c"] {
            let id = tree.id_by_path(path).unwrap();
            tree.reset_value(id).unwrap();
        }
        assert!(tree.get_by_path("port").unwrap().is_default());
        assert_eq!(
            tree.serialize().to_json(),
            json!({"port": 8080, "flag": false, "r": {"start": 0, "end": 1, "step": 1},
                   "c": {"value": "A", "choices": ["A", "B"]}})
        );
    }

    #[test]
    fn test_add_and_remove_children() {
        let (mut tree, mut registry) = build(
            json!({"list": [1, 2, 3], "map": {"a": 1}, "leaf": 1}),
            json!({"map": {"properties": {"b": {"type": "String"}}}}),
        );
        let list = tree.id_by_path("list").unwrap();
        let map = tree.id_by_path("map").unwrap();
        let leaf = tree.id_by_path("leaf").unwrap();

        let added = tree
            .add_child(&mut registry, list, None, &Data::Int(4))
            .unwrap();
        assert_eq!(tree.path_of(added).as_deref(), Some("list.3"));

        let b = tree
            .add_child(&mut registry, map, Some("b"), &Data::Int(7))
            .unwrap();
        assert_eq!(tree.get(b).unwrap().variant, Variant::String);
        assert!(matches!(
            tree.add_child(&mut registry, map, Some("a"), &Data::Int(0)),
            Err(TreeError::DuplicateKey { .. })
        ));
        assert!(matches!(
            tree.add_child(&mut registry, map, None, &Data::Int(0)),
            Err(TreeError::InvalidTarget { .. })
        ));
        assert!(matches!(
            tree.add_child(&mut registry, leaf, Some("x"), &Data::Int(0)),
            Err(TreeError::InvalidTarget { .. })
        ));

        let removed = tree.remove_child(list, &Key::Index(0)).unwrap();
        assert_eq!(removed.raw, Data::Int(1));
        assert_eq!(tree.get_by_path("list.0").unwrap().raw, Data::Int(2));
        assert_eq!(tree.path_of(added).as_deref(), Some("list.2"));
        assert!(matches!(
            tree.remove_child(map, &Key::Name("zz".into())),
            Err(TreeError::KeyNotFound { .. })
        ));
        assert!(matches!(
            tree.remove_child(leaf, &Key::Name("x".into())),
            Err(TreeError::InvalidTarget { .. })
        ));

        assert_eq!(
            tree.serialize().to_json(),
            json!({"list": [2, 3, 4], "map": {"a": 1, "b": "7"}, "leaf": 1})
        );
    }

    #[test]
    fn test_add_container_child() {
        let (mut tree, mut registry) = build(json!({"items": []}), json!({}));
        let items = tree.id_by_path("items").unwrap();
        let id = tree
            .add_child(&mut registry, items, None, &data(json!({"k": [true]})))
            .unwrap();
        assert_eq!(tree.get(id).unwrap().children.len(), 1);
        assert_eq!(tree.serialize().to_json(), json!({"items": [{"k": [true]}]}));
    }

    #[test]
    fn test_rename_key() {
        let (mut tree, _) = build(json!({"a": 1, "b": 2, "l": [0]}), json!({}));
        let a = tree.id_by_path("a").unwrap();
        assert!(matches!(
            tree.rename_key(a, "b"),
            Err(TreeError::DuplicateKey { .. })
        ));
        tree.rename_key(a, "c").unwrap();
        let out = tree.serialize();
        let keys: Vec<_> = out.as_map().unwrap().keys().cloned().collect();
        assert_eq!(keys, vec!["c", "b", "l"]);

        let elem = tree.id_by_path("l.0").unwrap();
        assert!(tree.rename_key(elem, "x").is_err());
        let root = tree.root().id;
        assert!(tree.rename_key(root, "x").is_err());
    }

    #[test]
    fn test_unknown_node() {
        let (mut tree, _) = build(json!({"a": 1}), json!({}));
        let missing = NodeId(999);
        assert!(tree.get(missing).is_none());
        assert!(matches!(
            tree.commit_value(missing, Data::Int(1)),
            Err(TreeError::NodeNotFound(_))
        ));
    }

    #[test]
    fn test_unsigned_integer_round_trip() {
        round_trip(json!({"big": u64::MAX, "neg": i64::MIN, "list": [u64::MAX, 1]}));
        let (tree, _) = build(json!({"big": u64::MAX}), json!({}));
        assert_eq!(tree.get_by_path("big").unwrap().variant, Variant::Integer);
    }

    #[test]
    fn test_forced_container_keeps_mismatched_value() {
        let (mut tree, mut registry) = build(
            json!({"x": 5, "y": [1, 2], "z": [3]}),
            json!({"x": {"type": "List"}, "y": {"type": "Map"}, "z": {"type": "List"}}),
        );
        let x = tree.get_by_path("x").unwrap();
        assert_eq!(x.variant, Variant::List);
        assert!(x.keeps_raw_value());
        assert!(x.children.is_empty());
        assert_eq!(x.display, "5");
        assert!(!tree.get_by_path("z").unwrap().keeps_raw_value());
        assert_eq!(
            tree.serialize().to_json(),
            json!({"x": 5, "y": [1, 2], "z": [3]})
        );

        let y = tree.id_by_path("y").unwrap();
        assert!(matches!(
            tree.add_child(&mut registry, y, Some("k"), &Data::Int(0)),
            Err(TreeError::InvalidTarget { .. })
        ));
    }

    /// Map whose keys are all upper case, such as an environment block.
    #[derive(Debug)]
    struct EnvBlock;

    impl VariantExt for EnvBlock {
        fn name(&self) -> &str {
            "Env"
        }

        fn matches(&self, data: &Data) -> bool {
            data.as_map().is_some_and(|m| {
                !m.is_empty() && m.keys().all(|k| k.chars().all(|c| c.is_ascii_uppercase() || c == '_'))
            })
        }

        fn empty_container(&self) -> Option<Data> {
            Some(Data::Map(Default::default()))
        }
    }

    #[test]
    fn test_container_extension_round_trip() {
        let _ = env_logger::builder().is_test(true).try_init();
        let mut registry = Registry::new();
        registry.insert(0, Variant::Extension(Arc::new(EnvBlock)));
        let value = json!({"env": {"PATH": "/bin", "HOME": "/root"}, "name": "job"});
        let mut tree = Tree::build(&data(value.clone()), &Schema::default(), &mut registry);

        let env = tree.get_by_path("env").unwrap();
        assert_eq!(env.variant_label(), "Env");
        assert!(env.is_container());
        assert!(!env.editable_value);
        assert_eq!(env.children.len(), 2);
        assert_eq!(tree.get_by_path("env.PATH").unwrap().variant, Variant::Filepath);
        assert_eq!(tree.serialize().to_json(), value);

        let id = env.id;
        tree.add_child(&mut registry, id, Some("LANG"), &Data::from("C"))
            .unwrap();
        tree.remove_child(id, &Key::Name("HOME".into())).unwrap();
        assert_eq!(
            tree.serialize().to_json(),
            json!({"env": {"PATH": "/bin", "LANG": "C"}, "name": "job"})
        );
    }

    #[test]
    fn test_structural_edits_respect_read_only() {
        let mut registry = Registry::new();
        let options = TreeOptions {
            editable_keys: true,
            editable_values: false,
        };
        let mut tree = Tree::build_with_options(
            &data(json!({"l": [1]})),
            &Schema::default(),
            &mut registry,
            options,
        );
        let l = tree.id_by_path("l").unwrap();
        assert!(matches!(
            tree.add_child(&mut registry, l, None, &Data::Int(2)),
            Err(TreeError::NotEditable { .. })
        ));
        assert!(matches!(
            tree.remove_child(l, &Key::Index(0)),
            Err(TreeError::NotEditable { .. })
        ));

        let (mut tree, mut registry) = build(
            json!({"locked": {"a": 1}, "open": {"a": 1}}),
            json!({"locked": {"editable": false}}),
        );
        let locked = tree.id_by_path("locked").unwrap();
        let open = tree.id_by_path("open").unwrap();
        assert!(matches!(
            tree.add_child(&mut registry, locked, Some("b"), &Data::Int(2)),
            Err(TreeError::NotEditable { .. })
        ));
        assert!(tree.remove_child(locked, &Key::Name("a".into())).is_err());
        tree.add_child(&mut registry, open, Some("b"), &Data::Int(2))
            .unwrap();
        assert_eq!(
            tree.serialize().to_json(),
            json!({"locked": {"a": 1}, "open": {"a": 1, "b": 2}})
        );
    }

    #[test]
    fn test_deep_nesting() {
        let mut value = json!("leaf");
        for _ in 0..200 {
            value = json!({"n": [value]});
        }
        round_trip(value);
    }
}
