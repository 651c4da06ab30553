//! Search filter over a built tree.
//!
//! A node stays visible when it matches, when something below it matches
//! (so the path to a deep match stays expanded), or, with
//! `keep_ancestors_visible`, when something above it matches (so a matched
//! container shows its whole subtree).

use std::collections::HashSet;

use regex::{Regex, RegexBuilder};

use crate::{
    data::{
        node::{Node, NodeId},
        tree::Tree,
    },
    error::Result,
};

/// Visible nodes for an arbitrary predicate.
///
/// The implicit root is never part of the result. Ancestor matches are
/// passed down the recursion, so every node is visited once.
pub fn compute_visibility(
    tree: &Tree,
    predicate: impl Fn(&Node) -> bool,
    keep_ancestors_visible: bool,
) -> HashSet<NodeId> {
    let mut visible = HashSet::new();
    for child in &tree.root().children {
        visit(child, false, &predicate, keep_ancestors_visible, &mut visible);
    }
    visible
}

/// Returns whether anything in this subtree matched.
fn visit(
    node: &Node,
    ancestor_matched: bool,
    predicate: &impl Fn(&Node) -> bool,
    keep_ancestors_visible: bool,
    visible: &mut HashSet<NodeId>,
) -> bool {
    let matched = predicate(node);
    let mut below = false;
    for child in &node.children {
        below |= visit(
            child,
            ancestor_matched || matched,
            predicate,
            keep_ancestors_visible,
            visible,
        );
    }
    if matched || below || (keep_ancestors_visible && ancestor_matched) {
        visible.insert(node.id);
    }
    matched || below
}

/// Pattern filter as used by a tree view's search box.
///
/// The pattern is a regular expression tested against map keys and
/// display values. An empty pattern shows everything.
#[derive(Debug, Clone, Default)]
pub struct Filter {
    pattern: Option<Regex>,
    keep_ancestors_visible: bool,
    case_sensitive: bool,
}

impl Filter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the search pattern. On error the previous pattern stays.
    pub fn set_pattern(&mut self, pattern: &str) -> Result<()> {
        self.pattern = if pattern.is_empty() {
            None
        } else {
            Some(
                RegexBuilder::new(pattern)
                    .case_insensitive(!self.case_sensitive)
                    .build()?,
            )
        };
        Ok(())
    }

    pub fn pattern(&self) -> &str {
        self.pattern.as_ref().map(Regex::as_str).unwrap_or_default()
    }

    pub fn set_keep_ancestors_visible(&mut self, keep: bool) {
        self.keep_ancestors_visible = keep;
    }

    pub fn keep_ancestors_visible(&self) -> bool {
        self.keep_ancestors_visible
    }

    /// Switch case sensitivity; the current pattern is recompiled.
    pub fn set_case_sensitive(&mut self, case_sensitive: bool) -> Result<()> {
        self.case_sensitive = case_sensitive;
        let pattern = self.pattern().to_string();
        self.set_pattern(&pattern)
    }

    pub fn is_active(&self) -> bool {
        self.pattern.is_some()
    }

    pub fn matches(&self, node: &Node) -> bool {
        let Some(re) = &self.pattern else {
            return true;
        };
        node.key.name().is_some_and(|k| re.is_match(k)) || re.is_match(&node.display)
    }

    /// Ids of every node that should be shown.
    pub fn visible(&self, tree: &Tree) -> HashSet<NodeId> {
        compute_visibility(tree, |n| self.matches(n), self.keep_ancestors_visible)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{registry::Registry, schema::Schema, value::Data};
    use serde_json::json;

    fn tree(v: serde_json::Value) -> Tree {
        Tree::build(&Data::from(v), &Schema::default(), &mut Registry::new())
    }

    fn ids(tree: &Tree, paths: &[&str]) -> HashSet<NodeId> {
        paths.iter().map(|p| tree.id_by_path(p).unwrap()).collect()
    }

    #[test]
    fn test_match_keeps_path_visible() {
        let tree = tree(json!({"a": {"b": "needle"}, "c": "hay"}));
        let mut filter = Filter::new();
        filter.set_keep_ancestors_visible(true);
        filter.set_pattern("needle").unwrap();
        assert_eq!(filter.visible(&tree), ids(&tree, &["a", "a.b"]));

        filter.set_pattern("missing").unwrap();
        assert!(filter.visible(&tree).is_empty());
    }

    #[test]
    fn test_ancestor_match_shows_subtree() {
        let tree = tree(json!({"group": {"x": 1, "y": {"z": 2}}, "other": 3}));
        let mut filter = Filter::new();
        filter.set_pattern("^group$").unwrap();
        assert_eq!(filter.visible(&tree), ids(&tree, &["group"]));

        filter.set_keep_ancestors_visible(true);
        assert_eq!(
            filter.visible(&tree),
            ids(&tree, &["group", "group.x", "group.y", "group.y.z"])
        );
    }

    #[test]
    fn test_empty_pattern_shows_all() {
        let tree = tree(json!({"a": [1, 2], "b": null}));
        let mut filter = Filter::new();
        filter.set_pattern("").unwrap();
        assert!(!filter.is_active());
        assert_eq!(filter.visible(&tree).len(), tree.node_count() - 1);
    }

    #[test]
    fn test_case_sensitivity() {
        let tree = tree(json!({"Name": "Value"}));
        let mut filter = Filter::new();
        filter.set_pattern("name").unwrap();
        assert_eq!(filter.visible(&tree).len(), 1);
        filter.set_case_sensitive(true).unwrap();
        assert!(filter.visible(&tree).is_empty());
    }

    #[test]
    fn test_invalid_pattern_keeps_previous() {
        let mut filter = Filter::new();
        filter.set_pattern("ok").unwrap();
        assert!(filter.set_pattern("(").is_err());
        assert_eq!(filter.pattern(), "ok");
    }

    #[test]
    fn test_custom_predicate() {
        let tree = tree(json!({"a": [1, 20, 3]}));
        let visible = compute_visibility(
            &tree,
            |n| n.raw.as_i64().is_some_and(|i| i > 10),
            false,
        );
        assert_eq!(visible, ids(&tree, &["a", "a.1"]));
    }
}
