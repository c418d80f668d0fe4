//! Config Tree Resolver
//!
//! Locates a table's configuration anywhere in a [`ChildTableTree`] and
//! decides which child tables apply to a given record. Both operations are
//! pure functions of their inputs and never fail; an absent tree simply
//! resolves to nothing.

use crate::record::Record;
use crate::tree::{ChildTableNode, ChildTableTree};

/// How a [`ConfigMatch`] was found.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchKind {
    /// The tree key equals the requested name.
    TableName,
    /// The node's `relationName` equals the requested name.
    RelationName,
}

/// A node found in the tree, with the table names leading to it.
#[derive(Debug, Clone, PartialEq)]
pub struct ConfigMatch<'a> {
    pub name: &'a str,
    pub node: &'a ChildTableNode,
    /// Ancestor table names, outermost first. Empty for top-level entries.
    pub path: Vec<&'a str>,
    pub kind: MatchKind,
}

/// Every position a table name was found at, winner first.
#[derive(Debug, Clone, Default)]
pub struct Resolution<'a> {
    pub found: Option<ConfigMatch<'a>>,
    /// Other positions with the same table name, in search order.
    pub shadowed: Vec<ConfigMatch<'a>>,
}

/// Visit every node depth-first: all keys of a level, then each child
/// subtree in key order. No depth limit.
fn walk<'a>(tree: &'a ChildTableTree, mut visit: impl FnMut(&[&'a str], &'a str, &'a ChildTableNode)) {
    let mut stack: Vec<(Vec<&'a str>, &'a ChildTableTree)> = vec![(Vec::new(), tree)];

    while let Some((path, level)) = stack.pop() {
        for (name, node) in level {
            visit(&path, name.as_str(), node);
        }

        // Reverse so the first key's subtree is popped first.
        for (name, node) in level.iter().rev() {
            if node.has_children() {
                let mut child_path = path.clone();
                child_path.push(name.as_str());
                stack.push((child_path, &node.child_tables));
            }
        }
    }
}

/// Find a table's configuration wherever it appears in the tree.
///
/// The first tree key equal to `table_name` in depth-first order wins; when
/// no key matches, the first node whose `relationName` matches is used.
/// Duplicate positions are reported by [`resolve_config`].
pub fn find_config<'a>(
    table_name: &str,
    tree: Option<&'a ChildTableTree>,
) -> Option<&'a ChildTableNode> {
    resolve_config(table_name, tree).found.map(|m| m.node)
}

/// Like [`find_config`] but reports where the match sits and every other
/// position the same table name occupies.
pub fn resolve_config<'a>(table_name: &str, tree: Option<&'a ChildTableTree>) -> Resolution<'a> {
    let Some(tree) = tree else {
        return Resolution::default();
    };

    let mut by_name: Vec<ConfigMatch<'a>> = Vec::new();
    let mut by_relation: Option<ConfigMatch<'a>> = None;

    walk(tree, |path, name, node| {
        if name == table_name {
            by_name.push(ConfigMatch {
                name,
                node,
                path: path.to_vec(),
                kind: MatchKind::TableName,
            });
        } else if by_relation.is_none() && node.relation_name.as_deref() == Some(table_name) {
            by_relation = Some(ConfigMatch {
                name,
                node,
                path: path.to_vec(),
                kind: MatchKind::RelationName,
            });
        }
    });

    if by_name.is_empty() {
        return Resolution {
            found: by_relation,
            shadowed: Vec::new(),
        };
    }

    let found = by_name.remove(0);
    if !by_name.is_empty() {
        tracing::debug!(
            "Table '{}' is configured at {} positions; using {:?}, ignoring {:?}",
            table_name,
            by_name.len() + 1,
            found.path,
            by_name.iter().map(|m| &m.path).collect::<Vec<_>>()
        );
    }

    Resolution {
        found: Some(found),
        shadowed: by_name,
    }
}

/// Table names that appear at more than one position in the tree, in the
/// order they are first met.
pub fn duplicate_table_names(tree: &ChildTableTree) -> Vec<String> {
    let mut seen: Vec<(&str, usize)> = Vec::new();
    walk(tree, |_, name, _| match seen.iter_mut().find(|(n, _)| *n == name) {
        Some((_, count)) => *count += 1,
        None => seen.push((name, 1)),
    });

    seen.into_iter()
        .filter(|(_, count)| *count > 1)
        .map(|(name, _)| name.to_string())
        .collect()
}

/// Child tables of `tree` that apply to `record`.
///
/// An entry applies when the record carries the field named by its
/// `relationKeyTo`; a present `null` still counts. Entries without a
/// `relationKeyTo` are kept so that activating them surfaces the
/// configuration error instead of the table silently disappearing.
/// Server order is preserved.
pub fn applicable_children(record: &Record, tree: Option<&ChildTableTree>) -> ChildTableTree {
    let Some(tree) = tree else {
        return ChildTableTree::new();
    };

    tree.iter()
        .filter(|(_, node)| match node.relation_key_to.as_deref() {
            Some(key) => record.contains_key(key),
            None => true,
        })
        .map(|(name, node)| (name.clone(), node.clone()))
        .collect()
}
