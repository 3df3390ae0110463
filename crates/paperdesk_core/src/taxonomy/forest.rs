//! Flat-adjacency-list to tag forest conversion.
//!
//! # Responsibility
//! - Build the arbitrary-depth tag tree served to browsing clients.
//!
//! # Invariants
//! - Root order and each child-list order follow the input sequence order;
//!   callers supply tags pre-sorted by parent then id for stable trees.
//! - Every input tag with a resolvable ancestor chain appears exactly once.
//! - A tag whose parent id is absent, unresolved, or equal to its own id is
//!   promoted to root.

use crate::model::tag::{Tag, TagId};
use serde::Serialize;
use std::collections::HashMap;

/// One node of the rendered tag tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TagTreeNode {
    pub id: TagId,
    pub name: String,
    pub children: Vec<TagTreeNode>,
}

/// Builds the tag forest from a flat tag sequence.
///
/// Two passes: an id index, then a linking pass assigning each tag to its
/// parent's child list or to the root list. Linking is O(n); materialization
/// recurses over tree depth only.
///
/// Longer parent cycles among fully resolvable tags (A -> B -> A) are a
/// data-integrity precondition of the administrative tag editor; such tags
/// reference each other and are reachable from no root, so construction
/// stays total without detecting them.
pub fn build_forest(tags: &[Tag]) -> Vec<TagTreeNode> {
    let mut index: HashMap<TagId, usize> = HashMap::with_capacity(tags.len());
    for (position, tag) in tags.iter().enumerate() {
        index.insert(tag.id, position);
    }

    let mut child_positions: Vec<Vec<usize>> = vec![Vec::new(); tags.len()];
    let mut root_positions: Vec<usize> = Vec::new();

    for (position, tag) in tags.iter().enumerate() {
        let resolved_parent = tag
            .parent_id
            .filter(|parent_id| *parent_id != tag.id)
            .and_then(|parent_id| index.get(&parent_id).copied());
        match resolved_parent {
            Some(parent_position) => child_positions[parent_position].push(position),
            None => root_positions.push(position),
        }
    }

    root_positions
        .into_iter()
        .map(|position| materialize(tags, &child_positions, position))
        .collect()
}

fn materialize(tags: &[Tag], child_positions: &[Vec<usize>], position: usize) -> TagTreeNode {
    let tag = &tags[position];
    TagTreeNode {
        id: tag.id,
        name: tag.name.clone(),
        children: child_positions[position]
            .iter()
            .map(|child| materialize(tags, child_positions, *child))
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::{build_forest, TagTreeNode};
    use crate::model::tag::Tag;

    fn node_count(nodes: &[TagTreeNode]) -> usize {
        nodes
            .iter()
            .map(|node| 1 + node_count(&node.children))
            .sum()
    }

    #[test]
    fn builds_nested_tree_from_flat_rows() {
        let tags = vec![
            Tag::new(1, "Computer Science", None),
            Tag::new(4, "Mathematics", None),
            Tag::new(2, "Artificial Intelligence", Some(1)),
            Tag::new(3, "Machine Learning", Some(2)),
        ];

        let forest = build_forest(&tags);
        assert_eq!(forest.len(), 2);
        assert_eq!(forest[0].id, 1);
        assert_eq!(forest[1].id, 4);
        assert_eq!(forest[0].children[0].id, 2);
        assert_eq!(forest[0].children[0].children[0].id, 3);
        assert!(forest[1].children.is_empty());
    }

    #[test]
    fn preserves_node_count_for_resolvable_parents() {
        let tags = vec![
            Tag::new(10, "root", None),
            Tag::new(11, "a", Some(10)),
            Tag::new(12, "b", Some(10)),
            Tag::new(13, "a1", Some(11)),
            Tag::new(14, "a2", Some(11)),
        ];
        assert_eq!(node_count(&build_forest(&tags)), tags.len());
    }

    #[test]
    fn orphaned_parent_is_promoted_to_root() {
        let tags = vec![
            Tag::new(1, "known", None),
            Tag::new(2, "orphan", Some(999)),
        ];

        let forest = build_forest(&tags);
        assert_eq!(forest.len(), 2);
        assert_eq!(forest[1].id, 2);
        assert!(forest[1].children.is_empty());
    }

    #[test]
    fn self_parenting_tag_is_promoted_to_root() {
        let tags = vec![Tag::new(7, "loop", Some(7))];

        let forest = build_forest(&tags);
        assert_eq!(forest.len(), 1);
        assert_eq!(forest[0].id, 7);
        assert!(forest[0].children.is_empty());
    }

    #[test]
    fn sibling_order_follows_input_order() {
        let tags = vec![
            Tag::new(1, "root", None),
            Tag::new(3, "second", Some(1)),
            Tag::new(2, "first", Some(1)),
        ];

        let forest = build_forest(&tags);
        let children: Vec<i64> = forest[0].children.iter().map(|node| node.id).collect();
        assert_eq!(children, vec![3, 2]);
    }

    #[test]
    fn identical_input_yields_identical_output() {
        let tags = vec![
            Tag::new(1, "root", None),
            Tag::new(2, "child", Some(1)),
            Tag::new(3, "stray", Some(42)),
        ];
        assert_eq!(build_forest(&tags), build_forest(&tags));
    }
}
