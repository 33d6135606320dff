//! Tree expansion - depth-first walk of a part's multi-level structure

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::core::index::RelationIndex;

/// One emitted part in an expanded tree
///
/// `depth` counts ancestor edges below the queried root, so the root's
/// direct children sit at depth 0. Deduplication keys on `part` alone.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TreeNode {
    pub depth: usize,
    pub part: String,
    pub name: String,
    pub description: String,
    pub source: String,
}

impl TreeNode {
    fn from_index(index: &RelationIndex, part: &str, depth: usize) -> Self {
        match index.attributes(part) {
            Some(attrs) => Self {
                depth,
                part: part.to_string(),
                name: attrs.name.clone(),
                description: attrs.description.clone(),
                source: attrs.source_id.clone(),
            },
            None => Self {
                depth,
                part: part.to_string(),
                name: String::new(),
                description: String::new(),
                source: index.label(),
            },
        }
    }
}

/// Pending siblings at one level of the walk
struct Frame<'a> {
    children: &'a [String],
    next: usize,
    depth: usize,
}

/// Expand the structure below `root` in pre-order
///
/// The root itself is never emitted. A single `visited` set spans the
/// whole walk, so a part reachable by several paths appears only at its
/// first position and cycles terminate at the first repeated part.
/// The walk uses an explicit stack, so deep trees cannot exhaust the
/// call stack.
pub fn expand(index: &RelationIndex, root: &str) -> Vec<TreeNode> {
    let mut nodes = Vec::new();
    let mut visited: HashSet<&str> = HashSet::new();
    visited.insert(root);

    let mut stack = vec![Frame {
        children: index.children(root),
        next: 0,
        depth: 0,
    }];

    while let Some(frame) = stack.last_mut() {
        let children = frame.children;
        let Some(child) = children.get(frame.next) else {
            stack.pop();
            continue;
        };
        frame.next += 1;
        let depth = frame.depth;

        let child = child.trim();
        if child.is_empty() || !visited.insert(child) {
            continue;
        }

        nodes.push(TreeNode::from_index(index, child, depth));

        let grandchildren = index.children(child);
        if !grandchildren.is_empty() {
            stack.push(Frame {
                children: grandchildren,
                next: 0,
                depth: depth + 1,
            });
        }
    }

    nodes
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::relation::RelationTable;

    fn index_of(edges: &[(&str, &str)]) -> RelationIndex {
        let mut table = RelationTable::new("s1");
        for (parent, child) in edges {
            table.push_edge(parent, "", child, &format!("{} name", child), "");
        }
        RelationIndex::build([&table])
    }

    fn shape(nodes: &[TreeNode]) -> Vec<(usize, &str)> {
        nodes.iter().map(|n| (n.depth, n.part.as_str())).collect()
    }

    #[test]
    fn test_depth_counts_from_root_children() {
        let index = index_of(&[("A", "B"), ("B", "C")]);
        let nodes = expand(&index, "A");
        assert_eq!(shape(&nodes), vec![(0, "B"), (1, "C")]);
        assert_eq!(nodes[0].name, "B name");
        assert_eq!(nodes[0].source, "s1");
    }

    #[test]
    fn test_two_node_cycle_terminates() {
        let index = index_of(&[("A", "B"), ("B", "A")]);
        assert_eq!(shape(&expand(&index, "A")), vec![(0, "B")]);
    }

    #[test]
    fn test_self_loop_is_ignored() {
        let index = index_of(&[("A", "A"), ("A", "B")]);
        assert_eq!(shape(&expand(&index, "A")), vec![(0, "B")]);
    }

    #[test]
    fn test_shared_part_emitted_once_at_first_position() {
        let index = index_of(&[("A", "B"), ("A", "C"), ("B", "D"), ("C", "D")]);
        assert_eq!(
            shape(&expand(&index, "A")),
            vec![(0, "B"), (1, "D"), (0, "C")]
        );
    }

    #[test]
    fn test_subtree_is_finished_before_next_sibling() {
        let index = index_of(&[
            ("A", "B"),
            ("A", "E"),
            ("B", "C"),
            ("C", "D"),
            ("E", "F"),
        ]);
        assert_eq!(
            shape(&expand(&index, "A")),
            vec![(0, "B"), (1, "C"), (2, "D"), (0, "E"), (1, "F")]
        );
    }

    #[test]
    fn test_duplicate_rows_emit_once() {
        let index = index_of(&[("A", "B"), ("A", "B")]);
        assert_eq!(shape(&expand(&index, "A")), vec![(0, "B")]);
    }

    #[test]
    fn test_root_without_children_is_empty() {
        let index = index_of(&[("A", "B")]);
        assert!(expand(&index, "B").is_empty());
        assert!(expand(&index, "missing").is_empty());
    }

    #[test]
    fn test_deep_chain_does_not_overflow() {
        let mut table = RelationTable::new("deep");
        for i in 0..50_000 {
            table.push_edge(&format!("P{}", i), "", &format!("P{}", i + 1), "", "");
        }
        let index = RelationIndex::build([&table]);
        let nodes = expand(&index, "P0");
        assert_eq!(nodes.len(), 50_000);
        assert_eq!(nodes.last().unwrap().depth, 49_999);
    }

    #[test]
    fn test_expansion_is_deterministic() {
        let index = index_of(&[("A", "B"), ("A", "C"), ("C", "B"), ("B", "D")]);
        assert_eq!(expand(&index, "A"), expand(&index, "A"));
    }
}
