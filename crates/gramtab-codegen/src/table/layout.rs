//! The numbering and layout pass.
//!
//! Two depth-first pre-order walks over the canonicalized DAG. The first
//! assigns each exportable node its global id and `NT_*` tag; the second
//! assigns export identifiers and lays the branch segments out
//! end-to-end in the flat branch array. A shared node is visited only
//! the first time a parent slot holds it, so it receives exactly one id
//! and one table row no matter how often it is referenced.

use gramtab_parser::{NodeId, Tree};
use rustc_hash::FxHashSet;

use super::names::{export_ident, node_type_tag, GENERIC_TAG};

/// Result of the numbering/layout pass.
#[derive(Debug)]
pub struct Layout {
    /// Exportable nodes in id order (`order[i]` has id `i`).
    pub order: Vec<NodeId>,
    /// Collected `NT_*` tags in first-seen order, `_NT_GENERIC` excluded.
    pub node_types: Vec<String>,
    /// Total number of branch-array slots.
    pub branch_total: u32,
}

/// Annotate the tree with ids, tags, export identifiers, and branch
/// offsets, and report the collected totals.
pub fn layout(tree: &mut Tree) -> Layout {
    let mut order = Vec::new();
    let mut node_types = Vec::new();
    let mut seen_tags = FxHashSet::default();
    seen_tags.insert(GENERIC_TAG.to_string());

    if let Some(root) = tree.root() {
        let mut visited = FxHashSet::default();
        enumerate(tree, root, &mut visited, &mut order, &mut node_types, &mut seen_tags);
    }

    let mut branch_total = 0u32;
    if let Some(root) = tree.root() {
        let mut visited = FxHashSet::default();
        name_and_index(tree, root, &mut visited, &mut branch_total);
    }

    Layout {
        order,
        node_types,
        branch_total,
    }
}

/// First walk: ids and enumeration tags.
fn enumerate(
    tree: &mut Tree,
    id: NodeId,
    visited: &mut FxHashSet<NodeId>,
    order: &mut Vec<NodeId>,
    node_types: &mut Vec<String>,
    seen_tags: &mut FxHashSet<String>,
) {
    if !visited.insert(id) {
        return;
    }
    let node = tree.node(id);
    if node.kind.is_exportable() && node.id.is_none() {
        let num = order.len() as u32;
        let tag = node_type_tag(node.kind, node.text.as_deref(), num);
        let node = tree.node_mut(id);
        node.id = Some(num);
        node.node_type = Some(tag.clone());
        order.push(id);
        // A tag that collides with an earlier one is kept on the node
        // but not collected a second time.
        if seen_tags.insert(tag.clone()) {
            node_types.push(tag);
        }
    }
    for ix in 0..tree.node(id).branches.len() {
        let child = tree.node(id).branches[ix];
        enumerate(tree, child, visited, order, node_types, seen_tags);
    }
}

/// Second walk: export identifiers and branch-array offsets.
fn name_and_index(
    tree: &mut Tree,
    id: NodeId,
    visited: &mut FxHashSet<NodeId>,
    branch_total: &mut u32,
) {
    if !visited.insert(id) {
        return;
    }
    let node = tree.node(id);
    if node.kind.is_exportable() && node.export_ident.is_none() {
        let num = node.id.expect("every exportable node is numbered by the first walk");
        let name = export_ident(node.kind, node.text.as_deref(), num);
        let len = node.branches.len() as u32;
        let node = tree.node_mut(id);
        node.export_ident = Some(name);
        if len > 0 {
            node.branches_ix = Some(*branch_total);
            *branch_total += len;
        }
    }
    for ix in 0..tree.node(id).branches.len() {
        let child = tree.node(id).branches[ix];
        name_and_index(tree, child, visited, branch_total);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gramtab_parser::{canonicalize, parse, NodeKind};

    fn lowered(source: &str) -> (Tree, Layout) {
        let mut tree = parse(source).expect("grammar should parse");
        canonicalize(&mut tree);
        let layout = layout(&mut tree);
        (tree, layout)
    }

    #[test]
    fn ids_are_contiguous_in_preorder() {
        let (tree, layout) = lowered("a := 'x' | 'y' .");
        let kinds: Vec<NodeKind> = layout
            .order
            .iter()
            .map(|&id| tree.node(id).kind)
            .collect();
        assert_eq!(
            kinds,
            [
                NodeKind::Production,
                NodeKind::OrExpr,
                NodeKind::StrLit,
                NodeKind::StrLit
            ]
        );
        for (expect, &id) in layout.order.iter().enumerate() {
            assert_eq!(tree.node(id).id, Some(expect as u32));
        }
    }

    #[test]
    fn shared_nodes_get_one_id_and_one_slot_segment() {
        let (tree, layout) = lowered("a := 'x' . b := 'x' .");
        assert_eq!(layout.order.len(), 3);
        let literals: Vec<_> = layout
            .order
            .iter()
            .filter(|&&id| tree.node(id).kind == NodeKind::StrLit)
            .collect();
        assert_eq!(literals.len(), 1);
        // Both production segments, none for the terminal.
        assert_eq!(layout.branch_total, 2);
    }

    #[test]
    fn branch_total_matches_sum_of_branches() {
        let (tree, layout) = lowered("a := 'x' ( 'y' | 'z' ) . b := { a } .");
        let sum: u32 = layout
            .order
            .iter()
            .map(|&id| tree.node(id).branches.len() as u32)
            .sum();
        assert_eq!(layout.branch_total, sum);
    }

    #[test]
    fn branch_segments_are_disjoint_and_packed() {
        let (tree, layout) = lowered("a := 'x' 'y' . b := [ 'z' ] .");
        let mut segments: Vec<(u32, u32)> = layout
            .order
            .iter()
            .filter_map(|&id| {
                let node = tree.node(id);
                node.branches_ix.map(|ix| (ix, node.branches.len() as u32))
            })
            .collect();
        segments.sort_unstable();
        let mut next = 0;
        for (start, len) in segments {
            assert_eq!(start, next);
            next = start + len;
        }
        assert_eq!(next, layout.branch_total);
    }

    #[test]
    fn every_exportable_node_is_fully_annotated() {
        let (tree, layout) = lowered("TOKEN n := /[0-9]+/ . s := n { ',' n } .");
        for &id in &layout.order {
            let node = tree.node(id);
            assert!(node.id.is_some());
            assert!(node.export_ident.as_deref().is_some_and(|s| !s.is_empty()));
            assert!(node.node_type.is_some());
        }
    }

    #[test]
    fn colliding_tags_are_collected_once() {
        let (tree, layout) = lowered("a := 'x' . b := /x/ .");
        let x_tags = layout
            .node_types
            .iter()
            .filter(|t| *t == "NT_TERMINAL_X")
            .count();
        assert_eq!(x_tags, 1);
        // Both nodes still carry the tag.
        let tagged = layout
            .order
            .iter()
            .filter(|&&id| tree.node(id).node_type.as_deref() == Some("NT_TERMINAL_X"))
            .count();
        assert_eq!(tagged, 2);
    }

    #[test]
    fn generic_tag_is_not_collected() {
        let (_, layout) = lowered("a := [ 'x' ] .");
        assert!(!layout.node_types.iter().any(|t| t == GENERIC_TAG));
    }

    #[test]
    fn empty_grammar_has_empty_layout() {
        let (_, layout) = lowered("");
        assert!(layout.order.is_empty());
        assert!(layout.node_types.is_empty());
        assert_eq!(layout.branch_total, 0);
    }
}
