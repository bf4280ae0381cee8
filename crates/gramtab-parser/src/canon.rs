//! Literal deduplication: rewrites the parse tree into a shared DAG.
//!
//! A single depth-first traversal inspects every branch slot. Slots that
//! point at a `StrLit` or `Regex` node whose text already appeared on an
//! earlier node of the same kind are redirected to that earlier node; the
//! survivor's reference count grows and the duplicate is released. The
//! lookup is a linear scan over the arena, which is fine for the targeted
//! scale of grammars (hundreds of productions).

use rustc_hash::FxHashSet;

use crate::tree::{NodeId, NodeKind, Tree};

/// Deduplicate equal `StrLit`/`Regex` nodes across the whole tree.
pub fn canonicalize(tree: &mut Tree) {
    let Some(root) = tree.root() else {
        return;
    };
    let mut visited = FxHashSet::default();
    visit(tree, root, &mut visited);
}

fn visit(tree: &mut Tree, id: NodeId, visited: &mut FxHashSet<NodeId>) {
    if !visited.insert(id) {
        return;
    }
    for ix in 0..tree.node(id).branches.len() {
        let mut child = tree.node(id).branches[ix];
        if matches!(tree.node(child).kind, NodeKind::StrLit | NodeKind::Regex) {
            if let Some(survivor) = earlier_equal(tree, child) {
                tree.bump_ref(survivor);
                tree.set_branch(id, ix, survivor);
                tree.release(child);
                child = survivor;
            }
        }
        visit(tree, child, visited);
    }
}

/// The lowest-index live node equal in kind and text to `id`, if any
/// precedes it in the arena.
fn earlier_equal(tree: &Tree, id: NodeId) -> Option<NodeId> {
    let node = tree.node(id);
    tree.ids().take_while(|&other| other != id).find(|&other| {
        let candidate = tree.node(other);
        candidate.refcnt > 0 && candidate.kind == node.kind && candidate.text == node.text
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse;

    /// Count live nodes of a kind/text pair.
    fn count_literals(tree: &Tree, kind: NodeKind, text: &str) -> usize {
        tree.ids()
            .filter(|&id| {
                let n = tree.node(id);
                n.refcnt > 0 && n.kind == kind && n.text.as_deref() == Some(text)
            })
            .count()
    }

    #[test]
    fn duplicate_string_literals_are_shared() {
        let mut tree = parse("a := 'x' . b := 'x' .").unwrap();
        canonicalize(&mut tree);
        assert_eq!(count_literals(&tree, NodeKind::StrLit, "x"), 1);
        let survivor = tree
            .ids()
            .find(|&id| tree.node(id).kind == NodeKind::StrLit && tree.is_live(id))
            .unwrap();
        assert_eq!(tree.node(survivor).refcnt, 2);
    }

    #[test]
    fn duplicate_regexes_are_shared() {
        let mut tree = parse("a := /[0-9]+/ . b := /[0-9]+/ .").unwrap();
        canonicalize(&mut tree);
        assert_eq!(count_literals(&tree, NodeKind::Regex, "[0-9]+"), 1);
    }

    #[test]
    fn string_and_regex_with_equal_text_stay_distinct() {
        let mut tree = parse("a := 'x' . b := /x/ .").unwrap();
        canonicalize(&mut tree);
        assert_eq!(count_literals(&tree, NodeKind::StrLit, "x"), 1);
        assert_eq!(count_literals(&tree, NodeKind::Regex, "x"), 1);
    }

    #[test]
    fn canonicalizer_is_identity_without_duplicates() {
        let mut tree = parse("a := 'x' 'y' . b := 'z' .").unwrap();
        let before: Vec<_> = tree
            .ids()
            .map(|id| (tree.node(id).kind, tree.node(id).refcnt))
            .collect();
        canonicalize(&mut tree);
        let after: Vec<_> = tree
            .ids()
            .map(|id| (tree.node(id).kind, tree.node(id).refcnt))
            .collect();
        assert_eq!(before, after);
    }

    #[test]
    fn refcnt_matches_incoming_slots() {
        let mut tree = parse("a := 'x' 'x' . b := 'x' .").unwrap();
        canonicalize(&mut tree);
        // One slot per reference, plus nothing else: every live node's
        // refcnt equals its in-degree (the root's owner counts as one).
        let root = tree.root().unwrap();
        for id in tree.ids().filter(|&id| tree.is_live(id)) {
            let incoming: u32 = tree
                .ids()
                .filter(|&p| tree.is_live(p))
                .map(|p| tree.node(p).branches.iter().filter(|&&c| c == id).count() as u32)
                .sum();
            let expected = if id == root { 1 } else { incoming };
            assert_eq!(tree.node(id).refcnt, expected, "node {:?}", id);
        }
    }

    #[test]
    fn shared_duplicate_is_protected_by_its_count() {
        // 'x' appears three times; the second and third occurrences are
        // redirected one by one, and the survivor ends at refcnt 3.
        let mut tree = parse("a := 'x' | 'x' | 'x' .").unwrap();
        canonicalize(&mut tree);
        assert_eq!(count_literals(&tree, NodeKind::StrLit, "x"), 1);
        let survivor = tree
            .ids()
            .find(|&id| tree.node(id).kind == NodeKind::StrLit && tree.is_live(id))
            .unwrap();
        assert_eq!(tree.node(survivor).refcnt, 3);
    }
}
