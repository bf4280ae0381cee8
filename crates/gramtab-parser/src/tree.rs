//! The syntax tree the front-end builds and the later passes annotate.
//!
//! Nodes live in an append-only arena owned by [`Tree`] and refer to each
//! other through [`NodeId`] index handles. Sharing (after canonicalization
//! the tree is a DAG) is tracked with an explicit `refcnt` per node:
//! created at 1, incremented when the canonicalizer redirects a duplicate
//! slot, decremented by [`Tree::release`], which frees the node (marking
//! its arena slot dead and releasing its branches) only at zero.

use std::fmt;

// ── NodeId ────────────────────────────────────────────────────────────

/// Index handle into the tree's node arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(u32);

impl NodeId {
    /// Arena slot index.
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

// ── NodeKind ──────────────────────────────────────────────────────────

/// Every kind of node in the syntax tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    /// Dead arena slot (a released node). Never reachable from the root.
    End,
    /// A not-yet-resolved reference to a production, or the parameter
    /// name of a binary field. Not exportable; resolved by name during
    /// table construction.
    Ident,
    /// A quoted string terminal. `text` is the body without quotes.
    StrLit,
    /// A regex terminal. `text` is the body without the outer slashes.
    Regex,
    /// A fixed byte run. `text` is an even-length lowercase hex string.
    BinData,
    /// A sized binary field with no parameter. `text` is the width keyword.
    BinField,
    /// A sized binary field whose parameter receives the read count.
    BinFieldCount,
    /// A sized binary field repeated by its parameter.
    BinFieldTimes,
    /// `[ ... ]`, an optional group.
    BracketExpr,
    /// `{ ... }`, an optional-repetitive group.
    BraceExpr,
    /// A sequence of two or more sub-expressions (single children are
    /// elided by the parser).
    AndExpr,
    /// An alternation of two or more sub-expressions (single children
    /// are elided by the parser).
    OrExpr,
    /// Expression wrapper kind. Parenthesized groups return their inner
    /// node directly, so the parser never materializes one.
    Expr,
    /// A grammar production. `text` is the declared name.
    Production,
    /// The root node holding all productions.
    ProdList,
}

impl NodeKind {
    /// Uppercase tag used by the pretty-dump and emitted slot comments.
    pub fn label(self) -> &'static str {
        match self {
            NodeKind::End => "T_END",
            NodeKind::Ident => "T_IDENTIFIER",
            NodeKind::StrLit => "T_STRLIT",
            NodeKind::Regex => "T_REGEX",
            NodeKind::BinData => "T_BINDATA",
            NodeKind::BinField => "T_BINFIELD",
            NodeKind::BinFieldCount => "T_BINFIELD_COUNT",
            NodeKind::BinFieldTimes => "T_BINFIELD_TIMES",
            NodeKind::BracketExpr => "T_BRACKET_EXPR",
            NodeKind::BraceExpr => "T_BRACE_EXPR",
            NodeKind::AndExpr => "T_AND_EXPR",
            NodeKind::OrExpr => "T_OR_EXPR",
            NodeKind::Expr => "T_EXPR",
            NodeKind::Production => "T_PRODUCTION",
            NodeKind::ProdList => "T_PRODLIST",
        }
    }

    /// Whether nodes of this kind receive a row in the parsing table.
    pub fn is_exportable(self) -> bool {
        matches!(
            self,
            NodeKind::Production
                | NodeKind::StrLit
                | NodeKind::Regex
                | NodeKind::BinData
                | NodeKind::BinField
                | NodeKind::BinFieldCount
                | NodeKind::BinFieldTimes
                | NodeKind::AndExpr
                | NodeKind::OrExpr
                | NodeKind::BracketExpr
                | NodeKind::BraceExpr
        )
    }

    /// Whether this kind belongs to the binary-match family, whose
    /// parameter identifiers are placeholders rather than references.
    pub fn is_binary_match(self) -> bool {
        matches!(
            self,
            NodeKind::BinData
                | NodeKind::BinField
                | NodeKind::BinFieldCount
                | NodeKind::BinFieldTimes
        )
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

// ── Node ──────────────────────────────────────────────────────────────

/// A single tree node. The parser fills the first four fields; the layout
/// pass fills the annotation fields; the emitters only read.
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub kind: NodeKind,
    /// Name, literal body, hex string, or width keyword (see `NodeKind`).
    pub text: Option<String>,
    /// Ordered children. Order is semantic.
    pub branches: Vec<NodeId>,
    /// Whether the production was introduced with the `TOKEN` keyword.
    pub token: bool,
    /// Incoming reference count (the root's owner counts as one).
    pub refcnt: u32,
    /// Global ordinal among exportable nodes; assigned by the layout pass.
    pub id: Option<u32>,
    /// Stable symbol name; assigned by the layout pass.
    pub export_ident: Option<String>,
    /// `NT_*` enumeration tag (or `_NT_GENERIC`); assigned by the layout
    /// pass.
    pub node_type: Option<String>,
    /// Offset of this node's branch segment in the flat branch array;
    /// assigned by the layout pass for exportable nodes with branches.
    pub branches_ix: Option<u32>,
}

impl Node {
    fn new(kind: NodeKind, text: Option<String>) -> Self {
        Self {
            kind,
            text,
            branches: Vec::new(),
            token: false,
            refcnt: 1,
            id: None,
            export_ident: None,
            node_type: None,
            branches_ix: None,
        }
    }
}

// ── Tree ──────────────────────────────────────────────────────────────

/// Arena-backed syntax tree (a DAG after canonicalization).
#[derive(Debug, Default)]
pub struct Tree {
    nodes: Vec<Node>,
    root: Option<NodeId>,
}

impl Tree {
    /// Create an empty tree.
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate a new node with `refcnt` 1 and no branches.
    pub fn alloc(&mut self, kind: NodeKind, text: Option<String>) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(Node::new(kind, text));
        id
    }

    /// Set the root node (the `ProdList`).
    pub fn set_root(&mut self, id: NodeId) {
        self.root = Some(id);
    }

    /// The root node, if one was set.
    pub fn root(&self) -> Option<NodeId> {
        self.root
    }

    /// Borrow a node.
    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.index()]
    }

    /// Mutably borrow a node.
    pub fn node_mut(&mut self, id: NodeId) -> &mut Node {
        &mut self.nodes[id.index()]
    }

    /// Append `child` to `parent`'s branches.
    pub fn add_branch(&mut self, parent: NodeId, child: NodeId) {
        self.nodes[parent.index()].branches.push(child);
    }

    /// Overwrite one branch slot. The caller is responsible for the
    /// reference-count bookkeeping of both the old and new child.
    pub fn set_branch(&mut self, parent: NodeId, ix: usize, child: NodeId) {
        self.nodes[parent.index()].branches[ix] = child;
    }

    /// Record one more incoming reference to `id`.
    pub fn bump_ref(&mut self, id: NodeId) {
        self.nodes[id.index()].refcnt += 1;
    }

    /// Drop one incoming reference to `id`; at zero the node's branches
    /// are released in turn and the arena slot is marked dead.
    pub fn release(&mut self, id: NodeId) {
        let node = &mut self.nodes[id.index()];
        debug_assert!(node.refcnt > 0, "release of a dead node");
        node.refcnt -= 1;
        if node.refcnt > 0 {
            return;
        }
        let branches = std::mem::take(&mut node.branches);
        node.kind = NodeKind::End;
        node.text = None;
        for child in branches {
            self.release(child);
        }
    }

    /// Whether the node still holds at least one reference.
    pub fn is_live(&self, id: NodeId) -> bool {
        self.nodes[id.index()].refcnt > 0
    }

    /// Number of arena slots, dead ones included.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether the arena is empty.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// All arena slots in allocation order (dead ones included).
    pub fn ids(&self) -> impl Iterator<Item = NodeId> {
        (0..self.nodes.len() as u32).map(NodeId)
    }

    // ── Pretty-dump ────────────────────────────────────────────────────

    /// Render the productions as an indented tree, one node per line.
    ///
    /// The root `ProdList` itself is not printed, so an empty grammar
    /// dumps as the empty string. Shared nodes are printed under every
    /// parent, annotated with their reference count.
    pub fn dump(&self) -> String {
        let mut out = String::new();
        if let Some(root) = self.root {
            for &prod in &self.node(root).branches {
                self.dump_node(prod, 0, &mut out);
            }
        }
        out
    }

    fn dump_node(&self, id: NodeId, depth: usize, out: &mut String) {
        let node = self.node(id);
        for _ in 0..depth {
            out.push_str("  ");
        }
        out.push_str(node.kind.label());
        if let Some(text) = &node.text {
            match node.kind {
                // Arbitrary byte content is shown escaped and quoted.
                NodeKind::StrLit | NodeKind::Regex => {
                    out.push(' ');
                    out.push_str(&format!("{text:?}"));
                }
                _ => {
                    out.push(' ');
                    out.push_str(text);
                }
            }
        }
        if node.token {
            out.push_str(" (token)");
        }
        if node.refcnt > 1 {
            out.push_str(&format!(" (refs: {})", node.refcnt));
        }
        out.push('\n');
        for &child in &node.branches {
            self.dump_node(child, depth + 1, out);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn alloc_starts_with_one_reference() {
        let mut tree = Tree::new();
        let id = tree.alloc(NodeKind::StrLit, Some("x".into()));
        assert_eq!(tree.node(id).refcnt, 1);
        assert!(tree.is_live(id));
    }

    #[test]
    fn release_frees_at_zero_and_cascades() {
        let mut tree = Tree::new();
        let parent = tree.alloc(NodeKind::AndExpr, None);
        let child = tree.alloc(NodeKind::StrLit, Some("x".into()));
        tree.add_branch(parent, child);
        tree.release(parent);
        assert!(!tree.is_live(parent));
        assert!(!tree.is_live(child));
        assert_eq!(tree.node(parent).kind, NodeKind::End);
        assert_eq!(tree.node(child).kind, NodeKind::End);
    }

    #[test]
    fn shared_child_survives_one_release() {
        let mut tree = Tree::new();
        let a = tree.alloc(NodeKind::Production, Some("a".into()));
        let b = tree.alloc(NodeKind::Production, Some("b".into()));
        let lit = tree.alloc(NodeKind::StrLit, Some("x".into()));
        tree.add_branch(a, lit);
        tree.add_branch(b, lit);
        tree.bump_ref(lit);
        tree.release(a);
        assert!(tree.is_live(lit));
        assert_eq!(tree.node(lit).refcnt, 1);
        tree.release(b);
        assert!(!tree.is_live(lit));
    }

    #[test]
    fn exportable_taxonomy() {
        assert!(NodeKind::Production.is_exportable());
        assert!(NodeKind::StrLit.is_exportable());
        assert!(NodeKind::BinFieldTimes.is_exportable());
        assert!(NodeKind::BraceExpr.is_exportable());
        assert!(!NodeKind::Ident.is_exportable());
        assert!(!NodeKind::ProdList.is_exportable());
        assert!(!NodeKind::Expr.is_exportable());
        assert!(!NodeKind::End.is_exportable());
    }

    #[test]
    fn dump_empty_tree_is_empty() {
        let mut tree = Tree::new();
        let root = tree.alloc(NodeKind::ProdList, None);
        tree.set_root(root);
        assert_eq!(tree.dump(), "");
    }

    #[test]
    fn dump_shows_token_flag_and_refs() {
        let mut tree = Tree::new();
        let root = tree.alloc(NodeKind::ProdList, None);
        tree.set_root(root);
        let prod = tree.alloc(NodeKind::Production, Some("num".into()));
        tree.node_mut(prod).token = true;
        let lit = tree.alloc(NodeKind::StrLit, Some("x".into()));
        tree.add_branch(prod, lit);
        tree.bump_ref(lit);
        tree.add_branch(prod, lit);
        tree.add_branch(root, prod);
        assert_eq!(
            tree.dump(),
            "T_PRODUCTION num (token)\n  T_STRLIT \"x\" (refs: 2)\n  T_STRLIT \"x\" (refs: 2)\n"
        );
    }
}
