//! The back-end-agnostic parsing-table model.
//!
//! [`build`] walks an annotated tree in id order and resolves every
//! branch slot once; the C and NASM back-ends only format the resulting
//! [`Table`]. Branch resolution order per slot:
//!
//! 1. a child with an id contributes that id;
//! 2. an `Ident` child naming a declared production contributes the
//!    production's id;
//! 3. an unresolved `Ident` under a binary-match parent contributes the
//!    `-2` placeholder (annotated `T_IDENTIFIER`), without error;
//! 4. any other unresolved `Ident` aborts table construction;
//! 5. any other non-exportable child contributes `-1`, annotated with
//!    its kind label.

pub mod layout;
pub mod names;

use gramtab_parser::{Node, NodeKind, Tree};
use rustc_hash::FxHashMap;

use crate::CodegenError;
use layout::Layout;

// ── Row vocabulary ────────────────────────────────────────────────────

/// Coarse category of a table row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeClass {
    Terminal,
    Production,
    Mandatory,
    Alternative,
    Optional,
    OptionalRepetitive,
}

impl NodeClass {
    /// All classes in their emitted enumeration order.
    pub const ALL: [NodeClass; 6] = [
        NodeClass::Terminal,
        NodeClass::Production,
        NodeClass::Mandatory,
        NodeClass::Alternative,
        NodeClass::Optional,
        NodeClass::OptionalRepetitive,
    ];

    /// The emitted enumerator name.
    pub fn name(self) -> &'static str {
        match self {
            NodeClass::Terminal => "NC_TERMINAL",
            NodeClass::Production => "NC_PRODUCTION",
            NodeClass::Mandatory => "NC_MANDATORY",
            NodeClass::Alternative => "NC_ALTERNATIVE",
            NodeClass::Optional => "NC_OPTIONAL",
            NodeClass::OptionalRepetitive => "NC_OPTIONAL_REPETITIVE",
        }
    }
}

/// Kind of terminal payload a row carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TermType {
    Undef,
    String,
    Regex,
    Binary,
}

impl TermType {
    /// All terminal types in their emitted enumeration order.
    pub const ALL: [TermType; 4] = [
        TermType::Undef,
        TermType::String,
        TermType::Regex,
        TermType::Binary,
    ];

    /// The emitted enumerator name.
    pub fn name(self) -> &'static str {
        match self {
            TermType::Undef => "TT_UNDEF",
            TermType::String => "TT_STRING",
            TermType::Regex => "TT_REGEX",
            TermType::Binary => "TT_BINARY",
        }
    }
}

/// Bit constants encoding binary terminal payload bytes.
pub mod tb {
    pub const UNDEF: u8 = 0x00;
    pub const DATA: u8 = 0x01;
    pub const BYTE: u8 = 0x02;
    pub const WORD: u8 = 0x03;
    pub const DWORD: u8 = 0x04;
    pub const QWORD: u8 = 0x05;
    pub const PARAM: u8 = 0x10;
    pub const WRITE: u8 = 0x20;

    /// Name/value pairs in their emitted order.
    pub const CONSTANTS: [(&str, u8); 8] = [
        ("TB_UNDEF", UNDEF),
        ("TB_DATA", DATA),
        ("TB_BYTE", BYTE),
        ("TB_WORD", WORD),
        ("TB_DWORD", DWORD),
        ("TB_QWORD", QWORD),
        ("TBF_PARAM", PARAM),
        ("TBF_WRITE", WRITE),
    ];
}

/// The terminal payload of a row.
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    /// No terminal text (productions and structural rows).
    None,
    /// String or regex body bytes, emitted as an escaped literal.
    Text(Vec<u8>),
    /// Decoded fixed byte run of a `$hex` match.
    Data(Vec<u8>),
    /// Width-and-flags byte of a sized binary field.
    Field(u8),
}

/// One resolved branch slot.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Slot {
    /// Reference to the row with this id.
    Node(u32),
    /// Non-exportable child; carries its kind label for the emitted
    /// comment.
    Missing(&'static str),
    /// Unresolved binary-field parameter.
    Param,
}

impl Slot {
    /// The integer written into the branch array.
    pub fn value(self) -> i32 {
        match self {
            Slot::Node(id) => id as i32,
            Slot::Missing(_) => -1,
            Slot::Param => -2,
        }
    }

    /// The comment annotating non-reference slots.
    pub fn comment(self) -> Option<&'static str> {
        match self {
            Slot::Node(_) => None,
            Slot::Missing(label) => Some(label),
            Slot::Param => Some("T_IDENTIFIER"),
        }
    }
}

/// One parsing-table row.
#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    pub id: u32,
    pub export_ident: String,
    pub class: NodeClass,
    pub node_type: String,
    pub term_type: TermType,
    pub payload: Payload,
    /// Offset of this row's segment in the branch array, if any.
    pub branches_ix: Option<u32>,
    pub branches: Vec<Slot>,
}

/// The finished table: rows in id order plus the collected tag names.
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    pub rows: Vec<Row>,
    /// `NT_*` tags in first-seen order, `_NT_GENERIC` excluded.
    pub node_types: Vec<String>,
    /// Total branch-array length.
    pub branch_total: u32,
}

// ── Construction ──────────────────────────────────────────────────────

/// Resolve branches and assemble the table from an annotated tree.
pub fn build(tree: &Tree, layout: &Layout) -> Result<Table, CodegenError> {
    let mut productions: FxHashMap<&str, u32> = FxHashMap::default();
    for &id in &layout.order {
        let node = tree.node(id);
        if node.kind == NodeKind::Production {
            if let (Some(name), Some(num)) = (node.text.as_deref(), node.id) {
                productions.entry(name).or_insert(num);
            }
        }
    }

    let mut rows = Vec::with_capacity(layout.order.len());
    for &id in &layout.order {
        let node = tree.node(id);
        let mut branches = Vec::with_capacity(node.branches.len());
        for &child in &node.branches {
            branches.push(resolve(tree.node(child), node.kind, &productions)?);
        }
        rows.push(Row {
            id: node.id.expect("layout numbers every exportable node"),
            export_ident: node
                .export_ident
                .clone()
                .expect("layout names every exportable node"),
            class: node_class(node.kind),
            node_type: node
                .node_type
                .clone()
                .expect("layout tags every exportable node"),
            term_type: term_type(node.kind),
            payload: payload(node),
            branches_ix: node.branches_ix,
            branches,
        });
    }

    Ok(Table {
        rows,
        node_types: layout.node_types.clone(),
        branch_total: layout.branch_total,
    })
}

fn resolve(
    child: &Node,
    parent_kind: NodeKind,
    productions: &FxHashMap<&str, u32>,
) -> Result<Slot, CodegenError> {
    if let Some(id) = child.id {
        return Ok(Slot::Node(id));
    }
    if child.kind == NodeKind::Ident {
        let name = child.text.as_deref().unwrap_or("");
        if let Some(&id) = productions.get(name) {
            return Ok(Slot::Node(id));
        }
        if parent_kind.is_binary_match() {
            return Ok(Slot::Param);
        }
        return Err(CodegenError::UnknownProduction {
            name: name.to_string(),
        });
    }
    Ok(Slot::Missing(child.kind.label()))
}

fn node_class(kind: NodeKind) -> NodeClass {
    match kind {
        NodeKind::Production => NodeClass::Production,
        NodeKind::AndExpr => NodeClass::Mandatory,
        NodeKind::OrExpr => NodeClass::Alternative,
        NodeKind::BracketExpr => NodeClass::Optional,
        NodeKind::BraceExpr => NodeClass::OptionalRepetitive,
        _ => NodeClass::Terminal,
    }
}

fn term_type(kind: NodeKind) -> TermType {
    match kind {
        NodeKind::StrLit => TermType::String,
        NodeKind::Regex => TermType::Regex,
        NodeKind::BinData
        | NodeKind::BinField
        | NodeKind::BinFieldCount
        | NodeKind::BinFieldTimes => TermType::Binary,
        _ => TermType::Undef,
    }
}

fn payload(node: &Node) -> Payload {
    match node.kind {
        NodeKind::StrLit | NodeKind::Regex => {
            Payload::Text(node.text.clone().unwrap_or_default().into_bytes())
        }
        NodeKind::BinData => Payload::Data(decode_hex(node.text.as_deref().unwrap_or(""))),
        NodeKind::BinField | NodeKind::BinFieldCount | NodeKind::BinFieldTimes => {
            let mut byte = match node.text.as_deref() {
                Some("BYTE") => tb::BYTE,
                Some("WORD") => tb::WORD,
                Some("DWORD") => tb::DWORD,
                Some("QWORD") => tb::QWORD,
                _ => tb::UNDEF,
            };
            if !node.branches.is_empty() {
                byte |= tb::PARAM;
            }
            if node.kind == NodeKind::BinFieldCount {
                byte |= tb::WRITE;
            }
            Payload::Field(byte)
        }
        _ => Payload::None,
    }
}

/// Decode an even-length lowercase hex string into bytes.
fn decode_hex(hex: &str) -> Vec<u8> {
    hex.as_bytes()
        .chunks(2)
        .map(|pair| {
            let text = std::str::from_utf8(pair).expect("hex literals are ASCII");
            u8::from_str_radix(text, 16).expect("hex literals are validated by the lexer")
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use gramtab_parser::{canonicalize, parse};

    fn table_for(source: &str) -> Result<Table, CodegenError> {
        let mut tree = parse(source).expect("grammar should parse");
        canonicalize(&mut tree);
        let layout = layout::layout(&mut tree);
        build(&tree, &layout)
    }

    #[test]
    fn minimal_rows() {
        let table = table_for("a := 'x' .").unwrap();
        assert_eq!(table.rows.len(), 2);
        let prod = &table.rows[0];
        assert_eq!(prod.class, NodeClass::Production);
        assert_eq!(prod.node_type, "NT_A");
        assert_eq!(prod.term_type, TermType::Undef);
        assert_eq!(prod.payload, Payload::None);
        assert_eq!(prod.branches, [Slot::Node(1)]);
        assert_eq!(prod.branches_ix, Some(0));
        let term = &table.rows[1];
        assert_eq!(term.class, NodeClass::Terminal);
        assert_eq!(term.node_type, "NT_TERMINAL_X");
        assert_eq!(term.term_type, TermType::String);
        assert_eq!(term.payload, Payload::Text(b"x".to_vec()));
        assert!(term.branches.is_empty());
        assert_eq!(term.branches_ix, None);
    }

    #[test]
    fn identifier_references_resolve_to_production_ids() {
        let table = table_for("a := b . b := 'x' .").unwrap();
        // Rows: a(0), b(1), 'x'(2); a's slot points at b.
        assert_eq!(table.rows[0].branches, [Slot::Node(1)]);
    }

    #[test]
    fn unknown_production_is_an_error() {
        let err = table_for("a := b .").unwrap_err();
        assert_eq!(err.to_string(), "production 'b' not found");
    }

    #[test]
    fn binary_parameter_is_a_placeholder_slot() {
        let table = table_for("a := BYTE:n 'x' .").unwrap();
        let field = table
            .rows
            .iter()
            .find(|r| matches!(r.payload, Payload::Field(_)))
            .unwrap();
        assert_eq!(field.branches, [Slot::Param]);
        assert_eq!(field.branches[0].value(), -2);
        assert_eq!(field.branches[0].comment(), Some("T_IDENTIFIER"));
        assert_eq!(
            field.payload,
            Payload::Field(tb::BYTE | tb::PARAM | tb::WRITE)
        );
    }

    #[test]
    fn binary_parameter_naming_a_production_resolves() {
        let table = table_for("n := 'x' . a := WORD*n .").unwrap();
        let field = table
            .rows
            .iter()
            .find(|r| matches!(r.payload, Payload::Field(_)))
            .unwrap();
        assert_eq!(field.branches, [Slot::Node(0)]);
        assert_eq!(field.payload, Payload::Field(tb::WORD | tb::PARAM));
    }

    #[test]
    fn field_without_parameter_has_bare_width() {
        let table = table_for("a := QWORD .").unwrap();
        assert_eq!(table.rows[1].payload, Payload::Field(tb::QWORD));
        assert!(table.rows[1].branches.is_empty());
    }

    #[test]
    fn bindata_payload_is_decoded() {
        let table = table_for("a := $abc .").unwrap();
        assert_eq!(table.rows[1].payload, Payload::Data(vec![0x0a, 0xbc]));
        assert_eq!(table.rows[1].term_type, TermType::Binary);
    }

    #[test]
    fn slot_values_stay_inside_the_table() {
        let table = table_for("a := 'x' ( b | 'y' ) . b := { 'x' } .").unwrap();
        let n = table.rows.len() as i32;
        for row in &table.rows {
            for slot in &row.branches {
                assert!(slot.value() < n);
                assert!(slot.value() >= -2);
            }
        }
    }

    #[test]
    fn branch_total_equals_emitted_slots() {
        let table = table_for("a := 'x' 'y' . b := [ a ] .").unwrap();
        let emitted: usize = table.rows.iter().map(|r| r.branches.len()).sum();
        assert_eq!(table.branch_total as usize, emitted);
    }

    #[test]
    fn empty_grammar_builds_an_empty_table() {
        let table = table_for("").unwrap();
        assert!(table.rows.is_empty());
        assert!(table.node_types.is_empty());
        assert_eq!(table.branch_total, 0);
    }
}
