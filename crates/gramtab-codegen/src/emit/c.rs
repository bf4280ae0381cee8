//! The C back-end: renders a [`Table`] as a header/source pair.

use crate::table::names::GENERIC_TAG;
use crate::table::{tb, NodeClass, Payload, Table, TermType};

use super::{c_escape, guard_ident, include_base, symbol_prefix};

const FILE_COMMENT: &str = "/* Generated by gramtabc from an EBNF grammar. Do not edit. */\n";

/// Render `<stem>.h` and `<stem>.c` contents.
pub fn emit_c(table: &Table, stem: &str) -> (String, String) {
    let base = include_base(stem);
    let sym = symbol_prefix(stem);
    (emit_header(table, base, &sym), emit_source(table, base, &sym))
}

fn emit_header(table: &Table, base: &str, sym: &str) -> String {
    let guard = guard_ident(&format!("{base}.h"));
    let mut out = String::new();
    out.push_str(FILE_COMMENT);
    out.push('\n');
    out.push_str(&format!("#ifndef {guard}\n#define {guard} 1\n\n"));

    out.push_str("/* Coarse row category. */\n");
    emit_enum(
        &mut out,
        "nodeclass_t",
        NodeClass::ALL.iter().map(|c| c.name()),
    );

    out.push_str("/* Kind of terminal payload. */\n");
    emit_enum(
        &mut out,
        "terminaltype_t",
        TermType::ALL.iter().map(|t| t.name()),
    );

    out.push_str("/* Per-node tags; _NT_GENERIC covers structural nodes. */\n");
    emit_enum(
        &mut out,
        "nodetype_t",
        std::iter::once(GENERIC_TAG).chain(table.node_types.iter().map(String::as_str)),
    );

    out.push_str("/* Encoding of binary terminal payload bytes. */\n");
    for (name, value) in tb::CONSTANTS {
        out.push_str(&format!("#define {name:<10} 0x{value:02x}\n"));
    }
    out.push('\n');

    out.push_str(concat!(
        "typedef struct {\n",
        "    nodeclass_t    nodeClass;\n",
        "    nodetype_t     nodeType;\n",
        "    terminaltype_t termType;\n",
        "    const char*    text;\n",
        "    int            numBranches;\n",
        "    int            branches;\n",
        "} parsingnode_t;\n\n",
    ));

    out.push_str(&format!(
        "extern const int {sym}_branches[{}];\n",
        table.branch_total
    ));
    out.push_str(&format!(
        "extern const parsingnode_t {sym}_parsingTable[{}];\n\n",
        table.rows.len()
    ));
    out.push_str(&format!("#endif /* {guard} */\n"));
    out
}

fn emit_source(table: &Table, base: &str, sym: &str) -> String {
    let mut out = String::new();
    out.push_str(FILE_COMMENT);
    out.push('\n');
    out.push_str(&format!("#include \"{base}.h\"\n\n"));

    out.push_str(&format!(
        "const int {sym}_branches[{}] = {{\n",
        table.branch_total
    ));
    for row in table.rows.iter().filter(|r| !r.branches.is_empty()) {
        out.push_str(&format!("    /* {} */", row.export_ident));
        for slot in &row.branches {
            out.push_str(&format!(" {}", slot.value()));
            if let Some(comment) = slot.comment() {
                out.push_str(&format!(" /* {comment} */"));
            }
            out.push(',');
        }
        out.push('\n');
    }
    out.push_str("};\n\n");

    out.push_str(&format!(
        "const parsingnode_t {sym}_parsingTable[{}] = {{\n",
        table.rows.len()
    ));
    for row in &table.rows {
        out.push_str(&format!("    /* {}: {} */\n", row.id, row.export_ident));
        let text = match &row.payload {
            Payload::None => "0".to_string(),
            Payload::Text(bytes) | Payload::Data(bytes) => format!("\"{}\"", c_escape(bytes)),
            Payload::Field(byte) => format!("\"{}\"", c_escape(&[*byte])),
        };
        out.push_str(&format!(
            "    {{ {}, {}, {}, {}, {}, {} }},\n",
            row.class.name(),
            row.node_type,
            row.term_type.name(),
            text,
            row.branches.len(),
            row.branches_ix.map_or(-1, |ix| ix as i32),
        ));
    }
    out.push_str("};\n");
    out
}

/// Write a `typedef enum` with one enumerator per line.
fn emit_enum<'a>(out: &mut String, name: &str, entries: impl Iterator<Item = &'a str>) {
    let entries: Vec<&str> = entries.collect();
    out.push_str("typedef enum {\n");
    for (ix, entry) in entries.iter().enumerate() {
        out.push_str("    ");
        out.push_str(entry);
        if ix + 1 < entries.len() {
            out.push(',');
        }
        out.push('\n');
    }
    out.push_str(&format!("}} {name};\n\n"));
}
