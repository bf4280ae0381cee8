//! The NASM back-end: renders a [`Table`] as an include/source pair.
//!
//! The include file mirrors the C header with `equ` constants and a
//! `struc` whose layout (including explicit padding) matches the C
//! struct on x86-64. The source file puts the terminal text bodies, the
//! branch pool, and the table rows in a read-only data section.

use crate::table::names::GENERIC_TAG;
use crate::table::{tb, NodeClass, Payload, Row, Table, TermType};

use super::{guard_ident, include_base, symbol_prefix};

const FILE_COMMENT: &str = "; Generated by gramtabc from an EBNF grammar. Do not edit.\n";

/// Render `<stem>.inc` and `<stem>.nasm` contents.
pub fn emit_nasm(table: &Table, stem: &str) -> (String, String) {
    let base = include_base(stem);
    let sym = symbol_prefix(stem);
    (emit_include(table, base), emit_body(table, base, &sym))
}

fn emit_include(table: &Table, base: &str) -> String {
    let guard = guard_ident(&format!("{base}.inc"));
    let mut out = String::new();
    out.push_str(FILE_COMMENT);
    out.push('\n');
    out.push_str(&format!("%ifndef {guard}\n%define {guard} 1\n\n"));

    out.push_str("; Coarse row category.\n");
    for (value, class) in NodeClass::ALL.iter().enumerate() {
        out.push_str(&equ_line(class.name(), &value.to_string()));
    }
    out.push('\n');

    out.push_str("; Kind of terminal payload.\n");
    for (value, term) in TermType::ALL.iter().enumerate() {
        out.push_str(&equ_line(term.name(), &value.to_string()));
    }
    out.push('\n');

    out.push_str("; Per-node tags; _NT_GENERIC covers structural nodes.\n");
    out.push_str(&equ_line(GENERIC_TAG, "0"));
    for (ix, tag) in table.node_types.iter().enumerate() {
        out.push_str(&equ_line(tag, &(ix + 1).to_string()));
    }
    out.push('\n');

    out.push_str("; Encoding of binary terminal payload bytes.\n");
    for (name, value) in tb::CONSTANTS {
        out.push_str(&equ_line(name, &format!("0x{value:02x}")));
    }
    out.push('\n');

    out.push_str(concat!(
        "; Row layout; matches the C back-end's parsingnode_t on x86-64.\n",
        "struc parsingnode\n",
        "    .nodeClass:   resd 1\n",
        "    .nodeType:    resd 1\n",
        "    .termType:    resd 1\n",
        "    .pad:         resd 1\n",
        "    .text:        resq 1\n",
        "    .numBranches: resd 1\n",
        "    .branches:    resd 1\n",
        "endstruc\n\n",
    ));

    out.push_str("%endif\n");
    out
}

fn emit_body(table: &Table, base: &str, sym: &str) -> String {
    let mut out = String::new();
    out.push_str(FILE_COMMENT);
    out.push('\n');
    out.push_str(&format!("%include \"{base}.inc\"\n\n"));
    out.push_str("section .rodata\n\n");
    out.push_str(&format!("global {sym}_branches\nglobal {sym}_parsingTable\n\n"));

    let texts: Vec<&Row> = table
        .rows
        .iter()
        .filter(|r| r.payload != Payload::None)
        .collect();
    if !texts.is_empty() {
        out.push_str("; Terminal text bodies.\n");
        for row in &texts {
            let label = format!("{}_text", row.export_ident);
            match &row.payload {
                Payload::Text(bytes) => {
                    out.push_str(&format!("{label}: db {}, 0\n", quoted_or_hex(bytes)));
                }
                Payload::Data(bytes) => {
                    out.push_str(&format!(
                        "{label}: db TB_DATA, {}, {}\n",
                        bytes.len(),
                        hex_list(bytes)
                    ));
                }
                Payload::Field(byte) => {
                    out.push_str(&format!("{label}: db 0x{byte:02x}\n"));
                }
                Payload::None => unreachable!("filtered above"),
            }
        }
        out.push('\n');
    }

    out.push_str(&format!("; Branch index pool.\n{sym}_branches:\n"));
    for row in table.rows.iter().filter(|r| !r.branches.is_empty()) {
        out.push_str(&format!("    ; {}\n", row.export_ident));
        let values: Vec<String> = row.branches.iter().map(|s| s.value().to_string()).collect();
        let notes: Vec<&str> = row.branches.iter().filter_map(|s| s.comment()).collect();
        if notes.is_empty() {
            out.push_str(&format!("    dd {}\n", values.join(", ")));
        } else {
            out.push_str(&format!(
                "    dd {} ; {}\n",
                values.join(", "),
                notes.join(", ")
            ));
        }
    }
    out.push('\n');

    out.push_str(&format!("; Parsing table rows in id order.\n{sym}_parsingTable:\n"));
    for row in &table.rows {
        let text_ref = if row.payload == Payload::None {
            "0".to_string()
        } else {
            format!("{}_text", row.export_ident)
        };
        out.push_str(&format!("    ; {}: {}\n", row.id, row.export_ident));
        out.push_str("    istruc parsingnode\n");
        out.push_str(&format!(
            "        at parsingnode.nodeClass,   dd {}\n",
            row.class.name()
        ));
        out.push_str(&format!(
            "        at parsingnode.nodeType,    dd {}\n",
            row.node_type
        ));
        out.push_str(&format!(
            "        at parsingnode.termType,    dd {}\n",
            row.term_type.name()
        ));
        out.push_str(&format!("        at parsingnode.text,        dq {text_ref}\n"));
        out.push_str(&format!(
            "        at parsingnode.numBranches, dd {}\n",
            row.branches.len()
        ));
        out.push_str(&format!(
            "        at parsingnode.branches,    dd {}\n",
            row.branches_ix.map_or(-1, |ix| ix as i32)
        ));
        out.push_str("    iend\n");
    }
    out
}

/// One `name equ value` line with the value column aligned.
fn equ_line(name: &str, value: &str) -> String {
    format!("{name:<23} equ {value}\n")
}

/// Quote a string/regex body for a `db` directive, falling back to a
/// hex list when neither quote character is safe.
///
/// NASM quoted strings have no escapes, so a quoting form is safe only
/// when every byte is printable ASCII and the quote character itself
/// does not occur in the body.
fn quoted_or_hex(bytes: &[u8]) -> String {
    let printable = bytes.iter().all(|&b| (0x20..=0x7e).contains(&b));
    if printable && !bytes.contains(&b'\'') {
        format!("'{}'", String::from_utf8_lossy(bytes))
    } else if printable && !bytes.contains(&b'"') {
        format!("\"{}\"", String::from_utf8_lossy(bytes))
    } else {
        hex_list(bytes)
    }
}

/// Comma-separated `0xHH` rendering of a byte run.
fn hex_list(bytes: &[u8]) -> String {
    bytes
        .iter()
        .map(|b| format!("0x{b:02x}"))
        .collect::<Vec<_>>()
        .join(", ")
}
