//! Name mangling for enumeration tags and export identifiers.

use gramtab_parser::NodeKind;

/// The shared sentinel tag for structural (non-terminal, non-production)
/// rows. Always the first enumerator in the emitted tag enumeration.
pub const GENERIC_TAG: &str = "_NT_GENERIC";

/// Fixed operator strings that get a readable tag instead of a numeric
/// fallback. Any other non-name terminal body becomes `NT_TERMINAL_<id>`.
pub const OPERATOR_LABELS: &[(&str, &str)] = &[
    ("=", "EQ"),
    ("==", "DEQ"),
    ("<>", "NE"),
    ("!=", "CNE"),
    ("<", "LT"),
    (">", "GT"),
    ("<=", "LE"),
    (">=", "GE"),
    ("&", "AND"),
    ("&&", "LOGAND"),
    ("|", "OR"),
    ("||", "LOGOR"),
    ("^", "XOR"),
    ("^^", "LOGXOR"),
    (";", "SEMIC"),
    (",", "COMMA"),
    (":", "COLON"),
    ("(", "LPAREN"),
    (")", "RPAREN"),
    ("[", "LBRACK"),
    ("]", "RBRACK"),
    ("{", "LBRACE"),
    ("}", "RBRACE"),
    ("*", "STAR"),
    ("**", "DBLSTAR"),
    ("/", "SLASH"),
    ("+", "PLUS"),
    ("-", "MINUS"),
    (":=", "ASSIGN"),
    ("::=", "ASSIGN2"),
    ("~=", "APPLY"),
    ("++", "PLUSPLUS"),
    ("--", "MINUSMINUS"),
    ("+=", "PLUSEQ"),
    ("-=", "MINUSEQ"),
    ("*=", "STAREQ"),
    ("/=", "SLASHEQ"),
    ("&=", "ANDEQ"),
    ("|=", "OREQ"),
    ("^=", "XOREQ"),
    ("%", "MODULO"),
    ("%=", "MODULOEQ"),
    (".", "DOT"),
    ("!", "EXCLAM"),
    ("<<", "LSHIFT"),
    (">>", "RSHIFT"),
    ("..", "RANGE"),
    ("...", "ELLIPSIS"),
];

/// Look up the tag label for a fixed operator string.
pub fn operator_label(text: &str) -> Option<&'static str> {
    OPERATOR_LABELS
        .iter()
        .find(|(op, _)| *op == text)
        .map(|(_, label)| *label)
}

/// Whether a terminal body is a bare identifier (`[a-z0-9-]+`).
pub fn is_bare_ident(text: &str) -> bool {
    !text.is_empty()
        && text
            .chars()
            .all(|c| matches!(c, 'a'..='z' | '0'..='9' | '-'))
}

/// Uppercase a name for a tag, mapping every non-alphanumeric to `_`.
pub fn mangle_upper(text: &str) -> String {
    text.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() {
                c.to_ascii_uppercase()
            } else {
                '_'
            }
        })
        .collect()
}

/// Identifier-safe lowercase form of a name (dashes become underscores).
pub fn mangle_ident(text: &str) -> String {
    text.chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect()
}

/// Compute the `NT_*` enumeration tag for an exportable node.
pub fn node_type_tag(kind: NodeKind, text: Option<&str>, id: u32) -> String {
    match kind {
        NodeKind::Production => format!("NT_{}", mangle_upper(text.unwrap_or(""))),
        NodeKind::StrLit | NodeKind::Regex => {
            let text = text.unwrap_or("");
            if is_bare_ident(text) {
                format!("NT_TERMINAL_{}", mangle_upper(text))
            } else if let Some(label) = operator_label(text) {
                format!("NT_TERMINAL_{label}")
            } else {
                format!("NT_TERMINAL_{id}")
            }
        }
        _ => GENERIC_TAG.to_string(),
    }
}

/// Compute the stable export identifier for an exportable node.
pub fn export_ident(kind: NodeKind, text: Option<&str>, id: u32) -> String {
    match kind {
        NodeKind::Production => format!("production_{}", mangle_ident(text.unwrap_or(""))),
        NodeKind::StrLit => format!("string_terminal_{id}"),
        NodeKind::Regex => format!("regex_terminal_{id}"),
        NodeKind::BinData
        | NodeKind::BinField
        | NodeKind::BinFieldCount
        | NodeKind::BinFieldTimes => format!("binary_terminal_{id}"),
        NodeKind::AndExpr => format!("mandatory_expr_{id}"),
        NodeKind::OrExpr => format!("alternative_expr_{id}"),
        NodeKind::BracketExpr => format!("optional_expr_{id}"),
        NodeKind::BraceExpr => format!("optional_repetitive_expr_{id}"),
        _ => unreachable!("only exportable nodes are named"),
    }
}
