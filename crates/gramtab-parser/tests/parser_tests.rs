//! Parser integration tests using insta snapshots.
//!
//! Each test parses a grammar, canonicalizes it, and snapshots the
//! pretty-dump to verify tree shape, wrapper elision, and sharing.

use gramtab_parser::{canonicalize, parse};

fn parse_and_dump(source: &str) -> String {
    let mut tree = parse(source).expect("grammar should parse");
    canonicalize(&mut tree);
    tree.dump()
}

// ── Shapes ─────────────────────────────────────────────────────────────

#[test]
fn minimal_production() {
    insta::assert_snapshot!(parse_and_dump("a := 'x' ."), @r##"
T_PRODUCTION a
  T_STRLIT "x"
"##);
}

#[test]
fn alternation() {
    insta::assert_snapshot!(parse_and_dump("a := 'x' | 'y' ."), @r##"
T_PRODUCTION a
  T_OR_EXPR
    T_STRLIT "x"
    T_STRLIT "y"
"##);
}

#[test]
fn sequence() {
    insta::assert_snapshot!(parse_and_dump("a := 'x' 'y' ."), @r##"
T_PRODUCTION a
  T_AND_EXPR
    T_STRLIT "x"
    T_STRLIT "y"
"##);
}

#[test]
fn optional_and_repetition_groups() {
    insta::assert_snapshot!(parse_and_dump("a := [ 'x' ] { 'y' } ."), @r##"
T_PRODUCTION a
  T_AND_EXPR
    T_BRACKET_EXPR
      T_STRLIT "x"
    T_BRACE_EXPR
      T_STRLIT "y"
"##);
}

#[test]
fn nested_groups_and_references() {
    insta::assert_snapshot!(parse_and_dump("expr := term { ( '+' | '-' ) term } ."), @r##"
T_PRODUCTION expr
  T_AND_EXPR
    T_IDENTIFIER term
    T_BRACE_EXPR
      T_AND_EXPR
        T_OR_EXPR
          T_STRLIT "+"
          T_STRLIT "-"
        T_IDENTIFIER term
"##);
}

#[test]
fn binary_matches() {
    insta::assert_snapshot!(parse_and_dump("hdr := $cafe BYTE:len WORD*n DWORD ."), @r##"
T_PRODUCTION hdr
  T_AND_EXPR
    T_BINDATA cafe
    T_BINFIELD_COUNT BYTE
      T_IDENTIFIER len
    T_BINFIELD_TIMES WORD
      T_IDENTIFIER n
    T_BINFIELD DWORD
"##);
}

#[test]
fn token_productions_are_flagged() {
    insta::assert_snapshot!(parse_and_dump("TOKEN num := /[0-9]+/ ."), @r##"
T_PRODUCTION num (token)
  T_REGEX "[0-9]+"
"##);
}

#[test]
fn odd_hex_literal_gains_leading_zero() {
    insta::assert_snapshot!(parse_and_dump("a := $abc ."), @r##"
T_PRODUCTION a
  T_BINDATA 0abc
"##);
}

// ── Sharing ────────────────────────────────────────────────────────────

#[test]
fn duplicate_literals_are_shared_across_productions() {
    insta::assert_snapshot!(parse_and_dump("a := 'x' . b := 'x' ."), @r##"
T_PRODUCTION a
  T_STRLIT "x" (refs: 2)
T_PRODUCTION b
  T_STRLIT "x" (refs: 2)
"##);
}

// ── Determinism ────────────────────────────────────────────────────────

#[test]
fn dump_is_deterministic() {
    let source = "a := 'x' | b . b := { 'x' } . TOKEN c := /y+/ .";
    assert_eq!(parse_and_dump(source), parse_and_dump(source));
}

#[test]
fn empty_input_dumps_nothing() {
    assert_eq!(parse_and_dump(""), "");
}
