use std::path::PathBuf;

use standoff_nesting::{NestingTable, ViolationReason};
use standoff_parser::{check, Annotation, CheckError, Parser};

fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

fn read(name: &str) -> String {
    std::fs::read_to_string(fixture(name)).unwrap()
}

fn table() -> NestingTable {
    NestingTable::from_path(fixture("nesting.toml")).unwrap()
}

#[test]
fn valid_document_parses_every_line() {
    let doc = Parser::parse(&read("valid.ann")).unwrap();
    assert_eq!(doc.lines.len(), 7);
    assert!(matches!(doc.lines[3].annotation, Annotation::Event { .. }));
    assert!(matches!(doc.lines[6].annotation, Annotation::Note { .. }));
}

#[test]
fn valid_document_has_no_violations() {
    assert!(check(&read("valid.ann"), &table()).unwrap().is_empty());
}

#[test]
fn freetext_survives_in_records() {
    let doc = Parser::parse(&read("valid.ann")).unwrap();
    let Annotation::Note { text, .. } = &doc.lines[6].annotation else {
        panic!("expected note");
    };
    assert_eq!(text, "check: organ or tissue?");
}

#[test]
fn violations_are_reported_per_edge() {
    let violations = check(&read("violations.ann"), &table()).unwrap();
    let messages: Vec<String> = violations.iter().map(|v| v.to_string()).collect();
    assert_eq!(
        messages,
        vec![
            "Cell_type T2 may not nest inside Organism T1",
            "Organism T4 may not nest inside Cell_type T3",
            "Tissue T5 may not nest inside Organism T4",
        ]
    );
    assert!(violations
        .iter()
        .all(|v| v.reason == ViolationReason::NestingNotAllowed));
}

#[test]
fn lexical_error_aborts_check() {
    let err = check(&read("lexical_error.ann"), &table()).unwrap_err();
    let CheckError::Parse(err) = err else {
        panic!("expected parse error");
    };
    assert_eq!((err.line, err.column), (2, 4));
}
