//! Stand-off Parser
//!
//! Assembles the token stream of a stand-off document into typed
//! annotation records, one per line: text-bound spans, events, relations,
//! attributes, normalizations, notes and equivalence sets.
//! [`Document::text_spans`] feeds the nesting validator; [`check`] runs the
//! whole pipeline.
//!
//! ```text
//! source → Scanner → Parser → Document → ContainmentTree → validate() → Vec<Violation>
//! ```

pub mod ast;
pub mod parser;

pub use ast::{Annotation, AnnotationLine, Argument, Document, Reference};
pub use parser::Parser;

use std::collections::BTreeSet;

use standoff_lexer::LexerError;
use standoff_nesting::{ContainmentTree, NestingError, NestingTable, Violation};
use tracing::{debug, trace};

/// Parser error with position information.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("Parse error at line {line}, column {column}: {message}")]
pub struct ParseError {
    pub message: String,
    pub line: usize,
    pub column: usize,
}

impl From<LexerError> for ParseError {
    fn from(e: LexerError) -> Self {
        ParseError {
            message: e.kind.to_string(),
            line: e.line,
            column: e.column,
        }
    }
}

/// Failure to get a document as far as nesting validation.
#[derive(Debug, thiserror::Error)]
pub enum CheckError {
    #[error(transparent)]
    Parse(#[from] ParseError),
    #[error(transparent)]
    Nesting(#[from] NestingError),
}

/// Parse a document, build the containment tree of its text-bound spans
/// and validate it against `table`.
pub fn check(source: &str, table: &NestingTable) -> Result<Vec<Violation>, CheckError> {
    let document = Parser::parse(source)?;
    let tree = ContainmentTree::from_spans(document.text_spans()?);

    let defaulted: BTreeSet<&str> = tree
        .spans()
        .iter()
        .enumerate()
        .filter(|(i, span)| {
            tree.children(*i).next().is_some() && !table.has_entry(&span.entity_type)
        })
        .map(|(_, span)| span.entity_type.as_str())
        .collect();
    if !defaulted.is_empty() {
        trace!(types = ?defaulted, "containers checked against default entry");
    }
    debug!(roots = tree.roots().count(), "checking containment tree");

    Ok(standoff_nesting::validate(&tree, table))
}

#[cfg(test)]
mod tests {
    use super::*;
    use standoff_nesting::EntityType;

    fn ty(name: &str) -> EntityType {
        EntityType::new(name).unwrap()
    }

    #[test]
    fn test_check_reports_violations() {
        let table = NestingTable::new([]).allow(ty("Cell_type"), [ty("Tissue")]);
        let violations = check(
            "T1\tCell_type 0 20\tcells\nT2\tTissue 5 10\ttissue\nT3\tOrganism 30 40\tmice\nT4\tTissue 31 35\tskin\n",
            &table,
        )
        .unwrap();
        assert_eq!(violations.len(), 1);
        assert_eq!(
            violations[0].to_string(),
            "Tissue T4 may not nest inside Organism T3"
        );
    }

    #[test]
    fn test_check_propagates_parse_errors() {
        let err = check("T1\tprotein 0 5\tx\n", &NestingTable::default()).unwrap_err();
        assert!(matches!(err, CheckError::Parse(ParseError { line: 1, column: 4, .. })));
    }

    #[test]
    fn test_check_rejects_duplicate_ids() {
        let err = check(
            "T1\tOrganism 0 10\tmice\nT1\tTissue 2 4\tskin\n",
            &NestingTable::default(),
        )
        .unwrap_err();
        assert_eq!(
            err.to_string(),
            "Parse error at line 2, column 1: Duplicate annotation id T1"
        );
    }
}
