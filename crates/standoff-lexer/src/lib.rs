//! Stand-off Lexer
//!
//! Tokenizes lines of the tab-delimited stand-off annotation format
//! (`T1\tProtein 0 5\tabcde`). The first two tab-separated fields are
//! structured and split into identifiers, type names, integers and
//! separators; everything after the second tab is the covered text and is
//! returned as a single opaque `FREETEXT` token.
//!
//! # Example
//!
//! ```
//! use standoff_lexer::{Scanner, TokenKind};
//!
//! let tokens = Scanner::scan_line("T1\tProtein 0 5\tabcde\n", 1).unwrap();
//! assert_eq!(tokens[8].kind, TokenKind::FreeText);
//! assert_eq!(tokens[8].text, "abcde");
//! ```

pub mod scanner;
pub mod token;

pub use scanner::{ScanMode, ScanState, Scanner};
pub use token::{AnnotationId, AnnotationKind, Span, Token, TokenKind};

/// What went wrong while scanning a line.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LexerErrorKind {
    #[error("Unexpected character: '{}'", .0.escape_debug())]
    UnexpectedCharacter(char),
    #[error("Integer out of range: '{0}'")]
    IntegerOutOfRange(String),
}

/// Lexer error with position information.
///
/// Scanning aborts on the first error; no partial token list is returned.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Lexer error at line {line}, column {column}: {kind}")]
pub struct LexerError {
    pub kind: LexerErrorKind,
    pub line: usize,
    pub column: usize,
}
