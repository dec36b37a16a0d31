use std::fmt;

#[cfg(feature = "serde")]
use serde::Serialize;

/// Position of a token within its physical line.
///
/// `start`/`end` are byte offsets into the scanned source. Columns are
/// 1-based character columns, `end_column` exclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct Span {
    pub start: usize,
    pub end: usize,
    pub line: usize,
    pub start_column: usize,
    pub end_column: usize,
}

impl Span {
    pub fn new(start: usize, end: usize, line: usize, start_column: usize, end_column: usize) -> Self {
        Self {
            start,
            end,
            line,
            start_column,
            end_column,
        }
    }
}

/// Annotation family named by the marker character that leads an identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub enum AnnotationKind {
    /// `T`: a typed span over the document text.
    TextBound,
    /// `E`: an event anchored on a trigger span.
    Event,
    /// `A`: an attribute on another annotation.
    Attribute,
    /// `M`: the older spelling of an attribute.
    Modification,
    /// `R`: a binary relation.
    Relation,
    /// `N`: a normalization to an external database entry.
    Normalization,
    /// `#`: a free-text note.
    Note,
}

impl AnnotationKind {
    pub const ALL: [AnnotationKind; 7] = [
        AnnotationKind::TextBound,
        AnnotationKind::Event,
        AnnotationKind::Attribute,
        AnnotationKind::Modification,
        AnnotationKind::Relation,
        AnnotationKind::Normalization,
        AnnotationKind::Note,
    ];

    pub fn from_marker(marker: char) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.marker() == marker)
    }

    pub fn marker(self) -> char {
        match self {
            AnnotationKind::TextBound => 'T',
            AnnotationKind::Event => 'E',
            AnnotationKind::Attribute => 'A',
            AnnotationKind::Modification => 'M',
            AnnotationKind::Relation => 'R',
            AnnotationKind::Normalization => 'N',
            AnnotationKind::Note => '#',
        }
    }
}

/// Identifier of an annotation, e.g. `T12` or `#3`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct AnnotationId {
    pub kind: AnnotationKind,
    pub number: u64,
}

impl AnnotationId {
    pub fn new(kind: AnnotationKind, number: u64) -> Self {
        Self { kind, number }
    }
}

impl fmt::Display for AnnotationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.kind.marker(), self.number)
    }
}

/// Token classification for one stand-off line.
///
/// `Identifier` and `Integer` carry their parsed value; every other kind is
/// fully described by the token text.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub enum TokenKind {
    // Separators
    Colon,
    Space,
    Tab,
    Wildcard,
    Newline,

    // Structured fields
    Identifier(AnnotationId),
    Integer(u64),
    TypeName,

    // Covered text after the second tab
    FreeText,
}

impl TokenKind {
    /// Upper-case name used in diagnostics and CLI output.
    pub fn name(&self) -> &'static str {
        match self {
            TokenKind::Colon => "COLON",
            TokenKind::Space => "SPACE",
            TokenKind::Tab => "TAB",
            TokenKind::Wildcard => "WILDCARD",
            TokenKind::Newline => "NEWLINE",
            TokenKind::Identifier(_) => "IDENTIFIER",
            TokenKind::Integer(_) => "INTEGER",
            TokenKind::TypeName => "TYPE_NAME",
            TokenKind::FreeText => "FREETEXT",
        }
    }
}

/// A token produced by the stand-off scanner.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct Token {
    pub kind: TokenKind,
    pub text: String,
    pub span: Span,
}

impl Token {
    pub fn new(kind: TokenKind, text: impl Into<String>, span: Span) -> Self {
        Self {
            kind,
            text: text.into(),
            span,
        }
    }
}
