//! Record builder for stand-off documents.
//!
//! Walks the flat token stream from `standoff-lexer` line by line and
//! builds one [`Annotation`] per non-blank line. The leading identifier's
//! marker decides which field layout the rest of the line must follow.

use std::collections::HashSet;

use standoff_lexer::{AnnotationId, AnnotationKind, Scanner, Token, TokenKind};
use tracing::debug;

use crate::ast::{Annotation, AnnotationLine, Argument, Document, Reference};
use crate::ParseError;

/// Stand-off document parser.
pub struct Parser {
    tokens: Vec<Token>,
    pos: usize,
}

impl Parser {
    /// Create a new parser for the given tokens.
    pub fn new(tokens: Vec<Token>) -> Self {
        Self { tokens, pos: 0 }
    }

    /// Scan and parse a whole document.
    pub fn parse(source: &str) -> Result<Document, ParseError> {
        let tokens = Scanner::tokenize(source)?;
        let mut parser = Parser::new(tokens);
        let document = parser.parse_document()?;
        debug!(annotations = document.lines.len(), "parsed stand-off document");
        Ok(document)
    }

    /// Parse every line of the token stream.
    pub fn parse_document(&mut self) -> Result<Document, ParseError> {
        let mut lines = Vec::new();
        let mut seen = HashSet::new();

        loop {
            self.skip_newlines();
            let Some(token) = self.peek() else {
                break;
            };
            let (line, column) = (token.span.line, token.span.start_column);
            let annotation = self.parse_line()?;
            if let Some(id) = annotation.id() {
                if !seen.insert(id) {
                    return Err(ParseError {
                        message: format!("Duplicate annotation id {id}"),
                        line,
                        column,
                    });
                }
            }
            lines.push(AnnotationLine { line, annotation });
            self.expect_end_of_line()?;
        }

        Ok(Document { lines })
    }

    fn parse_line(&mut self) -> Result<Annotation, ParseError> {
        match self.peek_kind() {
            Some(TokenKind::Identifier(id)) => {
                let id = *id;
                self.advance();
                self.expect(TokenKind::Tab, "tab after identifier")?;
                match id.kind {
                    AnnotationKind::TextBound => self.parse_text_bound(id),
                    AnnotationKind::Event => self.parse_event(id),
                    AnnotationKind::Relation => self.parse_relation(id),
                    AnnotationKind::Attribute | AnnotationKind::Modification => {
                        self.parse_attribute(id)
                    }
                    AnnotationKind::Normalization => self.parse_normalization(id),
                    AnnotationKind::Note => self.parse_note(id),
                }
            }
            Some(TokenKind::Wildcard) => {
                self.advance();
                self.expect(TokenKind::Tab, "tab after '*'")?;
                self.parse_equivalence()
            }
            _ => Err(self.unexpected("annotation identifier")),
        }
    }

    // =========================================================================
    // Line layouts
    // =========================================================================

    fn parse_text_bound(&mut self, id: AnnotationId) -> Result<Annotation, ParseError> {
        let entity_type = self.expect_type_name()?;
        self.expect(TokenKind::Space, "space before start offset")?;
        let start = self.expect_integer()?;
        self.expect(TokenKind::Space, "space before end offset")?;
        let end = self.expect_integer()?;
        if start > end {
            return Err(self.error(format!("Start offset {start} is after end offset {end}")));
        }
        self.expect(TokenKind::Tab, "tab before covered text")?;
        let text = self.free_text();
        Ok(Annotation::TextBound {
            id,
            entity_type,
            start,
            end,
            text,
        })
    }

    fn parse_event(&mut self, id: AnnotationId) -> Result<Annotation, ParseError> {
        let event_type = self.expect_type_name()?;
        self.expect(TokenKind::Colon, "':' after event type")?;
        let trigger = self.expect_identifier()?;
        let arguments = self.parse_arguments()?;
        Ok(Annotation::Event {
            id,
            event_type,
            trigger,
            arguments,
        })
    }

    fn parse_relation(&mut self, id: AnnotationId) -> Result<Annotation, ParseError> {
        let relation_type = self.expect_type_name()?;
        let arguments = self.parse_arguments()?;
        if arguments.is_empty() {
            return Err(self.unexpected("relation argument"));
        }
        Ok(Annotation::Relation {
            id,
            relation_type,
            arguments,
        })
    }

    fn parse_attribute(&mut self, id: AnnotationId) -> Result<Annotation, ParseError> {
        let name = self.expect_type_name()?;
        self.expect(TokenKind::Space, "space before attribute target")?;
        let target = self.expect_identifier()?;

        let mut value = None;
        if self.check(&TokenKind::Space) {
            self.advance();
            match self.peek_kind() {
                Some(TokenKind::TypeName | TokenKind::Integer(_)) => {
                    value = Some(self.compound_name());
                }
                Some(TokenKind::Newline) | None => {}
                _ => return Err(self.unexpected("attribute value")),
            }
        }

        Ok(Annotation::Attribute {
            id,
            name,
            target,
            value,
        })
    }

    fn parse_normalization(&mut self, id: AnnotationId) -> Result<Annotation, ParseError> {
        let kind = self.expect_type_name()?;
        self.expect(TokenKind::Space, "space before normalization target")?;
        let target = self.expect_identifier()?;
        self.expect(TokenKind::Space, "space before reference")?;
        let database = self.expect_type_name()?;
        self.expect(TokenKind::Colon, "':' after database name")?;
        let key = self.reference_key()?;
        self.expect(TokenKind::Tab, "tab before covered text")?;
        let text = self.free_text();
        Ok(Annotation::Normalization {
            id,
            kind,
            target,
            reference: Reference { database, key },
            text,
        })
    }

    fn parse_note(&mut self, id: AnnotationId) -> Result<Annotation, ParseError> {
        let kind = self.expect_type_name()?;
        self.expect(TokenKind::Space, "space before note target")?;
        let target = self.expect_identifier()?;
        self.expect(TokenKind::Tab, "tab before note text")?;
        let text = self.free_text();
        Ok(Annotation::Note {
            id,
            kind,
            target,
            text,
        })
    }

    fn parse_equivalence(&mut self) -> Result<Annotation, ParseError> {
        let relation_type = self.expect_type_name()?;
        let mut members = Vec::new();
        while self.check(&TokenKind::Space) {
            self.advance();
            if let Some(TokenKind::Identifier(_)) = self.peek_kind() {
                members.push(self.expect_identifier()?);
            }
        }
        if members.len() < 2 {
            return Err(self.unexpected("at least two equivalent annotations"));
        }
        Ok(Annotation::Equivalence {
            relation_type,
            members,
        })
    }

    // =========================================================================
    // Field helpers
    // =========================================================================

    /// `( SPACE Role ':' IDENTIFIER )*`, tolerating trailing spaces.
    fn parse_arguments(&mut self) -> Result<Vec<Argument>, ParseError> {
        let mut arguments = Vec::new();
        while self.check(&TokenKind::Space) {
            self.advance();
            if !self.check(&TokenKind::TypeName) {
                continue;
            }
            let role = self.compound_name();
            self.expect(TokenKind::Colon, "':' after argument role")?;
            let target = self.expect_identifier()?;
            arguments.push(Argument { role, target });
        }
        Ok(arguments)
    }

    /// A type name with an optional numeric suffix (`Theme2`, `Arg1`).
    fn compound_name(&mut self) -> String {
        let mut name = String::new();
        while let Some(token) = self.peek() {
            match token.kind {
                TokenKind::TypeName | TokenKind::Integer(_) => {
                    name.push_str(&token.text);
                    self.advance();
                }
                _ => break,
            }
        }
        name
    }

    /// Everything up to the next tab, e.g. `P12345` scanned as `P` + `12345`.
    fn reference_key(&mut self) -> Result<String, ParseError> {
        let mut key = String::new();
        while let Some(token) = self.peek() {
            match token.kind {
                TokenKind::TypeName
                | TokenKind::Integer(_)
                | TokenKind::Identifier(_)
                | TokenKind::Colon => {
                    key.push_str(&token.text);
                    self.advance();
                }
                _ => break,
            }
        }
        if key.is_empty() {
            return Err(self.unexpected("reference key"));
        }
        Ok(key)
    }

    /// The covered text field; empty when the line ends right after the tab.
    fn free_text(&mut self) -> String {
        match self.peek() {
            Some(token) if token.kind == TokenKind::FreeText => {
                let text = token.text.clone();
                self.advance();
                text
            }
            _ => String::new(),
        }
    }

    // =========================================================================
    // Token navigation helpers
    // =========================================================================

    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn peek_kind(&self) -> Option<&TokenKind> {
        self.peek().map(|t| &t.kind)
    }

    fn check(&self, kind: &TokenKind) -> bool {
        self.peek_kind() == Some(kind)
    }

    fn advance(&mut self) {
        if self.pos < self.tokens.len() {
            self.pos += 1;
        }
    }

    fn skip_newlines(&mut self) {
        while self.check(&TokenKind::Newline) {
            self.advance();
        }
    }

    fn expect(&mut self, kind: TokenKind, what: &str) -> Result<(), ParseError> {
        if self.check(&kind) {
            self.advance();
            Ok(())
        } else {
            Err(self.unexpected(what))
        }
    }

    fn expect_end_of_line(&mut self) -> Result<(), ParseError> {
        match self.peek_kind() {
            None => Ok(()),
            Some(TokenKind::Newline) => {
                self.advance();
                Ok(())
            }
            Some(_) => Err(self.unexpected("end of line")),
        }
    }

    fn expect_type_name(&mut self) -> Result<String, ParseError> {
        match self.peek() {
            Some(token) if token.kind == TokenKind::TypeName => {
                let name = token.text.clone();
                self.advance();
                Ok(name)
            }
            _ => Err(self.unexpected("type name")),
        }
    }

    fn expect_identifier(&mut self) -> Result<AnnotationId, ParseError> {
        if let Some(TokenKind::Identifier(id)) = self.peek_kind() {
            let id = *id;
            self.advance();
            Ok(id)
        } else {
            Err(self.unexpected("annotation identifier"))
        }
    }

    fn expect_integer(&mut self) -> Result<u64, ParseError> {
        if let Some(TokenKind::Integer(value)) = self.peek_kind() {
            let value = *value;
            self.advance();
            Ok(value)
        } else {
            Err(self.unexpected("integer offset"))
        }
    }

    fn unexpected(&self, expected: &str) -> ParseError {
        let found = match self.peek() {
            Some(token) => token.kind.name(),
            None => "end of input",
        };
        self.error(format!("Expected {expected}, got {found}"))
    }

    /// Error at the current token, or just past the last one.
    fn error(&self, message: String) -> ParseError {
        let (line, column) = match (self.peek(), self.tokens.last()) {
            (Some(token), _) => (token.span.line, token.span.start_column),
            (None, Some(last)) => (last.span.line, last.span.end_column),
            (None, None) => (1, 1),
        };
        ParseError {
            message,
            line,
            column,
        }
    }
}
