use tracing::{debug, trace};

use crate::token::{AnnotationId, AnnotationKind, Span, Token, TokenKind};
use crate::{LexerError, LexerErrorKind};

/// Which rule set applies to the next character.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ScanState {
    /// Structured fields: identifiers, type names, integers, separators.
    #[default]
    Normal,
    /// Covered text: everything up to the next tab or line terminator.
    Freetext,
}

/// Per-line scanner state.
///
/// Scoped to one physical line: every line terminator resets it to
/// `Normal` with no tabs counted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ScanMode {
    pub state: ScanState,
    /// Tabs seen on the current line.
    pub tabs: usize,
}

impl ScanMode {
    /// Number of tabs that ends the structured fields of a line.
    pub const FREETEXT_AFTER_TABS: usize = 2;

    pub fn new() -> Self {
        Self::default()
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Record a tab seen in `Normal` state.
    fn count_tab(&mut self) {
        self.tabs += 1;
        if self.tabs == Self::FREETEXT_AFTER_TABS {
            self.state = ScanState::Freetext;
        }
    }
}

/// Stand-off line scanner.
///
/// Works on a `Vec<(usize, char)>` view of the source so tokens can carry
/// both character columns and byte offsets. The scanner owns its `ScanMode`;
/// nothing is shared between scanner instances, so independent lines can
/// be scanned concurrently.
pub struct Scanner<'a> {
    source: &'a str,
    chars: Vec<(usize, char)>,
    pos: usize,
    line: usize,
    column: usize,
    mode: ScanMode,
    tokens: Vec<Token>,
}

impl<'a> Scanner<'a> {
    /// Create a scanner whose first line is numbered `line`.
    pub fn new(source: &'a str, line: usize) -> Self {
        Self {
            source,
            chars: source.char_indices().collect(),
            pos: 0,
            line,
            column: 1,
            mode: ScanMode::new(),
            tokens: Vec::new(),
        }
    }

    /// Create a scanner that resumes from a caller-held mode, e.g. when a
    /// line arrives in several chunks.
    pub fn with_mode(source: &'a str, line: usize, mode: ScanMode) -> Self {
        let mut scanner = Self::new(source, line);
        scanner.mode = mode;
        scanner
    }

    /// Scan one physical line, terminator optional.
    pub fn scan_line(line: &str, line_number: usize) -> Result<Vec<Token>, LexerError> {
        let mut mode = ScanMode::new();
        Self::scan_line_with(line, line_number, &mut mode)
    }

    /// Scan starting from `mode` and leave the mode reached in it. A line
    /// terminator in `line` resets the mode as usual. On error `mode` is
    /// left untouched.
    pub fn scan_line_with(
        line: &str,
        line_number: usize,
        mode: &mut ScanMode,
    ) -> Result<Vec<Token>, LexerError> {
        let mut scanner = Scanner::with_mode(line, line_number, *mode);
        scanner.scan_tokens()?;
        *mode = scanner.mode;
        Ok(scanner.tokens)
    }

    /// Scan a whole document. Lines are numbered from 1 and each one starts
    /// in `Normal` mode.
    pub fn tokenize(source: &str) -> Result<Vec<Token>, LexerError> {
        let mut scanner = Scanner::new(source, 1);
        scanner.scan_tokens()?;
        debug!(
            lines = scanner.line,
            tokens = scanner.tokens.len(),
            "scanned stand-off document"
        );
        Ok(scanner.tokens)
    }

    /// Current mode; reflects the position reached by the last scan.
    pub fn mode(&self) -> ScanMode {
        self.mode
    }

    /// Scan until the end of the source or the first error.
    pub fn scan_tokens(&mut self) -> Result<(), LexerError> {
        while !self.is_at_end() {
            self.scan_token()?;
        }
        Ok(())
    }

    fn scan_token(&mut self) -> Result<(), LexerError> {
        match self.mode.state {
            ScanState::Normal => self.scan_structured(),
            ScanState::Freetext => self.scan_freetext(),
        }
    }

    /// Rules for the structured fields, first match wins.
    fn scan_structured(&mut self) -> Result<(), LexerError> {
        let ch = self.peek();

        match ch {
            ':' => self.single(TokenKind::Colon),
            ' ' => self.single(TokenKind::Space),
            '*' => self.single(TokenKind::Wildcard),
            '\n' | '\r' => self.scan_newline(),
            '\t' => {
                self.mode.count_tab();
                self.single(TokenKind::Tab)?;
                if self.mode.state == ScanState::Freetext {
                    trace!(line = self.line, column = self.column, "entering free-text field");
                }
                Ok(())
            }
            c if AnnotationKind::from_marker(c).is_some() && self.peek_next().is_ascii_digit() => {
                self.scan_identifier()
            }
            '0'..='9' => self.scan_integer(),
            c if c.is_ascii_uppercase() => self.scan_type_name(),
            _ => Err(self.error(LexerErrorKind::UnexpectedCharacter(ch))),
        }
    }

    /// Rules for the covered text after the second tab.
    fn scan_freetext(&mut self) -> Result<(), LexerError> {
        match self.peek() {
            '\t' => {
                self.mode.state = ScanState::Normal;
                self.single(TokenKind::Tab)
            }
            '\n' | '\r' => self.scan_newline(),
            _ => {
                let start = self.pos;
                while !self.is_at_end() && !matches!(self.peek(), '\t' | '\n' | '\r') {
                    self.advance();
                }
                self.push(TokenKind::FreeText, start);
                Ok(())
            }
        }
    }

    // --- Scanners ---

    /// `\n`, `\r\n` or a lone `\r`. Always closes the line.
    fn scan_newline(&mut self) -> Result<(), LexerError> {
        let start = self.pos;
        if self.peek() == '\r' && self.peek_next() == '\n' {
            self.advance();
        }
        self.advance();
        self.push(TokenKind::Newline, start);

        self.mode.reset();
        self.line += 1;
        self.column = 1;
        Ok(())
    }

    /// Marker character followed by one or more digits.
    fn scan_identifier(&mut self) -> Result<(), LexerError> {
        let start = self.pos;
        let start_column = self.column;
        let kind = match AnnotationKind::from_marker(self.peek()) {
            Some(kind) => kind,
            None => return Err(self.error(LexerErrorKind::UnexpectedCharacter(self.peek()))),
        };
        self.advance();

        let number = self.consume_digits(start_column)?;
        self.push(TokenKind::Identifier(AnnotationId::new(kind, number)), start);
        Ok(())
    }

    fn scan_integer(&mut self) -> Result<(), LexerError> {
        let start = self.pos;
        let value = self.consume_digits(self.column)?;
        self.push(TokenKind::Integer(value), start);
        Ok(())
    }

    /// Uppercase letter, then letters, underscores or hyphens.
    fn scan_type_name(&mut self) -> Result<(), LexerError> {
        let start = self.pos;
        self.advance();
        while !self.is_at_end()
            && (self.peek().is_ascii_alphabetic() || self.peek() == '_' || self.peek() == '-')
        {
            self.advance();
        }
        self.push(TokenKind::TypeName, start);
        Ok(())
    }

    /// Consume a digit run and parse it. `column` is reported on overflow.
    fn consume_digits(&mut self, column: usize) -> Result<u64, LexerError> {
        let digits_start = self.byte_offset(self.pos);
        while !self.is_at_end() && self.peek().is_ascii_digit() {
            self.advance();
        }
        let digits = &self.source[digits_start..self.byte_offset(self.pos)];
        digits.parse().map_err(|_| LexerError {
            kind: LexerErrorKind::IntegerOutOfRange(digits.to_string()),
            line: self.line,
            column,
        })
    }

    // --- Helpers ---

    fn single(&mut self, kind: TokenKind) -> Result<(), LexerError> {
        let start = self.pos;
        self.advance();
        self.push(kind, start);
        Ok(())
    }

    /// Push a token covering the characters from `start` to the current position.
    fn push(&mut self, kind: TokenKind, start: usize) {
        let width = self.pos - start;
        let (from, to) = (self.byte_offset(start), self.byte_offset(self.pos));
        let span = Span::new(from, to, self.line, self.column - width, self.column);
        self.tokens
            .push(Token::new(kind, &self.source[from..to], span));
    }

    fn byte_offset(&self, pos: usize) -> usize {
        self.chars
            .get(pos)
            .map_or(self.source.len(), |&(offset, _)| offset)
    }

    fn peek(&self) -> char {
        self.chars.get(self.pos).map_or('\0', |&(_, c)| c)
    }

    fn peek_next(&self) -> char {
        self.chars.get(self.pos + 1).map_or('\0', |&(_, c)| c)
    }

    fn advance(&mut self) {
        if !self.is_at_end() {
            self.pos += 1;
            self.column += 1;
        }
    }

    fn is_at_end(&self) -> bool {
        self.pos >= self.chars.len()
    }

    fn error(&self, kind: LexerErrorKind) -> LexerError {
        LexerError {
            kind,
            line: self.line,
            column: self.column,
        }
    }
}
