//! The Quill scanner/lexer.
//!
//! Converts source text into a token sequence in a single left-to-right
//! pass with one character of lookahead (two for the decimal point).

use crate::token::{Literal, Token, TokenKind};
use quill_diagnostics::{messages, Diagnostic, DiagnosticCollection, DiagnosticMessage};

/// The complete output of a scan: the full token sequence plus every
/// diagnostic reported along the way.
///
/// The token sequence is never partial — lexical errors do not stop the
/// scan — and its last element is always the `Eof` token. Whether any
/// reported error suppresses further use of the tokens is the caller's
/// decision (`diagnostics.has_errors()`).
#[derive(Debug)]
pub struct ScanResult {
    pub tokens: Vec<Token>,
    pub diagnostics: DiagnosticCollection,
}

/// The scanner converts Quill source text into tokens.
pub struct Scanner {
    /// The source text being scanned.
    text: Vec<char>,
    /// Start of the lexeme currently being scanned.
    start: usize,
    /// Index of the next unconsumed character.
    current: usize,
    /// Current 1-based line number.
    line: u32,
    /// Tokens emitted so far.
    tokens: Vec<Token>,
    /// Accumulated diagnostics.
    diagnostics: DiagnosticCollection,
}

impl Scanner {
    /// Create a new scanner for the given source text.
    pub fn new(text: &str) -> Self {
        Self {
            text: text.chars().collect(),
            start: 0,
            current: 0,
            line: 1,
            tokens: Vec::new(),
            diagnostics: DiagnosticCollection::new(),
        }
    }

    /// Scan the entire source and return the token sequence along with any
    /// diagnostics.
    ///
    /// Consumes the scanner: each instance scans its source exactly once.
    pub fn scan_tokens(mut self) -> ScanResult {
        while !self.is_eof() {
            self.start = self.current;
            self.scan_token();
        }

        self.tokens
            .push(Token::new(TokenKind::Eof, String::new(), self.line));
        ScanResult {
            tokens: self.tokens,
            diagnostics: self.diagnostics,
        }
    }

    /// Scan one lexeme starting at `start`, emitting at most one token.
    fn scan_token(&mut self) {
        let ch = self.advance();
        match ch {
            '(' => self.add_token(TokenKind::LeftParen),
            ')' => self.add_token(TokenKind::RightParen),
            '{' => self.add_token(TokenKind::LeftBrace),
            '}' => self.add_token(TokenKind::RightBrace),
            ',' => self.add_token(TokenKind::Comma),
            '.' => self.add_token(TokenKind::Dot),
            '-' => self.add_token(TokenKind::Minus),
            '+' => self.add_token(TokenKind::Plus),
            ';' => self.add_token(TokenKind::Semicolon),
            '*' => self.add_token(TokenKind::Star),

            '!' => {
                let kind = if self.advance_if('=') {
                    TokenKind::BangEqual
                } else {
                    TokenKind::Bang
                };
                self.add_token(kind);
            }
            '=' => {
                let kind = if self.advance_if('=') {
                    TokenKind::EqualEqual
                } else {
                    TokenKind::Equal
                };
                self.add_token(kind);
            }
            '<' => {
                let kind = if self.advance_if('=') {
                    TokenKind::LessEqual
                } else {
                    TokenKind::Less
                };
                self.add_token(kind);
            }
            '>' => {
                let kind = if self.advance_if('=') {
                    TokenKind::GreaterEqual
                } else {
                    TokenKind::Greater
                };
                self.add_token(kind);
            }

            '/' => {
                if self.advance_if('/') {
                    // Line comment: discard to end of line, emit nothing.
                    while !self.is_eof() && self.text[self.current] != '\n' {
                        self.current += 1;
                    }
                } else {
                    self.add_token(TokenKind::Slash);
                }
            }

            ' ' | '\r' | '\t' => {}
            '\n' => self.line += 1,

            '"' => self.scan_string(),

            _ if is_digit(ch) => self.scan_number(),
            _ if is_identifier_start(ch) => self.scan_identifier(),

            _ => self.error(&messages::UNEXPECTED_CHARACTER),
        }
    }

    // ========================================================================
    // Sub-scans
    // ========================================================================

    /// Scan a string literal; the opening `"` is already consumed.
    ///
    /// Strings may span multiple lines; embedded newlines count toward the
    /// line number. The literal value is the raw interior text — escape
    /// sequences are not interpreted.
    fn scan_string(&mut self) {
        while self.current_char() != Some('"') && !self.is_eof() {
            if self.text[self.current] == '\n' {
                self.line += 1;
            }
            self.current += 1;
        }

        if self.is_eof() {
            self.error(&messages::UNTERMINATED_STRING);
            return;
        }

        // The closing quote.
        self.current += 1;

        let value = self.chars_to_string(self.start + 1, self.current - 1);
        self.add_literal_token(TokenKind::String, Literal::String(value));
    }

    /// Scan a number literal; the first digit is already consumed.
    ///
    /// A `.` is consumed as a decimal point only when the character after it
    /// is also a digit; otherwise it is left for the next token.
    fn scan_number(&mut self) {
        self.scan_digits();

        if self.current_char() == Some('.') && self.char_at(1).map_or(false, is_digit) {
            self.current += 1;
            self.scan_digits();
        }

        let lexeme = self.chars_to_string(self.start, self.current);
        let value: f64 = lexeme.parse().unwrap_or(0.0);
        self.add_literal_token(TokenKind::Number, Literal::Number(value));
    }

    fn scan_digits(&mut self) {
        while self.current_char().map_or(false, is_digit) {
            self.current += 1;
        }
    }

    /// Scan an identifier or reserved word; the first character is already
    /// consumed.
    fn scan_identifier(&mut self) {
        while self.current_char().map_or(false, is_identifier_part) {
            self.current += 1;
        }

        let text = self.chars_to_string(self.start, self.current);
        let kind = TokenKind::from_keyword(&text).unwrap_or(TokenKind::Identifier);
        self.add_token(kind);
    }

    // ========================================================================
    // Cursor helpers
    // ========================================================================

    /// Whether we've reached the end of the text.
    #[inline]
    fn is_eof(&self) -> bool {
        self.current >= self.text.len()
    }

    /// Consume and return the next character.
    #[inline]
    fn advance(&mut self) -> char {
        let ch = self.text[self.current];
        self.current += 1;
        ch
    }

    /// Consume the next character only if it equals `expected`.
    fn advance_if(&mut self, expected: char) -> bool {
        if self.current_char() != Some(expected) {
            return false;
        }
        self.current += 1;
        true
    }

    /// Look at the character at the current position without advancing.
    #[inline]
    fn current_char(&self) -> Option<char> {
        self.text.get(self.current).copied()
    }

    /// Look at the character at position current + offset.
    #[inline]
    fn char_at(&self, offset: usize) -> Option<char> {
        self.text.get(self.current + offset).copied()
    }

    /// Convert a range of chars to a String.
    fn chars_to_string(&self, start: usize, end: usize) -> String {
        self.text[start..end].iter().collect()
    }

    // ========================================================================
    // Output
    // ========================================================================

    /// Emit a token for the current lexeme `[start, current)`.
    fn add_token(&mut self, kind: TokenKind) {
        let lexeme = self.chars_to_string(self.start, self.current);
        self.tokens.push(Token::new(kind, lexeme, self.line));
    }

    /// Emit a token for the current lexeme with a literal value.
    fn add_literal_token(&mut self, kind: TokenKind, literal: Literal) {
        let lexeme = self.chars_to_string(self.start, self.current);
        self.tokens
            .push(Token::new(kind, lexeme, self.line).with_literal(literal));
    }

    /// Report a lexical error at the current line. The scan continues.
    fn error(&mut self, message: &DiagnosticMessage) {
        self.diagnostics
            .add(Diagnostic::new(self.line, message, &[]));
    }
}

/// Check if a character is a decimal digit.
#[inline]
fn is_digit(ch: char) -> bool {
    ch.is_ascii_digit()
}

/// Check if a character can start an identifier.
#[inline]
fn is_identifier_start(ch: char) -> bool {
    ch == '_' || ch.is_ascii_alphabetic()
}

/// Check if a character can be part of an identifier.
#[inline]
fn is_identifier_part(ch: char) -> bool {
    is_identifier_start(ch) || is_digit(ch)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(source: &str) -> Vec<TokenKind> {
        Scanner::new(source)
            .scan_tokens()
            .tokens
            .iter()
            .map(|t| t.kind)
            .collect()
    }

    #[test]
    fn test_scan_punctuation() {
        assert_eq!(
            kinds("(){},.-+;*"),
            vec![
                TokenKind::LeftParen,
                TokenKind::RightParen,
                TokenKind::LeftBrace,
                TokenKind::RightBrace,
                TokenKind::Comma,
                TokenKind::Dot,
                TokenKind::Minus,
                TokenKind::Plus,
                TokenKind::Semicolon,
                TokenKind::Star,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_scan_operators() {
        assert_eq!(
            kinds("! != = == < <= > >= /"),
            vec![
                TokenKind::Bang,
                TokenKind::BangEqual,
                TokenKind::Equal,
                TokenKind::EqualEqual,
                TokenKind::Less,
                TokenKind::LessEqual,
                TokenKind::Greater,
                TokenKind::GreaterEqual,
                TokenKind::Slash,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_scan_string_literal() {
        let result = Scanner::new("\"hello\"").scan_tokens();
        assert_eq!(result.tokens[0].kind, TokenKind::String);
        assert_eq!(result.tokens[0].lexeme, "\"hello\"");
        assert_eq!(
            result.tokens[0].literal,
            Some(Literal::String("hello".to_string()))
        );
        assert!(result.diagnostics.is_empty());
    }

    #[test]
    fn test_scan_number_literal() {
        let result = Scanner::new("123.456").scan_tokens();
        assert_eq!(result.tokens[0].kind, TokenKind::Number);
        assert_eq!(result.tokens[0].literal, Some(Literal::Number(123.456)));
    }

    #[test]
    fn test_keyword_beats_identifier() {
        assert_eq!(
            kinds("var x while"),
            vec![
                TokenKind::Var,
                TokenKind::Identifier,
                TokenKind::While,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_comment_emits_nothing() {
        assert_eq!(kinds("// nothing here"), vec![TokenKind::Eof]);
    }

    #[test]
    fn test_unexpected_character_is_reported_and_skipped() {
        let result = Scanner::new("@").scan_tokens();
        assert_eq!(result.tokens.len(), 1);
        assert_eq!(result.tokens[0].kind, TokenKind::Eof);
        assert_eq!(result.diagnostics.error_count(), 1);
        assert_eq!(result.diagnostics.diagnostics()[0].line, 1);
    }
}
