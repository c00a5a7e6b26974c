//! Provides a lexer for tokenizing source code.
//!
//! # Examples
//!
//! ```
//! use atml::lang::lexer::Lexer;
//! use atml::types::token::TokenKind;
//!
//! let lexed = Lexer::new("@screen home:\n    @text \"Hi\"\n").tokenize().unwrap();
//! let kinds: Vec<_> = lexed.tokens.iter().map(|t| t.kind).collect();
//!
//! assert_eq!(kinds, [
//!     TokenKind::AtScreen, TokenKind::Identifier, TokenKind::Colon, TokenKind::Newline,
//!     TokenKind::Indent, TokenKind::AtText, TokenKind::String, TokenKind::Newline,
//!     TokenKind::Eof,
//! ]);
//! ```

use bstr::ByteSlice;
use tracing::{debug, warn};

use crate::types::{err::*, position::*, token::*};

/// Number of spaces that make up one level of indentation.
pub const INDENT_WIDTH: usize = 4;

/* -------------------- *
 *        OUTPUT        *
 * -------------------- */
/// Represents the output of a successful tokenization.
#[derive(Debug, Clone, Default)]
pub struct Lexed {
    /// The tokens in source order, always ending with [`TokenKind::Eof`].
    pub tokens: Vec<Token>,
    /// The non-fatal diagnostics raised while lexing.
    pub warnings: Vec<Warning>,
}


/* -------------------- *
 *         LEXER        *
 * -------------------- */
/// Represents a lexer used for tokenizing source code.
pub struct Lexer<'a> {
    source: &'a [u8],
    cursor: usize,
    line: u32,
    col: u32,
    line_start: bool,
    tokens: Vec<Token>,
    warnings: Vec<Warning>,
}

impl<'a> Lexer<'a> {
    /* -------------------- *
     *        PUBLIC        *
     * -------------------- */
    /// Creates a new instance of [`Lexer`].
    #[inline]
    #[must_use]
    pub fn new(source: &'a str) -> Self {
        Lexer {
            source: source.as_bytes(),
            cursor: 0,
            line: 1,
            col: 1,
            line_start: true,
            tokens: Vec::new(),
            warnings: Vec::new(),
        }
    }

    /// Checks if there are more bytes to process in the source code.
    #[inline]
    #[must_use]
    pub fn active(&self) -> bool {
        self.cursor < self.source.len()
    }

    /// Tokenizes the whole source, appending a final [`TokenKind::Eof`].
    ///
    /// # Errors
    ///
    /// Returns a [`CompileError::Lex`] on an unterminated string or on
    /// indentation which is not made of whole four-space units.
    pub fn tokenize(mut self) -> Result<Lexed, CompileError> {
        while self.active() {
            if self.line_start {
                self.line_start = false;
                self.lex_indentation()?;
                continue;
            }

            match self.peek_byte() {
                b'\n' => self.lex_newline(),
                b'\r' | b' ' | b'\t' => self.inc_cursor(),
                b'#' => self.skip_comment(),
                b'"' => self.lex_string()?,
                b'@' => self.lex_at(),
                b'a'..=b'z' | b'A'..=b'Z' => self.lex_identifier(),
                b'0'..=b'9' => self.lex_number(),
                b':' | b',' | b'[' | b']' | b'=' => self.lex_punctuation(),
                _ => self.lex_unknown(),
            }
        }

        let eof = Position::new(self.cursor, self.cursor, self.line, self.col);
        self.tokens.push(Token::new(TokenKind::Eof, None, eof));

        debug!(tokens = self.tokens.len(), warnings = self.warnings.len(), "tokenized source");

        Ok(Lexed {
            tokens: self.tokens,
            warnings: self.warnings,
        })
    }


    /* -------------------- *
     *        LAYOUT        *
     * -------------------- */
    fn lex_indentation(&mut self) -> Result<(), CompileError> {
        let cursor_start = self.cursor;
        let mut width = 0;
        let mut tabbed = false;

        while self.active() && matches!(self.peek_byte(), b' ' | b'\t' | b'\r') {
            match self.peek_byte() {
                b'\t' => tabbed = true,
                b' ' => width += 1,
                _ => {}
            }

            self.inc_cursor();
        }

        // blank and comment-only lines carry no indentation
        if !self.active() || matches!(self.peek_byte(), b'\n' | b'#') {
            return Ok(());
        }

        if tabbed {
            return Err(CompileError::lex(ErrorCode::LI02, self.line));
        }

        if width % INDENT_WIDTH != 0 {
            return Err(CompileError::Lex {
                code: ErrorCode::LI01,
                line: self.line,
                message: format!(
                    "Indentation of {} spaces is not a multiple of {}",
                    width, INDENT_WIDTH,
                ),
            });
        }

        for unit in 0..width / INDENT_WIDTH {
            let byte_start = cursor_start + unit * INDENT_WIDTH;

            self.tokens.push(Token::new(
                TokenKind::Indent,
                None,
                Position::new(
                    byte_start, byte_start + INDENT_WIDTH,
                    self.line, (unit * INDENT_WIDTH) as u32 + 1,
                ),
            ));
        }

        Ok(())
    }

    fn lex_newline(&mut self) {
        let position = Position::new(self.cursor, self.cursor + 1, self.line, self.col);

        while self.active() && matches!(self.peek_byte(), b'\n' | b'\r') {
            self.inc_cursor();
        }

        // consecutive line breaks, including those around blank lines, collapse into one
        let collapse = self
            .tokens
            .last()
            .map_or(true, |token| token.kind == TokenKind::Newline);

        if !collapse {
            self.tokens.push(Token::new(TokenKind::Newline, None, position));
        }

        self.line_start = true;
    }

    fn skip_comment(&mut self) {
        while self.active() && self.peek_byte() != b'\n' {
            self.inc_cursor();
        }
    }


    /* -------------------- *
     *       LITERALS       *
     * -------------------- */
    fn lex_string(&mut self) -> Result<(), CompileError> {
        let byte_start = self.cursor;
        let line_start = self.line;
        let col_start = self.col;
        let mut value = Vec::new();

        // skip opening quote
        self.inc_cursor();

        loop {
            if !self.active() {
                return Err(CompileError::lex(ErrorCode::LS01, line_start));
            }

            match self.peek_byte() {
                b'\\' if matches!(self.source.get(self.cursor + 1), Some(b'"' | b'\\')) => {
                    self.inc_cursor();
                    value.push(self.next_byte());
                }
                b'"' => {
                    self.inc_cursor();
                    break;
                }
                _ => value.push(self.next_byte()),
            }
        }

        self.tokens.push(Token::new(
            TokenKind::String,
            Some(value.to_str_lossy().into_owned()),
            Position::new(byte_start, self.cursor, line_start, col_start),
        ));

        Ok(())
    }

    fn lex_identifier(&mut self) {
        let (name, position) = self.collect_word();
        let kind = bare_keyword(&name);

        self.tokens.push(Token::new(kind, Some(name), position));
    }

    fn lex_number(&mut self) {
        let byte_start = self.cursor;
        let col_start = self.col;

        while self.active() && self.peek_byte().is_ascii_digit() {
            self.inc_cursor();
        }

        self.tokens.push(Token::new(
            TokenKind::Number,
            Some(self.slice_source(byte_start, self.cursor)),
            Position::new(byte_start, self.cursor, self.line, col_start),
        ));
    }

    fn lex_at(&mut self) {
        let byte_start = self.cursor;
        let col_start = self.col;

        // skip sigil
        self.inc_cursor();

        if !self.active() {
            debug!(line = self.line, "ignored trailing '@' at end of input");
            return;
        }

        if !self.peek_byte().is_ascii_alphabetic() {
            self.warn(ErrorCode::LU02, "Missing name after '@'".to_string());
            return;
        }

        let (name, _) = self.collect_word();
        let kind = at_keyword(&name);

        self.tokens.push(Token::new(
            kind,
            Some(name),
            Position::new(byte_start, self.cursor, self.line, col_start),
        ));
    }


    /* -------------------- *
     *      PUNCTUATION     *
     * -------------------- */
    fn lex_punctuation(&mut self) {
        let position = Position::new(self.cursor, self.cursor + 1, self.line, self.col);
        let kind = match self.next_byte() {
            b':' => TokenKind::Colon,
            b',' => TokenKind::Comma,
            b'[' => TokenKind::LBracket,
            b']' => TokenKind::RBracket,
            _ => TokenKind::Equal,
        };

        self.tokens.push(Token::new(kind, None, position));
    }

    fn lex_unknown(&mut self) {
        // the source is valid UTF-8, so a whole character is always decoded
        let (ch, size) = bstr::decode_utf8(&self.source[self.cursor..]);
        let ch = ch.unwrap_or(char::REPLACEMENT_CHARACTER);

        self.warn(ErrorCode::LU01, format!("Unknown character {:?} was skipped", ch));

        for _ in 0..size.max(1) {
            self.inc_cursor();
        }
    }


    /* -------------------- *
     *         UTILS        *
     * -------------------- */
    fn warn(&mut self, code: ErrorCode, message: String) {
        let warning = Warning::new(code, self.line, message);

        warn!("{}", warning);
        self.warnings.push(warning);
    }

    fn collect_word(&mut self) -> (String, Position) {
        let byte_start = self.cursor;
        let col_start = self.col;

        while self.active() && matches!(self.peek_byte(), b'a'..=b'z' | b'A'..=b'Z' | b'0'..=b'9' | b'_') {
            self.inc_cursor();
        }

        (
            self.slice_source(byte_start, self.cursor),
            Position::new(byte_start, self.cursor, self.line, col_start),
        )
    }

    #[inline]
    fn peek_byte(&self) -> u8 {
        self.source[self.cursor]
    }

    fn inc_cursor(&mut self) {
        if self.peek_byte() == b'\n' {
            self.line += 1;
            self.col = 1;
        } else {
            self.col += 1;
        }

        self.cursor += 1;
    }

    fn next_byte(&mut self) -> u8 {
        let byte = self.peek_byte();
        self.inc_cursor();
        byte
    }

    fn slice_source(&self, start: usize, end: usize) -> String {
        self.source[start..end].to_str_lossy().into_owned()
    }
}

/// Tokenizes `source`, logging and discarding warnings.
///
/// # Errors
///
/// See [`Lexer::tokenize`].
#[inline]
pub fn tokenize(source: &str) -> Result<Vec<Token>, CompileError> {
    Lexer::new(source).tokenize().map(|lexed| lexed.tokens)
}


#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    use super::*;
    use TokenKind::*;

    fn kinds(source: &str) -> Vec<TokenKind> {
        tokenize(source).unwrap().iter().map(|t| t.kind).collect()
    }

    #[test]
    fn lexes_generic_tag_with_attributes() {
        let tokens = tokenize("@button \"Go\" class=\"primary\":\n").unwrap();
        let texts: Vec<_> = tokens.iter().map(|t| (t.kind, t.text())).collect();

        assert_eq!(texts, vec![
            (AtIdentifier, "button"),
            (String, "Go"),
            (Identifier, "class"),
            (Equal, ""),
            (String, "primary"),
            (Colon, ""),
            (Newline, ""),
            (Eof, ""),
        ]);
    }

    #[rstest]
    #[case("@title", AtTitle)]
    #[case("@const", AtConst)]
    #[case("@save", AtSave)]
    #[case("@screen", AtScreen)]
    #[case("@load", AtLoad)]
    #[case("@row", AtRow)]
    #[case("@stack", AtStack)]
    #[case("@left", AtLeft)]
    #[case("@right", AtRight)]
    #[case("@center", AtCenter)]
    #[case("@text", AtText)]
    #[case("@img", AtIdentifier)]
    #[case("with", With)]
    #[case("without", Identifier)]
    #[case("42", Number)]
    fn recognizes_reserved_words(#[case] source: &str, #[case] kind: TokenKind) {
        assert_eq!(kinds(source), vec![kind, Eof]);
    }

    #[test]
    fn identifiers_allow_underscores_and_digits() {
        let tokens = tokenize("user_name2").unwrap();
        assert_eq!(tokens[0].text(), "user_name2");
        assert_eq!(tokens[0].kind, Identifier);
    }

    #[test]
    fn strings_support_quote_and_backslash_escapes() {
        let tokens = tokenize(r#""say \"hi\" \\ \n""#).unwrap();
        assert_eq!(tokens[0].text(), r#"say "hi" \ \n"#);
    }

    #[test]
    fn unterminated_string_is_fatal_with_its_line() {
        let err = tokenize("@title \"ok\"\n@text \"oops\n").unwrap_err();
        assert_eq!(err.code(), ErrorCode::LS01);
        assert_eq!(err.line(), Some(2));
    }

    #[test]
    fn indentation_emits_one_token_per_unit() {
        assert_eq!(kinds("@a:\n        @b\n"), vec![
            AtIdentifier, Colon, Newline, Indent, Indent, AtIdentifier, Newline, Eof,
        ]);
    }

    #[test]
    fn misaligned_indentation_is_rejected() {
        let err = tokenize("@a:\n   @b\n").unwrap_err();
        assert_eq!(err.code(), ErrorCode::LI01);
        assert_eq!(err.line(), Some(2));
    }

    #[test]
    fn tabs_in_indentation_are_rejected() {
        let err = tokenize("@a:\n\t@b\n").unwrap_err();
        assert_eq!(err.code(), ErrorCode::LI02);
    }

    #[test]
    fn blank_and_comment_lines_collapse() {
        assert_eq!(kinds("@a\n\n   \n    # note\n\r\n@b # trailing\n"), vec![
            AtIdentifier, Newline, AtIdentifier, Newline, Eof,
        ]);
    }

    #[test]
    fn line_numbers_advance_per_newline() {
        let tokens = tokenize("@a\n\n\n@b").unwrap();
        assert_eq!(tokens[2].text(), "b");
        assert_eq!(tokens[2].line(), 4);
    }

    #[test]
    fn carriage_returns_are_ignored() {
        assert_eq!(kinds("@a:\r\n    @b\r\n"), vec![
            AtIdentifier, Colon, Newline, Indent, AtIdentifier, Newline, Eof,
        ]);
    }

    #[test]
    fn unknown_characters_warn_and_continue() {
        let lexed = Lexer::new("@text { \"x\" } é\n").tokenize().unwrap();
        let kinds: Vec<_> = lexed.tokens.iter().map(|t| t.kind).collect();

        assert_eq!(kinds, vec![AtText, String, Newline, Eof]);
        assert_eq!(lexed.warnings.len(), 3);
        assert!(lexed.warnings.iter().all(|w| w.code == ErrorCode::LU01));
        assert!(lexed.warnings[2].message.contains('é'));
    }

    #[test]
    fn trailing_sigil_is_tolerated() {
        let lexed = Lexer::new("@text \"x\"\n@").tokenize().unwrap();
        assert!(lexed.warnings.is_empty());
        assert_eq!(lexed.tokens.last().map(|t| t.kind), Some(Eof));
    }

    #[test]
    fn punctuation_maps_to_single_tokens() {
        assert_eq!(kinds("[border, x]"), vec![LBracket, Identifier, Comma, Identifier, RBracket, Eof]);
    }
}
