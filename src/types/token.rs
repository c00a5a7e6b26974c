//! Tokens produced by the lexer and the reserved word tables.

use std::fmt::{self, Display};

use super::position::*;

/* -------------------- *
 *    TOKEN METADATA    *
 * -------------------- */
/// Represents the different types of tokens created by the lexer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    // punctuation
    Colon,
    Comma,
    LBracket,
    RBracket,
    Equal,

    // literals
    Identifier,
    Number,
    String,

    // layout
    Indent,
    Newline,
    Eof,

    // reserved words after '@'
    AtTitle,
    AtConst,
    AtSave,
    AtScreen,
    AtLoad,
    AtRow,
    AtStack,
    AtLeft,
    AtRight,
    AtCenter,
    AtText,
    AtIdentifier,

    // bare reserved words
    With,
}

impl TokenKind {
    /// Returns a short human readable name, used in diagnostics.
    #[must_use]
    pub fn describe(&self) -> &'static str {
        match self {
            TokenKind::Colon => "':'",
            TokenKind::Comma => "','",
            TokenKind::LBracket => "'['",
            TokenKind::RBracket => "']'",
            TokenKind::Equal => "'='",
            TokenKind::Identifier => "identifier",
            TokenKind::Number => "number",
            TokenKind::String => "string",
            TokenKind::Indent => "indentation",
            TokenKind::Newline => "end of line",
            TokenKind::Eof => "end of input",
            TokenKind::AtTitle => "@title",
            TokenKind::AtConst => "@const",
            TokenKind::AtSave => "@save",
            TokenKind::AtScreen => "@screen",
            TokenKind::AtLoad => "@load",
            TokenKind::AtRow => "@row",
            TokenKind::AtStack => "@stack",
            TokenKind::AtLeft => "@left",
            TokenKind::AtRight => "@right",
            TokenKind::AtCenter => "@center",
            TokenKind::AtText => "@text",
            TokenKind::AtIdentifier => "@identifier",
            TokenKind::With => "with",
        }
    }

    /// Returns true if the token ends a line.
    #[inline]
    #[must_use]
    pub fn is_line_end(&self) -> bool {
        matches!(self, TokenKind::Newline | TokenKind::Eof)
    }
}

impl Display for TokenKind {
    #[inline]
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.describe())
    }
}


/* -------------------- *
 *    RESERVED WORDS    *
 * -------------------- */
/// Reserved words recognized immediately after an '@' sigil.
pub const AT_KEYWORDS: [(&str, TokenKind); 11] = [
    ("title",  TokenKind::AtTitle),
    ("const",  TokenKind::AtConst),
    ("save",   TokenKind::AtSave),
    ("screen", TokenKind::AtScreen),
    ("load",   TokenKind::AtLoad),
    ("row",    TokenKind::AtRow),
    ("stack",  TokenKind::AtStack),
    ("left",   TokenKind::AtLeft),
    ("right",  TokenKind::AtRight),
    ("center", TokenKind::AtCenter),
    ("text",   TokenKind::AtText),
];

/// Reserved words recognized without a sigil.
pub const BARE_KEYWORDS: [(&str, TokenKind); 1] = [
    ("with", TokenKind::With),
];

#[inline]
fn lookup(table: &[(&str, TokenKind)], name: &str) -> Option<TokenKind> {
    table.iter().find(|(word, _)| *word == name).map(|(_, kind)| *kind)
}

/// Looks up the token kind for a name following '@'.
///
/// Names missing from [`AT_KEYWORDS`] map to [`TokenKind::AtIdentifier`].
#[inline]
#[must_use]
pub fn at_keyword(name: &str) -> TokenKind {
    lookup(&AT_KEYWORDS, name).unwrap_or(TokenKind::AtIdentifier)
}

/// Looks up the token kind for a bare identifier.
///
/// Names missing from [`BARE_KEYWORDS`] map to [`TokenKind::Identifier`].
#[inline]
#[must_use]
pub fn bare_keyword(name: &str) -> TokenKind {
    lookup(&BARE_KEYWORDS, name).unwrap_or(TokenKind::Identifier)
}


/* -------------------- *
 *         TOKEN        *
 * -------------------- */
/// Represents a token created by the lexer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    /// The type of the token.
    pub kind: TokenKind,
    /// The text payload of literal and '@' tokens.
    pub text: Option<String>,
    /// The position in the source code where this token was created.
    pub position: Position,
}

impl Token {
    /// Creates a new [`Token`].
    #[inline]
    #[must_use]
    pub fn new(kind: TokenKind, text: Option<String>, position: Position) -> Self {
        Self { kind, text, position }
    }

    /// Gets the text payload of the token, or an empty string if there is none.
    #[inline]
    #[must_use]
    pub fn text(&self) -> &str {
        self.text.as_deref().unwrap_or_default()
    }
}

impl GetPosition for Token {
    #[inline]
    fn position(&self) -> Position {
        self.position
    }
}

impl Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match (self.kind, &self.text) {
            (TokenKind::String, Some(text)) => write!(f, "{:?}", text),
            (TokenKind::AtIdentifier, Some(text)) => write!(f, "@{}", text),
            (TokenKind::Identifier | TokenKind::Number, Some(text)) => f.write_str(text),
            _ => self.kind.fmt(f),
        }
    }
}
