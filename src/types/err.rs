//! Error codes, fatal compile errors and non-fatal warnings.

use std::fmt::{self, Debug, Display};

use thiserror::Error;

/* -------------------- *
 *      ERROR CODE      *
 * -------------------- */
macro_rules! error_code {
    ($($code:ident : $desc:literal),* $(,)?) => {
        /// Represents the error codes used by the compiler.
        #[derive(Clone, Copy, PartialEq, Eq, Hash)]
        pub enum ErrorCode {
            $(#[doc=$desc] $code,)*
        }

        impl ErrorCode {
            /// Returns the error code as a string.
            #[must_use]
            pub fn as_str(&self) -> &'static str {
                match self {
                    $(ErrorCode::$code => stringify!($code),)*
                }
            }

            /// Returns the description of the error code.
            #[must_use]
            pub fn description(&self) -> &'static str {
                match self {
                    $(ErrorCode::$code => $desc,)*
                }
            }
        }

        impl Debug for ErrorCode {
            fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
                write!(f, "{} [{}]", self.as_str(), self.description())
            }
        }

        impl Display for ErrorCode {
            fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
                write!(f, "{}", self.as_str())
            }
        }
    }
}

error_code! {
    // lex string
    LS01: "Missing closing quote for string",
    // lex indentation
    LI01: "Indentation is not a multiple of four spaces",
    LI02: "Tab character in indentation",
    // lex unknown input
    LU01: "Unknown character",
    LU02: "Missing name after '@'",
    // parse statement
    PS01: "Unexpected token at start of statement",
    PS02: "Unexpected indentation",
    PS03: "Unsupported top-level statement was skipped",
    // parse expectation
    PX01: "Missing string literal",
    PX02: "Missing identifier",
    PX03: "Missing colon",
    PX04: "Missing end of line",
    PX05: "Missing equal sign in attribute",
    PX06: "Invalid parameter value",
    PX07: "Missing closing bracket in layout modifiers",
    PX08: "Unknown layout modifier",
    PX09: "Missing string value in attribute",
    // collapse templates
    CU01: "Undefined component",
    CC01: "Circular template reference",
    // render
    RL01: "Unexpanded @load reached the renderer",
}


/* -------------------- *
 *     COMPILE ERROR    *
 * -------------------- */
/// Represents a fatal error which aborts a compilation run.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CompileError {
    /// Tokenization could not continue.
    #[error("lexical error at line {line}: {message} [{code}]")]
    Lex {
        code: ErrorCode,
        line: u32,
        message: String,
    },

    /// A grammar expectation was violated.
    #[error("syntax error at line {line}: {message} [{code}]")]
    Syntax {
        code: ErrorCode,
        line: u32,
        message: String,
    },

    /// A `@load` names a template with no `@save`.
    #[error("undefined component: @load `{name}` at line {line} [CU01]")]
    UndefinedComponent { name: String, line: u32 },

    /// A template reaches itself through `@load`.
    #[error("circular template reference: {} [CC01]", chain.join(" -> "))]
    CircularTemplate { chain: Vec<String> },

    /// The renderer was handed a tree that was never expanded.
    #[error("internal error: unexpanded @load `{name}` at line {line} reached the renderer [RL01]")]
    UnexpandedLoad { name: String, line: u32 },
}

impl CompileError {
    /// Creates a new [`CompileError::Lex`] using the description of `code` as message.
    #[inline]
    #[must_use]
    pub fn lex(code: ErrorCode, line: u32) -> Self {
        Self::Lex { code, line, message: code.description().to_string() }
    }

    /// Creates a new [`CompileError::Syntax`].
    #[inline]
    #[must_use]
    pub fn syntax(code: ErrorCode, line: u32, message: impl Into<String>) -> Self {
        Self::Syntax { code, line, message: message.into() }
    }

    /// Gets the error code associated with this error.
    #[must_use]
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::Lex { code, .. } | Self::Syntax { code, .. } => *code,
            Self::UndefinedComponent { .. } => ErrorCode::CU01,
            Self::CircularTemplate { .. } => ErrorCode::CC01,
            Self::UnexpandedLoad { .. } => ErrorCode::RL01,
        }
    }

    /// Gets the source line of the error, if it has one.
    #[must_use]
    pub fn line(&self) -> Option<u32> {
        match self {
            Self::Lex { line, .. }
            | Self::Syntax { line, .. }
            | Self::UndefinedComponent { line, .. }
            | Self::UnexpandedLoad { line, .. } => Some(*line),
            Self::CircularTemplate { .. } => None,
        }
    }
}


/* -------------------- *
 *        WARNING       *
 * -------------------- */
/// Represents a non-fatal diagnostic. Compilation continues after a warning.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Warning {
    /// The code of the warning.
    pub code: ErrorCode,
    /// The line where the warning was raised.
    pub line: u32,
    /// A human readable message.
    pub message: String,
}

impl Warning {
    /// Creates a new instance of [`Warning`].
    #[inline]
    #[must_use]
    pub fn new(code: ErrorCode, line: u32, message: impl Into<String>) -> Self {
        Self { code, line, message: message.into() }
    }
}

impl Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "warning at line {}: {} [{}]", self.line, self.message, self.code)
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_code_renders_name_and_description() {
        assert_eq!(ErrorCode::LS01.to_string(), "LS01");
        assert_eq!(format!("{:?}", ErrorCode::PS02), "PS02 [Unexpected indentation]");
    }

    #[test]
    fn compile_error_exposes_code_and_line() {
        let err = CompileError::syntax(ErrorCode::PX03, 7, "Expected ':' after screen name");
        assert_eq!(err.code(), ErrorCode::PX03);
        assert_eq!(err.line(), Some(7));
        assert_eq!(err.to_string(), "syntax error at line 7: Expected ':' after screen name [PX03]");

        let err = CompileError::CircularTemplate { chain: vec!["a".into(), "b".into(), "a".into()] };
        assert_eq!(err.line(), None);
        assert_eq!(err.to_string(), "circular template reference: a -> b -> a [CC01]");
    }
}
