//! The compilation pipeline.
//!
//! # Interdependency graph
//!
//! ```text
//! lexer ───▶ parser ───▶ expander ───▶ renderer
//! ```

pub mod expander;
pub mod lexer;
pub mod parser;
pub mod renderer;

use tracing::debug;

use crate::types::{ast::Program, err::*};

/* -------------------- *
 *      COMPILATION     *
 * -------------------- */
/// Represents the output of a successful compilation run.
#[derive(Debug, Clone)]
pub struct Compilation {
    /// The expanded syntax tree.
    pub program: Program,
    /// The rendered HTML document.
    pub html: String,
    /// The non-fatal diagnostics raised by every stage.
    pub warnings: Vec<Warning>,
}

/// Runs the whole pipeline over `source`.
///
/// # Errors
///
/// Returns the first fatal [`CompileError`] raised by any stage.
pub fn compile_program(source: &str) -> Result<Compilation, CompileError> {
    let lexed = lexer::Lexer::new(source).tokenize()?;
    let parsed = parser::Parser::new(lexed.tokens).parse()?;
    let program = expander::expand(parsed.program)?;
    let html = renderer::render(&program)?;

    let mut warnings = lexed.warnings;
    warnings.extend(parsed.warnings);

    debug!(bytes = html.len(), warnings = warnings.len(), "compiled source");

    Ok(Compilation {
        program,
        html,
        warnings,
    })
}

/// Compiles `source` into an HTML document.
///
/// # Errors
///
/// See [`compile_program`].
#[inline]
pub fn compile(source: &str) -> Result<String, CompileError> {
    compile_program(source).map(|compilation| compilation.html)
}
