//! Data shared by every stage of the pipeline.
//!
//! # Interdependency graph
//!
//! ```text
//! position ───▶ token ───▶ lexer, parser
//!
//! ast ──────────────────▶ parser, expander, renderer
//!
//! err ──────────────────▶ every stage
//! ```

pub mod ast;
pub mod err;
pub mod position;
pub mod token;
