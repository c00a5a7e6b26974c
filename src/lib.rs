//! A compiler for an indentation-sensitive screen markup language.
//!
//! Source text goes through four stages, each in its own module under [`lang`]:
//! tokens, a syntax tree, a tree with every `@load` replaced by its `@save`
//! template, and finally an HTML document.
//!
//! ```
//! let html = atml::compile("@title \"Demo\"\n@screen home:\n    @text \"Hi\"\n").unwrap();
//!
//! assert!(html.contains("<title>Demo</title>"));
//! assert!(html.contains("<div class=\"screen\" id=\"home\">"));
//! assert!(html.contains("<p>Hi</p>"));
//! ```

pub mod config;
pub mod lang;
pub mod types;
pub mod watch;

pub use lang::{compile, compile_program, Compilation};
pub use types::err::{CompileError, ErrorCode, Warning};
