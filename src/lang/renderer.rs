//! Emits an HTML document from an expanded syntax tree.

use crate::types::{ast::*, err::*};

const INDENT: &str = "    ";

/// Elements which never have a closing tag.
const VOID_ELEMENTS: [&str; 13] = [
    "area", "base", "br", "col", "embed", "hr", "img",
    "input", "link", "meta", "source", "track", "wbr",
];

/* -------------------- *
 *       RENDERER       *
 * -------------------- */
struct Renderer {
    out: String,
}

impl Renderer {
    fn new() -> Self {
        Self { out: String::new() }
    }

    fn render_program(&mut self, program: &Program) -> Result<(), CompileError> {
        let title = escape_text(program.title().unwrap_or_default());

        self.line(0, "<!DOCTYPE html>");
        self.line(0, "<html>");
        self.line(0, "<head>");
        self.line(1, "<meta charset=\"UTF-8\">");
        self.line(1, &format!("<title>{}</title>", title));
        self.line(0, "</head>");
        self.line(0, "<body>");
        self.render_nodes(&program.statements, 1)?;
        self.line(0, "</body>");
        self.line(0, "</html>");

        Ok(())
    }

    fn render_nodes(&mut self, nodes: &[Node], depth: usize) -> Result<(), CompileError> {
        for node in nodes {
            self.render_node(node, depth)?;
        }

        Ok(())
    }

    fn render_node(&mut self, node: &Node, depth: usize) -> Result<(), CompileError> {
        match node {
            // metadata and template definitions are never emitted
            Node::Title(_) | Node::Save(_) => Ok(()),
            Node::Text(x) => {
                self.line(depth, &format!("<p>{}</p>", escape_text(&x.text)));
                Ok(())
            }
            Node::Screen(x) => {
                let open = format!("<div class=\"screen\" id=\"{}\">", escape_attr(&x.name));
                self.render_container(&open, "div", &x.body, depth)
            }
            Node::Layout(x) => {
                let class = if x.bordered { "layout main-borders" } else { "layout" };
                let open = format!("<div class=\"{}\" id=\"{}\">", class, x.kind);
                self.render_container(&open, "div", &x.body, depth)
            }
            Node::GenericAt(x) => self.render_generic(x, depth),
            Node::Load(x) => Err(CompileError::UnexpandedLoad {
                name: x.name.clone(),
                line: x.line,
            }),
        }
    }

    fn render_generic(&mut self, node: &GenericAt, depth: usize) -> Result<(), CompileError> {
        let mut open = format!("<{}", node.name);

        for attr in &node.attributes {
            open.push_str(&format!(" {}=\"{}\"", attr.name, escape_attr(&attr.value)));
        }

        open.push('>');

        if !node.body.is_empty() {
            self.line(depth, &open);

            if let Some(header) = node.header.as_deref().filter(|x| !x.is_empty()) {
                self.line(depth + 1, &escape_text(header));
            }

            self.render_nodes(&node.body, depth + 1)?;
            self.line(depth, &format!("</{}>", node.name));
        } else if node.header.as_deref().map_or(true, str::is_empty)
            && VOID_ELEMENTS.contains(&node.name.as_str())
        {
            self.line(depth, &open);
        } else {
            let header = escape_text(node.header.as_deref().unwrap_or_default());
            self.line(depth, &format!("{}{}</{}>", open, header, node.name));
        }

        Ok(())
    }

    fn render_container(
        &mut self,
        open: &str,
        tag: &str,
        body: &[Node],
        depth: usize,
    ) -> Result<(), CompileError> {
        self.line(depth, open);
        self.render_nodes(body, depth + 1)?;
        self.line(depth, &format!("</{}>", tag));

        Ok(())
    }

    fn line(&mut self, depth: usize, text: &str) {
        for _ in 0..depth {
            self.out.push_str(INDENT);
        }

        self.out.push_str(text);
        self.out.push('\n');
    }
}

/// Renders an expanded `program` as a complete HTML document.
///
/// # Errors
///
/// Returns [`CompileError::UnexpandedLoad`] if a `@load` is still present in the tree.
pub fn render(program: &Program) -> Result<String, CompileError> {
    let mut renderer = Renderer::new();
    renderer.render_program(program)?;

    Ok(renderer.out)
}


/* -------------------- *
 *        ESCAPE        *
 * -------------------- */
/// Escapes text content.
#[must_use]
pub fn escape_text(text: &str) -> String {
    let mut out = String::with_capacity(text.len());

    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(ch),
        }
    }

    out
}

/// Escapes a double-quoted attribute value.
#[must_use]
pub fn escape_attr(text: &str) -> String {
    escape_text(text).replace('"', "&quot;")
}
