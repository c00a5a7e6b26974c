//! The syntax tree produced by the parser.
//!
//! Every node owns its children, so the tree has no sharing and no cycles.
//! [`Clone`] on a node is a deep copy of its whole subtree.

use std::fmt::{self, Display};

/* -------------------- *
 *        UTILS         *
 * -------------------- */
fn fmt_indent(f: &mut fmt::Formatter, depth: usize) -> fmt::Result {
    for _ in 0..depth {
        f.write_str("  ")?;
    }

    Ok(())
}

fn fmt_nodes(f: &mut fmt::Formatter, nodes: &[Node], depth: usize) -> fmt::Result {
    for node in nodes {
        node.fmt_tree(f, depth)?;
    }

    Ok(())
}


/* -------------------- *
 *        PROGRAM       *
 * -------------------- */
/// Represents the root of the syntax tree.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Program {
    /// The top-level statements in source order.
    pub statements: Vec<Node>,
}

impl Program {
    /// Creates a new instance of [`Program`].
    #[inline]
    #[must_use]
    pub fn new(statements: Vec<Node>) -> Self {
        Self { statements }
    }

    /// Returns the text of the first top-level [`Title`], if any.
    #[must_use]
    pub fn title(&self) -> Option<&str> {
        self.statements.iter().find_map(|node| match node {
            Node::Title(title) => Some(title.text.as_str()),
            _ => None,
        })
    }

    /// Returns true if any `@load` is reachable from the root.
    #[must_use]
    pub fn has_loads(&self) -> bool {
        fn any_load(nodes: &[Node]) -> bool {
            nodes.iter().any(|node| match node {
                Node::Load(_) => true,
                _ => node.children().is_some_and(any_load),
            })
        }

        any_load(&self.statements)
    }
}

impl Display for Program {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(f, "Program")?;
        fmt_nodes(f, &self.statements, 1)
    }
}


/* -------------------- *
 *       STATEMENTS     *
 * -------------------- */
/// `@title "..."`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Title {
    pub text: String,
    pub line: u32,
}

/// `@screen name:` followed by a block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Screen {
    pub name: String,
    pub body: Vec<Node>,
    pub line: u32,
}

/// `@text "..."`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Text {
    pub text: String,
    pub line: u32,
}

/// A `name: value` line inside a `@load ... with:` block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Parameter {
    pub name: String,
    pub value: String,
    pub line: u32,
}

/// `@save name:` followed by a block. A template definition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Save {
    pub name: String,
    pub body: Vec<Node>,
    pub line: u32,
}

/// `@load name` with optional parameters. A template reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Load {
    pub name: String,
    pub parameters: Vec<Parameter>,
    pub line: u32,
}

/// A single `key="value"` pair on a generic tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    pub name: String,
    pub value: String,
}

/// Any `@name` outside the reserved set, rendered as an HTML element named `name`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenericAt {
    pub name: String,
    pub header: Option<String>,
    pub attributes: Vec<Attribute>,
    pub body: Vec<Node>,
    pub line: u32,
}

/// The fixed set of layout containers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LayoutKind {
    Row,
    Stack,
    Left,
    Right,
    Center,
}

impl LayoutKind {
    /// Returns the keyword of the layout, which is also its rendered id.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            LayoutKind::Row => "row",
            LayoutKind::Stack => "stack",
            LayoutKind::Left => "left",
            LayoutKind::Right => "right",
            LayoutKind::Center => "center",
        }
    }
}

impl Display for LayoutKind {
    #[inline]
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// `@row:`, `@stack [border]:`, ... followed by a block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Layout {
    pub kind: LayoutKind,
    pub bordered: bool,
    pub body: Vec<Node>,
    pub line: u32,
}


/* -------------------- *
 *         NODE         *
 * -------------------- */
/// Represents a statement node created by the parser.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    Title(Title),
    Screen(Screen),
    Text(Text),
    Save(Save),
    Load(Load),
    GenericAt(GenericAt),
    Layout(Layout),
}

impl Node {
    /// Gets the line where the statement starts.
    #[must_use]
    pub fn line(&self) -> u32 {
        match self {
            Node::Title(x) => x.line,
            Node::Screen(x) => x.line,
            Node::Text(x) => x.line,
            Node::Save(x) => x.line,
            Node::Load(x) => x.line,
            Node::GenericAt(x) => x.line,
            Node::Layout(x) => x.line,
        }
    }

    /// Gets the owned child statements, if the variant has any.
    #[must_use]
    pub fn children(&self) -> Option<&[Node]> {
        match self {
            Node::Screen(x) => Some(&x.body),
            Node::Save(x) => Some(&x.body),
            Node::GenericAt(x) => Some(&x.body),
            Node::Layout(x) => Some(&x.body),
            Node::Title(_) | Node::Text(_) | Node::Load(_) => None,
        }
    }

    /// Gets a mutable reference to the owned child statements, if the variant has any.
    #[must_use]
    pub fn children_mut(&mut self) -> Option<&mut Vec<Node>> {
        match self {
            Node::Screen(x) => Some(&mut x.body),
            Node::Save(x) => Some(&mut x.body),
            Node::GenericAt(x) => Some(&mut x.body),
            Node::Layout(x) => Some(&mut x.body),
            Node::Title(_) | Node::Text(_) | Node::Load(_) => None,
        }
    }

    fn fmt_tree(&self, f: &mut fmt::Formatter, depth: usize) -> fmt::Result {
        fmt_indent(f, depth)?;

        match self {
            Node::Title(x) => writeln!(f, "Title {:?}", x.text),
            Node::Text(x) => writeln!(f, "Text {:?}", x.text),
            Node::Screen(x) => {
                writeln!(f, "Screen {}", x.name)?;
                fmt_nodes(f, &x.body, depth + 1)
            }
            Node::Save(x) => {
                writeln!(f, "Save {}", x.name)?;
                fmt_nodes(f, &x.body, depth + 1)
            }
            Node::Load(x) => {
                writeln!(f, "Load {}", x.name)?;

                for param in &x.parameters {
                    fmt_indent(f, depth + 1)?;
                    writeln!(f, "Parameter {} = {:?}", param.name, param.value)?;
                }

                Ok(())
            }
            Node::GenericAt(x) => {
                write!(f, "@{}", x.name)?;

                if let Some(header) = &x.header {
                    write!(f, " {:?}", header)?;
                }

                for attr in &x.attributes {
                    write!(f, " {}={:?}", attr.name, attr.value)?;
                }

                writeln!(f)?;
                fmt_nodes(f, &x.body, depth + 1)
            }
            Node::Layout(x) => {
                if x.bordered {
                    writeln!(f, "Layout {} [border]", x.kind)?;
                } else {
                    writeln!(f, "Layout {}", x.kind)?;
                }
                fmt_nodes(f, &x.body, depth + 1)
            }
        }
    }
}

impl Display for Node {
    #[inline]
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        self.fmt_tree(f, 0)
    }
}


#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn text(value: &str) -> Node {
        Node::Text(Text { text: value.into(), line: 1 })
    }

    #[test]
    fn tree_prints_nested_structure() {
        let program = Program::new(vec![
            Node::Title(Title { text: "Demo".into(), line: 1 }),
            Node::Screen(Screen {
                name: "home".into(),
                body: vec![Node::Layout(Layout {
                    kind: LayoutKind::Row,
                    bordered: true,
                    body: vec![text("Hi")],
                    line: 3,
                })],
                line: 2,
            }),
            Node::Load(Load {
                name: "card".into(),
                parameters: vec![Parameter { name: "name".into(), value: "World".into(), line: 6 }],
                line: 5,
            }),
        ]);

        assert_eq!(
            program.to_string(),
            "Program\n  Title \"Demo\"\n  Screen home\n    Layout row [border]\n      Text \"Hi\"\n  Load card\n    Parameter name = \"World\"\n",
        );
    }

    #[test]
    fn title_is_first_top_level_occurrence() {
        let program = Program::new(vec![
            text("x"),
            Node::Title(Title { text: "First".into(), line: 2 }),
            Node::Title(Title { text: "Second".into(), line: 3 }),
        ]);

        assert_eq!(program.title(), Some("First"));
        assert_eq!(Program::default().title(), None);
    }

    #[test]
    fn has_loads_searches_nested_bodies() {
        let nested = Program::new(vec![Node::Screen(Screen {
            name: "s".into(),
            body: vec![Node::Load(Load { name: "x".into(), parameters: vec![], line: 2 })],
            line: 1,
        })]);

        assert!(nested.has_loads());
        assert!(!Program::new(vec![text("a")]).has_loads());
    }

    #[test]
    fn clone_is_deep() {
        let original = Node::Screen(Screen { name: "s".into(), body: vec![text("a")], line: 1 });
        let mut copy = original.clone();

        if let Some(Node::Text(t)) = copy.children_mut().and_then(|body| body.first_mut()) {
            t.text.push('!');
        }

        assert_eq!(original.children().map(|body| body[0].clone()), Some(text("a")));
        assert_ne!(original, copy);
    }
}
