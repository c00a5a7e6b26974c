//! Resolves `@load` references against the `@save` templates of a program.
//!
//! Expansion runs in two phases. The collection phase snapshots the body of
//! every top-level `@save` into a template table, later definitions replacing
//! earlier ones. The expansion phase then walks every statement list and
//! replaces each `@load` with a substituted copy of the referenced body, so a
//! `@load` may appear before the `@save` it names.

use std::collections::HashMap;

use tracing::{debug, trace};

use crate::types::{ast::*, err::*};

/// Substitution context built from the parameters of a `@load`.
pub type Context<'a> = HashMap<&'a str, &'a str>;

/* -------------------- *
 *       EXPANDER       *
 * -------------------- */
/// Represents the template table of one compilation run.
#[derive(Debug, Clone, Default)]
pub struct Expander {
    templates: HashMap<String, Vec<Node>>,
    chain: Vec<String>,
}

impl Expander {
    /* -------------------- *
     *        PUBLIC        *
     * -------------------- */
    /// Creates a new instance of [`Expander`] holding the templates of `program`.
    #[must_use]
    pub fn collect(program: &Program) -> Self {
        let mut templates = HashMap::new();

        for node in &program.statements {
            if let Node::Save(save) = node {
                templates.insert(save.name.clone(), save.body.clone());
            }
        }

        debug!(templates = templates.len(), "collected templates");

        Self {
            templates,
            chain: Vec::new(),
        }
    }

    /// Gets the body stored for the template `name`.
    #[inline]
    #[must_use]
    pub fn template(&self, name: &str) -> Option<&[Node]> {
        self.templates.get(name).map(Vec::as_slice)
    }

    /// Returns the number of templates in the table.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.templates.len()
    }

    /// Returns true if the table holds no templates.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }

    /// Replaces every `@load` reachable from the root of `program`.
    ///
    /// `@save` nodes are kept in place and their bodies are expanded as well.
    ///
    /// # Errors
    ///
    /// Returns [`CompileError::UndefinedComponent`] for a `@load` with no template and
    /// [`CompileError::CircularTemplate`] for a template that reaches itself.
    pub fn expand(&mut self, mut program: Program) -> Result<Program, CompileError> {
        self.expand_list(&mut program.statements)?;
        Ok(program)
    }


    /* -------------------- *
     *         LIST         *
     * -------------------- */
    fn expand_list(&mut self, list: &mut Vec<Node>) -> Result<(), CompileError> {
        let mut idx = 0;

        while idx < list.len() {
            let spliced = match &mut list[idx] {
                Node::Load(load) => Some(self.instantiate(load)?),
                Node::Save(save) => {
                    // a load inside a shadowed save resolves to the winning definition
                    self.expand_list(&mut save.body)?;
                    None
                }
                node => {
                    if let Some(children) = node.children_mut() {
                        self.expand_list(children)?;
                    }
                    None
                }
            };

            match spliced {
                Some(nodes) => {
                    let count = nodes.len();
                    list.splice(idx..=idx, nodes);
                    idx += count;
                }
                None => idx += 1,
            }
        }

        Ok(())
    }

    /// Builds the nodes which replace `load`, fully expanded.
    fn instantiate(&mut self, load: &Load) -> Result<Vec<Node>, CompileError> {
        let mut nodes = match self.templates.get(&load.name) {
            Some(body) => body.clone(),
            None => {
                return Err(CompileError::UndefinedComponent {
                    name: load.name.clone(),
                    line: load.line,
                });
            }
        };

        let context: Context = load
            .parameters
            .iter()
            .map(|param| (param.name.as_str(), param.value.as_str()))
            .collect();

        for node in &mut nodes {
            substitute_node(node, &context);
        }

        self.enter(&load.name)?;
        let result = self.expand_list(&mut nodes);
        self.chain.pop();
        result?;

        trace!(template = %load.name, nodes = nodes.len(), line = load.line, "spliced template");

        Ok(nodes)
    }

    fn enter(&mut self, name: &str) -> Result<(), CompileError> {
        if self.chain.iter().any(|x| x == name) {
            let mut chain = self.chain.clone();
            chain.push(name.to_string());

            return Err(CompileError::CircularTemplate { chain });
        }

        self.chain.push(name.to_string());
        Ok(())
    }
}

/// Expands every `@load` in `program` using a fresh template table.
///
/// # Errors
///
/// See [`Expander::expand`].
#[inline]
pub fn expand(program: Program) -> Result<Program, CompileError> {
    Expander::collect(&program).expand(program)
}


/* -------------------- *
 *     SUBSTITUTION     *
 * -------------------- */
/// Replaces every `{key}` in `text` whose key is present in `context`.
///
/// The text is scanned once from left to right. Unknown keys and braces which
/// do not enclose an identifier are kept verbatim, and substituted values are
/// never scanned again.
#[must_use]
pub fn substitute(text: &str, context: &Context) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;

    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);

        let after = &rest[open + 1..];
        let value = after
            .find('}')
            .map(|close| &after[..close])
            .filter(|key| is_identifier(key))
            .and_then(|key| context.get(key).map(|value| (key.len(), *value)));

        match value {
            Some((len, value)) => {
                out.push_str(value);
                rest = &after[len + 1..];
            }
            None => {
                out.push('{');
                rest = after;
            }
        }
    }

    out.push_str(rest);
    out
}

fn is_identifier(key: &str) -> bool {
    let mut chars = key.chars();

    chars.next().is_some_and(|c| c.is_ascii_alphabetic())
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

fn substitute_nodes(nodes: &mut [Node], context: &Context) {
    for node in nodes {
        substitute_node(node, context);
    }
}

fn substitute_node(node: &mut Node, context: &Context) {
    match node {
        Node::Title(x) => x.text = substitute(&x.text, context),
        Node::Text(x) => x.text = substitute(&x.text, context),
        Node::GenericAt(x) => {
            if let Some(header) = &mut x.header {
                *header = substitute(header, context);
            }

            for attr in &mut x.attributes {
                attr.value = substitute(&attr.value, context);
            }

            substitute_nodes(&mut x.body, context);
        }
        Node::Load(x) => {
            for param in &mut x.parameters {
                param.value = substitute(&param.value, context);
            }
        }
        Node::Screen(x) => substitute_nodes(&mut x.body, context),
        Node::Save(x) => substitute_nodes(&mut x.body, context),
        Node::Layout(x) => substitute_nodes(&mut x.body, context),
    }
}
