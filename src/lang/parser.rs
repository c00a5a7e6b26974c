//! Provides a parser for converting tokens into a syntax tree.
//!
//! Nesting is driven by indentation: each statement's depth is the number of
//! [`TokenKind::Indent`] tokens in front of it, and a block opened at depth `n`
//! holds the following statements at depth `n + 1`.

use tracing::{debug, warn};

use crate::types::{ast::*, err::*, position::*, token::*};

/* -------------------- *
 *        OUTPUT        *
 * -------------------- */
/// Represents the output of a successful parse.
#[derive(Debug, Clone, Default)]
pub struct Parsed {
    /// The root of the syntax tree.
    pub program: Program,
    /// The non-fatal diagnostics raised while parsing.
    pub warnings: Vec<Warning>,
}


/* -------------------- *
 *        PARSER        *
 * -------------------- */
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Scope {
    TopLevel,
    Block,
}

/// Represents a parser which converts tokens into a [`Program`].
pub struct Parser {
    tokens: Vec<Token>,
    cursor: usize,
    warnings: Vec<Warning>,
}

impl Parser {
    /* -------------------- *
     *        PUBLIC        *
     * -------------------- */
    /// Creates a new instance of [`Parser`].
    ///
    /// A missing trailing [`TokenKind::Eof`] is appended.
    #[must_use]
    pub fn new(mut tokens: Vec<Token>) -> Self {
        if tokens.last().map_or(true, |t| t.kind != TokenKind::Eof) {
            let position = tokens.last().map(|t| t.position).unwrap_or_default();
            tokens.push(Token::new(TokenKind::Eof, None, position));
        }

        Self {
            tokens,
            cursor: 0,
            warnings: Vec::new(),
        }
    }

    /// Parses the tokens producing a syntax tree.
    ///
    /// # Errors
    ///
    /// Returns a [`CompileError::Syntax`] on the first grammar violation. There is no recovery.
    pub fn parse(mut self) -> Result<Parsed, CompileError> {
        let mut statements = Vec::new();

        loop {
            self.skip_newlines();

            let depth = self.count_indents();

            match self.peek_kind_at(depth) {
                TokenKind::Newline => {
                    self.cursor += depth + 1;
                    continue;
                }
                TokenKind::Eof => break,
                _ => {}
            }

            if depth > 0 {
                return Err(self.unexpected_indentation(depth));
            }

            if let Some(node) = self.parse_statement(0, Scope::TopLevel)? {
                statements.push(node);
            }
        }

        debug!(statements = statements.len(), "parsed program");

        Ok(Parsed {
            program: Program::new(statements),
            warnings: self.warnings,
        })
    }


    /* -------------------- *
     *       STATEMENT      *
     * -------------------- */
    fn parse_statement(&mut self, depth: usize, scope: Scope) -> Result<Option<Node>, CompileError> {
        let kind = self.peek().kind;

        let node = match kind {
            TokenKind::AtTitle => self.parse_title()?,
            TokenKind::AtScreen => self.parse_screen(depth)?,
            TokenKind::AtText => self.parse_text()?,
            TokenKind::AtSave => self.parse_save(depth)?,
            TokenKind::AtLoad => self.parse_load(depth)?,
            TokenKind::AtIdentifier => self.parse_generic(depth)?,
            TokenKind::AtRow
            | TokenKind::AtStack
            | TokenKind::AtLeft
            | TokenKind::AtRight
            | TokenKind::AtCenter => self.parse_layout(depth)?,
            _ if scope == Scope::TopLevel => {
                let token = self.peek();
                let warning = Warning::new(
                    ErrorCode::PS03,
                    token.line(),
                    format!("Skipped statement starting with {}", token),
                );

                warn!("{}", warning);
                self.warnings.push(warning);
                self.skip_line();

                return Ok(None);
            }
            _ => {
                let token = self.peek();

                return Err(CompileError::syntax(
                    ErrorCode::PS01,
                    token.line(),
                    format!("Unexpected {} at start of statement", token),
                ));
            }
        };

        Ok(Some(node))
    }

    fn parse_title(&mut self) -> Result<Node, CompileError> {
        let line = self.advance().line();
        let text = self.expect(TokenKind::String, ErrorCode::PX01, "Expected a string after @title")?;
        self.expect_line_end("@title")?;

        Ok(Node::Title(Title { text: text.text().to_string(), line }))
    }

    fn parse_text(&mut self) -> Result<Node, CompileError> {
        let line = self.advance().line();
        let text = self.expect(TokenKind::String, ErrorCode::PX01, "Expected a string after @text")?;
        self.expect_line_end("@text")?;

        Ok(Node::Text(Text { text: text.text().to_string(), line }))
    }

    fn parse_screen(&mut self, depth: usize) -> Result<Node, CompileError> {
        let line = self.advance().line();
        let name = self.parse_block_header("@screen")?;
        let body = self.parse_block(depth)?;

        Ok(Node::Screen(Screen { name, body, line }))
    }

    fn parse_save(&mut self, depth: usize) -> Result<Node, CompileError> {
        let line = self.advance().line();
        let name = self.parse_block_header("@save")?;
        let body = self.parse_block(depth)?;

        Ok(Node::Save(Save { name, body, line }))
    }

    /// Parses `IDENT ':' NEWLINE` after `@screen` and `@save`.
    fn parse_block_header(&mut self, keyword: &str) -> Result<String, CompileError> {
        let name = self.expect(
            TokenKind::Identifier,
            ErrorCode::PX02,
            &format!("Expected a name after {}", keyword),
        )?;
        self.expect(
            TokenKind::Colon,
            ErrorCode::PX03,
            &format!("Expected ':' after {} name", keyword),
        )?;
        self.expect_line_end(keyword)?;

        Ok(name.text().to_string())
    }

    fn parse_load(&mut self, depth: usize) -> Result<Node, CompileError> {
        let line = self.advance().line();
        let name = self.expect(TokenKind::Identifier, ErrorCode::PX02, "Expected a template name after @load")?;
        let mut parameters = Vec::new();

        if self.peek().kind == TokenKind::With {
            self.advance();
            self.expect(TokenKind::Colon, ErrorCode::PX03, "Expected ':' after `with`")?;
            self.expect_line_end("`with:`")?;

            parameters = self.parse_indented(depth, |p, _| p.parse_parameter().map(Some))?;
        } else {
            self.expect_line_end("@load name")?;
        }

        Ok(Node::Load(Load {
            name: name.text().to_string(),
            parameters,
            line,
        }))
    }

    fn parse_parameter(&mut self) -> Result<Parameter, CompileError> {
        let name = self.expect(TokenKind::Identifier, ErrorCode::PX02, "Expected a parameter name")?;
        self.expect(TokenKind::Colon, ErrorCode::PX03, "Expected ':' after parameter name")?;

        let value_kind = self.peek().kind;

        let value = match value_kind {
            TokenKind::String | TokenKind::Identifier | TokenKind::Number => self.advance(),
            _ => {
                let token = self.peek();

                return Err(CompileError::syntax(
                    ErrorCode::PX06,
                    token.line(),
                    format!("Expected a string, identifier or number as parameter value, found {}", token),
                ));
            }
        };

        self.expect_line_end("parameter value")?;

        Ok(Parameter {
            name: name.text().to_string(),
            value: value.text().to_string(),
            line: name.line(),
        })
    }

    fn parse_generic(&mut self, depth: usize) -> Result<Node, CompileError> {
        let head = self.advance();
        let name = head.text().to_string();

        // optional header value
        let header = if self.peek().kind == TokenKind::String {
            Some(self.advance().text().to_string())
        } else {
            None
        };

        // attribute pairs
        let mut attributes = Vec::new();

        while self.peek().kind == TokenKind::Identifier {
            let key = self.advance();
            self.expect(
                TokenKind::Equal,
                ErrorCode::PX05,
                &format!("Expected '=' after attribute `{}`", key.text()),
            )?;
            let value = self.expect(
                TokenKind::String,
                ErrorCode::PX09,
                &format!("Expected a string value for attribute `{}`", key.text()),
            )?;

            attributes.push(Attribute {
                name: key.text().to_string(),
                value: value.text().to_string(),
            });
        }

        // optional body
        let body = if self.peek().kind == TokenKind::Colon {
            self.advance();
            self.expect_line_end(&format!("@{}:", name))?;
            self.parse_block(depth)?
        } else {
            self.expect_line_end(&format!("@{}", name))?;
            Vec::new()
        };

        Ok(Node::GenericAt(GenericAt {
            name,
            header,
            attributes,
            body,
            line: head.line(),
        }))
    }

    fn parse_layout(&mut self, depth: usize) -> Result<Node, CompileError> {
        let head = self.advance();
        let kind = match head.kind {
            TokenKind::AtRow => LayoutKind::Row,
            TokenKind::AtStack => LayoutKind::Stack,
            TokenKind::AtLeft => LayoutKind::Left,
            TokenKind::AtRight => LayoutKind::Right,
            _ => LayoutKind::Center,
        };

        // optional modifier list
        let mut bordered = false;

        if self.peek().kind == TokenKind::LBracket {
            self.advance();

            loop {
                let modifier = self.expect(TokenKind::Identifier, ErrorCode::PX02, "Expected a layout modifier")?;

                match modifier.text() {
                    "border" => bordered = true,
                    other => {
                        return Err(CompileError::syntax(
                            ErrorCode::PX08,
                            modifier.line(),
                            format!("Unknown layout modifier `{}`", other),
                        ));
                    }
                }

                if self.peek().kind == TokenKind::Comma {
                    self.advance();
                    continue;
                }

                self.expect(TokenKind::RBracket, ErrorCode::PX07, "Expected ']' after layout modifiers")?;
                break;
            }
        }

        self.expect(TokenKind::Colon, ErrorCode::PX03, &format!("Expected ':' after {}", head.kind))?;
        self.expect_line_end(&format!("{}:", head.kind))?;

        let body = self.parse_block(depth)?;

        Ok(Node::Layout(Layout {
            kind,
            bordered,
            body,
            line: head.line(),
        }))
    }


    /* -------------------- *
     *         BLOCK        *
     * -------------------- */
    #[inline]
    fn parse_block(&mut self, parent_depth: usize) -> Result<Vec<Node>, CompileError> {
        self.parse_indented(parent_depth, |p, depth| p.parse_statement(depth, Scope::Block))
    }

    /// Collects the lines at `parent_depth + 1` with `item`, stopping at the first shallower line.
    fn parse_indented<T>(
        &mut self,
        parent_depth: usize,
        item: fn(&mut Self, usize) -> Result<Option<T>, CompileError>,
    ) -> Result<Vec<T>, CompileError> {
        let expected = parent_depth + 1;
        let mut items = Vec::new();

        loop {
            let depth = self.count_indents();

            match self.peek_kind_at(depth) {
                TokenKind::Newline => {
                    self.cursor += depth + 1;
                    continue;
                }
                TokenKind::Eof => break,
                _ => {}
            }

            if depth < expected {
                break;
            }

            if depth > expected {
                return Err(self.unexpected_indentation(depth));
            }

            self.cursor += depth;

            if let Some(value) = item(self, expected)? {
                items.push(value);
            }
        }

        Ok(items)
    }


    /* -------------------- *
     *         UTILS        *
     * -------------------- */
    #[inline]
    fn peek(&self) -> &Token {
        self.peek_at(0)
    }

    #[inline]
    fn peek_at(&self, offset: usize) -> &Token {
        let idx = (self.cursor + offset).min(self.tokens.len() - 1);
        &self.tokens[idx]
    }

    #[inline]
    fn peek_kind_at(&self, offset: usize) -> TokenKind {
        self.peek_at(offset).kind
    }

    fn advance(&mut self) -> Token {
        let token = self.peek().clone();

        if self.cursor < self.tokens.len() - 1 {
            self.cursor += 1;
        }

        token
    }

    fn count_indents(&self) -> usize {
        self.tokens[self.cursor.min(self.tokens.len() - 1)..]
            .iter()
            .take_while(|t| t.kind == TokenKind::Indent)
            .count()
    }

    fn skip_newlines(&mut self) {
        while self.peek().kind == TokenKind::Newline {
            self.advance();
        }
    }

    fn skip_line(&mut self) {
        while !self.peek().kind.is_line_end() {
            self.advance();
        }

        if self.peek().kind == TokenKind::Newline {
            self.advance();
        }
    }

    fn expect(&mut self, kind: TokenKind, code: ErrorCode, message: &str) -> Result<Token, CompileError> {
        let token = self.peek();

        if token.kind != kind {
            return Err(CompileError::syntax(
                code,
                token.line(),
                format!("{}, found {}", message, token),
            ));
        }

        Ok(self.advance())
    }

    /// Consumes a line break. End of input also terminates a line but is left in place.
    fn expect_line_end(&mut self, context: &str) -> Result<(), CompileError> {
        let kind = self.peek().kind;

        match kind {
            TokenKind::Newline => {
                self.advance();
                Ok(())
            }
            TokenKind::Eof => Ok(()),
            _ => {
                let token = self.peek();

                Err(CompileError::syntax(
                    ErrorCode::PX04,
                    token.line(),
                    format!("Expected end of line after {}, found {}", context, token),
                ))
            }
        }
    }

    fn unexpected_indentation(&self, depth: usize) -> CompileError {
        let token = self.peek_at(depth);

        CompileError::syntax(
            ErrorCode::PS02,
            token.line(),
            format!("Unexpected indentation before {}", token),
        )
    }
}

/// Parses `tokens`, logging and discarding warnings.
///
/// # Errors
///
/// See [`Parser::parse`].
#[inline]
pub fn parse(tokens: Vec<Token>) -> Result<Program, CompileError> {
    Parser::new(tokens).parse().map(|parsed| parsed.program)
}


#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    use super::*;
    use crate::lang::lexer::tokenize;

    fn parse_source(source: &str) -> Result<Program, CompileError> {
        parse(tokenize(source)?)
    }

    fn text(value: &str, line: u32) -> Node {
        Node::Text(Text { text: value.to_string(), line })
    }

    #[test]
    fn parses_title_and_screen() {
        let program = parse_source("@title \"Demo\"\n@screen home:\n    @text \"Hi\"\n").unwrap();

        assert_eq!(program.statements, vec![
            Node::Title(Title { text: "Demo".into(), line: 1 }),
            Node::Screen(Screen { name: "home".into(), body: vec![text("Hi", 3)], line: 2 }),
        ]);
    }

    #[test]
    fn nested_blocks_follow_indentation() {
        let source = "\
@screen home:
    @row [border]:
        @text \"a\"
        @text \"b\"
    @text \"c\"
@text \"d\"
";
        let program = parse_source(source).unwrap();

        assert_eq!(program.statements, vec![
            Node::Screen(Screen {
                name: "home".into(),
                body: vec![
                    Node::Layout(Layout {
                        kind: LayoutKind::Row,
                        bordered: true,
                        body: vec![text("a", 3), text("b", 4)],
                        line: 2,
                    }),
                    text("c", 5),
                ],
                line: 1,
            }),
            text("d", 6),
        ]);
    }

    #[test]
    fn parses_load_with_parameters() {
        let source = "@load card with:\n    name: \"World\"\n    size: 3\n    tone: warm\n@load footer\n";
        let program = parse_source(source).unwrap();

        assert_eq!(program.statements, vec![
            Node::Load(Load {
                name: "card".into(),
                parameters: vec![
                    Parameter { name: "name".into(), value: "World".into(), line: 2 },
                    Parameter { name: "size".into(), value: "3".into(), line: 3 },
                    Parameter { name: "tone".into(), value: "warm".into(), line: 4 },
                ],
                line: 1,
            }),
            Node::Load(Load { name: "footer".into(), parameters: vec![], line: 5 }),
        ]);
    }

    #[test]
    fn parses_generic_tags() {
        let source = "\
@screen s:
    @button \"Go\" class=\"primary\" type=\"submit\"
    @section:
        @text \"inside\"
    @hr
";
        let program = parse_source(source).unwrap();
        let Node::Screen(screen) = &program.statements[0] else {
            panic!("expected a screen");
        };

        assert_eq!(screen.body, vec![
            Node::GenericAt(GenericAt {
                name: "button".into(),
                header: Some("Go".into()),
                attributes: vec![
                    Attribute { name: "class".into(), value: "primary".into() },
                    Attribute { name: "type".into(), value: "submit".into() },
                ],
                body: vec![],
                line: 2,
            }),
            Node::GenericAt(GenericAt {
                name: "section".into(),
                header: None,
                attributes: vec![],
                body: vec![text("inside", 4)],
                line: 3,
            }),
            Node::GenericAt(GenericAt {
                name: "hr".into(),
                header: None,
                attributes: vec![],
                body: vec![],
                line: 5,
            }),
        ]);
    }

    #[rstest]
    #[case("@row:\n", LayoutKind::Row)]
    #[case("@stack:\n", LayoutKind::Stack)]
    #[case("@left:\n", LayoutKind::Left)]
    #[case("@right:\n", LayoutKind::Right)]
    #[case("@center:\n", LayoutKind::Center)]
    fn parses_every_layout_kind(#[case] source: &str, #[case] kind: LayoutKind) {
        let program = parse_source(source).unwrap();
        assert_eq!(program.statements, vec![
            Node::Layout(Layout { kind, bordered: false, body: vec![], line: 1 }),
        ]);
    }

    #[test]
    fn last_statement_may_end_at_end_of_input() {
        let program = parse_source("@screen s:\n    @text \"x\"").unwrap();
        assert_eq!(program.statements.len(), 1);
    }

    #[test]
    fn over_indented_line_is_fatal() {
        let err = parse_source("@screen s:\n        @text \"x\"\n").unwrap_err();
        assert_eq!(err.code(), ErrorCode::PS02);
        assert_eq!(err.line(), Some(2));

        let err = parse_source("    @text \"x\"\n").unwrap_err();
        assert_eq!(err.code(), ErrorCode::PS02);
    }

    #[rstest]
    #[case("@screen home\n", ErrorCode::PX03, 1)]
    #[case("@screen:\n", ErrorCode::PX02, 1)]
    #[case("@title Demo\n", ErrorCode::PX01, 1)]
    #[case("@text \"a\" \"b\"\n", ErrorCode::PX04, 1)]
    #[case("@load card with\n", ErrorCode::PX03, 1)]
    #[case("@load card with:\n    name \"x\"\n", ErrorCode::PX03, 2)]
    #[case("@load card with:\n    name: [\n", ErrorCode::PX06, 2)]
    #[case("@a class \"x\"\n", ErrorCode::PX05, 1)]
    #[case("@a class=x\n", ErrorCode::PX09, 1)]
    #[case("@row [shadow]:\n", ErrorCode::PX08, 1)]
    #[case("@row [border:\n", ErrorCode::PX07, 1)]
    #[case("@screen s:\n    name\n", ErrorCode::PS01, 2)]
    #[case("@screen s:\n    @const\n", ErrorCode::PS01, 2)]
    fn grammar_violations_are_fatal(#[case] source: &str, #[case] code: ErrorCode, #[case] line: u32) {
        let err = parse_source(source).unwrap_err();
        assert_eq!((err.code(), err.line()), (code, Some(line)));
    }

    #[test]
    fn unknown_top_level_lines_are_skipped_with_warning() {
        let parsed = Parser::new(tokenize("@const X \"1\"\nstray words\n@text \"kept\"\n").unwrap())
            .parse()
            .unwrap();

        assert_eq!(parsed.program.statements, vec![text("kept", 3)]);
        assert_eq!(parsed.warnings.len(), 2);
        assert!(parsed.warnings.iter().all(|w| w.code == ErrorCode::PS03));
    }

    #[test]
    fn blank_indented_lines_inside_blocks_are_skipped() {
        let tokens = vec![
            Token::new(TokenKind::AtScreen, Some("screen".into()), Position::new(0, 0, 1, 1)),
            Token::new(TokenKind::Identifier, Some("s".into()), Position::new(0, 0, 1, 9)),
            Token::new(TokenKind::Colon, None, Position::new(0, 0, 1, 10)),
            Token::new(TokenKind::Newline, None, Position::new(0, 0, 1, 11)),
            Token::new(TokenKind::Indent, None, Position::new(0, 0, 2, 1)),
            Token::new(TokenKind::Indent, None, Position::new(0, 0, 2, 5)),
            Token::new(TokenKind::Newline, None, Position::new(0, 0, 2, 9)),
            Token::new(TokenKind::Indent, None, Position::new(0, 0, 3, 1)),
            Token::new(TokenKind::AtText, Some("text".into()), Position::new(0, 0, 3, 5)),
            Token::new(TokenKind::String, Some("x".into()), Position::new(0, 0, 3, 11)),
        ];

        let program = parse(tokens).unwrap();
        assert_eq!(program.statements, vec![
            Node::Screen(Screen { name: "s".into(), body: vec![text("x", 3)], line: 1 }),
        ]);
    }
}
