//! Drawing-script parsing
//!
//! The script language is line oriented: each non-empty line holds one
//! statement, either a canvas call (`pdf.text('hi')`) or a `fail` statement.
//! Lines starting with `#` are comments. Parsing records the 1-based line of
//! every statement so execution errors can point back into the template.

use crate::diagnostics::SourceMap;
use crate::{Result, TemplateError};

/// A compiled script: the statement list of one template
#[derive(Debug, Clone, PartialEq)]
pub struct Script {
    pub statements: Vec<Statement>,
}

/// One statement with its line within the source string
#[derive(Debug, Clone, PartialEq)]
pub struct Statement {
    /// 1-based line relative to the start of the source
    pub line: u32,
    pub kind: StatementKind,
}

#[derive(Debug, Clone, PartialEq)]
pub enum StatementKind {
    /// A method call on a receiver, e.g. `pdf.text('hi')`
    Call {
        receiver: String,
        method: String,
        args: Vec<Argument>,
    },
    /// `fail "message"` - unconditional runtime failure
    Fail(StringTemplate),
}

/// A call argument
#[derive(Debug, Clone, PartialEq)]
pub enum Argument {
    Str(StringTemplate),
    Number(f64),
    Expr(Expr),
}

/// A string literal, possibly with interpolated expressions
#[derive(Debug, Clone, PartialEq)]
pub struct StringTemplate {
    pub segments: Vec<Segment>,
}

impl StringTemplate {
    /// A template holding a single literal segment
    pub fn literal(text: impl Into<String>) -> Self {
        Self {
            segments: vec![Segment::Literal(text.into())],
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Segment {
    Literal(String),
    Interpolation(Expr),
}

/// An expression usable in interpolations and bare arguments
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// Bare name: locals first, then scope
    Name(String),
    /// `@name`: scope only
    ScopeAttr(String),
    /// `yield`: invoke the caller's block
    Yield,
}

/// Parse template source into a script
///
/// Errors carry absolute locations translated through `map`.
pub fn parse_script(source: &str, map: &SourceMap) -> Result<Script> {
    let mut statements = Vec::new();

    for (idx, raw) in source.lines().enumerate() {
        let line = idx as u32 + 1;
        let trimmed = raw.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }
        let mut parser = LineParser::new(trimmed, line, map);
        statements.push(parser.parse_statement()?);
    }

    Ok(Script { statements })
}

/// Character-level parser for a single statement line
struct LineParser<'a> {
    chars: Vec<char>,
    pos: usize,
    line: u32,
    map: &'a SourceMap,
}

impl<'a> LineParser<'a> {
    fn new(text: &str, line: u32, map: &'a SourceMap) -> Self {
        Self {
            chars: text.chars().collect(),
            pos: 0,
            line,
            map,
        }
    }

    fn parse_statement(&mut self) -> Result<Statement> {
        let ident = self.parse_ident()?;

        let kind = if ident == "fail" {
            StatementKind::Fail(self.parse_fail_message()?)
        } else {
            self.parse_call(ident)?
        };

        self.expect_end()?;
        Ok(Statement {
            line: self.line,
            kind,
        })
    }

    /// `fail "message"` or `fail("message")`
    fn parse_fail_message(&mut self) -> Result<StringTemplate> {
        self.skip_ws();
        let parenthesized = self.eat('(');
        self.skip_ws();

        let message = match self.peek() {
            Some(q @ ('\'' | '"')) => self.parse_string(q)?,
            _ => return Err(self.error("`fail` expects a string message")),
        };

        if parenthesized {
            self.skip_ws();
            if !self.eat(')') {
                return Err(self.error("expected `)`"));
            }
        }
        Ok(message)
    }

    /// `receiver.method(args...)`, parens optional for zero-arg calls
    fn parse_call(&mut self, receiver: String) -> Result<StatementKind> {
        if !self.eat('.') {
            return Err(self.error("expected `.` after receiver"));
        }
        let method = self.parse_ident()?;

        let args = if self.peek() == Some('(') {
            self.parse_arg_list()?
        } else {
            Vec::new()
        };

        Ok(StatementKind::Call {
            receiver,
            method,
            args,
        })
    }

    fn parse_arg_list(&mut self) -> Result<Vec<Argument>> {
        // Caller checked for '('
        self.eat('(');
        self.skip_ws();

        let mut args = Vec::new();
        if self.eat(')') {
            return Ok(args);
        }

        loop {
            args.push(self.parse_argument()?);
            self.skip_ws();
            if self.eat(',') {
                self.skip_ws();
                continue;
            }
            if self.eat(')') {
                return Ok(args);
            }
            return Err(self.error("expected `,` or `)` in argument list"));
        }
    }

    fn parse_argument(&mut self) -> Result<Argument> {
        match self.peek() {
            Some(q @ ('\'' | '"')) => Ok(Argument::Str(self.parse_string(q)?)),
            Some(c) if c.is_ascii_digit() || c == '-' || c == '+' => {
                Ok(Argument::Number(self.parse_number()?))
            }
            Some(_) => Ok(Argument::Expr(self.parse_expr()?)),
            None => Err(self.error("expected an argument")),
        }
    }

    fn parse_expr(&mut self) -> Result<Expr> {
        if self.eat('@') {
            let name = self.parse_ident()?;
            return Ok(Expr::ScopeAttr(name));
        }
        let name = self.parse_ident()?;
        if name == "yield" {
            Ok(Expr::Yield)
        } else {
            Ok(Expr::Name(name))
        }
    }

    fn parse_string(&mut self, quote: char) -> Result<StringTemplate> {
        // Consume the opening quote
        self.eat(quote);

        let mut segments = Vec::new();
        let mut literal = String::new();

        loop {
            let Some(c) = self.bump() else {
                return Err(self.error("unterminated string"));
            };

            if c == quote {
                break;
            }

            if c == '\\' {
                let Some(escaped) = self.bump() else {
                    return Err(self.error("unterminated string"));
                };
                if quote == '\'' {
                    // Single-quoted strings only unescape \' and \\
                    match escaped {
                        '\'' | '\\' => literal.push(escaped),
                        other => {
                            literal.push('\\');
                            literal.push(other);
                        }
                    }
                } else {
                    match escaped {
                        '"' | '\\' | '#' => literal.push(escaped),
                        'n' => literal.push('\n'),
                        't' => literal.push('\t'),
                        other => return Err(self.error(&format!("unknown escape `\\{other}`"))),
                    }
                }
                continue;
            }

            if quote == '"' && c == '#' && self.peek() == Some('{') {
                self.eat('{');
                if !literal.is_empty() {
                    segments.push(Segment::Literal(std::mem::take(&mut literal)));
                }
                self.skip_ws();
                let expr = self.parse_expr()?;
                self.skip_ws();
                if !self.eat('}') {
                    return Err(self.error("expected `}` to close interpolation"));
                }
                segments.push(Segment::Interpolation(expr));
                continue;
            }

            literal.push(c);
        }

        if !literal.is_empty() || segments.is_empty() {
            segments.push(Segment::Literal(literal));
        }
        Ok(StringTemplate { segments })
    }

    fn parse_number(&mut self) -> Result<f64> {
        let start = self.pos;
        if matches!(self.peek(), Some('-' | '+')) {
            self.pos += 1;
        }
        while matches!(self.peek(), Some(c) if c.is_ascii_digit()) {
            self.pos += 1;
        }
        if self.peek() == Some('.') {
            self.pos += 1;
            while matches!(self.peek(), Some(c) if c.is_ascii_digit()) {
                self.pos += 1;
            }
        }

        let text: String = self.chars[start..self.pos].iter().collect();
        text.parse()
            .map_err(|_| self.error(&format!("invalid number `{text}`")))
    }

    fn parse_ident(&mut self) -> Result<String> {
        let start = self.pos;
        while matches!(self.peek(), Some(c) if c.is_alphanumeric() || c == '_') {
            self.pos += 1;
        }
        if self.pos == start {
            return Err(self.error("expected an identifier"));
        }
        Ok(self.chars[start..self.pos].iter().collect())
    }

    /// Only whitespace or a trailing comment may remain
    fn expect_end(&mut self) -> Result<()> {
        self.skip_ws();
        match self.peek() {
            None | Some('#') => Ok(()),
            Some(c) => Err(self.error(&format!("unexpected `{c}` after statement"))),
        }
    }

    fn skip_ws(&mut self) {
        while matches!(self.peek(), Some(c) if c.is_whitespace()) {
            self.pos += 1;
        }
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += 1;
        Some(c)
    }

    fn eat(&mut self, c: char) -> bool {
        if self.peek() == Some(c) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn error(&self, message: &str) -> TemplateError {
        TemplateError::Syntax {
            location: self.map.locate(self.line),
            message: message.to_string(),
        }
    }
}
