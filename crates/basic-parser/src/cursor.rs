use crate::compound_or_single;
use crate::statement;
use basic_ast::{InterpreterError, Line, Statement, Token, TokenKind};

pub struct Cursor<'a> {
    tokens: Vec<Token>,
    pos: usize,
    source_lines: Vec<&'a str>,
}

impl<'a> Cursor<'a> {
    pub fn new(tokens: Vec<Token>, source: &'a str) -> Self {
        Self {
            tokens,
            pos: 0,
            source_lines: source.lines().collect(),
        }
    }

    pub fn peek(&self) -> &Token {
        &self.tokens[self.pos.min(self.tokens.len() - 1)]
    }

    pub fn peek_kind(&self) -> TokenKind {
        self.peek().kind
    }

    pub fn peek_at(&self, offset: usize) -> &Token {
        let idx = (self.pos + offset).min(self.tokens.len() - 1);
        &self.tokens[idx]
    }

    pub fn advance(&mut self) -> Token {
        let tok = self.tokens[self.pos.min(self.tokens.len() - 1)].clone();
        if self.pos < self.tokens.len() - 1 {
            self.pos += 1;
        }
        tok
    }

    pub fn check(&self, kind: TokenKind) -> bool {
        self.peek_kind() == kind
    }

    pub fn matches(&mut self, kind: TokenKind) -> bool {
        if self.check(kind) {
            self.advance();
            true
        } else {
            false
        }
    }

    pub fn expect(&mut self, kind: TokenKind, what: &str) -> Result<Token, InterpreterError> {
        if self.check(kind) {
            Ok(self.advance())
        } else {
            Err(self.error(format!("expected {what}")))
        }
    }

    pub fn error(&self, message: impl Into<String>) -> InterpreterError {
        let line = self.peek().source_line;
        let source_line = self
            .source_lines
            .get((line.saturating_sub(1)) as usize)
            .copied()
            .unwrap_or("")
            .to_string();
        InterpreterError::Parse {
            line,
            message: message.into(),
            source_line,
        }
    }

    pub fn at_eof(&self) -> bool {
        self.check(TokenKind::Eof)
    }

    pub fn skip_blank_lines(&mut self) {
        while self.check(TokenKind::NewLine) {
            self.advance();
        }
    }

    pub fn at_line_end(&self) -> bool {
        matches!(self.peek_kind(), TokenKind::NewLine | TokenKind::Eof)
    }

    /// Parses one source line: `<number> <statement> [: <statement>]*`.
    pub fn parse_line(&mut self) -> Result<Line, InterpreterError> {
        let num_tok = self.expect(TokenKind::NumberLiteral, "a line number")?;
        let number = match num_tok.literal {
            basic_ast::Literal::Number(n) => n as u32,
            _ => return Err(self.error("malformed line number")),
        };
        let source_line = self
            .source_lines
            .get((num_tok.source_line.saturating_sub(1)) as usize)
            .copied()
            .unwrap_or("")
            .to_string();

        let mut stmts = Vec::new();
        if !self.at_line_end() {
            loop {
                let stmt = statement::parse_statement(self)?;
                stmts.push(stmt);
                if self.matches(TokenKind::Colon) {
                    if self.at_line_end() {
                        break;
                    }
                    continue;
                }
                break;
            }
        }
        if !self.at_line_end() {
            return Err(self.error("unexpected trailing tokens"));
        }
        if self.check(TokenKind::NewLine) {
            self.advance();
        }
        let statement = if stmts.is_empty() {
            Statement::Empty
        } else {
            compound_or_single(stmts)
        };
        Ok(Line {
            number,
            statement,
            source: source_line,
        })
    }
}
