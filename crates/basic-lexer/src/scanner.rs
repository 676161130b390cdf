//! Forward-scan tokenizer.

use crate::keywords;
use basic_ast::{Literal, Token, TokenKind};
use std::fmt;

#[derive(Debug, Clone, PartialEq)]
pub struct LexerError {
    pub line: u32,
    pub message: String,
}

impl fmt::Display for LexerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Syntax error at line {}: {}", self.line, self.message)
    }
}

impl std::error::Error for LexerError {}

pub struct Lexer<'a> {
    chars: std::iter::Peekable<std::str::Chars<'a>>,
    line: u32,
    tokens: Vec<Token>,
}

impl<'a> Lexer<'a> {
    pub fn new(source: &'a str) -> Self {
        Self {
            chars: source.chars().peekable(),
            line: 1,
            tokens: Vec::new(),
        }
    }

    pub fn tokenize(source: &'a str) -> Result<Vec<Token>, LexerError> {
        let mut lexer = Self::new(source);
        lexer.run()?;
        Ok(lexer.tokens)
    }

    fn push(&mut self, kind: TokenKind, lexeme: impl Into<String>, literal: Literal) {
        self.tokens.push(Token::new(kind, lexeme, literal, self.line));
    }

    fn peek(&mut self) -> Option<char> {
        self.chars.peek().copied()
    }

    fn peek2(&mut self) -> Option<char> {
        let mut clone = self.chars.clone();
        clone.next();
        clone.next()
    }

    fn advance(&mut self) -> Option<char> {
        self.chars.next()
    }

    fn run(&mut self) -> Result<(), LexerError> {
        loop {
            match self.peek() {
                None => break,
                Some(c) if c == '\r' => {
                    self.advance();
                }
                Some(c) if c == '\n' => {
                    self.advance();
                    self.push(TokenKind::NewLine, "\n", Literal::None);
                    self.line += 1;
                }
                Some(c) if c.is_whitespace() => {
                    self.advance();
                }
                Some('\'') => self.scan_comment(),
                Some(c) if c.is_ascii_digit() => self.scan_number()?,
                Some('.') if self.peek2().is_some_and(|c| c.is_ascii_digit()) => {
                    self.scan_number()?
                }
                Some('&') => self.scan_radix_number()?,
                Some('"') => self.scan_string()?,
                Some(c) if c.is_alphabetic() || c == '_' => self.scan_identifier_or_keyword()?,
                Some(_) => self.scan_punctuation()?,
            }
        }
        self.push(TokenKind::Eof, "", Literal::None);
        Ok(())
    }

    fn scan_comment(&mut self) {
        // `'` and `REM` both swallow to end of line (spec.md §4.A).
        while let Some(c) = self.peek() {
            if c == '\n' {
                break;
            }
            self.advance();
        }
    }

    fn scan_number(&mut self) -> Result<(), LexerError> {
        let mut lexeme = String::new();
        while let Some(c) = self.peek() {
            if c.is_ascii_digit() {
                lexeme.push(c);
                self.advance();
            } else {
                break;
            }
        }
        if self.peek() == Some('.') {
            lexeme.push('.');
            self.advance();
            while let Some(c) = self.peek() {
                if c.is_ascii_digit() {
                    lexeme.push(c);
                    self.advance();
                } else {
                    break;
                }
            }
        }
        if matches!(self.peek(), Some('e') | Some('E') | Some('d') | Some('D')) {
            let mut clone = self.chars.clone();
            let exp_marker = clone.next();
            let mut has_digits = false;
            let mut tmp = clone.clone();
            if matches!(tmp.peek(), Some('+') | Some('-')) {
                tmp.next();
            }
            if matches!(tmp.peek(), Some(c) if c.is_ascii_digit()) {
                has_digits = true;
            }
            if has_digits {
                lexeme.push('E');
                self.advance();
                let _ = exp_marker;
                if matches!(self.peek(), Some('+') | Some('-')) {
                    lexeme.push(self.advance().unwrap());
                }
                while let Some(c) = self.peek() {
                    if c.is_ascii_digit() {
                        lexeme.push(c);
                        self.advance();
                    } else {
                        break;
                    }
                }
            }
        }
        // Trailing type sigil: part of the lexeme but not the numeric text.
        let mut sigil = String::new();
        if matches!(self.peek(), Some('%') | Some('&') | Some('!') | Some('#')) {
            sigil.push(self.advance().unwrap());
        }
        let value: f64 = lexeme.parse().map_err(|_| LexerError {
            line: self.line,
            message: format!("invalid numeric literal '{lexeme}'"),
        })?;
        let full = format!("{lexeme}{sigil}");
        self.push(TokenKind::NumberLiteral, full, Literal::Number(value));
        Ok(())
    }

    fn scan_radix_number(&mut self) -> Result<(), LexerError> {
        self.advance(); // '&'
        let radix_char = self.peek();
        let (radix, prefix) = match radix_char {
            Some('h') | Some('H') => {
                self.advance();
                (16u32, "&H")
            }
            Some('o') | Some('O') => {
                self.advance();
                (8u32, "&O")
            }
            _ => (8u32, "&"), // bare `&377` is octal in classic BASIC
        };
        let mut digits = String::new();
        while let Some(c) = self.peek() {
            if c.is_digit(radix) {
                digits.push(c);
                self.advance();
            } else {
                break;
            }
        }
        if digits.is_empty() {
            return Err(LexerError {
                line: self.line,
                message: "malformed hex/octal literal".into(),
            });
        }
        let value = i64::from_str_radix(&digits, radix).map_err(|_| LexerError {
            line: self.line,
            message: format!("invalid literal '{prefix}{digits}'"),
        })? as f64;
        self.push(
            TokenKind::NumberLiteral,
            format!("{prefix}{digits}"),
            Literal::Number(value),
        );
        Ok(())
    }

    fn scan_string(&mut self) -> Result<(), LexerError> {
        self.advance(); // opening quote
        let mut text = String::new();
        loop {
            match self.advance() {
                Some('"') => break,
                Some('\n') | None => {
                    return Err(LexerError {
                        line: self.line,
                        message: "unterminated string".into(),
                    });
                }
                Some(c) => text.push(c),
            }
        }
        self.push(
            TokenKind::StringLiteral,
            format!("\"{text}\""),
            Literal::Text(text),
        );
        Ok(())
    }

    fn scan_identifier_or_keyword(&mut self) -> Result<(), LexerError> {
        let mut lexeme = String::new();
        while let Some(c) = self.peek() {
            if c.is_alphanumeric() || c == '_' {
                lexeme.push(c);
                self.advance();
            } else {
                break;
            }
        }
        if matches!(self.peek(), Some('$') | Some('%') | Some('&') | Some('!') | Some('#')) {
            lexeme.push(self.advance().unwrap());
        }
        if let Some(kind) = keywords::lookup(&lexeme) {
            if kind == TokenKind::Data {
                // DATA swallows the remainder of the line verbatim (spec.md §4.A);
                // the parser stores it raw and the evaluator comma-splits it later.
                let mut raw = String::new();
                while let Some(c) = self.peek() {
                    if c == '\n' {
                        break;
                    }
                    raw.push(c);
                    self.advance();
                }
                self.push(kind, lexeme, Literal::Text(raw));
            } else if kind == TokenKind::Rem {
                // REM swallows to end of line exactly like `'` (spec.md §4.A);
                // no token is emitted, same as scan_comment.
                self.scan_comment();
            } else {
                self.push(kind, lexeme, Literal::None);
            }
        } else {
            self.push(TokenKind::Identifier, lexeme, Literal::None);
        }
        Ok(())
    }

    fn scan_punctuation(&mut self) -> Result<(), LexerError> {
        let c = self.advance().unwrap();
        let (kind, lexeme) = match c {
            '+' => (TokenKind::Plus, "+".to_string()),
            '-' => (TokenKind::Minus, "-".to_string()),
            '*' => (TokenKind::Star, "*".to_string()),
            '/' => (TokenKind::Slash, "/".to_string()),
            '\\' => (TokenKind::Backslash, "\\".to_string()),
            '^' => (TokenKind::Caret, "^".to_string()),
            '(' => (TokenKind::LParen, "(".to_string()),
            ')' => (TokenKind::RParen, ")".to_string()),
            ',' => (TokenKind::Comma, ",".to_string()),
            ';' => (TokenKind::Semicolon, ";".to_string()),
            ':' => (TokenKind::Colon, ":".to_string()),
            '#' => (TokenKind::Hash, "#".to_string()),
            '.' => (TokenKind::Dot, ".".to_string()),
            '=' => (TokenKind::Equal, "=".to_string()),
            '<' => {
                if self.peek() == Some('=') {
                    self.advance();
                    (TokenKind::LessEqual, "<=".to_string())
                } else if self.peek() == Some('>') {
                    self.advance();
                    (TokenKind::NotEqual, "<>".to_string())
                } else {
                    (TokenKind::Less, "<".to_string())
                }
            }
            '>' => {
                if self.peek() == Some('=') {
                    self.advance();
                    (TokenKind::GreaterEqual, ">=".to_string())
                } else {
                    (TokenKind::Greater, ">".to_string())
                }
            }
            other => {
                return Err(LexerError {
                    line: self.line,
                    message: format!("unexpected character '{other}'"),
                });
            }
        };
        self.push(kind, lexeme, Literal::None);
        Ok(())
    }
}
