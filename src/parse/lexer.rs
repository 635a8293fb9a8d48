//! Positioned tokenizer shared by the net and automaton parsers.
use std::fmt;

use thiserror::Error;

#[derive(Debug, Error)]
#[error("line {line}, column {column}: {message}")]
pub struct ParseError {
    pub line: usize,
    pub column: usize,
    pub message: String,
}

impl ParseError {
    pub fn new(line: usize, column: usize, message: impl Into<String>) -> Self {
        Self {
            line,
            column,
            message: message.into(),
        }
    }

    pub fn at(token: &Token, message: impl Into<String>) -> Self {
        Self::new(token.line, token.column, message)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    Comma,
    Colon,
    Semicolon,
    Star,
    Number,
    Word,
    Eof,
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TokenKind::Comma => "','",
            TokenKind::Colon => "':'",
            TokenKind::Semicolon => "';'",
            TokenKind::Star => "'*'",
            TokenKind::Number => "number",
            TokenKind::Word => "identifier",
            TokenKind::Eof => "end of input",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone)]
pub struct Token {
    pub kind: TokenKind,
    pub text: String,
    pub line: usize,
    pub column: usize,
}

impl Token {
    pub fn is_word(&self, word: &str) -> bool {
        self.kind == TokenKind::Word && self.text == word
    }

    pub fn to_number(&self) -> Result<u64, ParseError> {
        self.text
            .parse::<u64>()
            .map_err(|_| ParseError::at(self, format!("number '{}' is out of range", self.text)))
    }

    /// What the token reads like in a diagnostic.
    pub fn describe(&self) -> String {
        match self.kind {
            TokenKind::Eof => "end of input".to_string(),
            _ => format!("'{}'", self.text),
        }
    }
}

/// Character-level tokenizer with one token of pushback. Comments are
/// `{...}`; `,`, `:` and `;` are always delimiters; `*` is a token of its
/// own only where the grammar uses it for infinity.
pub struct Lexer<'a> {
    input: &'a [u8],
    pos: usize,
    line: usize,
    column: usize,
    star_is_token: bool,
    pushed: Option<Token>,
}

impl<'a> Lexer<'a> {
    pub fn new(input: &'a str, star_is_token: bool) -> Self {
        Self {
            input: input.as_bytes(),
            pos: 0,
            line: 1,
            column: 1,
            star_is_token,
            pushed: None,
        }
    }

    pub fn push_back(&mut self, token: Token) {
        debug_assert!(self.pushed.is_none());
        self.pushed = Some(token);
    }

    pub fn next_token(&mut self) -> Result<Token, ParseError> {
        if let Some(token) = self.pushed.take() {
            return Ok(token);
        }

        self.skip_trivia();
        let (line, column) = (self.line, self.column);

        let Some(&c) = self.input.get(self.pos) else {
            return Ok(Token {
                kind: TokenKind::Eof,
                text: String::new(),
                line,
                column,
            });
        };

        let single = match c {
            b',' => Some(TokenKind::Comma),
            b':' => Some(TokenKind::Colon),
            b';' => Some(TokenKind::Semicolon),
            b'*' if self.star_is_token => Some(TokenKind::Star),
            _ => None,
        };
        if let Some(kind) = single {
            self.bump();
            return Ok(Token {
                kind,
                text: (c as char).to_string(),
                line,
                column,
            });
        }

        let start = self.pos;
        while let Some(&c) = self.input.get(self.pos) {
            if c.is_ascii_whitespace() || matches!(c, b',' | b':' | b';' | b'{') {
                break;
            }
            self.bump();
        }
        if self.pos == start {
            return Err(ParseError::new(
                line,
                column,
                format!("unexpected character '{}'", c as char),
            ));
        }

        let text = String::from_utf8_lossy(&self.input[start..self.pos]).into_owned();
        let kind = if text.bytes().all(|c| c.is_ascii_digit()) {
            TokenKind::Number
        } else {
            TokenKind::Word
        };
        Ok(Token {
            kind,
            text,
            line,
            column,
        })
    }

    fn skip_trivia(&mut self) {
        while let Some(&c) = self.input.get(self.pos) {
            if c.is_ascii_whitespace() {
                self.bump();
            } else if c == b'{' {
                while let Some(&c) = self.input.get(self.pos) {
                    self.bump();
                    if c == b'}' {
                        break;
                    }
                }
            } else {
                break;
            }
        }
    }

    fn bump(&mut self) {
        if self.input.get(self.pos) == Some(&b'\n') {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
        self.pos += 1;
    }
}
