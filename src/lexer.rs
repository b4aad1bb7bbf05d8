use crate::error::ParseError;
use crate::token::{Token, TokenType};

pub type LexResult<T> = Result<T, ParseError>;

/// Character-level scanner. Keeps a byte cursor into the input plus the
/// length of the token currently being matched; `emit` slices the matched
/// region out of the input and resets the length.
pub struct Lexer<'a> {
    input: &'a str,
    index: usize,
    length: usize,
}

impl<'a> Lexer<'a> {
    pub fn new(input: &'a str) -> Self {
        Self {
            input,
            index: 0,
            length: 0,
        }
    }

    pub fn lex(mut self) -> LexResult<Vec<Token<'a>>> {
        let mut tokens = Vec::new();
        while let Some(c) = self.peek(0) {
            if c.is_whitespace() {
                self.advance();
                self.length = 0;
            } else {
                tokens.push(self.lex_token()?);
            }
        }
        Ok(tokens)
    }

    /// Dispatches on the next character. Only peeks; each `lex_*` method
    /// consumes its own input.
    fn lex_token(&mut self) -> LexResult<Token<'a>> {
        match self.peek(0) {
            Some(c) if c.is_ascii_alphabetic() || c == '_' => Ok(self.lex_identifier()),
            Some(c) if c.is_ascii_digit() => Ok(self.lex_number()),
            Some('+') | Some('-')
                if matches!(self.peek(1), Some(d) if d.is_ascii_digit()) =>
            {
                Ok(self.lex_number())
            }
            Some('\'') => self.lex_character(),
            Some('"') => self.lex_string(),
            _ => Ok(self.lex_operator()),
        }
    }

    fn lex_identifier(&mut self) -> Token<'a> {
        self.advance();
        while matches!(self.peek(0), Some(c) if c.is_ascii_alphanumeric() || c == '_' || c == '-')
        {
            self.advance();
        }
        self.emit(TokenType::Identifier)
    }

    fn lex_number(&mut self) -> Token<'a> {
        if matches!(self.peek(0), Some('+') | Some('-')) {
            self.advance();
        }
        while matches!(self.peek(0), Some(c) if c.is_ascii_digit()) {
            self.advance();
        }
        // A '.' belongs to the number only when a digit follows; otherwise it
        // is left for the operator rule (e.g. a method call on a literal).
        if self.peek(0) == Some('.') && matches!(self.peek(1), Some(c) if c.is_ascii_digit()) {
            self.advance();
            while matches!(self.peek(0), Some(c) if c.is_ascii_digit()) {
                self.advance();
            }
            self.emit(TokenType::Decimal)
        } else {
            self.emit(TokenType::Integer)
        }
    }

    fn lex_character(&mut self) -> LexResult<Token<'a>> {
        self.advance();
        match self.peek(0) {
            Some('\\') => self.lex_escape()?,
            Some(c) if c != '\'' => self.advance(),
            _ => return Err(ParseError::new("Unrecognized character.", self.index)),
        }
        if self.peek(0) == Some('\'') {
            self.advance();
            Ok(self.emit(TokenType::Character))
        } else {
            Err(ParseError::new(
                "Unterminated character quote.",
                self.index,
            ))
        }
    }

    fn lex_string(&mut self) -> LexResult<Token<'a>> {
        self.advance();
        loop {
            match self.peek(0) {
                Some('"') => {
                    self.advance();
                    return Ok(self.emit(TokenType::String));
                }
                Some('\\') => self.lex_escape()?,
                Some(c) if c != '\n' && c != '\r' => self.advance(),
                _ => return Err(ParseError::new("Invalid string.", self.index)),
            }
        }
    }

    /// Consumes a `\x` pair. The cursor must sit on the backslash.
    fn lex_escape(&mut self) -> LexResult<()> {
        match self.peek(1) {
            Some('b' | 'n' | 'r' | 't' | '\'' | '"' | '\\') => {
                self.advance();
                self.advance();
                Ok(())
            }
            _ => Err(ParseError::new("Invalid escape sequence.", self.index)),
        }
    }

    fn lex_operator(&mut self) -> Token<'a> {
        match self.peek(0) {
            Some('<' | '>' | '!' | '=') => {
                self.advance();
                if self.peek(0) == Some('=') {
                    self.advance();
                }
            }
            _ => self.advance(),
        }
        self.emit(TokenType::Operator)
    }

    fn peek(&self, offset: usize) -> Option<char> {
        self.input[self.index..].chars().nth(offset)
    }

    fn advance(&mut self) {
        if let Some(c) = self.peek(0) {
            self.index += c.len_utf8();
            self.length += c.len_utf8();
        }
    }

    fn emit(&mut self, ty: TokenType) -> Token<'a> {
        let start = self.index - self.length;
        self.length = 0;
        Token::new(ty, &self.input[start..self.index], start)
    }
}

pub fn lex(input: &str) -> LexResult<Vec<Token<'_>>> {
    Lexer::new(input).lex()
}
