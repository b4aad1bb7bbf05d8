use num_bigint::BigInt;

use crate::ast::{BinOp, Expr, Field, Literal, Method, Source, Stmt};
use crate::error::ParseError;
use crate::token::{Token, TokenType};

pub type ParseResult<T> = Result<T, ParseError>;

/// A single lookahead pattern: a token type or an exact literal.
#[derive(Clone, Copy)]
enum Pat<'p> {
    Ty(TokenType),
    Lit(&'p str),
}

/// Recursive-descent parser over the token stream, one method per grammar
/// rule. All stream access funnels through `peek`/`take`. Every AST node
/// records the byte offset of its operative token so later stages can
/// position their errors.
pub struct Parser<'t, 'src> {
    tokens: &'t [Token<'src>],
    index: usize,
}

impl<'t, 'src> Parser<'t, 'src> {
    pub fn new(tokens: &'t [Token<'src>]) -> Self {
        Self { tokens, index: 0 }
    }

    // source ::= field* method*
    pub fn parse_source(mut self) -> ParseResult<Source> {
        let mut source = Source::default();
        while self.has(0) {
            if self.take_lit("LET") {
                source.fields.push(self.parse_field()?);
            } else if self.take_lit("DEF") {
                source.methods.push(self.parse_method()?);
            } else {
                return Err(self.error("Expected a field or method declaration."));
            }
        }
        Ok(source)
    }

    // field ::= 'LET' IDENT (':' IDENT)? ('=' expression)? ';'
    // The 'LET' keyword has already been consumed.
    fn parse_field(&mut self) -> ParseResult<Field> {
        let index = self.previous_index();
        let (name, type_name, value) = self.parse_declaration()?;
        Ok(Field {
            name,
            type_name,
            value,
            variable: None,
            index,
        })
    }

    // method ::= 'DEF' IDENT '(' (param (',' param)*)? ')' (':' IDENT)?
    //            'DO' statement* 'END'
    // param  ::= IDENT (':' IDENT)?
    // The 'DEF' keyword has already been consumed.
    fn parse_method(&mut self) -> ParseResult<Method> {
        let index = self.previous_index();
        let name = self.expect_identifier("Expected a method name.")?;
        if !self.take_lit("(") {
            return Err(self.error("Expected an opening parenthesis."));
        }
        let mut parameters = Vec::new();
        let mut parameter_type_names = Vec::new();
        if !self.peek_lit(")") {
            loop {
                parameters.push(self.expect_identifier("Expected a parameter name.")?);
                parameter_type_names.push(self.parse_type_annotation()?);
                if !self.take_lit(",") {
                    break;
                }
                if self.peek_lit(")") {
                    return Err(self.error("Missing parameter after comma."));
                }
            }
        }
        if !self.take_lit(")") {
            return Err(self.error("Missing closing parenthesis."));
        }
        let return_type_name = self.parse_type_annotation()?;
        if !self.take_lit("DO") {
            return Err(self.error("Expected DO statement."));
        }
        let mut statements = Vec::new();
        while !self.take_lit("END") {
            statements.push(self.parse_statement()?);
        }
        Ok(Method {
            name,
            parameters,
            parameter_type_names,
            return_type_name,
            statements,
            function: None,
            index,
        })
    }

    fn parse_statement(&mut self) -> ParseResult<Stmt> {
        let index = self.current_index();
        if self.take_lit("LET") {
            let (name, type_name, value) = self.parse_declaration()?;
            Ok(Stmt::Declaration {
                name,
                type_name,
                value,
                variable: None,
                index,
            })
        } else if self.take_lit("IF") {
            self.parse_if_statement()
        } else if self.take_lit("FOR") {
            self.parse_for_statement()
        } else if self.take_lit("WHILE") {
            self.parse_while_statement()
        } else if self.take_lit("RETURN") {
            let value = self.parse_expression()?;
            if !self.take_lit(";") {
                return Err(self.error("Missing semicolon."));
            }
            Ok(Stmt::Return { value, index })
        } else {
            let expr = self.parse_expression()?;
            if self.take_lit("=") {
                let value = self.parse_expression()?;
                if !self.take_lit(";") {
                    return Err(self.error("Missing semicolon."));
                }
                Ok(Stmt::Assignment {
                    receiver: expr,
                    value,
                    index,
                })
            } else if self.take_lit(";") {
                Ok(Stmt::Expression { expr, index })
            } else {
                Err(self.error("Missing semicolon."))
            }
        }
    }

    // declaration ::= IDENT (':' IDENT)? ('=' expression)? ';'
    // The leading 'LET' has already been consumed.
    fn parse_declaration(&mut self) -> ParseResult<(String, Option<String>, Option<Expr>)> {
        let name = self.expect_identifier("Invalid identifier.")?;
        let type_name = self.parse_type_annotation()?;
        let value = if self.take_lit("=") {
            Some(self.parse_expression()?)
        } else {
            None
        };
        if !self.take_lit(";") {
            return Err(self.error("Missing semicolon."));
        }
        Ok((name, type_name, value))
    }

    fn parse_type_annotation(&mut self) -> ParseResult<Option<String>> {
        if !self.take_lit(":") {
            return Ok(None);
        }
        let name = self.expect_identifier("Expected a type name.")?;
        Ok(Some(name))
    }

    // Consumed up to and including 'IF'.
    fn parse_if_statement(&mut self) -> ParseResult<Stmt> {
        let index = self.previous_index();
        let condition = self.parse_expression()?;
        if !self.take_lit("DO") {
            return Err(self.error("Missing DO."));
        }
        let mut then_statements = Vec::new();
        let mut else_statements = Vec::new();
        while !self.take_lit("ELSE") && !self.take_lit("END") {
            then_statements.push(self.parse_statement()?);
        }
        if self.previous_literal() == Some("ELSE") {
            while !self.take_lit("END") {
                else_statements.push(self.parse_statement()?);
            }
        }
        Ok(Stmt::If {
            condition,
            then_statements,
            else_statements,
            index,
        })
    }

    // Consumed up to and including 'FOR'.
    fn parse_for_statement(&mut self) -> ParseResult<Stmt> {
        let index = self.previous_index();
        let name = self.expect_identifier("Expected a loop variable.")?;
        if !self.take_lit("IN") {
            return Err(self.error("Expected IN."));
        }
        let iterable = self.parse_expression()?;
        if !self.take_lit("DO") {
            return Err(self.error("Missing DO."));
        }
        let mut body = Vec::new();
        while !self.take_lit("END") {
            body.push(self.parse_statement()?);
        }
        Ok(Stmt::For {
            name,
            iterable,
            body,
            index,
        })
    }

    // Consumed up to and including 'WHILE'.
    fn parse_while_statement(&mut self) -> ParseResult<Stmt> {
        let index = self.previous_index();
        let condition = self.parse_expression()?;
        if !self.take_lit("DO") {
            return Err(self.error("Missing DO."));
        }
        let mut body = Vec::new();
        while !self.take_lit("END") {
            body.push(self.parse_statement()?);
        }
        Ok(Stmt::While {
            condition,
            body,
            index,
        })
    }

    pub fn parse_expression(&mut self) -> ParseResult<Expr> {
        self.parse_logical()
    }

    // logical ::= equality (('AND' | 'OR') equality)*
    fn parse_logical(&mut self) -> ParseResult<Expr> {
        let mut expr = self.parse_equality()?;
        loop {
            let index = self.current_index();
            let op = if self.take_lit("AND") {
                BinOp::And
            } else if self.take_lit("OR") {
                BinOp::Or
            } else {
                break;
            };
            let right = self.parse_equality()?;
            expr = Expr::binary(op, expr, right, index);
        }
        Ok(expr)
    }

    // equality ::= additive (('<'|'<='|'>'|'>='|'=='|'!=') additive)*
    fn parse_equality(&mut self) -> ParseResult<Expr> {
        let mut expr = self.parse_additive()?;
        loop {
            let index = self.current_index();
            let op = if self.take_lit("<=") {
                BinOp::Le
            } else if self.take_lit("<") {
                BinOp::Lt
            } else if self.take_lit(">=") {
                BinOp::Ge
            } else if self.take_lit(">") {
                BinOp::Gt
            } else if self.take_lit("==") {
                BinOp::Eq
            } else if self.take_lit("!=") {
                BinOp::Ne
            } else {
                break;
            };
            let right = self.parse_additive()?;
            expr = Expr::binary(op, expr, right, index);
        }
        Ok(expr)
    }

    // additive ::= multiplicative (('+' | '-') multiplicative)*
    fn parse_additive(&mut self) -> ParseResult<Expr> {
        let mut expr = self.parse_multiplicative()?;
        loop {
            let index = self.current_index();
            let op = if self.take_lit("+") {
                BinOp::Add
            } else if self.take_lit("-") {
                BinOp::Sub
            } else {
                break;
            };
            let right = self.parse_multiplicative()?;
            expr = Expr::binary(op, expr, right, index);
        }
        Ok(expr)
    }

    // multiplicative ::= secondary (('*' | '/') secondary)*
    fn parse_multiplicative(&mut self) -> ParseResult<Expr> {
        let mut expr = self.parse_secondary()?;
        loop {
            let index = self.current_index();
            let op = if self.take_lit("*") {
                BinOp::Mul
            } else if self.take_lit("/") {
                BinOp::Div
            } else {
                break;
            };
            let right = self.parse_secondary()?;
            expr = Expr::binary(op, expr, right, index);
        }
        Ok(expr)
    }

    // secondary ::= primary ('.' IDENT ('(' arguments? ')')?)*
    fn parse_secondary(&mut self) -> ParseResult<Expr> {
        let mut expr = self.parse_primary()?;
        while self.take_lit(".") {
            let name =
                self.expect_identifier("Invalid identifier following secondary expression.")?;
            let index = self.previous_index();
            if self.take_lit("(") {
                let args = self.parse_arguments()?;
                expr = Expr::function(Some(expr), name, args, index);
            } else {
                expr = Expr::access(Some(expr), name, index);
            }
        }
        Ok(expr)
    }

    fn parse_primary(&mut self) -> ParseResult<Expr> {
        let index = self.current_index();
        if self.take_lit("NIL") {
            Ok(Expr::literal(Literal::Nil, index))
        } else if self.take_lit("TRUE") {
            Ok(Expr::literal(Literal::Boolean(true), index))
        } else if self.take_lit("FALSE") {
            Ok(Expr::literal(Literal::Boolean(false), index))
        } else if self.take_ty(TokenType::Integer) {
            let literal = self.previous_literal().unwrap_or_default();
            let value = literal
                .parse::<BigInt>()
                .map_err(|_| ParseError::new("Invalid integer literal.", index))?;
            Ok(Expr::literal(Literal::Integer(value), index))
        } else if self.take_ty(TokenType::Decimal) {
            let literal = self.previous_literal().unwrap_or_default();
            let value = literal
                .parse()
                .map_err(|_| ParseError::new("Invalid decimal literal.", index))?;
            Ok(Expr::literal(Literal::Decimal(value), index))
        } else if self.take_ty(TokenType::Character) {
            let inner = self
                .unquoted_previous()
                .ok_or_else(|| ParseError::new("Invalid character literal.", index))?;
            let decoded = decode_escapes(inner, index)?;
            let mut chars = decoded.chars();
            match (chars.next(), chars.next()) {
                (Some(c), None) => Ok(Expr::literal(Literal::Character(c), index)),
                _ => Err(ParseError::new("Invalid character literal.", index)),
            }
        } else if self.take_ty(TokenType::String) {
            let inner = self
                .unquoted_previous()
                .ok_or_else(|| ParseError::new("Invalid string literal.", index))?;
            let decoded = decode_escapes(inner, index)?;
            Ok(Expr::literal(Literal::String(decoded), index))
        } else if self.take_ty(TokenType::Identifier) {
            let name = self.previous_literal().unwrap_or_default().to_string();
            if self.take_lit("(") {
                let args = self.parse_arguments()?;
                Ok(Expr::function(None, name, args, index))
            } else {
                Ok(Expr::access(None, name, index))
            }
        } else if self.take_lit("(") {
            let inner = self.parse_expression()?;
            if !self.take_lit(")") {
                return Err(self.error("Expected closing parenthesis."));
            }
            Ok(Expr::group(inner, index))
        } else {
            Err(self.error("Invalid primary expression."))
        }
    }

    // arguments ::= expression (',' expression)*
    // The opening parenthesis has already been consumed.
    fn parse_arguments(&mut self) -> ParseResult<Vec<Expr>> {
        let mut args = Vec::new();
        if self.take_lit(")") {
            return Ok(args);
        }
        loop {
            args.push(self.parse_expression()?);
            if self.take_lit(",") {
                if self.peek_lit(")") {
                    return Err(self.error("Missing argument in function call."));
                }
            } else if self.take_lit(")") {
                return Ok(args);
            } else {
                return Err(self.error("Expected closing parenthesis."));
            }
        }
    }

    /// True when the next tokens match `patterns`, one token per pattern.
    fn peek(&self, patterns: &[Pat<'_>]) -> bool {
        patterns.iter().enumerate().all(|(offset, pattern)| {
            match self.tokens.get(self.index + offset) {
                Some(token) => match pattern {
                    Pat::Ty(ty) => token.ty == *ty,
                    Pat::Lit(literal) => token.literal == *literal,
                },
                None => false,
            }
        })
    }

    /// Like `peek`, but advances past the window on a full match.
    fn take(&mut self, patterns: &[Pat<'_>]) -> bool {
        let matched = self.peek(patterns);
        if matched {
            self.index += patterns.len();
        }
        matched
    }

    fn peek_lit(&self, literal: &str) -> bool {
        self.peek(&[Pat::Lit(literal)])
    }

    fn take_lit(&mut self, literal: &str) -> bool {
        self.take(&[Pat::Lit(literal)])
    }

    fn take_ty(&mut self, ty: TokenType) -> bool {
        self.take(&[Pat::Ty(ty)])
    }

    fn expect_identifier(&mut self, message: &str) -> ParseResult<String> {
        if self.take_ty(TokenType::Identifier) {
            Ok(self.previous_literal().unwrap_or_default().to_string())
        } else {
            Err(self.error(message))
        }
    }

    fn has(&self, offset: usize) -> bool {
        self.index + offset < self.tokens.len()
    }

    fn previous(&self) -> Option<&Token<'src>> {
        self.index.checked_sub(1).and_then(|i| self.tokens.get(i))
    }

    fn previous_literal(&self) -> Option<&'src str> {
        self.previous().map(|token| token.literal)
    }

    fn previous_index(&self) -> usize {
        self.previous().map(|token| token.index).unwrap_or(0)
    }

    /// The previous token's literal with its surrounding quotes stripped.
    /// `None` if the literal is too short to carry both quotes.
    fn unquoted_previous(&self) -> Option<&'src str> {
        let literal = self.previous_literal()?;
        literal.get(1..literal.len().checked_sub(1)?)
    }

    fn error(&self, message: &str) -> ParseError {
        ParseError::new(message, self.current_index())
    }

    /// Byte offset of the current token, or the end of input.
    fn current_index(&self) -> usize {
        match self.tokens.get(self.index) {
            Some(token) => token.index,
            None => self
                .tokens
                .last()
                .map(|token| token.index + token.literal.len())
                .unwrap_or(0),
        }
    }
}

/// Replaces the `\b \n \r \t \' \" \\` escapes in a raw literal body. A
/// single left-to-right pass, so a decoded backslash is never re-examined.
fn decode_escapes(raw: &str, index: usize) -> ParseResult<String> {
    let mut decoded = String::with_capacity(raw.len());
    let mut chars = raw.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            decoded.push(c);
            continue;
        }
        match chars.next() {
            Some('b') => decoded.push('\u{0008}'),
            Some('n') => decoded.push('\n'),
            Some('r') => decoded.push('\r'),
            Some('t') => decoded.push('\t'),
            Some('\'') => decoded.push('\''),
            Some('"') => decoded.push('"'),
            Some('\\') => decoded.push('\\'),
            _ => return Err(ParseError::new("Invalid escape sequence.", index)),
        }
    }
    Ok(decoded)
}

pub fn parse(tokens: &[Token<'_>]) -> ParseResult<Source> {
    Parser::new(tokens).parse_source()
}
