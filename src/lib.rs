//! `plc` library crate.
//!
//! High-level layout:
//! - frontend: `lexer` + `parser` produce the shared AST (`ast`)
//! - `analyzer` resolves types and binds symbols onto the tree
//! - backends: `backend::interpreter` (AST-walk) and `backend::generator`
//!   (Java source emission), both consuming the analyzed AST
//!
//! Each stage fails fast on the first error; parse errors carry a byte
//! offset into the original source.

pub mod analyzer;
pub mod ast;
pub mod backend;
pub mod environment;
pub mod error;
pub mod lexer;
pub mod parser;
pub mod token;

pub use backend::generator::generate;
pub use backend::interpreter::{interpret, Evaluation, Interpreter, PlcObject};
pub use error::{AnalysisError, ParseError, RuntimeError};
pub use token::{Token, TokenType};

pub fn lex(input: &str) -> Result<Vec<Token<'_>>, ParseError> {
    lexer::lex(input)
}

pub fn parse(tokens: &[Token<'_>]) -> Result<ast::Source, ParseError> {
    parser::parse(tokens)
}

pub fn analyze(source: &mut ast::Source) -> Result<(), AnalysisError> {
    analyzer::analyze(source)
}
