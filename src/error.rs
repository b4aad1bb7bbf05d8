use thiserror::Error;

/// Failure in the lexer or parser. Fatal; the pipeline aborts on the first
/// one. `index` is the 0-based byte offset of the offending character or
/// token in the original source (or the end of input).
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("{message} (index {index})")]
pub struct ParseError {
    pub message: String,
    pub index: usize,
}

impl ParseError {
    pub fn new(message: impl Into<String>, index: usize) -> Self {
        Self {
            message: message.into(),
            index,
        }
    }
}

/// Failure in the analyzer. The analyzer stops at the first violation.
/// `index` is the byte offset of the offending node's leading token when
/// one is known; rules about the source as a whole carry none.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("{message}")]
pub struct AnalysisError {
    pub message: String,
    pub index: Option<usize>,
}

impl AnalysisError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            index: None,
        }
    }

    pub fn with_index(mut self, index: usize) -> Self {
        self.index = Some(index);
        self
    }
}

/// Failure while interpreting a program. Fatal to the current run.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("{message}")]
pub struct RuntimeError {
    pub message: String,
}

impl RuntimeError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}
