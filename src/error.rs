use crate::token::{Kind, Token};
use std::fmt;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CompilerError {
    #[error("IOError: {0}")]
    Io(#[from] std::io::Error),
    #[error("{0}")]
    Lexing(#[from] LexingError),
    #[error("{0}")]
    Syntax(#[from] SyntaxError),
    #[error("JSONError: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Debug, Clone, PartialEq, Error)]
#[error("[line {line}] Error: {message}")]
pub struct LexingError {
    pub line: usize,
    pub message: String,
}

impl LexingError {
    pub fn new(line: usize, message: impl Into<String>) -> Self {
        Self {
            line,
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SyntaxError {
    pub line: usize,
    pub lexeme: String,
    pub at_end: bool,
    pub message: String,
}

impl SyntaxError {
    pub fn from_token(token: &Token, message: impl Into<String>) -> Self {
        Self {
            line: token.line,
            lexeme: token.lexeme.clone(),
            at_end: token.kind == Kind::Eof,
            message: message.into(),
        }
    }

    pub fn location(&self) -> String {
        if self.at_end {
            "at end".to_string()
        } else {
            format!("at '{}'", self.lexeme)
        }
    }
}

impl std::error::Error for SyntaxError {}

impl fmt::Display for SyntaxError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "[line {}] Error {}: {}", self.line, self.location(), self.message)
    }
}

/// Ordered sink for every error reported while scanning and parsing one source unit.
#[derive(Debug, Default)]
pub struct Diagnostics {
    errors: Vec<CompilerError>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn report(&mut self, error: impl Into<CompilerError>) {
        let error = error.into();
        log::debug!("diagnostic: {}", error);
        self.errors.push(error);
    }

    pub fn had_error(&self) -> bool {
        !self.errors.is_empty()
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &CompilerError> {
        self.errors.iter()
    }

    pub fn messages(&self) -> Vec<String> {
        self.errors.iter().map(|e| e.to_string()).collect()
    }
}

impl IntoIterator for Diagnostics {
    type Item = CompilerError;
    type IntoIter = std::vec::IntoIter<CompilerError>;

    fn into_iter(self) -> Self::IntoIter {
        self.errors.into_iter()
    }
}
