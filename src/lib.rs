//! Lexer and parser front end for Lox.
//!
//! Source text flows through [`lexer::scan`] into a token list, and through
//! [`parser::parse`] into a list of [`ast::Stmt`]. Both phases report errors
//! through a caller-supplied callback and keep going, so one pass collects
//! every diagnostic in the source unit.

pub mod ast;
pub mod config;
pub mod error;
pub mod lexer;
pub mod parser;
pub mod printer;
pub mod token;

use crate::ast::Stmt;
use crate::error::Diagnostics;

pub use crate::lexer::scan;
pub use crate::parser::parse;

/// Scans and parses `source`, returning the tree only when no error was reported.
pub fn parse_source(source: &str) -> Result<Vec<Stmt>, Diagnostics> {
    let mut diagnostics = Diagnostics::new();

    let tokens = scan(source, |err| diagnostics.report(err));
    let statements = parse(tokens, |err| diagnostics.report(err));

    if diagnostics.had_error() {
        Err(diagnostics)
    } else {
        Ok(statements)
    }
}
