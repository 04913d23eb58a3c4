//! Recursive descent parser for the Ember source subset.
//!
//! [`parse`] turns source text into an [`ember_ir::Program`]. The grammar is
//! the JavaScript function/statement/expression syntax; constructs outside
//! the subset either fail here with [`CompileError::Syntax`] or are kept in
//! the tree so a later phase can reject them with a precise error.

mod cursor;
mod grammar;
pub mod lexer;

#[cfg(test)]
mod tests;

use ember_diagnostic::CompileError;
use ember_ir::ast::{Expr, ExprKind};
use ember_ir::{ExprId, Program, Span};

use cursor::Cursor;

/// Parse a whole source file.
#[tracing::instrument(level = "debug", skip_all, fields(len = source.len()))]
pub fn parse(source: &str) -> Result<Program, CompileError> {
    let tokens = lexer::tokenize(source)?;
    tracing::trace!(tokens = tokens.len(), "tokenized");
    let mut parser = Parser::new(source, tokens);
    let program = parser.parse_program()?;
    tracing::debug!(
        functions = program.functions.len(),
        exprs = parser.next_id,
        "parsed"
    );
    Ok(program)
}

pub(crate) struct Parser<'a> {
    cursor: Cursor<'a>,
    /// Next [`ExprId`] to hand out.
    next_id: u32,
}

impl<'a> Parser<'a> {
    fn new(source: &'a str, tokens: Vec<lexer::Token>) -> Self {
        Parser {
            cursor: Cursor::new(source, tokens),
            next_id: 0,
        }
    }

    fn alloc_expr(&mut self, kind: ExprKind, span: Span) -> Expr {
        let id = ExprId::new(self.next_id);
        self.next_id += 1;
        Expr::new(id, kind, span)
    }
}
