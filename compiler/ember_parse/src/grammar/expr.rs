//! Expressions.
//!
//! Assignment and the logical operators have their own levels; the binary
//! operators between unary and `&&` use precedence climbing over
//! [`BinaryOp::precedence`].

use ember_diagnostic::CompileError;
use ember_ir::ast::{AssignOp, BinaryOp, Expr, ExprKind, LogicalOp, UnaryOp, UpdateOp};
use ember_stack::ensure_sufficient_stack;

use crate::lexer::TokenKind;
use crate::Parser;

impl Parser<'_> {
    pub(crate) fn parse_expr(&mut self) -> Result<Expr, CompileError> {
        ensure_sufficient_stack(|| self.parse_assignment())
    }

    /// `target op= value`, right associative.
    fn parse_assignment(&mut self) -> Result<Expr, CompileError> {
        let target = self.parse_logical(LogicalOp::Or)?;
        let Some(op) = assign_op(self.cursor.current_kind()) else {
            return Ok(target);
        };
        self.cursor.advance();
        check_target(&target)?;
        let value = self.parse_expr()?;
        let span = target.span.merge(value.span);
        Ok(self.alloc_expr(
            ExprKind::Assign {
                op,
                target: Box::new(target),
                value: Box::new(value),
            },
            span,
        ))
    }

    /// `||` binds looser than `&&`; both are left associative.
    fn parse_logical(&mut self, op: LogicalOp) -> Result<Expr, CompileError> {
        let (token, next) = match op {
            LogicalOp::Or => (TokenKind::PipePipe, Some(LogicalOp::And)),
            LogicalOp::And => (TokenKind::AmpAmp, None),
        };
        let operand = |p: &mut Self| match next {
            Some(next) => p.parse_logical(next),
            None => p.parse_binary(0),
        };

        let mut left = operand(self)?;
        while self.cursor.eat(&token) {
            let right = operand(self)?;
            let span = left.span.merge(right.span);
            left = self.alloc_expr(
                ExprKind::Logical {
                    op,
                    left: Box::new(left),
                    right: Box::new(right),
                },
                span,
            );
        }
        Ok(left)
    }

    /// Binary operators with precedence at least `min_prec`.
    fn parse_binary(&mut self, min_prec: u8) -> Result<Expr, CompileError> {
        let mut left = self.parse_unary()?;
        while let Some(op) = binary_op(self.cursor.current_kind()) {
            let prec = op.precedence();
            if prec < min_prec {
                break;
            }
            self.cursor.advance();
            // `**` is right associative.
            let next_min = if op == BinaryOp::Pow { prec } else { prec + 1 };
            let right = self.parse_binary(next_min)?;
            let span = left.span.merge(right.span);
            left = self.alloc_expr(
                ExprKind::Binary {
                    op,
                    left: Box::new(left),
                    right: Box::new(right),
                },
                span,
            );
        }
        Ok(left)
    }

    fn parse_unary(&mut self) -> Result<Expr, CompileError> {
        ensure_sufficient_stack(|| self.parse_unary_inner())
    }

    fn parse_unary_inner(&mut self) -> Result<Expr, CompileError> {
        let start = self.cursor.current_span();
        let unary = match self.cursor.current_kind() {
            TokenKind::Bang => Some(UnaryOp::Not),
            TokenKind::Minus => Some(UnaryOp::Neg),
            TokenKind::Plus => Some(UnaryOp::Plus),
            TokenKind::Tilde => Some(UnaryOp::BitNot),
            _ => None,
        };
        if let Some(op) = unary {
            self.cursor.advance();
            let operand = self.parse_unary()?;
            let span = start.merge(operand.span);
            return Ok(self.alloc_expr(
                ExprKind::Unary {
                    op,
                    operand: Box::new(operand),
                },
                span,
            ));
        }

        let update = match self.cursor.current_kind() {
            TokenKind::PlusPlus => Some(UpdateOp::Increment),
            TokenKind::MinusMinus => Some(UpdateOp::Decrement),
            _ => None,
        };
        if let Some(op) = update {
            self.cursor.advance();
            let target = self.parse_unary()?;
            check_target(&target)?;
            let span = start.merge(target.span);
            return Ok(self.alloc_expr(
                ExprKind::Update {
                    op,
                    prefix: true,
                    target: Box::new(target),
                },
                span,
            ));
        }

        self.parse_postfix()
    }

    /// Calls, indexing, member access and postfix `++`/`--`.
    fn parse_postfix(&mut self) -> Result<Expr, CompileError> {
        let mut expr = self.parse_primary()?;
        loop {
            match self.cursor.current_kind() {
                TokenKind::LParen => {
                    self.cursor.advance();
                    let args = self.parse_list(&TokenKind::RParen)?;
                    let span = expr.span.merge(self.cursor.previous_span());
                    expr = self.alloc_expr(
                        ExprKind::Call {
                            callee: Box::new(expr),
                            args,
                        },
                        span,
                    );
                }
                TokenKind::LBracket => {
                    self.cursor.advance();
                    let index = self.parse_expr()?;
                    let end = self.cursor.expect(&TokenKind::RBracket)?;
                    let span = expr.span.merge(end);
                    expr = self.alloc_expr(
                        ExprKind::Index {
                            object: Box::new(expr),
                            index: Box::new(index),
                        },
                        span,
                    );
                }
                TokenKind::Dot => {
                    self.cursor.advance();
                    let Some(property) = self.eat_ident() else {
                        return Err(self.cursor.unexpected("a property name"));
                    };
                    let span = expr.span.merge(property.span);
                    expr = self.alloc_expr(
                        ExprKind::Member {
                            object: Box::new(expr),
                            property,
                        },
                        span,
                    );
                }
                TokenKind::PlusPlus | TokenKind::MinusMinus
                    if !self.cursor.newline_before_current() =>
                {
                    let op = if self.cursor.check(&TokenKind::PlusPlus) {
                        UpdateOp::Increment
                    } else {
                        UpdateOp::Decrement
                    };
                    let end = self.cursor.advance().span;
                    check_target(&expr)?;
                    let span = expr.span.merge(end);
                    expr = self.alloc_expr(
                        ExprKind::Update {
                            op,
                            prefix: false,
                            target: Box::new(expr),
                        },
                        span,
                    );
                }
                _ => return Ok(expr),
            }
        }
    }

    fn parse_primary(&mut self) -> Result<Expr, CompileError> {
        let token = self.cursor.current().clone();
        let kind = match token.kind {
            TokenKind::Number(value) => ExprKind::Number(value),
            TokenKind::True => ExprKind::Bool(true),
            TokenKind::False => ExprKind::Bool(false),
            TokenKind::Ident(name) => ExprKind::Ident(name),
            TokenKind::LParen => {
                self.cursor.advance();
                let inner = self.parse_expr()?;
                self.cursor.expect(&TokenKind::RParen)?;
                return Ok(inner);
            }
            TokenKind::LBracket => {
                self.cursor.advance();
                let elements = self.parse_list(&TokenKind::RBracket)?;
                let span = token.span.merge(self.cursor.previous_span());
                return Ok(self.alloc_expr(ExprKind::Array(elements), span));
            }
            TokenKind::Function => {
                return Err(CompileError::syntax(
                    "function expressions are not supported",
                    token.span,
                ));
            }
            _ => return Err(self.cursor.unexpected("an expression")),
        };
        self.cursor.advance();
        Ok(self.alloc_expr(kind, token.span))
    }

    /// Comma-separated expressions up to and including `close`. A trailing
    /// comma is allowed.
    fn parse_list(&mut self, close: &TokenKind) -> Result<Vec<Expr>, CompileError> {
        let mut items = Vec::new();
        while !self.cursor.check(close) {
            items.push(self.parse_expr()?);
            if !self.cursor.eat(&TokenKind::Comma) {
                break;
            }
        }
        self.cursor.expect(close)?;
        Ok(items)
    }
}

fn check_target(target: &Expr) -> Result<(), CompileError> {
    match target.kind {
        ExprKind::Ident(_) | ExprKind::Index { .. } | ExprKind::Member { .. } => Ok(()),
        _ => Err(CompileError::syntax(
            format!("invalid assignment target: {}", target.kind.describe()),
            target.span,
        )),
    }
}

fn assign_op(kind: &TokenKind) -> Option<AssignOp> {
    let compound = |op| Some(AssignOp::Compound(op));
    match kind {
        TokenKind::Eq => Some(AssignOp::Assign),
        TokenKind::PlusEq => compound(BinaryOp::Add),
        TokenKind::MinusEq => compound(BinaryOp::Sub),
        TokenKind::StarEq => compound(BinaryOp::Mul),
        TokenKind::SlashEq => compound(BinaryOp::Div),
        TokenKind::PercentEq => compound(BinaryOp::Mod),
        TokenKind::StarStarEq => compound(BinaryOp::Pow),
        TokenKind::AmpEq => compound(BinaryOp::BitAnd),
        TokenKind::PipeEq => compound(BinaryOp::BitOr),
        TokenKind::CaretEq => compound(BinaryOp::BitXor),
        TokenKind::ShlEq => compound(BinaryOp::Shl),
        TokenKind::ShrEq => compound(BinaryOp::Shr),
        TokenKind::UShrEq => compound(BinaryOp::UShr),
        _ => None,
    }
}

fn binary_op(kind: &TokenKind) -> Option<BinaryOp> {
    Some(match kind {
        TokenKind::Plus => BinaryOp::Add,
        TokenKind::Minus => BinaryOp::Sub,
        TokenKind::Star => BinaryOp::Mul,
        TokenKind::Slash => BinaryOp::Div,
        TokenKind::Percent => BinaryOp::Mod,
        TokenKind::StarStar => BinaryOp::Pow,
        TokenKind::EqEq => BinaryOp::Eq,
        TokenKind::NotEq => BinaryOp::NotEq,
        TokenKind::EqEqEq => BinaryOp::StrictEq,
        TokenKind::NotEqEq => BinaryOp::StrictNotEq,
        TokenKind::Lt => BinaryOp::Lt,
        TokenKind::LtEq => BinaryOp::LtEq,
        TokenKind::Gt => BinaryOp::Gt,
        TokenKind::GtEq => BinaryOp::GtEq,
        TokenKind::Amp => BinaryOp::BitAnd,
        TokenKind::Pipe => BinaryOp::BitOr,
        TokenKind::Caret => BinaryOp::BitXor,
        TokenKind::Shl => BinaryOp::Shl,
        TokenKind::Shr => BinaryOp::Shr,
        TokenKind::UShr => BinaryOp::UShr,
        _ => return None,
    })
}
