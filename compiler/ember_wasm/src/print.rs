//! Text rendering in the folded s-expression form of the text format.
//! Used by tests and trace output; not meant to round-trip.

use std::fmt;

use ember_stack::ensure_sufficient_stack;

use crate::{Expr, Function};

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        ensure_sufficient_stack(|| write_expr(self, f))
    }
}

fn write_expr(expr: &Expr, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match expr {
        Expr::I32Const(v) => write!(f, "(i32.const {v})"),
        Expr::F64Const(v) => write!(f, "(f64.const {v})"),
        Expr::LocalGet(index) => write!(f, "(local.get {index})"),
        Expr::LocalSet { index, value } => write!(f, "(local.set {index} {value})"),
        Expr::LocalTee { index, value } => write!(f, "(local.tee {index} {value})"),
        Expr::Binary { op, left, right } => write!(f, "({} {left} {right})", op.name()),
        Expr::Unary { op, operand } => write!(f, "({} {operand})", op.name()),
        Expr::Load {
            ty,
            offset,
            address,
        } => {
            write!(f, "({ty}.load")?;
            if *offset != 0 {
                write!(f, " offset={offset}")?;
            }
            write!(f, " {address})")
        }
        Expr::Store {
            ty,
            offset,
            address,
            value,
        } => {
            write!(f, "({ty}.store")?;
            if *offset != 0 {
                write!(f, " offset={offset}")?;
            }
            write!(f, " {address} {value})")
        }
        Expr::Block { label, body, ty } => {
            f.write_str("(block")?;
            if let Some(label) = label {
                write!(f, " {label}")?;
            }
            if let Some(ty) = ty {
                write!(f, " (result {ty})")?;
            }
            for item in body {
                write!(f, " {item}")?;
            }
            f.write_str(")")
        }
        Expr::If {
            condition,
            then,
            otherwise,
            ty,
        } => {
            f.write_str("(if")?;
            if let Some(ty) = ty {
                write!(f, " (result {ty})")?;
            }
            write!(f, " {condition} (then {then})")?;
            if let Some(otherwise) = otherwise {
                write!(f, " (else {otherwise})")?;
            }
            f.write_str(")")
        }
        Expr::Loop { label, body } => write!(f, "(loop {label} {body})"),
        Expr::Break {
            label,
            condition: None,
        } => write!(f, "(br {label})"),
        Expr::Break {
            label,
            condition: Some(condition),
        } => write!(f, "(br_if {label} {condition})"),
        Expr::Call { target, args } => {
            write!(f, "(call ${target}")?;
            for arg in args {
                write!(f, " {arg}")?;
            }
            f.write_str(")")
        }
        Expr::Return(None) => f.write_str("(return)"),
        Expr::Return(Some(value)) => write!(f, "(return {value})"),
        Expr::Drop(value) => write!(f, "(drop {value})"),
        Expr::Nop => f.write_str("(nop)"),
    }
}

impl fmt::Display for Function {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "(func ${}", self.name)?;
        for param in &self.params {
            write!(f, " (param {param})")?;
        }
        if let Some(result) = self.result {
            write!(f, " (result {result})")?;
        }
        for local in &self.locals {
            write!(f, " (local {local})")?;
        }
        write!(f, " {})", self.body)
    }
}
