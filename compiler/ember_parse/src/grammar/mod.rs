//! Grammar productions, one file per syntactic category.
//!
//! - `item.rs`: the program, function declarations, bindings
//! - `stmt.rs`: statements and blocks
//! - `expr.rs`: expressions by precedence

mod expr;
mod item;
mod stmt;
