//! Abstract Syntax Tree definitions

mod expr;
mod span;

pub use expr::*;
pub use span::*;

use serde::{Deserialize, Serialize};
use std::rc::Rc;

/// A program is a sequence of statements
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Program {
    pub stmts: Vec<Spanned<Stmt>>,
}

/// Statement
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Stmt {
    /// Expression evaluated for its value or side effects
    Expr(Spanned<Expr>),
    /// target = value
    Assign {
        target: Target,
        value: Spanned<Expr>,
    },
    /// def name(params): body
    Def(Rc<FunctionDef>),
}

/// Left-hand side of an assignment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Target {
    Name(String),
    Item {
        target: Spanned<Expr>,
        index: Spanned<Expr>,
    },
    Slice {
        target: Spanned<Expr>,
        lo: Option<Spanned<Expr>>,
        hi: Option<Spanned<Expr>>,
    },
}
