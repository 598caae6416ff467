//! Expression AST nodes

use super::Spanned;
use serde::{Deserialize, Serialize};
use std::rc::Rc;

/// Expression
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Expr {
    /// Integer literal
    Int(i64),
    /// Float literal
    Float(f64),
    /// String literal
    Str(String),

    /// Variable reference
    Name(String),

    /// Tuple display: (a, b)
    Tuple(Vec<Spanned<Expr>>),
    /// List display: [a, b]
    List(Vec<Spanned<Expr>>),
    /// Dict display: {k: v}
    Dict(Vec<(Spanned<Expr>, Spanned<Expr>)>),

    /// Call: func(args)
    Call {
        func: Box<Spanned<Expr>>,
        args: Vec<Spanned<Expr>>,
    },

    /// Subscript: target[index]
    Index {
        target: Box<Spanned<Expr>>,
        index: Box<Spanned<Expr>>,
    },

    /// Slice: target[lo:hi]
    Slice {
        target: Box<Spanned<Expr>>,
        lo: Option<Box<Spanned<Expr>>>,
        hi: Option<Box<Spanned<Expr>>>,
    },

    Unary {
        op: UnOp,
        expr: Box<Spanned<Expr>>,
    },

    Binary {
        left: Box<Spanned<Expr>>,
        op: BinOp,
        right: Box<Spanned<Expr>>,
    },

    Compare {
        left: Box<Spanned<Expr>>,
        op: CmpOp,
        right: Box<Spanned<Expr>>,
    },

    /// Short-circuit `and` / `or`
    Logical {
        left: Box<Spanned<Expr>>,
        op: LogicOp,
        right: Box<Spanned<Expr>>,
    },

    /// then_branch if cond else else_branch
    Conditional {
        cond: Box<Spanned<Expr>>,
        then_branch: Box<Spanned<Expr>>,
        else_branch: Box<Spanned<Expr>>,
    },

    /// Anonymous function
    Lambda(Rc<FunctionDef>),
}

/// Function definition shared by `def` statements and lambdas
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionDef {
    pub name: String,
    pub params: Params,
    pub body: Spanned<Expr>,
}

/// Positional parameter list with an optional `*rest` collector
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Params {
    pub names: Vec<String>,
    pub rest: Option<String>,
}

impl Params {
    /// True when the only parameter is `*rest`
    pub fn is_rest_only(&self) -> bool {
        self.names.is_empty() && self.rest.is_some()
    }
}

/// Binary arithmetic operator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BinOp {
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    Pow,
}

impl std::fmt::Display for BinOp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            BinOp::Add => "+",
            BinOp::Sub => "-",
            BinOp::Mul => "*",
            BinOp::Div => "/",
            BinOp::Mod => "%",
            BinOp::Pow => "**",
        };
        write!(f, "{s}")
    }
}

/// Comparison operator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CmpOp {
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LogicOp {
    And,
    Or,
}

/// Unary operator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum UnOp {
    /// Negation: -x
    Neg,
    /// Logical not: not x
    Not,
}
