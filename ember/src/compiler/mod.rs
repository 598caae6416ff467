//! Source to code objects
//!
//! A [`Code`] object is the parsed, immutable form of a source fragment
//! for one grammar entry point. It can be evaluated any number of times
//! against different scopes.

use crate::ast::{Expr, FunctionDef, Program, Spanned};
use crate::error::{Error, Result};
use crate::lexer::tokenize;
use crate::object::{Object, ObjRef};
use crate::parser::{parse_expression, parse_lambda, parse_program};
use serde::Serialize;
use std::fmt;
use std::rc::Rc;
use tracing::debug;

/// Grammar entry point requested by the caller
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum EntryPoint {
    /// Single expression; evaluates to its value
    Expression,
    /// Statement block; evaluates to None
    Module,
    /// Interactive input; yields the value of a trailing expression statement
    Interactive,
    /// `params: expr`; evaluates to a function
    Lambda,
}

impl EntryPoint {
    /// Entry point for a `compile()` mode string
    pub fn from_mode(mode: &str) -> Result<Self> {
        match mode {
            "exec" => Ok(EntryPoint::Module),
            "eval" => Ok(EntryPoint::Expression),
            "single" => Ok(EntryPoint::Interactive),
            other => Err(Error::value(format!(
                "compile() mode must be 'exec', 'eval' or 'single', not '{other}'"
            ))),
        }
    }
}

impl fmt::Display for EntryPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            EntryPoint::Expression => "eval",
            EntryPoint::Module => "exec",
            EntryPoint::Interactive => "single",
            EntryPoint::Lambda => "lambda",
        };
        f.write_str(name)
    }
}

/// Parsed body of a code object
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum CodeBody {
    Expression(Spanned<Expr>),
    Block(Program),
    Lambda(Rc<FunctionDef>),
}

/// Compiled program fragment
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Code {
    pub filename: String,
    pub entry: EntryPoint,
    pub body: CodeBody,
}

/// Compile source text for an entry point
pub fn compile(source: &str, filename: &str, entry: EntryPoint) -> Result<ObjRef> {
    debug!(%entry, filename, bytes = source.len(), "compile");
    let tokens = tokenize(source)?;
    let body = match entry {
        EntryPoint::Expression => CodeBody::Expression(parse_expression(source, tokens)?),
        EntryPoint::Module | EntryPoint::Interactive => {
            CodeBody::Block(parse_program(source, tokens)?)
        }
        EntryPoint::Lambda => CodeBody::Lambda(Rc::new(parse_lambda(source, tokens)?)),
    };
    Ok(ObjRef::new(Object::Code(Code {
        filename: filename.to_string(),
        entry,
        body,
    })))
}
